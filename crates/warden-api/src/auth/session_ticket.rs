// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Ticket tokens kept in a server-side session field.

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::{Extensions, HeaderMap};
use tower_sessions::Session;

use crate::auth::TicketCarrier;
use crate::error::{ApiError, ApiResult};

/// Carries ticket tokens in one field of a `tower-sessions` session.
///
/// The session itself, its store and its cookie belong to a
/// `SessionManagerLayer` installed outside the ticket layer. Expiry is still
/// decided by the ticket timestamp, so `max_age` is not forwarded to the
/// session.
#[derive(Debug, Clone)]
pub struct SessionTicket {
    key: Arc<str>,
}

impl SessionTicket {
    /// Session field used when none is given.
    pub const DEFAULT_KEY: &'static str = "auth_tkt";

    /// Creates a carrier using [`Self::DEFAULT_KEY`].
    pub fn new() -> Self {
        Self::with_key(Self::DEFAULT_KEY)
    }

    /// Creates a carrier using the session field `key`.
    pub fn with_key(key: impl Into<String>) -> Self {
        Self {
            key: Arc::from(key.into()),
        }
    }

    /// Returns the session field name.
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl Default for SessionTicket {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TicketCarrier for SessionTicket {
    type Slot = Session;

    async fn read_token(
        &self,
        _headers: &HeaderMap,
        extensions: &Extensions,
    ) -> ApiResult<(Option<String>, Session)> {
        let session = extensions
            .get::<Session>()
            .cloned()
            .ok_or_else(|| ApiError::internal("Session layer is not installed"))?;

        let token = session
            .get::<String>(&self.key)
            .await
            .map_err(|e| ApiError::internal(format!("Failed to read session ticket: {e}")))?;

        Ok((token.filter(|t| !t.is_empty()), session))
    }

    async fn store_token(&self, slot: &Session, _headers: &mut HeaderMap, token: &str, _max_age: u64) {
        if let Err(e) = slot.insert(&self.key, token).await {
            tracing::error!(error = %e, key = %self.key, "Failed to store session ticket");
        }
    }

    async fn clear_token(&self, slot: &Session, _headers: &mut HeaderMap) {
        if let Err(e) = slot.remove::<String>(&self.key).await {
            tracing::error!(error = %e, key = %self.key, "Failed to remove session ticket");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;

    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
        response::Response,
    };
    use tower::{Layer, ServiceExt};
    use tower_sessions::{MemoryStore, SessionManagerLayer};
    use warden_core::{TicketConfig, TicketPolicy};

    use crate::auth::{AuthContext, AuthSession};
    use crate::middleware::TicketAuthLayer;

    fn policy() -> Arc<TicketPolicy> {
        let config = TicketConfig::new("session-carrier-secret", 3600);
        Arc::new(TicketPolicy::new(config).unwrap())
    }

    async fn handler(req: Request<Body>) -> Result<Response, Infallible> {
        let session = req.extensions().get::<AuthSession>().cloned().unwrap();
        let ctx = req.extensions().get::<AuthContext>().cloned().unwrap();
        match req.uri().path() {
            "/login" => session.remember("bob"),
            "/logout" => session.forget(),
            _ => {}
        }
        Ok(Response::new(Body::from(ctx.identity().unwrap_or("-").to_string())))
    }

    fn request(path: &str, session_cookie: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(path);
        if let Some(cookie) = session_cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn body(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn test_default_key() {
        assert_eq!(SessionTicket::new().key(), "auth_tkt");
        assert_eq!(SessionTicket::with_key("tkt").key(), "tkt");
    }

    #[tokio::test]
    async fn test_remember_and_forget_through_session() {
        let sessions = SessionManagerLayer::new(MemoryStore::default()).with_secure(false);
        let app = sessions.layer(
            TicketAuthLayer::new(policy())
                .with_carrier(SessionTicket::new())
                .layer(tower::service_fn(handler)),
        );

        let response = app.clone().oneshot(request("/login", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let set_cookies: Vec<String> = response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect();
        assert!(set_cookies.iter().all(|c| !c.starts_with("AUTH_TKT=")));
        let session_cookie = set_cookies
            .iter()
            .find(|c| c.starts_with("id="))
            .and_then(|c| c.split(';').next())
            .unwrap()
            .to_string();

        let response = app
            .clone()
            .oneshot(request("/whoami", Some(&session_cookie)))
            .await
            .unwrap();
        assert_eq!(body(response).await, "bob");

        let response = app
            .clone()
            .oneshot(request("/logout", Some(&session_cookie)))
            .await
            .unwrap();
        assert_eq!(body(response).await, "bob");

        let response = app
            .oneshot(request("/whoami", Some(&session_cookie)))
            .await
            .unwrap();
        assert_eq!(body(response).await, "-");
    }

    #[tokio::test]
    async fn test_missing_session_layer_is_server_error() {
        let app = TicketAuthLayer::new(policy())
            .with_carrier(SessionTicket::new())
            .layer(tower::service_fn(handler));

        let response = app.oneshot(request("/whoami", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
