// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Ticket authentication middleware.

use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::{
    body::Body,
    extract::ConnectInfo,
    http::Request,
    response::{IntoResponse, Response},
};
use tower::{Layer, Service};
use uuid::Uuid;
use warden_config::{ConfigResult, CookieConfig, WardenConfig};
use warden_core::AuthPolicy;

use crate::auth::{AuthContext, AuthSession, SessionAction, TicketCarrier, TicketCookie};

// =============================================================================
// TicketAuthLayer
// =============================================================================

/// Layer for ticket authentication.
///
/// Every request leaves this layer with an [`AuthContext`] (anonymous when no
/// valid ticket was presented) and an [`AuthSession`] in its extensions. On the
/// way out the session action, or an automatic reissue, is handed to the
/// [`TicketCarrier`]. The default carrier is a [`TicketCookie`].
pub struct TicketAuthLayer<C = TicketCookie> {
    policy: Arc<dyn AuthPolicy>,
    carrier: Arc<C>,
}

impl<C> Clone for TicketAuthLayer<C> {
    fn clone(&self) -> Self {
        Self {
            policy: self.policy.clone(),
            carrier: self.carrier.clone(),
        }
    }
}

impl TicketAuthLayer {
    /// Creates a layer with the default cookie settings.
    pub fn new(policy: Arc<dyn AuthPolicy>) -> Self {
        Self {
            policy,
            carrier: Arc::new(TicketCookie::default()),
        }
    }

    /// Replaces the cookie settings.
    pub fn with_cookie(self, config: CookieConfig) -> Self {
        self.with_carrier(TicketCookie::new(config))
    }

    /// Builds the layer from the ticket and cookie sections.
    pub fn from_config(config: &WardenConfig) -> ConfigResult<Self> {
        config.cookie.validate()?;
        let policy = config.ticket_policy()?;
        Ok(Self::new(Arc::new(policy)).with_cookie(config.cookie.clone()))
    }
}

impl<C: TicketCarrier> TicketAuthLayer<C> {
    /// Moves tokens through `carrier` instead.
    pub fn with_carrier<D: TicketCarrier>(self, carrier: D) -> TicketAuthLayer<D> {
        TicketAuthLayer {
            policy: self.policy,
            carrier: Arc::new(carrier),
        }
    }

    /// Returns the token carrier.
    pub fn carrier(&self) -> &C {
        &self.carrier
    }
}

impl<S, C> Layer<S> for TicketAuthLayer<C> {
    type Service = TicketAuthMiddleware<S, C>;

    fn layer(&self, inner: S) -> Self::Service {
        TicketAuthMiddleware {
            inner,
            policy: self.policy.clone(),
            carrier: self.carrier.clone(),
        }
    }
}

// =============================================================================
// TicketAuthMiddleware
// =============================================================================

/// Middleware for ticket authentication.
pub struct TicketAuthMiddleware<S, C = TicketCookie> {
    inner: S,
    policy: Arc<dyn AuthPolicy>,
    carrier: Arc<C>,
}

impl<S: Clone, C> Clone for TicketAuthMiddleware<S, C> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            policy: self.policy.clone(),
            carrier: self.carrier.clone(),
        }
    }
}

impl<S, C> Service<Request<Body>> for TicketAuthMiddleware<S, C>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
    C: TicketCarrier,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<Body>) -> Self::Future {
        let policy = self.policy.clone();
        let carrier = self.carrier.clone();
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let request_id = Uuid::now_v7();

            let client_ip = req
                .extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ci| ci.0.ip());

            let (token, slot) = match carrier.read_token(req.headers(), req.extensions()).await {
                Ok(read) => read,
                Err(e) => return Ok(e.into_response()),
            };
            let identity = token
                .as_deref()
                .and_then(|token| policy.validate(token, client_ip));

            // Only a valid ticket is a reissue candidate.
            let reissue = match (&token, &identity) {
                (Some(token), Some(_)) if policy.should_reissue(token, client_ip) => {
                    Some(token.clone())
                }
                _ => None,
            };

            if token.is_some() && identity.is_none() {
                tracing::debug!(%request_id, "Presented ticket rejected");
            }

            let session = AuthSession::new();
            req.extensions_mut().insert(AuthContext {
                identity,
                request_id,
                client_ip,
            });
            req.extensions_mut().insert(session.clone());

            let mut response = inner.call(req).await?;
            let succeeded = response.status().is_success();
            let headers = response.headers_mut();

            match session.take() {
                Some(SessionAction::Remember(identity)) => {
                    match policy.issue(&identity, client_ip) {
                        Ok(fresh) => {
                            carrier
                                .store_token(&slot, headers, &fresh, policy.max_age())
                                .await
                        }
                        Err(e) => tracing::error!(%request_id, error = %e, "Failed to issue ticket"),
                    }
                }
                Some(SessionAction::Forget) => carrier.clear_token(&slot, headers).await,
                None if succeeded => {
                    if let Some(fresh) = reissue.and_then(|token| policy.reissue(&token, client_ip)) {
                        tracing::debug!(%request_id, "Ticket reissued");
                        carrier
                            .store_token(&slot, headers, &fresh, policy.max_age())
                            .await;
                    }
                }
                None => {}
            }

            Ok(response)
        })
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;
    use axum::http::{header, StatusCode};
    use tower::ServiceExt;
    use warden_core::{unix_now, TicketConfig, TicketPolicy};

    fn policy() -> Arc<TicketPolicy> {
        let config = TicketConfig::new("middleware-test-secret", 3600).with_reissue_time(600);
        Arc::new(TicketPolicy::new(config).unwrap())
    }

    fn request(cookie: Option<String>) -> Request<Body> {
        let mut builder = Request::builder().uri("/test");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, format!("AUTH_TKT={cookie}"));
        }
        builder.body(Body::empty()).unwrap()
    }

    fn set_cookie(response: &Response) -> Option<String> {
        response
            .headers()
            .get(header::SET_COOKIE)
            .map(|v| v.to_str().unwrap().to_string())
    }

    #[tokio::test]
    async fn test_anonymous_request_gets_context() {
        let layer = TicketAuthLayer::new(policy());
        let service = layer.layer(tower::service_fn(|req: Request<Body>| async move {
            let ctx = req.extensions().get::<AuthContext>().cloned().unwrap();
            assert!(ctx.is_anonymous());
            assert!(req.extensions().get::<AuthSession>().is_some());
            Ok::<_, Infallible>(Response::new(Body::empty()))
        }));

        let response = service.oneshot(request(None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(set_cookie(&response).is_none());
    }

    #[tokio::test]
    async fn test_valid_ticket_sets_identity() {
        let policy = policy();
        let token = policy.issue("alice").unwrap();
        let service = TicketAuthLayer::new(policy).layer(tower::service_fn(
            |req: Request<Body>| async move {
                let ctx = req.extensions().get::<AuthContext>().cloned().unwrap();
                assert_eq!(ctx.identity(), Some("alice"));
                Ok::<_, Infallible>(Response::new(Body::empty()))
            },
        ));

        let response = service.oneshot(request(Some(token))).await.unwrap();
        assert!(set_cookie(&response).is_none());
    }

    #[tokio::test]
    async fn test_tampered_ticket_is_anonymous() {
        let policy = policy();
        let mut token = policy.issue("alice").unwrap();
        token.replace_range(0..1, if token.starts_with('0') { "1" } else { "0" });

        let service = TicketAuthLayer::new(policy).layer(tower::service_fn(
            |req: Request<Body>| async move {
                let ctx = req.extensions().get::<AuthContext>().cloned().unwrap();
                assert!(ctx.is_anonymous());
                Ok::<_, Infallible>(Response::new(Body::empty()))
            },
        ));

        service.oneshot(request(Some(token))).await.unwrap();
    }

    #[tokio::test]
    async fn test_remember_sets_cookie() {
        let policy = policy();
        let service = TicketAuthLayer::new(policy.clone()).layer(tower::service_fn(
            |req: Request<Body>| async move {
                req.extensions().get::<AuthSession>().unwrap().remember("bob");
                Ok::<_, Infallible>(Response::new(Body::empty()))
            },
        ));

        let response = service.oneshot(request(None)).await.unwrap();
        let cookie = set_cookie(&response).unwrap();
        assert!(cookie.contains("Max-Age=3600"));

        let token = cookie
            .strip_prefix("AUTH_TKT=")
            .and_then(|rest| rest.split(';').next())
            .unwrap();
        assert_eq!(policy.validate(token), Some("bob".to_string()));
    }

    #[tokio::test]
    async fn test_forget_clears_cookie() {
        let policy = policy();
        let token = policy.issue("alice").unwrap();
        let service = TicketAuthLayer::new(policy).layer(tower::service_fn(
            |req: Request<Body>| async move {
                req.extensions().get::<AuthSession>().unwrap().forget();
                Ok::<_, Infallible>(Response::new(Body::empty()))
            },
        ));

        let response = service.oneshot(request(Some(token))).await.unwrap();
        assert!(set_cookie(&response).unwrap().starts_with("AUTH_TKT=; Max-Age=0"));
    }

    #[tokio::test]
    async fn test_reissue_on_success_only() {
        let policy = policy();
        let aged = policy.issue_at("alice", unix_now() - 3300).unwrap();

        let ok = TicketAuthLayer::new(policy.clone()).layer(tower::service_fn(
            |_req: Request<Body>| async { Ok::<_, Infallible>(Response::new(Body::empty())) },
        ));
        let response = ok.oneshot(request(Some(aged.clone()))).await.unwrap();
        let cookie = set_cookie(&response).unwrap();
        assert!(!cookie.contains(&aged));

        let failing = TicketAuthLayer::new(policy).layer(tower::service_fn(
            |_req: Request<Body>| async {
                let mut response = Response::new(Body::empty());
                *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
                Ok::<_, Infallible>(response)
            },
        ));
        let response = failing.oneshot(request(Some(aged))).await.unwrap();
        assert!(set_cookie(&response).is_none());
    }

    #[tokio::test]
    async fn test_explicit_action_suppresses_reissue() {
        let policy = policy();
        let aged = policy.issue_at("alice", unix_now() - 3300).unwrap();
        let service = TicketAuthLayer::new(policy).layer(tower::service_fn(
            |req: Request<Body>| async move {
                req.extensions().get::<AuthSession>().unwrap().forget();
                Ok::<_, Infallible>(Response::new(Body::empty()))
            },
        ));

        let response = service.oneshot(request(Some(aged))).await.unwrap();
        let values: Vec<_> = response.headers().get_all(header::SET_COOKIE).iter().collect();
        assert_eq!(values.len(), 1);
        assert!(values[0].to_str().unwrap().contains("Max-Age=0"));
    }

    #[tokio::test]
    async fn test_custom_cookie_name() {
        let policy = policy();
        let token = policy.issue("carol").unwrap();
        let layer = TicketAuthLayer::new(policy).with_cookie(CookieConfig::named("tkt"));
        assert_eq!(layer.carrier().name(), "tkt");

        let service = layer.layer(tower::service_fn(|req: Request<Body>| async move {
            let ctx = req.extensions().get::<AuthContext>().cloned().unwrap();
            assert_eq!(ctx.identity(), Some("carol"));
            Ok::<_, Infallible>(Response::new(Body::empty()))
        }));

        let req = Request::builder()
            .uri("/test")
            .header(header::COOKIE, format!("tkt={token}"))
            .body(Body::empty())
            .unwrap();
        service.oneshot(req).await.unwrap();
    }
}
