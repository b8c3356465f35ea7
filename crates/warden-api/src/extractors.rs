// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Custom extractors for handlers behind [`TicketAuthLayer`](crate::middleware::TicketAuthLayer).

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::auth::{AuthContext, AuthSession};
use crate::error::ApiError;

// =============================================================================
// Auth Extractor
// =============================================================================

/// Extractor for authenticated requests.
///
/// Returns 401 for an anonymous request and 500 when the ticket layer did not
/// run.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(Auth(ctx): Auth) -> impl IntoResponse {
///     format!("Hello, {}", ctx.identity().unwrap_or_default())
/// }
/// ```
pub struct Auth(pub AuthContext);

impl<S> FromRequestParts<S> for Auth
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let ctx = parts
            .extensions
            .get::<AuthContext>()
            .ok_or(ApiError::auth_layer_missing("Auth"))?;
        if ctx.is_anonymous() {
            return Err(ApiError::unauthorized("Authentication required"));
        }
        Ok(Auth(ctx.clone()))
    }
}

// =============================================================================
// Optional Auth Extractor
// =============================================================================

/// Extractor for optionally authenticated requests.
///
/// Holds `None` for anonymous requests. Still fails with 500 when the ticket
/// layer did not run.
pub struct OptionalAuth(pub Option<AuthContext>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let ctx = parts
            .extensions
            .get::<AuthContext>()
            .ok_or(ApiError::auth_layer_missing("OptionalAuth"))?;
        Ok(OptionalAuth(Some(ctx.clone()).filter(|ctx| !ctx.is_anonymous())))
    }
}

// =============================================================================
// Session Extractor
// =============================================================================

/// Extractor for the remember / forget handle.
///
/// # Example
///
/// ```rust,ignore
/// async fn login(Session(session): Session) -> StatusCode {
///     session.remember("alice");
///     StatusCode::NO_CONTENT
/// }
/// ```
pub struct Session(pub AuthSession);

impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthSession>()
            .cloned()
            .map(Session)
            .ok_or(ApiError::auth_layer_missing("Session"))
    }
}
