// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Rejects requests without an authenticated identity.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use axum::{
    body::Body,
    http::Request,
    response::{IntoResponse, Response},
};
use tower::{Layer, Service};

use crate::auth::AuthContext;
use crate::error::ApiError;

/// Layer answering 401 unless the ticket layer resolved an identity.
///
/// Without the ticket layer in front the answer is a 500
/// `AUTH_LAYER_MISSING` error.
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthRequiredLayer;

impl AuthRequiredLayer {
    /// Creates the layer.
    pub fn new() -> Self {
        Self
    }
}

impl<S> Layer<S> for AuthRequiredLayer {
    type Service = AuthRequiredMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthRequiredMiddleware { inner }
    }
}

/// Middleware produced by [`AuthRequiredLayer`].
#[derive(Debug, Clone)]
pub struct AuthRequiredMiddleware<S> {
    inner: S,
}

impl<S> Service<Request<Body>> for AuthRequiredMiddleware<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let authenticated = req
            .extensions()
            .get::<AuthContext>()
            .map(|ctx| !ctx.is_anonymous());
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let Some(authenticated) = authenticated else {
                return Ok(ApiError::auth_layer_missing("AuthRequiredLayer").into_response());
            };
            if !authenticated {
                tracing::debug!(path = %req.uri().path(), "Authentication required");
                return Ok(ApiError::unauthorized("Authentication required").into_response());
            }
            inner.call(req).await
        })
    }
}
