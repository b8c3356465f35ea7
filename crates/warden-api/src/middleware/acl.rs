// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! ACL permission middleware.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::{
    body::Body,
    http::Request,
    response::{IntoResponse, Response},
};
use tower::{Layer, Service};
use warden_core::{AclContext, AutzPolicy};

use crate::auth::AuthContext;
use crate::error::ApiError;

// =============================================================================
// AclLayer
// =============================================================================

/// Layer guarding a service behind one permission.
///
/// The identity comes from the [`AuthContext`] left by the ticket layer. A
/// request without one is answered with a 500 `AUTH_LAYER_MISSING` error,
/// never checked as anonymous. The inner service runs only when the
/// authorization policy allows.
#[derive(Clone)]
pub struct AclLayer {
    permission: Arc<str>,
    policy: Arc<dyn AutzPolicy>,
    context: Option<Arc<dyn AclContext>>,
}

impl AclLayer {
    /// Creates a layer requiring `permission` under `policy`.
    pub fn require(permission: impl Into<String>, policy: Arc<dyn AutzPolicy>) -> Self {
        Self {
            permission: Arc::from(permission.into()),
            policy,
            context: None,
        }
    }

    /// Checks against `context` instead of the policy's global rules.
    pub fn with_context(mut self, context: Arc<dyn AclContext>) -> Self {
        self.context = Some(context);
        self
    }

    /// Returns the guarded permission.
    pub fn permission(&self) -> &str {
        &self.permission
    }
}

impl<S> Layer<S> for AclLayer {
    type Service = AclMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AclMiddleware {
            inner,
            permission: self.permission.clone(),
            policy: self.policy.clone(),
            context: self.context.clone(),
        }
    }
}

// =============================================================================
// AclMiddleware
// =============================================================================

/// Middleware for ACL enforcement.
#[derive(Clone)]
pub struct AclMiddleware<S> {
    inner: S,
    permission: Arc<str>,
    policy: Arc<dyn AutzPolicy>,
    context: Option<Arc<dyn AclContext>>,
}

impl<S> Service<Request<Body>> for AclMiddleware<S>
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
        let permission = self.permission.clone();
        let policy = self.policy.clone();
        let context = self.context.clone();
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let Some(identity) = req
                .extensions()
                .get::<AuthContext>()
                .map(|ctx| ctx.identity.clone())
            else {
                return Ok(ApiError::auth_layer_missing("AclLayer").into_response());
            };

            let decision = policy
                .permit(identity.as_deref(), &permission, context.as_deref())
                .await;

            match decision {
                Ok(true) => inner.call(req).await,
                Ok(false) => {
                    tracing::warn!(
                        identity = identity.as_deref().unwrap_or("-"),
                        permission = %permission,
                        "Permission denied"
                    );
                    Ok(ApiError::forbidden(format!("'{permission}' denied")).into_response())
                }
                Err(e) => Ok(ApiError::from_autz(e, &*permission).into_response()),
            }
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
