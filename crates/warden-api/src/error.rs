// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! API error types and handling.
//!
//! Every rejection produced by the warden layers and extractors is an
//! [`ApiError`], rendered as a status code plus a JSON body of the form
//! `{"error": {"code": "...", "message": "..."}}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use warden_core::AutzError;

/// Result type alias for API operations.
pub type ApiResult<T> = Result<T, ApiError>;

// =============================================================================
// ApiError
// =============================================================================

/// API error type with HTTP status code mapping.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No authenticated identity (401).
    #[error("Unauthorized: {message}")]
    Unauthorized {
        /// Error message.
        message: String,
    },

    /// The identity lacks the permission (403).
    #[error("Forbidden: {message}")]
    Forbidden {
        /// Error message.
        message: String,
    },

    /// A warden layer or extractor ran without [`TicketAuthLayer`] in front
    /// of it (500).
    ///
    /// [`TicketAuthLayer`]: crate::middleware::TicketAuthLayer
    #[error("Ticket authentication layer is not installed in front of {component}")]
    AuthLayerMissing {
        /// The layer or extractor that found no authentication state.
        component: &'static str,
    },

    /// A permission check ran without any ACL context (500).
    #[error("No ACL context configured for permission '{permission}'")]
    MissingAclContext {
        /// The permission being checked.
        permission: String,
    },

    /// Internal server error (500).
    #[error("Internal error: {message}")]
    Internal {
        /// Error message (for logging, not user-facing).
        message: String,
    },
}

impl ApiError {
    // =========================================================================
    // Constructors
    // =========================================================================

    /// Creates an unauthorized error.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    /// Creates a forbidden error.
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    /// Creates a missing authentication layer error.
    pub fn auth_layer_missing(component: &'static str) -> Self {
        Self::AuthLayerMissing { component }
    }

    /// Creates a missing ACL context error.
    pub fn missing_acl_context(permission: impl Into<String>) -> Self {
        Self::MissingAclContext {
            permission: permission.into(),
        }
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Maps an authorization policy error raised while checking `permission`.
    pub fn from_autz(error: AutzError, permission: impl Into<String>) -> Self {
        match error {
            AutzError::MissingContext => Self::missing_acl_context(permission),
        }
    }

    // =========================================================================
    // Properties
    // =========================================================================

    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden { .. } => StatusCode::FORBIDDEN,
            ApiError::AuthLayerMissing { .. }
            | ApiError::MissingAclContext { .. }
            | ApiError::Internal { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Returns the error code for categorization.
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::Unauthorized { .. } => "UNAUTHORIZED",
            ApiError::Forbidden { .. } => "FORBIDDEN",
            ApiError::AuthLayerMissing { .. } => "AUTH_LAYER_MISSING",
            ApiError::MissingAclContext { .. } => "MISSING_ACL_CONTEXT",
            ApiError::Internal { .. } => "INTERNAL_ERROR",
        }
    }

    /// Returns a message that is safe to show to clients.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Unauthorized { .. } => "Authentication required".to_string(),
            ApiError::Forbidden { .. } => "Permission denied".to_string(),
            ApiError::AuthLayerMissing { .. } => "Authentication is not configured".to_string(),
            ApiError::MissingAclContext { .. } => "Authorization is not configured".to_string(),
            ApiError::Internal { .. } => "Internal server error".to_string(),
        }
    }

    /// Returns `true` if this error should be logged at error level.
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }
}

// =============================================================================
// IntoResponse Implementation
// =============================================================================

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code();

        if self.is_server_error() {
            tracing::error!(
                error = %self,
                error_code = error_code,
                status = %status,
                "Server error occurred"
            );
        } else {
            tracing::debug!(
                error = %self,
                error_code = error_code,
                status = %status,
                "Client error occurred"
            );
        }

        let body = ErrorResponseBody {
            error: ErrorDetails {
                code: error_code.to_string(),
                message: self.user_message(),
                details: self.error_details(),
            },
        };

        (status, Json(body)).into_response()
    }
}

impl ApiError {
    fn error_details(&self) -> Option<serde_json::Value> {
        match self {
            ApiError::MissingAclContext { permission } => {
                Some(serde_json::json!({ "permission": permission }))
            }
            _ => None,
        }
    }
}

// =============================================================================
// Error Response Body
// =============================================================================

/// Error response body structure.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponseBody {
    /// Error details.
    pub error: ErrorDetails,
}

/// Error details within the response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetails {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Additional error details (optional).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

// =============================================================================
// Tests
// =============================================================================
