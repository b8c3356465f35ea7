// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Authentication context.

use std::net::IpAddr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Authentication context for a request.
///
/// Inserted into the request extensions by the ticket layer. `identity` is
/// `None` when no valid ticket was presented.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    /// Authenticated identity.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity: Option<String>,
    /// Request ID for tracing.
    pub request_id: Uuid,
    /// Client IP address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_ip: Option<IpAddr>,
}

impl AuthContext {
    /// Creates an anonymous context.
    pub fn anonymous() -> Self {
        Self {
            identity: None,
            request_id: Uuid::now_v7(),
            client_ip: None,
        }
    }

    /// Creates a context for an authenticated identity.
    pub fn authenticated(identity: impl Into<String>) -> Self {
        Self {
            identity: Some(identity.into()),
            ..Self::anonymous()
        }
    }

    /// Sets the client IP address.
    pub fn with_client_ip(mut self, ip: IpAddr) -> Self {
        self.client_ip = Some(ip);
        self
    }

    /// Sets the request ID.
    pub fn with_request_id(mut self, request_id: Uuid) -> Self {
        self.request_id = request_id;
        self
    }

    /// Returns the identity, if any.
    pub fn identity(&self) -> Option<&str> {
        self.identity.as_deref()
    }

    /// Returns `true` if no identity is attached.
    pub fn is_anonymous(&self) -> bool {
        self.identity.is_none()
    }
}

impl Default for AuthContext {
    fn default() -> Self {
        Self::anonymous()
    }
}
