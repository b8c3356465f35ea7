// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Unified error hierarchy for warden.
//!
//! Only construction-time misconfiguration and caller-configuration mistakes
//! are errors. A ticket that fails validation is not an error (it yields no
//! identity) and an authorization denial is not an error (it is `false`).
//!
//! # Error Hierarchy
//!
//! ```text
//! WardenError (root)
//! ├── TicketError   - Ticket policy construction and issuance
//! ├── AclError      - Malformed ACL rules
//! └── AutzError     - Authorization policy misuse
//! ```

use thiserror::Error;

// =============================================================================
// WardenError - Root Error Type
// =============================================================================

/// The root error type for warden.
#[derive(Debug, Error)]
pub enum WardenError {
    /// Ticket policy error.
    #[error("Ticket error: {0}")]
    Ticket(#[from] TicketError),

    /// ACL rule error.
    #[error("ACL error: {0}")]
    Acl(#[from] AclError),

    /// Authorization policy error.
    #[error("Authorization error: {0}")]
    Autz(#[from] AutzError),
}

impl WardenError {
    /// Returns the error type as a string for logging.
    pub fn error_type(&self) -> &'static str {
        match self {
            WardenError::Ticket(e) => e.error_type(),
            WardenError::Acl(e) => e.error_type(),
            WardenError::Autz(e) => e.error_type(),
        }
    }

    /// Returns `true` if this error was caused by configuration.
    pub fn is_configuration(&self) -> bool {
        match self {
            WardenError::Ticket(e) => e.is_configuration(),
            WardenError::Acl(_) => true,
            WardenError::Autz(_) => true,
        }
    }
}

// =============================================================================
// TicketError
// =============================================================================

/// Errors raised by the ticket policy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TicketError {
    /// No signing secret was configured.
    #[error("Ticket secret is not configured")]
    MissingSecret,

    /// A configured duration is out of range.
    #[error("Invalid duration for '{field}': {message}")]
    InvalidDuration {
        /// The offending field.
        field: &'static str,
        /// Error message.
        message: String,
    },

    /// Attempted to issue a ticket for an empty identity.
    #[error("Cannot issue a ticket for an empty identity")]
    EmptyIdentity,

    /// The policy binds tickets to a client address but none was supplied.
    #[error("Client address required: ticket policy includes the client IP")]
    MissingClientIp,
}

impl TicketError {
    /// Creates an invalid duration error.
    pub fn invalid_duration(field: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidDuration {
            field,
            message: message.into(),
        }
    }

    /// Returns the error type as a string for logging.
    pub fn error_type(&self) -> &'static str {
        match self {
            TicketError::MissingSecret => "missing_secret",
            TicketError::InvalidDuration { .. } => "invalid_duration",
            TicketError::EmptyIdentity => "empty_identity",
            TicketError::MissingClientIp => "missing_client_ip",
        }
    }

    /// Returns `true` if this error is raised while building a policy.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            TicketError::MissingSecret | TicketError::InvalidDuration { .. }
        )
    }
}

/// A Result type with TicketError.
pub type TicketResult<T> = Result<T, TicketError>;

// =============================================================================
// AclError
// =============================================================================

/// Errors raised while building ACL rules or contexts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AclError {
    /// The rule effect is neither allow nor deny.
    #[error("Unknown ACL effect '{value}' (expected 'allow' or 'deny')")]
    UnknownEffect {
        /// The unrecognized value.
        value: String,
    },

    /// A rule governs no permissions.
    #[error("ACL rule for {principal} has an empty permission set")]
    EmptyPermissions {
        /// Display form of the rule principal.
        principal: String,
    },

    /// A group or identity principal has an empty name.
    #[error("ACL principal name cannot be empty")]
    EmptyPrincipal,

    /// A rule lists an empty permission identifier.
    #[error("ACL rule for {principal} contains an empty permission identifier")]
    EmptyPermission {
        /// Display form of the rule principal.
        principal: String,
    },

    /// A reserved principal keyword was not recognized.
    #[error("Unknown reserved principal '{value}' (use {{group: ...}} or {{identity: ...}} for names)")]
    UnknownPrincipal {
        /// The unrecognized keyword.
        value: String,
    },

    /// Error at a specific rule position.
    #[error("ACL rule #{index}: {source}")]
    AtRule {
        /// Zero-based position in the rule list.
        index: usize,
        /// Underlying error.
        #[source]
        source: Box<AclError>,
    },
}

impl AclError {
    /// Creates an unknown effect error.
    pub fn unknown_effect(value: impl Into<String>) -> Self {
        Self::UnknownEffect {
            value: value.into(),
        }
    }

    /// Creates an unknown principal error.
    pub fn unknown_principal(value: impl Into<String>) -> Self {
        Self::UnknownPrincipal {
            value: value.into(),
        }
    }

    /// Attaches the rule position to this error.
    pub fn at_rule(self, index: usize) -> Self {
        Self::AtRule {
            index,
            source: Box::new(self),
        }
    }

    /// Returns the error type as a string for logging.
    pub fn error_type(&self) -> &'static str {
        match self {
            AclError::UnknownEffect { .. } => "unknown_effect",
            AclError::EmptyPermissions { .. } => "empty_permissions",
            AclError::EmptyPrincipal => "empty_principal",
            AclError::EmptyPermission { .. } => "empty_permission",
            AclError::UnknownPrincipal { .. } => "unknown_principal",
            AclError::AtRule { source, .. } => source.error_type(),
        }
    }
}

/// A Result type with AclError.
pub type AclResult<T> = Result<T, AclError>;

// =============================================================================
// AutzError
// =============================================================================

/// Errors raised by authorization policies.
///
/// These indicate a misconfigured caller, never a denial.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AutzError {
    /// No ACL context was configured globally or passed to the check.
    #[error(
        "ACL context must be configured on the policy or passed to the permission check"
    )]
    MissingContext,
}

impl AutzError {
    /// Returns the error type as a string for logging.
    pub fn error_type(&self) -> &'static str {
        match self {
            AutzError::MissingContext => "missing_context",
        }
    }
}

/// A Result type with AutzError.
pub type AutzResult<T> = Result<T, AutzError>;
