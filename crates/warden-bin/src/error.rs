// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Error types for the warden binary.

use thiserror::Error;
use warden_core::{TicketRejection, WardenError};

/// Result type alias for warden-bin operations.
pub type BinResult<T> = Result<T, BinError>;

/// Errors that can occur in the warden binary.
#[derive(Debug, Error)]
pub enum BinError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(String),

    /// The presented ticket did not verify.
    #[error("Ticket rejected: {0}")]
    Rejected(TicketRejection),

    /// The permission check denied access.
    #[error("Permission '{permission}' denied")]
    Denied {
        /// The permission that was checked.
        permission: String,
    },

    /// Config parsing error.
    #[error("Config error: {0}")]
    Config(#[from] warden_config::ConfigError),

    /// Core error.
    #[error("Core error: {0}")]
    Core(#[from] WardenError),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        /// The context description.
        context: String,
        /// The underlying error.
        #[source]
        source: Box<BinError>,
    },
}

impl BinError {
    /// Creates a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Creates an I/O error.
    pub fn io(msg: impl Into<String>) -> Self {
        Self::Io(msg.into())
    }

    /// Creates a denial error.
    pub fn denied(permission: impl Into<String>) -> Self {
        Self::Denied {
            permission: permission.into(),
        }
    }

    /// Adds context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        Self::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Returns the exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Configuration(_) | Self::Config(_) => 1,
            Self::Io(_) => 4,
            Self::Core(_) => 7,
            Self::Rejected(_) => 10,
            Self::Denied { .. } => 11,
            Self::WithContext { source, .. } => source.exit_code(),
        }
    }
}

impl From<std::io::Error> for BinError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<anyhow::Error> for BinError {
    fn from(err: anyhow::Error) -> Self {
        Self::Io(format!("{:#}", err))
    }
}

impl From<warden_core::TicketError> for BinError {
    fn from(err: warden_core::TicketError) -> Self {
        Self::Core(err.into())
    }
}

impl From<warden_core::AutzError> for BinError {
    fn from(err: warden_core::AutzError) -> Self {
        Self::Core(err.into())
    }
}

// =============================================================================
// Error Reporting
// =============================================================================

/// Reports an error with appropriate formatting.
pub fn report_error(error: &BinError) {
    eprintln!("Error: {}", error);

    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        eprintln!("  Caused by: {}", cause);
        source = cause.source();
    }
}

/// Reports an error and exits with the appropriate code.
pub fn report_error_and_exit(error: BinError) -> ! {
    report_error(&error);
    std::process::exit(error.exit_code())
}

// =============================================================================
// Tests
// =============================================================================
