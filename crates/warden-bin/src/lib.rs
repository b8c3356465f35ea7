// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # warden-bin
//!
//! The `warden` command-line tool.
//!
//! - CLI argument parsing with clap
//! - Logging initialization
//! - Command implementations (issue, verify, check, validate, ...)
//!
//! ## Usage
//!
//! ```bash
//! # Generate a signing secret
//! warden gen-secret > secret.hex
//!
//! # Issue and verify tickets
//! warden -c warden.yaml issue alice
//! warden -c warden.yaml verify <token>
//!
//! # Ask the ACL a question
//! warden -c warden.yaml check edit --identity alice
//!
//! # Validate configuration
//! warden -c warden.yaml validate --strict
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;

pub use cli::{Cli, Commands};
pub use error::{BinError, BinResult};
pub use logging::init_logging;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
