// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # warden-config
//!
//! Configuration management for warden.
//!
//! ## Features
//!
//! - **Schema Definition**: ticket, cookie, ACL, groups and logging sections
//! - **Multi-Format Support**: YAML, TOML, and JSON configuration files
//! - **Environment Overrides**: `${VAR}` placeholders and `WARDEN_*` variables
//! - **Fail Fast**: validation builds the core policies so misconfiguration
//!   is reported at load time
//!
//! ## Quick Start
//!
//! ```no_run
//! use warden_config::loader::load_config;
//!
//! let config = load_config("warden.yaml").unwrap();
//! let policy = config.ticket_policy().unwrap();
//! let autz = config.autz_policy();
//! ```
//!
//! ## Example Configuration
//!
//! ```yaml
//! ticket:
//!   secret: ${WARDEN_SECRET}
//!   max_age: 1h
//!   reissue_time: 10m
//! cookie:
//!   name: AUTH_TKT
//!   secure: true
//! acl:
//!   context: naive
//!   rules:
//!     - effect: deny
//!       principal: { group: suspended }
//!       permissions: [view, edit]
//!     - effect: allow
//!       principal: authenticated_user
//!       permissions: [view]
//! groups:
//!   identities:
//!     alice: [editors]
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod error;
pub mod loader;
pub mod schema;

pub use error::{ConfigError, ConfigResult};
pub use loader::{load_config, load_config_str, ConfigFormat, ConfigLoader};
pub use schema::{
    AclConfig, CookieConfig, GroupsConfig, LogFormat, LogLevel, LoggingConfig, SameSite,
    SecretEncoding, SecretValue, TicketSection, WardenConfig,
};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
