// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # warden Integration Tests
//!
//! Shared fixtures and mocks plus the cross-crate test suites.
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p warden-tests
//! cargo test -p warden-tests --test integration_ticket
//! cargo test -p warden-tests --test integration_acl
//! cargo test -p warden-tests --test integration_config
//! cargo test -p warden-tests --test integration_api
//! ```
//!
//! ## Test Categories
//!
//! ### Ticket Tests (`integration_ticket.rs`)
//! - Issue / validate round trips and expiry boundaries
//! - Reissue threshold and sliding window
//! - Client IP binding, digest and secret mismatches
//!
//! ### ACL Tests (`integration_acl.rs`)
//! - First-match-wins ordering and default deny
//! - Naive / compiled equivalence over every group combination
//! - Authorization policies with static and async group lookups
//!
//! ### Config Tests (`integration_config.rs`)
//! - YAML, TOML and JSON files
//! - Fail-fast validation of tickets and rules
//!
//! ### API Tests (`integration_api.rs`)
//! - Full axum router with ticket and ACL layers

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod common;

/// Re-export commonly used items for convenience.
pub mod prelude {
    pub use crate::common::fixtures::*;
    pub use crate::common::mocks::*;
    pub use crate::common::{init_test_logging, temp_test_dir};
}
