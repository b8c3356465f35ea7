// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # warden-core
//!
//! Request-scoped authentication and authorization engines for warden.
//!
//! This crate is framework-free. It provides:
//!
//! - **Ticket**: signed, time-bounded identity tickets with sliding reissue
//! - **ACL**: ordered allow/deny rule evaluation with a naive and a
//!   precompiled context representation
//! - **Groups**: effective group resolution (pseudo-groups plus identity)
//! - **Autz**: pluggable authorization policies built on top of ACL contexts
//! - **Error**: unified error hierarchy for construction-time misconfiguration
//!
//! Every operation is a pure function of its inputs plus configuration fixed
//! at construction, so policies and contexts can be shared freely behind an
//! `Arc` between concurrent requests.
//!
//! ## Example
//!
//! ```
//! use warden_core::acl::{AclContext, AclRule, Effect, NaiveAclContext, Principal};
//! use warden_core::groups::resolve_groups;
//! use warden_core::ticket::{TicketConfig, TicketPolicy};
//!
//! let policy = TicketPolicy::new(TicketConfig::new(b"0123456789abcdef", 900)).unwrap();
//! let token = policy.issue_at("alice", 1_700_000_000).unwrap();
//! let identity = policy.validate_at(&token, 1_700_000_060);
//! assert_eq!(identity.as_deref(), Some("alice"));
//!
//! let context = NaiveAclContext::new(vec![
//!     AclRule::new(Effect::Allow, Principal::AuthenticatedUser, ["view"]).unwrap(),
//! ]);
//!
//! let groups = resolve_groups(identity.as_deref(), Some(Vec::<String>::new()));
//! assert!(context.permit(identity.as_deref(), groups.as_ref(), "view"));
//! assert!(!context.permit(identity.as_deref(), groups.as_ref(), "edit"));
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]

// =============================================================================
// Modules
// =============================================================================

pub mod acl;
pub mod autz;
pub mod error;
pub mod groups;
pub mod ticket;

// =============================================================================
// Re-exports
// =============================================================================

pub use acl::{
    build_rules, AclContext, AclContextKind, AclRule, CompiledAclContext, Effect,
    NaiveAclContext, Principal,
};
pub use autz::{AclAutzPolicy, AutzPolicy};
pub use error::{AclError, AclResult, AutzError, AutzResult, TicketError, TicketResult, WardenError};
pub use groups::{resolve_groups, EffectiveGroups, GroupFn, GroupSource, StaticGroups};
pub use ticket::{
    unix_now, AuthPolicy, DigestAlgorithm, Ticket, TicketConfig, TicketPolicy, TicketRejection,
    DEFAULT_CLOCK_SKEW,
};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name.
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Convenience re-exports for common use cases.
pub mod prelude {
    pub use crate::acl::{AclContext, AclRule, Effect, Principal};
    pub use crate::autz::{AclAutzPolicy, AutzPolicy};
    pub use crate::groups::{resolve_groups, EffectiveGroups, GroupSource, StaticGroups};
    pub use crate::ticket::{AuthPolicy, TicketConfig, TicketPolicy};
}
