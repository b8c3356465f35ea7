// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Ordered allow/deny access control lists.
//!
//! A rule list is evaluated first-match-wins in its original order: the first
//! rule whose principal the caller holds and which governs the requested
//! permission decides. No match denies. Placement, not specificity, gives a
//! rule precedence, so exceptions must come before the grants they override.
//!
//! # Example
//!
//! ```
//! use warden_core::acl::{AclContext, AclContextKind, AclRule, Principal};
//! use warden_core::groups::EffectiveGroups;
//!
//! let rules = vec![
//!     AclRule::deny(Principal::group("contractors"), ["deploy"]).unwrap(),
//!     AclRule::allow(Principal::AuthenticatedUser, ["deploy", "view"]).unwrap(),
//! ];
//! let context = AclContextKind::Compiled.build(rules);
//!
//! let groups = EffectiveGroups::from_iter([
//!     Principal::Everyone,
//!     Principal::AuthenticatedUser,
//!     Principal::group("contractors"),
//! ]);
//! assert!(context.permit(None, Some(&groups), "view"));
//! assert!(!context.permit(None, Some(&groups), "deploy"));
//! ```

mod context;
mod principal;
mod rule;

pub use context::{AclContext, AclContextKind, CompiledAclContext, NaiveAclContext};
pub use principal::{Effect, Principal};
pub use rule::{build_rules, AclRule};
