// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! ACL contexts.
//!
//! Both contexts evaluate first-match-wins over the rules in their original
//! order and deny when nothing matches. They differ only in representation.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::principal::{Effect, Principal};
use super::rule::AclRule;
use crate::groups::EffectiveGroups;

// =============================================================================
// AclContext
// =============================================================================

/// Answers permission queries against an ordered rule list.
pub trait AclContext: Send + Sync + fmt::Debug {
    /// Returns `true` if `groups` is granted `permission`.
    ///
    /// `groups` of `None` means the caller is explicitly forbidden and always
    /// denies. `identity` is available to custom contexts; the built-in ones
    /// decide on `groups` alone, which already carries the identity.
    fn permit(
        &self,
        identity: Option<&str>,
        groups: Option<&EffectiveGroups>,
        permission: &str,
    ) -> bool;

    /// Number of source rules.
    fn len(&self) -> usize;

    /// Returns `true` if the context holds no rules.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Representation used by this context.
    fn kind(&self) -> AclContextKind;
}

// =============================================================================
// NaiveAclContext
// =============================================================================

/// Linear scan over the stored rule list.
#[derive(Debug, Clone, Default)]
pub struct NaiveAclContext {
    rules: Vec<AclRule>,
}

impl NaiveAclContext {
    /// Creates a context over `rules`, kept in the given order.
    pub fn new(rules: Vec<AclRule>) -> Self {
        Self { rules }
    }

    /// Returns the rules in evaluation order.
    pub fn rules(&self) -> &[AclRule] {
        &self.rules
    }
}

impl AclContext for NaiveAclContext {
    fn permit(
        &self,
        _identity: Option<&str>,
        groups: Option<&EffectiveGroups>,
        permission: &str,
    ) -> bool {
        let Some(groups) = groups else {
            return false;
        };
        self.rules
            .iter()
            .find(|rule| rule.is_relevant(groups, permission))
            .is_some_and(|rule| rule.effect().is_allow())
    }

    fn len(&self) -> usize {
        self.rules.len()
    }

    fn kind(&self) -> AclContextKind {
        AclContextKind::Naive
    }
}

// =============================================================================
// CompiledAclContext
// =============================================================================

#[derive(Debug, Clone)]
struct CompiledEntry {
    position: usize,
    effect: Effect,
    permissions: HashSet<String>,
}

/// Rules indexed by principal.
///
/// Each principal keeps its entries in source order together with their
/// original position. A query takes the earliest relevant entry for every
/// principal the caller holds and then the earliest of those, which is the
/// rule a linear scan would have stopped at.
#[derive(Debug, Clone, Default)]
pub struct CompiledAclContext {
    index: HashMap<Principal, Vec<CompiledEntry>>,
    len: usize,
}

impl CompiledAclContext {
    /// Compiles `rules`.
    pub fn new(rules: Vec<AclRule>) -> Self {
        let len = rules.len();
        let mut index: HashMap<Principal, Vec<CompiledEntry>> = HashMap::new();

        for (position, rule) in rules.into_iter().enumerate() {
            let effect = rule.effect();
            let principal = rule.principal().clone();
            let permissions = rule.permissions().iter().cloned().collect();
            index.entry(principal).or_default().push(CompiledEntry {
                position,
                effect,
                permissions,
            });
        }

        tracing::trace!(rules = len, principals = index.len(), "ACL context compiled");
        Self { index, len }
    }

    /// Number of distinct principals referenced by the rules.
    pub fn principal_count(&self) -> usize {
        self.index.len()
    }
}

impl AclContext for CompiledAclContext {
    fn permit(
        &self,
        _identity: Option<&str>,
        groups: Option<&EffectiveGroups>,
        permission: &str,
    ) -> bool {
        let Some(groups) = groups else {
            return false;
        };
        groups
            .iter()
            .filter_map(|principal| self.index.get(principal))
            .filter_map(|entries| {
                entries
                    .iter()
                    .find(|entry| entry.permissions.contains(permission))
            })
            .min_by_key(|entry| entry.position)
            .is_some_and(|entry| entry.effect.is_allow())
    }

    fn len(&self) -> usize {
        self.len
    }

    fn kind(&self) -> AclContextKind {
        AclContextKind::Compiled
    }
}

// =============================================================================
// AclContextKind
// =============================================================================

/// Context representation selected at configuration time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AclContextKind {
    /// [`NaiveAclContext`].
    #[default]
    Naive,
    /// [`CompiledAclContext`].
    Compiled,
}

impl AclContextKind {
    /// Builds a shared context of this kind.
    pub fn build(self, rules: Vec<AclRule>) -> Arc<dyn AclContext> {
        match self {
            AclContextKind::Naive => Arc::new(NaiveAclContext::new(rules)),
            AclContextKind::Compiled => Arc::new(CompiledAclContext::new(rules)),
        }
    }

    /// Returns the kind name.
    pub fn as_str(&self) -> &'static str {
        match self {
            AclContextKind::Naive => "naive",
            AclContextKind::Compiled => "compiled",
        }
    }
}

impl fmt::Display for AclContextKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AclContextKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "naive" => Ok(AclContextKind::Naive),
            "compiled" | "precompiled" => Ok(AclContextKind::Compiled),
            _ => Err(format!("Unknown ACL context kind: {}", s)),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
