// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! ACL rules.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::principal::{Effect, Principal};
use crate::error::{AclError, AclResult};
use crate::groups::EffectiveGroups;

/// An `(effect, principal, permissions)` rule.
///
/// Rules are always well-formed: the principal has a name where one is
/// required and the permission set is non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawRule")]
pub struct AclRule {
    effect: Effect,
    principal: Principal,
    permissions: BTreeSet<String>,
}

impl AclRule {
    /// Creates a rule.
    pub fn new<I, S>(effect: Effect, principal: Principal, permissions: I) -> AclResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        principal.validate()?;

        let permissions: BTreeSet<String> = permissions.into_iter().map(Into::into).collect();
        if permissions.is_empty() {
            return Err(AclError::EmptyPermissions {
                principal: principal.to_string(),
            });
        }
        if permissions.iter().any(String::is_empty) {
            return Err(AclError::EmptyPermission {
                principal: principal.to_string(),
            });
        }

        Ok(Self {
            effect,
            principal,
            permissions,
        })
    }

    /// Creates a rule from a textual effect, as found in rule tuples.
    pub fn parse<I, S>(effect: &str, principal: Principal, permissions: I) -> AclResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(effect.parse()?, principal, permissions)
    }

    /// Shorthand for an allow rule.
    pub fn allow<I, S>(principal: Principal, permissions: I) -> AclResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(Effect::Allow, principal, permissions)
    }

    /// Shorthand for a deny rule.
    pub fn deny<I, S>(principal: Principal, permissions: I) -> AclResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(Effect::Deny, principal, permissions)
    }

    /// Returns the effect.
    pub fn effect(&self) -> Effect {
        self.effect
    }

    /// Returns the principal.
    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    /// Returns the governed permissions.
    pub fn permissions(&self) -> &BTreeSet<String> {
        &self.permissions
    }

    /// Returns `true` if this rule governs `permission`.
    pub fn covers(&self, permission: &str) -> bool {
        self.permissions.contains(permission)
    }

    /// Returns `true` if the rule's principal is held and it governs `permission`.
    pub fn is_relevant(&self, groups: &EffectiveGroups, permission: &str) -> bool {
        groups.contains(&self.principal) && self.covers(permission)
    }
}

/// Builds a rule list, tagging errors with the rule position.
pub fn build_rules<I>(rules: I) -> AclResult<Vec<AclRule>>
where
    I: IntoIterator<Item = (String, Principal, Vec<String>)>,
{
    rules
        .into_iter()
        .enumerate()
        .map(|(index, (effect, principal, permissions))| {
            AclRule::parse(&effect, principal, permissions).map_err(|e| e.at_rule(index))
        })
        .collect()
}

#[derive(Deserialize)]
struct RawRule {
    effect: Effect,
    principal: Principal,
    permissions: Vec<String>,
}

impl TryFrom<RawRule> for AclRule {
    type Error = AclError;

    fn try_from(raw: RawRule) -> Result<Self, Self::Error> {
        AclRule::new(raw.effect, raw.principal, raw.permissions)
    }
}
