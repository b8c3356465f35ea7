// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Rule principals and effects.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AclError;

// =============================================================================
// Principal
// =============================================================================

/// Subject a rule applies to.
///
/// The two pseudo-groups are tags, never strings, so a real group literally
/// named `everyone` does not collide with [`Principal::Everyone`]. The
/// authenticated identity is also kept apart from group names.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "PrincipalRepr", into = "PrincipalRepr")]
pub enum Principal {
    /// Every request, authenticated or not.
    Everyone,
    /// Every request carrying an authenticated identity.
    AuthenticatedUser,
    /// A named group returned by the group lookup.
    Group(String),
    /// A single authenticated identity.
    Identity(String),
}

impl Principal {
    /// Keyword for [`Principal::Everyone`].
    pub const EVERYONE: &'static str = "everyone";
    /// Keyword for [`Principal::AuthenticatedUser`].
    pub const AUTHENTICATED_USER: &'static str = "authenticated_user";

    /// Creates a group principal.
    pub fn group(name: impl Into<String>) -> Self {
        Principal::Group(name.into())
    }

    /// Creates an identity principal.
    pub fn identity(name: impl Into<String>) -> Self {
        Principal::Identity(name.into())
    }

    /// Returns `true` for the two pseudo-groups.
    pub fn is_reserved(&self) -> bool {
        matches!(self, Principal::Everyone | Principal::AuthenticatedUser)
    }

    /// Returns the group or identity name.
    pub fn name(&self) -> Option<&str> {
        match self {
            Principal::Group(name) | Principal::Identity(name) => Some(name),
            _ => None,
        }
    }

    /// Checks that named principals are not empty.
    pub fn validate(&self) -> Result<(), AclError> {
        match self.name() {
            Some(name) if name.is_empty() => Err(AclError::EmptyPrincipal),
            _ => Ok(()),
        }
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Principal::Everyone => f.write_str(Self::EVERYONE),
            Principal::AuthenticatedUser => f.write_str(Self::AUTHENTICATED_USER),
            Principal::Group(name) => write!(f, "group:{}", name),
            Principal::Identity(name) => write!(f, "identity:{}", name),
        }
    }
}

/// Parses the display form: `everyone`, `authenticated_user`, `group:<name>`
/// or `identity:<name>`.
impl FromStr for Principal {
    type Err = AclError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let principal = if let Some(name) = s.strip_prefix("group:") {
            Principal::group(name)
        } else if let Some(name) = s.strip_prefix("identity:") {
            Principal::identity(name)
        } else {
            reserved(s)?
        };
        principal.validate()?;
        Ok(principal)
    }
}

fn reserved(keyword: &str) -> Result<Principal, AclError> {
    match keyword.to_ascii_lowercase().as_str() {
        Principal::EVERYONE => Ok(Principal::Everyone),
        Principal::AUTHENTICATED_USER => Ok(Principal::AuthenticatedUser),
        _ => Err(AclError::unknown_principal(keyword)),
    }
}

/// Configuration form: a bare keyword for pseudo-groups, a single-key map
/// for names.
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum PrincipalRepr {
    Reserved(String),
    Group { group: String },
    Identity { identity: String },
}

impl TryFrom<PrincipalRepr> for Principal {
    type Error = AclError;

    fn try_from(repr: PrincipalRepr) -> Result<Self, Self::Error> {
        let principal = match repr {
            PrincipalRepr::Reserved(keyword) => reserved(&keyword)?,
            PrincipalRepr::Group { group } => Principal::Group(group),
            PrincipalRepr::Identity { identity } => Principal::Identity(identity),
        };
        principal.validate()?;
        Ok(principal)
    }
}

impl From<Principal> for PrincipalRepr {
    fn from(principal: Principal) -> Self {
        match principal {
            Principal::Everyone => PrincipalRepr::Reserved(Principal::EVERYONE.to_string()),
            Principal::AuthenticatedUser => {
                PrincipalRepr::Reserved(Principal::AUTHENTICATED_USER.to_string())
            }
            Principal::Group(group) => PrincipalRepr::Group { group },
            Principal::Identity(identity) => PrincipalRepr::Identity { identity },
        }
    }
}

// =============================================================================
// Effect
// =============================================================================

/// Outcome of a matching rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Effect {
    /// Grant the permission.
    Allow,
    /// Refuse the permission.
    Deny,
}

impl Effect {
    /// Returns `true` for [`Effect::Allow`].
    pub fn is_allow(&self) -> bool {
        matches!(self, Effect::Allow)
    }

    /// Returns the effect name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Effect::Allow => "allow",
            Effect::Deny => "deny",
        }
    }
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Effect {
    type Err = AclError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "allow" => Ok(Effect::Allow),
            "deny" => Ok(Effect::Deny),
            _ => Err(AclError::unknown_effect(s)),
        }
    }
}

impl<'de> Deserialize<'de> for Effect {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
