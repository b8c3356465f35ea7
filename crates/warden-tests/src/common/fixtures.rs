// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Test Fixtures
//!
//! Pre-built test data for consistent and reproducible testing.

use std::path::{Path, PathBuf};

use warden_core::{
    resolve_groups, AclRule, DigestAlgorithm, EffectiveGroups, Principal, TicketConfig,
    TicketPolicy,
};

// =============================================================================
// Ticket Fixtures
// =============================================================================

/// Fixture providing ticket policies.
pub struct TicketFixtures;

impl TicketFixtures {
    /// Signing secret shared by the fixtures.
    pub const SECRET: &'static [u8] = b"integration-test-secret-0123456789";

    /// A fixed point in time.
    pub const NOW: u64 = 1_700_000_000;

    /// Ticket lifetime used by the fixtures.
    pub const MAX_AGE: u64 = 120;

    /// Reissue threshold used by the fixtures.
    pub const REISSUE_TIME: u64 = 30;

    /// Base configuration.
    pub fn config() -> TicketConfig {
        TicketConfig::new(Self::SECRET, Self::MAX_AGE)
    }

    /// Policy without reissue.
    pub fn policy() -> TicketPolicy {
        TicketPolicy::new(Self::config()).expect("fixture policy")
    }

    /// Policy with reissue enabled.
    pub fn reissuing_policy() -> TicketPolicy {
        TicketPolicy::new(Self::config().with_reissue_time(Self::REISSUE_TIME))
            .expect("fixture policy")
    }

    /// Policy binding tickets to the client IP.
    pub fn ip_bound_policy() -> TicketPolicy {
        TicketPolicy::new(Self::config().with_include_ip(true)).expect("fixture policy")
    }

    /// Policy signing with SHA-512.
    pub fn sha512_policy() -> TicketPolicy {
        TicketPolicy::new(Self::config().with_digest(DigestAlgorithm::Sha512))
            .expect("fixture policy")
    }
}

// =============================================================================
// ACL Fixtures
// =============================================================================

/// Fixture providing rule lists and group sets.
pub struct AclFixtures;

impl AclFixtures {
    /// Four rules over groups `g0` / `g1` and permissions `t0`..`t2`.
    pub fn scenario_rules() -> Vec<AclRule> {
        vec![
            AclRule::allow(Principal::group("g0"), ["t0", "t2"]).expect("rule"),
            AclRule::deny(Principal::group("g1"), ["t1"]).expect("rule"),
            AclRule::allow(Principal::group("g0"), ["t1", "t0"]).expect("rule"),
            AclRule::allow(Principal::group("g1"), ["t1", "t0"]).expect("rule"),
        ]
    }

    /// A broad grant followed by a narrow exception, optionally reversed.
    pub fn ordering_rules(reversed: bool) -> Vec<AclRule> {
        let mut rules = vec![
            AclRule::allow(Principal::Everyone, ["x"]).expect("rule"),
            AclRule::deny(Principal::group("g1"), ["x"]).expect("rule"),
        ];
        if reversed {
            rules.reverse();
        }
        rules
    }

    /// A typical editorial site.
    pub fn site_rules() -> Vec<AclRule> {
        vec![
            AclRule::deny(Principal::group("suspended"), ["view", "edit", "admin"]).expect("rule"),
            AclRule::allow(Principal::identity("root"), ["admin"]).expect("rule"),
            AclRule::allow(Principal::group("editors"), ["edit"]).expect("rule"),
            AclRule::allow(Principal::AuthenticatedUser, ["view"]).expect("rule"),
            AclRule::allow(Principal::Everyone, ["public"]).expect("rule"),
        ]
    }

    /// Effective groups for an anonymous caller holding `groups`.
    pub fn groups(groups: &[&str]) -> EffectiveGroups {
        resolve_groups(None, Some(groups.iter().copied())).expect("groups")
    }

    /// Effective groups for `identity` holding `groups`.
    pub fn identity_groups(identity: &str, groups: &[&str]) -> EffectiveGroups {
        resolve_groups(Some(identity), Some(groups.iter().copied())).expect("groups")
    }
}

// =============================================================================
// Config Fixtures
// =============================================================================

/// Fixture providing configuration documents.
pub struct ConfigFixtures;

impl ConfigFixtures {
    /// Full YAML configuration.
    pub fn yaml() -> &'static str {
        r#"
ticket:
  secret: integration-config-secret-0123
  max_age: 2m
  reissue_time: 30s
  digest: sha512
cookie:
  name: site_tkt
  secure: true
acl:
  context: compiled
  rules:
    - effect: deny
      principal: { group: suspended }
      permissions: [view, edit]
    - effect: allow
      principal: { group: editors }
      permissions: [edit]
    - effect: allow
      principal: authenticated_user
      permissions: [view]
groups:
  identities:
    alice: [editors]
    eve: [editors, suspended]
  forbidden: [mallory]
logging:
  level: debug
  format: json
"#
    }

    /// The same configuration as TOML.
    pub fn toml() -> &'static str {
        r#"
[ticket]
secret = "integration-config-secret-0123"
max_age = "2m"
reissue_time = "30s"
digest = "sha512"

[cookie]
name = "site_tkt"
secure = true

[acl]
context = "compiled"

[[acl.rules]]
effect = "deny"
principal = { group = "suspended" }
permissions = ["view", "edit"]

[[acl.rules]]
effect = "allow"
principal = { group = "editors" }
permissions = ["edit"]

[[acl.rules]]
effect = "allow"
principal = "authenticated_user"
permissions = ["view"]

[groups]
forbidden = ["mallory"]

[groups.identities]
alice = ["editors"]
eve = ["editors", "suspended"]

[logging]
level = "debug"
format = "json"
"#
    }

    /// The same configuration as JSON.
    pub fn json() -> &'static str {
        r#"{
  "ticket": {
    "secret": "integration-config-secret-0123",
    "max_age": "2m",
    "reissue_time": "30s",
    "digest": "sha512"
  },
  "cookie": { "name": "site_tkt", "secure": true },
  "acl": {
    "context": "compiled",
    "rules": [
      { "effect": "deny", "principal": { "group": "suspended" }, "permissions": ["view", "edit"] },
      { "effect": "allow", "principal": { "group": "editors" }, "permissions": ["edit"] },
      { "effect": "allow", "principal": "authenticated_user", "permissions": ["view"] }
    ]
  },
  "groups": {
    "identities": { "alice": ["editors"], "eve": ["editors", "suspended"] },
    "forbidden": ["mallory"]
  },
  "logging": { "level": "debug", "format": "json" }
}"#
    }

    /// Writes `content` to `name` inside `dir`.
    pub fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).expect("Failed to write config fixture");
        path
    }
}
