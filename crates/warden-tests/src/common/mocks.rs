// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Mock Implementations
//!
//! Stand-ins for the external seams: the group lookup and the
//! authentication policy.

use std::net::IpAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use warden_core::{AuthPolicy, GroupSource, StaticGroups, TicketError, TicketResult};

// =============================================================================
// RecordingGroupSource
// =============================================================================

/// Group source that records every lookup before delegating.
#[derive(Debug, Clone)]
pub struct RecordingGroupSource {
    inner: Arc<StaticGroups>,
    lookups: Arc<Mutex<Vec<Option<String>>>>,
}

impl RecordingGroupSource {
    /// Wraps `inner`.
    pub fn new(inner: StaticGroups) -> Self {
        Self {
            inner: Arc::new(inner),
            lookups: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Identities looked up so far, in order.
    pub fn lookups(&self) -> Vec<Option<String>> {
        self.lookups.lock().clone()
    }

    /// Number of lookups so far.
    pub fn lookup_count(&self) -> usize {
        self.lookups.lock().len()
    }
}

#[async_trait]
impl GroupSource for RecordingGroupSource {
    async fn groups(&self, identity: Option<&str>) -> Option<Vec<String>> {
        self.lookups.lock().push(identity.map(str::to_owned));
        self.inner.groups(identity).await
    }
}

// =============================================================================
// MockAuthPolicy
// =============================================================================

/// Authentication policy accepting `mock:<identity>` tokens.
///
/// Every valid token is due for reissue while `reissue` is set.
#[derive(Debug, Default)]
pub struct MockAuthPolicy {
    reissue: AtomicBool,
    issued: Mutex<Vec<String>>,
    validations: AtomicUsize,
}

impl MockAuthPolicy {
    /// Token prefix.
    pub const PREFIX: &'static str = "mock:";

    /// Creates a policy that never asks for reissue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a policy that reissues every valid token.
    pub fn reissuing() -> Self {
        let policy = Self::default();
        policy.set_reissue(true);
        policy
    }

    /// Toggles reissue.
    pub fn set_reissue(&self, reissue: bool) {
        self.reissue.store(reissue, Ordering::SeqCst);
    }

    /// Builds the token `issue` would return for `identity`.
    pub fn token(identity: &str) -> String {
        format!("{}{}", Self::PREFIX, identity)
    }

    /// Identities issued so far, in order.
    pub fn issued(&self) -> Vec<String> {
        self.issued.lock().clone()
    }

    /// Number of `validate` calls so far.
    pub fn validation_count(&self) -> usize {
        self.validations.load(Ordering::SeqCst)
    }
}

impl AuthPolicy for MockAuthPolicy {
    fn issue(&self, identity: &str, _client_ip: Option<IpAddr>) -> TicketResult<String> {
        if identity.is_empty() {
            return Err(TicketError::EmptyIdentity);
        }
        self.issued.lock().push(identity.to_string());
        Ok(Self::token(identity))
    }

    fn validate(&self, token: &str, _client_ip: Option<IpAddr>) -> Option<String> {
        self.validations.fetch_add(1, Ordering::SeqCst);
        token
            .strip_prefix(Self::PREFIX)
            .filter(|identity| !identity.is_empty())
            .map(str::to_owned)
    }

    fn should_reissue(&self, token: &str, client_ip: Option<IpAddr>) -> bool {
        self.reissue.load(Ordering::SeqCst) && self.validate(token, client_ip).is_some()
    }

    fn max_age(&self) -> u64 {
        60
    }
}
