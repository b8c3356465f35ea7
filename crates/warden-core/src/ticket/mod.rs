// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Ticket authentication.
//!
//! A ticket is a signed, time-bounded token carrying an identity. The
//! [`TicketPolicy`] issues tickets, validates presented tokens (failing closed
//! on anything malformed, forged or expired) and decides when an aging ticket
//! should be replaced.
//!
//! Callers that want to swap the strategy program against [`AuthPolicy`].

mod codec;
mod config;
mod policy;

use std::net::IpAddr;

pub use config::{DigestAlgorithm, TicketConfig, DEFAULT_CLOCK_SKEW, RECOMMENDED_SECRET_LEN};
pub use policy::{Ticket, TicketPolicy, TicketRejection};

use crate::error::TicketResult;

/// Current time in seconds since the Unix epoch.
pub fn unix_now() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp()).unwrap_or(0)
}

// =============================================================================
// AuthPolicy
// =============================================================================

/// Pluggable authentication strategy used by request pipelines.
///
/// Implementations must be stateless per call; every method reads the clock
/// itself. `client_ip` is the peer address of the request, used only by
/// strategies that bind tokens to it.
pub trait AuthPolicy: Send + Sync {
    /// Issues a token for `identity`.
    fn issue(&self, identity: &str, client_ip: Option<IpAddr>) -> TicketResult<String>;

    /// Returns the identity carried by a valid token.
    fn validate(&self, token: &str, client_ip: Option<IpAddr>) -> Option<String>;

    /// Returns `true` if a valid token should be replaced.
    fn should_reissue(&self, token: &str, client_ip: Option<IpAddr>) -> bool;

    /// Lifetime of an issued token in seconds.
    fn max_age(&self) -> u64;

    /// Returns a replacement token when `token` is due for reissue.
    fn reissue(&self, token: &str, client_ip: Option<IpAddr>) -> Option<String> {
        if !self.should_reissue(token, client_ip) {
            return None;
        }
        let identity = self.validate(token, client_ip)?;
        self.issue(&identity, client_ip).ok()
    }
}

impl AuthPolicy for TicketPolicy {
    fn issue(&self, identity: &str, client_ip: Option<IpAddr>) -> TicketResult<String> {
        self.issue_for(identity, client_ip, unix_now())
    }

    fn validate(&self, token: &str, client_ip: Option<IpAddr>) -> Option<String> {
        self.validate_for(token, client_ip, unix_now())
    }

    fn should_reissue(&self, token: &str, client_ip: Option<IpAddr>) -> bool {
        self.should_reissue_for(token, client_ip, unix_now())
    }

    fn max_age(&self) -> u64 {
        TicketPolicy::max_age(self)
    }

    fn reissue(&self, token: &str, client_ip: Option<IpAddr>) -> Option<String> {
        self.reissue_for(token, client_ip, unix_now())
    }
}
