// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Ticket issuance, validation and reissue.

use std::fmt;
use std::net::IpAddr;

use thiserror::Error;

use super::codec::{self, Signer};
use super::config::{DigestAlgorithm, TicketConfig};
use super::unix_now;
use crate::error::{TicketError, TicketResult};

// =============================================================================
// Ticket
// =============================================================================

/// A decoded ticket whose signature has been verified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    /// The authenticated subject.
    pub identity: String,
    /// Issue time in seconds since the Unix epoch.
    pub issue_time: u64,
    /// Maximum age configured on the issuing policy.
    pub max_age: u64,
    /// Reissue threshold configured on the issuing policy.
    pub reissue_time: Option<u64>,
}

impl Ticket {
    /// Seconds elapsed since issuance.
    pub fn age_at(&self, now: u64) -> u64 {
        now.saturating_sub(self.issue_time)
    }

    /// Seconds of validity left.
    pub fn remaining_at(&self, now: u64) -> u64 {
        self.max_age.saturating_sub(self.age_at(now))
    }

    /// Time after which the ticket no longer validates.
    pub fn expires_at(&self) -> u64 {
        self.issue_time.saturating_add(self.max_age)
    }

    /// Returns `true` once the remaining life drops below the reissue threshold.
    pub fn needs_reissue_at(&self, now: u64) -> bool {
        self.reissue_time
            .is_some_and(|threshold| self.remaining_at(now) < threshold)
    }
}

// =============================================================================
// TicketRejection
// =============================================================================

/// Why a presented token did not yield an identity.
///
/// Rejections are reported for diagnostics only; callers of
/// [`TicketPolicy::validate`] just see `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TicketRejection {
    /// The token does not parse.
    #[error("malformed ticket")]
    Malformed,
    /// The signature does not match.
    #[error("bad ticket signature")]
    BadSignature,
    /// The ticket is older than `max_age`.
    #[error("ticket expired")]
    Expired,
    /// The ticket claims an issue time beyond the tolerated clock skew.
    #[error("ticket issued in the future")]
    FromFuture,
    /// The policy binds tickets to a client address but none was available.
    #[error("client address unavailable")]
    MissingClientIp,
}

impl TicketRejection {
    /// Returns the rejection reason for logging.
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketRejection::Malformed => "malformed",
            TicketRejection::BadSignature => "bad_signature",
            TicketRejection::Expired => "expired",
            TicketRejection::FromFuture => "from_future",
            TicketRejection::MissingClientIp => "missing_client_ip",
        }
    }
}

// =============================================================================
// TicketPolicy
// =============================================================================

/// Signs, validates and refreshes identity tickets.
///
/// The policy is immutable after construction and holds no per-ticket state,
/// so a single instance can serve concurrent requests. Reissue starts a new
/// `max_age` window from the reissue time, which makes the session sliding
/// for as long as the client keeps presenting the ticket.
#[derive(Clone)]
pub struct TicketPolicy {
    signer: Signer,
    max_age: u64,
    reissue_time: Option<u64>,
    include_ip: bool,
    clock_skew: u64,
}

impl TicketPolicy {
    /// Creates a policy, failing fast on misconfiguration.
    pub fn new(config: TicketConfig) -> TicketResult<Self> {
        config.validate()?;
        let signer = Signer::new(config.digest, &config.secret)?;

        tracing::debug!(
            max_age = config.max_age,
            reissue_time = ?config.reissue_time,
            include_ip = config.include_ip,
            digest = %config.digest,
            clock_skew = config.clock_skew,
            "Ticket policy created"
        );

        Ok(Self {
            signer,
            max_age: config.max_age,
            reissue_time: config.reissue_time,
            include_ip: config.include_ip,
            clock_skew: config.clock_skew,
        })
    }

    /// Returns the maximum ticket age in seconds.
    pub fn max_age(&self) -> u64 {
        self.max_age
    }

    /// Returns the reissue threshold in seconds.
    pub fn reissue_time(&self) -> Option<u64> {
        self.reissue_time
    }

    /// Returns `true` if tickets are bound to the client IP.
    pub fn include_ip(&self) -> bool {
        self.include_ip
    }

    /// Returns the tolerated clock skew in seconds.
    pub fn clock_skew(&self) -> u64 {
        self.clock_skew
    }

    /// Returns the signing digest.
    pub fn digest(&self) -> DigestAlgorithm {
        self.signer.digest()
    }

    // -------------------------------------------------------------------------
    // Issue
    // -------------------------------------------------------------------------

    /// Issues a ticket for `identity` at the current time.
    pub fn issue(&self, identity: &str) -> TicketResult<String> {
        self.issue_at(identity, unix_now())
    }

    /// Issues a ticket for `identity` at `now`.
    pub fn issue_at(&self, identity: &str, now: u64) -> TicketResult<String> {
        self.issue_for(identity, None, now)
    }

    /// Issues a ticket for `identity` presented from `client_ip` at `now`.
    ///
    /// The address is ignored unless the policy includes the client IP, in
    /// which case it is required.
    pub fn issue_for(
        &self,
        identity: &str,
        client_ip: Option<IpAddr>,
        now: u64,
    ) -> TicketResult<String> {
        if identity.is_empty() {
            return Err(TicketError::EmptyIdentity);
        }
        let ip = self.bound_ip(client_ip).ok_or(TicketError::MissingClientIp)?;
        let signature = self.signer.sign(now, ip, identity);
        Ok(codec::encode(&signature, now, identity))
    }

    // -------------------------------------------------------------------------
    // Validate
    // -------------------------------------------------------------------------

    /// Decodes and verifies `token`, reporting why it was rejected.
    ///
    /// An issue time at most `clock_skew` seconds ahead of `now` counts as
    /// age zero.
    pub fn inspect_for(
        &self,
        token: &str,
        client_ip: Option<IpAddr>,
        now: u64,
    ) -> Result<Ticket, TicketRejection> {
        let ip = self
            .bound_ip(client_ip)
            .ok_or(TicketRejection::MissingClientIp)?;
        let raw = codec::decode(token, self.signer.digest()).ok_or(TicketRejection::Malformed)?;

        if !self
            .signer
            .verify(&raw.signature, raw.issue_time, ip, &raw.identity)
        {
            return Err(TicketRejection::BadSignature);
        }
        if raw.issue_time > now.saturating_add(self.clock_skew) {
            return Err(TicketRejection::FromFuture);
        }
        if now.saturating_sub(raw.issue_time) > self.max_age {
            return Err(TicketRejection::Expired);
        }

        Ok(Ticket {
            identity: raw.identity,
            issue_time: raw.issue_time,
            max_age: self.max_age,
            reissue_time: self.reissue_time,
        })
    }

    /// Decodes and verifies `token` at `now` without a client address.
    pub fn inspect_at(&self, token: &str, now: u64) -> Result<Ticket, TicketRejection> {
        self.inspect_for(token, None, now)
    }

    /// Returns the identity carried by a valid `token`.
    pub fn validate(&self, token: &str) -> Option<String> {
        self.validate_at(token, unix_now())
    }

    /// Returns the identity carried by `token` if it is valid at `now`.
    pub fn validate_at(&self, token: &str, now: u64) -> Option<String> {
        self.validate_for(token, None, now)
    }

    /// Returns the identity carried by `token` if it is valid at `now` when
    /// presented from `client_ip`.
    pub fn validate_for(&self, token: &str, client_ip: Option<IpAddr>, now: u64) -> Option<String> {
        self.checked(token, client_ip, now).map(|ticket| ticket.identity)
    }

    // -------------------------------------------------------------------------
    // Reissue
    // -------------------------------------------------------------------------

    /// Returns `true` if a valid `token` should be replaced now.
    pub fn should_reissue(&self, token: &str) -> bool {
        self.should_reissue_at(token, unix_now())
    }

    /// Returns `true` if `token` is valid at `now` and its remaining life is
    /// below the reissue threshold.
    pub fn should_reissue_at(&self, token: &str, now: u64) -> bool {
        self.should_reissue_for(token, None, now)
    }

    /// Address-bound form of [`should_reissue_at`](Self::should_reissue_at).
    pub fn should_reissue_for(&self, token: &str, client_ip: Option<IpAddr>, now: u64) -> bool {
        self.checked(token, client_ip, now)
            .is_some_and(|ticket| ticket.needs_reissue_at(now))
    }

    /// Returns a fresh token for the same identity when `token` is due for
    /// reissue at `now`.
    pub fn reissue_at(&self, token: &str, now: u64) -> Option<String> {
        self.reissue_for(token, None, now)
    }

    /// Address-bound form of [`reissue_at`](Self::reissue_at).
    pub fn reissue_for(&self, token: &str, client_ip: Option<IpAddr>, now: u64) -> Option<String> {
        let ticket = self.checked(token, client_ip, now)?;
        if !ticket.needs_reissue_at(now) {
            return None;
        }
        tracing::debug!(
            identity = %ticket.identity,
            age = ticket.age_at(now),
            "Reissuing ticket"
        );
        self.issue_for(&ticket.identity, client_ip, now).ok()
    }

    /// Forgetting a ticket is the caller's job: it stops presenting or
    /// storing the token. The policy keeps no revocation list, so this does
    /// nothing and exists to mark the lifecycle step.
    pub fn revoke_signal(&self) {}

    fn checked(&self, token: &str, client_ip: Option<IpAddr>, now: u64) -> Option<Ticket> {
        match self.inspect_for(token, client_ip, now) {
            Ok(ticket) => Some(ticket),
            Err(rejection) => {
                tracing::debug!(reason = rejection.as_str(), "Ticket rejected");
                None
            }
        }
    }

    /// Address that enters the signature. `None` when the policy requires an
    /// address that was not supplied.
    fn bound_ip(&self, client_ip: Option<IpAddr>) -> Option<Option<IpAddr>> {
        if !self.include_ip {
            return Some(None);
        }
        client_ip.map(Some)
    }
}

impl fmt::Debug for TicketPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TicketPolicy")
            .field("digest", &self.signer.digest())
            .field("max_age", &self.max_age)
            .field("reissue_time", &self.reissue_time)
            .field("include_ip", &self.include_ip)
            .field("clock_skew", &self.clock_skew)
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
