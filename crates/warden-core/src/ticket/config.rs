// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Ticket policy configuration.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{TicketError, TicketResult};

/// Secrets shorter than this are accepted but logged as weak.
pub const RECOMMENDED_SECRET_LEN: usize = 16;

/// Default tolerance, in seconds, for tickets stamped ahead of the local clock.
pub const DEFAULT_CLOCK_SKEW: u64 = 60;

// =============================================================================
// DigestAlgorithm
// =============================================================================

/// HMAC digest used to sign tickets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DigestAlgorithm {
    /// HMAC-SHA-256.
    #[default]
    Sha256,
    /// HMAC-SHA-512.
    Sha512,
}

impl DigestAlgorithm {
    /// Returns the algorithm name.
    pub fn as_str(&self) -> &'static str {
        match self {
            DigestAlgorithm::Sha256 => "sha256",
            DigestAlgorithm::Sha512 => "sha512",
        }
    }

    /// Returns the raw signature length in bytes.
    pub fn output_len(&self) -> usize {
        match self {
            DigestAlgorithm::Sha256 => 32,
            DigestAlgorithm::Sha512 => 64,
        }
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DigestAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "").as_str() {
            "sha256" => Ok(DigestAlgorithm::Sha256),
            "sha512" => Ok(DigestAlgorithm::Sha512),
            _ => Err(format!("Unknown digest algorithm: {}", s)),
        }
    }
}

impl<'de> Deserialize<'de> for DigestAlgorithm {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// TicketConfig
// =============================================================================

/// Configuration fixed at ticket policy construction.
#[derive(Clone)]
pub struct TicketConfig {
    /// Signing secret.
    pub secret: Vec<u8>,
    /// Seconds after issuance a ticket stays valid.
    pub max_age: u64,
    /// Remaining-life threshold (seconds) below which a ticket is reissued.
    /// `None` disables reissue.
    pub reissue_time: Option<u64>,
    /// Bind tickets to the client IP address.
    pub include_ip: bool,
    /// HMAC digest.
    pub digest: DigestAlgorithm,
    /// Seconds a ticket's issue time may lie ahead of the validating clock.
    pub clock_skew: u64,
}

impl TicketConfig {
    /// Creates a configuration with the given secret and maximum age in seconds.
    pub fn new(secret: impl AsRef<[u8]>, max_age: u64) -> Self {
        Self {
            secret: secret.as_ref().to_vec(),
            max_age,
            reissue_time: None,
            include_ip: false,
            digest: DigestAlgorithm::default(),
            clock_skew: DEFAULT_CLOCK_SKEW,
        }
    }

    /// Sets the maximum age.
    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = max_age.as_secs();
        self
    }

    /// Sets the reissue threshold in seconds.
    pub fn with_reissue_time(mut self, reissue_time: u64) -> Self {
        self.reissue_time = Some(reissue_time);
        self
    }

    /// Binds issued tickets to the client IP address.
    pub fn with_include_ip(mut self, include_ip: bool) -> Self {
        self.include_ip = include_ip;
        self
    }

    /// Sets the digest algorithm.
    pub fn with_digest(mut self, digest: DigestAlgorithm) -> Self {
        self.digest = digest;
        self
    }

    /// Sets the tolerance for issue times ahead of the local clock.
    pub fn with_clock_skew(mut self, clock_skew: u64) -> Self {
        self.clock_skew = clock_skew;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> TicketResult<()> {
        if self.secret.is_empty() {
            return Err(TicketError::MissingSecret);
        }
        if self.secret.len() < RECOMMENDED_SECRET_LEN {
            tracing::warn!(
                len = self.secret.len(),
                recommended = RECOMMENDED_SECRET_LEN,
                "Ticket secret is shorter than recommended"
            );
        }
        if self.max_age == 0 {
            return Err(TicketError::invalid_duration(
                "max_age",
                "must be greater than zero",
            ));
        }
        if let Some(reissue_time) = self.reissue_time {
            if reissue_time > self.max_age {
                return Err(TicketError::invalid_duration(
                    "reissue_time",
                    format!(
                        "{}s exceeds max_age of {}s",
                        reissue_time, self.max_age
                    ),
                ));
            }
        }
        Ok(())
    }
}

impl fmt::Debug for TicketConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TicketConfig")
            .field("secret", &"***")
            .field("max_age", &self.max_age)
            .field("reissue_time", &self.reissue_time)
            .field("include_ip", &self.include_ip)
            .field("digest", &self.digest)
            .field("clock_skew", &self.clock_skew)
            .finish()
    }
}
