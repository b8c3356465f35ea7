// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Ticket wire format and signing.
//!
//! A token is three concatenated fields, all cookie-safe ASCII:
//!
//! ```text
//! hex(signature) | issue_time as 16 hex digits | base64url(identity), unpadded
//! ```
//!
//! The signature is an HMAC over `issue_time (u64 BE) | ip_len (u8) | ip | identity`,
//! where `ip_len` is 0, 4 or 16. Encoding is deterministic and parsing is strict:
//! only lowercase hex and canonical base64 are accepted.

use std::net::IpAddr;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::{Sha256, Sha512};
use subtle::ConstantTimeEq;

use super::config::DigestAlgorithm;
use crate::error::{TicketError, TicketResult};

/// Hex digits used for the issue time field.
const TIME_HEX_LEN: usize = 16;

// =============================================================================
// Signer
// =============================================================================

/// Keyed HMAC, built once per policy.
#[derive(Clone)]
pub(crate) enum Signer {
    Sha256(Hmac<Sha256>),
    Sha512(Hmac<Sha512>),
}

impl Signer {
    pub(crate) fn new(digest: DigestAlgorithm, secret: &[u8]) -> TicketResult<Self> {
        if secret.is_empty() {
            return Err(TicketError::MissingSecret);
        }
        let signer = match digest {
            DigestAlgorithm::Sha256 => Hmac::<Sha256>::new_from_slice(secret).map(Signer::Sha256),
            DigestAlgorithm::Sha512 => Hmac::<Sha512>::new_from_slice(secret).map(Signer::Sha512),
        };
        signer.map_err(|_| TicketError::MissingSecret)
    }

    pub(crate) fn digest(&self) -> DigestAlgorithm {
        match self {
            Signer::Sha256(_) => DigestAlgorithm::Sha256,
            Signer::Sha512(_) => DigestAlgorithm::Sha512,
        }
    }

    pub(crate) fn sign(&self, issue_time: u64, ip: Option<IpAddr>, identity: &str) -> Vec<u8> {
        match self {
            Signer::Sha256(mac) => compute(mac.clone(), issue_time, ip, identity),
            Signer::Sha512(mac) => compute(mac.clone(), issue_time, ip, identity),
        }
    }

    /// Constant-time signature check.
    pub(crate) fn verify(
        &self,
        signature: &[u8],
        issue_time: u64,
        ip: Option<IpAddr>,
        identity: &str,
    ) -> bool {
        let expected = self.sign(issue_time, ip, identity);
        expected.len() == signature.len() && bool::from(expected.ct_eq(signature))
    }
}

fn compute<M: Mac>(mut mac: M, issue_time: u64, ip: Option<IpAddr>, identity: &str) -> Vec<u8> {
    mac.update(&issue_time.to_be_bytes());
    match ip {
        None => mac.update(&[0]),
        Some(IpAddr::V4(v4)) => {
            mac.update(&[4]);
            mac.update(&v4.octets());
        }
        Some(IpAddr::V6(v6)) => {
            mac.update(&[16]);
            mac.update(&v6.octets());
        }
    }
    mac.update(identity.as_bytes());
    mac.finalize().into_bytes().to_vec()
}

// =============================================================================
// Encoding
// =============================================================================

/// Fields recovered from a well-formed token. The signature is unverified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RawTicket {
    pub signature: Vec<u8>,
    pub issue_time: u64,
    pub identity: String,
}

pub(crate) fn encode(signature: &[u8], issue_time: u64, identity: &str) -> String {
    let mut token = hex::encode(signature);
    token.push_str(&format!("{:016x}", issue_time));
    token.push_str(&URL_SAFE_NO_PAD.encode(identity.as_bytes()));
    token
}

/// Parses a token produced with the given digest. Returns `None` on any
/// structural deviation.
pub(crate) fn decode(token: &str, digest: DigestAlgorithm) -> Option<RawTicket> {
    let bytes = token.as_bytes();
    let sig_len = digest.output_len() * 2;
    if bytes.len() <= sig_len + TIME_HEX_LEN {
        return None;
    }

    let (sig_hex, rest) = bytes.split_at(sig_len);
    let (time_hex, identity_b64) = rest.split_at(TIME_HEX_LEN);

    if !is_lower_hex(sig_hex) || !is_lower_hex(time_hex) {
        return None;
    }

    let signature = hex::decode(sig_hex).ok()?;
    let time_bytes: [u8; 8] = hex::decode(time_hex).ok()?.try_into().ok()?;
    let issue_time = u64::from_be_bytes(time_bytes);

    let identity = URL_SAFE_NO_PAD.decode(identity_b64).ok()?;
    let identity = String::from_utf8(identity).ok()?;
    if identity.is_empty() {
        return None;
    }

    Some(RawTicket {
        signature,
        issue_time,
        identity,
    })
}

fn is_lower_hex(bytes: &[u8]) -> bool {
    bytes
        .iter()
        .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signer() -> Signer {
        Signer::new(DigestAlgorithm::Sha256, b"codec-test-secret").unwrap()
    }

    #[test]
    fn test_encode_layout() {
        let signer = signer();
        let signature = signer.sign(0x1234, None, "alice");
        let token = encode(&signature, 0x1234, "alice");

        assert_eq!(&token[..64], hex::encode(&signature));
        assert_eq!(&token[64..80], "0000000000001234");
        assert_eq!(&token[80..], "YWxpY2U");
    }

    #[test]
    fn test_decode_well_formed() {
        let signer = signer();
        let signature = signer.sign(42, None, "bob@example.com");
        let token = encode(&signature, 42, "bob@example.com");

        let raw = decode(&token, DigestAlgorithm::Sha256).unwrap();
        assert_eq!(raw.issue_time, 42);
        assert_eq!(raw.identity, "bob@example.com");
        assert!(signer.verify(&raw.signature, raw.issue_time, None, &raw.identity));
    }

    #[test]
    fn test_decode_rejects_uppercase_hex() {
        let signer = signer();
        let token = encode(&signer.sign(42, None, "carol"), 42, "carol");
        let upper = format!("{}{}", token[..80].to_uppercase(), &token[80..]);
        assert_ne!(upper, token);
        assert!(decode(&upper, DigestAlgorithm::Sha256).is_none());
    }

    #[test]
    fn test_decode_rejects_malformed() {
        assert!(decode("", DigestAlgorithm::Sha256).is_none());
        assert!(decode("not-a-ticket", DigestAlgorithm::Sha256).is_none());

        // empty identity
        let token = format!("{}{:016x}", "a".repeat(64), 1);
        assert!(decode(&token, DigestAlgorithm::Sha256).is_none());

        // padded base64
        let token = format!("{}{:016x}YQ==", "a".repeat(64), 1);
        assert!(decode(&token, DigestAlgorithm::Sha256).is_none());

        // non-ascii must not panic on slicing
        let token = format!("{}é{:015x}YQ", "a".repeat(63), 1);
        assert!(decode(&token, DigestAlgorithm::Sha256).is_none());
    }

    #[test]
    fn test_sign_binds_ip() {
        let signer = signer();
        let a = signer.sign(7, Some("10.0.0.1".parse().unwrap()), "dave");
        let b = signer.sign(7, Some("10.0.0.2".parse().unwrap()), "dave");
        let c = signer.sign(7, None, "dave");
        assert_ne!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_sha512_length() {
        let signer = Signer::new(DigestAlgorithm::Sha512, b"codec-test-secret").unwrap();
        assert_eq!(signer.sign(1, None, "eve").len(), 64);
        assert_eq!(signer.digest(), DigestAlgorithm::Sha512);
    }
}
