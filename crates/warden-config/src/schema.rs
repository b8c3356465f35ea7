// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Configuration schema definitions for warden.
//!
//! # Schema Structure
//!
//! ```text
//! WardenConfig
//! ├── ticket: TicketSection
//! ├── cookie: CookieConfig
//! ├── acl: Option<AclConfig>
//! ├── groups: GroupsConfig
//! └── logging: LoggingConfig
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use warden_core::{
    AclAutzPolicy, AclContext, AclContextKind, AclRule, DigestAlgorithm, StaticGroups,
    TicketConfig, TicketError, TicketPolicy, DEFAULT_CLOCK_SKEW,
};

use crate::error::{ConfigError, ConfigResult};

// =============================================================================
// Constants
// =============================================================================

/// Default ticket lifetime (1 hour).
pub const DEFAULT_MAX_AGE: Duration = Duration::from_secs(3600);

/// Default ticket cookie name.
pub const DEFAULT_COOKIE_NAME: &str = "AUTH_TKT";

/// Default cookie path.
pub const DEFAULT_COOKIE_PATH: &str = "/";

// =============================================================================
// Top-Level Configuration
// =============================================================================

/// The root configuration structure for warden.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WardenConfig {
    /// Ticket policy.
    #[serde(default)]
    pub ticket: TicketSection,

    /// Ticket cookie carrier.
    #[serde(default)]
    pub cookie: CookieConfig,

    /// Global ACL. Absent means permission checks need a local context.
    #[serde(default)]
    pub acl: Option<AclConfig>,

    /// Static group assignments.
    #[serde(default)]
    pub groups: GroupsConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl WardenConfig {
    /// Validates the entire configuration.
    ///
    /// Builds the ticket policy once so that every core construction error
    /// surfaces here rather than on the first request.
    pub fn validate(&self) -> ConfigResult<()> {
        self.ticket.validate()?;
        self.cookie.validate()?;
        self.groups.validate()?;
        Ok(())
    }

    /// Builds the ticket policy.
    pub fn ticket_policy(&self) -> ConfigResult<TicketPolicy> {
        self.ticket.build_policy()
    }

    /// Builds the global ACL context, if one is configured.
    pub fn acl_context(&self) -> Option<Arc<dyn AclContext>> {
        self.acl.as_ref().map(AclConfig::build_context)
    }

    /// Builds the configured group source.
    pub fn group_source(&self) -> StaticGroups {
        self.groups.to_source()
    }

    /// Builds the ACL-backed authorization policy.
    pub fn autz_policy(&self) -> AclAutzPolicy<StaticGroups> {
        let policy = AclAutzPolicy::new(self.group_source());
        match self.acl_context() {
            Some(context) => policy.with_context(context),
            None => policy,
        }
    }
}

// =============================================================================
// Ticket Configuration
// =============================================================================

/// Ticket policy configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TicketSection {
    /// Signing secret.
    #[serde(default)]
    pub secret: Option<SecretValue>,

    /// How the secret string is turned into key bytes.
    #[serde(default)]
    pub secret_encoding: SecretEncoding,

    /// Ticket lifetime.
    #[serde(default = "default_max_age", with = "humantime_serde")]
    pub max_age: Duration,

    /// Remaining lifetime below which tickets are reissued.
    #[serde(default, with = "humantime_serde")]
    pub reissue_time: Option<Duration>,

    /// Bind tickets to the client IP.
    #[serde(default)]
    pub include_ip: bool,

    /// HMAC digest.
    #[serde(default)]
    pub digest: DigestAlgorithm,

    /// Tolerance for issue times ahead of the local clock.
    #[serde(default = "default_clock_skew", with = "humantime_serde")]
    pub clock_skew: Duration,
}

fn default_max_age() -> Duration {
    DEFAULT_MAX_AGE
}

fn default_clock_skew() -> Duration {
    Duration::from_secs(DEFAULT_CLOCK_SKEW)
}

impl Default for TicketSection {
    fn default() -> Self {
        Self {
            secret: None,
            secret_encoding: SecretEncoding::default(),
            max_age: DEFAULT_MAX_AGE,
            reissue_time: None,
            include_ip: false,
            digest: DigestAlgorithm::default(),
            clock_skew: default_clock_skew(),
        }
    }
}

impl TicketSection {
    /// Converts to the core ticket configuration.
    pub fn to_ticket_config(&self) -> ConfigResult<TicketConfig> {
        let secret = self.secret.as_ref().ok_or(TicketError::MissingSecret)?;
        if secret.raw().contains("${") {
            return Err(ConfigError::validation(
                "ticket.secret",
                "contains an unresolved ${...} placeholder",
            ));
        }
        let key = secret.to_bytes(self.secret_encoding)?;

        if self.max_age.subsec_nanos() != 0 {
            return Err(ConfigError::validation(
                "ticket.max_age",
                "must be a whole number of seconds",
            ));
        }

        let mut config = TicketConfig::new(key, self.max_age.as_secs())
            .with_include_ip(self.include_ip)
            .with_digest(self.digest)
            .with_clock_skew(self.clock_skew.as_secs());
        if let Some(reissue_time) = self.reissue_time {
            config = config.with_reissue_time(reissue_time.as_secs());
        }
        Ok(config)
    }

    /// Validates the ticket configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        self.to_ticket_config()?.validate()?;
        Ok(())
    }

    /// Builds the ticket policy.
    pub fn build_policy(&self) -> ConfigResult<TicketPolicy> {
        Ok(TicketPolicy::new(self.to_ticket_config()?)?)
    }
}

/// Encoding of the configured secret string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SecretEncoding {
    /// The UTF-8 bytes of the string.
    #[default]
    Utf8,
    /// Hex-encoded bytes.
    Hex,
    /// Standard base64-encoded bytes.
    Base64,
}

// =============================================================================
// Cookie Configuration
// =============================================================================

/// Cookie carrying the ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CookieConfig {
    /// Cookie name.
    #[serde(default = "default_cookie_name")]
    pub name: String,

    /// Cookie path.
    #[serde(default = "default_cookie_path")]
    pub path: String,

    /// Cookie domain.
    #[serde(default)]
    pub domain: Option<String>,

    /// Only send over HTTPS.
    #[serde(default)]
    pub secure: bool,

    /// Hide from scripts.
    #[serde(default = "default_true")]
    pub http_only: bool,

    /// SameSite attribute.
    #[serde(default)]
    pub same_site: SameSite,
}

fn default_cookie_name() -> String {
    DEFAULT_COOKIE_NAME.to_string()
}

fn default_cookie_path() -> String {
    DEFAULT_COOKIE_PATH.to_string()
}

fn default_true() -> bool {
    true
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            name: default_cookie_name(),
            path: default_cookie_path(),
            domain: None,
            secure: false,
            http_only: true,
            same_site: SameSite::default(),
        }
    }
}

impl CookieConfig {
    /// Creates a cookie configuration with the given name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Validates the cookie configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.name.is_empty() {
            return Err(ConfigError::validation("cookie.name", "cannot be empty"));
        }
        if !self.name.bytes().all(is_cookie_name_byte) {
            return Err(ConfigError::validation(
                "cookie.name",
                format!("'{}' contains characters not allowed in a cookie name", self.name),
            ));
        }
        if !self.path.starts_with('/') {
            return Err(ConfigError::validation("cookie.path", "must start with '/'"));
        }
        if self.same_site == SameSite::None && !self.secure {
            return Err(ConfigError::validation(
                "cookie.same_site",
                "'none' requires secure cookies",
            ));
        }
        Ok(())
    }
}

fn is_cookie_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-' | b'.')
}

/// Cookie SameSite attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SameSite {
    /// `SameSite=Lax`.
    #[default]
    Lax,
    /// `SameSite=Strict`.
    Strict,
    /// `SameSite=None`.
    None,
}

impl SameSite {
    /// Returns the attribute value.
    pub fn as_str(&self) -> &'static str {
        match self {
            SameSite::Lax => "Lax",
            SameSite::Strict => "Strict",
            SameSite::None => "None",
        }
    }
}

// =============================================================================
// ACL Configuration
// =============================================================================

/// Global ACL.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AclConfig {
    /// Context representation.
    #[serde(default)]
    pub context: AclContextKind,

    /// Rules in evaluation order.
    #[serde(default)]
    pub rules: Vec<AclRule>,
}

impl AclConfig {
    /// Builds the context.
    pub fn build_context(&self) -> Arc<dyn AclContext> {
        self.context.build(self.rules.clone())
    }
}

// =============================================================================
// Groups Configuration
// =============================================================================

/// Static group assignments.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GroupsConfig {
    /// Groups granted to every caller.
    #[serde(default)]
    pub default: Vec<String>,

    /// Additional groups per identity.
    #[serde(default)]
    pub identities: HashMap<String, Vec<String>>,

    /// Identities explicitly denied all access.
    #[serde(default)]
    pub forbidden: Vec<String>,
}

impl GroupsConfig {
    /// Validates the group configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.default.iter().any(String::is_empty) {
            return Err(ConfigError::validation("groups.default", "empty group name"));
        }
        for (identity, groups) in &self.identities {
            if identity.is_empty() {
                return Err(ConfigError::validation("groups.identities", "empty identity"));
            }
            if groups.iter().any(String::is_empty) {
                return Err(ConfigError::validation(
                    format!("groups.identities.{}", identity),
                    "empty group name",
                ));
            }
        }
        Ok(())
    }

    /// Builds the group source.
    pub fn to_source(&self) -> StaticGroups {
        let source = self
            .identities
            .iter()
            .fold(StaticGroups::new(self.default.iter().cloned()), |source, (id, groups)| {
                source.with_identity(id.clone(), groups.iter().cloned())
            });
        self.forbidden
            .iter()
            .fold(source, |source, id| source.with_forbidden(id.clone()))
    }
}

// =============================================================================
// Logging Configuration
// =============================================================================

/// Logging configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log level.
    #[serde(default)]
    pub level: LogLevel,

    /// Log format.
    #[serde(default)]
    pub format: LogFormat,
}

/// Log level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level.
    Trace,
    /// Debug level.
    Debug,
    /// Info level.
    #[default]
    Info,
    /// Warning level.
    Warn,
    /// Error level.
    Error,
}

impl LogLevel {
    /// Returns the level name understood by tracing filters.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }

    /// Parses a level name.
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "trace" => Some(LogLevel::Trace),
            "debug" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "warn" | "warning" => Some(LogLevel::Warn),
            "error" => Some(LogLevel::Error),
            _ => None,
        }
    }
}

/// Log format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// Compact text.
    Compact,
    /// JSON for log collectors.
    Json,
}

// =============================================================================
// Secret Value
// =============================================================================

/// A secret string that never appears in logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SecretValue(String);

impl SecretValue {
    /// Creates a new secret value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the raw value.
    pub fn raw(&self) -> &str {
        &self.0
    }

    /// Returns `true` if the value is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Decodes the key bytes.
    pub fn to_bytes(&self, encoding: SecretEncoding) -> ConfigResult<Vec<u8>> {
        match encoding {
            SecretEncoding::Utf8 => Ok(self.0.as_bytes().to_vec()),
            SecretEncoding::Hex => hex::decode(self.0.trim()).map_err(|e| {
                ConfigError::validation("ticket.secret", format!("invalid hex: {}", e))
            }),
            SecretEncoding::Base64 => BASE64.decode(self.0.trim()).map_err(|e| {
                ConfigError::validation("ticket.secret", format!("invalid base64: {}", e))
            }),
        }
    }
}

impl fmt::Display for SecretValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "***")
    }
}

impl fmt::Debug for SecretValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretValue(***)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use warden_core::{AclError, Principal};

    fn config_with_secret(secret: &str) -> WardenConfig {
        WardenConfig {
            ticket: TicketSection {
                secret: Some(SecretValue::new(secret)),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_default_config() {
        let config = WardenConfig::default();
        assert_eq!(config.cookie.name, "AUTH_TKT");
        assert_eq!(config.ticket.max_age, DEFAULT_MAX_AGE);
        assert!(config.acl.is_none());
        assert_eq!(config.logging.level, LogLevel::Info);
    }

    #[test]
    fn test_missing_secret() {
        let result = WardenConfig::default().validate();
        assert!(matches!(
            result,
            Err(ConfigError::Ticket(TicketError::MissingSecret))
        ));

        let result = config_with_secret("").validate();
        assert!(matches!(
            result,
            Err(ConfigError::Ticket(TicketError::MissingSecret))
        ));
    }

    #[test]
    fn test_invalid_durations() {
        let mut config = config_with_secret("0123456789abcdef");
        config.ticket.max_age = Duration::ZERO;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Ticket(TicketError::InvalidDuration { .. }))
        ));

        let mut config = config_with_secret("0123456789abcdef");
        config.ticket.max_age = Duration::from_secs(60);
        config.ticket.reissue_time = Some(Duration::from_secs(120));
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Ticket(TicketError::InvalidDuration { .. }))
        ));

        let mut config = config_with_secret("0123456789abcdef");
        config.ticket.max_age = Duration::from_millis(1500);
        assert!(matches!(config.validate(), Err(ConfigError::Validation { .. })));
    }

    #[test]
    fn test_unresolved_secret_placeholder_rejected() {
        let result = config_with_secret("${WARDEN_SECRET}").validate();
        assert!(matches!(
            result,
            Err(ConfigError::Validation { ref field, .. }) if field == "ticket.secret"
        ));
    }

    #[test]
    fn test_clock_skew_forwarded() {
        let mut config = config_with_secret("0123456789abcdef");
        assert_eq!(config.ticket.clock_skew, Duration::from_secs(DEFAULT_CLOCK_SKEW));

        config.ticket.clock_skew = Duration::from_secs(5);
        assert_eq!(config.ticket_policy().unwrap().clock_skew(), 5);
    }

    #[test]
    fn test_ticket_policy_built() {
        let mut config = config_with_secret("0123456789abcdef");
        config.ticket.max_age = Duration::from_secs(120);
        config.ticket.reissue_time = Some(Duration::from_secs(30));

        let policy = config.ticket_policy().unwrap();
        assert_eq!(policy.max_age(), 120);
        assert_eq!(policy.reissue_time(), Some(30));
    }

    #[test]
    fn test_secret_encodings() {
        let secret = SecretValue::new("00ff10");
        assert_eq!(secret.to_bytes(SecretEncoding::Hex).unwrap(), vec![0x00, 0xff, 0x10]);
        assert_eq!(secret.to_bytes(SecretEncoding::Utf8).unwrap(), b"00ff10".to_vec());

        let secret = SecretValue::new("AAEC");
        assert_eq!(secret.to_bytes(SecretEncoding::Base64).unwrap(), vec![0, 1, 2]);

        assert!(SecretValue::new("zz").to_bytes(SecretEncoding::Hex).is_err());
    }

    #[test]
    fn test_secret_hidden() {
        let secret = SecretValue::new("hunter2");
        assert_eq!(secret.to_string(), "***");
        assert!(!format!("{:?}", secret).contains("hunter2"));
    }

    #[test]
    fn test_cookie_validation() {
        assert!(CookieConfig::default().validate().is_ok());
        assert!(CookieConfig::named("").validate().is_err());
        assert!(CookieConfig::named("bad name;").validate().is_err());

        let cookie = CookieConfig {
            same_site: SameSite::None,
            ..Default::default()
        };
        assert!(cookie.validate().is_err());

        let cookie = CookieConfig {
            path: "app".to_string(),
            ..Default::default()
        };
        assert!(cookie.validate().is_err());
    }

    #[test]
    fn test_groups_to_source() {
        let mut identities = HashMap::new();
        identities.insert("alice".to_string(), vec!["admins".to_string()]);
        let groups = GroupsConfig {
            default: vec!["staff".to_string()],
            identities,
            forbidden: vec!["mallory".to_string()],
        };
        assert!(groups.validate().is_ok());

        let source = groups.to_source();
        let debug = format!("{:?}", source);
        assert!(debug.contains("admins"));
        assert!(debug.contains("mallory"));
    }

    #[test]
    fn test_acl_context_built() {
        let config = WardenConfig {
            acl: Some(AclConfig {
                context: AclContextKind::Compiled,
                rules: vec![AclRule::allow(Principal::Everyone, ["view"]).unwrap()],
            }),
            ..Default::default()
        };
        let context = config.acl_context().unwrap();
        assert_eq!(context.kind(), AclContextKind::Compiled);
        assert_eq!(context.len(), 1);
        assert!(config.autz_policy().context().is_some());
    }

    #[test]
    fn test_acl_rule_rejected_on_deserialize() {
        let result: Result<AclConfig, _> = serde_json::from_str(
            r#"{"rules":[{"effect":"allow","principal":"everyone","permissions":[]}]}"#,
        );
        let message = result.unwrap_err().to_string();
        assert!(message.contains("empty permission set"), "{}", message);

        let error = AclError::EmptyPrincipal;
        assert_eq!(ConfigError::from(error).error_type(), "empty_principal");
    }

    #[test]
    fn test_log_level_parse() {
        assert_eq!(LogLevel::parse("WARNING"), Some(LogLevel::Warn));
        assert_eq!(LogLevel::parse("trace"), Some(LogLevel::Trace));
        assert_eq!(LogLevel::parse("loud"), None);
    }
}
