// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Configuration loading and processing for warden.
//!
//! # Loading Pipeline
//!
//! 1. Read the file and pick the format from its extension
//! 2. Resolve `${VAR}` / `${VAR:default}` placeholders in the raw text
//! 3. Parse YAML, TOML or JSON into [`WardenConfig`]
//! 4. Apply environment variable overrides
//! 5. Validate (builds the ticket policy once)
//!
//! # Environment Variable Override
//!
//! ```text
//! WARDEN_TICKET_SECRET=...
//! WARDEN_TICKET_MAX_AGE=30m
//! WARDEN_LOG_LEVEL=debug
//! WARDEN_COOKIE_NAME=SESSION
//! ```

use std::env;
use std::fs;
use std::path::Path;

use humantime_serde::re::humantime;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::error::{ConfigError, ConfigResult};
use crate::schema::{LogLevel, SecretValue, WardenConfig};

/// Default environment variable prefix.
pub const DEFAULT_ENV_PREFIX: &str = "WARDEN";

// =============================================================================
// ConfigLoader
// =============================================================================

/// Configuration loader for warden.
///
/// # Examples
///
/// ```no_run
/// use warden_config::loader::ConfigLoader;
///
/// let loader = ConfigLoader::new();
/// let config = loader.load("warden.yaml").unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// Environment variable prefix.
    env_prefix: String,

    /// Whether to resolve placeholders and apply overrides.
    resolve_env_vars: bool,
}

impl ConfigLoader {
    /// Creates a new configuration loader with default settings.
    pub fn new() -> Self {
        Self {
            env_prefix: DEFAULT_ENV_PREFIX.to_string(),
            resolve_env_vars: true,
        }
    }

    /// Sets the environment variable prefix.
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Enables or disables environment variable resolution.
    pub fn with_env_vars(mut self, enabled: bool) -> Self {
        self.resolve_env_vars = enabled;
        self
    }

    /// Loads configuration from a file.
    ///
    /// The file format is determined by the file extension:
    /// - `.yaml` or `.yml` - YAML format
    /// - `.toml` - TOML format
    /// - `.json` - JSON format
    pub fn load(&self, path: impl AsRef<Path>) -> ConfigResult<WardenConfig> {
        let path = path.as_ref();
        info!("Loading configuration from: {}", path.display());

        let content = self.read_file(path)?;
        let format = ConfigFormat::from_path(path)?;
        let config = self
            .process(&content, format)
            .map_err(|e| match e {
                ConfigError::Serialization { message } => ConfigError::parse(path, message),
                other => other,
            })?;

        info!("Configuration loaded successfully");
        debug!(
            rules = config.acl.as_ref().map_or(0, |acl| acl.rules.len()),
            include_ip = config.ticket.include_ip,
            cookie = %config.cookie.name,
            "Configuration summary"
        );

        Ok(config)
    }

    /// Loads configuration from a string.
    pub fn load_from_str(&self, content: &str, format: ConfigFormat) -> ConfigResult<WardenConfig> {
        self.process(content, format)
    }

    fn process(&self, content: &str, format: ConfigFormat) -> ConfigResult<WardenConfig> {
        let content = if self.resolve_env_vars {
            resolve_env_placeholders(content)?
        } else {
            content.to_string()
        };

        let mut config: WardenConfig = parse_str(&content, format)?;

        if self.resolve_env_vars {
            self.apply_env_overrides(&mut config)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Reads file content.
    fn read_file(&self, path: &Path) -> ConfigResult<String> {
        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }

        fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&self, config: &mut WardenConfig) -> ConfigResult<()> {
        if let Ok(value) = env::var(self.var("TICKET_SECRET")) {
            config.ticket.secret = Some(SecretValue::new(value));
        }

        let name = self.var("TICKET_MAX_AGE");
        if let Ok(value) = env::var(&name) {
            config.ticket.max_age = humantime::parse_duration(value.trim()).map_err(|e| {
                ConfigError::invalid_env_var(&name, format!("expected duration: {}", e))
            })?;
        }

        let name = self.var("LOG_LEVEL");
        if let Ok(value) = env::var(&name) {
            match LogLevel::parse(&value) {
                Some(level) => config.logging.level = level,
                None => warn!(variable = %name, value = %value, "Ignoring unknown log level"),
            }
        }

        if let Ok(value) = env::var(self.var("COOKIE_NAME")) {
            config.cookie.name = value;
        }

        Ok(())
    }

    fn var(&self, suffix: &str) -> String {
        format!("{}_{}", self.env_prefix, suffix)
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// ConfigFormat
// =============================================================================

/// Supported configuration file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// YAML format.
    Yaml,
    /// TOML format.
    Toml,
    /// JSON format.
    Json,
}

impl ConfigFormat {
    /// Determines the format from a file path.
    pub fn from_path(path: &Path) -> ConfigResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());

        match ext.as_deref() {
            Some("yaml") | Some("yml") => Ok(ConfigFormat::Yaml),
            Some("toml") => Ok(ConfigFormat::Toml),
            Some("json") => Ok(ConfigFormat::Json),
            Some(other) => Err(ConfigError::unsupported_format(other)),
            None => Err(ConfigError::unsupported_format("(no extension)")),
        }
    }

    /// Returns the file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            ConfigFormat::Yaml => "yaml",
            ConfigFormat::Toml => "toml",
            ConfigFormat::Json => "json",
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

fn parse_str<T: DeserializeOwned>(content: &str, format: ConfigFormat) -> ConfigResult<T> {
    match format {
        ConfigFormat::Yaml => {
            serde_yaml::from_str(content).map_err(|e| ConfigError::serialization(e.to_string()))
        }
        ConfigFormat::Toml => {
            toml::from_str(content).map_err(|e| ConfigError::serialization(e.to_string()))
        }
        ConfigFormat::Json => {
            serde_json::from_str(content).map_err(|e| ConfigError::serialization(e.to_string()))
        }
    }
}

/// Resolves environment variable placeholders in content.
///
/// Supports `${VAR_NAME}` and `${VAR_NAME:default}`. An unset variable
/// without a default fails with [`ConfigError::EnvVarNotFound`]. An
/// unterminated `${` is kept as text.
pub fn resolve_env_placeholders(content: &str) -> ConfigResult<String> {
    let mut result = String::with_capacity(content.len());
    let mut chars = content.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' || chars.peek() != Some(&'{') {
            result.push(c);
            continue;
        }
        chars.next();

        let mut var_content = String::new();
        let mut found_close = false;
        for c in chars.by_ref() {
            if c == '}' {
                found_close = true;
                break;
            }
            var_content.push(c);
        }

        if !found_close {
            result.push_str("${");
            result.push_str(&var_content);
            continue;
        }

        let (var_name, default_value) = match var_content.split_once(':') {
            Some((name, default)) => (name, Some(default)),
            None => (var_content.as_str(), None),
        };

        match (env::var(var_name), default_value) {
            (Ok(value), _) => result.push_str(&value),
            (Err(_), Some(default)) => result.push_str(default),
            (Err(_), None) => {
                warn!(variable = %var_name, "Environment variable not found");
                return Err(ConfigError::env_var_not_found(var_name));
            }
        }
    }

    Ok(result)
}

// =============================================================================
// Convenience Functions
// =============================================================================

/// Loads configuration from a file with default settings.
pub fn load_config(path: impl AsRef<Path>) -> ConfigResult<WardenConfig> {
    ConfigLoader::new().load(path)
}

/// Loads configuration from a string with the specified format.
pub fn load_config_str(content: &str, format: ConfigFormat) -> ConfigResult<WardenConfig> {
    ConfigLoader::new().load_from_str(content, format)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::Duration;
    use tempfile::NamedTempFile;
    use warden_core::{AclContextKind, Principal, TicketError};

    const YAML: &str = r#"
ticket:
  secret: "0123456789abcdef0123"
  max_age: 2m
  reissue_time: 1m
cookie:
  name: SESSION
acl:
  context: compiled
  rules:
    - effect: allow
      principal: everyone
      permissions: [view]
    - effect: deny
      principal: { group: contractors }
      permissions: [deploy]
    - effect: Allow
      principal: authenticated_user
      permissions: [deploy, view]
groups:
  default: [staff]
  identities:
    carol: [contractors]
"#;

    fn loader() -> ConfigLoader {
        ConfigLoader::new().with_env_vars(false)
    }

    #[test]
    fn test_load_yaml_file() {
        let mut file = NamedTempFile::with_suffix(".yaml").unwrap();
        file.write_all(YAML.as_bytes()).unwrap();

        let config = loader().load(file.path()).unwrap();
        assert_eq!(config.ticket.max_age, Duration::from_secs(120));
        assert_eq!(config.ticket.reissue_time, Some(Duration::from_secs(60)));
        assert_eq!(config.cookie.name, "SESSION");

        let acl = config.acl.as_ref().unwrap();
        assert_eq!(acl.context, AclContextKind::Compiled);
        assert_eq!(acl.rules.len(), 3);
        assert_eq!(acl.rules[1].principal(), &Principal::group("contractors"));
    }

    #[test]
    fn test_load_toml() {
        let toml = r#"
[ticket]
secret = "0123456789abcdef0123"
max_age = "1h"
digest = "sha512"

[[acl.rules]]
effect = "allow"
principal = { identity = "alice" }
permissions = ["admin"]
"#;
        let config = loader().load_from_str(toml, ConfigFormat::Toml).unwrap();
        assert_eq!(config.ticket.max_age, Duration::from_secs(3600));
        assert_eq!(
            config.acl.unwrap().rules[0].principal(),
            &Principal::identity("alice")
        );
    }

    #[test]
    fn test_load_json() {
        let json = r#"{"ticket":{"secret":"0123456789abcdef","max_age":"30s"}}"#;
        let config = loader().load_from_str(json, ConfigFormat::Json).unwrap();
        assert_eq!(config.ticket.max_age, Duration::from_secs(30));
        assert!(config.acl.is_none());
    }

    #[test]
    fn test_invalid_configs_fail() {
        let cases = [
            r#"ticket: { secret: "", max_age: 1m }"#,
            r#"ticket: { secret: "0123456789abcdef", max_age: 0s }"#,
            r#"ticket: { secret: "0123456789abcdef", max_age: 1m, reissue_time: 2m }"#,
            "ticket: { secret: \"0123456789abcdef\" }\nacl: { rules: [ { effect: maybe, principal: everyone, permissions: [x] } ] }",
            "ticket: { secret: \"0123456789abcdef\" }\nacl: { rules: [ { effect: allow, principal: everyone, permissions: [] } ] }",
            "ticket: { secret: \"0123456789abcdef\" }\nunknown_section: true",
        ];
        for case in cases {
            assert!(
                loader().load_from_str(case, ConfigFormat::Yaml).is_err(),
                "expected failure for: {}",
                case
            );
        }
    }

    #[test]
    fn test_missing_secret_reported() {
        let result = loader().load_from_str("cookie: { name: X }", ConfigFormat::Yaml);
        assert!(matches!(
            result,
            Err(ConfigError::Ticket(TicketError::MissingSecret))
        ));
    }

    #[test]
    fn test_config_format_from_path() {
        assert_eq!(
            ConfigFormat::from_path(Path::new("warden.yml")).unwrap(),
            ConfigFormat::Yaml
        );
        assert_eq!(
            ConfigFormat::from_path(Path::new("warden.toml")).unwrap(),
            ConfigFormat::Toml
        );
        assert_eq!(
            ConfigFormat::from_path(Path::new("warden.JSON")).unwrap(),
            ConfigFormat::Json
        );
        assert!(ConfigFormat::from_path(Path::new("warden.ini")).is_err());
        assert!(ConfigFormat::from_path(Path::new("warden")).is_err());
    }

    #[test]
    fn test_env_placeholder_with_default() {
        let result = resolve_env_placeholders("secret: ${WARDEN_LOADER_TEST_UNSET:fallback}");
        assert_eq!(result.unwrap(), "secret: fallback");

        let result = resolve_env_placeholders("price: $5 and ${unterminated");
        assert_eq!(result.unwrap(), "price: $5 and ${unterminated");
    }

    #[test]
    fn test_env_placeholder_without_default_fails() {
        let result = resolve_env_placeholders("secret: ${WARDEN_LOADER_TEST_UNSET}");
        assert!(matches!(
            result,
            Err(ConfigError::EnvVarNotFound { ref name }) if name == "WARDEN_LOADER_TEST_UNSET"
        ));
    }

    #[test]
    fn test_env_placeholder_resolved() {
        env::set_var("WARDEN_LOADER_TEST_SECRET", "from-env-0123456789");
        let config = ConfigLoader::new()
            .with_env_prefix("WARDEN_LOADER_TEST_PLACEHOLDER")
            .load_from_str(
                "ticket: { secret: \"${WARDEN_LOADER_TEST_SECRET}\" }",
                ConfigFormat::Yaml,
            )
            .unwrap();
        assert_eq!(config.ticket.secret.unwrap().raw(), "from-env-0123456789");
    }

    #[test]
    fn test_env_overrides() {
        let prefix = "WARDEN_LOADER_TEST_OVERRIDE";
        env::set_var(format!("{}_TICKET_SECRET", prefix), "override-secret-0123");
        env::set_var(format!("{}_TICKET_MAX_AGE", prefix), "15m");
        env::set_var(format!("{}_LOG_LEVEL", prefix), "debug");
        env::set_var(format!("{}_COOKIE_NAME", prefix), "OVERRIDDEN");

        let config = ConfigLoader::new()
            .with_env_prefix(prefix)
            .load_from_str("{}", ConfigFormat::Yaml)
            .unwrap();

        assert_eq!(config.ticket.secret.unwrap().raw(), "override-secret-0123");
        assert_eq!(config.ticket.max_age, Duration::from_secs(900));
        assert_eq!(config.logging.level, LogLevel::Debug);
        assert_eq!(config.cookie.name, "OVERRIDDEN");
    }

    #[test]
    fn test_invalid_env_override() {
        let prefix = "WARDEN_LOADER_TEST_BAD";
        env::set_var(format!("{}_TICKET_SECRET", prefix), "override-secret-0123");
        env::set_var(format!("{}_TICKET_MAX_AGE", prefix), "soon");

        let result = ConfigLoader::new()
            .with_env_prefix(prefix)
            .load_from_str("{}", ConfigFormat::Yaml);
        assert!(matches!(result, Err(ConfigError::InvalidEnvVar { .. })));
    }

    #[test]
    fn test_file_not_found() {
        let result = loader().load("/nonexistent/path/warden.yaml");
        assert!(matches!(result, Err(ConfigError::FileNotFound { .. })));
    }

    #[test]
    fn test_parse_error_carries_path() {
        let mut file = NamedTempFile::with_suffix(".yaml").unwrap();
        file.write_all(b"ticket: [not, a, map]").unwrap();

        let result = loader().load(file.path());
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }
}
