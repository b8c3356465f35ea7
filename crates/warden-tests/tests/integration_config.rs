// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Configuration loading tests: file formats, validation and the objects
//! built from a loaded configuration.

use std::time::Duration;

use warden_config::{
    load_config, load_config_str, ConfigError, ConfigFormat, ConfigLoader, LogFormat, LogLevel,
    SameSite, WardenConfig,
};
use warden_core::{AclContextKind, AutzPolicy, DigestAlgorithm, TicketError};
use warden_tests::prelude::*;

fn assert_site_config(config: &WardenConfig) {
    assert_eq!(config.ticket.max_age, Duration::from_secs(120));
    assert_eq!(config.ticket.reissue_time, Some(Duration::from_secs(30)));
    assert_eq!(config.ticket.digest, DigestAlgorithm::Sha512);
    assert!(!config.ticket.include_ip);

    assert_eq!(config.cookie.name, "site_tkt");
    assert!(config.cookie.secure);
    assert!(config.cookie.http_only);
    assert_eq!(config.cookie.same_site, SameSite::Lax);

    let acl = config.acl.as_ref().expect("acl section");
    assert_eq!(acl.context, AclContextKind::Compiled);
    assert_eq!(acl.rules.len(), 3);

    assert_eq!(config.groups.forbidden, vec!["mallory".to_string()]);
    assert_eq!(config.logging.level, LogLevel::Debug);
    assert_eq!(config.logging.format, LogFormat::Json);
}

// =============================================================================
// File Formats
// =============================================================================

#[test]
fn test_load_yaml_file() {
    init_test_logging();
    let dir = temp_test_dir("warden-config");
    let path = ConfigFixtures::write(dir.path(), "warden.yaml", ConfigFixtures::yaml());

    let config = load_config(&path).unwrap();
    assert_site_config(&config);
}

#[test]
fn test_load_toml_file() {
    let dir = temp_test_dir("warden-config");
    let path = ConfigFixtures::write(dir.path(), "warden.toml", ConfigFixtures::toml());

    let config = load_config(&path).unwrap();
    assert_site_config(&config);
}

#[test]
fn test_load_json_file() {
    let dir = temp_test_dir("warden-config");
    let path = ConfigFixtures::write(dir.path(), "warden.json", ConfigFixtures::json());

    let config = load_config(&path).unwrap();
    assert_site_config(&config);
}

#[test]
fn test_formats_build_equivalent_contexts() {
    let configs = [
        load_config_str(ConfigFixtures::yaml(), ConfigFormat::Yaml).unwrap(),
        load_config_str(ConfigFixtures::toml(), ConfigFormat::Toml).unwrap(),
        load_config_str(ConfigFixtures::json(), ConfigFormat::Json).unwrap(),
    ];

    for config in &configs {
        let acl = config.acl.as_ref().unwrap();
        assert_eq!(acl.rules, configs[0].acl.as_ref().unwrap().rules);
    }
}

#[test]
fn test_unknown_extension() {
    let dir = temp_test_dir("warden-config");
    let path = ConfigFixtures::write(dir.path(), "warden.ini", "secret=x");

    let result = load_config(&path);
    assert!(matches!(result, Err(ConfigError::UnsupportedFormat { .. })));
}

#[test]
fn test_missing_file() {
    let dir = temp_test_dir("warden-config");
    let result = load_config(dir.path().join("absent.yaml"));
    assert!(matches!(result, Err(ConfigError::FileNotFound { .. })));
}

#[test]
fn test_syntax_error_names_file() {
    let dir = temp_test_dir("warden-config");
    let path = ConfigFixtures::write(dir.path(), "broken.yaml", "ticket: [unclosed");

    match load_config(&path) {
        Err(ConfigError::Parse { path: reported, .. }) => assert_eq!(reported, path),
        other => panic!("expected parse error, got {:?}", other),
    }
}

// =============================================================================
// Validation
// =============================================================================

fn load_yaml(content: &str) -> Result<WardenConfig, ConfigError> {
    ConfigLoader::new()
        .with_env_vars(false)
        .load_from_str(content, ConfigFormat::Yaml)
}

#[test]
fn test_secret_required() {
    assert!(matches!(
        load_yaml("cookie:\n  name: tkt\n"),
        Err(ConfigError::Ticket(TicketError::MissingSecret))
    ));
    assert!(matches!(
        load_yaml("ticket:\n  secret: ''\n"),
        Err(ConfigError::Ticket(TicketError::MissingSecret))
    ));
}

#[test]
fn test_durations_checked() {
    let err = load_yaml("ticket:\n  secret: abcdefghijklmnop\n  max_age: 0s\n").unwrap_err();
    assert!(matches!(
        err,
        ConfigError::Ticket(TicketError::InvalidDuration { .. })
    ));

    let err = load_yaml(
        "ticket:\n  secret: abcdefghijklmnop\n  max_age: 1m\n  reissue_time: 2m\n",
    )
    .unwrap_err();
    assert!(matches!(
        err,
        ConfigError::Ticket(TicketError::InvalidDuration { .. })
    ));
}

#[test]
fn test_bad_rules_rejected() {
    let unknown_effect = r#"
ticket:
  secret: abcdefghijklmnop
acl:
  rules:
    - effect: permit
      principal: everyone
      permissions: [view]
"#;
    let err = load_yaml(unknown_effect).unwrap_err();
    assert!(err.to_string().contains("permit"), "{}", err);

    let empty_permissions = r#"
ticket:
  secret: abcdefghijklmnop
acl:
  rules:
    - effect: allow
      principal: everyone
      permissions: []
"#;
    assert!(load_yaml(empty_permissions).is_err());

    let unknown_principal = r#"
ticket:
  secret: abcdefghijklmnop
acl:
  rules:
    - effect: allow
      principal: admins
      permissions: [view]
"#;
    assert!(load_yaml(unknown_principal).is_err());
}

#[test]
fn test_unknown_field_rejected() {
    let result = load_yaml("ticket:\n  secret: abcdefghijklmnop\n  lifetime: 10m\n");
    assert!(result.is_err());
}

#[test]
fn test_cookie_checked() {
    let result = load_yaml("ticket:\n  secret: abcdefghijklmnop\ncookie:\n  name: 'bad name'\n");
    assert!(matches!(result, Err(ConfigError::Validation { .. })));

    let result = load_yaml(
        "ticket:\n  secret: abcdefghijklmnop\ncookie:\n  same_site: none\n  secure: false\n",
    );
    assert!(matches!(result, Err(ConfigError::Validation { .. })));
}

#[test]
fn test_hex_secret() {
    let config = load_yaml(
        "ticket:\n  secret: '00112233445566778899aabbccddeeff'\n  secret_encoding: hex\n",
    )
    .unwrap();
    let key = config.ticket.to_ticket_config().unwrap().secret;
    assert_eq!(key.len(), 16);
    assert_eq!(key[15], 0xff);

    let result = load_yaml("ticket:\n  secret: 'zz'\n  secret_encoding: hex\n");
    assert!(matches!(result, Err(ConfigError::Validation { .. })));
}

#[test]
fn test_env_placeholder_default() {
    let content = r#"
ticket:
  secret: ${WARDEN_TESTS_UNSET_SECRET:placeholder-secret-value}
cookie:
  name: ${WARDEN_TESTS_UNSET_COOKIE:from_default}
"#;
    let config = load_config_str(content, ConfigFormat::Yaml).unwrap();

    assert_eq!(
        config.ticket.secret.as_ref().map(|s| s.raw()),
        Some("placeholder-secret-value")
    );
    assert_eq!(config.cookie.name, "from_default");
}

#[test]
fn test_unset_env_placeholder_fails() {
    let content = "ticket:\n  secret: ${WARDEN_TESTS_UNSET_SECRET_VAR}\n  max_age: 1h\n";

    match load_config_str(content, ConfigFormat::Yaml) {
        Err(ConfigError::EnvVarNotFound { name }) => {
            assert_eq!(name, "WARDEN_TESTS_UNSET_SECRET_VAR")
        }
        other => panic!("expected env var error, got {:?}", other),
    }

    let dir = temp_test_dir("warden-config");
    let path = ConfigFixtures::write(dir.path(), "warden.yaml", content);
    assert!(matches!(
        load_config(&path),
        Err(ConfigError::EnvVarNotFound { .. })
    ));
}

#[test]
fn test_literal_placeholder_secret_rejected() {
    let result = load_yaml("ticket:\n  secret: ${WARDEN_TESTS_UNSET_SECRET_VAR}\n");
    assert!(matches!(
        result,
        Err(ConfigError::Validation { ref field, .. }) if field == "ticket.secret"
    ));
}

#[test]
fn test_clock_skew_setting() {
    let config = load_yaml("ticket:\n  secret: abcdefghijklmnop\n  clock_skew: 5s\n").unwrap();
    assert_eq!(config.ticket.clock_skew, Duration::from_secs(5));
    assert_eq!(config.ticket_policy().unwrap().clock_skew(), 5);
}

#[test]
fn test_demo_config_has_no_fallback_secret() {
    const DEMO: &str = include_str!("../../../demos/warden.yaml");

    assert!(DEMO.contains("secret: ${WARDEN_SECRET}\n"));
    assert!(!DEMO.contains("${WARDEN_SECRET:"));

    let config = load_yaml(&DEMO.replace("${WARDEN_SECRET}", "demo-secret-0123456789abcdef")).unwrap();
    assert_eq!(config.ticket.max_age, Duration::from_secs(3600));
    assert!(config.ticket_policy().is_ok());
}

// =============================================================================
// Built Objects
// =============================================================================

#[test]
fn test_policy_from_config() {
    let config = load_config_str(ConfigFixtures::yaml(), ConfigFormat::Yaml).unwrap();
    let policy = config.ticket_policy().unwrap();

    assert_eq!(policy.max_age(), 120);
    assert_eq!(policy.reissue_time(), Some(30));
    assert_eq!(policy.digest(), DigestAlgorithm::Sha512);

    let token = policy.issue_at("alice", TicketFixtures::NOW).unwrap();
    assert_eq!(
        policy.validate_at(&token, TicketFixtures::NOW + 90).as_deref(),
        Some("alice")
    );
    assert!(policy.should_reissue_at(&token, TicketFixtures::NOW + 91));
}

#[tokio::test]
async fn test_autz_from_config() {
    let config = load_config_str(ConfigFixtures::yaml(), ConfigFormat::Yaml).unwrap();
    let policy = config.autz_policy();

    assert!(policy.permit(Some("alice"), "edit", None).await.unwrap());
    assert!(policy.permit(Some("alice"), "view", None).await.unwrap());
    assert!(!policy.permit(Some("eve"), "edit", None).await.unwrap());
    assert!(!policy.permit(Some("mallory"), "view", None).await.unwrap());
    assert!(!policy.permit(None, "view", None).await.unwrap());
}

#[test]
fn test_acl_context_absent_without_section() {
    let config = load_yaml("ticket:\n  secret: abcdefghijklmnop\n").unwrap();
    assert!(config.acl.is_none());
    assert!(config.acl_context().is_none());
}
