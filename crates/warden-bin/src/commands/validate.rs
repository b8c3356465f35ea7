// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `validate` command.

use warden_config::WardenConfig;
use warden_core::ticket::RECOMMENDED_SECRET_LEN;

use crate::cli::{Cli, OutputFormat, ValidateArgs};
use crate::error::{BinError, BinResult};

/// Returns non-fatal findings about a loaded configuration.
pub fn collect_warnings(config: &WardenConfig) -> BinResult<Vec<String>> {
    let mut warnings = Vec::new();

    let ticket = config.ticket.to_ticket_config()?;
    if ticket.secret.len() < RECOMMENDED_SECRET_LEN {
        warnings.push(format!(
            "Ticket secret is {} bytes; at least {} are recommended",
            ticket.secret.len(),
            RECOMMENDED_SECRET_LEN
        ));
    }

    match &config.acl {
        None => warnings.push(
            "No ACL configured; permission checks need a context supplied by the caller"
                .to_string(),
        ),
        Some(acl) if acl.rules.is_empty() => {
            warnings.push("ACL has no rules; every permission is denied".to_string())
        }
        Some(_) => {}
    }

    if !config.cookie.secure {
        warnings.push("Ticket cookie is sent over plain HTTP (cookie.secure is false)".to_string());
    }
    if !config.cookie.http_only {
        warnings.push("Ticket cookie is readable by scripts (cookie.http_only is false)".to_string());
    }

    Ok(warnings)
}

/// Executes the `validate` command to validate configuration.
pub fn validate(cli: &Cli, args: &ValidateArgs) -> BinResult<()> {
    let config_path = &cli.config;
    let config = super::load(config_path).map_err(|e| e.with_context("Configuration validation failed"))?;

    // Build everything a server would build at startup.
    let policy = config.ticket_policy()?;
    let context = config.acl_context();
    let warnings = collect_warnings(&config)?;

    let rule_count = config.acl.as_ref().map_or(0, |acl| acl.rules.len());
    let context_kind = config.acl.as_ref().map(|acl| acl.context.as_str());

    match args.format {
        OutputFormat::Text => {
            println!("✓ Configuration is valid: {}", config_path.display());
            println!();
            println!("Summary:");
            println!("  Max age:      {}s", policy.max_age());
            match policy.reissue_time() {
                Some(reissue) => println!("  Reissue:      below {}s remaining", reissue),
                None => println!("  Reissue:      disabled"),
            }
            println!("  Digest:       {}", policy.digest());
            println!("  Include IP:   {}", if policy.include_ip() { "yes" } else { "no" });
            println!("  Clock skew:   {}s", policy.clock_skew());
            println!("  Cookie:       {}", config.cookie.name);
            println!(
                "  ACL:          {}",
                match (context_kind, context.is_some()) {
                    (Some(kind), true) => format!("{} rules ({})", rule_count, kind),
                    _ => "not configured".to_string(),
                }
            );
            println!("  Identities:   {}", config.groups.identities.len());

            if !warnings.is_empty() {
                println!();
                println!("Warnings:");
                for warning in &warnings {
                    println!("  ⚠ {}", warning);
                }
            }

            if args.show_config {
                println!();
                println!("Parsed configuration:");
                println!("{}", serde_json::to_string_pretty(&masked(&config)).unwrap_or_default());
            }
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "valid": true,
                "config_path": config_path.display().to_string(),
                "summary": {
                    "max_age": policy.max_age(),
                    "reissue_time": policy.reissue_time(),
                    "digest": policy.digest().as_str(),
                    "include_ip": policy.include_ip(),
                    "clock_skew": policy.clock_skew(),
                    "cookie_name": config.cookie.name,
                    "cookie_same_site": config.cookie.same_site.as_str(),
                    "acl_context": context_kind,
                    "acl_rules": rule_count,
                },
                "warnings": warnings,
                "config": if args.show_config { Some(masked(&config)) } else { None },
            });
            println!("{}", serde_json::to_string_pretty(&output).unwrap_or_default());
        }
    }

    if args.strict && !warnings.is_empty() {
        return Err(BinError::Configuration(format!(
            "Strict mode: {} warning(s) found",
            warnings.len()
        )));
    }

    Ok(())
}

/// Serializes the configuration with the secret replaced.
fn masked(config: &WardenConfig) -> serde_json::Value {
    let mut value = serde_json::to_value(config).unwrap_or_default();
    if let Some(secret) = value.pointer_mut("/ticket/secret") {
        if !secret.is_null() {
            *secret = serde_json::Value::String("***".to_string());
        }
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use warden_config::{load_config_str, ConfigFormat};

    #[test]
    fn test_warnings() {
        let config = load_config_str("ticket:\n  secret: short\n", ConfigFormat::Yaml).unwrap();
        let warnings = collect_warnings(&config).unwrap();
        assert!(warnings.iter().any(|w| w.contains("5 bytes")));
        assert!(warnings.iter().any(|w| w.contains("No ACL")));
        assert!(warnings.iter().any(|w| w.contains("cookie.secure")));
    }

    #[test]
    fn test_no_warnings_for_hardened_config() {
        let yaml = r#"
ticket:
  secret: a-long-enough-ticket-secret
cookie:
  secure: true
acl:
  rules:
    - effect: allow
      principal: everyone
      permissions: [view]
"#;
        let config = load_config_str(yaml, ConfigFormat::Yaml).unwrap();
        assert!(collect_warnings(&config).unwrap().is_empty());
    }

    #[test]
    fn test_masked_hides_secret() {
        let config =
            load_config_str("ticket:\n  secret: do-not-print-me\n", ConfigFormat::Yaml).unwrap();
        let json = masked(&config).to_string();
        assert!(!json.contains("do-not-print-me"));
        assert!(json.contains("***"));
    }

    #[test]
    fn test_validate_file() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "ticket:\n  secret: validate-command-secret\n  max_age: 30m").unwrap();

        let cli = <Cli as clap::Parser>::parse_from([
            "warden",
            "-c",
            file.path().to_str().unwrap(),
            "validate",
        ]);
        assert!(validate(&cli, &ValidateArgs::default()).is_ok());

        let strict = ValidateArgs {
            strict: true,
            ..ValidateArgs::default()
        };
        assert_eq!(validate(&cli, &strict).unwrap_err().exit_code(), 1);
    }

    #[test]
    fn test_validate_missing_file() {
        let cli = <Cli as clap::Parser>::parse_from([
            "warden",
            "-c",
            "/nonexistent/warden.yaml",
            "validate",
        ]);
        assert_eq!(validate(&cli, &ValidateArgs::default()).unwrap_err().exit_code(), 1);
    }
}
