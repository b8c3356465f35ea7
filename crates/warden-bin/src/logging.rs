// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Logging and tracing initialization.
//!
//! Logs go to stderr so that tokens and secrets printed on stdout stay
//! pipeable.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cli::LogFormat;

/// Initializes the logging subsystem.
///
/// `RUST_LOG` takes precedence over `level` when set.
///
/// # Example
///
/// ```ignore
/// use warden_bin::logging::init_logging;
/// use warden_bin::cli::LogFormat;
///
/// init_logging("info", LogFormat::Text);
/// ```
pub fn init_logging(level: &str, format: LogFormat) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(env_filter);
    let is_terminal = std::io::IsTerminal::is_terminal(&std::io::stderr());

    // A second initialization (tests, embedding) keeps the first subscriber.
    let result = match format {
        LogFormat::Text => registry
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_ansi(is_terminal),
            )
            .try_init(),
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_current_span(true),
            )
            .try_init(),
        LogFormat::Compact => registry
            .with(
                fmt::layer()
                    .compact()
                    .with_writer(std::io::stderr)
                    .with_target(false)
                    .with_ansi(is_terminal),
            )
            .try_init(),
    };

    if let Err(e) = result {
        tracing::debug!(error = %e, "Logging already initialized");
    }
}

/// Returns a human-readable description of log levels.
pub fn log_level_help() -> &'static str {
    r#"Log levels (from most to least verbose):
  trace  - Very detailed debugging information
  debug  - Ticket rejections and ACL decisions
  info   - General informational messages (default)
  warn   - Warning messages
  error  - Error messages only"#
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_twice_is_harmless() {
        init_logging("debug", LogFormat::Compact);
        init_logging("not a level ===", LogFormat::Json);
    }

    #[test]
    fn test_help_lists_levels() {
        let help = log_level_help();
        for level in ["trace", "debug", "info", "warn", "error"] {
            assert!(help.contains(level));
        }
    }
}
