// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! CLI argument parsing and command definitions.
//!
//! - `issue`: Issue a ticket for an identity
//! - `verify`: Decode and verify a ticket
//! - `check`: Evaluate a permission against the configured ACL
//! - `validate`: Validate the configuration file
//! - `gen-secret`: Generate a ticket signing secret
//! - `version`: Show version information

use std::net::IpAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use warden_config::{LogLevel, LoggingConfig};
use warden_core::AclContextKind;

// =============================================================================
// Main CLI Structure
// =============================================================================

/// warden - ticket authentication and ordered ACL evaluation
#[derive(Parser, Debug)]
#[command(
    name = "warden",
    author = "Sylvex <contact@sylvex.io>",
    version = warden_core::VERSION,
    about = "Ticket authentication and ordered ACL evaluation",
    long_about = None,
    propagate_version = true
)]
pub struct Cli {
    /// Configuration file path
    #[arg(
        short,
        long,
        default_value = "warden.yaml",
        env = "WARDEN_CONFIG",
        global = true
    )]
    pub config: PathBuf,

    /// Log level (trace, debug, info, warn, error); defaults to the config file
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    /// Log format (text, json, compact); defaults to the config file
    #[arg(long, global = true)]
    pub log_format: Option<LogFormat>,

    /// Enable quiet mode (warnings and errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

// =============================================================================
// Subcommands
// =============================================================================

/// Available subcommands for the warden CLI.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Issue a ticket for an identity
    Issue(IssueArgs),

    /// Decode and verify a ticket
    ///
    /// Prints the identity, age and remaining life of a valid ticket, or the
    /// rejection reason. Exits non-zero for rejected tickets.
    Verify(VerifyArgs),

    /// Evaluate a permission against the configured ACL
    ///
    /// Exits non-zero when the permission is denied.
    Check(CheckArgs),

    /// Validate the configuration file
    ///
    /// Parses and validates the configuration file, building the ticket
    /// policy and the ACL context.
    Validate(ValidateArgs),

    /// Generate a random ticket signing secret
    #[command(name = "gen-secret")]
    GenSecret(GenSecretArgs),

    /// Show detailed version information
    Version,
}

// =============================================================================
// Command Arguments
// =============================================================================

/// Arguments for the `issue` command.
#[derive(Args, Debug, Clone)]
pub struct IssueArgs {
    /// Identity to put in the ticket
    pub identity: String,

    /// Client address to bind when the policy includes the IP
    #[arg(long)]
    pub ip: Option<IpAddr>,

    /// Issue time as Unix seconds (default: now)
    #[arg(long)]
    pub at: Option<u64>,
}

/// Arguments for the `verify` command.
#[derive(Args, Debug, Clone)]
pub struct VerifyArgs {
    /// Ticket to verify (read from stdin when omitted)
    pub token: Option<String>,

    /// Client address the ticket is presented from
    #[arg(long)]
    pub ip: Option<IpAddr>,

    /// Verification time as Unix seconds (default: now)
    #[arg(long)]
    pub at: Option<u64>,

    /// Output format
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,
}

/// Arguments for the `check` command.
#[derive(Args, Debug, Clone)]
pub struct CheckArgs {
    /// Permission to check
    pub permission: String,

    /// Authenticated identity (anonymous when omitted)
    #[arg(short, long)]
    pub identity: Option<String>,

    /// Raw groups to use instead of the configured group lookup
    #[arg(short, long = "group")]
    pub groups: Vec<String>,

    /// Override the configured context representation
    #[arg(long)]
    pub context: Option<ContextArg>,

    /// Output format
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,
}

/// Arguments for the `validate` command.
#[derive(Args, Debug, Clone, Default)]
pub struct ValidateArgs {
    /// Show parsed configuration after validation (secret masked)
    #[arg(short, long)]
    pub show_config: bool,

    /// Output format for validation results
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,

    /// Strict mode: treat warnings as errors
    #[arg(long)]
    pub strict: bool,
}

/// Arguments for the `gen-secret` command.
#[derive(Args, Debug, Clone)]
pub struct GenSecretArgs {
    /// Number of random bytes
    #[arg(short, long, default_value = "32")]
    pub bytes: usize,

    /// Output encoding
    #[arg(short, long, default_value = "hex")]
    pub format: SecretFormat,

    /// Output file path (default: stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

// =============================================================================
// Enums
// =============================================================================

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// Human-readable text format
    #[default]
    Text,
    /// JSON format for structured logging
    Json,
    /// Compact format for minimal output
    Compact,
}

impl From<warden_config::LogFormat> for LogFormat {
    fn from(format: warden_config::LogFormat) -> Self {
        match format {
            warden_config::LogFormat::Text => LogFormat::Text,
            warden_config::LogFormat::Json => LogFormat::Json,
            warden_config::LogFormat::Compact => LogFormat::Compact,
        }
    }
}

/// Output format for command results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text format
    #[default]
    Text,
    /// JSON format for programmatic parsing
    Json,
}

/// Secret output encoding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum SecretFormat {
    /// Lowercase hexadecimal
    #[default]
    Hex,
    /// Standard base64
    Base64,
}

/// ACL context representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ContextArg {
    /// Linear scan
    Naive,
    /// Precompiled lookup
    Compiled,
}

impl From<ContextArg> for AclContextKind {
    fn from(arg: ContextArg) -> Self {
        match arg {
            ContextArg::Naive => AclContextKind::Naive,
            ContextArg::Compiled => AclContextKind::Compiled,
        }
    }
}

// =============================================================================
// Helper Methods
// =============================================================================

impl Cli {
    /// Parse CLI arguments from the command line.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Check if verbose logging is enabled.
    pub fn is_verbose(&self) -> bool {
        self.verbose && !self.quiet
    }

    /// Get the effective log level.
    ///
    /// Flags win over `--log-level`, which wins over the config file.
    pub fn effective_log_level(&self, file: Option<&LoggingConfig>) -> String {
        if self.quiet {
            "warn".to_string()
        } else if self.verbose {
            "debug".to_string()
        } else if let Some(level) = &self.log_level {
            level.clone()
        } else {
            file.map_or(LogLevel::default(), |logging| logging.level)
                .as_str()
                .to_string()
        }
    }

    /// Get the effective log format.
    pub fn effective_log_format(&self, file: Option<&LoggingConfig>) -> LogFormat {
        self.log_format
            .or_else(|| file.map(|logging| logging.format.into()))
            .unwrap_or_default()
    }
}

impl Default for GenSecretArgs {
    fn default() -> Self {
        Self {
            bytes: 32,
            format: SecretFormat::Hex,
            output: None,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
