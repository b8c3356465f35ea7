// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! CLI command implementations.
//!
//! - `issue`: Issue a ticket
//! - `verify`: Verify a ticket
//! - `check`: Evaluate a permission
//! - `validate`: Validate configuration file
//! - `gen-secret`: Generate a signing secret
//! - `version`: Show version information

mod check;
mod gen_secret;
mod issue;
mod validate;
mod verify;
mod version;

pub use check::{check, evaluate};
pub use gen_secret::{encode_secret, gen_secret};
pub use issue::{issue, issue_token};
pub use validate::{collect_warnings, validate};
pub use verify::{inspect, verify};
pub use version::version;

use std::path::Path;

use warden_config::WardenConfig;

use crate::cli::{Cli, Commands};
use crate::error::{BinError, BinResult};

/// Executes the appropriate command based on CLI arguments.
pub async fn execute(cli: &Cli) -> BinResult<()> {
    match &cli.command {
        Commands::Issue(args) => issue::issue(cli, args),
        Commands::Verify(args) => verify::verify(cli, args),
        Commands::Check(args) => check::check(cli, args).await,
        Commands::Validate(args) => validate::validate(cli, args),
        Commands::GenSecret(args) => gen_secret::gen_secret(cli, args),
        Commands::Version => version::version(cli),
    }
}

/// Loads and validates the configuration file.
pub fn load(path: &Path) -> BinResult<WardenConfig> {
    if !path.exists() {
        return Err(BinError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }
    Ok(warden_config::load_config(path)?)
}
