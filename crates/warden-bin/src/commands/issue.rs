// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `issue` command.

use warden_config::WardenConfig;
use warden_core::unix_now;

use crate::cli::{Cli, IssueArgs};
use crate::error::BinResult;

/// Issues a ticket with the configured policy.
pub fn issue_token(config: &WardenConfig, args: &IssueArgs) -> BinResult<String> {
    let policy = config.ticket_policy()?;
    let now = args.at.unwrap_or_else(unix_now);
    let token = policy.issue_for(&args.identity, args.ip, now)?;

    tracing::info!(identity = %args.identity, issue_time = now, "Ticket issued");
    Ok(token)
}

/// Executes the `issue` command and prints the token.
pub fn issue(cli: &Cli, args: &IssueArgs) -> BinResult<()> {
    let config = super::load(&cli.config)?;
    println!("{}", issue_token(&config, args)?);
    Ok(())
}
