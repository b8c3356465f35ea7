// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `verify` command.

use std::io::{self, Read};

use anyhow::Context as _;
use chrono::{DateTime, Utc};
use warden_config::WardenConfig;
use warden_core::{unix_now, Ticket};

use crate::cli::{Cli, OutputFormat, VerifyArgs};
use crate::error::{BinError, BinResult};

/// Verifies `token` with the configured policy at `now`.
pub fn inspect(config: &WardenConfig, token: &str, args: &VerifyArgs, now: u64) -> BinResult<Ticket> {
    let policy = config.ticket_policy()?;
    policy
        .inspect_for(token.trim(), args.ip, now)
        .map_err(BinError::Rejected)
}

/// Executes the `verify` command.
pub fn verify(cli: &Cli, args: &VerifyArgs) -> BinResult<()> {
    let config = super::load(&cli.config)?;
    let token = match &args.token {
        Some(token) => token.clone(),
        None => read_stdin()?,
    };
    let now = args.at.unwrap_or_else(unix_now);

    let result = inspect(&config, &token, args, now);
    match args.format {
        OutputFormat::Text => {
            if let Ok(ticket) = &result {
                print_text(ticket, now);
            }
        }
        OutputFormat::Json => {
            let output = match &result {
                Ok(ticket) => serde_json::json!({
                    "valid": true,
                    "identity": ticket.identity,
                    "issue_time": ticket.issue_time,
                    "age": ticket.age_at(now),
                    "remaining": ticket.remaining_at(now),
                    "expires_at": ticket.expires_at(),
                    "should_reissue": ticket.needs_reissue_at(now),
                }),
                Err(BinError::Rejected(reason)) => serde_json::json!({
                    "valid": false,
                    "reason": reason.as_str(),
                }),
                Err(_) => serde_json::Value::Null,
            };
            if !output.is_null() {
                println!("{}", serde_json::to_string_pretty(&output).unwrap_or_default());
            }
        }
    }

    result.map(|_| ())
}

fn print_text(ticket: &Ticket, now: u64) {
    println!("✓ Ticket is valid");
    println!("  Identity:   {}", ticket.identity);
    println!("  Issued:     {}", timestamp(ticket.issue_time));
    println!("  Expires:    {}", timestamp(ticket.expires_at()));
    println!("  Age:        {}s", ticket.age_at(now));
    println!("  Remaining:  {}s", ticket.remaining_at(now));
    println!(
        "  Reissue:    {}",
        if ticket.needs_reissue_at(now) { "due" } else { "not due" }
    );
}

fn timestamp(secs: u64) -> String {
    i64::try_from(secs)
        .ok()
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
        .map_or_else(|| secs.to_string(), |dt| dt.to_rfc3339())
}

fn read_stdin() -> BinResult<String> {
    let mut input = String::new();
    io::stdin()
        .read_to_string(&mut input)
        .context("reading ticket from stdin")?;
    Ok(input.trim().to_string())
}
