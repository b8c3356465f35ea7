// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `check` command.

use std::sync::Arc;

use warden_config::WardenConfig;
use warden_core::{
    AclAutzPolicy, AclContext, AclContextKind, AutzPolicy, AutzResult, GroupSource, StaticGroups,
};

use crate::cli::{CheckArgs, Cli, OutputFormat};
use crate::error::{BinError, BinResult};

/// Evaluates the permission in `args` against the configured ACL.
///
/// Explicit `--group` values replace the configured group lookup.
pub async fn evaluate(config: &WardenConfig, args: &CheckArgs) -> BinResult<bool> {
    let context = config.acl.as_ref().map(|acl| match args.context {
        Some(kind) => AclContextKind::from(kind).build(acl.rules.clone()),
        None => acl.build_context(),
    });
    let identity = args.identity.as_deref();

    let allowed = if args.groups.is_empty() {
        permit(config.group_source(), context, identity, &args.permission).await?
    } else {
        let groups = StaticGroups::new(args.groups.iter().cloned());
        permit(groups, context, identity, &args.permission).await?
    };
    Ok(allowed)
}

async fn permit<G: GroupSource>(
    groups: G,
    context: Option<Arc<dyn AclContext>>,
    identity: Option<&str>,
    permission: &str,
) -> AutzResult<bool> {
    let policy = AclAutzPolicy::new(groups);
    let policy = match context {
        Some(context) => policy.with_context(context),
        None => policy,
    };
    policy.permit(identity, permission, None).await
}

/// Executes the `check` command.
pub async fn check(cli: &Cli, args: &CheckArgs) -> BinResult<()> {
    let config = super::load(&cli.config)?;
    let allowed = evaluate(&config, args).await?;
    let identity = args.identity.as_deref().unwrap_or("(anonymous)");

    match args.format {
        OutputFormat::Text => {
            let verdict = if allowed { "✓ allowed" } else { "✗ denied" };
            println!("{verdict}: {identity} -> {}", args.permission);
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "permission": args.permission,
                "identity": args.identity,
                "allowed": allowed,
            });
            println!("{}", serde_json::to_string_pretty(&output).unwrap_or_default());
        }
    }

    if allowed {
        Ok(())
    } else {
        Err(BinError::denied(&args.permission))
    }
}
