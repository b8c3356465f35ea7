// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `version` command.

use crate::cli::Cli;
use crate::error::BinResult;

/// Executes the `version` command to display version information.
pub fn version(cli: &Cli) -> BinResult<()> {
    println!("warden - ticket authentication and ordered ACL evaluation");
    println!();
    println!("Version Information:");
    println!("  warden-bin:    {}", crate::VERSION);
    println!("  warden-core:   {}", warden_core::VERSION);
    println!("  warden-config: {}", warden_config::VERSION);

    if cli.is_verbose() {
        println!();
        println!("Build Information:");
        println!("  Target:        {}", std::env::consts::ARCH);
        println!("  OS:            {}", std::env::consts::OS);
    }

    println!();
    println!("License: PolyForm Noncommercial License 1.0.0");
    println!("Copyright (c) 2025 Sylvex. All rights reserved.");

    Ok(())
}
