// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! warden binary entry point.

use warden_bin::{cli::Cli, commands, error::report_error_and_exit, logging::init_logging};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse_args();

    // Logging settings may come from the config file; a broken file is
    // reported by the command itself.
    let file_logging = warden_config::ConfigLoader::new()
        .load(&cli.config)
        .ok()
        .map(|config| config.logging);
    init_logging(
        &cli.effective_log_level(file_logging.as_ref()),
        cli.effective_log_format(file_logging.as_ref()),
    );

    if let Err(e) = commands::execute(&cli).await {
        report_error_and_exit(e);
    }
}
