// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `gen-secret` command.

use std::fs;

use anyhow::Context as _;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use rand::RngCore;
use warden_core::ticket::RECOMMENDED_SECRET_LEN;

use crate::cli::{Cli, GenSecretArgs, SecretFormat};
use crate::error::{BinError, BinResult};

/// Encodes secret bytes for the config file.
pub fn encode_secret(bytes: &[u8], format: SecretFormat) -> String {
    match format {
        SecretFormat::Hex => hex::encode(bytes),
        SecretFormat::Base64 => STANDARD.encode(bytes),
    }
}

/// Executes the `gen-secret` command.
pub fn gen_secret(_cli: &Cli, args: &GenSecretArgs) -> BinResult<()> {
    if args.bytes < RECOMMENDED_SECRET_LEN {
        return Err(BinError::config(format!(
            "Secrets shorter than {} bytes are not generated",
            RECOMMENDED_SECRET_LEN
        )));
    }

    let mut secret = vec![0u8; args.bytes];
    rand::thread_rng().fill_bytes(&mut secret);
    let output = encode_secret(&secret, args.format);

    if let Some(path) = &args.output {
        fs::write(path, &output)
            .with_context(|| format!("writing secret to {}", path.display()))?;
        eprintln!("Secret written to: {}", path.display());
    } else {
        println!("{}", output);
    }

    let encoding = match args.format {
        SecretFormat::Hex => "hex",
        SecretFormat::Base64 => "base64",
    };
    eprintln!();
    eprintln!("Use it in the ticket section:");
    eprintln!("  secret: ${{WARDEN_SECRET}}");
    eprintln!("  secret_encoding: {}", encoding);

    Ok(())
}
