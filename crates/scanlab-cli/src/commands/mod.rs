// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Command dispatch. Each subcommand lives in its own module and takes its
// options explicitly.

pub mod scan;
pub mod skin;
pub mod transfer;

use std::path::Path;

use scanlab_core::AppConfig;
use scanlab_core::error::{Result, ScanlabError};
use tracing::debug;

use crate::cli::{Cli, Command};

pub fn run(cli: &Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None => {
            debug!("No configuration file given; using defaults");
            AppConfig::default()
        }
    };

    match &cli.command {
        Command::Scan { image, output_dir } => {
            scan::run(&config.scan, image, output_dir)?;
        }
        Command::Transfer {
            source,
            target,
            output,
            preview,
        } => {
            transfer::run(
                &config.transfer,
                source,
                target,
                output.as_deref(),
                preview.as_deref(),
            )?;
        }
        Command::Skin { input, output_dir } => {
            skin::run(&config.skin, input, output_dir)?;
        }
    }
    Ok(())
}

/// Create `dir` (and its parents) if it does not exist yet.
pub(crate) fn ensure_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir).map_err(|err| {
        ScanlabError::Io(std::io::Error::new(
            err.kind(),
            format!("cannot create {}: {err}", dir.display()),
        ))
    })
}
