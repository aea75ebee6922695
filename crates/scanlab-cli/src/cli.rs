// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "scanlab", version, about, long_about = None)]
pub struct Cli {
    /// JSON configuration file; built-in defaults are used without it.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Find the page in a photo and produce a top-down black-and-white scan.
    Scan {
        /// Photo of the document.
        #[arg(short, long)]
        image: PathBuf,
        /// Where the stage images are written.
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,
    },
    /// Transfer the color distribution of one image onto another.
    Transfer {
        /// Image whose colors are taken.
        #[arg(short, long)]
        source: PathBuf,
        /// Image that is recolored.
        #[arg(short, long)]
        target: PathBuf,
        /// Where the recolored image is saved.
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Save source, target, and result side by side.
        #[arg(long)]
        preview: Option<PathBuf>,
    },
    /// Mask skin-colored regions in an image or a directory of frames.
    Skin {
        /// Image file, or a directory whose images are processed in name order.
        #[arg(short, long)]
        input: PathBuf,
        /// Where the masks and masked frames are written.
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,
    },
}

pub fn parse() -> Cli {
    Cli::parse()
}
