// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Scanlab.

use thiserror::Error;

/// Top-level error type for all Scanlab operations.
#[derive(Debug, Error)]
pub enum ScanlabError {
    // -- Caller errors --
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    // -- Image errors --
    #[error("image processing failed: {0}")]
    ImageError(String),

    #[error("failed to find polygon with four points")]
    NoDocumentFound,

    #[error("perspective transform failed: {0}")]
    Transform(String),

    // -- Storage / persistence --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ScanlabError>;
