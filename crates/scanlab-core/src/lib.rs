// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scanlab — Core types, error definitions, configuration, and the four-point
// rectification geometry shared across all crates.

pub mod config;
pub mod error;
pub mod geometry;
pub mod human_errors;

pub use config::{AppConfig, ScanConfig, SkinConfig, TransferConfig};
pub use error::ScanlabError;
pub use geometry::{
    Canvas, Correspondence, OrderedQuad, Point2D, UnorderedQuad, compute_canvas, order_points,
};
