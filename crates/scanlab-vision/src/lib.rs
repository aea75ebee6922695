// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// scanlab-vision — Pixel pipelines for Scanlab.
//
// Provides image loading and resizing, four-point perspective rectification,
// document outline detection, scan binarization, the end-to-end document
// scanner, Lab color transfer, and HSV skin detection.

pub mod color;
pub mod image;
pub mod scan;

// Re-export the primary entry points so callers can use `scanlab_vision::DocumentScanner` etc.
pub use color::skin::{SkinDetection, SkinDetector};
pub use color::transfer::{LabStats, color_transfer, lab_stats};
pub use crate::image::processor::ImageProcessor;
pub use scan::detect::find_document_quad;
pub use scan::enhance::ScanEnhancer;
pub use scan::rectify::{rectify, rectify_ordered};
pub use scan::scanner::{DocumentScanner, ScanOutcome};
