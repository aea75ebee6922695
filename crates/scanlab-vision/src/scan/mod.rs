// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scanning pipeline — document outline detection, four-point perspective
// rectification, binarization, and the end-to-end document scanner.

pub mod detect;
pub mod enhance;
pub mod rectify;
pub mod scanner;

pub use enhance::ScanEnhancer;
pub use scanner::{DocumentScanner, ScanOutcome};
