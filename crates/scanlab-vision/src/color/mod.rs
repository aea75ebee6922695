// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Color pipelines — Lab statistics transfer between images and HSV-range
// skin detection.

pub mod skin;
pub mod transfer;

pub use skin::{SkinDetection, SkinDetector};
pub use transfer::{LabStats, color_transfer, lab_stats};
