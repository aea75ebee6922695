// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pipeline configuration. Defaults carry the constants the scanner, color
// transfer, and skin detector have always used.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::error::{Result, ScanlabError};

/// Settings for every Scanlab pipeline, loadable from a JSON file.
///
/// Missing sections and fields fall back to their defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub scan: ScanConfig,
    pub transfer: TransferConfig,
    pub skin: SkinConfig,
}

impl AppConfig {
    /// Read and validate a JSON configuration file.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        info!("Configuration loaded");
        Ok(config)
    }

    /// Write the configuration as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let raw = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), raw)?;
        debug!(path = %path.as_ref().display(), "Configuration written");
        Ok(())
    }

    /// Reject values the pipelines cannot run with.
    pub fn validate(&self) -> Result<()> {
        self.scan.validate()?;
        self.transfer.validate()?;
        self.skin.validate()
    }
}

/// Document scanner settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Height of the downscaled preview that edge and contour detection run on.
    pub preview_height: u32,
    /// Gaussian sigma applied before edge detection.
    pub blur_sigma: f32,
    /// Canny hysteresis thresholds.
    pub canny_low: f32,
    pub canny_high: f32,
    /// Radius of the dilation that closes single-pixel gaps in the edge map
    /// (0 disables it).
    pub edge_dilate_radius: u8,
    /// How many of the largest contours are tried as document candidates.
    pub max_candidates: usize,
    /// Douglas–Peucker tolerance as a fraction of the contour perimeter.
    pub approx_epsilon_ratio: f64,
    /// Adaptive threshold neighbourhood radius (window is `2r + 1`).
    pub threshold_block_radius: u32,
    /// Constant subtracted from the local mean.
    pub threshold_offset: i32,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            preview_height: 500,
            // OpenCV's sigma for a 5x5 kernel with sigma 0.
            blur_sigma: 1.1,
            canny_low: 75.0,
            canny_high: 200.0,
            edge_dilate_radius: 1,
            max_candidates: 5,
            approx_epsilon_ratio: 0.02,
            threshold_block_radius: 125,
            threshold_offset: 10,
        }
    }
}

impl ScanConfig {
    pub fn validate(&self) -> Result<()> {
        if self.preview_height == 0 {
            return Err(ScanlabError::Config("scan.preview_height must be > 0".into()));
        }
        if !(self.blur_sigma > 0.0) {
            return Err(ScanlabError::Config("scan.blur_sigma must be > 0".into()));
        }
        if !(self.canny_low >= 0.0 && self.canny_low <= self.canny_high) {
            return Err(ScanlabError::Config(format!(
                "scan.canny_low ({}) must be within 0..=canny_high ({})",
                self.canny_low, self.canny_high
            )));
        }
        if self.max_candidates == 0 {
            return Err(ScanlabError::Config("scan.max_candidates must be > 0".into()));
        }
        if !(self.approx_epsilon_ratio > 0.0 && self.approx_epsilon_ratio < 1.0) {
            return Err(ScanlabError::Config(
                "scan.approx_epsilon_ratio must be within (0, 1)".into(),
            ));
        }
        Ok(())
    }
}

/// Color transfer settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransferConfig {
    /// Width each panel is resized to in the side-by-side preview.
    pub preview_width: u32,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self { preview_width: 300 }
    }
}

impl TransferConfig {
    pub fn validate(&self) -> Result<()> {
        if self.preview_width == 0 {
            return Err(ScanlabError::Config("transfer.preview_width must be > 0".into()));
        }
        Ok(())
    }
}

/// Skin detector settings. HSV bounds use the 8-bit OpenCV scale: hue
/// `0..=180`, saturation and value `0..=255`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkinConfig {
    /// Frames are resized to this width before detection.
    pub frame_width: u32,
    pub hsv_lower: [u8; 3],
    pub hsv_upper: [u8; 3],
    /// Radius of the structuring element (5 ≈ an 11x11 kernel).
    pub kernel_radius: u8,
    pub erode_iterations: u32,
    pub dilate_iterations: u32,
    /// Gaussian sigma for smoothing the mask.
    pub mask_blur_sigma: f32,
}

impl Default for SkinConfig {
    fn default() -> Self {
        Self {
            frame_width: 400,
            hsv_lower: [0, 48, 80],
            hsv_upper: [20, 255, 255],
            kernel_radius: 5,
            erode_iterations: 2,
            dilate_iterations: 2,
            // OpenCV's sigma for a 3x3 kernel with sigma 0.
            mask_blur_sigma: 0.8,
        }
    }
}

impl SkinConfig {
    pub fn validate(&self) -> Result<()> {
        if self.frame_width == 0 {
            return Err(ScanlabError::Config("skin.frame_width must be > 0".into()));
        }
        if self.hsv_lower[0] > 180 || self.hsv_upper[0] > 180 {
            return Err(ScanlabError::Config("skin hue bounds must be within 0..=180".into()));
        }
        if self
            .hsv_lower
            .iter()
            .zip(self.hsv_upper.iter())
            .any(|(lo, hi)| lo > hi)
        {
            return Err(ScanlabError::Config(format!(
                "skin.hsv_lower {:?} exceeds skin.hsv_upper {:?}",
                self.hsv_lower, self.hsv_upper
            )));
        }
        if !(self.mask_blur_sigma > 0.0) {
            return Err(ScanlabError::Config("skin.mask_blur_sigma must be > 0".into()));
        }
        Ok(())
    }
}
