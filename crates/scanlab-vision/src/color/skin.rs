// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Skin detection — HSV range masking cleaned up with erosion, dilation, and a
// light blur, then applied to the frame.

use image::{DynamicImage, GrayImage, Luma, Rgb, RgbImage};
use imageproc::distance_transform::Norm;
use imageproc::filter::gaussian_blur_f32;
use imageproc::morphology::{dilate, erode};
use palette::{FromColor, Hsv, Srgb};
use scanlab_core::config::SkinConfig;
use scanlab_core::error::{Result, ScanlabError};
use tracing::{debug, instrument};

use crate::image::processor::ImageProcessor;

/// Output of [`SkinDetector::detect`] for one frame.
#[derive(Debug, Clone)]
pub struct SkinDetection {
    /// The frame after resizing to the configured width.
    pub frame: RgbImage,
    /// Cleaned-up skin mask (non-zero = skin).
    pub mask: GrayImage,
    /// `frame` with every non-skin pixel blacked out.
    pub skin: RgbImage,
}

/// Detects skin-colored regions frame by frame.
pub struct SkinDetector {
    config: SkinConfig,
}

impl SkinDetector {
    pub fn new(config: SkinConfig) -> Self {
        Self { config }
    }

    /// Resize `frame`, mask the pixels whose HSV falls inside the configured
    /// bounds, clean the mask, and apply it.
    ///
    /// Fails with [`ScanlabError::Config`] when the detector was built from
    /// an invalid [`SkinConfig`].
    #[instrument(skip_all, fields(width = frame.width(), height = frame.height()))]
    pub fn detect(&self, frame: &RgbImage) -> Result<SkinDetection> {
        self.config.validate()?;
        if frame.width() == 0 || frame.height() == 0 {
            return Err(ScanlabError::InvalidArgument("frame has no pixels".into()));
        }

        let frame = ImageProcessor::from_dynamic(DynamicImage::ImageRgb8(frame.clone()))
            .resize_to_width(self.config.frame_width)
            .into_dynamic()
            .to_rgb8();

        let mut mask = in_range_mask(&frame, self.config.hsv_lower, self.config.hsv_upper);
        for _ in 0..self.config.erode_iterations {
            mask = erode(&mask, Norm::L1, self.config.kernel_radius);
        }
        for _ in 0..self.config.dilate_iterations {
            mask = dilate(&mask, Norm::L1, self.config.kernel_radius);
        }
        let mask = gaussian_blur_f32(&mask, self.config.mask_blur_sigma);

        let skin = apply_mask(&frame, &mask);
        debug!(skin_fraction = skin_fraction(&mask), "Skin mask computed");

        Ok(SkinDetection { frame, mask, skin })
    }
}

/// HSV on the 8-bit OpenCV scale: hue `0..=180` (degrees halved), saturation
/// and value `0..=255`. Hues just below 360° round up to 180, not 0.
pub fn hsv_u8(pixel: Rgb<u8>) -> [u8; 3] {
    let Rgb([r, g, b]) = pixel;
    let hsv: Hsv = Hsv::from_color(Srgb::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0));
    let hue = (hsv.hue.into_positive_degrees() / 2.0).round().min(180.0);
    [
        hue as u8,
        (hsv.saturation.clamp(0.0, 1.0) * 255.0).round() as u8,
        (hsv.value.clamp(0.0, 1.0) * 255.0).round() as u8,
    ]
}

/// 255 where every HSV component lies within `lower..=upper`, 0 elsewhere.
pub fn in_range_mask(image: &RgbImage, lower: [u8; 3], upper: [u8; 3]) -> GrayImage {
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        let hsv = hsv_u8(*image.get_pixel(x, y));
        let inside = (0..3).all(|c| (lower[c]..=upper[c]).contains(&hsv[c]));
        Luma([if inside { 255 } else { 0 }])
    })
}

/// Keep `image` pixels where `mask` is non-zero; black out the rest.
///
/// # Panics
///
/// Panics if `mask` is smaller than `image`.
pub fn apply_mask(image: &RgbImage, mask: &GrayImage) -> RgbImage {
    RgbImage::from_fn(image.width(), image.height(), |x, y| {
        if mask.get_pixel(x, y).0[0] > 0 {
            *image.get_pixel(x, y)
        } else {
            Rgb([0, 0, 0])
        }
    })
}

/// Share of non-zero mask pixels, in `0.0..=1.0`.
pub fn skin_fraction(mask: &GrayImage) -> f32 {
    let total = mask.width() as u64 * mask.height() as u64;
    if total == 0 {
        return 0.0;
    }
    let on = mask.pixels().filter(|p| p.0[0] > 0).count() as u64;
    on as f32 / total as f32
}
