// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scan enhancement — grayscale conversion and adaptive binarization that gives
// a rectified page its black-and-white "scanned paper" look.

use image::{DynamicImage, GrayImage, Luma};
use tracing::{debug, info, instrument};

/// Enhances rectified document images.
pub struct ScanEnhancer {
    /// The working image (kept as `DynamicImage` for flexibility).
    image: DynamicImage,
}

impl ScanEnhancer {
    // -- Construction ---------------------------------------------------------

    /// Create an enhancer wrapping an existing `DynamicImage`.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self { image }
    }

    // -- Accessors ------------------------------------------------------------

    /// Consume the enhancer and return the image as 8-bit luma.
    pub fn into_luma8(self) -> GrayImage {
        match self.image {
            DynamicImage::ImageLuma8(gray) => gray,
            other => other.to_luma8(),
        }
    }

    // -- Binarization ---------------------------------------------------------

    /// Apply adaptive thresholding to produce a black-and-white image.
    ///
    /// Uses a local mean approach: for each pixel, the threshold is the mean
    /// intensity within a `block_radius` neighbourhood, minus a constant `c`.
    /// Pixels darker than the local threshold become black; others become white.
    ///
    /// The document scanner uses `block_radius` 125 (a 251-pixel window) and
    /// `c` 10.
    #[instrument(skip(self))]
    pub fn binarize(self, block_radius: u32, c: i32) -> Self {
        let gray = self.image.to_luma8();
        let (width, height) = gray.dimensions();
        info!(width, height, "Applying adaptive binarization");

        // Compute the integral image for fast local mean calculation.
        let integral = compute_integral_image(&gray);

        let output = GrayImage::from_fn(width, height, |x, y| {
            let local_mean = region_mean(&integral, width, height, x, y, block_radius);
            let threshold = (local_mean - c as f64).clamp(0.0, 255.0);
            let pixel_val = gray.get_pixel(x, y).0[0] as f64;
            Luma([if pixel_val < threshold { 0u8 } else { 255u8 }])
        });

        debug!("Binarization complete");
        Self {
            image: DynamicImage::ImageLuma8(output),
        }
    }
}

// -- Integral image helpers ---------------------------------------------------

/// Compute the integral (summed-area table) of a grayscale image.
///
/// `integral[y * (width+1) + x]` contains the sum of all pixel values in the
/// rectangle [0, 0) to (x, y) (exclusive on both axes). The table has
/// dimensions `(width+1) x (height+1)` with a zero-padded border.
fn compute_integral_image(gray: &GrayImage) -> Vec<u64> {
    let (w, h) = gray.dimensions();
    let stride = (w + 1) as usize;
    let mut table = vec![0u64; stride * (h + 1) as usize];

    for y in 0..h {
        let mut row_sum: u64 = 0;
        for x in 0..w {
            row_sum += gray.get_pixel(x, y).0[0] as u64;
            let idx = (y + 1) as usize * stride + (x + 1) as usize;
            let above = y as usize * stride + (x + 1) as usize;
            table[idx] = row_sum + table[above];
        }
    }

    table
}

/// Mean pixel value within the square of the given radius centred on
/// (cx, cy), clamped to the image bounds.
fn region_mean(
    integral: &[u64],
    img_width: u32,
    img_height: u32,
    cx: u32,
    cy: u32,
    radius: u32,
) -> f64 {
    let stride = (img_width + 1) as usize;

    let x1 = cx.saturating_sub(radius) as usize;
    let y1 = cy.saturating_sub(radius) as usize;
    let x2 = (cx as usize + radius as usize + 1).min(img_width as usize);
    let y2 = (cy as usize + radius as usize + 1).min(img_height as usize);

    let area = ((x2 - x1) * (y2 - y1)) as f64;
    if area == 0.0 {
        return 128.0;
    }

    // S = I[y2][x2] - I[y1][x2] - I[y2][x1] + I[y1][x1]
    let sum = integral[y2 * stride + x2] as f64
        - integral[y1 * stride + x2] as f64
        - integral[y2 * stride + x1] as f64
        + integral[y1 * stride + x1] as f64;

    sum / area
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_page_stays_white() {
        let img = DynamicImage::ImageLuma8(GrayImage::from_pixel(60, 40, Luma([200u8])));
        let out = ScanEnhancer::from_dynamic(img).binarize(15, 10).into_luma8();
        assert!(out.pixels().all(|p| p.0[0] == 255));
    }

    #[test]
    fn dark_ink_on_light_paper_turns_black() {
        let mut img = GrayImage::from_pixel(80, 80, Luma([210u8]));
        for y in 38..42 {
            for x in 10..70 {
                img.put_pixel(x, y, Luma([40u8]));
            }
        }
        let out = ScanEnhancer::from_dynamic(DynamicImage::ImageLuma8(img))
            .binarize(15, 10)
            .into_luma8();

        assert_eq!(out.get_pixel(40, 40).0[0], 0);
        assert_eq!(out.get_pixel(40, 10).0[0], 255);
        assert_eq!(out.get_pixel(5, 70).0[0], 255);
    }

    #[test]
    fn uneven_lighting_is_flattened() {
        // Brightness ramps from 100 to 227 across the page; a global threshold
        // would blacken the dim side.
        let img = GrayImage::from_fn(128, 32, |x, _| Luma([100 + x as u8]));
        let out = ScanEnhancer::from_dynamic(DynamicImage::ImageLuma8(img))
            .binarize(8, 10)
            .into_luma8();
        assert!(out.pixels().all(|p| p.0[0] == 255));
    }

    #[test]
    fn integral_image_sums_regions() {
        let gray = GrayImage::from_fn(4, 3, |x, y| Luma([(x + y * 4) as u8]));
        let integral = compute_integral_image(&gray);
        // Whole image: 0 + 1 + ... + 11 = 66, over 12 pixels.
        let mean = region_mean(&integral, 4, 3, 1, 1, 10);
        assert!((mean - 66.0 / 12.0).abs() < 1e-9);
    }

    #[test]
    fn color_input_is_accepted() {
        let img = DynamicImage::ImageRgb8(image::RgbImage::from_pixel(10, 10, image::Rgb([250, 250, 250])));
        let out = ScanEnhancer::from_dynamic(img).binarize(3, 10).into_luma8();
        assert_eq!(out.dimensions(), (10, 10));
        assert!(out.pixels().all(|p| p.0[0] == 255));
    }
}
