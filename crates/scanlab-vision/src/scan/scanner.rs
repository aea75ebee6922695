// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document scanner — edge detection on a preview, page outline search,
// full-resolution rectification, and binarization into a top-down scan.

use image::{DynamicImage, GrayImage, Rgb, RgbImage};
use imageproc::distance_transform::Norm;
use imageproc::drawing::draw_line_segment_mut;
use imageproc::edges::canny;
use imageproc::filter::gaussian_blur_f32;
use imageproc::morphology::dilate;
use scanlab_core::config::ScanConfig;
use scanlab_core::error::{Result, ScanlabError};
use scanlab_core::geometry::UnorderedQuad;
use tracing::{debug, info, instrument, warn};

use crate::image::processor::ImageProcessor;
use crate::scan::detect::find_document_quad;
use crate::scan::enhance::ScanEnhancer;
use crate::scan::rectify::rectify;

const OUTLINE_COLOR: Rgb<u8> = Rgb([0, 255, 0]);

/// Every stage image produced by [`DocumentScanner::scan`].
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    /// Canny edge map of the preview.
    pub edged: GrayImage,
    /// Preview with the detected page outline drawn in green.
    pub outline: RgbImage,
    /// Page corners in preview coordinates.
    pub quad: UnorderedQuad,
    /// Original height over preview height.
    pub ratio: f32,
    /// Full-resolution top-down view of the page.
    pub warped: DynamicImage,
    /// `warped` after grayscale conversion and adaptive binarization.
    pub scanned: GrayImage,
}

/// Turns a photo of a page into a flat black-and-white scan.
///
/// ## Pipeline
///
/// 1. Downscale to `preview_height`, remembering the ratio
/// 2. Grayscale, Gaussian blur, Canny edge detection
/// 3. Find the largest contour that approximates to four points
/// 4. Rectify the *original* image using the preview corners times the ratio
/// 5. Grayscale and adaptive binarization
pub struct DocumentScanner {
    config: ScanConfig,
}

impl DocumentScanner {
    pub fn new(config: ScanConfig) -> Self {
        Self { config }
    }

    /// Run the full pipeline on `image`.
    ///
    /// Fails with [`ScanlabError::NoDocumentFound`] when no four-point page
    /// outline exists, with [`ScanlabError::Transform`] when the outline
    /// cannot be warped, or with [`ScanlabError::Config`] when the scanner
    /// was built from an invalid [`ScanConfig`].
    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    pub fn scan(&self, image: &DynamicImage) -> Result<ScanOutcome> {
        self.config.validate()?;
        if image.width() == 0 || image.height() == 0 {
            return Err(ScanlabError::InvalidArgument("cannot scan an empty image".into()));
        }
        info!("Starting document scan");

        // Step 1: preview.
        let ratio = image.height() as f32 / self.config.preview_height as f32;
        let preview = ImageProcessor::resized_to_height(image, self.config.preview_height);
        debug!(
            ratio,
            preview_w = preview.width(),
            preview_h = preview.height(),
            "Preview created"
        );

        // Step 2: edges.
        let edged = self.detect_edges(&preview);
        info!("STEP 1: Edge detection complete");

        // Step 3: page outline.
        let quad = match find_document_quad(
            &edged,
            self.config.max_candidates,
            self.config.approx_epsilon_ratio,
        ) {
            Some(q) => q,
            None => {
                warn!("No four-point page outline found; aborting scan");
                return Err(ScanlabError::NoDocumentFound);
            }
        };
        let mut outline = preview.to_rgb8();
        draw_quad(&mut outline, &quad, OUTLINE_COLOR);
        info!(corners = ?quad.points(), "STEP 2: Page outline found");

        // Step 4+5: rectify the original, then binarize.
        let warped = rectify(image, &quad, ratio)?;
        let scanned = ScanEnhancer::from_dynamic(warped.clone())
            .binarize(self.config.threshold_block_radius, self.config.threshold_offset)
            .into_luma8();
        info!(
            out_w = scanned.width(),
            out_h = scanned.height(),
            "STEP 3: Perspective transform applied"
        );

        Ok(ScanOutcome {
            edged,
            outline,
            quad,
            ratio,
            warped,
            scanned,
        })
    }

    /// Grayscale, blur, Canny, and (optionally) a small dilation that
    /// closes gaps at corners.
    pub fn detect_edges(&self, preview: &DynamicImage) -> GrayImage {
        let gray = preview.to_luma8();
        let blurred = gaussian_blur_f32(&gray, self.config.blur_sigma);
        let edges = canny(&blurred, self.config.canny_low, self.config.canny_high);
        if self.config.edge_dilate_radius == 0 {
            edges
        } else {
            dilate(&edges, Norm::LInf, self.config.edge_dilate_radius)
        }
    }
}

/// Draw the closed outline of `quad`, two pixels wide.
fn draw_quad(canvas: &mut RgbImage, quad: &UnorderedQuad, color: Rgb<u8>) {
    let points = quad.points();
    for i in 0..points.len() {
        let a = points[i];
        let b = points[(i + 1) % points.len()];
        draw_line_segment_mut(canvas, (a.x, a.y), (b.x, b.y), color);
        draw_line_segment_mut(canvas, (a.x + 1.0, a.y + 1.0), (b.x + 1.0, b.y + 1.0), color);
    }
}
