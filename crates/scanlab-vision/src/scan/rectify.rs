// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Four-point perspective rectification — maps a photographed quadrilateral
// onto an upright rectangle ("top-down scan").

use image::{DynamicImage, Rgba, RgbaImage};
use imageproc::geometric_transformations::{Interpolation, Projection, warp_into};
use scanlab_core::error::{Result, ScanlabError};
use scanlab_core::geometry::{Canvas, OrderedQuad, UnorderedQuad, compute_canvas, order_points};
use tracing::{debug, info, instrument};

/// Rectify the region of `source` outlined by `approx_quad`.
///
/// The quad is usually found on a downscaled preview, so its coordinates are
/// first multiplied by `scale_ratio` to land on the full-resolution image.
/// The corners are then ordered and the canvas sized from them. The pixels
/// are warped onto that canvas through the solved homography.
///
/// The geometry itself cannot fail. Errors come from the transform step: a
/// correspondence the homography solver rejects, or a canvas with no area.
#[instrument(skip(source, approx_quad), fields(src_w = source.width(), src_h = source.height()))]
pub fn rectify(
    source: &DynamicImage,
    approx_quad: &UnorderedQuad,
    scale_ratio: f32,
) -> Result<DynamicImage> {
    if !(scale_ratio.is_finite() && scale_ratio > 0.0) {
        return Err(ScanlabError::InvalidArgument(format!(
            "scale ratio must be a positive number, got {scale_ratio}"
        )));
    }

    let scaled = approx_quad.scaled(scale_ratio);
    let ordered = order_points(&scaled);
    debug!(
        top_left = ?ordered.top_left,
        top_right = ?ordered.top_right,
        bottom_right = ?ordered.bottom_right,
        bottom_left = ?ordered.bottom_left,
        "Corners ordered"
    );

    let (warped, canvas) = rectify_ordered(&source.to_rgba8(), &ordered)?;
    info!(
        out_w = canvas.width,
        out_h = canvas.height,
        "Perspective rectification applied"
    );
    Ok(DynamicImage::ImageRgba8(warped))
}

/// Warp `source` so that `ordered` maps onto the corners of its canvas.
///
/// Returns the warped image together with the canvas it was sized to.
pub fn rectify_ordered(source: &RgbaImage, ordered: &OrderedQuad) -> Result<(RgbaImage, Canvas)> {
    let (canvas, correspondence) = compute_canvas(ordered);
    if canvas.is_degenerate() {
        return Err(ScanlabError::Transform(format!(
            "output canvas {}x{} is too small to rectify onto",
            canvas.width, canvas.height
        )));
    }

    // from_control_points solves the homography taking `src` onto `dst`.
    let (src, dst) = correspondence.control_points();
    let projection = Projection::from_control_points(src, dst).ok_or_else(|| {
        ScanlabError::Transform(format!(
            "no homography maps {src:?} onto {dst:?}; corners are coincident or collinear"
        ))
    })?;

    let default_pixel = Rgba([255u8, 255, 255, 255]);
    let mut output = RgbaImage::new(canvas.width, canvas.height);
    warp_into(source, &projection, Interpolation::Bilinear, default_pixel, &mut output);

    Ok((output, canvas))
}

#[cfg(test)]
mod tests {
    use super::*;
    use scanlab_core::geometry::Point2D;

    const RED: Rgba<u8> = Rgba([220, 20, 20, 255]);
    const BLUE: Rgba<u8> = Rgba([20, 20, 220, 255]);

    /// Bilinear sampling may land a unit off the exact value.
    fn is_red(pixel: &Rgba<u8>) -> bool {
        pixel[0] > 200 && pixel[2] < 40
    }

    /// 200x100 blue image with a red block covering [20, 120) x [10, 60).
    fn scene() -> DynamicImage {
        let img = RgbaImage::from_fn(200, 100, |x, y| {
            if (20..120).contains(&x) && (10..60).contains(&y) {
                RED
            } else {
                BLUE
            }
        });
        DynamicImage::ImageRgba8(img)
    }

    fn block_quad() -> UnorderedQuad {
        UnorderedQuad::new([
            Point2D::new(120.0, 60.0),
            Point2D::new(20.0, 10.0),
            Point2D::new(20.0, 60.0),
            Point2D::new(120.0, 10.0),
        ])
    }

    #[test]
    fn frontal_rectangle_keeps_its_aspect_ratio() {
        let out = rectify(&scene(), &block_quad(), 1.0).unwrap();
        assert_eq!((out.width(), out.height()), (100, 50));

        let rgba = out.to_rgba8();
        assert!(is_red(rgba.get_pixel(50, 25)));
        assert!(is_red(rgba.get_pixel(5, 5)));
        assert!(is_red(rgba.get_pixel(94, 44)));
    }

    #[test]
    fn preview_coordinates_are_scaled_up() {
        let half = block_quad().scaled(0.5);
        let out = rectify(&scene(), &half, 2.0).unwrap();
        assert_eq!((out.width(), out.height()), (100, 50));
        assert!(is_red(out.to_rgba8().get_pixel(50, 25)));
    }

    #[test]
    fn skewed_quad_is_straightened() {
        // Red parallelogram whose left edge runs from (20,20) to (45,100).
        let img = RgbaImage::from_fn(240, 140, |x, y| {
            let shift = (y as f32 - 20.0) * 25.0 / 80.0;
            let x = x as f32;
            if x >= 20.0 + shift && x < 140.0 + shift && (20..100).contains(&y) {
                RED
            } else {
                BLUE
            }
        });
        let quad = UnorderedQuad::new([
            Point2D::new(20.0, 20.0),
            Point2D::new(140.0, 20.0),
            Point2D::new(165.0, 100.0),
            Point2D::new(45.0, 100.0),
        ]);
        let out = rectify(&DynamicImage::ImageRgba8(img), &quad, 1.0).unwrap();
        let rgba = out.to_rgba8();
        let (w, h) = rgba.dimensions();
        assert_eq!(w, 120);
        assert!(is_red(rgba.get_pixel(w / 2, h / 2)));
        assert!(is_red(rgba.get_pixel(4, h - 4)));
    }

    #[test]
    fn non_positive_scale_ratio_is_rejected() {
        for ratio in [0.0, -1.0, f32::NAN, f32::INFINITY] {
            let err = rectify(&scene(), &block_quad(), ratio).unwrap_err();
            assert!(matches!(err, ScanlabError::InvalidArgument(_)), "ratio {ratio}");
        }
    }

    #[test]
    fn coincident_corners_surface_as_transform_error() {
        let quad = UnorderedQuad::new([Point2D::new(30.0, 30.0); 4]);
        let err = rectify(&scene(), &quad, 1.0).unwrap_err();
        assert!(matches!(err, ScanlabError::Transform(_)), "got {err:?}");
    }

    #[test]
    fn one_pixel_wide_canvas_is_a_transform_error() {
        // Left and right edges 1.5 px apart: the canvas truncates to 1 column.
        let quad = UnorderedQuad::new([
            Point2D::new(30.0, 10.0),
            Point2D::new(31.5, 10.0),
            Point2D::new(31.5, 60.0),
            Point2D::new(30.0, 60.0),
        ]);
        let err = rectify(&scene(), &quad, 1.0).unwrap_err();
        match err {
            ScanlabError::Transform(msg) => assert!(msg.contains("1x50"), "{msg}"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn rectify_ordered_reports_canvas() {
        let ordered = order_points(&block_quad());
        let (warped, canvas) = rectify_ordered(&scene().to_rgba8(), &ordered).unwrap();
        assert_eq!(canvas, Canvas { width: 100, height: 50 });
        assert_eq!(warped.dimensions(), (100, 50));
    }
}
