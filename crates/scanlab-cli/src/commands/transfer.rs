// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

use std::path::Path;

use image::{DynamicImage, Rgb, RgbImage, imageops};
use scanlab_core::TransferConfig;
use scanlab_core::error::Result;
use scanlab_vision::{ImageProcessor, color_transfer, lab_stats};
use tracing::{info, instrument};

/// Recolor `target` with the color distribution of `source`.
///
/// The result is saved to `output` when given. `preview` receives the
/// source, target, and result side by side, each `preview_width` wide.
#[instrument(skip(config))]
pub fn run(
    config: &TransferConfig,
    source: &Path,
    target: &Path,
    output: Option<&Path>,
    preview: Option<&Path>,
) -> Result<RgbImage> {
    let source = ImageProcessor::open(source)?.into_dynamic().to_rgb8();
    let target = ImageProcessor::open(target)?.into_dynamic().to_rgb8();

    let result = color_transfer(&source, &target)?;
    let stats = lab_stats(&result)?;
    info!(
        l_mean = stats.l.mean,
        a_mean = stats.a.mean,
        b_mean = stats.b.mean,
        "Transfer complete"
    );

    if let Some(path) = output {
        ImageProcessor::from_dynamic(DynamicImage::ImageRgb8(result.clone())).save(path)?;
        info!(path = %path.display(), "Result saved");
    }
    if let Some(path) = preview {
        let strip = side_by_side(&[&source, &target, &result], config.preview_width);
        ImageProcessor::from_dynamic(DynamicImage::ImageRgb8(strip)).save(path)?;
        info!(path = %path.display(), "Preview saved");
    }
    Ok(result)
}

/// Resize every panel to `width` and lay them out left to right on black.
fn side_by_side(panels: &[&RgbImage], width: u32) -> RgbImage {
    let resized: Vec<RgbImage> = panels
        .iter()
        .map(|panel| {
            ImageProcessor::from_dynamic(DynamicImage::ImageRgb8((*panel).clone()))
                .resize_to_width(width)
                .into_dynamic()
                .to_rgb8()
        })
        .collect();

    let height = resized.iter().map(|p| p.height()).max().unwrap_or(1);
    let mut strip = RgbImage::from_pixel(width * resized.len().max(1) as u32, height, Rgb([0, 0, 0]));
    for (i, panel) in resized.iter().enumerate() {
        imageops::replace(&mut strip, panel, i as i64 * width as i64, 0);
    }
    strip
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, name: &str, image: &RgbImage) -> std::path::PathBuf {
        let path = dir.join(name);
        image.save(&path).unwrap();
        path
    }

    #[test]
    fn saves_result_and_preview() {
        let dir = tempfile::tempdir().unwrap();
        let source = write(
            dir.path(),
            "sunset.png",
            &RgbImage::from_fn(40, 20, |x, _| Rgb([200, 80 + x as u8, 40])),
        );
        let target = write(
            dir.path(),
            "ocean.png",
            &RgbImage::from_fn(30, 30, |_, y| Rgb([20, 60, 150 + y as u8])),
        );
        let output = dir.path().join("out.png");
        let preview = dir.path().join("preview.png");

        let config = TransferConfig { preview_width: 50 };
        let result = run(&config, &source, &target, Some(&output), Some(&preview)).unwrap();

        assert_eq!(result.dimensions(), (30, 30));
        assert_eq!(image::open(&output).unwrap().width(), 30);
        // Three panels of 50 columns; the square target is the tallest.
        let strip = image::open(&preview).unwrap();
        assert_eq!((strip.width(), strip.height()), (150, 50));
    }

    #[test]
    fn without_output_nothing_is_written() {
        let dir = tempfile::tempdir().unwrap();
        let img = RgbImage::from_pixel(8, 8, Rgb([10, 120, 30]));
        let a = write(dir.path(), "a.png", &img);
        let b = write(dir.path(), "b.png", &img);

        run(&TransferConfig::default(), &a, &b, None, None).unwrap();
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 2);
    }

    #[test]
    fn side_by_side_pads_shorter_panels() {
        let tall = RgbImage::from_pixel(10, 20, Rgb([255, 255, 255]));
        let wide = RgbImage::from_pixel(20, 10, Rgb([255, 255, 255]));
        let strip = side_by_side(&[&tall, &wide], 10);
        assert_eq!(strip.dimensions(), (20, 20));
        assert_eq!(*strip.get_pixel(15, 2), Rgb([255, 255, 255]));
        assert_eq!(*strip.get_pixel(15, 15), Rgb([0, 0, 0]));
    }
}
