// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

use std::path::{Path, PathBuf};

use image::DynamicImage;
use scanlab_core::ScanConfig;
use scanlab_core::error::Result;
use scanlab_vision::{DocumentScanner, ImageProcessor};
use tracing::{info, instrument};

use super::ensure_dir;

/// Scan the page in `image` and write `edged.png`, `outline.png`,
/// `warped.png`, and `scanned.png` into `output_dir`.
///
/// Nothing is written when no page is found.
#[instrument(skip(config))]
pub fn run(config: &ScanConfig, image: &Path, output_dir: &Path) -> Result<Vec<PathBuf>> {
    let photo = ImageProcessor::open(image)?.into_dynamic();
    let outcome = DocumentScanner::new(config.clone()).scan(&photo)?;

    ensure_dir(output_dir)?;
    let stages = [
        ("edged.png", DynamicImage::ImageLuma8(outcome.edged)),
        ("outline.png", DynamicImage::ImageRgb8(outcome.outline)),
        ("warped.png", outcome.warped),
        ("scanned.png", DynamicImage::ImageLuma8(outcome.scanned)),
    ];

    let mut written = Vec::with_capacity(stages.len());
    for (name, stage) in stages {
        let path = output_dir.join(name);
        ImageProcessor::from_dynamic(stage).save(&path)?;
        written.push(path);
    }
    info!(output_dir = %output_dir.display(), "Scan written");
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};
    use imageproc::drawing::draw_polygon_mut;
    use imageproc::point::Point;
    use scanlab_core::ScanlabError;

    #[test]
    fn writes_every_stage_image() {
        let dir = tempfile::tempdir().unwrap();
        let photo_path = dir.path().join("page.png");
        let mut photo = GrayImage::from_pixel(240, 300, Luma([30u8]));
        let page = [
            Point::new(40, 60),
            Point::new(200, 50),
            Point::new(205, 255),
            Point::new(45, 265),
        ];
        draw_polygon_mut(&mut photo, &page, Luma([235u8]));
        photo.save(&photo_path).unwrap();

        let out = dir.path().join("out");
        let written = run(&ScanConfig::default(), &photo_path, &out).unwrap();

        assert_eq!(written.len(), 4);
        for path in &written {
            assert!(path.exists(), "{} missing", path.display());
        }
        let scanned = image::open(out.join("scanned.png")).unwrap();
        assert!(scanned.width() > 100 && scanned.height() > 150);
    }

    #[test]
    fn blank_photo_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let photo_path = dir.path().join("blank.png");
        GrayImage::from_pixel(120, 160, Luma([128u8]))
            .save(&photo_path)
            .unwrap();

        let out = dir.path().join("out");
        let err = run(&ScanConfig::default(), &photo_path, &out).unwrap_err();
        assert!(matches!(err, ScanlabError::NoDocumentFound));
        assert!(!out.exists());
    }

    #[test]
    fn missing_photo_is_an_image_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = run(
            &ScanConfig::default(),
            &dir.path().join("nope.jpg"),
            dir.path(),
        )
        .unwrap_err();
        assert!(matches!(err, ScanlabError::ImageError(_)));
    }
}
