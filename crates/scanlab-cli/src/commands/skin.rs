// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

use std::path::{Path, PathBuf};

use image::DynamicImage;
use scanlab_core::SkinConfig;
use scanlab_core::error::{Result, ScanlabError};
use scanlab_vision::color::skin::skin_fraction;
use scanlab_vision::{ImageProcessor, SkinDetector};
use tracing::{info, instrument, warn};

use super::ensure_dir;

const FRAME_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "tif", "tiff", "webp"];

/// Run skin detection on one image, or on every image in a directory in
/// file-name order. Writes `<stem>_mask.png` and `<stem>_skin.png` per frame
/// and returns how many frames were processed.
#[instrument(skip(config))]
pub fn run(config: &SkinConfig, input: &Path, output_dir: &Path) -> Result<usize> {
    let frames = collect_frames(input)?;
    if frames.is_empty() {
        return Err(ScanlabError::InvalidArgument(format!(
            "no image frames found in {}",
            input.display()
        )));
    }

    ensure_dir(output_dir)?;
    let detector = SkinDetector::new(config.clone());
    for (index, frame_path) in frames.iter().enumerate() {
        let frame = ImageProcessor::open(frame_path)?.into_dynamic().to_rgb8();
        let detection = detector.detect(&frame)?;

        let stem = frame_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| format!("frame{index:05}"));
        ImageProcessor::from_dynamic(DynamicImage::ImageLuma8(detection.mask.clone()))
            .save(output_dir.join(format!("{stem}_mask.png")))?;
        ImageProcessor::from_dynamic(DynamicImage::ImageRgb8(detection.skin))
            .save(output_dir.join(format!("{stem}_skin.png")))?;

        info!(
            frame = index,
            path = %frame_path.display(),
            skin_fraction = skin_fraction(&detection.mask),
            "Frame processed"
        );
    }
    Ok(frames.len())
}

/// `input` itself when it is a file; otherwise the image files directly
/// inside it, sorted by name.
fn collect_frames(input: &Path) -> Result<Vec<PathBuf>> {
    if !input.is_dir() {
        return Ok(vec![input.to_path_buf()]);
    }

    let mut frames = Vec::new();
    for entry in std::fs::read_dir(input)? {
        let path = entry?.path();
        let is_frame = path.is_file()
            && path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| FRAME_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()));
        if is_frame {
            frames.push(path);
        } else {
            warn!(path = %path.display(), "Skipping non-image entry");
        }
    }
    frames.sort();
    Ok(frames)
}
