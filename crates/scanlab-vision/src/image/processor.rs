// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image processor — load, aspect-preserving resize, save.
// Operates on in-memory images using the `image` crate.

use image::imageops::FilterType;
use image::DynamicImage;
use scanlab_core::error::ScanlabError;
use tracing::{debug, info, instrument};

/// Image processing pipeline operating on a single in-memory image.
///
/// Each method consumes `self` and returns a new `ImageProcessor` wrapping
/// the transformed image, enabling method chaining.
///
/// ```ignore
/// let preview = ImageProcessor::open("receipt.jpg")?
///     .resize_to_width(400)
///     .into_dynamic();
/// ```
pub struct ImageProcessor {
    /// The current working image.
    image: DynamicImage,
}

impl ImageProcessor {
    // -- Construction ---------------------------------------------------------

    /// Load an image from a file path.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self, ScanlabError> {
        let img = image::open(path.as_ref()).map_err(|err| {
            ScanlabError::ImageError(format!(
                "failed to open {}: {}",
                path.as_ref().display(),
                err
            ))
        })?;
        info!(
            width = img.width(),
            height = img.height(),
            "Image loaded"
        );
        Ok(Self { image: img })
    }

    /// Wrap an already-decoded `DynamicImage`.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self { image }
    }

    // -- Accessors ------------------------------------------------------------

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Consume the processor and return the underlying `DynamicImage`.
    pub fn into_dynamic(self) -> DynamicImage {
        self.image
    }

    // -- Transformations (consume self, return new Self) -----------------------

    /// Resize to exactly `height` rows, scaling the width by the same ratio.
    #[instrument(skip(self), fields(height))]
    pub fn resize_to_height(self, height: u32) -> Self {
        Self {
            image: Self::resized_to_height(&self.image, height),
        }
    }

    /// Resize to exactly `width` columns, scaling the height by the same ratio.
    #[instrument(skip(self), fields(width))]
    pub fn resize_to_width(self, width: u32) -> Self {
        Self {
            image: Self::resized_to_width(&self.image, width),
        }
    }

    // -- Borrowing resizes (leave the source untouched) ------------------------

    /// Aspect-preserving copy of `image` that is `height` rows tall.
    pub fn resized_to_height(image: &DynamicImage, height: u32) -> DynamicImage {
        let width = scaled_side(image.width(), image.height(), height);
        resized_exact(image, width, height)
    }

    /// Aspect-preserving copy of `image` that is `width` columns wide.
    pub fn resized_to_width(image: &DynamicImage, width: u32) -> DynamicImage {
        let height = scaled_side(image.height(), image.width(), width);
        resized_exact(image, width, height)
    }

    // -- Output ---------------------------------------------------------------

    /// Write the image to a file. The format is inferred from the file extension.
    pub fn save(&self, path: impl AsRef<std::path::Path>) -> Result<(), ScanlabError> {
        self.image.save(path.as_ref()).map_err(|err| {
            ScanlabError::ImageError(format!(
                "failed to save image to {}: {}",
                path.as_ref().display(),
                err
            ))
        })?;
        debug!(path = %path.as_ref().display(), "Image saved");
        Ok(())
    }
}

fn resized_exact(image: &DynamicImage, width: u32, height: u32) -> DynamicImage {
    debug!(
        from_w = image.width(),
        from_h = image.height(),
        width,
        height,
        "Resizing image"
    );
    image.resize_exact(width.max(1), height.max(1), FilterType::Triangle)
}

/// Length of the free side when the fixed side goes from `fixed_from` to
/// `fixed_to`. Truncates, never below 1.
fn scaled_side(free: u32, fixed_from: u32, fixed_to: u32) -> u32 {
    if fixed_from == 0 {
        return free.max(1);
    }
    let ratio = fixed_from as f64 / fixed_to as f64;
    ((free as f64 / ratio) as u32).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn solid(width: u32, height: u32) -> ImageProcessor {
        ImageProcessor::from_dynamic(DynamicImage::ImageRgb8(RgbImage::from_pixel(
            width,
            height,
            Rgb([120, 60, 30]),
        )))
    }

    #[test]
    fn resize_to_height_keeps_aspect_ratio() {
        let resized = solid(1000, 2000).resize_to_height(500);
        assert_eq!((resized.width(), resized.height()), (250, 500));
    }

    #[test]
    fn resize_to_width_truncates_height() {
        // 333 / (1000 / 400) = 133.2
        let resized = solid(1000, 333).resize_to_width(400);
        assert_eq!((resized.width(), resized.height()), (400, 133));
    }

    #[test]
    fn resize_never_collapses_to_zero() {
        let resized = solid(1000, 1).resize_to_width(10);
        assert_eq!(resized.height(), 1);
    }

    #[test]
    fn borrowed_resize_leaves_source_untouched() {
        let source = solid(300, 600).into_dynamic();
        let preview = ImageProcessor::resized_to_height(&source, 500);
        assert_eq!((preview.width(), preview.height()), (250, 500));
        assert_eq!((source.width(), source.height()), (300, 600));

        let narrow = ImageProcessor::resized_to_width(&source, 100);
        assert_eq!((narrow.width(), narrow.height()), (100, 200));
    }

    #[test]
    fn missing_file_is_an_image_error() {
        let err = ImageProcessor::open("/no/such/photo.jpg").err().unwrap();
        assert!(matches!(err, ScanlabError::ImageError(_)));
    }

    #[test]
    fn save_and_open_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.png");
        solid(5, 6).save(&path).unwrap();
        let reopened = ImageProcessor::open(&path).unwrap();
        assert_eq!((reopened.width(), reopened.height()), (5, 6));
    }
}
