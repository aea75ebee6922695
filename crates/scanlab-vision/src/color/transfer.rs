// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Color transfer — moves the L*a*b* mean and spread of one image onto another
// (Reinhard-style statistics transfer).

use image::{Rgb, RgbImage};
use palette::{FromColor, IntoColor, Lab, Srgb};
use scanlab_core::error::{Result, ScanlabError};
use tracing::{debug, info, instrument};

/// Below this a channel is treated as flat and its spread is not rescaled.
const MIN_STD: f64 = 1e-6;

/// Mean and population standard deviation of one channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelStats {
    pub mean: f64,
    pub std: f64,
}

/// Per-channel statistics of an image in CIE L*a*b* (D65).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabStats {
    pub l: ChannelStats,
    pub a: ChannelStats,
    pub b: ChannelStats,
}

/// Compute the L*a*b* mean and standard deviation of every channel.
pub fn lab_stats(image: &RgbImage) -> Result<LabStats> {
    stats_of(&to_lab_pixels(image))
}

/// Give `target` the color distribution of `source`.
///
/// Every target pixel has the target means subtracted. It is then scaled by
/// `target std / source std` per channel and shifted onto the source means.
/// The ratio runs target-over-source, which is the formula this tool has
/// always used; flat source channels keep a scale of 1. Out-of-range Lab
/// values are clipped before converting back to sRGB.
#[instrument(skip_all, fields(
    source_w = source.width(),
    source_h = source.height(),
    target_w = target.width(),
    target_h = target.height()
))]
pub fn color_transfer(source: &RgbImage, target: &RgbImage) -> Result<RgbImage> {
    let source_stats = lab_stats(source)?;
    let target_lab = to_lab_pixels(target);
    let target_stats = stats_of(&target_lab)?;
    debug!(?source_stats, ?target_stats, "Color statistics computed");

    let scale_l = spread_scale(target_stats.l.std, source_stats.l.std);
    let scale_a = spread_scale(target_stats.a.std, source_stats.a.std);
    let scale_b = spread_scale(target_stats.b.std, source_stats.b.std);

    let mut pixels = target_lab.into_iter();
    let output = RgbImage::from_fn(target.width(), target.height(), |_, _| {
        // from_fn walks row-major, the same order to_lab_pixels produced.
        let Some(lab) = pixels.next() else {
            return Rgb([0, 0, 0]);
        };
        let l = (lab.l as f64 - target_stats.l.mean) * scale_l + source_stats.l.mean;
        let a = (lab.a as f64 - target_stats.a.mean) * scale_a + source_stats.a.mean;
        let b = (lab.b as f64 - target_stats.b.mean) * scale_b + source_stats.b.mean;
        lab_to_rgb(Lab::new(
            l.clamp(0.0, 100.0) as f32,
            a.clamp(-128.0, 127.0) as f32,
            b.clamp(-128.0, 127.0) as f32,
        ))
    });

    info!(scale_l, scale_a, scale_b, "Color transfer applied");
    Ok(output)
}

fn spread_scale(target_std: f64, source_std: f64) -> f64 {
    if source_std > MIN_STD {
        target_std / source_std
    } else {
        1.0
    }
}

fn to_lab_pixels(image: &RgbImage) -> Vec<Lab> {
    image
        .pixels()
        .map(|&Rgb([r, g, b])| {
            let srgb = Srgb::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0);
            Lab::from_color(srgb)
        })
        .collect()
}

fn lab_to_rgb(lab: Lab) -> Rgb<u8> {
    let srgb: Srgb = lab.into_color();
    let to_u8 = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
    Rgb([to_u8(srgb.red), to_u8(srgb.green), to_u8(srgb.blue)])
}

fn stats_of(pixels: &[Lab]) -> Result<LabStats> {
    if pixels.is_empty() {
        return Err(ScanlabError::InvalidArgument(
            "cannot compute color statistics of an empty image".into(),
        ));
    }
    let channel = |get: fn(&Lab) -> f32| -> ChannelStats {
        let n = pixels.len() as f64;
        let mean = pixels.iter().map(|p| get(p) as f64).sum::<f64>() / n;
        let variance = pixels
            .iter()
            .map(|p| (get(p) as f64 - mean).powi(2))
            .sum::<f64>()
            / n;
        ChannelStats {
            mean,
            std: variance.sqrt(),
        }
    };
    Ok(LabStats {
        l: channel(|p| p.l),
        a: channel(|p| p.a),
        b: channel(|p| p.b),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: u8, b: u8, tolerance: u8) -> bool {
        a.abs_diff(b) <= tolerance
    }

    fn gray_ramp(width: u32, from: u8, step: u8) -> RgbImage {
        RgbImage::from_fn(width, 8, |x, _| {
            let v = from + x as u8 * step;
            Rgb([v, v, v])
        })
    }

    #[test]
    fn white_has_full_lightness_and_no_spread() {
        let stats = lab_stats(&RgbImage::from_pixel(4, 4, Rgb([255, 255, 255]))).unwrap();
        assert!((stats.l.mean - 100.0).abs() < 0.5, "{stats:?}");
        assert!(stats.a.mean.abs() < 0.5 && stats.b.mean.abs() < 0.5);
        assert!(stats.l.std < 1e-3);
    }

    #[test]
    fn transfer_onto_itself_is_identity() {
        let img = RgbImage::from_fn(16, 16, |x, y| Rgb([(x * 12) as u8, (y * 10) as u8, 90]));
        let out = color_transfer(&img, &img).unwrap();
        for (a, b) in img.pixels().zip(out.pixels()) {
            for c in 0..3 {
                assert!(close(a[c], b[c], 2), "{a:?} vs {b:?}");
            }
        }
    }

    #[test]
    fn flat_source_floods_target_with_its_color() {
        let source = RgbImage::from_pixel(6, 6, Rgb([200, 60, 50]));
        let target = RgbImage::from_pixel(9, 4, Rgb([30, 60, 200]));
        let out = color_transfer(&source, &target).unwrap();
        assert_eq!(out.dimensions(), (9, 4));
        for p in out.pixels() {
            assert!(close(p[0], 200, 2) && close(p[1], 60, 2) && close(p[2], 50, 2), "{p:?}");
        }
    }

    #[test]
    fn result_takes_source_mean_lightness() {
        let source = gray_ramp(50, 100, 2);
        let target = gray_ramp(60, 60, 2);
        let out = color_transfer(&source, &target).unwrap();

        let src = lab_stats(&source).unwrap();
        let res = lab_stats(&out).unwrap();
        assert!((res.l.mean - src.l.mean).abs() < 1.0, "{res:?} vs {src:?}");
    }

    #[test]
    fn empty_image_is_rejected() {
        let empty = RgbImage::new(0, 0);
        let full = RgbImage::from_pixel(2, 2, Rgb([1, 2, 3]));
        assert!(matches!(
            color_transfer(&empty, &full).unwrap_err(),
            ScanlabError::InvalidArgument(_)
        ));
        assert!(color_transfer(&full, &empty).is_err());
    }
}
