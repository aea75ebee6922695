// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Four-point rectification geometry — corner ordering, output canvas sizing,
// and the source→destination correspondence handed to a homography solver.
//
// Everything here is pure arithmetic on point values. Pixel work (solving the
// homography and resampling) lives in `scanlab-vision::scan::rectify`.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, ScanlabError};

/// A 2-D point with real-valued coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f32,
    pub y: f32,
}

impl Point2D {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    pub fn distance(&self, other: &Point2D) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Multiply both coordinates by `ratio`.
    pub fn scale(&self, ratio: f32) -> Self {
        Self::new(self.x * ratio, self.y * ratio)
    }
}

impl From<(f32, f32)> for Point2D {
    fn from((x, y): (f32, f32)) -> Self {
        Self::new(x, y)
    }
}

impl From<Point2D> for (f32, f32) {
    fn from(p: Point2D) -> Self {
        (p.x, p.y)
    }
}

/// Exactly four points with no implied order, typically the output of a
/// contour-approximation step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UnorderedQuad(pub [Point2D; 4]);

impl UnorderedQuad {
    pub fn new(points: [Point2D; 4]) -> Self {
        Self(points)
    }

    /// Build a quad from a slice, rejecting anything other than four points.
    pub fn from_points(points: &[Point2D]) -> Result<Self> {
        let array: [Point2D; 4] = points.try_into().map_err(|_| {
            ScanlabError::InvalidArgument(format!(
                "a quadrilateral needs exactly 4 points, got {}",
                points.len()
            ))
        })?;
        Ok(Self(array))
    }

    pub fn points(&self) -> &[Point2D; 4] {
        &self.0
    }

    /// Scale every coordinate by `ratio` (preview → full-resolution).
    pub fn scaled(&self, ratio: f32) -> Self {
        Self(self.0.map(|p| p.scale(ratio)))
    }
}

/// Four points in fixed semantic roles.
///
/// The points should be distinct and not collinear for the downstream
/// homography to be well defined. Nothing here checks that.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrderedQuad {
    pub top_left: Point2D,
    pub top_right: Point2D,
    pub bottom_right: Point2D,
    pub bottom_left: Point2D,
}

impl OrderedQuad {
    /// Points in top-left, top-right, bottom-right, bottom-left order.
    pub fn as_array(&self) -> [Point2D; 4] {
        [
            self.top_left,
            self.top_right,
            self.bottom_right,
            self.bottom_left,
        ]
    }
}

/// Output rectangle size in whole pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
}

impl Canvas {
    /// True when either side is 0 or 1 pixel, as happens when the corners
    /// collapse onto each other.
    pub fn is_degenerate(&self) -> bool {
        self.width <= 1 || self.height <= 1
    }
}

/// Four source points paired with four destination points, both in
/// top-left, top-right, bottom-right, bottom-left order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Correspondence {
    pub source: [Point2D; 4],
    pub destination: [Point2D; 4],
}

impl Correspondence {
    /// Source and destination as plain tuples, the shape homography solvers take.
    pub fn control_points(&self) -> ([(f32, f32); 4], [(f32, f32); 4]) {
        (
            self.source.map(Into::into),
            self.destination.map(Into::into),
        )
    }
}

fn cmp_f32(a: f32, b: f32) -> Ordering {
    a.total_cmp(&b)
}

/// Assign top-left, top-right, bottom-right, and bottom-left roles to four
/// unordered points.
///
/// 1. Sort by x (ties broken by y).
/// 2. Top-left is the smaller-y point of the two left-most.
/// 3. Bottom-left is the largest-y point of *all four*, not just the two
///    left-most. On a tilted quad whose lowest point is on the right, this
///    makes bottom-left coincide with bottom-right.
/// 4. Of the two right-most, the one nearer top-left is top-right and the
///    farther is bottom-right.
///
/// Ties go to the earliest point in x-sorted order. Degenerate input never
/// fails; the result may just be geometrically meaningless.
pub fn order_points(quad: &UnorderedQuad) -> OrderedQuad {
    let mut x_sorted = quad.0;
    x_sorted.sort_by(|a, b| cmp_f32(a.x, b.x).then_with(|| cmp_f32(a.y, b.y)));

    let (left_most, right_most) = x_sorted.split_at(2);

    let top_left = if cmp_f32(left_most[1].y, left_most[0].y) == Ordering::Less {
        left_most[1]
    } else {
        left_most[0]
    };

    let bottom_left = x_sorted
        .iter()
        .copied()
        .reduce(|best, p| if cmp_f32(p.y, best.y) == Ordering::Greater { p } else { best })
        .unwrap_or(x_sorted[0]);

    let (top_right, bottom_right) = if cmp_f32(
        top_left.distance(&right_most[1]),
        top_left.distance(&right_most[0]),
    ) == Ordering::Less
    {
        (right_most[1], right_most[0])
    } else {
        (right_most[0], right_most[1])
    };

    OrderedQuad {
        top_left,
        top_right,
        bottom_right,
        bottom_left,
    }
}

/// Size the output canvas from the ordered corners and build the
/// correspondence onto its corners.
///
/// Width is the longer of the top and bottom edges and height the longer of
/// the left and right edges, each truncated to whole pixels. Destination
/// points sit at `(0,0)`, `(w-1,0)`, `(w-1,h-1)`, `(0,h-1)`. No minimum
/// size is enforced: callers check [`Canvas::is_degenerate`].
pub fn compute_canvas(ordered: &OrderedQuad) -> (Canvas, Correspondence) {
    let OrderedQuad {
        top_left: tl,
        top_right: tr,
        bottom_right: br,
        bottom_left: bl,
    } = *ordered;

    let width_a = bl.distance(&br);
    let width_b = tl.distance(&tr);
    let width = (width_a as u32).max(width_b as u32);

    let height_a = tr.distance(&br);
    let height_b = tl.distance(&bl);
    let height = (height_a as u32).max(height_b as u32);

    // Kept in float so a zero-size canvas yields -1 instead of wrapping.
    let right = width as f32 - 1.0;
    let bottom = height as f32 - 1.0;

    let canvas = Canvas { width, height };
    debug!(
        width,
        height,
        width_a,
        width_b,
        height_a,
        height_b,
        "Canvas computed"
    );

    let correspondence = Correspondence {
        source: ordered.as_array(),
        destination: [
            Point2D::new(0.0, 0.0),
            Point2D::new(right, 0.0),
            Point2D::new(right, bottom),
            Point2D::new(0.0, bottom),
        ],
    };

    (canvas, correspondence)
}
