// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document outline detection — finds the largest four-cornered contour in an
// edge map and reduces it to an unordered quad.

use image::GrayImage;
use imageproc::contours::{Contour, find_contours};
use imageproc::geometry::{approximate_polygon_dp, arc_length};
use imageproc::point::Point;
use scanlab_core::geometry::{Point2D, UnorderedQuad};
use tracing::{debug, instrument, warn};

/// Find the document outline in a binary edge map.
///
/// Contours are ranked by enclosed area and the largest `max_candidates` are
/// approximated as closed polygons with a Douglas–Peucker tolerance of
/// `epsilon_ratio` times their perimeter. The first approximation with
/// exactly four vertices is taken to be the page.
///
/// Returns `None` when no candidate reduces to four points.
#[instrument(skip(edged), fields(width = edged.width(), height = edged.height()))]
pub fn find_document_quad(
    edged: &GrayImage,
    max_candidates: usize,
    epsilon_ratio: f64,
) -> Option<UnorderedQuad> {
    let contours: Vec<Contour<i32>> = find_contours(edged);
    debug!(contour_count = contours.len(), "Contours found");

    let mut ranked: Vec<(f64, &[Point<i32>])> = contours
        .iter()
        .filter(|c| c.points.len() >= 4)
        .map(|c| (polygon_area(&c.points), c.points.as_slice()))
        .collect();
    ranked.sort_by(|a, b| b.0.total_cmp(&a.0));

    for (rank, (area, points)) in ranked.into_iter().take(max_candidates).enumerate() {
        let perimeter = arc_length(points, true);
        let epsilon = epsilon_ratio * perimeter;
        if !(epsilon > 0.0) {
            continue;
        }

        let approx = approximate_closed_polygon(points, epsilon);
        debug!(rank, area, perimeter, vertices = approx.len(), "Candidate approximated");

        if approx.len() == 4 {
            let corners: Vec<Point2D> = approx
                .iter()
                .map(|p| Point2D::new(p.x as f32, p.y as f32))
                .collect();
            return UnorderedQuad::from_points(&corners).ok();
        }
    }

    warn!(max_candidates, "No four-point contour among the largest candidates");
    None
}

/// Douglas–Peucker on a closed curve.
///
/// The curve is cut at its top-left-most point and at the point farthest
/// from it. Each half is simplified as an open chain and the halves are
/// joined, so the result has no repeated closing vertex.
pub(crate) fn approximate_closed_polygon(points: &[Point<i32>], epsilon: f64) -> Vec<Point<i32>> {
    let Some(start) = (0..points.len()).min_by_key(|&i| points[i].x + points[i].y) else {
        return Vec::new();
    };

    let rotated: Vec<Point<i32>> = points[start..]
        .iter()
        .chain(points[..start].iter())
        .copied()
        .collect();

    let origin = rotated[0];
    let squared_distance = |p: &Point<i32>| {
        let dx = (p.x - origin.x) as i64;
        let dy = (p.y - origin.y) as i64;
        dx * dx + dy * dy
    };
    let (far, far_distance) = rotated
        .iter()
        .enumerate()
        .map(|(i, p)| (i, squared_distance(p)))
        .fold((0, 0), |best, cur| if cur.1 > best.1 { cur } else { best });
    if far_distance == 0 {
        // Every point coincides with the origin.
        return vec![origin];
    }

    let mut polygon = approximate_polygon_dp(&rotated[..=far], epsilon, false);

    let mut closing: Vec<Point<i32>> = rotated[far..].to_vec();
    closing.push(origin);
    let second = approximate_polygon_dp(&closing, epsilon, false);

    // Drop the shared far vertex, then the repeated origin.
    polygon.pop();
    polygon.extend(second);
    polygon.pop();
    polygon
}

/// Area enclosed by a closed polygon (shoelace formula).
fn polygon_area(points: &[Point<i32>]) -> f64 {
    let n = points.len();
    let mut twice_area = 0i64;
    for i in 0..n {
        let j = (i + 1) % n;
        twice_area += points[i].x as i64 * points[j].y as i64;
        twice_area -= points[j].x as i64 * points[i].y as i64;
    }
    twice_area.abs() as f64 / 2.0
}
