// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Winding order classification and angular sorting of 2D point sets
//!
//! Unordered face selections are turned into a boundary contour by sorting
//! around their centroid. The sort keeps an explicit map back to the caller's
//! indices so triangles built on the sorted copy can be translated back.

use crate::error::{Error, Result};
use crate::triangulation::Triangle;
use crate::Point2;
use rustc_hash::FxHashSet;
use std::cmp::Ordering;

/// Rotational direction of an ordered contour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WindingOrder {
    Clockwise,
    CounterClockwise,
    /// Fewer than 3 points, or zero signed area
    Undefined,
}

impl WindingOrder {
    /// The opposite direction; `Undefined` stays `Undefined`
    pub fn reversed(self) -> Self {
        match self {
            WindingOrder::Clockwise => WindingOrder::CounterClockwise,
            WindingOrder::CounterClockwise => WindingOrder::Clockwise,
            WindingOrder::Undefined => WindingOrder::Undefined,
        }
    }
}

/// Direction used when sorting a point cloud into a contour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortMethod {
    Clockwise,
    #[default]
    CounterClockwise,
}

/// Shoelace signed area. Positive for counter-clockwise contours.
///
/// Summed as a fan around the first point so large coordinate offsets do not
/// cancel out.
#[inline]
pub fn signed_area(points: &[Point2<f64>]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }

    let origin = &points[0];
    let mut twice_area = 0.0;
    for i in 1..n - 1 {
        twice_area += orient2d(origin, &points[i], &points[i + 1]);
    }
    twice_area * 0.5
}

/// Longest side of the axis-aligned bounding box
pub(crate) fn bounding_extent(points: &[Point2<f64>]) -> f64 {
    let Some(first) = points.first() else {
        return 0.0;
    };
    let (mut min, mut max) = (*first, *first);
    for p in points {
        min.x = min.x.min(p.x);
        min.y = min.y.min(p.y);
        max.x = max.x.max(p.x);
        max.y = max.y.max(p.y);
    }
    (max.x - min.x).max(max.y - min.y)
}

/// Area tolerance for a contour: `epsilon` scaled by its squared extent
#[inline]
pub(crate) fn area_tolerance(points: &[Point2<f64>], epsilon: f64) -> f64 {
    let extent = bounding_extent(points);
    epsilon * extent * extent
}

/// Classify the winding of an ordered contour
#[inline]
pub fn winding_order(points: &[Point2<f64>], epsilon: f64) -> WindingOrder {
    if points.len() < 3 {
        return WindingOrder::Undefined;
    }
    classify_area(signed_area(points), epsilon)
}

#[inline]
pub(crate) fn classify_area(area: f64, epsilon: f64) -> WindingOrder {
    if area > epsilon {
        WindingOrder::CounterClockwise
    } else if area < -epsilon {
        WindingOrder::Clockwise
    } else {
        WindingOrder::Undefined
    }
}

/// Winding of a single triangle picked out of `points`
#[inline]
pub fn triangle_winding(points: &[Point2<f64>], tri: &Triangle, epsilon: f64) -> WindingOrder {
    let [a, b, c] = *tri;
    classify_area(orient2d(&points[a], &points[b], &points[c]) * 0.5, epsilon)
}

/// Twice the signed area of triangle (a, b, c)
#[inline]
pub(crate) fn orient2d(a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

/// A point set reordered into a contour, with the way back to the input order
#[derive(Debug, Clone, PartialEq)]
pub struct SortedContour {
    /// Points in contour order
    pub points: Vec<Point2<f64>>,
    /// `index_map[sorted_position] == original_position`
    pub index_map: Vec<usize>,
}

impl SortedContour {
    /// Translate triangles indexing `points` into the original index space
    pub fn remap(&self, triangles: &[Triangle]) -> Vec<Triangle> {
        triangles
            .iter()
            .map(|&[a, b, c]| [self.index_map[a], self.index_map[b], self.index_map[c]])
            .collect()
    }
}

/// Centroid independent of input order: summing in a canonical order keeps
/// the result bit-identical for any permutation of the same points.
fn centroid(points: &[Point2<f64>]) -> Point2<f64> {
    let mut canonical: Vec<&Point2<f64>> = points.iter().collect();
    canonical.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));

    let (sx, sy) = canonical
        .iter()
        .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
    let n = points.len() as f64;
    Point2::new(sx / n, sy / n)
}

/// Sort a point cloud by angle around its centroid.
///
/// Points sharing an angle are ordered nearer-first, then by input position,
/// so the result is reproducible for any input including duplicates.
pub fn sort_by_winding(points: &[Point2<f64>], method: SortMethod) -> Result<SortedContour> {
    let distinct: FxHashSet<(u64, u64)> = points
        .iter()
        .map(|p| (p.x.to_bits(), p.y.to_bits()))
        .collect();
    if distinct.len() < 3 {
        return Err(Error::InsufficientPoints {
            found: distinct.len(),
        });
    }

    let center = centroid(points);

    let mut keyed: Vec<(f64, f64, usize)> = points
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let dx = p.x - center.x;
            let dy = p.y - center.y;
            (dy.atan2(dx), dx * dx + dy * dy, i)
        })
        .collect();

    keyed.sort_by(|a, b| {
        let by_angle = match method {
            SortMethod::CounterClockwise => a.0.total_cmp(&b.0),
            SortMethod::Clockwise => b.0.total_cmp(&a.0),
        };
        by_angle
            .then_with(|| a.1.total_cmp(&b.1))
            .then_with(|| a.2.cmp(&b.2))
    });

    let index_map: Vec<usize> = keyed.iter().map(|k| k.2).collect();
    let sorted = index_map.iter().map(|&i| points[i]).collect();

    Ok(SortedContour {
        points: sorted,
        index_map,
    })
}

/// Compare two points lexicographically (x, then y)
#[inline]
pub(crate) fn lexicographic(a: &Point2<f64>, b: &Point2<f64>) -> Ordering {
    a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y))
}
