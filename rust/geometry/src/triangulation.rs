// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Polygon triangulation
//!
//! Constrained triangulation of a single planar contour. Every boundary edge
//! is kept, no vertex is ever inserted, and the returned triangles share the
//! winding of the input contour.

use crate::config::TriangulationConfig;
use crate::delaunay::{self, edge_key};
use crate::earclip::clip_ears;
use crate::error::{Error, Result};
use crate::hull::fill_pockets;
use crate::projection::planar_projection;
use crate::winding::{
    area_tolerance, orient2d, sort_by_winding, triangle_winding, winding_order, SortMethod,
    WindingOrder,
};
use crate::{Point2, Point3};
use rustc_hash::FxHashSet;

/// Three indices into the caller's point array
pub type Triangle = [usize; 3];

/// Count turn directions along a closed contour: (left, right, straight)
fn turn_counts(points: &[Point2<f64>], epsilon: f64) -> (usize, usize, usize) {
    let n = points.len();
    let (mut left, mut right, mut straight) = (0, 0, 0);

    for i in 0..n {
        let p0 = &points[i];
        let p1 = &points[(i + 1) % n];
        let p2 = &points[(i + 2) % n];

        let cross = orient2d(p0, p1, p2);
        if cross > epsilon {
            left += 1;
        } else if cross < -epsilon {
            right += 1;
        } else {
            straight += 1;
        }
    }

    (left, right, straight)
}

/// Check if a polygon is convex (all cross products have same sign)
#[inline]
pub fn is_convex(points: &[Point2<f64>], epsilon: f64) -> bool {
    if points.len() < 3 {
        return false;
    }
    let (left, right, _) = turn_counts(points, epsilon);
    left == 0 || right == 0
}

/// Simple fan triangulation over a ring of indices
#[inline]
fn fan_triangulate(ring: &[usize]) -> Vec<Triangle> {
    (1..ring.len() - 1)
        .map(|i| [ring[0], ring[i], ring[i + 1]])
        .collect()
}

/// Vertices the constrained triangulation of a contour would need.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ContourCheck {
    /// Points sharing a position with an earlier point
    pub merged: usize,
    /// Proper crossings between non-adjacent boundary segments
    pub crossings: usize,
    /// Segments touching or overlapping without properly crossing
    pub touches: usize,
}

impl ContourCheck {
    /// Vertex count of the triangulated mesh for an `n`-point contour
    pub fn vertex_count(&self, n: usize) -> usize {
        n - self.merged + self.crossings
    }

    /// True when the mesh would use exactly the input points
    pub fn is_simple(&self) -> bool {
        self.merged == 0 && self.crossings == 0 && self.touches == 0
    }
}

fn within_box(q: &Point2<f64>, a: &Point2<f64>, b: &Point2<f64>) -> bool {
    q.x >= a.x.min(b.x) && q.x <= a.x.max(b.x) && q.y >= a.y.min(b.y) && q.y <= a.y.max(b.y)
}

/// Inspect a closed contour for coincident points and self-intersections.
///
/// `epsilon` is an absolute tolerance on twice-areas of point triples.
pub fn check_contour(points: &[Point2<f64>], epsilon: f64) -> ContourCheck {
    let n = points.len();
    let mut check = ContourCheck::default();

    let mut seen = FxHashSet::default();
    for p in points {
        // +0.0 so that -0.0 and 0.0 merge
        if !seen.insert(((p.x + 0.0).to_bits(), (p.y + 0.0).to_bits())) {
            check.merged += 1;
        }
    }

    for i in 0..n {
        let (p1, p2) = (&points[i], &points[(i + 1) % n]);

        // Adjacent segment folding back onto this one
        let p3 = &points[(i + 2) % n];
        if n > 3 && orient2d(p1, p2, p3).abs() <= epsilon && (p1 - p2).dot(&(p3 - p2)) > 0.0 {
            check.touches += 1;
        }

        for j in (i + 2)..n {
            if i == 0 && j == n - 1 {
                continue; // closing segment is adjacent to the first
            }
            let (q1, q2) = (&points[j], &points[(j + 1) % n]);

            let o1 = orient2d(p1, p2, q1);
            let o2 = orient2d(p1, p2, q2);
            let o3 = orient2d(q1, q2, p1);
            let o4 = orient2d(q1, q2, p2);

            let proper = ((o1 > epsilon && o2 < -epsilon) || (o1 < -epsilon && o2 > epsilon))
                && ((o3 > epsilon && o4 < -epsilon) || (o3 < -epsilon && o4 > epsilon));
            if proper {
                check.crossings += 1;
                continue;
            }

            let touching = (o1.abs() <= epsilon && within_box(q1, p1, p2))
                || (o2.abs() <= epsilon && within_box(q2, p1, p2))
                || (o3.abs() <= epsilon && within_box(p1, q1, q2))
                || (o4.abs() <= epsilon && within_box(p2, q1, q2));
            if touching {
                check.touches += 1;
            }
        }
    }

    check
}

/// Triangulate an ordered contour (boundary order, either winding).
///
/// Shorthand for [`triangulate_ordered_with`] using default settings.
pub fn triangulate_ordered(points: &[Point2<f64>], convex: bool) -> Result<Vec<Triangle>> {
    triangulate_ordered_with(points, convex, &TriangulationConfig::default())
}

/// Triangulate an ordered contour.
///
/// Returns indices into `points`. With `convex` set, the whole convex hull is
/// filled instead of respecting concavities. Fails with
/// [`Error::TriangulationFailed`] when the contour cannot be triangulated
/// with exactly its own points, which usually means it is not given in
/// boundary order.
pub fn triangulate_ordered_with(
    points: &[Point2<f64>],
    convex: bool,
    config: &TriangulationConfig,
) -> Result<Vec<Triangle>> {
    let n = points.len();
    if n < 3 {
        return Err(Error::InsufficientPoints { found: n });
    }

    // Areas scale with the square of the contour size
    let epsilon = area_tolerance(points, config.epsilon);

    let original_winding = winding_order(points, epsilon);
    if original_winding == WindingOrder::Undefined {
        return Err(Error::degenerate("contour encloses no area"));
    }

    let check = check_contour(points, epsilon);
    if !check.is_simple() {
        tracing::debug!(
            points = n,
            mesh_vertices = check.vertex_count(n),
            touches = check.touches,
            "contour would need extra vertices"
        );
        return Err(Error::failed(format!(
            "contour of {} points would triangulate to {} vertices ({} touching segments); \
             points are probably not in boundary order",
            n,
            check.vertex_count(n),
            check.touches
        )));
    }

    let ring: Vec<usize> = if original_winding == WindingOrder::CounterClockwise {
        (0..n).collect()
    } else {
        (0..n).rev().collect()
    };

    // FAST PATH: strictly convex contour - use fan triangulation
    let (left, right, straight) = turn_counts(points, epsilon);
    let strictly_convex = straight == 0 && (left == 0 || right == 0);

    let mut triangles = if strictly_convex {
        fan_triangulate(&ring)
    } else {
        clip_ears(points, &ring, epsilon).ok_or_else(|| {
            tracing::debug!(points = n, "ear clipping found no ear");
            Error::failed(format!("no ear found while clipping a {}-point contour", n))
        })?
    };

    let mut constrained: FxHashSet<(usize, usize)> =
        (0..n).map(|i| edge_key(i, (i + 1) % n)).collect();

    if convex && !strictly_convex {
        let (pockets, closing_edges) = fill_pockets(points, &ring, epsilon)
            .ok_or_else(|| Error::failed("could not fill the convex hull"))?;
        triangles.extend(pockets);
        constrained.extend(closing_edges.into_iter().map(|(a, b)| edge_key(a, b)));
    }

    if config.delaunay_refine {
        delaunay::refine(points, &mut triangles, &constrained, epsilon);
    }

    // If the first triangle doesn't match the winding of the input, flip all
    let first_winding = triangle_winding(points, &triangles[0], 0.0);
    if first_winding != original_winding {
        for tri in &mut triangles {
            tri.swap(0, 2);
        }
    }

    Ok(triangles)
}

/// Sort a point cloud into a contour, triangulate, and map back.
///
/// Shorthand for [`triangulate_unordered_with`] using default settings.
pub fn triangulate_unordered(points: &[Point2<f64>], convex: bool) -> Result<Vec<Triangle>> {
    triangulate_unordered_with(points, convex, &TriangulationConfig::default())
}

/// Sort points counter-clockwise around their centroid, triangulate the
/// sorted copy and return triangles in the caller's original index space.
pub fn triangulate_unordered_with(
    points: &[Point2<f64>],
    convex: bool,
    config: &TriangulationConfig,
) -> Result<Vec<Triangle>> {
    if points.len() < 3 {
        return Err(Error::InsufficientPoints {
            found: points.len(),
        });
    }

    let sorted = sort_by_winding(points, SortMethod::CounterClockwise)?;
    let triangles = triangulate_ordered_with(&sorted.points, convex, config)?;
    Ok(sorted.remap(&triangles))
}

/// Triangulate the 3D vertex positions of a single face.
///
/// Positions are flattened onto their best-fit plane first. With `unordered`
/// set they are re-sorted into a contour before triangulation.
pub fn triangulate_vertices(
    positions: &[Point3<f64>],
    unordered: bool,
    convex: bool,
) -> Result<Vec<Triangle>> {
    triangulate_vertices_with(positions, unordered, convex, &TriangulationConfig::default())
}

/// [`triangulate_vertices`] with explicit settings
pub fn triangulate_vertices_with(
    positions: &[Point3<f64>],
    unordered: bool,
    convex: bool,
    config: &TriangulationConfig,
) -> Result<Vec<Triangle>> {
    if positions.len() < 3 {
        return Err(Error::InsufficientPoints {
            found: positions.len(),
        });
    }

    let (points_2d, _) = planar_projection(positions, config.epsilon)?;

    if unordered {
        triangulate_unordered_with(&points_2d, convex, config)
    } else {
        triangulate_ordered_with(&points_2d, convex, config)
    }
}

/// Flatten triangles into a plain index list
pub fn flatten_indices(triangles: &[Triangle]) -> Vec<usize> {
    triangles.iter().flat_map(|t| t.iter().copied()).collect()
}
