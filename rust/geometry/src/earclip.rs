// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Ear clipping over an index ring
//!
//! Every vertex of the ring ends up in the output and no vertex is ever
//! added. Collinear boundary vertices are kept: they are never clipped as
//! ears themselves and block any ear whose triangle they touch.

use crate::triangulation::Triangle;
use crate::winding::orient2d;
use crate::Point2;

/// Check if `q` lies inside or on the boundary of CCW triangle (a, b, c)
#[inline]
fn touches_triangle(
    q: &Point2<f64>,
    a: &Point2<f64>,
    b: &Point2<f64>,
    c: &Point2<f64>,
    tolerance: f64,
) -> bool {
    orient2d(a, b, q) >= -tolerance
        && orient2d(b, c, q) >= -tolerance
        && orient2d(c, a, q) >= -tolerance
}

fn is_ear(points: &[Point2<f64>], ring: &[usize], i: usize, epsilon: f64) -> bool {
    let m = ring.len();
    let prev = ring[(i + m - 1) % m];
    let cur = ring[i];
    let next = ring[(i + 1) % m];

    let (a, b, c) = (&points[prev], &points[cur], &points[next]);
    if orient2d(a, b, c) <= epsilon {
        return false; // reflex or collinear
    }

    !ring
        .iter()
        .filter(|&&v| v != prev && v != cur && v != next)
        .any(|&v| touches_triangle(&points[v], a, b, c, epsilon))
}

/// Triangulate a simple counter-clockwise ring of indices into `points`.
///
/// Returns `None` when no ear can be found, which only happens for rings
/// that are not simple or have no area.
pub(crate) fn clip_ears(points: &[Point2<f64>], ring: &[usize], epsilon: f64) -> Option<Vec<Triangle>> {
    if ring.len() < 3 {
        return None;
    }

    let mut remaining = ring.to_vec();
    let mut triangles = Vec::with_capacity(ring.len() - 2);
    let mut cursor = 0;

    while remaining.len() > 3 {
        let m = remaining.len();
        let ear = (0..m)
            .map(|k| (cursor + k) % m)
            .find(|&i| is_ear(points, &remaining, i, epsilon))?;

        triangles.push([
            remaining[(ear + m - 1) % m],
            remaining[ear],
            remaining[(ear + 1) % m],
        ]);
        remaining.remove(ear);
        cursor = ear % remaining.len();
    }

    let last = [remaining[0], remaining[1], remaining[2]];
    if orient2d(&points[last[0]], &points[last[1]], &points[last[2]]) <= epsilon {
        return None;
    }
    triangles.push(last);

    Some(triangles)
}
