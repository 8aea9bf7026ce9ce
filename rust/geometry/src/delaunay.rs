// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Constrained Delaunay refinement by edge flipping

use crate::triangulation::Triangle;
use crate::winding::{bounding_extent, orient2d};
use crate::Point2;
use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;

/// Undirected edge key
#[inline]
pub(crate) fn edge_key(a: usize, b: usize) -> (usize, usize) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Positive when `d` lies inside the circumcircle of CCW triangle (a, b, c)
#[inline]
fn in_circle(a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>, d: &Point2<f64>) -> f64 {
    let (adx, ady) = (a.x - d.x, a.y - d.y);
    let (bdx, bdy) = (b.x - d.x, b.y - d.y);
    let (cdx, cdy) = (c.x - d.x, c.y - d.y);

    (adx * adx + ady * ady) * (bdx * cdy - cdx * bdy)
        + (bdx * bdx + bdy * bdy) * (cdx * ady - adx * cdy)
        + (cdx * cdx + cdy * cdy) * (adx * bdy - bdx * ady)
}

type Adjacency = FxHashMap<(usize, usize), SmallVec<[usize; 2]>>;

fn build_adjacency(triangles: &[Triangle]) -> Adjacency {
    let mut adjacency: Adjacency = FxHashMap::default();
    for (t, tri) in triangles.iter().enumerate() {
        for e in 0..3 {
            adjacency
                .entry(edge_key(tri[e], tri[(e + 1) % 3]))
                .or_default()
                .push(t);
        }
    }
    adjacency
}

/// Point the entry for `key` at triangle `to` instead of `from`
fn reassign(adjacency: &mut Adjacency, key: (usize, usize), from: usize, to: usize) {
    if let Some(shared) = adjacency.get_mut(&key) {
        for t in shared.iter_mut().filter(|t| **t == from) {
            *t = to;
        }
    }
}

/// Flip the edge `key` if it is interior and not locally Delaunay.
///
/// On a flip both triangles and the adjacency map are updated and the four
/// edges of the new quad are returned for rechecking.
fn try_flip(
    points: &[Point2<f64>],
    triangles: &mut [Triangle],
    adjacency: &mut Adjacency,
    key: (usize, usize),
    epsilon: f64,
    circle_tolerance: f64,
) -> Option<[(usize, usize); 4]> {
    let shared = adjacency.get(&key)?;
    if shared.len() != 2 {
        return None;
    }
    let (t, u) = (shared[0], shared[1]);

    // Orient the edge as it runs in `t`; `u` then holds it as (b, a)
    let tri = triangles[t];
    let e = (0..3).find(|&e| edge_key(tri[e], tri[(e + 1) % 3]) == key)?;
    let (a, b, c) = (tri[e], tri[(e + 1) % 3], tri[(e + 2) % 3]);
    let d = *triangles[u].iter().find(|&&v| v != a && v != b)?;

    let (pa, pb, pc, pd) = (&points[a], &points[b], &points[c], &points[d]);

    // The quad must be strictly convex for the flipped pair to be valid
    if orient2d(pc, pa, pd) <= epsilon || orient2d(pd, pb, pc) <= epsilon {
        return None;
    }
    if in_circle(pa, pb, pc, pd) <= circle_tolerance {
        return None;
    }

    triangles[t] = [c, a, d];
    triangles[u] = [d, b, c];

    adjacency.remove(&key);
    reassign(adjacency, edge_key(a, d), u, t);
    reassign(adjacency, edge_key(b, c), t, u);
    adjacency.insert(edge_key(c, d), SmallVec::from_slice(&[t, u]));

    Some([edge_key(c, a), edge_key(a, d), edge_key(d, b), edge_key(b, c)])
}

/// Flip interior edges until every unconstrained edge is locally Delaunay.
///
/// `triangles` must be counter-clockwise. Vertex usage and triangle count are
/// unchanged. `epsilon` is the area tolerance for orientation tests. Returns
/// the number of flips performed.
pub(crate) fn refine(
    points: &[Point2<f64>],
    triangles: &mut [Triangle],
    constrained: &FxHashSet<(usize, usize)>,
    epsilon: f64,
) -> usize {
    let limit = points.len() * points.len() + 16;
    let extent = bounding_extent(points);
    // The in-circle determinant grows with the fourth power of the size
    let circle_tolerance = epsilon * extent * extent;

    let mut adjacency = build_adjacency(triangles);
    let mut pending: Vec<(usize, usize)> = triangles
        .iter()
        .flat_map(|tri| (0..3).map(move |e| edge_key(tri[e], tri[(e + 1) % 3])))
        .filter(|key| !constrained.contains(key))
        .collect();
    pending.reverse();

    let mut flips = 0;
    while let Some(key) = pending.pop() {
        if flips >= limit {
            break;
        }
        let Some(quad) = try_flip(points, triangles, &mut adjacency, key, epsilon, circle_tolerance)
        else {
            continue;
        };
        flips += 1;
        pending.extend(quad.into_iter().filter(|k| !constrained.contains(k)));
    }

    tracing::trace!(flips, triangles = triangles.len(), "delaunay refinement");
    flips
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flip_thin_diagonal() {
        // Long flat quad; diagonal 0-2 is the bad one
        let points = vec![
            Point2::new(0.0, 0.0),
            Point2::new(2.0, -0.2),
            Point2::new(4.0, 0.0),
            Point2::new(2.0, 0.2),
        ];
        let mut triangles = vec![[0, 1, 2], [0, 2, 3]];
        let constrained: FxHashSet<_> = [(0, 1), (1, 2), (2, 3), (0, 3)]
            .into_iter()
            .collect();

        let flips = refine(&points, &mut triangles, &constrained, 1e-12);

        assert_eq!(flips, 1);
        for tri in &triangles {
            assert!(tri.contains(&1) && tri.contains(&3));
            assert!(orient2d(&points[tri[0]], &points[tri[1]], &points[tri[2]]) > 0.0);
        }
    }

    #[test]
    fn test_constrained_edge_is_kept() {
        let points = vec![
            Point2::new(0.0, 0.0),
            Point2::new(2.0, -0.2),
            Point2::new(4.0, 0.0),
            Point2::new(2.0, 0.2),
        ];
        let mut triangles = vec![[0, 1, 2], [0, 2, 3]];
        let constrained: FxHashSet<_> = [(0, 2)].into_iter().collect();

        assert_eq!(refine(&points, &mut triangles, &constrained, 1e-12), 0);
        assert_eq!(triangles, vec![[0, 1, 2], [0, 2, 3]]);
    }

    #[test]
    fn test_cocircular_square_is_stable() {
        let points = vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(0.0, 1.0),
        ];
        let mut triangles = vec![[0, 1, 2], [0, 2, 3]];

        assert_eq!(refine(&points, &mut triangles, &FxHashSet::default(), 1e-12), 0);
    }

    #[test]
    fn test_fan_of_ellipse_becomes_delaunay() {
        let n = 16;
        let points: Vec<Point2<f64>> = (0..n)
            .map(|i| {
                let angle = i as f64 * std::f64::consts::TAU / n as f64;
                Point2::new(4.0 * angle.cos(), angle.sin())
            })
            .collect();
        let mut triangles: Vec<Triangle> = (1..n - 1).map(|i| [0, i, i + 1]).collect();
        let constrained: FxHashSet<_> = (0..n).map(|i| edge_key(i, (i + 1) % n)).collect();

        let flips = refine(&points, &mut triangles, &constrained, 1e-12);

        assert!(flips > 0);
        assert_eq!(triangles.len(), n - 2);

        // Adjacency rebuilt from scratch must agree: every interior edge is
        // shared by two CCW triangles and is locally Delaunay
        let adjacency = build_adjacency(&triangles);
        for tri in &triangles {
            assert!(orient2d(&points[tri[0]], &points[tri[1]], &points[tri[2]]) > 0.0);
        }
        for (key, shared) in &adjacency {
            if constrained.contains(key) {
                assert_eq!(shared.len(), 1);
                continue;
            }
            assert_eq!(shared.len(), 2);
            let (t, u) = (triangles[shared[0]], triangles[shared[1]]);
            let d = *u.iter().find(|&&v| v != key.0 && v != key.1).unwrap();
            let circle = in_circle(&points[t[0]], &points[t[1]], &points[t[2]], &points[d]);
            assert!(circle <= 1e-9, "edge {key:?} is not Delaunay");
        }
    }
}
