// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Convex hull fill for convex-mode triangulation
//!
//! The regions between a contour and its convex hull ("pockets") are
//! triangulated separately so that the union covers the whole hull while
//! still only using the contour's own vertices.

use crate::earclip::clip_ears;
use crate::triangulation::Triangle;
use crate::winding::{lexicographic, orient2d, signed_area};
use crate::Point2;

/// Strict convex hull (Andrew's monotone chain), counter-clockwise indices
pub fn convex_hull(points: &[Point2<f64>], epsilon: f64) -> Vec<usize> {
    let n = points.len();
    if n < 3 {
        return (0..n).collect();
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| lexicographic(&points[a], &points[b]).then(a.cmp(&b)));

    let mut hull: Vec<usize> = Vec::with_capacity(2 * n);

    for &i in &order {
        while hull.len() >= 2
            && orient2d(&points[hull[hull.len() - 2]], &points[hull[hull.len() - 1]], &points[i])
                <= epsilon
        {
            hull.pop();
        }
        hull.push(i);
    }

    let lower_len = hull.len() + 1;
    for &i in order.iter().rev().skip(1) {
        while hull.len() >= lower_len
            && orient2d(&points[hull[hull.len() - 2]], &points[hull[hull.len() - 1]], &points[i])
                <= epsilon
        {
            hull.pop();
        }
        hull.push(i);
    }

    hull.pop();
    hull
}

/// True when `q` lies on segment (a, b) within tolerance
fn on_segment(q: &Point2<f64>, a: &Point2<f64>, b: &Point2<f64>, epsilon: f64) -> bool {
    let ab = b - a;
    let len_sq = ab.norm_squared();
    if orient2d(a, b, q).abs() > epsilon * len_sq.sqrt().max(1.0) {
        return false;
    }
    let t = (q - a).dot(&ab);
    t >= 0.0 && t <= len_sq
}

/// Triangles filling every pocket between a CCW `ring` and its convex hull.
///
/// Also returns the hull edges that close those pockets, which must stay
/// fixed during any later edge flipping. `None` if a pocket cannot be
/// triangulated.
pub(crate) fn fill_pockets(
    points: &[Point2<f64>],
    ring: &[usize],
    epsilon: f64,
) -> Option<(Vec<Triangle>, Vec<(usize, usize)>)> {
    let hull = convex_hull(points, epsilon);
    let hull_len = hull.len();

    let mut on_hull = vec![false; points.len()];
    for &h in &hull {
        on_hull[h] = true;
    }
    // Boundary points lying along a hull edge also belong to the hull ring
    for v in 0..points.len() {
        if on_hull[v] {
            continue;
        }
        on_hull[v] = (0..hull_len).any(|k| {
            let a = &points[hull[k]];
            let b = &points[hull[(k + 1) % hull_len]];
            on_segment(&points[v], a, b, epsilon)
        });
    }

    let anchors: Vec<usize> = (0..ring.len()).filter(|&k| on_hull[ring[k]]).collect();
    let mut triangles = Vec::new();
    let mut closing_edges = Vec::new();

    for (j, &start) in anchors.iter().enumerate() {
        let end = anchors[(j + 1) % anchors.len()];
        let span = (end + ring.len() - start) % ring.len();
        if span < 2 {
            continue;
        }

        let mut pocket: Vec<usize> = (0..=span).map(|k| ring[(start + k) % ring.len()]).collect();
        let pocket_points: Vec<Point2<f64>> = pocket.iter().map(|&v| points[v]).collect();
        let area = signed_area(&pocket_points);
        if area.abs() <= epsilon {
            continue;
        }
        if area < 0.0 {
            pocket.reverse();
        }

        triangles.extend(clip_ears(points, &pocket, epsilon)?);
        closing_edges.push((ring[start], ring[end]));
    }

    Some((triangles, closing_edges))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convex_hull_square_with_interior_point() {
        let points = vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(0.5, 0.5),
            Point2::new(1.0, 1.0),
            Point2::new(0.0, 1.0),
        ];

        let hull = convex_hull(&points, 1e-10);
        assert_eq!(hull, vec![0, 1, 3, 4]);
    }

    #[test]
    fn test_convex_hull_drops_collinear_points() {
        let points = vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(2.0, 0.0),
            Point2::new(1.0, 1.0),
        ];

        let hull = convex_hull(&points, 1e-10);
        assert_eq!(hull, vec![0, 2, 3]);
    }

    #[test]
    fn test_fill_pockets_l_shape() {
        let points = vec![
            Point2::new(0.0, 0.0),
            Point2::new(2.0, 0.0),
            Point2::new(2.0, 1.0),
            Point2::new(1.0, 1.0),
            Point2::new(1.0, 2.0),
            Point2::new(0.0, 2.0),
        ];
        let ring: Vec<usize> = (0..points.len()).collect();

        let (triangles, closing) = fill_pockets(&points, &ring, 1e-10).unwrap();

        assert_eq!(triangles.len(), 1);
        let mut notch = triangles[0].to_vec();
        notch.sort_unstable();
        assert_eq!(notch, vec![2, 3, 4]);
        assert_eq!(closing, vec![(2, 4)]);
    }

    #[test]
    fn test_fill_pockets_convex_ring_is_empty() {
        let points = vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(2.0, 0.0),
            Point2::new(2.0, 2.0),
            Point2::new(0.0, 2.0),
        ];
        let ring: Vec<usize> = (0..points.len()).collect();

        let (triangles, closing) = fill_pockets(&points, &ring, 1e-10).unwrap();
        assert!(triangles.is_empty());
        assert!(closing.is_empty());
    }
}
