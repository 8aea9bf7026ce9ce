// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Planar projection of near-coplanar 3D points
//!
//! A face's vertices are fitted with a least-squares plane and flattened onto
//! an orthonormal basis of that plane so they can be triangulated in 2D.

use crate::config::DEFAULT_EPSILON;
use crate::error::{Error, Result};
use crate::{Point2, Point3, Vector3};
use nalgebra::Matrix3;

/// Plane definition
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    /// Point on the plane
    pub point: Point3<f64>,
    /// Unit normal
    pub normal: Vector3<f64>,
}

impl Plane {
    /// Create a new plane
    pub fn new(point: Point3<f64>, normal: Vector3<f64>) -> Self {
        Self {
            point,
            normal: normal.normalize(),
        }
    }

    /// Signed distance from point to plane, positive in front
    pub fn signed_distance(&self, point: &Point3<f64>) -> f64 {
        (point - self.point).dot(&self.normal)
    }
}

/// 2D coordinate system embedded in a plane
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanarBasis {
    pub origin: Point3<f64>,
    pub u_axis: Vector3<f64>,
    pub v_axis: Vector3<f64>,
    pub normal: Vector3<f64>,
}

impl PlanarBasis {
    /// Build an orthonormal basis perpendicular to `normal`
    pub fn new(origin: Point3<f64>, normal: &Vector3<f64>) -> Self {
        let normal = normal.normalize();

        // Cross with the axis least parallel to the normal for a stable result
        let abs_x = normal.x.abs();
        let abs_y = normal.y.abs();
        let abs_z = normal.z.abs();

        let reference = if abs_x <= abs_y && abs_x <= abs_z {
            Vector3::new(1.0, 0.0, 0.0)
        } else if abs_y <= abs_z {
            Vector3::new(0.0, 1.0, 0.0)
        } else {
            Vector3::new(0.0, 0.0, 1.0)
        };

        let u_axis = normal.cross(&reference).normalize();
        let v_axis = normal.cross(&u_axis).normalize();

        Self {
            origin,
            u_axis,
            v_axis,
            normal,
        }
    }

    /// Project a single point into plane coordinates
    #[inline]
    pub fn project_point(&self, point: &Point3<f64>) -> Point2<f64> {
        let v = point - self.origin;
        Point2::new(v.dot(&self.u_axis), v.dot(&self.v_axis))
    }

    /// Project points into this basis, keeping their order
    pub fn project(&self, points: &[Point3<f64>]) -> Vec<Point2<f64>> {
        points.iter().map(|p| self.project_point(p)).collect()
    }

    /// Lift plane coordinates back into 3D
    #[inline]
    pub fn unproject(&self, point: &Point2<f64>) -> Point3<f64> {
        self.origin + self.u_axis * point.x + self.v_axis * point.y
    }
}

/// Newell normal of an ordered polygon, not normalized
fn newell_normal(points: &[Point3<f64>]) -> Vector3<f64> {
    let n = points.len();
    let mut normal = Vector3::<f64>::zeros();

    for i in 0..n {
        let current = &points[i];
        let next = &points[(i + 1) % n];

        normal.x += (current.y - next.y) * (current.z + next.z);
        normal.y += (current.z - next.z) * (current.x + next.x);
        normal.z += (current.x - next.x) * (current.y + next.y);
    }

    normal
}

/// Calculate the normal of an ordered polygon from its vertices
/// Optimized for triangles and quads using simple cross product
#[inline]
pub fn calculate_polygon_normal(points: &[Point3<f64>]) -> Vector3<f64> {
    let n = points.len();

    if n < 3 {
        return Vector3::new(0.0, 0.0, 1.0);
    }

    // FAST PATH: Triangle or quad - use simple cross product
    if n <= 4 {
        let v1 = points[1] - points[0];
        let v2 = points[2] - points[0];
        let normal = v1.cross(&v2);
        let len = normal.norm();
        if len > DEFAULT_EPSILON {
            return normal / len;
        }
        if n == 4 {
            let v3 = points[3] - points[0];
            let normal = v2.cross(&v3);
            let len = normal.norm();
            if len > DEFAULT_EPSILON {
                return normal / len;
            }
        }
        return Vector3::new(0.0, 0.0, 1.0);
    }

    let normal = newell_normal(points);
    let len = normal.norm();
    if len > DEFAULT_EPSILON {
        normal / len
    } else {
        Vector3::new(0.0, 0.0, 1.0)
    }
}

/// Least-squares plane through a point set.
///
/// The normal is the covariance eigenvector with the smallest eigenvalue, so
/// it does not depend on the order of the points. Its sign follows the Newell
/// normal of the given order when that is non-zero; otherwise the largest
/// component is made positive. Collinear input still yields a perpendicular
/// normal. Only coincident points are rejected.
pub fn best_fit_plane(points: &[Point3<f64>]) -> Result<Plane> {
    best_fit_plane_eps(points, DEFAULT_EPSILON)
}

pub(crate) fn best_fit_plane_eps(points: &[Point3<f64>], epsilon: f64) -> Result<Plane> {
    let n = points.len();
    if n < 3 {
        return Err(Error::InsufficientPoints { found: n });
    }

    let sum = points
        .iter()
        .fold(Vector3::<f64>::zeros(), |acc, p| acc + p.coords);
    let centroid = Point3::from(sum / n as f64);

    let extent = points
        .iter()
        .map(|p| (p - centroid).norm())
        .fold(0.0_f64, f64::max);
    if extent <= epsilon {
        return Err(Error::degenerate("all points are coincident"));
    }

    let mut covariance = Matrix3::<f64>::zeros();
    for p in points {
        let d = p - centroid;
        covariance += d * d.transpose();
    }

    let eigen = covariance.symmetric_eigen();
    let smallest = eigen
        .eigenvalues
        .iter()
        .enumerate()
        .min_by(|a, b| a.1.total_cmp(b.1))
        .map(|(i, _)| i)
        .unwrap_or(2);
    let mut normal: Vector3<f64> = eigen.eigenvectors.column(smallest).into_owned();

    let len = normal.norm();
    if !(len > epsilon) {
        return Err(Error::degenerate("could not resolve a plane normal"));
    }
    normal /= len;

    let newell = newell_normal(points);
    if newell.norm() > epsilon * extent * extent {
        if normal.dot(&newell) < 0.0 {
            normal = -normal;
        }
    } else {
        let dominant = normal.iamax();
        if normal[dominant] < 0.0 {
            normal = -normal;
        }
    }

    Ok(Plane::new(centroid, normal))
}

/// Project 3D points onto a 2D plane defined by a normal
/// Returns 2D points and the basis used, with the first point as origin
#[inline]
pub fn project_to_2d(
    points_3d: &[Point3<f64>],
    normal: &Vector3<f64>,
) -> (Vec<Point2<f64>>, PlanarBasis) {
    let origin = points_3d.first().copied().unwrap_or_else(Point3::origin);
    let basis = PlanarBasis::new(origin, normal);
    (basis.project(points_3d), basis)
}

/// Flatten near-coplanar points onto their best-fit plane.
///
/// Output has the same length and order as the input.
pub fn project_to_plane(points: &[Point3<f64>]) -> Result<Vec<Point2<f64>>> {
    planar_projection(points, DEFAULT_EPSILON).map(|(projected, _)| projected)
}

/// Like [`project_to_plane`] but also returns the basis and takes a tolerance
pub fn planar_projection(
    points: &[Point3<f64>],
    epsilon: f64,
) -> Result<(Vec<Point2<f64>>, PlanarBasis)> {
    let plane = best_fit_plane_eps(points, epsilon)?;
    Ok(project_to_2d(points, &plane.normal))
}
