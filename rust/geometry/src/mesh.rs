// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mesh data structures

use crate::triangulation::Triangle;
use nalgebra::{Point3, Vector3};

/// Triangle mesh
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    /// Vertex positions (x, y, z)
    pub positions: Vec<f32>,
    /// Vertex normals (nx, ny, nz)
    pub normals: Vec<f32>,
    /// Triangle indices (i0, i1, i2)
    pub indices: Vec<u32>,
}

/// Area-weighted normal of a triangulated face, +Z if it has no area
fn face_normal(positions: &[Point3<f64>], triangles: &[Triangle]) -> Vector3<f64> {
    let sum = triangles.iter().fold(Vector3::zeros(), |acc, &[a, b, c]| {
        let e1 = positions[b] - positions[a];
        let e2 = positions[c] - positions[a];
        acc + e1.cross(&e2)
    });

    sum.try_normalize(f64::EPSILON)
        .unwrap_or_else(|| Vector3::new(0.0, 0.0, 1.0))
}

impl Mesh {
    /// Create a new empty mesh
    pub fn new() -> Self {
        Self {
            positions: Vec::new(),
            normals: Vec::new(),
            indices: Vec::new(),
        }
    }

    /// Create a mesh with capacity
    pub fn with_capacity(vertex_count: usize, index_count: usize) -> Self {
        Self {
            positions: Vec::with_capacity(vertex_count * 3),
            normals: Vec::with_capacity(vertex_count * 3),
            indices: Vec::with_capacity(index_count),
        }
    }

    /// Build a mesh from one triangulated face
    pub fn from_face(positions: &[Point3<f64>], triangles: &[Triangle]) -> Self {
        let mut mesh = Self::with_capacity(positions.len(), triangles.len() * 3);
        mesh.append_face(positions, triangles);
        mesh
    }

    /// Append a triangulated face with its own flat-shaded vertices
    pub fn append_face(&mut self, positions: &[Point3<f64>], triangles: &[Triangle]) {
        if triangles.is_empty() {
            return;
        }

        let normal = face_normal(positions, triangles);
        let vertex_offset = self.vertex_count() as u32;

        for &position in positions {
            self.add_vertex(position, normal);
        }
        for &[a, b, c] in triangles {
            self.add_triangle(
                vertex_offset + a as u32,
                vertex_offset + b as u32,
                vertex_offset + c as u32,
            );
        }
    }

    /// Add a vertex with normal
    #[inline]
    pub fn add_vertex(&mut self, position: Point3<f64>, normal: Vector3<f64>) {
        self.positions.push(position.x as f32);
        self.positions.push(position.y as f32);
        self.positions.push(position.z as f32);

        self.normals.push(normal.x as f32);
        self.normals.push(normal.y as f32);
        self.normals.push(normal.z as f32);
    }

    /// Add a triangle
    #[inline]
    pub fn add_triangle(&mut self, i0: u32, i1: u32, i2: u32) {
        self.indices.push(i0);
        self.indices.push(i1);
        self.indices.push(i2);
    }

    /// Merge another mesh into this one
    #[inline]
    pub fn merge(&mut self, other: &Mesh) {
        if other.is_empty() {
            return;
        }

        let vertex_offset = (self.positions.len() / 3) as u32;

        self.positions.reserve(other.positions.len());
        self.normals.reserve(other.normals.len());
        self.indices.reserve(other.indices.len());

        self.positions.extend_from_slice(&other.positions);
        self.normals.extend_from_slice(&other.normals);
        self.indices
            .extend(other.indices.iter().map(|&i| i + vertex_offset));
    }

    /// Get vertex count
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    /// Get triangle count
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Check if mesh is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Calculate bounds (min, max)
    #[inline]
    pub fn bounds(&self) -> (Point3<f32>, Point3<f32>) {
        if self.is_empty() {
            return (Point3::origin(), Point3::origin());
        }

        let mut min = Point3::new(f32::MAX, f32::MAX, f32::MAX);
        let mut max = Point3::new(f32::MIN, f32::MIN, f32::MIN);

        self.positions.chunks_exact(3).for_each(|chunk| {
            let (x, y, z) = (chunk[0], chunk[1], chunk[2]);
            min.x = min.x.min(x);
            min.y = min.y.min(y);
            min.z = min.z.min(z);
            max.x = max.x.max(x);
            max.y = max.y.max(y);
            max.z = max.z.max(z);
        });

        (min, max)
    }
}

impl Default for Mesh {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mesh_creation() {
        let mesh = Mesh::new();
        assert!(mesh.is_empty());
        assert_eq!(mesh.vertex_count(), 0);
        assert_eq!(mesh.triangle_count(), 0);
    }

    #[test]
    fn test_add_vertex() {
        let mut mesh = Mesh::new();
        mesh.add_vertex(Point3::new(1.0, 2.0, 3.0), Vector3::new(0.0, 0.0, 1.0));
        assert_eq!(mesh.vertex_count(), 1);
        assert_eq!(mesh.positions, vec![1.0, 2.0, 3.0]);
        assert_eq!(mesh.normals, vec![0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_from_face_flat_normal() {
        let positions = vec![
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(1.0, 0.0, 1.0),
            Point3::new(1.0, 1.0, 1.0),
            Point3::new(0.0, 1.0, 1.0),
        ];

        let mesh = Mesh::from_face(&positions, &[[0, 1, 2], [0, 2, 3]]);

        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(mesh.indices, vec![0, 1, 2, 0, 2, 3]);
        for normal in mesh.normals.chunks_exact(3) {
            assert_eq!(normal, &[0.0, 0.0, 1.0]);
        }
    }

    #[test]
    fn test_append_face_offsets_indices() {
        let tri = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];

        let mut mesh = Mesh::from_face(&tri, &[[0, 1, 2]]);
        mesh.append_face(&tri, &[[0, 1, 2]]);
        mesh.append_face(&tri, &[]);

        assert_eq!(mesh.vertex_count(), 6);
        assert_eq!(mesh.indices, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_merge() {
        let mut mesh1 = Mesh::new();
        mesh1.add_vertex(Point3::new(0.0, 0.0, 0.0), Vector3::z());
        mesh1.add_triangle(0, 1, 2);

        let mut mesh2 = Mesh::new();
        mesh2.add_vertex(Point3::new(1.0, 1.0, 1.0), Vector3::y());
        mesh2.add_triangle(0, 1, 2);

        mesh1.merge(&mesh2);
        assert_eq!(mesh1.vertex_count(), 2);
        assert_eq!(mesh1.triangle_count(), 2);
        assert_eq!(&mesh1.indices[3..], &[1, 2, 3]);
    }

    #[test]
    fn test_bounds() {
        let tri = vec![
            Point3::new(-1.0, 0.0, 2.0),
            Point3::new(3.0, 0.0, 2.0),
            Point3::new(0.0, 5.0, 2.0),
        ];
        let mesh = Mesh::from_face(&tri, &[[0, 1, 2]]);

        let (min, max) = mesh.bounds();
        assert_eq!(min, Point3::new(-1.0, 0.0, 2.0));
        assert_eq!(max, Point3::new(3.0, 5.0, 2.0));
    }
}
