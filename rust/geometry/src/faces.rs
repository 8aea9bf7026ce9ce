// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Batch triangulation of mesh faces
//!
//! Each face is triangulated independently. An ordered face whose boundary
//! turns out not to be in order is re-sorted and tried once more; a face
//! that still fails is recorded and logged, and the rest of the batch
//! carries on.

use crate::config::TriangulationConfig;
use crate::error::{Error, Result};
use crate::mesh::Mesh;
use crate::triangulation::{triangulate_vertices_with, Triangle};
use crate::Point3;
use rayon::prelude::*;

/// Per-face outcome of [`triangulate_faces`], in input order
#[derive(Debug, Clone)]
pub struct FaceBatch {
    pub results: Vec<Result<Vec<Triangle>>>,
    /// Faces that only triangulated after re-sorting their vertices
    pub retried: Vec<usize>,
}

impl FaceBatch {
    /// Number of faces that triangulated
    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|r| r.is_ok()).count()
    }

    /// Failed faces with their index in the batch
    pub fn failed(&self) -> Vec<(usize, &Error)> {
        self.results
            .iter()
            .enumerate()
            .filter_map(|(i, r)| r.as_ref().err().map(|e| (i, e)))
            .collect()
    }

    /// Total triangles across all successful faces
    pub fn triangle_count(&self) -> usize {
        self.results
            .iter()
            .filter_map(|r| r.as_ref().ok())
            .map(Vec::len)
            .sum()
    }

    /// Assemble successful faces into one flat-shaded mesh.
    ///
    /// `faces` must be the same slice the batch was computed from.
    pub fn into_mesh(self, faces: &[Vec<Point3<f64>>]) -> Mesh {
        let mut mesh = Mesh::new();
        for (face, result) in faces.iter().zip(self.results) {
            if let Ok(triangles) = result {
                mesh.append_face(face, &triangles);
            }
        }
        mesh
    }
}

/// Face outcome and whether the unordered fallback produced it
fn triangulate_face(
    index: usize,
    face: &[Point3<f64>],
    unordered: bool,
    convex: bool,
    config: &TriangulationConfig,
) -> (Result<Vec<Triangle>>, bool) {
    let mut result = triangulate_vertices_with(face, unordered, convex, config);
    let mut retried = false;

    if !unordered {
        if let Err(err) = &result {
            if err.is_retryable_unordered() {
                tracing::debug!(face = index, error = %err, "re-sorting face vertices");
                result = triangulate_vertices_with(face, true, convex, config);
                retried = result.is_ok();
            }
        }
    }

    if let Err(err) = &result {
        tracing::warn!(face = index, vertices = face.len(), error = %err, "skipping face");
    }
    (result, retried)
}

/// Triangulate many faces, in parallel once the batch is large enough.
///
/// With `unordered` unset, a face that fails because its vertices are not in
/// boundary order is retried through the re-sorting path.
pub fn triangulate_faces(
    faces: &[Vec<Point3<f64>>],
    unordered: bool,
    convex: bool,
    config: &TriangulationConfig,
) -> FaceBatch {
    let outcomes: Vec<(Result<Vec<Triangle>>, bool)> = if faces.len() >= config.parallel_threshold {
        faces
            .par_iter()
            .enumerate()
            .map(|(i, face)| triangulate_face(i, face, unordered, convex, config))
            .collect()
    } else {
        faces
            .iter()
            .enumerate()
            .map(|(i, face)| triangulate_face(i, face, unordered, convex, config))
            .collect()
    };

    let retried = outcomes
        .iter()
        .enumerate()
        .filter_map(|(i, (_, retried))| retried.then_some(i))
        .collect();
    let results = outcomes.into_iter().map(|(result, _)| result).collect();

    let batch = FaceBatch { results, retried };
    tracing::debug!(
        faces = faces.len(),
        succeeded = batch.succeeded(),
        retried = batch.retried.len(),
        triangles = batch.triangle_count(),
        "triangulated face batch"
    );
    batch
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad(z: f64) -> Vec<Point3<f64>> {
        vec![
            Point3::new(0.0, 0.0, z),
            Point3::new(1.0, 0.0, z),
            Point3::new(1.0, 1.0, z),
            Point3::new(0.0, 1.0, z),
        ]
    }

    #[test]
    fn test_failed_face_does_not_abort_batch() {
        let faces = vec![
            quad(0.0),
            vec![Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0)],
            quad(1.0),
        ];

        let batch = triangulate_faces(&faces, false, false, &TriangulationConfig::default());

        assert_eq!(batch.succeeded(), 2);
        let failed = batch.failed();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].0, 1);
        assert_eq!(failed[0].1, &Error::InsufficientPoints { found: 2 });

        let mesh = batch.into_mesh(&faces);
        assert_eq!(mesh.vertex_count(), 8);
        assert_eq!(mesh.triangle_count(), 4);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let faces: Vec<Vec<Point3<f64>>> = (0..20).map(|i| quad(i as f64)).collect();

        let sequential = triangulate_faces(
            &faces,
            true,
            false,
            &TriangulationConfig::default().with_parallel_threshold(usize::MAX),
        );
        let parallel = triangulate_faces(
            &faces,
            true,
            false,
            &TriangulationConfig::default().with_parallel_threshold(1),
        );

        assert_eq!(sequential.results, parallel.results);
        assert_eq!(parallel.triangle_count(), 40);
    }

    #[test]
    fn test_scrambled_ordered_face_is_resorted() {
        // House-shaped pentagon with two corners swapped: the boundary
        // crosses itself but still encloses area
        let scrambled = vec![
            Point3::new(0.0, 0.0, 2.0),
            Point3::new(2.0, 2.0, 2.0),
            Point3::new(2.0, 0.0, 2.0),
            Point3::new(0.0, 2.0, 2.0),
            Point3::new(1.0, 3.0, 2.0),
        ];
        let faces = vec![quad(0.0), scrambled];

        let batch = triangulate_faces(&faces, false, false, &TriangulationConfig::default());

        assert_eq!(batch.succeeded(), 2);
        assert_eq!(batch.retried, vec![1]);
        let triangles = batch.results[1].as_ref().unwrap();
        assert_eq!(triangles.len(), 3);
        let mut used: Vec<usize> = triangles.iter().flatten().copied().collect();
        used.sort_unstable();
        used.dedup();
        assert_eq!(used, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_degenerate_face_is_not_retried() {
        let line: Vec<Point3<f64>> = (0..4).map(|i| Point3::new(i as f64, 0.0, 0.0)).collect();
        let faces = vec![line];

        let batch = triangulate_faces(&faces, false, false, &TriangulationConfig::default());

        assert!(batch.retried.is_empty());
        assert!(matches!(batch.failed()[0].1, Error::DegenerateGeometry(_)));
    }
}
