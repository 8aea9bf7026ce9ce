// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Polyface Geometry
//!
//! Planar polygon triangulation for polygonal mesh faces: best-fit plane
//! projection, winding classification and sorting, and constrained
//! triangulation that never inserts vertices.

pub mod config;
mod delaunay;
mod earclip;
pub mod error;
pub mod faces;
pub mod hull;
pub mod mesh;
pub mod projection;
pub mod triangulation;
pub mod winding;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point2, Point3, Vector2, Vector3};

pub use config::TriangulationConfig;
pub use error::{Error, Result};
pub use faces::{triangulate_faces, FaceBatch};
pub use mesh::Mesh;
pub use projection::{best_fit_plane, calculate_polygon_normal, project_to_plane, PlanarBasis, Plane};
pub use triangulation::{
    triangulate_ordered, triangulate_ordered_with, triangulate_unordered,
    triangulate_unordered_with, triangulate_vertices, triangulate_vertices_with, Triangle,
};
pub use winding::{signed_area, sort_by_winding, winding_order, SortMethod, SortedContour, WindingOrder};
