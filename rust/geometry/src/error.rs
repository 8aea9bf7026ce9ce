// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for geometry operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while projecting or triangulating a face
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Fewer than 3 (distinct) points were supplied.
    #[error("Need at least 3 points, found {found}")]
    InsufficientPoints { found: usize },

    /// Points have no usable extent, or the contour encloses zero area.
    #[error("Degenerate geometry: {0}")]
    DegenerateGeometry(String),

    /// The contour could not be triangulated without inserting vertices.
    #[error("Triangulation failed: {0}")]
    TriangulationFailed(String),
}

impl Error {
    /// Create a degenerate geometry error
    pub fn degenerate(msg: impl Into<String>) -> Self {
        Error::DegenerateGeometry(msg.into())
    }

    /// Create a triangulation failure
    pub fn failed(msg: impl Into<String>) -> Self {
        Error::TriangulationFailed(msg.into())
    }

    /// True when retrying through the unordered (re-sorting) entry point may help
    pub fn is_retryable_unordered(&self) -> bool {
        matches!(self, Error::TriangulationFailed(_))
    }
}
