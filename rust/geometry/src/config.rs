// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Triangulation settings, optionally loaded from environment variables.

/// Default tolerance for area, winding and extent comparisons
pub const DEFAULT_EPSILON: f64 = 1e-10;

/// Default face count at which batches switch to rayon
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 64;

/// Triangulation configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriangulationConfig {
    /// Relative tolerance. A contour's signed areas are treated as zero at or
    /// below `epsilon * extent²`; projection treats point spreads at or below
    /// `epsilon` as coincident.
    pub epsilon: f64,
    /// Run Lawson edge flips on interior diagonals after ear clipping.
    pub delaunay_refine: bool,
    /// Minimum number of faces before a batch is processed in parallel.
    pub parallel_threshold: usize,
}

impl TriangulationConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from any key/value source.
    ///
    /// Missing or unparsable values fall back to the defaults; a negative or
    /// non-finite epsilon is ignored.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            epsilon: lookup("POLYFACE_EPSILON")
                .and_then(|v| v.trim().parse::<f64>().ok())
                .filter(|e| e.is_finite() && *e >= 0.0)
                .unwrap_or(DEFAULT_EPSILON),
            delaunay_refine: lookup("POLYFACE_DELAUNAY_REFINE")
                .unwrap_or_else(|| "true".into())
                .trim()
                .parse()
                .unwrap_or(true),
            parallel_threshold: lookup("POLYFACE_PARALLEL_THRESHOLD")
                .unwrap_or_else(|| DEFAULT_PARALLEL_THRESHOLD.to_string())
                .trim()
                .parse()
                .unwrap_or(DEFAULT_PARALLEL_THRESHOLD),
        }
    }

    /// Override the comparison tolerance
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Enable or disable Delaunay refinement
    pub fn with_delaunay_refine(mut self, enabled: bool) -> Self {
        self.delaunay_refine = enabled;
        self
    }

    /// Override the batch parallelism threshold
    pub fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }
}

impl Default for TriangulationConfig {
    fn default() -> Self {
        Self {
            epsilon: DEFAULT_EPSILON,
            delaunay_refine: true,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }
}
