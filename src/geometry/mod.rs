//! Geometry utilities for fv-mesh.
//!
//! Pure functions computing face area vectors/centroids and cell
//! volumes/centroids from point coordinates.

pub mod metrics;
