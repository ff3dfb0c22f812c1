#![cfg_attr(docsrs, feature(doc_cfg))]
//! # fv-mesh
//!
//! fv-mesh is the mesh engine of an unstructured, face-based finite-volume
//! solver. It assembles a mesh from flat reader arrays, derives the geometry
//! a flux solver needs (face area vectors and centroids, cell volumes,
//! centroids and extents) and refines cells of extruded 2D meshes in place by
//! point addition.
//!
//! ## Features
//! - Stable typed handles: points, faces and cells keep their identity across
//!   insertions and deletions, so refinement never renumbers references
//! - An incrementally maintained face ledger giving the internal/patch
//!   position ranges without rescanning
//! - All-or-nothing refinement batches
//! - Position-addressed export ([`mesh::indexed::IndexedMesh`]) for solvers and writers
//!
//! ## Cargo features
//! - `rayon`: evaluate face and cell metrics in parallel during assembly
//! - `strict-invariants` / `check-invariants`: run the full invariant check
//!   after every refined cell in release builds too
//!
//! ## Usage
//! ```rust
//! # fn try_main() -> Result<(), fv_mesh::mesh_error::MeshError> {
//! use fv_mesh::prelude::*;
//!
//! // One square cell of an extruded 2D mesh, z in [0, 1].
//! let input = MeshInput {
//!     points: vec![
//!         [0., 0., 0.], [1., 0., 0.], [1., 1., 0.], [0., 1., 0.],
//!         [0., 0., 1.], [1., 0., 1.], [1., 1., 1.], [0., 1., 1.],
//!     ],
//!     faces: vec![
//!         vec![0, 1, 5, 4], vec![1, 2, 6, 5], vec![2, 3, 7, 6], vec![3, 0, 4, 7],
//!         vec![0, 3, 2, 1], vec![4, 5, 6, 7],
//!     ],
//!     owner: vec![0; 6],
//!     neighbour: vec![],
//!     patches: vec![
//!         PatchSpec::new("sides", PatchKind::Wall, 4, 0),
//!         PatchSpec::new("frontAndBack", PatchKind::Empty, 2, 4),
//!     ],
//! };
//! let mut mesh = assemble(&input, AssembleOptions::default())?;
//! let cell = mesh.cells().next().map(|(h, _)| h).unwrap();
//! let wedges = refine_cells(&mut mesh, &[cell], &RefineOptions::default())?;
//! assert_eq!(wedges.len(), 4);
//! assert_eq!(mesh.n_cells(), 4);
//! # Ok(())
//! # }
//! ```

pub mod debug_invariants;
pub mod geometry;
pub mod mesh;
pub mod mesh_error;
pub mod refine;
pub mod topology;

pub use debug_invariants::DebugInvariants;

/// A convenient prelude to import the most-used traits & types:
pub mod prelude {
    pub use crate::debug_invariants::DebugInvariants;
    pub use crate::geometry::metrics::{
        CellMetrics, FaceMetrics, Vec3, cell_volume_centroid, face_area_centroid,
    };
    pub use crate::mesh::assemble::{AssembleOptions, IndexBase, MeshInput, PatchSpec, assemble};
    pub use crate::mesh::indexed::{IndexedMesh, PatchRange};
    pub use crate::mesh::{Cell, Face, Mesh};
    pub use crate::mesh_error::{Entity, MeshError};
    pub use crate::refine::{Axis, RefineOptions, RefinementPlan, refine_cell, refine_cells};
    pub use crate::topology::handle::{CellHandle, FaceHandle, PointHandle};
    pub use crate::topology::ledger::FaceLedger;
    pub use crate::topology::patch::{FaceZone, Patch, PatchKind};
}
