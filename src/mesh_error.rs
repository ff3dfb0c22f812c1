//! MeshError: Unified error type for fv-mesh public APIs
//!
//! Every fallible operation in the crate returns this type. The four
//! structural kinds (degenerate geometry, topology, face match and index
//! consistency) are fatal for the refinement batch that raised them.

use thiserror::Error;

use crate::topology::handle::{CellHandle, FaceHandle, PointHandle};

/// Entity that a geometric or consistency diagnostic refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    /// Geometry evaluated outside of any mesh.
    Detached,
    /// A face, addressed by its position in the assembler input.
    InputFace(usize),
    /// A cell, addressed by its position in the assembler input.
    InputCell(usize),
    Point(PointHandle),
    Face(FaceHandle),
    Cell(CellHandle),
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Entity::Detached => f.write_str("detached geometry"),
            Entity::InputFace(i) => write!(f, "input face {i}"),
            Entity::InputCell(i) => write!(f, "input cell {i}"),
            Entity::Point(p) => write!(f, "point {p}"),
            Entity::Face(h) => write!(f, "face {h}"),
            Entity::Cell(h) => write!(f, "cell {h}"),
        }
    }
}

/// Unified error type for fv-mesh operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MeshError {
    /// Zero face area or zero cell volume.
    #[error("Degenerate geometry: {what} of {entity} is {value:e}")]
    DegenerateGeometry {
        entity: Entity,
        what: &'static str,
        value: f64,
    },
    /// A refinement target does not have the expected empty-face pair, or the
    /// point correspondence between the pair could not be established.
    #[error("Topology error at cell {cell}: {reason}")]
    Topology { cell: CellHandle, reason: String },
    /// Zero or several inherited faces matched a new cell while stitching.
    #[error("Face match error at cell {cell}, wedge {wedge}: {candidates} candidate faces")]
    FaceMatch {
        cell: CellHandle,
        wedge: usize,
        candidates: usize,
    },
    /// A retirement step found a reference to a deleted entity from an unexpected owner.
    #[error("Index consistency violation on {entity}: {reason}")]
    IndexConsistency { entity: Entity, reason: String },
    /// Assembler input is malformed (lengths, index ranges, patch layout).
    #[error("Invalid mesh input: {0}")]
    InvalidInput(String),
    #[error("Unknown cell handle {0}")]
    UnknownCell(CellHandle),
    #[error("Unknown face handle {0}")]
    UnknownFace(FaceHandle),
    #[error("Unknown point handle {0}")]
    UnknownPoint(PointHandle),
    /// The requested boundary patch does not exist (or no patch of the requested kind).
    #[error("Unknown patch `{0}`")]
    UnknownPatch(String),
    /// The incrementally maintained ledger disagrees with a rescan of the mesh.
    #[error("Ledger mismatch: {0}")]
    LedgerMismatch(String),
    /// A refinement batch aborted; the mesh was left at its last known-good state.
    #[error("Refinement of cell {cell} failed: {source}")]
    RefinementFailed {
        cell: CellHandle,
        #[source]
        source: Box<MeshError>,
    },
}

impl MeshError {
    /// Attributes a geometric failure to `entity`; other errors pass through.
    pub fn attributed_to(self, entity: Entity) -> Self {
        match self {
            MeshError::DegenerateGeometry { what, value, .. } => {
                MeshError::DegenerateGeometry {
                    entity,
                    what,
                    value,
                }
            }
            other => other,
        }
    }

    /// Strips `RefinementFailed` wrappers and returns the underlying error.
    pub fn root_cause(&self) -> &MeshError {
        match self {
            MeshError::RefinementFailed { source, .. } => source.root_cause(),
            other => other,
        }
    }
}
