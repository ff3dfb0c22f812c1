//! Boundary patches and face zones.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::mesh_error::MeshError;

/// Type tag of a boundary patch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatchKind {
    /// Ordinary boundary patch (inlet, outlet, far field, ...).
    Patch,
    /// Solid wall.
    Wall,
    /// Placeholder patch bounding the thickness direction of a 2D mesh
    /// extruded to one cell layer in 3D. Refinement inserts points along it.
    Empty,
}

impl fmt::Display for PatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PatchKind::Patch => "patch",
            PatchKind::Wall => "wall",
            PatchKind::Empty => "empty",
        })
    }
}

impl FromStr for PatchKind {
    type Err = MeshError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "patch" => Ok(PatchKind::Patch),
            "wall" => Ok(PatchKind::Wall),
            "empty" => Ok(PatchKind::Empty),
            other => Err(MeshError::InvalidInput(format!(
                "unknown patch type `{other}`"
            ))),
        }
    }
}

/// A named, typed boundary patch.
///
/// The face range of a patch is not stored here; it is tracked by
/// [`FaceLedger`](crate::topology::ledger::FaceLedger).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patch {
    pub name: String,
    pub kind: PatchKind,
}

/// Which partition of the face index space a face belongs to.
///
/// The derived ordering is the canonical face order: internal faces first,
/// then each patch in patch order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FaceZone {
    Internal,
    /// Boundary face of the patch with this ordinal.
    Boundary(usize),
}

impl FaceZone {
    #[inline]
    pub fn is_boundary(self) -> bool {
        matches!(self, FaceZone::Boundary(_))
    }

    #[inline]
    pub fn patch(self) -> Option<usize> {
        match self {
            FaceZone::Internal => None,
            FaceZone::Boundary(p) => Some(p),
        }
    }
}
