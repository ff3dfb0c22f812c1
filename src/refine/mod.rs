//! Local point-addition refinement of extruded 2D meshes.
//!
//! A mesh that represents a 2D geometry as one layer of 3D cells has every
//! cell bounded, along the thickness axis, by a pair of faces on an *empty*
//! patch. Refining such a cell inserts one new point at the centroid of each
//! of the two empty faces and splits the cell into `p` wedges, `p` being the
//! number of edges of its empty faces:
//!
//! ```text
//!   before (p = 4)          after
//!   +-------+               +-------+
//!   |       |               |\  0  /|
//!   |   c   |      ==>      | 3 + 1 |
//!   |       |               |/  2  \|
//!   +-------+               +-------+
//! ```
//!
//! Each wedge `i` is bounded by two new triangles on the empty patch, two new
//! internal faces through the inserted points (shared with wedges `i - 1` and
//! `i + 1`) and the one face of the old cell lying on edge `i`. The old cell
//! and its two empty faces are then retired. Per refined cell the mesh gains
//! `p - 1` cells and `3p - 2` faces.
//!
//! # Expected invariants
//! - The two empty faces of a target cell have the same number of points and
//!   their points coincide exactly in the coordinates orthogonal to the
//!   thickness axis.
//! - Every non-empty face of the target lies on exactly one edge of the empty
//!   faces.
//!
//! # Atomicity
//! [`refine_cell`] plans the whole split before touching the mesh, so a
//! failure leaves the mesh as it was. [`refine_cells`] works on a snapshot and
//! only commits it once every queued cell has been refined.

mod plan;
mod retire;

use serde::{Deserialize, Serialize};

use crate::debug_invariants::DebugInvariants;
use crate::mesh::Mesh;
use crate::mesh_error::MeshError;
use crate::topology::handle::CellHandle;
use crate::topology::patch::PatchKind;

pub use plan::RefinementPlan;

/// Coordinate axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    #[default]
    Z,
}

impl Axis {
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    /// The two axes orthogonal to this one.
    #[inline]
    pub fn in_plane(self) -> [usize; 2] {
        match self {
            Axis::X => [1, 2],
            Axis::Y => [0, 2],
            Axis::Z => [0, 1],
        }
    }
}

/// Optional settings for refinement.
#[derive(Clone, Debug, Default)]
pub struct RefineOptions {
    /// Name of the patch bounding the thickness direction. When unset, the
    /// first patch of kind [`PatchKind::Empty`] is used.
    pub empty_patch: Option<String>,
    /// Thickness axis along which the two new points are inserted.
    pub thickness_axis: Axis,
    /// When enabled, rescan the whole mesh after every refined cell and fail
    /// on any broken invariant.
    pub check_invariants: bool,
}

impl RefineOptions {
    fn resolve_empty_patch(&self, mesh: &Mesh) -> Result<usize, MeshError> {
        match &self.empty_patch {
            Some(name) => mesh.patch_index(name),
            None => mesh.first_patch_of_kind(PatchKind::Empty),
        }
    }
}

/// Splits one cell into wedges and returns the handles of the new cells.
///
/// On error the mesh is left untouched. The split is planned and checked
/// against the unmodified mesh; with `check_invariants` set it is carried out
/// on a copy that replaces `mesh` only once the full check has passed.
pub fn refine_cell(
    mesh: &mut Mesh,
    target: CellHandle,
    options: &RefineOptions,
) -> Result<Vec<CellHandle>, MeshError> {
    let empty_patch = options.resolve_empty_patch(mesh)?;
    if !options.check_invariants {
        let wedges = refine_one(mesh, target, empty_patch, options)?;
        crate::debug_invariants!(mesh.validate_invariants(), "refine_cell");
        return Ok(wedges);
    }
    let mut working = mesh.clone();
    let wedges = refine_one(&mut working, target, empty_patch, options)?;
    working.validate_invariants()?;
    *mesh = working;
    Ok(wedges)
}

/// Refines every cell of `targets`, in order.
///
/// Handles of cells that survive a step stay valid, so the queue never needs
/// fixing up. The returned list holds the handles of all cells created by
/// the batch that still exist at its end (a new cell may itself appear later
/// in the queue, in which case it is replaced by its own wedges).
///
/// The batch is all-or-nothing: on the first failure the mesh is left at its
/// state before the call and the error names the offending cell. The ledger
/// is checked against the face table after every step, whatever the options.
pub fn refine_cells(
    mesh: &mut Mesh,
    targets: &[CellHandle],
    options: &RefineOptions,
) -> Result<Vec<CellHandle>, MeshError> {
    let empty_patch = options.resolve_empty_patch(mesh)?;
    let mut working = mesh.clone();
    let mut created: Vec<CellHandle> = Vec::new();

    for &target in targets {
        let step = refine_one(&mut working, target, empty_patch, options).and_then(|wedges| {
            working.check_ledger()?;
            if options.check_invariants {
                working.validate_invariants()?;
            }
            Ok(wedges)
        });
        match step {
            Ok(wedges) => {
                crate::debug_invariants!(working.validate_invariants(), "refine_cells");
                created.retain(|&c| c != target);
                created.extend(wedges);
            }
            Err(source) => {
                log::warn!(
                    "refinement batch aborted at cell {target}: {source}; mesh rolled back"
                );
                return Err(MeshError::RefinementFailed {
                    cell: target,
                    source: Box::new(source),
                });
            }
        }
    }

    log::info!(
        "refined {} cells: {} new cells, mesh now has {} cells and {} faces",
        targets.len(),
        created.len(),
        working.n_cells(),
        working.n_faces()
    );
    *mesh = working;
    Ok(created)
}

fn refine_one(
    mesh: &mut Mesh,
    target: CellHandle,
    empty_patch: usize,
    options: &RefineOptions,
) -> Result<Vec<CellHandle>, MeshError> {
    if !mesh.contains_cell(target) {
        return Err(MeshError::UnknownCell(target));
    }
    let plan = RefinementPlan::build(mesh, target, empty_patch, options.thickness_axis)?;
    let retirement = retire::Retirement::prepare(mesh, &plan)?;
    let wedges = plan.apply(mesh)?;
    retirement.apply(mesh)?;

    log::debug!(
        "cell {target} split into {} wedges {:?}",
        wedges.len(),
        wedges
    );
    Ok(wedges)
}
