//! Retirement of a refined cell and its two empty faces.
//!
//! Two phases: [`Retirement::prepare`] checks, against the mesh before any
//! splice, that nothing outside the plan still refers to the entities being
//! removed; [`Retirement::apply`] removes them once the wedges are in place.
//! Surviving handles are untouched, so no reference needs shifting.

use std::collections::HashSet;

use crate::mesh::Mesh;
use crate::mesh_error::{Entity, MeshError};
use crate::refine::plan::RefinementPlan;
use crate::topology::handle::{CellHandle, FaceHandle};

#[derive(Debug)]
pub(super) struct Retirement {
    cell: CellHandle,
    faces: [FaceHandle; 2],
}

impl Retirement {
    pub(super) fn prepare(mesh: &Mesh, plan: &RefinementPlan) -> Result<Self, MeshError> {
        let target = plan.target();
        let faces = plan.retired_faces();

        for f in faces {
            let face = mesh.face(f)?;
            if face.owner() != target {
                return Err(MeshError::IndexConsistency {
                    entity: Entity::Face(f),
                    reason: format!(
                        "retiring face is owned by cell {}, not by {target}",
                        face.owner()
                    ),
                });
            }
            if let Some(other) = face.neighbour() {
                return Err(MeshError::IndexConsistency {
                    entity: Entity::Face(f),
                    reason: format!("retiring face is still shared with cell {other}"),
                });
            }
        }

        // Every other face of the target must be handed over to a wedge,
        // otherwise it would keep pointing at a removed cell.
        let inherited: HashSet<FaceHandle> = plan.inherited_faces().collect();
        for &f in mesh.cell(target)?.faces() {
            if faces.contains(&f) || inherited.contains(&f) {
                continue;
            }
            return Err(MeshError::IndexConsistency {
                entity: Entity::Face(f),
                reason: format!("face would keep referencing retired cell {target}"),
            });
        }

        Ok(Self {
            cell: target,
            faces,
        })
    }

    pub(super) fn apply(self, mesh: &mut Mesh) -> Result<(), MeshError> {
        for f in self.faces {
            mesh.remove_face(f)?;
        }
        mesh.remove_cell(self.cell)?;
        Ok(())
    }
}
