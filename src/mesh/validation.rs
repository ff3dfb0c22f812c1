//! Ground-truth consistency checks for [`Mesh`].
//!
//! `validate_invariants` rescans the whole mesh; it is meant for tests, for
//! `RefineOptions::check_invariants` and for the `debug_invariants!` hook, not
//! for hot paths.

use std::collections::HashSet;

use crate::debug_invariants::DebugInvariants;
use crate::mesh::Mesh;
use crate::mesh_error::{Entity, MeshError};

impl DebugInvariants for Mesh {
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "Mesh");
    }

    fn validate_invariants(&self) -> Result<(), MeshError> {
        let broken = |entity: Entity, reason: String| MeshError::IndexConsistency { entity, reason };

        for (fh, face) in self.faces() {
            let entity = Entity::Face(fh);
            if face.points.len() < 3 {
                return Err(broken(entity, format!("{} points", face.points.len())));
            }
            for &p in &face.points {
                self.point(p)
                    .map_err(|_| broken(entity, format!("dangling point {p}")))?;
            }
            if face.zone.is_boundary() == face.neighbour.is_some() {
                return Err(broken(
                    entity,
                    format!("zone {:?} with neighbour {:?}", face.zone, face.neighbour),
                ));
            }
            for cell in std::iter::once(face.owner).chain(face.neighbour) {
                let c = self
                    .cell(cell)
                    .map_err(|_| broken(entity, format!("dangling cell {cell}")))?;
                if !c.faces.contains(&fh) {
                    return Err(broken(
                        entity,
                        format!("cell {cell} does not list this face"),
                    ));
                }
            }
            if face.neighbour == Some(face.owner) {
                return Err(broken(entity, "owner equals neighbour".into()));
            }
        }

        for (ch, cell) in self.cells() {
            let entity = Entity::Cell(ch);
            if cell.faces.is_empty() {
                return Err(broken(entity, "no faces".into()));
            }
            let mut seen = HashSet::with_capacity(cell.faces.len());
            for &fh in &cell.faces {
                if !seen.insert(fh) {
                    return Err(broken(entity, format!("face {fh} listed twice")));
                }
                let face = self
                    .face(fh)
                    .map_err(|_| broken(entity, format!("dangling face {fh}")))?;
                if !face.touches(ch) {
                    return Err(broken(
                        entity,
                        format!("face {fh} does not reference this cell"),
                    ));
                }
            }
            if !(cell.volume() > 0.0) {
                return Err(MeshError::DegenerateGeometry {
                    entity,
                    what: "volume",
                    value: cell.volume(),
                });
            }
        }

        self.ledger.validate()?;
        let rescanned = self.rescan_ledger()?;
        if rescanned != self.ledger {
            return Err(MeshError::LedgerMismatch(format!(
                "maintained {:?} != rescanned {:?}",
                self.ledger, rescanned
            )));
        }
        Ok(())
    }
}
