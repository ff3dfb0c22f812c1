//! Position-addressed snapshot of a [`Mesh`].
//!
//! Flux solvers and mesh writers work on flat arrays. [`IndexedMesh`] lays the
//! mesh out in canonical order:
//!
//! - faces: internal faces first, then each patch in patch order, creation
//!   order inside each zone, so patch `b` occupies `patches[b].start ..
//!   patches[b].start + patches[b].count`;
//! - cells and points: creation order.
//!
//! All positions are 0-based. The handle maps translate refinement results
//! (which are handles) into positions of this snapshot.

use std::collections::HashMap;

use serde::Serialize;

use crate::geometry::metrics::Vec3;
use crate::mesh::Mesh;
use crate::mesh_error::MeshError;
use crate::topology::handle::{CellHandle, FaceHandle, PointHandle};
use crate::topology::patch::PatchKind;

/// Position range of one patch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PatchRange {
    pub name: String,
    pub kind: PatchKind,
    pub start: usize,
    pub count: usize,
}

/// Flat, position-addressed view of a mesh.
#[derive(Clone, Debug, Serialize)]
pub struct IndexedMesh {
    pub n_internal_faces: usize,
    /// Owner cell position per face.
    pub owner: Vec<usize>,
    /// Neighbour cell position per face, `None` on boundary faces.
    pub neighbour: Vec<Option<usize>>,
    pub face_area: Vec<Vec3>,
    pub face_centroid: Vec<Vec3>,
    /// Point loop of every face, as point positions.
    pub face_points: Vec<Vec<usize>>,
    /// Incident face positions of every cell.
    pub cell_faces: Vec<Vec<usize>>,
    pub cell_volume: Vec<f64>,
    pub cell_centroid: Vec<Vec3>,
    pub cell_extent: Vec<Vec3>,
    pub points: Vec<Vec3>,
    pub patches: Vec<PatchRange>,
    #[serde(skip)]
    pub face_index: HashMap<FaceHandle, usize>,
    #[serde(skip)]
    pub cell_index: HashMap<CellHandle, usize>,
    #[serde(skip)]
    pub point_index: HashMap<PointHandle, usize>,
}

impl IndexedMesh {
    #[inline]
    pub fn n_faces(&self) -> usize {
        self.owner.len()
    }

    #[inline]
    pub fn n_cells(&self) -> usize {
        self.cell_volume.len()
    }

    /// `[owner, neighbour]` with `-1` for a missing neighbour, the classic
    /// polyMesh convention.
    pub fn owner_neighbour_pairs(&self) -> Vec<[isize; 2]> {
        self.owner
            .iter()
            .zip(&self.neighbour)
            .map(|(&o, n)| [o as isize, n.map_or(-1, |n| n as isize)])
            .collect()
    }
}

impl Mesh {
    /// Builds the position-addressed snapshot.
    ///
    /// Patch ranges are taken from the ledger and cross-checked against the
    /// zone tags of the faces actually laid out.
    pub fn to_indexed(&self) -> Result<IndexedMesh, MeshError> {
        let point_index: HashMap<PointHandle, usize> = self
            .points()
            .enumerate()
            .map(|(i, (h, _))| (h, i))
            .collect();
        let cell_index: HashMap<CellHandle, usize> = self
            .cells()
            .enumerate()
            .map(|(i, (h, _))| (h, i))
            .collect();

        let mut ordered: Vec<_> = self.faces().collect();
        // Stable: creation order is kept inside each zone.
        ordered.sort_by_key(|(_, f)| f.zone);
        let face_index: HashMap<FaceHandle, usize> = ordered
            .iter()
            .enumerate()
            .map(|(i, (h, _))| (*h, i))
            .collect();

        let ledger = self.ledger();
        if ledger.n_faces() != ordered.len() {
            return Err(MeshError::LedgerMismatch(format!(
                "ledger counts {} faces, mesh holds {}",
                ledger.n_faces(),
                ordered.len()
            )));
        }
        for (pos, (h, face)) in ordered.iter().enumerate() {
            let in_range = ledger
                .zone_range(face.zone)
                .is_some_and(|range| range.contains(&pos));
            if !in_range {
                return Err(MeshError::LedgerMismatch(format!(
                    "face {h} of zone {:?} lands at position {pos}, outside its ledger range",
                    face.zone
                )));
            }
        }

        let lookup_cell = |c: CellHandle| cell_index.get(&c).copied().ok_or(MeshError::UnknownCell(c));
        let lookup_point =
            |p: PointHandle| point_index.get(&p).copied().ok_or(MeshError::UnknownPoint(p));
        let lookup_face = |f: FaceHandle| face_index.get(&f).copied().ok_or(MeshError::UnknownFace(f));

        let mut owner = Vec::with_capacity(ordered.len());
        let mut neighbour = Vec::with_capacity(ordered.len());
        let mut face_area = Vec::with_capacity(ordered.len());
        let mut face_centroid = Vec::with_capacity(ordered.len());
        let mut face_points = Vec::with_capacity(ordered.len());
        for (_, face) in &ordered {
            owner.push(lookup_cell(face.owner)?);
            neighbour.push(face.neighbour.map(lookup_cell).transpose()?);
            face_area.push(face.area());
            face_centroid.push(face.centroid());
            face_points.push(
                face.points
                    .iter()
                    .map(|&p| lookup_point(p))
                    .collect::<Result<Vec<_>, _>>()?,
            );
        }

        let mut cell_faces = Vec::with_capacity(self.n_cells());
        let mut cell_volume = Vec::with_capacity(self.n_cells());
        let mut cell_centroid = Vec::with_capacity(self.n_cells());
        let mut cell_extent = Vec::with_capacity(self.n_cells());
        for (_, cell) in self.cells() {
            cell_faces.push(
                cell.faces
                    .iter()
                    .map(|&f| lookup_face(f))
                    .collect::<Result<Vec<_>, _>>()?,
            );
            cell_volume.push(cell.volume());
            cell_centroid.push(cell.centroid());
            cell_extent.push(cell.extent());
        }

        let patches = self
            .patches()
            .iter()
            .zip(ledger.patches())
            .map(|(patch, entry)| PatchRange {
                name: patch.name.clone(),
                kind: patch.kind,
                start: entry.start,
                count: entry.count,
            })
            .collect();

        Ok(IndexedMesh {
            n_internal_faces: ledger.n_internal(),
            owner,
            neighbour,
            face_area,
            face_centroid,
            face_points,
            cell_faces,
            cell_volume,
            cell_centroid,
            cell_extent,
            points: self.points().map(|(_, p)| p).collect(),
            patches,
            face_index,
            cell_index,
            point_index,
        })
    }
}
