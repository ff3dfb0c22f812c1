//! The face-based finite-volume mesh.
//!
//! A [`Mesh`] owns three arenas (points, faces, cells) and the boundary
//! patches. Adjacency is stored as handles:
//!
//! - a face knows its ordered point loop, its owner cell and, for internal
//!   faces, its neighbour cell; its area vector points from owner to
//!   neighbour (out of the domain for boundary faces);
//! - a cell knows the faces that bound it.
//!
//! Every face carries a [`FaceZone`] tag. The [`FaceLedger`] counts faces per
//! zone and is updated by every face insertion/removal, so the position
//! ranges of the canonical face order are always available.
//!
//! Meshes are built by [`assemble`](crate::mesh::assemble::assemble) and
//! mutated by [`refine`](crate::refine).

pub mod assemble;
pub mod indexed;
pub mod validation;

use itertools::Itertools;

use crate::geometry::metrics::{
    CellMetrics, FaceMetrics, Vec3, bounding_extent, cell_volume_centroid,
};
use crate::mesh_error::{Entity, MeshError};
use crate::topology::arena::Arena;
use crate::topology::handle::{CellHandle, CellTag, FaceHandle, FaceTag, PointHandle, PointTag};
use crate::topology::ledger::FaceLedger;
use crate::topology::patch::{FaceZone, Patch, PatchKind};

/// A polygonal face.
#[derive(Clone, Debug)]
pub struct Face {
    pub(crate) points: Vec<PointHandle>,
    pub(crate) owner: CellHandle,
    pub(crate) neighbour: Option<CellHandle>,
    pub(crate) zone: FaceZone,
    pub(crate) metrics: FaceMetrics,
}

impl Face {
    /// Ordered point loop; its winding fixes the sign of the area vector.
    #[inline]
    pub fn points(&self) -> &[PointHandle] {
        &self.points
    }

    #[inline]
    pub fn owner(&self) -> CellHandle {
        self.owner
    }

    /// Neighbour cell, `None` for boundary faces.
    #[inline]
    pub fn neighbour(&self) -> Option<CellHandle> {
        self.neighbour
    }

    #[inline]
    pub fn zone(&self) -> FaceZone {
        self.zone
    }

    #[inline]
    pub fn is_boundary(&self) -> bool {
        self.zone.is_boundary()
    }

    /// Area vector, pointing from owner to neighbour.
    #[inline]
    pub fn area(&self) -> Vec3 {
        self.metrics.area
    }

    #[inline]
    pub fn centroid(&self) -> Vec3 {
        self.metrics.centroid
    }

    #[inline]
    pub fn metrics(&self) -> FaceMetrics {
        self.metrics
    }

    /// True when `cell` is the owner or the neighbour of this face.
    #[inline]
    pub fn touches(&self, cell: CellHandle) -> bool {
        self.owner == cell || self.neighbour == Some(cell)
    }
}

/// A polyhedral control volume.
#[derive(Clone, Debug)]
pub struct Cell {
    pub(crate) faces: Vec<FaceHandle>,
    pub(crate) metrics: CellMetrics,
    pub(crate) extent: Vec3,
}

impl Cell {
    /// Incident faces.
    #[inline]
    pub fn faces(&self) -> &[FaceHandle] {
        &self.faces
    }

    #[inline]
    pub fn volume(&self) -> f64 {
        self.metrics.volume
    }

    #[inline]
    pub fn centroid(&self) -> Vec3 {
        self.metrics.centroid
    }

    /// Axis-aligned bounding-box size of the cell's points.
    #[inline]
    pub fn extent(&self) -> Vec3 {
        self.extent
    }
}

/// Unstructured face-based mesh.
#[derive(Clone, Debug)]
pub struct Mesh {
    points: Arena<Vec3, PointTag>,
    faces: Arena<Face, FaceTag>,
    cells: Arena<Cell, CellTag>,
    patches: Vec<Patch>,
    ledger: FaceLedger,
}

impl Mesh {
    /// Creates an empty mesh with the given boundary patches.
    pub(crate) fn with_patches(patches: Vec<Patch>) -> Self {
        let ledger = FaceLedger::new(patches.iter().map(|p| p.kind));
        Self {
            points: Arena::new(),
            faces: Arena::new(),
            cells: Arena::new(),
            patches,
            ledger,
        }
    }

    // ------------------------------------------------------------------
    // Read access
    // ------------------------------------------------------------------

    #[inline]
    pub fn n_points(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn n_faces(&self) -> usize {
        self.faces.len()
    }

    #[inline]
    pub fn n_cells(&self) -> usize {
        self.cells.len()
    }

    pub fn point(&self, handle: PointHandle) -> Result<Vec3, MeshError> {
        self.points
            .get(handle)
            .copied()
            .ok_or(MeshError::UnknownPoint(handle))
    }

    pub fn face(&self, handle: FaceHandle) -> Result<&Face, MeshError> {
        self.faces.get(handle).ok_or(MeshError::UnknownFace(handle))
    }

    pub fn cell(&self, handle: CellHandle) -> Result<&Cell, MeshError> {
        self.cells.get(handle).ok_or(MeshError::UnknownCell(handle))
    }

    #[inline]
    pub fn contains_cell(&self, handle: CellHandle) -> bool {
        self.cells.contains(handle)
    }

    /// Points in creation order.
    pub fn points(&self) -> impl Iterator<Item = (PointHandle, Vec3)> + '_ {
        self.points.iter().map(|(h, p)| (h, *p))
    }

    /// Faces in creation order.
    pub fn faces(&self) -> impl Iterator<Item = (FaceHandle, &Face)> + '_ {
        self.faces.iter()
    }

    /// Cells in creation order.
    pub fn cells(&self) -> impl Iterator<Item = (CellHandle, &Cell)> + '_ {
        self.cells.iter()
    }

    /// Faces of one zone in creation order.
    pub fn faces_in_zone(&self, zone: FaceZone) -> impl Iterator<Item = FaceHandle> + '_ {
        self.faces
            .iter()
            .filter(move |(_, f)| f.zone == zone)
            .map(|(h, _)| h)
    }

    pub fn patches(&self) -> &[Patch] {
        &self.patches
    }

    /// Ordinal of the patch called `name`.
    pub fn patch_index(&self, name: &str) -> Result<usize, MeshError> {
        self.patches
            .iter()
            .position(|p| p.name == name)
            .ok_or_else(|| MeshError::UnknownPatch(name.to_string()))
    }

    /// Ordinal of the first patch of `kind`.
    pub fn first_patch_of_kind(&self, kind: PatchKind) -> Result<usize, MeshError> {
        self.patches
            .iter()
            .position(|p| p.kind == kind)
            .ok_or_else(|| MeshError::UnknownPatch(format!("<any {kind} patch>")))
    }

    /// The incrementally maintained face ledger.
    #[inline]
    pub fn ledger(&self) -> &FaceLedger {
        &self.ledger
    }

    /// Rebuilds the ledger from the zone tag of every face.
    ///
    /// Always equal to [`Mesh::ledger`] for a consistent mesh.
    pub fn rescan_ledger(&self) -> Result<FaceLedger, MeshError> {
        let kinds: Vec<PatchKind> = self.patches.iter().map(|p| p.kind).collect();
        FaceLedger::from_zones(&kinds, self.faces.iter().map(|(_, f)| f.zone))
    }

    /// Cheap ledger check: contiguous ranges and a face count matching the
    /// face table. Costs one pass over the patches.
    pub fn check_ledger(&self) -> Result<(), MeshError> {
        self.ledger.validate()?;
        if self.ledger.n_faces() != self.faces.len() {
            return Err(MeshError::LedgerMismatch(format!(
                "ledger counts {} faces, mesh holds {}",
                self.ledger.n_faces(),
                self.faces.len()
            )));
        }
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn ledger_mut(&mut self) -> &mut FaceLedger {
        &mut self.ledger
    }

    /// Coordinates of a face's point loop.
    pub fn face_coordinates(&self, handle: FaceHandle) -> Result<Vec<Vec3>, MeshError> {
        self.face(handle)?
            .points
            .iter()
            .map(|&p| self.point(p))
            .collect()
    }

    /// Distinct points of a cell, in first-seen order over its faces.
    pub fn cell_points(&self, handle: CellHandle) -> Result<Vec<PointHandle>, MeshError> {
        let cell = self.cell(handle)?;
        let mut out = Vec::new();
        for &f in &cell.faces {
            out.extend(self.face(f)?.points.iter().copied());
        }
        Ok(out.into_iter().unique().collect())
    }

    /// Recomputes volume, centroid and extent of a cell from its faces.
    pub fn cell_geometry(&self, handle: CellHandle) -> Result<(CellMetrics, Vec3), MeshError> {
        let coords: Vec<Vec3> = self
            .cell_points(handle)?
            .into_iter()
            .map(|p| self.point(p))
            .collect::<Result<_, _>>()?;
        let faces: Vec<FaceMetrics> = self
            .cell(handle)?
            .faces
            .iter()
            .map(|&f| self.face(f).map(|f| f.metrics))
            .collect::<Result<_, _>>()?;
        let metrics = cell_volume_centroid(&coords, &faces)
            .map_err(|e| e.attributed_to(Entity::Cell(handle)))?;
        Ok((metrics, bounding_extent(&coords)))
    }

    // ------------------------------------------------------------------
    // Mutation primitives. They keep the ledger in step with the face
    // arena; adjacency consistency is the caller's responsibility.
    // ------------------------------------------------------------------

    pub(crate) fn insert_point(&mut self, coords: Vec3) -> PointHandle {
        self.points.insert(coords)
    }

    pub(crate) fn insert_cell(&mut self, cell: Cell) -> CellHandle {
        self.cells.insert(cell)
    }

    pub(crate) fn cell_mut(&mut self, handle: CellHandle) -> Result<&mut Cell, MeshError> {
        self.cells
            .get_mut(handle)
            .ok_or(MeshError::UnknownCell(handle))
    }

    pub(crate) fn face_mut(&mut self, handle: FaceHandle) -> Result<&mut Face, MeshError> {
        self.faces
            .get_mut(handle)
            .ok_or(MeshError::UnknownFace(handle))
    }

    /// Appends a face to the end of its zone.
    pub(crate) fn insert_face(&mut self, face: Face) -> Result<FaceHandle, MeshError> {
        self.ledger.record_insert(face.zone)?;
        Ok(self.faces.insert(face))
    }

    pub(crate) fn remove_face(&mut self, handle: FaceHandle) -> Result<Face, MeshError> {
        let zone = self.face(handle)?.zone;
        self.ledger.record_remove(zone)?;
        self.faces.remove(handle).ok_or(MeshError::UnknownFace(handle))
    }

    pub(crate) fn remove_cell(&mut self, handle: CellHandle) -> Result<Cell, MeshError> {
        self.cells.remove(handle).ok_or(MeshError::UnknownCell(handle))
    }
}
