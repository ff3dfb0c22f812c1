//! Locate, orient and synthesize: everything about a split that can be
//! decided without mutating the mesh.

use std::cmp::Ordering;

use crate::geometry::metrics::{
    CellMetrics, FaceMetrics, Vec3, bounding_extent, cell_volume_centroid, dot,
    face_area_centroid, sub,
};
use crate::mesh::{Cell, Face, Mesh};
use crate::mesh_error::{Entity, MeshError};
use crate::refine::Axis;
use crate::topology::handle::{CellHandle, FaceHandle, PointHandle};
use crate::topology::patch::FaceZone;

/// Point of a planned face: an existing point or one of the two new ones.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Vertex {
    Existing(PointHandle),
    PositiveCenter,
    NegativeCenter,
}

#[derive(Clone, Debug)]
struct PlannedFace {
    vertices: Vec<Vertex>,
    /// Wedge ordinal of the owner.
    owner: usize,
    neighbour: Option<usize>,
    zone: FaceZone,
    metrics: FaceMetrics,
}

#[derive(Clone, Debug)]
struct PlannedWedge {
    /// Positive triangle, negative triangle, then the two radial faces.
    faces: [usize; 4],
    inherited: FaceHandle,
    metrics: CellMetrics,
    extent: Vec3,
}

/// Complete description of one cell split, computed against a frozen mesh.
#[derive(Clone, Debug)]
pub struct RefinementPlan {
    target: CellHandle,
    /// Positive-side then negative-side empty face.
    retired_faces: [FaceHandle; 2],
    positive_center: Vec3,
    negative_center: Vec3,
    faces: Vec<PlannedFace>,
    wedges: Vec<PlannedWedge>,
}

impl RefinementPlan {
    /// Plans the split of `target` along `axis`, using the faces of patch
    /// `empty_patch` as the thickness-bounding pair.
    ///
    /// # Errors
    /// - [`MeshError::Topology`] if the cell does not have exactly two faces on
    ///   the patch, if they are not separated along `axis`, or if their points
    ///   cannot be put in one-to-one correspondence by exact in-plane
    ///   coordinates.
    /// - [`MeshError::FaceMatch`] if a wedge finds zero or several faces of the
    ///   old cell lying on its edge.
    /// - [`MeshError::DegenerateGeometry`] for a zero-area new face or a
    ///   zero-volume wedge.
    pub fn build(
        mesh: &Mesh,
        target: CellHandle,
        empty_patch: usize,
        axis: Axis,
    ) -> Result<Self, MeshError> {
        let topology = |reason: String| MeshError::Topology {
            cell: target,
            reason,
        };

        // Locate
        let patch = mesh
            .patches()
            .get(empty_patch)
            .ok_or_else(|| MeshError::UnknownPatch(format!("#{empty_patch}")))?;
        let cell = mesh.cell(target)?;
        let zone = FaceZone::Boundary(empty_patch);
        let mut empty = Vec::with_capacity(2);
        let mut context: Vec<(FaceHandle, &Face)> = Vec::with_capacity(cell.faces().len());
        for &fh in cell.faces() {
            let face = mesh.face(fh)?;
            if face.zone() == zone {
                empty.push(fh);
            } else {
                context.push((fh, face));
            }
        }
        let &[first, second] = empty.as_slice() else {
            return Err(topology(format!(
                "expected 2 faces on patch `{}`, found {}",
                patch.name,
                empty.len()
            )));
        };

        // Orient
        let k = axis.index();
        let (positive, negative) = match mesh.face(first)?.centroid()[k]
            .partial_cmp(&mesh.face(second)?.centroid()[k])
        {
            Some(Ordering::Greater) => (first, second),
            Some(Ordering::Less) => (second, first),
            _ => {
                return Err(topology(format!(
                    "faces {first} and {second} are not separated along {axis:?}"
                )));
            }
        };
        let pos: Vec<PointHandle> = mesh.face(positive)?.points().to_vec();
        let neg: Vec<PointHandle> = mesh.face(negative)?.points().to_vec();
        if pos.len() != neg.len() {
            return Err(topology(format!(
                "empty faces have {} and {} points",
                pos.len(),
                neg.len()
            )));
        }
        let p = pos.len();
        let pos_xyz: Vec<Vec3> = pos.iter().map(|&h| mesh.point(h)).collect::<Result<_, _>>()?;
        let neg_xyz: Vec<Vec3> = neg.iter().map(|&h| mesh.point(h)).collect::<Result<_, _>>()?;

        // Exact match on the in-plane coordinates.
        let [u, v] = axis.in_plane();
        let same = |a: Vec3, b: Vec3| a[u] == b[u] && a[v] == b[v];
        let j = pos_xyz
            .iter()
            .position(|&x| same(x, neg_xyz[0]))
            .ok_or_else(|| {
                topology(format!(
                    "no point of face {positive} matches point {} of face {negative}",
                    neg[0]
                ))
            })?;
        // The two faces wind in opposite directions: neg[m] sits under pos[j - m].
        let mut aligned = vec![neg[0]; p];
        let mut aligned_xyz = vec![neg_xyz[0]; p];
        for m in 0..p {
            let i = (j + p - m) % p;
            aligned[i] = neg[m];
            aligned_xyz[i] = neg_xyz[m];
        }
        if let Some(i) = (0..p).find(|&i| !same(pos_xyz[i], aligned_xyz[i])) {
            return Err(topology(format!(
                "point {} of face {positive} has no counterpart on face {negative}",
                pos[i]
            )));
        }

        // Synthesize. Both centers are evaluated over loops in the same
        // order so their in-plane coordinates agree bit for bit.
        let positive_center = face_area_centroid(&pos_xyz)
            .map_err(|e| e.attributed_to(Entity::Face(positive)))?
            .centroid;
        let negative_center = face_area_centroid(&aligned_xyz)
            .map_err(|e| e.attributed_to(Entity::Face(negative)))?
            .centroid;
        let coords = |vx: Vertex| match vx {
            Vertex::Existing(h) => mesh.point(h),
            Vertex::PositiveCenter => Ok(positive_center),
            Vertex::NegativeCenter => Ok(negative_center),
        };
        let metrics_of = |vertices: &[Vertex]| -> Result<FaceMetrics, MeshError> {
            let xyz: Vec<Vec3> = vertices.iter().map(|&vx| coords(vx)).collect::<Result<_, _>>()?;
            face_area_centroid(&xyz).map_err(|e| e.attributed_to(Entity::Cell(target)))
        };

        let mut faces = Vec::with_capacity(3 * p);
        // Radial face i separates wedge i - 1 (owner) from wedge i.
        for i in 0..p {
            let next = (i + 1) % p;
            let mut vertices = vec![
                Vertex::PositiveCenter,
                Vertex::Existing(pos[i]),
                Vertex::Existing(aligned[i]),
                Vertex::NegativeCenter,
            ];
            let mut metrics = metrics_of(&vertices)?;
            let side = dot(metrics.area, sub(pos_xyz[next], pos_xyz[i]));
            if side == 0.0 {
                return Err(topology(format!("wedge {i} is flat")));
            }
            if side < 0.0 {
                vertices.reverse();
                metrics = metrics_of(&vertices)?;
            }
            faces.push(PlannedFace {
                vertices,
                owner: (i + p - 1) % p,
                neighbour: Some(i),
                zone: FaceZone::Internal,
                metrics,
            });
        }
        // Boundary triangles keep the winding of the face they replace.
        for i in 0..p {
            let next = (i + 1) % p;
            for vertices in [
                vec![
                    Vertex::Existing(pos[i]),
                    Vertex::Existing(pos[next]),
                    Vertex::PositiveCenter,
                ],
                vec![
                    Vertex::Existing(aligned[next]),
                    Vertex::Existing(aligned[i]),
                    Vertex::NegativeCenter,
                ],
            ] {
                let metrics = metrics_of(&vertices)?;
                faces.push(PlannedFace {
                    vertices,
                    owner: i,
                    neighbour: None,
                    zone,
                    metrics,
                });
            }
        }

        let mut wedges = Vec::with_capacity(p);
        for i in 0..p {
            let next = (i + 1) % p;
            let corners = [pos[i], pos[next], aligned[i], aligned[next]];
            let candidates: Vec<(FaceHandle, &Face)> = context
                .iter()
                .copied()
                .filter(|(_, face)| face.points().iter().all(|q| corners.contains(q)))
                .collect();
            let &[(inherited, inherited_face)] = candidates.as_slice() else {
                return Err(MeshError::FaceMatch {
                    cell: target,
                    wedge: i,
                    candidates: candidates.len(),
                });
            };

            let wedge_faces = [p + 2 * i, p + 2 * i + 1, i, next];
            let face_metrics: Vec<FaceMetrics> = wedge_faces
                .iter()
                .map(|&f| faces[f].metrics)
                .chain(std::iter::once(inherited_face.metrics()))
                .collect();
            let points = [
                pos_xyz[i],
                pos_xyz[next],
                aligned_xyz[i],
                aligned_xyz[next],
                positive_center,
                negative_center,
            ];
            let metrics = cell_volume_centroid(&points, &face_metrics)
                .map_err(|e| e.attributed_to(Entity::Cell(target)))?;
            wedges.push(PlannedWedge {
                faces: wedge_faces,
                inherited,
                metrics,
                extent: bounding_extent(&points),
            });
        }

        Ok(Self {
            target,
            retired_faces: [positive, negative],
            positive_center,
            negative_center,
            faces,
            wedges,
        })
    }

    #[inline]
    pub fn target(&self) -> CellHandle {
        self.target
    }

    /// Number of cells the target is split into.
    #[inline]
    pub fn n_wedges(&self) -> usize {
        self.wedges.len()
    }

    /// The empty-patch faces that disappear with the target.
    #[inline]
    pub fn retired_faces(&self) -> [FaceHandle; 2] {
        self.retired_faces
    }

    /// Faces of the old cell handed over to the wedges, one per wedge.
    pub fn inherited_faces(&self) -> impl Iterator<Item = FaceHandle> + '_ {
        self.wedges.iter().map(|w| w.inherited)
    }

    /// Coordinates of the two inserted points (positive side first).
    #[inline]
    pub fn centers(&self) -> [Vec3; 2] {
        [self.positive_center, self.negative_center]
    }

    /// Total volume of the planned wedges.
    pub fn wedge_volume(&self) -> f64 {
        self.wedges.iter().map(|w| w.metrics.volume).sum()
    }

    /// Splices the new points, faces and cells into `mesh` and hands the
    /// inherited faces over to the wedges. The target and its empty faces
    /// are left for retirement.
    pub(crate) fn apply(self, mesh: &mut Mesh) -> Result<Vec<CellHandle>, MeshError> {
        let positive_center = mesh.insert_point(self.positive_center);
        let negative_center = mesh.insert_point(self.negative_center);

        let cells: Vec<CellHandle> = self
            .wedges
            .iter()
            .map(|w| {
                mesh.insert_cell(Cell {
                    faces: Vec::with_capacity(5),
                    metrics: w.metrics,
                    extent: w.extent,
                })
            })
            .collect();

        let mut handles = Vec::with_capacity(self.faces.len());
        for face in self.faces {
            let points = face
                .vertices
                .iter()
                .map(|vx| match *vx {
                    Vertex::Existing(h) => h,
                    Vertex::PositiveCenter => positive_center,
                    Vertex::NegativeCenter => negative_center,
                })
                .collect();
            handles.push(mesh.insert_face(Face {
                points,
                owner: cells[face.owner],
                neighbour: face.neighbour.map(|n| cells[n]),
                zone: face.zone,
                metrics: face.metrics,
            })?);
        }

        for (wedge, &cell) in self.wedges.iter().zip(&cells) {
            let inherited = mesh.face_mut(wedge.inherited)?;
            if inherited.owner == self.target {
                inherited.owner = cell;
            } else if inherited.neighbour == Some(self.target) {
                inherited.neighbour = Some(cell);
            } else {
                return Err(MeshError::IndexConsistency {
                    entity: Entity::Face(wedge.inherited),
                    reason: format!("inherited face does not reference cell {}", self.target),
                });
            }
            let mut list: Vec<FaceHandle> = wedge.faces.iter().map(|&f| handles[f]).collect();
            list.push(wedge.inherited);
            mesh.cell_mut(cell)?.faces = list;
        }
        Ok(cells)
    }
}
