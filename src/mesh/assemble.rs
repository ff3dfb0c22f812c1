//! Mesh assembly from flat input arrays.
//!
//! The input is what a polyMesh-style reader produces: a point table, one
//! point loop per face, an owner cell per face, a neighbour cell for each of
//! the leading internal faces, and `(name, kind, count, start)` per boundary
//! patch. Face indices must already be laid out as internal faces followed by
//! contiguous patch ranges in patch order.
//!
//! # Example
//! ```rust
//! # fn try_main() -> Result<(), fv_mesh::mesh_error::MeshError> {
//! use fv_mesh::mesh::assemble::{assemble, AssembleOptions, MeshInput, PatchSpec};
//! use fv_mesh::topology::patch::PatchKind;
//!
//! // A unit cube as a single cell, every face on one wall patch.
//! let input = MeshInput {
//!     points: vec![
//!         [0., 0., 0.], [1., 0., 0.], [1., 1., 0.], [0., 1., 0.],
//!         [0., 0., 1.], [1., 0., 1.], [1., 1., 1.], [0., 1., 1.],
//!     ],
//!     faces: vec![
//!         vec![0, 3, 2, 1], vec![4, 5, 6, 7], vec![0, 1, 5, 4],
//!         vec![3, 7, 6, 2], vec![0, 4, 7, 3], vec![1, 2, 6, 5],
//!     ],
//!     owner: vec![0; 6],
//!     neighbour: vec![],
//!     patches: vec![PatchSpec::new("walls", PatchKind::Wall, 6, 0)],
//! };
//! let mesh = assemble(&input, AssembleOptions::default())?;
//! let (_, cell) = mesh.cells().next().unwrap();
//! assert!((cell.volume() - 1.0).abs() < 1e-12);
//! # Ok(())
//! # }
//! ```

#[cfg(feature = "rayon")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::debug_invariants::DebugInvariants;
use crate::geometry::metrics::{
    CellMetrics, FaceMetrics, Vec3, bounding_extent, cell_volume_centroid, face_area_centroid,
};
use crate::mesh::{Cell, Face, Mesh};
use crate::mesh_error::{Entity, MeshError};
use crate::topology::handle::CellHandle;
use crate::topology::patch::{FaceZone, Patch, PatchKind};

/// Numbering convention of the indices in a [`MeshInput`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum IndexBase {
    #[default]
    Zero,
    One,
}

impl IndexBase {
    #[inline]
    fn offset(self) -> usize {
        match self {
            IndexBase::Zero => 0,
            IndexBase::One => 1,
        }
    }
}

/// Options for [`assemble`].
#[derive(Clone, Copy, Debug, Default)]
pub struct AssembleOptions {
    /// How point, cell and start-face indices in the input are numbered.
    pub index_base: IndexBase,
}

/// One boundary patch as described by the reader.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchSpec {
    pub name: String,
    pub kind: PatchKind,
    pub n_faces: usize,
    pub start_face: usize,
}

impl PatchSpec {
    pub fn new(name: impl Into<String>, kind: PatchKind, n_faces: usize, start_face: usize) -> Self {
        Self {
            name: name.into(),
            kind,
            n_faces,
            start_face,
        }
    }
}

/// Raw mesh arrays handed over by the file-parsing layer.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MeshInput {
    pub points: Vec<Vec3>,
    pub faces: Vec<Vec<usize>>,
    pub owner: Vec<usize>,
    /// Neighbour cell of each internal face; its length is the internal face count.
    pub neighbour: Vec<usize>,
    pub patches: Vec<PatchSpec>,
}

/// Builds a [`Mesh`] and all derived geometry from raw arrays.
///
/// Fails with [`MeshError::InvalidInput`] for malformed arrays and with
/// [`MeshError::DegenerateGeometry`] (attributed to the input face or cell)
/// for zero-area faces or zero-volume cells.
pub fn assemble(input: &MeshInput, options: AssembleOptions) -> Result<Mesh, MeshError> {
    let base = options.index_base.offset();
    let n_faces = input.faces.len();
    let n_internal = input.neighbour.len();

    if input.owner.len() != n_faces {
        return Err(MeshError::InvalidInput(format!(
            "{} faces but {} owner entries",
            n_faces,
            input.owner.len()
        )));
    }
    if n_internal > n_faces {
        return Err(MeshError::InvalidInput(format!(
            "{n_internal} neighbour entries for only {n_faces} faces"
        )));
    }

    let faces = normalise_faces(input, base)?;
    let owner = normalise(&input.owner, base, "owner")?;
    let neighbour = normalise(&input.neighbour, base, "neighbour")?;
    let zones = face_zones(input, base, n_internal)?;

    // Every cell needs an incident face and a face touches at most two
    // cells, so no valid cell id reaches 2 * n_faces.
    let max_cells = n_faces.saturating_mul(2);
    for (what, ids) in [("owner", &owner), ("neighbour", &neighbour)] {
        if let Some((f, &c)) = ids.iter().enumerate().find(|&(_, &c)| c >= max_cells) {
            return Err(MeshError::InvalidInput(format!(
                "{what} of face {f} is cell {c}, but {n_faces} faces can bound at most {max_cells} cells"
            )));
        }
    }
    let n_cells = match owner.iter().chain(neighbour.iter()).copied().max() {
        Some(m) => m.checked_add(1).ok_or_else(|| {
            MeshError::InvalidInput(format!("cell id {m} overflows the cell count"))
        })?,
        None => 0,
    };

    for (f, (&o, &n)) in owner.iter().zip(neighbour.iter()).enumerate() {
        if o == n {
            return Err(MeshError::InvalidInput(format!(
                "internal face {f} has cell {o} as both owner and neighbour"
            )));
        }
    }

    // (1) face geometry
    let face_metrics = face_metrics(&input.points, &faces)?;

    // (2) incident faces per cell
    let mut incident: Vec<Vec<usize>> = vec![Vec::new(); n_cells];
    for f in 0..n_faces {
        incident[owner[f]].push(f);
        if f < n_internal {
            incident[neighbour[f]].push(f);
        }
    }
    if let Some(c) = incident.iter().position(Vec::is_empty) {
        return Err(MeshError::InvalidInput(format!("cell {c} has no faces")));
    }

    // (3) + (5) cell geometry and extents
    let cell_geometry = cell_geometry(&input.points, &faces, &face_metrics, &incident)?;

    // (4) patches and ledger: faces are inserted in input order, which is
    // the canonical zone order, so the ledger reproduces the input ranges.
    let patches: Vec<Patch> = input
        .patches
        .iter()
        .map(|p| Patch {
            name: p.name.clone(),
            kind: p.kind,
        })
        .collect();
    let mut mesh = Mesh::with_patches(patches);

    for &p in &input.points {
        mesh.insert_point(p);
    }
    let point_handles: Vec<_> = mesh.points().map(|(h, _)| h).collect();

    let cell_handles: Vec<CellHandle> = cell_geometry
        .into_iter()
        .map(|(metrics, extent)| {
            mesh.insert_cell(Cell {
                faces: Vec::new(),
                metrics,
                extent,
            })
        })
        .collect();

    let mut face_handles = Vec::with_capacity(n_faces);
    for f in 0..n_faces {
        let handle = mesh.insert_face(Face {
            points: faces[f].iter().map(|&p| point_handles[p]).collect(),
            owner: cell_handles[owner[f]],
            neighbour: (f < n_internal).then(|| cell_handles[neighbour[f]]),
            zone: zones[f],
            metrics: face_metrics[f],
        })?;
        face_handles.push(handle);
    }

    for (c, list) in incident.iter().enumerate() {
        mesh.cell_mut(cell_handles[c])?.faces = list.iter().map(|&f| face_handles[f]).collect();
    }

    log::debug!(
        "assembled mesh: {} points, {} faces ({} internal), {} cells, {} patches",
        mesh.n_points(),
        mesh.n_faces(),
        n_internal,
        mesh.n_cells(),
        mesh.patches().len()
    );
    mesh.debug_assert_invariants();
    Ok(mesh)
}

fn normalise(values: &[usize], base: usize, what: &str) -> Result<Vec<usize>, MeshError> {
    values
        .iter()
        .enumerate()
        .map(|(i, &v)| {
            v.checked_sub(base).ok_or_else(|| {
                MeshError::InvalidInput(format!("{what} entry {i} is {v}, below index base {base}"))
            })
        })
        .collect()
}

fn normalise_faces(input: &MeshInput, base: usize) -> Result<Vec<Vec<usize>>, MeshError> {
    let n_points = input.points.len();
    input
        .faces
        .iter()
        .enumerate()
        .map(|(f, loop_)| {
            if loop_.len() < 3 {
                return Err(MeshError::InvalidInput(format!(
                    "face {f} has {} points, need at least 3",
                    loop_.len()
                )));
            }
            let pts = normalise(loop_, base, "face point")?;
            if let Some(&bad) = pts.iter().find(|&&p| p >= n_points) {
                return Err(MeshError::InvalidInput(format!(
                    "face {f} references point {bad}, but there are {n_points} points"
                )));
            }
            Ok(pts)
        })
        .collect()
}

/// Zone of every input face, checking that the patches tile the boundary range.
fn face_zones(
    input: &MeshInput,
    base: usize,
    n_internal: usize,
) -> Result<Vec<FaceZone>, MeshError> {
    let n_faces = input.faces.len();
    let mut zones = vec![FaceZone::Internal; n_faces];
    let mut expected_start = n_internal;
    for (p, spec) in input.patches.iter().enumerate() {
        let start = spec.start_face.checked_sub(base).ok_or_else(|| {
            MeshError::InvalidInput(format!("patch `{}` start below index base", spec.name))
        })?;
        if start != expected_start {
            return Err(MeshError::InvalidInput(format!(
                "patch `{}` starts at face {start}, expected {expected_start}",
                spec.name
            )));
        }
        let end = start + spec.n_faces;
        if end > n_faces {
            return Err(MeshError::InvalidInput(format!(
                "patch `{}` ends at face {end}, but there are {n_faces} faces",
                spec.name
            )));
        }
        for zone in &mut zones[start..end] {
            *zone = FaceZone::Boundary(p);
        }
        expected_start = end;
    }
    if expected_start != n_faces {
        return Err(MeshError::InvalidInput(format!(
            "patches cover faces up to {expected_start}, but there are {n_faces} faces"
        )));
    }
    Ok(zones)
}

fn face_metrics(points: &[Vec3], faces: &[Vec<usize>]) -> Result<Vec<FaceMetrics>, MeshError> {
    let eval = |(f, loop_): (usize, &Vec<usize>)| {
        let coords: Vec<Vec3> = loop_.iter().map(|&p| points[p]).collect();
        face_area_centroid(&coords).map_err(|e| e.attributed_to(Entity::InputFace(f)))
    };
    #[cfg(feature = "rayon")]
    {
        faces.par_iter().enumerate().map(eval).collect()
    }
    #[cfg(not(feature = "rayon"))]
    {
        faces.iter().enumerate().map(eval).collect()
    }
}

fn cell_geometry(
    points: &[Vec3],
    faces: &[Vec<usize>],
    face_metrics: &[FaceMetrics],
    incident: &[Vec<usize>],
) -> Result<Vec<(CellMetrics, Vec3)>, MeshError> {
    let eval = |(c, list): (usize, &Vec<usize>)| {
        let mut ids: Vec<usize> = list.iter().flat_map(|&f| faces[f].iter().copied()).collect();
        ids.sort_unstable();
        ids.dedup();
        let coords: Vec<Vec3> = ids.iter().map(|&p| points[p]).collect();
        let metrics: Vec<FaceMetrics> = list.iter().map(|&f| face_metrics[f]).collect();
        let cell = cell_volume_centroid(&coords, &metrics)
            .map_err(|e| e.attributed_to(Entity::InputCell(c)))?;
        Ok((cell, bounding_extent(&coords)))
    };
    #[cfg(feature = "rayon")]
    {
        incident.par_iter().enumerate().map(eval).collect()
    }
    #[cfg(not(feature = "rayon"))]
    {
        incident.iter().enumerate().map(eval).collect()
    }
}
