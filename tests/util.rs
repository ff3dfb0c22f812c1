#![allow(dead_code)]
use std::collections::HashMap;

use fv_mesh::prelude::*;

pub fn approx(a: f64, b: f64, tol: f64) -> bool {
    (a - b).abs() <= tol
}

/// Four-cell 1D shock tube: x in [0, 1] split in 4, cross-section 0.1 x 0.1.
///
/// Face layout: 3 internal x-faces, then `inlet` (1), `outlet` (1),
/// `walls` (8, the y-sides) and `frontAndBack` (8, the z-sides, empty).
/// Point `4 i + c` sits at x = 0.25 i with corner `c` in
/// `(y, z) = (0, 0), (0.1, 0), (0.1, 0.1), (0, 0.1)`.
pub fn shock_tube_input() -> MeshInput {
    let corners = [[0.0, 0.0], [0.1, 0.0], [0.1, 0.1], [0.0, 0.1]];
    let mut points = Vec::new();
    for i in 0..5 {
        let x = 0.25 * i as f64;
        for [y, z] in corners {
            points.push([x, y, z]);
        }
    }

    let mut faces = Vec::new();
    let mut owner = Vec::new();
    let mut neighbour = Vec::new();
    for i in 1..4 {
        faces.push(vec![4 * i, 4 * i + 1, 4 * i + 2, 4 * i + 3]);
        owner.push(i - 1);
        neighbour.push(i);
    }
    faces.push(vec![0, 3, 2, 1]);
    owner.push(0);
    faces.push(vec![16, 17, 18, 19]);
    owner.push(3);
    for i in 0..4 {
        let (a, b) = (4 * i, 4 * (i + 1));
        faces.push(vec![a, b, b + 3, a + 3]);
        faces.push(vec![a + 1, a + 2, b + 2, b + 1]);
        owner.extend([i, i]);
    }
    for i in 0..4 {
        let (a, b) = (4 * i, 4 * (i + 1));
        faces.push(vec![a, a + 1, b + 1, b]);
        faces.push(vec![a + 3, b + 3, b + 2, a + 2]);
        owner.extend([i, i]);
    }

    MeshInput {
        points,
        faces,
        owner,
        neighbour,
        patches: vec![
            PatchSpec::new("inlet", PatchKind::Patch, 1, 3),
            PatchSpec::new("outlet", PatchKind::Patch, 1, 4),
            PatchSpec::new("walls", PatchKind::Wall, 8, 5),
            PatchSpec::new("frontAndBack", PatchKind::Empty, 8, 13),
        ],
    }
}

pub fn shock_tube() -> Mesh {
    assemble(&shock_tube_input(), AssembleOptions::default()).unwrap()
}

/// Extrudes counter-clockwise 2D polygons into one layer of cells,
/// z in `[0, thickness]`.
///
/// Face layout: internal side faces, then `sides` (wall, the outer edges),
/// then `frontAndBack` (empty, bottom and top of every cell).
pub fn extrude(points2d: &[[f64; 2]], polygons: &[Vec<usize>], thickness: f64) -> MeshInput {
    let n = points2d.len();
    let mut points: Vec<[f64; 3]> = points2d.iter().map(|&[x, y]| [x, y, 0.0]).collect();
    points.extend(points2d.iter().map(|&[x, y]| [x, y, thickness]));

    // (a, b, owner, neighbour) in first-seen order
    let mut edges: Vec<(usize, usize, usize, Option<usize>)> = Vec::new();
    let mut seen: HashMap<(usize, usize), usize> = HashMap::new();
    for (c, poly) in polygons.iter().enumerate() {
        for k in 0..poly.len() {
            let (a, b) = (poly[k], poly[(k + 1) % poly.len()]);
            let key = (a.min(b), a.max(b));
            match seen.get(&key) {
                Some(&e) => edges[e].3 = Some(c),
                None => {
                    seen.insert(key, edges.len());
                    edges.push((a, b, c, None));
                }
            }
        }
    }

    let mut faces = Vec::new();
    let mut owner = Vec::new();
    let mut neighbour = Vec::new();
    for &(a, b, o, nb) in edges.iter().filter(|e| e.3.is_some()) {
        faces.push(vec![a, b, n + b, n + a]);
        owner.push(o);
        neighbour.push(nb.unwrap());
    }
    let n_internal = faces.len();
    for &(a, b, o, _) in edges.iter().filter(|e| e.3.is_none()) {
        faces.push(vec![a, b, n + b, n + a]);
        owner.push(o);
    }
    let n_sides = faces.len() - n_internal;
    for (c, poly) in polygons.iter().enumerate() {
        faces.push(poly.iter().rev().copied().collect());
        owner.push(c);
        faces.push(poly.iter().map(|&p| n + p).collect());
        owner.push(c);
    }

    MeshInput {
        points,
        faces,
        owner,
        neighbour,
        patches: vec![
            PatchSpec::new("sides", PatchKind::Wall, n_sides, n_internal),
            PatchSpec::new(
                "frontAndBack",
                PatchKind::Empty,
                2 * polygons.len(),
                n_internal + n_sides,
            ),
        ],
    }
}

/// Unit square split into four triangles around its center.
pub fn fan() -> Mesh {
    let points = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0], [0.5, 0.5]];
    let tris = vec![vec![0, 1, 4], vec![1, 2, 4], vec![2, 3, 4], vec![3, 0, 4]];
    assemble(&extrude(&points, &tris, 1.0), AssembleOptions::default()).unwrap()
}

/// `nx` by `ny` grid of unit squares.
pub fn quad_grid(nx: usize, ny: usize) -> Mesh {
    let mut points = Vec::new();
    for j in 0..=ny {
        for i in 0..=nx {
            points.push([i as f64, j as f64]);
        }
    }
    let id = |i: usize, j: usize| j * (nx + 1) + i;
    let mut quads = Vec::new();
    for j in 0..ny {
        for i in 0..nx {
            quads.push(vec![id(i, j), id(i + 1, j), id(i + 1, j + 1), id(i, j + 1)]);
        }
    }
    assemble(&extrude(&points, &quads, 1.0), AssembleOptions::default()).unwrap()
}

pub fn cell_handles(mesh: &Mesh) -> Vec<CellHandle> {
    mesh.cells().map(|(h, _)| h).collect()
}

/// Number of edges of the empty-patch faces of `cell`.
pub fn empty_face_size(mesh: &Mesh, cell: CellHandle) -> usize {
    let empty = mesh.first_patch_of_kind(PatchKind::Empty).unwrap();
    let c = mesh.cell(cell).unwrap();
    c.faces()
        .iter()
        .map(|&f| mesh.face(f).unwrap())
        .find(|f| f.zone() == FaceZone::Boundary(empty))
        .map(|f| f.points().len())
        .unwrap()
}

pub fn total_volume(mesh: &Mesh) -> f64 {
    mesh.cells().map(|(_, c)| c.volume()).sum()
}

/// Area vectors of internal faces point from owner centroid to neighbour centroid.
pub fn assert_internal_faces_point_to_neighbour(mesh: &Mesh) {
    for (h, face) in mesh.faces() {
        if let Some(nb) = face.neighbour() {
            let o = mesh.cell(face.owner()).unwrap().centroid();
            let n = mesh.cell(nb).unwrap().centroid();
            let d = [n[0] - o[0], n[1] - o[1], n[2] - o[2]];
            let s = face.area();
            assert!(
                s[0] * d[0] + s[1] * d[1] + s[2] * d[2] > 0.0,
                "face {h:?} points from neighbour to owner"
            );
        }
    }
}
