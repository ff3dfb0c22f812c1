use fv_mesh::prelude::*;

mod util;
use util::{
    approx, assert_internal_faces_point_to_neighbour, cell_handles, empty_face_size, fan,
    quad_grid, shock_tube, shock_tube_input, total_volume,
};

/// Everything a failed refinement must leave untouched.
fn fingerprint(mesh: &Mesh) -> (usize, usize, usize, FaceLedger, Vec<CellHandle>) {
    (
        mesh.n_points(),
        mesh.n_faces(),
        mesh.n_cells(),
        mesh.ledger().clone(),
        cell_handles(mesh),
    )
}

#[test]
fn triangle_splits_into_three_wedges() {
    let mut mesh = fan();
    assert_eq!(mesh.n_cells(), 4);
    assert_eq!(mesh.n_faces(), 16);
    let target = cell_handles(&mesh)[0];
    assert_eq!(empty_face_size(&mesh, target), 3);
    let volume = mesh.cell(target).unwrap().volume();

    let wedges = refine_cell(&mut mesh, target, &RefineOptions::default()).unwrap();
    assert_eq!(wedges.len(), 3);
    assert_eq!(mesh.n_cells(), 6);
    assert_eq!(mesh.n_faces(), 16 + 7);
    assert_eq!(mesh.n_points(), 12);
    assert!(matches!(
        mesh.cell(target),
        Err(MeshError::UnknownCell(c)) if c == target
    ));

    let split: f64 = wedges
        .iter()
        .map(|&w| mesh.cell(w).unwrap().volume())
        .sum();
    assert!(approx(split, volume, 1e-12));
    for &w in &wedges {
        let cell = mesh.cell(w).unwrap();
        assert_eq!(cell.faces().len(), 5);
        assert_eq!(empty_face_size(&mesh, w), 3);
        assert!(cell.volume() > 0.0);
    }
    mesh.validate_invariants().unwrap();
    assert_internal_faces_point_to_neighbour(&mesh);
}

#[test]
fn inserted_points_sit_on_the_empty_face_centroids() {
    let mut mesh = fan();
    let target = cell_handles(&mesh)[0];
    let before: Vec<PointHandle> = mesh.points().map(|(h, _)| h).collect();
    refine_cell(&mut mesh, target, &RefineOptions::default()).unwrap();

    let added: Vec<Vec3> = mesh
        .points()
        .filter(|(h, _)| !before.contains(h))
        .map(|(_, p)| p)
        .collect();
    assert_eq!(added.len(), 2);
    // triangle (0,0), (1,0), (0.5,0.5)
    for p in &added {
        assert!(approx(p[0], 0.5, 1e-14));
        assert!(approx(p[1], 1.0 / 6.0, 1e-14));
    }
    assert_eq!(added[0][0], added[1][0]);
    assert_eq!(added[0][1], added[1][1]);
    assert!(approx(added[0][2], 1.0, 1e-14));
    assert!(approx(added[1][2], 0.0, 1e-14));
}

#[test]
fn shock_tube_refines_completely() {
    let mut mesh = shock_tube();
    let targets = cell_handles(&mesh);
    let created = refine_cells(&mut mesh, &targets, &RefineOptions::default()).unwrap();

    assert_eq!(created.len(), 16);
    assert_eq!(mesh.n_cells(), 16);
    assert_eq!(mesh.n_faces(), 21 + 4 * 10);
    assert_eq!(mesh.n_points(), 28);
    assert!(approx(total_volume(&mesh), 0.01, 1e-15));
    for &c in &created {
        assert!(approx(mesh.cell(c).unwrap().volume(), 0.0025 / 4.0, 1e-15));
    }

    let ledger = mesh.ledger();
    assert_eq!(ledger.n_internal(), 3 + 4 * 4);
    assert_eq!(ledger.patch_range(0).unwrap().len(), 1);
    assert_eq!(ledger.patch_range(1).unwrap().len(), 1);
    assert_eq!(ledger.patch_range(2).unwrap().len(), 8);
    assert_eq!(ledger.patch_range(3), Some(29..61));
    assert_eq!(ledger, &mesh.rescan_ledger().unwrap());
    mesh.validate_invariants().unwrap();
    assert_internal_faces_point_to_neighbour(&mesh);
}

#[test]
fn untouched_faces_keep_their_handles() {
    let mut mesh = shock_tube();
    let inlet = mesh.faces_in_zone(FaceZone::Boundary(0)).next().unwrap();
    let inlet_owner = mesh.face(inlet).unwrap().owner();
    let last = *cell_handles(&mesh).last().unwrap();

    refine_cell(&mut mesh, last, &RefineOptions::default()).unwrap();
    let face = mesh.face(inlet).unwrap();
    assert_eq!(face.owner(), inlet_owner);
    assert!(approx(face.area()[0], -0.01, 1e-15));
}

#[test]
fn inherited_faces_are_rewired_to_wedges() {
    let mut mesh = shock_tube();
    let cells = cell_handles(&mesh);
    let internal: Vec<FaceHandle> = mesh.faces_in_zone(FaceZone::Internal).collect();
    // internal face 0 sits between cells 0 and 1
    let wedges = refine_cell(&mut mesh, cells[1], &RefineOptions::default()).unwrap();

    let face = mesh.face(internal[0]).unwrap();
    assert_eq!(face.owner(), cells[0]);
    let nb = face.neighbour().unwrap();
    assert!(wedges.contains(&nb));
    assert!(mesh.cell(nb).unwrap().faces().contains(&internal[0]));
}

#[test]
fn wedges_can_be_refined_again() {
    let mut mesh = quad_grid(2, 2);
    let target = cell_handles(&mesh)[3];
    let options = RefineOptions::default();
    let wedges = refine_cell(&mut mesh, target, &options).unwrap();
    assert_eq!(wedges.len(), 4);

    let n_cells = mesh.n_cells();
    let n_faces = mesh.n_faces();
    let again = refine_cell(&mut mesh, wedges[2], &options).unwrap();
    assert_eq!(again.len(), 3);
    assert_eq!(mesh.n_cells(), n_cells + 2);
    assert_eq!(mesh.n_faces(), n_faces + 7);
    assert!(approx(total_volume(&mesh), 4.0, 1e-12));
    mesh.validate_invariants().unwrap();
    assert_internal_faces_point_to_neighbour(&mesh);
}

#[test]
fn batch_may_refine_its_own_wedges() {
    let mut mesh = quad_grid(2, 1);
    let first = cell_handles(&mesh)[0];
    // Handles are handed out in the same order on a copy of the mesh.
    let mut scratch = mesh.clone();
    let first_wedge = refine_cell(&mut scratch, first, &RefineOptions::default()).unwrap()[0];

    let created = refine_cells(
        &mut mesh,
        &[first, first_wedge],
        &RefineOptions::default(),
    )
    .unwrap();
    assert_eq!(mesh.n_cells(), 2 + 3 + 2);
    assert_eq!(created.len(), 6);
    assert!(!created.contains(&first_wedge));
    assert!(created.iter().all(|&c| mesh.contains_cell(c)));
}

#[test]
fn options_name_the_empty_patch() {
    let mut mesh = shock_tube();
    let target = cell_handles(&mesh)[2];
    let options = RefineOptions {
        empty_patch: Some("frontAndBack".into()),
        check_invariants: true,
        ..RefineOptions::default()
    };
    assert_eq!(refine_cell(&mut mesh, target, &options).unwrap().len(), 4);
}

#[test]
fn thickness_along_x() {
    // First shock-tube cell on its own, with the two x-faces as the
    // thickness-bounding pair.
    let base = shock_tube_input();
    let p = |i: usize| base.points[i];
    let input = MeshInput {
        points: (0..8).map(p).collect(),
        faces: vec![
            vec![0, 4, 7, 3],
            vec![1, 2, 6, 5],
            vec![0, 1, 5, 4],
            vec![3, 7, 6, 2],
            vec![0, 3, 2, 1],
            vec![4, 5, 6, 7],
        ],
        owner: vec![0; 6],
        neighbour: vec![],
        patches: vec![
            PatchSpec::new("sides", PatchKind::Wall, 4, 0),
            PatchSpec::new("ends", PatchKind::Empty, 2, 4),
        ],
    };
    let mut mesh = assemble(&input, AssembleOptions::default()).unwrap();
    let target = cell_handles(&mesh)[0];

    let default_axis = refine_cell(&mut mesh, target, &RefineOptions::default());
    assert!(matches!(default_axis, Err(MeshError::Topology { .. })));

    let options = RefineOptions {
        thickness_axis: Axis::X,
        ..RefineOptions::default()
    };
    let wedges = refine_cell(&mut mesh, target, &options).unwrap();
    assert_eq!(wedges.len(), 4);
    assert!(approx(total_volume(&mesh), 0.0025, 1e-15));
    mesh.validate_invariants().unwrap();
}

#[test]
fn failures_leave_the_mesh_untouched() {
    let mut mesh = fan();
    let target = cell_handles(&mesh)[1];
    let before = fingerprint(&mesh);

    let wrong_axis = RefineOptions {
        thickness_axis: Axis::X,
        ..RefineOptions::default()
    };
    assert!(matches!(
        refine_cell(&mut mesh, target, &wrong_axis),
        Err(MeshError::Topology { .. })
    ));
    assert_eq!(fingerprint(&mesh), before);

    let one_face_patch = RefineOptions {
        empty_patch: Some("sides".into()),
        ..RefineOptions::default()
    };
    assert!(matches!(
        refine_cell(&mut mesh, target, &one_face_patch),
        Err(MeshError::Topology { .. })
    ));
    assert_eq!(fingerprint(&mesh), before);

    let missing = RefineOptions {
        empty_patch: Some("nope".into()),
        ..RefineOptions::default()
    };
    assert!(matches!(
        refine_cell(&mut mesh, target, &missing),
        Err(MeshError::UnknownPatch(_))
    ));
    assert_eq!(fingerprint(&mesh), before);
}

#[test]
fn four_faces_on_the_empty_patch_is_rejected() {
    let mut input = shock_tube_input();
    input.patches.truncate(2);
    input
        .patches
        .push(PatchSpec::new("sides", PatchKind::Empty, 16, 5));
    let mut mesh = assemble(&input, AssembleOptions::default()).unwrap();
    let target = cell_handles(&mesh)[0];
    let before = fingerprint(&mesh);

    let err = refine_cell(&mut mesh, target, &RefineOptions::default()).unwrap_err();
    assert!(matches!(err, MeshError::Topology { cell, .. } if cell == target));
    assert_eq!(fingerprint(&mesh), before);

    let inlet = RefineOptions {
        empty_patch: Some("inlet".into()),
        ..RefineOptions::default()
    };
    assert!(matches!(
        refine_cell(&mut mesh, target, &inlet),
        Err(MeshError::Topology { .. })
    ));
}

#[test]
fn misaligned_empty_faces_are_rejected() {
    let mut input = shock_tube_input();
    // shear the top of cell 0 in y so its empty faces no longer line up
    input.points.push([0.0, 0.05, 0.1]);
    let moved = input.points.len() - 1;
    for face in &mut input.faces {
        for p in face.iter_mut() {
            if *p == 3 {
                *p = moved;
            }
        }
    }
    let mut mesh = assemble(&input, AssembleOptions::default()).unwrap();
    let target = cell_handles(&mesh)[0];
    let before = fingerprint(&mesh);
    assert!(matches!(
        refine_cell(&mut mesh, target, &RefineOptions::default()),
        Err(MeshError::Topology { .. })
    ));
    assert_eq!(fingerprint(&mesh), before);
}

/// Unit square extruded over z in [0, 1] with the given side faces.
fn unit_box(sides: Vec<Vec<usize>>) -> Mesh {
    let n_sides = sides.len();
    let mut faces = sides;
    faces.push(vec![0, 3, 2, 1]);
    faces.push(vec![4, 5, 6, 7]);
    let input = MeshInput {
        points: vec![
            [0., 0., 0.], [1., 0., 0.], [1., 1., 0.], [0., 1., 0.],
            [0., 0., 1.], [1., 0., 1.], [1., 1., 1.], [0., 1., 1.],
        ],
        owner: vec![0; faces.len()],
        faces,
        neighbour: vec![],
        patches: vec![
            PatchSpec::new("sides", PatchKind::Wall, n_sides, 0),
            PatchSpec::new("frontAndBack", PatchKind::Empty, 2, n_sides),
        ],
    };
    assemble(&input, AssembleOptions::default()).unwrap()
}

#[test]
fn duplicated_side_face_is_ambiguous() {
    let mut mesh = unit_box(vec![
        vec![0, 1, 5, 4],
        vec![1, 2, 6, 5],
        vec![2, 3, 7, 6],
        vec![3, 0, 4, 7],
        vec![0, 1, 5, 4],
    ]);
    let target = cell_handles(&mesh)[0];
    let before = fingerprint(&mesh);

    let err = refine_cell(&mut mesh, target, &RefineOptions::default()).unwrap_err();
    assert!(
        matches!(err, MeshError::FaceMatch { cell, candidates: 2, .. } if cell == target),
        "{err:?}"
    );
    assert_eq!(fingerprint(&mesh), before);
    mesh.validate_invariants().unwrap();
}

#[test]
fn uncovered_side_edge_has_no_inherited_face() {
    // edge 0-1 has no side face of its own
    let mut mesh = unit_box(vec![vec![1, 2, 6, 5], vec![2, 3, 7, 6], vec![3, 0, 4, 7]]);
    let target = cell_handles(&mesh)[0];
    let before = fingerprint(&mesh);

    let err = refine_cell(&mut mesh, target, &RefineOptions::default()).unwrap_err();
    assert!(
        matches!(err, MeshError::FaceMatch { cell, candidates: 0, .. } if cell == target),
        "{err:?}"
    );
    assert_eq!(fingerprint(&mesh), before);

    // same outcome inside a batch, wrapped with the failing cell
    let err = refine_cells(&mut mesh, &[target], &RefineOptions::default()).unwrap_err();
    assert!(matches!(err.root_cause(), MeshError::FaceMatch { candidates: 0, .. }));
    assert_eq!(fingerprint(&mesh), before);
}

#[test]
fn face_off_every_side_edge_is_an_index_error() {
    // diagonal face through the box, matched by no wedge
    let mut mesh = unit_box(vec![
        vec![0, 1, 5, 4],
        vec![1, 2, 6, 5],
        vec![2, 3, 7, 6],
        vec![3, 0, 4, 7],
        vec![0, 2, 6, 4],
    ]);
    let target = cell_handles(&mesh)[0];
    let before = fingerprint(&mesh);

    let err = refine_cell(&mut mesh, target, &RefineOptions::default()).unwrap_err();
    assert!(
        matches!(err, MeshError::IndexConsistency { entity: Entity::Face(_), .. }),
        "{err:?}"
    );
    assert_eq!(fingerprint(&mesh), before);
}

#[test]
fn batch_rolls_back_on_failure() {
    let mut mesh = shock_tube();
    let cells = cell_handles(&mesh);
    let before = fingerprint(&mesh);

    // last entry names a cell the first step already retired
    let err = refine_cells(
        &mut mesh,
        &[cells[0], cells[1], cells[0]],
        &RefineOptions::default(),
    )
    .unwrap_err();
    match &err {
        MeshError::RefinementFailed { cell, .. } => assert_eq!(*cell, cells[0]),
        other => panic!("unexpected error {other:?}"),
    }
    assert_eq!(err.root_cause(), &MeshError::UnknownCell(cells[0]));
    assert_eq!(fingerprint(&mesh), before);
    mesh.validate_invariants().unwrap();
}

#[test]
fn empty_batch_is_a_no_op() {
    let mut mesh = fan();
    let before = fingerprint(&mesh);
    let created = refine_cells(&mut mesh, &[], &RefineOptions::default()).unwrap();
    assert!(created.is_empty());
    assert_eq!(fingerprint(&mesh), before);
}

#[test]
fn indexed_export_after_refinement() {
    let mut mesh = fan();
    let targets = cell_handles(&mesh);
    refine_cells(&mut mesh, &targets[..2], &RefineOptions::default()).unwrap();
    let indexed = mesh.to_indexed().unwrap();

    assert_eq!(indexed.n_cells(), mesh.n_cells());
    assert_eq!(indexed.n_faces(), mesh.n_faces());
    assert_eq!(indexed.n_internal_faces, mesh.ledger().n_internal());
    for f in 0..indexed.n_faces() {
        assert_eq!(indexed.neighbour[f].is_some(), f < indexed.n_internal_faces);
    }
    let empty = &indexed.patches[1];
    assert_eq!(empty.kind, PatchKind::Empty);
    assert_eq!(empty.start + empty.count, indexed.n_faces());
    assert_eq!(empty.count, 8 - 4 + 2 * 6);
    for (c, faces) in indexed.cell_faces.iter().enumerate() {
        for &f in faces {
            assert!(indexed.owner[f] == c || indexed.neighbour[f] == Some(c));
        }
    }
}
