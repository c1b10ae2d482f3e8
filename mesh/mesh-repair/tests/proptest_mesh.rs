//! Property-based tests for validation and repair.
//!
//! Meshes are generated with every kind of damage the store allows: rings
//! that repeat or name removed vertices, edge rings that disagree with their
//! vertex rings, flipped or missing normals, negative materials and missing
//! UVs.
//!
//! Run with: cargo test -p mesh-repair -- proptest

use mesh_repair::{
    fix_winding_order, repair_mesh, validate_integrity, IntegrityReport, RepairParams,
};
use mesh_types::{unit_cube, Face, MeshTopology, PolyMesh, Vector3, Vertex, VertexId};
use proptest::prelude::*;

// =============================================================================
// Strategies
// =============================================================================

#[derive(Debug, Clone)]
struct RawFace {
    ring: Vec<usize>,
    normal: Option<(usize, bool)>,
    material: i32,
    shuffle_edges: bool,
}

#[derive(Debug, Clone)]
struct RawMesh {
    positions: Vec<([f64; 3], bool)>,
    faces: Vec<RawFace>,
    removed: Vec<usize>,
}

fn arb_face() -> impl Strategy<Value = RawFace> {
    (
        prop::collection::vec(0..64usize, 3..6),
        prop::option::of((0..3usize, any::<bool>())),
        -2..3i32,
        prop::bool::weighted(0.1),
    )
        .prop_map(|(ring, normal, material, shuffle_edges)| RawFace {
            ring,
            normal,
            material,
            shuffle_edges,
        })
}

fn arb_mesh() -> impl Strategy<Value = RawMesh> {
    (
        prop::collection::vec((prop::array::uniform3(-10.0..10.0f64), prop::bool::weighted(0.8)), 3..24),
        prop::collection::vec(arb_face(), 0..24),
        prop::collection::vec(0..64usize, 0..3),
    )
        .prop_map(|(positions, faces, removed)| RawMesh {
            positions,
            faces,
            removed,
        })
}

/// Build the mesh through the raw store calls, so nothing is cleaned up.
fn build(raw: &RawMesh) -> PolyMesh {
    let mut mesh = PolyMesh::new();
    let ids: Vec<VertexId> = raw
        .positions
        .iter()
        .map(|&([x, y, z], has_uv)| {
            let v = Vertex::from_coords(x, y, z);
            mesh.add_vertex(if has_uv { v.with_uv(0.5, 0.5) } else { v })
        })
        .collect();

    for face in &raw.faces {
        let ring: Vec<VertexId> = face.ring.iter().map(|&i| ids[i % ids.len()]).collect();
        let n = ring.len();
        let mut edges: Vec<_> = (0..n)
            .map(|i| mesh.find_or_add_edge(ring[i], ring[(i + 1) % n]).0)
            .collect();
        if face.shuffle_edges {
            edges.rotate_left(1);
        }
        let mut f = Face::new(ring, edges).with_material(face.material);
        if let Some((axis, positive)) = face.normal {
            let mut normal = Vector3::zeros();
            normal[axis] = if positive { 1.0 } else { -1.0 };
            f = f.with_normal(normal);
        }
        mesh.add_face(f);
    }

    for &i in &raw.removed {
        mesh.remove_vertex(ids[i % ids.len()]);
    }
    mesh
}

/// Categories repair always clears with default params.
fn assert_structurally_sound(report: &IntegrityReport) -> Result<(), TestCaseError> {
    prop_assert!(report.references.passed, "{report}");
    prop_assert!(report.ring_size.passed, "{report}");
    prop_assert!(report.ring_edges.passed, "{report}");
    prop_assert!(report.degenerate_edges.passed, "{report}");
    prop_assert!(report.materials.passed, "{report}");
    prop_assert!(report.missing_uvs.passed, "{report}");
    prop_assert!(report.degenerate_faces.passed, "{report}");
    Ok(())
}

// =============================================================================
// Property Tests: Validation
// =============================================================================

proptest! {
    /// Validation never panics, whatever the damage.
    #[test]
    fn validation_never_panics(raw in arb_mesh()) {
        let _ = validate_integrity(&build(&raw));
    }

    /// Validation is read-only and deterministic.
    #[test]
    fn validation_is_pure(raw in arb_mesh()) {
        let mesh = build(&raw);
        let first = validate_integrity(&mesh);
        let second = validate_integrity(&mesh);
        prop_assert_eq!(first.vertex_count, mesh.vertex_count());
        prop_assert_eq!(first.face_count, mesh.face_count());
        prop_assert_eq!(first, second);
    }
}

// =============================================================================
// Property Tests: Repair
// =============================================================================

proptest! {
    /// Winding repair settles after one pass.
    #[test]
    fn winding_fix_is_idempotent(raw in arb_mesh()) {
        let mut mesh = build(&raw);
        fix_winding_order(&mut mesh);
        prop_assert_eq!(fix_winding_order(&mut mesh), 0);
    }

    /// Default repair leaves every structural category passing.
    #[test]
    fn repair_restores_structure(raw in arb_mesh()) {
        let mut mesh = build(&raw);
        let summary = repair_mesh(&mut mesh, &RepairParams::default());
        assert_structurally_sound(&summary.after)?;
        prop_assert_eq!(&summary.after, &validate_integrity(&mesh));
    }

    /// A second repair finds nothing left to do.
    #[test]
    fn repair_is_idempotent(raw in arb_mesh()) {
        let mut mesh = build(&raw);
        let params = RepairParams::default();
        let _ = repair_mesh(&mut mesh, &params);
        let again = repair_mesh(&mut mesh, &params);
        prop_assert!(!again.had_changes(), "{}", again);
    }

    /// Repair only ever removes faces.
    #[test]
    fn repair_never_adds_faces(raw in arb_mesh()) {
        let mut mesh = build(&raw);
        let before = mesh.face_count();
        let summary = repair_mesh(&mut mesh, &RepairParams::for_import());
        prop_assert_eq!(mesh.face_count() + summary.faces_removed(), before);
    }
}

// =============================================================================
// Cube invariants
// =============================================================================

#[test]
fn cube_is_valid() {
    let report = validate_integrity(&unit_cube());

    assert!(report.is_valid());
    assert_eq!(report.issue_count(), 0);
    assert_eq!(report.vertex_count, 8);
    assert_eq!(report.face_count, 6);
}

#[test]
fn cube_repair_is_stable() {
    let cube = unit_cube();
    let mut repaired = cube.clone();

    let summary = repair_mesh(&mut repaired, &RepairParams::default());

    assert!(!summary.had_changes());
    assert_eq!(repaired.vertex_count(), cube.vertex_count());
    assert_eq!(repaired.edge_count(), cube.edge_count());
    assert_eq!(repaired.face_count(), cube.face_count());
}
