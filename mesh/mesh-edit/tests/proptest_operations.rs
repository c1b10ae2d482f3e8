//! Property-based tests for the editing operations.
//!
//! Random operation scripts are replayed on a cube. After every step, failed
//! or not, every live face must satisfy the ring invariant; failed steps must
//! leave the mesh untouched.
//!
//! Run with: cargo test -p mesh-edit -- proptest

use mesh_edit::{
    bevel, bridge_edges, extrude_edge, extrude_face, extrude_vertex, inset, knife_cut, loop_cut,
    split_edge, BevelParams, BevelTarget, BridgeParams, EditOutcome, EditResult,
    ExtrudeEdgeParams, ExtrudeFaceParams, ExtrudeVertexParams, InsetMode, InsetParams,
    KnifePoint, LoopCutParams,
};
use mesh_types::{unit_cube, PolyMesh};
use proptest::prelude::*;

// =============================================================================
// Strategies
// =============================================================================

#[derive(Debug, Clone)]
enum Op {
    ExtrudeFace(usize, f64),
    ExtrudeEdge(usize, f64),
    ExtrudeVertex(usize, f64),
    Inset(usize, f64, bool),
    BevelFace(usize, f64, u32),
    BevelEdge(usize, f64, u32),
    BevelVertex(usize, f64, u32),
    Bridge(usize, usize),
    Split(usize, f64),
    Knife(usize, usize, usize),
    LoopCut(usize, u32),
}

fn arb_op() -> impl Strategy<Value = Op> {
    let idx = 0..256usize;
    prop_oneof![
        (idx.clone(), -0.5..1.0f64).prop_map(|(i, d)| Op::ExtrudeFace(i, d)),
        (idx.clone(), 0.1..1.0f64).prop_map(|(i, d)| Op::ExtrudeEdge(i, d)),
        (idx.clone(), 0.1..1.0f64).prop_map(|(i, d)| Op::ExtrudeVertex(i, d)),
        (idx.clone(), 0.0..0.3f64, any::<bool>()).prop_map(|(i, d, c)| Op::Inset(i, d, c)),
        (idx.clone(), 0.01..0.3f64, 0..4u32).prop_map(|(i, d, s)| Op::BevelFace(i, d, s)),
        (idx.clone(), 0.01..0.2f64, 1..4u32).prop_map(|(i, d, s)| Op::BevelEdge(i, d, s)),
        (idx.clone(), 0.01..0.2f64, 1..3u32).prop_map(|(i, d, s)| Op::BevelVertex(i, d, s)),
        (idx.clone(), idx.clone()).prop_map(|(a, b)| Op::Bridge(a, b)),
        (idx.clone(), -0.2..1.2f64).prop_map(|(i, t)| Op::Split(i, t)),
        (idx.clone(), idx.clone(), idx.clone()).prop_map(|(f, a, b)| Op::Knife(f, a, b)),
        (idx, 0..3u32).prop_map(|(i, c)| Op::LoopCut(i, c)),
    ]
}

fn pick<T: Copy>(ids: &[T], i: usize) -> Option<T> {
    (!ids.is_empty()).then(|| ids[i % ids.len()])
}

fn apply(mesh: &mut PolyMesh, op: &Op) -> Option<EditResult<EditOutcome>> {
    let faces = mesh.face_ids();
    let edges = mesh.edge_ids();
    let vertices = mesh.vertex_ids();
    let result = match *op {
        Op::ExtrudeFace(i, d) => extrude_face(mesh, pick(&faces, i)?, &ExtrudeFaceParams::new(d)),
        Op::ExtrudeEdge(i, d) => {
            let params = ExtrudeEdgeParams {
                distance: d,
                ..ExtrudeEdgeParams::default()
            };
            extrude_edge(mesh, pick(&edges, i)?, &params)
        }
        Op::ExtrudeVertex(i, d) => {
            let params = ExtrudeVertexParams {
                distance: d,
                ..ExtrudeVertexParams::default()
            };
            extrude_vertex(mesh, pick(&vertices, i)?, &params)
        }
        Op::Inset(i, d, connected) => {
            let mode = if connected {
                InsetMode::Connected
            } else {
                InsetMode::Individual
            };
            inset(mesh, &[pick(&faces, i)?], &InsetParams::new(d).with_mode(mode))
        }
        Op::BevelFace(i, d, s) => bevel(
            mesh,
            BevelTarget::Face(pick(&faces, i)?),
            &BevelParams::new(d).with_segments(s),
        ),
        Op::BevelEdge(i, d, s) => bevel(
            mesh,
            BevelTarget::Edge(pick(&edges, i)?),
            &BevelParams::new(d).with_segments(s),
        ),
        Op::BevelVertex(i, d, s) => bevel(
            mesh,
            BevelTarget::Vertex(pick(&vertices, i)?),
            &BevelParams::new(d).with_segments(s),
        ),
        Op::Bridge(a, b) => bridge_edges(mesh, pick(&edges, a)?, pick(&edges, b)?, &BridgeParams::new()),
        Op::Split(i, t) => split_edge(mesh, pick(&edges, i)?, t),
        Op::Knife(f, a, b) => {
            let ring = mesh.face(pick(&faces, f)?)?.vertices.clone();
            let path = [
                KnifePoint::Vertex(pick(&ring, a)?),
                KnifePoint::Vertex(pick(&ring, b)?),
            ];
            knife_cut(mesh, &path)
        }
        Op::LoopCut(i, c) => loop_cut(mesh, pick(&edges, i)?, &LoopCutParams::new(c)),
    };
    Some(result)
}

fn snapshot(mesh: &PolyMesh) -> Vec<String> {
    let mut out: Vec<String> = mesh
        .vertices()
        .map(|(id, v)| format!("{id} {:?}", v.position))
        .collect();
    out.extend(mesh.edges().map(|(id, e)| format!("{id} {} {}", e.v1, e.v2)));
    out.extend(
        mesh.faces()
            .map(|(id, f)| format!("{id} {:?} {:?} {}", f.vertices, f.edges, f.material)),
    );
    out
}

/// First violation of the ring invariant, if any.
fn ring_violation(mesh: &PolyMesh) -> Option<String> {
    for (id, face) in mesh.faces() {
        if !face.is_well_formed() {
            return Some(format!("{id} is not well formed"));
        }
        let n = face.vertices.len();
        for i in 0..n {
            let (a, b) = (face.vertices[i], face.vertices[(i + 1) % n]);
            if !mesh.contains_vertex(a) {
                return Some(format!("{id} names dead {a}"));
            }
            let Some(edge) = mesh.edge(face.edges[i]) else {
                return Some(format!("{id} names dead {}", face.edges[i]));
            };
            if edge.key() != mesh_types::EdgeKey::new(a, b) {
                return Some(format!("{id} side {i} is not joined by {}", face.edges[i]));
            }
        }
        let mut distinct = face.vertices.clone();
        distinct.sort_unstable();
        distinct.dedup();
        if distinct.len() != n {
            return Some(format!("{id} repeats a vertex"));
        }
    }
    for (id, edge) in mesh.edges() {
        if !mesh.contains_vertex(edge.v1) || !mesh.contains_vertex(edge.v2) {
            return Some(format!("{id} has a dead endpoint"));
        }
    }
    None
}

// =============================================================================
// Property Tests
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// The ring invariant holds after every step of any script.
    #[test]
    fn ring_invariant_survives_any_script(ops in prop::collection::vec(arb_op(), 1..12)) {
        let mut mesh = unit_cube();
        for op in &ops {
            let _ = apply(&mut mesh, op);
            prop_assert!(!mesh.in_edit());
            let problem = ring_violation(&mesh);
            prop_assert!(problem.is_none(), "after {:?}: {:?}", op, problem);
        }
    }

    /// A failed operation leaves no trace.
    #[test]
    fn failures_change_nothing(ops in prop::collection::vec(arb_op(), 1..12)) {
        let mut mesh = unit_cube();
        for op in &ops {
            let before = snapshot(&mesh);
            if let Some(Err(err)) = apply(&mut mesh, op) {
                prop_assert_eq!(&before, &snapshot(&mesh), "{:?} failed with {} but changed the mesh", op, err);
            }
        }
    }

    /// Outcomes only list ids whose liveness matches.
    #[test]
    fn outcomes_match_the_store(ops in prop::collection::vec(arb_op(), 1..12)) {
        let mut mesh = unit_cube();
        for op in &ops {
            if let Some(Ok(outcome)) = apply(&mut mesh, op) {
                for &v in &outcome.created_vertices {
                    prop_assert!(mesh.contains_vertex(v));
                }
                for &f in &outcome.created_faces {
                    prop_assert!(mesh.contains_face(f));
                }
                for &f in &outcome.removed_faces {
                    prop_assert!(!mesh.contains_face(f));
                }
                for &v in &outcome.removed_vertices {
                    prop_assert!(!mesh.contains_vertex(v));
                }
            }
        }
    }

    /// Individual inset of any face selection with merging keeps the mesh valid.
    #[test]
    fn merged_inset_stays_valid(
        picks in prop::collection::vec(any::<bool>(), 6),
        distance in prop_oneof![Just(0.0), 0.02..0.3f64],
    ) {
        let mut mesh = unit_cube();
        let faces: Vec<_> = mesh
            .face_ids()
            .into_iter()
            .zip(&picks)
            .filter_map(|(f, &keep)| keep.then_some(f))
            .collect();
        prop_assume!(!faces.is_empty());

        let params = InsetParams::new(distance).with_merge_tolerance(1e-6);
        inset(&mut mesh, &faces, &params).unwrap();

        let problem = ring_violation(&mesh);
        prop_assert!(problem.is_none(), "{:?}", problem);
        let report = mesh_repair::validate_integrity(&mesh);
        prop_assert!(report.is_valid(), "{}", report);
    }

    /// Knife and loop cuts never move an existing vertex.
    #[test]
    fn cuts_keep_positions(
        edge in 0..12usize,
        t in 0.05..0.95f64,
        cuts in 1..4u32,
    ) {
        let mut mesh = unit_cube();
        let before: Vec<_> = mesh.vertices().map(|(id, v)| (id, v.position)).collect();
        let e = mesh.edge_ids()[edge];
        split_edge(&mut mesh, e, t).unwrap();
        let e = mesh.edge_ids()[(edge + 5) % 12];
        loop_cut(&mut mesh, e, &LoopCutParams::new(cuts)).unwrap();
        for (id, p) in before {
            prop_assert_eq!(mesh.position(id), Some(p));
        }
    }
}
