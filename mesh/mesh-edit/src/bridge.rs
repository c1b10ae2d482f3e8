//! Bridging edges and faces with new geometry.

use mesh_types::{EdgeId, FaceId, Point3, PolyMesh, VertexId};
use tracing::debug;

use crate::error::{EditError, EditResult};
use crate::geom::{
    add_face_with_normal, edge_record, face_record, positions, ring_normal, vertex_record,
};
use crate::outcome::{ensure_not_empty, transact};
use crate::params::{BridgeParams, BridgeTopology};

/// Connect two edges with a strip of new faces.
///
/// Endpoints are paired so that the strip does not twist: the pairing with
/// the smaller summed distance wins. Two middle vertices are placed at
/// `lerp(a_i, b_i, smoothing)` and the strip is built from two quads, or four
/// triangles with [`BridgeTopology::Triangles`]. The strip is wound against
/// a face already using edge `a`, else against one using edge `b`.
///
/// # Errors
///
/// - `EmptyMesh`, `InvalidIndex` as for every operation.
/// - `SelfBridge` if `a == b`.
/// - `AlreadyConnected` if the edges share an endpoint.
/// - `InvalidParameter` if `smoothing` is outside `[0, 1]`.
///
/// # Example
///
/// ```
/// use mesh_edit::{bridge_edges, BridgeParams};
/// use mesh_types::{Edge, MeshTopology, PolyMesh, Vertex};
///
/// let mut mesh = PolyMesh::new();
/// let a0 = mesh.add_vertex(Vertex::from_coords(0.0, 0.0, 0.0));
/// let a1 = mesh.add_vertex(Vertex::from_coords(1.0, 0.0, 0.0));
/// let b0 = mesh.add_vertex(Vertex::from_coords(0.0, 2.0, 0.0));
/// let b1 = mesh.add_vertex(Vertex::from_coords(1.0, 2.0, 0.0));
/// let a = mesh.add_edge(Edge::new(a0, a1));
/// let b = mesh.add_edge(Edge::new(b0, b1));
///
/// let outcome = bridge_edges(&mut mesh, a, b, &BridgeParams::new()).unwrap();
/// assert_eq!(outcome.created_vertices.len(), 2);
/// assert_eq!(mesh.face_count(), 2);
/// ```
pub fn bridge_edges(
    mesh: &mut PolyMesh,
    a: EdgeId,
    b: EdgeId,
    params: &BridgeParams,
) -> EditResult {
    ensure_not_empty(mesh)?;
    let ea = edge_record(mesh, a)?;
    let eb = edge_record(mesh, b)?;
    if a == b {
        return Err(EditError::self_bridge(format!("{a} cannot be bridged to itself")));
    }
    if ea.shares_vertex(&eb) {
        return Err(EditError::already_connected(format!("{a} and {b} share a vertex")));
    }
    params.check()?;

    let (a0, a1) = (ea.v1, ea.v2);
    let (b0, b1) = if untwisted(mesh, (a0, a1), (eb.v1, eb.v2))? {
        (eb.v1, eb.v2)
    } else {
        (eb.v2, eb.v1)
    };

    // Orientation and material come from the first neighbouring face found.
    let neighbour_a = mesh.faces_with_side(a0, a1).first().copied();
    let neighbour_b = mesh.faces_with_side(b0, b1).first().copied();
    let flip = match (neighbour_a, neighbour_b) {
        (Some(f), _) => mesh.face(f).is_some_and(|face| face.walks(a1, a0)),
        (None, Some(f)) => mesh.face(f).is_some_and(|face| face.walks(b0, b1)),
        (None, None) => false,
    };
    let source_material = neighbour_a
        .or(neighbour_b)
        .and_then(|f| mesh.face(f))
        .map_or(0, |f| f.material);

    let outcome = transact(mesh, |m| {
        let material = params.material.resolve(source_material);
        let m0 = lerp_vertex(m, a0, b0, params.smoothing)?;
        let m1 = lerp_vertex(m, a1, b1, params.smoothing)?;

        let rings: Vec<Vec<VertexId>> = match params.topology {
            BridgeTopology::Quads => vec![vec![a1, a0, m0, m1], vec![m1, m0, b0, b1]],
            BridgeTopology::Triangles => vec![
                vec![a1, a0, m0],
                vec![a1, m0, m1],
                vec![m1, m0, b0],
                vec![m1, b0, b1],
            ],
        };
        for mut ring in rings {
            if flip {
                ring.reverse();
            }
            let normal = ring_normal(&positions(m, &ring)?);
            add_face_with_normal(m, &ring, material, normal)?;
        }
        Ok(())
    })?;

    debug!(a = %a, b = %b, topology = ?params.topology, "Bridged edges");
    Ok(outcome)
}

/// Whether pairing `a0-b0` and `a1-b1` is no longer than the crossed pairing.
fn untwisted(
    mesh: &PolyMesh,
    (a0, a1): (VertexId, VertexId),
    (b0, b1): (VertexId, VertexId),
) -> EditResult<bool> {
    let p = positions(mesh, &[a0, a1, b0, b1])?;
    let straight = (p[0] - p[2]).norm() + (p[1] - p[3]).norm();
    let crossed = (p[0] - p[3]).norm() + (p[1] - p[2]).norm();
    Ok(straight <= crossed)
}

fn lerp_vertex(mesh: &mut PolyMesh, from: VertexId, to: VertexId, t: f64) -> EditResult<VertexId> {
    let start = vertex_record(mesh, from)?;
    let end = vertex_record(mesh, to)?;
    Ok(mesh.add_vertex(start.lerp(&end, t)))
}

/// Length and midpoint of a live edge.
fn measure(mesh: &PolyMesh, edge: EdgeId) -> EditResult<(f64, Point3<f64>)> {
    let (p, q) = mesh
        .edge_positions(edge)
        .ok_or_else(|| EditError::invalid_index(edge))?;
    Ok(((q - p).norm(), nalgebra::center(&p, &q)))
}

/// Candidate edge pair with its ranking score; lower is better.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    a: EdgeId,
    b: EdgeId,
    score: f64,
}

/// Accept candidates best-first, never reusing an edge.
fn pick_greedy(mut candidates: Vec<Candidate>) -> Vec<(EdgeId, EdgeId)> {
    candidates.sort_by(|x, y| x.score.total_cmp(&y.score));
    let mut used: Vec<EdgeId> = Vec::new();
    let mut picked = Vec::new();
    for c in candidates {
        if used.contains(&c.a) || used.contains(&c.b) {
            continue;
        }
        used.extend([c.a, c.b]);
        picked.push((c.a, c.b));
    }
    picked
}

fn bridge_pairs(mesh: &mut PolyMesh, pairs: &[(EdgeId, EdgeId)], params: &BridgeParams) -> EditResult {
    transact(mesh, |m| {
        for &(a, b) in pairs {
            bridge_edges(m, a, b, params)?;
        }
        Ok(())
    })
}

/// Bridge the edges of two faces.
///
/// Every edge of `fa` is scored against every edge of `fb`. Pairs whose
/// length ratio is below `min_length_ratio`, whose midpoints are farther
/// apart than `max_distance_factor` times the longer edge, or which share a
/// vertex are rejected. The rest are ranked by length dissimilarity plus
/// relative midpoint distance and accepted greedily, each edge at most once.
/// The faces themselves are kept.
///
/// # Errors
///
/// - `EmptyMesh`, `InvalidIndex` as for every operation.
/// - `SelfBridge` if `fa == fb`.
/// - `DegenerateGeometry` if no edge pair qualifies.
pub fn bridge_faces(
    mesh: &mut PolyMesh,
    fa: FaceId,
    fb: FaceId,
    params: &BridgeParams,
) -> EditResult {
    ensure_not_empty(mesh)?;
    let face_a = face_record(mesh, fa)?;
    let face_b = face_record(mesh, fb)?;
    if fa == fb {
        return Err(EditError::self_bridge(format!("{fa} cannot be bridged to itself")));
    }
    params.check()?;

    let mut candidates = Vec::new();
    for &ea in &face_a.edges {
        let (la, ma) = measure(mesh, ea)?;
        let record_a = edge_record(mesh, ea)?;
        for &eb in &face_b.edges {
            let record_b = edge_record(mesh, eb)?;
            if ea == eb || record_a.shares_vertex(&record_b) {
                continue;
            }
            let (lb, mb) = measure(mesh, eb)?;
            let longer = la.max(lb);
            if longer <= 0.0 {
                continue;
            }
            let ratio = la.min(lb) / longer;
            let gap = (mb - ma).norm();
            if ratio < params.min_length_ratio || gap > params.max_distance_factor * longer {
                continue;
            }
            candidates.push(Candidate {
                a: ea,
                b: eb,
                score: (1.0 - ratio) + gap / longer,
            });
        }
    }

    let pairs = pick_greedy(candidates);
    if pairs.is_empty() {
        return Err(EditError::degenerate(format!(
            "no edge of {fa} matches an edge of {fb}"
        )));
    }

    let outcome = bridge_pairs(mesh, &pairs, params)?;
    debug!(fa = %fa, fb = %fb, pairs = pairs.len(), "Bridged faces");
    Ok(outcome)
}

/// Bridge an unordered selection of edges.
///
/// Edges are grouped by midpoint proximity, where two edges are near when
/// their midpoints are within `max_distance_factor` times the longer of the
/// two. Inside each group the closest pairs are bridged greedily. If no
/// group yields a pair, every pair in the selection is considered instead.
///
/// # Errors
///
/// - `EmptyMesh`, `InvalidIndex` as for every operation.
/// - `InvalidParameter` if fewer than two distinct edges are given.
/// - `DegenerateGeometry` if no pair can be bridged.
pub fn bridge_selected_edges(
    mesh: &mut PolyMesh,
    edges: &[EdgeId],
    params: &BridgeParams,
) -> EditResult {
    ensure_not_empty(mesh)?;
    let mut selection: Vec<EdgeId> = Vec::with_capacity(edges.len());
    for &e in edges {
        edge_record(mesh, e)?;
        if !selection.contains(&e) {
            selection.push(e);
        }
    }
    if selection.len() < 2 {
        return Err(EditError::invalid_parameter("need at least two edges to bridge"));
    }
    params.check()?;

    let mut measured = Vec::with_capacity(selection.len());
    for &e in &selection {
        let (length, mid) = measure(mesh, e)?;
        measured.push((e, length, mid, edge_record(mesh, e)?));
    }

    let n = measured.len();
    let mut groups = UnionFind::new(n);
    for i in 0..n {
        for j in i + 1..n {
            let reach = params.max_distance_factor * measured[i].1.max(measured[j].1);
            if (measured[i].2 - measured[j].2).norm() <= reach {
                groups.union(i, j);
            }
        }
    }

    let pair_candidates = |same_group_only: bool, groups: &mut UnionFind| {
        let mut out = Vec::new();
        for i in 0..n {
            for j in i + 1..n {
                if same_group_only && groups.find(i) != groups.find(j) {
                    continue;
                }
                if measured[i].3.shares_vertex(&measured[j].3) {
                    continue;
                }
                out.push(Candidate {
                    a: measured[i].0,
                    b: measured[j].0,
                    score: (measured[i].2 - measured[j].2).norm(),
                });
            }
        }
        out
    };

    let mut pairs = pick_greedy(pair_candidates(true, &mut groups));
    if pairs.is_empty() {
        debug!(edges = n, "No grouped pairs; trying every pair");
        pairs = pick_greedy(pair_candidates(false, &mut groups));
    }
    if pairs.is_empty() {
        return Err(EditError::degenerate("no two selected edges can be bridged"));
    }

    let outcome = bridge_pairs(mesh, &pairs, params)?;
    debug!(edges = n, pairs = pairs.len(), "Bridged selected edges");
    Ok(outcome)
}

/// Union-find over selection indices, path-halving.
struct UnionFind {
    parent: Vec<usize>,
}

impl UnionFind {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
        }
    }

    fn find(&mut self, mut i: usize) -> usize {
        while self.parent[i] != i {
            self.parent[i] = self.parent[self.parent[i]];
            i = self.parent[i];
        }
        i
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra != rb {
            self.parent[ra.max(rb)] = ra.min(rb);
        }
    }
}
