//! Edge splits, knife cuts and loop cuts.
//!
//! None of these move an existing vertex; they only insert vertices on
//! edges and split faces through them.

use hashbrown::{HashMap, HashSet};
use mesh_types::{Edge, EdgeId, FaceId, PolyMesh, VertexId};
use tracing::debug;

use crate::error::{EditError, EditResult};
use crate::geom::{edge_record, vertex_record};
use crate::outcome::{ensure_not_empty, transact};
use crate::params::{check_split, KnifePoint, LoopCutParams};

/// Insert a vertex at parameter `t` along an edge.
///
/// The edge keeps its id and now ends at the new vertex; a second edge
/// carries the rest. Every face with the edge as a ring side receives the
/// new vertex in its ring.
///
/// # Errors
///
/// - `EmptyMesh`, `InvalidIndex` as for every operation.
/// - `InvalidParameter` unless `0 < t < 1`.
///
/// # Example
///
/// ```
/// use mesh_edit::split_edge;
/// use mesh_types::unit_cube;
///
/// let mut cube = unit_cube();
/// let top = cube.face_ids()[1];
/// let edge = cube.face(top).unwrap().edges[0];
/// let outcome = split_edge(&mut cube, edge, 0.5).unwrap();
///
/// assert_eq!(cube.face(top).unwrap().len(), 5);
/// assert_eq!(outcome.created_vertices.len(), 1);
/// ```
pub fn split_edge(mesh: &mut PolyMesh, edge: EdgeId, t: f64) -> EditResult {
    ensure_not_empty(mesh)?;
    edge_record(mesh, edge)?;
    check_split(t)?;
    let outcome = transact(mesh, |m| subdivide(m, edge, &[t]).map(|_| ()))?;
    debug!(edge = %edge, t, "Split edge");
    Ok(outcome)
}

/// Insert vertices at the parameters `ts` (ascending) along `edge` and
/// splice them into every face using it. Returns the new vertices from
/// `v1` toward `v2`.
fn subdivide(mesh: &mut PolyMesh, edge: EdgeId, ts: &[f64]) -> EditResult<Vec<VertexId>> {
    let record = edge_record(mesh, edge)?;
    let (u, v) = (record.v1, record.v2);
    let start = vertex_record(mesh, u)?;
    let end = vertex_record(mesh, v)?;
    let users = mesh.faces_with_side(u, v);

    let inner: Vec<VertexId> = ts
        .iter()
        .map(|&t| mesh.add_vertex(start.lerp(&end, t)))
        .collect();
    let (Some(&first), Some(&last)) = (inner.first(), inner.last()) else {
        return Ok(inner);
    };

    mesh.set_edge(edge, Edge::new(u, first));
    for pair in inner.windows(2) {
        mesh.add_edge(Edge::new(pair[0], pair[1]));
    }
    mesh.add_edge(Edge::new(last, v));

    for f in users {
        let Some(face) = mesh.face(f) else { continue };
        let n = face.len();
        let mut ring = Vec::with_capacity(n + inner.len());
        for i in 0..n {
            let (a, b) = (face.vertices[i], face.vertices[(i + 1) % n]);
            ring.push(a);
            if a == u && b == v {
                ring.extend_from_slice(&inner);
            } else if a == v && b == u {
                ring.extend(inner.iter().rev());
            }
        }
        if !mesh.replace_face_ring(f, ring) {
            return Err(EditError::degenerate(format!("cannot re-ring {f}")));
        }
    }
    Ok(inner)
}

/// Split `face` along a new edge between two of its non-adjacent corners.
/// Returns `false` if the corners are adjacent and there is nothing to cut.
fn split_face(mesh: &mut PolyMesh, face: FaceId, p: VertexId, q: VertexId) -> EditResult<bool> {
    let record = mesh
        .face(face)
        .cloned()
        .ok_or_else(|| EditError::invalid_index(face))?;
    let n = record.len();
    let (Some(i), Some(j)) = (record.corner_of(p), record.corner_of(q)) else {
        return Err(EditError::degenerate(format!("{face} does not contain {p} and {q}")));
    };
    let k = (j + n - i) % n;
    if k <= 1 || k >= n - 1 {
        return Ok(false);
    }

    let rotated: Vec<VertexId> = (0..n).map(|s| record.vertices[(i + s) % n]).collect();
    let first = rotated[..=k].to_vec();
    let mut second = rotated[k..].to_vec();
    second.push(rotated[0]);

    if !mesh.replace_face_ring(face, first) {
        return Err(EditError::degenerate(format!("cannot re-ring {face}")));
    }
    mesh.add_polygon_like(&second, &record)
        .ok_or_else(|| EditError::degenerate(format!("cannot split {face}")))?;
    Ok(true)
}

/// Cut faces along a path of vertices and edge points.
///
/// Edge points are inserted first with [`split_edge`] semantics. Then each
/// consecutive pair of path vertices must share a face, which is split in
/// two along a new edge. Pairs that are already ring neighbours are skipped.
///
/// # Errors
///
/// - `EmptyMesh`, `InvalidIndex` as for every operation.
/// - `InvalidParameter` for a path shorter than two points, a repeated
///   point, or an edge parameter outside `(0, 1)`.
/// - `DegenerateGeometry` if a consecutive pair shares no face.
pub fn knife_cut(mesh: &mut PolyMesh, path: &[KnifePoint]) -> EditResult {
    ensure_not_empty(mesh)?;
    for point in path {
        match *point {
            KnifePoint::Vertex(v) => {
                vertex_record(mesh, v)?;
            }
            KnifePoint::Edge { edge, .. } => {
                edge_record(mesh, edge)?;
            }
        }
    }
    if path.len() < 2 {
        return Err(EditError::invalid_parameter("knife path needs at least two points"));
    }
    let mut seen_vertices = HashSet::new();
    let mut seen_edges = HashSet::new();
    for point in path {
        let fresh = match *point {
            KnifePoint::Vertex(v) => seen_vertices.insert(v),
            KnifePoint::Edge { edge, t } => {
                check_split(t)?;
                seen_edges.insert(edge)
            }
        };
        if !fresh {
            return Err(EditError::invalid_parameter(format!(
                "knife path visits {point:?} twice"
            )));
        }
    }

    let mut splits = 0usize;
    let outcome = transact(mesh, |m| {
        let mut stops = Vec::with_capacity(path.len());
        for point in path {
            let v = match *point {
                KnifePoint::Vertex(v) => v,
                KnifePoint::Edge { edge, t } => subdivide(m, edge, &[t])?
                    .first()
                    .copied()
                    .ok_or_else(|| EditError::internal("edge split produced no vertex"))?,
            };
            stops.push(v);
        }

        for pair in stops.windows(2) {
            let (p, q) = (pair[0], pair[1]);
            let common: Vec<FaceId> = m
                .faces_using_vertex(p)
                .into_iter()
                .filter(|&f| m.face(f).is_some_and(|face| face.vertices.contains(&q)))
                .collect();
            if common.is_empty() {
                return Err(EditError::degenerate(format!("{p} and {q} share no face")));
            }
            for f in common {
                if split_face(m, f, p, q)? {
                    splits += 1;
                    break;
                }
            }
        }
        Ok(())
    })?;

    debug!(points = path.len(), splits, "Knife cut");
    Ok(outcome)
}

/// Insert `cuts` evenly spaced edge loops across the quad ring through
/// `edge`.
///
/// The ring is found by walking from `edge` to the opposite side of each
/// quad, in both directions, until it closes or reaches a non-quad face or
/// a boundary. Every side crossed by the ring is split into `cuts + 1`
/// pieces and every ring quad into `cuts + 1` quads. Faces off the ring that
/// use a split side receive the new vertices in their rings.
///
/// # Errors
///
/// - `EmptyMesh`, `InvalidIndex` as for every operation.
/// - `InvalidParameter` if `cuts < 1`.
/// - `DegenerateGeometry` if no quad uses `edge`.
///
/// # Example
///
/// ```
/// use mesh_edit::{loop_cut, LoopCutParams};
/// use mesh_types::{unit_cube, MeshTopology};
///
/// let mut cube = unit_cube();
/// let edge = cube.face(cube.face_ids()[1]).unwrap().edges[0];
/// loop_cut(&mut cube, edge, &LoopCutParams::new(1)).unwrap();
///
/// assert_eq!(cube.vertex_count(), 12);
/// assert_eq!(cube.face_count(), 10);
/// ```
pub fn loop_cut(mesh: &mut PolyMesh, edge: EdgeId, params: &LoopCutParams) -> EditResult {
    ensure_not_empty(mesh)?;
    let record = edge_record(mesh, edge)?;
    params.check()?;

    let ring = QuadRing::walk(mesh, (record.v1, record.v2));
    if ring.quads.is_empty() {
        return Err(EditError::degenerate(format!("no quad uses {edge}")));
    }

    let cuts = params.cuts as usize;
    #[allow(clippy::cast_precision_loss)]
    let ts: Vec<f64> = (1..=cuts).map(|k| k as f64 / (cuts + 1) as f64).collect();

    let outcome = transact(mesh, |m| {
        let mut points: HashMap<(VertexId, VertexId), Vec<VertexId>> = HashMap::new();
        for &(u, v) in &ring.sides {
            let side_edge = match m.find_edge(u, v) {
                Some(e) => e,
                None => m.add_edge(Edge::new(u, v)),
            };
            // Parameters run from u toward v whatever the edge's own direction.
            let stored = edge_record(m, side_edge)?;
            let inserted = if stored.v1 == u {
                subdivide(m, side_edge, &ts)?
            } else {
                let mut back: Vec<f64> = ts.iter().map(|t| 1.0 - t).collect();
                back.reverse();
                let mut vs = subdivide(m, side_edge, &back)?;
                vs.reverse();
                vs
            };
            points.insert((u, v), inserted);
        }

        for &quad in &ring.quads {
            split_ring_quad(m, quad, &points, cuts)?;
        }
        Ok(())
    })?;

    debug!(
        edge = %edge,
        cuts,
        quads = ring.quads.len(),
        closed = ring.closed,
        "Loop cut"
    );
    Ok(outcome)
}

/// Quads crossed by a loop and the sides it crosses, each side directed so
/// that matching parameters line up across every quad.
#[derive(Debug, Default)]
struct QuadRing {
    sides: Vec<(VertexId, VertexId)>,
    quads: Vec<FaceId>,
    closed: bool,
}

impl QuadRing {
    fn walk(mesh: &PolyMesh, start: (VertexId, VertexId)) -> Self {
        let mut ring = Self {
            sides: vec![start],
            ..Self::default()
        };
        let mut visited: HashSet<FaceId> = HashSet::new();
        ring.extend(mesh, start, &mut visited);
        if !ring.closed {
            ring.extend(mesh, start, &mut visited);
        }
        ring
    }

    fn extend(
        &mut self,
        mesh: &PolyMesh,
        start: (VertexId, VertexId),
        visited: &mut HashSet<FaceId>,
    ) {
        let mut side = start;
        loop {
            let next = mesh
                .faces_with_side(side.0, side.1)
                .into_iter()
                .find(|f| !visited.contains(f) && mesh.face(*f).is_some_and(|q| q.len() == 4));
            let Some(quad) = next else { return };
            let Some(opposite) = mesh.face(quad).and_then(|q| opposite_side(q, side)) else {
                return;
            };
            visited.insert(quad);
            self.quads.push(quad);

            if same_side(opposite, start) {
                self.closed = true;
                return;
            }
            if self.sides.iter().any(|&s| same_side(s, opposite)) {
                return;
            }
            self.sides.push(opposite);
            side = opposite;
        }
    }
}

fn same_side(a: (VertexId, VertexId), b: (VertexId, VertexId)) -> bool {
    a == b || (a.0 == b.1 && a.1 == b.0)
}

/// For a quad `[r0, r1, r2, r3]` entered through side `(u, v)`, the side
/// across from it directed so that `u` maps to the corner opposite `u`.
fn opposite_side(
    quad: &mesh_types::Face,
    (u, v): (VertexId, VertexId),
) -> Option<(VertexId, VertexId)> {
    let r = &quad.vertices;
    let i = (0..4).find(|&i| same_side((r[i], r[(i + 1) % 4]), (u, v)))?;
    let (r0, r2, r3) = (r[i], r[(i + 2) % 4], r[(i + 3) % 4]);
    if r0 == u {
        Some((r3, r2))
    } else {
        Some((r2, r3))
    }
}

/// Replace a spliced ring quad by `cuts + 1` quads.
fn split_ring_quad(
    mesh: &mut PolyMesh,
    quad: FaceId,
    points: &HashMap<(VertexId, VertexId), Vec<VertexId>>,
    cuts: usize,
) -> EditResult<()> {
    let record = mesh
        .face(quad)
        .cloned()
        .ok_or_else(|| EditError::invalid_index(quad))?;
    let corners: Vec<VertexId> = record
        .vertices
        .iter()
        .copied()
        .filter(|v| !points.values().any(|pts| pts.contains(v)))
        .collect();
    if corners.len() != 4 {
        return Err(EditError::internal(format!("{quad} lost its corners during the cut")));
    }

    // Find the two split sides among the quad's corner pairs.
    let along = |a: VertexId, b: VertexId| -> Option<Vec<VertexId>> {
        points.get(&(a, b)).cloned().or_else(|| {
            points.get(&(b, a)).map(|pts| pts.iter().rev().copied().collect())
        })
    };
    let start = (0..4)
        .find(|&i| along(corners[i], corners[(i + 1) % 4]).is_some()
            && along(corners[(i + 3) % 4], corners[(i + 2) % 4]).is_some())
        .ok_or_else(|| EditError::internal(format!("{quad} is not crossed by the loop")))?;
    let (r0, r1, r2, r3) = (
        corners[start],
        corners[(start + 1) % 4],
        corners[(start + 2) % 4],
        corners[(start + 3) % 4],
    );

    let mut near = vec![r0];
    near.extend(along(r0, r1).unwrap_or_default());
    near.push(r1);
    let mut far = vec![r3];
    far.extend(along(r3, r2).unwrap_or_default());
    far.push(r2);
    if near.len() != cuts + 2 || far.len() != cuts + 2 {
        return Err(EditError::internal(format!("{quad} has uneven cut sides")));
    }

    for k in 0..=cuts {
        let ring = vec![near[k], near[k + 1], far[k + 1], far[k]];
        if k == 0 {
            if !mesh.replace_face_ring(quad, ring) {
                return Err(EditError::degenerate(format!("cannot re-ring {quad}")));
            }
        } else {
            mesh.add_polygon_like(&ring, &record)
                .ok_or_else(|| EditError::degenerate(format!("cannot split {quad}")))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EditErrorKind;
    use approx::assert_relative_eq;
    use mesh_types::{unit_cube, MeshTopology, Point3, Vertex};

    fn top_edge(cube: &PolyMesh) -> EdgeId {
        cube.face(cube.face_ids()[1]).unwrap().edges[0]
    }

    fn assert_closed(mesh: &PolyMesh) {
        for (id, edge) in mesh.edges() {
            let users = mesh.faces_using_edge(id);
            assert_eq!(users.len(), 2, "edge {id} has {} faces", users.len());
            let forward = users
                .iter()
                .filter(|&&f| mesh.face(f).unwrap().walks(edge.v1, edge.v2))
                .count();
            assert_eq!(forward, 1);
        }
        for (_, f) in mesh.faces() {
            assert!(f.is_well_formed());
        }
    }

    #[test]
    fn split_edge_keeps_every_vertex_in_place() {
        let mut cube = unit_cube();
        let before: Vec<_> = cube.vertices().map(|(_, v)| v.position).collect();
        let e = top_edge(&cube);
        let outcome = split_edge(&mut cube, e, 0.25).unwrap();

        let after: Vec<_> = cube.vertices().take(8).map(|(_, v)| v.position).collect();
        assert_eq!(before, after);
        let w = outcome.created_vertices[0];
        assert_relative_eq!(cube.position(w).unwrap(), Point3::new(0.25, 0.0, 1.0));
        assert_eq!(cube.edge(e).unwrap().v2, w);
        assert_closed(&cube);
    }

    #[test]
    fn split_edge_rejects_endpoint_parameter() {
        let mut cube = unit_cube();
        let e = top_edge(&cube);
        for t in [0.0, 1.0, -0.5, f64::NAN] {
            let err = split_edge(&mut cube, e, t).unwrap_err();
            assert_eq!(err.kind, EditErrorKind::InvalidParameter);
        }
    }

    #[test]
    fn knife_across_top_face() {
        let mut cube = unit_cube();
        let top = cube.face(cube.face_ids()[1]).unwrap().clone();
        // Sides 4-5 and 6-7 are opposite.
        let path = [
            KnifePoint::Edge { edge: top.edges[0], t: 0.5 },
            KnifePoint::Edge { edge: top.edges[2], t: 0.5 },
        ];
        let outcome = knife_cut(&mut cube, &path).unwrap();

        assert_eq!(outcome.created_vertices.len(), 2);
        assert_eq!(outcome.created_faces.len(), 1);
        assert_eq!(cube.face_count(), 7);
        assert_closed(&cube);
    }

    #[test]
    fn knife_between_corners() {
        let mut cube = unit_cube();
        let path = [KnifePoint::Vertex(VertexId(4)), KnifePoint::Vertex(VertexId(6))];
        knife_cut(&mut cube, &path).unwrap();
        assert_eq!(cube.face_count(), 7);
        assert!(cube.find_edge(VertexId(4), VertexId(6)).is_some());
        assert_closed(&cube);
    }

    #[test]
    fn knife_needs_shared_face() {
        let mut cube = unit_cube();
        // Opposite corners of the cube share no face.
        let path = [KnifePoint::Vertex(VertexId(0)), KnifePoint::Vertex(VertexId(6))];
        let err = knife_cut(&mut cube, &path).unwrap_err();
        assert_eq!(err.kind, EditErrorKind::DegenerateGeometry);
        assert_eq!(cube.face_count(), 6);
        assert_eq!(cube.vertex_count(), 8);
    }

    #[test]
    fn knife_rejects_repeats_and_short_paths() {
        let mut cube = unit_cube();
        let err = knife_cut(&mut cube, &[KnifePoint::Vertex(VertexId(0))]).unwrap_err();
        assert_eq!(err.kind, EditErrorKind::InvalidParameter);
        let twice = [KnifePoint::Vertex(VertexId(0)), KnifePoint::Vertex(VertexId(0))];
        let err = knife_cut(&mut cube, &twice).unwrap_err();
        assert_eq!(err.kind, EditErrorKind::InvalidParameter);
    }

    #[test]
    fn loop_cut_around_cube() {
        let mut cube = unit_cube();
        let e = top_edge(&cube);
        let outcome = loop_cut(&mut cube, e, &LoopCutParams::new(1)).unwrap();

        assert_eq!(outcome.created_vertices.len(), 4);
        assert_eq!(cube.vertex_count(), 12);
        assert_eq!(cube.edge_count(), 20);
        assert_eq!(cube.face_count(), 10);
        for &v in &outcome.created_vertices {
            assert_relative_eq!(cube.position(v).unwrap().x, 0.5, epsilon = 1e-12);
        }
        assert_closed(&cube);
    }

    #[test]
    fn loop_cut_with_several_cuts() {
        let mut cube = unit_cube();
        let e = top_edge(&cube);
        loop_cut(&mut cube, e, &LoopCutParams::new(3)).unwrap();
        assert_eq!(cube.vertex_count(), 8 + 12);
        assert_eq!(cube.face_count(), 2 + 16);
        assert_closed(&cube);
    }

    #[test]
    fn open_loop_splices_neighbouring_triangle() {
        // Two quads in a row capped by a triangle on the far side.
        let mut mesh = PolyMesh::new();
        let v: Vec<VertexId> = [
            (0.0, 0.0),
            (1.0, 0.0),
            (0.0, 1.0),
            (1.0, 1.0),
            (0.0, 2.0),
            (1.0, 2.0),
            (0.5, 3.0),
        ]
        .iter()
        .map(|&(x, y)| mesh.add_vertex(Vertex::from_coords(x, y, 0.0)))
        .collect();
        mesh.add_polygon(&[v[0], v[1], v[3], v[2]], 0).unwrap();
        mesh.add_polygon(&[v[2], v[3], v[5], v[4]], 0).unwrap();
        let tri = mesh.add_polygon(&[v[4], v[5], v[6]], 0).unwrap();
        let e = mesh.find_edge(v[0], v[1]).unwrap();

        loop_cut(&mut mesh, e, &LoopCutParams::new(1)).unwrap();
        assert_eq!(mesh.face_count(), 5);
        assert_eq!(mesh.face(tri).unwrap().len(), 4);
        assert_eq!(mesh.vertex_count(), 10);
    }

    #[test]
    fn loop_cut_rejects_zero_cuts() {
        let mut cube = unit_cube();
        let e = top_edge(&cube);
        let err = loop_cut(&mut cube, e, &LoopCutParams::new(0)).unwrap_err();
        assert_eq!(err.kind, EditErrorKind::InvalidParameter);
    }

    #[test]
    fn loop_cut_rejects_runaway_cut_count() {
        let mut cube = unit_cube();
        let e = top_edge(&cube);
        let before = cube.to_document();
        let err = loop_cut(&mut cube, e, &LoopCutParams::new(crate::MAX_LOOP_CUTS + 1)).unwrap_err();
        assert_eq!(err.kind, EditErrorKind::InvalidParameter);
        assert_eq!(cube.to_document(), before);
    }
}
