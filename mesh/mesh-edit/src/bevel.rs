//! Bevel of vertices, edges and faces.

use std::f64::consts::FRAC_PI_2;

use hashbrown::HashMap;
use mesh_types::{
    centroid, Edge, EdgeId, Face, FaceId, Point3, PolyMesh, Vertex, VertexId, GEOMETRY_EPSILON,
};
use tracing::debug;

use crate::error::{EditError, EditResult};
use crate::geom::{
    add_face_with_normal, edge_record, face_normal, face_record, inward_directions, positions,
    quadratic, refresh_normal, ring_normal, vertex_record,
};
use crate::outcome::{ensure_not_empty, transact};
use crate::params::{BevelParams, BevelTarget};

/// Bevel a vertex, edge or face.
///
/// - **Face**: `segments` rings step inward along the corner bisectors and up
///   along the normal on a quarter-circle profile of radius `distance`. Strip
///   quads join consecutive rings and the last ring becomes the new face.
/// - **Edge**: the two faces sharing the edge are pulled `distance` away from
///   it in their own planes, and a strip of `segments` quads following a
///   quadratic profile fills the gap. At an endpoint shared by exactly one
///   more face, the strip's end row is spliced into that face and the old
///   endpoint is retired. Boundary endpoints are dropped and the boundary
///   follows the new rows; other endpoints keep the old vertex and get a
///   corner polygon.
/// - **Vertex**: every incident edge is cut `distance` from the vertex, the
///   faces around it are re-ringed through the cut points and the corner is
///   filled with a cap polygon, or with a domed patch when `segments > 1`.
///
/// # Errors
///
/// - `EmptyMesh`, `InvalidIndex` as for every operation.
/// - `InvalidParameter` if `segments < 1`, the distance is not positive, or
///   a vertex bevel distance reaches the end of an incident edge.
/// - `DegenerateGeometry` if an edge is not shared by exactly two faces or a
///   face has no usable normal.
///
/// # Example
///
/// ```
/// use mesh_edit::{bevel, BevelParams, BevelTarget};
/// use mesh_types::{unit_cube, MeshTopology};
///
/// let mut cube = unit_cube();
/// let edge = cube.face(cube.face_ids()[1]).unwrap().edges[0];
/// bevel(&mut cube, BevelTarget::Edge(edge), &BevelParams::new(0.1)).unwrap();
///
/// assert_eq!(cube.vertex_count(), 10);
/// assert_eq!(cube.face_count(), 7);
/// ```
pub fn bevel(mesh: &mut PolyMesh, target: BevelTarget, params: &BevelParams) -> EditResult {
    ensure_not_empty(mesh)?;
    match target {
        BevelTarget::Face(f) => bevel_face(mesh, f, params),
        BevelTarget::Edge(e) => bevel_edge(mesh, e, params),
        BevelTarget::Vertex(v) => bevel_vertex(mesh, v, params),
    }
}

// ============================================================================
// Face
// ============================================================================

fn bevel_face(mesh: &mut PolyMesh, face: FaceId, params: &BevelParams) -> EditResult {
    let record = face_record(mesh, face)?;
    params.check()?;
    let normal = face_normal(mesh, face, &record)?;
    let base = positions(mesh, &record.vertices)?;
    let inward = inward_directions(&base, &normal);
    let segments = params.segments as usize;

    let outcome = transact(mesh, |m| {
        let material = params.material.resolve(record.material);
        let mut prev_ring = record.vertices.clone();

        for k in 1..=segments {
            #[allow(clippy::cast_precision_loss)]
            let theta = FRAC_PI_2 * k as f64 / segments as f64;
            let inset = params.distance * (1.0 - theta.cos());
            let lift = params.distance * theta.sin();

            let mut ring = Vec::with_capacity(base.len());
            for (i, &v) in record.vertices.iter().enumerate() {
                let p = base[i] + inward[i] * inset + normal * lift;
                let source = vertex_record(m, v)?;
                ring.push(m.add_vertex(source.derive_at(p)));
            }

            let n = ring.len();
            for i in 0..n {
                let j = (i + 1) % n;
                let quad = [prev_ring[i], prev_ring[j], ring[j], ring[i]];
                let quad_normal = ring_normal(&positions(m, &quad)?);
                add_face_with_normal(m, &quad, material, quad_normal)?;
            }
            prev_ring = ring;
        }

        add_face_with_normal(m, &prev_ring, material, Some(normal))?;
        m.remove_face(face);
        Ok(())
    })?;

    debug!(face = %face, segments, distance = params.distance, "Bevelled face");
    Ok(outcome)
}

// ============================================================================
// Edge
// ============================================================================

/// How one of the two faces meets the bevelled edge.
struct Side {
    face: FaceId,
    /// Whether the face walks `a -> b`.
    forward: bool,
    /// In-plane unit vector pointing into the face, away from the edge.
    away: mesh_types::Vector3<f64>,
    /// Ring neighbour of `a` other than `b`.
    beyond_a: VertexId,
    /// Ring neighbour of `b` other than `a`.
    beyond_b: VertexId,
}

fn other_neighbour(face: &Face, v: VertexId, not: VertexId) -> Option<VertexId> {
    let i = face.corner_of(v)?;
    let (prev, next) = face.neighbours(i);
    Some(if prev == not { next } else { prev })
}

fn side(mesh: &PolyMesh, id: FaceId, a: VertexId, b: VertexId) -> EditResult<Side> {
    let face = face_record(mesh, id)?;
    let normal = face_normal(mesh, id, &face)?;
    let forward = face.walks(a, b);
    let (pa, pb) = (
        mesh.position(a).ok_or_else(|| EditError::invalid_index(a))?,
        mesh.position(b).ok_or_else(|| EditError::invalid_index(b))?,
    );
    let walk = if forward { pb - pa } else { pa - pb };
    let away = normal
        .cross(&walk)
        .try_normalize(GEOMETRY_EPSILON)
        .ok_or_else(|| EditError::degenerate(format!("{id} is degenerate along the edge")))?;
    let beyond_a = other_neighbour(&face, a, b)
        .ok_or_else(|| EditError::degenerate(format!("{a} is not a corner of {id}")))?;
    let beyond_b = other_neighbour(&face, b, a)
        .ok_or_else(|| EditError::degenerate(format!("{b} is not a corner of {id}")))?;
    Ok(Side {
        face: id,
        forward,
        away,
        beyond_a,
        beyond_b,
    })
}

fn bevel_edge(mesh: &mut PolyMesh, edge: EdgeId, params: &BevelParams) -> EditResult {
    let record = edge_record(mesh, edge)?;
    params.check()?;
    let (a, b) = (record.v1, record.v2);

    let faces = mesh.faces_with_side(a, b);
    if faces.len() != 2 {
        return Err(EditError::degenerate(format!(
            "{edge} is shared by {} faces; an edge bevel needs exactly 2",
            faces.len()
        )));
    }
    let s1 = side(mesh, faces[0], a, b)?;
    let s2 = side(mesh, faces[1], a, b)?;
    let segments = params.segments as usize;

    let outcome = transact(mesh, |m| {
        let material = params.material.resolve(m.face(s1.face).map_or(0, |f| f.material));

        let rows_a = profile_row(m, a, &s1, &s2, params.distance, segments)?;
        let rows_b = profile_row(m, b, &s1, &s2, params.distance, segments)?;

        swap_corners(m, s1.face, &[(a, rows_a[0]), (b, rows_b[0])])?;
        swap_corners(m, s2.face, &[(a, rows_a[segments]), (b, rows_b[segments])])?;

        for j in 0..segments {
            let quad = if s1.forward {
                [rows_b[j], rows_a[j], rows_a[j + 1], rows_b[j + 1]]
            } else {
                [rows_a[j], rows_b[j], rows_b[j + 1], rows_a[j + 1]]
            };
            let n = ring_normal(&positions(m, &quad)?);
            add_face_with_normal(m, &quad, material, n)?;
        }

        close_end(m, a, s1.beyond_a, s2.beyond_a, &rows_a, s1.face, material)?;
        close_end(m, b, s1.beyond_b, s2.beyond_b, &rows_b, s1.face, material)?;

        for id in [a, b] {
            let edges = m.edges_at_vertex(id);
            drop_unused_edges(m, &edges);
            if m.faces_using_vertex(id).is_empty() && m.edges_at_vertex(id).is_empty() {
                m.remove_vertex(id);
            }
        }

        refresh_normal(m, s1.face);
        refresh_normal(m, s2.face);
        Ok(())
    })?;

    debug!(edge = %edge, segments, distance = params.distance, "Bevelled edge");
    Ok(outcome)
}

/// New vertices from the first face's rail to the second face's rail at
/// endpoint `v`, bending through the old position.
fn profile_row(
    mesh: &mut PolyMesh,
    v: VertexId,
    s1: &Side,
    s2: &Side,
    distance: f64,
    segments: usize,
) -> EditResult<Vec<VertexId>> {
    let source: Vertex = vertex_record(mesh, v)?;
    let p = source.position;
    let start = p + s1.away * distance;
    let end = p + s2.away * distance;
    let mut row = Vec::with_capacity(segments + 1);
    for j in 0..=segments {
        #[allow(clippy::cast_precision_loss)]
        let t = j as f64 / segments as f64;
        row.push(mesh.add_vertex(source.derive_at(quadratic(&start, &p, &end, t))));
    }
    Ok(row)
}

/// Replace corners of a face in place and re-derive its edges.
fn swap_corners(
    mesh: &mut PolyMesh,
    face: FaceId,
    swaps: &[(VertexId, VertexId)],
) -> EditResult<()> {
    let ring: Vec<VertexId> = mesh
        .face(face)
        .ok_or_else(|| EditError::invalid_index(face))?
        .vertices
        .iter()
        .map(|&v| swaps.iter().find(|(old, _)| *old == v).map_or(v, |&(_, new)| new))
        .collect();
    if mesh.replace_face_ring(face, ring) {
        Ok(())
    } else {
        Err(EditError::degenerate(format!("cannot re-ring {face}")))
    }
}

/// Close the gap left at endpoint `v` once both faces moved off it.
///
/// An endpoint no other face uses is left open; the caller drops it.
fn close_end(
    mesh: &mut PolyMesh,
    v: VertexId,
    beyond1: VertexId,
    beyond2: VertexId,
    row: &[VertexId],
    first_face: FaceId,
    material: i32,
) -> EditResult<()> {
    let around = mesh.faces_using_vertex(v);
    if around.is_empty() {
        return Ok(());
    }
    if let [end_face] = around[..] {
        if splice_row(mesh, end_face, v, beyond1, beyond2, row) {
            refresh_normal(mesh, end_face);
            return Ok(());
        }
    }

    let mut ring = Vec::with_capacity(row.len() + 3);
    ring.push(beyond1);
    ring.extend_from_slice(row);
    ring.push(beyond2);
    ring.push(v);
    let walks_same = mesh
        .face(first_face)
        .is_some_and(|f| f.walks(beyond1, row[0]));
    if walks_same {
        ring.reverse();
    }
    let n = ring_normal(&positions(mesh, &ring)?);
    add_face_with_normal(mesh, &ring, material, n)?;
    Ok(())
}

/// Replace `v` in `face` by the profile row when `v` sits between the two
/// rail neighbours there.
fn splice_row(
    mesh: &mut PolyMesh,
    face: FaceId,
    v: VertexId,
    beyond1: VertexId,
    beyond2: VertexId,
    row: &[VertexId],
) -> bool {
    let Some(record) = mesh.face(face) else {
        return false;
    };
    let Some(i) = record.corner_of(v) else {
        return false;
    };
    let (prev, next) = record.neighbours(i);
    let ordered: Vec<VertexId> = if prev == beyond1 && next == beyond2 {
        row.to_vec()
    } else if prev == beyond2 && next == beyond1 {
        row.iter().rev().copied().collect()
    } else {
        return false;
    };
    let mut ring = record.vertices[..i].to_vec();
    ring.extend(ordered);
    ring.extend_from_slice(&record.vertices[i + 1..]);
    mesh.replace_face_ring(face, ring)
}

fn drop_unused_edges(mesh: &mut PolyMesh, edges: &[EdgeId]) {
    for &e in edges {
        if mesh.faces_using_edge(e).is_empty() {
            mesh.remove_edge(e);
        }
    }
}

// ============================================================================
// Vertex
// ============================================================================

fn bevel_vertex(mesh: &mut PolyMesh, vertex: VertexId, params: &BevelParams) -> EditResult {
    let record = vertex_record(mesh, vertex)?;
    params.check()?;

    let incident = mesh.edges_at_vertex(vertex);
    if incident.is_empty() {
        return Err(EditError::degenerate(format!("{vertex} has no edges")));
    }

    let mut neighbours: Vec<VertexId> = Vec::new();
    for &e in &incident {
        let edge = edge_record(mesh, e)?;
        let Some(other) = edge.opposite(vertex) else { continue };
        let length = mesh
            .position(other)
            .map_or(0.0, |p| (p - record.position).norm());
        if params.distance >= length {
            return Err(EditError::invalid_parameter(format!(
                "bevel distance {} reaches the end of {e} (length {length})",
                params.distance
            )));
        }
        if !neighbours.contains(&other) {
            neighbours.push(other);
        }
    }

    let faces = mesh.faces_using_vertex(vertex);
    for &f in &faces {
        face_record(mesh, f)?;
    }
    let segments = params.segments as usize;

    let outcome = transact(mesh, |m| {
        let material = faces
            .first()
            .and_then(|&f| m.face(f))
            .map_or(0, |f| f.material);
        let material = params.material.resolve(material);

        let mut cut: HashMap<VertexId, VertexId> = HashMap::new();
        for &o in &neighbours {
            let far = vertex_record(m, o)?;
            let length = (far.position - record.position).norm();
            let c = m.add_vertex(record.lerp(&far, params.distance / length));
            cut.insert(o, c);
        }

        for &e in &incident {
            let Some(edge) = m.edge(e).copied() else { continue };
            let Some(other) = edge.opposite(vertex) else { continue };
            let Some(&c) = cut.get(&other) else { continue };
            let moved = if edge.v1 == vertex {
                Edge::new(c, other)
            } else {
                Edge::new(other, c)
            };
            m.set_edge(e, moved);
        }

        let mut succ: HashMap<VertexId, VertexId> = HashMap::new();
        for &f in &faces {
            let Some(face) = m.face(f) else { continue };
            let Some(i) = face.corner_of(vertex) else { continue };
            let (prev, next) = face.neighbours(i);
            let (Some(&cp), Some(&cn)) = (cut.get(&prev), cut.get(&next)) else {
                return Err(EditError::degenerate(format!(
                    "{f} reaches {vertex} without an edge"
                )));
            };
            let mut ring = face.vertices[..i].to_vec();
            ring.extend([cp, cn]);
            ring.extend_from_slice(&face.vertices[i + 1..]);
            if !m.replace_face_ring(f, ring) {
                return Err(EditError::degenerate(format!("cannot re-ring {f}")));
            }
            refresh_normal(m, f);
            succ.insert(cn, cp);
        }

        let cap = follow_chain(&succ);
        if cap.len() >= 3 {
            if segments == 1 {
                let n = ring_normal(&positions(m, &cap)?);
                add_face_with_normal(m, &cap, material, n)?;
            } else {
                dome(m, &record, &cap, segments, material)?;
            }
        }

        m.remove_vertex(vertex);
        Ok(())
    })?;

    debug!(vertex = %vertex, segments, distance = params.distance, "Bevelled vertex");
    Ok(outcome)
}

/// Walk `succ` into one ring, starting at an open end if there is one.
fn follow_chain(succ: &HashMap<VertexId, VertexId>) -> Vec<VertexId> {
    let mut keys: Vec<VertexId> = succ.keys().copied().collect();
    keys.sort_unstable();
    let Some(&first) = keys.first() else {
        return Vec::new();
    };
    let start = keys
        .iter()
        .copied()
        .find(|k| !succ.values().any(|v| v == k))
        .unwrap_or(first);

    let mut ring = vec![start];
    let mut cur = start;
    while let Some(&next) = succ.get(&cur) {
        if next == start || ring.len() > succ.len() {
            break;
        }
        ring.push(next);
        cur = next;
    }
    ring
}

/// Fill a corner cap with concentric rings bending through the old corner.
fn dome(
    mesh: &mut PolyMesh,
    corner: &Vertex,
    cap: &[VertexId],
    segments: usize,
    material: i32,
) -> EditResult<()> {
    let rim = positions(mesh, cap)?;
    let apex: Point3<f64> = nalgebra::center(&corner.position, &centroid(&rim));

    let mut prev = cap.to_vec();
    for j in 1..segments {
        #[allow(clippy::cast_precision_loss)]
        let t = j as f64 / segments as f64;
        let ring: Vec<VertexId> = rim
            .iter()
            .map(|p| mesh.add_vertex(corner.derive_at(quadratic(p, &corner.position, &apex, t))))
            .collect();
        add_band(mesh, &prev, &ring, material)?;
        prev = ring;
    }

    let centre = mesh.add_vertex(corner.derive_at(apex));
    let n = prev.len();
    for k in 0..n {
        let tri = [prev[k], prev[(k + 1) % n], centre];
        let normal = ring_normal(&positions(mesh, &tri)?);
        add_face_with_normal(mesh, &tri, material, normal)?;
    }
    Ok(())
}

fn add_band(
    mesh: &mut PolyMesh,
    outer: &[VertexId],
    inner: &[VertexId],
    material: i32,
) -> EditResult<()> {
    let n = outer.len();
    for k in 0..n {
        let quad = [outer[k], outer[(k + 1) % n], inner[(k + 1) % n], inner[k]];
        let normal = ring_normal(&positions(mesh, &quad)?);
        add_face_with_normal(mesh, &quad, material, normal)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EditErrorKind;
    use approx::assert_relative_eq;
    use mesh_types::{unit_cube, MeshTopology};

    fn top(cube: &PolyMesh) -> FaceId {
        cube.faces()
            .find(|(_, f)| f.normal.is_some_and(|n| n.z > 0.5))
            .map(|(id, _)| id)
            .unwrap()
    }

    fn assert_closed(mesh: &PolyMesh) {
        for (id, _) in mesh.edges() {
            assert_eq!(mesh.faces_using_edge(id).len(), 2, "edge {id} is not shared by 2 faces");
        }
        for (_, face) in mesh.faces() {
            assert!(face.is_well_formed());
        }
        let euler = mesh.vertex_count() as i64 - mesh.edge_count() as i64 + mesh.face_count() as i64;
        assert_eq!(euler, 2);
    }

    fn assert_consistent_winding(mesh: &PolyMesh) {
        for (id, _) in mesh.edges() {
            let users = mesh.faces_using_edge(id);
            let edge = mesh.edge(id).unwrap();
            let forward = users
                .iter()
                .filter(|&&f| mesh.face(f).unwrap().walks(edge.v1, edge.v2))
                .count();
            assert_eq!(forward, 1, "edge {id} is walked the same way by both faces");
        }
    }

    #[test]
    fn face_bevel_rounds_rim() {
        let mut cube = unit_cube();
        let f = top(&cube);
        let params = BevelParams::new(0.2).with_segments(3);
        let outcome = bevel(&mut cube, BevelTarget::Face(f), &params).unwrap();

        assert_eq!(outcome.created_vertices.len(), 12);
        assert_eq!(outcome.created_faces.len(), 13);
        assert_eq!(outcome.removed_faces, vec![f]);
        assert_closed(&cube);
        assert_consistent_winding(&cube);

        let cap = *outcome.created_faces.last().unwrap();
        for p in cube.face_positions(cap).unwrap() {
            assert_relative_eq!(p.z, 1.2, epsilon = 1e-12);
            // Corners move along the diagonal bisector.
            assert!(p.x > 0.14 && p.x < 0.86);
        }
    }

    #[test]
    fn edge_bevel_on_cube() {
        let mut cube = unit_cube();
        let f = top(&cube);
        let e = cube.face(f).unwrap().edges[0];
        let outcome = bevel(&mut cube, BevelTarget::Edge(e), &BevelParams::new(0.1)).unwrap();

        assert_eq!(cube.vertex_count(), 10);
        assert_eq!(cube.edge_count(), 15);
        assert_eq!(cube.face_count(), 7);
        assert_eq!(outcome.removed_vertices.len(), 2);
        assert_closed(&cube);
        assert_consistent_winding(&cube);
    }

    #[test]
    fn segmented_edge_bevel_stays_closed() {
        let mut cube = unit_cube();
        let f = top(&cube);
        let e = cube.face(f).unwrap().edges[1];
        bevel(&mut cube, BevelTarget::Edge(e), &BevelParams::new(0.25).with_segments(4)).unwrap();
        assert_eq!(cube.face_count(), 6 + 4);
        assert_closed(&cube);
        assert_consistent_winding(&cube);
    }

    #[test]
    fn edge_bevel_on_open_strip_drops_boundary_endpoints() {
        // Two quads sharing the edge b-e, everything else open.
        let mut mesh = PolyMesh::new();
        let a = mesh.add_vertex(Vertex::from_coords(0.0, 0.0, 0.0));
        let b = mesh.add_vertex(Vertex::from_coords(1.0, 0.0, 0.0));
        let c = mesh.add_vertex(Vertex::from_coords(2.0, 0.0, 0.0));
        let d = mesh.add_vertex(Vertex::from_coords(0.0, 1.0, 0.0));
        let e = mesh.add_vertex(Vertex::from_coords(1.0, 1.0, 0.0));
        let g = mesh.add_vertex(Vertex::from_coords(2.0, 1.0, 0.0));
        mesh.add_polygon(&[a, b, e, d], 0).unwrap();
        mesh.add_polygon(&[b, c, g, e], 0).unwrap();
        let shared = mesh.find_edge(b, e).unwrap();

        let outcome = bevel(&mut mesh, BevelTarget::Edge(shared), &BevelParams::new(0.2)).unwrap();
        assert_eq!(outcome.created_faces.len(), 1);
        assert_eq!(outcome.removed_vertices, vec![b, e]);
        assert!(!mesh.contains_edge(shared));
        assert_eq!(mesh.vertex_count(), 8);
        assert_eq!(mesh.face_count(), 3);
        assert_consistent_orientation_where_shared(&mesh);
    }

    fn assert_consistent_orientation_where_shared(mesh: &PolyMesh) {
        for (id, edge) in mesh.edges() {
            let users = mesh.faces_using_edge(id);
            if users.len() == 2 {
                let forward = users
                    .iter()
                    .filter(|&&f| mesh.face(f).unwrap().walks(edge.v1, edge.v2))
                    .count();
                assert_eq!(forward, 1);
            }
        }
    }

    #[test]
    fn boundary_edge_is_rejected() {
        let mut mesh = PolyMesh::new();
        let a = mesh.add_vertex(Vertex::from_coords(0.0, 0.0, 0.0));
        let b = mesh.add_vertex(Vertex::from_coords(1.0, 0.0, 0.0));
        let c = mesh.add_vertex(Vertex::from_coords(0.0, 1.0, 0.0));
        mesh.add_polygon(&[a, b, c], 0).unwrap();
        let e = mesh.find_edge(a, b).unwrap();
        let err = bevel(&mut mesh, BevelTarget::Edge(e), &BevelParams::new(0.1)).unwrap_err();
        assert_eq!(err.kind, EditErrorKind::DegenerateGeometry);
        assert_eq!(mesh.vertex_count(), 3);
    }

    #[test]
    fn vertex_bevel_cuts_corner() {
        let mut cube = unit_cube();
        let corner = VertexId(6);
        let outcome = bevel(&mut cube, BevelTarget::Vertex(corner), &BevelParams::new(0.3)).unwrap();

        assert_eq!(outcome.created_vertices.len(), 3);
        assert_eq!(outcome.created_faces.len(), 1);
        assert_eq!(outcome.removed_vertices, vec![corner]);
        assert_closed(&cube);
        assert_consistent_winding(&cube);

        let cap = cube.face(outcome.created_faces[0]).unwrap();
        let n = cap.normal.unwrap();
        assert!(n.x > 0.0 && n.y > 0.0 && n.z > 0.0);
    }

    #[test]
    fn vertex_bevel_dome() {
        let mut cube = unit_cube();
        let params = BevelParams::new(0.3).with_segments(3);
        let outcome = bevel(&mut cube, BevelTarget::Vertex(VertexId(0)), &params).unwrap();
        // 3 cuts, 2 inner rings of 3, one centre.
        assert_eq!(outcome.created_vertices.len(), 3 + 6 + 1);
        assert_eq!(outcome.created_faces.len(), 3 + 3 + 3);
        assert_closed(&cube);
        assert_consistent_winding(&cube);
    }

    #[test]
    fn vertex_bevel_too_wide() {
        let mut cube = unit_cube();
        let err = bevel(&mut cube, BevelTarget::Vertex(VertexId(0)), &BevelParams::new(1.0))
            .unwrap_err();
        assert_eq!(err.kind, EditErrorKind::InvalidParameter);
        assert_eq!(cube.vertex_count(), 8);
    }

    #[test]
    fn zero_segments_rejected() {
        let mut cube = unit_cube();
        let f = top(&cube);
        let err = bevel(&mut cube, BevelTarget::Face(f), &BevelParams::new(0.1).with_segments(0))
            .unwrap_err();
        assert_eq!(err.kind, EditErrorKind::InvalidParameter);
    }

    #[test]
    fn segments_above_limit_rejected() {
        let mut cube = unit_cube();
        let f = top(&cube);
        let before = cube.to_document();
        let params = BevelParams::new(0.1).with_segments(crate::MAX_BEVEL_SEGMENTS + 1);
        let err = bevel(&mut cube, BevelTarget::Face(f), &params).unwrap_err();
        assert_eq!(err.kind, EditErrorKind::InvalidParameter);
        assert_eq!(cube.to_document(), before);
    }
}
