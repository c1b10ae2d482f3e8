//! Lookups and geometric helpers shared by the operations.

use mesh_types::{
    first_noncollinear_normal, Edge, EdgeId, Face, FaceId, Point3, PolyMesh, Vector3, Vertex,
    VertexId, GEOMETRY_EPSILON,
};

use crate::error::{EditError, EditResult};

/// World up axis.
pub(crate) fn world_up() -> Vector3<f64> {
    Vector3::z()
}

pub(crate) fn vertex_record(mesh: &PolyMesh, id: VertexId) -> EditResult<Vertex> {
    mesh.vertex(id)
        .cloned()
        .ok_or_else(|| EditError::invalid_index(id))
}

/// Edge whose endpoints are both live.
pub(crate) fn edge_record(mesh: &PolyMesh, id: EdgeId) -> EditResult<Edge> {
    let edge = mesh.edge(id).copied().ok_or_else(|| EditError::invalid_index(id))?;
    for v in [edge.v1, edge.v2] {
        if !mesh.contains_vertex(v) {
            return Err(EditError::invalid_index(format!("{v} (endpoint of {id})")));
        }
    }
    if edge.is_loop() {
        return Err(EditError::degenerate(format!("{id} is a self-loop")));
    }
    Ok(edge)
}

/// Face whose ring is well formed and fully live.
pub(crate) fn face_record(mesh: &PolyMesh, id: FaceId) -> EditResult<Face> {
    let face = mesh.face(id).cloned().ok_or_else(|| EditError::invalid_index(id))?;
    if let Some(&v) = face.vertices.iter().find(|&&v| !mesh.contains_vertex(v)) {
        return Err(EditError::invalid_index(format!("{v} (corner of {id})")));
    }
    if !face.is_well_formed() {
        return Err(EditError::degenerate(format!(
            "{id} has {} corners and {} edges",
            face.vertices.len(),
            face.edges.len()
        )));
    }
    Ok(face)
}

pub(crate) fn positions(mesh: &PolyMesh, ring: &[VertexId]) -> EditResult<Vec<Point3<f64>>> {
    ring.iter()
        .map(|&v| mesh.position(v).ok_or_else(|| EditError::invalid_index(v)))
        .collect()
}

/// Stored normal if usable, else the first non-collinear corner normal.
pub(crate) fn face_normal(mesh: &PolyMesh, id: FaceId, face: &Face) -> EditResult<Vector3<f64>> {
    let mut distinct = face.vertices.clone();
    distinct.sort_unstable();
    distinct.dedup();
    if distinct.len() < 3 {
        return Err(EditError::degenerate(format!(
            "{id} has fewer than 3 distinct vertices"
        )));
    }
    if let Some(n) = face.normal.and_then(|n| n.try_normalize(GEOMETRY_EPSILON)) {
        return Ok(n);
    }
    let pts = positions(mesh, &face.vertices)?;
    first_noncollinear_normal(&pts)
        .ok_or_else(|| EditError::degenerate(format!("{id} has only collinear vertices")))
}

/// Face normal computed from positions only.
pub(crate) fn ring_normal(pts: &[Point3<f64>]) -> Option<Vector3<f64>> {
    mesh_types::newell_normal(pts).or_else(|| first_noncollinear_normal(pts))
}

/// In-plane direction pointing from `cur` into the polygon.
///
/// The normalized sum of the unit vectors toward both ring neighbours,
/// projected onto the plane of `normal`. Straight corners fall back to the
/// left-hand perpendicular of the outgoing edge; reflex corners are flipped
/// toward the interior.
pub(crate) fn inward_direction(
    prev: &Point3<f64>,
    cur: &Point3<f64>,
    next: &Point3<f64>,
    normal: &Vector3<f64>,
) -> Vector3<f64> {
    let to_prev = (prev - cur).try_normalize(GEOMETRY_EPSILON).unwrap_or_else(Vector3::zeros);
    let to_next = (next - cur).try_normalize(GEOMETRY_EPSILON).unwrap_or_else(Vector3::zeros);

    let sum = to_prev + to_next;
    let in_plane = sum - normal * normal.dot(&sum);
    let interior = normal.cross(&(to_next - to_prev));

    match in_plane.try_normalize(1e-9) {
        Some(d) if d.dot(&interior) < 0.0 => -d,
        Some(d) => d,
        None => interior
            .try_normalize(GEOMETRY_EPSILON)
            .or_else(|| normal.cross(&to_next).try_normalize(GEOMETRY_EPSILON))
            .unwrap_or_else(Vector3::zeros),
    }
}

/// Unit inward direction at every corner of a ring.
pub(crate) fn inward_directions(pts: &[Point3<f64>], normal: &Vector3<f64>) -> Vec<Vector3<f64>> {
    let n = pts.len();
    (0..n)
        .map(|i| inward_direction(&pts[(i + n - 1) % n], &pts[i], &pts[(i + 1) % n], normal))
        .collect()
}

/// Add a face, turning a rejected ring into a degenerate-geometry error.
pub(crate) fn add_face(mesh: &mut PolyMesh, ring: &[VertexId], material: i32) -> EditResult<FaceId> {
    mesh.add_polygon(ring, material)
        .ok_or_else(|| EditError::degenerate(format!("cannot build a face from {} corners", ring.len())))
}

/// Add a face with a stored normal.
pub(crate) fn add_face_with_normal(
    mesh: &mut PolyMesh,
    ring: &[VertexId],
    material: i32,
    normal: Option<Vector3<f64>>,
) -> EditResult<FaceId> {
    let id = add_face(mesh, ring, material)?;
    if let (Some(n), Some(face)) = (normal, mesh.face_mut(id)) {
        face.normal = Some(n);
    }
    Ok(id)
}

/// Recompute and store the normal of a face from its ring, if it had one.
pub(crate) fn refresh_normal(mesh: &mut PolyMesh, id: FaceId) {
    let Some(face) = mesh.face(id) else { return };
    if face.normal.is_none() {
        return;
    }
    let Some(pts) = mesh.face_positions(id) else { return };
    let normal = ring_normal(&pts);
    if let Some(face) = mesh.face_mut(id) {
        face.normal = normal.or(face.normal);
    }
}

/// Quadratic Bezier point.
pub(crate) fn quadratic(
    p0: &Point3<f64>,
    control: &Point3<f64>,
    p1: &Point3<f64>,
    t: f64,
) -> Point3<f64> {
    let u = 1.0 - t;
    Point3::from(p0.coords * (u * u) + control.coords * (2.0 * u * t) + p1.coords * (t * t))
}
