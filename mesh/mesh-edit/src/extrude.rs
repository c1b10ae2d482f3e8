//! Extrusion of faces, edges and vertices.

use mesh_types::{
    centroid, Edge, EdgeId, FaceId, Point3, PolyMesh, Vector3, VertexId, GEOMETRY_EPSILON,
};
use tracing::debug;

use crate::error::{EditError, EditResult};
use crate::geom::{
    add_face_with_normal, edge_record, face_normal, face_record, positions, ring_normal,
    vertex_record, world_up,
};
use crate::outcome::{ensure_not_empty, transact};
use crate::params::{check_distance, ExtrudeEdgeParams, ExtrudeFaceParams, ExtrudeVertexParams};

/// Edges closer than this to world up (by |cos|) use +X as the up axis.
const UP_PARALLEL_LIMIT: f64 = 0.99;

/// Extrude a face along its normal.
///
/// The face's ring is duplicated and offset by `distance`, optionally scaled
/// about the new ring's centroid. One side quad is added per original edge
/// and a cap face is built from the new ring. The original face is removed
/// unless `keep_original` is set.
///
/// Side quads walk each original edge in the same direction as the face did,
/// so they stay consistently oriented with the surrounding surface; with a
/// negative distance they face into the resulting pocket.
///
/// # Errors
///
/// - `EmptyMesh` if the mesh has no vertices.
/// - `InvalidIndex` if the face (or one of its corners) does not exist.
/// - `DegenerateGeometry` if no normal can be derived from the face.
/// - `InvalidParameter` for non-finite distance or scale.
///
/// # Example
///
/// ```
/// use mesh_edit::{extrude_face, ExtrudeFaceParams};
/// use mesh_types::{unit_cube, MeshTopology};
///
/// let mut cube = unit_cube();
/// let top = cube.face_ids()[1];
/// let outcome = extrude_face(&mut cube, top, &ExtrudeFaceParams::new(1.0)).unwrap();
///
/// assert_eq!(outcome.created_vertices.len(), 4);
/// assert_eq!(outcome.created_faces.len(), 5);
/// assert_eq!(cube.vertex_count(), 12);
/// assert_eq!(cube.face_count(), 10);
/// ```
pub fn extrude_face(mesh: &mut PolyMesh, face: FaceId, params: &ExtrudeFaceParams) -> EditResult {
    ensure_not_empty(mesh)?;
    let record = face_record(mesh, face)?;
    let normal = face_normal(mesh, face, &record)?;
    params.check()?;

    let outcome = transact(mesh, |m| {
        let old = record.vertices.clone();
        let offset = normal * params.distance;
        let mut moved: Vec<Point3<f64>> = positions(m, &old)?.iter().map(|p| p + offset).collect();

        if let Some(scale) = params.scale {
            let factors = scale.factors();
            let c = centroid(&moved);
            for p in &mut moved {
                *p = c + (*p - c).component_mul(&factors);
            }
        }

        let mut new = Vec::with_capacity(old.len());
        for (&v, p) in old.iter().zip(&moved) {
            let source = vertex_record(m, v)?;
            new.push(m.add_vertex(source.derive_at(*p)));
        }

        let material = params.material.resolve(record.material);
        let n = old.len();
        for i in 0..n {
            let j = (i + 1) % n;
            let ring = [old[i], old[j], new[j], new[i]];
            let quad_normal = ring_normal(&positions(m, &ring)?);
            add_face_with_normal(m, &ring, material, quad_normal)?;
        }

        let cap_normal = ring_normal(&moved).or(Some(normal));
        add_face_with_normal(m, &new, material, cap_normal)?;

        if !params.keep_original {
            m.remove_face(face);
        }
        Ok(())
    })?;

    debug!(
        face = %face,
        sides = record.vertices.len(),
        distance = params.distance,
        keep_original = params.keep_original,
        "Extruded face"
    );
    Ok(outcome)
}

/// Extrude an edge into a quad.
///
/// Two new vertices are placed at `distance` along the direction, and a quad
/// closes the original edge to the new one. Without an explicit direction the
/// edge is crossed with world up (+Z), or with +X when the edge is nearly
/// vertical. The quad is wound against any face already using the edge.
///
/// With `remove_original` the edge must be a wire edge. It is removed and
/// replaced by three edges running from its first endpoint out through the
/// two new vertices and back to its second endpoint; no face is added.
///
/// # Errors
///
/// - `EmptyMesh`, `InvalidIndex` as for every operation.
/// - `DegenerateGeometry` for a zero-length edge.
/// - `InvalidParameter` for a non-finite distance or zero direction, or for
///   `remove_original` on an edge that bounds a face.
pub fn extrude_edge(mesh: &mut PolyMesh, edge: EdgeId, params: &ExtrudeEdgeParams) -> EditResult {
    ensure_not_empty(mesh)?;
    let record = edge_record(mesh, edge)?;
    check_distance(params.distance)?;

    let (pa, pb) = mesh
        .edge_positions(edge)
        .ok_or_else(|| EditError::invalid_index(edge))?;
    let along = (pb - pa)
        .try_normalize(GEOMETRY_EPSILON)
        .ok_or_else(|| EditError::degenerate(format!("{edge} has zero length")))?;
    let direction = match params.direction {
        Some(d) => d.try_normalize(GEOMETRY_EPSILON).ok_or_else(|| {
            EditError::invalid_parameter("extrude direction must be non-zero")
        })?,
        None => default_edge_direction(&along),
    };

    let adjacent = mesh.faces_with_side(record.v1, record.v2);
    if params.remove_original && !adjacent.is_empty() {
        return Err(EditError::invalid_parameter(format!(
            "{edge} bounds {} face(s) and cannot be removed",
            adjacent.len()
        )));
    }
    let (source_material, walks_forward) = adjacent
        .first()
        .and_then(|&f| mesh.face(f))
        .map_or((0, false), |f| (f.material, f.walks(record.v1, record.v2)));

    let outcome = transact(mesh, |m| {
        let offset = direction * params.distance;
        let a = vertex_record(m, record.v1)?;
        let b = vertex_record(m, record.v2)?;
        let a2 = m.add_vertex(a.derive_at(pa + offset));
        let b2 = m.add_vertex(b.derive_at(pb + offset));

        if params.remove_original {
            m.remove_edge(edge);
            m.add_edge(Edge::new(record.v1, a2));
            m.add_edge(Edge::new(a2, b2));
            m.add_edge(Edge::new(b2, record.v2));
            return Ok(());
        }

        let ring = if walks_forward {
            [record.v2, record.v1, a2, b2]
        } else {
            [record.v1, record.v2, b2, a2]
        };
        let normal = ring_normal(&positions(m, &ring)?);
        add_face_with_normal(m, &ring, params.material.resolve(source_material), normal)?;
        Ok(())
    })?;

    debug!(
        edge = %edge,
        distance = params.distance,
        remove_original = params.remove_original,
        "Extruded edge"
    );
    Ok(outcome)
}

/// Edge direction crossed with world up, switching to +X near vertical.
fn default_edge_direction(along: &Vector3<f64>) -> Vector3<f64> {
    let up = if along.dot(&world_up()).abs() > UP_PARALLEL_LIMIT {
        Vector3::x()
    } else {
        world_up()
    };
    along
        .cross(&up)
        .try_normalize(GEOMETRY_EPSILON)
        .unwrap_or_else(Vector3::y)
}

/// Extrude a single vertex into a new vertex joined by an edge.
///
/// Without an explicit direction the vertex normal is used, then the average
/// normal of the faces around the vertex, then +Z.
///
/// # Errors
///
/// - `EmptyMesh`, `InvalidIndex` as for every operation.
/// - `InvalidParameter` for a non-finite distance or zero direction.
pub fn extrude_vertex(
    mesh: &mut PolyMesh,
    vertex: VertexId,
    params: &ExtrudeVertexParams,
) -> EditResult {
    ensure_not_empty(mesh)?;
    let record = vertex_record(mesh, vertex)?;
    check_distance(params.distance)?;

    let direction = match params.direction {
        Some(d) => d.try_normalize(GEOMETRY_EPSILON).ok_or_else(|| {
            EditError::invalid_parameter("extrude direction must be non-zero")
        })?,
        None => record
            .normal()
            .and_then(|n| n.try_normalize(GEOMETRY_EPSILON))
            .or_else(|| average_face_normal(mesh, vertex))
            .unwrap_or_else(world_up),
    };

    let outcome = transact(mesh, |m| {
        let tip = m.add_vertex(record.derive_at(record.position + direction * params.distance));
        m.add_edge(Edge::new(vertex, tip));
        Ok(())
    })?;

    debug!(vertex = %vertex, distance = params.distance, "Extruded vertex");
    Ok(outcome)
}

/// Normalized mean of the normals of faces around `vertex`.
pub(crate) fn average_face_normal(mesh: &PolyMesh, vertex: VertexId) -> Option<Vector3<f64>> {
    let sum = mesh
        .faces_using_vertex(vertex)
        .into_iter()
        .filter_map(|f| {
            let stored = mesh.face(f)?.normal;
            stored.or_else(|| ring_normal(&mesh.face_positions(f)?))
        })
        .fold(Vector3::zeros(), |acc, n| acc + n);
    sum.try_normalize(GEOMETRY_EPSILON)
}
