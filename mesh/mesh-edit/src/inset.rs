//! Face inset.

use hashbrown::{HashMap, HashSet};
use mesh_types::{merge_vertices_among, FaceId, PolyMesh, Vector3, VertexId, GEOMETRY_EPSILON};
use tracing::debug;

use crate::error::{EditError, EditResult};
use crate::geom::{
    add_face_with_normal, face_normal, face_record, inward_direction, inward_directions,
    positions, ring_normal, vertex_record,
};
use crate::outcome::{ensure_not_empty, transact};
use crate::params::{InsetMode, InsetParams};

/// Inset faces by `distance` in their own planes.
///
/// Every corner moves along its inward direction: the normalized sum of the
/// unit vectors toward its two ring neighbours, projected onto the face plane
/// and flipped toward the interior at reflex corners.
///
/// In [`InsetMode::Individual`] each face gets an inner copy of its ring and
/// one quad per side, and the original is removed. In
/// [`InsetMode::Connected`] the selection is treated as one region: only
/// vertices on the region boundary move, the selected faces are re-ringed
/// through them and one quad is added per boundary side.
///
/// With a merge tolerance, new vertices closer than the tolerance to one
/// another or to the original corners are merged afterwards and faces that
/// collapse are dropped.
///
/// # Errors
///
/// - `EmptyMesh`, `InvalidIndex` as for every operation.
/// - `InvalidParameter` for an empty selection or a non-finite distance.
/// - `DegenerateGeometry` if a face has no usable normal, or a connected
///   region's boundary passes through a vertex more than once.
///
/// # Example
///
/// ```
/// use mesh_edit::{inset, InsetParams};
/// use mesh_types::{unit_cube, MeshTopology};
///
/// let mut cube = unit_cube();
/// let top = cube.face_ids()[1];
/// inset(&mut cube, &[top], &InsetParams::new(0.25)).unwrap();
///
/// assert_eq!(cube.vertex_count(), 12);
/// assert_eq!(cube.face_count(), 10);
/// ```
pub fn inset(mesh: &mut PolyMesh, faces: &[FaceId], params: &InsetParams) -> EditResult {
    ensure_not_empty(mesh)?;
    let mut selection: Vec<FaceId> = Vec::with_capacity(faces.len());
    for &f in faces {
        face_record(mesh, f)?;
        if !selection.contains(&f) {
            selection.push(f);
        }
    }
    if selection.is_empty() {
        return Err(EditError::invalid_parameter("no faces to inset"));
    }
    params.check()?;

    let mut normals = HashMap::with_capacity(selection.len());
    for &f in &selection {
        let record = face_record(mesh, f)?;
        normals.insert(f, face_normal(mesh, f, &record)?);
    }

    let outcome = transact(mesh, |m| {
        let touched = match params.mode {
            InsetMode::Individual => inset_individual(m, &selection, &normals, params)?,
            InsetMode::Connected => inset_connected(m, &selection, &normals, params)?,
        };
        if let Some(tolerance) = params.merge_tolerance {
            let report = merge_vertices_among(m, &touched, tolerance);
            if !report.is_empty() {
                debug!(
                    merged = report.merged_vertices,
                    faces = report.removed_faces,
                    "Merged inset vertices"
                );
            }
        }
        Ok(())
    })?;

    debug!(
        faces = selection.len(),
        mode = ?params.mode,
        distance = params.distance,
        "Inset faces"
    );
    Ok(outcome)
}

/// Returns every vertex the merge pass may consider.
fn inset_individual(
    mesh: &mut PolyMesh,
    selection: &[FaceId],
    normals: &HashMap<FaceId, Vector3<f64>>,
    params: &InsetParams,
) -> EditResult<Vec<VertexId>> {
    let mut touched = Vec::new();
    for &f in selection {
        let face = face_record(mesh, f)?;
        let normal = normals[&f];
        let pts = positions(mesh, &face.vertices)?;
        let inward = inward_directions(&pts, &normal);

        let mut inner = Vec::with_capacity(pts.len());
        for (i, &v) in face.vertices.iter().enumerate() {
            let source = vertex_record(mesh, v)?;
            inner.push(mesh.add_vertex(source.derive_at(pts[i] + inward[i] * params.distance)));
        }

        let material = params.material.resolve(face.material);
        let n = inner.len();
        for i in 0..n {
            let j = (i + 1) % n;
            let quad = [face.vertices[i], face.vertices[j], inner[j], inner[i]];
            let quad_normal = ring_normal(&positions(mesh, &quad)?).or(Some(normal));
            add_face_with_normal(mesh, &quad, material, quad_normal)?;
        }

        mesh.add_polygon_like(&inner, &face)
            .ok_or_else(|| EditError::degenerate(format!("cannot build the inner ring of {f}")))?;
        mesh.remove_face(f);

        touched.extend_from_slice(&face.vertices);
        touched.extend(inner);
    }
    Ok(touched)
}

fn inset_connected(
    mesh: &mut PolyMesh,
    selection: &[FaceId],
    normals: &HashMap<FaceId, Vector3<f64>>,
    params: &InsetParams,
) -> EditResult<Vec<VertexId>> {
    // Sides walked by exactly one selected face form the region boundary.
    let mut side_uses: HashMap<(VertexId, VertexId), usize> = HashMap::new();
    for &f in selection {
        let face = face_record(mesh, f)?;
        for (a, b) in face.sides() {
            *side_uses.entry((a.min(b), a.max(b))).or_default() += 1;
        }
    }

    let mut boundary: Vec<(FaceId, VertexId, VertexId)> = Vec::new();
    let mut next_of: HashMap<VertexId, VertexId> = HashMap::new();
    let mut prev_of: HashMap<VertexId, VertexId> = HashMap::new();
    let mut region_normal: HashMap<VertexId, Vector3<f64>> = HashMap::new();
    for &f in selection {
        let face = face_record(mesh, f)?;
        let normal = normals[&f];
        for &v in &face.vertices {
            *region_normal.entry(v).or_insert_with(Vector3::zeros) += normal;
        }
        for (a, b) in face.sides() {
            if side_uses[&(a.min(b), a.max(b))] != 1 {
                continue;
            }
            if next_of.insert(a, b).is_some() || prev_of.insert(b, a).is_some() {
                return Err(EditError::degenerate(format!(
                    "region boundary passes through {} more than once",
                    if next_of.contains_key(&a) { a } else { b }
                )));
            }
            boundary.push((f, a, b));
        }
    }
    if boundary.is_empty() {
        return Err(EditError::degenerate("selection is closed; it has no boundary"));
    }

    let mut moved: HashMap<VertexId, VertexId> = HashMap::with_capacity(next_of.len());
    let mut order: Vec<VertexId> = next_of.keys().chain(prev_of.keys()).copied().collect();
    order.sort_unstable();
    order.dedup();
    for v in order {
        let (Some(&prev), Some(&next)) = (prev_of.get(&v), next_of.get(&v)) else {
            return Err(EditError::degenerate(format!("region boundary is open at {v}")));
        };
        let normal = region_normal
            .get(&v)
            .and_then(|n| n.try_normalize(GEOMETRY_EPSILON))
            .unwrap_or_else(Vector3::z);
        let source = vertex_record(mesh, v)?;
        let (pp, pn) = (
            mesh.position(prev).ok_or_else(|| EditError::invalid_index(prev))?,
            mesh.position(next).ok_or_else(|| EditError::invalid_index(next))?,
        );
        let dir = inward_direction(&pp, &source.position, &pn, &normal);
        moved.insert(v, mesh.add_vertex(source.derive_at(source.position + dir * params.distance)));
    }

    let mut reringed: HashSet<FaceId> = HashSet::new();
    for &f in selection {
        let face = face_record(mesh, f)?;
        if !face.vertices.iter().any(|v| moved.contains_key(v)) {
            continue;
        }
        let ring: Vec<VertexId> = face
            .vertices
            .iter()
            .map(|v| moved.get(v).copied().unwrap_or(*v))
            .collect();
        if !mesh.replace_face_ring(f, ring) {
            return Err(EditError::degenerate(format!("cannot re-ring {f}")));
        }
        reringed.insert(f);
    }

    for &(f, a, b) in &boundary {
        let material = params
            .material
            .resolve(mesh.face(f).map_or(0, |face| face.material));
        let quad = [a, b, moved[&b], moved[&a]];
        let quad_normal = ring_normal(&positions(mesh, &quad)?).or(normals.get(&f).copied());
        add_face_with_normal(mesh, &quad, material, quad_normal)?;
    }

    let mut touched: Vec<VertexId> = moved.keys().copied().collect();
    touched.extend(moved.values().copied());
    touched.sort_unstable();
    debug!(
        boundary = boundary.len(),
        reringed = reringed.len(),
        "Connected inset region"
    );
    Ok(touched)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EditErrorKind;
    use approx::assert_relative_eq;
    use mesh_types::{unit_cube, MeshTopology, Point3, Vertex};

    fn grid_2x1() -> (PolyMesh, FaceId, FaceId) {
        let mut mesh = PolyMesh::new();
        let v: Vec<VertexId> = [
            (0.0, 0.0),
            (1.0, 0.0),
            (2.0, 0.0),
            (0.0, 1.0),
            (1.0, 1.0),
            (2.0, 1.0),
        ]
        .iter()
        .map(|&(x, y)| mesh.add_vertex(Vertex::from_coords(x, y, 0.0)))
        .collect();
        let left = mesh.add_polygon(&[v[0], v[1], v[4], v[3]], 0).unwrap();
        let right = mesh.add_polygon(&[v[1], v[2], v[5], v[4]], 0).unwrap();
        (mesh, left, right)
    }

    #[test]
    fn individual_inset_on_cube_top() {
        let mut cube = unit_cube();
        let top = cube.face_ids()[1];
        let outcome = inset(&mut cube, &[top], &InsetParams::new(0.25)).unwrap();

        assert_eq!(outcome.created_vertices.len(), 4);
        assert_eq!(outcome.created_faces.len(), 5);
        assert_eq!(outcome.removed_faces, vec![top]);

        let inner = *outcome.created_faces.last().unwrap();
        let d = 0.25 * std::f64::consts::FRAC_1_SQRT_2;
        let pts = cube.face_positions(inner).unwrap();
        assert_relative_eq!(pts[0], Point3::new(d, d, 1.0), epsilon = 1e-12);
        assert!(cube.face(inner).unwrap().normal.unwrap().z > 0.99);
    }

    #[test]
    fn zero_distance_gives_coincident_ring() {
        let mut cube = unit_cube();
        let top = cube.face_ids()[1];
        let before = cube.face_positions(top).unwrap();
        let outcome = inset(&mut cube, &[top], &InsetParams::new(0.0)).unwrap();

        let inner = *outcome.created_faces.last().unwrap();
        let after = cube.face_positions(inner).unwrap();
        for (a, b) in before.iter().zip(&after) {
            assert!(b.coords.iter().all(|c| c.is_finite()));
            assert_relative_eq!(a, b, epsilon = 1e-12);
        }
    }

    #[test]
    fn zero_distance_with_merge_collapses_walls() {
        let mut cube = unit_cube();
        let top = cube.face_ids()[1];
        let params = InsetParams::new(0.0).with_merge_tolerance(1e-9);
        inset(&mut cube, &[top], &params).unwrap();

        assert_eq!(cube.vertex_count(), 8);
        assert_eq!(cube.face_count(), 6);
        assert_eq!(cube.edge_count(), 12);
    }

    #[test]
    fn merge_across_adjacent_faces_keeps_shared_corners() {
        let mut cube = unit_cube();
        let ids = cube.face_ids();
        let (top, front) = (ids[1], ids[2]);
        let params = InsetParams::new(0.1).with_merge_tolerance(1e-6);
        let outcome = inset(&mut cube, &[top, front], &params).unwrap();

        assert!(outcome.removed_vertices.is_empty());
        for v in [VertexId(4), VertexId(5)] {
            assert!(cube.contains_vertex(v));
        }
        assert_eq!(cube.vertex_count(), 16);
        let report = mesh_repair::validate_integrity(&cube);
        assert!(report.is_valid(), "{report}");
    }

    #[test]
    fn zero_distance_merge_on_every_face_restores_cube() {
        let mut cube = unit_cube();
        let all = cube.face_ids();
        let params = InsetParams::new(0.0).with_merge_tolerance(1e-9);
        inset(&mut cube, &all, &params).unwrap();

        assert_eq!(cube.vertex_count(), 8);
        assert_eq!(cube.edge_count(), 12);
        assert_eq!(cube.face_count(), 6);
        let report = mesh_repair::validate_integrity(&cube);
        assert!(report.is_valid(), "{report}");
    }

    #[test]
    fn connected_inset_moves_only_region_boundary() {
        let (mut mesh, left, right) = grid_2x1();
        let params = InsetParams::new(0.1).with_mode(InsetMode::Connected);
        let outcome = inset(&mut mesh, &[left, right], &params).unwrap();

        // Six boundary vertices, six boundary sides.
        assert_eq!(outcome.created_vertices.len(), 6);
        assert_eq!(outcome.created_faces.len(), 6);
        assert!(outcome.removed_faces.is_empty());

        let ring = &mesh.face(left).unwrap().vertices;
        let p = mesh.position(ring[1]).unwrap();
        // The middle bottom vertex moves straight up.
        assert_relative_eq!(p, Point3::new(1.0, 0.1, 0.0), epsilon = 1e-12);

        // The two selected faces still share a side.
        let shared = mesh
            .face(left)
            .unwrap()
            .sides()
            .filter(|&(a, b)| mesh.face(right).unwrap().walks(b, a))
            .count();
        assert_eq!(shared, 1);
    }

    #[test]
    fn connected_closed_selection_is_rejected() {
        let mut cube = unit_cube();
        let all = cube.face_ids();
        let params = InsetParams::new(0.1).with_mode(InsetMode::Connected);
        let err = inset(&mut cube, &all, &params).unwrap_err();
        assert_eq!(err.kind, EditErrorKind::DegenerateGeometry);
        assert_eq!(cube.face_count(), 6);
    }

    #[test]
    fn empty_selection_is_rejected() {
        let mut cube = unit_cube();
        let err = inset(&mut cube, &[], &InsetParams::new(0.1)).unwrap_err();
        assert_eq!(err.kind, EditErrorKind::InvalidParameter);
    }

    #[test]
    fn missing_face_is_rejected() {
        let mut cube = unit_cube();
        let err = inset(&mut cube, &[FaceId(42)], &InsetParams::new(0.1)).unwrap_err();
        assert_eq!(err.kind, EditErrorKind::InvalidIndex);
    }
}
