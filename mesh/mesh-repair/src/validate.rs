//! Integrity validation and health reporting.
//!
//! Validation is read-only and never fails: every problem found is listed in
//! an [`IntegrityReport`], grouped by category. A category either fails the
//! mesh or only warns; orphans and out-of-range UVs warn.

use std::fmt;

use hashbrown::{HashMap, HashSet};
use mesh_types::{
    area, newell_vector, EdgeId, EdgeKey, FaceId, Point3, PolyMesh, VertexId, GEOMETRY_EPSILON,
};
use tracing::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::adjacency::MeshAdjacency;

/// Outcome of one validation category.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CheckResult<T> {
    /// Whether the category lets the mesh pass.
    pub passed: bool,
    /// Offending entities, in id order.
    pub items: Vec<T>,
}

impl<T> CheckResult<T> {
    /// A category that fails when anything is listed.
    fn fatal(items: Vec<T>) -> Self {
        Self {
            passed: items.is_empty(),
            items,
        }
    }

    /// A category that lists problems without failing.
    fn warning(items: Vec<T>) -> Self {
        Self {
            passed: true,
            items,
        }
    }

    /// Number of listed entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether nothing is listed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T> Default for CheckResult<T> {
    fn default() -> Self {
        Self::warning(Vec::new())
    }
}

/// A stored id that does not resolve to a live entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DanglingRef {
    /// A face ring names a dead vertex.
    FaceVertex {
        /// Referencing face.
        face: FaceId,
        /// Missing vertex.
        vertex: VertexId,
    },
    /// A face edge ring names a dead edge.
    FaceEdge {
        /// Referencing face.
        face: FaceId,
        /// Missing edge.
        edge: EdgeId,
    },
    /// An edge endpoint is dead.
    EdgeEndpoint {
        /// Referencing edge.
        edge: EdgeId,
        /// Missing vertex.
        vertex: VertexId,
    },
}

impl fmt::Display for DanglingRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FaceVertex { face, vertex } => write!(f, "{face} -> {vertex}"),
            Self::FaceEdge { face, edge } => write!(f, "{face} -> {edge}"),
            Self::EdgeEndpoint { edge, vertex } => write!(f, "{edge} -> {vertex}"),
        }
    }
}

/// Report of integrity validation results.
///
/// The mesh is valid when every category passes. Boundary and non-manifold
/// counts are informational.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct IntegrityReport {
    /// Live vertices.
    pub vertex_count: usize,
    /// Live edges.
    pub edge_count: usize,
    /// Live faces.
    pub face_count: usize,

    /// Faces whose ring winds against their stored normal.
    pub winding: CheckResult<FaceId>,
    /// Ids stored on faces and edges that are not live.
    pub references: CheckResult<DanglingRef>,
    /// Faces with fewer than three corners or mismatched ring lengths.
    pub ring_size: CheckResult<FaceId>,
    /// Faces whose edge `i` does not join corners `i` and `i + 1`.
    pub ring_edges: CheckResult<FaceId>,
    /// Edges whose endpoints are the same vertex.
    pub degenerate_edges: CheckResult<EdgeId>,
    /// Vertices with a NaN or infinite coordinate.
    pub non_finite_positions: CheckResult<VertexId>,
    /// Groups of vertices sharing a position, each sorted by id.
    ///
    /// Non-finite positions are never grouped.
    pub duplicate_vertices: CheckResult<Vec<VertexId>>,
    /// Vertices no face uses. Warning only.
    pub orphaned_vertices: CheckResult<VertexId>,
    /// Edges no face uses. Warning only.
    pub orphaned_edges: CheckResult<EdgeId>,
    /// Faces with a negative material index.
    pub materials: CheckResult<FaceId>,
    /// Vertices without a UV.
    pub missing_uvs: CheckResult<VertexId>,
    /// Vertices whose UV leaves [0, 1]. Warning only.
    pub uvs_out_of_range: CheckResult<VertexId>,
    /// Faces with area below the threshold.
    pub degenerate_faces: CheckResult<FaceId>,

    /// Ring sides used by exactly one face.
    pub boundary_edge_count: usize,
    /// Ring sides used by more than two faces.
    pub non_manifold_edge_count: usize,
}

impl IntegrityReport {
    /// Whether every category passes.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.winding.passed
            && self.references.passed
            && self.ring_size.passed
            && self.ring_edges.passed
            && self.degenerate_edges.passed
            && self.non_finite_positions.passed
            && self.duplicate_vertices.passed
            && self.orphaned_vertices.passed
            && self.orphaned_edges.passed
            && self.materials.passed
            && self.missing_uvs.passed
            && self.uvs_out_of_range.passed
            && self.degenerate_faces.passed
    }

    /// Entities listed by failing categories.
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.counts()
            .iter()
            .filter(|(_, _, passed)| !passed)
            .map(|(_, n, _)| n)
            .sum()
    }

    /// Entities listed by categories that only warn.
    #[must_use]
    pub fn warning_count(&self) -> usize {
        self.counts()
            .iter()
            .filter(|(_, _, passed)| *passed)
            .map(|(_, n, _)| n)
            .sum()
    }

    /// Entities listed by any category.
    #[must_use]
    pub fn issue_count(&self) -> usize {
        self.error_count() + self.warning_count()
    }

    /// Whether the faces form a closed surface.
    #[must_use]
    pub const fn is_watertight(&self) -> bool {
        self.boundary_edge_count == 0
    }

    fn counts(&self) -> [(&'static str, usize, bool); 13] {
        [
            ("Winding mismatches", self.winding.len(), self.winding.passed),
            ("Dangling references", self.references.len(), self.references.passed),
            ("Undersized rings", self.ring_size.len(), self.ring_size.passed),
            ("Ring/edge mismatches", self.ring_edges.len(), self.ring_edges.passed),
            ("Degenerate edges", self.degenerate_edges.len(), self.degenerate_edges.passed),
            (
                "Non-finite positions",
                self.non_finite_positions.len(),
                self.non_finite_positions.passed,
            ),
            (
                "Duplicate vertex groups",
                self.duplicate_vertices.len(),
                self.duplicate_vertices.passed,
            ),
            ("Orphaned vertices", self.orphaned_vertices.len(), self.orphaned_vertices.passed),
            ("Orphaned edges", self.orphaned_edges.len(), self.orphaned_edges.passed),
            ("Invalid materials", self.materials.len(), self.materials.passed),
            ("Missing UVs", self.missing_uvs.len(), self.missing_uvs.passed),
            ("UVs out of range", self.uvs_out_of_range.len(), self.uvs_out_of_range.passed),
            ("Degenerate faces", self.degenerate_faces.len(), self.degenerate_faces.passed),
        ]
    }
}

impl fmt::Display for IntegrityReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Integrity Report:")?;
        writeln!(f, "  Vertices: {}", self.vertex_count)?;
        writeln!(f, "  Edges: {}", self.edge_count)?;
        writeln!(f, "  Faces: {}", self.face_count)?;
        writeln!(f)?;
        writeln!(f, "  Status:")?;
        writeln!(f, "    Valid: {}", if self.is_valid() { "Yes" } else { "No" })?;
        writeln!(
            f,
            "    Watertight: {}",
            if self.is_watertight() { "Yes" } else { "No" }
        )?;
        if self.non_manifold_edge_count > 0 {
            writeln!(f, "    Non-manifold edges: {}", self.non_manifold_edge_count)?;
        }

        if self.issue_count() > 0 {
            writeln!(f)?;
            writeln!(f, "  Issues:")?;
            for (label, count, passed) in self.counts() {
                if count > 0 {
                    let tag = if passed { " (warning)" } else { "" };
                    writeln!(f, "    {label}: {count}{tag}")?;
                }
            }
        }

        Ok(())
    }
}

/// Options for integrity validation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ValidationOptions {
    /// Grid size positions are snapped to when looking for duplicates.
    /// A non-positive value disables the check.
    pub duplicate_tolerance: f64,
    /// Area below which a face is considered degenerate.
    pub degenerate_area_threshold: f64,
    /// Whether to compare ring winding against stored normals.
    pub check_winding: bool,
    /// Whether to check UV completeness and range.
    pub check_uvs: bool,
    /// Whether to look for coincident vertices.
    pub check_duplicates: bool,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            duplicate_tolerance: 1e-6,
            degenerate_area_threshold: 1e-12,
            check_winding: true,
            check_uvs: true,
            check_duplicates: true,
        }
    }
}

impl ValidationOptions {
    /// Only the structural checks: references, rings and edges.
    #[must_use]
    pub fn structural() -> Self {
        Self {
            check_winding: false,
            check_uvs: false,
            check_duplicates: false,
            ..Self::default()
        }
    }

    /// Set the duplicate-vertex grid size.
    #[must_use]
    pub fn with_duplicate_tolerance(mut self, tolerance: f64) -> Self {
        self.duplicate_tolerance = tolerance;
        self
    }

    /// Set the degenerate-face area threshold.
    #[must_use]
    pub fn with_degenerate_area_threshold(mut self, threshold: f64) -> Self {
        self.degenerate_area_threshold = threshold;
        self
    }

    /// Enable or disable the winding check.
    #[must_use]
    pub fn with_check_winding(mut self, check: bool) -> Self {
        self.check_winding = check;
        self
    }

    /// Enable or disable the UV checks.
    #[must_use]
    pub fn with_check_uvs(mut self, check: bool) -> Self {
        self.check_uvs = check;
        self
    }
}

/// Validate a mesh with default options.
///
/// # Example
///
/// ```
/// use mesh_repair::validate_integrity;
/// use mesh_types::unit_cube;
///
/// let report = validate_integrity(&unit_cube());
/// assert!(report.is_valid());
/// assert_eq!(report.issue_count(), 0);
/// ```
#[must_use]
pub fn validate_integrity(mesh: &PolyMesh) -> IntegrityReport {
    validate_integrity_with_options(mesh, &ValidationOptions::default())
}

/// Validate a mesh with custom options.
#[must_use]
pub fn validate_integrity_with_options(
    mesh: &PolyMesh,
    options: &ValidationOptions,
) -> IntegrityReport {
    use mesh_types::MeshTopology;

    let adjacency = MeshAdjacency::build(mesh);

    let report = IntegrityReport {
        vertex_count: mesh.vertex_count(),
        edge_count: mesh.edge_count(),
        face_count: mesh.face_count(),
        winding: if options.check_winding {
            CheckResult::fatal(winding_mismatches(mesh))
        } else {
            CheckResult::default()
        },
        references: CheckResult::fatal(dangling_references(mesh)),
        ring_size: CheckResult::fatal(
            mesh.faces()
                .filter(|(_, f)| !f.is_well_formed())
                .map(|(id, _)| id)
                .collect(),
        ),
        ring_edges: CheckResult::fatal(ring_edge_mismatches(mesh)),
        degenerate_edges: CheckResult::fatal(
            mesh.edges()
                .filter(|(_, e)| e.is_loop())
                .map(|(id, _)| id)
                .collect(),
        ),
        non_finite_positions: CheckResult::fatal(
            mesh.vertices()
                .filter(|(_, v)| !is_finite(&v.position))
                .map(|(id, _)| id)
                .collect(),
        ),
        duplicate_vertices: if options.check_duplicates && options.duplicate_tolerance > 0.0 {
            CheckResult::fatal(duplicate_vertex_groups(mesh, options.duplicate_tolerance))
        } else {
            CheckResult::default()
        },
        orphaned_vertices: CheckResult::warning(orphaned_vertices(mesh)),
        orphaned_edges: CheckResult::warning(orphaned_edges(mesh)),
        materials: CheckResult::fatal(
            mesh.faces()
                .filter(|(_, f)| f.material < 0)
                .map(|(id, _)| id)
                .collect(),
        ),
        missing_uvs: if options.check_uvs {
            CheckResult::fatal(
                mesh.vertices()
                    .filter(|(_, v)| v.attributes.uv.is_none())
                    .map(|(id, _)| id)
                    .collect(),
            )
        } else {
            CheckResult::default()
        },
        uvs_out_of_range: if options.check_uvs {
            CheckResult::warning(
                mesh.vertices()
                    .filter(|(_, v)| {
                        v.attributes.uv.is_some_and(|uv| {
                            !(0.0..=1.0).contains(&uv.x) || !(0.0..=1.0).contains(&uv.y)
                        })
                    })
                    .map(|(id, _)| id)
                    .collect(),
            )
        } else {
            CheckResult::default()
        },
        degenerate_faces: CheckResult::fatal(degenerate_faces(
            mesh,
            options.degenerate_area_threshold,
        )),
        boundary_edge_count: adjacency.boundary_edge_count(),
        non_manifold_edge_count: adjacency.non_manifold_edge_count(),
    };

    debug!(
        vertices = report.vertex_count,
        edges = report.edge_count,
        faces = report.face_count,
        valid = report.is_valid(),
        errors = report.error_count(),
        warnings = report.warning_count(),
        "Validated mesh integrity"
    );

    report
}

/// Faces whose ring winds against their stored normal.
///
/// A ring perpendicular to its stored normal counts as a mismatch.
///
/// The ring direction is the Newell normal over every corner, not the cross
/// product of the two sides leaving the first corner. The two agree on
/// convex rings; on a ring whose first corner is reflex the cross product
/// points the wrong way while the Newell normal still follows the winding.
fn winding_mismatches(mesh: &PolyMesh) -> Vec<FaceId> {
    winding_alignment(mesh)
        .into_iter()
        .filter(|&(_, dot)| dot <= 0.0)
        .map(|(id, _)| id)
        .collect()
}

/// Dot product of ring normal and stored normal for every face that has
/// both.
///
/// Faces without a stored normal, with a dead corner, or with a ring too
/// degenerate to have a direction are skipped.
pub(crate) fn winding_alignment(mesh: &PolyMesh) -> Vec<(FaceId, f64)> {
    mesh.faces()
        .filter_map(|(id, face)| {
            let stored = face.normal?;
            let ring = mesh.face_positions(id)?;
            let computed = newell_vector(&ring).try_normalize(GEOMETRY_EPSILON)?;
            Some((id, computed.dot(&stored)))
        })
        .collect()
}

fn dangling_references(mesh: &PolyMesh) -> Vec<DanglingRef> {
    let mut out = Vec::new();
    for (face_id, face) in mesh.faces() {
        for &vertex in &face.vertices {
            if !mesh.contains_vertex(vertex) {
                out.push(DanglingRef::FaceVertex { face: face_id, vertex });
            }
        }
        for &edge in &face.edges {
            if !mesh.contains_edge(edge) {
                out.push(DanglingRef::FaceEdge { face: face_id, edge });
            }
        }
    }
    for (edge_id, edge) in mesh.edges() {
        for vertex in [edge.v1, edge.v2] {
            if !mesh.contains_vertex(vertex) {
                out.push(DanglingRef::EdgeEndpoint { edge: edge_id, vertex });
            }
        }
    }
    out
}

/// Well-formed faces with a side not joined by the edge stored for it.
///
/// Dead edges are left to the reference check.
pub(crate) fn ring_edge_mismatches(mesh: &PolyMesh) -> Vec<FaceId> {
    mesh.faces()
        .filter(|(_, face)| face.is_well_formed())
        .filter(|(_, face)| {
            face.sides().zip(&face.edges).any(|((a, b), &e)| {
                mesh.edge(e)
                    .is_some_and(|edge| edge.is_loop() || edge.key() != EdgeKey::new(a, b))
            })
        })
        .map(|(id, _)| id)
        .collect()
}

#[allow(clippy::cast_possible_truncation)]
fn duplicate_vertex_groups(mesh: &PolyMesh, tolerance: f64) -> Vec<Vec<VertexId>> {
    let mut buckets: HashMap<(i64, i64, i64), Vec<VertexId>> = HashMap::new();
    for (id, v) in mesh.vertices().filter(|(_, v)| is_finite(&v.position)) {
        let p = v.position;
        let cell = (
            (p.x / tolerance).round() as i64,
            (p.y / tolerance).round() as i64,
            (p.z / tolerance).round() as i64,
        );
        buckets.entry(cell).or_default().push(id);
    }
    let mut groups: Vec<Vec<VertexId>> = buckets
        .into_values()
        .filter(|ids| ids.len() > 1)
        .map(|mut ids| {
            ids.sort_unstable();
            ids
        })
        .collect();
    groups.sort_unstable();
    groups
}

fn is_finite(p: &Point3<f64>) -> bool {
    p.coords.iter().all(|c| c.is_finite())
}

pub(crate) fn orphaned_vertices(mesh: &PolyMesh) -> Vec<VertexId> {
    let used: HashSet<VertexId> = mesh
        .faces()
        .flat_map(|(_, f)| f.vertices.iter().copied())
        .collect();
    mesh.vertices()
        .map(|(id, _)| id)
        .filter(|id| !used.contains(id))
        .collect()
}

pub(crate) fn orphaned_edges(mesh: &PolyMesh) -> Vec<EdgeId> {
    let used: HashSet<EdgeId> = mesh
        .faces()
        .flat_map(|(_, f)| f.edges.iter().copied())
        .collect();
    mesh.edges()
        .map(|(id, _)| id)
        .filter(|id| !used.contains(id))
        .collect()
}

/// Faces whose ring area is below `threshold`.
///
/// Faces with a dead corner are left to the reference check.
pub(crate) fn degenerate_faces(mesh: &PolyMesh, threshold: f64) -> Vec<FaceId> {
    mesh.face_ids()
        .into_iter()
        .filter(|&id| {
            mesh.face_positions(id)
                .is_some_and(|ring| ring.len() >= 3 && area(&ring) < threshold)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mesh_types::{unit_cube, Edge, Face, Point2, Vertex};

    fn triangle_with_uvs() -> PolyMesh {
        let mut mesh = PolyMesh::new();
        let a = mesh.add_vertex(Vertex::from_coords(0.0, 0.0, 0.0).with_uv(0.0, 0.0));
        let b = mesh.add_vertex(Vertex::from_coords(1.0, 0.0, 0.0).with_uv(1.0, 0.0));
        let c = mesh.add_vertex(Vertex::from_coords(0.0, 1.0, 0.0).with_uv(0.0, 1.0));
        mesh.add_polygon(&[a, b, c], 0);
        mesh
    }

    #[test]
    fn fresh_cube_has_no_issues() {
        let report = validate_integrity(&unit_cube());

        assert!(report.is_valid());
        assert_eq!(report.issue_count(), 0);
        assert_eq!(report.vertex_count, 8);
        assert_eq!(report.edge_count, 12);
        assert_eq!(report.face_count, 6);
        assert_eq!(report.boundary_edge_count, 0);
        assert!(report.is_watertight());
    }

    #[test]
    fn empty_mesh_is_valid() {
        let report = validate_integrity(&PolyMesh::new());

        assert!(report.is_valid());
        assert_eq!(report.issue_count(), 0);
    }

    #[test]
    fn flipped_normal_is_a_winding_mismatch() {
        let mut mesh = unit_cube();
        let top = mesh.face_ids()[1];
        mesh.face_mut(top).unwrap().reverse();

        let report = validate_integrity(&mesh);
        assert!(!report.is_valid());
        assert_eq!(report.winding.items, vec![top]);

        let relaxed = validate_integrity_with_options(
            &mesh,
            &ValidationOptions::default().with_check_winding(false),
        );
        assert!(relaxed.is_valid());
    }

    #[test]
    fn face_without_normal_is_not_checked_for_winding() {
        let report = validate_integrity(&triangle_with_uvs());
        assert!(report.winding.is_empty());
        assert!(report.is_valid());
    }

    #[test]
    fn removed_vertex_leaves_dangling_references() {
        let mut mesh = unit_cube();
        let v = mesh.vertex_ids()[0];
        mesh.remove_vertex(v);

        let report = validate_integrity(&mesh);
        assert!(!report.references.passed);
        // Three faces and three edges met at the corner.
        let faces = report
            .references
            .items
            .iter()
            .filter(|r| matches!(r, DanglingRef::FaceVertex { .. }))
            .count();
        let edges = report
            .references
            .items
            .iter()
            .filter(|r| matches!(r, DanglingRef::EdgeEndpoint { .. }))
            .count();
        assert_eq!((faces, edges), (3, 3));
    }

    #[test]
    fn short_ring_and_length_mismatch() {
        let mut mesh = triangle_with_uvs();
        let f = mesh.face_ids()[0];
        mesh.face_mut(f).unwrap().edges.pop();

        let report = validate_integrity(&mesh);
        assert_eq!(report.ring_size.items, vec![f]);
        assert!(!report.is_valid());
    }

    #[test]
    fn swapped_edges_are_inconsistent() {
        let mut mesh = triangle_with_uvs();
        let f = mesh.face_ids()[0];
        mesh.face_mut(f).unwrap().edges.swap(0, 1);

        let report = validate_integrity(&mesh);
        assert_eq!(report.ring_edges.items, vec![f]);
    }

    #[test]
    fn self_loop_is_degenerate_and_orphaned() {
        let mut mesh = triangle_with_uvs();
        let a = mesh.vertex_ids()[0];
        let e = mesh.add_edge(Edge::new(a, a));

        let report = validate_integrity(&mesh);
        assert_eq!(report.degenerate_edges.items, vec![e]);
        assert_eq!(report.orphaned_edges.items, vec![e]);
        assert!(!report.is_valid());
    }

    #[test]
    fn coincident_vertices_are_grouped() {
        let mut mesh = triangle_with_uvs();
        let a = mesh.vertex_ids()[0];
        let twin = mesh.add_vertex(Vertex::from_coords(0.0, 0.0, 1e-9).with_uv(0.0, 0.0));

        let report = validate_integrity(&mesh);
        assert_eq!(report.duplicate_vertices.items, vec![vec![a, twin]]);
        assert!(!report.duplicate_vertices.passed);
    }

    #[test]
    fn nan_position_is_reported_apart_from_duplicates() {
        let mut mesh = triangle_with_uvs();
        let lost = mesh.add_vertex(Vertex::from_coords(f64::NAN, 0.0, 0.0).with_uv(0.0, 0.0));
        let far =
            mesh.add_vertex(Vertex::from_coords(0.0, f64::INFINITY, 0.0).with_uv(0.0, 0.0));

        let report = validate_integrity(&mesh);
        assert_eq!(report.non_finite_positions.items, vec![lost, far]);
        assert!(!report.non_finite_positions.passed);
        // The origin corner is not its twin.
        assert!(report.duplicate_vertices.is_empty());
        assert!(!report.is_valid());
        assert!(report.to_string().contains("Non-finite positions: 2"));
    }

    #[test]
    fn reflex_first_corner_keeps_its_winding() {
        let mut mesh = PolyMesh::new();
        // L shape, counter-clockwise about +Z, starting at its reflex corner.
        let corners = [(1.0, 1.0), (1.0, 2.0), (0.0, 2.0), (0.0, 0.0), (2.0, 0.0), (2.0, 1.0)];
        let ring: Vec<VertexId> = corners
            .iter()
            .map(|&(x, y)| mesh.add_vertex(Vertex::from_coords(x, y, 0.0).with_uv(0.0, 0.0)))
            .collect();
        let f = mesh.add_polygon(&ring, 0).unwrap();
        mesh.face_mut(f).unwrap().normal = Some(mesh_types::Vector3::new(0.0, 0.0, 1.0));

        let report = validate_integrity(&mesh);
        assert!(report.winding.is_empty());
        assert!(report.is_valid(), "{report}");

        mesh.face_mut(f).unwrap().normal = Some(mesh_types::Vector3::new(0.0, 0.0, -1.0));
        assert_eq!(validate_integrity(&mesh).winding.items, vec![f]);
    }

    #[test]
    fn orphans_only_warn() {
        let mut mesh = triangle_with_uvs();
        let lone = mesh.add_vertex(Vertex::from_coords(5.0, 5.0, 5.0).with_uv(0.5, 0.5));

        let report = validate_integrity(&mesh);
        assert_eq!(report.orphaned_vertices.items, vec![lone]);
        assert!(report.is_valid());
        assert_eq!(report.warning_count(), 1);
        assert_eq!(report.error_count(), 0);
    }

    #[test]
    fn negative_material_fails() {
        let mut mesh = triangle_with_uvs();
        let f = mesh.face_ids()[0];
        mesh.set_material(f, -2);

        let report = validate_integrity(&mesh);
        assert_eq!(report.materials.items, vec![f]);
        assert!(!report.is_valid());
    }

    #[test]
    fn uv_checks() {
        let mut mesh = triangle_with_uvs();
        let ids = mesh.vertex_ids();
        mesh.set_uv(ids[0], None);
        mesh.set_uv(ids[1], Some(Point2::new(1.5, 0.0)));

        let report = validate_integrity(&mesh);
        assert_eq!(report.missing_uvs.items, vec![ids[0]]);
        assert_eq!(report.uvs_out_of_range.items, vec![ids[1]]);
        assert!(!report.missing_uvs.passed);
        assert!(report.uvs_out_of_range.passed);

        mesh.set_uv(ids[0], Some(Point2::new(0.0, 0.0)));
        assert!(validate_integrity(&mesh).is_valid());
    }

    #[test]
    fn collinear_face_is_degenerate() {
        let mut mesh = PolyMesh::new();
        let ids: Vec<VertexId> = [0.0, 1.0, 2.0]
            .iter()
            .map(|&x| mesh.add_vertex(Vertex::from_coords(x, 0.0, 0.0).with_uv(0.0, 0.0)))
            .collect();
        let f = mesh.add_polygon(&ids, 0).unwrap();

        let report = validate_integrity(&mesh);
        assert_eq!(report.degenerate_faces.items, vec![f]);
        // No direction, so no winding verdict.
        assert!(report.winding.is_empty());
    }

    #[test]
    fn hand_built_face_is_checked_like_any_other() {
        let mut mesh = triangle_with_uvs();
        let ids = mesh.vertex_ids();
        let edges = mesh.edge_ids();
        let f = mesh.add_face(
            Face::new(vec![ids[0], ids[2], ids[1]], vec![edges[2], edges[1], edges[0]])
                .with_normal(mesh_types::Vector3::new(0.0, 0.0, 1.0)),
        );

        let report = validate_integrity(&mesh);
        assert_eq!(report.winding.items, vec![f]);
        assert!(report.ring_edges.is_empty());
        assert_eq!(report.non_manifold_edge_count, 0);
        assert_eq!(report.boundary_edge_count, 0);
    }

    #[test]
    fn display_lists_failing_categories() {
        let mut mesh = unit_cube();
        let top = mesh.face_ids()[1];
        mesh.face_mut(top).unwrap().reverse();
        mesh.add_vertex(Vertex::from_coords(3.0, 3.0, 3.0).with_uv(0.0, 0.0));

        let text = validate_integrity(&mesh).to_string();
        assert!(text.contains("Valid: No"));
        assert!(text.contains("Winding mismatches: 1"));
        assert!(text.contains("Orphaned vertices: 1 (warning)"));
    }
}
