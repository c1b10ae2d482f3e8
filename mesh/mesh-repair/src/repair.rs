//! Best-effort mesh repair.
//!
//! Every step is a free function that fixes one class of problem and
//! returns how many entities it changed. [`repair_mesh`] runs the enabled
//! steps in a fixed order between two validation passes.

use std::fmt;

use hashbrown::{HashMap, HashSet};
use mesh_types::{
    merge_coincident_vertices, newell_normal, EdgeId, EdgeKey, FaceId, MergeReport, MeshBounds,
    PolyMesh, VertexId, Vector3,
};
use tracing::{debug, info, warn};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{check_non_negative, RepairResult};
use crate::validate::{
    degenerate_faces, orphaned_edges, orphaned_vertices, ring_edge_mismatches,
    validate_integrity_with_options, winding_alignment, IntegrityReport, ValidationOptions,
};

/// Configuration for [`repair_mesh`].
///
/// Each step can be switched off on its own. Tolerances are in mesh units.
///
/// # Example
///
/// ```
/// use mesh_repair::RepairParams;
///
/// let params = RepairParams::default()
///     .with_merge_tolerance(1e-4)
///     .with_remove_orphans(true);
/// assert!(params.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RepairParams {
    /// Remove faces naming dead vertices, repeating a vertex or with fewer
    /// than three corners. Default: `true`
    pub remove_invalid_faces: bool,

    /// Remove self-loop edges and edges with a dead endpoint.
    /// Default: `true`
    pub remove_invalid_edges: bool,

    /// Fold duplicate edges into the first live one. Default: `true`
    pub remove_duplicate_edges: bool,

    /// Re-derive edge rings that do not match their vertex rings.
    /// Default: `true`
    pub rebuild_face_edges: bool,

    /// Merge coincident vertices. Default: `true`
    pub merge_duplicates: bool,

    /// Distance under which vertices are merged. Default: `1e-6`
    pub merge_tolerance: f64,

    /// Remove faces with area below [`Self::degenerate_area_threshold`].
    /// Default: `true`
    pub remove_degenerate_faces: bool,

    /// Area below which a face is degenerate. Default: `1e-12`
    pub degenerate_area_threshold: f64,

    /// Reverse rings that wind against their stored normal. Default: `true`
    pub fix_winding: bool,

    /// Overwrite face normals with the ring normal. Default: `false`
    pub recalculate_normals: bool,

    /// Set vertex normals from the faces around them. Default: `false`
    pub recalculate_vertex_normals: bool,

    /// Give vertices without a UV a planar projection. Default: `true`
    pub generate_uvs: bool,

    /// Raise negative material indices to 0. Default: `true`
    pub clamp_materials: bool,

    /// Remove vertices and edges no face uses. Default: `false`
    pub remove_orphans: bool,

    /// Options for the validation passes before and after repair.
    pub validation: ValidationOptions,
}

impl Default for RepairParams {
    fn default() -> Self {
        Self {
            remove_invalid_faces: true,
            remove_invalid_edges: true,
            remove_duplicate_edges: true,
            rebuild_face_edges: true,
            merge_duplicates: true,
            merge_tolerance: 1e-6,
            remove_degenerate_faces: true,
            degenerate_area_threshold: 1e-12,
            fix_winding: true,
            recalculate_normals: false,
            recalculate_vertex_normals: false,
            generate_uvs: true,
            clamp_materials: true,
            remove_orphans: false,
            validation: ValidationOptions::default(),
        }
    }
}

impl RepairParams {
    /// Params for meshes arriving from an importer.
    ///
    /// Runs every step, rebuilds all normals and drops orphans.
    #[must_use]
    pub fn for_import() -> Self {
        Self {
            recalculate_normals: true,
            recalculate_vertex_normals: true,
            remove_orphans: true,
            merge_tolerance: 1e-5,
            ..Default::default()
        }
    }

    /// Params for meshes in the middle of an editing session.
    ///
    /// Only structural fixes; geometry, normals and attributes are left as
    /// the author made them.
    #[must_use]
    pub fn for_authoring() -> Self {
        Self {
            merge_duplicates: false,
            remove_degenerate_faces: false,
            generate_uvs: false,
            clamp_materials: false,
            ..Default::default()
        }
    }

    /// Check tolerances and thresholds.
    ///
    /// # Errors
    ///
    /// Returns [`RepairError::InvalidParameter`](crate::RepairError::InvalidParameter)
    /// for a negative or non-finite tolerance.
    pub fn validate(&self) -> RepairResult<()> {
        check_non_negative("merge_tolerance", self.merge_tolerance)?;
        check_non_negative("degenerate_area_threshold", self.degenerate_area_threshold)?;
        Ok(())
    }

    /// Set the vertex merge distance.
    #[must_use]
    pub fn with_merge_tolerance(mut self, tolerance: f64) -> Self {
        self.merge_tolerance = tolerance;
        self
    }

    /// Set the degenerate-face area threshold.
    #[must_use]
    pub fn with_degenerate_area_threshold(mut self, threshold: f64) -> Self {
        self.degenerate_area_threshold = threshold;
        self
    }

    /// Enable or disable vertex merging.
    #[must_use]
    pub fn with_merge_duplicates(mut self, merge: bool) -> Self {
        self.merge_duplicates = merge;
        self
    }

    /// Enable or disable winding repair.
    #[must_use]
    pub fn with_fix_winding(mut self, fix: bool) -> Self {
        self.fix_winding = fix;
        self
    }

    /// Enable or disable face and vertex normal recomputation.
    #[must_use]
    pub fn with_recalculate_normals(mut self, recalculate: bool) -> Self {
        self.recalculate_normals = recalculate;
        self.recalculate_vertex_normals = recalculate;
        self
    }

    /// Enable or disable UV generation.
    #[must_use]
    pub fn with_generate_uvs(mut self, generate: bool) -> Self {
        self.generate_uvs = generate;
        self
    }

    /// Enable or disable orphan removal.
    #[must_use]
    pub fn with_remove_orphans(mut self, remove: bool) -> Self {
        self.remove_orphans = remove;
        self
    }

    /// Set the validation options used before and after repair.
    #[must_use]
    pub fn with_validation(mut self, options: ValidationOptions) -> Self {
        self.validation = options;
        self
    }
}

// =============================================================================
// Steps
// =============================================================================

/// Remove faces whose vertex ring cannot be a face.
///
/// A ring is invalid when it has fewer than three corners, repeats a
/// vertex, or names a vertex that is not live.
pub fn remove_invalid_faces(mesh: &mut PolyMesh) -> usize {
    let doomed: Vec<FaceId> = mesh
        .faces()
        .filter(|(_, f)| !mesh.is_valid_ring(&f.vertices))
        .map(|(id, _)| id)
        .collect();
    for &id in &doomed {
        mesh.remove_face(id);
    }
    if !doomed.is_empty() {
        debug!(removed = doomed.len(), "Removed invalid faces");
    }
    doomed.len()
}

/// Remove self-loop edges and edges with a dead endpoint.
///
/// Faces still naming a removed edge are left for
/// [`rebuild_face_edges`].
pub fn remove_invalid_edges(mesh: &mut PolyMesh) -> usize {
    let doomed: Vec<EdgeId> = mesh
        .edges()
        .filter(|(_, e)| {
            e.is_loop() || !mesh.contains_vertex(e.v1) || !mesh.contains_vertex(e.v2)
        })
        .map(|(id, _)| id)
        .collect();
    for &id in &doomed {
        mesh.remove_edge(id);
    }
    if !doomed.is_empty() {
        debug!(removed = doomed.len(), "Removed invalid edges");
    }
    doomed.len()
}

/// Fold edges joining the same pair of vertices into the lowest id.
///
/// Face edge rings are redirected before the duplicates are removed.
///
/// # Example
///
/// ```
/// use mesh_repair::remove_duplicate_edges;
/// use mesh_types::{unit_cube, Edge};
///
/// let mut cube = unit_cube();
/// let first = *cube.edge(cube.edge_ids()[0]).unwrap();
/// cube.add_edge(Edge::new(first.v2, first.v1));
///
/// assert_eq!(remove_duplicate_edges(&mut cube), 1);
/// assert_eq!(cube.edge_count(), 12);
/// ```
pub fn remove_duplicate_edges(mesh: &mut PolyMesh) -> usize {
    let mut keep: HashMap<EdgeKey, EdgeId> = HashMap::new();
    let mut redirect: HashMap<EdgeId, EdgeId> = HashMap::new();
    for (id, edge) in mesh.edges() {
        if edge.is_loop() {
            continue;
        }
        match keep.get(&edge.key()) {
            Some(&first) => {
                redirect.insert(id, first);
            }
            None => {
                keep.insert(edge.key(), id);
            }
        }
    }
    if redirect.is_empty() {
        return 0;
    }

    mesh.remap_edge_refs(&redirect);
    for &id in redirect.keys() {
        mesh.remove_edge(id);
    }
    debug!(removed = redirect.len(), "Removed duplicate edges");
    redirect.len()
}

/// Re-derive edge rings that do not match their vertex rings.
///
/// A face is rebuilt when its rings differ in length, it names a dead edge,
/// or one of its edges does not join the corners it sits between. Faces
/// with an invalid vertex ring are skipped.
pub fn rebuild_face_edges(mesh: &mut PolyMesh) -> usize {
    let mut stale: HashSet<FaceId> = ring_edge_mismatches(mesh).into_iter().collect();
    stale.extend(
        mesh.faces()
            .filter(|(_, f)| {
                !f.is_well_formed() || f.edges.iter().any(|&e| !mesh.contains_edge(e))
            })
            .map(|(id, _)| id),
    );
    let mut stale: Vec<FaceId> = stale.into_iter().collect();
    stale.sort_unstable();

    let rebuilt = stale
        .into_iter()
        .filter(|&id| mesh.rebuild_face_edges(id))
        .count();
    if rebuilt > 0 {
        debug!(rebuilt, "Rebuilt face edge rings");
    }
    rebuilt
}

/// Merge vertices closer than `tolerance`.
///
/// Uses the same merge as connected inset; faces that collapse are removed
/// and duplicate edges folded.
pub fn merge_duplicate_vertices(mesh: &mut PolyMesh, tolerance: f64) -> MergeReport {
    merge_coincident_vertices(mesh, tolerance)
}

/// Remove faces with ring area below `threshold`.
///
/// # Example
///
/// ```
/// use mesh_repair::remove_degenerate_faces;
/// use mesh_types::{PolyMesh, Vertex};
///
/// let mut mesh = PolyMesh::new();
/// let a = mesh.add_vertex(Vertex::from_coords(0.0, 0.0, 0.0));
/// let b = mesh.add_vertex(Vertex::from_coords(5.0, 0.0, 0.0));
/// let c = mesh.add_vertex(Vertex::from_coords(10.0, 0.0, 0.0)); // Collinear
/// mesh.add_polygon(&[a, b, c], 0);
///
/// assert_eq!(remove_degenerate_faces(&mut mesh, 1e-9), 1);
/// ```
pub fn remove_degenerate_faces(mesh: &mut PolyMesh, threshold: f64) -> usize {
    let doomed = degenerate_faces(mesh, threshold);
    for &id in &doomed {
        mesh.remove_face(id);
    }
    if !doomed.is_empty() {
        debug!(removed = doomed.len(), threshold, "Removed degenerate faces");
    }
    doomed.len()
}

/// Reverse every face whose ring winds against its stored normal.
///
/// The edge ring is reversed with the vertex ring so the two stay parallel.
/// Rings perpendicular to their normal are left alone, since reversing
/// them would not help. Running it twice changes nothing the second time.
///
/// # Example
///
/// ```
/// use mesh_repair::fix_winding_order;
/// use mesh_types::unit_cube;
///
/// let mut cube = unit_cube();
/// let top = cube.face_ids()[1];
/// cube.face_mut(top).unwrap().reverse();
///
/// assert_eq!(fix_winding_order(&mut cube), 1);
/// assert_eq!(fix_winding_order(&mut cube), 0);
/// ```
pub fn fix_winding_order(mesh: &mut PolyMesh) -> usize {
    let flipped: Vec<FaceId> = winding_alignment(mesh)
        .into_iter()
        .filter(|&(_, dot)| dot < 0.0)
        .map(|(id, _)| id)
        .collect();
    for &id in &flipped {
        if let Some(face) = mesh.face_mut(id) {
            face.reverse();
        }
    }
    if !flipped.is_empty() {
        debug!(flipped = flipped.len(), "Fixed winding order");
    }
    flipped.len()
}

/// Set every face normal from its ring.
///
/// Faces too degenerate to have a normal keep the one they had.
pub fn recalculate_normals(mesh: &mut PolyMesh) -> usize {
    let computed: Vec<(FaceId, Vector3<f64>)> = mesh
        .face_ids()
        .into_iter()
        .filter_map(|id| {
            let ring = mesh.face_positions(id)?;
            newell_normal(&ring).map(|n| (id, n))
        })
        .collect();
    for &(id, n) in &computed {
        if let Some(face) = mesh.face_mut(id) {
            face.normal = Some(n);
        }
    }
    debug!(faces = computed.len(), "Recalculated face normals");
    computed.len()
}

/// Set every vertex normal to the average of the faces around it.
///
/// Stored face normals are used where present, ring normals otherwise.
/// Vertices no face uses, or whose faces cancel out, are left alone.
pub fn recalculate_vertex_normals(mesh: &mut PolyMesh) -> usize {
    let mut sums: HashMap<VertexId, Vector3<f64>> = HashMap::new();
    for (id, face) in mesh.faces() {
        let normal = face.normal.or_else(|| {
            mesh.face_positions(id)
                .and_then(|ring| newell_normal(&ring))
        });
        let Some(normal) = normal else { continue };
        for &v in &face.vertices {
            *sums.entry(v).or_insert_with(Vector3::zeros) += normal;
        }
    }

    let mut updated = 0;
    for (v, sum) in sums {
        let Some(n) = sum.try_normalize(mesh_types::GEOMETRY_EPSILON) else {
            continue;
        };
        if let Some(vertex) = mesh.vertex_mut(v) {
            vertex.attributes.normal = Some(n);
            updated += 1;
        }
    }
    debug!(vertices = updated, "Recalculated vertex normals");
    updated
}

/// Give every vertex without a UV a planar projection.
///
/// Positions are projected onto the two largest axes of the mesh bounding
/// box and normalized to [0, 1]. Existing UVs are kept.
///
/// # Example
///
/// ```
/// use mesh_repair::generate_default_uvs;
/// use mesh_types::{PolyMesh, Vertex};
///
/// let mut mesh = PolyMesh::new();
/// let a = mesh.add_vertex(Vertex::from_coords(0.0, 0.0, 0.0));
/// let b = mesh.add_vertex(Vertex::from_coords(4.0, 0.0, 0.0));
/// let c = mesh.add_vertex(Vertex::from_coords(4.0, 2.0, 0.0));
/// mesh.add_polygon(&[a, b, c], 0);
///
/// assert_eq!(generate_default_uvs(&mut mesh), 3);
/// let uv = mesh.vertex(c).unwrap().attributes.uv.unwrap();
/// assert_eq!((uv.x, uv.y), (1.0, 1.0));
/// ```
pub fn generate_default_uvs(mesh: &mut PolyMesh) -> usize {
    let missing: Vec<VertexId> = mesh
        .vertices()
        .filter(|(_, v)| v.attributes.uv.is_none())
        .map(|(id, _)| id)
        .collect();
    if missing.is_empty() {
        return 0;
    }

    let bounds = mesh.bounds();
    for &id in &missing {
        if let Some(p) = mesh.position(id) {
            mesh.set_uv(id, Some(bounds.project_uv(&p)));
        }
    }
    debug!(generated = missing.len(), "Generated default UVs");
    missing.len()
}

/// Raise negative material indices to 0.
pub fn clamp_materials(mesh: &mut PolyMesh) -> usize {
    let negative: Vec<FaceId> = mesh
        .faces()
        .filter(|(_, f)| f.material < 0)
        .map(|(id, _)| id)
        .collect();
    for &id in &negative {
        mesh.set_material(id, 0);
    }
    negative.len()
}

/// Remove edges no face uses, then vertices no face or edge uses.
///
/// Returns `(vertices_removed, edges_removed)`.
pub fn remove_orphans(mesh: &mut PolyMesh) -> (usize, usize) {
    let edges = orphaned_edges(mesh);
    for &id in &edges {
        mesh.remove_edge(id);
    }

    let endpoints: HashSet<VertexId> = mesh.edges().flat_map(|(_, e)| [e.v1, e.v2]).collect();
    let vertices: Vec<VertexId> = orphaned_vertices(mesh)
        .into_iter()
        .filter(|v| !endpoints.contains(v))
        .collect();
    for &id in &vertices {
        mesh.remove_vertex(id);
    }

    if !edges.is_empty() || !vertices.is_empty() {
        debug!(
            vertices = vertices.len(),
            edges = edges.len(),
            "Removed orphans"
        );
    }
    (vertices.len(), edges.len())
}

// =============================================================================
// Pipeline
// =============================================================================

/// Validate, run every enabled step, and validate again.
///
/// Steps run in this order:
/// 1. Remove invalid faces and edges
/// 2. Fold duplicate edges and rebuild stale edge rings
/// 3. Merge coincident vertices and remove degenerate faces
/// 4. Fix winding, then recompute face and vertex normals
/// 5. Generate missing UVs and clamp materials
/// 6. Remove orphans
///
/// Never fails. A step whose tolerance is invalid is skipped with a warning.
///
/// # Example
///
/// ```
/// use mesh_repair::{repair_mesh, RepairParams};
/// use mesh_types::unit_cube;
///
/// let mut cube = unit_cube();
/// let top = cube.face_ids()[1];
/// cube.face_mut(top).unwrap().reverse();
///
/// let summary = repair_mesh(&mut cube, &RepairParams::default());
/// assert_eq!(summary.faces_flipped, 1);
/// assert!(!summary.before.is_valid());
/// assert!(summary.fully_valid);
/// ```
#[must_use = "the summary reports whether the mesh ended up valid"]
pub fn repair_mesh(mesh: &mut PolyMesh, params: &RepairParams) -> RepairSummary {
    let before = validate_integrity_with_options(mesh, &params.validation);
    let mut summary = RepairSummary::default();

    if params.remove_invalid_faces {
        summary.invalid_faces_removed = remove_invalid_faces(mesh);
    }
    if params.remove_invalid_edges {
        summary.invalid_edges_removed = remove_invalid_edges(mesh);
    }
    if params.remove_duplicate_edges {
        summary.duplicate_edges_removed = remove_duplicate_edges(mesh);
    }
    if params.rebuild_face_edges {
        summary.face_edges_rebuilt = rebuild_face_edges(mesh);
    }
    if params.merge_duplicates {
        match check_non_negative("merge_tolerance", params.merge_tolerance) {
            Ok(()) => {
                let merge = merge_duplicate_vertices(mesh, params.merge_tolerance);
                summary.vertices_merged = merge.merged_vertices;
                summary.faces_collapsed = merge.removed_faces;
                summary.duplicate_edges_removed += merge.removed_edges;
            }
            Err(err) => warn!(%err, "Skipping vertex merge"),
        }
    }
    if params.remove_degenerate_faces {
        match check_non_negative("degenerate_area_threshold", params.degenerate_area_threshold) {
            Ok(()) => {
                summary.degenerate_faces_removed =
                    remove_degenerate_faces(mesh, params.degenerate_area_threshold);
            }
            Err(err) => warn!(%err, "Skipping degenerate face removal"),
        }
    }
    if params.fix_winding {
        summary.faces_flipped = fix_winding_order(mesh);
    }
    if params.recalculate_normals {
        summary.normals_recalculated = recalculate_normals(mesh);
    }
    if params.recalculate_vertex_normals {
        summary.vertex_normals_recalculated = recalculate_vertex_normals(mesh);
    }
    if params.generate_uvs {
        summary.uvs_generated = generate_default_uvs(mesh);
    }
    if params.clamp_materials {
        summary.materials_clamped = clamp_materials(mesh);
    }
    if params.remove_orphans {
        let (vertices, edges) = remove_orphans(mesh);
        summary.orphaned_vertices_removed = vertices;
        summary.orphaned_edges_removed = edges;
    }

    let after = validate_integrity_with_options(mesh, &params.validation);
    summary.fully_valid = after.is_valid();

    info!(
        errors_before = before.error_count(),
        errors_after = after.error_count(),
        fully_valid = summary.fully_valid,
        changed = summary.had_changes(),
        "Repaired mesh"
    );

    summary.before = before;
    summary.after = after;
    summary
}

/// What [`repair_mesh`] changed.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RepairSummary {
    /// Faces removed for an invalid vertex ring.
    pub invalid_faces_removed: usize,
    /// Self-loop edges and edges with a dead endpoint removed.
    pub invalid_edges_removed: usize,
    /// Duplicate edges folded away, including those left by merging.
    pub duplicate_edges_removed: usize,
    /// Faces whose edge ring was re-derived.
    pub face_edges_rebuilt: usize,
    /// Vertices merged into a coincident neighbour.
    pub vertices_merged: usize,
    /// Faces removed because merging collapsed them.
    pub faces_collapsed: usize,
    /// Faces removed for near-zero area.
    pub degenerate_faces_removed: usize,
    /// Faces whose winding was reversed.
    pub faces_flipped: usize,
    /// Face normals recomputed.
    pub normals_recalculated: usize,
    /// Vertex normals recomputed.
    pub vertex_normals_recalculated: usize,
    /// Vertices given a default UV.
    pub uvs_generated: usize,
    /// Faces whose material was raised to 0.
    pub materials_clamped: usize,
    /// Orphaned vertices removed.
    pub orphaned_vertices_removed: usize,
    /// Orphaned edges removed.
    pub orphaned_edges_removed: usize,

    /// Validation before any step ran.
    pub before: IntegrityReport,
    /// Validation after the last step.
    pub after: IntegrityReport,
    /// Whether `after` is valid.
    pub fully_valid: bool,
}

impl RepairSummary {
    /// Whether any step changed the mesh.
    #[must_use]
    pub const fn had_changes(&self) -> bool {
        self.invalid_faces_removed > 0
            || self.invalid_edges_removed > 0
            || self.duplicate_edges_removed > 0
            || self.face_edges_rebuilt > 0
            || self.vertices_merged > 0
            || self.faces_collapsed > 0
            || self.degenerate_faces_removed > 0
            || self.faces_flipped > 0
            || self.normals_recalculated > 0
            || self.vertex_normals_recalculated > 0
            || self.uvs_generated > 0
            || self.materials_clamped > 0
            || self.orphaned_vertices_removed > 0
            || self.orphaned_edges_removed > 0
    }

    /// Faces removed by any step.
    #[must_use]
    pub const fn faces_removed(&self) -> usize {
        self.invalid_faces_removed + self.faces_collapsed + self.degenerate_faces_removed
    }
}

impl fmt::Display for RepairSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Repair: {} faces removed, {} flipped, {} edges rebuilt, {} verts merged, {} UVs, {} orphans; valid: {}",
            self.faces_removed(),
            self.faces_flipped,
            self.face_edges_rebuilt,
            self.vertices_merged,
            self.uvs_generated,
            self.orphaned_vertices_removed + self.orphaned_edges_removed,
            if self.fully_valid { "yes" } else { "no" }
        )
    }
}
