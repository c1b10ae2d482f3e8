//! Coincident-vertex merging.
//!
//! Shared by the inset operation and the repair engine. The merge is
//! computed first (union-find over a spatial hash), then applied to every
//! edge and face in one pass, and only then are degenerate leftovers
//! cleaned up.

use hashbrown::{HashMap, HashSet};
use nalgebra::Point3;
use tracing::debug;

use crate::{EdgeId, EdgeKey, PolyMesh, VertexId};

/// What a merge pass changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// Vertices folded into another vertex and removed.
    pub merged_vertices: usize,
    /// Edges removed because they collapsed or duplicated another edge.
    pub removed_edges: usize,
    /// Faces removed because their ring collapsed below three corners.
    pub removed_faces: usize,
}

impl MergeReport {
    /// Whether the pass changed nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.merged_vertices == 0 && self.removed_edges == 0 && self.removed_faces == 0
    }
}

/// Merge every pair of live vertices closer than `tolerance`.
///
/// The lowest id in each cluster survives and keeps its attributes.
///
/// # Example
///
/// ```
/// use mesh_types::{merge_coincident_vertices, PolyMesh, Vertex, MeshTopology};
///
/// let mut mesh = PolyMesh::new();
/// let a = mesh.add_vertex(Vertex::from_coords(0.0, 0.0, 0.0));
/// let b = mesh.add_vertex(Vertex::from_coords(1.0, 0.0, 0.0));
/// let c = mesh.add_vertex(Vertex::from_coords(0.0, 1.0, 0.0));
/// let c2 = mesh.add_vertex(Vertex::from_coords(0.0, 1.0, 1e-9));
/// let d = mesh.add_vertex(Vertex::from_coords(-1.0, 1.0, 0.0));
/// mesh.add_polygon(&[a, b, c], 0);
/// mesh.add_polygon(&[a, c2, d], 0);
///
/// let report = merge_coincident_vertices(&mut mesh, 1e-6);
/// assert_eq!(report.merged_vertices, 1);
/// assert_eq!(mesh.vertex_count(), 4);
/// assert_eq!(mesh.edge_count(), 5);
/// ```
pub fn merge_coincident_vertices(mesh: &mut PolyMesh, tolerance: f64) -> MergeReport {
    let candidates = mesh.vertex_ids();
    merge_vertices_among(mesh, &candidates, tolerance)
}

/// Like [`merge_coincident_vertices`], restricted to `candidates`.
///
/// Vertices outside the candidate list are never merged, even when they are
/// coincident with one another.
pub fn merge_vertices_among(
    mesh: &mut PolyMesh,
    candidates: &[VertexId],
    tolerance: f64,
) -> MergeReport {
    let map = cluster(mesh, candidates, tolerance);
    if map.is_empty() {
        return MergeReport::default();
    }

    mesh.remap_vertex_refs(&map);

    let mut report = MergeReport {
        merged_vertices: map.len(),
        ..MergeReport::default()
    };
    report.removed_faces = collapse_faces(mesh);
    report.removed_edges = collapse_edges(mesh);

    for &gone in map.keys() {
        mesh.remove_vertex(gone);
    }

    debug!(
        merged = report.merged_vertices,
        edges_removed = report.removed_edges,
        faces_removed = report.removed_faces,
        tolerance,
        "Merged coincident vertices"
    );
    report
}

/// Map from every merged vertex to its cluster representative.
fn cluster(
    mesh: &PolyMesh,
    candidates: &[VertexId],
    tolerance: f64,
) -> HashMap<VertexId, VertexId> {
    let tolerance = tolerance.max(0.0);
    let cell_size = (tolerance * 2.0).max(f64::EPSILON);

    let mut seen: HashSet<VertexId> = HashSet::with_capacity(candidates.len());
    let points: Vec<(VertexId, Point3<f64>)> = candidates
        .iter()
        .filter(|&&v| seen.insert(v))
        .filter_map(|&v| mesh.position(v).map(|p| (v, p)))
        .collect();

    let mut grid: HashMap<(i64, i64, i64), Vec<usize>> = HashMap::new();
    for (i, (_, p)) in points.iter().enumerate() {
        grid.entry(cell_of(p, cell_size)).or_default().push(i);
    }

    let mut parent: Vec<usize> = (0..points.len()).collect();
    for (i, (_, p)) in points.iter().enumerate() {
        let (cx, cy, cz) = cell_of(p, cell_size);
        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    let Some(bucket) = grid.get(&(cx + dx, cy + dy, cz + dz)) else {
                        continue;
                    };
                    for &j in bucket {
                        if j > i && (points[j].1 - p).norm() <= tolerance {
                            union(&mut parent, i, j, &points);
                        }
                    }
                }
            }
        }
    }

    let mut map = HashMap::new();
    for i in 0..points.len() {
        let root = find(&mut parent, i);
        let (v, keep) = (points[i].0, points[root].0);
        if v != keep {
            map.insert(v, keep);
        }
    }
    map
}

fn find(parent: &mut [usize], mut i: usize) -> usize {
    while parent[i] != i {
        parent[i] = parent[parent[i]];
        i = parent[i];
    }
    i
}

/// Union keeping the smaller vertex id as root.
fn union(parent: &mut [usize], a: usize, b: usize, points: &[(VertexId, Point3<f64>)]) {
    let ra = find(parent, a);
    let rb = find(parent, b);
    if ra == rb {
        return;
    }
    if points[ra].0 < points[rb].0 {
        parent[rb] = ra;
    } else {
        parent[ra] = rb;
    }
}

#[allow(clippy::cast_possible_truncation)]
fn cell_of(p: &Point3<f64>, cell_size: f64) -> (i64, i64, i64) {
    (
        (p.x / cell_size).floor() as i64,
        (p.y / cell_size).floor() as i64,
        (p.z / cell_size).floor() as i64,
    )
}

/// Drop repeated corners from every ring; remove faces that fall below three
/// corners or still repeat a vertex.
fn collapse_faces(mesh: &mut PolyMesh) -> usize {
    let mut removed = 0;
    for id in mesh.face_ids() {
        let Some(face) = mesh.face(id) else { continue };
        let mut ring: Vec<VertexId> = Vec::with_capacity(face.len());
        for &v in &face.vertices {
            if ring.last() != Some(&v) {
                ring.push(v);
            }
        }
        while ring.len() > 1 && ring.first() == ring.last() {
            ring.pop();
        }
        if ring == face.vertices && mesh.is_valid_ring(&ring) {
            continue;
        }
        if !mesh.replace_face_ring(id, ring) {
            mesh.remove_face(id);
            removed += 1;
        }
    }
    removed
}

/// Remove self-loop edges and fold duplicate edges into the first live one.
fn collapse_edges(mesh: &mut PolyMesh) -> usize {
    let mut keep: HashMap<EdgeKey, EdgeId> = HashMap::new();
    let mut redirect: HashMap<EdgeId, EdgeId> = HashMap::new();
    let mut doomed: Vec<EdgeId> = Vec::new();

    for (id, edge) in mesh.edges() {
        if edge.is_loop() {
            doomed.push(id);
            continue;
        }
        match keep.get(&edge.key()) {
            Some(&first) => {
                redirect.insert(id, first);
                doomed.push(id);
            }
            None => {
                keep.insert(edge.key(), id);
            }
        }
    }

    mesh.remap_edge_refs(&redirect);
    for &id in &doomed {
        mesh.remove_edge(id);
    }
    doomed.len()
}
