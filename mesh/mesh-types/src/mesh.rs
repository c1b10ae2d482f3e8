//! Polygon mesh store.

use hashbrown::HashMap;
use nalgebra::{Point2, Point3, Vector3};
use tracing::debug;

use crate::journal::{diff_slots, EditLog, Journal};
use crate::{Aabb, Edge, EdgeId, EdgeKey, Face, FaceId, MeshBounds, MeshTopology, Vertex, VertexId};

/// An index-based polygon mesh.
///
/// The store owns three independent tables: vertices, edges and faces.
/// Faces and edges refer to other entities by id only; a reference to a
/// removed or never-allocated slot is a condition that validation reports,
/// not something the type system prevents.
///
/// # Stable ids
///
/// Removal leaves a tombstone. Slots are never reused, so every id handed
/// out by an `add_*` call keeps naming the same entity until that entity is
/// removed. [`PolyMesh::compact`] is the only operation that renumbers, and
/// it returns the remap table.
///
/// # Winding Order
///
/// Face rings are **counter-clockwise (CCW)** when viewed from the side their
/// normal points to.
///
/// # Example
///
/// ```
/// use mesh_types::{PolyMesh, Vertex, MeshTopology};
///
/// let mut mesh = PolyMesh::new();
/// let a = mesh.add_vertex(Vertex::from_coords(0.0, 0.0, 0.0));
/// let b = mesh.add_vertex(Vertex::from_coords(1.0, 0.0, 0.0));
/// let c = mesh.add_vertex(Vertex::from_coords(0.0, 1.0, 0.0));
/// let f = mesh.add_polygon(&[a, b, c], 0).unwrap();
///
/// assert_eq!(mesh.face_count(), 1);
/// assert_eq!(mesh.edge_count(), 3);
///
/// mesh.remove_vertex(a);
/// // `b`, `c` and `f` still resolve.
/// assert!(mesh.vertex(b).is_some());
/// assert!(mesh.face(f).is_some());
/// ```
#[derive(Debug, Clone, Default)]
pub struct PolyMesh {
    vertices: Vec<Option<Vertex>>,
    edges: Vec<Option<Edge>>,
    faces: Vec<Option<Face>>,
    live_vertices: usize,
    live_edges: usize,
    live_faces: usize,
    edge_index: HashMap<EdgeKey, EdgeId>,
    journal: Option<Journal>,
}

impl PolyMesh {
    /// Create a new empty mesh.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mesh with pre-allocated capacity.
    #[must_use]
    pub fn with_capacity(vertices: usize, edges: usize, faces: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertices),
            edges: Vec::with_capacity(edges),
            faces: Vec::with_capacity(faces),
            edge_index: HashMap::with_capacity(edges),
            ..Self::default()
        }
    }

    // ------------------------------------------------------------------
    // Add
    // ------------------------------------------------------------------

    /// Add a vertex and return its id.
    pub fn add_vertex(&mut self, vertex: Vertex) -> VertexId {
        let id = VertexId::from_index(self.vertices.len());
        self.vertices.push(Some(vertex));
        self.live_vertices += 1;
        id
    }

    /// Add an edge and return its id.
    ///
    /// Duplicates are accepted; [`PolyMesh::find_edge`] keeps returning the
    /// first live edge for a vertex pair.
    pub fn add_edge(&mut self, edge: Edge) -> EdgeId {
        let id = EdgeId::from_index(self.edges.len());
        if !edge.is_loop() {
            self.edge_index.entry(edge.key()).or_insert(id);
        }
        self.edges.push(Some(edge));
        self.live_edges += 1;
        id
    }

    /// Add a face and return its id.
    ///
    /// The face is stored as given; use [`PolyMesh::add_polygon`] to have the
    /// edge ring derived from the vertex ring.
    pub fn add_face(&mut self, face: Face) -> FaceId {
        let id = FaceId::from_index(self.faces.len());
        self.faces.push(Some(face));
        self.live_faces += 1;
        id
    }

    /// Add a face from a vertex ring, finding or creating its edges.
    ///
    /// Returns `None` (and changes nothing) if the ring has fewer than three
    /// corners, repeats a vertex, or names a vertex that is not live.
    pub fn add_polygon(&mut self, ring: &[VertexId], material: i32) -> Option<FaceId> {
        if !self.is_valid_ring(ring) {
            return None;
        }
        let edges = self.ring_edges(ring);
        Some(self.add_face(Face::new(ring.to_vec(), edges).with_material(material)))
    }

    /// Add a face from a vertex ring, copying normal, material and payload
    /// from `template`.
    pub fn add_polygon_like(&mut self, ring: &[VertexId], template: &Face) -> Option<FaceId> {
        if !self.is_valid_ring(ring) {
            return None;
        }
        let edges = self.ring_edges(ring);
        let mut face = Face::new(ring.to_vec(), edges).with_material(template.material);
        face.normal = template.normal;
        face.payload.clone_from(&template.payload);
        Some(self.add_face(face))
    }

    /// Return the edge joining `a` and `b`, creating it if needed.
    ///
    /// The flag is `true` when a new edge was created.
    pub fn find_or_add_edge(&mut self, a: VertexId, b: VertexId) -> (EdgeId, bool) {
        match self.find_edge(a, b) {
            Some(e) => (e, false),
            None => (self.add_edge(Edge::new(a, b)), true),
        }
    }

    fn ring_edges(&mut self, ring: &[VertexId]) -> Vec<EdgeId> {
        let n = ring.len();
        (0..n)
            .map(|i| self.find_or_add_edge(ring[i], ring[(i + 1) % n]).0)
            .collect()
    }

    /// Whether `ring` can become a face: ≥3 distinct live vertices.
    #[must_use]
    pub fn is_valid_ring(&self, ring: &[VertexId]) -> bool {
        if ring.len() < 3 || ring.iter().any(|&v| !self.contains_vertex(v)) {
            return false;
        }
        let mut seen = ring.to_vec();
        seen.sort_unstable();
        seen.dedup();
        seen.len() == ring.len()
    }

    // ------------------------------------------------------------------
    // Get
    // ------------------------------------------------------------------

    /// Get a vertex by id.
    #[inline]
    #[must_use]
    pub fn vertex(&self, id: VertexId) -> Option<&Vertex> {
        self.vertices.get(id.index()).and_then(Option::as_ref)
    }

    /// Get an edge by id.
    #[inline]
    #[must_use]
    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(id.index()).and_then(Option::as_ref)
    }

    /// Get a face by id.
    #[inline]
    #[must_use]
    pub fn face(&self, id: FaceId) -> Option<&Face> {
        self.faces.get(id.index()).and_then(Option::as_ref)
    }

    /// Mutable access to a vertex.
    pub fn vertex_mut(&mut self, id: VertexId) -> Option<&mut Vertex> {
        self.touch_vertex(id);
        self.vertices.get_mut(id.index()).and_then(Option::as_mut)
    }

    /// Mutable access to a face.
    ///
    /// Callers changing the vertex ring are responsible for the edge ring;
    /// [`PolyMesh::replace_face_ring`] does both.
    pub fn face_mut(&mut self, id: FaceId) -> Option<&mut Face> {
        self.touch_face(id);
        self.faces.get_mut(id.index()).and_then(Option::as_mut)
    }

    /// Replace an edge record, keeping the endpoint index in sync.
    ///
    /// Returns `false` if `id` is not live.
    pub fn set_edge(&mut self, id: EdgeId, edge: Edge) -> bool {
        let Some(old) = self.edge(id).copied() else {
            return false;
        };
        self.touch_edge(id);
        self.unindex_edge(id, old);
        self.edges[id.index()] = Some(edge);
        if !edge.is_loop() {
            self.edge_index.entry(edge.key()).or_insert(id);
        }
        true
    }

    /// Move a vertex.
    pub fn set_position(&mut self, id: VertexId, position: Point3<f64>) -> bool {
        self.vertex_mut(id).map(|v| v.position = position).is_some()
    }

    /// Set a vertex UV.
    pub fn set_uv(&mut self, id: VertexId, uv: Option<Point2<f64>>) -> bool {
        self.vertex_mut(id).map(|v| v.attributes.uv = uv).is_some()
    }

    /// Set a face material.
    pub fn set_material(&mut self, id: FaceId, material: i32) -> bool {
        self.face_mut(id).map(|f| f.material = material).is_some()
    }

    /// Whether `id` names a live vertex.
    #[inline]
    #[must_use]
    pub fn contains_vertex(&self, id: VertexId) -> bool {
        self.vertex(id).is_some()
    }

    /// Whether `id` names a live edge.
    #[inline]
    #[must_use]
    pub fn contains_edge(&self, id: EdgeId) -> bool {
        self.edge(id).is_some()
    }

    /// Whether `id` names a live face.
    #[inline]
    #[must_use]
    pub fn contains_face(&self, id: FaceId) -> bool {
        self.face(id).is_some()
    }

    /// Position of a live vertex.
    #[inline]
    #[must_use]
    pub fn position(&self, id: VertexId) -> Option<Point3<f64>> {
        self.vertex(id).map(|v| v.position)
    }

    /// Positions of a face's ring, or `None` if the face or any corner is
    /// missing.
    #[must_use]
    pub fn face_positions(&self, id: FaceId) -> Option<Vec<Point3<f64>>> {
        self.face(id)?
            .vertices
            .iter()
            .map(|&v| self.position(v))
            .collect()
    }

    /// Positions of an edge's endpoints.
    #[must_use]
    pub fn edge_positions(&self, id: EdgeId) -> Option<(Point3<f64>, Point3<f64>)> {
        let e = self.edge(id)?;
        Some((self.position(e.v1)?, self.position(e.v2)?))
    }

    /// First live edge joining `a` and `b`, in either direction.
    #[must_use]
    pub fn find_edge(&self, a: VertexId, b: VertexId) -> Option<EdgeId> {
        self.edge_index.get(&EdgeKey::new(a, b)).copied()
    }

    // ------------------------------------------------------------------
    // Remove
    // ------------------------------------------------------------------

    /// Remove a vertex, leaving a tombstone.
    ///
    /// Edges and faces that reference it are left alone; the dangling
    /// references are reported by validation.
    pub fn remove_vertex(&mut self, id: VertexId) -> Option<Vertex> {
        self.touch_vertex(id);
        let removed = self.vertices.get_mut(id.index())?.take();
        if removed.is_some() {
            self.live_vertices -= 1;
        }
        removed
    }

    /// Remove an edge, leaving a tombstone.
    pub fn remove_edge(&mut self, id: EdgeId) -> Option<Edge> {
        self.touch_edge(id);
        let removed = self.edges.get_mut(id.index())?.take()?;
        self.live_edges -= 1;
        self.unindex_edge(id, removed);
        Some(removed)
    }

    /// Remove a face, leaving a tombstone.
    pub fn remove_face(&mut self, id: FaceId) -> Option<Face> {
        self.touch_face(id);
        let removed = self.faces.get_mut(id.index())?.take();
        if removed.is_some() {
            self.live_faces -= 1;
        }
        removed
    }

    fn unindex_edge(&mut self, id: EdgeId, edge: Edge) {
        let key = edge.key();
        if self.edge_index.get(&key) != Some(&id) {
            return;
        }
        self.edge_index.remove(&key);
        // Hand the key to another live duplicate, if one exists.
        let replacement = self.edges.iter().enumerate().find_map(|(i, slot)| {
            slot.as_ref()
                .filter(|e| !e.is_loop() && e.key() == key)
                .map(|_| EdgeId::from_index(i))
        });
        if let Some(other) = replacement {
            self.edge_index.insert(key, other);
        }
    }

    // ------------------------------------------------------------------
    // Rings
    // ------------------------------------------------------------------

    /// Replace a face's vertex ring and re-derive its edge ring.
    ///
    /// Returns `false` (and changes nothing) if the face is missing or the
    /// ring is not valid.
    pub fn replace_face_ring(&mut self, id: FaceId, ring: Vec<VertexId>) -> bool {
        if !self.contains_face(id) || !self.is_valid_ring(&ring) {
            return false;
        }
        let edges = self.ring_edges(&ring);
        if let Some(face) = self.face_mut(id) {
            face.vertices = ring;
            face.edges = edges;
        }
        true
    }

    /// Re-derive a face's edge ring from its vertex ring.
    pub fn rebuild_face_edges(&mut self, id: FaceId) -> bool {
        match self.face(id) {
            Some(face) => {
                let ring = face.vertices.clone();
                self.replace_face_ring(id, ring)
            }
            None => false,
        }
    }

    /// Live faces whose ring contains `v`.
    #[must_use]
    pub fn faces_using_vertex(&self, v: VertexId) -> Vec<FaceId> {
        self.faces()
            .filter(|(_, f)| f.vertices.contains(&v))
            .map(|(id, _)| id)
            .collect()
    }

    /// Live faces whose edge ring contains `e`.
    #[must_use]
    pub fn faces_using_edge(&self, e: EdgeId) -> Vec<FaceId> {
        self.faces()
            .filter(|(_, f)| f.edges.contains(&e))
            .map(|(id, _)| id)
            .collect()
    }

    /// Live faces that have `a`-`b` as a ring side, in either direction.
    #[must_use]
    pub fn faces_with_side(&self, a: VertexId, b: VertexId) -> Vec<FaceId> {
        self.faces()
            .filter(|(_, f)| f.walks(a, b) || f.walks(b, a))
            .map(|(id, _)| id)
            .collect()
    }

    /// Live edges with `v` as an endpoint.
    #[must_use]
    pub fn edges_at_vertex(&self, v: VertexId) -> Vec<EdgeId> {
        self.edges()
            .filter(|(_, e)| e.has_vertex(v))
            .map(|(id, _)| id)
            .collect()
    }

    // ------------------------------------------------------------------
    // Iteration and counts
    // ------------------------------------------------------------------

    /// Iterate over live vertices.
    pub fn vertices(&self) -> impl Iterator<Item = (VertexId, &Vertex)> {
        self.vertices
            .iter()
            .enumerate()
            .filter_map(|(i, v)| v.as_ref().map(|v| (VertexId::from_index(i), v)))
    }

    /// Iterate over live edges.
    pub fn edges(&self) -> impl Iterator<Item = (EdgeId, &Edge)> {
        self.edges
            .iter()
            .enumerate()
            .filter_map(|(i, e)| e.as_ref().map(|e| (EdgeId::from_index(i), e)))
    }

    /// Iterate over live faces.
    pub fn faces(&self) -> impl Iterator<Item = (FaceId, &Face)> {
        self.faces
            .iter()
            .enumerate()
            .filter_map(|(i, f)| f.as_ref().map(|f| (FaceId::from_index(i), f)))
    }

    /// Ids of live vertices.
    #[must_use]
    pub fn vertex_ids(&self) -> Vec<VertexId> {
        self.vertices().map(|(id, _)| id).collect()
    }

    /// Ids of live edges.
    #[must_use]
    pub fn edge_ids(&self) -> Vec<EdgeId> {
        self.edges().map(|(id, _)| id).collect()
    }

    /// Ids of live faces.
    #[must_use]
    pub fn face_ids(&self) -> Vec<FaceId> {
        self.faces().map(|(id, _)| id).collect()
    }

    /// Number of live edges.
    #[inline]
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.live_edges
    }

    /// Number of allocated slots per table, tombstones included.
    #[must_use]
    pub fn slot_counts(&self) -> (usize, usize, usize) {
        (self.vertices.len(), self.edges.len(), self.faces.len())
    }

    /// Whether any slot is a tombstone.
    #[must_use]
    pub fn has_tombstones(&self) -> bool {
        self.live_vertices != self.vertices.len()
            || self.live_edges != self.edges.len()
            || self.live_faces != self.faces.len()
    }

    // ------------------------------------------------------------------
    // Whole-mesh rewrites
    // ------------------------------------------------------------------

    /// Rewrite every vertex reference through `map`.
    ///
    /// The map is applied to all edges and all faces before anything else
    /// looks at them, so no entity ever observes a half-applied remap.
    /// Entries of `map` are not chased; callers pass a resolved table.
    pub fn remap_vertex_refs(&mut self, map: &HashMap<VertexId, VertexId>) {
        if map.is_empty() {
            return;
        }
        let resolve = |v: VertexId| map.get(&v).copied().unwrap_or(v);

        for i in 0..self.edges.len() {
            let Some(edge) = self.edges[i] else { continue };
            let mapped = Edge::new(resolve(edge.v1), resolve(edge.v2));
            if mapped != edge {
                self.touch_edge(EdgeId::from_index(i));
                self.edges[i] = Some(mapped);
            }
        }
        for i in 0..self.faces.len() {
            let needs = self.faces[i]
                .as_ref()
                .is_some_and(|f| f.vertices.iter().any(|v| map.contains_key(v)));
            if needs {
                self.touch_face(FaceId::from_index(i));
                if let Some(face) = self.faces[i].as_mut() {
                    for v in &mut face.vertices {
                        *v = resolve(*v);
                    }
                }
            }
        }
        self.rebuild_edge_index();
    }

    /// Rewrite every face edge reference through `map`.
    pub fn remap_edge_refs(&mut self, map: &HashMap<EdgeId, EdgeId>) {
        if map.is_empty() {
            return;
        }
        for i in 0..self.faces.len() {
            let needs = self.faces[i]
                .as_ref()
                .is_some_and(|f| f.edges.iter().any(|e| map.contains_key(e)));
            if needs {
                self.touch_face(FaceId::from_index(i));
                if let Some(face) = self.faces[i].as_mut() {
                    for e in &mut face.edges {
                        *e = map.get(e).copied().unwrap_or(*e);
                    }
                }
            }
        }
    }

    /// Drop every tombstone and renumber all ids densely.
    ///
    /// Returns the old→new tables; apply them to any id held outside the
    /// mesh. References that were already dangling become `INVALID`.
    /// Compaction closes any open edit without recording it.
    pub fn compact(&mut self) -> crate::IndexRemap {
        self.journal = None;

        let remap = crate::IndexRemap::build(&self.vertices, &self.edges, &self.faces);

        let vertices = std::mem::take(&mut self.vertices);
        self.vertices = vertices.into_iter().filter(Option::is_some).collect();

        let edges = std::mem::take(&mut self.edges);
        self.edges = edges
            .into_iter()
            .flatten()
            .map(|e| Some(Edge::new(remap.vertex(e.v1), remap.vertex(e.v2))))
            .collect();

        let faces = std::mem::take(&mut self.faces);
        self.faces = faces
            .into_iter()
            .flatten()
            .map(|mut f| {
                for v in &mut f.vertices {
                    *v = remap.vertex(*v);
                }
                for e in &mut f.edges {
                    *e = remap.edge(*e);
                }
                Some(f)
            })
            .collect();

        self.live_vertices = self.vertices.len();
        self.live_edges = self.edges.len();
        self.live_faces = self.faces.len();
        self.rebuild_edge_index();

        debug!(
            vertices = self.live_vertices,
            edges = self.live_edges,
            faces = self.live_faces,
            "Compacted mesh"
        );
        remap
    }

    fn rebuild_edge_index(&mut self) {
        self.edge_index.clear();
        for (i, slot) in self.edges.iter().enumerate() {
            if let Some(e) = slot.filter(|e| !e.is_loop()) {
                self.edge_index.entry(e.key()).or_insert(EdgeId::from_index(i));
            }
        }
    }

    // ------------------------------------------------------------------
    // Edit journal
    // ------------------------------------------------------------------

    /// Open an edit. Returns `false` if one is already open, in which case
    /// the caller is nested inside it and must not commit or roll back.
    pub fn begin_edit(&mut self) -> bool {
        if self.journal.is_some() {
            return false;
        }
        self.journal = Some(Journal::new(
            self.vertices.len(),
            self.edges.len(),
            self.faces.len(),
        ));
        true
    }

    /// Whether an edit is open.
    #[must_use]
    pub fn in_edit(&self) -> bool {
        self.journal.is_some()
    }

    /// Close the open edit, keeping its changes.
    ///
    /// Returns `None` if no edit was open.
    pub fn commit_edit(&mut self) -> Option<EditLog> {
        let journal = self.journal.take()?;
        let (created_vertices, removed_vertices) =
            diff_slots(&self.vertices, journal.vertex_len, &journal.vertices, VertexId);
        let (created_edges, removed_edges) =
            diff_slots(&self.edges, journal.edge_len, &journal.edges, EdgeId);
        let (created_faces, removed_faces) =
            diff_slots(&self.faces, journal.face_len, &journal.faces, FaceId);
        Some(EditLog {
            created_vertices,
            created_edges,
            created_faces,
            removed_vertices,
            removed_edges,
            removed_faces,
        })
    }

    /// Close the open edit, undoing everything it did.
    ///
    /// Returns `false` if no edit was open.
    pub fn rollback_edit(&mut self) -> bool {
        let Some(journal) = self.journal.take() else {
            return false;
        };
        self.vertices.truncate(journal.vertex_len);
        self.edges.truncate(journal.edge_len);
        self.faces.truncate(journal.face_len);
        for (slot, before) in journal.vertices {
            self.vertices[slot as usize] = before;
        }
        for (slot, before) in journal.edges {
            self.edges[slot as usize] = before;
        }
        for (slot, before) in journal.faces {
            self.faces[slot as usize] = before;
        }
        self.live_vertices = self.vertices.iter().flatten().count();
        self.live_edges = self.edges.iter().flatten().count();
        self.live_faces = self.faces.iter().flatten().count();
        self.rebuild_edge_index();
        debug!("Rolled back edit");
        true
    }

    fn touch_vertex(&mut self, id: VertexId) {
        if let Some(j) = self.journal.as_mut() {
            let slot = id.index();
            if slot < j.vertex_len {
                j.vertices
                    .entry(id.0)
                    .or_insert_with(|| self.vertices[slot].clone());
            }
        }
    }

    fn touch_edge(&mut self, id: EdgeId) {
        if let Some(j) = self.journal.as_mut() {
            let slot = id.index();
            if slot < j.edge_len {
                j.edges.entry(id.0).or_insert(self.edges[slot]);
            }
        }
    }

    fn touch_face(&mut self, id: FaceId) {
        if let Some(j) = self.journal.as_mut() {
            let slot = id.index();
            if slot < j.face_len {
                j.faces
                    .entry(id.0)
                    .or_insert_with(|| self.faces[slot].clone());
            }
        }
    }
}

impl MeshTopology for PolyMesh {
    #[inline]
    fn vertex_count(&self) -> usize {
        self.live_vertices
    }

    #[inline]
    fn face_count(&self) -> usize {
        self.live_faces
    }
}

impl MeshBounds for PolyMesh {
    fn bounds(&self) -> Aabb {
        let positions: Vec<Point3<f64>> = self.vertices().map(|(_, v)| v.position).collect();
        Aabb::from_points(positions.iter())
    }
}

/// Helper function to create a unit cube mesh made of six quads.
///
/// The cube spans (0,0,0)..(1,1,1). Every face is CCW from outside, carries
/// its outward normal and material 0, and every vertex carries a UV.
///
/// # Example
///
/// ```
/// use mesh_types::{unit_cube, MeshTopology};
///
/// let cube = unit_cube();
/// assert_eq!(cube.vertex_count(), 8);
/// assert_eq!(cube.edge_count(), 12);
/// assert_eq!(cube.face_count(), 6);
/// ```
#[must_use]
pub fn unit_cube() -> PolyMesh {
    let mut mesh = PolyMesh::with_capacity(8, 12, 6);

    let corners = [
        ([0.0, 0.0, 0.0], [0.0, 0.0]),
        ([1.0, 0.0, 0.0], [1.0, 0.0]),
        ([1.0, 1.0, 0.0], [1.0, 1.0]),
        ([0.0, 1.0, 0.0], [0.0, 1.0]),
        ([0.0, 0.0, 1.0], [0.0, 1.0]),
        ([1.0, 0.0, 1.0], [1.0, 1.0]),
        ([1.0, 1.0, 1.0], [1.0, 0.0]),
        ([0.0, 1.0, 1.0], [0.0, 0.0]),
    ];
    let v: Vec<VertexId> = corners
        .iter()
        .map(|&([x, y, z], [s, t])| mesh.add_vertex(Vertex::from_coords(x, y, z).with_uv(s, t)))
        .collect();

    // CCW when viewed from outside.
    let quads = [
        ([0, 3, 2, 1], Vector3::new(0.0, 0.0, -1.0)),
        ([4, 5, 6, 7], Vector3::new(0.0, 0.0, 1.0)),
        ([0, 1, 5, 4], Vector3::new(0.0, -1.0, 0.0)),
        ([3, 7, 6, 2], Vector3::new(0.0, 1.0, 0.0)),
        ([0, 4, 7, 3], Vector3::new(-1.0, 0.0, 0.0)),
        ([1, 2, 6, 5], Vector3::new(1.0, 0.0, 0.0)),
    ];
    for (ring, normal) in quads {
        let ring: Vec<VertexId> = ring.iter().map(|&i| v[i]).collect();
        if let Some(f) = mesh.add_polygon(&ring, 0) {
            if let Some(face) = mesh.face_mut(f) {
                face.normal = Some(normal);
            }
        }
    }

    mesh
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> (PolyMesh, [VertexId; 3], FaceId) {
        let mut mesh = PolyMesh::new();
        let a = mesh.add_vertex(Vertex::from_coords(0.0, 0.0, 0.0));
        let b = mesh.add_vertex(Vertex::from_coords(1.0, 0.0, 0.0));
        let c = mesh.add_vertex(Vertex::from_coords(0.0, 1.0, 0.0));
        let f = mesh.add_polygon(&[a, b, c], 0).unwrap();
        (mesh, [a, b, c], f)
    }

    #[test]
    fn add_polygon_builds_parallel_edges() {
        let (mesh, [a, b, c], f) = triangle();
        let face = mesh.face(f).unwrap();
        assert!(face.is_well_formed());
        for (i, (x, y)) in face.sides().enumerate() {
            let e = mesh.edge(face.edges[i]).unwrap();
            assert_eq!(e.key(), EdgeKey::new(x, y));
        }
        assert_eq!(mesh.find_edge(c, a), Some(face.edges[2]));
        assert_eq!(mesh.find_edge(a, b), mesh.find_edge(b, a));
    }

    #[test]
    fn add_polygon_rejects_bad_rings() {
        let (mut mesh, [a, b, c], _) = triangle();
        assert!(mesh.add_polygon(&[a, b], 0).is_none());
        assert!(mesh.add_polygon(&[a, b, a], 0).is_none());
        assert!(mesh.add_polygon(&[a, b, VertexId(42)], 0).is_none());
        mesh.remove_vertex(c);
        assert!(mesh.add_polygon(&[a, b, c], 0).is_none());
    }

    #[test]
    fn removal_keeps_other_ids_stable() {
        let (mut mesh, [a, b, c], f) = triangle();
        let d = mesh.add_vertex(Vertex::from_coords(5.0, 5.0, 5.0));
        assert!(mesh.remove_vertex(a).is_some());
        assert!(mesh.remove_vertex(a).is_none());
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.position(d), Some(Point3::new(5.0, 5.0, 5.0)));
        assert!(mesh.contains_vertex(b) && mesh.contains_vertex(c));
        assert!(mesh.contains_face(f));
        assert!(mesh.has_tombstones());
    }

    #[test]
    fn remove_edge_hands_index_to_duplicate() {
        let (mut mesh, [a, b, _], _) = triangle();
        let first = mesh.find_edge(a, b).unwrap();
        let dup = mesh.add_edge(Edge::new(b, a));
        assert_eq!(mesh.find_edge(a, b), Some(first));
        mesh.remove_edge(first);
        assert_eq!(mesh.find_edge(a, b), Some(dup));
        mesh.remove_edge(dup);
        assert_eq!(mesh.find_edge(a, b), None);
    }

    #[test]
    fn compact_returns_remap() {
        let (mut mesh, [a, b, c], f) = triangle();
        let d = mesh.add_vertex(Vertex::from_coords(9.0, 9.0, 9.0));
        mesh.remove_vertex(d);
        let e = mesh.add_vertex(Vertex::from_coords(3.0, 3.0, 3.0));

        let remap = mesh.compact();
        assert!(!mesh.has_tombstones());
        assert_eq!(remap.vertex(a), VertexId(0));
        assert_eq!(remap.vertex(c), VertexId(2));
        assert_eq!(remap.vertex(d), VertexId::INVALID);
        assert_eq!(remap.vertex(e), VertexId(3));
        assert_eq!(mesh.position(VertexId(3)), Some(Point3::new(3.0, 3.0, 3.0)));
        let face = mesh.face(remap.face(f)).unwrap();
        assert_eq!(face.vertices, vec![remap.vertex(a), remap.vertex(b), remap.vertex(c)]);
    }

    #[test]
    fn compact_marks_dangling_references_invalid() {
        let (mut mesh, [a, _, _], f) = triangle();
        mesh.remove_vertex(a);
        let remap = mesh.compact();
        let face = mesh.face(remap.face(f)).unwrap();
        assert!(face.vertices[0].is_invalid());
    }

    #[test]
    fn rollback_restores_everything() {
        let (mut mesh, [a, b, c], f) = triangle();
        let before = mesh.clone();

        assert!(mesh.begin_edit());
        assert!(!mesh.begin_edit());
        let d = mesh.add_vertex(Vertex::from_coords(0.0, 0.0, 1.0));
        mesh.add_polygon(&[a, b, d], 3);
        mesh.set_position(c, Point3::new(7.0, 7.0, 7.0));
        mesh.remove_face(f);
        mesh.remove_edge(mesh.find_edge(a, b).unwrap());
        assert!(mesh.rollback_edit());

        assert_eq!(mesh.slot_counts(), before.slot_counts());
        assert_eq!(mesh.vertex_count(), before.vertex_count());
        assert_eq!(mesh.edge_count(), before.edge_count());
        assert_eq!(mesh.face(f), before.face(f));
        assert_eq!(mesh.position(c), before.position(c));
        assert_eq!(mesh.find_edge(a, b), before.find_edge(a, b));
    }

    #[test]
    fn commit_reports_created_and_removed() {
        let (mut mesh, [a, b, _], f) = triangle();
        mesh.begin_edit();
        let d = mesh.add_vertex(Vertex::from_coords(0.0, 0.0, 1.0));
        let g = mesh.add_polygon(&[a, b, d], 0).unwrap();
        let scratch = mesh.add_vertex(Vertex::from_coords(1.0, 1.0, 1.0));
        mesh.remove_vertex(scratch);
        mesh.remove_face(f);
        let log = mesh.commit_edit().unwrap();

        assert_eq!(log.created_vertices, vec![d]);
        assert_eq!(log.created_faces, vec![g]);
        assert_eq!(log.created_edges.len(), 2);
        assert_eq!(log.removed_faces, vec![f]);
        assert!(log.removed_vertices.is_empty());
        assert!(!mesh.in_edit());
    }

    #[test]
    fn remap_vertex_refs_rewrites_edges_and_faces() {
        let (mut mesh, [a, b, c], f) = triangle();
        let d = mesh.add_vertex(Vertex::from_coords(1.0, 0.0, 0.0));
        let mut map = HashMap::new();
        map.insert(b, d);
        mesh.remap_vertex_refs(&map);
        assert_eq!(mesh.face(f).unwrap().vertices, vec![a, d, c]);
        assert!(mesh.find_edge(a, b).is_none());
        assert!(mesh.find_edge(a, d).is_some());
    }

    #[test]
    fn unit_cube_is_closed_quads() {
        let cube = unit_cube();
        assert_eq!(cube.vertex_count(), 8);
        assert_eq!(cube.edge_count(), 12);
        assert_eq!(cube.face_count(), 6);
        for (_, face) in cube.faces() {
            assert_eq!(face.len(), 4);
            assert!(face.normal.is_some());
        }
        for (id, _) in cube.edges() {
            assert_eq!(cube.faces_using_edge(id).len(), 2);
        }
    }
}
