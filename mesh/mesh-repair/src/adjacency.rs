//! Mesh adjacency data structures.
//!
//! Built from face rings rather than the edge table, so duplicate or
//! missing edge records do not hide how faces actually meet.

use hashbrown::HashMap;
use mesh_types::{EdgeKey, FaceId, PolyMesh, VertexId};

/// Adjacency information for a mesh.
///
/// Provides lookups for:
/// - Faces meeting along a ring side
/// - Faces around a vertex
/// - Boundary sides (used by exactly one face)
/// - Non-manifold sides (used by more than two faces)
#[derive(Debug, Clone, Default)]
pub struct MeshAdjacency {
    side_to_faces: HashMap<EdgeKey, Vec<FaceId>>,
    vertex_to_faces: HashMap<VertexId, Vec<FaceId>>,
}

impl MeshAdjacency {
    /// Build adjacency from the live faces of `mesh`.
    ///
    /// # Example
    ///
    /// ```
    /// use mesh_repair::MeshAdjacency;
    /// use mesh_types::unit_cube;
    ///
    /// let adj = MeshAdjacency::build(&unit_cube());
    ///
    /// assert_eq!(adj.edge_count(), 12);
    /// assert!(adj.is_watertight());
    /// ```
    #[must_use]
    pub fn build(mesh: &PolyMesh) -> Self {
        let mut side_to_faces: HashMap<EdgeKey, Vec<FaceId>> = HashMap::new();
        let mut vertex_to_faces: HashMap<VertexId, Vec<FaceId>> = HashMap::new();

        for (id, face) in mesh.faces() {
            for &v in &face.vertices {
                let faces = vertex_to_faces.entry(v).or_default();
                if faces.last() != Some(&id) {
                    faces.push(id);
                }
            }
            for (a, b) in face.sides() {
                if a != b {
                    side_to_faces.entry(EdgeKey::new(a, b)).or_default().push(id);
                }
            }
        }

        Self {
            side_to_faces,
            vertex_to_faces,
        }
    }

    /// Faces using the side `a`-`b` in either direction.
    ///
    /// Returns `None` if no face has that side.
    #[must_use]
    pub fn faces_for_edge(&self, a: VertexId, b: VertexId) -> Option<&[FaceId]> {
        self.side_to_faces
            .get(&EdgeKey::new(a, b))
            .map(Vec::as_slice)
    }

    /// Faces whose ring contains `v`.
    #[must_use]
    pub fn faces_for_vertex(&self, v: VertexId) -> &[FaceId] {
        self.vertex_to_faces.get(&v).map_or(&[], Vec::as_slice)
    }

    /// Sides used by exactly one face.
    pub fn boundary_edges(&self) -> impl Iterator<Item = EdgeKey> + '_ {
        self.side_to_faces
            .iter()
            .filter(|(_, faces)| faces.len() == 1)
            .map(|(&key, _)| key)
    }

    /// Number of boundary sides.
    #[must_use]
    pub fn boundary_edge_count(&self) -> usize {
        self.side_to_faces
            .values()
            .filter(|faces| faces.len() == 1)
            .count()
    }

    /// Sides shared by more than two faces.
    pub fn non_manifold_edges(&self) -> impl Iterator<Item = EdgeKey> + '_ {
        self.side_to_faces
            .iter()
            .filter(|(_, faces)| faces.len() > 2)
            .map(|(&key, _)| key)
    }

    /// Number of non-manifold sides.
    #[must_use]
    pub fn non_manifold_edge_count(&self) -> usize {
        self.side_to_faces
            .values()
            .filter(|faces| faces.len() > 2)
            .count()
    }

    /// Whether no side is shared by more than two faces.
    #[must_use]
    pub fn is_manifold(&self) -> bool {
        self.side_to_faces.values().all(|faces| faces.len() <= 2)
    }

    /// Whether every side is shared by at least two faces.
    #[must_use]
    pub fn is_watertight(&self) -> bool {
        self.side_to_faces.values().all(|faces| faces.len() >= 2)
    }

    /// Number of distinct sides.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.side_to_faces.len()
    }

    /// Number of vertices used by at least one face.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertex_to_faces.len()
    }
}
