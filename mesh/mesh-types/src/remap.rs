//! Old-to-new id tables produced by compaction.

use crate::{EdgeId, FaceId, VertexId};

/// Dense renumbering produced by [`PolyMesh::compact`](crate::PolyMesh::compact).
///
/// Each table is indexed by the old slot. Slots that were tombstones map to
/// the `INVALID` sentinel, as do ids past the end of the old table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexRemap {
    vertices: Vec<VertexId>,
    edges: Vec<EdgeId>,
    faces: Vec<FaceId>,
}

fn dense<T, I: Copy>(slots: &[Option<T>], make: impl Fn(usize) -> I, invalid: I) -> Vec<I> {
    let mut next = 0usize;
    slots
        .iter()
        .map(|slot| {
            if slot.is_some() {
                next += 1;
                make(next - 1)
            } else {
                invalid
            }
        })
        .collect()
}

impl IndexRemap {
    pub(crate) fn build<V, E, F>(
        vertices: &[Option<V>],
        edges: &[Option<E>],
        faces: &[Option<F>],
    ) -> Self {
        Self {
            vertices: dense(vertices, VertexId::from_index, VertexId::INVALID),
            edges: dense(edges, EdgeId::from_index, EdgeId::INVALID),
            faces: dense(faces, FaceId::from_index, FaceId::INVALID),
        }
    }

    /// New id for an old vertex id.
    #[must_use]
    pub fn vertex(&self, old: VertexId) -> VertexId {
        self.vertices.get(old.index()).copied().unwrap_or(VertexId::INVALID)
    }

    /// New id for an old edge id.
    #[must_use]
    pub fn edge(&self, old: EdgeId) -> EdgeId {
        self.edges.get(old.index()).copied().unwrap_or(EdgeId::INVALID)
    }

    /// New id for an old face id.
    #[must_use]
    pub fn face(&self, old: FaceId) -> FaceId {
        self.faces.get(old.index()).copied().unwrap_or(FaceId::INVALID)
    }

    /// Whether compaction changed any id.
    #[must_use]
    pub fn is_identity(&self) -> bool {
        self.vertices.iter().enumerate().all(|(i, v)| v.index() == i)
            && self.edges.iter().enumerate().all(|(i, e)| e.index() == i)
            && self.faces.iter().enumerate().all(|(i, f)| f.index() == i)
    }
}
