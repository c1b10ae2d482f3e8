//! Edit journal used to make multi-step mutations all-or-nothing.
//!
//! While an edit is open the store remembers how many slots each table had
//! and the first-seen content of every pre-existing slot it touches. Rolling
//! back truncates everything appended since and restores the remembered
//! slots, so the cost is proportional to the edit, not to the mesh.

use hashbrown::HashMap;

use crate::{Edge, EdgeId, Face, FaceId, Vertex, VertexId};

#[derive(Debug, Clone, Default)]
pub(crate) struct Journal {
    pub(crate) vertex_len: usize,
    pub(crate) edge_len: usize,
    pub(crate) face_len: usize,
    pub(crate) vertices: HashMap<u32, Option<Vertex>>,
    pub(crate) edges: HashMap<u32, Option<Edge>>,
    pub(crate) faces: HashMap<u32, Option<Face>>,
}

impl Journal {
    pub(crate) fn new(vertex_len: usize, edge_len: usize, face_len: usize) -> Self {
        Self {
            vertex_len,
            edge_len,
            face_len,
            ..Self::default()
        }
    }
}

/// What an edit created and removed, reported when the edit is committed.
///
/// Ids are listed in ascending order. An entity created and removed inside
/// the same edit appears in neither list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditLog {
    /// Vertices added by the edit.
    pub created_vertices: Vec<VertexId>,
    /// Edges added by the edit.
    pub created_edges: Vec<EdgeId>,
    /// Faces added by the edit.
    pub created_faces: Vec<FaceId>,
    /// Pre-existing vertices the edit removed.
    pub removed_vertices: Vec<VertexId>,
    /// Pre-existing edges the edit removed.
    pub removed_edges: Vec<EdgeId>,
    /// Pre-existing faces the edit removed.
    pub removed_faces: Vec<FaceId>,
}

impl EditLog {
    /// Whether the edit changed the entity tables at all.
    ///
    /// In-place attribute changes are not tracked here.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.created_vertices.is_empty()
            && self.created_edges.is_empty()
            && self.created_faces.is_empty()
            && self.removed_vertices.is_empty()
            && self.removed_edges.is_empty()
            && self.removed_faces.is_empty()
    }

}

/// Slots `[start, end)` still live, plus journaled slots that were live
/// before and are gone now.
pub(crate) fn diff_slots<T, U, I: Copy + Ord>(
    slots: &[Option<T>],
    start: usize,
    touched: &HashMap<u32, Option<U>>,
    make_id: impl Fn(u32) -> I,
) -> (Vec<I>, Vec<I>) {
    let created = (start..slots.len())
        .filter(|&i| slots[i].is_some())
        .filter_map(|i| u32::try_from(i).ok())
        .map(&make_id)
        .collect();

    let mut removed: Vec<I> = touched
        .iter()
        .filter(|(&slot, before)| {
            before.is_some() && slots.get(slot as usize).is_some_and(Option::is_none)
        })
        .map(|(&slot, _)| make_id(slot))
        .collect();
    removed.sort_unstable();

    (created, removed)
}
