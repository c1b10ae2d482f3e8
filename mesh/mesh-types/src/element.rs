//! Edge and face records, plus the user payload type shared by all entities.

use nalgebra::Vector3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{EdgeId, EdgeKey, VertexId};

/// Host-owned data attached to a vertex or face.
///
/// The kernel copies payloads only when an entity is cloned whole; derived
/// geometry starts without one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum UserData {
    /// Numeric tag, e.g. a selection group or an external key.
    Tag(u64),
    /// Free-form label.
    Label(String),
    /// Opaque bytes.
    Bytes(Vec<u8>),
}

/// An edge between two vertices.
///
/// Edges are conceptually unordered; `v1`/`v2` keep the order they were
/// created with. An edge whose endpoints are equal is invalid and is
/// reported by validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Edge {
    /// First endpoint.
    pub v1: VertexId,
    /// Second endpoint.
    pub v2: VertexId,
}

impl Edge {
    /// Create an edge between `v1` and `v2`.
    #[inline]
    #[must_use]
    pub const fn new(v1: VertexId, v2: VertexId) -> Self {
        Self { v1, v2 }
    }

    /// Direction-free key for this edge.
    #[inline]
    #[must_use]
    pub fn key(&self) -> EdgeKey {
        EdgeKey::new(self.v1, self.v2)
    }

    /// Whether `v` is one of the endpoints.
    #[inline]
    #[must_use]
    pub fn has_vertex(&self, v: VertexId) -> bool {
        self.v1 == v || self.v2 == v
    }

    /// Given one endpoint, return the other.
    #[must_use]
    pub fn opposite(&self, v: VertexId) -> Option<VertexId> {
        if self.v1 == v {
            Some(self.v2)
        } else if self.v2 == v {
            Some(self.v1)
        } else {
            None
        }
    }

    /// Whether the two edges have an endpoint in common.
    #[must_use]
    pub fn shares_vertex(&self, other: &Self) -> bool {
        self.has_vertex(other.v1) || self.has_vertex(other.v2)
    }

    /// Self-loop check.
    #[inline]
    #[must_use]
    pub fn is_loop(&self) -> bool {
        self.v1 == self.v2
    }
}

/// A polygonal face.
///
/// `vertices` is the ring in counter-clockwise order as seen from the side
/// the face normal points to. `edges[i]` joins `vertices[i]` and
/// `vertices[(i + 1) % n]`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Face {
    /// Vertex ring.
    pub vertices: Vec<VertexId>,
    /// Edge ring, parallel to `vertices`.
    pub edges: Vec<EdgeId>,
    /// Stored unit normal, if known.
    pub normal: Option<Vector3<f64>>,
    /// Material slot. Negative values are invalid and reported by validation.
    pub material: i32,
    /// Host-owned data; the kernel never inspects it.
    pub payload: Option<UserData>,
}

impl Face {
    /// Create a face from a vertex ring and its parallel edge ring.
    #[must_use]
    pub fn new(vertices: Vec<VertexId>, edges: Vec<EdgeId>) -> Self {
        Self {
            vertices,
            edges,
            normal: None,
            material: 0,
            payload: None,
        }
    }

    /// Builder: set the material.
    #[must_use]
    pub fn with_material(mut self, material: i32) -> Self {
        self.material = material;
        self
    }

    /// Builder: set the stored normal.
    #[must_use]
    pub fn with_normal(mut self, normal: Vector3<f64>) -> Self {
        self.normal = Some(normal);
        self
    }

    /// Number of corners.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// Whether the ring is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Ring invariant: `len(vertices) == len(edges) >= 3`.
    #[inline]
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        self.vertices.len() >= 3 && self.vertices.len() == self.edges.len()
    }

    /// Position of `v` in the ring.
    #[must_use]
    pub fn corner_of(&self, v: VertexId) -> Option<usize> {
        self.vertices.iter().position(|&x| x == v)
    }

    /// Position of `e` in the edge ring.
    #[must_use]
    pub fn side_of(&self, e: EdgeId) -> Option<usize> {
        self.edges.iter().position(|&x| x == e)
    }

    /// Ring neighbours `(previous, next)` of corner `i`.
    #[must_use]
    pub fn neighbours(&self, i: usize) -> (VertexId, VertexId) {
        let n = self.vertices.len();
        (self.vertices[(i + n - 1) % n], self.vertices[(i + 1) % n])
    }

    /// Directed ring sides `(vertices[i], vertices[i + 1])`.
    pub fn sides(&self) -> impl Iterator<Item = (VertexId, VertexId)> + '_ {
        let n = self.vertices.len();
        (0..n).map(move |i| (self.vertices[i], self.vertices[(i + 1) % n]))
    }

    /// Whether the ring walks `a -> b` as one of its sides.
    #[must_use]
    pub fn walks(&self, a: VertexId, b: VertexId) -> bool {
        self.sides().any(|(x, y)| x == a && y == b)
    }

    /// Reverse the winding in place.
    ///
    /// The vertex ring is reversed and the edge ring is reversed and rotated
    /// by one so that `edges[i]` still joins `vertices[i]` and
    /// `vertices[i + 1]`.
    pub fn reverse(&mut self) {
        self.vertices.reverse();
        self.edges.reverse();
        if !self.edges.is_empty() {
            self.edges.rotate_left(1);
        }
    }
}
