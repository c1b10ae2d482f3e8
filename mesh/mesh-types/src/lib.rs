//! Polygon mesh store for the editing kernel.
//!
//! This crate provides the foundational types every other mesh crate in the
//! workspace builds on:
//!
//! - [`PolyMesh`] - vertex, edge and face tables with stable ids
//! - [`Vertex`], [`Edge`], [`Face`] - the stored entities
//! - [`VertexId`], [`EdgeId`], [`FaceId`] - typed slot ids
//! - [`EditLog`] - what an edit created and removed
//! - [`IndexRemap`] - old-to-new ids after [`PolyMesh::compact`]
//! - [`MeshDocument`] - flat interchange form for codecs
//! - [`merge_coincident_vertices`] - shared weld pass
//!
//! # Stable ids
//!
//! Removing an entity leaves a tombstone; slots are never reused. Ids held by
//! a host therefore stay valid across any number of edits until the entity
//! they name is removed. Renumbering only happens in [`PolyMesh::compact`].
//!
//! # Edits
//!
//! [`PolyMesh::begin_edit`] opens a journal that records the prior content of
//! every slot the store touches. [`PolyMesh::rollback_edit`] restores it;
//! [`PolyMesh::commit_edit`] keeps the changes and returns an [`EditLog`].
//!
//! # Coordinate System
//!
//! Uses a **right-handed coordinate system** with Z up.
//!
//! Face winding is **counter-clockwise (CCW) when viewed from the side the
//! normal points to**. Normals follow the right-hand rule.
//!
//! # Example
//!
//! ```
//! use mesh_types::{PolyMesh, Vertex, MeshTopology};
//!
//! let mut mesh = PolyMesh::new();
//! let a = mesh.add_vertex(Vertex::from_coords(0.0, 0.0, 0.0));
//! let b = mesh.add_vertex(Vertex::from_coords(1.0, 0.0, 0.0));
//! let c = mesh.add_vertex(Vertex::from_coords(1.0, 1.0, 0.0));
//! let d = mesh.add_vertex(Vertex::from_coords(0.0, 1.0, 0.0));
//! mesh.add_polygon(&[a, b, c, d], 0);
//!
//! assert_eq!(mesh.face_count(), 1);
//! assert_eq!(mesh.edge_count(), 4);
//! assert!(!mesh.is_empty());
//! ```

#![warn(missing_docs)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod bounds;
mod document;
mod element;
mod ids;
mod journal;
mod mesh;
mod polygon;
mod remap;
mod traits;
mod vertex;
mod weld;

pub use bounds::Aabb;
pub use document::{DocumentError, DocumentFace, DocumentVertex, MeshDocument};
pub use element::{Edge, Face, UserData};
pub use ids::{EdgeId, EdgeKey, FaceId, VertexId};
pub use journal::EditLog;
pub use mesh::{unit_cube, PolyMesh};
pub use polygon::{
    area, centroid, first_noncollinear_normal, newell_normal, newell_vector, GEOMETRY_EPSILON,
};
pub use remap::IndexRemap;
pub use traits::{MeshBounds, MeshTopology};
pub use vertex::{Vertex, VertexAttributes, VertexColor};
pub use weld::{merge_coincident_vertices, merge_vertices_among, MergeReport};

// Re-export nalgebra types for convenience
pub use nalgebra::{Point2, Point3, Vector3};
