//! Interchange document.
//!
//! `MeshDocument` is the flat `{vertices, faces}` shape that import and
//! export codecs read and write. It carries no edges; they are rebuilt from
//! the face rings on load.
//!
//! With the `serde` feature the document serializes as
//!
//! ```text
//! { "vertices": [ { "x": 0, "y": 0, "z": 0, "uv": [0, 0], "normal": [0, 0, 1] } ],
//!   "faces":    [ { "vertices": [0, 1, 2], "materialIndex": 0 } ] }
//! ```

use hashbrown::HashMap;
use nalgebra::{Point2, Point3, Vector3};
use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{PolyMesh, Vertex, VertexId};

/// A vertex record in a [`MeshDocument`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DocumentVertex {
    /// X coordinate.
    pub x: f64,
    /// Y coordinate.
    pub y: f64,
    /// Z coordinate.
    pub z: f64,
    /// Texture coordinate.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub uv: Option<[f64; 2]>,
    /// Vertex normal.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub normal: Option<[f64; 3]>,
}

/// A face record in a [`MeshDocument`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct DocumentFace {
    /// Indices into the document's vertex list.
    pub vertices: Vec<u32>,
    /// Material slot.
    #[cfg_attr(feature = "serde", serde(default))]
    pub material_index: i32,
}

/// Flat, codec-facing mesh description.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MeshDocument {
    /// Vertex records.
    pub vertices: Vec<DocumentVertex>,
    /// Face records.
    pub faces: Vec<DocumentFace>,
}

/// Reasons a document cannot be loaded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    /// A face names a vertex index past the end of the vertex list.
    #[error("face {face} references vertex {index}, but the document has {count} vertices")]
    VertexOutOfRange {
        /// Face position in the document.
        face: usize,
        /// Offending index.
        index: u32,
        /// Number of vertex records.
        count: usize,
    },

    /// A face has fewer than three corners or repeats a vertex.
    #[error("face {face} is not a valid polygon ring")]
    InvalidRing {
        /// Face position in the document.
        face: usize,
    },
}

impl MeshDocument {
    /// Whether the document holds nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() && self.faces.is_empty()
    }
}

impl PolyMesh {
    /// Export live vertices and faces.
    ///
    /// Vertex indices are renumbered densely in id order. Faces that reference
    /// a missing vertex are skipped.
    #[must_use]
    pub fn to_document(&self) -> MeshDocument {
        let mut index: HashMap<VertexId, u32> = HashMap::with_capacity(self.slot_counts().0);
        let mut vertices = Vec::new();
        for (id, v) in self.vertices() {
            let Ok(slot) = u32::try_from(vertices.len()) else {
                break;
            };
            index.insert(id, slot);
            vertices.push(DocumentVertex {
                x: v.position.x,
                y: v.position.y,
                z: v.position.z,
                uv: v.uv().map(|uv| [uv.x, uv.y]),
                normal: v.normal().map(|n| [n.x, n.y, n.z]),
            });
        }

        let faces = self
            .faces()
            .filter_map(|(_, f)| {
                let ring: Option<Vec<u32>> =
                    f.vertices.iter().map(|v| index.get(v).copied()).collect();
                ring.map(|vertices| DocumentFace {
                    vertices,
                    material_index: f.material,
                })
            })
            .collect();

        MeshDocument { vertices, faces }
    }

    /// Build a mesh from a document, deriving edges from the face rings.
    ///
    /// Vertex `i` of the document becomes `VertexId(i)`.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError`] if a face references a vertex that does not
    /// exist or is not a valid ring.
    pub fn from_document(doc: &MeshDocument) -> Result<Self, DocumentError> {
        let mut mesh = Self::with_capacity(doc.vertices.len(), doc.faces.len() * 2, doc.faces.len());
        for dv in &doc.vertices {
            let mut v = Vertex::new(Point3::new(dv.x, dv.y, dv.z));
            v.attributes.uv = dv.uv.map(|[u, t]| Point2::new(u, t));
            v.attributes.normal = dv.normal.map(|[x, y, z]| Vector3::new(x, y, z));
            mesh.add_vertex(v);
        }

        for (i, df) in doc.faces.iter().enumerate() {
            if let Some(&bad) = df
                .vertices
                .iter()
                .find(|&&ix| ix as usize >= doc.vertices.len())
            {
                return Err(DocumentError::VertexOutOfRange {
                    face: i,
                    index: bad,
                    count: doc.vertices.len(),
                });
            }
            let ring: Vec<VertexId> = df.vertices.iter().map(|&ix| VertexId(ix)).collect();
            mesh.add_polygon(&ring, df.material_index)
                .ok_or(DocumentError::InvalidRing { face: i })?;
        }
        Ok(mesh)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{unit_cube, MeshTopology};

    #[test]
    fn cube_survives_document() {
        let cube = unit_cube();
        let doc = cube.to_document();
        assert_eq!(doc.vertices.len(), 8);
        assert_eq!(doc.faces.len(), 6);

        let back = PolyMesh::from_document(&doc).unwrap();
        assert_eq!(back.vertex_count(), 8);
        assert_eq!(back.edge_count(), 12);
        assert_eq!(back.face_count(), 6);
        assert_eq!(back.to_document(), doc);
    }

    #[test]
    fn tombstones_are_renumbered() {
        let mut cube = unit_cube();
        let f0 = cube.face_ids()[0];
        let dropped = cube.face(f0).unwrap().vertices[0];
        for f in cube.faces_using_vertex(dropped) {
            cube.remove_face(f);
        }
        cube.remove_vertex(dropped);

        let doc = cube.to_document();
        assert_eq!(doc.vertices.len(), 7);
        assert_eq!(doc.faces.len(), 3);
        assert!(doc.faces.iter().flat_map(|f| &f.vertices).all(|&i| i < 7));
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        let doc = MeshDocument {
            vertices: vec![
                DocumentVertex { x: 0.0, y: 0.0, z: 0.0, uv: None, normal: None },
                DocumentVertex { x: 1.0, y: 0.0, z: 0.0, uv: None, normal: None },
            ],
            faces: vec![DocumentFace { vertices: vec![0, 1, 5], material_index: 0 }],
        };
        assert_eq!(
            PolyMesh::from_document(&doc).unwrap_err(),
            DocumentError::VertexOutOfRange { face: 0, index: 5, count: 2 }
        );
    }

    #[test]
    fn repeated_corner_is_rejected() {
        let doc = MeshDocument {
            vertices: vec![
                DocumentVertex { x: 0.0, y: 0.0, z: 0.0, uv: None, normal: None },
                DocumentVertex { x: 1.0, y: 0.0, z: 0.0, uv: None, normal: None },
                DocumentVertex { x: 0.0, y: 1.0, z: 0.0, uv: None, normal: None },
            ],
            faces: vec![DocumentFace { vertices: vec![0, 1, 1], material_index: 2 }],
        };
        assert!(matches!(
            PolyMesh::from_document(&doc),
            Err(DocumentError::InvalidRing { face: 0 })
        ));
    }
}
