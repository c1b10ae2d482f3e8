//! Polygon-mesh authoring kernel.
//!
//! This umbrella crate re-exports the kernel's crates under one roof:
//!
//! - [`types`] - The mesh store: `PolyMesh`, typed ids, vertices, edges,
//!   faces, the edit journal and the interchange document
//! - [`edit`] - Topology operations: extrude, bevel, inset, bridge, knife
//!   and loop cut, each all-or-nothing
//! - [`repair`] - Integrity validation and best-effort repair
//!
//! # Quick Start
//!
//! ```
//! use mesh::prelude::*;
//!
//! let mut cube = unit_cube();
//! let top = cube.face_ids()[1];
//!
//! let outcome = extrude_face(&mut cube, top, &ExtrudeFaceParams::new(1.0)).unwrap();
//! assert_eq!(outcome.created_vertices.len(), 4);
//!
//! let report = validate_integrity(&cube);
//! assert!(report.is_valid(), "{report}");
//! ```
//!
//! # Feature Flags
//!
//! - `serde` - `Serialize`/`Deserialize` for data, parameter and report types

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

// =============================================================================
// Re-exports
// =============================================================================

/// The mesh store: `PolyMesh`, ids, elements, journal, document.
pub use mesh_types as types;

/// Topology editing operations.
pub use mesh_edit as edit;

/// Integrity validation and repair.
pub use mesh_repair as repair;

// =============================================================================
// Prelude
// =============================================================================

/// Common imports for mesh authoring.
///
/// # Usage
///
/// ```
/// use mesh::prelude::*;
/// ```
pub mod prelude {
    // Store
    pub use mesh_types::{
        unit_cube, EdgeId, FaceId, MeshBounds, MeshDocument, MeshTopology, Point3, PolyMesh,
        Vector3, Vertex, VertexId,
    };

    // Operations
    pub use mesh_edit::{
        bevel, bridge_edges, extrude_face, inset, knife_cut, loop_cut, BevelParams, BevelTarget,
        BridgeParams, EditError, EditErrorKind, EditOutcome, ExtrudeFaceParams, InsetParams,
        KnifePoint, LoopCutParams,
    };

    // Validation and repair
    pub use mesh_repair::{repair_mesh, validate_integrity, IntegrityReport, RepairParams};
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prelude_imports() {
        use prelude::*;

        let mesh = PolyMesh::new();
        assert_eq!(mesh.vertex_count(), 0);
        assert_eq!(mesh.face_count(), 0);
    }

    #[test]
    fn test_module_reexports() {
        let _ = types::PolyMesh::new();
        let _ = edit::LoopCutParams::new(1);
        let _ = repair::ValidationOptions::default();
    }
}
