//! Integrity validation and repair for [`PolyMesh`](mesh_types::PolyMesh).
//!
//! This crate provides tools for:
//! - Validation: winding against stored normals, dangling references, ring
//!   size and ring/edge consistency, self-loop edges, coincident vertices,
//!   orphans, materials, UV completeness, degenerate faces
//! - Adjacency queries: boundary and non-manifold sides
//! - Repair: winding correction, normal recomputation, vertex merging,
//!   duplicate edge removal, default UVs, invalid and degenerate face
//!   removal, edge ring rebuilding, orphan removal, material clamping
//!
//! Validation never changes the mesh and repair never fails; both can be
//! run on a mesh in any state.
//!
//! # Example
//!
//! ```
//! use mesh_repair::{repair_mesh, validate_integrity, RepairParams};
//! use mesh_types::unit_cube;
//!
//! let mut cube = unit_cube();
//! let top = cube.face_ids()[1];
//! cube.face_mut(top).unwrap().reverse();
//!
//! let report = validate_integrity(&cube);
//! println!("{report}");
//! assert_eq!(report.winding.items, vec![top]);
//!
//! let summary = repair_mesh(&mut cube, &RepairParams::default());
//! println!("{summary}");
//! assert!(summary.fully_valid);
//! ```

#![warn(missing_docs)]
// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod adjacency;
mod error;
mod repair;
mod validate;

pub use adjacency::MeshAdjacency;
pub use error::{RepairError, RepairResult};
pub use repair::{
    clamp_materials, fix_winding_order, generate_default_uvs, merge_duplicate_vertices,
    rebuild_face_edges, recalculate_normals, recalculate_vertex_normals, remove_degenerate_faces,
    remove_duplicate_edges, remove_invalid_edges, remove_invalid_faces, remove_orphans,
    repair_mesh, RepairParams, RepairSummary,
};
pub use validate::{
    validate_integrity, validate_integrity_with_options, CheckResult, DanglingRef,
    IntegrityReport, ValidationOptions,
};
