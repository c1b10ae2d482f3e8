//! Topology editing operations for [`PolyMesh`](mesh_types::PolyMesh).
//!
//! Every operation takes the mesh by `&mut`, validates its targets and
//! parameters, and then runs inside [`transact`]: either all of its changes
//! land and an [`EditOutcome`] lists what was created and removed, or the
//! mesh is left exactly as it was and an [`EditError`] explains why.
//!
//! - [`extrude_face`], [`extrude_edge`], [`extrude_vertex`]
//! - [`bevel`] of a vertex, edge or face
//! - [`inset`], individual or connected
//! - [`bridge_edges`], [`bridge_faces`], [`bridge_selected_edges`]
//! - [`split_edge`], [`knife_cut`], [`loop_cut`]
//!
//! # Validation order
//!
//! An empty mesh is rejected first ([`EditErrorKind::EmptyMesh`]), then
//! targets that do not exist ([`EditErrorKind::InvalidIndex`]), then
//! operation-specific checks on parameters and geometry.
//!
//! # Example
//!
//! ```
//! use mesh_edit::{extrude_face, inset, ExtrudeFaceParams, InsetParams};
//! use mesh_types::{unit_cube, MeshTopology};
//!
//! let mut cube = unit_cube();
//! let top = cube.face_ids()[1];
//!
//! let inset_outcome = inset(&mut cube, &[top], &InsetParams::new(0.2)).unwrap();
//! let inner = *inset_outcome.created_faces.last().unwrap();
//! extrude_face(&mut cube, inner, &ExtrudeFaceParams::new(0.5)).unwrap();
//!
//! assert_eq!(cube.vertex_count(), 16);
//! ```

#![warn(missing_docs)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod bevel;
mod bridge;
mod cut;
mod error;
mod extrude;
mod geom;
mod inset;
mod outcome;
mod params;

pub use bevel::bevel;
pub use bridge::{bridge_edges, bridge_faces, bridge_selected_edges};
pub use cut::{knife_cut, loop_cut, split_edge};
pub use error::{EditError, EditErrorKind, EditResult};
pub use extrude::{extrude_edge, extrude_face, extrude_vertex};
pub use inset::inset;
pub use outcome::{timed, transact, Clock, EditOutcome, ManualClock, SystemClock};
pub use params::{
    BevelParams, BevelTarget, BridgeParams, BridgeTopology, ExtrudeEdgeParams,
    ExtrudeFaceParams, ExtrudeVertexParams, InsetMode, InsetParams, KnifePoint, LoopCutParams,
    MaterialPolicy, Scale, MAX_BEVEL_SEGMENTS, MAX_LOOP_CUTS,
};
