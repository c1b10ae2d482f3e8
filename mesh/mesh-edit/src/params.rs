//! Typed parameters for every editing operation.
//!
//! Each struct has explicit defaults and `with_*` builders. Validation of
//! ranges happens inside the operation and is reported as
//! [`EditErrorKind::InvalidParameter`](crate::EditErrorKind::InvalidParameter).

use mesh_types::{EdgeId, FaceId, Vector3, VertexId};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{EditError, EditResult};

/// How new faces pick their material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MaterialPolicy {
    /// Copy the material of the face the new geometry grows from.
    #[default]
    Inherit,
    /// Use this material for every new face.
    Fixed(i32),
}

impl MaterialPolicy {
    /// Material for a face derived from a face with `source` material.
    #[inline]
    #[must_use]
    pub const fn resolve(self, source: i32) -> i32 {
        match self {
            Self::Inherit => source,
            Self::Fixed(m) => m,
        }
    }
}

/// Scale applied to an extruded ring about its centroid.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Scale {
    /// Same factor on every axis.
    Uniform(f64),
    /// One factor per world axis.
    PerAxis(Vector3<f64>),
}

impl Scale {
    /// Factors as a vector.
    #[must_use]
    pub fn factors(self) -> Vector3<f64> {
        match self {
            Self::Uniform(s) => Vector3::new(s, s, s),
            Self::PerAxis(v) => v,
        }
    }
}

/// Parameters for [`extrude_face`](crate::extrude_face).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ExtrudeFaceParams {
    /// Offset along the face normal. Negative extrudes inward.
    pub distance: f64,
    /// Optional scale of the new ring about its centroid.
    pub scale: Option<Scale>,
    /// Keep the original face instead of removing it.
    pub keep_original: bool,
    /// Material of the side walls and cap.
    pub material: MaterialPolicy,
}

impl Default for ExtrudeFaceParams {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl ExtrudeFaceParams {
    /// Extrude by `distance` with no scale, removing the original face.
    #[must_use]
    pub const fn new(distance: f64) -> Self {
        Self {
            distance,
            scale: None,
            keep_original: false,
            material: MaterialPolicy::Inherit,
        }
    }

    /// Set the scale of the new ring.
    #[must_use]
    pub const fn with_scale(mut self, scale: Scale) -> Self {
        self.scale = Some(scale);
        self
    }

    /// Keep or remove the original face.
    #[must_use]
    pub const fn with_keep_original(mut self, keep: bool) -> Self {
        self.keep_original = keep;
        self
    }

    /// Set the material policy.
    #[must_use]
    pub const fn with_material(mut self, material: MaterialPolicy) -> Self {
        self.material = material;
        self
    }

    pub(crate) fn check(&self) -> EditResult<()> {
        finite("distance", self.distance)?;
        if let Some(scale) = self.scale {
            let f = scale.factors();
            if f.iter().any(|c| !c.is_finite()) {
                return Err(EditError::invalid_parameter("scale must be finite"));
            }
        }
        Ok(())
    }
}

/// Parameters for [`extrude_edge`](crate::extrude_edge).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ExtrudeEdgeParams {
    /// Offset length.
    pub distance: f64,
    /// Offset direction; derived from the edge and world up when absent.
    pub direction: Option<Vector3<f64>>,
    /// Material of the closing quad.
    pub material: MaterialPolicy,
    /// Retire the original edge and sweep it into an open outline.
    ///
    /// Only wire edges (no adjacent face) accept this; no closing quad is
    /// built because it would need the removed edge as a side.
    pub remove_original: bool,
}

impl Default for ExtrudeEdgeParams {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl ExtrudeEdgeParams {
    /// Extrude by `distance` in the default direction.
    #[must_use]
    pub const fn new(distance: f64) -> Self {
        Self {
            distance,
            direction: None,
            material: MaterialPolicy::Inherit,
            remove_original: false,
        }
    }

    /// Keep or remove the original edge.
    #[must_use]
    pub const fn with_remove_original(mut self, remove: bool) -> Self {
        self.remove_original = remove;
        self
    }

    /// Set an explicit direction. It is normalized before use.
    #[must_use]
    pub const fn with_direction(mut self, direction: Vector3<f64>) -> Self {
        self.direction = Some(direction);
        self
    }

    /// Set the material policy.
    #[must_use]
    pub const fn with_material(mut self, material: MaterialPolicy) -> Self {
        self.material = material;
        self
    }
}

/// Parameters for [`extrude_vertex`](crate::extrude_vertex).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ExtrudeVertexParams {
    /// Offset length.
    pub distance: f64,
    /// Offset direction; derived from normals when absent.
    pub direction: Option<Vector3<f64>>,
}

impl Default for ExtrudeVertexParams {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl ExtrudeVertexParams {
    /// Extrude by `distance` in the default direction.
    #[must_use]
    pub const fn new(distance: f64) -> Self {
        Self {
            distance,
            direction: None,
        }
    }

    /// Set an explicit direction. It is normalized before use.
    #[must_use]
    pub const fn with_direction(mut self, direction: Vector3<f64>) -> Self {
        self.direction = Some(direction);
        self
    }
}

/// Feature a bevel is applied to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BevelTarget {
    /// Chamfer a corner.
    Vertex(VertexId),
    /// Round or chamfer an edge between two faces.
    Edge(EdgeId),
    /// Bevel the rim of a face.
    Face(FaceId),
}

/// Largest [`BevelParams::segments`] accepted.
pub const MAX_BEVEL_SEGMENTS: u32 = 64;

/// Largest [`LoopCutParams::cuts`] accepted.
pub const MAX_LOOP_CUTS: u32 = 64;

/// Parameters for [`bevel`](crate::bevel).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BevelParams {
    /// Bevel width.
    pub distance: f64,
    /// Number of strip segments, from 1 to [`MAX_BEVEL_SEGMENTS`].
    pub segments: u32,
    /// Material of new faces.
    pub material: MaterialPolicy,
}

impl Default for BevelParams {
    fn default() -> Self {
        Self::new(0.1)
    }
}

impl BevelParams {
    /// A single-segment chamfer of width `distance`.
    #[must_use]
    pub const fn new(distance: f64) -> Self {
        Self {
            distance,
            segments: 1,
            material: MaterialPolicy::Inherit,
        }
    }

    /// Set the segment count.
    #[must_use]
    pub const fn with_segments(mut self, segments: u32) -> Self {
        self.segments = segments;
        self
    }

    /// Set the material policy.
    #[must_use]
    pub const fn with_material(mut self, material: MaterialPolicy) -> Self {
        self.material = material;
        self
    }

    pub(crate) fn check(&self) -> EditResult<()> {
        if self.segments < 1 {
            return Err(EditError::invalid_parameter("segments must be at least 1"));
        }
        if self.segments > MAX_BEVEL_SEGMENTS {
            return Err(EditError::invalid_parameter(format!(
                "segments {} exceeds the limit of {MAX_BEVEL_SEGMENTS}",
                self.segments
            )));
        }
        finite("distance", self.distance)?;
        if self.distance <= 0.0 {
            return Err(EditError::invalid_parameter("bevel distance must be positive"));
        }
        Ok(())
    }
}

/// How a multi-face inset treats shared edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum InsetMode {
    /// Each face is inset on its own.
    #[default]
    Individual,
    /// The selection is inset as one region; only its boundary moves.
    Connected,
}

/// Parameters for [`inset`](crate::inset).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct InsetParams {
    /// Inward offset in the face plane.
    pub distance: f64,
    /// Individual or connected.
    pub mode: InsetMode,
    /// Merge new vertices closer than this after the inset.
    pub merge_tolerance: Option<f64>,
    /// Material of the connecting quads.
    pub material: MaterialPolicy,
}

impl Default for InsetParams {
    fn default() -> Self {
        Self::new(0.1)
    }
}

impl InsetParams {
    /// Individual inset by `distance`.
    #[must_use]
    pub const fn new(distance: f64) -> Self {
        Self {
            distance,
            mode: InsetMode::Individual,
            merge_tolerance: None,
            material: MaterialPolicy::Inherit,
        }
    }

    /// Set the mode.
    #[must_use]
    pub const fn with_mode(mut self, mode: InsetMode) -> Self {
        self.mode = mode;
        self
    }

    /// Enable the merge post-pass.
    #[must_use]
    pub const fn with_merge_tolerance(mut self, tolerance: f64) -> Self {
        self.merge_tolerance = Some(tolerance);
        self
    }

    /// Set the material policy.
    #[must_use]
    pub const fn with_material(mut self, material: MaterialPolicy) -> Self {
        self.material = material;
        self
    }

    pub(crate) fn check(&self) -> EditResult<()> {
        finite("distance", self.distance)?;
        if let Some(t) = self.merge_tolerance {
            if !t.is_finite() || t < 0.0 {
                return Err(EditError::invalid_parameter(
                    "merge tolerance must be finite and non-negative",
                ));
            }
        }
        Ok(())
    }
}

/// Faces generated between two bridged edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BridgeTopology {
    /// Two quads.
    #[default]
    Quads,
    /// Four triangles.
    Triangles,
}

/// Parameters for the bridge family.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BridgeParams {
    /// Position of the middle vertices: 0 at edge A, 1 at edge B.
    pub smoothing: f64,
    /// Quads or triangles.
    pub topology: BridgeTopology,
    /// Material of the bridge faces.
    pub material: MaterialPolicy,
    /// Face-bridge pairs with a shorter/longer length ratio below this are
    /// rejected.
    pub min_length_ratio: f64,
    /// Face-bridge pairs whose midpoints are farther apart than this times
    /// the longer edge are rejected.
    pub max_distance_factor: f64,
}

impl Default for BridgeParams {
    fn default() -> Self {
        Self {
            smoothing: 0.5,
            topology: BridgeTopology::Quads,
            material: MaterialPolicy::Inherit,
            min_length_ratio: 0.5,
            max_distance_factor: 2.0,
        }
    }
}

impl BridgeParams {
    /// Default bridge: middle vertices halfway, two quads.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the smoothing factor.
    #[must_use]
    pub const fn with_smoothing(mut self, smoothing: f64) -> Self {
        self.smoothing = smoothing;
        self
    }

    /// Set the generated topology.
    #[must_use]
    pub const fn with_topology(mut self, topology: BridgeTopology) -> Self {
        self.topology = topology;
        self
    }

    /// Set the material policy.
    #[must_use]
    pub const fn with_material(mut self, material: MaterialPolicy) -> Self {
        self.material = material;
        self
    }

    pub(crate) fn check(&self) -> EditResult<()> {
        if !(0.0..=1.0).contains(&self.smoothing) {
            return Err(EditError::invalid_parameter(format!(
                "smoothing must be in [0, 1], got {}",
                self.smoothing
            )));
        }
        Ok(())
    }
}

/// Parameters for [`loop_cut`](crate::loop_cut).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LoopCutParams {
    /// Number of evenly spaced cuts, from 1 to [`MAX_LOOP_CUTS`].
    pub cuts: u32,
}

impl Default for LoopCutParams {
    fn default() -> Self {
        Self { cuts: 1 }
    }
}

impl LoopCutParams {
    /// `cuts` evenly spaced loops.
    #[must_use]
    pub const fn new(cuts: u32) -> Self {
        Self { cuts }
    }

    pub(crate) fn check(self) -> EditResult<()> {
        if self.cuts < 1 {
            return Err(EditError::invalid_parameter("loop cut needs at least 1 cut"));
        }
        if self.cuts > MAX_LOOP_CUTS {
            return Err(EditError::invalid_parameter(format!(
                "{} cuts exceeds the limit of {MAX_LOOP_CUTS}",
                self.cuts
            )));
        }
        Ok(())
    }
}

/// One stop on a knife path.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum KnifePoint {
    /// An existing vertex.
    Vertex(VertexId),
    /// A new vertex at parameter `t` along `edge`, from `v1` toward `v2`.
    Edge {
        /// Edge to split.
        edge: EdgeId,
        /// Split parameter, strictly between 0 and 1.
        t: f64,
    },
}

pub(crate) fn check_split(t: f64) -> EditResult<()> {
    if t > 0.0 && t < 1.0 {
        Ok(())
    } else {
        Err(EditError::invalid_parameter(format!(
            "split parameter must be strictly between 0 and 1, got {t}"
        )))
    }
}

fn finite(name: &str, value: f64) -> EditResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(EditError::invalid_parameter(format!("{name} must be finite")))
    }
}

pub(crate) fn check_distance(value: f64) -> EditResult<()> {
    finite("distance", value)
}
