//! Vertices and their shading attributes.

use nalgebra::{Point2, Point3, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::UserData;

/// Per-vertex RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VertexColor {
    /// Red.
    pub r: u8,
    /// Green.
    pub g: u8,
    /// Blue.
    pub b: u8,
}

impl VertexColor {
    /// Color from its three channels.
    #[inline]
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Linear blend between two colors, `t` clamped to [0, 1].
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn lerp(self, other: Self, t: f64) -> Self {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (f64::from(a) + (f64::from(b) - f64::from(a)) * t).round() as u8;
        Self {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
        }
    }
}

/// Shading attributes a vertex may carry.
///
/// Topology operations carry these forward onto the vertices they derive
/// from an existing one; normals are dropped because the new geometry
/// invalidates them.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VertexAttributes {
    /// Unit normal vector.
    pub normal: Option<Vector3<f64>>,

    /// Texture coordinates. Expected in [0, 1] but not enforced.
    pub uv: Option<Point2<f64>>,

    /// Color.
    pub color: Option<VertexColor>,
}

impl VertexAttributes {
    /// No attributes.
    #[inline]
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            normal: None,
            uv: None,
            color: None,
        }
    }

    /// Whether nothing is set.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.normal.is_none() && self.uv.is_none() && self.color.is_none()
    }

    /// Attributes for a vertex derived from `self`, without the normal.
    #[must_use]
    pub fn derived(&self) -> Self {
        Self {
            normal: None,
            uv: self.uv,
            color: self.color,
        }
    }

    /// Blend two attribute sets for a vertex placed between their owners.
    ///
    /// UVs and colors are interpolated only when both sides carry them.
    #[must_use]
    pub fn interpolate(&self, other: &Self, t: f64) -> Self {
        let uv = match (self.uv, other.uv) {
            (Some(a), Some(b)) => Some(a + (b - a) * t),
            _ => None,
        };
        let color = match (self.color, other.color) {
            (Some(a), Some(b)) => Some(a.lerp(b, t)),
            _ => None,
        };
        Self {
            normal: None,
            uv,
            color,
        }
    }
}

/// A mesh vertex: position, shading attributes and a host payload.
///
/// ```
/// use mesh_types::{Point3, Vertex};
///
/// let v = Vertex::from_coords(1.0, 2.0, 3.0).with_uv(0.5, 0.5);
/// assert_eq!(v.position, Point3::new(1.0, 2.0, 3.0));
/// assert!(v.normal().is_none());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Vertex {
    /// Position in model space.
    pub position: Point3<f64>,

    /// Optional attributes (normal, UV, color).
    pub attributes: VertexAttributes,

    /// Host-owned data; the kernel never inspects it.
    pub payload: Option<UserData>,
}

impl Vertex {
    /// Vertex at `position` with no attributes.
    #[inline]
    #[must_use]
    pub const fn new(position: Point3<f64>) -> Self {
        Self {
            position,
            attributes: VertexAttributes::empty(),
            payload: None,
        }
    }

    /// Vertex at `(x, y, z)`.
    #[inline]
    #[must_use]
    #[allow(clippy::missing_const_for_fn)] // Point3::new is not const in nalgebra
    pub fn from_coords(x: f64, y: f64, z: f64) -> Self {
        Self::new(Point3::new(x, y, z))
    }

    /// Builder: set the UV.
    #[must_use]
    pub fn with_uv(mut self, u: f64, v: f64) -> Self {
        self.attributes.uv = Some(Point2::new(u, v));
        self
    }

    /// Builder: set the normal.
    #[must_use]
    pub fn with_normal(mut self, normal: Vector3<f64>) -> Self {
        self.attributes.normal = Some(normal);
        self
    }

    /// Builder: set the color.
    #[must_use]
    pub fn with_color(mut self, color: VertexColor) -> Self {
        self.attributes.color = Some(color);
        self
    }

    /// Builder: attach a payload.
    #[must_use]
    pub fn with_payload(mut self, payload: UserData) -> Self {
        self.payload = Some(payload);
        self
    }

    /// A new vertex at `position` that inherits UV and color from `self`.
    ///
    /// The payload is not copied; it belongs to the original entity.
    #[must_use]
    pub fn derive_at(&self, position: Point3<f64>) -> Self {
        Self {
            position,
            attributes: self.attributes.derived(),
            payload: None,
        }
    }

    /// A new vertex at parameter `t` between `self` and `other`.
    #[must_use]
    pub fn lerp(&self, other: &Self, t: f64) -> Self {
        Self {
            position: self.position + (other.position - self.position) * t,
            attributes: self.attributes.interpolate(&other.attributes, t),
            payload: None,
        }
    }

    /// Stored normal.
    #[inline]
    #[must_use]
    pub const fn normal(&self) -> Option<Vector3<f64>> {
        self.attributes.normal
    }

    /// Stored UV.
    #[inline]
    #[must_use]
    pub const fn uv(&self) -> Option<Point2<f64>> {
        self.attributes.uv
    }
}
