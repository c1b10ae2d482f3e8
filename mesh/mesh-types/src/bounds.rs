//! Bounding boxes and planar UV projection.

use nalgebra::{Point2, Point3, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Axis-aligned box around a set of positions.
///
/// An inverted box (`min > max`) stands for "no points yet"; it is what
/// [`MeshBounds::bounds`](crate::MeshBounds::bounds) returns for a mesh with
/// no live vertices.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Aabb {
    /// Lower corner.
    pub min: Point3<f64>,
    /// Upper corner.
    pub max: Point3<f64>,
}

impl Aabb {
    /// Box spanning two opposite corners given in any order.
    #[must_use]
    pub fn new(a: Point3<f64>, b: Point3<f64>) -> Self {
        Self {
            min: a.inf(&b),
            max: a.sup(&b),
        }
    }

    /// The inverted box that any point grows into.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)] // Point3::new is not const in nalgebra
    pub fn empty() -> Self {
        Self {
            min: Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            max: Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    /// Smallest box holding every point; inverted when there are none.
    #[must_use]
    pub fn from_points<'a>(points: impl Iterator<Item = &'a Point3<f64>>) -> Self {
        points.fold(Self::empty(), |b, p| Self {
            min: b.min.inf(p),
            max: b.max.sup(p),
        })
    }

    /// Whether the box is inverted on any axis.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        (0..3).any(|i| self.min[i] > self.max[i])
    }

    /// Per-axis extent.
    #[inline]
    #[must_use]
    pub fn size(&self) -> Vector3<f64> {
        self.max - self.min
    }

    /// Midpoint of the two corners.
    #[inline]
    #[must_use]
    pub fn center(&self) -> Point3<f64> {
        nalgebra::center(&self.min, &self.max)
    }

    /// The two axes with the largest extent, larger first.
    ///
    /// Ties keep X before Y before Z.
    #[must_use]
    pub fn dominant_axes(&self) -> (usize, usize) {
        let s = self.size();
        let mut axes = [0usize, 1, 2];
        axes.sort_by(|&a, &b| s[b].total_cmp(&s[a]));
        (axes[0], axes[1])
    }

    /// Planar UV for `point`, projecting onto the two dominant axes and
    /// normalizing each to [0, 1].
    ///
    /// A zero-extent axis maps to 0.0.
    ///
    /// ```
    /// use mesh_types::{Aabb, Point3};
    ///
    /// let aabb = Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(4.0, 2.0, 0.0));
    /// let uv = aabb.project_uv(&Point3::new(1.0, 1.0, 0.0));
    /// assert_eq!((uv.x, uv.y), (0.25, 0.5));
    /// ```
    #[must_use]
    pub fn project_uv(&self, point: &Point3<f64>) -> Point2<f64> {
        let (u, v) = self.dominant_axes();
        let s = self.size();
        let normalize = |axis: usize| {
            if s[axis] > 0.0 {
                ((point[axis] - self.min[axis]) / s[axis]).clamp(0.0, 1.0)
            } else {
                0.0
            }
        };
        Point2::new(normalize(u), normalize(v))
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::empty()
    }
}
