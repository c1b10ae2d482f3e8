//! Traits for mesh types.

use crate::Aabb;
use nalgebra::Point3;

/// Live entity counts.
///
/// Counts never include tombstones.
pub trait MeshTopology {
    /// Number of live vertices.
    fn vertex_count(&self) -> usize;

    /// Number of live faces.
    fn face_count(&self) -> usize;

    /// Whether the mesh has no live vertices.
    fn is_empty(&self) -> bool {
        self.vertex_count() == 0
    }
}

/// Trait for types that can compute a bounding box.
pub trait MeshBounds {
    /// Axis-aligned bounds of all live vertices.
    ///
    /// Returns an empty AABB if the mesh has no vertices.
    fn bounds(&self) -> Aabb;

    /// Bounds, or `None` if empty.
    fn bounds_opt(&self) -> Option<Aabb> {
        let b = self.bounds();
        if b.is_empty() { None } else { Some(b) }
    }

    /// Center of the bounding box.
    fn center(&self) -> Point3<f64> {
        self.bounds().center()
    }
}
