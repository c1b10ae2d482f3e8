//! Planar polygon geometry.
//!
//! Free functions over position slices so they can be used both on stored
//! faces and on rings that are still being built.

use nalgebra::{Point3, Vector3};

/// Lengths below this are treated as zero.
pub const GEOMETRY_EPSILON: f64 = 1e-10;

/// Unnormalized Newell normal of a closed ring.
///
/// Its length is twice the polygon's area. Robust for non-convex and
/// slightly non-planar rings.
#[must_use]
pub fn newell_vector(points: &[Point3<f64>]) -> Vector3<f64> {
    let n = points.len();
    let mut acc = Vector3::zeros();
    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        acc.x += (a.y - b.y) * (a.z + b.z);
        acc.y += (a.z - b.z) * (a.x + b.x);
        acc.z += (a.x - b.x) * (a.y + b.y);
    }
    acc
}

/// Unit Newell normal, or `None` for a degenerate ring.
///
/// # Example
///
/// ```
/// use mesh_types::{newell_normal, Point3};
///
/// let ring = [
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(1.0, 1.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
/// ];
/// let n = newell_normal(&ring).unwrap();
/// assert!((n.z - 1.0).abs() < 1e-12);
/// ```
#[must_use]
pub fn newell_normal(points: &[Point3<f64>]) -> Option<Vector3<f64>> {
    if points.len() < 3 {
        return None;
    }
    newell_vector(points).try_normalize(GEOMETRY_EPSILON)
}

/// Normal from the first three consecutive corners that are not collinear.
#[must_use]
pub fn first_noncollinear_normal(points: &[Point3<f64>]) -> Option<Vector3<f64>> {
    let n = points.len();
    if n < 3 {
        return None;
    }
    (0..n).find_map(|i| {
        let a = points[i];
        let b = points[(i + 1) % n];
        let c = points[(i + 2) % n];
        (b - a).cross(&(c - a)).try_normalize(GEOMETRY_EPSILON)
    })
}

/// Vertex average.
#[must_use]
pub fn centroid(points: &[Point3<f64>]) -> Point3<f64> {
    if points.is_empty() {
        return Point3::origin();
    }
    #[allow(clippy::cast_precision_loss)]
    let n = points.len() as f64;
    let sum = points
        .iter()
        .fold(Vector3::zeros(), |acc, p| acc + p.coords);
    Point3::from(sum / n)
}

/// Polygon area.
#[must_use]
pub fn area(points: &[Point3<f64>]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    newell_vector(points).norm() * 0.5
}
