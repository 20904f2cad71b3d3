//! Triangle with resolved corner positions.

use nalgebra::Point3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A triangle with concrete corner positions.
///
/// Produced by [`MeshTopology::triangles`](crate::MeshTopology::triangles)
/// when walking a block or model. Corner order matches the `corner1`,
/// `corner2`, `corner3` lists of the block it came from.
///
/// # Example
///
/// ```
/// use mesh_model::{Point3, Triangle, Vector3};
///
/// let tri = Triangle::new(
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(3.0, 0.0, 0.0),
///     Point3::new(0.0, 3.0, 0.0),
/// );
/// let [a, b, _] = tri.vertices();
/// assert_eq!(b - a, Vector3::new(3.0, 0.0, 0.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Triangle {
    /// First corner.
    pub v0: Point3<f64>,
    /// Second corner.
    pub v1: Point3<f64>,
    /// Third corner.
    pub v2: Point3<f64>,
}

impl Triangle {
    /// Create a new triangle from three points.
    #[inline]
    #[must_use]
    pub const fn new(v0: Point3<f64>, v1: Point3<f64>, v2: Point3<f64>) -> Self {
        Self { v0, v1, v2 }
    }

    /// Get the corners as an array.
    #[inline]
    #[must_use]
    pub const fn vertices(&self) -> [Point3<f64>; 3] {
        [self.v0, self.v1, self.v2]
    }
}
