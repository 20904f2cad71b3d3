//! Exact-value vertex keys.

use nalgebra::Point3;

/// Hashable key identifying a position by its exact coordinate values.
///
/// Two positions produce the same key only if every coordinate is equal
/// with `==`; there is no tolerance. `-0.0` is folded into `+0.0` so the key
/// agrees with floating-point equality. NaN coordinates match only a NaN with
/// the same bit pattern.
///
/// # Example
///
/// ```
/// use mesh_model::{Point3, PointKey};
///
/// let a = PointKey::new(&Point3::new(1.0, 0.0, 2.5));
/// let b = PointKey::new(&Point3::new(1.0, -0.0, 2.5));
/// let c = PointKey::new(&Point3::new(1.0, 0.0, 2.500_000_1));
///
/// assert_eq!(a, b);
/// assert_ne!(a, c);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PointKey([u64; 3]);

impl PointKey {
    /// Build the key for a position.
    #[inline]
    #[must_use]
    pub fn new(point: &Point3<f64>) -> Self {
        Self([bits(point.x), bits(point.y), bits(point.z)])
    }
}

impl From<&Point3<f64>> for PointKey {
    fn from(point: &Point3<f64>) -> Self {
        Self::new(point)
    }
}

impl From<Point3<f64>> for PointKey {
    fn from(point: Point3<f64>) -> Self {
        Self::new(&point)
    }
}

#[inline]
fn bits(value: f64) -> u64 {
    // Adding +0.0 maps -0.0 to +0.0 and leaves everything else untouched.
    (value + 0.0).to_bits()
}
