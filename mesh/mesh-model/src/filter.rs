//! Stock inclusion filters.
//!
//! An inclusion filter is any `Fn(Point3<f64>, Point3<f64>, Point3<f64>) -> bool`.
//! It is called once per triangle with the three corner positions as read
//! from the file, before deduplication. `true` routes the triangle to the
//! kept model, `false` to the excluded one.

use nalgebra::Point3;

/// Filter that keeps every triangle.
///
/// Used whenever the caller does not supply a filter.
///
/// # Example
///
/// ```
/// use mesh_model::{Point3, accept_all};
///
/// let p = Point3::origin();
/// assert!(accept_all(p, p, p));
/// ```
#[inline]
#[must_use]
pub fn accept_all(_: Point3<f64>, _: Point3<f64>, _: Point3<f64>) -> bool {
    true
}

/// Filter that excludes every triangle.
#[inline]
#[must_use]
pub fn reject_all(_: Point3<f64>, _: Point3<f64>, _: Point3<f64>) -> bool {
    false
}
