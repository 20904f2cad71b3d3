//! Traits for mesh model types.

use crate::Triangle;

/// Read-only topology shared by [`TriangleBlock`](crate::TriangleBlock) and
/// [`MeshModel`](crate::MeshModel).
pub trait MeshTopology {
    /// Get the number of vertices.
    fn vertex_count(&self) -> usize;

    /// Get the number of triangles.
    fn triangle_count(&self) -> usize;

    /// Check if there are no triangles.
    fn is_empty(&self) -> bool {
        self.triangle_count() == 0
    }

    /// Iterate over all triangles with resolved corner positions.
    fn triangles(&self) -> impl Iterator<Item = Triangle>;
}
