//! Triangle blocks.

use nalgebra::{Point3, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{MeshTopology, ModelError, ModelResult, Triangle};

/// A vertex pool with three parallel corner-index lists.
///
/// This is the atomic unit of mesh storage. Triangle `i` is made of the
/// vertices `corner1[i]`, `corner2[i]` and `corner3[i]`.
///
/// # Invariants
///
/// - The three corner lists always have the same length.
/// - Every corner index is `< vertices().len()`.
/// - When [`has_vertex_normals`](Self::has_vertex_normals) is true,
///   `normals().len() == vertices().len()`; otherwise `normals()` is empty.
///
/// The block is append-only: vertices and triangles can be added, never
/// removed or rewritten.
///
/// # Example
///
/// ```
/// use mesh_model::{MeshTopology, Point3, TriangleBlock, Vector3};
///
/// let mut block = TriangleBlock::with_vertex_normals();
/// let up = Vector3::new(0.0, 0.0, 1.0);
/// let a = block.add_vertex_with_normal(Point3::new(0.0, 0.0, 0.0), up);
/// let b = block.add_vertex_with_normal(Point3::new(1.0, 0.0, 0.0), up);
/// let c = block.add_vertex_with_normal(Point3::new(0.0, 1.0, 0.0), up);
/// block.add_triangle(a, b, c).unwrap();
///
/// assert_eq!(block.triangle_count(), 1);
/// assert_eq!(block.normals().len(), 3);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TriangleBlock {
    vertices: Vec<Point3<f64>>,
    normals: Vec<Vector3<f64>>,
    has_vertex_normals: bool,
    corner1: Vec<u32>,
    corner2: Vec<u32>,
    corner3: Vec<u32>,
}

impl TriangleBlock {
    /// Create an empty block without vertex normals.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            vertices: Vec::new(),
            normals: Vec::new(),
            has_vertex_normals: false,
            corner1: Vec::new(),
            corner2: Vec::new(),
            corner3: Vec::new(),
        }
    }

    /// Create an empty block that stores one normal per vertex.
    #[inline]
    #[must_use]
    pub fn with_vertex_normals() -> Self {
        Self {
            has_vertex_normals: true,
            ..Self::new()
        }
    }

    /// Create an empty block with pre-allocated capacity.
    ///
    /// # Arguments
    ///
    /// * `vertex_count` - Expected number of vertices
    /// * `triangle_count` - Expected number of triangles
    /// * `has_vertex_normals` - Whether the block stores per-vertex normals
    #[must_use]
    pub fn with_capacity(
        vertex_count: usize,
        triangle_count: usize,
        has_vertex_normals: bool,
    ) -> Self {
        Self {
            vertices: Vec::with_capacity(vertex_count),
            normals: if has_vertex_normals {
                Vec::with_capacity(vertex_count)
            } else {
                Vec::new()
            },
            has_vertex_normals,
            corner1: Vec::with_capacity(triangle_count),
            corner2: Vec::with_capacity(triangle_count),
            corner3: Vec::with_capacity(triangle_count),
        }
    }

    /// Whether this block stores one normal per vertex.
    #[inline]
    #[must_use]
    pub const fn has_vertex_normals(&self) -> bool {
        self.has_vertex_normals
    }

    /// Switch the block to store vertex normals.
    ///
    /// Vertices already in the block get a zero normal. Does nothing if the
    /// block already stores normals.
    pub fn enable_vertex_normals(&mut self) {
        if self.has_vertex_normals {
            return;
        }
        self.has_vertex_normals = true;
        self.normals = vec![Vector3::zeros(); self.vertices.len()];
    }

    /// Append a vertex and return its index.
    ///
    /// If the block stores normals, a zero normal is appended alongside.
    #[inline]
    pub fn add_vertex(&mut self, position: Point3<f64>) -> u32 {
        self.add_vertex_with_normal(position, Vector3::zeros())
    }

    /// Append a vertex with its normal and return the vertex index.
    ///
    /// The normal is dropped if the block does not store normals.
    #[allow(clippy::cast_possible_truncation)]
    // Truncation: block indices are u32, blocks with >4B vertices are unsupported
    pub fn add_vertex_with_normal(&mut self, position: Point3<f64>, normal: Vector3<f64>) -> u32 {
        let index = self.vertices.len() as u32;
        self.vertices.push(position);
        if self.has_vertex_normals {
            self.normals.push(normal);
        }
        index
    }

    /// Append a triangle made of three existing vertices.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::IndexOutOfRange`] if any index does not name a
    /// vertex of this block. The block is left unchanged in that case.
    pub fn add_triangle(&mut self, a: u32, b: u32, c: u32) -> ModelResult<()> {
        for index in [a, b, c] {
            if index as usize >= self.vertices.len() {
                return Err(ModelError::IndexOutOfRange {
                    index,
                    vertex_count: self.vertices.len(),
                });
            }
        }
        self.corner1.push(a);
        self.corner2.push(b);
        self.corner3.push(c);
        Ok(())
    }

    /// Vertex positions.
    #[inline]
    #[must_use]
    pub fn vertices(&self) -> &[Point3<f64>] {
        &self.vertices
    }

    /// Per-vertex normals. Empty unless the block stores normals.
    #[inline]
    #[must_use]
    pub fn normals(&self) -> &[Vector3<f64>] {
        &self.normals
    }

    /// First-corner index of every triangle.
    #[inline]
    #[must_use]
    pub fn corner1(&self) -> &[u32] {
        &self.corner1
    }

    /// Second-corner index of every triangle.
    #[inline]
    #[must_use]
    pub fn corner2(&self) -> &[u32] {
        &self.corner2
    }

    /// Third-corner index of every triangle.
    #[inline]
    #[must_use]
    pub fn corner3(&self) -> &[u32] {
        &self.corner3
    }

    /// Get the three vertex indices of a triangle.
    ///
    /// Returns `None` if `triangle` is out of bounds.
    #[must_use]
    pub fn triangle_indices(&self, triangle: usize) -> Option<[u32; 3]> {
        Some([
            *self.corner1.get(triangle)?,
            *self.corner2.get(triangle)?,
            *self.corner3.get(triangle)?,
        ])
    }

    /// Get a triangle with resolved corner positions.
    ///
    /// Returns `None` if `triangle` is out of bounds.
    #[must_use]
    pub fn triangle(&self, triangle: usize) -> Option<Triangle> {
        self.triangle_indices(triangle).map(|[a, b, c]| self.resolve(a, b, c))
    }

    fn resolve(&self, a: u32, b: u32, c: u32) -> Triangle {
        Triangle::new(
            self.vertices[a as usize],
            self.vertices[b as usize],
            self.vertices[c as usize],
        )
    }
}

impl MeshTopology for TriangleBlock {
    #[inline]
    fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    fn triangle_count(&self) -> usize {
        self.corner1.len()
    }

    fn triangles(&self) -> impl Iterator<Item = Triangle> {
        self.corner1
            .iter()
            .zip(&self.corner2)
            .zip(&self.corner3)
            .map(|((&a, &b), &c)| self.resolve(a, b, c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle_block() -> TriangleBlock {
        let mut block = TriangleBlock::new();
        let a = block.add_vertex(Point3::new(0.0, 0.0, 0.0));
        let b = block.add_vertex(Point3::new(1.0, 0.0, 0.0));
        let c = block.add_vertex(Point3::new(0.0, 1.0, 0.0));
        block.add_triangle(a, b, c).unwrap();
        block
    }

    #[test]
    fn add_vertex_returns_sequential_indices() {
        let mut block = TriangleBlock::new();
        assert_eq!(block.add_vertex(Point3::origin()), 0);
        assert_eq!(block.add_vertex(Point3::origin()), 1);
        assert_eq!(block.add_vertex(Point3::origin()), 2);
        assert_eq!(block.vertex_count(), 3);
        assert!(block.normals().is_empty());
    }

    #[test]
    fn corner_lists_stay_parallel() {
        let mut block = triangle_block();
        block.add_triangle(2, 1, 0).unwrap();

        assert_eq!(block.triangle_count(), 2);
        assert_eq!(block.corner1(), &[0, 2]);
        assert_eq!(block.corner2(), &[1, 1]);
        assert_eq!(block.corner3(), &[2, 0]);
        assert_eq!(block.triangle_indices(1), Some([2, 1, 0]));
        assert_eq!(block.triangle_indices(2), None);
    }

    #[test]
    fn add_triangle_rejects_unknown_vertex() {
        let mut block = triangle_block();
        let err = block.add_triangle(0, 1, 3).unwrap_err();
        assert_eq!(
            err,
            ModelError::IndexOutOfRange {
                index: 3,
                vertex_count: 3
            }
        );
        assert_eq!(block.triangle_count(), 1);
        assert_eq!(block.corner1().len(), block.corner3().len());
    }

    #[test]
    fn normals_follow_vertices() {
        let mut block = TriangleBlock::with_vertex_normals();
        block.add_vertex_with_normal(Point3::origin(), Vector3::x());
        block.add_vertex(Point3::new(1.0, 0.0, 0.0));

        assert!(block.has_vertex_normals());
        assert_eq!(block.normals(), &[Vector3::x(), Vector3::zeros()]);
    }

    #[test]
    fn normal_dropped_without_normal_storage() {
        let mut block = TriangleBlock::new();
        block.add_vertex_with_normal(Point3::origin(), Vector3::z());
        assert!(block.normals().is_empty());
    }

    #[test]
    fn enable_vertex_normals_backfills() {
        let mut block = triangle_block();
        block.enable_vertex_normals();
        assert_eq!(block.normals().len(), 3);
        assert!(block.normals().iter().all(|n| *n == Vector3::zeros()));

        block.add_vertex_with_normal(Point3::new(5.0, 5.0, 5.0), Vector3::y());
        assert_eq!(block.normals().len(), 4);
        assert_eq!(block.normals()[3], Vector3::y());
    }

    #[test]
    fn triangles_resolve_positions() {
        let block = triangle_block();
        let tris: Vec<Triangle> = block.triangles().collect();
        assert_eq!(tris.len(), 1);
        assert_eq!(tris[0].v1, Point3::new(1.0, 0.0, 0.0));
        assert_eq!(block.triangle(0), Some(tris[0]));
        assert_eq!(block.triangle(1), None);
    }

    #[test]
    fn empty_block() {
        let block = TriangleBlock::default();
        assert!(block.is_empty());
        assert_eq!(block, TriangleBlock::new());
        assert_eq!(block.triangles().count(), 0);
    }
}
