//! Mesh model: an ordered collection of triangle blocks.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{MeshTopology, Triangle, TriangleBlock};

/// One logical mesh made of one or more [`TriangleBlock`]s.
///
/// Block order follows the order in which blocks were added. Files appended
/// one after another keep their blocks in file order.
///
/// # Example
///
/// ```
/// use mesh_model::{MeshModel, MeshTopology, Point3, TriangleBlock};
///
/// let mut block = TriangleBlock::new();
/// let a = block.add_vertex(Point3::new(0.0, 0.0, 0.0));
/// let b = block.add_vertex(Point3::new(1.0, 0.0, 0.0));
/// let c = block.add_vertex(Point3::new(0.0, 1.0, 0.0));
/// block.add_triangle(a, b, c).unwrap();
///
/// let mut model = MeshModel::new();
/// model.push_block(block.clone());
/// model.append(MeshModel::from_block(block));
///
/// assert_eq!(model.block_count(), 2);
/// assert_eq!(model.triangle_count(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MeshModel {
    blocks: Vec<TriangleBlock>,
}

impl MeshModel {
    /// Create an empty model.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self { blocks: Vec::new() }
    }

    /// Create a model holding a single block.
    #[must_use]
    pub fn from_block(block: TriangleBlock) -> Self {
        Self {
            blocks: vec![block],
        }
    }

    /// Add a block at the end of the model.
    pub fn push_block(&mut self, block: TriangleBlock) {
        self.blocks.push(block);
    }

    /// Move every block of `other` onto the end of this model.
    pub fn append(&mut self, other: Self) {
        self.blocks.extend(other.blocks);
    }

    /// The blocks, in insertion order.
    #[inline]
    #[must_use]
    pub fn blocks(&self) -> &[TriangleBlock] {
        &self.blocks
    }

    /// Number of blocks.
    #[inline]
    #[must_use]
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Consume the model and return its blocks.
    #[must_use]
    pub fn into_blocks(self) -> Vec<TriangleBlock> {
        self.blocks
    }
}

impl From<TriangleBlock> for MeshModel {
    fn from(block: TriangleBlock) -> Self {
        Self::from_block(block)
    }
}

impl MeshTopology for MeshModel {
    fn vertex_count(&self) -> usize {
        self.blocks.iter().map(MeshTopology::vertex_count).sum()
    }

    fn triangle_count(&self) -> usize {
        self.blocks.iter().map(MeshTopology::triangle_count).sum()
    }

    fn triangles(&self) -> impl Iterator<Item = Triangle> {
        self.blocks.iter().flat_map(|block| block.triangles())
    }
}
