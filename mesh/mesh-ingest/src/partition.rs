//! Kept/excluded partition of decoded triangles.

use mesh_model::{MeshModel, MeshTopology, TriangleBlock};

/// The two models produced by every decoder.
///
/// Each triangle of the source file lands in exactly one of the two models,
/// according to the inclusion filter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Partition {
    /// Triangles accepted by the filter.
    pub kept: MeshModel,
    /// Triangles rejected by the filter.
    pub excluded: MeshModel,
}

impl Partition {
    /// Total number of triangles across both models.
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.kept.triangle_count() + self.excluded.triangle_count()
    }

    /// Total number of vertices across both models.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.kept.vertex_count() + self.excluded.vertex_count()
    }
}

/// Which side of the partition a triangle goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Side {
    Kept,
    Excluded,
}

impl Side {
    pub(crate) const fn of(accepted: bool) -> Self {
        if accepted {
            Self::Kept
        } else {
            Self::Excluded
        }
    }
}

/// Per-side state a decoder carries through one pass: the accumulating
/// block plus whatever dedup map the format uses.
#[derive(Debug, Default)]
pub(crate) struct Sides<T> {
    pub(crate) kept: T,
    pub(crate) excluded: T,
}

impl<T> Sides<T> {
    pub(crate) fn new(kept: T, excluded: T) -> Self {
        Self { kept, excluded }
    }

    pub(crate) fn get_mut(&mut self, side: Side) -> &mut T {
        match side {
            Side::Kept => &mut self.kept,
            Side::Excluded => &mut self.excluded,
        }
    }

    pub(crate) fn both_mut(&mut self) -> [&mut T; 2] {
        [&mut self.kept, &mut self.excluded]
    }
}

impl Sides<TriangleBlock> {
    /// Wrap each accumulator block in its own single-block model.
    pub(crate) fn into_partition(self) -> Partition {
        Partition {
            kept: MeshModel::from_block(self.kept),
            excluded: MeshModel::from_block(self.excluded),
        }
    }
}
