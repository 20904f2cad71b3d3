//! Error types for mesh model construction.

use thiserror::Error;

/// Errors raised when a triangle block invariant would be broken.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// A triangle corner refers to a vertex the block does not have.
    #[error("vertex index {index} out of range for block with {vertex_count} vertices")]
    IndexOutOfRange {
        /// The offending corner index.
        index: u32,
        /// Number of vertices in the block.
        vertex_count: usize,
    },
}

/// Result type for mesh model operations.
pub type ModelResult<T> = std::result::Result<T, ModelError>;
