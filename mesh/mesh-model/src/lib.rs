//! Triangle-block mesh model.
//!
//! This crate provides the in-memory representation that the mesh ingestion
//! decoders fill:
//!
//! - [`TriangleBlock`] - A vertex pool with three parallel corner-index lists
//!   and an optional per-vertex normal pool
//! - [`MeshModel`] - An ordered collection of triangle blocks
//! - [`Triangle`] - A triangle with resolved corner positions
//! - [`PointKey`] - Exact-value hash key for vertex deduplication
//!
//! Inclusion filters are plain closures over the three corner positions of
//! a triangle; [`accept_all`] is the default one.
//!
//! # Units
//!
//! The model is **unit-agnostic**. All coordinates are `f64`, whatever the
//! precision of the source file.
//!
//! # Example
//!
//! ```
//! use mesh_model::{MeshModel, MeshTopology, Point3, TriangleBlock};
//!
//! let mut block = TriangleBlock::new();
//! let a = block.add_vertex(Point3::new(0.0, 0.0, 0.0));
//! let b = block.add_vertex(Point3::new(1.0, 0.0, 0.0));
//! let c = block.add_vertex(Point3::new(0.0, 1.0, 0.0));
//! block.add_triangle(a, b, c).unwrap();
//!
//! let model = MeshModel::from_block(block);
//! assert_eq!(model.triangle_count(), 1);
//! assert_eq!(model.vertex_count(), 3);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod block;
mod error;
mod filter;
mod key;
mod model;
mod traits;
mod triangle;

pub use block::TriangleBlock;
pub use error::{ModelError, ModelResult};
pub use filter::{accept_all, reject_all};
pub use key::PointKey;
pub use model::MeshModel;
pub use traits::MeshTopology;
pub use triangle::Triangle;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point3, Vector3};
