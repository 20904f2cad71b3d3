//! Mesh file ingestion with inclusion-filter partitioning.
//!
//! This crate decodes triangle meshes into [`MeshModel`]s:
//!
//! - **DMT** - Native binary mesh format, version 1000
//! - **STL** (Stereolithography) - Binary and ASCII
//!
//! Every decoder takes an inclusion filter, a closure over the three corner
//! positions of a triangle, and splits the file into a [`Partition`]: the
//! `kept` model holds the triangles the filter accepted, the `excluded`
//! model the rest. Each model holds exactly one [`TriangleBlock`].
//!
//! [`TriangleBlock`]: mesh_model::TriangleBlock
//!
//! # Example
//!
//! ```no_run
//! use mesh_ingest::{read_mesh, read_mesh_partitioned};
//! use mesh_model::MeshTopology;
//!
//! // Everything
//! let model = read_mesh("model.dmt").unwrap();
//!
//! // Split at x = 0
//! let parts = read_mesh_partitioned("model.stl", |a, b, c| {
//!     a.x >= 0.0 && b.x >= 0.0 && c.x >= 0.0
//! })
//! .unwrap();
//! println!("{} / {}", parts.kept.triangle_count(), parts.excluded.triangle_count());
//! ```
//!
//! # Format Detection
//!
//! The format comes from the file extension (case-insensitive). STL files
//! are further classified as ASCII or binary from their first line. Files
//! with any other extension are skipped without error.
//!
//! # Resources
//!
//! Decoding is synchronous and single-threaded. Each call opens, fully
//! consumes and closes its own file; calls on different files can run on
//! different threads without coordination.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod dmt;
mod error;
mod params;
mod partition;
mod reader;
mod stl;
mod stream;

pub use dmt::{
    DMT_VERSION, DmtFlags, DmtInfo, IndexWidth, Precision, decode_dmt, decode_dmt_info, read_dmt,
    read_dmt_info,
};
pub use error::{IoError, IoResult};
pub use params::{DEFAULT_DMT_HEADER_LIMIT, ReadParams, StlDetection};
pub use partition::Partition;
pub use reader::MeshReader;
pub use stl::{
    StlKind, classify_stl, decode_stl_ascii, decode_stl_binary, detect_stl_kind, read_stl,
    read_stl_ascii, read_stl_binary,
};
pub use stream::LeReader;

use std::path::Path;

use mesh_model::{MeshModel, Point3};

/// Supported mesh file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeshFormat {
    /// DMT native binary mesh.
    Dmt,
    /// STL (Stereolithography) format.
    /// Supports binary and ASCII variants.
    Stl,
}

impl MeshFormat {
    /// Detect format from file extension.
    ///
    /// Returns `None` if the extension is not recognized.
    #[must_use]
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Self> {
        let ext = path.as_ref().extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "dmt" => Some(Self::Dmt),
            "stl" => Some(Self::Stl),
            _ => None,
        }
    }
}

/// Read every triangle of a mesh file into a new model.
///
/// # Errors
///
/// Returns an error if the file does not exist or its content is invalid
/// for the detected format. Unrecognized extensions yield an empty model.
pub fn read_mesh<P: AsRef<Path>>(path: P) -> IoResult<MeshModel> {
    MeshReader::new().read(path)
}

/// Read the triangles of a mesh file that the filter keeps.
///
/// # Errors
///
/// Same as [`read_mesh`].
pub fn read_mesh_filtered<P, F>(path: P, filter: F) -> IoResult<MeshModel>
where
    P: AsRef<Path>,
    F: Fn(Point3<f64>, Point3<f64>, Point3<f64>) -> bool,
{
    MeshReader::new().read_filtered(path, filter)
}

/// Read a mesh file into kept and excluded models.
///
/// # Errors
///
/// Same as [`read_mesh`].
pub fn read_mesh_partitioned<P, F>(path: P, filter: F) -> IoResult<Partition>
where
    P: AsRef<Path>,
    F: Fn(Point3<f64>, Point3<f64>, Point3<f64>) -> bool,
{
    MeshReader::new().read_partitioned(path, filter)
}

/// Append every triangle of a mesh file to `model`.
///
/// # Errors
///
/// Same as [`read_mesh`]. `model` is left untouched on error.
pub fn append_mesh<P: AsRef<Path>>(model: &mut MeshModel, path: P) -> IoResult<()> {
    MeshReader::new().append(model, path)
}

/// Append the kept triangles of a mesh file to `model` and return the
/// excluded ones.
///
/// # Errors
///
/// Same as [`read_mesh`]. `model` is left untouched on error.
pub fn append_mesh_filtered<P, F>(model: &mut MeshModel, path: P, filter: F) -> IoResult<MeshModel>
where
    P: AsRef<Path>,
    F: Fn(Point3<f64>, Point3<f64>, Point3<f64>) -> bool,
{
    MeshReader::new().append_filtered(model, path, filter)
}
