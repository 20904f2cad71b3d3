//! Error types for mesh ingestion.

use std::fs::File;
use std::path::{Path, PathBuf};

use mesh_model::ModelError;
use thiserror::Error;

/// Result type for mesh ingestion operations.
pub type IoResult<T> = Result<T, IoError>;

/// Errors that can occur while decoding a mesh file.
///
/// Every error aborts the decode of the current file; partially built
/// models are dropped.
#[derive(Debug, Error)]
pub enum IoError {
    /// File not found.
    #[error("file not found: {path}")]
    FileNotFound {
        /// Path that was not found.
        path: PathBuf,
    },

    /// DMT format version other than the supported one.
    #[error("unsupported DMT format version {version} (expected {})", crate::dmt::DMT_VERSION)]
    UnsupportedFileFormat {
        /// Version found in the file.
        version: u16,
    },

    /// DMT file declares zero triangle blocks.
    #[error("DMT file declares no triangle blocks")]
    NoTriangleBlocks,

    /// DMT file declares zero vertices.
    #[error("DMT file declares no vertices")]
    NoVertices,

    /// DMT file declares zero triangles.
    #[error("DMT file declares no triangles")]
    NoTriangles,

    /// Trailing version tag of a DMT block differs from the file version.
    #[error("DMT block {block} ends with version {found}, file version is {expected}")]
    BlockVersionDoesNotMatchFileVersion {
        /// Zero-based block number.
        block: u32,
        /// File version.
        expected: u16,
        /// Version tag found after the block.
        found: u16,
    },

    /// A DMT triangle refers to a vertex outside its block.
    #[error("DMT block {block}: vertex index {index} out of range ({vertex_count} vertices)")]
    VertexIndexOutOfRange {
        /// Zero-based block number.
        block: u32,
        /// The offending index.
        index: u32,
        /// Number of vertices in the block.
        vertex_count: u32,
    },

    /// ASCII STL facet loop closed with fewer than three vertices.
    #[error("malformed STL facet at line {line}: {vertices} vertices before endloop")]
    MalformedFacet {
        /// One-based line number of the `endloop`.
        line: usize,
        /// Number of vertices collected in the loop.
        vertices: usize,
    },

    /// Stream ended in the middle of a binary record.
    #[error("unexpected end of file at position {position}")]
    UnexpectedEof {
        /// Offset of the read that ran out of data.
        position: u64,
    },

    /// Mesh model invariant violation.
    #[error("mesh model error: {0}")]
    Model(#[from] ModelError),

    /// I/O error from the underlying stream.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl IoError {
    /// Whether this error comes from the byte stream rather than the format.
    #[must_use]
    pub const fn is_stream_error(&self) -> bool {
        matches!(self, Self::Io(_) | Self::UnexpectedEof { .. })
    }
}

/// Open a file for reading, reporting a missing file as [`IoError::FileNotFound`].
pub(crate) fn open_file(path: &Path) -> IoResult<File> {
    File::open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            IoError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            IoError::Io(e)
        }
    })
}
