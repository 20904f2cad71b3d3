//! DMT (native binary mesh) decoding.
//!
//! # Layout
//!
//! All values are little-endian.
//!
//! ```text
//! CHAR[..256]  – Header text, NUL-terminated or cut at the header limit
//! UINT16       – Format version (must be 1000)
//! UINT32       – File flags (bit 0: coordinates are REAL32, else REAL64)
//! UINT32       – Block count
//! UINT32       – Total vertex count
//! UINT32       – Total triangle count
//! foreach block
//!     UINT32       – Block flags (bit 0: vertices carry normals)
//!     UINT32       – Vertex count V
//!     UINT32       – Triangle count T
//!     foreach vertex
//!         REAL[3]  – Position
//!         REAL[3]  – Normal (only if the block carries normals)
//!     end
//!     foreach triangle
//!         UINT[3]  – Corner indices, UINT16 if V <= 65535, else UINT32
//!     end
//!     UINT16       – Version tag, must equal the file version
//! end
//! ```
//!
//! Corners are deduplicated by block-local index: the format stores one
//! index per distinct position, so the same index always means the same
//! vertex within a block. Triangles of every block flow into one kept and
//! one excluded accumulator block.

use std::io::{BufReader, Read};
use std::path::Path;

use mesh_model::{MeshTopology, Point3, TriangleBlock, Vector3};
use tracing::{debug, info, warn};

use crate::error::{IoError, IoResult, open_file};
use crate::params::DEFAULT_DMT_HEADER_LIMIT;
use crate::partition::{Partition, Side, Sides};
use crate::stream::LeReader;

/// The only supported DMT format version.
pub const DMT_VERSION: u16 = 1000;

/// File flag: coordinates are stored as `f32`.
const FILE_FLAG_SINGLE_PRECISION: u32 = 1;

/// Block flag: every vertex record is followed by a normal.
const BLOCK_FLAG_VERTEX_NORMALS: u32 = 1;

/// Largest vertex count whose indices are stored as `u16`.
const U16_INDEX_LIMIT: u32 = 65_535;

/// Upper bound on vertices pre-allocated from an untrusted block count.
const MAX_PREALLOCATED_VERTICES: usize = 1 << 20;

/// Storage precision of DMT coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Precision {
    /// 32-bit floats.
    Single,
    /// 64-bit floats.
    Double,
}

impl Precision {
    /// Read one coordinate.
    fn read<R: Read>(self, reader: &mut LeReader<R>) -> IoResult<f64> {
        match self {
            Self::Single => reader.read_f32().map(f64::from),
            Self::Double => reader.read_f64(),
        }
    }

    fn read_triple<R: Read>(self, reader: &mut LeReader<R>) -> IoResult<[f64; 3]> {
        Ok([self.read(reader)?, self.read(reader)?, self.read(reader)?])
    }
}

/// Width of the corner indices of one DMT block.
///
/// Chosen per block from that block's own vertex count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexWidth {
    /// 16-bit indices, for blocks of at most 65535 vertices.
    U16,
    /// 32-bit indices.
    U32,
}

impl IndexWidth {
    /// Pick the index width for a block with `vertex_count` vertices.
    ///
    /// # Example
    ///
    /// ```
    /// use mesh_ingest::IndexWidth;
    ///
    /// assert_eq!(IndexWidth::for_vertex_count(65_535), IndexWidth::U16);
    /// assert_eq!(IndexWidth::for_vertex_count(65_536), IndexWidth::U32);
    /// ```
    #[must_use]
    pub const fn for_vertex_count(vertex_count: u32) -> Self {
        if vertex_count > U16_INDEX_LIMIT {
            Self::U32
        } else {
            Self::U16
        }
    }

    fn read<R: Read>(self, reader: &mut LeReader<R>) -> IoResult<u32> {
        match self {
            Self::U16 => reader.read_u16().map(u32::from),
            Self::U32 => reader.read_u32(),
        }
    }
}

/// Global DMT file flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DmtFlags {
    /// Raw flag bits as stored in the file.
    pub bits: u32,
}

impl DmtFlags {
    /// Coordinate precision selected by bit 0.
    #[must_use]
    pub const fn precision(self) -> Precision {
        if self.bits & FILE_FLAG_SINGLE_PRECISION != 0 {
            Precision::Single
        } else {
            Precision::Double
        }
    }
}

/// DMT file preamble: everything before the first block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DmtInfo {
    /// Free-form header text.
    pub header: String,
    /// Format version, always [`DMT_VERSION`] once validated.
    pub version: u16,
    /// Global flags.
    pub flags: DmtFlags,
    /// Declared number of blocks.
    pub block_count: u32,
    /// Declared total number of vertices.
    pub vertex_count: u32,
    /// Declared total number of triangles.
    pub triangle_count: u32,
}

/// Decode a DMT file.
///
/// # Arguments
///
/// * `path` - Path to the DMT file
/// * `filter` - Inclusion filter over the three corner positions
///
/// # Errors
///
/// Returns [`IoError::FileNotFound`] if the file does not exist; see
/// [`decode_dmt`] for content errors.
///
/// # Example
///
/// ```no_run
/// use mesh_ingest::read_dmt;
/// use mesh_model::{MeshTopology, accept_all};
///
/// let parts = read_dmt("part.dmt", accept_all).unwrap();
/// println!("{} triangles", parts.kept.triangle_count());
/// ```
pub fn read_dmt<P, F>(path: P, filter: F) -> IoResult<Partition>
where
    P: AsRef<Path>,
    F: Fn(Point3<f64>, Point3<f64>, Point3<f64>) -> bool,
{
    read_dmt_limited(path.as_ref(), filter, DEFAULT_DMT_HEADER_LIMIT)
}

pub(crate) fn read_dmt_limited<F>(
    path: &Path,
    filter: F,
    header_limit: usize,
) -> IoResult<Partition>
where
    F: Fn(Point3<f64>, Point3<f64>, Point3<f64>) -> bool,
{
    let file = open_file(path)?;
    debug!(path = %path.display(), "Reading DMT file");
    decode_dmt_limited(BufReader::new(file), filter, header_limit)
}

/// Decode DMT bytes.
///
/// The reader is consumed; a file handle passed in is closed when this
/// function returns, on success and on error alike.
///
/// # Errors
///
/// Returns an error if:
/// - The version is not 1000 ([`IoError::UnsupportedFileFormat`])
/// - The block, vertex or triangle total is zero ([`IoError::NoTriangleBlocks`],
///   [`IoError::NoVertices`], [`IoError::NoTriangles`])
/// - A triangle refers to a vertex outside its block
///   ([`IoError::VertexIndexOutOfRange`])
/// - A block's trailing version tag differs from the file version
///   ([`IoError::BlockVersionDoesNotMatchFileVersion`])
/// - The stream ends early ([`IoError::UnexpectedEof`]) or cannot be read
///   ([`IoError::Io`])
pub fn decode_dmt<R, F>(reader: R, filter: F) -> IoResult<Partition>
where
    R: Read,
    F: Fn(Point3<f64>, Point3<f64>, Point3<f64>) -> bool,
{
    decode_dmt_limited(reader, filter, DEFAULT_DMT_HEADER_LIMIT)
}

pub(crate) fn decode_dmt_limited<R, F>(
    reader: R,
    filter: F,
    header_limit: usize,
) -> IoResult<Partition>
where
    R: Read,
    F: Fn(Point3<f64>, Point3<f64>, Point3<f64>) -> bool,
{
    let mut reader = LeReader::new(reader);
    let info = read_preamble(&mut reader, header_limit)?;
    decode_blocks(&mut reader, &info, &filter)
}

/// Read the preamble of a DMT file without decoding any block.
///
/// # Errors
///
/// Same preamble errors as [`decode_dmt`].
pub fn read_dmt_info<P: AsRef<Path>>(path: P) -> IoResult<DmtInfo> {
    let file = open_file(path.as_ref())?;
    decode_dmt_info(BufReader::new(file))
}

/// Decode the preamble of a DMT stream.
///
/// # Errors
///
/// Same preamble errors as [`decode_dmt`].
pub fn decode_dmt_info<R: Read>(reader: R) -> IoResult<DmtInfo> {
    read_preamble(&mut LeReader::new(reader), DEFAULT_DMT_HEADER_LIMIT)
}

fn read_preamble<R: Read>(reader: &mut LeReader<R>, header_limit: usize) -> IoResult<DmtInfo> {
    let header = reader.read_terminated_string(header_limit)?;

    let version = reader.read_u16()?;
    if version != DMT_VERSION {
        return Err(IoError::UnsupportedFileFormat { version });
    }

    let flags = DmtFlags {
        bits: reader.read_u32()?,
    };

    let block_count = reader.read_u32()?;
    if block_count == 0 {
        return Err(IoError::NoTriangleBlocks);
    }
    let vertex_count = reader.read_u32()?;
    if vertex_count == 0 {
        return Err(IoError::NoVertices);
    }
    let triangle_count = reader.read_u32()?;
    if triangle_count == 0 {
        return Err(IoError::NoTriangles);
    }

    Ok(DmtInfo {
        header,
        version,
        flags,
        block_count,
        vertex_count,
        triangle_count,
    })
}

/// Vertices of one source block, before deduplication.
struct SourceVertices {
    positions: Vec<Point3<f64>>,
    normals: Option<Vec<Vector3<f64>>>,
}

impl SourceVertices {
    fn read<R: Read>(
        reader: &mut LeReader<R>,
        precision: Precision,
        count: u32,
        has_normals: bool,
    ) -> IoResult<Self> {
        let capacity = (count as usize).min(MAX_PREALLOCATED_VERTICES);
        let mut positions = Vec::with_capacity(capacity);
        let mut normals = has_normals.then(|| Vec::with_capacity(capacity));

        for _ in 0..count {
            let [x, y, z] = precision.read_triple(reader)?;
            positions.push(Point3::new(x, y, z));
            if let Some(normals) = normals.as_mut() {
                let [nx, ny, nz] = precision.read_triple(reader)?;
                normals.push(Vector3::new(nx, ny, nz));
            }
        }

        Ok(Self { positions, normals })
    }

    fn normal(&self, index: usize) -> Vector3<f64> {
        self.normals
            .as_ref()
            .map_or_else(Vector3::zeros, |normals| normals[index])
    }
}

/// Block-local index to destination index, for one partition.
#[derive(Debug, Default)]
struct IndexRemap {
    slots: Vec<Option<u32>>,
}

impl IndexRemap {
    fn reset(&mut self, vertex_count: usize) {
        self.slots.clear();
        self.slots.resize(vertex_count, None);
    }

    /// Destination index of source vertex `index`, copying it into `block`
    /// on first use.
    fn resolve(&mut self, index: u32, block: &mut TriangleBlock, source: &SourceVertices) -> u32 {
        let i = index as usize;
        if let Some(existing) = self.slots[i] {
            return existing;
        }
        let added = block.add_vertex_with_normal(source.positions[i], source.normal(i));
        self.slots[i] = Some(added);
        added
    }
}

fn decode_blocks<R, F>(
    reader: &mut LeReader<R>,
    info: &DmtInfo,
    filter: &F,
) -> IoResult<Partition>
where
    R: Read,
    F: Fn(Point3<f64>, Point3<f64>, Point3<f64>) -> bool,
{
    let precision = info.flags.precision();
    let mut sides = Sides::new(TriangleBlock::new(), TriangleBlock::new());
    let mut remaps: Sides<IndexRemap> = Sides::default();
    let mut vertices_read = 0u64;
    let mut triangles_read = 0u64;

    for block in 0..info.block_count {
        let block_flags = reader.read_u32()?;
        let has_normals = block_flags & BLOCK_FLAG_VERTEX_NORMALS != 0;
        let vertex_count = reader.read_u32()?;
        let triangle_count = reader.read_u32()?;
        let width = IndexWidth::for_vertex_count(vertex_count);
        debug!(
            block,
            vertex_count,
            triangle_count,
            has_normals,
            ?width,
            "Reading DMT block"
        );

        let source = SourceVertices::read(reader, precision, vertex_count, has_normals)?;
        if has_normals {
            for accumulator in sides.both_mut() {
                accumulator.enable_vertex_normals();
            }
        }
        for remap in remaps.both_mut() {
            remap.reset(source.positions.len());
        }

        for _ in 0..triangle_count {
            let corners = [
                width.read(reader)?,
                width.read(reader)?,
                width.read(reader)?,
            ];
            if let Some(&index) = corners.iter().find(|&&i| i >= vertex_count) {
                return Err(IoError::VertexIndexOutOfRange {
                    block,
                    index,
                    vertex_count,
                });
            }

            let [a, b, c] = corners.map(|i| source.positions[i as usize]);
            let side = Side::of(filter(a, b, c));
            let accumulator = sides.get_mut(side);
            let remap = remaps.get_mut(side);

            let [ia, ib, ic] = corners.map(|i| remap.resolve(i, accumulator, &source));
            accumulator.add_triangle(ia, ib, ic)?;
        }

        let tag = reader.read_u16()?;
        if tag != info.version {
            return Err(IoError::BlockVersionDoesNotMatchFileVersion {
                block,
                expected: info.version,
                found: tag,
            });
        }

        vertices_read += u64::from(vertex_count);
        triangles_read += u64::from(triangle_count);
    }

    if vertices_read != u64::from(info.vertex_count)
        || triangles_read != u64::from(info.triangle_count)
    {
        warn!(
            declared_vertices = info.vertex_count,
            declared_triangles = info.triangle_count,
            vertices_read,
            triangles_read,
            "DMT totals do not match block contents"
        );
    }

    let partition = sides.into_partition();
    info!(
        blocks = info.block_count,
        kept = partition.kept.triangle_count(),
        excluded = partition.excluded.triangle_count(),
        "Decoded DMT file"
    );
    Ok(partition)
}
