//! STL (Stereolithography) decoding.
//!
//! Supports both ASCII and binary STL. Triangles are routed into a kept and
//! an excluded block by the inclusion filter; facet normals are discarded
//! and neither block stores vertex normals.
//!
//! # Format Detection
//!
//! - ASCII files start with "solid" (after optional whitespace)
//! - Binary files have an 80-byte header followed by face count
//!
//! [`StlDetection::Heuristic`] also treats a "solid" header holding NUL
//! bytes as binary.
//!
//! # Binary Format
//!
//! ```text
//! UINT8[80]    – Header (ignored, often contains file info)
//! UINT32       – Number of triangles
//! foreach triangle
//!     REAL32[3] – Normal vector (discarded)
//!     REAL32[3] – Vertex 1
//!     REAL32[3] – Vertex 2
//!     REAL32[3] – Vertex 3
//!     UINT16    – Attribute byte count (ignored)
//! end
//! ```
//!
//! Binary corners are deduplicated by exact position within each partition.
//!
//! # ASCII Format
//!
//! ```text
//! solid name
//!   facet normal ni nj nk
//!     outer loop
//!       vertex v1x v1y v1z
//!       vertex v2x v2y v2z
//!       vertex v3x v3y v3z
//!     endloop
//!   endfacet
//!   ...
//! endsolid name
//! ```
//!
//! ASCII corners are never deduplicated: every facet adds three vertices.

use std::io::{BufRead, BufReader, Read, Seek};
use std::path::Path;

use hashbrown::HashMap;
use mesh_model::{MeshTopology, Point3, PointKey, TriangleBlock};
use tracing::{debug, info};

use crate::error::{IoError, IoResult, open_file};
use crate::params::StlDetection;
use crate::partition::{Partition, Side, Sides};
use crate::stream::LeReader;

/// STL binary header size in bytes.
const HEADER_SIZE: usize = 80;

/// Bytes of a binary facet record that are skipped: the facet normal.
const NORMAL_SIZE: u64 = 12;

/// Upper bound on triangles pre-allocated from an untrusted header count.
const MAX_PREALLOCATED_TRIANGLES: usize = 1 << 20;

/// ASCII or binary STL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StlKind {
    /// Text STL (`solid` ... `endsolid`).
    Ascii,
    /// Binary STL (80-byte header, counted facet records).
    Binary,
}

/// Classify the start of an STL file.
///
/// `head` should hold the first bytes of the file (84 are enough).
///
/// # Example
///
/// ```
/// use mesh_ingest::{StlDetection, StlKind, classify_stl};
///
/// assert_eq!(classify_stl(b"solid test\n", StlDetection::FirstLine), StlKind::Ascii);
/// assert_eq!(classify_stl(&[0u8; 84], StlDetection::FirstLine), StlKind::Binary);
/// ```
#[must_use]
pub fn classify_stl(head: &[u8], detection: StlDetection) -> StlKind {
    let first_line = head.split(|&b| b == b'\n').next().unwrap_or_default();
    let starts_with_solid = String::from_utf8_lossy(first_line)
        .trim_start()
        .starts_with("solid");

    if !starts_with_solid {
        return StlKind::Binary;
    }

    match detection {
        StlDetection::FirstLine => StlKind::Ascii,
        StlDetection::Heuristic => {
            let header = &head[..head.len().min(HEADER_SIZE)];
            if header.contains(&0) {
                StlKind::Binary
            } else {
                StlKind::Ascii
            }
        }
    }
}

/// Determine whether an STL file is ASCII or binary.
///
/// # Errors
///
/// Returns [`IoError::FileNotFound`] if the file does not exist, or
/// [`IoError::Io`] if it cannot be read.
pub fn detect_stl_kind<P: AsRef<Path>>(path: P, detection: StlDetection) -> IoResult<StlKind> {
    let mut reader = BufReader::new(open_file(path.as_ref())?);
    let head = read_head(&mut reader)?;
    Ok(classify_stl(&head, detection))
}

fn read_head<R: Read>(reader: &mut R) -> IoResult<Vec<u8>> {
    let mut head = Vec::with_capacity(HEADER_SIZE + 4);
    reader
        .by_ref()
        .take((HEADER_SIZE + 4) as u64)
        .read_to_end(&mut head)?;
    Ok(head)
}

/// Decode an STL file, detecting ASCII vs binary from its first line.
///
/// # Arguments
///
/// * `path` - Path to the STL file
/// * `filter` - Inclusion filter over the three corner positions
///
/// # Errors
///
/// Returns an error if:
/// - The file does not exist
/// - The content is not valid STL (see [`decode_stl_ascii`] and
///   [`decode_stl_binary`])
///
/// # Example
///
/// ```no_run
/// use mesh_ingest::read_stl;
/// use mesh_model::MeshTopology;
///
/// // Keep only triangles entirely above the XY plane
/// let parts = read_stl("part.stl", |a, b, c| a.z > 0.0 && b.z > 0.0 && c.z > 0.0).unwrap();
/// println!("kept {} triangles", parts.kept.triangle_count());
/// ```
pub fn read_stl<P, F>(path: P, filter: F) -> IoResult<Partition>
where
    P: AsRef<Path>,
    F: Fn(Point3<f64>, Point3<f64>, Point3<f64>) -> bool,
{
    read_stl_detected(path.as_ref(), filter, StlDetection::default())
}

pub(crate) fn read_stl_detected<F>(
    path: &Path,
    filter: F,
    detection: StlDetection,
) -> IoResult<Partition>
where
    F: Fn(Point3<f64>, Point3<f64>, Point3<f64>) -> bool,
{
    let mut reader = BufReader::new(open_file(path)?);
    let head = read_head(&mut reader)?;
    let kind = classify_stl(&head, detection);
    debug!(path = %path.display(), ?kind, "Detected STL variant");

    reader.rewind()?;
    match kind {
        StlKind::Ascii => decode_stl_ascii(reader, filter),
        StlKind::Binary => decode_stl_binary(reader, filter),
    }
}

/// Decode an ASCII STL file.
///
/// # Errors
///
/// Returns [`IoError::FileNotFound`] if the file does not exist; see
/// [`decode_stl_ascii`] for content errors.
pub fn read_stl_ascii<P, F>(path: P, filter: F) -> IoResult<Partition>
where
    P: AsRef<Path>,
    F: Fn(Point3<f64>, Point3<f64>, Point3<f64>) -> bool,
{
    let file = open_file(path.as_ref())?;
    decode_stl_ascii(BufReader::new(file), filter)
}

/// Decode a binary STL file.
///
/// # Errors
///
/// Returns [`IoError::FileNotFound`] if the file does not exist; see
/// [`decode_stl_binary`] for content errors.
pub fn read_stl_binary<P, F>(path: P, filter: F) -> IoResult<Partition>
where
    P: AsRef<Path>,
    F: Fn(Point3<f64>, Point3<f64>, Point3<f64>) -> bool,
{
    let file = open_file(path.as_ref())?;
    decode_stl_binary(BufReader::new(file), filter)
}

/// Decode ASCII STL text.
///
/// Only `vertex` and `endloop` lines matter; other lines may hold arbitrary
/// bytes (invalid UTF-8 is replaced). A `vertex` line contributes a
/// point made of its first three numeric tokens (other tokens are skipped,
/// missing coordinates are zero). An `endloop` line closes the facet using
/// the first three points collected since the previous `endloop`.
///
/// # Errors
///
/// Returns [`IoError::MalformedFacet`] if a loop closes with fewer than
/// three vertices, or [`IoError::Io`] if the stream cannot be read.
pub fn decode_stl_ascii<R, F>(mut reader: R, filter: F) -> IoResult<Partition>
where
    R: BufRead,
    F: Fn(Point3<f64>, Point3<f64>, Point3<f64>) -> bool,
{
    let mut sides = Sides::new(TriangleBlock::new(), TriangleBlock::new());
    let mut loop_vertices: Vec<Point3<f64>> = Vec::with_capacity(3);
    let mut raw = Vec::new();
    let mut line_number = 0;

    loop {
        raw.clear();
        if reader.read_until(b'\n', &mut raw)? == 0 {
            break;
        }
        line_number += 1;
        // Only keyword lines matter; names and comments may hold any bytes.
        let line = String::from_utf8_lossy(&raw);
        let trimmed = line.trim();

        if trimmed.starts_with("vertex") {
            loop_vertices.push(parse_vertex_line(trimmed));
        } else if trimmed.starts_with("endloop") {
            let &[a, b, c, ..] = loop_vertices.as_slice() else {
                return Err(IoError::MalformedFacet {
                    line: line_number,
                    vertices: loop_vertices.len(),
                });
            };

            let block = sides.get_mut(Side::of(filter(a, b, c)));
            let ia = block.add_vertex(a);
            let ib = block.add_vertex(b);
            let ic = block.add_vertex(c);
            block.add_triangle(ia, ib, ic)?;

            loop_vertices.clear();
        }
    }

    let partition = sides.into_partition();
    info!(
        kept = partition.kept.triangle_count(),
        excluded = partition.excluded.triangle_count(),
        "Decoded ASCII STL"
    );
    Ok(partition)
}

/// Parse the coordinates of a `vertex x y z` line.
fn parse_vertex_line(line: &str) -> Point3<f64> {
    let mut coords = [0.0; 3];
    let numbers = line
        .split_whitespace()
        .filter_map(|token| token.parse::<f64>().ok());
    for (slot, value) in coords.iter_mut().zip(numbers) {
        *slot = value;
    }
    Point3::new(coords[0], coords[1], coords[2])
}

/// Decode binary STL bytes.
///
/// Corners are deduplicated by exact position, separately for the kept and
/// the excluded block.
///
/// # Errors
///
/// Returns [`IoError::UnexpectedEof`] if the stream ends inside the header
/// or a facet record, or [`IoError::Io`] if it cannot be read.
pub fn decode_stl_binary<R, F>(reader: R, filter: F) -> IoResult<Partition>
where
    R: Read,
    F: Fn(Point3<f64>, Point3<f64>, Point3<f64>) -> bool,
{
    let mut reader = LeReader::new(reader);
    reader.skip(HEADER_SIZE as u64)?;
    let face_count = reader.read_u32()?;
    debug!(faces = face_count, "Decoding binary STL");

    let capacity = (face_count as usize).min(MAX_PREALLOCATED_TRIANGLES);
    let mut sides = Sides::new(
        TriangleBlock::with_capacity(capacity, capacity, false),
        TriangleBlock::new(),
    );
    let mut lookups: Sides<HashMap<PointKey, u32>> =
        Sides::new(HashMap::with_capacity(capacity), HashMap::new());

    for _ in 0..face_count {
        reader.skip(NORMAL_SIZE)?;
        let a = read_point(&mut reader)?;
        let b = read_point(&mut reader)?;
        let c = read_point(&mut reader)?;
        let _attribute_bytes = reader.read_u16()?;

        let side = Side::of(filter(a, b, c));
        let block = sides.get_mut(side);
        let lookup = lookups.get_mut(side);

        let ia = dedup_vertex(block, lookup, a);
        let ib = dedup_vertex(block, lookup, b);
        let ic = dedup_vertex(block, lookup, c);
        block.add_triangle(ia, ib, ic)?;
    }

    let partition = sides.into_partition();
    info!(
        faces = face_count,
        kept_vertices = partition.kept.vertex_count(),
        excluded_vertices = partition.excluded.vertex_count(),
        "Decoded binary STL"
    );
    Ok(partition)
}

/// Read a vertex from 3 little-endian f32s.
fn read_point<R: Read>(reader: &mut LeReader<R>) -> IoResult<Point3<f64>> {
    let x = reader.read_f32()?;
    let y = reader.read_f32()?;
    let z = reader.read_f32()?;
    Ok(Point3::new(f64::from(x), f64::from(y), f64::from(z)))
}

/// Return the index of `position` in `block`, adding it on first sight.
fn dedup_vertex(
    block: &mut TriangleBlock,
    lookup: &mut HashMap<PointKey, u32>,
    position: Point3<f64>,
) -> u32 {
    *lookup
        .entry(PointKey::new(&position))
        .or_insert_with(|| block.add_vertex(position))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use mesh_model::accept_all;

    fn binary_stl(facets: &[[[f32; 3]; 3]]) -> Vec<u8> {
        let mut bytes = vec![0u8; HEADER_SIZE];
        bytes.extend_from_slice(&(facets.len() as u32).to_le_bytes());
        for facet in facets {
            bytes.extend_from_slice(&[0u8; 12]);
            for corner in facet {
                for coord in corner {
                    bytes.extend_from_slice(&coord.to_le_bytes());
                }
            }
            bytes.extend_from_slice(&0u16.to_le_bytes());
        }
        bytes
    }

    const QUAD: [[[f32; 3]; 3]; 2] = [
        [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0]],
        [[0.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]],
    ];

    const ASCII_QUAD: &str = "solid test
  facet normal 0 0 1
    outer loop
      vertex 0 0 0
      vertex 1 0 0
      vertex 1 1 0
    endloop
  endfacet
  facet normal 0 0 1
    outer loop
      vertex 0 0 0
      vertex 1 1 0
      vertex 0 1 0
    endloop
  endfacet
endsolid test
";

    #[test]
    fn binary_shared_edge_dedups() {
        let bytes = binary_stl(&QUAD);
        let parts = decode_stl_binary(&bytes[..], accept_all).unwrap();

        let kept = &parts.kept.blocks()[0];
        assert_eq!(kept.vertex_count(), 4);
        assert_eq!(kept.triangle_count(), 2);
        assert!(!kept.has_vertex_normals());
        assert_eq!(kept.triangle_indices(0), Some([0, 1, 2]));
        assert_eq!(kept.triangle_indices(1), Some([0, 2, 3]));
        assert!(parts.excluded.is_empty());
    }

    #[test]
    fn binary_partitions_keep_separate_vertex_pools() {
        let bytes = binary_stl(&QUAD);
        // First facet has corner (1, 0, 0); the second does not.
        let parts = decode_stl_binary(&bytes[..], |a, b, c| {
            [a, b, c].iter().any(|p| p.x == 1.0 && p.y == 0.0)
        })
        .unwrap();

        assert_eq!(parts.kept.triangle_count(), 1);
        assert_eq!(parts.excluded.triangle_count(), 1);
        assert_eq!(parts.kept.vertex_count(), 3);
        // Shared corners are duplicated across partitions, not across facets.
        assert_eq!(parts.excluded.vertex_count(), 3);
    }

    #[test]
    fn binary_distinct_positions_do_not_collapse() {
        let tiny = f32::EPSILON;
        let facets = [
            [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            [[0.0, 0.0, tiny], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
        ];
        let bytes = binary_stl(&facets);
        let parts = decode_stl_binary(&bytes[..], accept_all).unwrap();
        assert_eq!(parts.kept.vertex_count(), 4);
    }

    #[test]
    fn binary_truncated_stream_reports_offset() {
        let mut bytes = binary_stl(&QUAD);
        bytes.truncate(bytes.len() - 10);
        let err = decode_stl_binary(&bytes[..], accept_all).unwrap_err();
        // Runs out inside the last corner of the second facet.
        match err {
            IoError::UnexpectedEof { position } => assert_eq!(position, bytes.len() as u64),
            other => panic!("expected UnexpectedEof, got {other:?}"),
        }
    }

    #[test]
    fn binary_short_header_reports_offset() {
        let err = decode_stl_binary(&[0u8; 40][..], accept_all).unwrap_err();
        assert!(matches!(err, IoError::UnexpectedEof { position: 40 }));
    }

    #[test]
    fn binary_zero_faces() {
        let bytes = binary_stl(&[]);
        let parts = decode_stl_binary(&bytes[..], accept_all).unwrap();
        assert_eq!(parts.kept.block_count(), 1);
        assert!(parts.kept.is_empty());
        assert!(parts.excluded.is_empty());
    }

    #[test]
    fn ascii_never_dedups() {
        let parts = decode_stl_ascii(ASCII_QUAD.as_bytes(), accept_all).unwrap();
        let kept = &parts.kept.blocks()[0];
        assert_eq!(kept.triangle_count(), 2);
        assert_eq!(kept.vertex_count(), 6);
        assert!(!kept.has_vertex_normals());
        assert_eq!(kept.vertices()[5], Point3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn ascii_filter_routes_facets() {
        let parts =
            decode_stl_ascii(ASCII_QUAD.as_bytes(), |_, b, _| b.y == 0.0).unwrap();
        assert_eq!(parts.kept.triangle_count(), 1);
        assert_eq!(parts.excluded.triangle_count(), 1);
        assert_eq!(parts.excluded.blocks()[0].vertices()[2], Point3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn ascii_skips_non_numeric_tokens() {
        assert_eq!(
            parse_vertex_line("vertex  1.5e1\t-2 x 3"),
            Point3::new(15.0, -2.0, 3.0)
        );
        assert_eq!(parse_vertex_line("vertex 4"), Point3::new(4.0, 0.0, 0.0));
    }

    #[test]
    fn ascii_short_loop_is_malformed() {
        let text = concat!(
            "solid bad\nfacet normal 0 0 1\nouter loop\n",
            "vertex 0 0 0\nvertex 1 0 0\n",
            "endloop\nendfacet\nendsolid bad\n",
        );
        let err = decode_stl_ascii(text.as_bytes(), accept_all).unwrap_err();
        match err {
            IoError::MalformedFacet { line, vertices } => {
                assert_eq!(line, 6);
                assert_eq!(vertices, 2);
            }
            other => panic!("expected MalformedFacet, got {other:?}"),
        }
    }

    #[test]
    fn ascii_latin1_solid_name_is_ignored() {
        let text = [
            &b"solid Gr\xf6\xdfe\n"[..],
            &b"  facet normal 0 0 1\n    outer loop\n"[..],
            &b"      vertex 0 0 0\n      vertex 1 0 0\n      vertex 0 1 0\n"[..],
            &b"    endloop\n  endfacet\nendsolid Gr\xf6\xdfe\n"[..],
        ]
        .concat();
        let parts = decode_stl_ascii(&text[..], accept_all).unwrap();
        assert_eq!(parts.kept.triangle_count(), 1);
        assert_eq!(parts.kept.blocks()[0].vertices()[1], Point3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn ascii_crlf_and_missing_final_newline() {
        let text = ASCII_QUAD.replace('\n', "\r\n");
        let text = text.trim_end();
        let parts = decode_stl_ascii(text.as_bytes(), accept_all).unwrap();
        assert_eq!(parts.kept.triangle_count(), 2);
        assert_eq!(parts.kept.blocks()[0].vertices()[2], Point3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn ascii_keywords_are_case_sensitive() {
        let text = ASCII_QUAD.replace("endloop", "ENDLOOP");
        let parts = decode_stl_ascii(text.as_bytes(), accept_all).unwrap();
        assert!(parts.kept.is_empty());
    }

    #[test]
    fn classify_first_line() {
        assert_eq!(
            classify_stl(b"solid test\nfacet", StlDetection::FirstLine),
            StlKind::Ascii
        );
        assert_eq!(
            classify_stl(b"   solid indented", StlDetection::FirstLine),
            StlKind::Ascii
        );
        assert_eq!(
            classify_stl(b"binary header", StlDetection::FirstLine),
            StlKind::Binary
        );
        assert_eq!(classify_stl(b"", StlDetection::FirstLine), StlKind::Binary);
    }

    #[test]
    fn classify_heuristic_sees_nul_bytes() {
        let mut head = b"solid exported by tool".to_vec();
        head.resize(HEADER_SIZE + 4, 0);
        assert_eq!(classify_stl(&head, StlDetection::FirstLine), StlKind::Ascii);
        assert_eq!(classify_stl(&head, StlDetection::Heuristic), StlKind::Binary);
        assert_eq!(
            classify_stl(ASCII_QUAD.as_bytes(), StlDetection::Heuristic),
            StlKind::Ascii
        );
    }

    #[test]
    fn read_missing_file() {
        let result = read_stl("nonexistent_file_12345.stl", accept_all);
        assert!(matches!(result, Err(IoError::FileNotFound { .. })));
    }

    #[test]
    fn read_detects_both_variants() {
        let dir = tempfile::tempdir().unwrap();

        let ascii_path = dir.path().join("ascii.stl");
        std::fs::write(&ascii_path, ASCII_QUAD).unwrap();
        let ascii = read_stl(&ascii_path, accept_all).unwrap();
        assert_eq!(ascii.kept.vertex_count(), 6);

        let binary_path = dir.path().join("binary.stl");
        std::fs::write(&binary_path, binary_stl(&QUAD)).unwrap();
        let binary = read_stl(&binary_path, accept_all).unwrap();
        assert_eq!(binary.kept.vertex_count(), 4);

        assert_eq!(
            detect_stl_kind(&ascii_path, StlDetection::FirstLine).unwrap(),
            StlKind::Ascii
        );
        assert_eq!(
            detect_stl_kind(&binary_path, StlDetection::FirstLine).unwrap(),
            StlKind::Binary
        );
    }
}
