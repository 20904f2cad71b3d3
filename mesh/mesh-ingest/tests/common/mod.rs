//! Encoders for synthetic mesh files used by the integration tests.

#![allow(dead_code, clippy::cast_possible_truncation)]

/// A tiny indexed mesh used to generate test files.
#[derive(Debug, Clone)]
pub struct Grid {
    pub vertices: Vec<[f64; 3]>,
    pub triangles: Vec<[u32; 3]>,
}

impl Grid {
    /// `n` x `n` quads in the XY plane starting at `origin_x`, two triangles each.
    pub fn new(n: u32, origin_x: f64) -> Self {
        let mut vertices = Vec::new();
        for j in 0..=n {
            for i in 0..=n {
                vertices.push([origin_x + f64::from(i), f64::from(j), 0.0]);
            }
        }
        let row = n + 1;
        let mut triangles = Vec::new();
        for j in 0..n {
            for i in 0..n {
                let a = j * row + i;
                let b = a + 1;
                let c = a + row + 1;
                let d = a + row;
                triangles.push([a, b, c]);
                triangles.push([a, c, d]);
            }
        }
        Self {
            vertices,
            triangles,
        }
    }

    pub fn corners(&self, t: usize) -> [[f64; 3]; 3] {
        self.triangles[t].map(|i| self.vertices[i as usize])
    }
}

/// Binary STL: one facet record per triangle, zero normals.
pub fn binary_stl(facets: &[[[f64; 3]; 3]]) -> Vec<u8> {
    let mut bytes = vec![0u8; 80];
    bytes[..11].copy_from_slice(b"binary test");
    bytes.extend_from_slice(&(facets.len() as u32).to_le_bytes());
    for facet in facets {
        bytes.extend_from_slice(&[0u8; 12]);
        for corner in facet {
            for &c in corner {
                bytes.extend_from_slice(&(c as f32).to_le_bytes());
            }
        }
        bytes.extend_from_slice(&0u16.to_le_bytes());
    }
    bytes
}

/// ASCII STL with a `solid test` first line.
pub fn ascii_stl(facets: &[[[f64; 3]; 3]]) -> String {
    let mut text = String::from("solid test\n");
    for facet in facets {
        text.push_str("  facet normal 0 0 1\n    outer loop\n");
        for c in facet {
            text.push_str(&format!("      vertex {} {} {}\n", c[0], c[1], c[2]));
        }
        text.push_str("    endloop\n  endfacet\n");
    }
    text.push_str("endsolid test\n");
    text
}

/// One DMT block description.
pub struct DmtBlock<'a> {
    pub vertices: &'a [[f64; 3]],
    pub normals: Option<&'a [[f64; 3]]>,
    pub triangles: &'a [[u32; 3]],
}

/// DMT version 1000 file. `single` selects f32 coordinates.
pub fn dmt(blocks: &[DmtBlock<'_>], single: bool) -> Vec<u8> {
    let mut bytes = b"synthetic\0".to_vec();
    bytes.extend_from_slice(&1000u16.to_le_bytes());
    bytes.extend_from_slice(&u32::from(single).to_le_bytes());
    bytes.extend_from_slice(&(blocks.len() as u32).to_le_bytes());
    let vertex_total: usize = blocks.iter().map(|b| b.vertices.len()).sum();
    let triangle_total: usize = blocks.iter().map(|b| b.triangles.len()).sum();
    bytes.extend_from_slice(&(vertex_total as u32).to_le_bytes());
    bytes.extend_from_slice(&(triangle_total as u32).to_le_bytes());

    let coord = |bytes: &mut Vec<u8>, value: f64| {
        if single {
            bytes.extend_from_slice(&(value as f32).to_le_bytes());
        } else {
            bytes.extend_from_slice(&value.to_le_bytes());
        }
    };

    for block in blocks {
        bytes.extend_from_slice(&u32::from(block.normals.is_some()).to_le_bytes());
        bytes.extend_from_slice(&(block.vertices.len() as u32).to_le_bytes());
        bytes.extend_from_slice(&(block.triangles.len() as u32).to_le_bytes());
        for (i, v) in block.vertices.iter().enumerate() {
            for &c in v {
                coord(&mut bytes, c);
            }
            if let Some(normals) = block.normals {
                for &c in &normals[i] {
                    coord(&mut bytes, c);
                }
            }
        }
        let wide = block.vertices.len() > 65_535;
        for tri in block.triangles {
            for &i in tri {
                if wide {
                    bytes.extend_from_slice(&i.to_le_bytes());
                } else {
                    bytes.extend_from_slice(&(i as u16).to_le_bytes());
                }
            }
        }
        bytes.extend_from_slice(&1000u16.to_le_bytes());
    }
    bytes
}
