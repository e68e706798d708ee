//! The graph6 encoding of simple undirected graphs.
//!
//! graph6 is the compact ASCII format used by the nauty/gtools ecosystem: the
//! vertex count followed by the upper triangle of the adjacency matrix, both
//! packed six bits per printable byte (offset 63). Parallel edges cannot be
//! represented; multigraphs must go through the plain format in [`crate::io`].

use crate::graph::{Graph, MAX_N};
use std::fmt;

/// Largest order representable in graph6 (`2^36 - 1`, per the nauty docs).
const MAX_GRAPH6_ORDER: u64 = 68_719_476_735;

// ============================================================================
// Errors
// ============================================================================

/// Errors produced while reading or writing graph6 strings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Graph6Error {
    /// A byte outside the printable graph6 range `63..=126`.
    InvalidByte {
        /// Byte offset within the string.
        pos: usize,
        /// The offending byte.
        byte: u8,
    },
    /// The string ended before the encoded graph was complete.
    Truncated {
        /// Length of the string.
        len: usize,
        /// Offset at which more input was expected.
        pos: usize,
    },
    /// The string continued past the encoded graph.
    TrailingBytes {
        /// Offset of the first unused byte.
        pos: usize,
    },
    /// The encoded order exceeds [`MAX_N`].
    TooManyVertices {
        /// The encoded vertex count.
        n: u64,
    },
    /// The graph has parallel edges and cannot be written as graph6.
    ParallelEdges {
        /// First endpoint.
        i: usize,
        /// Second endpoint.
        j: usize,
        /// Number of parallel edges.
        count: u32,
    },
}

impl fmt::Display for Graph6Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Graph6Error::InvalidByte { pos, byte } => {
                write!(f, "invalid graph6 byte {byte:#04x} at offset {pos}")
            }
            Graph6Error::Truncated { len, pos } => {
                write!(f, "graph6 string of length {len} truncated at offset {pos}")
            }
            Graph6Error::TrailingBytes { pos } => {
                write!(f, "unexpected trailing bytes from offset {pos}")
            }
            Graph6Error::TooManyVertices { n } => {
                write!(f, "graph6 string encodes {n} vertices; the limit is {MAX_N}")
            }
            Graph6Error::ParallelEdges { i, j, count } => write!(
                f,
                "graph6 cannot represent the {count} parallel edges between {i} and {j}"
            ),
        }
    }
}

impl std::error::Error for Graph6Error {}

// ============================================================================
// Decoding
// ============================================================================

/// Unpacks `count` bytes into `6 * count` bits, most significant bit first.
fn decode_sextets(bytes: &[u8], pos: &mut usize, count: usize) -> Result<Vec<bool>, Graph6Error> {
    if *pos + count > bytes.len() {
        return Err(Graph6Error::Truncated {
            len: bytes.len(),
            pos: *pos + count,
        });
    }
    let mut bits = Vec::with_capacity(count * 6);
    for i in 0..count {
        let value = bytes[*pos + i] - 63;
        debug_assert!(value < 64);
        for shift in (0..6).rev() {
            bits.push((value >> shift) & 1 != 0);
        }
    }
    *pos += count;
    Ok(bits)
}

/// Reads the vertex count: one byte below 126, or `126` followed by 18 bits,
/// or `126 126` followed by 36 bits.
fn decode_order(bytes: &[u8], pos: &mut usize) -> Result<u64, Graph6Error> {
    let need = |pos: usize| Graph6Error::Truncated {
        len: bytes.len(),
        pos,
    };
    if *pos >= bytes.len() {
        return Err(need(*pos));
    }
    if bytes[*pos] < 126 {
        let n = u64::from(bytes[*pos] - 63);
        *pos += 1;
        return Ok(n);
    }
    *pos += 1;
    if *pos >= bytes.len() {
        return Err(need(*pos));
    }
    let sextets = if bytes[*pos] < 126 {
        3
    } else {
        *pos += 1;
        6
    };
    let bits = decode_sextets(bytes, pos, sextets)?;
    let mut n = 0u64;
    for bit in bits {
        n = (n << 1) | u64::from(bit);
    }
    Ok(n)
}

/// Parses a graph6 string into a simple graph.
///
/// # Errors
/// Returns an error on bytes outside `63..=126`, truncated or oversized
/// strings, and orders above [`MAX_N`].
pub fn parse_graph6(s: &str) -> Result<Graph, Graph6Error> {
    let bytes = s.as_bytes();
    for (pos, &byte) in bytes.iter().enumerate() {
        if !(63..=126).contains(&byte) {
            return Err(Graph6Error::InvalidByte { pos, byte });
        }
    }
    let mut pos = 0;
    let n = decode_order(bytes, &mut pos)?;
    if n > MAX_N as u64 {
        return Err(Graph6Error::TooManyVertices { n });
    }
    let n = n as usize;
    let triangle_bits = n * n.saturating_sub(1) / 2;
    let sextets = triangle_bits.div_ceil(6);
    let bits = decode_sextets(bytes, &mut pos, sextets)?;
    if pos != bytes.len() {
        return Err(Graph6Error::TrailingBytes { pos });
    }

    let mut g = Graph::new(n);
    let mut k = 0;
    for j in 0..n {
        for i in 0..j {
            if bits[k] {
                g.add_edge(i, j);
            }
            k += 1;
        }
    }
    Ok(g)
}

// ============================================================================
// Encoding
// ============================================================================

/// Packs bits into printable bytes, six per byte, zero-padded at the end.
fn encode_sextets(bits: &[bool]) -> String {
    let mut out = String::with_capacity(bits.len().div_ceil(6));
    for chunk in bits.chunks(6) {
        let mut value = 0u8;
        for (i, &bit) in chunk.iter().enumerate() {
            if bit {
                value |= 1 << (5 - i);
            }
        }
        out.push(char::from(63 + value));
    }
    out
}

/// Writes the vertex count in 1, 4, or 8 bytes depending on magnitude.
fn encode_order(n: u64) -> String {
    assert!(
        n <= MAX_GRAPH6_ORDER,
        "graph6 cannot encode {n} vertices (maximum {MAX_GRAPH6_ORDER})"
    );
    if n <= 62 {
        return char::from(63 + n as u8).to_string();
    }
    let (prefix, width) = if n <= 258_047 {
        ("\u{7e}", 18)
    } else {
        ("\u{7e}\u{7e}", 36)
    };
    let bits: Vec<bool> = (0..width).rev().map(|shift| (n >> shift) & 1 != 0).collect();
    let mut out = String::from(prefix);
    out.push_str(&encode_sextets(&bits));
    out
}

/// Encodes a simple graph as a graph6 string.
///
/// # Errors
/// Returns an error if the graph has parallel edges.
///
/// # Panics
/// Panics if the graph is invalid.
pub fn write_graph6(g: &Graph) -> Result<String, Graph6Error> {
    if let Err(e) = g.validate() {
        panic!("invalid graph handed to write_graph6: {e}");
    }
    let n = g.vertex_count();
    let matrix = g.adjacency_matrix();
    for i in 0..n {
        for j in (i + 1)..n {
            if matrix[i][j] > 1 {
                return Err(Graph6Error::ParallelEdges {
                    i,
                    j,
                    count: matrix[i][j],
                });
            }
        }
    }

    let mut bits = Vec::with_capacity(n * (n - 1) / 2);
    for j in 0..n {
        for i in 0..j {
            bits.push(matrix[i][j] != 0);
        }
    }
    let mut out = encode_order(n as u64);
    out.push_str(&encode_sextets(&bits));
    Ok(out)
}

// ============================================================================
// Tests
// ============================================================================
