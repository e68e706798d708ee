//! The human-readable "plain" multigraph format.
//!
//! Input consists of any number of blocks:
//!
//! - one line naming the graph;
//! - one line with two integers `n m` (vertices and edges);
//! - `m` lines `a b` with `0 <= a, b < n` and `a != b`, one per edge.
//!
//! Blank lines are ignored and parallel edges are allowed, which makes this
//! the only input format that can describe multigraphs (graph6 cannot).

use crate::graph::{Graph, MAX_M, MAX_N};
use std::fmt;
use std::io::{BufRead, Write};

// ============================================================================
// Errors
// ============================================================================

/// Errors produced while parsing plain-format input.
///
/// Line numbers are 1-based positions in the raw input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PlainParseError {
    /// A block started (name line seen) but the `n m` header is missing.
    MissingHeader {
        /// Line of the name that opened the block.
        line: usize,
    },
    /// The `n m` header line did not parse as two integers.
    BadHeader {
        /// Line number.
        line: usize,
        /// The offending text.
        text: String,
    },
    /// An edge line did not parse as two integers.
    BadEdge {
        /// Line number.
        line: usize,
        /// The offending text.
        text: String,
    },
    /// An edge endpoint is `>= n`.
    EndpointOutOfRange {
        /// Line number.
        line: usize,
        /// The offending endpoint.
        vertex: usize,
        /// Declared number of vertices.
        order: usize,
    },
    /// An edge joins a vertex to itself.
    SelfLoop {
        /// Line number.
        line: usize,
        /// The repeated endpoint.
        vertex: usize,
    },
    /// The declared vertex count is zero or exceeds [`MAX_N`].
    BadVertexCount {
        /// Line number.
        line: usize,
        /// Declared count.
        n: usize,
    },
    /// The declared edge count exceeds [`MAX_M`].
    TooManyEdges {
        /// Line number.
        line: usize,
        /// Declared count.
        m: usize,
    },
    /// The input ended before all declared edges were read.
    TruncatedBlock {
        /// Line of the block's header.
        line: usize,
        /// Edges declared.
        expected: usize,
        /// Edges actually present.
        got: usize,
    },
    /// An underlying I/O error.
    Io(String),
}

impl fmt::Display for PlainParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlainParseError::MissingHeader { line } => {
                write!(f, "line {line}: graph name without an 'n m' header line")
            }
            PlainParseError::BadHeader { line, text } => {
                write!(f, "line {line}: expected 'n m', got {text:?}")
            }
            PlainParseError::BadEdge { line, text } => {
                write!(f, "line {line}: expected an edge 'a b', got {text:?}")
            }
            PlainParseError::EndpointOutOfRange {
                line,
                vertex,
                order,
            } => write!(
                f,
                "line {line}: edge endpoint {vertex} out of range (n = {order})"
            ),
            PlainParseError::SelfLoop { line, vertex } => {
                write!(f, "line {line}: self-loop at vertex {vertex}")
            }
            PlainParseError::BadVertexCount { line, n } => {
                write!(f, "line {line}: vertex count {n} outside [1, {MAX_N}]")
            }
            PlainParseError::TooManyEdges { line, m } => {
                write!(f, "line {line}: edge count {m} exceeds {MAX_M}")
            }
            PlainParseError::TruncatedBlock {
                line,
                expected,
                got,
            } => write!(
                f,
                "block at line {line}: declared {expected} edges but only {got} followed"
            ),
            PlainParseError::Io(msg) => write!(f, "I/O error: {msg}"),
        }
    }
}

impl std::error::Error for PlainParseError {}

// ============================================================================
// Reading
// ============================================================================

/// Reads every plain-format graph from `input`, handing each to `process`.
///
/// Graphs are delivered in input order; parsing stops at the first error.
///
/// # Errors
/// Returns the first malformation found (see [`PlainParseError`]).
pub fn read_plain<R: BufRead>(
    input: R,
    mut process: impl FnMut(Graph),
) -> Result<(), PlainParseError> {
    // Blank lines carry no meaning anywhere in the format, so drop them up
    // front while remembering original line numbers for diagnostics.
    let mut lines: Vec<(usize, String)> = Vec::new();
    for (idx, line) in input.lines().enumerate() {
        let line = line.map_err(|e| PlainParseError::Io(e.to_string()))?;
        if !line.trim().is_empty() {
            lines.push((idx + 1, line));
        }
    }

    let mut pos = 0;
    while pos < lines.len() {
        let g = parse_block(&lines, &mut pos)?;
        process(g);
    }
    Ok(())
}

fn parse_two_fields(text: &str) -> Option<(usize, usize)> {
    let mut fields = text.split_whitespace();
    let a = fields.next()?.parse().ok()?;
    let b = fields.next()?.parse().ok()?;
    if fields.next().is_some() {
        return None;
    }
    Some((a, b))
}

fn parse_block(lines: &[(usize, String)], pos: &mut usize) -> Result<Graph, PlainParseError> {
    let (name_line, name) = &lines[*pos];
    if *pos + 1 >= lines.len() {
        return Err(PlainParseError::MissingHeader { line: *name_line });
    }
    let (header_line, header) = &lines[*pos + 1];
    let (n, m) = parse_two_fields(header).ok_or_else(|| PlainParseError::BadHeader {
        line: *header_line,
        text: header.clone(),
    })?;
    if n < 1 || n > MAX_N {
        return Err(PlainParseError::BadVertexCount {
            line: *header_line,
            n,
        });
    }
    if m > MAX_M {
        return Err(PlainParseError::TooManyEdges {
            line: *header_line,
            m,
        });
    }
    *pos += 2;

    let mut g = Graph::with_name(n, name.clone());
    for edge_idx in 0..m {
        let Some((line_no, text)) = lines.get(*pos) else {
            return Err(PlainParseError::TruncatedBlock {
                line: *header_line,
                expected: m,
                got: edge_idx,
            });
        };
        let (a, b) = parse_two_fields(text).ok_or_else(|| PlainParseError::BadEdge {
            line: *line_no,
            text: text.clone(),
        })?;
        for v in [a, b] {
            if v >= n {
                return Err(PlainParseError::EndpointOutOfRange {
                    line: *line_no,
                    vertex: v,
                    order: n,
                });
            }
        }
        if a == b {
            return Err(PlainParseError::SelfLoop {
                line: *line_no,
                vertex: a,
            });
        }
        g.add_edge(a, b);
        *pos += 1;
    }
    Ok(g)
}

// ============================================================================
// Writing
// ============================================================================

/// Writes a graph in the plain format.
///
/// Each edge is printed once from its smaller endpoint; parallel edges emit
/// one line per copy, so multigraphs round-trip.
///
/// # Errors
/// Returns any underlying I/O error.
pub fn write_plain<W: Write>(out: &mut W, g: &Graph) -> std::io::Result<()> {
    debug_assert!(g.validate().is_ok());
    writeln!(out, "{}", g.name())?;
    writeln!(out, "{} {}", g.vertex_count(), g.count_edges())?;
    for i in 0..g.vertex_count() {
        for &j in g.neighbours(i) {
            if i < j {
                writeln!(out, "{i} {j}")?;
            }
        }
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn read_all(text: &str) -> Result<Vec<Graph>, PlainParseError> {
        let mut graphs = Vec::new();
        read_plain(text.as_bytes(), |g| graphs.push(g))?;
        Ok(graphs)
    }

    #[test]
    fn parses_a_single_block() {
        let graphs = read_all("triangle\n3 3\n0 1\n1 2\n2 0\n").unwrap();
        assert_eq!(graphs.len(), 1);
        let g = &graphs[0];
        assert_eq!(g.name(), "triangle");
        assert_eq!(g.vertex_count(), 3);
        assert_eq!(g.count_edges(), 3);
        assert!(g.validate().is_ok());
    }

    #[test]
    fn parses_multiple_blocks_and_ignores_blank_lines() {
        let text = "\nfirst\n2 1\n0 1\n\n\nsecond\n1 0\n\n";
        let graphs = read_all(text).unwrap();
        assert_eq!(graphs.len(), 2);
        assert_eq!(graphs[0].name(), "first");
        assert_eq!(graphs[0].count_edges(), 1);
        assert_eq!(graphs[1].name(), "second");
        assert_eq!(graphs[1].vertex_count(), 1);
    }

    #[test]
    fn parallel_edges_roundtrip() {
        let text = "banana\n2 3\n0 1\n0 1\n0 1\n";
        let graphs = read_all(text).unwrap();
        assert_eq!(graphs[0].count_edges(), 3);
        assert!(!graphs[0].is_simple());

        let mut buf = Vec::new();
        write_plain(&mut buf, &graphs[0]).unwrap();
        let again = read_all(std::str::from_utf8(&buf).unwrap()).unwrap();
        assert_eq!(
            again[0].adjacency_matrix(),
            graphs[0].adjacency_matrix()
        );
    }

    #[test]
    fn write_then_read_preserves_structure() {
        let mut g = Graph::with_name(5, "house");
        for (a, b) in [(0, 1), (1, 2), (2, 3), (3, 0), (0, 4), (1, 4)] {
            g.add_edge(a, b);
        }
        let mut buf = Vec::new();
        write_plain(&mut buf, &g).unwrap();
        let parsed = read_all(std::str::from_utf8(&buf).unwrap()).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].name(), "house");
        assert_eq!(parsed[0].adjacency_matrix(), g.adjacency_matrix());
    }

    #[test]
    fn rejects_missing_header() {
        let err = read_all("lonely name\n").unwrap_err();
        assert_eq!(err, PlainParseError::MissingHeader { line: 1 });
    }

    #[test]
    fn rejects_bad_header() {
        let err = read_all("g\nthree four\n").unwrap_err();
        assert!(matches!(err, PlainParseError::BadHeader { line: 2, .. }));
    }

    #[test]
    fn rejects_bad_edge_line() {
        let err = read_all("g\n2 1\n0 x\n").unwrap_err();
        assert!(matches!(err, PlainParseError::BadEdge { line: 3, .. }));
    }

    #[test]
    fn rejects_out_of_range_endpoint() {
        let err = read_all("g\n2 1\n0 2\n").unwrap_err();
        assert_eq!(
            err,
            PlainParseError::EndpointOutOfRange {
                line: 3,
                vertex: 2,
                order: 2
            }
        );
    }

    #[test]
    fn rejects_self_loop() {
        let err = read_all("g\n2 1\n1 1\n").unwrap_err();
        assert_eq!(err, PlainParseError::SelfLoop { line: 3, vertex: 1 });
    }

    #[test]
    fn rejects_zero_vertices() {
        let err = read_all("g\n0 0\n").unwrap_err();
        assert_eq!(err, PlainParseError::BadVertexCount { line: 2, n: 0 });
    }

    #[test]
    fn rejects_truncated_block() {
        let err = read_all("g\n3 2\n0 1\n").unwrap_err();
        assert_eq!(
            err,
            PlainParseError::TruncatedBlock {
                line: 2,
                expected: 2,
                got: 1
            }
        );
    }
}
