//! Finite undirected multigraphs with adjacency lists.
//!
//! The model allows parallel edges (each occurrence is stored in both endpoint
//! lists) but forbids self-loops. Graphs are built once with [`Graph::add_edge`]
//! and are read-only during all divisor computations.

use std::collections::VecDeque;
use std::fmt;

// ============================================================================
// Capacity limits
// ============================================================================

/// Maximum number of vertices a graph may have.
pub const MAX_N: usize = 1500;

/// Maximum number of edges a graph may have.
pub const MAX_M: usize = 100_000;

/// Maximum number of parts an edge may be subdivided into.
pub const MAX_PARTS_PER_EDGE: usize = 10;

// ============================================================================
// Graph
// ============================================================================

/// An undirected multigraph on vertices `0..n`.
///
/// Each vertex stores the sequence of its neighbours, with one entry per
/// incident edge, so parallel edges appear multiple times. Every edge `(a, b)`
/// is stored at both `a` and `b`.
#[derive(Clone, Debug, Default)]
pub struct Graph {
    name: String,
    neighbours: Vec<Vec<usize>>,
}

impl Graph {
    /// Creates a graph with `n` vertices and no edges.
    ///
    /// # Panics
    /// Panics if `n > MAX_N`.
    pub fn new(n: usize) -> Self {
        Self::with_name(n, String::new())
    }

    /// Creates a named graph with `n` vertices and no edges.
    ///
    /// # Panics
    /// Panics if `n > MAX_N`.
    pub fn with_name(n: usize, name: impl Into<String>) -> Self {
        assert!(n <= MAX_N, "graph has {n} vertices; the limit is {MAX_N}");
        Self {
            name: name.into(),
            neighbours: vec![Vec::new(); n],
        }
    }

    /// Returns the graph's name (possibly empty).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Replaces the graph's name.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Returns the number of vertices.
    #[inline(always)]
    pub fn vertex_count(&self) -> usize {
        self.neighbours.len()
    }

    /// Returns the neighbour list of `v`, with one entry per incident edge.
    #[inline(always)]
    pub fn neighbours(&self, v: usize) -> &[usize] {
        &self.neighbours[v]
    }

    /// Returns the degree of `v`, counting parallel edges with multiplicity.
    #[inline(always)]
    pub fn degree(&self, v: usize) -> usize {
        self.neighbours[v].len()
    }

    /// Adds an undirected edge between `a` and `b`.
    ///
    /// Parallel edges are allowed; call this once per parallel copy.
    ///
    /// # Panics
    /// Panics if either endpoint is out of range or `a == b`.
    pub fn add_edge(&mut self, a: usize, b: usize) {
        let n = self.vertex_count();
        assert!(a < n, "edge endpoint {a} out of range (n = {n})");
        assert!(b < n, "edge endpoint {b} out of range (n = {n})");
        assert!(a != b, "self-loop at vertex {a}");
        self.neighbours[a].push(b);
        self.neighbours[b].push(a);
    }

    /// Returns the number of edges, counting parallel edges with multiplicity.
    pub fn count_edges(&self) -> usize {
        let total: usize = self.neighbours.iter().map(Vec::len).sum();
        assert!(total % 2 == 0, "odd neighbour-entry total {total}");
        total / 2
    }

    /// Materializes the adjacency-count matrix.
    ///
    /// `A[i][j]` is the number of edges between `i` and `j`; the matrix is
    /// symmetric with a zero diagonal.
    pub fn adjacency_matrix(&self) -> Vec<Vec<u32>> {
        let n = self.vertex_count();
        let mut matrix = vec![vec![0u32; n]; n];
        for i in 0..n {
            for &j in &self.neighbours[i] {
                matrix[i][j] += 1;
            }
        }
        matrix
    }

    /// Returns whether the graph is simple (no parallel edges).
    pub fn is_simple(&self) -> bool {
        let matrix = self.adjacency_matrix();
        matrix.iter().all(|row| row.iter().all(|&c| c <= 1))
    }

    /// Returns whether the graph is connected.
    ///
    /// Graphs with at most one vertex are vacuously connected. Parallel edges
    /// do not affect the result.
    pub fn is_connected(&self) -> bool {
        let n = self.vertex_count();
        if n <= 1 {
            return true;
        }
        let mut seen = vec![false; n];
        let mut queue = VecDeque::with_capacity(n);
        seen[0] = true;
        queue.push_back(0);
        let mut reached = 1;
        while let Some(u) = queue.pop_front() {
            for &w in &self.neighbours[u] {
                if !seen[w] {
                    seen[w] = true;
                    reached += 1;
                    queue.push_back(w);
                }
            }
        }
        reached == n
    }

    /// Checks the structural invariants of an undirected multigraph.
    ///
    /// Verifies that every stored neighbour is in range, that no self-loop
    /// exists, and that every edge is stored symmetrically (equal counts in
    /// both directions).
    ///
    /// # Errors
    /// Returns the first violation found.
    pub fn validate(&self) -> Result<(), GraphError> {
        self.check(false).map(|_| ())
    }

    /// Like [`Graph::validate`], additionally requiring the graph to be simple.
    ///
    /// # Errors
    /// Returns the first violation found, including parallel edges.
    pub fn validate_simple(&self) -> Result<(), GraphError> {
        self.check(true).map(|_| ())
    }

    fn check(&self, simple: bool) -> Result<Vec<Vec<u32>>, GraphError> {
        let n = self.vertex_count();
        for i in 0..n {
            for &j in &self.neighbours[i] {
                if j >= n {
                    return Err(GraphError::NeighbourOutOfRange {
                        vertex: i,
                        neighbour: j,
                        order: n,
                    });
                }
                if j == i {
                    return Err(GraphError::SelfLoop { vertex: i });
                }
            }
        }
        let matrix = self.adjacency_matrix();
        for i in 0..n {
            for j in (i + 1)..n {
                if matrix[i][j] != matrix[j][i] {
                    return Err(GraphError::NotSymmetric {
                        i,
                        j,
                        forward: matrix[i][j],
                        backward: matrix[j][i],
                    });
                }
                if simple && matrix[i][j] > 1 {
                    return Err(GraphError::ParallelEdges {
                        i,
                        j,
                        count: matrix[i][j],
                    });
                }
            }
        }
        Ok(matrix)
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Violations of the multigraph invariants.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GraphError {
    /// A stored neighbour index is `>= n`.
    NeighbourOutOfRange {
        /// Vertex whose list contains the bad entry.
        vertex: usize,
        /// The out-of-range neighbour index.
        neighbour: usize,
        /// Number of vertices.
        order: usize,
    },
    /// A vertex lists itself as a neighbour.
    SelfLoop {
        /// The offending vertex.
        vertex: usize,
    },
    /// Edge counts differ between the two directions.
    NotSymmetric {
        /// First endpoint.
        i: usize,
        /// Second endpoint.
        j: usize,
        /// Edges stored at `i` towards `j`.
        forward: u32,
        /// Edges stored at `j` towards `i`.
        backward: u32,
    },
    /// The graph has parallel edges but was required to be simple.
    ParallelEdges {
        /// First endpoint.
        i: usize,
        /// Second endpoint.
        j: usize,
        /// Number of parallel edges.
        count: u32,
    },
}

impl fmt::Display for GraphError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphError::NeighbourOutOfRange {
                vertex,
                neighbour,
                order,
            } => write!(
                f,
                "vertex {vertex} lists neighbour {neighbour}, but the graph has only {order} vertices"
            ),
            GraphError::SelfLoop { vertex } => write!(f, "self-loop at vertex {vertex}"),
            GraphError::NotSymmetric {
                i,
                j,
                forward,
                backward,
            } => write!(
                f,
                "asymmetric edge storage between {i} and {j}: {forward} vs {backward} entries"
            ),
            GraphError::ParallelEdges { i, j, count } => {
                write!(f, "{count} parallel edges between {i} and {j}")
            }
        }
    }
}

impl std::error::Error for GraphError {}

// ============================================================================
// Tests
// ============================================================================
