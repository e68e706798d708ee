//! # Divisorial Gonality Tools
//!
//! A Rust library for computing the **divisorial gonality** of finite undirected
//! multigraphs by brute-force search, built around chip-firing games:
//!
//! - An immutable multigraph model with adjacency lists and validity checks.
//! - **Dhar's burning algorithm** for finding maximal legal firing sets.
//! - Iterated-firing **reduction** of effective divisors to their unique
//!   v-reduced representatives.
//! - A **positive-rank test** with can-reach memoization.
//! - A structured brute-force search for positive-rank divisors of minimal
//!   degree, i.e. the gonality `dgon(G)`.
//!
//! The library backs a set of command-line tools that test the subdivision
//! conjecture and the Brill–Noether conjecture (`dgon(G) <= (g + 3) / 2` with
//! `g = m - n + 1`) over large families of graphs.
//!
//! ## Quick Start
//!
//! ```
//! use dgon::graph::Graph;
//! use dgon::divisor::GonalityEngine;
//!
//! // Build K4 and compute its gonality.
//! let mut g = Graph::new(4);
//! for i in 0..4 {
//!     for j in (i + 1)..4 {
//!         g.add_edge(i, j);
//!     }
//! }
//!
//! let mut engine = GonalityEngine::new();
//! let (gonality, witness) = engine.find_gonality(&g);
//! assert_eq!(gonality, 3);
//! assert!(engine.has_positive_rank(&g, &witness));
//! ```
//!
//! ## Working with Divisors Directly
//!
//! ```
//! use dgon::graph::Graph;
//! use dgon::divisor::{Divisor, GonalityEngine};
//!
//! // A 4-cycle with two chips on vertex 0 is reduced at vertex 0.
//! let mut g = Graph::new(4);
//! g.add_edge(0, 1);
//! g.add_edge(1, 2);
//! g.add_edge(2, 3);
//! g.add_edge(3, 0);
//!
//! let d = Divisor::from_chips(vec![2, 0, 0, 0]);
//! let mut engine = GonalityEngine::new();
//! assert!(engine.is_reduced(&g, &d, 0));
//! assert!(engine.has_positive_rank(&g, &d));
//! ```
//!
//! ## Modules
//!
//! - [`graph`]: Multigraph model, validity predicates, capacity limits.
//! - [`divisor`]: Divisors, Dhar's burning algorithm, reduction, rank tests,
//!   and the gonality search.
//! - [`subdivide`]: k-regular edge subdivision.
//! - [`graph6`]: The nauty/gtools graph6 encoding for simple graphs.
//! - [`io`]: The human-readable "plain" multigraph format.
//! - [`iset`]: Randomized independent-set approximation (Boppana–Halldórsson)
//!   used to certify gonality upper bounds.
//!
//! ## Performance Notes
//!
//! - The search is exponential in the divisor degree; it is intended for small
//!   graphs (the conjecture sweeps run on all simple graphs of up to ~13
//!   vertices) and for moderate subdivisions of them.
//! - One [`divisor::GonalityEngine`] carries all scratch buffers; reuse it
//!   across graphs, and give each thread its own when processing graphs in
//!   parallel.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::many_single_char_names)] // Mathematical variable names
#![allow(clippy::needless_range_loop)] // Often clearer for vertex indexing
#![allow(clippy::doc_markdown)] // Math notation in docs

pub mod divisor;
pub mod graph;
pub mod graph6;
pub mod io;
pub mod iset;
pub mod subdivide;

/// Re-export commonly used types for convenience.
pub mod prelude {
    pub use crate::divisor::{Divisor, GonalityEngine};
    pub use crate::graph::{Graph, MAX_N, MAX_PARTS_PER_EDGE};
    pub use crate::graph6::{parse_graph6, write_graph6};
    pub use crate::io::{read_plain, write_plain};
    pub use crate::iset::approximate_maximum_independent_set;
    pub use crate::subdivide::subdivide;
}
