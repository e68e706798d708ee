//! Randomized independent-set approximation (Boppana–Halldórsson).
//!
//! Independent sets give cheap gonality upper bounds: if `A` is independent in
//! a connected simple graph `G`, the divisor with one chip on every vertex of
//! `V \ A` has positive rank, so `dgon(G) <= n - |A|`. The Brill–Noether
//! sweep uses this to skip the brute-force search whenever the bound already
//! lands below the conjectured value.
//!
//! The approximation is the "Clique Removal" algorithm of Boppana and
//! Halldórsson (BIT 32(2), 1992): a recursive *Ramsey* split on a random pivot
//! yields both a large independent set and a large clique; removing the clique
//! and repeating exhausts the graph, and the best independent set seen wins.
//! The algorithm is randomized, so callers typically run it a handful of times
//! and keep the best result; every result is re-verified before use.
//!
//! The certificate trick does not apply to multigraphs, so the entry point
//! insists on a simple graph.

use crate::divisor::Divisor;
use crate::graph::Graph;
use bitvec::prelude::*;
use rand::Rng;

// ============================================================================
// Clique Removal
// ============================================================================

/// Approximates a maximum independent set of a simple graph.
///
/// Returns the vertex set as a bit vector of length `n`. The result is always
/// a valid independent set and is non-empty whenever the graph is, but it is
/// not guaranteed to be maximum; run the algorithm several times with fresh
/// randomness for better results.
///
/// # Panics
/// Panics if the graph has parallel edges or is otherwise invalid.
pub fn approximate_maximum_independent_set<R: Rng + ?Sized>(g: &Graph, rng: &mut R) -> BitVec {
    if let Err(e) = g.validate_simple() {
        panic!("independent-set approximation needs a simple graph: {e}");
    }
    let n = g.vertex_count();
    let matrix = g.adjacency_matrix();

    let mut remaining: BitVec = BitVec::repeat(true, n);
    let mut best_indep: BitVec = BitVec::repeat(false, n);
    while remaining.any() {
        let (indep, clique) = ramsey_split(&matrix, &remaining, rng);
        debug_assert!(is_subset(&indep, &remaining));
        debug_assert!(is_subset(&clique, &remaining));
        debug_assert!(is_clique(&matrix, &clique));
        for v in clique.iter_ones() {
            remaining.set(v, false);
        }
        if indep.count_ones() > best_indep.count_ones() {
            best_indep = indep;
        }
    }
    debug_assert!(n == 0 || best_indep.any());
    best_indep
}

/// The recursive step Boppana and Halldórsson call *Ramsey*.
///
/// Picks a random pivot in `set`, splits the rest into neighbours and
/// non-neighbours, recurses into both halves, and assembles the larger of the
/// two independent-set candidates (pivot joins the non-neighbour side) and the
/// larger of the two clique candidates (pivot joins the neighbour side).
fn ramsey_split<R: Rng + ?Sized>(
    matrix: &[Vec<u32>],
    set: &BitVec,
    rng: &mut R,
) -> (BitVec, BitVec) {
    let n = set.len();
    if set.not_any() {
        return (BitVec::repeat(false, n), BitVec::repeat(false, n));
    }

    let members: Vec<usize> = set.iter_ones().collect();
    let pivot = members[rng.random_range(0..members.len())];
    let mut neighbs: BitVec = BitVec::repeat(false, n);
    let mut non_neighbs: BitVec = BitVec::repeat(false, n);
    for &v in &members {
        if v == pivot {
            continue;
        }
        if matrix[pivot][v] != 0 {
            neighbs.set(v, true);
        } else {
            non_neighbs.set(v, true);
        }
    }

    let (near_indep, mut near_clique) = ramsey_split(matrix, &neighbs, rng);
    let (mut far_indep, far_clique) = ramsey_split(matrix, &non_neighbs, rng);
    far_indep.set(pivot, true);
    near_clique.set(pivot, true);

    let best_indep = if near_indep.count_ones() > far_indep.count_ones() {
        near_indep
    } else {
        far_indep
    };
    let best_clique = if near_clique.count_ones() > far_clique.count_ones() {
        near_clique
    } else {
        far_clique
    };
    (best_indep, best_clique)
}

// ============================================================================
// Verification and the certificate divisor
// ============================================================================

/// Returns whether `set` is an independent set of `g`.
///
/// # Panics
/// Panics if the set length does not match the graph.
pub fn is_independent_set(g: &Graph, set: &BitVec) -> bool {
    assert_eq!(set.len(), g.vertex_count(), "vertex set has the wrong length");
    set.iter_ones()
        .all(|v| g.neighbours(v).iter().all(|&w| !set[w]))
}

/// Builds the divisor with one chip on every vertex *outside* `independent`.
///
/// For an independent set on a connected simple graph this divisor has
/// positive rank, certifying `dgon(G) <= n - |independent|`. Callers verify
/// both claims rather than trusting the approximation.
///
/// # Panics
/// Panics if the set length does not match the graph.
pub fn complement_indicator_divisor(g: &Graph, independent: &BitVec) -> Divisor {
    assert_eq!(
        independent.len(),
        g.vertex_count(),
        "vertex set has the wrong length"
    );
    Divisor::from_chips(
        (0..g.vertex_count())
            .map(|v| i32::from(!independent[v]))
            .collect(),
    )
}

fn is_subset(sub: &BitVec, sup: &BitVec) -> bool {
    sub.iter_ones().all(|v| sup[v])
}

fn is_clique(matrix: &[Vec<u32>], set: &BitVec) -> bool {
    let members: Vec<usize> = set.iter_ones().collect();
    members
        .iter()
        .enumerate()
        .all(|(idx, &v)| members[idx + 1..].iter().all(|&w| matrix[v][w] != 0))
}

// ============================================================================
// Tests
// ============================================================================
