//! Divisors on multigraphs and the chip-firing engine.
//!
//! This module is the core of the crate. It implements:
//!
//! - [`Divisor`]: an integer chip vector indexed by vertex.
//! - Dhar's burning algorithm ([`GonalityEngine::burn`]).
//! - Reduction of effective divisors to their unique v-reduced representative
//!   ([`GonalityEngine::reduce`]).
//! - The positive-rank test ([`GonalityEngine::has_positive_rank`]).
//! - The brute-force search for positive-rank divisors of prescribed degree
//!   and the gonality outer loop ([`GonalityEngine::find_gonality`]).
//!
//! All scratch state lives inside a [`GonalityEngine`]; one engine serves any
//! number of graphs sequentially, and parallel callers use one engine each.
//!
//! Reduction and the rank test iterate "burn, then fire the unburnt set" until
//! a fixed point. On a disconnected graph this never terminates (a component
//! not containing the target is never burnt, and firing all of it is a no-op),
//! so every entry point that iterates firing insists on a connected graph.

use crate::graph::Graph;
use std::collections::VecDeque;
use std::fmt;

// ============================================================================
// Divisor
// ============================================================================

/// An integer-valued divisor `D : V -> Z` on the vertices of a graph.
///
/// A divisor is *effective* when every entry is non-negative; its *degree* is
/// the total number of chips.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Divisor {
    chips: Vec<i32>,
}

impl Divisor {
    /// Creates the zero divisor on `n` vertices.
    pub fn zeros(n: usize) -> Self {
        Self {
            chips: vec![0; n],
        }
    }

    /// Creates a divisor from an explicit chip vector.
    pub fn from_chips(chips: Vec<i32>) -> Self {
        Self { chips }
    }

    /// Returns the number of vertices the divisor is defined on.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.chips.len()
    }

    /// Returns whether the divisor is defined on zero vertices.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.chips.is_empty()
    }

    /// Returns the degree, i.e. the sum of all chip counts.
    pub fn degree(&self) -> i32 {
        self.chips.iter().sum()
    }

    /// Returns whether every chip count is non-negative.
    pub fn is_effective(&self) -> bool {
        self.chips.iter().all(|&c| c >= 0)
    }

    /// Returns the chip counts as a slice.
    #[inline(always)]
    pub fn as_slice(&self) -> &[i32] {
        &self.chips
    }
}

impl std::ops::Index<usize> for Divisor {
    type Output = i32;

    #[inline(always)]
    fn index(&self, v: usize) -> &i32 {
        &self.chips[v]
    }
}

impl std::ops::IndexMut<usize> for Divisor {
    #[inline(always)]
    fn index_mut(&mut self, v: usize) -> &mut i32 {
        &mut self.chips[v]
    }
}

impl fmt::Display for Divisor {
    /// Formats as `[a, b, c]`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, c) in self.chips.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{c}")?;
        }
        write!(f, "]")
    }
}

// ============================================================================
// Burning scratch
// ============================================================================

/// Scratch buffers for Dhar's burning algorithm.
///
/// Kept in a separate struct so the engine can burn against one of its own
/// divisor buffers without aliasing.
#[derive(Clone, Debug, Default)]
struct BurnScratch {
    burnt: Vec<bool>,
    burnt_edges: Vec<i32>,
    queue: VecDeque<usize>,
    firing_set: Vec<usize>,
}

impl BurnScratch {
    fn resize(&mut self, n: usize) {
        self.burnt.resize(n, false);
        self.burnt_edges.resize(n, 0);
        self.firing_set.reserve(n);
    }

    /// Runs Dhar's burning algorithm and returns the size of the firing set.
    ///
    /// Fire starts at `start` (which is always burnt; its chip count is never
    /// read) and spreads along edges: each burnt endpoint sends fire along all
    /// of its incident edges, and a vertex burns as soon as the number of
    /// burning edges reaching it exceeds its chip count. Parallel edges each
    /// count separately. The unburnt remainder is the maximal firing set in
    /// `V \ {start}` and is left in `self.firing_set`.
    fn run(&mut self, g: &Graph, divisor: &[i32], start: usize) -> usize {
        let n = g.vertex_count();
        debug_assert!(start < n, "start vertex {start} out of range (n = {n})");
        debug_assert_eq!(divisor.len(), n);
        for v in 0..n {
            self.burnt[v] = false;
            self.burnt_edges[v] = 0;
            debug_assert!(
                v == start || divisor[v] >= 0,
                "negative chip count {} at vertex {v}",
                divisor[v]
            );
        }
        self.queue.clear();
        self.queue.push_back(start);
        self.burnt[start] = true;
        while let Some(u) = self.queue.pop_front() {
            for &w in g.neighbours(u) {
                self.burnt_edges[w] += 1;
                if !self.burnt[w] && self.burnt_edges[w] > divisor[w] {
                    self.burnt[w] = true;
                    self.queue.push_back(w);
                }
            }
        }
        self.firing_set.clear();
        for v in 0..n {
            if !self.burnt[v] {
                self.firing_set.push(v);
            }
        }
        self.firing_set.len()
    }
}

// ============================================================================
// GonalityEngine
// ============================================================================

/// The chip-firing work context: burning, reduction, rank testing, and the
/// gonality search.
///
/// The engine owns every scratch buffer the algorithms need (burnt flags,
/// burnt-edge counters, the firing-set list, a working divisor, can-reach
/// flags, and the partial divisor driven by the search recursion). Buffers are
/// sized to the graph on first use and reused across calls and across graphs.
#[derive(Clone, Debug, Default)]
pub struct GonalityEngine {
    scratch: BurnScratch,
    working: Divisor,
    can_reach: Vec<bool>,
    partial: Divisor,
}

impl GonalityEngine {
    /// Creates an engine with empty scratch buffers.
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure_capacity(&mut self, n: usize) {
        if self.working.len() != n {
            self.working = Divisor::zeros(n);
            self.partial = Divisor::zeros(n);
        }
        self.scratch.resize(n);
        self.can_reach.resize(n, false);
    }

    // ------------------------------------------------------------------------
    // Dhar's burning algorithm
    // ------------------------------------------------------------------------

    /// Runs Dhar's burning algorithm from `start` and returns the firing set.
    ///
    /// The returned slice holds the vertices *not* burnt, in increasing order;
    /// it is empty iff the fire from `start` consumes the whole graph, i.e.
    /// iff `divisor` is reduced with respect to `start`. The slice borrows the
    /// engine's scratch space and is only valid until the next call.
    ///
    /// `divisor` must be effective away from `start`; the chip count of
    /// `start` itself is never read.
    ///
    /// # Panics
    /// Panics if `start` is out of range or the divisor length does not match
    /// the graph.
    pub fn burn(&mut self, g: &Graph, divisor: &Divisor, start: usize) -> &[usize] {
        let n = g.vertex_count();
        assert!(start < n, "start vertex {start} out of range (n = {n})");
        assert_eq!(divisor.len(), n, "divisor is defined on the wrong graph");
        self.ensure_capacity(n);
        let len = self.scratch.run(g, divisor.as_slice(), start);
        &self.scratch.firing_set[..len]
    }

    /// Returns whether `divisor` is reduced with respect to `target`.
    pub fn is_reduced(&mut self, g: &Graph, divisor: &Divisor, target: usize) -> bool {
        self.burn(g, divisor, target).is_empty()
    }

    /// Returns whether `divisor` is reduced with respect to *some* vertex.
    ///
    /// This is a debugging helper; the search only ever reduces to vertex 0.
    pub fn is_reduced_anywhere(&mut self, g: &Graph, divisor: &Divisor) -> bool {
        (0..g.vertex_count()).any(|v| self.is_reduced(g, divisor, v))
    }

    // ------------------------------------------------------------------------
    // Reduction
    // ------------------------------------------------------------------------

    /// Reduces an effective divisor to its `target`-reduced representative.
    ///
    /// The result is linearly equivalent to `divisor` and reduced with respect
    /// to `target`: burning from `target` consumes the whole graph.
    ///
    /// # Panics
    /// Panics if the graph is disconnected (reduction would not terminate),
    /// if `target` is out of range, or if the divisor length does not match.
    pub fn reduce(&mut self, g: &Graph, divisor: &Divisor, target: usize) -> Divisor {
        self.reduce_impl(g, divisor, target, None);
        self.working.clone()
    }

    /// Like [`GonalityEngine::reduce`], also returning the firing script.
    ///
    /// `script[v]` is the number of times vertex `v` was fired on the way to
    /// the reduced divisor; `script[target]` is always 0.
    pub fn reduce_with_script(
        &mut self,
        g: &Graph,
        divisor: &Divisor,
        target: usize,
    ) -> (Divisor, Vec<u32>) {
        let mut script = vec![0u32; g.vertex_count()];
        self.reduce_impl(g, divisor, target, Some(&mut script));
        assert_eq!(script[target], 0, "the target vertex must never fire");
        (self.working.clone(), script)
    }

    fn reduce_impl(
        &mut self,
        g: &Graph,
        divisor: &Divisor,
        target: usize,
        mut script: Option<&mut Vec<u32>>,
    ) {
        let n = g.vertex_count();
        assert!(target < n, "target vertex {target} out of range (n = {n})");
        assert_eq!(divisor.len(), n, "divisor is defined on the wrong graph");
        assert!(g.is_connected(), "reduction requires a connected graph");
        debug_assert!(g.validate().is_ok());
        self.ensure_capacity(n);
        for v in 0..n {
            self.working[v] = divisor[v];
        }
        loop {
            let len = self.scratch.run(g, self.working.as_slice(), target);
            if len == 0 {
                break;
            }
            for idx in 0..len {
                let v = self.scratch.firing_set[idx];
                if let Some(s) = script.as_deref_mut() {
                    s[v] += 1;
                }
                // One chip crosses each incident edge; looping over the
                // neighbour list keeps parallel-edge multiplicity intact.
                for &w in g.neighbours(v) {
                    self.working[v] -= 1;
                    self.working[w] += 1;
                }
            }
        }
    }

    // ------------------------------------------------------------------------
    // Positive rank
    // ------------------------------------------------------------------------

    /// Returns whether `divisor` has positive rank.
    ///
    /// A divisor `D` has positive rank iff for every vertex `u` the divisor
    /// `D - 1_u` is linearly equivalent to an effective divisor, i.e. some
    /// member of `|D|` puts a chip on `u`.
    ///
    /// # Panics
    /// Panics if the divisor is not effective, has the wrong length, or the
    /// graph is disconnected.
    pub fn has_positive_rank(&mut self, g: &Graph, divisor: &Divisor) -> bool {
        let n = g.vertex_count();
        assert_eq!(divisor.len(), n, "divisor is defined on the wrong graph");
        assert!(g.is_connected(), "the rank test requires a connected graph");
        debug_assert!(g.validate().is_ok());
        self.ensure_capacity(n);
        for v in 0..n {
            assert!(
                divisor[v] >= 0,
                "negative chip count {} at vertex {v}",
                divisor[v]
            );
            self.working[v] = divisor[v];
            self.can_reach[v] = divisor[v] > 0;
        }
        self.rank_loop(g)
    }

    /// The memoized rank loop over `self.working` / `self.can_reach`.
    ///
    /// For each vertex `u` in turn, fires Dhar sets away from `u` until a chip
    /// lands on `u` or the firing set comes up empty (no member of the class
    /// reaches `u`; rank is not positive). Every vertex that picks up a chip
    /// along the way is marked reachable, so later iterations of the `u` loop
    /// usually cost nothing.
    fn rank_loop(&mut self, g: &Graph) -> bool {
        let n = g.vertex_count();
        for u in 0..n {
            while !self.can_reach[u] {
                let len = self.scratch.run(g, self.working.as_slice(), u);
                if len == 0 {
                    return false;
                }
                for idx in 0..len {
                    let v = self.scratch.firing_set[idx];
                    for &w in g.neighbours(v) {
                        self.working[v] -= 1;
                        self.working[w] += 1;
                    }
                }
                for v in 0..n {
                    if self.working[v] > 0 {
                        self.can_reach[v] = true;
                    }
                }
            }
        }
        true
    }

    // ------------------------------------------------------------------------
    // Search
    // ------------------------------------------------------------------------

    /// Searches for an effective positive-rank divisor of degree exactly
    /// `degree`.
    ///
    /// Only v0-reduced divisors with at least one chip on vertex 0 are
    /// considered; every linear equivalence class of positive-rank divisors on
    /// a connected graph contains exactly one such representative, so the
    /// restriction loses nothing. Returns the first hit, which is already
    /// v0-reduced.
    ///
    /// # Panics
    /// Panics if `degree` is negative, the graph is empty, invalid, or
    /// disconnected.
    pub fn find_positive_rank_divisor(&mut self, g: &Graph, degree: i32) -> Option<Divisor> {
        self.begin_search(g, degree);
        if self.search_first(g, degree, 0) {
            Some(self.partial.clone())
        } else {
            None
        }
    }

    /// Enumerates *all* positive-rank v0-reduced divisors of degree exactly
    /// `degree`, invoking `callback` once per divisor found.
    ///
    /// Unlike [`GonalityEngine::find_positive_rank_divisor`] this never stops
    /// early, so it can be much slower. The divisor handed to the callback
    /// borrows the search buffer and is only valid during the call; clone it
    /// to keep it.
    ///
    /// # Panics
    /// Panics if `degree` is negative, the graph is empty, invalid, or
    /// disconnected.
    pub fn find_all_positive_rank_v0_reduced_divisors<F>(
        &mut self,
        g: &Graph,
        degree: i32,
        mut callback: F,
    ) where
        F: FnMut(&Divisor),
    {
        self.begin_search(g, degree);
        self.search_all(g, degree, 0, &mut callback);
    }

    /// Determines the divisorial gonality of `g` by brute force.
    ///
    /// Tries degrees `1, 2, ...` until a positive-rank divisor exists and
    /// returns the degree together with a v0-reduced witness. Every connected
    /// graph has gonality at most `n` (one chip everywhere), so the loop
    /// terminates.
    ///
    /// # Panics
    /// Panics if the graph is empty, invalid, or disconnected.
    pub fn find_gonality(&mut self, g: &Graph) -> (i32, Divisor) {
        let n = g.vertex_count();
        assert!(n >= 1, "gonality is undefined on the empty graph");
        let mut degree = 1;
        loop {
            if let Some(witness) = self.find_positive_rank_divisor(g, degree) {
                return (degree, witness);
            }
            assert!(
                degree <= n as i32,
                "no positive-rank divisor of degree <= n; the graph is malformed"
            );
            degree += 1;
        }
    }

    /// Shared entry checks for both search variants.
    fn begin_search(&mut self, g: &Graph, degree: i32) {
        assert!(degree >= 0, "cannot search for divisors of negative degree");
        assert!(
            g.vertex_count() >= 1,
            "cannot search for divisors on the empty graph"
        );
        if let Err(e) = g.validate() {
            panic!("invalid graph handed to the search: {e}");
        }
        assert!(g.is_connected(), "the search requires a connected graph");
        self.ensure_capacity(g.vertex_count());
    }

    /// Depth-first construction of all candidate chip vectors, aborting on the
    /// first accepted divisor.
    ///
    /// At depth `depth` the chip count of that vertex is chosen, largest
    /// first. Front-loading the mass means the subtree below `partial[0] = d`
    /// passes through the configurations a lower-degree search would visit, so
    /// `find_positive_rank_divisor(g, d)` succeeding implies the same for
    /// every degree above `d`. Vertex 0 never gets fewer than one chip.
    fn search_first(&mut self, g: &Graph, remaining: i32, depth: usize) -> bool {
        debug_assert!(remaining >= 0);
        if depth == g.vertex_count() {
            return self.leaf_accepts(g, remaining);
        }
        let stop = i32::from(depth == 0);
        let mut chips = remaining;
        while chips >= stop {
            self.partial[depth] = chips;
            if self.search_first(g, remaining - chips, depth + 1) {
                return true;
            }
            chips -= 1;
        }
        false
    }

    /// The exhaustive sibling of `search_first`; same tree, same order, no
    /// early exit.
    fn search_all<F>(&mut self, g: &Graph, remaining: i32, depth: usize, callback: &mut F)
    where
        F: FnMut(&Divisor),
    {
        debug_assert!(remaining >= 0);
        if depth == g.vertex_count() {
            if self.leaf_accepts(g, remaining) {
                callback(&self.partial);
            }
            return;
        }
        let stop = i32::from(depth == 0);
        let mut chips = remaining;
        while chips >= stop {
            self.partial[depth] = chips;
            self.search_all(g, remaining - chips, depth + 1, callback);
            chips -= 1;
        }
    }

    /// The acceptance predicate at a fully-assigned leaf.
    ///
    /// The tests run cheapest-first and short-circuit: exact degree, a chip on
    /// vertex 0, v0-reducedness, and only then the expensive rank test. The
    /// burn at step three rejects the overwhelming majority of leaves.
    fn leaf_accepts(&mut self, g: &Graph, remaining: i32) -> bool {
        if remaining != 0 || self.partial[0] < 1 {
            return false;
        }
        if self.scratch.run(g, self.partial.as_slice(), 0) != 0 {
            return false;
        }
        let n = g.vertex_count();
        for v in 0..n {
            self.working[v] = self.partial[v];
            self.can_reach[v] = self.partial[v] > 0;
        }
        self.rank_loop(g)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subdivide::subdivide;
    use rand::{Rng, SeedableRng};
    use rand_xorshift::XorShiftRng;

    // -------------------------------------------------------------------------
    // Graph fixtures
    // -------------------------------------------------------------------------

    fn path(n: usize) -> Graph {
        let mut g = Graph::new(n);
        for i in 1..n {
            g.add_edge(i - 1, i);
        }
        g
    }

    fn cycle(n: usize) -> Graph {
        let mut g = path(n);
        g.add_edge(n - 1, 0);
        g
    }

    fn complete(n: usize) -> Graph {
        let mut g = Graph::new(n);
        for i in 0..n {
            for j in (i + 1)..n {
                g.add_edge(i, j);
            }
        }
        g
    }

    /// Two vertices joined by `k` parallel edges.
    fn banana(k: usize) -> Graph {
        let mut g = Graph::new(2);
        for _ in 0..k {
            g.add_edge(0, 1);
        }
        g
    }

    fn complete_bipartite_3_3() -> Graph {
        let mut g = Graph::new(6);
        for i in 0..3 {
            for j in 3..6 {
                g.add_edge(i, j);
            }
        }
        g
    }

    fn petersen() -> Graph {
        let mut g = Graph::new(10);
        for i in 0..5 {
            g.add_edge(i, (i + 1) % 5); // outer cycle
            g.add_edge(i, i + 5); // spokes
            g.add_edge(5 + i, 5 + (i + 2) % 5); // inner pentagram
        }
        g
    }

    /// Random connected graph: a random spanning tree plus `extra` edges.
    fn random_connected<R: Rng>(rng: &mut R, n: usize, extra: usize) -> Graph {
        let mut g = Graph::new(n);
        for v in 1..n {
            g.add_edge(v, rng.random_range(0..v));
        }
        for _ in 0..extra {
            let a = rng.random_range(0..n);
            let mut b = rng.random_range(0..n);
            while b == a {
                b = rng.random_range(0..n);
            }
            g.add_edge(a, b);
        }
        g
    }

    fn random_effective<R: Rng>(rng: &mut R, n: usize, max_chips: i32) -> Divisor {
        Divisor::from_chips((0..n).map(|_| rng.random_range(0..=max_chips)).collect())
    }

    /// Fires `v` once, the way the reduction engine does.
    fn fire_once(g: &Graph, d: &mut Divisor, v: usize) {
        for &w in g.neighbours(v) {
            d[v] -= 1;
            d[w] += 1;
        }
    }

    // -------------------------------------------------------------------------
    // Divisor basics
    // -------------------------------------------------------------------------

    #[test]
    fn divisor_degree_and_effectiveness() {
        let d = Divisor::from_chips(vec![2, 0, 1]);
        assert_eq!(d.degree(), 3);
        assert!(d.is_effective());
        let e = Divisor::from_chips(vec![2, -1, 1]);
        assert_eq!(e.degree(), 2);
        assert!(!e.is_effective());
    }

    #[test]
    fn divisor_display_is_bracketed_list() {
        let d = Divisor::from_chips(vec![1, 0, 2]);
        assert_eq!(d.to_string(), "[1, 0, 2]");
        assert_eq!(Divisor::zeros(0).to_string(), "[]");
    }

    // -------------------------------------------------------------------------
    // Dhar micro-tests
    // -------------------------------------------------------------------------

    #[test]
    fn burn_on_c4_with_chips_on_start_is_reduced() {
        let g = cycle(4);
        let d = Divisor::from_chips(vec![2, 0, 0, 0]);
        let mut engine = GonalityEngine::new();
        assert!(engine.burn(&g, &d, 0).is_empty());
        assert!(engine.is_reduced(&g, &d, 0));
    }

    #[test]
    fn burn_on_c4_blocked_by_neighbour_chips() {
        let g = cycle(4);
        let d = Divisor::from_chips(vec![0, 1, 0, 1]);
        let mut engine = GonalityEngine::new();
        assert_eq!(engine.burn(&g, &d, 0), &[1, 2, 3]);
        assert!(!engine.is_reduced(&g, &d, 0));
    }

    #[test]
    fn burn_never_reads_the_start_chip_count() {
        let g = cycle(4);
        let mut engine = GonalityEngine::new();
        let reference = engine
            .burn(&g, &Divisor::from_chips(vec![0, 1, 0, 1]), 0)
            .to_vec();
        let with_garbage = engine
            .burn(&g, &Divisor::from_chips(vec![-5, 1, 0, 1]), 0)
            .to_vec();
        assert_eq!(reference, with_garbage);
    }

    #[test]
    fn burn_counts_parallel_edges_separately() {
        // Two parallel edges: one chip on the far side survives a single
        // burning edge but not two.
        let g = banana(2);
        let mut engine = GonalityEngine::new();
        assert!(engine
            .burn(&g, &Divisor::from_chips(vec![0, 1]), 0)
            .is_empty());
        // With three parallel edges even two chips burn.
        let g3 = banana(3);
        assert!(engine
            .burn(&g3, &Divisor::from_chips(vec![0, 2]), 0)
            .is_empty());
        assert_eq!(engine.burn(&g3, &Divisor::from_chips(vec![0, 3]), 0), &[1]);
    }

    #[test]
    fn burn_leaves_isolated_vertices_unburnt() {
        let mut g = Graph::new(3);
        g.add_edge(0, 1);
        let d = Divisor::zeros(3);
        let mut engine = GonalityEngine::new();
        // Vertex 2 is isolated: no fire ever reaches it.
        assert_eq!(engine.burn(&g, &d, 0), &[2]);
    }

    // -------------------------------------------------------------------------
    // Reduction
    // -------------------------------------------------------------------------

    #[test]
    fn reduce_moves_chips_to_the_target() {
        let g = path(5);
        let d = Divisor::from_chips(vec![0, 0, 0, 0, 1]);
        let mut engine = GonalityEngine::new();
        let reduced = engine.reduce(&g, &d, 0);
        assert_eq!(reduced.as_slice(), &[1, 0, 0, 0, 0]);
    }

    #[test]
    fn reduce_is_idempotent() {
        let mut rng = XorShiftRng::seed_from_u64(0x1DE0);
        let mut engine = GonalityEngine::new();
        for _ in 0..40 {
            let n = rng.random_range(2..10);
            let extra = rng.random_range(0..6);
            let g = random_connected(&mut rng, n, extra);
            let d = random_effective(&mut rng, n, 3);
            let target = rng.random_range(0..n);
            let once = engine.reduce(&g, &d, target);
            let twice = engine.reduce(&g, &once, target);
            assert_eq!(once, twice, "reduce must be idempotent");
            assert!(engine.is_reduced(&g, &once, target));
        }
    }

    #[test]
    fn reduce_canonicalizes_linearly_equivalent_divisors() {
        let mut rng = XorShiftRng::seed_from_u64(0xE901);
        let mut engine = GonalityEngine::new();
        for _ in 0..40 {
            let n = rng.random_range(2..9);
            let extra = rng.random_range(0..5);
            let g = random_connected(&mut rng, n, extra);
            // Plenty of chips so a few single-vertex firings stay effective.
            let d1 = Divisor::from_chips(
                (0..n)
                    .map(|v| g.degree(v) as i32 + rng.random_range(0..3))
                    .collect(),
            );
            let mut d2 = d1.clone();
            for _ in 0..rng.random_range(1..8) {
                let v = rng.random_range(0..n);
                if d2[v] >= g.degree(v) as i32 {
                    fire_once(&g, &mut d2, v);
                }
            }
            assert!(d2.is_effective());
            let target = rng.random_range(0..n);
            assert_eq!(
                engine.reduce(&g, &d1, target),
                engine.reduce(&g, &d2, target),
                "equivalent divisors must share their reduced form"
            );
        }
    }

    #[test]
    fn reduce_script_replays_to_the_reduced_divisor() {
        let mut rng = XorShiftRng::seed_from_u64(0x5C1B);
        let mut engine = GonalityEngine::new();
        for _ in 0..30 {
            let n = rng.random_range(2..9);
            let extra = rng.random_range(0..5);
            let g = random_connected(&mut rng, n, extra);
            let d = random_effective(&mut rng, n, 3);
            let target = rng.random_range(0..n);
            let (reduced, script) = engine.reduce_with_script(&g, &d, target);
            assert_eq!(script[target], 0);

            // Replay: each vertex fires script[v] times.
            let mut replayed = d.clone();
            for v in 0..n {
                for _ in 0..script[v] {
                    fire_once(&g, &mut replayed, v);
                }
            }
            assert_eq!(replayed, reduced, "script must reproduce the reduction");
        }
    }

    #[test]
    fn is_reduced_matches_empty_firing_set() {
        let mut rng = XorShiftRng::seed_from_u64(0xB02D);
        let mut engine = GonalityEngine::new();
        for _ in 0..50 {
            let n = rng.random_range(2..9);
            let extra = rng.random_range(0..5);
            let g = random_connected(&mut rng, n, extra);
            let d = random_effective(&mut rng, n, 2);
            for target in 0..n {
                let empty = engine.burn(&g, &d, target).is_empty();
                assert_eq!(empty, engine.is_reduced(&g, &d, target));
            }
        }
    }

    #[test]
    fn is_reduced_anywhere_finds_the_right_vertex() {
        let g = path(4);
        let mut engine = GonalityEngine::new();
        // A chip at the end of the path: reduced at that end only.
        let d = Divisor::from_chips(vec![0, 0, 0, 1]);
        assert!(engine.is_reduced(&g, &d, 3));
        assert!(!engine.is_reduced(&g, &d, 0));
        assert!(engine.is_reduced_anywhere(&g, &d));
    }

    #[test]
    #[should_panic(expected = "connected")]
    fn reduce_rejects_disconnected_graphs() {
        let mut g = Graph::new(4);
        g.add_edge(0, 1);
        g.add_edge(2, 3);
        let mut engine = GonalityEngine::new();
        let _ = engine.reduce(&g, &Divisor::zeros(4), 0);
    }

    // -------------------------------------------------------------------------
    // Positive rank
    // -------------------------------------------------------------------------

    #[test]
    fn all_ones_divisor_has_positive_rank() {
        let mut rng = XorShiftRng::seed_from_u64(0x0A11);
        let mut engine = GonalityEngine::new();
        for _ in 0..20 {
            let n = rng.random_range(2..9);
            let extra = rng.random_range(0..5);
            let g = random_connected(&mut rng, n, extra);
            let ones = Divisor::from_chips(vec![1; n]);
            assert!(engine.has_positive_rank(&g, &ones));
        }
    }

    #[test]
    fn single_chip_on_a_path_has_positive_rank() {
        let g = path(5);
        let mut engine = GonalityEngine::new();
        let d = Divisor::from_chips(vec![1, 0, 0, 0, 0]);
        assert!(engine.has_positive_rank(&g, &d));
    }

    #[test]
    fn single_chip_on_k4_does_not_have_positive_rank() {
        let g = complete(4);
        let mut engine = GonalityEngine::new();
        let d = Divisor::from_chips(vec![1, 0, 0, 0]);
        assert!(!engine.has_positive_rank(&g, &d));
        let witness = Divisor::from_chips(vec![1, 1, 1, 0]);
        assert!(engine.has_positive_rank(&g, &witness));
    }

    #[test]
    fn antipodal_chips_on_c6_have_positive_rank() {
        let g = cycle(6);
        let mut engine = GonalityEngine::new();
        let d = Divisor::from_chips(vec![1, 0, 0, 1, 0, 0]);
        assert!(engine.has_positive_rank(&g, &d));
        let single = Divisor::from_chips(vec![1, 0, 0, 0, 0, 0]);
        assert!(!engine.has_positive_rank(&g, &single));
    }

    #[test]
    fn rank_is_monotone_under_adding_chips() {
        let mut rng = XorShiftRng::seed_from_u64(0x3A0C);
        let mut engine = GonalityEngine::new();
        for _ in 0..30 {
            let n = rng.random_range(2..8);
            let extra = rng.random_range(0..4);
            let g = random_connected(&mut rng, n, extra);
            let d = random_effective(&mut rng, n, 2);
            if !engine.has_positive_rank(&g, &d) {
                continue;
            }
            let mut bigger = d.clone();
            for _ in 0..rng.random_range(1..4) {
                bigger[rng.random_range(0..n)] += 1;
            }
            assert!(
                engine.has_positive_rank(&g, &bigger),
                "adding chips must not destroy positive rank"
            );
        }
    }

    #[test]
    #[should_panic(expected = "connected")]
    fn rank_test_rejects_disconnected_graphs() {
        let mut g = Graph::new(4);
        g.add_edge(0, 1);
        g.add_edge(2, 3);
        let mut engine = GonalityEngine::new();
        let _ = engine.has_positive_rank(&g, &Divisor::from_chips(vec![1, 1, 1, 1]));
    }

    // -------------------------------------------------------------------------
    // Gonality: boundary cases and end-to-end scenarios
    // -------------------------------------------------------------------------

    #[test]
    fn gonality_of_single_vertex_is_one() {
        let g = Graph::new(1);
        let mut engine = GonalityEngine::new();
        let (gon, witness) = engine.find_gonality(&g);
        assert_eq!(gon, 1);
        assert_eq!(witness.as_slice(), &[1]);
    }

    #[test]
    fn gonality_of_trees_is_one() {
        let mut rng = XorShiftRng::seed_from_u64(0x72EE);
        let mut engine = GonalityEngine::new();
        for _ in 0..10 {
            let n = rng.random_range(2..10);
            let tree = random_connected(&mut rng, n, 0);
            let (gon, _) = engine.find_gonality(&tree);
            assert_eq!(gon, 1, "trees have gonality 1");
        }
    }

    #[test]
    fn gonality_of_paths_is_one() {
        let g = path(5);
        let mut engine = GonalityEngine::new();
        let (gon, witness) = engine.find_gonality(&g);
        assert_eq!(gon, 1);
        assert_eq!(witness.as_slice(), &[1, 0, 0, 0, 0]);
    }

    #[test]
    fn gonality_of_cycles_is_two() {
        let mut engine = GonalityEngine::new();
        for n in 3..8 {
            let (gon, _) = engine.find_gonality(&cycle(n));
            assert_eq!(gon, 2, "C{n} must have gonality 2");
        }
    }

    #[test]
    fn gonality_of_c6_witness() {
        let g = cycle(6);
        let mut engine = GonalityEngine::new();
        let (gon, witness) = engine.find_gonality(&g);
        assert_eq!(gon, 2);
        assert!(engine.is_reduced(&g, &witness, 0));
        assert!(engine.has_positive_rank(&g, &witness));
    }

    #[test]
    fn gonality_of_complete_graphs_is_n_minus_one() {
        let mut engine = GonalityEngine::new();
        for n in 2..6 {
            let (gon, _) = engine.find_gonality(&complete(n));
            assert_eq!(gon, n as i32 - 1, "K{n} must have gonality {}", n - 1);
        }
    }

    #[test]
    fn gonality_of_k4_with_witness() {
        let g = complete(4);
        let mut engine = GonalityEngine::new();
        let (gon, witness) = engine.find_gonality(&g);
        assert_eq!(gon, 3);
        assert_eq!(witness.degree(), 3);
        assert!(witness[0] >= 1);
        assert!(engine.is_reduced(&g, &witness, 0));
        assert!(engine.has_positive_rank(&g, &witness));
    }

    #[test]
    fn gonality_of_k33_is_three() {
        let g = complete_bipartite_3_3();
        let mut engine = GonalityEngine::new();
        let (gon, _) = engine.find_gonality(&g);
        assert_eq!(gon, 3);
    }

    #[test]
    fn gonality_of_the_petersen_graph_is_four() {
        let g = petersen();
        let mut engine = GonalityEngine::new();
        assert!(engine.find_positive_rank_divisor(&g, 3).is_none());
        let (gon, witness) = engine.find_gonality(&g);
        assert_eq!(gon, 4);
        assert!(engine.has_positive_rank(&g, &witness));
    }

    #[test]
    fn gonality_of_banana_graphs() {
        let mut engine = GonalityEngine::new();
        // A single edge is a tree.
        let (gon, _) = engine.find_gonality(&banana(1));
        assert_eq!(gon, 1);
        // With parallel edges a single chip cannot cross the bundle, so
        // degree-1 divisors have rank 0 and the gonality is 2.
        for k in 2..5 {
            let (gon, witness) = engine.find_gonality(&banana(k));
            assert_eq!(gon, 2, "banana graph with {k} edges must have gonality 2");
            assert_eq!(witness.degree(), 2);
            assert!(engine.has_positive_rank(&banana(k), &witness));
        }
    }

    #[test]
    fn subdividing_k4_preserves_its_gonality() {
        let g = complete(4);
        let h = subdivide(&g, 2);
        assert_eq!(h.vertex_count(), 10);
        let mut engine = GonalityEngine::new();
        let (gon, _) = engine.find_gonality(&h);
        assert_eq!(gon, 3, "the 2-regular subdivision of K4 keeps gonality 3");
    }

    #[test]
    fn gonality_is_between_one_and_n() {
        let mut rng = XorShiftRng::seed_from_u64(0xB0DD);
        let mut engine = GonalityEngine::new();
        for _ in 0..15 {
            let n = rng.random_range(2..8);
            let extra = rng.random_range(0..6);
            let g = random_connected(&mut rng, n, extra);
            let (gon, witness) = engine.find_gonality(&g);
            assert!(gon >= 1 && gon <= n as i32);
            assert_eq!(witness.degree(), gon);
            assert!(witness.is_effective());
        }
    }

    // -------------------------------------------------------------------------
    // Search properties
    // -------------------------------------------------------------------------

    #[test]
    fn search_fails_below_the_gonality() {
        let mut engine = GonalityEngine::new();
        assert!(engine.find_positive_rank_divisor(&complete(4), 2).is_none());
        assert!(engine.find_positive_rank_divisor(&cycle(6), 1).is_none());
        assert!(engine
            .find_positive_rank_divisor(&complete_bipartite_3_3(), 2)
            .is_none());
    }

    #[test]
    fn search_succeeds_above_the_gonality() {
        let mut rng = XorShiftRng::seed_from_u64(0xD36);
        let mut engine = GonalityEngine::new();
        for _ in 0..10 {
            let n = rng.random_range(2..7);
            let extra = rng.random_range(0..5);
            let g = random_connected(&mut rng, n, extra);
            let (gon, _) = engine.find_gonality(&g);
            for degree in gon..=(n as i32) {
                assert!(
                    engine.find_positive_rank_divisor(&g, degree).is_some(),
                    "degree {degree} >= gonality {gon} must succeed"
                );
            }
        }
    }

    #[test]
    fn found_divisors_satisfy_the_acceptance_predicate() {
        let mut rng = XorShiftRng::seed_from_u64(0xACCE);
        let mut engine = GonalityEngine::new();
        let mut checker = GonalityEngine::new();
        for _ in 0..10 {
            let n = rng.random_range(2..7);
            let extra = rng.random_range(0..5);
            let g = random_connected(&mut rng, n, extra);
            let (gon, _) = engine.find_gonality(&g);
            if let Some(d) = engine.find_positive_rank_divisor(&g, gon) {
                assert_eq!(d.degree(), gon);
                assert!(d[0] >= 1);
                assert!(checker.is_reduced(&g, &d, 0));
                assert!(checker.has_positive_rank(&g, &d));
            } else {
                panic!("gonality-degree search must succeed");
            }
        }
    }

    /// Brute-force reference enumeration over all effective degree-`d`
    /// divisors, filtered by the same predicates through a second engine.
    fn reference_enumeration(g: &Graph, degree: i32) -> Vec<Vec<i32>> {
        fn go(
            g: &Graph,
            engine: &mut GonalityEngine,
            buf: &mut Vec<i32>,
            remaining: i32,
            out: &mut Vec<Vec<i32>>,
        ) {
            if buf.len() == g.vertex_count() {
                if remaining != 0 {
                    return;
                }
                let d = Divisor::from_chips(buf.clone());
                if d[0] >= 1 && engine.is_reduced(g, &d, 0) && engine.has_positive_rank(g, &d) {
                    out.push(buf.clone());
                }
                return;
            }
            for chips in 0..=remaining {
                buf.push(chips);
                go(g, engine, buf, remaining - chips, out);
                buf.pop();
            }
        }
        let mut engine = GonalityEngine::new();
        let mut out = Vec::new();
        go(g, &mut engine, &mut Vec::new(), degree, &mut out);
        out.sort_unstable();
        out
    }

    #[test]
    fn enumeration_is_sound_and_complete() {
        let mut rng = XorShiftRng::seed_from_u64(0xE7A1);
        let mut engine = GonalityEngine::new();
        for _ in 0..8 {
            let n = rng.random_range(2..6);
            let extra = rng.random_range(0..4);
            let g = random_connected(&mut rng, n, extra);
            for degree in 1..=3 {
                let mut found = Vec::new();
                engine.find_all_positive_rank_v0_reduced_divisors(&g, degree, |d| {
                    assert_eq!(d.degree(), degree);
                    assert!(d.is_effective());
                    found.push(d.as_slice().to_vec());
                });
                found.sort_unstable();
                assert_eq!(
                    found,
                    reference_enumeration(&g, degree),
                    "enumeration mismatch at degree {degree}"
                );
            }
        }
    }

    #[test]
    fn enumeration_on_c6_contains_the_antipodal_witness() {
        let g = cycle(6);
        let mut engine = GonalityEngine::new();
        let mut found = Vec::new();
        engine.find_all_positive_rank_v0_reduced_divisors(&g, 2, |d| {
            found.push(d.as_slice().to_vec());
        });
        assert!(found.contains(&vec![1, 0, 0, 1, 0, 0]));
    }

    #[test]
    #[should_panic(expected = "connected")]
    fn search_rejects_disconnected_graphs() {
        let mut g = Graph::new(4);
        g.add_edge(0, 1);
        g.add_edge(2, 3);
        let mut engine = GonalityEngine::new();
        let _ = engine.find_positive_rank_divisor(&g, 2);
    }

    #[test]
    fn engine_buffers_survive_switching_graphs() {
        let mut engine = GonalityEngine::new();
        let (gon_a, _) = engine.find_gonality(&complete(5));
        let (gon_b, _) = engine.find_gonality(&path(3));
        let (gon_c, _) = engine.find_gonality(&complete(4));
        assert_eq!((gon_a, gon_b, gon_c), (4, 1, 3));
    }
}
