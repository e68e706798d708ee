//! k-regular edge subdivision.

use crate::graph::{Graph, MAX_N, MAX_PARTS_PER_EDGE};

/// Builds the `parts_per_edge`-regular subdivision of `g`.
///
/// Every edge is replaced by a path of `parts_per_edge` edges running through
/// `parts_per_edge - 1` fresh degree-2 vertices; parallel edges are subdivided
/// separately, so the result of subdividing a multigraph is always simple for
/// `parts_per_edge >= 2`. The original vertices keep their labels and the
/// fresh vertices are numbered from `n` upwards in edge-visit order.
///
/// # Panics
/// Panics if `parts_per_edge` is outside `[2, MAX_PARTS_PER_EDGE]`, if the
/// subdivision would exceed [`MAX_N`] vertices, or if the input graph is
/// invalid.
pub fn subdivide(g: &Graph, parts_per_edge: usize) -> Graph {
    assert!(
        (2..=MAX_PARTS_PER_EDGE).contains(&parts_per_edge),
        "parts_per_edge must be between 2 and {MAX_PARTS_PER_EDGE}, got {parts_per_edge}"
    );
    debug_assert!(g.validate().is_ok());
    let n = g.vertex_count();
    let m = g.count_edges();
    let total = n + m * (parts_per_edge - 1);
    assert!(
        total <= MAX_N,
        "subdividing into {parts_per_edge} parts needs {total} vertices; the limit is {MAX_N}"
    );

    let mut h = Graph::with_name(total, g.name());
    let mut next_fresh = n;
    for i in 0..n {
        for &j in g.neighbours(i) {
            if i < j {
                // One chain per neighbour-list occurrence, so each parallel
                // edge gets its own path.
                let mut prev = i;
                for _ in 1..parts_per_edge {
                    h.add_edge(prev, next_fresh);
                    prev = next_fresh;
                    next_fresh += 1;
                }
                h.add_edge(prev, j);
            }
        }
    }
    debug_assert_eq!(next_fresh, total);
    h
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_xorshift::XorShiftRng;

    fn complete(n: usize) -> Graph {
        let mut g = Graph::new(n);
        for i in 0..n {
            for j in (i + 1)..n {
                g.add_edge(i, j);
            }
        }
        g
    }

    #[test]
    fn subdividing_an_edge_makes_a_path() {
        let mut g = Graph::new(2);
        g.add_edge(0, 1);
        let h = subdivide(&g, 3);
        assert_eq!(h.vertex_count(), 4);
        assert_eq!(h.count_edges(), 3);
        // 0 - 2 - 3 - 1
        assert_eq!(h.neighbours(0), &[2]);
        assert_eq!(h.neighbours(2), &[0, 3]);
        assert_eq!(h.neighbours(3), &[2, 1]);
        assert_eq!(h.neighbours(1), &[3]);
    }

    #[test]
    fn subdivision_vertex_and_edge_counts() {
        let mut rng = XorShiftRng::seed_from_u64(0x5DBD);
        for _ in 0..20 {
            let n = rng.random_range(2..12);
            let mut g = Graph::new(n);
            for _ in 0..rng.random_range(1..20) {
                let a = rng.random_range(0..n);
                let mut b = rng.random_range(0..n);
                while b == a {
                    b = rng.random_range(0..n);
                }
                g.add_edge(a, b);
            }
            let m = g.count_edges();
            for k in 2..=4 {
                let h = subdivide(&g, k);
                assert_eq!(h.vertex_count(), n + m * (k - 1));
                assert_eq!(h.count_edges(), m * k);
                assert!(h.validate().is_ok());
                // Fresh vertices all have degree 2.
                for v in n..h.vertex_count() {
                    assert_eq!(h.degree(v), 2);
                }
            }
        }
    }

    #[test]
    fn subdivision_preserves_connectivity() {
        let g = complete(4);
        assert!(g.is_connected());
        let h = subdivide(&g, 2);
        assert!(h.is_connected());
        assert!(h.is_simple());
    }

    #[test]
    fn parallel_edges_get_separate_chains() {
        let mut g = Graph::new(2);
        g.add_edge(0, 1);
        g.add_edge(0, 1);
        let h = subdivide(&g, 2);
        // Each parallel edge becomes its own 2-path; the result is the simple
        // 4-cycle 0 - 2 - 1 - 3 - 0.
        assert_eq!(h.vertex_count(), 4);
        assert_eq!(h.count_edges(), 4);
        assert!(h.is_simple());
        assert_eq!(h.degree(0), 2);
        assert_eq!(h.degree(1), 2);
    }

    #[test]
    fn subdivision_keeps_the_name() {
        let mut g = Graph::with_name(2, "bridge");
        g.add_edge(0, 1);
        assert_eq!(subdivide(&g, 2).name(), "bridge");
    }

    #[test]
    #[should_panic(expected = "parts_per_edge")]
    fn subdivide_rejects_one_part() {
        let mut g = Graph::new(2);
        g.add_edge(0, 1);
        let _ = subdivide(&g, 1);
    }

    #[test]
    #[should_panic(expected = "parts_per_edge")]
    fn subdivide_rejects_too_many_parts() {
        let mut g = Graph::new(2);
        g.add_edge(0, 1);
        let _ = subdivide(&g, MAX_PARTS_PER_EDGE + 1);
    }
}
