//! Tests the Brill–Noether conjecture over a stream of graph6 graphs.
//!
//! Usage: `geng -cd2 -q <n> <n>:<3n-9> | brill_noether [-v[v]] [-q]`
//!
//! The generator stays external: pipe in the output of nauty's `geng`,
//! restricted to connected graphs of minimum degree 2 with at most `3n - 9`
//! edges (more edges make the Brill–Noether bound reach `n - 2.5`, and every
//! non-complete simple graph has gonality at most `n - 2`, so denser graphs
//! are trivially fine).
//!
//! For every graph the program first tries to discharge the bound cheaply:
//! graphs with a leaf are skipped, graphs whose bound is trivially met are
//! skipped, and a randomized independent-set approximation
//! (Boppana–Halldórsson) is run a few times to certify a small gonality upper
//! bound. Only survivors get the full brute-force gonality search. Graphs are
//! processed in parallel, one engine per worker; SIGINT/SIGTERM prints the
//! summary so far and exits with status 1.

use dgon::divisor::GonalityEngine;
use dgon::graph6::parse_graph6;
use dgon::iset::{
    approximate_maximum_independent_set, complement_indicator_divisor, is_independent_set,
};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use rayon::prelude::*;
use std::io::BufRead;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// How often to rerun the randomized independent-set approximation. Around 7
/// tries is where the returns flatten out; a few extra are cheap next to one
/// gonality search.
const INDEPENDENT_SET_TRIES: usize = 15;

struct Options {
    verbosity: u32,
    quiet: bool,
}

fn main() {
    let opts = parse_args();
    let tested = Arc::new(AtomicU64::new(0));
    let problems = Arc::new(AtomicU64::new(0));

    {
        let tested = Arc::clone(&tested);
        let problems = Arc::clone(&problems);
        ctrlc::set_handler(move || {
            eprintln!("\n\nReceived interrupt; aborting...");
            println!();
            print_summary(&tested, &problems);
            std::process::exit(1);
        })
        .unwrap_or_else(|e| fatal(&format!("failed to install the signal handler: {e}")));
    }

    if !opts.quiet {
        eprintln!(">A Reading graph6 graphs from standard input");
    }

    let stdin = std::io::stdin();
    let lines: Vec<String> = stdin
        .lock()
        .lines()
        .collect::<Result<_, _>>()
        .unwrap_or_else(|e| fatal(&format!("failed to read stdin: {e}")));

    lines
        .into_par_iter()
        .enumerate()
        .for_each_init(
            || {
                (
                    GonalityEngine::new(),
                    SmallRng::seed_from_u64(rand::random()),
                )
            },
            |(engine, rng), (idx, line)| {
                let line = line.trim();
                if line.is_empty() {
                    return;
                }
                tested.fetch_add(1, Ordering::Relaxed);
                check_graph(engine, rng, idx as u64 + 1, line, &opts, &problems);
            },
        );

    println!();
    print_summary(&tested, &problems);
}

fn check_graph(
    engine: &mut GonalityEngine,
    rng: &mut SmallRng,
    idx: u64,
    g6: &str,
    opts: &Options,
    problems: &AtomicU64,
) {
    let g = parse_graph6(g6).unwrap_or_else(|e| fatal(&format!("bad graph6 line {g6:?}: {e}")));
    if let Err(e) = g.validate() {
        fatal(&format!("decoded graph is malformed: {e}"));
    }
    let n = g.vertex_count();

    if (0..n).any(|v| g.degree(v) <= 1) {
        if opts.verbosity >= 2 {
            println!("Graph {idx} (\"{g6}\") has a vertex of degree 1. Skipping.");
        }
        return;
    }
    if !g.is_connected() {
        fatal(&format!(
            "graph {idx} (\"{g6}\") is disconnected; generate with geng -c"
        ));
    }

    let m = g.count_edges() as i64;
    let genus = m - n as i64 + 1;
    let bound = (genus + 3) / 2;
    if bound >= n as i64 - 2 {
        if opts.verbosity >= 2 {
            println!(
                "Graph {idx} (\"{g6}\") trivially meets the Brill–Noether bound \
                 (BN bound = {bound}, N - 2 = {}). Skipping.",
                n as i64 - 2
            );
        }
        return;
    }

    // A large independent set certifies a small gonality; the approximation is
    // randomized, so try a few times. Every result is re-verified before use.
    for _ in 0..INDEPENDENT_SET_TRIES {
        let indep = approximate_maximum_independent_set(&g, rng);
        assert!(
            is_independent_set(&g, &indep),
            "approximation returned a dependent set for graph {idx}"
        );
        let certificate = complement_indicator_divisor(&g, &indep);
        assert_eq!(
            certificate.degree() as usize + indep.count_ones(),
            n,
            "certificate degree mismatch for graph {idx}"
        );
        assert!(
            engine.has_positive_rank(&g, &certificate),
            "certificate divisor lost positive rank for graph {idx}"
        );
        if i64::from(certificate.degree()) <= bound {
            if opts.verbosity >= 2 {
                println!(
                    "Graph {idx} (\"{g6}\") has a sufficiently large independent set. Skipping."
                );
            }
            return;
        }
    }

    let (gonality, _) = engine.find_gonality(&g);
    if i64::from(gonality) > bound {
        println!(
            "Graph {idx} (\"{g6}\") fails Brill–Noether bound! Gonality: {gonality}, bound: {bound}."
        );
        problems.fetch_add(1, Ordering::Relaxed);
    } else if opts.verbosity >= 2 {
        println!("Graph {idx} (\"{g6}\"): OK.");
    }
}

fn print_summary(tested: &AtomicU64, problems: &AtomicU64) {
    println!(
        "Summary: tested {} graphs; found {} problems.",
        tested.load(Ordering::Relaxed),
        problems.load(Ordering::Relaxed)
    );
}

fn parse_args() -> Options {
    let mut opts = Options {
        verbosity: 0,
        quiet: false,
    };
    for arg in std::env::args().skip(1) {
        if let Some(flags) = arg.strip_prefix('-') {
            if flags.is_empty() {
                usage_and_exit(1);
            }
            for flag in flags.chars() {
                match flag {
                    'v' => opts.verbosity += 1,
                    'q' => opts.quiet = true,
                    'h' => usage_and_exit(0),
                    _ => usage_and_exit(1),
                }
            }
        } else {
            usage_and_exit(1);
        }
    }
    opts
}

fn fatal(msg: &str) -> ! {
    eprintln!("Error: {msg}");
    std::process::exit(1)
}

fn usage_and_exit(code: i32) -> ! {
    eprintln!(
        "Usage:\n  geng -cd2 -q n n:3n-9 | brill_noether [-v[v]] [-q]\n\n\
         Test the Brill–Noether conjecture for a stream of graph6 graphs.\n\n\
         The graphs are expected on standard input, one graph6 string per line,\n\
         typically generated by nauty's geng restricted to connected graphs of\n\
         minimum degree 2 (denser or leafier graphs satisfy the bound trivially\n\
         and are skipped here anyway).\n\n\
         Output options:\n\
         \x20  -v    : verbose\n\
         \x20  -vv   : extra verbose (outputs the conclusion for every graph)\n\
         \x20          (WARNING: this produces a lot of output!)\n\
         \x20  -q    : suppress the startup banner\n"
    );
    std::process::exit(code)
}
