//! Reads graphs from standard input and computes their divisorial gonality.
//!
//! Usage: `find_gonality [-g] [-a] [-v[v]] [k] < graphs.in`
//!
//! With a numerical argument `k`, every graph is replaced by its k-regular
//! subdivision before the gonality is computed (`k = 1` leaves the graph
//! untouched). Input is the plain format by default, or graph6 with `-g`;
//! `-a` enumerates every optimal v0-reduced divisor, `-v` prints the optimal
//! divisor, and `-vv` additionally prints the reduced divisor for every
//! target vertex.

use dgon::divisor::{Divisor, GonalityEngine};
use dgon::graph::{Graph, MAX_PARTS_PER_EDGE};
use dgon::graph6::parse_graph6;
use dgon::io::read_plain;
use dgon::subdivide::subdivide;
use std::io::BufRead;

struct Options {
    graph6: bool,
    find_all: bool,
    verbosity: u32,
    parts: usize,
}

fn main() {
    let opts = parse_args();
    let mut engine = GonalityEngine::new();
    let stdin = std::io::stdin();

    if opts.graph6 {
        for line in stdin.lock().lines() {
            let line = line.unwrap_or_else(|e| fatal(&format!("failed to read stdin: {e}")));
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let mut g = parse_graph6(line)
                .unwrap_or_else(|e| fatal(&format!("bad graph6 line {line:?}: {e}")));
            g.set_name(line);
            solve(&mut engine, &g, &opts);
        }
    } else if let Err(e) = read_plain(stdin.lock(), |g| solve(&mut engine, &g, &opts)) {
        fatal(&e.to_string());
    }
}

fn solve(engine: &mut GonalityEngine, g: &Graph, opts: &Options) {
    if let Err(e) = g.validate() {
        fatal(&format!("graph \"{}\" is malformed: {e}", g.name()));
    }
    let subdivided;
    let h: &Graph = if opts.parts == 1 {
        g
    } else {
        subdivided = subdivide(g, opts.parts);
        &subdivided
    };
    if !h.is_connected() {
        fatal(&format!(
            "graph \"{}\" is disconnected; the gonality search requires connected graphs",
            g.name()
        ));
    }

    if opts.find_all {
        println!("{}:", g.name());
        let mut optimal: Vec<Divisor> = Vec::new();
        for degree in 1..=h.vertex_count() as i32 {
            engine.find_all_positive_rank_v0_reduced_divisors(h, degree, |d| {
                optimal.push(d.clone());
            });
            if !optimal.is_empty() {
                break;
            }
        }
        assert!(!optimal.is_empty(), "every connected graph has a gonality");
        for divisor in &optimal {
            show_divisor(engine, h, divisor, opts);
        }
    } else {
        // The name goes out before the search so long runs show progress.
        print!("{}:", g.name());
        let _ = std::io::Write::flush(&mut std::io::stdout());
        let (gonality, witness) = engine.find_gonality(h);
        println!(" {gonality}");
        show_divisor(engine, h, &witness, opts);
    }
}

fn show_divisor(engine: &mut GonalityEngine, h: &Graph, divisor: &Divisor, opts: &Options) {
    if opts.find_all || opts.verbosity >= 1 {
        let reduced = engine.reduce(h, divisor, 0);
        debug_assert!(engine.is_reduced(h, &reduced, 0));
        println!("  Positive rank divisor: {reduced}");
    }
    if opts.verbosity >= 2 {
        for target in 0..h.vertex_count() {
            let reduced = engine.reduce(h, divisor, target);
            debug_assert!(engine.is_reduced(h, &reduced, target));
            let pad = if target < 10 { "  " } else { " " };
            println!("    Reduced to vertex {target}:{pad}{reduced}");
        }
    }
}

fn parse_args() -> Options {
    let mut opts = Options {
        graph6: false,
        find_all: false,
        verbosity: 0,
        parts: 1,
    };
    for arg in std::env::args().skip(1) {
        if let Some(flags) = arg.strip_prefix('-') {
            if flags.is_empty() {
                usage_and_exit(1);
            }
            for flag in flags.chars() {
                match flag {
                    'g' => opts.graph6 = true,
                    'a' => opts.find_all = true,
                    'v' => opts.verbosity += 1,
                    _ => usage_and_exit(1),
                }
            }
        } else if arg.bytes().all(|b| b.is_ascii_digit()) {
            match arg.parse::<usize>() {
                Ok(k) if (1..=MAX_PARTS_PER_EDGE).contains(&k) => opts.parts = k,
                _ => {
                    eprintln!(
                        "Error: invalid value of k (should be between 1 and {MAX_PARTS_PER_EDGE})."
                    );
                    usage_and_exit(1);
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
        "Usage:\n  find_gonality [-g] [-a] [-v[v]] [k] < infile.in\n\n\
         Find the gonality of every graph read from standard input.\n\n\
         Numerical arguments:\n\
         \x20   k    : number of parts into which every edge should be divided (default: 1)\n\n\
         Input options:\n\
         \x20  -g    : use graph6 input instead of plain input\n\n\
         Output options:\n\
         \x20  -a    : find (and show) all optimal v0-reduced divisors\n\
         \x20  -v    : verbose (show the optimal v0-reduced divisor)\n\
         \x20  -vv   : extra verbose (show the reduced divisor for every vertex in the graph)\n"
    );
    std::process::exit(code)
}
