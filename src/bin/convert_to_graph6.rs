//! Converts plain-format graphs on stdin to graph6 on stdout.
//!
//! Usage: `convert_to_graph6 [k] < graphs.in > graphs.g6`
//!
//! With a numerical argument `k`, every graph is replaced by its k-regular
//! subdivision before conversion. Since subdividing splits parallel edges
//! into separate paths, this also makes multigraphs expressible in graph6,
//! which cannot represent parallel edges itself. Non-simple graphs without a
//! subdivision argument are reported on stderr and skipped.

use dgon::graph::{Graph, MAX_PARTS_PER_EDGE};
use dgon::graph6::write_graph6;
use dgon::io::read_plain;
use dgon::subdivide::subdivide;

fn main() {
    let parts = parse_args();
    let stdin = std::io::stdin();
    if let Err(e) = read_plain(stdin.lock(), |g| convert(&g, parts)) {
        fatal(&e.to_string());
    }
}

fn convert(g: &Graph, parts: Option<usize>) {
    if let Err(e) = g.validate() {
        fatal(&format!("graph \"{}\" is malformed: {e}", g.name()));
    }
    let subdivided;
    let h: &Graph = match parts {
        None => g,
        Some(k) => {
            subdivided = subdivide(g, k);
            &subdivided
        }
    };
    match write_graph6(h) {
        Ok(encoded) => println!("{encoded}"),
        Err(e) => eprintln!(
            "ERROR: graph must be simple (no parallel edges) to be stored in graph6 format! \
             Skipping graph \"{}\". ({e})",
            g.name()
        ),
    }
}

fn parse_args() -> Option<usize> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.as_slice() {
        [] => None,
        [arg] if arg.bytes().all(|b| b.is_ascii_digit()) => match arg.parse::<usize>() {
            Ok(k) if (2..=MAX_PARTS_PER_EDGE).contains(&k) => Some(k),
            _ => {
                eprintln!(
                    "Error: invalid value of k (should be between 2 and {MAX_PARTS_PER_EDGE})."
                );
                usage_and_exit(1);
            }
        },
        _ => usage_and_exit(1),
    }
}

fn fatal(msg: &str) -> ! {
    eprintln!("Error: {msg}");
    std::process::exit(1)
}

fn usage_and_exit(code: i32) -> ! {
    eprintln!(
        "Usage:\n  convert_to_graph6 [k] < infile.in > outfile.g6\n\n\
         Convert plain-format graphs to graph6.\n\n\
         Numerical arguments:\n\
         \x20   k    : subdivide every edge into k parts before converting (optional)\n"
    );
    std::process::exit(code)
}
