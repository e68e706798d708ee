//! Converts graph6 lines on stdin to the plain format on stdout.
//!
//! Usage: `convert_from_graph6 < graphs.g6 > graphs.out`
//!
//! Each graph is named `Graph N ("<graph6>")` after its position and source
//! line. Don't run this on huge graph6 files; the plain output is much
//! larger.

use dgon::graph6::parse_graph6;
use dgon::io::write_plain;
use std::io::{BufRead, Write};

fn main() {
    if std::env::args().len() > 1 {
        eprintln!("Usage:\n  convert_from_graph6 < infile.g6 > outfile.out");
        std::process::exit(1);
    }

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let mut count = 0u64;
    for line in stdin.lock().lines() {
        let line = line.unwrap_or_else(|e| fatal(&format!("failed to read stdin: {e}")));
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let mut g =
            parse_graph6(line).unwrap_or_else(|e| fatal(&format!("bad graph6 line {line:?}: {e}")));
        if let Err(e) = g.validate() {
            fatal(&format!("decoded graph is malformed: {e}"));
        }
        count += 1;
        g.set_name(format!("Graph {count} (\"{line}\")"));
        write_plain(&mut out, &g)
            .unwrap_or_else(|e| fatal(&format!("failed to write stdout: {e}")));
    }
    out.flush()
        .unwrap_or_else(|e| fatal(&format!("failed to flush stdout: {e}")));
}

fn fatal(msg: &str) -> ! {
    eprintln!("Error: {msg}");
    std::process::exit(1)
}
