//! fetcha CLI entry point
//!
//! Parses arguments and dispatches to the CLI module. Prints errors to
//! stderr and exits non-zero on failure.

use fetcha::cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
