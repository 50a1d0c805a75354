//! # cpzip CLI
//!
//! This is the binary entry point for the `cpzip` command-line tool.
//!
//! Its primary responsibilities are:
//! - Parsing command-line arguments using `clap`.
//! - Running the copy for every source and target pair.
//! - Translating failures into error output and a process exit code.
//!
//! The core logic lives in the `cpzip` library crate; the binary is a thin
//! wrapper around it.

mod cli;

fn main() {
    let cli = cli::Cli::parse_or_exit();
    std::process::exit(cli.execute());
}
