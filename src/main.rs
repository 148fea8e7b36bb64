//! # Central Kernel CI CLI
//!
//! This is the binary entry point for the `ci-core` command-line tool.
//!
//! Its primary responsibilities are:
//! - Parsing command-line arguments using `clap`.
//! - Setting up logging.
//! - Executing the appropriate command based on the parsed arguments.
//!
//! The core application logic is defined in the `lib.rs` library crate, so the
//! binary stays a thin wrapper. Any error a command returns ends the process
//! with a non-zero exit code and its message on stderr.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli.execute()
}
