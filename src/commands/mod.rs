//! # CLI Command Implementations
//!
//! This module contains the implementation for each subcommand of the `ci-core`
//! command-line tool. Each subcommand is defined in its own file to keep the
//! logic separated and maintainable.
//!
//! ## Structure
//!
//! Each command module contains:
//! - An `Args` struct that defines the command-specific arguments and options,
//!   derived using `clap`.
//! - An `execute` function that takes the parsed `Args` plus the CI root
//!   layout and performs the command's logic.
//!
//! The `execute` functions orchestrate calls into the `ci_core` library and
//! report through logging; stdout is reserved for CI output lines.

pub mod add;
pub mod matrix;
pub mod meta;
pub mod notify;
pub mod parse;
pub mod setup;
pub mod update;
pub mod watch;
