//! Command handlers for the `ember` CLI.
//!
//! Handlers return the process exit status instead of exiting, so the binary
//! stays a thin argument parser and the handlers can be driven from tests.

mod check;
mod run;

pub use check::check_file;
pub use run::{execute, parse_run_args, run_file, RunOptions};

/// Exit status when the program file cannot be read, parsed or validated.
pub const EXIT_LOAD_FAILURE: i32 = 2;

/// Exit status for bad command-line usage.
pub const EXIT_USAGE: i32 = 2;
