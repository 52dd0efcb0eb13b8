//! The `check` command: load and validate a program without running it.

use std::path::Path;

use super::EXIT_LOAD_FAILURE;
use crate::load::load_file;

/// Validate a program file. Prints a one-line summary on success.
pub fn check_file(path: &str) -> i32 {
    match load_file(Path::new(path)) {
        Ok(program) => {
            let functions = program
                .bodies()
                .iter()
                .filter(|body| body.kind == ember_ir::BodyKind::Function)
                .count();
            let clauses: usize = program
                .bodies()
                .iter()
                .map(|body| body.handlers.len() + usize::from(body.cleanup.is_some()))
                .sum();
            println!(
                "{path}: ok ({functions} functions, {} bodies, {clauses} clauses)",
                program.bodies().len()
            );
            0
        }
        Err(e) => {
            eprintln!("error: {e}");
            EXIT_LOAD_FAILURE
        }
    }
}
