//! The `run` command: load a program and evaluate its entry body.

use std::path::Path;

use ember_eval::{
    stdout_handler, EvalCounters, EvalMode, FatalTermination, InterpreterBuilder,
    SharedPrintHandler, Value,
};
use ember_ir::Program;

use super::EXIT_LOAD_FAILURE;
use crate::load::load_file;

/// Options accepted by `ember run`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Print evaluation counters to stderr after the run.
    pub profile: bool,
    /// Frame depth limit; `None` keeps the mode default.
    pub max_depth: Option<usize>,
}

/// Parse the arguments following `run`: one file path plus flags, in any order.
pub fn parse_run_args(args: &[String]) -> Result<(String, RunOptions), String> {
    let mut options = RunOptions::default();
    let mut path = None;

    for arg in args {
        if arg == "--profile" {
            options.profile = true;
        } else if let Some(depth) = arg.strip_prefix("--max-depth=") {
            let depth = depth
                .parse::<usize>()
                .map_err(|e| format!("invalid --max-depth value `{depth}`: {e}"))?;
            if depth == 0 {
                return Err("--max-depth must be at least 1".to_string());
            }
            options.max_depth = Some(depth);
        } else if arg.starts_with('-') {
            return Err(format!("unknown option `{arg}`"));
        } else if path.is_none() {
            path = Some(arg.clone());
        } else {
            return Err(format!("unexpected argument `{arg}`"));
        }
    }

    path.map(|p| (p, options))
        .ok_or_else(|| "missing file path".to_string())
}

/// Evaluate a loaded program's entry body.
///
/// Returns the counters alongside the outcome when profiling is on.
pub fn execute(
    program: &Program,
    options: &RunOptions,
    print_handler: SharedPrintHandler,
) -> (Result<Value, FatalTermination>, Option<EvalCounters>) {
    let mut builder = InterpreterBuilder::new(program)
        .mode(EvalMode::Interpret)
        .print_handler(print_handler)
        .profile(options.profile);
    if let Some(depth) = options.max_depth {
        builder = builder.max_depth(depth);
    }
    let mut interpreter = builder.build();
    let result = interpreter.run_entry();
    (result, interpreter.counters().cloned())
}

/// Run a program file. Returns the process exit status.
pub fn run_file(path: &str, options: &RunOptions) -> i32 {
    let program = match load_file(Path::new(path)) {
        Ok(program) => program,
        Err(e) => {
            eprintln!("error: {e}");
            return EXIT_LOAD_FAILURE;
        }
    };

    let (result, counters) = execute(&program, options, stdout_handler());
    if let Some(counters) = counters {
        eprintln!("{}", counters.report());
    }

    match result {
        Ok(value) => {
            tracing::debug!(value = %value.inspect(), "program finished");
            0
        }
        Err(fatal) => {
            eprint!("{}", fatal.render());
            FatalTermination::EXIT_CODE
        }
    }
}
