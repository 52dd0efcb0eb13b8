//! Shared harness for the propagation integration tests.

#![allow(dead_code, reason = "not every test binary uses every helper")]

use ember_eval::{buffer_handler, EvalMode, FatalTermination, InterpreterBuilder, Value};
use ember_ir::{Program, ProgramBuilder};

/// Outcome of running a program's entry body.
pub struct Run {
    pub result: Result<Value, FatalTermination>,
    pub output: String,
}

impl Run {
    pub fn value(&self) -> &Value {
        match &self.result {
            Ok(value) => value,
            Err(fatal) => panic!("unexpected fatal termination:\n{}", fatal.render()),
        }
    }

    pub fn fatal(&self) -> &FatalTermination {
        match &self.result {
            Err(fatal) => fatal,
            Ok(value) => panic!("expected fatal termination, got {value}"),
        }
    }

    pub fn lines(&self) -> Vec<&str> {
        self.output.lines().collect()
    }

    /// How many output lines equal `marker`.
    pub fn count(&self, marker: &str) -> usize {
        self.output.lines().filter(|line| *line == marker).count()
    }
}

pub fn build(b: ProgramBuilder) -> Program {
    match b.finish() {
        Ok(program) => program,
        Err(e) => panic!("invalid test program: {e}"),
    }
}

pub fn run(b: ProgramBuilder) -> Run {
    run_program(&build(b), None)
}

pub fn run_with_depth(b: ProgramBuilder, depth: usize) -> Run {
    run_program(&build(b), Some(depth))
}

fn run_program(program: &Program, depth: Option<usize>) -> Run {
    let handler = buffer_handler();
    let mut builder = InterpreterBuilder::new(program)
        .mode(EvalMode::TestRun)
        .print_handler(handler.clone());
    if let Some(depth) = depth {
        builder = builder.max_depth(depth);
    }
    let mut interpreter = builder.build();
    let result = interpreter.run_entry();
    assert_eq!(interpreter.stack_depth(), 0, "frames left on the stack");
    Run {
        result,
        output: handler.get_output(),
    }
}

/// `print(text)` as one expression.
pub fn print_marker(b: &mut ProgramBuilder, text: &str) -> ember_ir::ExprId {
    let s = b.str(text);
    b.print(vec![s])
}
