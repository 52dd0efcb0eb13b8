#![expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]

use super::*;
use crate::print_handler::{buffer_handler, PrintHandlerImpl};
use ember_ir::ProgramBuilder;
use pretty_assertions::assert_eq;

fn run_main(b: ProgramBuilder) -> (Result<Value, FatalTermination>, String) {
    let program = b.finish().unwrap();
    let handler = buffer_handler();
    let mut interpreter = InterpreterBuilder::new(&program)
        .mode(EvalMode::TestRun)
        .print_handler(handler.clone())
        .build();
    let result = interpreter.run_entry();
    assert_eq!(interpreter.stack_depth(), 0);
    (result, handler.get_output())
}

fn fatal_type(result: &Result<Value, FatalTermination>) -> String {
    match result {
        Err(fatal) => fatal.value.type_name().to_string(),
        Ok(v) => panic!("expected fatal termination, got {v}"),
    }
}

#[test]
fn default_handler_is_stdout() {
    let mut b = ProgramBuilder::new();
    let main = b.function("main", &[], vec![]);
    b.set_entry(main);
    let program = b.finish().unwrap();

    let interpreter = InterpreterBuilder::new(&program).build();
    assert!(matches!(
        interpreter.print_handler().as_ref(),
        PrintHandlerImpl::Stdout(_)
    ));
    assert_eq!(interpreter.mode(), EvalMode::Interpret);
}

#[test]
fn test_run_mode_captures_output_by_default() {
    let mut b = ProgramBuilder::new();
    let main = b.function("main", &[], vec![]);
    b.set_entry(main);
    let program = b.finish().unwrap();

    let interpreter = InterpreterBuilder::new(&program)
        .mode(EvalMode::TestRun)
        .build();
    assert!(matches!(
        interpreter.print_handler().as_ref(),
        PrintHandlerImpl::Buffer(_)
    ));
    assert_eq!(interpreter.stack.max_depth(), Some(500));
}

#[test]
fn empty_body_evaluates_to_nil() {
    let mut b = ProgramBuilder::new();
    let main = b.function("main", &[], vec![]);
    b.set_entry(main);
    let (result, _) = run_main(b);
    assert_eq!(result.unwrap(), Value::Nil);
}

#[test]
fn let_binds_and_returns_value() {
    let mut b = ProgramBuilder::new();
    let one = b.int(1);
    let bind = b.let_("x", one);
    let x = b.ident("x");
    let seq = b.seq(vec![bind, x]);
    let main = b.function("main", &[], vec![seq]);
    b.set_entry(main);
    let (result, _) = run_main(b);
    assert_eq!(result.unwrap(), Value::Int(1));
}

#[test]
fn print_joins_arguments_with_spaces() {
    let mut b = ProgramBuilder::new();
    let s = b.str("hello");
    let n = b.int(42);
    let sym = b.symbol("ok");
    let print = b.print(vec![s, n, sym]);
    let main = b.function("main", &[], vec![print]);
    b.set_entry(main);
    let (result, out) = run_main(b);
    assert_eq!(result.unwrap(), Value::Nil);
    assert_eq!(out, "hello 42 :ok\n");
}

#[test]
fn function_call_binds_parameters() {
    let mut b = ProgramBuilder::new();
    let a = b.ident("a");
    b.function("id", &["a"], vec![a]);
    let arg = b.str("x");
    let call = b.call("id", vec![arg]);
    let main = b.function("main", &[], vec![call]);
    b.set_entry(main);
    let (result, _) = run_main(b);
    assert_eq!(result.unwrap(), Value::string("x"));
}

#[test]
fn functions_do_not_see_caller_bindings() {
    let mut b = ProgramBuilder::new();
    let secret = b.ident("secret");
    b.function("peek", &[], vec![secret]);
    let value = b.int(7);
    let bind = b.let_("secret", value);
    let call = b.call("peek", vec![]);
    let main = b.function("main", &[], vec![bind, call]);
    b.set_entry(main);
    let (result, _) = run_main(b);
    assert_eq!(fatal_type(&result), "NameError");
}

#[test]
fn closure_captures_creating_frame() {
    let mut b = ProgramBuilder::new();
    let n = b.ident("n");
    let body = b.closure("adder", &[], vec![n]);
    let ten = b.int(10);
    let bind_n = b.let_("n", ten);
    let lambda = b.lambda(body);
    let bind_f = b.let_("f", lambda);
    let f = b.ident("f");
    let apply = b.apply(f, vec![]);
    let main = b.function("main", &[], vec![bind_n, bind_f, apply]);
    b.set_entry(main);
    let (result, _) = run_main(b);
    assert_eq!(result.unwrap(), Value::Int(10));
}

#[test]
fn block_sees_enclosing_bindings_but_does_not_leak_its_own() {
    let mut b = ProgramBuilder::new();
    let x = b.ident("x");
    let inner_val = b.int(2);
    let bind_y = b.let_("y", inner_val);
    let block = b.block("inner", vec![bind_y, x]);
    let one = b.int(1);
    let bind_x = b.let_("x", one);
    let begin = b.begin(block);
    let y = b.ident("y");
    let main = b.function("main", &[], vec![bind_x, begin, y]);
    b.set_entry(main);
    let (result, _) = run_main(b);
    let fatal = result.unwrap_err();
    assert_eq!(fatal.value.type_name(), "NameError");
    assert_eq!(
        fatal.value.as_record().unwrap().get("name"),
        Some(&Value::string("y"))
    );
}

#[test]
fn record_field_access() {
    let mut b = ProgramBuilder::new();
    let msg = b.str("boom");
    let rec = b.record("Oops", vec![("message", msg)]);
    let field = b.field(rec, "message");
    let main = b.function("main", &[], vec![field]);
    b.set_entry(main);
    let (result, _) = run_main(b);
    assert_eq!(result.unwrap(), Value::string("boom"));
}

#[test]
fn missing_field_raises_field_error() {
    let mut b = ProgramBuilder::new();
    let rec = b.record("Oops", vec![]);
    let field = b.field(rec, "message");
    let main = b.function("main", &[], vec![field]);
    b.set_entry(main);
    let (result, _) = run_main(b);
    assert_eq!(fatal_type(&result), "FieldError");
}

#[test]
fn applying_non_closure_raises_type_error() {
    let mut b = ProgramBuilder::new();
    let three = b.int(3);
    let apply = b.apply(three, vec![]);
    let main = b.function("main", &[], vec![apply]);
    b.set_entry(main);
    let (result, _) = run_main(b);
    assert_eq!(fatal_type(&result), "TypeError");
}

#[test]
fn arity_mismatch_raises_in_caller() {
    let mut b = ProgramBuilder::new();
    b.function("one", &["a"], vec![]);
    let call = b.call("one", vec![]);
    let main = b.function("main", &[], vec![call]);
    b.set_entry(main);
    let (result, _) = run_main(b);
    let fatal = result.unwrap_err();
    assert_eq!(fatal.value.type_name(), "ArgumentError");
    let frames: Vec<_> = fatal.trace.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(frames, vec!["main"]);
}

#[test]
fn undefined_function_raises_name_error() {
    let mut b = ProgramBuilder::new();
    let call = b.call("nowhere", vec![]);
    let main = b.function("main", &[], vec![call]);
    b.set_entry(main);
    let (result, _) = run_main(b);
    assert_eq!(fatal_type(&result), "NameError");
}

#[test]
fn raise_stops_the_rest_of_the_body() {
    let mut b = ProgramBuilder::new();
    let raise = b.raise(None);
    let s = b.str("unreachable");
    let print = b.print(vec![s]);
    let main = b.function("main", &[], vec![raise, print]);
    b.set_entry(main);
    let (result, out) = run_main(b);
    assert_eq!(result.unwrap_err().value, Value::Nil);
    assert_eq!(out, "");
}

#[test]
fn raise_in_argument_prevents_the_call() {
    let mut b = ProgramBuilder::new();
    let s = b.str("called");
    let print = b.print(vec![s]);
    b.function("callee", &["x"], vec![print]);
    let boom = b.str("boom");
    let raise = b.raise(Some(boom));
    let call = b.call("callee", vec![raise]);
    let main = b.function("main", &[], vec![call]);
    b.set_entry(main);
    let (result, out) = run_main(b);
    assert_eq!(result.unwrap_err().value, Value::string("boom"));
    assert_eq!(out, "");
}

#[test]
fn call_function_from_outside() {
    let mut b = ProgramBuilder::new();
    let a = b.ident("a");
    b.function("echo", &["a"], vec![a]);
    let main = b.function("main", &[], vec![]);
    b.set_entry(main);
    let program = b.finish().unwrap();
    let mut interpreter = InterpreterBuilder::new(&program)
        .mode(EvalMode::TestRun)
        .build();

    assert_eq!(
        interpreter
            .call_function("echo", vec![Value::Int(5)])
            .unwrap(),
        Value::Int(5)
    );
    let interned = program.interner().len();
    let missing = interpreter.call_function("missing", vec![]).unwrap_err();
    assert_eq!(missing.value.type_name(), "NameError");
    assert!(missing.trace.is_empty());
    assert_eq!(program.interner().len(), interned);
}

#[test]
fn profile_counts_frames_and_raises() {
    let mut b = ProgramBuilder::new();
    let boom = b.str("boom");
    let raise = b.raise(Some(boom));
    let inner = b.function("inner", &[], vec![raise]);
    b.ensure(inner, vec![]);
    let call = b.call("inner", vec![]);
    let ok = b.symbol("ok");
    let main = b.function("main", &[], vec![call]);
    b.rescue(main, None, vec![ok]);
    b.set_entry(main);
    let program = b.finish().unwrap();

    let mut interpreter = InterpreterBuilder::new(&program)
        .mode(EvalMode::TestRun)
        .profile(true)
        .build();
    assert_eq!(interpreter.run_entry().unwrap(), Value::symbol("ok"));

    let counters = interpreter.counters().unwrap();
    assert_eq!(counters.frames_entered, 2);
    assert_eq!(counters.raises, 1);
    assert_eq!(counters.handlers_matched, 1);
    assert_eq!(counters.cleanups_run, 1);
    assert_eq!(counters.frames_unwound, 1);
}

#[test]
fn counters_absent_without_profile() {
    let mut b = ProgramBuilder::new();
    let main = b.function("main", &[], vec![]);
    b.set_entry(main);
    let program = b.finish().unwrap();
    let interpreter = InterpreterBuilder::new(&program).build();
    assert!(interpreter.counters().is_none());
}

fn escaped_signal(program: &Program, body: BodyId) -> ExceptionSignal {
    let mut interpreter = InterpreterBuilder::new(program)
        .mode(EvalMode::TestRun)
        .print_handler(buffer_handler())
        .build();
    let signal = interpreter
        .invoke(body, FxHashMap::default(), Vec::new())
        .unwrap_err();
    assert_eq!(interpreter.stack_depth(), 0);
    signal
}

fn unwound_names(signal: &ExceptionSignal) -> Vec<&str> {
    signal.unwound().iter().map(|f| f.name.as_str()).collect()
}

#[test]
fn signal_keeps_origin_and_last_searched_frame() {
    let mut b = ProgramBuilder::new();
    let boom = b.symbol("boom");
    let raise = b.raise(Some(boom));
    let inner = b.function("inner", &[], vec![raise]);
    let string = b.pattern_type("String", None);
    let unused = b.nil();
    b.rescue(inner, Some(string), vec![unused]);
    let call = b.call("inner", vec![]);
    let main = b.function("main", &[], vec![call]);
    let integer = b.pattern_type("Integer", None);
    let unused = b.nil();
    b.rescue(main, Some(integer), vec![unused]);
    b.set_entry(main);
    let program = b.finish().unwrap();

    let signal = escaped_signal(&program, main);
    assert_eq!(signal.value(), &Value::symbol("boom"));
    assert_eq!(signal.origin(), Some(1));
    assert_eq!(signal.searching(), Some(0));
    assert_eq!(unwound_names(&signal), vec!["inner", "main"]);
}

#[test]
fn raise_from_handler_is_not_searched_in_its_own_frame() {
    let mut b = ProgramBuilder::new();
    let first = b.symbol("first");
    let raise_first = b.raise(Some(first));
    let main = b.function("main", &[], vec![raise_first]);
    let second = b.symbol("second");
    let raise_second = b.raise(Some(second));
    b.rescue(main, None, vec![raise_second]);
    b.set_entry(main);
    let program = b.finish().unwrap();

    let signal = escaped_signal(&program, main);
    assert_eq!(signal.value(), &Value::symbol("second"));
    assert_eq!(signal.origin(), Some(0));
    assert_eq!(signal.searching(), None);
    assert_eq!(unwound_names(&signal), vec!["main"]);
}
