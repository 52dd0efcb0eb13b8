#![expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]

use super::*;
use ember_eval::{buffer_handler, EvalMode, InterpreterBuilder, Value};
use pretty_assertions::assert_eq;

fn run(text: &str) -> (Result<Value, ember_eval::FatalTermination>, String) {
    let program = load_str(text).unwrap();
    let handler = buffer_handler();
    let mut interpreter = InterpreterBuilder::new(&program)
        .mode(EvalMode::TestRun)
        .print_handler(handler.clone())
        .build();
    let result = interpreter.run_entry();
    (result, handler.get_output())
}

#[test]
fn loads_minimal_program() {
    let program = load_str(r#"{"functions": [{"name": "main"}]}"#).unwrap();
    assert_eq!(program.bodies().len(), 1);
    assert!(program.entry().is_some());
}

#[test]
fn custom_entry_name() {
    let (result, _) = run(
        r#"{
            "entry": "start",
            "functions": [{"name": "start", "body": [{"op": "int", "value": 3}]}]
        }"#,
    );
    assert_eq!(result.unwrap(), Value::Int(3));
}

#[test]
fn missing_entry_is_a_program_error() {
    let err = load_str(r#"{"functions": [{"name": "helper"}]}"#).unwrap_err();
    assert!(matches!(err, LoadError::Program(ProgramError::MissingEntry)));
}

#[test]
fn unnamed_function_is_rejected() {
    let err = load_str(r#"{"functions": [{"name": "main"}, {"body": []}]}"#).unwrap_err();
    assert!(matches!(err, LoadError::UnnamedFunction { index: 1 }));
}

#[test]
fn unknown_op_is_a_json_error() {
    let err = load_str(
        r#"{"functions": [{"name": "main", "body": [{"op": "loop"}]}]}"#,
    )
    .unwrap_err();
    assert!(matches!(err, LoadError::Json(_)));
    assert!(err.to_string().starts_with("malformed program:"));
}

#[test]
fn unknown_top_level_field_is_rejected() {
    let err = load_str(r#"{"functions": [], "imports": []}"#).unwrap_err();
    assert!(matches!(err, LoadError::Json(_)));
}

#[test]
fn non_literal_in_literal_pattern_is_rejected() {
    let err = load_str(
        r#"{"functions": [{
            "name": "main",
            "rescue": [{"pattern": {"kind": "literal", "value": {"op": "ident", "name": "x"}}}]
        }]}"#,
    )
    .unwrap_err();
    assert!(matches!(err, LoadError::NonLiteralPattern { op: "ident" }));
}

#[test]
fn block_with_parameters_fails_validation() {
    let err = load_str(
        r#"{"functions": [{
            "name": "main",
            "body": [{"op": "begin", "params": ["x"]}]
        }]}"#,
    )
    .unwrap_err();
    assert!(matches!(
        err,
        LoadError::Program(ProgramError::BlockWithParameters { .. })
    ));
}

#[test]
fn missing_file_reports_path() {
    let err = load_file(Path::new("/nonexistent/ember/program.json")).unwrap_err();
    assert!(err.to_string().contains("/nonexistent/ember/program.json"));
}

#[test]
fn rescue_and_ensure_clauses_run() {
    let (result, out) = run(
        r#"{"functions": [
            {
                "name": "a",
                "body": [{"op": "raise", "value": {"op": "str", "value": "woops"}}],
                "ensure": [{"op": "call", "func": "print", "args": [{"op": "str", "value": "a cleanup"}]}]
            },
            {
                "name": "main",
                "body": [{"op": "call", "func": "a"}],
                "rescue": [
                    {"pattern": {"kind": "type", "tag": "Integer"}, "body": [{"op": "symbol", "value": "int"}]},
                    {"pattern": {"kind": "literal", "value": {"op": "str", "value": "woops"}},
                     "body": [{"op": "symbol", "value": "rescued"}]}
                ]
            }
        ]}"#,
    );
    assert_eq!(result.unwrap(), Value::symbol("rescued"));
    assert_eq!(out, "a cleanup\n");
}

#[test]
fn lambda_and_begin_bodies_keep_their_clauses() {
    let (result, _) = run(
        r#"{"functions": [{
            "name": "main",
            "body": [
                {"op": "let", "name": "f", "value": {
                    "op": "lambda", "params": ["x"],
                    "body": [{"op": "raise", "value": {"op": "ident", "name": "x"}}],
                    "rescue": [{"pattern": {"kind": "bind", "name": "e"},
                                "body": [{"op": "record", "type": "Wrapped",
                                          "fields": [{"name": "inner", "value": {"op": "ident", "name": "e"}}]}]}]
                }},
                {"op": "begin", "name": "use_it", "body": [
                    {"op": "field",
                     "target": {"op": "apply", "callee": {"op": "ident", "name": "f"},
                                "args": [{"op": "symbol", "value": "boom"}]},
                     "field": "inner"}
                ]}
            ]
        }]}"#,
    );
    assert_eq!(result.unwrap(), Value::symbol("boom"));
}

#[test]
fn program_def_round_trips_through_serde() {
    let def = ProgramDef {
        entry: "main".to_string(),
        functions: vec![BodyDef {
            name: Some("main".to_string()),
            body: vec![ExprDef::Raise { value: None }],
            rescue: vec![RescueDef {
                pattern: Some(PatternDef::Any),
                body: vec![ExprDef::Symbol {
                    value: "ok".to_string(),
                }],
            }],
            ..BodyDef::default()
        }],
    };
    let text = serde_json::to_string(&def).unwrap();
    let (result, _) = run(&text);
    assert_eq!(result.unwrap(), Value::symbol("ok"));
}
