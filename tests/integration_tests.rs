//! Integration tests for Ember using `Compilation` and `Session` as entry
//! points.
//!
//! Programs under `test_scripts/` are compiled through the public API and
//! their lowered bodies are run by the harness evaluator, so these tests
//! check observable behavior: what a program prints and which diagnostics
//! it reports.

mod test_harness;

use ember::compiler::flow::ControlFlowGraph;
use ember::compiler::typed::Stmt;
use ember::{CompilationOptions, ErrorCategory, SemanticError, Session};
use test_harness::*;

// =============================================================================
// Basic Programs
// =============================================================================

#[test]
fn test_hello_world() {
    assert_eq!(run_file("hello_world.em"), "Hello, Ember!\n");
}

#[test]
fn test_recursion_and_while() {
    assert_eq!(run_file("fibonacci.em"), "0 1 1 2 3 5 8 13 21 34 \n");
}

#[test]
fn test_loop_labels() {
    assert_eq!(run_file("loops.em"), "20\n*\n**\n***\n");
}

#[test]
fn test_classes() {
    assert_eq!(run_file("classes.em"), "created at 5\n7\n2\n3\n");
}

#[test]
fn test_object_initializer_runs_on_first_use() {
    assert_eq!(
        run_file("objects.em"),
        "start\nregistry ready\nregistered a\nregistered b\n2\n2\n"
    );
}

#[test]
fn test_arrays() {
    assert_eq!(run_file("arrays.em"), "16\n30\nember\ntrue\n");
}

#[test]
fn test_conversions() {
    assert_eq!(run_file("conversions.em"), "42\ntrue!\nA\n97\n5\n");
}

#[test]
fn test_overload_resolution() {
    assert_eq!(run_file("overloads.em"), "int 1\nstring one\nany\n");
}

// =============================================================================
// Lowering
// =============================================================================

#[test]
fn test_lowering_preserves_evaluation_order() {
    assert_eq!(
        run_file("evaluation_order.em"),
        "abc\n6\n1neither\n3either\n"
    );
}

#[test]
fn test_all_bodies_are_lowered() {
    let (compilation, assembly) = compile_files(&["loops.em"]);
    assert_clean(&compilation, &assembly);
    for (_, body) in assembly.bodies.iter() {
        assert!(body.is_lowered());
    }

    let entry = assembly.entry_body().expect("entry body");
    assert!(
        entry
            .statements
            .iter()
            .any(|stmt| matches!(stmt, Stmt::ConditionalGoto { .. }))
    );
}

#[test]
fn test_for_loop_bounds_are_inclusive() {
    let output =
        run_program("for (i <- 1 to 3) print(i)\nfor (i <- 3 to 1) print(i)\nprintln(\"\")");
    assert_eq!(output, "123\n");
}

#[test]
fn test_for_loop_sums_inclusive_range() {
    let output = run_program("var sum = 0\nfor (i <- 1 to 3) { sum = sum + i }\nprintln(sum)");
    assert_eq!(output, "6\n");
}

#[test]
fn test_continue_runs_the_increment() {
    let output = run_program(
        "var seen = 0\nfor (i <- 1 to 5) {\n    if (i < 4) continue\n    seen = seen + i\n}\n\
         println(seen)",
    );
    assert_eq!(output, "9\n");
}

#[test]
fn test_if_as_value_in_nested_blocks() {
    let output = run_program(
        "def pick(n: int): string = {\n    val small = n < 10\
         \n    if (small) { val s = \"small\"; s } else \"large\"\n}\n\
         println(pick(3))\nprintln(pick(30))",
    );
    assert_eq!(output, "small\nlarge\n");
}

// =============================================================================
// Multiple Files
// =============================================================================

#[test]
fn test_namespaces_across_files() {
    let (compilation, assembly) = compile_files(&["geometry.em", "uses_geometry.em"]);
    assert_clean(&compilation, &assembly);
    let mut evaluator = Evaluator::new(assembly);
    evaluator.run_entry();
    assert_eq!(evaluator.take_output(), "7\n0\n");
}

#[test]
fn test_file_order_does_not_matter() {
    let (compilation, assembly) = compile_files(&["uses_geometry.em", "geometry.em"]);
    assert_clean(&compilation, &assembly);
    let mut evaluator = Evaluator::new(assembly);
    evaluator.run_entry();
    assert_eq!(evaluator.take_output(), "7\n0\n");
}

#[test]
fn test_statements_in_two_files() {
    let (_, assembly) = compile(
        CompilationOptions::program(),
        &[("a.em", "println(1)"), ("b.em", "println(2)")],
    );
    assert_eq!(
        semantic_errors(&assembly),
        vec![
            SemanticError::GlobalStatementsInMultipleFiles,
            SemanticError::GlobalStatementsInMultipleFiles
        ]
    );
}

#[test]
fn test_user_main() {
    let (compilation, assembly) = compile(
        CompilationOptions::program(),
        &[
            ("util.em", "def greet(name: string): unit = println(\"hi \" + name)"),
            ("main.em", "def main(): unit = greet(readLine())"),
        ],
    );
    assert_clean(&compilation, &assembly);
    let mut evaluator = Evaluator::new(assembly);
    evaluator.push_input("ember");
    evaluator.run_entry();
    assert_eq!(evaluator.take_output(), "hi ember\n");
}

// =============================================================================
// Diagnostics
// =============================================================================

#[test]
fn test_errors_are_collected_in_order() {
    let (compilation, assembly) = compile_files(&["errors.em"]);
    assert_eq!(
        semantic_errors(&assembly),
        vec![
            SemanticError::ImplicitConversionRequired {
                from: "string".to_string(),
                to: "int".to_string()
            },
            SemanticError::UndefinedName {
                name: "y".to_string()
            },
            SemanticError::NoConversion {
                from: "bool".to_string(),
                to: "int".to_string()
            },
            SemanticError::BreakOutsideLoop,
        ]
    );

    let messages = rendered(&compilation, &assembly);
    assert_eq!(messages[1], "errors.em(2, 9): undefined name 'y'");
    assert_eq!(messages[3], "errors.em(5, 1): 'break' can only be used inside a loop");
}

#[test]
fn test_syntax_errors_pass_through() {
    let (_, assembly) =
        compile(CompilationOptions::program(), &[("bad.em", "val = 1\nprintln(2)")]);
    assert!(assembly.has_errors());
    assert_eq!(assembly.diagnostics[0].category(), ErrorCategory::Syntax);
    assert!(semantic_errors(&assembly).is_empty(), "{:?}", assembly.diagnostics);
}

#[test]
fn test_error_operands_do_not_cascade() {
    let (_, assembly) = compile(
        CompilationOptions::program(),
        &[("main.em", "val a = missing + 1\nval b = a * 2\nprintln(b - a)")],
    );
    assert_eq!(
        semantic_errors(&assembly),
        vec![SemanticError::UndefinedName {
            name: "missing".to_string()
        }]
    );
}

#[test]
fn test_return_path_check_follows_the_options() {
    let source = "def f(c: bool): int = if (c) 1 else 2\ndef g(c: bool): int = { while (c) {}; 3 }";
    for check in [true, false] {
        let (compilation, assembly) = compile(
            CompilationOptions::program().check_return_paths(check),
            &[("main.em", source)],
        );
        assert_eq!(compilation.options().check_return_paths, check);
        assert_clean(&compilation, &assembly);
    }
}

#[test]
fn test_lowered_functions_produce_a_value_on_every_path() {
    for file in ["classes.em", "overloads.em", "fibonacci.em"] {
        let (compilation, assembly) = compile_files(&[file]);
        assert_clean(&compilation, &assembly);
        for (method, body) in assembly.bodies.iter() {
            if assembly.symbols.type_or_error(method).is_unit() {
                continue;
            }
            let graph = ControlFlowGraph::build(body).expect("lowered labels resolve");
            assert!(
                graph.all_paths_return(),
                "{} falls off its end",
                assembly.symbols.qualified_name(method)
            );
        }
    }
}

// =============================================================================
// Sessions
// =============================================================================

#[test]
fn test_session_keeps_state_between_submissions() {
    let mut session = Session::default();

    let first = session
        .submit("var count = 1\ndef bump(): int = { count = count + 1; count }")
        .unwrap();
    assert!(!first.has_errors(), "{:?}", first.diagnostics);
    let mut evaluator = Evaluator::new(first);
    evaluator.run_entry();

    let second = session.submit("bump()\nbump()").unwrap();
    assert!(!second.has_errors(), "{:?}", second.diagnostics);
    evaluator.load(second);
    assert_eq!(evaluator.run_entry(), Value::Int(3));
}

#[test]
fn test_script_value_is_the_last_expression() {
    let mut session = Session::default();
    let assembly = session.submit("val greeting = \"hello\"\ngreeting + \" world\"").unwrap();
    let mut evaluator = Evaluator::new(assembly);
    assert_eq!(evaluator.run_entry().to_string(), "hello world");
}

#[test]
fn test_session_reports_per_submission() {
    let mut session = Session::default();
    session.submit("class Box(v: int)").unwrap();
    let assembly = session.submit("new Box(1).w").unwrap();
    assert_eq!(
        semantic_errors(&assembly),
        vec![SemanticError::UndefinedMember {
            container: "Box".to_string(),
            name: "w".to_string()
        }]
    );
}

#[test]
fn test_later_submission_shadows_earlier_value() {
    let mut session = Session::default();
    let first = session.submit("val x = 1").unwrap();
    let mut evaluator = Evaluator::new(first);
    evaluator.run_entry();

    let second = session.submit("val x = \"s\"\nx").unwrap();
    assert!(!second.has_errors(), "{:?}", second.diagnostics);
    evaluator.load(second);
    assert_eq!(evaluator.run_entry().to_string(), "s");
}

#[test]
fn test_object_initializer_runs_before_static_store() {
    let output = run_program(
        "object Counter {\n    var hits = 10\n    println(\"init\")\n}\n\
         Counter.hits = Counter.hits + 1\nprintln(Counter.hits)",
    );
    assert_eq!(output, "init\n11\n");
}
