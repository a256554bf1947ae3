//! End-to-end scenarios driven through the public `Vm::interpret` API,
//! capturing `print` output into an in-memory sink instead of spawning a
//! subprocess.

use loxrs::vm::{InterpretError, Vm};

fn run(source: &str) -> Result<String, InterpretError> {
    let mut vm = Vm::new();
    let mut out = Vec::new();
    vm.interpret(source, &mut out)?;
    Ok(String::from_utf8(out).expect("print only ever emits UTF-8 in these tests"))
}

#[test]
fn arithmetic_respects_precedence_and_parens() {
    assert_eq!(run("print (1 + 2) * 3 - 4 / 2;").unwrap(), "7\n");
}

#[test]
fn string_concatenation_and_value_equality() {
    assert_eq!(
        run(r#"print "ab" + "cd"; print "ab" == "ab"; print "ab" == "cd";"#).unwrap(),
        "abcd\ntrue\nfalse\n"
    );
}

#[test]
fn concatenation_result_is_interned_and_equals_the_same_literal() {
    assert_eq!(
        run(r#"var a = "he"; var b = "llo"; print a + b == "hello";"#).unwrap(),
        "true\n"
    );
}

#[test]
fn while_loop_runs_to_completion() {
    assert_eq!(
        run("var n = 0; while (n < 4) { print n; n = n + 1; }").unwrap(),
        "0\n1\n2\n3\n"
    );
}

#[test]
fn for_loop_with_all_three_clauses() {
    assert_eq!(
        run("for (var i = 10; i > 7; i = i - 1) print i;").unwrap(),
        "10\n9\n8\n"
    );
}

#[test]
fn block_scoping_restores_outer_binding_on_exit() {
    assert_eq!(
        run("var x = \"outer\"; { var x = \"inner\"; print x; } print x;").unwrap(),
        "inner\nouter\n"
    );
}

#[test]
fn reading_an_undefined_global_is_a_runtime_error() {
    let err = run("print nope;").unwrap_err();
    assert!(matches!(err, InterpretError::Runtime(_)));
}

#[test]
fn negating_a_string_is_a_type_mismatch_runtime_error() {
    let err = run(r#"print -"nope";"#).unwrap_err();
    assert!(matches!(err, InterpretError::Runtime(_)));
}

#[test]
fn redefining_a_global_at_top_level_is_allowed() {
    assert_eq!(run("var x = 1; var x = x + 1; print x;").unwrap(), "2\n");
}

#[test]
fn duplicate_local_declaration_in_one_scope_is_a_compile_error() {
    let err = run("{ var x = 1; var x = 2; }").unwrap_err();
    assert!(matches!(err, InterpretError::Compile(_)));
}

#[test]
fn self_referencing_local_initializer_is_a_compile_error() {
    let err = run("{ var x = x; }").unwrap_err();
    assert!(matches!(err, InterpretError::Compile(_)));
}

#[test]
fn if_without_else_falls_through_when_condition_is_false() {
    assert_eq!(run("if (false) print \"a\"; print \"b\";").unwrap(), "b\n");
}

#[test]
fn nested_if_in_loop_body() {
    assert_eq!(
        run("for (var i = 0; i < 4; i = i + 1) { if (i == 2) print \"two\"; else print i; }")
            .unwrap(),
        "0\n1\ntwo\n3\n"
    );
}

#[test]
fn logical_and_or_short_circuit_and_yield_operand_values() {
    assert_eq!(run("print nil and 1;").unwrap(), "nil\n");
    assert_eq!(run("print 1 or 2;").unwrap(), "1\n");
    assert_eq!(run("print false or \"fallback\";").unwrap(), "fallback\n");
}

#[test]
fn a_vm_persists_globals_across_multiple_interpret_calls() {
    let mut vm = Vm::new();
    let mut out = Vec::new();
    vm.interpret("var counter = 0;", &mut out).unwrap();
    vm.interpret("counter = counter + 1;", &mut out).unwrap();
    vm.interpret("print counter;", &mut out).unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), "1\n");
}
