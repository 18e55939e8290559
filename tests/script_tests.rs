// End-to-end scripting tests for the interpreter

use brine::{FlowChange, Interp};

/// Evaluate one script in a fresh interpreter and return the result string.
fn eval_ok(src: &str) -> String {
    let mut interp = Interp::new();
    let outcome = interp.eval(src);
    assert_eq!(outcome, Ok(()), "script failed: {}", interp.result());
    interp.result().to_string()
}

/// Evaluate a script expected to fail; returns the diagnostic.
fn eval_err(src: &str) -> String {
    let mut interp = Interp::new();
    let outcome = interp.eval(src);
    assert_eq!(outcome, Err(FlowChange::Error), "expected an error");
    interp.result().to_string()
}

#[test]
fn test_basic_arithmetic() {
    assert_eq!(eval_ok("+  2 2"), "4");
    assert_eq!(eval_ok("* -2 9"), "-18");
    assert_eq!(eval_ok("- 7 11"), "-4");
    assert_eq!(eval_ok("/ 9 2"), "4");
    assert_eq!(eval_ok("% 9 2"), "1");
}

#[test]
fn test_join_command() {
    assert_eq!(eval_ok("join {a b c} ,"), "a,b,c");
}

#[test]
fn test_return_with_error_code() {
    let mut interp = Interp::new();
    assert_eq!(interp.eval("return fail -1"), Err(FlowChange::Error));
    assert_eq!(interp.result(), "fail");
}

#[test]
fn test_strict_numeric_var_access() {
    let mut interp = Interp::new();
    interp.eval("set a 54; set b 3; set c -4x").unwrap();
    assert_eq!(interp.var_integer("a"), Ok(54));
    assert_eq!(interp.var_integer("b"), Ok(3));
    assert!(interp.var_integer("c").is_err());
    // The variable itself holds the literal text.
    assert_eq!(interp.var("c"), Some("-4x"));
}

#[test]
fn test_procedure_call() {
    assert_eq!(eval_ok("proc f {x} { + $x 1 }; f 41"), "42");
}

#[test]
fn test_while_loop() {
    assert_eq!(eval_ok("set i 0; while {< $i 3} {set i [+ $i 1]}; set i"), "3");
}

#[test]
fn test_catch_of_unknown_command() {
    let mut interp = Interp::new();
    assert_eq!(interp.eval("catch {foo} r"), Ok(()));
    assert_eq!(interp.result(), "-1");
    assert_eq!(interp.var("r"), Some("-1"));
}

#[test]
fn test_catch_of_success() {
    let mut interp = Interp::new();
    interp.eval("catch {concat hi} r").unwrap();
    assert_eq!(interp.result(), "0");
    assert_eq!(interp.var("r"), Some("0"));
}

#[test]
fn test_catch_preserves_break_code() {
    let mut interp = Interp::new();
    interp.eval("catch {break} r").unwrap();
    assert_eq!(interp.var("r"), Some("2"));
    interp.eval("catch {continue} r").unwrap();
    assert_eq!(interp.var("r"), Some("3"));
    interp.eval("catch {return x} r").unwrap();
    assert_eq!(interp.var("r"), Some("1"));
}

#[test]
fn test_string_match_scenario() {
    assert_eq!(eval_ok("string match a*c abc"), "1");
    assert_eq!(eval_ok("string match a*c abd"), "0");
}

#[test]
fn test_command_substitution() {
    assert_eq!(eval_ok("+ [ * 3 3 ] [* 2 2]"), "13");
    // Substitution results stay one word even when they contain spaces.
    assert_eq!(eval_ok("string length [concat a b]"), "3");
}

#[test]
fn test_quoted_interpolation() {
    assert_eq!(eval_ok("set name world; concat \"hello $name\""), "hello world");
    assert_eq!(eval_ok("set n 4; concat \"n=[+ $n 1]\""), "n=5");
}

#[test]
fn test_word_concatenation_of_adjacent_tokens() {
    assert_eq!(eval_ok("set a 4; concat x$a!"), "x4!");
}

#[test]
fn test_escape_sequences() {
    assert_eq!(eval_ok("concat \"a\\tb\""), "a\tb");
    assert_eq!(eval_ok("concat \"bracket\\x5b\""), "bracket[");
    assert_eq!(eval_err("concat \"a\\qb\""), "invalid escape sequence");
}

#[test]
fn test_comments() {
    assert_eq!(eval_ok("# leading comment\nconcat ok"), "ok");
    // A # that is not at the start of a command is literal.
    assert_eq!(eval_ok("concat a #b"), "a #b");
}

#[test]
fn test_while_with_break_and_continue() {
    let src = "set i 0; set total 0\n\
               while {< $i 10} {\n\
                   set i [+ $i 1]\n\
                   if {== $i 3} {continue}\n\
                   if {> $i 5} {break}\n\
                   set total [+ $total $i]\n\
               }\n\
               set total";
    // 1 + 2 + 4 + 5
    assert_eq!(eval_ok(src), "12");
}

#[test]
fn test_proc_return_short_circuits() {
    assert_eq!(eval_ok("proc f {} {return early; concat late}; f"), "early");
}

#[test]
fn test_proc_arity_message() {
    assert_eq!(
        eval_err("proc f {a b} {concat $a $b}; f 1"),
        "proc 'f' called with wrong number of arguments"
    );
    assert_eq!(
        eval_err("proc g {} {concat x}; g 1 2"),
        "proc 'g' called with wrong number of arguments"
    );
}

#[test]
fn test_proc_locals_do_not_leak() {
    let mut interp = Interp::new();
    interp.eval("proc f {} {set local 1}; f").unwrap();
    assert_eq!(interp.var("local"), None);
}

#[test]
fn test_upvar_links_caller_variable() {
    let src = "proc bump {name} {upvar 1 $name x; set x [+ $x 1]}\n\
               set counter 5\n\
               bump counter\n\
               bump counter\n\
               set counter";
    assert_eq!(eval_ok(src), "7");
}

#[test]
fn test_upvar_write_through_link_on_fresh_target() {
    // upvar creates the target in the ancestor frame when it is missing.
    let src = "proc init {name} {upvar 1 $name v; set v ready}\n\
               init fresh\n\
               set fresh";
    assert_eq!(eval_ok(src), "ready");
}

#[test]
fn test_upvar_rejects_self_link() {
    assert_eq!(eval_err("upvar 0 x x"), "cannot link variable 'x' to itself");
}

#[test]
fn test_upvar_same_frame_alias() {
    assert_eq!(eval_ok("set a 1; upvar 0 a b; set b 2; set a"), "2");
}

#[test]
fn test_unset_of_link_keeps_target() {
    let src = "proc f {} {upvar 1 target t; unset t}\n\
               set target kept\n\
               f\n\
               set target";
    assert_eq!(eval_ok(src), "kept");
}

#[test]
fn test_uplevel_runs_in_caller_frame() {
    let src = "proc g {} {uplevel 1 {set z 9}}\n\
               g\n\
               set z";
    assert_eq!(eval_ok(src), "9");
}

#[test]
fn test_uplevel_absolute_level() {
    let src = "proc inner {} {uplevel #0 {set top yes}}\n\
               proc outer {} {inner}\n\
               outer\n\
               set top";
    assert_eq!(eval_ok(src), "yes");
}

#[test]
fn test_uplevel_invalid_level() {
    assert_eq!(eval_err("uplevel 5 {concat x}"), "invalid level '5'");
    assert_eq!(eval_err("uplevel #9 {concat x}"), "invalid level '#9'");
}

#[test]
fn test_eval_command() {
    assert_eq!(eval_ok("eval set q 3; set q"), "3");
    assert_eq!(eval_ok("eval {concat a b}"), "a b");
}

#[test]
fn test_nested_procs_and_recursion() {
    let src = "proc fib {n} {\n\
                   if {<= $n 1} {return $n}\n\
                   + [fib [- $n 1]] [fib [- $n 2]]\n\
               }\n\
               fib 10";
    assert_eq!(eval_ok(src), "55");
}

#[test]
fn test_runaway_recursion_is_stopped() {
    assert_eq!(eval_err("proc loop {} {loop}; loop"), "recursion limit exceeded");
}

#[test]
fn test_rename_procedure() {
    let src = "proc f {} {concat original}\n\
               rename f g\n\
               g";
    assert_eq!(eval_ok(src), "original");
    assert_eq!(eval_err("proc f {} {concat x}; rename f g; f"), "no such command 'f'");
}

#[test]
fn test_rename_to_empty_deletes() {
    assert_eq!(
        eval_err("proc f {} {concat x}; rename f \"\"; f"),
        "no such command 'f'"
    );
}

#[test]
fn test_rename_conflicts_and_missing() {
    assert_eq!(eval_err("rename nosuch other"), "no such command 'nosuch'");
    assert_eq!(
        eval_err("proc f {} {concat x}; rename f set"),
        "command 'set' already defined"
    );
}

#[test]
fn test_version_variable() {
    assert_eq!(eval_ok("set version"), "100");
}

#[test]
fn test_semicolons_and_blank_lines() {
    assert_eq!(eval_ok(";;;\n\n  ;\nconcat done"), "done");
}

#[test]
fn test_empty_program() {
    let mut interp = Interp::new();
    assert_eq!(interp.eval(""), Ok(()));
    assert_eq!(interp.result(), "");
}

#[test]
fn test_brace_group_suppresses_substitution() {
    assert_eq!(eval_ok("set a 1; concat {$a [+ 1 1]}"), "$a [+ 1 1]");
}

#[test]
fn test_interpreter_survives_errors() {
    let mut interp = Interp::new();
    assert!(interp.eval("nosuch").is_err());
    assert_eq!(interp.eval("concat still alive"), Ok(()));
    assert_eq!(interp.result(), "still alive");
}

#[test]
fn test_if_else_branches() {
    assert_eq!(eval_ok("if {== 1 1} {concat yes} else {concat no}"), "yes");
    assert_eq!(eval_ok("if {== 1 2} {concat yes} else {concat no}"), "no");
    assert_eq!(eval_ok("if 0 {concat yes}"), "");
}

#[test]
fn test_if_condition_must_be_numeric() {
    assert_eq!(eval_err("if {concat maybe} {concat yes}"), "NaN: \"maybe\"");
}
