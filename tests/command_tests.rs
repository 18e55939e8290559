// Per-command contract tests for the built-in library

use brine::{FlowChange, Interp};

fn eval_ok(src: &str) -> String {
    let mut interp = Interp::new();
    let outcome = interp.eval(src);
    assert_eq!(outcome, Ok(()), "script failed: {}", interp.result());
    interp.result().to_string()
}

fn eval_err(src: &str) -> String {
    let mut interp = Interp::new();
    let outcome = interp.eval(src);
    assert_eq!(outcome, Err(FlowChange::Error), "expected an error");
    interp.result().to_string()
}

// === set / unset ===

#[test]
fn test_set_read_and_write() {
    assert_eq!(eval_ok("set a hello; set a"), "hello");
    assert_eq!(eval_ok("set a 1; set a 2; set a"), "2");
    assert_eq!(eval_err("set missing"), "no such variable 'missing'");
}

#[test]
fn test_set_arity() {
    assert_eq!(
        eval_err("set a b c"),
        "wrong number of arguments (expected 3): set a b c"
    );
}

#[test]
fn test_unset() {
    assert_eq!(eval_err("set a 1; unset a; set a"), "no such variable 'a'");
    assert_eq!(eval_err("unset nothing"), "no such variable 'nothing'");
}

// === math ===

#[test]
fn test_comparisons_produce_flags() {
    assert_eq!(eval_ok("> 2 1"), "1");
    assert_eq!(eval_ok(">= 2 2"), "1");
    assert_eq!(eval_ok("< 2 1"), "0");
    assert_eq!(eval_ok("<= 1 2"), "1");
    assert_eq!(eval_ok("== 3 3"), "1");
    assert_eq!(eval_ok("!= 3 3"), "0");
}

#[test]
fn test_bitwise_operators() {
    assert_eq!(eval_ok("& 12 10"), "8");
    assert_eq!(eval_ok("| 12 10"), "14");
    assert_eq!(eval_ok("^ 12 10"), "6");
    assert_eq!(eval_ok("<< 1 4"), "16");
    assert_eq!(eval_ok(">> -16 2"), "-4");
}

#[test]
fn test_shift_out_of_range() {
    assert_eq!(eval_err("<< 1 64"), "shift out of range");
    assert_eq!(eval_err(">> 1 -1"), "shift out of range");
}

#[test]
fn test_min_max_pow_log() {
    assert_eq!(eval_ok("min 3 7"), "3");
    assert_eq!(eval_ok("max 3 7"), "7");
    assert_eq!(eval_ok("pow 2 10"), "1024");
    assert_eq!(eval_ok("pow 5 0"), "1");
    assert_eq!(eval_ok("log 8 2"), "3");
    assert_eq!(eval_ok("log 100 10"), "2");
    assert_eq!(eval_ok("log 1 2"), "0");
}

#[test]
fn test_math_domain_errors() {
    assert_eq!(eval_err("/ 1 0"), "division by zero");
    assert_eq!(eval_err("% 1 0"), "division by zero");
    assert_eq!(eval_err("pow 2 -1"), "negative exponent");
    assert_eq!(eval_err("log 0 2"), "log domain error");
    assert_eq!(eval_err("log 8 1"), "log domain error");
}

#[test]
fn test_unary_operators() {
    assert_eq!(eval_ok("! 0"), "1");
    assert_eq!(eval_ok("! 5"), "0");
    assert_eq!(eval_ok("~ 0"), "-1");
    assert_eq!(eval_ok("abs -9"), "9");
    assert_eq!(eval_ok("abs 9"), "9");
    assert_eq!(eval_ok("bool 7"), "1");
    assert_eq!(eval_ok("bool 0"), "0");
}

#[test]
fn test_strict_numeric_conversion() {
    assert_eq!(eval_err("+ 2 2x"), "NaN: \"2x\"");
    assert_eq!(eval_err("+ {} 1"), "NaN: \"\"");
    assert_eq!(eval_ok("+ +2 -3"), "-1");
}

#[test]
fn test_math_arity_includes_words() {
    assert_eq!(
        eval_err("+ 1"),
        "wrong number of arguments (expected 3): + 1"
    );
}

// === string ===

#[test]
fn test_string_length_and_case() {
    assert_eq!(eval_ok("string length hello"), "5");
    assert_eq!(eval_ok("string length {}"), "0");
    assert_eq!(eval_ok("string toupper mIx3d"), "MIX3D");
    assert_eq!(eval_ok("string tolower mIx3d"), "mix3d");
}

#[test]
fn test_string_trim_family() {
    assert_eq!(eval_ok("string trim {  padded  }"), "padded");
    assert_eq!(eval_ok("string trimleft {  padded  }"), "padded  ");
    assert_eq!(eval_ok("string trimright {  padded  }"), "  padded");
    assert_eq!(eval_ok("string trim xxyaxx xy"), "a");
}

#[test]
fn test_string_reverse() {
    assert_eq!(eval_ok("string reverse abc"), "cba");
    assert_eq!(eval_ok("string reverse {}"), "");
    assert_eq!(eval_ok("string reverse [string reverse abcdef]"), "abcdef");
}

#[test]
fn test_string_index_clamps() {
    assert_eq!(eval_ok("string index abcde 0"), "a");
    assert_eq!(eval_ok("string index abcde 4"), "e");
    assert_eq!(eval_ok("string index abcde 99"), "e");
    assert_eq!(eval_ok("string index abcde -1"), "e");
    assert_eq!(eval_ok("string index abcde -2"), "d");
    assert_eq!(eval_ok("string index abcde -99"), "a");
    assert_eq!(eval_ok("string index {} 0"), "");
}

#[test]
fn test_string_match_glob() {
    assert_eq!(eval_ok("string match * anything"), "1");
    assert_eq!(eval_ok("string match a?c abc"), "1");
    assert_eq!(eval_ok("string match a?c ac"), "0");
    assert_eq!(eval_ok("string match %?x ?x"), "1");
    assert_eq!(eval_ok("string match %?x ax"), "0");
}

#[test]
fn test_string_comparisons() {
    assert_eq!(eval_ok("string equal abc abc"), "1");
    assert_eq!(eval_ok("string equal abc abd"), "0");
    assert_eq!(eval_ok("string compare abc abd"), "-1");
    assert_eq!(eval_ok("string compare abd abc"), "1");
    assert_eq!(eval_ok("string compare abc abc"), "0");
    assert_eq!(eval_ok("string compare-no-case ABC abc"), "0");
    assert_eq!(eval_ok("string compare-no-case ABC abd"), "-1");
}

#[test]
fn test_string_repeat() {
    assert_eq!(eval_ok("string repeat ab 3"), "ababab");
    assert_eq!(eval_ok("string repeat ab 0"), "");
    assert_eq!(eval_ok("string repeat ab -2"), "");
}

#[test]
fn test_string_first() {
    assert_eq!(eval_ok("string first ll hello"), "2");
    assert_eq!(eval_ok("string first zz hello"), "-1");
    assert_eq!(eval_ok("string first l hello 3"), "3");
    assert_eq!(eval_ok("string first l hello 4"), "-1");
}

#[test]
fn test_string_range() {
    assert_eq!(eval_ok("string range abcdef 1 3"), "bcd");
    assert_eq!(eval_ok("string range abcdef -5 2"), "abc");
    assert_eq!(eval_ok("string range abcdef 4 99"), "ef");
    assert_eq!(eval_ok("string range abcdef 3 1"), "");
}

#[test]
fn test_string_ordinal_and_char() {
    assert_eq!(eval_ok("string ordinal A"), "65");
    assert_eq!(eval_ok("string ordinal {}"), "0");
    assert_eq!(eval_ok("string char 65"), "A");
    assert_eq!(eval_ok("string char [string ordinal Q]"), "Q");
    assert_eq!(eval_err("string char -1"), "invalid character code '-1'");
}

#[test]
fn test_string_base_conversion() {
    assert_eq!(eval_ok("string dec2hex 255"), "ff");
    assert_eq!(eval_ok("string dec2hex 0"), "0");
    assert_eq!(eval_ok("string hex2dec ff"), "255");
    assert_eq!(eval_ok("string hex2dec -A"), "-10");
    assert_eq!(eval_err("string hex2dec xyz"), "NaN: \"xyz\"");
    assert_eq!(eval_ok("string hex2dec [string dec2hex 48879]"), "48879");
}

#[test]
fn test_string_hash_is_djb2() {
    assert_eq!(eval_ok("string hash {}"), "5381");
    // 5381 * 33 + 'a'
    assert_eq!(eval_ok("string hash a"), "177670");
}

#[test]
fn test_string_is_classes() {
    assert_eq!(eval_ok("string is digit 123"), "1");
    assert_eq!(eval_ok("string is digit 12a"), "0");
    assert_eq!(eval_ok("string is alpha abc"), "1");
    assert_eq!(eval_ok("string is alnum a1"), "1");
    assert_eq!(eval_ok("string is upper ABC"), "1");
    assert_eq!(eval_ok("string is lower abc"), "1");
    assert_eq!(eval_ok("string is xdigit 1aF"), "1");
    assert_eq!(eval_ok("string is space { \t}"), "1");
    assert_eq!(eval_ok("string is wordchar a_1"), "1");
    assert_eq!(eval_ok("string is ascii abc"), "1");
    assert_eq!(eval_ok("string is true yes"), "1");
    assert_eq!(eval_ok("string is false OFF"), "1");
    assert_eq!(eval_ok("string is boolean on"), "1");
    assert_eq!(eval_ok("string is boolean maybe"), "0");
    assert_eq!(eval_ok("string is integer -42"), "1");
    assert_eq!(eval_ok("string is integer -4x"), "0");
}

#[test]
fn test_string_unknown_subcommand() {
    assert_eq!(
        eval_err("string frobnicate x"),
        "string: unknown subcommand 'frobnicate'"
    );
}

// === lists ===

#[test]
fn test_lindex() {
    assert_eq!(eval_ok("lindex {a b c} 0"), "a");
    assert_eq!(eval_ok("lindex {a b c} 2"), "c");
    assert_eq!(eval_ok("lindex {a b c} 3"), "");
    assert_eq!(eval_ok("lindex {a b c} -1"), "");
    assert_eq!(eval_ok("lindex {a {b c} d} 1"), "b c");
}

#[test]
fn test_llength() {
    assert_eq!(eval_ok("llength {a b c}"), "3");
    assert_eq!(eval_ok("llength {}"), "0");
    assert_eq!(eval_ok("llength {single}"), "1");
    assert_eq!(eval_ok("llength {a {b c} d}"), "3");
}

#[test]
fn test_llength_lindex_agree_on_last_element() {
    assert_eq!(eval_ok("lindex {a b c} [- [llength {a b c}] 1]"), "c");
}

#[test]
fn test_concat_and_join_args() {
    assert_eq!(eval_ok("concat a b c"), "a b c");
    assert_eq!(eval_ok("concat onlyword"), "onlyword");
    assert_eq!(eval_ok("concat"), "");
    assert_eq!(eval_ok("join-args , a b c"), "a,b,c");
    assert_eq!(eval_ok("join-args {} a b c"), "abc");
    assert_eq!(eval_ok("join-args ,"), "");
}

// === info ===

#[test]
fn test_info_level_and_width() {
    assert_eq!(eval_ok("info level"), "0");
    assert_eq!(eval_ok("proc f {} {info level}; f"), "1");
    assert_eq!(eval_ok("proc f {} {proc g {} {info level}; g}; f"), "2");
    assert_eq!(eval_ok("info width"), "64");
}

#[test]
fn test_info_limits() {
    assert_eq!(eval_ok("info limits recursion"), "128");
    assert_eq!(eval_ok("info limits args"), "128");
    assert_eq!(eval_ok("info limits string"), "1048576");
}

#[test]
fn test_info_features() {
    assert_eq!(eval_ok("info features string"), "1");
    assert_eq!(eval_ok("info features maths"), "1");
    assert_eq!(eval_ok("info features debugging"), "0");
    assert_eq!(eval_ok("info features allocator"), "0");
    assert_eq!(
        eval_err("info features teleport"),
        "info features: unknown subcommand 'teleport'"
    );
}

#[test]
fn test_info_command_index_round_trip() {
    let mut interp = Interp::new();
    interp.eval("info command set").unwrap();
    let slot = interp.result().to_string();
    interp.eval(&format!("info command name {}", slot)).unwrap();
    assert_eq!(interp.result(), "set");
}

#[test]
fn test_info_command_count_tracks_registration() {
    let mut interp = Interp::new();
    interp.eval("info command").unwrap();
    let before: i64 = interp.result().parse().unwrap();
    interp.eval("proc extra {} {concat x}").unwrap();
    interp.eval("info command").unwrap();
    let after: i64 = interp.result().parse().unwrap();
    assert_eq!(after, before + 1);
}

#[test]
fn test_info_command_fields_for_proc_and_builtin() {
    let mut interp = Interp::new();
    interp.eval("proc add2 {a b} {+ $a $b}").unwrap();
    interp.eval("info command add2").unwrap();
    let slot = interp.result().to_string();
    interp.eval(&format!("info command args {}", slot)).unwrap();
    assert_eq!(interp.result(), "a b");
    interp.eval(&format!("info command body {}", slot)).unwrap();
    assert_eq!(interp.result(), "+ $a $b");

    interp.eval("info command set").unwrap();
    let slot = interp.result().to_string();
    interp.eval(&format!("info command args {}", slot)).unwrap();
    assert_eq!(interp.result(), "built-in");
    interp.eval(&format!("info command body {}", slot)).unwrap();
    assert_eq!(interp.result(), "built-in");
}

#[test]
fn test_info_line_tracks_position() {
    assert_eq!(eval_ok("concat x\ninfo line"), "2");
}

#[test]
fn test_info_unknown_subcommand() {
    assert_eq!(eval_err("info nonsense"), "info: unknown subcommand 'nonsense'");
}

// === return codes ===

#[test]
fn test_return_code_forms() {
    let mut interp = Interp::new();
    assert_eq!(interp.eval("return"), Err(FlowChange::Return));
    assert_eq!(interp.result(), "");
    assert_eq!(interp.eval("return value"), Err(FlowChange::Return));
    assert_eq!(interp.result(), "value");
    assert_eq!(interp.eval("return v 2"), Err(FlowChange::Break));
    assert_eq!(interp.eval("return v 3"), Err(FlowChange::Continue));
    assert_eq!(interp.eval("return v 0"), Ok(()));
    assert_eq!(interp.result(), "v");
}

#[test]
fn test_return_rejects_unknown_code() {
    assert_eq!(eval_err("return v 9"), "invalid return code '9'");
    assert_eq!(eval_err("return v x"), "NaN: \"x\"");
}

#[test]
fn test_break_continue_outside_loop_reach_embedder() {
    let mut interp = Interp::new();
    assert_eq!(interp.eval("break"), Err(FlowChange::Break));
    assert_eq!(interp.eval("continue"), Err(FlowChange::Continue));
}
