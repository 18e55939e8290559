//! The `string` command and shared string utilities
//!
//! Also home to the escape decoder used by the evaluator and the glob
//! matcher. Indexing operations (`index`, `range`, `first`, `reverse`,
//! `length`) work at char granularity: for ASCII input — the language's
//! native habitat — that is exactly byte granularity, and it keeps every
//! result a well-formed string.

use crate::interpreter::engine::Interp;
use crate::interpreter::errors::{EvalResult, RuntimeError};
use crate::interpreter::math;

/// Default cut-set for the trim family.
const ASCII_WHITESPACE: &str = " \t\n\r\x0b\x0c";

/// Register the `string` sub-dispatcher.
pub(crate) fn register_string(interp: &mut Interp) {
    interp.define_native("string", |i, argv| i.builtin_string(argv));
}

/// Decode the escape sequences the lexer left in an `Esc` token: `\\`,
/// `\n`, `\t`, `\r`, `\"`, `\[`, `\]`, `\e`, and `\x` with one or two hex
/// nibbles. Anything else (including a trailing lone backslash) is an
/// error. Output never grows.
pub(crate) fn unescape(s: &str) -> Result<String, RuntimeError> {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('"') => out.push('"'),
            Some('[') => out.push('['),
            Some(']') => out.push(']'),
            Some('e') => out.push('\u{1b}'),
            Some('x') => {
                let mut value: u32 = 0;
                let mut digits = 0;
                while digits < 2 {
                    let Some(d) = chars.peek().and_then(|h| h.to_digit(16)) else {
                        break;
                    };
                    chars.next();
                    value = value * 16 + d;
                    digits += 1;
                }
                if digits == 0 {
                    return Err(RuntimeError::InvalidEscape);
                }
                out.push(char::from(value as u8));
            }
            _ => return Err(RuntimeError::InvalidEscape),
        }
    }
    Ok(out)
}

/// Glob match: `*` any run, `?` any single char, `%` escapes the next
/// pattern byte (a trailing `%` matches itself).
pub(crate) fn glob_match(pattern: &[u8], text: &[u8]) -> bool {
    match pattern.split_first() {
        None => text.is_empty(),
        Some((&b'*', rest)) => {
            glob_match(rest, text) || (!text.is_empty() && glob_match(pattern, &text[1..]))
        }
        Some((&b'?', rest)) => !text.is_empty() && glob_match(rest, &text[1..]),
        Some((&b'%', rest)) => match rest.split_first() {
            Some((&literal, tail)) => {
                text.first() == Some(&literal) && glob_match(tail, &text[1..])
            }
            None => text == b"%",
        },
        Some((&literal, rest)) => text.first() == Some(&literal) && glob_match(rest, &text[1..]),
    }
}

/// The DJB2 string hash, exposed as `string hash`.
pub(crate) fn djb2(s: &str) -> u32 {
    let mut hash: u32 = 5381;
    for &b in s.as_bytes() {
        hash = hash.wrapping_mul(33).wrapping_add(u32::from(b));
    }
    hash
}

fn trim_with(s: &str, cut: &str, left: bool, right: bool) -> String {
    let matcher = |c: char| cut.contains(c);
    match (left, right) {
        (true, true) => s.trim_matches(matcher).to_string(),
        (true, false) => s.trim_start_matches(matcher).to_string(),
        (false, true) => s.trim_end_matches(matcher).to_string(),
        (false, false) => s.to_string(),
    }
}

/// `string is` classes over the chars of a string. Class checks are
/// vacuously true for the empty string; the value classes
/// (`true`/`false`/`boolean`/`integer`) test the whole word.
fn is_class(class: &str, s: &str) -> Option<bool> {
    let all = |pred: fn(char) -> bool| s.chars().all(pred);
    let flag = match class {
        "alnum" => all(|c| c.is_ascii_alphanumeric()),
        "alpha" => all(|c| c.is_ascii_alphabetic()),
        "digit" => all(|c| c.is_ascii_digit()),
        "graph" => all(|c| c.is_ascii_graphic()),
        "lower" => all(|c| c.is_ascii_lowercase()),
        "print" => all(|c| c.is_ascii_graphic() || c == ' '),
        "punct" => all(|c| c.is_ascii_punctuation()),
        "space" => all(|c| c.is_ascii_whitespace()),
        "upper" => all(|c| c.is_ascii_uppercase()),
        "xdigit" => all(|c| c.is_ascii_hexdigit()),
        "ascii" => all(|c| c.is_ascii()),
        "control" => all(|c| c.is_ascii_control()),
        "wordchar" => all(|c| c.is_ascii_alphanumeric() || c == '_'),
        "false" => matches!(
            s.to_ascii_lowercase().as_str(),
            "0" | "false" | "no" | "off"
        ),
        "true" => matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"),
        "boolean" => matches!(
            s.to_ascii_lowercase().as_str(),
            "0" | "false" | "no" | "off" | "1" | "true" | "yes" | "on"
        ),
        "integer" => math::parse_integer(s).is_ok(),
        _ => return None,
    };
    Some(flag)
}

impl Interp {
    /// The `string` sub-dispatcher.
    pub(crate) fn builtin_string(&mut self, argv: &[String]) -> EvalResult {
        if argv.len() < 3 {
            return self.arity_error(3, argv);
        }
        match argv[1].as_str() {
            "length" => {
                if argv.len() != 3 {
                    return self.arity_error(3, argv);
                }
                self.set_result_integer(argv[2].chars().count() as i64);
                Ok(())
            }
            "toupper" => {
                if argv.len() != 3 {
                    return self.arity_error(3, argv);
                }
                self.set_result(argv[2].to_ascii_uppercase());
                Ok(())
            }
            "tolower" => {
                if argv.len() != 3 {
                    return self.arity_error(3, argv);
                }
                self.set_result(argv[2].to_ascii_lowercase());
                Ok(())
            }
            "trim" | "trimleft" | "trimright" => {
                if argv.len() != 3 && argv.len() != 4 {
                    return self.arity_error(4, argv);
                }
                let cut = argv.get(3).map(String::as_str).unwrap_or(ASCII_WHITESPACE);
                let (left, right) = match argv[1].as_str() {
                    "trimleft" => (true, false),
                    "trimright" => (false, true),
                    _ => (true, true),
                };
                let trimmed = trim_with(&argv[2], cut, left, right);
                self.set_result(trimmed);
                Ok(())
            }
            "reverse" => {
                if argv.len() != 3 {
                    return self.arity_error(3, argv);
                }
                self.set_result(argv[2].chars().rev().collect::<String>());
                Ok(())
            }
            "index" => {
                if argv.len() != 4 {
                    return self.arity_error(4, argv);
                }
                let n = match math::parse_integer(&argv[3]) {
                    Ok(n) => n,
                    Err(e) => return self.fail(e),
                };
                let chars: Vec<char> = argv[2].chars().collect();
                if chars.is_empty() {
                    self.set_result("");
                    return Ok(());
                }
                let len = chars.len() as i64;
                let raw = if n < 0 { len + n } else { n };
                let index = raw.clamp(0, len - 1);
                self.set_result(chars[index as usize].to_string());
                Ok(())
            }
            "match" => {
                if argv.len() != 4 {
                    return self.arity_error(4, argv);
                }
                let matched = glob_match(argv[2].as_bytes(), argv[3].as_bytes());
                self.set_result_integer(matched as i64);
                Ok(())
            }
            "equal" => {
                if argv.len() != 4 {
                    return self.arity_error(4, argv);
                }
                self.set_result_integer((argv[2] == argv[3]) as i64);
                Ok(())
            }
            "compare" => {
                if argv.len() != 4 {
                    return self.arity_error(4, argv);
                }
                self.set_result_integer(ordering_value(argv[2].cmp(&argv[3])));
                Ok(())
            }
            "compare-no-case" => {
                if argv.len() != 4 {
                    return self.arity_error(4, argv);
                }
                let a = argv[2].to_ascii_lowercase();
                let b = argv[3].to_ascii_lowercase();
                self.set_result_integer(ordering_value(a.cmp(&b)));
                Ok(())
            }
            "repeat" => {
                if argv.len() != 4 {
                    return self.arity_error(4, argv);
                }
                let n = match math::parse_integer(&argv[3]) {
                    Ok(n) => n,
                    Err(e) => return self.fail(e),
                };
                let count = usize::try_from(n).unwrap_or(0);
                self.set_result(argv[2].repeat(count));
                Ok(())
            }
            "first" => {
                if argv.len() != 4 && argv.len() != 5 {
                    return self.arity_error(5, argv);
                }
                let start = match argv.get(4) {
                    Some(word) => match math::parse_integer(word) {
                        Ok(n) => usize::try_from(n).unwrap_or(0),
                        Err(e) => return self.fail(e),
                    },
                    None => 0,
                };
                let offset = find_substring(&argv[3], &argv[2], start);
                self.set_result_integer(offset.map(|o| o as i64).unwrap_or(-1));
                Ok(())
            }
            "range" => {
                if argv.len() != 5 {
                    return self.arity_error(5, argv);
                }
                let first = match math::parse_integer(&argv[3]) {
                    Ok(n) => n,
                    Err(e) => return self.fail(e),
                };
                let last = match math::parse_integer(&argv[4]) {
                    Ok(n) => n,
                    Err(e) => return self.fail(e),
                };
                let chars: Vec<char> = argv[2].chars().collect();
                let len = chars.len() as i64;
                let first = first.max(0);
                let last = last.min(len - 1);
                let text: String = if len == 0 || first > last {
                    String::new()
                } else {
                    chars[first as usize..=last as usize].iter().collect()
                };
                self.set_result(text);
                Ok(())
            }
            "ordinal" => {
                if argv.len() != 3 {
                    return self.arity_error(3, argv);
                }
                let code = argv[2].chars().next().map(u32::from).unwrap_or(0);
                self.set_result_integer(i64::from(code));
                Ok(())
            }
            "char" => {
                if argv.len() != 3 {
                    return self.arity_error(3, argv);
                }
                let code = match math::parse_integer(&argv[2]) {
                    Ok(n) => n,
                    Err(e) => return self.fail(e),
                };
                let Some(c) = u32::try_from(code).ok().and_then(char::from_u32) else {
                    return self.fail(RuntimeError::InvalidCharCode { code });
                };
                self.set_result(c.to_string());
                Ok(())
            }
            "dec2hex" => {
                if argv.len() != 3 {
                    return self.arity_error(3, argv);
                }
                let n = match math::parse_integer(&argv[2]) {
                    Ok(n) => n,
                    Err(e) => return self.fail(e),
                };
                // Negative values print in two's complement, like C %lx.
                self.set_result(format!("{:x}", n));
                Ok(())
            }
            "hex2dec" => {
                if argv.len() != 3 {
                    return self.arity_error(3, argv);
                }
                let n = match math::parse_radix(&argv[2], 16) {
                    Ok(n) => n,
                    Err(e) => return self.fail(e),
                };
                self.set_result_integer(n);
                Ok(())
            }
            "hash" => {
                if argv.len() != 3 {
                    return self.arity_error(3, argv);
                }
                self.set_result_integer(i64::from(djb2(&argv[2])));
                Ok(())
            }
            "is" => {
                if argv.len() != 4 {
                    return self.arity_error(4, argv);
                }
                match is_class(&argv[2], &argv[3]) {
                    Some(flag) => {
                        self.set_result_integer(flag as i64);
                        Ok(())
                    }
                    None => {
                        let name = argv[2].clone();
                        self.fail(RuntimeError::UnknownSubcommand {
                            command: "string is".to_string(),
                            name,
                        })
                    }
                }
            }
            other => {
                let name = other.to_string();
                self.fail(RuntimeError::UnknownSubcommand {
                    command: "string".to_string(),
                    name,
                })
            }
        }
    }
}

fn ordering_value(ordering: std::cmp::Ordering) -> i64 {
    match ordering {
        std::cmp::Ordering::Less => -1,
        std::cmp::Ordering::Equal => 0,
        std::cmp::Ordering::Greater => 1,
    }
}

/// Char-offset substring search from `start`. An empty needle matches at
/// `start` (clamped to the haystack length).
fn find_substring(hay: &str, needle: &str, start: usize) -> Option<usize> {
    let hay: Vec<char> = hay.chars().collect();
    let needle: Vec<char> = needle.chars().collect();
    if needle.is_empty() {
        return Some(start.min(hay.len()));
    }
    if start + needle.len() > hay.len() {
        return None;
    }
    (start..=hay.len() - needle.len()).find(|&i| hay[i..i + needle.len()] == needle[..])
}
