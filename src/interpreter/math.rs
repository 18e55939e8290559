//! Integer math commands and strict numeric conversion
//!
//! Arithmetic is 64-bit two's complement: overflow wraps, like the
//! fixed-width integers the language models. Domain violations (division by
//! zero, negative exponents, out-of-range shifts, log outside its domain)
//! are errors rather than wraps.

use crate::interpreter::engine::Interp;
use crate::interpreter::errors::{EvalResult, RuntimeError};

/// Binary operator command names.
const BINARY: &[&str] = &[
    "+", "-", "*", "/", "%", ">", ">=", "<", "<=", "==", "!=", "<<", ">>", "&", "|", "^", "min",
    "max", "pow", "log",
];

/// Unary operator command names.
const UNARY: &[&str] = &["!", "~", "abs", "bool"];

/// Register every operator as its own command; each dispatches on the name
/// it was invoked under.
pub(crate) fn register_math(interp: &mut Interp) {
    for &name in BINARY {
        interp.define_native(name, |i, argv| i.builtin_math_binary(argv));
    }
    for &name in UNARY {
        interp.define_native(name, |i, argv| i.builtin_math_unary(argv));
    }
}

/// Strict base-10 integer conversion: optional sign, at least one digit,
/// nothing else. Anything malformed is a `NaN` error.
pub(crate) fn parse_integer(s: &str) -> Result<i64, RuntimeError> {
    parse_radix(s, 10)
}

/// Strict integer conversion in an arbitrary base. Accumulation wraps, so
/// 16-digit hex values round-trip through the two's complement form.
pub(crate) fn parse_radix(s: &str, radix: u32) -> Result<i64, RuntimeError> {
    let nan = || RuntimeError::NotANumber {
        value: s.to_string(),
    };
    let (negative, digits) = match s.as_bytes().first() {
        Some(&b'+') => (false, &s[1..]),
        Some(&b'-') => (true, &s[1..]),
        _ => (false, s),
    };
    if digits.is_empty() {
        return Err(nan());
    }
    let mut value: i64 = 0;
    for c in digits.chars() {
        let digit = c.to_digit(radix).ok_or_else(nan)?;
        value = value
            .wrapping_mul(i64::from(radix))
            .wrapping_add(i64::from(digit));
    }
    Ok(if negative { value.wrapping_neg() } else { value })
}

/// Wrapping integer exponentiation by squaring.
fn ipow(mut base: i64, mut exp: u64) -> i64 {
    let mut acc: i64 = 1;
    while exp > 0 {
        if exp & 1 == 1 {
            acc = acc.wrapping_mul(base);
        }
        base = base.wrapping_mul(base);
        exp >>= 1;
    }
    acc
}

/// Floor of log base `base` of `a`. Caller guarantees `a > 0`, `base >= 2`.
fn ilog(a: i64, base: i64) -> i64 {
    let mut value = a;
    let mut count = 0;
    while value >= base {
        value /= base;
        count += 1;
    }
    count
}

impl Interp {
    pub(crate) fn builtin_math_binary(&mut self, argv: &[String]) -> EvalResult {
        if argv.len() != 3 {
            return self.arity_error(3, argv);
        }
        let a = match parse_integer(&argv[1]) {
            Ok(n) => n,
            Err(e) => return self.fail(e),
        };
        let b = match parse_integer(&argv[2]) {
            Ok(n) => n,
            Err(e) => return self.fail(e),
        };
        let value = match argv[0].as_str() {
            "+" => a.wrapping_add(b),
            "-" => a.wrapping_sub(b),
            "*" => a.wrapping_mul(b),
            "/" => {
                if b == 0 {
                    return self.fail(RuntimeError::DivisionByZero);
                }
                a.wrapping_div(b)
            }
            "%" => {
                if b == 0 {
                    return self.fail(RuntimeError::DivisionByZero);
                }
                a.wrapping_rem(b)
            }
            ">" => i64::from(a > b),
            ">=" => i64::from(a >= b),
            "<" => i64::from(a < b),
            "<=" => i64::from(a <= b),
            "==" => i64::from(a == b),
            "!=" => i64::from(a != b),
            "<<" => {
                if !(0..64).contains(&b) {
                    return self.fail(RuntimeError::ShiftRange);
                }
                a.wrapping_shl(b as u32)
            }
            ">>" => {
                if !(0..64).contains(&b) {
                    return self.fail(RuntimeError::ShiftRange);
                }
                a.wrapping_shr(b as u32)
            }
            "&" => a & b,
            "|" => a | b,
            "^" => a ^ b,
            "min" => a.min(b),
            "max" => a.max(b),
            "pow" => {
                if b < 0 {
                    return self.fail(RuntimeError::NegativeExponent);
                }
                ipow(a, b as u64)
            }
            "log" => {
                if a <= 0 || b < 2 {
                    return self.fail(RuntimeError::LogDomain);
                }
                ilog(a, b)
            }
            // Reachable only if an operator was renamed; the copied record
            // no longer knows which operator it was.
            _ => {
                return self.fail(RuntimeError::UnknownCommand {
                    name: argv[0].clone(),
                })
            }
        };
        self.set_result_integer(value);
        Ok(())
    }

    pub(crate) fn builtin_math_unary(&mut self, argv: &[String]) -> EvalResult {
        if argv.len() != 2 {
            return self.arity_error(2, argv);
        }
        let a = match parse_integer(&argv[1]) {
            Ok(n) => n,
            Err(e) => return self.fail(e),
        };
        let value = match argv[0].as_str() {
            "!" => i64::from(a == 0),
            "~" => !a,
            "abs" => a.wrapping_abs(),
            "bool" => i64::from(a != 0),
            _ => {
                return self.fail(RuntimeError::UnknownCommand {
                    name: argv[0].clone(),
                })
            }
        };
        self.set_result_integer(value);
        Ok(())
    }
}
