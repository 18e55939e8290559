//! Runtime error and flow-control types for the interpreter
//!
//! Control flow travels out-of-band: every evaluation step yields
//! [`EvalResult`], where the `Err` arm is a [`FlowChange`] (error, return,
//! break, continue) and the interpreter's result string carries the value or
//! diagnostic. [`RuntimeError`] enumerates every diagnostic the core can
//! produce; it is formatted into the result by [`crate::Interp::fail`].

use std::fmt;

/// Outcome of one evaluation step or command dispatch.
///
/// `Ok(())` means the command completed and deposited its value in the
/// interpreter result. Any `Err` unwinds until something consumes it: `catch`
/// consumes everything, procedure calls consume `Return`, `while` consumes
/// `Break` and `Continue`, and whatever is left reaches the embedder.
pub type EvalResult = Result<(), FlowChange>;

/// Flow-control instructions returned by commands in place of normal
/// completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowChange {
    /// Evaluation failed; the result holds the diagnostic.
    Error,
    /// Return from the current procedure; the result holds the value.
    Return,
    /// Terminate the innermost loop.
    Break,
    /// Skip to the next iteration of the innermost loop.
    Continue,
}

impl FlowChange {
    /// The stable integer form of this code (`OK` is 0 and is represented by
    /// the `Ok` arm of [`EvalResult`]).
    pub fn code(self) -> i64 {
        match self {
            FlowChange::Error => -1,
            FlowChange::Return => 1,
            FlowChange::Break => 2,
            FlowChange::Continue => 3,
        }
    }

    /// Map a stable integer code back to an outcome. `None` for integers
    /// that name no code.
    pub fn from_code(code: i64) -> Option<EvalResult> {
        match code {
            0 => Some(Ok(())),
            -1 => Some(Err(FlowChange::Error)),
            1 => Some(Err(FlowChange::Return)),
            2 => Some(Err(FlowChange::Break)),
            3 => Some(Err(FlowChange::Continue)),
            _ => None,
        }
    }
}

/// The stable integer code for an [`EvalResult`].
pub fn result_code(result: EvalResult) -> i64 {
    match result {
        Ok(()) => 0,
        Err(flow) => flow.code(),
    }
}

/// Runtime errors that can occur during evaluation.
///
/// Each variant formats to the exact diagnostic deposited in the interpreter
/// result when the error unwinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    /// `argv[0]` named no registered command.
    UnknownCommand { name: String },

    /// A `$name` reference or variable read found nothing.
    UnknownVariable { name: String },

    /// A built-in was called with the wrong number of words.
    ArityMismatch { expected: usize, words: String },

    /// A procedure was called with the wrong number of arguments.
    ProcArity { name: String },

    /// Strict numeric conversion rejected the input.
    NotANumber { value: String },

    /// Division or modulo by zero.
    DivisionByZero,

    /// `pow` with a negative exponent.
    NegativeExponent,

    /// `log` outside its domain (a > 0, base >= 2).
    LogDomain,

    /// Shift count outside the integer width.
    ShiftRange,

    /// An escape sequence the decoder does not recognize.
    InvalidEscape,

    /// Registration or rename target already exists.
    AlreadyDefined { name: String },

    /// Nested evaluation exceeded the configured depth limit.
    RecursionLimit,

    /// A command assembled more words than the configured maximum.
    TooManyArguments,

    /// `uplevel`/`upvar` level that names no reachable frame.
    InvalidLevel { level: String },

    /// `upvar` link that would alias a variable to itself.
    SelfLink { name: String },

    /// `return` with an integer that names no return code.
    InvalidReturnCode { code: i64 },

    /// `string char` with an integer that names no character.
    InvalidCharCode { code: i64 },

    /// `string`/`info` sub-dispatch on an unrecognized key.
    UnknownSubcommand { command: String, name: String },
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeError::UnknownCommand { name } => {
                write!(f, "no such command '{}'", name)
            }
            RuntimeError::UnknownVariable { name } => {
                write!(f, "no such variable '{}'", name)
            }
            RuntimeError::ArityMismatch { expected, words } => {
                write!(
                    f,
                    "wrong number of arguments (expected {}): {}",
                    expected, words
                )
            }
            RuntimeError::ProcArity { name } => {
                write!(f, "proc '{}' called with wrong number of arguments", name)
            }
            RuntimeError::NotANumber { value } => {
                write!(f, "NaN: \"{}\"", value)
            }
            RuntimeError::DivisionByZero => write!(f, "division by zero"),
            RuntimeError::NegativeExponent => write!(f, "negative exponent"),
            RuntimeError::LogDomain => write!(f, "log domain error"),
            RuntimeError::ShiftRange => write!(f, "shift out of range"),
            RuntimeError::InvalidEscape => write!(f, "invalid escape sequence"),
            RuntimeError::AlreadyDefined { name } => {
                write!(f, "command '{}' already defined", name)
            }
            RuntimeError::RecursionLimit => write!(f, "recursion limit exceeded"),
            RuntimeError::TooManyArguments => write!(f, "too many arguments"),
            RuntimeError::InvalidLevel { level } => {
                write!(f, "invalid level '{}'", level)
            }
            RuntimeError::SelfLink { name } => {
                write!(f, "cannot link variable '{}' to itself", name)
            }
            RuntimeError::InvalidReturnCode { code } => {
                write!(f, "invalid return code '{}'", code)
            }
            RuntimeError::InvalidCharCode { code } => {
                write!(f, "invalid character code '{}'", code)
            }
            RuntimeError::UnknownSubcommand { command, name } => {
                write!(f, "{}: unknown subcommand '{}'", command, name)
            }
        }
    }
}

impl std::error::Error for RuntimeError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stable_codes_round_trip() {
        for flow in [
            FlowChange::Error,
            FlowChange::Return,
            FlowChange::Break,
            FlowChange::Continue,
        ] {
            assert_eq!(FlowChange::from_code(flow.code()), Some(Err(flow)));
        }
        assert_eq!(FlowChange::from_code(0), Some(Ok(())));
        assert_eq!(FlowChange::from_code(99), None);
    }

    #[test]
    fn test_diagnostic_text() {
        let e = RuntimeError::UnknownCommand {
            name: "foo".to_string(),
        };
        assert_eq!(e.to_string(), "no such command 'foo'");
        let e = RuntimeError::NotANumber {
            value: "-4x".to_string(),
        };
        assert_eq!(e.to_string(), "NaN: \"-4x\"");
    }
}
