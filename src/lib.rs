//! # Introduction
//!
//! `brine` is an embeddable, minimal command-oriented scripting language in
//! the Tcl family: programs are sequences of commands, each command is a
//! whitespace-separated list of words, and every value is a string.
//!
//! ## Execution pipeline
//!
//! ```text
//! Source → Lexer → Evaluator → command dispatch → result string + code
//! ```
//!
//! 1. [`parser`] — tokenises source into SEP/EOL/STR/ESC/VAR/CMD tokens.
//! 2. [`interpreter`] — assembles tokens into command words (applying
//!    variable, command, and escape substitution), dispatches through the
//!    command table, and threads flow-control codes back out.
//!
//! ## Language surface
//!
//! Commands are separated by newlines or `;`, words by spaces and tabs.
//! `{ ... }` groups verbatim (nestable), `" ... "` groups with substitution,
//! `$name` splices a variable, `[ script ]` splices a nested evaluation, and
//! `#` at the start of a command begins a comment. Control flow (`if`,
//! `while`, `proc`, `return`, `catch`), variable linking (`upvar`,
//! `uplevel`), list access (`join`, `lindex`, `llength`), a `string`
//! toolbox, integer operators, and `info` introspection are built in.
//!
//! ## Embedding
//!
//! ```
//! use brine::Interp;
//!
//! let mut interp = Interp::new();
//! interp
//!     .register_command("double", |i, argv| {
//!         let n = match i.var_integer(&argv[1]) {
//!             Ok(n) => n,
//!             Err(e) => return i.fail(e),
//!         };
//!         i.set_result_integer(n * 2);
//!         Ok(())
//!     })
//!     .unwrap();
//! interp.eval("set x 21; double x").unwrap();
//! assert_eq!(interp.result(), "42");
//! ```
//!
//! The result string always belongs to the interpreter; copy it out if you
//! need it past the next evaluation.

pub mod interpreter;
pub mod parser;

pub use interpreter::engine::{Interp, Limits};
pub use interpreter::errors::{result_code, EvalResult, FlowChange, RuntimeError};
