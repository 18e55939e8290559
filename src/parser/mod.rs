//! Source tokenization
//!
//! There is exactly one parsing pass and it produces no tree: the
//! [`lexer::Lexer`] hands typed tokens straight to the evaluator, which
//! assembles them into command words. List-shaped built-ins (`join`,
//! `lindex`, `llength`) reuse the same lexer over their list argument, so
//! "a list" is just program text that never gets evaluated.

pub mod lexer;

pub use lexer::{Lexer, TokenKind};
