//! Interpreter core
//!
//! This module tree provides the evaluation machinery:
//! - [`engine`]: the [`engine::Interp`] struct, evaluation loop, call
//!   frames, and the embedding API
//! - [`errors`]: runtime errors and out-of-band flow codes
//! - [`variables`]: call frames and link (alias) variables
//! - [`commands`]: the ordered, name-unique command table
//! - [`builtins`], [`strings`], [`math`]: the built-in command set
//!
//! # Execution model
//!
//! The evaluator consumes lexer tokens one command at a time, substituting
//! variables and nested `[...]` evaluations while it assembles argv, then
//! dispatches through the command table. Commands communicate through the
//! interpreter-owned result string and a small return code; there are no
//! other channels.

pub mod builtins;
pub mod commands;
pub mod constants;
pub mod engine;
pub mod errors;
pub mod math;
pub mod strings;
pub mod variables;
