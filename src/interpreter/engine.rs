//! Interpreter core: evaluation loop, call frames, and the embedding API
//!
//! [`Interp`] owns everything: the command table, the call-frame stack, the
//! result string, and the configured limits. Evaluation is directly
//! recursive — `[...]` substitution, `eval`, and procedure bodies re-enter
//! [`Interp::eval`] on the native stack — guarded only by the depth counter.
//!
//! # Result channel
//!
//! Commands do not return values. A command deposits its value (or
//! diagnostic) in the interpreter result and returns an [`EvalResult`]; the
//! evaluator copies the result out where a substitution needs it. Embedders
//! who need a result past the next evaluation must copy it.

use std::rc::Rc;

use crate::interpreter::builtins;
use crate::interpreter::commands::{CommandBody, CommandTable, ProcDef};
use crate::interpreter::constants::{
    DEFAULT_MAX_ARGS, DEFAULT_MAX_DEPTH, DEFAULT_MAX_STRING, VERSION,
};
use crate::interpreter::errors::{EvalResult, FlowChange, RuntimeError};
use crate::interpreter::math;
use crate::interpreter::strings;
use crate::interpreter::variables::{resolve_cell, CallFrame, VarValue};
use crate::parser::lexer::{Lexer, TokenKind};

/// Configurable evaluation limits, reported by `info limits`.
#[derive(Debug, Clone, Copy)]
pub struct Limits {
    /// Maximum nesting depth of recursive evaluation.
    pub max_depth: usize,
    /// Maximum number of words assembled for one command.
    pub max_args: usize,
    /// Advisory maximum string length.
    pub max_string: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            max_depth: DEFAULT_MAX_DEPTH,
            max_args: DEFAULT_MAX_ARGS,
            max_string: DEFAULT_MAX_STRING,
        }
    }
}

/// The interpreter. One instance is one isolated world: commands, variables,
/// and the result string are shared with nothing else.
pub struct Interp {
    pub(crate) commands: CommandTable,
    pub(crate) frames: Vec<CallFrame>,
    /// Index of the active frame. Usually the top of `frames`, except while
    /// `uplevel` has re-pointed it at an ancestor.
    pub(crate) active: usize,
    pub(crate) result: String,
    pub(crate) line: usize,
    pub(crate) depth: usize,
    pub(crate) limits: Limits,
}

impl Interp {
    /// Create an interpreter with default limits, register the built-in
    /// commands, and define the `version` variable.
    pub fn new() -> Self {
        Self::with_limits(Limits::default())
    }

    /// Create an interpreter with explicit limits. Depth and argument limits
    /// are clamped to a minimum of 8.
    pub fn with_limits(limits: Limits) -> Self {
        let limits = Limits {
            max_depth: limits.max_depth.max(8),
            max_args: limits.max_args.max(8),
            max_string: limits.max_string,
        };
        let mut interp = Interp {
            commands: CommandTable::default(),
            frames: vec![CallFrame::new(None)],
            active: 0,
            result: String::new(),
            line: 1,
            depth: 0,
            limits,
        };
        builtins::register_core(&mut interp);
        math::register_math(&mut interp);
        strings::register_string(&mut interp);
        interp.set_var_integer("version", VERSION);
        interp
    }

    // === Evaluation ===

    /// Parse and execute `src`. The outcome code is the return value; the
    /// result string holds the last command's value or the diagnostic.
    pub fn eval(&mut self, src: &str) -> EvalResult {
        if self.depth >= self.limits.max_depth {
            return self.fail(RuntimeError::RecursionLimit);
        }
        self.depth += 1;
        let result = self.eval_commands(src);
        self.depth -= 1;
        result
    }

    /// [`Interp::eval`], reduced to the stable integer code (0 for OK, -1
    /// for errors, positive for RETURN/BREAK/CONTINUE).
    pub fn eval_code(&mut self, src: &str) -> i64 {
        match self.eval(src) {
            Ok(()) => 0,
            Err(flow) => flow.code(),
        }
    }

    /// The token-to-argv assembly loop.
    fn eval_commands(&mut self, src: &str) -> EvalResult {
        self.set_result("");
        let mut lexer = Lexer::new(src);
        let mut argv: Vec<String> = Vec::new();
        let mut prev = TokenKind::Eol;
        loop {
            let kind = lexer.next_token();
            self.line = lexer.line();
            let mut word = String::from_utf8_lossy(lexer.token()).into_owned();
            match kind {
                TokenKind::Eof => break,
                TokenKind::Var => {
                    let Some(value) = self.var(&word).map(str::to_string) else {
                        return self.fail(RuntimeError::UnknownVariable { name: word });
                    };
                    word = value;
                }
                TokenKind::Cmd => {
                    self.eval(&word)?;
                    word = self.result.clone();
                }
                TokenKind::Esc => match strings::unescape(&word) {
                    Ok(decoded) => word = decoded,
                    Err(e) => return self.fail(e),
                },
                TokenKind::Sep => {
                    prev = TokenKind::Sep;
                    continue;
                }
                TokenKind::Eol => {
                    prev = TokenKind::Eol;
                    if !argv.is_empty() {
                        self.dispatch(&argv)?;
                    }
                    argv.clear();
                    continue;
                }
                TokenKind::Str => {}
            }
            // Append as a fresh word after a separator, otherwise glue onto
            // the word under construction.
            if prev == TokenKind::Sep || prev == TokenKind::Eol {
                if argv.len() >= self.limits.max_args {
                    return self.fail(RuntimeError::TooManyArguments);
                }
                argv.push(word);
            } else if let Some(last) = argv.last_mut() {
                last.push_str(&word);
            } else {
                argv.push(word);
            }
            prev = kind;
        }
        Ok(())
    }

    /// Look up `argv[0]` and invoke it. The record is cloned out of the
    /// table first so a command may freely mutate the table (`proc`,
    /// `rename`) while running.
    fn dispatch(&mut self, argv: &[String]) -> EvalResult {
        let body = match self.commands.get(&argv[0]) {
            Some(command) => command.body.clone(),
            None => {
                return self.fail(RuntimeError::UnknownCommand {
                    name: argv[0].clone(),
                })
            }
        };
        match body {
            CommandBody::Native(function) => function(self, argv),
            CommandBody::Proc(def) => self.call_proc(&def, argv),
        }
    }

    /// Invoke a user-defined procedure: push a frame, bind parameters,
    /// evaluate the body, translate RETURN to OK, pop the frame on every
    /// path.
    fn call_proc(&mut self, def: &ProcDef, argv: &[String]) -> EvalResult {
        let parent = self.active;
        self.frames.push(CallFrame::new(Some(parent)));
        self.active = self.frames.len() - 1;
        let result = self.run_proc_body(def, argv);
        self.frames.pop();
        self.active = parent;
        result
    }

    fn run_proc_body(&mut self, def: &ProcDef, argv: &[String]) -> EvalResult {
        let params: Vec<&str> = def.params.split_ascii_whitespace().collect();
        if params.len() != argv.len() - 1 {
            return self.fail(RuntimeError::ProcArity {
                name: argv[0].clone(),
            });
        }
        for (param, value) in params.iter().zip(&argv[1..]) {
            self.set_var(param, value);
        }
        match self.eval(&def.body) {
            Err(FlowChange::Return) => Ok(()),
            other => other,
        }
    }

    /// Evaluate `src` with the active frame re-pointed at `frame`,
    /// restoring it afterwards. Backs `uplevel`.
    pub(crate) fn eval_in_frame(&mut self, frame: usize, src: &str) -> EvalResult {
        let saved = self.active;
        self.active = frame;
        let result = self.eval(src);
        self.active = saved;
        result
    }

    // === Command registration ===

    /// Install a native command. Host state belongs in the closure's
    /// captures. Fails (with the diagnostic in the result) if the name is
    /// taken.
    pub fn register_command<F>(&mut self, name: &str, function: F) -> EvalResult
    where
        F: Fn(&mut Interp, &[String]) -> EvalResult + 'static,
    {
        let body = CommandBody::Native(Rc::new(function));
        match self.commands.insert(name, body) {
            Ok(()) => Ok(()),
            Err(e) => self.fail(e),
        }
    }

    /// Core registration: capture-free built-ins installed at startup,
    /// where a name collision is a programming error.
    pub(crate) fn define_native(
        &mut self,
        name: &str,
        function: fn(&mut Interp, &[String]) -> EvalResult,
    ) {
        self.commands
            .insert(name, CommandBody::Native(Rc::new(function)))
            .expect("core command names are unique");
    }

    /// Install a user-defined procedure (the `proc` built-in's backend).
    pub(crate) fn register_proc(&mut self, name: &str, params: &str, body: &str) -> EvalResult {
        let def = CommandBody::Proc(Rc::new(ProcDef {
            params: params.to_string(),
            body: body.to_string(),
        }));
        match self.commands.insert(name, def) {
            Ok(()) => Ok(()),
            Err(e) => self.fail(e),
        }
    }

    /// Copy the record `src` under the name `dst`, then delete `src`. An
    /// empty `dst` just deletes. Fails if `src` is missing or `dst` exists.
    pub fn rename_command(&mut self, src: &str, dst: &str) -> EvalResult {
        let body = match self.commands.get(src) {
            Some(command) => command.body.clone(),
            None => {
                return self.fail(RuntimeError::UnknownCommand {
                    name: src.to_string(),
                })
            }
        };
        if !dst.is_empty() {
            if let Err(e) = self.commands.insert(dst, body) {
                return self.fail(e);
            }
        }
        self.commands.remove(src);
        self.set_result("");
        Ok(())
    }

    // === Result channel ===

    /// The current result string.
    pub fn result(&self) -> &str {
        &self.result
    }

    /// The current result, strictly parsed as an integer.
    pub fn result_integer(&self) -> Result<i64, RuntimeError> {
        math::parse_integer(&self.result)
    }

    /// Replace the result. The previous value is dropped.
    pub fn set_result(&mut self, value: impl Into<String>) {
        self.result = value.into();
    }

    /// Replace the result with the decimal form of `value`.
    pub fn set_result_integer(&mut self, value: i64) {
        self.result = value.to_string();
    }

    /// Deposit `error`'s diagnostic in the result and return the error
    /// outcome. Built-ins end their failure paths with this.
    pub fn fail(&mut self, error: RuntimeError) -> EvalResult {
        self.result = error.to_string();
        Err(FlowChange::Error)
    }

    /// Deposit a custom diagnostic (for host commands) and return the error
    /// outcome.
    pub fn set_error(&mut self, message: impl Into<String>) -> EvalResult {
        self.result = message.into();
        Err(FlowChange::Error)
    }

    /// Arity failure for a built-in: expected word count plus the words
    /// actually received.
    pub fn arity_error(&mut self, expected: usize, argv: &[String]) -> EvalResult {
        self.fail(RuntimeError::ArityMismatch {
            expected,
            words: argv.join(" "),
        })
    }

    // === Variables ===

    /// Read a variable visible from the active frame, following links.
    pub fn var(&self, name: &str) -> Option<&str> {
        let (frame, cell) = resolve_cell(&self.frames, self.active, name)?;
        match &self.frames[frame].get(&cell)?.value {
            VarValue::Direct(value) => Some(value),
            VarValue::Link { .. } => None,
        }
    }

    /// Read a variable and strictly parse it as an integer.
    pub fn var_integer(&self, name: &str) -> Result<i64, RuntimeError> {
        match self.var(name) {
            Some(value) => math::parse_integer(value),
            None => Err(RuntimeError::UnknownVariable {
                name: name.to_string(),
            }),
        }
    }

    /// Write a variable: follows links to the concrete cell, or creates a
    /// fresh variable in the active frame.
    pub fn set_var(&mut self, name: &str, value: &str) {
        match resolve_cell(&self.frames, self.active, name) {
            Some((frame, cell)) => {
                self.frames[frame].define(&cell, VarValue::Direct(value.to_string()));
            }
            None => {
                self.frames[self.active].define(name, VarValue::Direct(value.to_string()));
            }
        }
    }

    /// Write the decimal form of `value`.
    pub fn set_var_integer(&mut self, name: &str, value: i64) {
        self.set_var(name, &value.to_string());
    }

    /// Remove a binding from the active frame only. Returns whether it
    /// existed.
    pub(crate) fn unset_var(&mut self, name: &str) -> bool {
        self.frames[self.active].remove(name)
    }

    /// Bind the local variable `mine` as an alias for `other` in the frame
    /// at `target_frame` (the `upvar` backend). The link is collapsed to the
    /// concrete cell, so chains stay one hop long.
    pub(crate) fn link_var(
        &mut self,
        target_frame: usize,
        other: &str,
        mine: &str,
    ) -> Result<(), RuntimeError> {
        if self.frames[target_frame].get(other).is_none() {
            self.frames[target_frame].define(other, VarValue::Direct(String::new()));
        }
        let (frame, cell) = resolve_cell(&self.frames, target_frame, other).ok_or(
            RuntimeError::UnknownVariable {
                name: other.to_string(),
            },
        )?;
        if frame == self.active && cell == mine {
            return Err(RuntimeError::SelfLink {
                name: mine.to_string(),
            });
        }
        self.frames[self.active].define(
            mine,
            VarValue::Link {
                frame,
                name: cell,
            },
        );
        Ok(())
    }

    // === Introspection ===

    /// Current line number within the innermost active evaluation.
    pub fn line(&self) -> usize {
        self.line
    }

    /// Depth of the active frame: the global frame is 0, each procedure
    /// call adds one.
    pub fn frame_depth(&self) -> usize {
        self.frame_chain().len() - 1
    }

    /// The configured limits.
    pub fn limits(&self) -> Limits {
        self.limits
    }

    /// Frames from the active one up to the global frame, by parent links.
    pub(crate) fn frame_chain(&self) -> Vec<usize> {
        let mut chain = vec![self.active];
        let mut frame = self.active;
        while let Some(parent) = self.frames[frame].parent {
            chain.push(parent);
            frame = parent;
        }
        chain
    }

    /// Resolve an `uplevel`/`upvar` level word to a frame index. `N` climbs
    /// N parents from the active frame; `#N` names the frame at absolute
    /// depth N (the global frame is `#0`).
    pub(crate) fn resolve_level(&self, level: &str) -> Result<usize, RuntimeError> {
        let invalid = || RuntimeError::InvalidLevel {
            level: level.to_string(),
        };
        let chain = self.frame_chain();
        if let Some(absolute) = level.strip_prefix('#') {
            let n: usize = absolute.parse().map_err(|_| invalid())?;
            let depth = chain.len() - 1;
            if n > depth {
                return Err(invalid());
            }
            Ok(chain[depth - n])
        } else {
            let n: usize = level.parse().map_err(|_| invalid())?;
            chain.get(n).copied().ok_or_else(invalid)
        }
    }
}

impl Default for Interp {
    fn default() -> Self {
        Self::new()
    }
}
