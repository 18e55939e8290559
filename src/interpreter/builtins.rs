//! Core built-in commands
//!
//! Everything here runs against the result channel: a built-in deposits its
//! value (or diagnostic) in the interpreter result and returns an
//! [`EvalResult`]. Control-flow commands (`break`, `continue`, `return`)
//! work by returning the matching [`FlowChange`]; `while` and procedure
//! calls consume those codes on the way back out.
//!
//! The math operators live in [`crate::interpreter::math`] and the `string`
//! sub-dispatcher in [`crate::interpreter::strings`].

use crate::interpreter::commands::CommandBody;
use crate::interpreter::engine::Interp;
use crate::interpreter::errors::{result_code, EvalResult, FlowChange, RuntimeError};
use crate::interpreter::math;
use crate::parser::lexer::{Lexer, TokenKind};

/// Register the core command set.
pub(crate) fn register_core(interp: &mut Interp) {
    let commands: &[(&str, fn(&mut Interp, &[String]) -> EvalResult)] = &[
        ("set", |i, argv| i.builtin_set(argv)),
        ("unset", |i, argv| i.builtin_unset(argv)),
        ("if", |i, argv| i.builtin_if(argv)),
        ("while", |i, argv| i.builtin_while(argv)),
        ("break", |i, argv| i.builtin_loop_control(argv)),
        ("continue", |i, argv| i.builtin_loop_control(argv)),
        ("return", |i, argv| i.builtin_return(argv)),
        ("catch", |i, argv| i.builtin_catch(argv)),
        ("proc", |i, argv| i.builtin_proc(argv)),
        ("rename", |i, argv| i.builtin_rename(argv)),
        ("uplevel", |i, argv| i.builtin_uplevel(argv)),
        ("upvar", |i, argv| i.builtin_upvar(argv)),
        ("eval", |i, argv| i.builtin_eval(argv)),
        ("concat", |i, argv| i.builtin_concat(argv)),
        ("join", |i, argv| i.builtin_join(argv)),
        ("join-args", |i, argv| i.builtin_join_args(argv)),
        ("lindex", |i, argv| i.builtin_lindex(argv)),
        ("llength", |i, argv| i.builtin_llength(argv)),
        ("info", |i, argv| i.builtin_info(argv)),
    ];
    for &(name, function) in commands {
        interp.define_native(name, function);
    }
}

/// Split a list the way program text splits: every non-separator token is
/// one element. Brace groups arrive without their braces, exactly as the
/// evaluator would see them.
fn list_elements(list: &str) -> Vec<String> {
    let mut lexer = Lexer::new(list);
    let mut elements = Vec::new();
    loop {
        match lexer.next_token() {
            TokenKind::Eof => break,
            TokenKind::Sep | TokenKind::Eol => {}
            _ => elements.push(String::from_utf8_lossy(lexer.token()).into_owned()),
        }
    }
    elements
}

impl Interp {
    /// `set name` reads, `set name value` writes and echoes the value.
    pub(crate) fn builtin_set(&mut self, argv: &[String]) -> EvalResult {
        match argv.len() {
            2 => match self.var(&argv[1]).map(str::to_string) {
                Some(value) => {
                    self.set_result(value);
                    Ok(())
                }
                None => self.fail(RuntimeError::UnknownVariable {
                    name: argv[1].clone(),
                }),
            },
            3 => {
                self.set_var(&argv[1], &argv[2]);
                self.set_result(argv[2].clone());
                Ok(())
            }
            _ => self.arity_error(3, argv),
        }
    }

    /// `unset name`: remove from the active frame only.
    pub(crate) fn builtin_unset(&mut self, argv: &[String]) -> EvalResult {
        if argv.len() != 2 {
            return self.arity_error(2, argv);
        }
        if !self.unset_var(&argv[1]) {
            return self.fail(RuntimeError::UnknownVariable {
                name: argv[1].clone(),
            });
        }
        self.set_result("");
        Ok(())
    }

    /// `if cond then` or `if cond then else elsebody`. The condition script's
    /// result is parsed as a strict integer.
    pub(crate) fn builtin_if(&mut self, argv: &[String]) -> EvalResult {
        if argv.len() != 3 && argv.len() != 5 {
            return self.arity_error(5, argv);
        }
        self.eval(&argv[1])?;
        let cond = match math::parse_integer(self.result()) {
            Ok(n) => n,
            Err(e) => return self.fail(e),
        };
        if cond != 0 {
            self.eval(&argv[2])
        } else if argv.len() == 5 {
            self.eval(&argv[4])
        } else {
            self.set_result("");
            Ok(())
        }
    }

    /// `while cond body`: OK and CONTINUE iterate, BREAK exits with OK,
    /// anything else unwinds.
    pub(crate) fn builtin_while(&mut self, argv: &[String]) -> EvalResult {
        if argv.len() != 3 {
            return self.arity_error(3, argv);
        }
        loop {
            self.eval(&argv[1])?;
            let cond = match math::parse_integer(self.result()) {
                Ok(n) => n,
                Err(e) => return self.fail(e),
            };
            if cond == 0 {
                self.set_result("");
                return Ok(());
            }
            match self.eval(&argv[2]) {
                Ok(()) | Err(FlowChange::Continue) => {}
                Err(FlowChange::Break) => {
                    self.set_result("");
                    return Ok(());
                }
                Err(other) => return Err(other),
            }
        }
    }

    /// `break` and `continue`, keyed on the invoked name.
    pub(crate) fn builtin_loop_control(&mut self, argv: &[String]) -> EvalResult {
        if argv.len() != 1 {
            return self.arity_error(1, argv);
        }
        if argv[0] == "break" {
            Err(FlowChange::Break)
        } else {
            Err(FlowChange::Continue)
        }
    }

    /// `return`, `return value`, or `return value code` where `code` is a
    /// stable integer code (0, -1, 1, 2, 3).
    pub(crate) fn builtin_return(&mut self, argv: &[String]) -> EvalResult {
        if argv.len() > 3 {
            return self.arity_error(3, argv);
        }
        let outcome = match argv.get(2) {
            Some(word) => {
                let code = match math::parse_integer(word) {
                    Ok(n) => n,
                    Err(e) => return self.fail(e),
                };
                match FlowChange::from_code(code) {
                    Some(outcome) => outcome,
                    None => return self.fail(RuntimeError::InvalidReturnCode { code }),
                }
            }
            None => Err(FlowChange::Return),
        };
        self.set_result(argv.get(1).cloned().unwrap_or_default());
        outcome
    }

    /// `catch script varname`: run the script, store its return code in the
    /// variable and in the result, and always succeed.
    pub(crate) fn builtin_catch(&mut self, argv: &[String]) -> EvalResult {
        if argv.len() != 3 {
            return self.arity_error(3, argv);
        }
        let code = result_code(self.eval(&argv[1]));
        self.set_var(&argv[2], &code.to_string());
        self.set_result_integer(code);
        Ok(())
    }

    /// `proc name params body`: register a user procedure.
    pub(crate) fn builtin_proc(&mut self, argv: &[String]) -> EvalResult {
        if argv.len() != 4 {
            return self.arity_error(4, argv);
        }
        self.register_proc(&argv[1], &argv[2], &argv[3])?;
        self.set_result("");
        Ok(())
    }

    /// `rename src dst`; an empty `dst` deletes `src`.
    pub(crate) fn builtin_rename(&mut self, argv: &[String]) -> EvalResult {
        if argv.len() != 3 {
            return self.arity_error(3, argv);
        }
        self.rename_command(&argv[1], &argv[2])
    }

    /// `uplevel level script...`: evaluate in an ancestor frame.
    pub(crate) fn builtin_uplevel(&mut self, argv: &[String]) -> EvalResult {
        if argv.len() < 3 {
            return self.arity_error(3, argv);
        }
        let frame = match self.resolve_level(&argv[1]) {
            Ok(frame) => frame,
            Err(e) => return self.fail(e),
        };
        let script = argv[2..].join(" ");
        self.eval_in_frame(frame, &script)
    }

    /// `upvar level other mine`: alias a local name to an ancestor's cell.
    pub(crate) fn builtin_upvar(&mut self, argv: &[String]) -> EvalResult {
        if argv.len() != 4 {
            return self.arity_error(4, argv);
        }
        let frame = match self.resolve_level(&argv[1]) {
            Ok(frame) => frame,
            Err(e) => return self.fail(e),
        };
        match self.link_var(frame, &argv[2], &argv[3]) {
            Ok(()) => {
                self.set_result("");
                Ok(())
            }
            Err(e) => self.fail(e),
        }
    }

    /// `eval args...`: space-join and evaluate.
    pub(crate) fn builtin_eval(&mut self, argv: &[String]) -> EvalResult {
        if argv.len() < 2 {
            return self.arity_error(2, argv);
        }
        let script = argv[1..].join(" ");
        self.eval(&script)
    }

    /// `concat args...`: space-join into the result.
    pub(crate) fn builtin_concat(&mut self, argv: &[String]) -> EvalResult {
        self.set_result(argv[1..].join(" "));
        Ok(())
    }

    /// `join list sep`: split `list` with the program lexer, join elements
    /// with `sep`.
    pub(crate) fn builtin_join(&mut self, argv: &[String]) -> EvalResult {
        if argv.len() != 3 {
            return self.arity_error(3, argv);
        }
        let elements = list_elements(&argv[1]);
        self.set_result(elements.join(&argv[2]));
        Ok(())
    }

    /// `join-args sep args...`: join the remaining words directly.
    pub(crate) fn builtin_join_args(&mut self, argv: &[String]) -> EvalResult {
        if argv.len() < 2 {
            return self.arity_error(2, argv);
        }
        self.set_result(argv[2..].join(&argv[1]));
        Ok(())
    }

    /// `lindex list n`: the Nth element, or empty when out of range.
    pub(crate) fn builtin_lindex(&mut self, argv: &[String]) -> EvalResult {
        if argv.len() != 3 {
            return self.arity_error(3, argv);
        }
        let index = match math::parse_integer(&argv[2]) {
            Ok(n) => n,
            Err(e) => return self.fail(e),
        };
        let mut elements = list_elements(&argv[1]);
        let value = match usize::try_from(index) {
            Ok(i) if i < elements.len() => elements.swap_remove(i),
            _ => String::new(),
        };
        self.set_result(value);
        Ok(())
    }

    /// `llength list`: the element count.
    pub(crate) fn builtin_llength(&mut self, argv: &[String]) -> EvalResult {
        if argv.len() != 2 {
            return self.arity_error(2, argv);
        }
        self.set_result_integer(list_elements(&argv[1]).len() as i64);
        Ok(())
    }

    /// `info` sub-dispatcher: interpreter introspection.
    pub(crate) fn builtin_info(&mut self, argv: &[String]) -> EvalResult {
        if argv.len() < 2 {
            return self.arity_error(2, argv);
        }
        match argv[1].as_str() {
            "command" => self.info_command(argv),
            "line" => {
                if argv.len() != 2 {
                    return self.arity_error(2, argv);
                }
                self.set_result_integer(self.line() as i64);
                Ok(())
            }
            "level" => {
                if argv.len() != 2 {
                    return self.arity_error(2, argv);
                }
                self.set_result_integer(self.frame_depth() as i64);
                Ok(())
            }
            "width" => {
                if argv.len() != 2 {
                    return self.arity_error(2, argv);
                }
                self.set_result_integer(i64::BITS as i64);
                Ok(())
            }
            "limits" => self.info_limits(argv),
            "features" => self.info_features(argv),
            other => {
                let name = other.to_string();
                self.fail(RuntimeError::UnknownSubcommand {
                    command: "info".to_string(),
                    name,
                })
            }
        }
    }

    /// `info command` — count; `info command <name>` — registration index;
    /// `info command name|args|body <index>` — record fields. Native
    /// commands report `built-in` for `args` and `body`.
    fn info_command(&mut self, argv: &[String]) -> EvalResult {
        match argv.len() {
            2 => {
                self.set_result_integer(self.commands.len() as i64);
                Ok(())
            }
            3 => match self.commands.position(&argv[2]) {
                Some(slot) => {
                    self.set_result_integer(slot as i64);
                    Ok(())
                }
                None => self.fail(RuntimeError::UnknownCommand {
                    name: argv[2].clone(),
                }),
            },
            4 => {
                let index = match math::parse_integer(&argv[3]) {
                    Ok(n) => n,
                    Err(e) => return self.fail(e),
                };
                let slot = usize::try_from(index).ok();
                let Some(command) = slot.and_then(|s| self.commands.get_at(s)) else {
                    return self.fail(RuntimeError::UnknownCommand {
                        name: argv[3].clone(),
                    });
                };
                let field = match argv[2].as_str() {
                    "name" => Some(command.name.clone()),
                    "args" => Some(match &command.body {
                        CommandBody::Proc(def) => def.params.clone(),
                        CommandBody::Native(_) => "built-in".to_string(),
                    }),
                    "body" => Some(match &command.body {
                        CommandBody::Proc(def) => def.body.clone(),
                        CommandBody::Native(_) => "built-in".to_string(),
                    }),
                    _ => None,
                };
                match field {
                    Some(value) => {
                        self.set_result(value);
                        Ok(())
                    }
                    None => {
                        let name = argv[2].clone();
                        self.fail(RuntimeError::UnknownSubcommand {
                            command: "info command".to_string(),
                            name,
                        })
                    }
                }
            }
            _ => self.arity_error(4, argv),
        }
    }

    /// `info limits recursion|args|string`: the configured limits.
    fn info_limits(&mut self, argv: &[String]) -> EvalResult {
        if argv.len() != 3 {
            return self.arity_error(3, argv);
        }
        let limits = self.limits();
        let value = match argv[2].as_str() {
            "recursion" => limits.max_depth,
            "args" => limits.max_args,
            "string" => limits.max_string,
            other => {
                let name = other.to_string();
                return self.fail(RuntimeError::UnknownSubcommand {
                    command: "info limits".to_string(),
                    name,
                });
            }
        };
        self.set_result_integer(value as i64);
        Ok(())
    }

    /// `info features <key>`: configuration flags by key.
    fn info_features(&mut self, argv: &[String]) -> EvalResult {
        if argv.len() != 3 {
            return self.arity_error(3, argv);
        }
        let flag = match argv[2].as_str() {
            // The string and math command sets are always compiled in.
            "string" | "maths" => 1,
            // No debug tracing, and allocation is the process allocator.
            "debugging" | "allocator" => 0,
            other => {
                let name = other.to_string();
                return self.fail(RuntimeError::UnknownSubcommand {
                    command: "info features".to_string(),
                    name,
                });
            }
        };
        self.set_result_integer(flag);
        Ok(())
    }
}
