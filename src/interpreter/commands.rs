//! The command table
//!
//! Commands are stored in registration order (so `info command` can address
//! records by index) with an [`FxHashMap`] index for name lookup. A record is
//! either a native command — a shared closure whose captures carry any host
//! state — or a user-defined procedure holding its parameter list and body
//! as source text.

use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::interpreter::engine::Interp;
use crate::interpreter::errors::{EvalResult, RuntimeError};

/// Signature of a native command: the interpreter and the assembled words
/// (`argv[0]` is the command name). Host state lives in the closure.
pub type NativeFn = dyn Fn(&mut Interp, &[String]) -> EvalResult;

/// A user-defined procedure: parameter names and body, both source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcDef {
    pub params: String,
    pub body: String,
}

/// The dispatchable payload of a command record.
#[derive(Clone)]
pub enum CommandBody {
    Native(Rc<NativeFn>),
    Proc(Rc<ProcDef>),
}

/// One entry in the command table.
pub struct Command {
    pub name: String,
    pub body: CommandBody,
}

/// Name-unique, registration-ordered command storage.
#[derive(Default)]
pub struct CommandTable {
    entries: Vec<Command>,
    index: FxHashMap<String, usize>,
}

impl CommandTable {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Command> {
        self.index.get(name).map(|&slot| &self.entries[slot])
    }

    pub fn get_at(&self, slot: usize) -> Option<&Command> {
        self.entries.get(slot)
    }

    /// Registration index of `name`, if present.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Insert a new record. Names are unique across the table.
    pub fn insert(&mut self, name: &str, body: CommandBody) -> Result<(), RuntimeError> {
        if self.index.contains_key(name) {
            return Err(RuntimeError::AlreadyDefined {
                name: name.to_string(),
            });
        }
        self.index.insert(name.to_string(), self.entries.len());
        self.entries.push(Command {
            name: name.to_string(),
            body,
        });
        Ok(())
    }

    /// Remove a record by name. Later records shift down one slot.
    pub fn remove(&mut self, name: &str) -> bool {
        let Some(slot) = self.index.remove(name) else {
            return false;
        };
        self.entries.remove(slot);
        for entry in &self.entries[slot..] {
            if let Some(s) = self.index.get_mut(&entry.name) {
                *s -= 1;
            }
        }
        true
    }
}
