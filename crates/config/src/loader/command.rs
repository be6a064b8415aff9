//! Command-line argument loader.
//!
//! Responsibilities:
//! - Look up `cmdArg` names in a parsed command, positional arguments first.
//! - Pass values through unchanged until a command has been bound.
//!
//! Does NOT handle:
//! - Parsing argv (see `clap_host`).
//! - Deciding when to replay the loader (see `resolver`).
//!
//! Invariants:
//! - An unbound loader is a pure pass-through.
//! - A lookup that finds nothing keeps the current value.

use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// Per-name lookups on a parsed action command.
pub trait CommandLookup: Send + Sync {
    /// Value of the positional argument `name`, if it was given.
    fn arg(&self, name: &str) -> Option<Value>;

    /// Value of the named option `name`, if it was given.
    fn opt(&self, name: &str) -> Option<Value>;
}

/// A parsed command, in one of the two shapes CLI hosts expose.
#[derive(Clone)]
pub enum BoundCommand {
    /// A subcommand answering per-name lookups.
    Action(Arc<dyn CommandLookup>),
    /// A top-level program exposing positional values as a plain list and
    /// every option at once. Only the options are addressable by name.
    Program {
        args: Vec<Value>,
        opts: Map<String, Value>,
    },
}

impl BoundCommand {
    /// Wrap a per-name lookup.
    pub fn action(lookup: impl CommandLookup + 'static) -> Self {
        BoundCommand::Action(Arc::new(lookup))
    }

    /// Find `name` among positional arguments, then among options.
    pub fn lookup(&self, name: &str) -> Option<Value> {
        match self {
            BoundCommand::Action(command) => command.arg(name).or_else(|| command.opt(name)),
            BoundCommand::Program { opts, .. } => opts.get(name).cloned(),
        }
    }
}

impl fmt::Debug for BoundCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundCommand::Action(_) => f.write_str("Action(..)"),
            BoundCommand::Program { args, opts } => f
                .debug_struct("Program")
                .field("args", args)
                .field("opts", opts)
                .finish(),
        }
    }
}

/// Whether a parsed command is available yet.
#[derive(Debug, Clone, Default)]
pub enum CommandBinding {
    /// Arguments are not parsed yet; leaves pass through.
    #[default]
    Unbound,
    Bound(BoundCommand),
}

/// Loader state for the `cmdArg` leaf key.
#[derive(Debug, Clone, Default)]
pub struct CmdArgsLoader {
    binding: CommandBinding,
}

impl CmdArgsLoader {
    /// Create a loader already bound to `command`.
    pub fn bound(command: BoundCommand) -> Self {
        Self {
            binding: CommandBinding::Bound(command),
        }
    }

    /// Bind (or rebind) the parsed command.
    pub fn bind(&mut self, command: BoundCommand) {
        self.binding = CommandBinding::Bound(command);
    }

    pub fn binding(&self) -> &CommandBinding {
        &self.binding
    }

    pub fn is_bound(&self) -> bool {
        matches!(self.binding, CommandBinding::Bound(_))
    }

    pub(super) fn map_value(
        &self,
        candidate: Option<&Value>,
        current: Option<Value>,
    ) -> Option<Value> {
        let CommandBinding::Bound(command) = &self.binding else {
            return current;
        };
        candidate
            .and_then(Value::as_str)
            .and_then(|name| command.lookup(name))
            .or(current)
    }
}
