//! `clap` adapter for deferred command-line resolution.
//!
//! Responsibilities:
//! - Parse argv with a `clap::Command` and fire pre-action hooks once per parse.
//! - Expose the parsed action command as a `BoundCommand`: per-name lookups
//!   for subcommands, a positional list plus options mapping for the
//!   top-level program.
//!
//! Does NOT handle:
//! - Building commands from specification trees (hosts decide their options).
//!
//! Invariants:
//! - Values filled in from clap's own `default_value` are absent, so they
//!   never shadow the specification's `default` layer.
//! - Flags become booleans, counters become numbers, everything else is a
//!   string (or an array of strings when repeated).

use clap::parser::ValueSource;
use clap::{ArgAction, ArgMatches, Command};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::ffi::OsString;

use crate::loader::{BoundCommand, CommandLookup, ConfigError};
use crate::resolver::{CommandHost, PreActionHook};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArgShape {
    Positional,
    Flag,
    Count,
    Value,
}

fn arg_shapes(command: &Command) -> BTreeMap<String, ArgShape> {
    command
        .get_arguments()
        .map(|arg| {
            let shape = if arg.is_positional() {
                ArgShape::Positional
            } else {
                match arg.get_action() {
                    ArgAction::SetTrue | ArgAction::SetFalse => ArgShape::Flag,
                    ArgAction::Count => ArgShape::Count,
                    _ => ArgShape::Value,
                }
            };
            (arg.get_id().as_str().to_string(), shape)
        })
        .collect()
}

/// Read one argument, treating clap-supplied defaults as absent.
fn matched_value(matches: &ArgMatches, id: &str, shape: ArgShape) -> Option<Value> {
    let raw = matches.try_get_raw(id).ok()??;
    if matches!(matches.value_source(id), None | Some(ValueSource::DefaultValue)) {
        return None;
    }
    match shape {
        ArgShape::Flag => matches.try_get_one::<bool>(id).ok()?.map(|b| Value::Bool(*b)),
        ArgShape::Count => matches.try_get_one::<u8>(id).ok()?.map(|n| Value::from(*n)),
        ArgShape::Positional | ArgShape::Value => {
            let mut values: Vec<Value> = raw
                .map(|v| Value::String(v.to_string_lossy().into_owned()))
                .collect();
            match values.len() {
                0 => None,
                1 => values.pop(),
                _ => Some(Value::Array(values)),
            }
        }
    }
}

/// Per-name lookups over the matches of a subcommand.
#[derive(Debug)]
struct MatchesLookup {
    matches: ArgMatches,
    shapes: BTreeMap<String, ArgShape>,
}

impl CommandLookup for MatchesLookup {
    fn arg(&self, name: &str) -> Option<Value> {
        match self.shapes.get(name) {
            Some(ArgShape::Positional) => matched_value(&self.matches, name, ArgShape::Positional),
            _ => None,
        }
    }

    fn opt(&self, name: &str) -> Option<Value> {
        match self.shapes.get(name) {
            Some(ArgShape::Positional) | None => None,
            Some(&shape) => matched_value(&self.matches, name, shape),
        }
    }
}

/// Snapshot of the top-level program: positional values as a list, every
/// given option as a mapping.
fn program_snapshot(command: &Command, matches: &ArgMatches) -> BoundCommand {
    let mut args = Vec::new();
    let mut opts = Map::new();
    for (id, shape) in arg_shapes(command) {
        let Some(value) = matched_value(matches, &id, shape) else {
            continue;
        };
        match (shape, value) {
            (ArgShape::Positional, Value::Array(items)) => args.extend(items),
            (ArgShape::Positional, value) => args.push(value),
            (_, value) => {
                opts.insert(id, value);
            }
        }
    }
    BoundCommand::Program { args, opts }
}

/// A `clap::Command` that fires pre-action hooks after every successful parse.
pub struct ClapHost {
    command: Command,
    hooks: Vec<PreActionHook>,
}

impl CommandHost for ClapHost {
    fn on_pre_action(&mut self, hook: PreActionHook) {
        self.hooks.push(hook);
    }
}

impl ClapHost {
    pub fn new(command: Command) -> Self {
        Self {
            command,
            hooks: Vec::new(),
        }
    }

    /// Parse `args` (including the binary name) and fire every hook once.
    ///
    /// # Errors
    ///
    /// - `ConfigError::CommandLine` when clap rejects the arguments (this
    ///   includes `--help` and `--version` requests).
    /// - Any error returned by a hook.
    pub fn try_dispatch_from<I, T>(&mut self, args: I) -> Result<ArgMatches, ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = self.command.try_get_matches_from_mut(args)?;

        let outer = program_snapshot(&self.command, &matches);
        let mut command = &self.command;
        let mut action_matches = &matches;
        let mut path = Vec::new();
        while let Some((name, sub_matches)) = action_matches.subcommand() {
            let Some(sub_command) = command.find_subcommand(name) else {
                break;
            };
            path.push(name.to_string());
            command = sub_command;
            action_matches = sub_matches;
        }

        let action = if path.is_empty() {
            outer.clone()
        } else {
            BoundCommand::action(MatchesLookup {
                matches: action_matches.clone(),
                shapes: arg_shapes(command),
            })
        };

        tracing::debug!(
            subcommand = %path.join(" "),
            hooks = self.hooks.len(),
            "Dispatching pre-action hooks"
        );
        for hook in &mut self.hooks {
            hook(&outer, &action)?;
        }
        Ok(matches)
    }
}
