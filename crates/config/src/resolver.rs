//! Ordered-overlay resolution and deferred command-line replay.
//!
//! Responsibilities:
//! - Fold a loader sequence over one specification tree into a value tree.
//! - Retain the loaders, specification tree, and value tree of the last
//!   resolution so a later command-line parse can replay the cmd-args loader.
//! - Register the replay hook with a `CommandHost`.
//!
//! Does NOT handle:
//! - Parsing command lines (see `clap_host`).
//!
//! Invariants:
//! - State moves Unresolved -> Resolved -> CliAugmented; a new resolution
//!   returns to Resolved.
//! - A failed resolution leaves previously retained state untouched.
//! - A replay runs only the first cmd-args loader, against the retained trees.

use std::cell::RefCell;
use std::rc::Rc;

use crate::loader::{BoundCommand, ConfigError, LeafPolicy, Loader, ValueTree, default_loaders};
use crate::spec::SpecTree;

/// Observable phase of a [`Resolver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolverState {
    /// `resolve_config` has not succeeded yet.
    Unresolved,
    /// A static value tree is retained.
    Resolved,
    /// The retained value tree has been refreshed from a parsed command.
    CliAugmented,
}

#[derive(Debug)]
struct Retained {
    loaders: Vec<Loader>,
    spec: SpecTree,
    values: ValueTree,
}

#[derive(Debug, Default)]
enum Phase {
    #[default]
    Unresolved,
    Resolved(Retained),
    CliAugmented(Retained),
}

/// Resolves specification trees and retains the last result for replay.
#[derive(Debug, Default)]
pub struct Resolver {
    phase: Phase,
}

impl Resolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve `spec` with the default loaders and an empty initial tree.
    pub fn resolve(&mut self, spec: SpecTree) -> Result<ValueTree, ConfigError> {
        self.resolve_config(spec, default_loaders(), ValueTree::new())
    }

    /// Feed `spec` through each loader in order, starting from `initial`.
    ///
    /// Later loaders decide, leaf by leaf, whether to override earlier ones.
    /// On success the loaders, `spec`, and the result are retained.
    ///
    /// # Errors
    ///
    /// Propagates the first loader error; nothing is retained in that case.
    pub fn resolve_config(
        &mut self,
        spec: SpecTree,
        loaders: Vec<Loader>,
        initial: ValueTree,
    ) -> Result<ValueTree, ConfigError> {
        let mut values = initial;
        for loader in &loaders {
            values = loader.load_values(&spec, values)?;
        }

        tracing::debug!(
            loaders = loaders.len(),
            keys = values.len(),
            "Resolved configuration"
        );
        self.phase = Phase::Resolved(Retained {
            loaders,
            spec,
            values: values.clone(),
        });
        Ok(values)
    }

    /// Bind `command` to the retained cmd-args loader and replay it.
    ///
    /// This is the body of the hook registered by [`SharedResolver::resolve_command`].
    ///
    /// # Errors
    ///
    /// - `ConfigError::NotResolved` before any successful `resolve_config`.
    /// - `ConfigError::NoCommandLoader` if the retained sequence has no cmd-args loader.
    pub fn apply_command(&mut self, command: BoundCommand) -> Result<&ValueTree, ConfigError> {
        let retained = match &mut self.phase {
            Phase::Unresolved => return Err(ConfigError::NotResolved),
            Phase::Resolved(retained) | Phase::CliAugmented(retained) => retained,
        };
        let index = retained
            .loaders
            .iter()
            .position(Loader::is_cmd_args)
            .ok_or(ConfigError::NoCommandLoader)?;

        if let Loader::CmdArgs(loader) = &mut retained.loaders[index] {
            loader.bind(command);
        }
        let loader = &retained.loaders[index];
        tracing::info!(loader = loader.name(), "Replaying command-line loader");
        retained.values = loader.load_values(&retained.spec, retained.values.clone())?;

        self.phase = match std::mem::take(&mut self.phase) {
            Phase::Resolved(retained) | Phase::CliAugmented(retained) => {
                Phase::CliAugmented(retained)
            }
            Phase::Unresolved => Phase::Unresolved,
        };
        self.values().ok_or(ConfigError::NotResolved)
    }

    pub fn state(&self) -> ResolverState {
        match self.phase {
            Phase::Unresolved => ResolverState::Unresolved,
            Phase::Resolved(_) => ResolverState::Resolved,
            Phase::CliAugmented(_) => ResolverState::CliAugmented,
        }
    }

    /// The retained value tree, if any resolution has succeeded.
    pub fn values(&self) -> Option<&ValueTree> {
        self.retained().map(|r| &r.values)
    }

    pub fn spec(&self) -> Option<&SpecTree> {
        self.retained().map(|r| &r.spec)
    }

    pub fn loaders(&self) -> &[Loader] {
        self.retained().map(|r| r.loaders.as_slice()).unwrap_or(&[])
    }

    fn retained(&self) -> Option<&Retained> {
        match &self.phase {
            Phase::Unresolved => None,
            Phase::Resolved(retained) | Phase::CliAugmented(retained) => Some(retained),
        }
    }
}

/// Hook fired by a [`CommandHost`] once per parsed action.
///
/// Receives the outer (top-level) command and the action command that will run.
pub type PreActionHook = Box<dyn FnMut(&BoundCommand, &BoundCommand) -> Result<(), ConfigError>>;

/// A command-line framework that can notify the resolver after parsing.
pub trait CommandHost {
    /// Register `hook` to run after arguments are parsed, before the action runs.
    fn on_pre_action(&mut self, hook: PreActionHook);
}

/// A resolver shared between its owner and the hook it registers.
#[derive(Debug, Clone, Default)]
pub struct SharedResolver {
    inner: Rc<RefCell<Resolver>>,
}

impl SharedResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resolve(&self, spec: SpecTree) -> Result<ValueTree, ConfigError> {
        self.with_resolver(|resolver| resolver.resolve(spec))
    }

    pub fn resolve_config(
        &self,
        spec: SpecTree,
        loaders: Vec<Loader>,
        initial: ValueTree,
    ) -> Result<ValueTree, ConfigError> {
        self.with_resolver(|resolver| resolver.resolve_config(spec, loaders, initial))
    }

    pub fn apply_command(&self, command: BoundCommand) -> Result<ValueTree, ConfigError> {
        self.with_resolver(|resolver| resolver.apply_command(command).cloned())
    }

    /// Register the deferred command-line replay with `host`.
    ///
    /// The hook fails if it fires before `resolve_config` or when the
    /// retained loaders contain no cmd-args loader.
    pub fn resolve_command<H: CommandHost + ?Sized>(&self, host: &mut H) {
        let resolver = self.clone();
        host.on_pre_action(Box::new(move |_outer, action| {
            resolver.apply_command(action.clone()).map(|_| ())
        }));
    }

    /// Fails with `ResolverBusy` while a hook holds the resolver.
    pub fn state(&self) -> Result<ResolverState, ConfigError> {
        self.inspect(Resolver::state)
    }

    /// A snapshot of the retained value tree.
    ///
    /// Fails with `ResolverBusy` while a hook holds the resolver.
    pub fn values(&self) -> Result<Option<ValueTree>, ConfigError> {
        self.inspect(|resolver| resolver.values().cloned())
    }

    fn inspect<T>(&self, f: impl FnOnce(&Resolver) -> T) -> Result<T, ConfigError> {
        let resolver = self
            .inner
            .try_borrow()
            .map_err(|_| ConfigError::ResolverBusy)?;
        Ok(f(&resolver))
    }

    fn with_resolver<T>(
        &self,
        f: impl FnOnce(&mut Resolver) -> Result<T, ConfigError>,
    ) -> Result<T, ConfigError> {
        let mut resolver = self
            .inner
            .try_borrow_mut()
            .map_err(|_| ConfigError::ResolverBusy)?;
        f(&mut resolver)
    }
}
