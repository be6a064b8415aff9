//! Loaders: one strategy per kind of configuration source.
//!
//! Responsibilities:
//! - Dispatch `load_values` / `map_value` over a closed set of loader variants.
//! - Walk a specification tree and apply a leaf policy at every leaf.
//! - Provide the `LeafPolicy` seam for loaders defined outside this crate.
//!
//! Does NOT handle:
//! - Sequencing loaders or retaining results (see `resolver`).
//! - Parsing command lines (see `clap_host`).
//!
//! Invariants:
//! - `load_values` never mutates the specification tree.
//! - Value-style loaders recurse over the specification tree; JSON and YAML
//!   loaders recurse over the loaded file instead.
//! - A leaf whose policy returns `None` is absent from the value tree.

mod command;
mod error;
pub(crate) mod file;
mod jsonc;
mod registry;
mod value;

#[cfg(test)]
mod tests;

use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

pub use command::{BoundCommand, CmdArgsLoader, CommandBinding, CommandLookup};
pub use error::{ConfigError, ErrorClass};
pub use file::{FileFormat, FileSource};
pub use jsonc::strip_jsonc;
pub use registry::{LoaderDescriptor, LoaderFactory, LoaderRegistry};

use crate::spec::{SpecNode, SpecTree};
use file::{DotenvEntries, load_document, load_dotenv};

/// A resolved value tree. An absent key means "not yet resolved".
pub type ValueTree = Map<String, Value>;

/// Leaf-mapping policy of a loader.
///
/// Implement this trait to add a loader variant without touching this crate,
/// then wrap it in [`Loader::Custom`].
pub trait LeafPolicy: fmt::Debug + Send + Sync {
    /// Name used in logs and error messages.
    fn name(&self) -> &str;

    /// Leaf-specification key this policy consumes, if any.
    fn map_key(&self) -> Option<&str> {
        None
    }

    /// Decide the new value of a leaf from its candidate and current value.
    ///
    /// The default implementation has no leaf policy and always fails.
    fn map_value(
        &self,
        candidate: Option<&Value>,
        current: Option<Value>,
    ) -> Result<Option<Value>, ConfigError> {
        let _ = (candidate, current);
        Err(ConfigError::NotImplemented(self.name().to_string()))
    }
}

/// A unit of resolution strategy.
#[derive(Debug, Clone)]
pub enum Loader {
    /// Resolves every leaf to `null`.
    Null,
    /// Uses the `default` literal unconditionally.
    DefaultValue,
    /// Uses the environment variable named by `env`, if set.
    Env,
    /// Uses the command-line value named by `cmdArg`, once a command is bound.
    CmdArgs(CmdArgsLoader),
    /// Overlays a JSON document.
    JsonFile(FileSource),
    /// Overlays a YAML document.
    YamlFile(FileSource),
    /// Uses the dotenv entry named by `dotenv`.
    DotenvFile(FileSource),
    /// Schema validation. Not implemented; always fails.
    Validation,
    /// A loader supplied by the host application.
    Custom(Arc<dyn LeafPolicy>),
}

/// The default loader sequence: defaults, then environment overrides.
pub fn default_loaders() -> Vec<Loader> {
    vec![Loader::DefaultValue, Loader::Env]
}

impl Loader {
    /// Wrap a host-defined leaf policy.
    pub fn custom(policy: impl LeafPolicy + 'static) -> Self {
        Loader::Custom(Arc::new(policy))
    }

    /// Create an unbound cmd-args loader.
    pub fn cmd_args() -> Self {
        Loader::CmdArgs(CmdArgsLoader::default())
    }

    pub fn is_cmd_args(&self) -> bool {
        matches!(self, Loader::CmdArgs(_))
    }

    /// Resolve `spec` on top of `values`, returning the updated tree.
    ///
    /// # Errors
    ///
    /// - File loaders fail with `FileRead`/`FileParse`/`DotenvParse` unless
    ///   their source suppresses errors.
    /// - `Validation` and policies without a leaf mapping fail with `NotImplemented`.
    pub fn load_values(
        &self,
        spec: &SpecTree,
        mut values: ValueTree,
    ) -> Result<ValueTree, ConfigError> {
        tracing::debug!(loader = self.name(), "Loading values");
        match self {
            Loader::JsonFile(source) => load_document(source, FileFormat::Json, values),
            Loader::YamlFile(source) => load_document(source, FileFormat::Yaml, values),
            Loader::DotenvFile(source) => load_dotenv(source, spec, values),
            Loader::Validation => Err(ConfigError::NotImplemented(self.name().to_string())),
            _ => {
                walk_spec(self, spec, &mut values)?;
                Ok(values)
            }
        }
    }
}

impl LeafPolicy for Loader {
    fn name(&self) -> &str {
        match self {
            Loader::Null => "null",
            Loader::DefaultValue => "default",
            Loader::Env => "env",
            Loader::CmdArgs(_) => "cmd-args",
            Loader::JsonFile(_) => "json",
            Loader::YamlFile(_) => "yaml",
            Loader::DotenvFile(_) => "dotenv",
            Loader::Validation => "validation",
            Loader::Custom(policy) => policy.name(),
        }
    }

    fn map_key(&self) -> Option<&str> {
        match self {
            Loader::DefaultValue => Some(crate::constants::DEFAULT_KEY),
            Loader::Env => Some(crate::constants::ENV_KEY),
            Loader::CmdArgs(_) => Some(crate::constants::CMD_ARG_KEY),
            Loader::DotenvFile(_) => Some(crate::constants::DOTENV_KEY),
            Loader::Custom(policy) => policy.map_key(),
            _ => None,
        }
    }

    fn map_value(
        &self,
        candidate: Option<&Value>,
        current: Option<Value>,
    ) -> Result<Option<Value>, ConfigError> {
        match self {
            Loader::Null => Ok(Some(Value::Null)),
            Loader::DefaultValue => Ok(value::map_default(candidate)),
            Loader::Env => Ok(value::map_env(candidate, current)),
            Loader::CmdArgs(loader) => Ok(loader.map_value(candidate, current)),
            Loader::JsonFile(_) | Loader::YamlFile(_) => Ok(candidate.cloned().or(current)),
            Loader::DotenvFile(source) => {
                DotenvEntries::load(source)?.map_value(candidate, current)
            }
            Loader::Validation => Err(ConfigError::NotImplemented(self.name().to_string())),
            Loader::Custom(policy) => policy.map_value(candidate, current),
        }
    }
}

/// Walk `spec`, replacing every leaf of `values` with `policy`'s decision.
///
/// Branches create an empty value subtree where none (or a non-mapping
/// value) exists yet.
pub(crate) fn walk_spec<P: LeafPolicy + ?Sized>(
    policy: &P,
    spec: &SpecTree,
    values: &mut ValueTree,
) -> Result<(), ConfigError> {
    for (key, node) in spec.iter() {
        match node {
            SpecNode::Branch(tree) => {
                let slot = values
                    .entry(key.clone())
                    .or_insert_with(|| Value::Object(Map::new()));
                if !slot.is_object() {
                    *slot = Value::Object(Map::new());
                }
                if let Value::Object(branch) = slot {
                    walk_spec(policy, tree, branch)?;
                }
            }
            SpecNode::Leaf(leaf) => {
                let candidate = leaf.candidate(policy.map_key());
                let current = values.get(key).cloned();
                match policy.map_value(candidate, current)? {
                    Some(resolved) => {
                        values.insert(key.clone(), resolved);
                    }
                    None => {
                        values.remove(key);
                    }
                }
            }
        }
    }
    Ok(())
}
