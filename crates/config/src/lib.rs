//! Layered configuration resolution for appy.
//!
//! This crate resolves configuration values from defaults, environment
//! variables, command-line arguments, and JSON/YAML/dotenv files into one
//! value tree, driven by a declarative specification tree.

pub mod clap_host;
pub mod constants;
mod loader;
mod resolver;
pub mod spec;
pub mod values;

pub use clap_host::ClapHost;
pub use loader::{
    BoundCommand, CmdArgsLoader, CommandBinding, CommandLookup, ConfigError, ErrorClass,
    FileFormat, FileSource, LeafPolicy, Loader, LoaderDescriptor, LoaderFactory, LoaderRegistry,
    ValueTree, default_loaders, strip_jsonc,
};
pub use resolver::{CommandHost, PreActionHook, Resolver, ResolverState, SharedResolver};
pub use spec::{LeafSpec, SpecNode, SpecTree};
