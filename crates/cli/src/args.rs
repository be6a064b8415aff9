//! CLI argument definitions and parsing.
//!
//! Responsibilities:
//! - Define the CLI structure using clap derive macros.
//! - Parse command-line arguments and environment variables.
//!
//! Non-responsibilities:
//! - Does not resolve configuration (see `dispatch` module).
//! - Does not define the spec-derived `run` options (see `spec_command`).

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "appy")]
#[command(about = "Resolve layered configuration from a specification tree", long_about = None)]
#[command(version)]
#[command(
    after_help = "Examples:\n  appy --spec spec.json resolve\n  appy --spec spec.yaml --loader default --loader 'json?=config.json' --loader env resolve\n  appy --spec spec.json run -- --port 9090\n  appy --spec spec.json run -- --help\n  appy loaders\n"
)]
pub struct Cli {
    /// Path to the specification tree (JSON or YAML)
    #[arg(short, long, global = true, env = "APPY_SPEC", value_name = "FILE")]
    pub spec: Option<PathBuf>,

    /// Loader descriptor `name[?][=path]`, applied in the order given.
    ///
    /// A trailing `?` on the name ignores a missing or malformed file.
    #[arg(
        short,
        long = "loader",
        global = true,
        value_name = "DESCRIPTOR",
        default_values = ["default", "env", "cmd-args"]
    )]
    pub loaders: Vec<String>,

    /// Output format for resolved values
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve the specification without command-line values
    Resolve,

    /// Resolve the specification, then apply options derived from its `cmdArg` names
    Run {
        /// Arguments for the spec-derived command (`run -- --help` lists them)
        #[arg(trailing_var_arg = true, allow_hyphen_values = true, value_name = "ARGS")]
        args: Vec<String>,
    },

    /// List the registered loader names
    Loaders,
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Yaml,
}
