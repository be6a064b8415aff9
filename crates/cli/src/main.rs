//! appy - resolve layered configuration from the command line.
//!
//! Responsibilities:
//! - Parse command-line arguments and environment variables.
//! - Resolve a specification tree through the configured loaders.
//! - Print the resolved values as JSON or YAML.
//!
//! Does NOT handle:
//! - Resolution semantics (see `crates/config`).
//!
//! Invariants:
//! - Logs go to stderr so stdout carries only resolved values.

mod args;
mod dispatch;
mod error;
mod formatters;
mod spec_command;

use args::Cli;
use clap::Parser;
use dispatch::run_command;
use error::{ExitCode, ExitCodeExt};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let exit_code = match run_command(cli) {
        Ok(()) => ExitCode::Success,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            e.exit_code()
        }
    };

    std::process::exit(exit_code.as_i32());
}
