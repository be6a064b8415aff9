//! Command dispatch.
//!
//! Responsibilities:
//! - Load the specification and build the loader sequence.
//! - Run static resolution, and for `run` the deferred command-line replay.
//! - Print resolved values to stdout.
//!
//! Does NOT handle:
//! - Logging setup or exit codes (see `main` and `error`).

use anyhow::{Context, Result};
use appy_config::{ClapHost, ConfigError, LoaderRegistry, SharedResolver, SpecTree, ValueTree};
use std::path::Path;

use crate::args::{Cli, Commands, OutputFormat};
use crate::formatters::format_values;
use crate::spec_command;

pub fn run_command(cli: Cli) -> Result<()> {
    let registry = LoaderRegistry::default();
    match cli.command {
        Commands::Loaders => {
            for name in registry.names() {
                println!("{name}");
            }
            Ok(())
        }
        Commands::Resolve => {
            let spec = load_spec(cli.spec.as_deref())?;
            let loaders = registry.build_all(&cli.loaders)?;
            let resolver = SharedResolver::new();
            let values = resolver
                .resolve_config(spec, loaders, ValueTree::new())
                .context("Failed to resolve configuration")?;
            print_values(&values, cli.output)
        }
        Commands::Run { args } => {
            let spec = load_spec(cli.spec.as_deref())?;
            let loaders = registry.build_all(&cli.loaders)?;
            let mut host = ClapHost::new(spec_command::build(&spec)?);

            let resolver = SharedResolver::new();
            resolver.resolve_command(&mut host);
            resolver
                .resolve_config(spec, loaders, ValueTree::new())
                .context("Failed to resolve configuration")?;

            let argv = std::iter::once("appy run".to_string()).chain(args);
            match host.try_dispatch_from(argv) {
                Ok(_) => {}
                Err(ConfigError::CommandLine(e)) if !e.use_stderr() => e.exit(),
                Err(e) => return Err(e).context("Failed to apply command-line values"),
            }

            let values = resolver.values()?.ok_or(ConfigError::NotResolved)?;
            tracing::info!(state = ?resolver.state()?, "Resolved configuration");
            print_values(&values, cli.output)
        }
    }
}

fn load_spec(path: Option<&Path>) -> Result<SpecTree> {
    let path = path.context("No specification given (use --spec or APPY_SPEC)")?;
    let spec = SpecTree::from_path(path)
        .with_context(|| format!("Failed to load specification {}", path.display()))?;
    tracing::debug!(path = %path.display(), top_level_keys = spec.len(), "Loaded specification");
    Ok(spec)
}

fn print_values(values: &ValueTree, format: OutputFormat) -> Result<()> {
    print!("{}", format_values(values, format)?);
    Ok(())
}
