//! Builds the `run` command line from a specification tree.
//!
//! Every `cmdArg` name in the specification becomes a `--<name> <VALUE>`
//! option. Repeating an option collects its values into an array.

use appy_config::{ConfigError, SpecTree};
use clap::{Arg, ArgAction, Command};

/// Build the clap command parsed by `appy run`.
///
/// # Errors
///
/// Returns `ConfigError::InvalidSpec` for a `cmdArg` name that cannot be a
/// long option: empty, starting with `-`, containing whitespace, or `help`.
pub fn build(spec: &SpecTree) -> Result<Command, ConfigError> {
    let base = Command::new("run")
        .bin_name("appy run")
        .about("Options derived from the specification's cmdArg names")
        .disable_version_flag(true);

    spec.cmd_arg_names().into_iter().try_fold(base, |command, name| {
        check_option_name(&name)?;
        Ok(command.arg(
            Arg::new(name.clone())
                .long(name)
                .value_name("VALUE")
                .action(ArgAction::Append),
        ))
    })
}

fn check_option_name(name: &str) -> Result<(), ConfigError> {
    let problem = if name.is_empty() {
        "is empty"
    } else if name.starts_with('-') {
        "starts with '-'"
    } else if name.contains(char::is_whitespace) {
        "contains whitespace"
    } else if name == "help" {
        "is reserved for --help"
    } else {
        return Ok(());
    };
    Err(ConfigError::InvalidSpec(format!("cmdArg name '{name}' {problem}")))
}
