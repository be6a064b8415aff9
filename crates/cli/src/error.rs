//! CLI exit codes for scripting and automation.
//!
//! Responsibilities:
//! - Define structured exit codes that scripts can use to distinguish error types.
//! - Map `ConfigError` classes to exit codes.
//!
//! Does NOT handle:
//! - Error message formatting (handled by anyhow Display).
//! - clap help and usage output (clap exits on its own for those).
//!
//! Invariants:
//! - Exit codes 1-5 are reserved for specific error categories.

use appy_config::{ConfigError, ErrorClass};

/// Structured exit codes for appy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    /// Success - command completed successfully.
    Success = 0,

    /// General error - unhandled or generic failure.
    GeneralError = 1,

    /// Contract violation - unknown loader, bad descriptor, invalid
    /// specification, or resolver misuse.
    ///
    /// Scripts should fix the invocation and not retry.
    ContractViolation = 2,

    /// Source unavailable - a config file is missing or unreadable.
    SourceUnavailable = 3,

    /// Source malformed - a config file or command line could not be parsed.
    SourceMalformed = 4,

    /// Not implemented - a loader without a concrete policy was requested.
    NotImplemented = 5,
}

impl ExitCode {
    /// Convert the exit code to an i32 for use with std::process::exit().
    pub const fn as_i32(self) -> i32 {
        self as u8 as i32
    }
}

impl From<ErrorClass> for ExitCode {
    fn from(class: ErrorClass) -> Self {
        match class {
            ErrorClass::ContractViolation => ExitCode::ContractViolation,
            ErrorClass::SourceUnavailable => ExitCode::SourceUnavailable,
            ErrorClass::SourceMalformed => ExitCode::SourceMalformed,
            ErrorClass::NotImplemented => ExitCode::NotImplemented,
        }
    }
}

/// Extension trait for anyhow::Error to extract exit codes.
pub trait ExitCodeExt {
    /// Returns ExitCode::GeneralError if no `ConfigError` is in the chain.
    fn exit_code(&self) -> ExitCode;
}

impl ExitCodeExt for anyhow::Error {
    fn exit_code(&self) -> ExitCode {
        self.chain()
            .find_map(|cause| cause.downcast_ref::<ConfigError>())
            .map(|err| ExitCode::from(err.class()))
            .unwrap_or(ExitCode::GeneralError)
    }
}
