//! Error types for configuration resolution.
//!
//! Responsibilities:
//! - Define error variants for every resolution failure.
//! - Classify each variant into the contract-violation / source-unavailable /
//!   source-malformed / not-implemented taxonomy that hosts map to exit codes.
//!
//! Does NOT handle:
//! - Recovery. Suppression of file errors is decided by the file loaders.
//!
//! Invariants:
//! - File errors carry the offending path.
//! - Dotenv errors NEVER include raw .env line contents to prevent secret leakage.

use std::io::ErrorKind;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while resolving configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Unknown loader '{0}'")]
    UnknownLoader(String),

    #[error("Invalid loader descriptor '{descriptor}': {message}")]
    InvalidLoader { descriptor: String, message: String },

    #[error("Invalid specification tree: {0}")]
    InvalidSpec(String),

    #[error("Command hook fired before resolve_config() retained a specification tree")]
    NotResolved,

    #[error("No cmd-args loader was found in the retained loader sequence")]
    NoCommandLoader,

    #[error("Resolver is already in use by a running command hook")]
    ResolverBusy,

    #[error("Failed to read config file at {path}: {kind}")]
    FileRead { path: PathBuf, kind: ErrorKind },

    #[error("Failed to parse config file at {path}: {message}")]
    FileParse { path: PathBuf, message: String },

    /// Failed to parse a `.env` file due to invalid syntax.
    ///
    /// SAFETY: This error only includes the index of the parse failure,
    /// NOT the offending line content, to prevent leaking secrets.
    #[error(
        "Failed to parse .env file at {path} (position {error_index}). Hint: set DOTENV_DISABLED=1 to skip .env loading"
    )]
    DotenvParse { path: PathBuf, error_index: usize },

    #[error("{0} loader is not implemented")]
    NotImplemented(String),

    #[error(transparent)]
    CommandLine(#[from] clap::Error),

    #[error("Failed to extract resolved values: {0}")]
    Extract(String),
}

/// Broad failure category of a [`ConfigError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// The host wired the resolver incorrectly. Never retried.
    ContractViolation,
    /// A file-backed source is missing or unreadable.
    SourceUnavailable,
    /// A source was read but its content is malformed.
    SourceMalformed,
    /// A loader capability without a concrete leaf policy was invoked.
    NotImplemented,
}

impl ConfigError {
    /// Classify this error.
    pub fn class(&self) -> ErrorClass {
        match self {
            ConfigError::UnknownLoader(_)
            | ConfigError::InvalidLoader { .. }
            | ConfigError::InvalidSpec(_)
            | ConfigError::NotResolved
            | ConfigError::NoCommandLoader
            | ConfigError::ResolverBusy => ErrorClass::ContractViolation,
            ConfigError::FileRead { .. } => ErrorClass::SourceUnavailable,
            ConfigError::FileParse { .. }
            | ConfigError::DotenvParse { .. }
            | ConfigError::CommandLine(_)
            | ConfigError::Extract(_) => ErrorClass::SourceMalformed,
            ConfigError::NotImplemented(_) => ErrorClass::NotImplemented,
        }
    }
}
