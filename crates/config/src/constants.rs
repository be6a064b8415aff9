//! Centralized constants for the appy workspace.
//!
//! Leaf-source key names are shared between specification trees, loaders,
//! and hosts that derive command-line options from a specification.

// =============================================================================
// Leaf Specification Keys
// =============================================================================

/// Key holding the literal consumed by the default-value loader.
pub const DEFAULT_KEY: &str = "default";

/// Key naming the environment variable consumed by the env loader.
pub const ENV_KEY: &str = "env";

/// Key naming the command-line argument consumed by the cmd-args loader.
pub const CMD_ARG_KEY: &str = "cmdArg";

/// Key naming the dotenv entry consumed by the dotenv file loader.
pub const DOTENV_KEY: &str = "dotenv";

/// Reserved key that forces a mapping to be read as a leaf specification.
///
/// Without it, a mapping is a leaf only when none of its immediate children
/// is itself a (non-array) mapping.
pub const LEAF_MARKER: &str = "$leaf";

// =============================================================================
// Environment Gates
// =============================================================================

/// When set to `1` or `true`, dotenv file loaders read nothing.
pub const DOTENV_DISABLED_VAR: &str = "DOTENV_DISABLED";
