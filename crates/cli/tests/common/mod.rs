//! Shared test utilities for appy integration tests.
//!
//! Invariants / Assumptions:
//! - Commands built here never inherit `APPY_SPEC`, `RUST_LOG`, or
//!   `DOTENV_DISABLED` from the host.

use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};

/// Returns a hermetic `appy` command for integration testing.
pub fn appy_cmd() -> Command {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("appy");
    cmd.env_remove("APPY_SPEC")
        .env_remove("RUST_LOG")
        .env_remove("DOTENV_DISABLED")
        .env_remove("APPY_CLI_HOST");
    cmd
}

/// Write `contents` to `name` inside `dir` and return the path.
pub fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

/// A specification exercising defaults, env, cmdArg, and dotenv leaves.
#[allow(dead_code)]
pub const SPEC_JSON: &str = r#"{
    "server": {
        "host": { "default": "localhost", "env": "APPY_CLI_HOST" },
        "port": { "default": 8080, "cmdArg": "port" }
    },
    "api_key": { "dotenv": "APPY_CLI_API_KEY" },
    "tags": { "cmdArg": "tag" }
}"#;
