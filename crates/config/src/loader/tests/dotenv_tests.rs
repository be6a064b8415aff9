//! Dotenv loader tests.
//!
//! Responsibilities:
//! - Test lookup of `dotenv` names without touching the process environment.
//! - Test that parse errors never leak line contents.
//! - Test the `DOTENV_DISABLED` gate.

use serde_json::json;
use serial_test::serial;
use std::fs;
use tempfile::TempDir;

use super::{env_lock, tree};
use crate::loader::{ConfigError, FileSource, Loader, ValueTree};
use crate::spec::{LeafSpec, SpecTree};

fn spec() -> SpecTree {
    SpecTree::new()
        .leaf(
            "key",
            LeafSpec::new().default_value("fallback").dotenv("APPY_API_KEY"),
        )
        .branch(
            "db",
            SpecTree::new().leaf("password", LeafSpec::new().dotenv("APPY_DB_PASSWORD")),
        )
}

fn write(dir: &TempDir, contents: &str) -> FileSource {
    let path = dir.path().join(".env");
    fs::write(&path, contents).unwrap();
    FileSource::new(path)
}

#[test]
#[serial]
fn test_dotenv_entries_fill_matching_leaves() {
    let _lock = env_lock().lock().unwrap();
    let dir = TempDir::new().unwrap();
    let source = write(&dir, "APPY_API_KEY=abc123\nAPPY_DB_PASSWORD=\"p w\"\n");

    temp_env::with_vars_unset(["DOTENV_DISABLED", "APPY_API_KEY"], || {
        let values = Loader::DotenvFile(source)
            .load_values(&spec(), tree(json!({ "key": "fallback" })))
            .unwrap();
        assert_eq!(
            values,
            tree(json!({ "key": "abc123", "db": { "password": "p w" } }))
        );
        // The process environment is untouched.
        assert!(std::env::var("APPY_API_KEY").is_err());
    });
}

#[test]
#[serial]
fn test_dotenv_missing_entry_keeps_current_value() {
    let _lock = env_lock().lock().unwrap();
    let dir = TempDir::new().unwrap();
    let source = write(&dir, "OTHER=1\n");

    temp_env::with_var_unset("DOTENV_DISABLED", || {
        let values = Loader::DotenvFile(source)
            .load_values(&spec(), tree(json!({ "key": "fallback" })))
            .unwrap();
        assert_eq!(values, tree(json!({ "key": "fallback", "db": {} })));
    });
}

#[test]
#[serial]
fn test_dotenv_parse_error_hides_line_contents() {
    let _lock = env_lock().lock().unwrap();
    let dir = TempDir::new().unwrap();
    let source = write(&dir, "APPY_API_KEY=ok\nbad line with super-secret-value\n");

    temp_env::with_var_unset("DOTENV_DISABLED", || {
        let err = Loader::DotenvFile(source)
            .load_values(&spec(), ValueTree::new())
            .unwrap_err();
        assert!(matches!(err, ConfigError::DotenvParse { .. }));
        assert!(!err.to_string().contains("super-secret-value"));
    });
}

#[test]
#[serial]
fn test_dotenv_missing_file_respects_suppression() {
    let _lock = env_lock().lock().unwrap();
    let dir = TempDir::new().unwrap();
    let missing = FileSource::new(dir.path().join(".env.missing"));

    temp_env::with_var_unset("DOTENV_DISABLED", || {
        let err = Loader::DotenvFile(missing.clone())
            .load_values(&spec(), ValueTree::new())
            .unwrap_err();
        assert!(matches!(err, ConfigError::FileRead { .. }));

        let values = Loader::DotenvFile(missing.suppress_errors(true))
            .load_values(&spec(), tree(json!({ "key": "fallback" })))
            .unwrap();
        assert_eq!(values.get("key"), Some(&json!("fallback")));
    });
}

#[test]
#[serial]
fn test_dotenv_disabled_skips_file() {
    let _lock = env_lock().lock().unwrap();
    let dir = TempDir::new().unwrap();
    let source = write(&dir, "APPY_API_KEY=from-file\n");

    for flag in ["1", "true"] {
        temp_env::with_var("DOTENV_DISABLED", Some(flag), || {
            let values = Loader::DotenvFile(source.clone())
                .load_values(&spec(), tree(json!({ "key": "fallback" })))
                .unwrap();
            assert_eq!(values.get("key"), Some(&json!("fallback")));
        });
    }
}
