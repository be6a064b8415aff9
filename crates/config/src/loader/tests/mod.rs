//! Tests for the loader variants.
//!
//! Responsibilities:
//! - Test each variant's leaf policy through `load_values`.
//! - Test specification-tree and file-tree recursion.
//! - Test file error suppression and dotenv isolation.
//!
//! Invariants:
//! - Tests use `serial_test` to prevent environment variable pollution.
//! - Tests use `global_test_lock()` for additional synchronization.
//! - Temporary directories are cleaned up automatically via `tempfile`.

use serde_json::Value;
use std::sync::Mutex;

use crate::loader::ValueTree;

pub mod dotenv_tests;
pub mod file_tests;

/// Returns the global test lock for environment variable isolation.
pub fn env_lock() -> &'static Mutex<()> {
    crate::test_util::global_test_lock()
}

/// Unwrap a `json!` object literal into a value tree.
pub fn tree(value: Value) -> ValueTree {
    match value {
        Value::Object(map) => map,
        other => panic!("expected an object, got {other}"),
    }
}
