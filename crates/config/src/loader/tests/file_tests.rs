//! JSON and YAML file loader tests.
//!
//! Responsibilities:
//! - Test overlay of file values, including keys outside the spec.
//! - Test JSONC tolerance and the suppress-errors policy.
//! - Test malformed and non-mapping documents.

use serde_json::json;
use std::fs;
use tempfile::TempDir;

use super::tree;
use crate::loader::{ConfigError, ErrorClass, FileSource, Loader, ValueTree};
use crate::spec::{LeafSpec, SpecTree};

fn spec() -> SpecTree {
    SpecTree::new()
        .leaf("name", LeafSpec::new().default_value("appy"))
        .branch(
            "server",
            SpecTree::new().leaf("port", LeafSpec::new().default_value(80)),
        )
}

fn write(dir: &TempDir, name: &str, contents: &str) -> FileSource {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    FileSource::new(path)
}

#[test]
fn test_json_file_overlays_nested_values() {
    let dir = TempDir::new().unwrap();
    let source = write(&dir, "config.json", r#"{ "server": { "port": 9090 } }"#);

    let seeded = tree(json!({ "name": "appy", "server": { "port": 80, "host": "0.0.0.0" } }));
    let values = Loader::JsonFile(source).load_values(&spec(), seeded).unwrap();
    assert_eq!(
        values,
        tree(json!({ "name": "appy", "server": { "port": 9090, "host": "0.0.0.0" } }))
    );
}

#[test]
fn test_file_keys_outside_spec_are_added() {
    let dir = TempDir::new().unwrap();
    let source = write(&dir, "config.json", r#"{ "extra": [1, 2], "name": "other" }"#);

    let values = Loader::JsonFile(source)
        .load_values(&spec(), ValueTree::new())
        .unwrap();
    assert_eq!(values, tree(json!({ "extra": [1, 2], "name": "other" })));
}

#[test]
fn test_json_file_tolerates_comments_and_trailing_commas() {
    let dir = TempDir::new().unwrap();
    let source = write(
        &dir,
        "config.json",
        "{\n  // local override\n  \"name\": \"dev\", /* inline */\n  \"tags\": [\"a\", \"b\",],\n}\n",
    );

    let values = Loader::JsonFile(source)
        .load_values(&spec(), ValueTree::new())
        .unwrap();
    assert_eq!(values, tree(json!({ "name": "dev", "tags": ["a", "b"] })));
}

#[test]
fn test_yaml_file_overlays_values() {
    let dir = TempDir::new().unwrap();
    let source = write(&dir, "config.yaml", "name: yaml\nserver:\n  port: 7070\n");

    let values = Loader::YamlFile(source)
        .load_values(&spec(), tree(json!({ "server": "flat" })))
        .unwrap();
    assert_eq!(values, tree(json!({ "name": "yaml", "server": { "port": 7070 } })));
}

#[test]
fn test_empty_document_changes_nothing() {
    let dir = TempDir::new().unwrap();
    let source = write(&dir, "empty.yaml", "");

    let seeded = tree(json!({ "name": "appy" }));
    let values = Loader::YamlFile(source)
        .load_values(&spec(), seeded.clone())
        .unwrap();
    assert_eq!(values, seeded);
}

#[test]
fn test_missing_file_fails_without_suppression() {
    let dir = TempDir::new().unwrap();
    let source = FileSource::new(dir.path().join("missing.json"));

    let err = Loader::JsonFile(source)
        .load_values(&spec(), ValueTree::new())
        .unwrap_err();
    assert!(matches!(err, ConfigError::FileRead { .. }));
    assert_eq!(err.class(), ErrorClass::SourceUnavailable);
}

#[test]
fn test_missing_file_is_ignored_with_suppression() {
    let dir = TempDir::new().unwrap();
    let source = FileSource::new(dir.path().join("missing.json")).suppress_errors(true);

    let seeded = tree(json!({ "name": "kept" }));
    let values = Loader::JsonFile(source)
        .load_values(&spec(), seeded.clone())
        .unwrap();
    assert_eq!(values, seeded);
}

#[test]
fn test_malformed_file_reports_parse_error() {
    let dir = TempDir::new().unwrap();
    let source = write(&dir, "bad.json", "{ not json");

    let err = Loader::JsonFile(source.clone())
        .load_values(&spec(), ValueTree::new())
        .unwrap_err();
    assert!(matches!(err, ConfigError::FileParse { .. }));
    assert_eq!(err.class(), ErrorClass::SourceMalformed);

    let values = Loader::JsonFile(source.suppress_errors(true))
        .load_values(&spec(), ValueTree::new())
        .unwrap();
    assert!(values.is_empty());
}

#[test]
fn test_non_mapping_document_is_malformed() {
    let dir = TempDir::new().unwrap();
    let source = write(&dir, "list.yaml", "- a\n- b\n");

    let err = Loader::YamlFile(source)
        .load_values(&spec(), ValueTree::new())
        .unwrap_err();
    assert!(matches!(err, ConfigError::FileParse { message, .. } if message.contains("mapping")));
}

#[test]
fn test_file_is_reread_on_every_load() {
    let dir = TempDir::new().unwrap();
    let source = write(&dir, "config.json", r#"{ "name": "first" }"#);
    let loader = Loader::JsonFile(source.clone());

    let first = loader.load_values(&spec(), ValueTree::new()).unwrap();
    fs::write(source.path(), r#"{ "name": "second" }"#).unwrap();
    let second = loader.load_values(&spec(), ValueTree::new()).unwrap();

    assert_eq!(first.get("name"), Some(&json!("first")));
    assert_eq!(second.get("name"), Some(&json!("second")));
}
