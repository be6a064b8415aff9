//! Specification trees: where each configuration value may come from.
//!
//! Responsibilities:
//! - Represent a specification tree as explicit branch and leaf nodes.
//! - Classify generic JSON/YAML documents into branches and leaves once, at
//!   construction, so loaders never re-guess the shape while walking.
//! - Provide a builder API for trees declared in code.
//!
//! Does NOT handle:
//! - Loading values (see the `loader` module).
//!
//! Invariants:
//! - The root of a tree is always a branch.
//! - A mapping carrying the `$leaf` marker is always a keyed leaf.
//! - Any other mapping is a branch iff one of its immediate children is a
//!   non-array mapping; otherwise it is a keyed leaf.

use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::Path;

use crate::constants::{CMD_ARG_KEY, DEFAULT_KEY, DOTENV_KEY, ENV_KEY, LEAF_MARKER};
use crate::loader::ConfigError;
use crate::loader::file::{FileFormat, read_document};

/// A node of a specification tree.
#[derive(Debug, Clone, PartialEq)]
pub enum SpecNode {
    /// A nested specification tree.
    Branch(SpecTree),
    /// A leaf specification naming the sources of one value.
    Leaf(LeafSpec),
}

/// A leaf specification.
#[derive(Debug, Clone, PartialEq)]
pub enum LeafSpec {
    /// Source name to source-specific literal, e.g. `{"default": 8080, "env": "PORT"}`.
    Keyed(BTreeMap<String, Value>),
    /// A bare literal offered as the candidate to every loader.
    ///
    /// Positional arrays collapse to their first element.
    Bare(Value),
}

impl Default for LeafSpec {
    fn default() -> Self {
        Self::new()
    }
}

impl LeafSpec {
    /// Create an empty keyed leaf.
    pub fn new() -> Self {
        LeafSpec::Keyed(BTreeMap::new())
    }

    /// Create a bare leaf.
    pub fn bare(value: impl Into<Value>) -> Self {
        LeafSpec::Bare(value.into())
    }

    /// Set the literal for an arbitrary source key.
    ///
    /// Turns a bare leaf into a keyed one, dropping the bare literal.
    pub fn source(self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let mut sources = match self {
            LeafSpec::Keyed(sources) => sources,
            LeafSpec::Bare(_) => BTreeMap::new(),
        };
        sources.insert(key.into(), value.into());
        LeafSpec::Keyed(sources)
    }

    /// Set the default literal.
    pub fn default_value(self, value: impl Into<Value>) -> Self {
        self.source(DEFAULT_KEY, value)
    }

    /// Set the environment variable name.
    pub fn env(self, name: impl Into<String>) -> Self {
        self.source(ENV_KEY, name.into())
    }

    /// Set the command-line argument name.
    pub fn cmd_arg(self, name: impl Into<String>) -> Self {
        self.source(CMD_ARG_KEY, name.into())
    }

    /// Set the dotenv entry name.
    pub fn dotenv(self, name: impl Into<String>) -> Self {
        self.source(DOTENV_KEY, name.into())
    }

    /// The candidate a loader consuming `map_key` sees at this leaf.
    ///
    /// A keyed leaf without `map_key` (or a loader without a map key) yields
    /// no candidate. Array candidates yield their first element.
    pub fn candidate(&self, map_key: Option<&str>) -> Option<&Value> {
        let raw = match (self, map_key) {
            (LeafSpec::Bare(value), _) => value,
            (LeafSpec::Keyed(sources), Some(key)) => sources.get(key)?,
            (LeafSpec::Keyed(_), None) => return None,
        };
        match raw {
            Value::Array(items) => items.first(),
            other => Some(other),
        }
    }
}

/// A specification tree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpecTree {
    nodes: BTreeMap<String, SpecNode>,
}

impl SpecTree {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a nested tree under `key`.
    pub fn branch(mut self, key: impl Into<String>, tree: SpecTree) -> Self {
        self.insert(key, SpecNode::Branch(tree));
        self
    }

    /// Add a leaf specification under `key`.
    pub fn leaf(mut self, key: impl Into<String>, leaf: LeafSpec) -> Self {
        self.insert(key, SpecNode::Leaf(leaf));
        self
    }

    /// Insert a node, replacing any node previously stored under `key`.
    pub fn insert(&mut self, key: impl Into<String>, node: SpecNode) -> Option<SpecNode> {
        self.nodes.insert(key.into(), node)
    }

    pub fn get(&self, key: &str) -> Option<&SpecNode> {
        self.nodes.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &SpecNode)> {
        self.nodes.iter()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Classify a generic document into a specification tree.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidSpec` if the root is not a mapping.
    pub fn from_value(value: Value) -> Result<Self, ConfigError> {
        match value {
            Value::Object(map) => Ok(Self::from_map(map)),
            other => Err(ConfigError::InvalidSpec(format!(
                "root must be a mapping, got {}",
                type_name(&other)
            ))),
        }
    }

    /// Parse a JSON (comments and trailing commas allowed) specification.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let value = FileFormat::Json
            .parse(text)
            .map_err(ConfigError::InvalidSpec)?;
        Self::from_value(value)
    }

    /// Parse a YAML specification.
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        let value = FileFormat::Yaml
            .parse(text)
            .map_err(ConfigError::InvalidSpec)?;
        Self::from_value(value)
    }

    /// Read a specification file, choosing YAML for `.yaml`/`.yml` and JSON otherwise.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let format = match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml" | "yml") => FileFormat::Yaml,
            _ => FileFormat::Json,
        };
        Self::from_value(read_document(path, format)?)
    }

    /// Every string `cmdArg` literal declared by a keyed leaf, sorted and deduplicated.
    pub fn cmd_arg_names(&self) -> Vec<String> {
        let mut names = Vec::new();
        self.collect_cmd_args(&mut names);
        names.sort();
        names.dedup();
        names
    }

    fn collect_cmd_args(&self, names: &mut Vec<String>) {
        for node in self.nodes.values() {
            match node {
                SpecNode::Branch(tree) => tree.collect_cmd_args(names),
                SpecNode::Leaf(leaf @ LeafSpec::Keyed(_)) => {
                    if let Some(Value::String(name)) = leaf.candidate(Some(CMD_ARG_KEY)) {
                        names.push(name.clone());
                    }
                }
                SpecNode::Leaf(LeafSpec::Bare(_)) => {}
            }
        }
    }

    fn from_map(map: Map<String, Value>) -> Self {
        let nodes = map
            .into_iter()
            .map(|(key, value)| (key, classify(value)))
            .collect();
        Self { nodes }
    }
}

fn classify(value: Value) -> SpecNode {
    match value {
        Value::Object(mut map) => {
            if map.remove(LEAF_MARKER).is_some() || !has_sub_keys(&map) {
                SpecNode::Leaf(LeafSpec::Keyed(map.into_iter().collect()))
            } else {
                SpecNode::Branch(SpecTree::from_map(map))
            }
        }
        other => SpecNode::Leaf(LeafSpec::Bare(other)),
    }
}

/// True if any immediate child is a non-array mapping.
fn has_sub_keys(map: &Map<String, Value>) -> bool {
    map.values().any(Value::is_object)
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "a mapping",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_mapping_with_nested_mapping_is_branch() {
        let tree = SpecTree::from_value(json!({
            "app": {
                "host": { "default": "localhost", "env": "APP_HOST" },
                "port": { "default": 8080 }
            }
        }))
        .unwrap();

        let Some(SpecNode::Branch(app)) = tree.get("app") else {
            panic!("app should be a branch");
        };
        assert!(matches!(app.get("host"), Some(SpecNode::Leaf(LeafSpec::Keyed(_)))));
        assert!(matches!(app.get("port"), Some(SpecNode::Leaf(LeafSpec::Keyed(_)))));
    }

    #[test]
    fn test_scalars_and_arrays_are_bare_leaves() {
        let tree = SpecTree::from_value(json!({
            "name": "appy",
            "positional": ["value", "ENV_NAME"]
        }))
        .unwrap();

        let Some(SpecNode::Leaf(leaf)) = tree.get("positional") else {
            panic!("positional should be a leaf");
        };
        assert_eq!(leaf.candidate(Some("env")), Some(&json!("value")));
        assert!(matches!(tree.get("name"), Some(SpecNode::Leaf(LeafSpec::Bare(_)))));
    }

    #[test]
    fn test_root_without_nested_mappings_is_still_a_branch() {
        let tree = SpecTree::from_value(json!({ "key2": ["value2"] })).unwrap();
        assert_eq!(tree.len(), 1);
        assert!(matches!(tree.get("key2"), Some(SpecNode::Leaf(_))));
    }

    #[test]
    fn test_leaf_marker_keeps_structured_candidates_opaque() {
        let tree = SpecTree::from_value(json!({
            "limits": { "$leaf": true, "default": { "cpu": 2, "memory": "1Gi" } }
        }))
        .unwrap();

        let Some(SpecNode::Leaf(leaf)) = tree.get("limits") else {
            panic!("limits should be a leaf");
        };
        assert_eq!(
            leaf.candidate(Some("default")),
            Some(&json!({ "cpu": 2, "memory": "1Gi" }))
        );
        assert_eq!(leaf.candidate(Some("$leaf")), None);
    }

    #[test]
    fn test_non_mapping_root_is_rejected() {
        let err = SpecTree::from_value(json!(["a", "b"])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidSpec(_)));
    }

    #[test]
    fn test_keyed_leaf_without_map_key_has_no_candidate() {
        let leaf = LeafSpec::new().default_value("D").env("E");
        assert_eq!(leaf.candidate(Some("cmdArg")), None);
        assert_eq!(leaf.candidate(None), None);
        assert_eq!(leaf.candidate(Some("env")), Some(&json!("E")));
    }

    #[test]
    fn test_builder_matches_parsed_tree() {
        let built = SpecTree::new().branch(
            "server",
            SpecTree::new().leaf("port", LeafSpec::new().default_value(8080).cmd_arg("port")),
        );
        let parsed = SpecTree::from_json_str(
            r#"{
                // comments are allowed in specification files
                "server": { "port": { "default": 8080, "cmdArg": "port", }, },
            }"#,
        )
        .unwrap();

        assert_eq!(built, parsed);
    }

    #[test]
    fn test_cmd_arg_names_collects_nested_leaves() {
        let tree = SpecTree::new()
            .leaf("verbose", LeafSpec::new().cmd_arg("verbose"))
            .branch(
                "server",
                SpecTree::new()
                    .leaf("port", LeafSpec::new().cmd_arg("port"))
                    .leaf("host", LeafSpec::new().default_value("localhost")),
            )
            .leaf("bare", LeafSpec::bare("not-an-option"));

        assert_eq!(tree.cmd_arg_names(), vec!["port", "verbose"]);
    }

    #[test]
    fn test_yaml_specification_is_classified_like_json() {
        let tree = SpecTree::from_yaml_str(
            "database:\n  url:\n    default: postgres://localhost\n    env: DATABASE_URL\n",
        )
        .unwrap();

        let Some(SpecNode::Branch(database)) = tree.get("database") else {
            panic!("database should be a branch");
        };
        assert!(matches!(database.get("url"), Some(SpecNode::Leaf(LeafSpec::Keyed(_)))));
    }
}
