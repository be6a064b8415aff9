//! File-backed loaders: JSON, YAML and dotenv.
//!
//! Responsibilities:
//! - Read a file and parse it into a plain nested mapping.
//! - Overlay JSON/YAML documents onto a value tree, driven by the document's
//!   own keys rather than the specification tree.
//! - Parse dotenv files without mutating the process environment.
//! - Apply the suppress-errors policy: swallow read/parse failures and pass
//!   the value tree through unchanged.
//!
//! Invariants:
//! - Files are read fresh on every `load_values` call.
//! - An empty or `null` document is an empty mapping; any other non-mapping
//!   root is malformed.
//! - Dotenv errors never include line contents.

use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::error::ConfigError;
use super::jsonc::strip_jsonc;
use super::{LeafPolicy, ValueTree, walk_spec};
use crate::constants::{DOTENV_DISABLED_VAR, DOTENV_KEY};
use crate::spec::SpecTree;

/// Location of a file-backed source plus its error policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSource {
    path: PathBuf,
    suppress_errors: bool,
}

impl FileSource {
    /// Create a source that fails when the file is missing or malformed.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            suppress_errors: false,
        }
    }

    /// Treat a missing or malformed file as empty instead of failing.
    pub fn suppress_errors(mut self, suppress: bool) -> Self {
        self.suppress_errors = suppress;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn suppresses_errors(&self) -> bool {
        self.suppress_errors
    }

    /// Run `load`, swallowing its error when this source suppresses errors.
    fn guard<T>(
        &self,
        load: impl FnOnce() -> Result<T, ConfigError>,
    ) -> Result<Option<T>, ConfigError> {
        match load() {
            Ok(loaded) => Ok(Some(loaded)),
            Err(e) if self.suppress_errors => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Ignoring unavailable config file"
                );
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

/// Structured document formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    /// JSON with comments and trailing commas tolerated.
    Json,
    Yaml,
}

impl FileFormat {
    /// Parse document text. Blank text parses as `null`.
    pub fn parse(self, text: &str) -> Result<Value, String> {
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        match self {
            FileFormat::Json => serde_json::from_str(&strip_jsonc(text)).map_err(|e| e.to_string()),
            FileFormat::Yaml => serde_yaml::from_str(text).map_err(|e| e.to_string()),
        }
    }
}

/// Read and parse a structured document.
pub(crate) fn read_document(path: &Path, format: FileFormat) -> Result<Value, ConfigError> {
    tracing::debug!(path = %path.display(), ?format, "Reading config file");
    let text = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
        path: path.to_path_buf(),
        kind: e.kind(),
    })?;
    format.parse(&text).map_err(|message| ConfigError::FileParse {
        path: path.to_path_buf(),
        message,
    })
}

/// Read a structured document whose root must be a mapping.
fn read_mapping(path: &Path, format: FileFormat) -> Result<Map<String, Value>, ConfigError> {
    match read_document(path, format)? {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Map::new()),
        _ => Err(ConfigError::FileParse {
            path: path.to_path_buf(),
            message: "top-level value must be a mapping".to_string(),
        }),
    }
}

/// Overlay a structured file onto `values`.
pub(crate) fn load_document(
    source: &FileSource,
    format: FileFormat,
    mut values: ValueTree,
) -> Result<ValueTree, ConfigError> {
    if let Some(document) = source.guard(|| read_mapping(&source.path, format))? {
        walk_file(&document, &mut values);
    }
    Ok(values)
}

/// Merge `file` into `values` key by key.
///
/// Nested mappings recurse (replacing any non-mapping value already there);
/// everything else is a leaf whose file value wins.
fn walk_file(file: &Map<String, Value>, values: &mut ValueTree) {
    for (key, file_value) in file {
        match file_value {
            Value::Object(file_branch) => {
                let slot = values
                    .entry(key.clone())
                    .or_insert_with(|| Value::Object(Map::new()));
                if !slot.is_object() {
                    *slot = Value::Object(Map::new());
                }
                if let Value::Object(branch) = slot {
                    walk_file(file_branch, branch);
                }
            }
            leaf => {
                values.insert(key.clone(), leaf.clone());
            }
        }
    }
}

/// Check if dotenv loading is disabled via environment variable.
fn dotenv_disabled() -> bool {
    matches!(
        std::env::var(DOTENV_DISABLED_VAR).ok().as_deref(),
        Some("true") | Some("1")
    )
}

/// Parse a dotenv file into its entries without touching the environment.
pub(crate) fn read_dotenv(path: &Path) -> Result<BTreeMap<String, String>, ConfigError> {
    tracing::debug!(path = %path.display(), "Reading dotenv file");
    let map_err = |err: dotenvy::Error| match err {
        dotenvy::Error::LineParse(_, error_index) => ConfigError::DotenvParse {
            path: path.to_path_buf(),
            error_index,
        },
        dotenvy::Error::Io(io_err) => ConfigError::FileRead {
            path: path.to_path_buf(),
            kind: io_err.kind(),
        },
        _ => ConfigError::FileParse {
            path: path.to_path_buf(),
            message: "unrecognized dotenv content".to_string(),
        },
    };

    let mut entries = BTreeMap::new();
    for item in dotenvy::from_path_iter(path).map_err(map_err)? {
        let (key, value) = item.map_err(map_err)?;
        entries.insert(key, value);
    }
    Ok(entries)
}

/// Entries of one dotenv file, consumed through the `dotenv` leaf key.
#[derive(Debug)]
pub(crate) struct DotenvEntries(pub(crate) BTreeMap<String, String>);

impl DotenvEntries {
    pub(crate) fn load(source: &FileSource) -> Result<Self, ConfigError> {
        if dotenv_disabled() {
            tracing::debug!(path = %source.path.display(), "Dotenv loading disabled");
            return Ok(Self(BTreeMap::new()));
        }
        let entries = source.guard(|| read_dotenv(&source.path))?;
        Ok(Self(entries.unwrap_or_default()))
    }
}

impl LeafPolicy for DotenvEntries {
    fn name(&self) -> &str {
        "dotenv"
    }

    fn map_key(&self) -> Option<&str> {
        Some(DOTENV_KEY)
    }

    fn map_value(
        &self,
        candidate: Option<&Value>,
        current: Option<Value>,
    ) -> Result<Option<Value>, ConfigError> {
        let found = candidate
            .and_then(Value::as_str)
            .and_then(|name| self.0.get(name));
        Ok(match found {
            Some(value) => Some(Value::String(value.clone())),
            None => current,
        })
    }
}

/// Overlay a dotenv file onto `values`, walking the specification tree.
pub(crate) fn load_dotenv(
    source: &FileSource,
    spec: &SpecTree,
    mut values: ValueTree,
) -> Result<ValueTree, ConfigError> {
    let entries = DotenvEntries::load(source)?;
    walk_spec(&entries, spec, &mut values)?;
    Ok(values)
}
