//! Access helpers for resolved value trees.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::loader::{ConfigError, ValueTree};

/// Look up a dot-separated path such as `"server.port"`.
pub fn get_path<'a>(values: &'a ValueTree, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let mut current = values.get(segments.next()?)?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

/// Deserialize a resolved tree into an application type.
///
/// Environment and command-line sources yield strings, so target fields fed
/// by them should accept strings.
pub fn extract<T: DeserializeOwned>(values: &ValueTree) -> Result<T, ConfigError> {
    serde_json::from_value(Value::Object(values.clone()))
        .map_err(|e| ConfigError::Extract(e.to_string()))
}
