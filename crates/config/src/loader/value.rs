//! Leaf policies of the built-in value loaders.

use serde_json::Value;

/// The default literal is the value; the current value is ignored.
pub(super) fn map_default(candidate: Option<&Value>) -> Option<Value> {
    candidate.cloned()
}

/// Use the environment variable named by `candidate` if it is set.
///
/// Variables are read at call time, so repeated resolutions observe live
/// environment changes. Non-string candidates and names the platform cannot
/// represent leave the current value untouched.
pub(super) fn map_env(candidate: Option<&Value>, current: Option<Value>) -> Option<Value> {
    let Some(name) = candidate.and_then(Value::as_str) else {
        return current;
    };
    if name.is_empty() || name.contains(['=', '\0']) {
        return current;
    }
    match std::env::var_os(name) {
        Some(value) => Some(Value::String(value.to_string_lossy().into_owned())),
        None => current,
    }
}
