//! Output formatters for resolved value trees.

use anyhow::Result;
use appy_config::ValueTree;

use crate::args::OutputFormat;

/// Render `values` in the requested format, newline-terminated.
pub fn format_values(values: &ValueTree, format: OutputFormat) -> Result<String> {
    let mut rendered = match format {
        OutputFormat::Json => serde_json::to_string_pretty(values)?,
        OutputFormat::Yaml => serde_yaml::to_string(values)?,
    };
    if !rendered.ends_with('\n') {
        rendered.push('\n');
    }
    Ok(rendered)
}
