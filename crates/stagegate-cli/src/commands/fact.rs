// Rust guideline compliant 2026-10-15

//! Implementation of the `sgate fact` command.
//!
//! Records a reviewer fact on an item. Criteria are decided from facts, so
//! this is how evidence for a gate review is captured.

use crate::output_mode::{is_json_output, print_json};
use crate::OutputFormatter;
use anyhow::Result;
use std::path::Path;

/// Parses a fact value: valid JSON is kept as-is, anything else is a string.
pub fn parse_value(raw: &str) -> serde_json::Value {
    serde_json::from_str(raw).unwrap_or_else(|_| serde_json::Value::String(raw.to_string()))
}

/// Parses a `key=value` assignment.
///
/// # Errors
///
/// Returns an error if there is no `=` or the key is blank.
pub fn parse_assignment(raw: &str) -> Result<(String, serde_json::Value)> {
    let Some((key, value)) = raw.split_once('=') else {
        anyhow::bail!("Fact must be written as key=value, got '{}'", raw);
    };
    if key.trim().is_empty() {
        anyhow::bail!("Fact key cannot be empty in '{}'", raw);
    }
    Ok((key.trim().to_string(), parse_value(value)))
}

/// Sets `key` to `value` on the item matching `id`.
///
/// # Errors
///
/// Returns an error if the item cannot be resolved or saved.
pub fn execute(
    repo: Option<&Path>,
    id: String,
    key: String,
    value: String,
    formatter: &dyn OutputFormatter,
) -> Result<()> {
    let workspace = super::open_workspace(repo)?;
    let item = workspace.set_fact(&id, &key, parse_value(&value))?;

    if is_json_output() {
        return print_json(&item);
    }
    println!("✓ Recorded {} on {}", key.trim(), item.id);
    println!("{}", formatter.format_item(&item));
    Ok(())
}
