// Rust guideline compliant 2026-10-15

//! Implementation of the `sgate metrics` command.

use crate::OutputFormatter;
use anyhow::Result;
use stagegate_app::unix_timestamp;
use std::path::Path;

/// Prints item counts and overdue reviews per gate.
///
/// # Errors
///
/// Returns an error if the items file cannot be read.
pub fn execute(repo: Option<&Path>, formatter: &dyn OutputFormatter) -> Result<()> {
    let workspace = super::open_workspace(repo)?;
    let metrics = workspace.metrics(unix_timestamp())?;
    println!("{}", formatter.format_metrics(&metrics));
    Ok(())
}
