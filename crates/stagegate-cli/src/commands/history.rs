// Rust guideline compliant 2026-10-15

//! Implementation of the `sgate history` command.

use crate::OutputFormatter;
use anyhow::Result;
use std::path::Path;

/// Prints every recorded transition attempt and review for an item.
///
/// # Errors
///
/// Returns an error if the item cannot be resolved or a file cannot be read.
pub fn execute(repo: Option<&Path>, id: String, formatter: &dyn OutputFormatter) -> Result<()> {
    let workspace = super::open_workspace(repo)?;
    let records = workspace.history(&id)?;
    println!("{}", formatter.format_history(&records));
    Ok(())
}
