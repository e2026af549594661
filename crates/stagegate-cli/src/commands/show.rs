// Rust guideline compliant 2026-10-15

//! Implementation of the `sgate show` command.

use crate::OutputFormatter;
use anyhow::Result;
use std::path::Path;

/// Shows one item by full or partial ID.
///
/// # Errors
///
/// Returns an error if the repository is not initialized or the ID matches
/// no item or several items.
pub fn execute(repo: Option<&Path>, id: String, formatter: &dyn OutputFormatter) -> Result<()> {
    let workspace = super::open_workspace(repo)?;
    let item = workspace.find(&id)?;
    println!("{}", formatter.format_item(&item));
    Ok(())
}
