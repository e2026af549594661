// Rust guideline compliant 2026-10-15

//! Implementation of the `sgate reject` command.
//!
//! Records a failed gate review. The item stays where it is.

use crate::output_mode::{is_json_output, print_json};
use anyhow::Result;
use std::path::Path;

/// Records a review rejection with a reason.
///
/// # Errors
///
/// Returns an error if the reason is blank, the item cannot be resolved, or
/// the record cannot be written.
pub fn execute(
    repo: Option<&Path>,
    id: String,
    reason: String,
    actor: Option<String>,
) -> Result<()> {
    let workspace = super::open_workspace(repo)?;
    let actor = actor.unwrap_or_else(super::default_actor);
    let record = workspace.reject(&id, &reason, &actor)?;

    if is_json_output() {
        return print_json(&record);
    }
    println!("✓ Review rejected for {} at {}", record.item_id, record.from);
    println!("  Reason: {}", reason.trim());
    Ok(())
}
