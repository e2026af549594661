// Rust guideline compliant 2026-10-15

//! Implementation of the `sgate promote` command.
//!
//! Moves an item to a target gate through the transition engine. Every
//! attempt, approved or rejected, is appended to the transition log.

use crate::OutputFormatter;
use anyhow::Result;
use stagegate_app::parse_gate;
use stagegate_core::PromoteOptions;
use std::path::Path;

/// Promotes (or with `dry_run`, previews promoting) an item.
///
/// # Arguments
///
/// * `id` - Item ID (full or partial)
/// * `target` - Target gate name
/// * `override_checks` - Skip entry and exit criteria
/// * `comments` - Reviewer comments stored on the record
/// * `actor` - Reviewer (defaults to the current user)
/// * `dry_run` - Report what would happen without changing anything
///
/// # Returns
///
/// `true` if the promotion was approved (or would pass).
///
/// # Errors
///
/// Returns an error for configuration faults, unknown WIP scopes, storage
/// failures, or an unresolvable ID. Rejections are not errors.
#[allow(clippy::too_many_arguments)]
pub fn execute(
    repo: Option<&Path>,
    id: String,
    target: String,
    override_checks: bool,
    comments: Option<String>,
    actor: Option<String>,
    dry_run: bool,
    formatter: &dyn OutputFormatter,
) -> Result<bool> {
    let workspace = super::open_workspace(repo)?;
    let target = parse_gate(&target)?;

    if dry_run {
        let preview = workspace.preview(&id, target, override_checks)?;
        println!("{}", formatter.format_preview(&preview).trim_end());
        return Ok(preview.would_pass());
    }

    let actor = actor.unwrap_or_else(super::default_actor);
    let options = PromoteOptions {
        override_checks,
        comments,
    };
    let outcome = workspace.promote(&id, target, &actor, &options)?;
    println!("{}", formatter.format_outcome(&outcome).trim_end());
    Ok(outcome.is_approved())
}
