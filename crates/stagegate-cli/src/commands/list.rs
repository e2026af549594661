// Rust guideline compliant 2026-10-15

//! Implementation of the `sgate list` command.

use crate::OutputFormatter;
use anyhow::Result;
use stagegate_app::{list_items, parse_gate, parse_pod, unix_timestamp, ListOptions};
use std::path::Path;

/// Lists items with optional filters.
///
/// # Arguments
///
/// * `gate` - Only items in this gate
/// * `pod` - Only items owned by this pod
/// * `live` - Only items in an active gate
/// * `overdue` - Only items past their review date
/// * `author` - Only items by this author
/// * `sort` - Sort field
///
/// # Errors
///
/// Returns an error if a filter value is invalid or the items file cannot be
/// read.
#[allow(clippy::too_many_arguments)]
pub fn execute(
    repo: Option<&Path>,
    gate: Option<String>,
    pod: Option<String>,
    live: bool,
    overdue: bool,
    author: Option<String>,
    sort: Option<String>,
    formatter: &dyn OutputFormatter,
) -> Result<()> {
    let workspace = super::open_workspace(repo)?;

    let options = ListOptions {
        gate: gate.as_deref().map(parse_gate).transpose()?,
        pod: pod.as_deref().map(parse_pod).transpose()?,
        live_only: live,
        author,
        overdue_at: overdue.then(unix_timestamp),
        sort,
    };

    let items = list_items(workspace.load_items()?, &options);
    println!("{}", formatter.format_list(&items));
    Ok(())
}
