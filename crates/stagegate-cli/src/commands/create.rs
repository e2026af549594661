// Rust guideline compliant 2026-10-15

//! Implementation of the `sgate create` command.
//!
//! Creates a SPARK item. The item is counted against its WIP scopes before
//! it is stored; a full scope refuses the item.

use crate::output_mode::{is_json_output, print_json};
use crate::terminal::print_warning;
use anyhow::Result;
use stagegate_app::{parse_pod, Admission, NewItem};
use std::collections::BTreeMap;
use std::path::Path;

/// Creates a new item.
///
/// # Arguments
///
/// * `title` - Item title
/// * `pod` - Optional owning pod name
/// * `facts` - `key=value` assignments recorded at creation
/// * `author` - Author (defaults to the current user)
///
/// # Returns
///
/// `true` if the item was admitted, `false` if a WIP scope refused it.
///
/// # Errors
///
/// Returns an error if:
/// - The repository is not initialized
/// - The pod name or a fact is malformed
/// - The item fails validation or cannot be written
pub fn execute(
    repo: Option<&Path>,
    title: String,
    pod: Option<String>,
    facts: Vec<String>,
    author: Option<String>,
) -> Result<bool> {
    let workspace = super::open_workspace(repo)?;

    let pod = pod.as_deref().map(parse_pod).transpose()?;
    let facts = facts
        .iter()
        .map(|raw| super::fact::parse_assignment(raw))
        .collect::<Result<BTreeMap<_, _>>>()?;

    let admission = workspace.create(NewItem {
        title,
        author: author.unwrap_or_else(super::default_actor),
        pod,
        facts,
    })?;

    let admitted = matches!(admission, Admission::Admitted { .. });
    if is_json_output() {
        print_json(&admission)?;
        return Ok(admitted);
    }

    match admission {
        Admission::Admitted { item } => {
            println!("✓ Created item: {}", item.id);
            println!("  Title: {}", item.title);
            println!("  Gate: {}", item.gate);
            if let Some(pod) = item.pod {
                println!("  Pod: {}", pod);
            }
            if !item.facts.is_empty() {
                println!("  Facts: {}", item.facts.len());
            }
        }
        Admission::Refused { capacity } => {
            print_warning("Item not created: WIP limit reached");
            for violation in &capacity.violations {
                println!("  - {}", violation);
            }
        }
    }
    Ok(admitted)
}
