// Rust guideline compliant 2026-10-15

//! Implementation of the `sgate assign` command.

use crate::output_mode::{is_json_output, print_json};
use crate::terminal::print_warning;
use anyhow::Result;
use stagegate_app::parse_pod;
use stagegate_core::PodChange;
use std::path::Path;

/// Moves an item to `pod`, or clears its pod when `pod` is `None`.
///
/// # Returns
///
/// `true` if the item moved, `false` if the new pod's scope was full.
///
/// # Errors
///
/// Returns an error if the pod name is invalid, the item cannot be resolved,
/// or storage fails.
pub fn execute(repo: Option<&Path>, id: String, pod: Option<String>) -> Result<bool> {
    let workspace = super::open_workspace(repo)?;
    let pod = pod.as_deref().map(parse_pod).transpose()?;

    match workspace.assign(&id, pod)? {
        PodChange::Moved(item) => {
            if is_json_output() {
                print_json(&item)?;
            } else {
                let label = item.pod.map_or_else(|| "no pod".to_string(), |p| p.to_string());
                println!("✓ {} now belongs to {}", item.id, label);
            }
            Ok(true)
        }
        PodChange::Blocked(capacity) => {
            if is_json_output() {
                print_json(serde_json::json!({ "blocked": capacity }))?;
            } else {
                print_warning("Pod not changed: WIP limit reached");
                for violation in &capacity.violations {
                    println!("  - {}", violation);
                }
            }
            Ok(false)
        }
    }
}
