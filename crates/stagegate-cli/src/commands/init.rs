// Rust guideline compliant 2026-10-15

//! Implementation of the `sgate init` command.
//!
//! Creates the `.stagegate` directory with default configuration, empty item
//! and transition files, and every WIP scope at its default limit.

use crate::output_mode::{is_json_output, print_json};
use anyhow::Result;
use stagegate_app::RepoContext;
use std::path::Path;

/// Initializes a new Stagegate repository.
///
/// # Errors
///
/// Returns an error if the repository already exists or a file cannot be
/// written.
pub fn execute(repo: Option<&Path>) -> Result<()> {
    let context = RepoContext::init(repo)?;

    if is_json_output() {
        return print_json(serde_json::json!({
            "path": context.stagegate_dir(),
        }));
    }

    println!(
        "✓ Stagegate repository initialized at {}",
        context.stagegate_dir().display()
    );
    println!("  - Created ideas.jsonl and transitions.jsonl");
    println!("  - Created config.toml");
    println!("  - Initialized WIP limits in limits.jsonl");
    Ok(())
}
