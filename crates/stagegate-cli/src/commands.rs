// Rust guideline compliant 2026-10-15

//! Command implementations for the Stagegate CLI.

pub mod assign;
pub mod create;
pub mod fact;
pub mod history;
pub mod init;
pub mod list;
pub mod metrics;
pub mod promote;
pub mod reject;
pub mod show;
pub mod wip;

use anyhow::Result;
use stagegate_app::{RepoContext, Workspace};
use std::path::Path;

/// Opens the repository at `repo`, or discovers it from the current directory.
///
/// # Errors
///
/// Returns an error if the repository is not initialized or its
/// configuration is invalid.
pub fn open_workspace(repo: Option<&Path>) -> Result<Workspace> {
    let context = RepoContext::discover(repo)?;
    Ok(Workspace::open(context)?)
}

/// Identity used for authorship and transition records when none is given.
pub fn default_actor() -> String {
    std::env::var("STAGEGATE_ACTOR")
        .or_else(|_| std::env::var("USER"))
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string())
}
