// Rust guideline compliant 2026-10-15

//! Implementation of the `sgate wip` subcommands.

use crate::output_mode::{is_json_output, print_json};
use crate::OutputFormatter;
use anyhow::Result;
use clap::Subcommand;
use stagegate_app::{parse_gate, parse_pod, scope_from_parts};
use stagegate_core::{LimitFilter, ScopeKind};
use std::path::Path;

/// WIP limit actions.
#[derive(Debug, Subcommand)]
pub enum WipAction {
    /// Show counters and limits
    List {
        /// Only scopes of this gate
        #[arg(long)]
        gate: Option<String>,

        /// Only per_pod scopes of this pod
        #[arg(long)]
        pod: Option<String>,

        /// Only scopes of this kind (per_pod, cross_pod, portfolio)
        #[arg(long, value_parser = ["per_pod", "cross_pod", "portfolio"])]
        kind: Option<String>,

        /// Only scopes at or over their limit
        #[arg(long)]
        exceeded: bool,
    },

    /// Change a limit (no selectors: portfolio; --gate: cross_pod; --gate and --pod: per_pod)
    Set {
        /// New limit
        limit: u32,

        /// Gate of the scope
        #[arg(long)]
        gate: Option<String>,

        /// Pod of the scope
        #[arg(long)]
        pod: Option<String>,
    },

    /// Recompute counters from stored items and fix drift
    Recount,
}

/// Runs a WIP subcommand.
///
/// # Errors
///
/// Returns an error if a selector is invalid or the limits file cannot be
/// read or written.
pub fn execute(
    repo: Option<&Path>,
    action: WipAction,
    formatter: &dyn OutputFormatter,
) -> Result<()> {
    let workspace = super::open_workspace(repo)?;

    match action {
        WipAction::List {
            gate,
            pod,
            kind,
            exceeded,
        } => {
            let filter = LimitFilter {
                kind: kind.as_deref().map(parse_kind),
                gate: gate.as_deref().map(parse_gate).transpose()?,
                pod: pod.as_deref().map(parse_pod).transpose()?,
                exceeded_only: exceeded,
            };
            let rows = workspace.utilization(&filter)?;
            println!("{}", formatter.format_utilization(&rows));
        }
        WipAction::Set { limit, gate, pod } => {
            let scope = scope_from_parts(
                gate.as_deref().map(parse_gate).transpose()?,
                pod.as_deref().map(parse_pod).transpose()?,
            )?;
            let record = workspace.set_limit(&scope, limit)?;
            if is_json_output() {
                return print_json(&record);
            }
            println!("✓ {} limit set to {} (current {})", scope, record.limit, record.current);
        }
        WipAction::Recount => {
            let drifts = workspace.recount()?;
            if is_json_output() {
                return print_json(&drifts);
            }
            if drifts.is_empty() {
                println!("✓ All counters match stored items");
            }
            for drift in &drifts {
                println!(
                    "✓ {}: {} → {}",
                    drift.scope, drift.recorded, drift.expected
                );
            }
        }
    }
    Ok(())
}

fn parse_kind(value: &str) -> ScopeKind {
    match value {
        "per_pod" => ScopeKind::PerPod,
        "cross_pod" => ScopeKind::CrossPod,
        _ => ScopeKind::Portfolio,
    }
}
