// Rust guideline compliant 2026-10-15

//! Listing and filtering helpers for items.

use crate::error::{AppError, Result};
use rayon::prelude::*;
use stagegate_core::{Gate, Item, Pod};

/// Item count above which filtering runs on the rayon pool.
pub(crate) const PARALLEL_THRESHOLD: usize = 1_000;

/// List options for filtering and sorting items.
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    /// Filter by gate.
    pub gate: Option<Gate>,
    /// Filter by owning pod.
    pub pod: Option<Pod>,
    /// Only items in an active gate.
    pub live_only: bool,
    /// Filter by author.
    pub author: Option<String>,
    /// Only items whose review date is before this timestamp.
    pub overdue_at: Option<i64>,
    /// Sort field override.
    pub sort: Option<String>,
}

/// Parses a gate name, accepting any letter case.
///
/// # Errors
///
/// Returns an error if the name is not a gate.
pub fn parse_gate(value: &str) -> Result<Gate> {
    value
        .parse()
        .map_err(|_| AppError::InvalidInput(format!("Invalid gate: {}", value)))
}

/// Parses a pod name, accepting any letter case and `-` for `_`.
///
/// # Errors
///
/// Returns an error if the name is not a pod.
pub fn parse_pod(value: &str) -> Result<Pod> {
    value
        .parse()
        .map_err(|_| AppError::InvalidInput(format!("Invalid pod: {}", value)))
}

/// Filters and sorts items based on `ListOptions`.
///
/// Without a sort field, items come back in gate order, most recently
/// updated first within a gate.
pub fn list_items(items: Vec<Item>, options: &ListOptions) -> Vec<Item> {
    let mut items = apply_filters(items, options);

    match options.sort.as_deref() {
        Some(field) => sort_items(&mut items, field),
        None => items.sort_by(|a, b| {
            a.gate
                .cmp(&b.gate)
                .then_with(|| b.updated_at.cmp(&a.updated_at))
        }),
    }

    items
}

fn apply_filters(items: Vec<Item>, options: &ListOptions) -> Vec<Item> {
    let predicate = |item: &Item| {
        if let Some(gate) = options.gate {
            if item.gate != gate {
                return false;
            }
        }

        if let Some(pod) = options.pod {
            if item.pod != Some(pod) {
                return false;
            }
        }

        if options.live_only && !item.is_live() {
            return false;
        }

        if let Some(ref author) = options.author {
            if item.author != *author {
                return false;
            }
        }

        if let Some(now) = options.overdue_at {
            if !item.next_review.is_some_and(|review| review < now) {
                return false;
            }
        }

        true
    };

    if items.len() >= PARALLEL_THRESHOLD {
        items.into_par_iter().filter(|item| predicate(item)).collect()
    } else {
        items.into_iter().filter(predicate).collect()
    }
}

fn sort_items(items: &mut [Item], field: &str) {
    match field {
        "id" => items.sort_by(|a, b| a.id.cmp(&b.id)),
        "title" => items.sort_by(|a, b| a.title.cmp(&b.title)),
        "gate" => items.sort_by(|a, b| a.gate.cmp(&b.gate)),
        "pod" => items.sort_by(|a, b| a.pod.cmp(&b.pod)),
        "author" => items.sort_by(|a, b| a.author.cmp(&b.author)),
        "created_at" => items.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
        "updated_at" => items.sort_by(|a, b| a.updated_at.cmp(&b.updated_at)),
        "next_review" => items.sort_by_key(|item| item.next_review.unwrap_or(i64::MAX)),
        _ => items.sort_by(|a, b| b.updated_at.cmp(&a.updated_at)),
    }
}
