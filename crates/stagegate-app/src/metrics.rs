// Rust guideline compliant 2026-10-15

//! Per-gate item counts for reporting.

use serde::Serialize;
use stagegate_core::{Gate, Item};
use std::collections::BTreeMap;

/// Item count for one gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GateMetric {
    /// Gate being reported.
    pub gate: Gate,
    /// Items currently in the gate.
    pub count: usize,
    /// Items whose review date has passed.
    pub overdue: usize,
}

/// Counts items per gate as of `now`.
///
/// KILLED items are not reported. Every other gate appears, in gate order,
/// even when empty.
pub fn gate_metrics(items: &[Item], now: i64) -> Vec<GateMetric> {
    let mut metrics: BTreeMap<Gate, GateMetric> = Gate::ALL
        .into_iter()
        .filter(|gate| *gate != Gate::Killed)
        .map(|gate| {
            (
                gate,
                GateMetric {
                    gate,
                    count: 0,
                    overdue: 0,
                },
            )
        })
        .collect();

    for item in items {
        if let Some(metric) = metrics.get_mut(&item.gate) {
            metric.count += 1;
            if item.next_review.is_some_and(|review| review < now) {
                metric.overdue += 1;
            }
        }
    }

    metrics.into_values().collect()
}
