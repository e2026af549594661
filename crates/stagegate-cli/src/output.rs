// Rust guideline compliant 2026-10-15

//! Output formatting for the Stagegate CLI.
//!
//! Each formatter renders items, transition outcomes and WIP reports in one
//! output format (JSON, table, or plain text).

use crate::terminal::{gate_color, paint, wrap_text};
use serde::Serialize;
use serde_json::json;
use stagegate_app::{format_timestamp, GateMetric, SuccessEnvelope};
use stagegate_core::{Item, Preview, PromotionOutcome, TransitionRecord, Utilization};
use tabled::{builder::Builder, settings::Style};
use termcolor::Color;

/// Output formatter trait.
pub trait OutputFormatter {
    /// Formats a single item.
    fn format_item(&self, item: &Item) -> String;

    /// Formats a list of items.
    fn format_list(&self, items: &[Item]) -> String;

    /// Formats an item's transition history.
    fn format_history(&self, records: &[TransitionRecord]) -> String;

    /// Formats the outcome of a promotion.
    fn format_outcome(&self, outcome: &PromotionOutcome) -> String;

    /// Formats a promotion dry run.
    fn format_preview(&self, preview: &Preview) -> String;

    /// Formats WIP utilization rows.
    fn format_utilization(&self, rows: &[Utilization]) -> String;

    /// Formats per-gate metrics.
    fn format_metrics(&self, metrics: &[GateMetric]) -> String;

    /// Formats an error message.
    fn format_error(&self, error: &str) -> String;
}

/// JSON output formatter.
///
/// Every payload is wrapped in the `{"status": "ok", "result": ...}` envelope.
pub struct JsonFormatter;

impl JsonFormatter {
    fn render<T: Serialize>(value: T) -> String {
        SuccessEnvelope::new(value)
            .to_json()
            .unwrap_or_else(|e| json!({ "status": "error", "message": e.to_string() }).to_string())
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_item(&self, item: &Item) -> String {
        Self::render(item)
    }

    fn format_list(&self, items: &[Item]) -> String {
        Self::render(json!({ "items": items, "total": items.len() }))
    }

    fn format_history(&self, records: &[TransitionRecord]) -> String {
        Self::render(json!({ "records": records, "total": records.len() }))
    }

    fn format_outcome(&self, outcome: &PromotionOutcome) -> String {
        Self::render(outcome)
    }

    fn format_preview(&self, preview: &Preview) -> String {
        Self::render(json!({ "preview": preview, "would_pass": preview.would_pass() }))
    }

    fn format_utilization(&self, rows: &[Utilization]) -> String {
        Self::render(rows)
    }

    fn format_metrics(&self, metrics: &[GateMetric]) -> String {
        Self::render(metrics)
    }

    fn format_error(&self, error: &str) -> String {
        json!({ "status": "error", "message": error }).to_string()
    }
}

/// Table output formatter.
///
/// Human-readable tables with optional color.
pub struct TableFormatter {
    use_color: bool,
}

impl TableFormatter {
    /// Creates a new table formatter.
    pub fn new(use_color: bool) -> Self {
        Self { use_color }
    }

    fn gate(&self, gate: stagegate_core::Gate) -> String {
        paint(gate.as_str(), gate_color(gate), true, self.use_color)
    }

    fn table(header: &[&str], rows: Vec<Vec<String>>) -> String {
        let mut builder = Builder::default();
        builder.push_record(header.iter().map(|h| h.to_string()));
        for row in rows {
            builder.push_record(row);
        }
        let mut table = builder.build();
        table.with(Style::modern());
        table.to_string()
    }
}

impl OutputFormatter for TableFormatter {
    fn format_item(&self, item: &Item) -> String {
        let mut output = String::new();
        output.push_str(&format!("ID:          {}\n", item.id));
        output.push_str(&format!("Title:       {}\n", wrap_text(&item.title, 13)));
        output.push_str(&format!("Gate:        {}\n", self.gate(item.gate)));
        output.push_str(&format!("Pod:         {}\n", pod_label(item)));
        output.push_str(&format!("Author:      {}\n", item.author));
        output.push_str(&format!("Created:     {}\n", format_timestamp(item.created_at)));
        output.push_str(&format!("Updated:     {}\n", format_timestamp(item.updated_at)));
        if let Some(review) = item.next_review {
            output.push_str(&format!("Next review: {}\n", format_timestamp(review)));
        }
        if !item.facts.is_empty() {
            output.push_str("Facts:\n");
            for (key, value) in &item.facts {
                output.push_str(&format!("  {} = {}\n", key, value));
            }
        }
        output
    }

    fn format_list(&self, items: &[Item]) -> String {
        if items.is_empty() {
            return "No items found.".to_string();
        }

        let rows = items
            .iter()
            .map(|item| {
                vec![
                    item.id.clone(),
                    self.gate(item.gate),
                    pod_label(item),
                    item.title.clone(),
                    item.next_review.map(format_timestamp).unwrap_or_default(),
                ]
            })
            .collect();
        Self::table(&["ID", "Gate", "Pod", "Title", "Next review"], rows)
    }

    fn format_history(&self, records: &[TransitionRecord]) -> String {
        if records.is_empty() {
            return "No transitions recorded.".to_string();
        }

        let rows = records
            .iter()
            .map(|record| {
                vec![
                    format_timestamp(record.timestamp),
                    format!("{} → {}", self.gate(record.from), self.gate(record.to)),
                    outcome_label(record),
                    record.actor.clone(),
                    record.comments.clone().unwrap_or_default(),
                ]
            })
            .collect();
        Self::table(&["When", "Move", "Outcome", "Actor", "Comments"], rows)
    }

    fn format_outcome(&self, outcome: &PromotionOutcome) -> String {
        match outcome {
            PromotionOutcome::Approved { item, record } => {
                let mut output = format!(
                    "{} {} moved {} → {}\n",
                    paint("✓", Color::Green, true, self.use_color),
                    item.id,
                    self.gate(record.from),
                    self.gate(record.to)
                );
                if record.overridden {
                    output.push_str("  Criteria overridden\n");
                }
                if let Some(review) = item.next_review {
                    output.push_str(&format!("  Next review: {}\n", format_timestamp(review)));
                }
                output
            }
            PromotionOutcome::Rejected(rejection) => {
                let mut output = format!(
                    "{} {} → {} rejected for {}\n",
                    paint("✗", Color::Red, true, self.use_color),
                    self.gate(rejection.record.from),
                    self.gate(rejection.record.to),
                    rejection.record.item_id
                );
                for failure in &rejection.failures {
                    output.push_str(&format!("  - {}\n", failure));
                }
                output
            }
        }
    }

    fn format_preview(&self, preview: &Preview) -> String {
        let verdict = if preview.would_pass() {
            paint("would pass", Color::Green, true, self.use_color)
        } else {
            paint("would be rejected", Color::Red, true, self.use_color)
        };
        let mut output = format!(
            "{} → {} for {}: {}\n",
            self.gate(preview.from),
            self.gate(preview.to),
            preview.item_id,
            verdict
        );
        for criterion in &preview.validation.criteria {
            let mark = if criterion.passed { "✓" } else { "✗" };
            output.push_str(&format!(
                "  {} {} {} {}\n",
                mark, criterion.phase, criterion.gate, criterion.name
            ));
        }
        for failure in &preview.validation.failures {
            if failure.kind != stagegate_core::FailureKind::Criteria {
                output.push_str(&format!("  - {}\n", failure));
            }
        }
        for violation in &preview.capacity.violations {
            output.push_str(&format!("  - [capacity] {}\n", violation));
        }
        output
    }

    fn format_utilization(&self, rows: &[Utilization]) -> String {
        if rows.is_empty() {
            return "No WIP scopes found.".to_string();
        }

        let rows = rows
            .iter()
            .map(|row| {
                let percent = format!("{:.0}%", row.percent);
                vec![
                    row.scope.to_string(),
                    format!("{}/{}", row.current, row.limit),
                    if row.exceeded {
                        paint(&percent, Color::Red, true, self.use_color)
                    } else {
                        percent
                    },
                ]
            })
            .collect();
        Self::table(&["Scope", "Current/Limit", "Used"], rows)
    }

    fn format_metrics(&self, metrics: &[GateMetric]) -> String {
        let rows = metrics
            .iter()
            .map(|metric| {
                vec![
                    self.gate(metric.gate),
                    metric.count.to_string(),
                    metric.overdue.to_string(),
                ]
            })
            .collect();
        Self::table(&["Gate", "Items", "Overdue"], rows)
    }

    fn format_error(&self, error: &str) -> String {
        format!("{} {}", paint("Error:", Color::Red, true, self.use_color), error)
    }
}

/// Plain text output formatter.
///
/// One record per line, space separated, no color.
pub struct PlainFormatter;

impl OutputFormatter for PlainFormatter {
    fn format_item(&self, item: &Item) -> String {
        let mut output = format!(
            "{}\n{}\n{}\n{}\n{}\n",
            item.id,
            item.title,
            item.gate,
            pod_label(item),
            item.author
        );
        for (key, value) in &item.facts {
            output.push_str(&format!("{}={}\n", key, value));
        }
        output
    }

    fn format_list(&self, items: &[Item]) -> String {
        items
            .iter()
            .map(|item| format!("{} {} {} {}\n", item.id, item.gate, pod_label(item), item.title))
            .collect()
    }

    fn format_history(&self, records: &[TransitionRecord]) -> String {
        records
            .iter()
            .map(|record| {
                format!(
                    "{} {} {} {} {}\n",
                    record.timestamp,
                    record.from,
                    record.to,
                    outcome_label(record),
                    record.actor
                )
            })
            .collect()
    }

    fn format_outcome(&self, outcome: &PromotionOutcome) -> String {
        match outcome {
            PromotionOutcome::Approved { record, .. } => {
                format!("approved {} {} {}\n", record.item_id, record.from, record.to)
            }
            PromotionOutcome::Rejected(rejection) => {
                let mut output = format!(
                    "rejected {} {} {}\n",
                    rejection.record.item_id, rejection.record.from, rejection.record.to
                );
                for failure in &rejection.failures {
                    output.push_str(&format!("{}\n", failure));
                }
                output
            }
        }
    }

    fn format_preview(&self, preview: &Preview) -> String {
        let mut output = format!(
            "{} {} {} {}\n",
            if preview.would_pass() { "pass" } else { "fail" },
            preview.item_id,
            preview.from,
            preview.to
        );
        for failure in &preview.validation.failures {
            output.push_str(&format!("{}\n", failure));
        }
        for violation in &preview.capacity.violations {
            output.push_str(&format!("[capacity] {}\n", violation));
        }
        output
    }

    fn format_utilization(&self, rows: &[Utilization]) -> String {
        rows.iter()
            .map(|row| format!("{} {} {}\n", row.scope, row.current, row.limit))
            .collect()
    }

    fn format_metrics(&self, metrics: &[GateMetric]) -> String {
        metrics
            .iter()
            .map(|metric| format!("{} {} {}\n", metric.gate, metric.count, metric.overdue))
            .collect()
    }

    fn format_error(&self, error: &str) -> String {
        format!("Error: {}", error)
    }
}

fn pod_label(item: &Item) -> String {
    item.pod.map(|pod| pod.to_string()).unwrap_or_else(|| "-".to_string())
}

fn outcome_label(record: &TransitionRecord) -> String {
    match (record.outcome, record.from == record.to) {
        (stagegate_core::Outcome::Approved, _) => "approved".to_string(),
        (stagegate_core::Outcome::Rejected, true) => "review rejected".to_string(),
        (stagegate_core::Outcome::Rejected, false) => "rejected".to_string(),
    }
}

/// Creates the formatter for `format` ("json", "table", or "plain").
///
/// Unknown names fall back to the table formatter.
pub fn create_formatter(format: &str, use_color: bool) -> Box<dyn OutputFormatter> {
    match format {
        "json" => Box::new(JsonFormatter),
        "plain" => Box::new(PlainFormatter),
        _ => Box::new(TableFormatter::new(use_color)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stagegate_core::{Gate, Pod};

    fn item() -> Item {
        let mut item = Item::new("Async design reviews".to_string(), "ines".to_string());
        item.pod = Some(Pod::Ratio);
        item.gate = Gate::Seed;
        item
    }

    #[test]
    fn test_json_list_has_envelope_and_total() {
        let output = JsonFormatter.format_list(&[item()]);
        let json: serde_json::Value = serde_json::from_str(&output).expect("valid JSON");
        assert_eq!(json["status"], "ok");
        assert_eq!(json["result"]["total"], 1);
        assert_eq!(json["result"]["items"][0]["gate"], "SEED");
    }

    #[test]
    fn test_table_list_without_color_has_no_escapes() {
        let output = TableFormatter::new(false).format_list(&[item()]);
        assert!(output.contains("SEED"));
        assert!(output.contains("RATIO"));
        assert!(!output.contains('\u{1b}'));
    }

    #[test]
    fn test_plain_list_is_one_line_per_item() {
        let output = PlainFormatter.format_list(&[item(), item()]);
        assert_eq!(output.lines().count(), 2);
        assert!(output.starts_with("idea-"));
    }

    #[test]
    fn test_empty_table_list_message() {
        assert_eq!(TableFormatter::new(false).format_list(&[]), "No items found.");
    }

    #[test]
    fn test_create_formatter_falls_back_to_table() {
        let formatter = create_formatter("yaml", false);
        assert_eq!(formatter.format_list(&[]), "No items found.");
    }
}
