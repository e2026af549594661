// Rust guideline compliant 2026-10-15

//! End-to-end tests running the `sgate` binary.

use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn sgate(repo: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_sgate"))
        .arg("--repo")
        .arg(repo)
        .args(args)
        .env_remove("STAGEGATE_OUTPUT_FORMAT")
        .env_remove("STAGEGATE_PORTFOLIO_LIMIT")
        .env("NO_COLOR", "1")
        .output()
        .expect("run sgate")
}

fn json(output: &Output) -> serde_json::Value {
    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(stdout.trim()).unwrap_or_else(|e| {
        panic!(
            "expected JSON ({}), got:\n{}\nstderr: {}",
            e,
            stdout,
            String::from_utf8_lossy(&output.stderr)
        )
    })
}

fn init(temp_dir: &TempDir) {
    let output = sgate(temp_dir.path(), &["init"]);
    assert!(
        output.status.success(),
        "init failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

fn create_ready(temp_dir: &TempDir, pod: &str) -> String {
    let output = sgate(
        temp_dir.path(),
        &[
            "create",
            "Async design reviews",
            "--pod",
            pod,
            "--fact",
            "problem_statement=Reviews stall for days",
            "--fact",
            "hypothesis=Async reviews cut lead time",
            "--fact",
            "idea_ledger_entry=true",
            "--fact",
            "strategic_fit=4",
            "--fact",
            "impact=3",
            "--fact",
            "feasibility_check_completed=true",
            "--fact",
            "spark_gate_passed=true",
            "--fact",
            "owner=ines",
            "--json",
        ],
    );
    assert!(output.status.success(), "create failed");
    let value = json(&output);
    assert_eq!(value["result"]["admission"], "admitted");
    value["result"]["item"]["id"]
        .as_str()
        .expect("item id")
        .to_string()
}

#[test]
fn test_init_creates_repository_files() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    init(&temp_dir);

    let dir = temp_dir.path().join(".stagegate");
    for file in ["ideas.jsonl", "transitions.jsonl", "limits.jsonl", "config.toml"] {
        assert!(dir.join(file).exists(), "{} should exist", file);
    }
    let config = std::fs::read_to_string(dir.join("config.toml")).expect("read config");
    assert!(config.contains("log_level"));
}

#[test]
fn test_list_json_on_empty_repository() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    init(&temp_dir);

    let output = sgate(temp_dir.path(), &["list", "--json"]);
    assert!(output.status.success());
    let value = json(&output);
    assert_eq!(value["status"], "ok");
    assert_eq!(value["result"]["total"], 0);
}

#[test]
fn test_promote_flow_records_history() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    init(&temp_dir);
    let id = create_ready(&temp_dir, "platform");

    let preview = sgate(temp_dir.path(), &["promote", &id, "seed", "--dry-run", "--json"]);
    assert!(preview.status.success());
    assert_eq!(json(&preview)["result"]["would_pass"], true);

    let promoted = sgate(
        temp_dir.path(),
        &["promote", &id, "seed", "--comments", "Strong signal", "--json"],
    );
    assert!(promoted.status.success());
    assert_eq!(json(&promoted)["result"]["outcome"], "approved");

    let shown = sgate(temp_dir.path(), &["show", &id, "--json"]);
    assert_eq!(json(&shown)["result"]["gate"], "SEED");

    let history = sgate(temp_dir.path(), &["history", &id, "--json"]);
    let value = json(&history);
    assert_eq!(value["result"]["total"], 1);
    assert_eq!(value["result"]["records"][0]["comments"], "Strong signal");
}

#[test]
fn test_rejected_promotion_exits_with_code_two() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    init(&temp_dir);
    let id = create_ready(&temp_dir, "ratio");

    let output = sgate(temp_dir.path(), &["promote", &id, "scaffold", "--json"]);
    assert_eq!(output.status.code(), Some(2));
    let value = json(&output);
    assert_eq!(value["result"]["outcome"], "rejected");
    assert_eq!(value["result"]["failures"][0]["kind"], "sequencing");
}

#[test]
fn test_full_scope_refuses_creation() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    init(&temp_dir);

    let set = sgate(
        temp_dir.path(),
        &["wip", "set", "0", "--gate", "spark", "--pod", "ratio"],
    );
    assert!(set.status.success());

    let output = sgate(
        temp_dir.path(),
        &["create", "Blocked idea", "--pod", "ratio", "--json"],
    );
    assert_eq!(output.status.code(), Some(2));
    let value = json(&output);
    assert_eq!(value["result"]["admission"], "refused");
    assert_eq!(
        value["result"]["capacity"]["violations"][0],
        "per_pod RATIO/SPARK at limit (0/0)"
    );
}

#[test]
fn test_wip_list_filters_exceeded() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    init(&temp_dir);
    sgate(temp_dir.path(), &["wip", "set", "0", "--gate", "ship"]);

    let output = sgate(temp_dir.path(), &["wip", "list", "--exceeded", "--json"]);
    assert!(output.status.success());
    let value = json(&output);
    let rows = value["result"].as_array().expect("rows");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["scope"]["type"], "cross_pod");
    assert_eq!(rows[0]["scope"]["gate"], "SHIP");
}

#[test]
fn test_uninitialized_repository_reports_error_code() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");

    let output = sgate(temp_dir.path(), &["list", "--json"]);
    assert_eq!(output.status.code(), Some(1));
    let value = json(&output);
    assert_eq!(value["status"], "error");
    assert_eq!(value["code"], "repo_not_initialized");
}
