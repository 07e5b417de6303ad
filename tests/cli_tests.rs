// CLI behaviour: walking flows, listing transition tables and config output

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{json, Value};

fn wallet_flows() -> Command {
    let mut cmd = Command::cargo_bin("wallet-flows").unwrap();
    cmd.env("RUST_LOG", "off");
    cmd
}

#[test]
fn test_walk_past_terminal_reports_dismissal_as_json() {
    let output = wallet_flows()
        .args(["walk", "custody-withdrawal", "next", "next", "next", "next", "back", "--json"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let report: Value = serde_json::from_slice(&output.stdout).unwrap();

    assert_eq!(report["flow"], "custody-withdrawal");
    assert_eq!(
        report["actions"],
        json!([
            {"action": "advance", "to": "withdrawal"},
            {"action": "advance", "to": "summary"},
            {"action": "advance", "to": "end"},
            {"action": "dismiss"},
            {"action": "dismiss"},
        ])
    );
    assert_eq!(report["history"]["current"], "end");
    assert_eq!(report["screens"], json!([]));
}

#[test]
fn test_walk_back_from_terminal_shows_summary_screen() {
    wallet_flows()
        .args(["walk", "custody-withdrawal", "next", "next", "next", "back"])
        .assert()
        .success()
        .stdout(predicate::str::contains("📍 Current state: Summary"))
        .stdout(predicate::str::contains(
            "📱 Screens on stack: [Withdrawal, Summary]",
        ));
}

#[test]
fn test_walk_with_signal_and_completion() {
    wallet_flows()
        .args([
            "walk",
            "backup-funds",
            "signal:verified",
            "next",
            "next",
            "next",
            "next",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Complete"))
        .stdout(predicate::str::contains("✅ Flow completed"));
}

#[test]
fn test_flows_lists_every_transition_table() {
    wallet_flows()
        .arg("flows")
        .assert()
        .success()
        .stdout(predicate::str::contains("🔀 custody-withdrawal"))
        .stdout(predicate::str::contains("🔀 backup-funds"))
        .stdout(predicate::str::contains("🔀 payment-setup"))
        .stdout(predicate::str::contains("Summary → End"))
        .stdout(predicate::str::contains("CardAuthorization → PendingActivation (back exits)"));
}

#[test]
fn test_invalid_trigger_is_rejected() {
    wallet_flows()
        .args(["walk", "custody-withdrawal", "next", "sideways"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid trigger 'sideways'"));
}

#[test]
fn test_unknown_flow_is_rejected() {
    wallet_flows()
        .args(["walk", "loan-application", "next"])
        .assert()
        .failure();
}

#[test]
fn test_config_write_produces_loadable_toml() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("wallet-flows.toml");

    wallet_flows()
        .args(["config", "--write"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("✅ Configuration written to"));

    let written = std::fs::read_to_string(&path).unwrap();
    assert!(written.contains("[cards]"));
    assert!(written.contains("activation_timeout_seconds = 60"));
}
