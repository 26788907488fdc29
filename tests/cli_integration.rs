use std::fs;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::tempdir;

fn helm_migrate() -> Command {
    let binary = assert_cmd::cargo::cargo_bin!("helm-migrate");
    let mut cmd = Command::new(binary);
    cmd.env_clear();
    cmd.env("NO_COLOR", "1");
    cmd
}

fn error_json(output: &std::process::Output) -> Value {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let last = stderr
        .lines()
        .rev()
        .find(|l| l.trim_start().starts_with('{'))
        .expect("stderr should end with a json error");
    serde_json::from_str(last).expect("error line should be valid json")
}

#[test]
fn convert_without_release_fails_validation() {
    let output = helm_migrate()
        .env("PLUGIN_HELM_COMMAND", "convert")
        .output()
        .unwrap();

    assert!(!output.status.success());
    let err = error_json(&output);
    assert_eq!(err["error"], "release_required");
    assert_eq!(err["message"], "release is required");
}

#[test]
fn unknown_command_is_rejected() {
    let output = helm_migrate()
        .args(["--helm-command", "upgrade", "--release", "myapp"])
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert_eq!(error_json(&output)["error"], "unknown_command");
}

#[test]
fn pretty_errors_are_plain_text() {
    helm_migrate()
        .args(["--format", "pretty", "--helm-command", "convert"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("error: release is required"));
}

#[test]
fn unreadable_kubeconfig_stops_conversion() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("missing-config");

    let output = helm_migrate()
        .env("PLUGIN_HELM_COMMAND", "convert")
        .env("PLUGIN_RELEASE", "myapp")
        .env("PLUGIN_KUBE_CONFIG", &missing)
        .output()
        .unwrap();

    assert!(!output.status.success());
    let err = error_json(&output);
    assert_eq!(err["error"], "release_storage");
    assert!(
        err["message"]
            .as_str()
            .unwrap()
            .contains("failed to load admin kubeconfig")
    );
}

#[test]
fn unknown_kube_context_stops_conversion() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("config");
    fs::write(
        &config,
        "current-context: ci\nclusters:\n  - name: c\n    cluster:\n      server: https://k8s.example:6443\ncontexts:\n  - name: ci\n    context:\n      cluster: c\n",
    )
    .unwrap();

    helm_migrate()
        .env("PLUGIN_HELM_COMMAND", "convert")
        .env("PLUGIN_RELEASE", "myapp")
        .env("PLUGIN_KUBE_CONFIG", &config)
        .env("PLUGIN_KUBE_CONTEXT", "nope")
        .assert()
        .failure()
        .stderr(predicate::str::contains("context 'nope' not found"));
}
