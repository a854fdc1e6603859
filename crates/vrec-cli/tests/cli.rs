//! End-to-end tests for the `vrec` binary that need no OCR models.

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const RECORDS: &str = r#"[
  {"source": "a.jpg", "code": "ABCD1234EFGH5678", "amount": {"state": "found", "value": 1500, "display": "￥1,500"}},
  {"source": "b.jpg", "code": "ZZZZ1234EFGH5678", "amount": {"state": "found", "value": 500, "display": "￥500"}},
  {"source": "c.jpg", "code": null, "amount": {"state": "failed"}, "error": "image error: bad data"}
]"#;

const REFERENCE: &str = "ABCD1234EFGH5678 1,500\nZZZZ1234EFGH5679 500\n";

/// Command isolated from the user's real config directory.
fn vrec(config_home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("vrec").unwrap();
    cmd.env("XDG_CONFIG_HOME", config_home.path())
        .env("HOME", config_home.path());
    cmd
}

fn write_inputs(dir: &TempDir) -> (String, String) {
    let records = dir.path().join("records.json");
    let reference = dir.path().join("reference.txt");
    fs::write(&records, RECORDS).unwrap();
    fs::write(&reference, REFERENCE).unwrap();
    (
        records.display().to_string(),
        reference.display().to_string(),
    )
}

#[test]
fn reconcile_text_output_marks_results() {
    let dir = TempDir::new().unwrap();
    let (records, reference) = write_inputs(&dir);

    vrec(&dir)
        .args(["reconcile", "--records", &records, "--reference", &reference])
        .assert()
        .success()
        .stdout(predicate::str::contains("◎ ABCD1234EFGH5678 (16 chars)"))
        .stdout(predicate::str::contains("！ ZZZZ1234EFGH5678"))
        .stdout(predicate::str::contains("closest: ZZZZ1234EFGH5679"));
}

#[test]
fn reconcile_json_output_has_summary() {
    let dir = TempDir::new().unwrap();
    let (records, reference) = write_inputs(&dir);

    let output = vrec(&dir)
        .args(["reconcile", "--records", &records, "-r", &reference, "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["mode"], "code");
    assert_eq!(report["summary"]["exact"], 1);
    assert_eq!(report["summary"]["code_unknown"], 1);
    assert_eq!(report["summary"]["unreadable"], 1);
    assert_eq!(report["results"][1]["match_kind"], "CODE_UNKNOWN");
}

#[test]
fn reconcile_accepts_its_own_report() {
    let dir = TempDir::new().unwrap();
    let (records, reference) = write_inputs(&dir);
    let report = dir.path().join("report.json");

    vrec(&dir)
        .args(["reconcile", "--records", &records, "-r", &reference, "-f", "json", "-o"])
        .arg(&report)
        .assert()
        .success();

    vrec(&dir)
        .args(["reconcile", "--records"])
        .arg(&report)
        .args(["-r", &reference, "--format", "codes"])
        .assert()
        .success()
        .stdout("ABCD1234EFGH5678\nZZZZ1234EFGH5678\n");
}

#[test]
fn reconcile_pairs_output_uses_placeholder() {
    let dir = TempDir::new().unwrap();
    let (records, reference) = write_inputs(&dir);

    vrec(&dir)
        .args(["reconcile", "--records", &records, "-r", &reference, "-f", "pairs"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ABCD1234EFGH5678 1500"))
        .stdout(predicate::str::contains("不明 不明"));
}

#[test]
fn reconcile_rejects_malformed_records() {
    let dir = TempDir::new().unwrap();
    let (_, reference) = write_inputs(&dir);
    let bad = dir.path().join("bad.json");
    fs::write(&bad, "{\"nope\": true}").unwrap();

    vrec(&dir)
        .args(["reconcile", "--records"])
        .arg(&bad)
        .args(["-r", &reference])
        .assert()
        .failure()
        .stderr(predicate::str::contains("neither an extraction report"));
}

#[test]
fn extract_without_images_fails() {
    let dir = TempDir::new().unwrap();
    let pattern = format!("{}/*.png", dir.path().display());

    vrec(&dir)
        .args(["extract", &pattern])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No matching image files"));
}

#[test]
fn extract_without_models_fails() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("voucher.png"), b"not really a png").unwrap();
    let pattern = format!("{}/*.png", dir.path().display());
    let models = dir.path().join("models");

    vrec(&dir)
        .args(["extract", &pattern, "--model-dir"])
        .arg(&models)
        .assert()
        .failure()
        .stderr(predicate::str::contains("OCR models not available"));
}

#[test]
fn config_set_then_get() {
    let dir = TempDir::new().unwrap();

    vrec(&dir)
        .args(["config", "set", "extraction.suffixed_floor", "250"])
        .assert()
        .success();

    vrec(&dir)
        .args(["config", "get", "extraction.suffixed_floor"])
        .assert()
        .success()
        .stdout("250\n");
}

#[test]
fn config_set_rejects_unknown_key() {
    let dir = TempDir::new().unwrap();

    vrec(&dir)
        .args(["config", "set", "extraction.nonsense", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration key not found"));
}

#[test]
fn config_path_mentions_vrec() {
    let dir = TempDir::new().unwrap();

    vrec(&dir)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("vrec"))
        .stdout(predicate::str::contains("not created"));
}
