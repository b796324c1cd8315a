// SPDX-License-Identifier: MIT OR Apache-2.0
//! Integration tests for xtask subcommands.

use assert_cmd::Command;
use predicates::prelude::*;

#[allow(deprecated)] // cargo_bin works fine; the replacement macro is unstable
fn xtask() -> Command {
    Command::cargo_bin("xtask").unwrap()
}

#[test]
fn schema_subcommand_exists() {
    xtask()
        .arg("schema")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--out-dir"));
}

#[test]
fn schema_writes_all_files() {
    let dir = tempfile::tempdir().unwrap();
    xtask()
        .args(["schema", "--out-dir"])
        .arg(dir.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("wrote schemas"));

    let config: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(dir.path().join("ui_config.schema.json")).unwrap(),
    )
    .unwrap();
    assert!(config["properties"]["stale_asset_signatures"].is_object());

    let category = std::fs::read_to_string(dir.path().join("error_category.schema.json")).unwrap();
    assert!(category.contains("MAINTENANCE_MODE"));
    assert!(category.contains("UNKNOWN_ERROR"));

    let record: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(dir.path().join("error_log_record.schema.json")).unwrap(),
    )
    .unwrap();
    assert!(record["properties"]["userAgent"].is_object());
    assert!(record["properties"]["type"].is_object());
    let required = record["required"].as_array().unwrap();
    assert!(required.iter().any(|f| f == "timestamp"));
    assert!(record.to_string().contains("Console Error"));
}

#[test]
fn unknown_subcommand_fails() {
    xtask().arg("publish").assert().failure();
}
