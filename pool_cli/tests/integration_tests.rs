//! Integration tests for the pooldose binary.
//!
//! These tests verify end-to-end behavior including:
//! - Dosing recommendations in text and JSON
//! - Pool registry workflow (add, list, show, dose by name)
//! - Input validation and error exits

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Helper to create a test data directory
fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Helper to get the path to the CLI binary
fn cli() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("pooldose"))
}

/// Registry file inside the test directory
fn registry_path(dir: &Path) -> PathBuf {
    dir.join("pools.csv")
}

fn add_pool(registry: &Path, name: &str, volume: &str) {
    cli()
        .arg("pools")
        .arg("add")
        .arg(name)
        .arg(volume)
        .arg("--registry")
        .arg(registry)
        .assert()
        .success();
}

fn dose_json(args: &[&str]) -> serde_json::Value {
    let output = cli()
        .arg("dose")
        .args(args)
        .arg("--json")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    serde_json::from_slice(&output).expect("dose --json should print JSON")
}

#[test]
fn test_cli_help() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Pool dosing calculator for pH, chlorine and Tempo Sticks",
        ));
}

#[test]
fn test_dose_low_chlorine_occupied() {
    cli()
        .args(["dose", "--volume", "45", "--ph", "7.5", "--chlorine", "1.5"])
        .arg("--occupied")
        .assert()
        .success()
        .stdout(predicate::str::contains("round to 24 pcs"))
        .stdout(predicate::str::contains("HTH Tempo Sticks: 1 pcs"))
        .stdout(predicate::str::contains("pH-minus: 1138 ml"));
}

#[test]
fn test_dose_high_chlorine_json() {
    let json = dose_json(&["--volume", "25", "--ph", "7.0", "--chlorine", "8.0"]);
    let rec = &json["recommendation"];

    let antichlor = rec["chlorine_reduction"]["antichlor_amount"].as_f64().unwrap();
    assert!((antichlor - 83.0).abs() < 1e-6);
    assert!(rec["chlorine_addition"].is_null());
    assert_eq!(rec["ph_action"]["action"], "none");
    assert_eq!(rec["warnings"][0]["kind"], "antichlor_wait");
    assert_eq!(json["policy"]["maintenance"]["mode"], "fixed");
}

#[test]
fn test_dose_awaiting_stick_count() {
    let json = dose_json(&[
        "--volume",
        "30",
        "--ph",
        "7.4",
        "--chlorine",
        "2.0",
        "--occupied",
        "--has-stick",
    ]);
    let rec = &json["recommendation"];

    assert_eq!(rec["stick_recommendation"]["status"], "awaiting_input");
    assert_eq!(rec["ph_action"]["action"], "lower");
    assert!(rec["chlorine_addition"]["briquette_count_rounded"].is_u64());

    cli()
        .args(["dose", "--volume", "30", "--occupied", "--has-stick"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--sticks 1 or 2"));
}

#[test]
fn test_dose_existing_sticks() {
    let json = dose_json(&["--volume", "30", "--occupied", "--sticks", "2"]);
    assert_eq!(
        json["recommendation"]["stick_recommendation"]["status"],
        "existing_sufficient"
    );
    assert_eq!(json["recommendation"]["stick_recommendation"]["count"], 2);
}

#[test]
fn test_dose_rejects_three_sticks() {
    cli()
        .args(["dose", "--volume", "30", "--sticks", "3"])
        .assert()
        .failure();
}

#[test]
fn test_dose_balanced_vacant() {
    let json = dose_json(&["--volume", "40", "--ph", "7.0", "--chlorine", "4.0"]);
    let rec = &json["recommendation"];

    assert_eq!(rec["ph_action"]["action"], "none");
    assert!(rec["chlorine_addition"].is_null());
    assert!(rec["chlorine_reduction"].is_null());
    assert_eq!(rec["stick_recommendation"]["status"], "not_applicable");
    assert_eq!(rec["stick_recommendation"]["reason"], "not_occupied");
}

#[test]
fn test_dose_severe_hazard_warning() {
    cli()
        .args(["dose", "--volume", "25", "--ph", "3.5", "--chlorine", "1.0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("SEVERE WARNING"));
}

#[test]
fn test_dose_policy_override() {
    let json = dose_json(&[
        "--volume",
        "100",
        "--chlorine",
        "2.5",
        "--occupied",
        "--policy",
        "by-occupancy",
    ]);

    assert_eq!(json["policy"]["maintenance"]["mode"], "by_occupancy");
    assert_eq!(json["recommendation"]["stick_recommendation"]["count"], 2);
}

#[test]
fn test_dose_policy_from_config_file() {
    let temp_dir = setup_test_dir();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(
        &config_path,
        "[dosing.maintenance]\nmode = \"by_occupancy\"\n",
    )
    .unwrap();

    let config_arg = config_path.to_string_lossy().to_string();
    let json = dose_json(&[
        "--config",
        &config_arg,
        "--volume",
        "25",
        "--chlorine",
        "1.5",
        "--occupied",
    ]);
    assert_eq!(json["policy"]["maintenance"]["mode"], "by_occupancy");
    assert_eq!(json["recommendation"]["stick_recommendation"]["count"], 1);
}

#[test]
fn test_dose_rejects_zero_volume() {
    cli()
        .args(["dose", "--volume", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("InvalidInput"));
}

#[test]
fn test_dose_requires_pool_or_volume() {
    cli().arg("dose").assert().failure();
}

#[test]
fn test_pools_list_empty() {
    let temp_dir = setup_test_dir();

    cli()
        .args(["pools", "list"])
        .arg("--registry")
        .arg(registry_path(temp_dir.path()))
        .assert()
        .success()
        .stdout(predicate::str::contains("No pools registered"));
}

#[test]
fn test_pools_add_list_show() {
    let temp_dir = setup_test_dir();
    let registry = registry_path(temp_dir.path());

    add_pool(&registry, "Villa Sol", "45");
    add_pool(&registry, "Havhuset", "30.5");

    cli()
        .args(["pools", "list"])
        .arg("--registry")
        .arg(&registry)
        .assert()
        .success()
        .stdout("Villa Sol\nHavhuset\n");

    cli()
        .args(["pools", "show", "Havhuset"])
        .arg("--registry")
        .arg(&registry)
        .assert()
        .success()
        .stdout(predicate::str::contains("Havhuset - 30.5 m³"))
        .stdout(predicate::str::contains("Address: Havhuset"))
        .stdout(predicate::str::contains("Pump type: Not specified"));
}

#[test]
fn test_pools_add_duplicate_fails() {
    let temp_dir = setup_test_dir();
    let registry = registry_path(temp_dir.path());

    add_pool(&registry, "Villa Sol", "45");

    cli()
        .args(["pools", "add", "Villa Sol", "50"])
        .arg("--registry")
        .arg(&registry)
        .assert()
        .failure()
        .stderr(predicate::str::contains("DuplicatePool"));
}

#[test]
fn test_registry_under_data_dir() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().join("data");

    cli()
        .args(["pools", "add", "Villa Sol", "45"])
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success();

    assert!(data_dir.join("pools.csv").exists());
}

#[test]
fn test_dose_by_pool_name() {
    let temp_dir = setup_test_dir();
    let registry = registry_path(temp_dir.path());

    add_pool(&registry, "Villa Sol", "45");

    let registry_arg = registry.to_string_lossy().to_string();
    let json = dose_json(&[
        "--registry",
        &registry_arg,
        "--pool",
        "Villa Sol",
        "--ph",
        "7.5",
        "--chlorine",
        "1.5",
    ]);

    assert_eq!(json["pool"]["name"], "Villa Sol");
    assert_eq!(json["input"]["volume_m3"], 45.0);
    assert_eq!(
        json["recommendation"]["chlorine_addition"]["briquette_count_rounded"],
        24
    );

    cli()
        .args(["dose", "--pool", "Villa Sol"])
        .arg("--registry")
        .arg(&registry)
        .assert()
        .success()
        .stdout(predicate::str::contains("Villa Sol - 45.0 m³"));
}

#[test]
fn test_dose_unknown_pool_fails() {
    let temp_dir = setup_test_dir();

    cli()
        .args(["dose", "--pool", "Nowhere"])
        .arg("--registry")
        .arg(registry_path(temp_dir.path()))
        .assert()
        .failure()
        .stderr(predicate::str::contains("PoolNotFound"));
}
