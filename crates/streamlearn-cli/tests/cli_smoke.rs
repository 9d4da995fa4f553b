//! CLI binary smoke tests using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn cmd() -> Command {
    Command::cargo_bin("streamlearn").unwrap()
}

// ---------------------------------------------------------------------------
// Top-level
// ---------------------------------------------------------------------------

#[test]
fn no_args_shows_help() {
    cmd()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn help_lists_subcommands() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("speed"))
        .stdout(predicate::str::contains("prequential"));
}

#[test]
fn version_flag() {
    cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("streamlearn"));
}

// ---------------------------------------------------------------------------
// speed
// ---------------------------------------------------------------------------

#[test]
fn speed_with_generator_flags() {
    cmd()
        .args([
            "speed", "--samples", "50", "--features", "4", "--targets", "3", "--labels", "2",
            "--seed", "7", "--batch-size", "7",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"instances_processed\": 49"))
        .stdout(predicate::str::contains("\"reason\": \"stream_exhausted\""));
}

#[test]
fn speed_honours_instance_cap() {
    cmd()
        .args(["speed", "--samples", "1000", "--max-instances", "100", "--batch-size", "10"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"instances_processed\": 100"))
        .stdout(predicate::str::contains("instance_limit"));
}

#[test]
fn speed_rejects_zero_batch_size() {
    cmd()
        .args(["speed", "--samples", "10", "--batch-size", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("batch_size"));
}

#[test]
fn speed_rejects_invalid_label_density() {
    cmd()
        .args(["speed", "--targets", "2", "--labels", "3"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("n_labels"));
}

#[test]
fn speed_reads_json_config() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("run.json");
    fs::write(
        &path,
        r#"{
            "source": {"kind": "generator", "n_samples": 30, "n_features": 2, "n_targets": 2, "n_labels": 1, "random_state": 3},
            "evaluation": {"batch_size": 4}
        }"#,
    )
    .unwrap();
    cmd()
        .arg("speed")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"instances_processed\": 28"));
}

#[test]
fn speed_missing_config_fails() {
    cmd()
        .args(["speed", "/nonexistent/run.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read config"));
}

// ---------------------------------------------------------------------------
// prequential
// ---------------------------------------------------------------------------

#[test]
fn prequential_on_csv_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("rows.csv");
    let mut contents = String::from("a,b,class\n");
    for i in 0..20 {
        contents.push_str(&format!("{},{},1\n", i, i + 1));
    }
    fs::write(&path, contents).unwrap();

    cmd()
        .args(["prequential", "--model", "majority", "--batch-size", "5", "--file"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"model\": \"MajorityClassClassifier\""))
        .stdout(predicate::str::contains("\"predictions\": 15"))
        .stdout(predicate::str::contains("\"accuracy\": 1.0"));
}

#[test]
fn prequential_multi_target_stream_fails() {
    cmd()
        .args([
            "prequential",
            "--samples",
            "20",
            "--targets",
            "3",
            "--labels",
            "1",
            "--batch-size",
            "5",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("shape mismatch"));
}

#[test]
fn prequential_rejects_unknown_model() {
    cmd()
        .args(["prequential", "--model", "gbdt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn generator_flags_conflict_with_file_source() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("rows.csv");
    fs::write(&path, "a,class\n1,0\n").unwrap();
    cmd()
        .args(["speed", "--samples", "10", "--file"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("--samples only applies"));
}
