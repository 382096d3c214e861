//! Integration tests for resolving and verifying configurations from the command line.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Basic settings shared by every test config, pointing at a partition
/// config created in `dir`.
fn basic_section(dir: &TempDir) -> String {
    let part_config = dir.path().join("graph.json");
    fs::write(&part_config, r#"{"graph_name": "movielens", "num_parts": 1}"#).unwrap();
    format!(
        "gsf:\n  basic:\n    model_encoder_type: rgcn\n    num_layers: 2\n    fanout: '10,5'\n    lr: 0.001\n    \
         part_config: {}\n  gnn:\n    hidden_size: 64\n",
        part_config.display()
    )
}

/// Writes a node classification config and returns its path.
fn node_classification_yaml(dir: &TempDir, batch_size: bool) -> PathBuf {
    let mut yaml = basic_section(dir);
    if batch_size {
        yaml.push_str("  hyperparam:\n    batch_size: 32\n    num_epochs: 2\n");
    }
    yaml.push_str("  node_classification:\n    target_ntype: movie\n    label_field: genre\n    num_classes: 19\n");
    let path = dir.path().join("nc.yaml");
    fs::write(&path, yaml).unwrap();
    path
}

fn cli() -> Command {
    Command::cargo_bin("graphstorm-cli").unwrap()
}

#[test]
fn test_help_lists_config_flag() {
    cli().arg("--help").assert().success().stdout(predicate::str::contains("--yaml_config_file"));
}

#[test]
fn test_valid_config_prints_summary() {
    let dir = TempDir::new().unwrap();
    let yaml = node_classification_yaml(&dir, true);

    cli()
        .arg("--cf")
        .arg(&yaml)
        .assert()
        .success()
        .stdout(predicate::str::contains("node_classification"))
        .stdout(predicate::str::contains("Configuration is valid"));
}

#[test]
fn test_json_output_reflects_overrides() {
    let dir = TempDir::new().unwrap();
    let yaml = node_classification_yaml(&dir, true);

    let output = cli().arg("--cf").arg(&yaml).args(["--batch-size", "128", "--json"]).output().unwrap();
    assert!(output.status.success());

    let summary: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(summary["task_type"], "node_classification");
    assert_eq!(summary["mode"], "training");
    assert_eq!(summary["hyperparameters"]["batch_size"], 128);
    assert_eq!(summary["hyperparameters"]["fanout"], "10,5");
    assert_eq!(summary["hyperparameters"]["eval_metric"][0], "accuracy");
    assert_eq!(summary["overrides"], serde_json::json!(["batch_size"]));
}

#[test]
fn test_missing_config_file_fails() {
    let dir = TempDir::new().unwrap();

    cli()
        .arg("--cf")
        .arg(dir.path().join("absent.yaml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load configuration"));
}

#[test]
fn test_training_requires_batch_size() {
    let dir = TempDir::new().unwrap();
    let yaml = node_classification_yaml(&dir, false);

    cli().arg("--cf").arg(&yaml).assert().failure().stderr(predicate::str::contains("batch_size"));
    cli().arg("--cf").arg(&yaml).arg("--inference").assert().success();
}

#[test]
fn test_unknown_flag_is_rejected() {
    let dir = TempDir::new().unwrap();
    let yaml = node_classification_yaml(&dir, true);

    cli().arg("--cf").arg(&yaml).args(["--batch-sise", "8"]).assert().failure();
}

#[test]
fn test_multi_task_config() {
    let dir = TempDir::new().unwrap();
    let mut yaml = basic_section(&dir);
    yaml.push_str(
        "  hyperparam:\n    batch_size: 64\n  multi_task_learning:\n    - node_classification:\n        \
         target_ntype: movie\n        label_field: genre\n        num_classes: 19\n        \
         mask_fields: [train_nc, val_nc, test_nc]\n    - link_prediction:\n        \
         exclude_training_targets: false\n        batch_size: 128\n        task_weight: 0.5\n",
    );
    let path = dir.path().join("mt.yaml");
    fs::write(&path, yaml).unwrap();

    let output = cli().arg("--cf").arg(&path).arg("--json").output().unwrap();
    assert!(output.status.success());
    let summary: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let tasks = summary["tasks"].as_array().unwrap();
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0]["task_type"], "node_classification");
    assert_eq!(tasks[0]["batch_size"], 64);
    assert_eq!(tasks[0]["val_mask"], "val_nc");
    assert_eq!(tasks[1]["task_type"], "link_prediction");
    assert_eq!(tasks[1]["batch_size"], 128);
    assert_eq!(tasks[1]["task_weight"], 0.5);

    cli()
        .arg("--cf")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("multi-task (2 tasks)"));
}

#[test]
fn test_single_entry_multi_task_block_fails() {
    let dir = TempDir::new().unwrap();
    let mut yaml = basic_section(&dir);
    yaml.push_str(
        "  hyperparam:\n    batch_size: 64\n  multi_task_learning:\n    - node_classification:\n        \
         target_ntype: movie\n        label_field: genre\n        num_classes: 19\n",
    );
    let path = dir.path().join("mt.yaml");
    fs::write(&path, yaml).unwrap();

    cli().arg("--cf").arg(&path).assert().failure().stderr(predicate::str::contains("at least two tasks"));
}
