//! End-to-end resolution of YAML files and command line arguments.

use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use graphstorm_config::registry::{GCONSTRUCT_CONFIG_FILENAME, RUNTIME_CONFIG_FILENAME};
use graphstorm_config::{
    CanonicalEtype, ConfigError, GsArgs, GsConfig, GsConfigBuilder, PerType, TaskSettings, TaskType,
};
use serde_yaml::Value;
use tempfile::TempDir;

fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

fn from_cli(yaml: &Path, extra: &[&str]) -> Result<GsConfig, ConfigError> {
    let mut argv = vec!["gs".to_string(), "--cf".to_string(), yaml.to_string_lossy().to_string()];
    argv.extend(extra.iter().map(ToString::to_string));
    GsConfig::from_args(&GsArgs::try_parse_from(argv).unwrap())
}

const NODE_CLASSIFICATION: &str = r"
gsf:
  basic:
    model_encoder_type: rgcn
    num_layers: 1
    fanout: '4'
    lr: 0.001
  gnn:
    hidden_size: 32
  node_classification:
    target_ntype: movie
    label_field: label
    num_classes: 5
";

#[test]
fn test_node_classification_with_cli_batch_size() {
    let dir = TempDir::new().unwrap();
    let yaml = write(&dir, "nc.yaml", NODE_CLASSIFICATION);
    let config = from_cli(&yaml, &["--batch-size", "64"]).unwrap();

    assert_eq!(config.task_type(), Some(TaskType::NodeClassification));
    assert_eq!(config.batch_size().unwrap(), 64);
    assert_eq!(config.num_classes().unwrap(), PerType::Single(5));
    assert_eq!(config.eval_metric().unwrap(), vec!["accuracy"]);
}

#[test]
fn test_cli_override_beats_yaml() {
    let dir = TempDir::new().unwrap();
    let yaml = format!("{NODE_CLASSIFICATION}  output:\n    save_embed_path: /models/emb\n    batch_size: 8\n");
    let yaml = write(&dir, "nc.yaml", &yaml);

    let config = from_cli(&yaml, &["--batch-size", "16", "--save-embed-path", "None"]).unwrap();
    assert_eq!(config.batch_size().unwrap(), 16);
    assert_eq!(config.save_embed_path().unwrap(), None);

    let config = from_cli(&yaml, &[]).unwrap();
    assert_eq!(config.batch_size().unwrap(), 8);
    assert_eq!(config.save_embed_path().unwrap(), Some(PathBuf::from("/models/emb")));
    assert_eq!(config.save_prediction_path().unwrap(), Some(PathBuf::from("/models/emb")));
}

#[test]
fn test_none_disables_every_output_path() {
    let dir = TempDir::new().unwrap();
    let model_dir = dir.path().join("model");
    let yaml = format!(
        "{NODE_CLASSIFICATION}  output:\n    save_model_path: {}\n    save_embed_path: /models/emb\n    \
         save_prediction_path: /models/pred\n",
        model_dir.display()
    );
    let yaml = write(&dir, "nc.yaml", &yaml);

    for sentinel in ["none", "None", "NONE"] {
        let config = from_cli(&yaml, &["--save-model-path", sentinel]).unwrap();
        assert_eq!(config.save_model_path().unwrap(), None);
    }
    assert!(!model_dir.exists());

    for sentinel in ["none", "None", "NONE"] {
        let config = from_cli(&yaml, &["--save-embed-path", sentinel]).unwrap();
        assert_eq!(config.save_embed_path().unwrap(), None);
        let config = from_cli(&yaml, &["--save-prediction-path", sentinel]).unwrap();
        assert_eq!(config.save_prediction_path().unwrap(), None);
    }

    let config = from_cli(&yaml, &["--save-embed-path", "none"]).unwrap();
    assert_eq!(config.save_prediction_path().unwrap(), Some(PathBuf::from("/models/pred")));
    assert!(model_dir.join(RUNTIME_CONFIG_FILENAME).is_file());
}

#[test]
fn test_multi_task_block_needs_two_tasks() {
    let dir = TempDir::new().unwrap();
    let yaml = write(
        &dir,
        "mt.yaml",
        r"
gsf:
  basic:
    batch_size: 32
  multi_task_learning:
    - node_classification:
        target_ntype: movie
        label_field: label
        num_classes: 5
",
    );
    let err = GsConfigBuilder::new(yaml).build().unwrap_err();
    assert!(err.to_string().contains("at least two tasks"));
}

#[test]
fn test_multi_task_block_keeps_order() {
    let dir = TempDir::new().unwrap();
    let yaml = write(
        &dir,
        "mt.yaml",
        r"
gsf:
  basic:
    batch_size: 32
  multi_task_learning:
    - node_classification:
        target_ntype: movie
        label_field: label
        num_classes: 5
        mask_fields: [train_nc, val_nc, test_nc]
        task_weight: 1.0
    - link_prediction:
        num_negative_edges: 4
        reverse_edge_types_map: ['user,rating,rating-rev,movie']
        task_weight: 0.5
",
    );
    let config = GsConfigBuilder::new(yaml).build().unwrap();
    assert_eq!(config.task_type(), None);

    let tasks = config.multi_tasks().unwrap();
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0].task_type, TaskType::NodeClassification);
    assert_eq!(tasks[1].task_type, TaskType::LinkPrediction);
    assert_ne!(tasks[0].task_id, tasks[1].task_id);

    let lp = &tasks[1].task_config;
    assert_eq!(lp.num_negative_edges().unwrap(), 4);
    assert_eq!(lp.batch_size().unwrap(), 32);
    assert!((lp.task_weight() - 0.5).abs() < f64::EPSILON);
    assert!(lp.exclude_training_targets().unwrap());
    assert_eq!(tasks[0].task_config.val_mask(), Some("val_nc"));
}

#[test]
fn test_reverse_edge_types_map() {
    let dir = TempDir::new().unwrap();
    let yaml = write(
        &dir,
        "lp.yaml",
        r"
gsf:
  basic:
    batch_size: 32
  link_prediction:
    reverse_edge_types_map: ['a,r,revr,b']
",
    );
    let config = GsConfigBuilder::new(&yaml).build().unwrap();
    let map = config.reverse_edge_types_map().unwrap();
    assert_eq!(map.len(), 1);
    assert_eq!(map[&CanonicalEtype::new("a", "r", "b")], CanonicalEtype::new("b", "revr", "a"));
    assert!(config.exclude_training_targets().unwrap());

    let config = GsConfigBuilder::new(&yaml).override_setting("reverse_edge_types_map", Value::Null).build().unwrap();
    assert!(config.reverse_edge_types_map().unwrap().is_empty());
    assert!(config.exclude_training_targets().is_err());
}

#[test]
fn test_provenance_artifacts() {
    let dir = TempDir::new().unwrap();
    let part_dir = dir.path().join("partitions");
    fs::create_dir(&part_dir).unwrap();
    fs::write(part_dir.join("graph.json"), r#"{"graph_name": "movielens"}"#).unwrap();
    fs::write(part_dir.join(GCONSTRUCT_CONFIG_FILENAME), r#"{"nodes": []}"#).unwrap();

    let model_dir = dir.path().join("model");
    let yaml = format!(
        "{NODE_CLASSIFICATION}  input:\n    part_config: {}\n  output:\n    save_model_path: {}\n",
        part_dir.join("graph.json").display(),
        model_dir.display()
    );
    let yaml = write(&dir, "nc.yaml", &yaml);
    from_cli(&yaml, &["--batch-size", "64", "--num-epochs", "3"]).unwrap();

    let saved: Value =
        serde_yaml::from_str(&fs::read_to_string(model_dir.join(RUNTIME_CONFIG_FILENAME)).unwrap()).unwrap();
    assert_eq!(saved["gsf"]["runtime"]["batch_size"], Value::from(64));
    assert_eq!(saved["gsf"]["runtime"]["num_epochs"], Value::from(3));
    assert_eq!(saved["gsf"]["node_classification"]["num_classes"], Value::from(5));
    assert_eq!(fs::read_to_string(model_dir.join(GCONSTRUCT_CONFIG_FILENAME)).unwrap(), r#"{"nodes": []}"#);
}

#[test]
fn test_missing_gconstruct_config_is_not_fatal() {
    let dir = TempDir::new().unwrap();
    let model_dir = dir.path().join("model");
    let yaml = format!("{NODE_CLASSIFICATION}  output:\n    save_model_path: {}\n", model_dir.display());
    let yaml = write(&dir, "nc.yaml", &yaml);

    GsConfigBuilder::new(yaml).build().unwrap();
    assert!(model_dir.join(RUNTIME_CONFIG_FILENAME).is_file());
    assert!(!model_dir.join(GCONSTRUCT_CONFIG_FILENAME).exists());
}

#[test]
fn test_task_ids_are_deterministic() {
    let dir = TempDir::new().unwrap();
    let block = r"
gsf:
  basic:
    batch_size: 32
  multi_task_learning:
    - node_classification: {target_ntype: movie, label_field: label, num_classes: 3}
    - node_classification: {target_ntype: movie, label_field: label, num_classes: 3}
";
    let first = GsConfigBuilder::new(write(&dir, "a.yaml", block)).build().unwrap();
    let second = GsConfigBuilder::new(write(&dir, "b.yaml", block)).build().unwrap();
    let ids = |config: &GsConfig| -> Vec<String> {
        config.multi_tasks().unwrap().iter().map(|task| task.task_id.clone()).collect()
    };
    assert_eq!(ids(&first), ids(&second));
    assert_eq!(ids(&first)[0], ids(&first)[1]);
}

#[test]
fn test_inference_verification_skips_training_settings() {
    let dir = TempDir::new().unwrap();
    let part_config = write(&dir, "graph.json", r#"{"graph_name": "movielens"}"#);
    let yaml = format!(
        "gsf:\n  basic:\n    model_encoder_type: rgcn\n    num_layers: 1\n    part_config: {}\n  gnn:\n    \
         hidden_size: 8\n  node_regression:\n    target_ntype: movie\n    label_field: rating\n",
        part_config.display()
    );
    let config = GsConfigBuilder::new(write(&dir, "nr.yaml", &yaml)).build().unwrap();
    config.verify_arguments(false).unwrap();
    assert!(matches!(config.verify_arguments(true), Err(ConfigError::Missing { .. })));
}
