//! Named settings store with provenance.
//!
//! Every value the resolver reads lives here under its setting name together
//! with where it came from. Typed getters return `Ok(None)` for unset (or
//! YAML `null`) settings and an [`ConfigError::InvalidValue`] when the stored
//! value has the wrong shape.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Serialize;
use serde_yaml::Value;

use crate::error::{ConfigError, ConfigResult};

/// Every setting name the resolver understands.
pub const KNOWN_SETTINGS: &[&str] = &[
    // initialization
    "verbose",
    "use_wholegraph_embed",
    "use_graphbolt",
    // basic
    "backend",
    "ip_config",
    "part_config",
    "save_perf_results_path",
    "profile_path",
    // gnn
    "model_encoder_type",
    "input_activate",
    "node_feat_name",
    "edge_feat_name",
    "edge_feat_mp_op",
    "fanout",
    "eval_fanout",
    "hidden_size",
    "num_layers",
    "out_emb_size",
    "num_ffn_layers_in_input",
    "num_ffn_layers_in_gnn",
    "num_ffn_layers_in_decoder",
    "use_mini_batch_infer",
    "gnn_norm",
    "num_bases",
    "num_heads",
    // input
    "restore_model_layers",
    "restore_model_path",
    "restore_optimizer_path",
    // output
    "save_embed_path",
    "save_embed_format",
    "save_model_frequency",
    "save_model_path",
    "topk_model_to_save",
    // task tracker
    "task_tracker",
    "log_report_frequency",
    // hyperparameters
    "dropout",
    "decoder_bias",
    "lr",
    "num_epochs",
    "batch_size",
    "sparse_optimizer_lr",
    "max_grad_norm",
    "grad_norm_type",
    "use_node_embeddings",
    "construct_feat_ntype",
    "construct_feat_encoder",
    "construct_feat_fanout",
    "wd_l2norm",
    "alpha_l2norm",
    "use_self_loop",
    "eval_batch_size",
    "eval_frequency",
    "no_validation",
    "early_stop_burnin_rounds",
    "early_stop_rounds",
    "early_stop_strategy",
    "use_early_stop",
    // language models
    "lm_tune_lr",
    "lm_train_nodes",
    "lm_infer_batch_size",
    "freeze_lm_encoder_epochs",
    "max_seq_len",
    "cache_lm_embed",
    "training_method",
    "node_lm_configs",
    "distill_lm_configs",
    // node tasks
    "target_ntype",
    "eval_target_ntype",
    "label_field",
    "multilabel",
    "multilabel_weights",
    "imbalance_class_weights",
    "num_classes",
    "return_proba",
    "use_pseudolabel",
    "infer_all_target_nodes",
    "save_prediction_path",
    // edge tasks
    "target_etype",
    "decoder_edge_feat",
    "num_decoder_basis",
    "decoder_type",
    "decoder_norm",
    "remove_target_edge_type",
    // link prediction
    "lp_decoder_type",
    "num_negative_edges",
    "fixed_test_size",
    "num_negative_edges_eval",
    "train_negative_sampler",
    "eval_negative_sampler",
    "eval_etype",
    "train_etype",
    "exclude_training_targets",
    "reverse_edge_types_map",
    "gamma",
    "alpha",
    "class_loss_func",
    "regression_loss_func",
    "lp_loss_func",
    "contrastive_loss_temperature",
    "adversarial_temperature",
    "lp_embed_normalizer",
    "lp_edge_weight_for_loss",
    "model_select_etype",
    "train_etypes_negative_dstnode",
    "eval_etypes_negative_dstnode",
    "num_train_hard_negatives",
    // evaluation
    "eval_metric",
    "report_eval_per_type",
    // feature reconstruction
    "reconstruct_nfeat_name",
    "reconstruct_efeat_name",
    // distillation
    "textual_data_path",
    "max_distill_step",
    // multi-task entries
    "mask_fields",
    "task_weight",
];

/// Where a setting value came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SettingSource {
    /// A key under `gsf.<section>`.
    Yaml { section: String },
    /// The `lm_model` block.
    LmModel,
    /// The `udf` passthrough block.
    Udf,
    /// A command line override.
    Cli,
    /// A key of one `multi_task_learning` entry.
    Task,
    /// Filled in by the resolver itself.
    Derived,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Setting {
    pub value: Value,
    pub source: SettingSource,
}

/// One command line override.
#[derive(Debug, Clone, PartialEq)]
pub struct SettingOverride {
    pub name: String,
    pub value: Value,
}

impl SettingOverride {
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self { name: name.into(), value: value.into() }
    }
}

/// Settings keyed by name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Settings {
    entries: BTreeMap<String, Setting>,
}

#[must_use]
pub fn is_known_setting(name: &str) -> bool {
    KNOWN_SETTINGS.contains(&name)
}

fn type_error(name: &str, expected: &str, value: &Value) -> ConfigError {
    ConfigError::invalid(name, format!("expected {expected}, got {}", describe(value)))
}

/// Short rendering of a YAML value for error messages.
pub(crate) fn describe(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => format!("'{s}'"),
        Value::Sequence(_) => "a list".to_string(),
        Value::Mapping(_) => "a mapping".to_string(),
        Value::Tagged(tagged) => format!("tagged value {}", tagged.tag),
    }
}

fn scalar_to_string(name: &str, value: &Value) -> ConfigResult<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(type_error(name, "a string", other)),
    }
}

impl Settings {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value`, replacing any earlier value of the same name.
    pub fn set(&mut self, name: impl Into<String>, value: Value, source: SettingSource) {
        self.entries.insert(name.into(), Setting { value, source });
    }

    /// Applies a command line override. Unknown names are rejected.
    pub fn apply_override(&mut self, entry: SettingOverride) -> ConfigResult<()> {
        if !is_known_setting(&entry.name) {
            return Err(ConfigError::UnknownSetting(entry.name));
        }
        self.set(entry.name, entry.value, SettingSource::Cli);
        Ok(())
    }

    /// Whether the setting was given at all, including as `null`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Setting> {
        self.entries.get(name)
    }

    /// The stored value, with `null` treated as unset.
    #[must_use]
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.entries.get(name).map(|s| &s.value).filter(|v| !v.is_null())
    }

    #[must_use]
    pub fn source(&self, name: &str) -> Option<&SettingSource> {
        self.entries.get(name).map(|s| &s.source)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Setting)> {
        self.entries.iter()
    }

    pub(crate) fn value_mut(&mut self, name: &str) -> Option<&mut Value> {
        self.entries.get_mut(name).map(|s| &mut s.value)
    }

    pub fn int(&self, name: &str) -> ConfigResult<Option<i64>> {
        match self.value(name) {
            None => Ok(None),
            Some(value @ Value::Number(n)) => {
                n.as_i64().map(Some).ok_or_else(|| type_error(name, "an integer", value))
            }
            Some(other) => Err(type_error(name, "an integer", other)),
        }
    }

    /// Numbers and numeric strings such as `1e-3` are both accepted.
    pub fn float(&self, name: &str) -> ConfigResult<Option<f64>> {
        match self.value(name) {
            None => Ok(None),
            Some(value @ Value::Number(n)) => {
                n.as_f64().map(Some).ok_or_else(|| type_error(name, "a number", value))
            }
            Some(Value::String(s)) => s
                .trim()
                .parse::<f64>()
                .map(Some)
                .map_err(|_| ConfigError::invalid(name, format!("{name} must be a floating point, but got '{s}'"))),
            Some(other) => Err(type_error(name, "a number", other)),
        }
    }

    pub fn bool(&self, name: &str) -> ConfigResult<Option<bool>> {
        match self.value(name) {
            None => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(other) => Err(type_error(name, "true or false", other)),
        }
    }

    pub fn string(&self, name: &str) -> ConfigResult<Option<String>> {
        match self.value(name) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(other) => Err(type_error(name, "a string", other)),
        }
    }

    /// A list of strings. A lone scalar counts as a one element list.
    pub fn string_list(&self, name: &str) -> ConfigResult<Option<Vec<String>>> {
        match self.value(name) {
            None => Ok(None),
            Some(Value::Sequence(items)) => items
                .iter()
                .map(|item| scalar_to_string(name, item))
                .collect::<ConfigResult<Vec<_>>>()
                .map(Some),
            Some(scalar) => Ok(Some(vec![scalar_to_string(name, scalar)?])),
        }
    }

    pub fn path(&self, name: &str) -> ConfigResult<Option<PathBuf>> {
        Ok(self.string(name)?.map(PathBuf::from))
    }
}
