//! Language model blocks and the LM/GNN co-training method.

use serde::{Deserialize, Serialize};
use serde_yaml::Value;

use crate::error::{ConfigError, ConfigResult};
use crate::registry::TrainingMethodName;

/// One `lm_model.node_lm_models` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeLmConfig {
    pub lm_type: String,
    pub model_name: String,
    #[serde(default)]
    pub gradient_checkpoint: bool,
    pub node_types: Vec<String>,
}

/// One `lm_model.distill_lm_models` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistillLmConfig {
    pub lm_type: String,
    pub model_name: String,
}

/// GLEM options. Missing keys take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlemOptions {
    pub em_order_gnn_first: bool,
    pub inference_using_gnn: bool,
    pub pl_weight: f64,
    pub num_pretrain_epochs: i64,
}

impl Default for GlemOptions {
    fn default() -> Self {
        Self { em_order_gnn_first: false, inference_using_gnn: true, pl_weight: 0.5, num_pretrain_epochs: 5 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "name", content = "kwargs", rename_all = "snake_case")]
pub enum TrainingMethod {
    Default,
    Glem(GlemOptions),
}

impl TrainingMethod {
    #[must_use]
    pub fn name(&self) -> TrainingMethodName {
        match self {
            Self::Default => TrainingMethodName::Default,
            Self::Glem(_) => TrainingMethodName::Glem,
        }
    }

    #[must_use]
    pub fn is_glem(&self) -> bool {
        matches!(self, Self::Glem(_))
    }
}

fn entries<'a>(field: &str, value: &'a Value) -> ConfigResult<&'a [Value]> {
    let Value::Sequence(items) = value else {
        return Err(ConfigError::invalid(field, "language model config must be a list"));
    };
    if items.is_empty() {
        return Err(ConfigError::invalid(field, "number of language model configs must be larger than 0"));
    }
    Ok(items)
}

fn require_keys(field: &str, entry: &Value, keys: &[&str]) -> ConfigResult<()> {
    for key in keys {
        if entry.get(*key).is_none() {
            return Err(ConfigError::missing(&format!("{field}.{key}"), format!("{key} must be provided for {field}")));
        }
    }
    Ok(())
}

/// Parses and checks `node_lm_models`.
pub fn parse_node_lm_configs(field: &str, value: &Value) -> ConfigResult<Vec<NodeLmConfig>> {
    entries(field, value)?
        .iter()
        .map(|entry| {
            require_keys(field, entry, &["lm_type", "model_name", "node_types"])?;
            let config: NodeLmConfig = serde_yaml::from_value(entry.clone())
                .map_err(|e| ConfigError::invalid(field, e.to_string()))?;
            if config.node_types.is_empty() {
                return Err(ConfigError::invalid(field, "number of node types must be at least 1"));
            }
            Ok(config)
        })
        .collect()
}

/// Parses and checks `distill_lm_models`.
pub fn parse_distill_lm_configs(field: &str, value: &Value) -> ConfigResult<Vec<DistillLmConfig>> {
    entries(field, value)?
        .iter()
        .map(|entry| {
            require_keys(field, entry, &["lm_type", "model_name"])?;
            serde_yaml::from_value(entry.clone()).map_err(|e| ConfigError::invalid(field, e.to_string()))
        })
        .collect()
}

/// Parses `training_method: {name: ..., kwargs: {...}}`.
pub fn parse_training_method(field: &str, value: &Value) -> ConfigResult<TrainingMethod> {
    let name = value
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| ConfigError::missing(&format!("{field}.name"), "training method name must be provided"))?;
    let name: TrainingMethodName = name.parse().map_err(|e| ConfigError::invalid(field, format!("{e}")))?;

    match name {
        TrainingMethodName::Default => Ok(TrainingMethod::Default),
        TrainingMethodName::Glem => {
            let options = match value.get("kwargs") {
                Some(kwargs) if !kwargs.is_null() => serde_yaml::from_value(kwargs.clone())
                    .map_err(|e| ConfigError::invalid(field, e.to_string()))?,
                _ => GlemOptions::default(),
            };
            Ok(TrainingMethod::Glem(options))
        }
    }
}
