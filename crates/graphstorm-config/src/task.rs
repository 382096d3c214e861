//! Multi-task expansion.
//!
//! Each entry of `gsf.multi_task_learning` becomes a [`TaskInfo`] whose
//! [`TaskConfig`] only sees the entry's own settings plus the resolved
//! batch size.

use serde::Serialize;
use serde_yaml::Value;
use tracing::debug;

use crate::accessors::{NodeTarget, TaskSettings};
use crate::error::{ConfigError, ConfigResult};
use crate::etype::CanonicalEtype;
use crate::registry::{TaskType, ALL_ETYPE_TASK_ID};
use crate::settings::{describe, SettingSource, Settings};

/// Settings scoped to one task of a multi-task run.
#[derive(Debug, Clone)]
pub struct TaskConfig {
    settings: Settings,
    task_type: TaskType,
    rank: u32,
    train_mask: Option<String>,
    val_mask: Option<String>,
    test_mask: Option<String>,
    task_weight: f64,
}

impl TaskConfig {
    pub fn train_mask(&self) -> Option<&str> {
        self.train_mask.as_deref()
    }

    pub fn val_mask(&self) -> Option<&str> {
        self.val_mask.as_deref()
    }

    pub fn test_mask(&self) -> Option<&str> {
        self.test_mask.as_deref()
    }

    /// Weight of this task's loss in the combined objective.
    pub fn task_weight(&self) -> f64 {
        self.task_weight
    }
}

impl TaskSettings for TaskConfig {
    fn settings(&self) -> &Settings {
        &self.settings
    }

    fn task_type(&self) -> Option<TaskType> {
        Some(self.task_type)
    }

    fn rank(&self) -> u32 {
        self.rank
    }
}

/// One resolved learning task.
#[derive(Debug, Clone)]
pub struct TaskInfo {
    pub task_type: TaskType,
    pub task_id: String,
    pub task_config: TaskConfig,
}

/// Serializable view of a task used in summaries.
#[derive(Debug, Clone, Serialize)]
pub struct TaskSummary {
    pub task_type: TaskType,
    pub task_id: String,
    pub train_mask: Option<String>,
    pub val_mask: Option<String>,
    pub test_mask: Option<String>,
    pub task_weight: f64,
    pub batch_size: i64,
}

impl TaskInfo {
    pub fn summary(&self) -> ConfigResult<TaskSummary> {
        let config = &self.task_config;
        Ok(TaskSummary {
            task_type: self.task_type,
            task_id: self.task_id.clone(),
            train_mask: config.train_mask.clone(),
            val_mask: config.val_mask.clone(),
            test_mask: config.test_mask.clone(),
            task_weight: config.task_weight,
            batch_size: config.batch_size()?,
        })
    }
}

fn etypes_fragment(etypes: &[CanonicalEtype]) -> String {
    etypes.iter().map(|etype| etype.joined("_")).collect::<Vec<_>>().join("__")
}

/// Builds `task_type[-ntype][-etypes][-label]`.
#[must_use]
pub fn task_id(task_type: TaskType, ntype: Option<&NodeTarget>, etypes: Option<&str>, label: Option<&str>) -> String {
    let mut parts = vec![task_type.as_str().to_string()];
    if let Some(ntype) = ntype {
        parts.push(ntype.id_fragment());
    }
    if let Some(etypes) = etypes {
        parts.push(etypes.to_string());
    }
    if let Some(label) = label {
        parts.push(label.to_string());
    }
    parts.join("-")
}

fn mask_fields(settings: &Settings) -> ConfigResult<(Option<String>, Option<String>, Option<String>)> {
    let Some(value) = settings.value("mask_fields") else { return Ok((None, None, None)) };
    let Value::Sequence(items) = value else {
        return Err(ConfigError::invalid(
            "mask_fields",
            format!("the mask_fields should be a list as [train-mask, validation-mask, test-mask], but got {}", describe(value)),
        ));
    };
    let masks: Vec<Option<String>> = items.iter().map(|item| item.as_str().map(str::to_string)).collect();
    match masks.as_slice() {
        [train, val, test] => Ok((train.clone(), val.clone(), test.clone())),
        _ => Err(ConfigError::invalid(
            "mask_fields",
            format!(
                "the mask_fields should be a list as [train-mask, validation-mask, test-mask], but got {} entries",
                masks.len()
            ),
        )),
    }
}

fn task_weight(settings: &Settings) -> ConfigResult<f64> {
    let weight = settings.float("task_weight")?.unwrap_or(1.0);
    if weight <= 0.0 {
        return Err(ConfigError::invalid("task_weight", format!("task_weight should be larger than 0, but got {weight}")));
    }
    Ok(weight)
}

fn compute_task_id(config: &TaskConfig) -> ConfigResult<String> {
    let task = config.task_type;
    let id = match task {
        TaskType::NodeClassification | TaskType::NodeRegression => {
            task_id(task, Some(&config.target_ntype()?), None, Some(&config.label_field()?))
        }
        TaskType::EdgeClassification | TaskType::EdgeRegression => {
            task_id(task, None, Some(&etypes_fragment(&config.target_etype()?)), Some(&config.label_field()?))
        }
        TaskType::LinkPrediction => {
            let etypes = config
                .train_etype()?
                .map_or_else(|| ALL_ETYPE_TASK_ID.to_string(), |etypes| etypes_fragment(&etypes));
            task_id(task, None, Some(&etypes), None)
        }
        TaskType::ReconstructNodeFeat => {
            task_id(task, Some(&config.target_ntype()?), None, Some(&config.reconstruct_nfeat_name()?))
        }
        TaskType::ReconstructEdgeFeat => task_id(
            task,
            None,
            Some(&etypes_fragment(&config.target_etype()?)),
            Some(&config.reconstruct_efeat_name()?),
        ),
    };
    Ok(id)
}

fn parse_task(
    task_type: TaskType,
    body: &Value,
    global: &impl TaskSettings,
) -> ConfigResult<TaskInfo> {
    let mut settings = Settings::new();
    match body {
        Value::Mapping(entries) => {
            for (key, value) in entries {
                let key = key
                    .as_str()
                    .ok_or_else(|| ConfigError::MultiTask(format!("task setting names must be strings, got {}", describe(key))))?;
                settings.set(key, value.clone(), SettingSource::Task);
            }
        }
        Value::Null => {}
        other => {
            return Err(ConfigError::MultiTask(format!(
                "the {task_type} task must be a mapping of settings, got {}",
                describe(other)
            )));
        }
    }

    let (train_mask, val_mask, test_mask) = mask_fields(&settings)?;
    let task_weight = task_weight(&settings)?;
    if settings.value("batch_size").is_none() {
        settings.set("batch_size", Value::from(global.batch_size()?), SettingSource::Derived);
    }

    let task_config = TaskConfig {
        settings,
        task_type,
        rank: global.rank(),
        train_mask,
        val_mask,
        test_mask,
        task_weight,
    };
    task_config.verify_task_arguments(task_type)?;
    let task_id = compute_task_id(&task_config)?;
    debug!("Parsed {} task {}", task_type, task_id);

    Ok(TaskInfo { task_type, task_id, task_config })
}

/// Expands a `multi_task_learning` block, keeping input order.
pub fn expand_multi_tasks(block: &Value, global: &impl TaskSettings) -> ConfigResult<Vec<TaskInfo>> {
    let Value::Sequence(entries) = block else {
        return Err(ConfigError::MultiTask(format!("multi_task_learning must be a list, got {}", describe(block))));
    };
    if entries.len() < 2 {
        return Err(ConfigError::MultiTask("There must be at least two tasks".to_string()));
    }

    let mut tasks = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        let (name, body) = match entry {
            Value::Mapping(map) if map.len() == 1 => map
                .iter()
                .next()
                .ok_or_else(|| ConfigError::MultiTask("empty task entry".to_string()))?,
            _ => {
                return Err(ConfigError::MultiTask(
                    "When defining multiple tasks for training, define one task each time.".to_string(),
                ));
            }
        };
        let name = name.as_str().unwrap_or_default();
        let task_type: TaskType = name
            .parse()
            .map_err(|_| ConfigError::MultiTask(format!("Invalid task type in multi-task learning {name}.")))?;

        let task = parse_task(task_type, body, global).map_err(|source| ConfigError::Task {
            index,
            task_type: task_type.to_string(),
            source: Box::new(source),
        })?;
        tasks.push(task);
    }
    Ok(tasks)
}
