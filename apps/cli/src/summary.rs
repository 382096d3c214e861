//! Resolved configuration summary, rendered for humans or as JSON.

use std::collections::BTreeMap;

use colored::Colorize;
use graphstorm_config::formats::format_fanout;
use graphstorm_config::{ConfigResult, GsConfig, SettingSource, TaskInfo, TaskSettings, TaskSummary, TaskType};
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub yaml_config_file: String,
    pub mode: &'static str,
    pub task_type: Option<TaskType>,
    pub tasks: Vec<TaskSummary>,
    pub hyperparameters: BTreeMap<&'static str, Value>,
    pub overrides: Vec<String>,
}

/// Serializes an accessor result, `null` when the setting does not resolve.
fn field<T: Serialize>(result: ConfigResult<T>) -> Value {
    result.ok().and_then(|value| serde_json::to_value(value).ok()).unwrap_or(Value::Null)
}

impl RunSummary {
    pub fn collect(config: &GsConfig, inference: bool) -> anyhow::Result<Self> {
        let tasks = config
            .multi_tasks()
            .unwrap_or_default()
            .iter()
            .map(TaskInfo::summary)
            .collect::<ConfigResult<Vec<_>>>()?;

        let mut hyperparameters = BTreeMap::from([
            ("model_encoder_type", field(config.model_encoder_type())),
            ("num_layers", field(config.num_layers())),
            ("hidden_size", field(config.hidden_size())),
            ("fanout", field(config.fanout().map(|fanout| format_fanout(&fanout)))),
            ("eval_fanout", field(config.eval_fanout().map(|fanout| format_fanout(&fanout)))),
            ("lr", field(config.lr())),
            ("batch_size", field(config.batch_size())),
            ("num_epochs", field(config.num_epochs())),
            ("save_model_path", field(config.save_model_path())),
            ("save_embed_path", field(config.save_embed_path())),
        ]);
        if config.task_type().is_some() {
            hyperparameters.insert("eval_metric", field(config.eval_metric()));
        }

        let mut overrides: Vec<String> = config
            .settings()
            .iter()
            .filter(|(_, setting)| setting.source == SettingSource::Cli)
            .map(|(name, _)| name.clone())
            .collect();
        overrides.sort();

        Ok(Self {
            yaml_config_file: config.yaml_path().display().to_string(),
            mode: if inference { "inference" } else { "training" },
            task_type: config.task_type(),
            tasks,
            hyperparameters,
            overrides,
        })
    }

    pub fn print(&self) {
        println!("{}", "GraphStorm Configuration".bold().cyan());
        println!();

        println!("{}", "Run:".bold());
        println!("  Config: {}", self.yaml_config_file.green());
        println!("  Mode: {}", self.mode);
        match (self.task_type, self.tasks.len()) {
            (Some(task), _) => println!("  Task: {}", task.to_string().green()),
            (None, 0) => println!("  Task: {}", "none".yellow()),
            (None, count) => println!("  Task: {}", format!("multi-task ({count} tasks)").green()),
        }
        println!();

        if !self.tasks.is_empty() {
            println!("{}", "Tasks:".bold());
            for (index, task) in self.tasks.iter().enumerate() {
                println!("  [{}] {} {}", index, task.task_type.to_string().cyan(), task.task_id.dimmed());
                println!("      weight: {}  batch size: {}", task.task_weight, task.batch_size);
                if let (Some(train), Some(val), Some(test)) = (&task.train_mask, &task.val_mask, &task.test_mask) {
                    println!("      masks: {} / {} / {}", train, val, test);
                }
            }
            println!();
        }

        println!("{}", "Hyperparameters:".bold());
        for (name, value) in &self.hyperparameters {
            let rendered = match value {
                Value::Null => "-".dimmed().to_string(),
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            println!("  {}: {}", name, rendered);
        }
        println!();

        if !self.overrides.is_empty() {
            println!("{}", "Command line overrides:".bold());
            for name in &self.overrides {
                println!("  • {}", name);
            }
            println!();
        }

        println!("{}", "✓ Configuration is valid".green());
    }
}
