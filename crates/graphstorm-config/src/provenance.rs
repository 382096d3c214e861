//! Runtime config snapshot and graph construction config copy.
//!
//! Both artifacts land in the model output directory so a trained model
//! can be redeployed with the exact settings it was trained with. Writing
//! them is best effort: failures are logged and never abort the run.

use std::fs;
use std::path::{Path, PathBuf};

use serde_yaml::{Mapping, Value};
use tracing::{info, warn};

use crate::config::load_yaml_config;
use crate::error::{ConfigError, ConfigResult};
use crate::registry::{GCONSTRUCT_CONFIG_FILENAME, RUNTIME_CONFIG_FILENAME};
use crate::settings::{SettingSource, Settings};

const RUNTIME_SECTION: &str = "runtime";

/// Inputs of [`write_provenance`].
#[derive(Debug, Clone)]
pub struct Provenance<'a> {
    pub rank: u32,
    pub yaml_path: &'a Path,
    pub settings: &'a Settings,
    pub part_config: Option<PathBuf>,
    pub save_model_path: &'a Path,
}

/// Folds `value` into the first `gsf` section that declares `name`, or
/// into `gsf.runtime` when none does.
fn fold_setting(gsf: &mut Mapping, name: &str, value: &Value) -> ConfigResult<()> {
    for section in gsf.values_mut() {
        if let Value::Mapping(section) = section {
            if section.contains_key(name) {
                section.insert(Value::from(name), value.clone());
                return Ok(());
            }
        }
    }

    let runtime = gsf.entry(Value::from(RUNTIME_SECTION)).or_insert_with(|| Value::Mapping(Mapping::new()));
    let Value::Mapping(runtime) = runtime else {
        return Err(ConfigError::Malformed("gsf.runtime must be a mapping".to_string()));
    };
    runtime.insert(Value::from(name), value.clone());
    Ok(())
}

/// Re-reads the input YAML and writes it back with every resolved setting
/// folded into its section.
pub fn save_runtime_config(yaml_path: &Path, settings: &Settings, output_path: &Path) -> ConfigResult<()> {
    let mut document = load_yaml_config(yaml_path)?;
    let Some(Value::Mapping(gsf)) = document.get_mut("gsf") else {
        return Err(ConfigError::Malformed("GraphStorm configuration needs a 'gsf' section".to_string()));
    };

    for (name, setting) in settings.iter() {
        if matches!(setting.source, SettingSource::Yaml { .. } | SettingSource::Cli) {
            fold_setting(gsf, name, &setting.value)?;
        }
    }

    // Conflict handling may have rewritten the LM configs.
    if let Some(node_lm_configs) = settings.value("node_lm_configs") {
        if let Some(Value::Mapping(lm_model)) = document.get_mut("lm_model") {
            lm_model.insert(Value::from("node_lm_models"), node_lm_configs.clone());
        }
    }

    let rendered = serde_yaml::to_string(&document)
        .map_err(|source| ConfigError::Yaml { path: output_path.to_path_buf(), source })?;
    fs::write(output_path, rendered)?;
    info!("Saved combined configuration to {}", output_path.display());
    Ok(())
}

/// Copies the graph construction config found beside `part_config`.
/// Returns `false` when the partition has none.
pub fn copy_gconstruct_config(part_config: &Path, output_path: &Path) -> ConfigResult<bool> {
    let dir = part_config.parent().unwrap_or_else(|| Path::new(""));
    let input = dir.join(GCONSTRUCT_CONFIG_FILENAME);
    if !input.is_file() {
        return Ok(false);
    }
    fs::copy(&input, output_path)?;
    Ok(true)
}

/// Writes both artifacts into the model output directory on rank 0.
pub fn write_provenance(provenance: &Provenance<'_>) {
    if provenance.rank != 0 {
        return;
    }

    let output_dir = provenance.save_model_path;
    if let Err(e) = fs::create_dir_all(output_dir) {
        warn!("Could not save config: directory {} not accessible: {}", output_dir.display(), e);
        return;
    }

    let runtime_path = output_dir.join(RUNTIME_CONFIG_FILENAME);
    if let Err(e) = save_runtime_config(provenance.yaml_path, provenance.settings, &runtime_path) {
        warn!("Could not save config: {}", e);
    }

    let gconstruct_path = output_dir.join(GCONSTRUCT_CONFIG_FILENAME);
    match &provenance.part_config {
        Some(part_config) => match copy_gconstruct_config(part_config, &gconstruct_path) {
            Ok(true) => {}
            Ok(false) => warn!(
                "Graph construction config {} not found in {}. This is expected for older models \
                 (trained with version < 0.5). You will need to copy over the graph construction \
                 config for model deployment.",
                GCONSTRUCT_CONFIG_FILENAME,
                part_config.parent().unwrap_or_else(|| Path::new("")).display()
            ),
            Err(e) => warn!(
                "Failed to copy {} to model output: {}. You will need to copy over the graph \
                 construction config for model deployment.",
                GCONSTRUCT_CONFIG_FILENAME, e
            ),
        },
        None => warn!(
            "Failed to copy {}: graph partition config must be provided. You will need to copy over \
             the graph construction config for model deployment.",
            GCONSTRUCT_CONFIG_FILENAME
        ),
    }
}
