//! The resolved configuration of one training or inference run.
//!
//! [`GsConfig`] merges the YAML document and the command line overrides
//! into a single [`Settings`] store. Accessors read from that store,
//! apply defaults and check domains on every call; task-level accessors
//! come from [`TaskSettings`].

use std::fs;
use std::path::{Path, PathBuf};

use serde_yaml::Value;
use tracing::{debug, warn};

use crate::accessors::{ensure, required, vocab, TaskSettings};
use crate::args::GsArgs;
use crate::error::{ConfigError, ConfigResult};
use crate::etype::CanonicalEtype;
use crate::formats::{parse_edge_feat_names, parse_fanout, parse_node_feat_names, Fanout, FeatureNames};
use crate::lm::{
    parse_distill_lm_configs, parse_node_lm_configs, parse_training_method, DistillLmConfig, NodeLmConfig,
    TrainingMethod,
};
use crate::logging;
use crate::partition::{self, IdMapping};
use crate::provenance::{write_provenance, Provenance};
use crate::registry::{
    Backend, EarlyStopStrategy, EdgeFeatMpOp, EmbedFormat, EncoderType, InputActivation, ModelLayer, NormType,
    TaskTracker, TaskType, UnknownName,
};
use crate::settings::{is_known_setting, SettingOverride, SettingSource, Settings};
use crate::task::{expand_multi_tasks, TaskInfo};

const MULTI_TASK_SECTION: &str = "multi_task_learning";

/// Reads and parses a YAML config file.
pub fn load_yaml_config(path: &Path) -> ConfigResult<Value> {
    let contents =
        fs::read_to_string(path).map_err(|source| ConfigError::Load { path: path.to_path_buf(), source })?;
    serde_yaml::from_str(&contents).map_err(|source| ConfigError::Yaml { path: path.to_path_buf(), source })
}

/// Process rank from the `RANK` environment variable, 0 when unset.
#[must_use]
pub fn rank_from_env() -> u32 {
    std::env::var("RANK").ok().and_then(|rank| rank.trim().parse().ok()).unwrap_or(0)
}

/// Builder for [`GsConfig`].
#[derive(Debug, Clone)]
pub struct GsConfigBuilder {
    yaml_path: PathBuf,
    overrides: Vec<SettingOverride>,
    local_rank: u32,
    rank: u32,
    logging: Option<(String, Option<PathBuf>)>,
}

impl GsConfigBuilder {
    #[must_use]
    pub fn new(yaml_path: impl Into<PathBuf>) -> Self {
        Self { yaml_path: yaml_path.into(), overrides: Vec::new(), local_rank: 0, rank: 0, logging: None }
    }

    /// Adds a command line override. Later overrides of the same name win.
    #[must_use]
    pub fn override_setting(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.overrides.push(SettingOverride::new(name, value));
        self
    }

    #[must_use]
    pub fn overrides(mut self, overrides: impl IntoIterator<Item = SettingOverride>) -> Self {
        self.overrides.extend(overrides);
        self
    }

    #[must_use]
    pub fn local_rank(mut self, local_rank: u32) -> Self {
        self.local_rank = local_rank;
        self
    }

    #[must_use]
    pub fn rank(mut self, rank: u32) -> Self {
        self.rank = rank;
        self
    }

    /// Installs the global log subscriber before anything else is loaded.
    #[must_use]
    pub fn logging(mut self, level: impl Into<String>, file: Option<PathBuf>) -> Self {
        self.logging = Some((level.into(), file));
        self
    }

    pub fn build(self) -> ConfigResult<GsConfig> {
        if let Some((level, file)) = &self.logging {
            logging::init(level, file.as_deref())?;
        }

        let mut document = load_yaml_config(&self.yaml_path)?;
        let Some(Value::Mapping(gsf)) = document.get_mut("gsf") else {
            return Err(ConfigError::Malformed("GraphStorm configuration needs a 'gsf' section".to_string()));
        };
        let multi_task_block = gsf.shift_remove(MULTI_TASK_SECTION);

        let mut settings = Settings::new();
        load_lm_model(&document, &mut settings)?;
        let task_type = load_gsf(&document, &mut settings)?;
        load_udf(&document, &mut settings)?;

        for entry in self.overrides {
            debug!("Overriding Argument: {}", entry.name);
            settings.apply_override(entry)?;
        }

        let mut config = GsConfig {
            settings,
            yaml_path: self.yaml_path,
            local_rank: self.local_rank,
            rank: self.rank,
            task_type,
            multi_tasks: None,
        };
        config.handle_argument_conflicts()?;

        if let Some(block) = multi_task_block {
            config.multi_tasks = Some(expand_multi_tasks(&block, &config)?);
        }

        if let Some(save_model_path) = config.save_model_path()? {
            write_provenance(&Provenance {
                rank: config.rank,
                yaml_path: &config.yaml_path,
                settings: &config.settings,
                part_config: config.settings.path("part_config").ok().flatten(),
                save_model_path: &save_model_path,
            });
        }
        Ok(config)
    }
}

fn load_lm_model(document: &Value, settings: &mut Settings) -> ConfigResult<()> {
    let Some(lm_model) = document.get("lm_model") else { return Ok(()) };
    if let Some(node_lm_models) = lm_model.get("node_lm_models") {
        settings.set("node_lm_configs", node_lm_models.clone(), SettingSource::LmModel);
    } else if let Some(distill_lm_models) = lm_model.get("distill_lm_models") {
        settings.set("distill_lm_configs", distill_lm_models.clone(), SettingSource::LmModel);
    } else {
        return Err(ConfigError::Malformed(
            "either node_lm_models or distill_lm_models must be provided".to_string(),
        ));
    }
    Ok(())
}

/// Flattens the `gsf` sections and returns the task type they name.
fn load_gsf(document: &Value, settings: &mut Settings) -> ConfigResult<Option<TaskType>> {
    let Some(Value::Mapping(gsf)) = document.get("gsf") else {
        return Err(ConfigError::Malformed("GraphStorm configuration needs a 'gsf' section".to_string()));
    };

    let mut task_type = None;
    for (family, params) in gsf {
        let Some(family) = family.as_str() else {
            return Err(ConfigError::Malformed("gsf section names must be strings".to_string()));
        };
        if family == MULTI_TASK_SECTION {
            continue;
        }
        let Value::Mapping(params) = params else {
            return Err(ConfigError::Malformed(format!("gsf.{family} must be a mapping")));
        };
        for (key, value) in params {
            let Some(key) = key.as_str() else {
                return Err(ConfigError::Malformed(format!("setting names under gsf.{family} must be strings")));
            };
            if !is_known_setting(key) {
                warn!("Unknown setting {} in gsf.{}", key, family);
            }
            settings.set(key, value.clone(), SettingSource::Yaml { section: family.to_string() });
        }

        if let Some(task) = family.parse::<TaskType>().ok().filter(|task| task.is_single_task_family()) {
            if let Some(previous) = task_type.replace(task) {
                if previous != task {
                    warn!("Both {} and {} sections are present, using {}", previous, task, task);
                }
            }
        }
    }
    Ok(task_type)
}

fn load_udf(document: &Value, settings: &mut Settings) -> ConfigResult<()> {
    let Some(udf) = document.get("udf") else { return Ok(()) };
    let Value::Mapping(udf) = udf else {
        return Err(ConfigError::Malformed("udf must be a mapping".to_string()));
    };
    for (key, value) in udf {
        let key = key.as_str().ok_or_else(|| ConfigError::Malformed("udf keys must be strings".to_string()))?;
        settings.set(key, value.clone(), SettingSource::Udf);
    }
    Ok(())
}

/// The resolved configuration of a GraphStorm run.
#[derive(Debug, Clone)]
pub struct GsConfig {
    settings: Settings,
    yaml_path: PathBuf,
    local_rank: u32,
    rank: u32,
    task_type: Option<TaskType>,
    multi_tasks: Option<Vec<TaskInfo>>,
}

impl TaskSettings for GsConfig {
    fn settings(&self) -> &Settings {
        &self.settings
    }

    fn task_type(&self) -> Option<TaskType> {
        self.task_type
    }

    fn rank(&self) -> u32 {
        self.rank
    }
}

impl GsConfig {
    /// Builds the configuration from parsed command line arguments.
    pub fn from_args(args: &GsArgs) -> ConfigResult<Self> {
        GsConfigBuilder::new(&args.yaml_config_file)
            .logging(args.logging_level.clone(), args.logging_file.clone())
            .local_rank(args.local_rank)
            .rank(rank_from_env())
            .overrides(args.overrides.to_overrides()?)
            .build()
    }

    pub fn yaml_path(&self) -> &Path {
        &self.yaml_path
    }

    pub fn local_rank(&self) -> u32 {
        self.local_rank
    }

    /// Tasks of a multi-task run, in declaration order.
    pub fn multi_tasks(&self) -> Option<&[TaskInfo]> {
        self.multi_tasks.as_deref()
    }

    fn turn_off_gradient_checkpoint(&mut self, reason: &str) {
        let Some(Value::Sequence(configs)) = self.settings.value_mut("node_lm_configs") else { return };
        for config in configs {
            let Value::Mapping(config) = config else { continue };
            if config.get("gradient_checkpoint").and_then(Value::as_bool) == Some(true) {
                warn!("{} can not work with gradient checkpoint. Turn gradient checkpoint to False", reason);
                config.insert(Value::from("gradient_checkpoint"), Value::from(false));
            }
        }
    }

    /// Resolves settings that cannot be used together. Gradient
    /// checkpointing loses against LM warmup epochs and GLEM.
    fn handle_argument_conflicts(&mut self) -> ConfigResult<()> {
        if self.node_lm_configs()?.is_none() {
            return Ok(());
        }
        if self.freeze_lm_encoder_epochs()? > 0 {
            self.turn_off_gradient_checkpoint("freeze_lm_encoder_epochs");
        }
        if self.training_method()?.is_glem() {
            self.turn_off_gradient_checkpoint("GLEM model");
        }
        Ok(())
    }

    fn optional_path(&self, name: &str) -> ConfigResult<Option<PathBuf>> {
        self.settings.path(name)
    }

    fn bool_or(&self, name: &str, default: bool) -> ConfigResult<bool> {
        Ok(self.settings.bool(name)?.unwrap_or(default))
    }

    fn int_at_least(&self, name: &str, default: i64, min: i64, reason: &str) -> ConfigResult<i64> {
        let value = self.settings.int(name)?.unwrap_or(default);
        ensure(value >= min, name, reason)?;
        Ok(value)
    }

    // ---------------------------------------------------------------
    // Environment
    // ---------------------------------------------------------------

    pub fn save_perf_results_path(&self) -> ConfigResult<Option<PathBuf>> {
        self.optional_path("save_perf_results_path")
    }

    pub fn profile_path(&self) -> ConfigResult<Option<PathBuf>> {
        self.optional_path("profile_path")
    }

    /// Graph partition config file. Must exist.
    pub fn part_config(&self) -> ConfigResult<PathBuf> {
        let path =
            required(self.settings.path("part_config")?, "part_config", "graph partition config must be provided")?;
        ensure(path.is_file(), "part_config", format!("partition config file {} does not exist", path.display()))?;
        Ok(path)
    }

    pub fn graph_name(&self) -> ConfigResult<String> {
        partition::graph_name(&self.part_config()?)
    }

    pub fn backend(&self) -> ConfigResult<Backend> {
        Ok(vocab(&self.settings, "backend")?.unwrap_or(Backend::Gloo))
    }

    pub fn ip_config(&self) -> ConfigResult<Option<PathBuf>> {
        let path = self.settings.path("ip_config")?;
        if let Some(path) = &path {
            ensure(path.is_file(), "ip_config", format!("IP config file {} does not exist", path.display()))?;
        }
        Ok(path)
    }

    pub fn node_id_mapping_file(&self) -> ConfigResult<Option<PathBuf>> {
        partition::id_mapping_path(&self.part_config()?, IdMapping::Node)
    }

    pub fn edge_id_mapping_file(&self) -> ConfigResult<Option<PathBuf>> {
        partition::id_mapping_path(&self.part_config()?, IdMapping::Edge)
    }

    pub fn verbose(&self) -> ConfigResult<bool> {
        self.bool_or("verbose", false)
    }

    pub fn use_wholegraph_embed(&self) -> ConfigResult<Option<bool>> {
        self.settings.bool("use_wholegraph_embed")
    }

    pub fn use_graphbolt(&self) -> ConfigResult<bool> {
        self.bool_or("use_graphbolt", false)
    }

    // ---------------------------------------------------------------
    // Language models
    // ---------------------------------------------------------------

    pub fn lm_tune_lr(&self) -> ConfigResult<f64> {
        let Some(lr) = self.settings.float("lm_tune_lr")? else { return self.lr() };
        ensure(lr > 0.0, "lm_tune_lr", "Bert tune learning rate must > 0.0")?;
        Ok(lr)
    }

    /// Nodes used for LM fine-tuning. `0` disables it and `-1` uses all.
    pub fn lm_train_nodes(&self) -> ConfigResult<i64> {
        self.int_at_least("lm_train_nodes", 0, -1, "number of LM trainable nodes must be larger or equal to -1")
    }

    pub fn lm_infer_batch_size(&self) -> ConfigResult<i64> {
        self.int_at_least("lm_infer_batch_size", 32, 1, "batch size for LM model inference must be larger than 0")
    }

    /// GNN warmup epochs before the LM is fine-tuned.
    pub fn freeze_lm_encoder_epochs(&self) -> ConfigResult<i64> {
        const FIELD: &str = "freeze_lm_encoder_epochs";
        let Some(epochs) = self.settings.int(FIELD)? else { return Ok(0) };
        ensure(epochs >= 0, FIELD, "number of warmup epochs must be larger than or equal to 0")?;
        if epochs > 0 {
            let encoder = self.model_encoder_type()?;
            ensure(
                !matches!(encoder, Some(EncoderType::Lm | EncoderType::Mlp)),
                FIELD,
                "encoder type lm (language model) and mlp (encoder layer only) do not work with \
                 language model warmup",
            )?;
        }
        Ok(epochs)
    }

    pub fn training_method(&self) -> ConfigResult<TrainingMethod> {
        let Some(value) = self.settings.value("training_method") else { return Ok(TrainingMethod::Default) };
        let method = parse_training_method("training_method", value)?;
        if method.is_glem() && self.freeze_lm_encoder_epochs()? > 0 {
            warn!("GLEM does not support 'freeze_lm_encoder_epochs', it will be ignored");
        }
        Ok(method)
    }

    pub fn node_lm_configs(&self) -> ConfigResult<Option<Vec<NodeLmConfig>>> {
        self.settings.value("node_lm_configs").map(|value| parse_node_lm_configs("node_lm_configs", value)).transpose()
    }

    pub fn distill_lm_configs(&self) -> ConfigResult<Option<Vec<DistillLmConfig>>> {
        const FIELD: &str = "distill_lm_configs";
        match self.settings.get(FIELD) {
            None => Ok(None),
            Some(setting) if setting.value.is_null() => {
                Err(ConfigError::invalid(FIELD, "distill_lm_configs cannot be None"))
            }
            Some(setting) => parse_distill_lm_configs(FIELD, &setting.value).map(Some),
        }
    }

    pub fn cache_lm_embed(&self) -> ConfigResult<Option<bool>> {
        self.settings.bool("cache_lm_embed")
    }

    // ---------------------------------------------------------------
    // Model architecture
    // ---------------------------------------------------------------

    /// Encoder type. Required unless distilling a language model.
    pub fn model_encoder_type(&self) -> ConfigResult<Option<EncoderType>> {
        if self.distill_lm_configs()?.is_some() {
            return Ok(None);
        }
        let encoder = required(
            vocab(&self.settings, "model_encoder_type")?,
            "model_encoder_type",
            "model encoder type should be provided",
        )?;
        Ok(Some(encoder))
    }

    pub fn hidden_size(&self) -> ConfigResult<Option<i64>> {
        if self.distill_lm_configs()?.is_some() {
            return Ok(None);
        }
        let size = required(
            self.settings.int("hidden_size")?,
            "hidden_size",
            "hidden_size must be provided when pretrain a embedding layer, or train a GNN model",
        )?;
        ensure(size > 0, "hidden_size", "hidden embedding size must be larger than 0")?;
        Ok(Some(size))
    }

    /// GNN depth. Zero for encoders without GNN layers.
    pub fn num_layers(&self) -> ConfigResult<usize> {
        if !self.model_encoder_type()?.is_some_and(EncoderType::is_gnn) {
            return Ok(0);
        }
        let layers = required(self.settings.int("num_layers")?, "num_layers", "number of GNN layers must be provided")?;
        ensure(layers > 0, "num_layers", "number of GNN layers must be larger than 0")?;
        Ok(layers as usize)
    }

    pub fn out_emb_size(&self) -> ConfigResult<Option<i64>> {
        let Some(size) = self.settings.int("out_emb_size")? else { return Ok(None) };
        if self.settings.int("num_layers")?.unwrap_or(0) <= 1 {
            warn!("The out_emb_size is ignored given num_layers <= 1.");
            return Ok(None);
        }
        ensure(size > 0, "out_emb_size", "output embedding size must be larger than 0")?;
        Ok(Some(size))
    }

    pub fn input_activate(&self) -> ConfigResult<InputActivation> {
        Ok(vocab(&self.settings, "input_activate")?.unwrap_or(InputActivation::Identity))
    }

    /// RGCN weight bases; `-1` disables basis decomposition.
    pub fn num_bases(&self) -> ConfigResult<i64> {
        let bases = self.settings.int("num_bases")?.unwrap_or(-1);
        ensure(bases > 0 || bases == -1, "num_bases", "num_bases should be larger than 0 or -1")?;
        Ok(bases)
    }

    pub fn num_heads(&self) -> ConfigResult<i64> {
        self.int_at_least("num_heads", 4, 1, "num_heads should be larger than 0")
    }

    pub fn num_ffn_layers_in_input(&self) -> ConfigResult<i64> {
        self.int_at_least(
            "num_ffn_layers_in_input",
            0,
            0,
            "number of extra MLP layers in input layer must be larger or equal than 0",
        )
    }

    pub fn num_ffn_layers_in_gnn(&self) -> ConfigResult<i64> {
        self.int_at_least(
            "num_ffn_layers_in_gnn",
            0,
            0,
            "number of extra MLP layers between GNN layers must be larger or equal than 0",
        )
    }

    pub fn use_self_loop(&self) -> ConfigResult<bool> {
        self.bool_or("use_self_loop", true)
    }

    pub fn use_node_embeddings(&self) -> ConfigResult<bool> {
        self.bool_or("use_node_embeddings", false)
    }

    pub fn dropout(&self) -> ConfigResult<f64> {
        let dropout = self.settings.float("dropout")?.unwrap_or(0.0);
        ensure((0.0..1.0).contains(&dropout), "dropout", "dropout must be in [0, 1)")?;
        Ok(dropout)
    }

    pub fn gnn_norm(&self) -> ConfigResult<Option<NormType>> {
        vocab(&self.settings, "gnn_norm")
    }

    // ---------------------------------------------------------------
    // Input features and sampling
    // ---------------------------------------------------------------

    pub fn node_feat_name(&self) -> ConfigResult<Option<FeatureNames<String>>> {
        self.settings
            .string_list("node_feat_name")?
            .map(|entries| parse_node_feat_names("node_feat_name", &entries))
            .transpose()
    }

    pub fn edge_feat_name(&self) -> ConfigResult<Option<FeatureNames<CanonicalEtype>>> {
        self.settings
            .string_list("edge_feat_name")?
            .map(|entries| parse_edge_feat_names("edge_feat_name", &entries))
            .transpose()
    }

    pub fn edge_feat_mp_op(&self) -> ConfigResult<EdgeFeatMpOp> {
        Ok(vocab(&self.settings, "edge_feat_mp_op")?.unwrap_or(EdgeFeatMpOp::Concat))
    }

    /// Training fanout. Required for GNN encoders.
    pub fn fanout(&self) -> ConfigResult<Fanout> {
        let num_layers = self.num_layers()?;
        if !self.model_encoder_type()?.is_some_and(EncoderType::is_gnn) {
            return Ok(Fanout::all_neighbors(num_layers));
        }
        let raw = required(self.settings.string("fanout")?, "fanout", "training fanout must be provided")?;
        parse_fanout("fanout", "Train", &raw, num_layers)
    }

    /// Evaluation fanout. Defaults to every neighbor on each layer.
    pub fn eval_fanout(&self) -> ConfigResult<Fanout> {
        let num_layers = self.num_layers()?;
        match self.settings.string("eval_fanout")? {
            Some(raw) => parse_fanout("eval_fanout", "Evaluation", &raw, num_layers),
            None => Ok(Fanout::all_neighbors(num_layers)),
        }
    }

    pub fn construct_feat_ntype(&self) -> ConfigResult<Vec<String>> {
        Ok(self.settings.string_list("construct_feat_ntype")?.unwrap_or_default())
    }

    pub fn construct_feat_encoder(&self) -> ConfigResult<EncoderType> {
        let encoder = vocab(&self.settings, "construct_feat_encoder")?.unwrap_or(EncoderType::Rgcn);
        ensure(encoder == EncoderType::Rgcn, "construct_feat_encoder", "feature construction currently only support rgcn")?;
        Ok(encoder)
    }

    pub fn construct_feat_fanout(&self) -> ConfigResult<i64> {
        let fanout = self.settings.int("construct_feat_fanout")?.unwrap_or(5);
        ensure(
            fanout > 0 || fanout == -1,
            "construct_feat_fanout",
            "the fanout for feature construction should be positive or -1",
        )?;
        Ok(fanout)
    }

    // ---------------------------------------------------------------
    // Optimization
    // ---------------------------------------------------------------

    pub fn lr(&self) -> ConfigResult<f64> {
        let lr = required(self.settings.float("lr")?, "lr", "learning rate must be specified")?;
        ensure(lr > 0.0, "lr", "learning rate for input encoder, GNN encoder and task decoder must be larger than 0.0")?;
        Ok(lr)
    }

    pub fn sparse_optimizer_lr(&self) -> ConfigResult<f64> {
        let Some(lr) = self.settings.float("sparse_optimizer_lr")? else { return self.lr() };
        ensure(lr > 0.0, "sparse_optimizer_lr", "sparse optimizer learning rate must be larger than 0")?;
        Ok(lr)
    }

    /// Training epochs. Zero means inference only.
    pub fn num_epochs(&self) -> ConfigResult<i64> {
        self.int_at_least("num_epochs", 0, 0, "number of epochs must >= 0")
    }

    pub fn max_grad_norm(&self) -> ConfigResult<Option<f64>> {
        let norm = self.settings.float("max_grad_norm")?;
        if let Some(norm) = norm {
            ensure(norm > 0.0, "max_grad_norm", "max_grad_norm must be larger than 0")?;
        }
        Ok(norm)
    }

    /// Gradient norm type; `inf` maps to `f64::INFINITY`.
    pub fn grad_norm_type(&self) -> ConfigResult<f64> {
        let norm = self.settings.float("grad_norm_type")?.unwrap_or(2.0);
        ensure(norm > 0.0, "grad_norm_type", "grad_norm_type must be larger than 0 or inf")?;
        Ok(norm)
    }

    pub fn wd_l2norm(&self) -> ConfigResult<f64> {
        Ok(self.settings.float("wd_l2norm")?.unwrap_or(0.0))
    }

    pub fn alpha_l2norm(&self) -> ConfigResult<f64> {
        Ok(self.settings.float("alpha_l2norm")?.unwrap_or(0.0))
    }

    // ---------------------------------------------------------------
    // Evaluation and early stop
    // ---------------------------------------------------------------

    pub fn eval_batch_size(&self) -> ConfigResult<i64> {
        self.int_at_least("eval_batch_size", 10_000, 1, "eval_batch_size must be larger than 0")
    }

    /// Iterations between evaluations. Unbounded by default, i.e. only at
    /// the end of each epoch.
    pub fn eval_frequency(&self) -> ConfigResult<i64> {
        self.int_at_least("eval_frequency", i64::MAX, 1, "eval_frequency should larger than 0")
    }

    pub fn no_validation(&self) -> ConfigResult<bool> {
        self.bool_or("no_validation", false)
    }

    pub fn use_mini_batch_infer(&self) -> ConfigResult<bool> {
        if let Some(mini_batch) = self.settings.bool("use_mini_batch_infer")? {
            return Ok(mini_batch);
        }
        Ok(self.task_type != Some(TaskType::LinkPrediction))
    }

    pub fn early_stop_burnin_rounds(&self) -> ConfigResult<i64> {
        self.int_at_least(
            "early_stop_burnin_rounds",
            0,
            0,
            "early_stop_burnin_rounds should be larger than or equal to 0",
        )
    }

    pub fn early_stop_rounds(&self) -> ConfigResult<i64> {
        self.int_at_least("early_stop_rounds", 3, 1, "early_stop_rounds should be larger than 0")
    }

    pub fn early_stop_strategy(&self) -> ConfigResult<EarlyStopStrategy> {
        Ok(vocab(&self.settings, "early_stop_strategy")?.unwrap_or(EarlyStopStrategy::AverageIncrease))
    }

    pub fn use_early_stop(&self) -> ConfigResult<bool> {
        self.bool_or("use_early_stop", false)
    }

    // ---------------------------------------------------------------
    // Model input and output
    // ---------------------------------------------------------------

    pub fn restore_model_path(&self) -> ConfigResult<Option<PathBuf>> {
        self.optional_path("restore_model_path")
    }

    pub fn restore_optimizer_path(&self) -> ConfigResult<Option<PathBuf>> {
        self.optional_path("restore_optimizer_path")
    }

    /// Layers restored from `restore_model_path`. GLEM only restores the
    /// LM component, so the full default becomes `[embed]`.
    pub fn restore_model_layers(&self) -> ConfigResult<Vec<ModelLayer>> {
        const FIELD: &str = "restore_model_layers";
        let mut layers = ModelLayer::DEFAULT_RESTORE.to_vec();
        if let Some(raw) = self.settings.string(FIELD)? {
            ensure(
                self.restore_model_path()?.is_some(),
                FIELD,
                "restore-model-path must be provided if restore-model-layers is specified",
            )?;
            layers = raw
                .split(',')
                .map(|layer| {
                    layer.parse().map_err(|e: UnknownName| ConfigError::invalid(FIELD, e.to_string()))
                })
                .collect::<ConfigResult<Vec<_>>>()?;
        }
        if self.training_method()?.is_glem() && layers == ModelLayer::DEFAULT_RESTORE {
            warn!(
                "Restoring GLEM's LM from checkpoint only support [embed] and [embed, decoder]. Setting to: embed"
            );
            layers = vec![ModelLayer::Embed];
        }
        Ok(layers)
    }

    pub fn save_embed_path(&self) -> ConfigResult<Option<PathBuf>> {
        self.optional_path("save_embed_path")
    }

    pub fn save_embed_format(&self) -> ConfigResult<EmbedFormat> {
        Ok(vocab(&self.settings, "save_embed_format")?.unwrap_or(EmbedFormat::Pytorch))
    }

    pub fn save_model_path(&self) -> ConfigResult<Option<PathBuf>> {
        self.optional_path("save_model_path")
    }

    /// Iterations between checkpoints; `-1` saves at the end of each epoch.
    pub fn save_model_frequency(&self) -> ConfigResult<i64> {
        const FIELD: &str = "save_model_frequency";
        let Some(frequency) = self.settings.int(FIELD)? else { return Ok(-1) };
        ensure(self.save_model_path()?.is_some(), FIELD, "to save models, please specify a valid path")?;
        ensure(frequency > 0, FIELD, format!("save-model-frequency must large than 0, but got {frequency}"))?;
        Ok(frequency)
    }

    /// Best models kept on disk. `None` keeps every model.
    pub fn topk_model_to_save(&self) -> ConfigResult<Option<i64>> {
        const FIELD: &str = "topk_model_to_save";
        let Some(topk) = self.settings.int(FIELD)? else { return Ok(None) };
        ensure(topk > 0, FIELD, "top K best model must > 0")?;
        ensure(self.save_model_path()?.is_some(), FIELD, "to save models, please specify a valid path")?;
        Ok(Some(topk))
    }

    /// Defaults to `save_embed_path`. An explicit `none` disables it.
    pub fn save_prediction_path(&self) -> ConfigResult<Option<PathBuf>> {
        if self.settings.contains("save_prediction_path") {
            return self.optional_path("save_prediction_path");
        }
        self.save_embed_path()
    }

    // ---------------------------------------------------------------
    // Tracking
    // ---------------------------------------------------------------

    pub fn task_tracker(&self) -> ConfigResult<TaskTracker> {
        let Some(raw) = self.settings.string("task_tracker")? else { return Ok(TaskTracker::Sagemaker) };
        let name = raw.split(':').next().unwrap_or_default();
        name.parse().map_err(|e: UnknownName| ConfigError::invalid("task_tracker", e.to_string()))
    }

    /// Log directory given as `tensorboard_task_tracker:PATH`.
    pub fn task_tracker_logpath(&self) -> ConfigResult<Option<String>> {
        let Some(raw) = self.settings.string("task_tracker")? else { return Ok(None) };
        Ok(raw.split(':').nth(1).map(str::to_string))
    }

    pub fn log_report_frequency(&self) -> ConfigResult<i64> {
        self.int_at_least("log_report_frequency", 1000, 1, "log_report_frequency should be larger than 0")
    }

    // ---------------------------------------------------------------
    // Distillation
    // ---------------------------------------------------------------

    pub fn textual_data_path(&self) -> ConfigResult<Option<PathBuf>> {
        self.optional_path("textual_data_path")
    }

    pub fn max_distill_step(&self) -> ConfigResult<i64> {
        self.int_at_least("max_distill_step", 10_000, 1, "maximum training steps should be greater than 0")
    }

    pub fn max_seq_len(&self) -> ConfigResult<i64> {
        self.int_at_least(
            "max_seq_len",
            1024,
            1,
            "maximum sequence length for distillation should be greater than 0",
        )
    }

    // ---------------------------------------------------------------
    // Verification
    // ---------------------------------------------------------------

    /// Touches every accessor relevant to the run and returns the first
    /// error. Training-only settings are skipped when `is_train` is false.
    pub fn verify_arguments(&self, is_train: bool) -> ConfigResult<()> {
        self.save_perf_results_path()?;
        self.profile_path()?;
        self.graph_name()?;
        self.backend()?;
        self.ip_config()?;
        self.part_config()?;
        self.node_id_mapping_file()?;
        self.edge_id_mapping_file()?;
        self.verbose()?;
        self.use_wholegraph_embed()?;
        self.use_graphbolt()?;

        self.node_feat_name()?;
        self.edge_feat_name()?;
        self.edge_feat_mp_op()?;
        self.decoder_edge_feat()?;

        self.fixed_test_size()?;
        self.eval_fanout()?;
        self.use_mini_batch_infer()?;
        self.eval_batch_size()?;
        self.eval_frequency()?;
        self.no_validation()?;
        self.save_prediction_path()?;
        self.eval_etype()?;
        if self.task_type.is_some() {
            self.eval_metric()?;
        }

        if is_train {
            self.batch_size()?;
            self.fanout()?;
            self.lm_train_nodes()?;
            self.lm_tune_lr()?;
            self.lr()?;
            self.max_grad_norm()?;
            self.grad_norm_type()?;
            self.gnn_norm()?;
            self.decoder_norm()?;
            self.sparse_optimizer_lr()?;
            self.num_epochs()?;
            self.save_model_path()?;
            self.save_model_frequency()?;
            self.topk_model_to_save()?;
            self.early_stop_burnin_rounds()?;
            self.early_stop_rounds()?;
            self.early_stop_strategy()?;
            self.use_early_stop()?;
            self.wd_l2norm()?;
            self.train_negative_sampler()?;
            self.train_etype()?;
            self.remove_target_edge_type()?;
        }

        if self.node_lm_configs()?.is_some() {
            self.lm_infer_batch_size()?;
            self.freeze_lm_encoder_epochs()?;
        }
        if self.distill_lm_configs()?.is_some() {
            self.textual_data_path()?;
        }

        self.restore_model_layers()?;
        self.restore_model_path()?;
        self.restore_optimizer_path()?;
        self.save_embed_path()?;
        self.save_embed_format()?;

        self.dropout()?;
        self.decoder_type()?;
        self.num_decoder_basis()?;
        self.decoder_bias()?;
        self.construct_feat_ntype()?;
        self.construct_feat_encoder()?;
        self.construct_feat_fanout()?;
        if self.model_encoder_type()? == Some(EncoderType::Lm) {
            if self.node_lm_configs()?.is_none() {
                return Err(ConfigError::missing("node_lm_configs", "the lm encoder needs lm_model.node_lm_models"));
            }
        } else {
            self.input_activate()?;
            self.hidden_size()?;
            self.num_layers()?;
            self.out_emb_size()?;
            self.use_self_loop()?;
            self.use_node_embeddings()?;
            self.num_bases()?;
            self.num_heads()?;
            self.num_ffn_layers_in_gnn()?;
        }

        self.return_proba()?;
        self.alpha_l2norm()?;
        self.num_ffn_layers_in_input()?;
        self.num_ffn_layers_in_decoder()?;
        self.task_tracker()?;
        self.log_report_frequency()?;

        let Some(task) = self.task_type else { return Ok(()) };
        if task.is_classification() {
            self.label_field()?;
            self.num_classes()?;
            self.multilabel()?;
            self.multilabel_weights()?;
            self.imbalance_class_weights()?;
        }
        if matches!(task, TaskType::NodeClassification | TaskType::NodeRegression) {
            self.target_ntype()?;
            self.eval_target_ntype()?;
            self.infer_all_target_nodes()?;
        }
        if matches!(task, TaskType::EdgeClassification | TaskType::EdgeRegression) {
            self.target_etype()?;
        }
        if task.is_edge_task() && is_train {
            self.exclude_training_targets()?;
            self.reverse_edge_types_map()?;
        }
        if task == TaskType::LinkPrediction {
            self.gamma()?;
            self.lp_decoder_type()?;
            self.lp_edge_weight_for_loss()?;
            self.contrastive_loss_temperature()?;
            self.lp_loss_func()?;
            self.num_negative_edges()?;
            self.eval_negative_sampler()?;
            self.num_negative_edges_eval()?;
            self.model_select_etype()?;
            self.lp_embed_normalizer()?;
        }
        Ok(())
    }
}
