//! Command line surface shared by every GraphStorm launcher.
//!
//! [`GsArgs`] carries the arguments that are not settings (config file,
//! local rank, logging) and flattens [`OverrideArgs`], whose fields mirror
//! the YAML setting names. Every override is optional so that an unset flag
//! never shadows the YAML value.

use std::path::PathBuf;

use clap::{Args, Parser};
use serde::Serialize;
use serde_yaml::Value;

use crate::error::{ConfigError, ConfigResult};
use crate::settings::SettingOverride;

/// Path settings where the literal `none` disables the output.
pub const NONE_PATH_SETTINGS: &[&str] = &["save_model_path", "save_embed_path", "save_prediction_path"];

/// Boolean flags take a value; `true` and `1` (any case) are true.
pub fn parse_bool_flag(raw: &str) -> Result<bool, String> {
    Ok(matches!(raw.to_ascii_lowercase().as_str(), "true" | "1"))
}

/// GraphStorm training and inference arguments.
#[derive(Parser, Debug, Clone)]
#[command(about = "GSGNN Arguments")]
pub struct GsArgs {
    /// Pointer to the yaml configuration file of the experiment
    #[arg(long = "yaml_config_file", visible_alias = "cf")]
    pub yaml_config_file: PathBuf,

    /// local_rank for distributed training on gpus
    #[arg(long = "local-rank", alias = "local_rank", default_value_t = 0)]
    pub local_rank: u32,

    /// Logging level: debug, info, warning, error
    #[arg(long = "logging-level", default_value = "info")]
    pub logging_level: String,

    /// The file where the logging is saved to
    #[arg(long = "logging-file")]
    pub logging_file: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: OverrideArgs,
}

/// Optional overrides for YAML settings.
#[derive(Args, Debug, Clone, Default, Serialize)]
pub struct OverrideArgs {
    // initialization
    /// Print more information
    #[arg(long, value_parser = parse_bool_flag)]
    pub verbose: Option<bool>,
    /// Store intermediate embeddings with WholeGraph
    #[arg(long, value_parser = parse_bool_flag)]
    pub use_wholegraph_embed: Option<bool>,
    /// Use the GraphBolt in-memory graph representation
    #[arg(long, value_parser = parse_bool_flag)]
    pub use_graphbolt: Option<bool>,

    // basic
    /// Distributed backend: gloo or nccl
    #[arg(long)]
    pub backend: Option<String>,
    /// File listing the IP addresses of the cluster
    #[arg(long)]
    pub ip_config: Option<String>,
    /// Graph partition configuration file
    #[arg(long)]
    pub part_config: Option<String>,
    /// Where to save performance results
    #[arg(long)]
    pub save_perf_results_path: Option<String>,
    /// Where to save profiling results
    #[arg(long)]
    pub profile_path: Option<String>,

    // gnn
    /// Model encoder: lm, mlp, gat, rgat, rgcn, sage, hgt, gatv2
    #[arg(long)]
    pub model_encoder_type: Option<String>,
    /// Input layer activation: none or relu
    #[arg(long)]
    pub input_activate: Option<String>,
    /// Node features: `feat` or `ntype0:feat0,feat1 ntype1:feat0`
    #[arg(long, num_args = 1..)]
    pub node_feat_name: Option<Vec<String>>,
    /// Edge features: `feat` or `src,rel,dst:feat0,feat1 ...`
    #[arg(long, num_args = 1..)]
    pub edge_feat_name: Option<Vec<String>>,
    /// Edge feature message passing operation: concat, add, sub, mul, div
    #[arg(long)]
    pub edge_feat_mp_op: Option<String>,
    /// Training fanout, e.g. `20,10` or `n0/r0/n1:20@n1/r1/n0:10,...`
    #[arg(long, allow_hyphen_values = true)]
    pub fanout: Option<String>,
    /// Evaluation fanout, same format as --fanout
    #[arg(long, allow_hyphen_values = true)]
    pub eval_fanout: Option<String>,
    /// Hidden layer size
    #[arg(long)]
    pub hidden_size: Option<i64>,
    /// Number of GNN layers
    #[arg(long)]
    pub num_layers: Option<i64>,
    /// Extra MLP layers in the input layer
    #[arg(long)]
    pub num_ffn_layers_in_input: Option<i64>,
    /// Extra MLP layers between GNN layers
    #[arg(long)]
    pub num_ffn_layers_in_gnn: Option<i64>,
    /// Extra MLP layers in the decoder
    #[arg(long)]
    pub num_ffn_layers_in_decoder: Option<i64>,
    /// Mini-batch inference instead of full graph inference
    #[arg(long, value_parser = parse_bool_flag)]
    pub use_mini_batch_infer: Option<bool>,

    // input
    /// Model layers to restore, e.g. `embed,gnn,decoder`
    #[arg(long)]
    pub restore_model_layers: Option<String>,
    /// Path of saved model parameters to restore
    #[arg(long)]
    pub restore_model_path: Option<String>,
    /// Path of saved optimizer state to restore
    #[arg(long)]
    pub restore_optimizer_path: Option<String>,

    // output
    /// Where to save node embeddings, `none` to disable
    #[arg(long)]
    pub save_embed_path: Option<String>,
    /// Embedding format: pytorch or hdf5
    #[arg(long)]
    pub save_embed_format: Option<String>,
    /// Save the model every N iterations
    #[arg(long)]
    pub save_model_frequency: Option<i64>,
    /// Where to save the model, `none` to disable
    #[arg(long)]
    pub save_model_path: Option<String>,
    /// Keep the K best models
    #[arg(long)]
    pub topk_model_to_save: Option<i64>,

    // task tracker
    /// Task tracker: sagemaker_task_tracker or tensorboard_task_tracker[:LOGPATH]
    #[arg(long)]
    pub task_tracker: Option<String>,
    /// Report logs every N iterations
    #[arg(long)]
    pub log_report_frequency: Option<i64>,

    // hyperparameters
    /// Dropout probability in [0, 1)
    #[arg(long)]
    pub dropout: Option<f64>,
    /// Whether the decoder has a bias
    #[arg(long, value_parser = parse_bool_flag)]
    pub decoder_bias: Option<bool>,
    /// GNN normalization: batch or layer
    #[arg(long)]
    pub gnn_norm: Option<String>,
    /// Learning rate
    #[arg(long)]
    pub lr: Option<f64>,
    /// Number of training epochs
    #[arg(short = 'e', long)]
    pub num_epochs: Option<i64>,
    /// Mini-batch size per trainer
    #[arg(long)]
    pub batch_size: Option<i64>,
    /// Learning rate of sparse embeddings
    #[arg(long)]
    pub sparse_optimizer_lr: Option<f64>,
    /// Gradient clipping threshold
    #[arg(long)]
    pub max_grad_norm: Option<f64>,
    /// Norm used for gradient clipping, `inf` allowed
    #[arg(long)]
    pub grad_norm_type: Option<f64>,
    /// Add learnable node embeddings
    #[arg(long, value_parser = parse_bool_flag)]
    pub use_node_embeddings: Option<bool>,
    /// Node types whose features are constructed
    #[arg(long, num_args = 1..)]
    pub construct_feat_ntype: Option<Vec<String>>,
    /// Encoder used to construct node features
    #[arg(long)]
    pub construct_feat_encoder: Option<String>,
    /// Fanout used to construct node features
    #[arg(long, allow_negative_numbers = true)]
    pub construct_feat_fanout: Option<i64>,
    /// Weight decay
    #[arg(long)]
    pub wd_l2norm: Option<f64>,
    /// Coefficient of the l2 norm of dense parameters
    #[arg(long)]
    pub alpha_l2norm: Option<f64>,
    /// Treat a node's own feature as a self loop relation
    #[arg(long, value_parser = parse_bool_flag)]
    pub use_self_loop: Option<bool>,
    /// Mini-batch size for evaluation
    #[arg(long)]
    pub eval_batch_size: Option<i64>,
    /// Evaluate every N iterations
    #[arg(long)]
    pub eval_frequency: Option<i64>,
    /// Skip validation during training
    #[arg(long, value_parser = parse_bool_flag)]
    pub no_validation: Option<bool>,
    /// Rounds before checking early stop
    #[arg(long)]
    pub early_stop_burnin_rounds: Option<i64>,
    /// Rounds of validation scores considered for early stop
    #[arg(long)]
    pub early_stop_rounds: Option<i64>,
    /// Early stop strategy: consecutive_increase or average_increase
    #[arg(long)]
    pub early_stop_strategy: Option<String>,
    /// Enable early stop
    #[arg(long, value_parser = parse_bool_flag)]
    pub use_early_stop: Option<bool>,

    // language models
    /// Learning rate for fine-tuning language models
    #[arg(long)]
    pub lm_tune_lr: Option<f64>,
    /// Nodes used for LM fine-tuning, -1 for all
    #[arg(long, allow_negative_numbers = true)]
    pub lm_train_nodes: Option<i64>,
    /// Mini-batch size for LM inference
    #[arg(long)]
    pub lm_infer_batch_size: Option<i64>,
    /// Epochs to warm up the GNN before fine-tuning the LM
    #[arg(long)]
    pub freeze_lm_encoder_epochs: Option<i64>,
    /// Maximum tokenized sequence length for distillation
    #[arg(long)]
    pub max_seq_len: Option<i64>,
    /// Cache LM embeddings on disk
    #[arg(long, value_parser = parse_bool_flag)]
    pub cache_lm_embed: Option<bool>,

    // rgat and rgcn
    /// Attention heads for RGAT and HGT
    #[arg(long)]
    pub num_heads: Option<i64>,
    /// RGCN weight bases, -1 to disable
    #[arg(long, allow_negative_numbers = true)]
    pub num_bases: Option<i64>,

    // node tasks
    /// Node type to predict on
    #[arg(long)]
    pub target_ntype: Option<String>,
    /// Label field name
    #[arg(long)]
    pub label_field: Option<String>,
    /// Multi-label classification
    #[arg(long, value_parser = parse_bool_flag)]
    pub multilabel: Option<bool>,
    /// Positive weight per class, e.g. `0.1,0.2,0.3`
    #[arg(long)]
    pub multilabel_weights: Option<String>,
    /// Rescaling weight per class, e.g. `0.1,0.2,0.3`
    #[arg(long)]
    pub imbalance_class_weights: Option<String>,
    /// Number of classes
    #[arg(long)]
    pub num_classes: Option<i64>,
    /// Return all prediction scores instead of the best class
    #[arg(long, value_parser = parse_bool_flag)]
    pub return_proba: Option<bool>,
    /// Pseudolabel unlabeled nodes
    #[arg(long, value_parser = parse_bool_flag)]
    pub use_pseudolabel: Option<bool>,

    // edge tasks
    /// Target edge types, e.g. `query,clicks,asin`
    #[arg(long, num_args = 1..)]
    pub target_etype: Option<Vec<String>>,
    /// Decoder edge features: `feat` or `src,rel,dst:feat0,feat1`
    #[arg(long, num_args = 1..)]
    pub decoder_edge_feat: Option<Vec<String>>,
    /// Bases of the DenseBiDecoder
    #[arg(long)]
    pub num_decoder_basis: Option<i64>,
    /// Edge decoder: DenseBiDecoder or MLPDecoder
    #[arg(long)]
    pub decoder_type: Option<String>,
    /// Decoder normalization: batch or layer
    #[arg(long)]
    pub decoder_norm: Option<String>,
    /// Drop target edges from message passing
    #[arg(long, value_parser = parse_bool_flag)]
    pub remove_target_edge_type: Option<bool>,

    // link prediction
    /// Link prediction decoder: dot_product, distmult, rotate, transe_l1, transe_l2
    #[arg(long)]
    pub lp_decoder_type: Option<String>,
    /// Negative edges per positive edge in training
    #[arg(long)]
    pub num_negative_edges: Option<i64>,
    /// Fixed number of validation and test edges
    #[arg(long)]
    pub fixed_test_size: Option<i64>,
    /// Negative edges per positive edge in evaluation
    #[arg(long)]
    pub num_negative_edges_eval: Option<i64>,
    /// Negative sampler for training
    #[arg(long)]
    pub train_negative_sampler: Option<String>,
    /// Negative sampler for evaluation
    #[arg(long)]
    pub eval_negative_sampler: Option<String>,
    /// Evaluation edge types
    #[arg(long, num_args = 1..)]
    pub eval_etype: Option<Vec<String>>,
    /// Training edge types
    #[arg(long, num_args = 1..)]
    pub train_etype: Option<Vec<String>>,
    /// Remove training targets from the computation graph
    #[arg(long, value_parser = parse_bool_flag)]
    pub exclude_training_targets: Option<bool>,
    /// Reverse edge types: `head,rel,revrel,tail ...`
    #[arg(long, num_args = 1..)]
    pub reverse_edge_types_map: Option<Vec<String>>,
    /// Hyperparameter gamma
    #[arg(long)]
    pub gamma: Option<f64>,
    /// Hyperparameter alpha
    #[arg(long)]
    pub alpha: Option<f64>,
    /// Classification loss: cross_entropy or focal
    #[arg(long)]
    pub class_loss_func: Option<String>,
    /// Regression loss: mse or shrinkage
    #[arg(long)]
    pub regression_loss_func: Option<String>,
    /// Link prediction loss: cross_entropy, logsigmoid, contrastive, bpr
    #[arg(long)]
    pub lp_loss_func: Option<String>,
    /// Temperature of the contrastive loss
    #[arg(long)]
    pub contrastive_loss_temperature: Option<f64>,
    /// Temperature of the adversarial cross entropy loss
    #[arg(long)]
    pub adversarial_temperature: Option<f64>,
    /// Embedding normalizer for link prediction: l2_norm
    #[arg(long)]
    pub lp_embed_normalizer: Option<String>,
    /// Edge weight fields: `weight` or `src,rel,dst:weight ...`
    #[arg(long, num_args = 1..)]
    pub lp_edge_weight_for_loss: Option<Vec<String>>,
    /// Edge type used to select the best model, or ALL
    #[arg(long)]
    pub model_select_etype: Option<String>,
    /// Hard negative fields for training
    #[arg(long, num_args = 1..)]
    pub train_etypes_negative_dstnode: Option<Vec<String>>,
    /// Hard negative fields for evaluation
    #[arg(long, num_args = 1..)]
    pub eval_etypes_negative_dstnode: Option<Vec<String>>,
    /// Hard negatives per edge type: `10` or `src,rel,dst:10 ...`
    #[arg(long, num_args = 1..)]
    pub num_train_hard_negatives: Option<Vec<String>>,

    // evaluation
    /// Evaluation metrics, the first one selects the best model
    #[arg(long, num_args = 1..)]
    pub eval_metric: Option<Vec<String>>,
    /// Report metrics per node or edge type
    #[arg(long, value_parser = parse_bool_flag)]
    pub report_eval_per_type: Option<bool>,

    // inference
    /// Where to save predictions, `none` to disable
    #[arg(long)]
    pub save_prediction_path: Option<String>,
    /// Run inference on every target node, ignoring masks
    #[arg(long, value_parser = parse_bool_flag)]
    pub infer_all_target_nodes: Option<bool>,

    // distillation
    /// Directory of textual data for distillation
    #[arg(long)]
    pub textual_data_path: Option<String>,
    /// Maximum distillation steps per node type
    #[arg(long)]
    pub max_distill_step: Option<i64>,
}

impl OverrideArgs {
    /// The set flags as ordered overrides.
    ///
    /// The literal `none` (any case) on a [`NONE_PATH_SETTINGS`] path becomes
    /// `null`, which disables that output.
    pub fn to_overrides(&self) -> ConfigResult<Vec<SettingOverride>> {
        let value = serde_yaml::to_value(self)
            .map_err(|e| ConfigError::Malformed(format!("failed to collect command line overrides: {e}")))?;
        let Value::Mapping(mapping) = value else {
            return Ok(Vec::new());
        };

        let mut overrides = Vec::new();
        for (key, value) in mapping {
            let Value::String(name) = key else { continue };
            if value.is_null() {
                continue;
            }
            let value = match value {
                Value::String(s) if NONE_PATH_SETTINGS.contains(&name.as_str()) && s.eq_ignore_ascii_case("none") => {
                    Value::Null
                }
                other => other,
            };
            overrides.push(SettingOverride { name, value });
        }
        Ok(overrides)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::is_known_setting;

    fn parse(extra: &[&str]) -> GsArgs {
        let mut argv = vec!["gs", "--cf", "train.yaml"];
        argv.extend_from_slice(extra);
        GsArgs::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_unset_flags_produce_no_overrides() {
        let args = parse(&[]);
        assert_eq!(args.yaml_config_file, PathBuf::from("train.yaml"));
        assert_eq!(args.local_rank, 0);
        assert_eq!(args.logging_level, "info");
        assert!(args.overrides.to_overrides().unwrap().is_empty());
    }

    #[test]
    fn test_overrides_keep_kebab_flags_and_values() {
        let args = parse(&["--batch-size", "64", "--node-feat-name", "user:age", "movie:title", "-e", "3"]);
        let overrides = args.overrides.to_overrides().unwrap();

        assert!(overrides.contains(&SettingOverride::new("batch_size", 64)));
        assert!(overrides.contains(&SettingOverride::new("num_epochs", 3)));
        let feats = overrides.iter().find(|o| o.name == "node_feat_name").unwrap();
        assert_eq!(feats.value, serde_yaml::from_str::<Value>("[user:age, movie:title]").unwrap());
    }

    #[test]
    fn test_bool_flags_take_a_value() {
        let args = parse(&["--use-self-loop", "TRUE", "--verbose", "1", "--no-validation", "yes"]);
        assert_eq!(args.overrides.use_self_loop, Some(true));
        assert_eq!(args.overrides.verbose, Some(true));
        assert_eq!(args.overrides.no_validation, Some(false));
    }

    #[test]
    fn test_none_disables_path_outputs() {
        let args = parse(&["--save-model-path", "None", "--save-embed-path", "/tmp/emb", "--restore-model-path", "none"]);
        let overrides = args.overrides.to_overrides().unwrap();

        assert!(overrides.contains(&SettingOverride { name: "save_model_path".into(), value: Value::Null }));
        assert!(overrides.contains(&SettingOverride::new("save_embed_path", "/tmp/emb")));
        assert!(overrides.contains(&SettingOverride::new("restore_model_path", "none")));
    }

    #[test]
    fn test_negative_values_parse() {
        let args = parse(&["--fanout", "-1,-1", "--num-bases", "-1", "--local_rank", "3"]);
        assert_eq!(args.overrides.fanout.as_deref(), Some("-1,-1"));
        assert_eq!(args.overrides.num_bases, Some(-1));
        assert_eq!(args.local_rank, 3);
    }

    #[test]
    fn test_every_override_is_a_known_setting() {
        let args = parse(&[]);
        let Value::Mapping(fields) = serde_yaml::to_value(&args.overrides).unwrap() else {
            panic!("overrides should serialize to a mapping");
        };
        for key in fields.keys() {
            let name = key.as_str().unwrap();
            assert!(is_known_setting(name), "{name} is not a known setting");
        }
    }
}
