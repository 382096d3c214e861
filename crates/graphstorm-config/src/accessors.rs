//! Task-level settings shared by the global resolver and per-task snapshots.
//!
//! [`TaskSettings`] is implemented by [`crate::GsConfig`] and by
//! [`crate::TaskConfig`]. Each accessor is a pure function of the stored
//! settings: it returns the stored value when present, a task-dependent
//! default otherwise, and checks the value's domain on every call.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::Serialize;
use serde_yaml::Value;
use tracing::warn;

use crate::error::{ConfigError, ConfigResult};
use crate::etype::CanonicalEtype;
use crate::formats::{
    parse_class_weights, parse_etype_spec, parse_int_value, parse_name_value, parse_reverse_edge_types_map,
    EtypeSpec, FeatureList, FeatureNames, ReverseEdgeTypesMap, WeightBound,
};
use crate::metrics::{default_metric, validate_metric, MetricFamily};
use crate::registry::{
    ClassLossFunc, EdgeDecoderType, LpDecoderType, LpEmbedNormalizer, LpLossFunc, NegativeSampler, NormType,
    RegressionLossFunc, TaskType, UnknownName, DEFAULT_NTYPE, MODEL_SELECT_ETYPE_ALL,
};
use crate::settings::{describe, Settings};

/// Prediction target node type(s).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum NodeTarget {
    Single(String),
    Multiple(Vec<String>),
}

impl NodeTarget {
    /// Fragment used in task ids.
    #[must_use]
    pub fn id_fragment(&self) -> String {
        match self {
            Self::Single(ntype) => ntype.clone(),
            Self::Multiple(ntypes) => ntypes.join("__"),
        }
    }
}

/// A value given once, or once per node type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PerType<T> {
    Single(T),
    PerType(BTreeMap<String, T>),
}

/// Edge type whose validation score selects the best model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelSelectEtype {
    /// Average over every edge type.
    All,
    Etype(CanonicalEtype),
}

pub(crate) fn ensure(condition: bool, field: &str, reason: impl Into<String>) -> ConfigResult<()> {
    if condition { Ok(()) } else { Err(ConfigError::invalid(field, reason)) }
}

pub(crate) fn required<T>(value: Option<T>, field: &str, reason: &str) -> ConfigResult<T> {
    value.ok_or_else(|| ConfigError::missing(field, reason))
}

/// Reads a vocabulary setting.
pub(crate) fn vocab<T>(settings: &Settings, name: &str) -> ConfigResult<Option<T>>
where
    T: FromStr<Err = UnknownName>,
{
    settings
        .string(name)?
        .map(|raw| raw.parse::<T>().map_err(|e| ConfigError::invalid(name, e.to_string())))
        .transpose()
}

/// Reads a canonical etype list, which must be non-empty when given.
pub(crate) fn etype_list(settings: &Settings, name: &str) -> ConfigResult<Option<Vec<CanonicalEtype>>> {
    let Some(raw) = settings.string_list(name)? else { return Ok(None) };
    ensure(!raw.is_empty(), name, format!("there must be at least one {name}"))?;
    raw.iter().map(|etype| CanonicalEtype::parse(name, etype)).collect::<ConfigResult<Vec<_>>>().map(Some)
}

fn per_type_ints(settings: &Settings, name: &str) -> ConfigResult<Option<PerType<i64>>> {
    match settings.value(name) {
        None => Ok(None),
        Some(Value::Mapping(map)) => {
            let mut by_type = BTreeMap::new();
            for (ntype, count) in map {
                let ntype = ntype.as_str().ok_or_else(|| ConfigError::invalid(name, "node types must be strings"))?;
                let count = count
                    .as_i64()
                    .ok_or_else(|| ConfigError::invalid(name, format!("{ntype} expects an integer, got {}", describe(count))))?;
                by_type.insert(ntype.to_string(), count);
            }
            Ok(Some(PerType::PerType(by_type)))
        }
        Some(_) => Ok(settings.int(name)?.map(PerType::Single)),
    }
}

fn weight_text(field: &str, value: &Value) -> ConfigResult<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(ConfigError::invalid(field, format!("expected a weight list, got {}", describe(other)))),
    }
}

fn multilabel_weights_for(field: &str, multilabel: bool, value: &Value, num_classes: i64) -> ConfigResult<Vec<f64>> {
    ensure(multilabel, field, "must be a multi-label classification task")?;
    parse_class_weights(field, &weight_text(field, value)?, WeightBound::NonNegative, num_classes)
}

pub trait TaskSettings {
    fn settings(&self) -> &Settings;

    /// Active task type, if any.
    fn task_type(&self) -> Option<TaskType>;

    /// Process rank, used to gate rank 0 only warnings.
    fn rank(&self) -> u32;

    /// Fails unless the active task type is one of `allowed`.
    fn require_task(&self, field: &str, allowed: &[TaskType]) -> ConfigResult<()> {
        match self.task_type() {
            Some(task) if allowed.contains(&task) => Ok(()),
            _ => {
                let names: Vec<&str> = allowed.iter().map(|t| t.as_str()).collect();
                Err(ConfigError::invalid(field, format!("only {} tasks use {field}", names.join(", "))))
            }
        }
    }

    // ---------------------------------------------------------------
    // Targets and labels
    // ---------------------------------------------------------------

    /// Node type(s) to predict on. Defaults to the homogeneous `_N`.
    fn target_ntype(&self) -> ConfigResult<NodeTarget> {
        match self.settings().value("target_ntype") {
            None => {
                warn!("There is not target ntype provided, will treat the input graph as a homogeneous graph");
                Ok(NodeTarget::Single(DEFAULT_NTYPE.to_string()))
            }
            Some(Value::Sequence(_)) => {
                let ntypes = self.settings().string_list("target_ntype")?.unwrap_or_default();
                ensure(!ntypes.is_empty(), "target_ntype", "there must be at least one target ntype")?;
                Ok(NodeTarget::Multiple(ntypes))
            }
            Some(_) => Ok(NodeTarget::Single(
                self.settings().string("target_ntype")?.unwrap_or_else(|| DEFAULT_NTYPE.to_string()),
            )),
        }
    }

    /// Node type evaluated. Only one is supported.
    fn eval_target_ntype(&self) -> ConfigResult<String> {
        if let Some(ntype) = self.settings().string("eval_target_ntype")? {
            return Ok(ntype);
        }
        match self.target_ntype()? {
            NodeTarget::Single(ntype) => Ok(ntype),
            NodeTarget::Multiple(ntypes) => {
                warn!("Now only support single ntype evaluation");
                Ok(ntypes[0].clone())
            }
        }
    }

    /// Edge types to predict on. Defaults to the homogeneous `(_N,_E,_N)`.
    fn target_etype(&self) -> ConfigResult<Vec<CanonicalEtype>> {
        let Some(etypes) = etype_list(self.settings(), "target_etype")? else {
            warn!("There is not target etype provided, will treat the input graph as a homogeneous graph");
            return Ok(vec![CanonicalEtype::homogeneous()]);
        };
        if etypes.len() != 1 {
            warn!(
                "only {} will be used. Currently, GraphStorm only supports single task edge classification/regression.",
                etypes[0]
            );
        }
        Ok(etypes)
    }

    fn label_field(&self) -> ConfigResult<String> {
        required(
            self.settings().string("label_field")?,
            "label_field",
            "must provide the feature name of labels through label_field",
        )
    }

    fn reconstruct_nfeat_name(&self) -> ConfigResult<String> {
        required(
            self.settings().string("reconstruct_nfeat_name")?,
            "reconstruct_nfeat_name",
            "reconstruct_nfeat_name must be provided for reconstruct_node_feat tasks",
        )
    }

    fn reconstruct_efeat_name(&self) -> ConfigResult<String> {
        required(
            self.settings().string("reconstruct_efeat_name")?,
            "reconstruct_efeat_name",
            "reconstruct_efeat_name must be provided for reconstruct_edge_feat tasks",
        )
    }

    fn batch_size(&self) -> ConfigResult<i64> {
        let batch_size = required(self.settings().int("batch_size")?, "batch_size", "batch size must be specified")?;
        ensure(batch_size > 0, "batch_size", "batch size must be larger than 0")?;
        Ok(batch_size)
    }

    // ---------------------------------------------------------------
    // Classification and regression
    // ---------------------------------------------------------------

    fn class_loss_func(&self) -> ConfigResult<ClassLossFunc> {
        Ok(vocab(self.settings(), "class_loss_func")?.unwrap_or(ClassLossFunc::CrossEntropy))
    }

    fn regression_loss_func(&self) -> ConfigResult<RegressionLossFunc> {
        Ok(vocab(self.settings(), "regression_loss_func")?.unwrap_or(RegressionLossFunc::Mse))
    }

    /// Label cardinality, global or per node type. Must be at least 2,
    /// except that 1 is still accepted with the focal loss.
    fn num_classes(&self) -> ConfigResult<PerType<i64>> {
        let num_classes = required(
            per_type_ints(self.settings(), "num_classes")?,
            "num_classes",
            "must provide the number possible labels through num_classes",
        )?;
        let counts: Vec<i64> = match &num_classes {
            PerType::Single(count) => vec![*count],
            PerType::PerType(by_type) => by_type.values().copied().collect(),
        };
        for count in counts {
            if count == 1 && self.class_loss_func()? == ClassLossFunc::Focal {
                if self.rank() == 0 {
                    warn!(
                        "Allowing num_classes=1 with focal loss is deprecated and will be removed in future versions."
                    );
                }
            } else {
                ensure(count > 1, "num_classes", "num_classes for classification tasks must be 2 or greater")?;
            }
        }
        Ok(num_classes)
    }

    fn multilabel(&self) -> ConfigResult<PerType<bool>> {
        let settings = self.settings();
        if settings.value("num_classes").is_some() {
            if let PerType::PerType(num_classes) = self.num_classes()? {
                let Some(value) = settings.value("multilabel") else {
                    return Ok(PerType::PerType(num_classes.into_keys().map(|ntype| (ntype, false)).collect()));
                };
                let Value::Mapping(by_type) = value else {
                    return Err(ConfigError::invalid("multilabel", "must be a mapping when num_classes is per type"));
                };
                let mut multilabel = BTreeMap::new();
                for ntype in num_classes.into_keys() {
                    let flag = by_type.get(ntype.as_str()).and_then(Value::as_bool).ok_or_else(|| {
                        ConfigError::invalid("multilabel", format!("{ntype} must be set to true or false"))
                    })?;
                    multilabel.insert(ntype, flag);
                }
                return Ok(PerType::PerType(multilabel));
            }
        }
        Ok(PerType::Single(settings.bool("multilabel")?.unwrap_or(false)))
    }

    /// Positive class weights of multi-label tasks, e.g. `0.1,0.2,0.0`.
    fn multilabel_weights(&self) -> ConfigResult<PerType<Option<Vec<f64>>>> {
        const FIELD: &str = "multilabel_weights";
        let settings = self.settings();
        if settings.value("num_classes").is_some() {
            if let PerType::PerType(num_classes) = self.num_classes()? {
                let Some(value) = settings.value(FIELD) else {
                    return Ok(PerType::PerType(num_classes.into_keys().map(|ntype| (ntype, None)).collect()));
                };
                let Value::Mapping(by_type) = value else {
                    return Err(ConfigError::invalid(FIELD, "must be a mapping when num_classes is per type"));
                };
                let PerType::PerType(multilabel) = self.multilabel()? else {
                    return Err(ConfigError::invalid("multilabel", "must be per type when num_classes is per type"));
                };
                let mut weights = BTreeMap::new();
                for (ntype, count) in num_classes {
                    let parsed = match by_type.get(ntype.as_str()) {
                        Some(value) => {
                            let is_multilabel = multilabel.get(&ntype).copied().unwrap_or(false);
                            Some(multilabel_weights_for(FIELD, is_multilabel, value, count)?)
                        }
                        None => None,
                    };
                    weights.insert(ntype, parsed);
                }
                return Ok(PerType::PerType(weights));
            }
        }

        let Some(value) = settings.value(FIELD) else { return Ok(PerType::Single(None)) };
        let PerType::Single(is_multilabel) = self.multilabel()? else {
            return Ok(PerType::Single(None));
        };
        let PerType::Single(count) = self.num_classes()? else {
            return Ok(PerType::Single(None));
        };
        Ok(PerType::Single(Some(multilabel_weights_for(FIELD, is_multilabel, value, count)?)))
    }

    /// Per-class rescaling weights for imbalanced single-label tasks.
    fn imbalance_class_weights(&self) -> ConfigResult<PerType<Option<Vec<f64>>>> {
        const FIELD: &str = "imbalance_class_weights";
        let settings = self.settings();
        if settings.value("num_classes").is_some() {
            if let PerType::PerType(num_classes) = self.num_classes()? {
                let Some(value) = settings.value(FIELD) else {
                    return Ok(PerType::PerType(num_classes.into_keys().map(|ntype| (ntype, None)).collect()));
                };
                let Value::Mapping(by_type) = value else {
                    return Err(ConfigError::invalid(FIELD, "the imbalance_class_weights should be a mapping"));
                };
                let mut weights = BTreeMap::new();
                for (ntype, count) in num_classes {
                    let parsed = match by_type.get(ntype.as_str()) {
                        Some(value) => {
                            Some(parse_class_weights(FIELD, &weight_text(FIELD, value)?, WeightBound::Positive, count)?)
                        }
                        None => None,
                    };
                    weights.insert(ntype, parsed);
                }
                return Ok(PerType::PerType(weights));
            }
        }

        let Some(value) = settings.value(FIELD) else { return Ok(PerType::Single(None)) };
        let PerType::Single(count) = self.num_classes()? else {
            return Ok(PerType::Single(None));
        };
        Ok(PerType::Single(Some(parse_class_weights(FIELD, &weight_text(FIELD, value)?, WeightBound::Positive, count)?)))
    }

    /// Return every class score instead of the best class. Default true.
    fn return_proba(&self) -> ConfigResult<bool> {
        let Some(return_proba) = self.settings().bool("return_proba")? else { return Ok(true) };
        if return_proba && self.task_type().is_some_and(TaskType::is_regression) {
            warn!(
                "node regression and edge regression tasks automatically ignore --return-proba flag. \
                 Regression prediction results will be returned."
            );
        }
        Ok(return_proba)
    }

    // ---------------------------------------------------------------
    // Evaluation
    // ---------------------------------------------------------------

    /// Metrics reported during evaluation; the first selects the best model.
    fn eval_metric(&self) -> ConfigResult<Vec<String>> {
        let task = required(self.task_type(), "task_type", "unknown task type, eval_metric cannot be resolved")?;
        let family = MetricFamily::of(task);
        if family == MetricFamily::Classification {
            self.num_classes()?;
        }

        let raw = match self.settings().value("eval_metric") {
            None => return Ok(vec![default_metric(task).to_string()]),
            Some(Value::Sequence(items)) if !items.is_empty() => {
                self.settings().string_list("eval_metric")?.unwrap_or_default()
            }
            Some(Value::String(metric)) => vec![metric.clone()],
            Some(_) => {
                return Err(ConfigError::invalid("eval_metric", "evaluation metric should be a string or a list of string"));
            }
        };
        raw.iter().map(|metric| validate_metric("eval_metric", family, metric)).collect()
    }

    fn report_eval_per_type(&self) -> ConfigResult<bool> {
        Ok(self.settings().bool("report_eval_per_type")?.unwrap_or(false))
    }

    /// Number of validation and test edges used in link prediction.
    fn fixed_test_size(&self) -> ConfigResult<Option<i64>> {
        let size = self.settings().int("fixed_test_size")?;
        if let Some(size) = size {
            ensure(size > 0, "fixed_test_size", "fixed_test_size must be larger than 0")?;
        }
        Ok(size)
    }

    // ---------------------------------------------------------------
    // Edge decoders
    // ---------------------------------------------------------------

    fn decoder_type(&self) -> ConfigResult<EdgeDecoderType> {
        Ok(vocab(self.settings(), "decoder_type")?.unwrap_or(EdgeDecoderType::DenseBiDecoder))
    }

    fn num_decoder_basis(&self) -> ConfigResult<i64> {
        let Some(basis) = self.settings().int("num_decoder_basis")? else { return Ok(2) };
        ensure(basis > 1, "num_decoder_basis", "decoder basis must be larger than 1")?;
        Ok(basis)
    }

    /// Edge features fed to the decoder, `feat` or `src,rel,dst:f0,f1`.
    fn decoder_edge_feat(&self) -> ConfigResult<Option<FeatureNames<CanonicalEtype>>> {
        const FIELD: &str = "decoder_edge_feat";
        let Some(entries) = self.settings().string_list(FIELD)? else { return Ok(None) };
        self.require_task(FIELD, &[TaskType::EdgeClassification, TaskType::EdgeRegression])?;
        ensure(entries.len() == 1, FIELD, "only edge classification or regression on one edge type is supported")?;

        let entry = &entries[0];
        if !entry.contains(':') {
            return Ok(Some(FeatureNames::Global(entry.clone())));
        }
        let parts: Vec<&str> = entry.split(':').collect();
        let [etype, feats] = parts.as_slice() else {
            return Err(ConfigError::invalid(
                FIELD,
                format!("unknown format of the feature name: {entry}, must be EDGE_TYPE:FEAT_NAME"),
            ));
        };
        let etype = CanonicalEtype::parse(FIELD, etype)?;
        let target_etype = self.target_etype()?;
        ensure(
            target_etype.contains(&etype),
            FIELD,
            format!("{etype} must be in the training edge type list {target_etype:?}"),
        )?;
        let feats = feats.split(',').map(str::to_string).collect();
        Ok(Some(FeatureNames::PerType(BTreeMap::from([(etype, FeatureList::Names(feats))]))))
    }

    fn decoder_norm(&self) -> ConfigResult<Option<NormType>> {
        vocab(self.settings(), "decoder_norm")
    }

    fn num_ffn_layers_in_decoder(&self) -> ConfigResult<i64> {
        let layers = self.settings().int("num_ffn_layers_in_decoder")?.unwrap_or(0);
        ensure(layers >= 0, "num_ffn_layers_in_decoder", "number of extra MLP layers in decoder must be >= 0")?;
        Ok(layers)
    }

    fn decoder_bias(&self) -> ConfigResult<bool> {
        Ok(self.settings().bool("decoder_bias")?.unwrap_or(true))
    }

    // ---------------------------------------------------------------
    // Link prediction
    // ---------------------------------------------------------------

    /// Training edge types. `None` means every edge type.
    fn train_etype(&self) -> ConfigResult<Option<Vec<CanonicalEtype>>> {
        etype_list(self.settings(), "train_etype")
    }

    /// Evaluation edge types. `None` means every edge type.
    fn eval_etype(&self) -> ConfigResult<Option<Vec<CanonicalEtype>>> {
        etype_list(self.settings(), "eval_etype")
    }

    fn train_negative_sampler(&self) -> ConfigResult<NegativeSampler> {
        Ok(vocab(self.settings(), "train_negative_sampler")?.unwrap_or(NegativeSampler::Uniform))
    }

    fn eval_negative_sampler(&self) -> ConfigResult<NegativeSampler> {
        Ok(vocab(self.settings(), "eval_negative_sampler")?.unwrap_or(NegativeSampler::Joint))
    }

    fn num_negative_edges(&self) -> ConfigResult<i64> {
        let count = self.settings().int("num_negative_edges")?.unwrap_or(16);
        ensure(count > 0, "num_negative_edges", "number of negative edges must be larger than 0")?;
        Ok(count)
    }

    fn num_negative_edges_eval(&self) -> ConfigResult<i64> {
        let count = self.settings().int("num_negative_edges_eval")?.unwrap_or(1000);
        ensure(count > 0, "num_negative_edges_eval", "number of negative edges must be larger than 0")?;
        Ok(count)
    }

    /// Forward to reverse edge types. Only edge tasks use it.
    fn reverse_edge_types_map(&self) -> ConfigResult<ReverseEdgeTypesMap> {
        const FIELD: &str = "reverse_edge_types_map";
        self.require_task(
            FIELD,
            &[TaskType::LinkPrediction, TaskType::EdgeClassification, TaskType::EdgeRegression],
        )?;
        match self.settings().string_list(FIELD)? {
            None => Ok(ReverseEdgeTypesMap::new()),
            Some(entries) => parse_reverse_edge_types_map(FIELD, &entries),
        }
    }

    /// Remove training targets from the computation graph. Default true,
    /// which requires a reverse edge type map.
    fn exclude_training_targets(&self) -> ConfigResult<bool> {
        const FIELD: &str = "exclude_training_targets";
        let exclude = self.settings().bool(FIELD)?;
        if exclude.unwrap_or(true) && self.reverse_edge_types_map()?.is_empty() {
            return Err(ConfigError::invalid(
                FIELD,
                "when exclude training targets is used, reverse edge types map must be provided",
            ));
        }
        Ok(exclude.unwrap_or(true))
    }

    fn lp_loss_func(&self) -> ConfigResult<LpLossFunc> {
        Ok(vocab(self.settings(), "lp_loss_func")?.unwrap_or(LpLossFunc::CrossEntropy))
    }

    /// Link prediction score function, case-insensitive. Default `distmult`.
    fn lp_decoder_type(&self) -> ConfigResult<LpDecoderType> {
        let Some(raw) = self.settings().string("lp_decoder_type")? else { return Ok(LpDecoderType::Distmult) };
        raw.to_lowercase().parse().map_err(|e: UnknownName| ConfigError::invalid("lp_decoder_type", e.to_string()))
    }

    fn gamma(&self) -> ConfigResult<Option<f64>> {
        self.settings().float("gamma")
    }

    fn alpha(&self) -> ConfigResult<Option<f64>> {
        self.settings().float("alpha")
    }

    fn remove_target_edge_type(&self) -> ConfigResult<bool> {
        if let Some(remove) = self.settings().bool("remove_target_edge_type")? {
            return Ok(remove);
        }
        warn!(
            "remove_target_edge_type is set to True by default. If your edge classification task is not \
             predicting the existence of the target edge, we suggest you to set it to False."
        );
        Ok(true)
    }

    /// Edge weight fields that rescale the positive edge loss.
    fn lp_edge_weight_for_loss(&self) -> ConfigResult<Option<EtypeSpec<String>>> {
        const FIELD: &str = "lp_edge_weight_for_loss";
        let Some(entries) = self.settings().string_list(FIELD)? else { return Ok(None) };
        self.require_task(FIELD, &[TaskType::LinkPrediction])?;

        if self.lp_loss_func()? == LpLossFunc::Contrastive {
            warn!(
                "lp_edge_weight_for_loss does not work with contrastive loss in link prediction. \
                 Disable edge weight for link prediction loss."
            );
            return Ok(None);
        }

        let weights = parse_etype_spec(FIELD, &entries, parse_name_value)?;
        if let (EtypeSpec::PerEtype(by_etype), Some(train_etype)) = (&weights, self.train_etype()?) {
            for etype in by_etype.keys() {
                ensure(train_etype.contains(etype), FIELD, format!("{etype} must be in the training edge type list"))?;
            }
        }
        Ok(Some(weights))
    }

    fn contrastive_loss_temperature(&self) -> ConfigResult<f64> {
        const FIELD: &str = "contrastive_loss_temperature";
        let Some(temperature) = self.settings().float(FIELD)? else { return Ok(1.0) };
        ensure(
            self.lp_loss_func()? == LpLossFunc::Contrastive,
            FIELD,
            "use contrastive-loss-temperature only when the loss function is contrastive loss",
        )?;
        ensure(temperature > 0.0, FIELD, "contrastive loss temperature must be larger than 0")?;
        Ok(temperature)
    }

    fn adversarial_temperature(&self) -> ConfigResult<Option<f64>> {
        const FIELD: &str = "adversarial_temperature";
        let temperature = self.settings().float(FIELD)?;
        if temperature.is_some() {
            ensure(
                self.lp_loss_func()? == LpLossFunc::CrossEntropy,
                FIELD,
                "adversarial_temperature only works with cross_entropy",
            )?;
        }
        Ok(temperature)
    }

    /// Embedding normalizer; `l2_norm` by default with the contrastive loss.
    fn lp_embed_normalizer(&self) -> ConfigResult<Option<LpEmbedNormalizer>> {
        if let Some(raw) = self.settings().string("lp_embed_normalizer")? {
            return raw
                .to_lowercase()
                .parse()
                .map(Some)
                .map_err(|e: UnknownName| ConfigError::invalid("lp_embed_normalizer", e.to_string()));
        }
        if self.lp_loss_func()? == LpLossFunc::Contrastive {
            return Ok(Some(LpEmbedNormalizer::L2Norm));
        }
        Ok(None)
    }

    fn train_etypes_negative_dstnode(&self) -> ConfigResult<Option<EtypeSpec<String>>> {
        const FIELD: &str = "train_etypes_negative_dstnode";
        let Some(entries) = self.settings().string_list(FIELD)? else { return Ok(None) };
        self.require_task(FIELD, &[TaskType::LinkPrediction])?;
        parse_etype_spec(FIELD, &entries, parse_name_value).map(Some)
    }

    fn eval_etypes_negative_dstnode(&self) -> ConfigResult<Option<EtypeSpec<String>>> {
        const FIELD: &str = "eval_etypes_negative_dstnode";
        let Some(entries) = self.settings().string_list(FIELD)? else { return Ok(None) };
        self.require_task(FIELD, &[TaskType::LinkPrediction])?;
        parse_etype_spec(FIELD, &entries, parse_name_value).map(Some)
    }

    fn num_train_hard_negatives(&self) -> ConfigResult<Option<EtypeSpec<i64>>> {
        const FIELD: &str = "num_train_hard_negatives";
        let Some(entries) = self.settings().string_list(FIELD)? else { return Ok(None) };
        self.require_task(FIELD, &[TaskType::LinkPrediction])?;
        parse_etype_spec(FIELD, &entries, parse_int_value(FIELD)).map(Some)
    }

    fn model_select_etype(&self) -> ConfigResult<ModelSelectEtype> {
        match self.settings().string("model_select_etype")? {
            None => Ok(ModelSelectEtype::All),
            Some(raw) if raw == MODEL_SELECT_ETYPE_ALL => Ok(ModelSelectEtype::All),
            Some(raw) => CanonicalEtype::parse("model_select_etype", &raw).map(ModelSelectEtype::Etype),
        }
    }

    // ---------------------------------------------------------------
    // Node tasks
    // ---------------------------------------------------------------

    fn use_pseudolabel(&self) -> ConfigResult<bool> {
        Ok(self.settings().bool("use_pseudolabel")?.unwrap_or(false))
    }

    /// Run inference on every target node, ignoring masks.
    fn infer_all_target_nodes(&self) -> ConfigResult<bool> {
        Ok(self.settings().bool("infer_all_target_nodes")?.unwrap_or(false))
    }

    // ---------------------------------------------------------------
    // Verification checklists
    // ---------------------------------------------------------------

    fn verify_node_class_arguments(&self) -> ConfigResult<()> {
        self.target_ntype()?;
        self.batch_size()?;
        self.eval_metric()?;
        self.label_field()?;
        self.num_classes()?;
        self.multilabel()?;
        self.multilabel_weights()?;
        self.imbalance_class_weights()?;
        self.class_loss_func()?;
        Ok(())
    }

    fn verify_node_regression_arguments(&self) -> ConfigResult<()> {
        self.target_ntype()?;
        self.batch_size()?;
        self.eval_metric()?;
        self.label_field()?;
        self.regression_loss_func()?;
        Ok(())
    }

    fn verify_edge_class_arguments(&self) -> ConfigResult<()> {
        self.target_etype()?;
        self.batch_size()?;
        self.eval_metric()?;
        self.label_field()?;
        self.num_classes()?;
        self.multilabel()?;
        self.multilabel_weights()?;
        self.imbalance_class_weights()?;
        self.decoder_type()?;
        self.num_decoder_basis()?;
        self.decoder_edge_feat()?;
        self.class_loss_func()?;
        Ok(())
    }

    fn verify_edge_regression_arguments(&self) -> ConfigResult<()> {
        self.target_etype()?;
        self.batch_size()?;
        self.eval_metric()?;
        self.label_field()?;
        self.decoder_type()?;
        self.num_decoder_basis()?;
        self.decoder_edge_feat()?;
        self.regression_loss_func()?;
        Ok(())
    }

    fn verify_link_prediction_arguments(&self) -> ConfigResult<()> {
        self.target_etype()?;
        self.batch_size()?;
        self.eval_metric()?;
        self.train_etype()?;
        self.eval_etype()?;
        self.train_negative_sampler()?;
        self.eval_negative_sampler()?;
        self.num_negative_edges()?;
        self.num_negative_edges_eval()?;
        self.reverse_edge_types_map()?;
        self.exclude_training_targets()?;
        self.lp_loss_func()?;
        self.lp_decoder_type()?;
        self.gamma()?;
        self.report_eval_per_type()?;
        Ok(())
    }

    fn verify_node_feat_reconstruct_arguments(&self) -> ConfigResult<()> {
        self.target_ntype()?;
        self.batch_size()?;
        self.eval_metric()?;
        self.reconstruct_nfeat_name()?;
        Ok(())
    }

    fn verify_edge_feat_reconstruct_arguments(&self) -> ConfigResult<()> {
        self.target_etype()?;
        self.batch_size()?;
        self.eval_metric()?;
        self.reconstruct_efeat_name()?;
        Ok(())
    }

    /// Runs the checklist matching `task`.
    fn verify_task_arguments(&self, task: TaskType) -> ConfigResult<()> {
        match task {
            TaskType::NodeClassification => self.verify_node_class_arguments(),
            TaskType::NodeRegression => self.verify_node_regression_arguments(),
            TaskType::EdgeClassification => self.verify_edge_class_arguments(),
            TaskType::EdgeRegression => self.verify_edge_regression_arguments(),
            TaskType::LinkPrediction => self.verify_link_prediction_arguments(),
            TaskType::ReconstructNodeFeat => self.verify_node_feat_reconstruct_arguments(),
            TaskType::ReconstructEdgeFeat => self.verify_edge_feat_reconstruct_arguments(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::SettingSource;

    struct Fixture {
        settings: Settings,
        task: Option<TaskType>,
    }

    impl TaskSettings for Fixture {
        fn settings(&self) -> &Settings {
            &self.settings
        }

        fn task_type(&self) -> Option<TaskType> {
            self.task
        }

        fn rank(&self) -> u32 {
            0
        }
    }

    fn fixture(task: Option<TaskType>, yaml: &str) -> Fixture {
        let mut settings = Settings::new();
        let Value::Mapping(entries) = serde_yaml::from_str(yaml).unwrap() else { panic!("fixture must be a mapping") };
        for (key, value) in entries {
            settings.set(key.as_str().unwrap(), value, SettingSource::Task);
        }
        Fixture { settings, task }
    }

    #[test]
    fn test_node_classification_defaults() {
        let config = fixture(Some(TaskType::NodeClassification), "{label_field: label, num_classes: 5, batch_size: 64}");
        assert_eq!(config.eval_metric().unwrap(), vec!["accuracy"]);
        assert_eq!(config.target_ntype().unwrap(), NodeTarget::Single("_N".to_string()));
        assert_eq!(config.multilabel().unwrap(), PerType::Single(false));
        assert_eq!(config.multilabel_weights().unwrap(), PerType::Single(None));
        assert!(config.return_proba().unwrap());
        config.verify_node_class_arguments().unwrap();
    }

    #[test]
    fn test_accessors_are_idempotent() {
        let config = fixture(Some(TaskType::NodeClassification), "{num_classes: 1, label_field: l}");
        let first = config.num_classes().unwrap_err().to_string();
        let second = config.num_classes().unwrap_err().to_string();
        assert_eq!(first, second);
        assert_eq!(config.eval_metric().unwrap_err().to_string(), config.eval_metric().unwrap_err().to_string());
    }

    #[test]
    fn test_num_classes_one_allowed_with_focal_loss() {
        let config = fixture(Some(TaskType::NodeClassification), "{num_classes: 1, class_loss_func: focal}");
        assert_eq!(config.num_classes().unwrap(), PerType::Single(1));
    }

    #[test]
    fn test_per_type_num_classes_and_weights() {
        let config = fixture(
            Some(TaskType::NodeClassification),
            "{num_classes: {a: 2, b: 3}, multilabel: {a: true, b: false}, multilabel_weights: {a: '0.5,0.5'}}",
        );
        let PerType::PerType(weights) = config.multilabel_weights().unwrap() else { panic!("expected per type") };
        assert_eq!(weights["a"], Some(vec![0.5, 0.5]));
        assert_eq!(weights["b"], None);

        let bad = fixture(
            Some(TaskType::NodeClassification),
            "{num_classes: {a: 2}, multilabel: {a: false}, multilabel_weights: {a: '0.5,0.5'}}",
        );
        assert!(bad.multilabel_weights().is_err());
    }

    #[test]
    fn test_imbalance_weights_must_match_classes() {
        let config = fixture(
            Some(TaskType::NodeClassification),
            "{num_classes: 3, imbalance_class_weights: '0.1,0.2,0.7'}",
        );
        assert_eq!(config.imbalance_class_weights().unwrap(), PerType::Single(Some(vec![0.1, 0.2, 0.7])));

        let config = fixture(Some(TaskType::NodeClassification), "{num_classes: 3, imbalance_class_weights: '0.1,0.2'}");
        assert!(config.imbalance_class_weights().is_err());
    }

    #[test]
    fn test_eval_metric_requires_task_type() {
        let config = fixture(None, "{eval_metric: accuracy}");
        assert!(matches!(config.eval_metric(), Err(ConfigError::Missing { .. })));
    }

    #[test]
    fn test_eval_metric_is_lowercased_per_family() {
        let config = fixture(Some(TaskType::LinkPrediction), "{eval_metric: [MRR, hit_at_10]}");
        assert_eq!(config.eval_metric().unwrap(), vec!["mrr", "hit_at_10"]);

        let config = fixture(Some(TaskType::ReconstructEdgeFeat), "{}");
        assert_eq!(config.eval_metric().unwrap(), vec!["mse"]);

        let config = fixture(Some(TaskType::NodeRegression), "{eval_metric: []}");
        assert!(config.eval_metric().is_err());
    }

    #[test]
    fn test_reverse_map_and_exclude_training_targets() {
        let config = fixture(Some(TaskType::LinkPrediction), "{reverse_edge_types_map: ['a,r,revr,b']}");
        let map = config.reverse_edge_types_map().unwrap();
        assert_eq!(map[&CanonicalEtype::new("a", "r", "b")], CanonicalEtype::new("b", "revr", "a"));
        assert!(config.exclude_training_targets().unwrap());

        let empty = fixture(Some(TaskType::LinkPrediction), "{}");
        assert!(empty.exclude_training_targets().is_err());

        let disabled = fixture(Some(TaskType::LinkPrediction), "{exclude_training_targets: false}");
        assert!(!disabled.exclude_training_targets().unwrap());

        let node_task = fixture(Some(TaskType::NodeClassification), "{}");
        assert!(node_task.reverse_edge_types_map().is_err());
    }

    #[test]
    fn test_reverse_map_null_is_empty() {
        let config = fixture(Some(TaskType::EdgeRegression), "{reverse_edge_types_map: null}");
        assert!(config.reverse_edge_types_map().unwrap().is_empty());
    }

    #[test]
    fn test_decoder_edge_feat_must_target_known_etype() {
        let config = fixture(
            Some(TaskType::EdgeClassification),
            "{target_etype: ['u,r,m'], decoder_edge_feat: ['u,r,m:f0,f1']}",
        );
        let Some(FeatureNames::PerType(by_etype)) = config.decoder_edge_feat().unwrap() else {
            panic!("expected per etype features")
        };
        assert_eq!(
            by_etype[&CanonicalEtype::new("u", "r", "m")],
            FeatureList::Names(vec!["f0".to_string(), "f1".to_string()])
        );

        let wrong = fixture(
            Some(TaskType::EdgeClassification),
            "{target_etype: ['u,r,m'], decoder_edge_feat: ['u,x,m:f0']}",
        );
        assert!(wrong.decoder_edge_feat().is_err());

        let lp = fixture(Some(TaskType::LinkPrediction), "{decoder_edge_feat: [f0]}");
        assert!(lp.decoder_edge_feat().is_err());
    }

    #[test]
    fn test_lp_edge_weight_for_loss() {
        let config = fixture(
            Some(TaskType::LinkPrediction),
            "{train_etype: ['a,r,b'], lp_edge_weight_for_loss: ['a,r,b:w']}",
        );
        let Some(EtypeSpec::PerEtype(weights)) = config.lp_edge_weight_for_loss().unwrap() else {
            panic!("expected per etype weights")
        };
        assert_eq!(weights[&CanonicalEtype::new("a", "r", "b")], "w");

        let outside = fixture(
            Some(TaskType::LinkPrediction),
            "{train_etype: ['a,r,b'], lp_edge_weight_for_loss: ['a,x,b:w']}",
        );
        assert!(outside.lp_edge_weight_for_loss().is_err());

        let contrastive = fixture(
            Some(TaskType::LinkPrediction),
            "{lp_loss_func: contrastive, lp_edge_weight_for_loss: [w]}",
        );
        assert_eq!(contrastive.lp_edge_weight_for_loss().unwrap(), None);
        assert_eq!(contrastive.lp_embed_normalizer().unwrap(), Some(LpEmbedNormalizer::L2Norm));
    }

    #[test]
    fn test_loss_dependent_temperatures() {
        let config = fixture(Some(TaskType::LinkPrediction), "{contrastive_loss_temperature: 0.1}");
        assert!(config.contrastive_loss_temperature().is_err());

        let config = fixture(
            Some(TaskType::LinkPrediction),
            "{lp_loss_func: contrastive, contrastive_loss_temperature: 0.1}",
        );
        assert!((config.contrastive_loss_temperature().unwrap() - 0.1).abs() < f64::EPSILON);

        let config = fixture(Some(TaskType::LinkPrediction), "{lp_loss_func: bpr, adversarial_temperature: 1.0}");
        assert!(config.adversarial_temperature().is_err());
    }

    #[test]
    fn test_link_prediction_vocabularies() {
        let config = fixture(
            Some(TaskType::LinkPrediction),
            "{lp_decoder_type: DistMult, train_negative_sampler: fast_joint, model_select_etype: ALL}",
        );
        assert_eq!(config.lp_decoder_type().unwrap(), LpDecoderType::Distmult);
        assert_eq!(config.train_negative_sampler().unwrap(), NegativeSampler::FastJoint);
        assert_eq!(config.eval_negative_sampler().unwrap(), NegativeSampler::Joint);
        assert_eq!(config.model_select_etype().unwrap(), ModelSelectEtype::All);

        let bad = fixture(Some(TaskType::LinkPrediction), "{train_negative_sampler: random}");
        assert!(bad.train_negative_sampler().is_err());
    }

    #[test]
    fn test_hard_negatives_are_link_prediction_only() {
        let config = fixture(
            Some(TaskType::LinkPrediction),
            "{num_train_hard_negatives: ['a,r,b:5'], train_etypes_negative_dstnode: [neg]}",
        );
        assert!(matches!(config.num_train_hard_negatives().unwrap(), Some(EtypeSpec::PerEtype(_))));
        assert_eq!(config.train_etypes_negative_dstnode().unwrap(), Some(EtypeSpec::Global("neg".to_string())));

        let node_task = fixture(Some(TaskType::NodeClassification), "{eval_etypes_negative_dstnode: [neg]}");
        assert!(node_task.eval_etypes_negative_dstnode().is_err());
    }

    #[test]
    fn test_target_etype_defaults_to_homogeneous() {
        let config = fixture(Some(TaskType::EdgeRegression), "{}");
        assert_eq!(config.target_etype().unwrap(), vec![CanonicalEtype::homogeneous()]);

        let bad = fixture(Some(TaskType::EdgeRegression), "{target_etype: ['a,b']}");
        assert!(bad.target_etype().is_err());
    }

    #[test]
    fn test_multiple_target_ntypes() {
        let config = fixture(Some(TaskType::NodeRegression), "{target_ntype: [movie, user]}");
        let target = config.target_ntype().unwrap();
        assert_eq!(target.id_fragment(), "movie__user");
        assert_eq!(config.eval_target_ntype().unwrap(), "movie");
    }
}
