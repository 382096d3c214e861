//! Closed vocabularies referenced throughout validation.
//!
//! Each vocabulary is a plain enum with a stable wire name. Parsing goes
//! through [`std::str::FromStr`] and rendering through `Display`, so the
//! names accepted in YAML and on the command line are the names printed back.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// File written next to the saved model holding the effective configuration.
pub const RUNTIME_CONFIG_FILENAME: &str = "GRAPHSTORM_RUNTIME_UPDATED_TRAINING_CONFIG.yaml";

/// Graph construction config stored beside the partition config.
pub const GCONSTRUCT_CONFIG_FILENAME: &str = "data_transform_new.json";

/// Node type assumed for homogeneous graphs.
pub const DEFAULT_NTYPE: &str = "_N";

/// Edge type assumed for homogeneous graphs.
pub const DEFAULT_ETYPE: (&str, &str, &str) = ("_N", "_E", "_N");

/// Model selection over the average of all edge types.
pub const MODEL_SELECT_ETYPE_ALL: &str = "ALL";

/// Task id fragment for link prediction over every edge type.
pub const ALL_ETYPE_TASK_ID: &str = "ALL_ETYPE";

/// Unknown names surface as a `(vocabulary, offending value)` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownName {
    pub vocabulary: &'static str,
    pub value: String,
    pub expected: &'static [&'static str],
}

impl fmt::Display for UnknownName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unsupported {} '{}', expected one of {:?}", self.vocabulary, self.value, self.expected)
    }
}

impl std::error::Error for UnknownName {}

macro_rules! vocabulary {
    (
        $(#[$meta:meta])*
        $name:ident, $label:literal {
            $($(#[$vmeta:meta])* $variant:ident => $wire:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum $name {
            $($(#[$vmeta])* #[serde(rename = $wire)] $variant),+
        }

        impl $name {
            /// Every accepted wire name, in declaration order.
            pub const NAMES: &'static [&'static str] = &[$($wire),+];

            /// Every variant, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            #[must_use]
            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $wire),+
                }
            }
        }

        impl FromStr for $name {
            type Err = UnknownName;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($wire => Ok($name::$variant),)+
                    _ => Err(UnknownName { vocabulary: $label, value: s.to_string(), expected: Self::NAMES }),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

vocabulary! {
    /// Graph learning task families.
    TaskType, "task type" {
        NodeClassification => "node_classification",
        NodeRegression => "node_regression",
        EdgeClassification => "edge_classification",
        EdgeRegression => "edge_regression",
        LinkPrediction => "link_prediction",
        ReconstructNodeFeat => "reconstruct_node_feat",
        ReconstructEdgeFeat => "reconstruct_edge_feat",
    }
}

impl TaskType {
    #[must_use]
    pub fn is_classification(self) -> bool {
        matches!(self, Self::NodeClassification | Self::EdgeClassification)
    }

    #[must_use]
    pub fn is_regression(self) -> bool {
        matches!(self, Self::NodeRegression | Self::EdgeRegression)
    }

    /// Tasks predicting on edges, including link prediction.
    #[must_use]
    pub fn is_edge_task(self) -> bool {
        matches!(self, Self::EdgeClassification | Self::EdgeRegression | Self::LinkPrediction)
    }

    #[must_use]
    pub fn is_feature_reconstruction(self) -> bool {
        matches!(self, Self::ReconstructNodeFeat | Self::ReconstructEdgeFeat)
    }

    /// Whether a `gsf` section of this name sets the active task type.
    /// Feature reconstruction only runs inside `multi_task_learning`.
    #[must_use]
    pub fn is_single_task_family(self) -> bool {
        !self.is_feature_reconstruction()
    }
}

vocabulary! {
    /// Model encoders. GNN encoders take fanouts and layer counts.
    EncoderType, "model encoder type" {
        Lm => "lm",
        Mlp => "mlp",
        Gat => "gat",
        Rgat => "rgat",
        Rgcn => "rgcn",
        Sage => "sage",
        Hgt => "hgt",
        Gatv2 => "gatv2",
    }
}

impl EncoderType {
    #[must_use]
    pub fn is_gnn(self) -> bool {
        !matches!(self, Self::Lm | Self::Mlp)
    }
}

vocabulary! {
    /// Distributed training backends.
    Backend, "backend" {
        Gloo => "gloo",
        Nccl => "nccl",
    }
}

vocabulary! {
    /// How edge features join node features during message passing.
    EdgeFeatMpOp, "edge feature message passing operation" {
        Concat => "concat",
        Add => "add",
        Sub => "sub",
        Mul => "mul",
        Div => "div",
    }
}

vocabulary! {
    ClassLossFunc, "classification loss function" {
        CrossEntropy => "cross_entropy",
        Focal => "focal",
    }
}

vocabulary! {
    RegressionLossFunc, "regression loss function" {
        Mse => "mse",
        Shrinkage => "shrinkage",
    }
}

vocabulary! {
    LpLossFunc, "link prediction loss function" {
        CrossEntropy => "cross_entropy",
        Logsigmoid => "logsigmoid",
        Contrastive => "contrastive",
        Bpr => "bpr",
    }
}

vocabulary! {
    /// Score functions for link prediction.
    LpDecoderType, "link prediction decoder" {
        DotProduct => "dot_product",
        Distmult => "distmult",
        Rotate => "rotate",
        TranseL1 => "transe_l1",
        TranseL2 => "transe_l2",
    }
}

vocabulary! {
    /// Decoders for edge classification and regression.
    EdgeDecoderType, "edge decoder" {
        DenseBiDecoder => "DenseBiDecoder",
        MlpDecoder => "MLPDecoder",
    }
}

vocabulary! {
    /// Normalization applied inside GNN layers and decoders.
    NormType, "normalization type" {
        Batch => "batch",
        Layer => "layer",
    }
}

vocabulary! {
    LpEmbedNormalizer, "link prediction embedding normalizer" {
        L2Norm => "l2_norm",
    }
}

vocabulary! {
    /// Negative samplers for link prediction.
    NegativeSampler, "negative sampler" {
        Uniform => "uniform",
        Joint => "joint",
        InbatchJoint => "inbatch_joint",
        LocalUniform => "localuniform",
        LocalJoint => "localjoint",
        AllEtypeUniform => "all_etype_uniform",
        AllEtypeJoint => "all_etype_joint",
        FastUniform => "fast_uniform",
        FastJoint => "fast_joint",
        FastLocalUniform => "fast_localuniform",
        FastLocalJoint => "fast_localjoint",
    }
}

vocabulary! {
    EarlyStopStrategy, "early stop strategy" {
        ConsecutiveIncrease => "consecutive_increase",
        AverageIncrease => "average_increase",
    }
}

vocabulary! {
    TaskTracker, "task tracker" {
        Sagemaker => "sagemaker_task_tracker",
        Tensorboard => "tensorboard_task_tracker",
    }
}

vocabulary! {
    EmbedFormat, "embedding save format" {
        Pytorch => "pytorch",
        Hdf5 => "hdf5",
    }
}

vocabulary! {
    /// Model layers that can be restored from a checkpoint.
    ModelLayer, "model layer" {
        Embed => "embed",
        Gnn => "gnn",
        Decoder => "decoder",
        DenseEmbed => "dense_embed",
        SparseEmbed => "sparse_embed",
    }
}

impl ModelLayer {
    /// Layers restored when nothing else is requested.
    pub const DEFAULT_RESTORE: &'static [ModelLayer] = &[Self::Embed, Self::Gnn, Self::Decoder];
}

vocabulary! {
    /// LM/GNN co-training schemes.
    TrainingMethodName, "training method" {
        Default => "default",
        Glem => "glem",
    }
}

vocabulary! {
    InputActivation, "input activation" {
        Identity => "none",
        Relu => "relu",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_type_round_trips_wire_names() {
        for task in TaskType::ALL {
            assert_eq!(task.as_str().parse::<TaskType>().unwrap(), *task);
        }
    }

    #[test]
    fn test_unknown_name_lists_expected_values() {
        let err = "graphsage".parse::<EncoderType>().unwrap_err();
        assert_eq!(err.vocabulary, "model encoder type");
        assert!(err.to_string().contains("rgcn"));
    }

    #[test]
    fn test_single_task_families() {
        let families = TaskType::ALL.iter().filter(|task| task.is_single_task_family()).count();
        assert_eq!(families, 5);
        assert!(!TaskType::ReconstructNodeFeat.is_single_task_family());
        assert!(!TaskType::ReconstructEdgeFeat.is_single_task_family());
    }

    #[test]
    fn test_encoder_gnn_partition() {
        assert!(EncoderType::Rgcn.is_gnn());
        assert!(EncoderType::Hgt.is_gnn());
        assert!(!EncoderType::Lm.is_gnn());
        assert!(!EncoderType::Mlp.is_gnn());
    }

    #[test]
    fn test_edge_decoder_names_are_case_sensitive() {
        assert_eq!("MLPDecoder".parse::<EdgeDecoderType>().unwrap(), EdgeDecoderType::MlpDecoder);
        assert!("mlpdecoder".parse::<EdgeDecoderType>().is_err());
    }

    #[test]
    fn test_task_type_groups() {
        assert!(TaskType::LinkPrediction.is_edge_task());
        assert!(!TaskType::NodeRegression.is_edge_task());
        assert!(TaskType::EdgeClassification.is_classification());
        assert!(TaskType::ReconstructEdgeFeat.is_feature_reconstruction());
    }
}
