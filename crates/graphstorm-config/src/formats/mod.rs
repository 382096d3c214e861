//! Compact string encodings accepted in YAML and on the command line.
//!
//! Every format lives behind a parse function and, where the value is
//! written back out, a matching format function.

pub mod fanout;
pub mod features;
pub mod per_etype;
pub mod reverse;
pub mod weights;

pub use fanout::{format_fanout, parse_fanout, Fanout};
pub use features::{
    format_feat_names, parse_edge_feat_names, parse_node_feat_names, FeatureGroup, FeatureList, FeatureNames,
};
pub use per_etype::{parse_etype_spec, parse_int_value, parse_name_value, EtypeSpec};
pub use reverse::{format_reverse_edge_types_map, parse_reverse_edge_types_map, ReverseEdgeTypesMap};
pub use weights::{parse_class_weights, WeightBound};
