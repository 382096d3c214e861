//! Per-type feature name lists.
//!
//! Grammar, one entry per CLI value or YAML list item:
//!
//! - `feat`: a single entry without a colon names one global feature.
//! - `ntype:feat0,feat1`: the features of one node type.
//! - `src,rel,dst:feat0,feat1`: the features of one edge type.
//!
//! A node type may repeat across entries, in which case each entry becomes
//! an independently encoded [`FeatureGroup`]. A type with one entry keeps the
//! flat list shape so single-group consumers see what they always saw.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ConfigError, ConfigResult};
use crate::etype::CanonicalEtype;

/// Features of one node type that are encoded together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureGroup {
    pub feature_group: Vec<String>,
}

impl FeatureGroup {
    #[must_use]
    pub fn new(features: Vec<String>) -> Self {
        Self { feature_group: features }
    }
}

/// Features of one type: a flat list, or several groups once a type repeats.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FeatureList {
    Names(Vec<String>),
    Groups(Vec<FeatureGroup>),
}

/// Resolved feature names, keyed by node type (`String`) or edge type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FeatureNames<K: Ord> {
    Global(String),
    PerType(BTreeMap<K, FeatureList>),
}

fn split_features(raw: &str) -> Vec<String> {
    raw.split(',').map(|item| item.trim().to_string()).collect()
}

fn is_global(entries: &[String]) -> bool {
    entries.len() == 1 && !entries[0].contains(':')
}

fn split_entry<'a>(field: &str, entry: &'a str, expected: &str) -> ConfigResult<(&'a str, &'a str)> {
    let parts: Vec<&str> = entry.split(':').collect();
    match parts.as_slice() {
        [ty, feats] => Ok((*ty, *feats)),
        _ => Err(ConfigError::invalid(
            field,
            format!("unknown format of the feature name: {entry}, must be {expected}"),
        )),
    }
}

/// Parses node feature names.
pub fn parse_node_feat_names(field: &str, entries: &[String]) -> ConfigResult<FeatureNames<String>> {
    if is_global(entries) {
        return Ok(FeatureNames::Global(entries[0].clone()));
    }

    let mut by_ntype: BTreeMap<String, FeatureList> = BTreeMap::new();
    for entry in entries {
        let (ntype, feats) = split_entry(field, entry, "NODE_TYPE:FEAT_NAME")?;
        let feats = split_features(feats);
        match by_ntype.remove(ntype) {
            Some(FeatureList::Names(first)) => {
                let groups = vec![FeatureGroup::new(first), FeatureGroup::new(feats)];
                debug!("{} nodes has {} feature groups", ntype, groups.len());
                by_ntype.insert(ntype.to_string(), FeatureList::Groups(groups));
            }
            Some(FeatureList::Groups(mut groups)) => {
                groups.push(FeatureGroup::new(feats));
                debug!("{} nodes has {} feature groups", ntype, groups.len());
                by_ntype.insert(ntype.to_string(), FeatureList::Groups(groups));
            }
            None => {
                debug!("{} nodes has {:?} features", ntype, feats);
                by_ntype.insert(ntype.to_string(), FeatureList::Names(feats));
            }
        }
    }
    Ok(FeatureNames::PerType(by_ntype))
}

/// Parses edge feature names. An edge type may appear only once.
pub fn parse_edge_feat_names(field: &str, entries: &[String]) -> ConfigResult<FeatureNames<CanonicalEtype>> {
    if is_global(entries) {
        return Ok(FeatureNames::Global(entries[0].clone()));
    }

    let mut by_etype = BTreeMap::new();
    for entry in entries {
        let (etype, feats) = split_entry(field, entry, "src_node_type,relation_type,dst_node_type:feat_name")?;
        let etype = CanonicalEtype::parse_trimmed(field, etype)?;
        if let Some(existing) = by_etype.get(&etype) {
            return Err(ConfigError::invalid(
                field,
                format!("you already specify the feature names of {etype} as {existing:?}"),
            ));
        }
        by_etype.insert(etype, FeatureList::Names(split_features(feats)));
    }
    Ok(FeatureNames::PerType(by_etype))
}

/// Renders feature names back into entries accepted by the parsers.
#[must_use]
pub fn format_feat_names<K: Ord + std::fmt::Display>(names: &FeatureNames<K>) -> Vec<String> {
    match names {
        FeatureNames::Global(name) => vec![name.clone()],
        FeatureNames::PerType(by_type) => by_type
            .iter()
            .flat_map(|(ty, list)| match list {
                FeatureList::Names(feats) => vec![format!("{ty}:{}", feats.join(","))],
                FeatureList::Groups(groups) => groups
                    .iter()
                    .map(|group| format!("{ty}:{}", group.feature_group.join(",")))
                    .collect(),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_single_entry_without_colon_is_global() {
        let names = parse_node_feat_names("node_feat_name", &entries(&["feat"])).unwrap();
        assert_eq!(names, FeatureNames::Global("feat".to_string()));
    }

    #[test]
    fn test_per_ntype_flat_list() {
        let names = parse_node_feat_names("node_feat_name", &entries(&["ntypeA:f1, f2", "ntypeB:f3"])).unwrap();
        let FeatureNames::PerType(by_ntype) = names else { panic!("expected per type names") };
        assert_eq!(by_ntype["ntypeA"], FeatureList::Names(vec!["f1".to_string(), "f2".to_string()]));
        assert_eq!(by_ntype["ntypeB"], FeatureList::Names(vec!["f3".to_string()]));
    }

    #[test]
    fn test_repeated_ntype_becomes_groups() {
        let names =
            parse_node_feat_names("node_feat_name", &entries(&["ntypeA:f1", "ntypeA:f2", "ntypeA:f3,f4"])).unwrap();
        let FeatureNames::PerType(by_ntype) = names else { panic!("expected per type names") };
        assert_eq!(
            by_ntype["ntypeA"],
            FeatureList::Groups(vec![
                FeatureGroup::new(vec!["f1".to_string()]),
                FeatureGroup::new(vec!["f2".to_string()]),
                FeatureGroup::new(vec!["f3".to_string(), "f4".to_string()]),
            ])
        );
    }

    #[test]
    fn test_multiple_entries_require_colon() {
        let err = parse_node_feat_names("node_feat_name", &entries(&["feat", "other"])).unwrap_err();
        assert!(err.to_string().contains("NODE_TYPE:FEAT_NAME"));

        assert!(parse_node_feat_names("node_feat_name", &entries(&["a:b:c"])).is_err());
    }

    #[test]
    fn test_edge_feat_names_reject_duplicate_etype() {
        let names = parse_edge_feat_names("edge_feat_name", &entries(&["user, rates ,movie:w0,w1"])).unwrap();
        let FeatureNames::PerType(by_etype) = names else { panic!("expected per type names") };
        assert!(by_etype.contains_key(&CanonicalEtype::new("user", "rates", "movie")));

        let err =
            parse_edge_feat_names("edge_feat_name", &entries(&["a,r,b:f0", "a, r, b:f1"])).unwrap_err();
        assert!(err.to_string().contains("already specify"));
    }

    #[test]
    fn test_edge_feat_names_require_canonical_etype() {
        assert!(parse_edge_feat_names("edge_feat_name", &entries(&["a,r:f0"])).is_err());
    }

    #[test]
    fn test_format_then_parse_keeps_groups() {
        let raw = entries(&["movie:title", "movie:genre,year", "user:age"]);
        let parsed = parse_node_feat_names("node_feat_name", &raw).unwrap();
        let reparsed = parse_node_feat_names("node_feat_name", &format_feat_names(&parsed)).unwrap();
        assert_eq!(parsed, reparsed);
    }
}
