//! Reverse edge type maps.
//!
//! Each entry is `head,rel,revrel,tail` and maps `(head,rel,tail)` to the
//! reverse edge type `(tail,revrel,head)`.

use std::collections::BTreeMap;

use crate::error::{ConfigError, ConfigResult};
use crate::etype::CanonicalEtype;

/// Forward edge type to reverse edge type.
pub type ReverseEdgeTypesMap = BTreeMap<CanonicalEtype, CanonicalEtype>;

pub fn parse_reverse_edge_types_map(field: &str, entries: &[String]) -> ConfigResult<ReverseEdgeTypesMap> {
    let mut map = BTreeMap::new();
    for entry in entries {
        let parts: Vec<&str> = entry.split(',').collect();
        let [head, rel, rev_rel, tail] = parts.as_slice() else {
            return Err(ConfigError::invalid(
                field,
                format!(
                    "reverse edge type map should have the format [\"head,relation,reverse relation,tail\", ...], \
                     but got {entries:?}"
                ),
            ));
        };
        map.insert(CanonicalEtype::new(*head, *rel, *tail), CanonicalEtype::new(*tail, *rev_rel, *head));
    }
    Ok(map)
}

/// Renders a map back into `head,rel,revrel,tail` entries.
#[must_use]
pub fn format_reverse_edge_types_map(map: &ReverseEdgeTypesMap) -> Vec<String> {
    map.iter()
        .map(|(forward, reverse)| format!("{},{},{},{}", forward.src, forward.rel, reverse.rel, forward.dst))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_maps_forward_to_reverse() {
        let map = parse_reverse_edge_types_map("reverse_edge_types_map", &["a,r,revr,b".to_string()]).unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(map[&CanonicalEtype::new("a", "r", "b")], CanonicalEtype::new("b", "revr", "a"));
    }

    #[test]
    fn test_wrong_arity_raises() {
        let err = parse_reverse_edge_types_map("reverse_edge_types_map", &["a,r,b".to_string()]).unwrap_err();
        assert!(err.to_string().contains("head,relation,reverse relation,tail"));
    }

    #[test]
    fn test_format_then_parse() {
        let entries = vec!["query,adds,rev-adds,asin".to_string(), "query,clicks,rev-clicks,asin".to_string()];
        let map = parse_reverse_edge_types_map("reverse_edge_types_map", &entries).unwrap();
        assert_eq!(format_reverse_edge_types_map(&map), entries);
    }
}
