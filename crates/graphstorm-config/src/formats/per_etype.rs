//! Settings that take either one global value or `src,rel,dst:value` entries.
//!
//! Used by hard negative fields, hard negative counts, and link prediction
//! edge weights.

use std::collections::BTreeMap;

use crate::error::{ConfigError, ConfigResult};
use crate::etype::CanonicalEtype;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EtypeSpec<V> {
    Global(V),
    PerEtype(BTreeMap<CanonicalEtype, V>),
}

impl<V> EtypeSpec<V> {
    /// Value for `etype`, falling back to the global value.
    pub fn get(&self, etype: &CanonicalEtype) -> Option<&V> {
        match self {
            Self::Global(value) => Some(value),
            Self::PerEtype(by_etype) => by_etype.get(etype),
        }
    }
}

/// Parses entries with `parse_value` applied to each value.
///
/// A single entry without a colon is the global value. Otherwise every entry
/// must be `src,rel,dst:value` and an edge type may appear only once.
pub fn parse_etype_spec<V, F>(field: &str, entries: &[String], parse_value: F) -> ConfigResult<EtypeSpec<V>>
where
    V: std::fmt::Debug,
    F: Fn(&str) -> ConfigResult<V>,
{
    if entries.len() == 1 && !entries[0].contains(':') {
        return Ok(EtypeSpec::Global(parse_value(&entries[0])?));
    }

    let mut by_etype = BTreeMap::new();
    for entry in entries {
        let parts: Vec<&str> = entry.split(':').collect();
        let [etype, value] = parts.as_slice() else {
            return Err(ConfigError::invalid(
                field,
                format!("{field} must be provided in format of src,relation,dst:value, but got {entry}"),
            ));
        };
        let etype = CanonicalEtype::parse(field, etype)?;
        if let Some(existing) = by_etype.get(&etype) {
            return Err(ConfigError::invalid(
                field,
                format!("you already specify {field} of {etype} as {existing:?}"),
            ));
        }
        by_etype.insert(etype, parse_value(value)?);
    }
    Ok(EtypeSpec::PerEtype(by_etype))
}

/// Value parser for integer entries.
pub fn parse_int_value(field: &str) -> impl Fn(&str) -> ConfigResult<i64> + '_ {
    move |raw| {
        raw.trim()
            .parse::<i64>()
            .map_err(|_| ConfigError::invalid(field, format!("expected an integer, got '{raw}'")))
    }
}

/// Value parser for field name entries.
pub fn parse_name_value(raw: &str) -> ConfigResult<String> {
    Ok(raw.to_string())
}
