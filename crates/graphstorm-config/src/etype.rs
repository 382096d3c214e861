//! Canonical edge types.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};
use crate::registry::DEFAULT_ETYPE;

/// A `(source node type, relation, destination node type)` triple.
///
/// Components are opaque strings. Whether they exist in the graph schema is
/// the graph loader's concern.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CanonicalEtype {
    pub src: String,
    pub rel: String,
    pub dst: String,
}

impl CanonicalEtype {
    #[must_use]
    pub fn new(src: impl Into<String>, rel: impl Into<String>, dst: impl Into<String>) -> Self {
        Self { src: src.into(), rel: rel.into(), dst: dst.into() }
    }

    /// The edge type assumed for homogeneous graphs.
    #[must_use]
    pub fn homogeneous() -> Self {
        Self::new(DEFAULT_ETYPE.0, DEFAULT_ETYPE.1, DEFAULT_ETYPE.2)
    }

    /// Parses `src<sep>rel<sep>dst`. Components are kept verbatim.
    pub fn parse_with(field: &str, raw: &str, sep: char) -> ConfigResult<Self> {
        let parts: Vec<&str> = raw.split(sep).collect();
        match parts.as_slice() {
            [src, rel, dst] => Ok(Self::new(*src, *rel, *dst)),
            _ => Err(ConfigError::invalid(
                field,
                format!(
                    "edge type '{}' must be a canonical edge type in the format of src{sep}relation{sep}dst",
                    raw
                ),
            )),
        }
    }

    /// Parses the comma separated form used by most settings.
    pub fn parse(field: &str, raw: &str) -> ConfigResult<Self> {
        Self::parse_with(field, raw, ',')
    }

    /// Like [`CanonicalEtype::parse`] but trims whitespace around each component.
    pub fn parse_trimmed(field: &str, raw: &str) -> ConfigResult<Self> {
        let etype = Self::parse(field, raw)?;
        Ok(Self::new(etype.src.trim(), etype.rel.trim(), etype.dst.trim()))
    }

    /// Components joined with `sep`, e.g. `user_rating_movie`.
    #[must_use]
    pub fn joined(&self, sep: &str) -> String {
        format!("{}{sep}{}{sep}{}", self.src, self.rel, self.dst)
    }
}

impl fmt::Display for CanonicalEtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.src, self.rel, self.dst)
    }
}
