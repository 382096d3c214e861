//! Neighbor sampling fanouts.
//!
//! Two forms are accepted, chosen by the first comma separated token:
//!
//! - `20,10`: one integer per GNN layer, `-1` meaning all neighbors.
//! - `n0/r0/n1:20@n1/r1/n0:10,n0/r0/n1:5@n1/r1/n0:2`: per layer, a set of
//!   `src/rel/dst:N` pairs joined by `@`.

use std::collections::BTreeMap;

use crate::error::{ConfigError, ConfigResult};
use crate::etype::CanonicalEtype;

/// Parsed fanout, one element per GNN layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fanout {
    Uniform(Vec<i64>),
    PerEtype(Vec<BTreeMap<CanonicalEtype, i64>>),
}

impl Fanout {
    /// Full neighborhood sampling for `num_layers` layers.
    #[must_use]
    pub fn all_neighbors(num_layers: usize) -> Self {
        Self::Uniform(vec![-1; num_layers])
    }

    #[must_use]
    pub fn num_layers(&self) -> usize {
        match self {
            Self::Uniform(layers) => layers.len(),
            Self::PerEtype(layers) => layers.len(),
        }
    }
}

fn format_error(field: &str, kind: &str) -> ConfigError {
    ConfigError::invalid(
        field,
        format!(
            "{kind} fanout should either be in format 20,10 when all edge types have the same fanout \
             or etype2:20@etype3:20@etype1:20,etype2:10@etype3:4@etype1:2 when you want to specify \
             a different fanout for different edge types. Each etype (e.g., etype2) should be a \
             canonical etype in format of srcntype/relation/dstntype"
        ),
    )
}

fn is_uniform_token(token: &str) -> bool {
    (!token.is_empty() && token.chars().all(|c| c.is_ascii_digit())) || token == "-1"
}

fn parse_layer(field: &str, kind: &str, layer: &str) -> ConfigResult<BTreeMap<CanonicalEtype, i64>> {
    let mut fanouts = BTreeMap::new();
    for pair in layer.split('@') {
        let (etype, count) = pair.split_once(':').ok_or_else(|| format_error(field, kind))?;
        let etype = CanonicalEtype::parse_with(field, etype, '/').map_err(|_| format_error(field, kind))?;
        let count = count.trim().parse::<i64>().map_err(|_| format_error(field, kind))?;
        fanouts.insert(etype, count);
    }
    Ok(fanouts)
}

/// Parses a fanout string and checks it covers exactly `num_layers` layers.
///
/// `kind` names the fanout in error messages, e.g. `Train` or `Evaluation`.
pub fn parse_fanout(field: &str, kind: &str, raw: &str, num_layers: usize) -> ConfigResult<Fanout> {
    let tokens: Vec<&str> = raw.split(',').collect();
    let fanout = if is_uniform_token(tokens[0]) {
        let layers = tokens
            .iter()
            .map(|token| token.trim().parse::<i64>().map_err(|_| format_error(field, kind)))
            .collect::<ConfigResult<Vec<_>>>()?;
        Fanout::Uniform(layers)
    } else {
        let layers =
            tokens.iter().map(|layer| parse_layer(field, kind, layer)).collect::<ConfigResult<Vec<_>>>()?;
        Fanout::PerEtype(layers)
    };

    if fanout.num_layers() != num_layers {
        return Err(ConfigError::invalid(
            field,
            format!(
                "you have a {num_layers} layer GNN, but you only specify a {kind} fanout for {} layers",
                fanout.num_layers()
            ),
        ));
    }
    Ok(fanout)
}

/// Renders a fanout back into the string form accepted by [`parse_fanout`].
#[must_use]
pub fn format_fanout(fanout: &Fanout) -> String {
    match fanout {
        Fanout::Uniform(layers) => layers.iter().map(ToString::to_string).collect::<Vec<_>>().join(","),
        Fanout::PerEtype(layers) => layers
            .iter()
            .map(|layer| {
                layer
                    .iter()
                    .map(|(etype, count)| format!("{}:{count}", etype.joined("/")))
                    .collect::<Vec<_>>()
                    .join("@")
            })
            .collect::<Vec<_>>()
            .join(","),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_fanout_matches_layer_count() {
        let fanout = parse_fanout("fanout", "Train", "20,10", 2).unwrap();
        assert_eq!(fanout, Fanout::Uniform(vec![20, 10]));

        let err = parse_fanout("fanout", "Train", "20,10", 3).unwrap_err();
        assert!(err.to_string().contains("3 layer GNN"));
    }

    #[test]
    fn test_minus_one_selects_uniform_form() {
        let fanout = parse_fanout("eval_fanout", "Evaluation", "-1,-1", 2).unwrap();
        assert_eq!(fanout, Fanout::all_neighbors(2));
    }

    #[test]
    fn test_per_etype_fanout() {
        let fanout = parse_fanout("fanout", "Train", "a/r/b:20@b/rr/a:10,a/r/b:5@b/rr/a:2", 2).unwrap();
        let Fanout::PerEtype(layers) = fanout else { panic!("expected per etype fanout") };
        assert_eq!(layers[0][&CanonicalEtype::new("a", "r", "b")], 20);
        assert_eq!(layers[0][&CanonicalEtype::new("b", "rr", "a")], 10);
        assert_eq!(layers[1][&CanonicalEtype::new("b", "rr", "a")], 2);
    }

    #[test]
    fn test_malformed_tokens_raise() {
        assert!(parse_fanout("fanout", "Train", "a/r/b:x", 1).is_err());
        assert!(parse_fanout("fanout", "Train", "a/r:10", 1).is_err());
        assert!(parse_fanout("fanout", "Train", "a,r,b:10", 1).is_err());
        assert!(parse_fanout("fanout", "Train", "10,abc", 2).is_err());
        assert!(parse_fanout("fanout", "Train", "", 1).is_err());
    }

    #[test]
    fn test_format_then_parse_per_etype() {
        let raw = "a/r/b:20@b/rr/a:10,a/r/b:5@b/rr/a:2";
        let fanout = parse_fanout("fanout", "Train", raw, 2).unwrap();
        let again = parse_fanout("fanout", "Train", &format_fanout(&fanout), 2).unwrap();
        assert_eq!(fanout, again);
    }
}
