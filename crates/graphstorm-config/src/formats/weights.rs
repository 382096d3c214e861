//! Per-class weight lists such as `0.1,0.2,0.3`.

use crate::error::{ConfigError, ConfigResult};

/// Lower bound applied to every weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeightBound {
    /// Weights must be `>= 0`.
    NonNegative,
    /// Weights must be `> 0`.
    Positive,
}

/// Parses a comma separated weight list with exactly `num_classes` entries.
pub fn parse_class_weights(field: &str, raw: &str, bound: WeightBound, num_classes: i64) -> ConfigResult<Vec<f64>> {
    let weights = raw
        .split(',')
        .map(|w| w.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| ConfigError::invalid(field, "the weights should be in the following format 0.1,0.2,0.3,0.1"))?;

    for w in &weights {
        match bound {
            WeightBound::NonNegative if *w < 0.0 => {
                return Err(ConfigError::invalid(field, "weights can not be negative values"));
            }
            WeightBound::Positive if *w <= 0.0 => {
                return Err(ConfigError::invalid(field, "each weight should be larger than 0"));
            }
            _ => {}
        }
    }

    if weights.len() as i64 != num_classes {
        return Err(ConfigError::invalid(
            field,
            format!("each class must have an assigned weight: got {} weights for {num_classes} classes", weights.len()),
        ));
    }
    Ok(weights)
}
