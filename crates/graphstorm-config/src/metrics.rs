//! Evaluation metric names accepted per task family.

use crate::error::{ConfigError, ConfigResult};
use crate::registry::TaskType;

pub const CLASSIFICATION_METRICS: &[&str] =
    &["accuracy", "precision_recall", "roc_auc", "f1_score", "per_class_f1_score", "per_class_roc_auc"];

pub const REGRESSION_METRICS: &[&str] = &["rmse", "mse", "mae"];

pub const LINK_PREDICTION_METRICS: &[&str] = &["mrr", "amri"];

pub const HIT_AT_PREFIX: &str = "hit_at";
pub const RECALL_AT_PRECISION_PREFIX: &str = "recall_at_precision";
pub const PRECISION_AT_RECALL_PREFIX: &str = "precision_at_recall";
pub const FSCORE_AT_PREFIX: &str = "fscore_at";

/// Which metric vocabulary a task draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricFamily {
    Classification,
    Regression,
    LinkPrediction,
}

impl MetricFamily {
    #[must_use]
    pub fn of(task: TaskType) -> Self {
        match task {
            TaskType::NodeClassification | TaskType::EdgeClassification => Self::Classification,
            TaskType::NodeRegression
            | TaskType::EdgeRegression
            | TaskType::ReconstructNodeFeat
            | TaskType::ReconstructEdgeFeat => Self::Regression,
            TaskType::LinkPrediction => Self::LinkPrediction,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Classification => "classification",
            Self::Regression => "regression",
            Self::LinkPrediction => "link prediction",
        }
    }
}

/// Metric used when none is configured.
#[must_use]
pub fn default_metric(task: TaskType) -> &'static str {
    match task {
        TaskType::NodeClassification | TaskType::EdgeClassification => "accuracy",
        TaskType::NodeRegression | TaskType::EdgeRegression => "rmse",
        TaskType::ReconstructNodeFeat | TaskType::ReconstructEdgeFeat => "mse",
        TaskType::LinkPrediction => "mrr",
    }
}

/// The part after `<prefix>_`, or `None` when `metric` lacks the prefix.
fn suffix<'a>(metric: &'a str, prefix: &str) -> Option<&'a str> {
    metric.strip_prefix(prefix).map(|rest| rest.strip_prefix('_').unwrap_or(rest))
}

fn check_hit_at(field: &str, family: MetricFamily, metric: &str, k: &str) -> ConfigResult<()> {
    if k.is_empty() || !k.chars().all(|c| c.is_ascii_digit()) {
        return Err(ConfigError::invalid(
            field,
            format!("hit_at_k evaluation metric for {} must end with an integer, but got {metric}", family.label()),
        ));
    }
    Ok(())
}

fn check_beta(field: &str, name: &str, metric: &str, beta: &str) -> ConfigResult<()> {
    let beta: f64 = beta.parse().map_err(|_| {
        ConfigError::invalid(
            field,
            format!("{name}_beta evaluation metric for classification must end with an integer or float, but got {metric}"),
        )
    })?;
    if !(beta > 0.0 && beta <= 1.0) {
        return Err(ConfigError::invalid(
            field,
            format!("the beta in {name}_beta evaluation metric must be in (0, 1], but got {beta}"),
        ));
    }
    Ok(())
}

/// Lowercases `raw` and checks it against the vocabulary of `family`.
pub fn validate_metric(field: &str, family: MetricFamily, raw: &str) -> ConfigResult<String> {
    let metric = raw.to_lowercase();

    match family {
        MetricFamily::Classification => {
            if let Some(k) = suffix(&metric, HIT_AT_PREFIX) {
                check_hit_at(field, family, &metric, k)?;
            } else if let Some(beta) = suffix(&metric, RECALL_AT_PRECISION_PREFIX) {
                check_beta(field, RECALL_AT_PRECISION_PREFIX, &metric, beta)?;
            } else if let Some(beta) = suffix(&metric, PRECISION_AT_RECALL_PREFIX) {
                check_beta(field, PRECISION_AT_RECALL_PREFIX, &metric, beta)?;
            } else if let Some(beta) = suffix(&metric, FSCORE_AT_PREFIX) {
                if beta.parse::<f64>().is_err() {
                    return Err(ConfigError::invalid(
                        field,
                        format!(
                            "fscore_at_beta evaluation metric for classification must end with an integer or float, \
                             but got {metric}"
                        ),
                    ));
                }
            } else if !CLASSIFICATION_METRICS.contains(&metric.as_str()) {
                return Err(unsupported(field, family, CLASSIFICATION_METRICS, raw));
            }
        }
        MetricFamily::Regression => {
            if !REGRESSION_METRICS.contains(&metric.as_str()) {
                return Err(unsupported(field, family, REGRESSION_METRICS, raw));
            }
        }
        MetricFamily::LinkPrediction => {
            if let Some(k) = suffix(&metric, HIT_AT_PREFIX) {
                check_hit_at(field, family, &metric, k)?;
            } else if !LINK_PREDICTION_METRICS.contains(&metric.as_str()) {
                return Err(unsupported(field, family, LINK_PREDICTION_METRICS, raw));
            }
        }
    }
    Ok(metric)
}

fn unsupported(field: &str, family: MetricFamily, expected: &[&str], raw: &str) -> ConfigError {
    ConfigError::invalid(
        field,
        format!("{} evaluation metric should be in {expected:?}, but got {raw}", family.label()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_per_task() {
        assert_eq!(default_metric(TaskType::NodeClassification), "accuracy");
        assert_eq!(default_metric(TaskType::EdgeRegression), "rmse");
        assert_eq!(default_metric(TaskType::ReconstructNodeFeat), "mse");
        assert_eq!(default_metric(TaskType::LinkPrediction), "mrr");
    }

    #[test]
    fn test_classification_metrics() {
        let family = MetricFamily::Classification;
        assert_eq!(validate_metric("eval_metric", family, "Accuracy").unwrap(), "accuracy");
        assert!(validate_metric("eval_metric", family, "hit_at_10").is_ok());
        assert!(validate_metric("eval_metric", family, "hit_at_ten").is_err());
        assert!(validate_metric("eval_metric", family, "recall_at_precision_0.8").is_ok());
        assert!(validate_metric("eval_metric", family, "precision_at_recall_1.5").is_err());
        assert!(validate_metric("eval_metric", family, "fscore_at_2").is_ok());
        assert!(validate_metric("eval_metric", family, "mrr").is_err());
    }

    #[test]
    fn test_regression_and_link_prediction_metrics() {
        assert!(validate_metric("eval_metric", MetricFamily::Regression, "MAE").is_ok());
        assert!(validate_metric("eval_metric", MetricFamily::Regression, "accuracy").is_err());
        assert!(validate_metric("eval_metric", MetricFamily::LinkPrediction, "hit_at_100").is_ok());
        assert!(validate_metric("eval_metric", MetricFamily::LinkPrediction, "amri").is_ok());
        assert!(validate_metric("eval_metric", MetricFamily::LinkPrediction, "roc_auc").is_err());
    }
}
