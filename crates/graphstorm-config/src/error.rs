//! Error types for configuration loading and resolution.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Errors raised while loading, resolving, or validating a configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read a configuration file.
    #[error("failed to read config file {path}: {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The YAML document could not be parsed.
    #[error("yaml error - check yaml file {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// The document does not have the expected section layout.
    #[error("malformed configuration: {0}")]
    Malformed(String),

    /// A required setting has no value and no default.
    #[error("{field} must be provided: {reason}")]
    Missing { field: String, reason: String },

    /// A setting holds a value outside its domain.
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    /// An override names a setting that does not exist.
    #[error("unknown setting: {0}")]
    UnknownSetting(String),

    /// The multi-task learning block is malformed.
    #[error("invalid multi-task configuration: {0}")]
    MultiTask(String),

    /// One entry of the multi-task learning block failed validation.
    #[error("task {index} ({task_type}) is invalid: {source}")]
    Task {
        index: usize,
        task_type: String,
        #[source]
        source: Box<ConfigError>,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl ConfigError {
    pub(crate) fn missing(field: &str, reason: impl Into<String>) -> Self {
        Self::Missing { field: field.to_string(), reason: reason.into() }
    }

    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        Self::InvalidValue { field: field.to_string(), reason: reason.into() }
    }
}
