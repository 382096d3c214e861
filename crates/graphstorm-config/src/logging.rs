//! Process-wide logging setup.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing::{Level, debug};
use tracing_subscriber::FmtSubscriber;

use crate::error::{ConfigError, ConfigResult};

/// Maps a `--logging-level` value onto a tracing level.
pub fn parse_level(level: &str) -> ConfigResult<Level> {
    match level.to_ascii_lowercase().as_str() {
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warning" | "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        other => Err(ConfigError::invalid(
            "logging_level",
            format!("unsupported logging level '{other}', expected debug, info, warning or error"),
        )),
    }
}

/// Installs the global subscriber, writing to `file` when given and to
/// stderr otherwise.
///
/// Only the first call in a process installs a subscriber. Later calls keep
/// it and return `Ok`.
pub fn init(level: &str, file: Option<&Path>) -> ConfigResult<()> {
    let level = parse_level(level)?;

    let result = match file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|source| ConfigError::Load { path: path.to_path_buf(), source })?;
            let subscriber = FmtSubscriber::builder()
                .with_max_level(level)
                .without_time()
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .finish();
            tracing::subscriber::set_global_default(subscriber)
        }
        None => {
            let subscriber = FmtSubscriber::builder()
                .with_max_level(level)
                .without_time()
                .with_target(false)
                .with_writer(std::io::stderr)
                .finish();
            tracing::subscriber::set_global_default(subscriber)
        }
    };

    if let Err(e) = result {
        debug!("Keeping the existing logging subscriber: {}", e);
    }
    Ok(())
}
