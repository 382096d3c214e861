//! GraphStorm Config - configuration and task resolution for GraphStorm runs.
//!
//! This crate turns a YAML experiment description plus command line
//! overrides into a validated configuration:
//! - Layered settings store with YAML and command line provenance
//! - Typed accessors with defaults and domain checks
//! - Multi-task expansion into task descriptors
//! - Runtime config snapshot next to the saved model
//!
//! # Example
//!
//! ```rust,no_run
//! use graphstorm_config::{GsConfigBuilder, TaskSettings};
//!
//! fn main() -> graphstorm_config::ConfigResult<()> {
//!     let config = GsConfigBuilder::new("train.yaml").override_setting("batch_size", 64).build()?;
//!     config.verify_arguments(true)?;
//!     println!("{:?} with batch size {}", config.task_type(), config.batch_size()?);
//!     Ok(())
//! }
//! ```

pub mod accessors;
pub mod args;
pub mod config;
pub mod error;
pub mod etype;
pub mod formats;
pub mod lm;
pub mod logging;
pub mod metrics;
pub mod partition;
pub mod provenance;
pub mod registry;
pub mod settings;
pub mod task;

pub use accessors::{ModelSelectEtype, NodeTarget, PerType, TaskSettings};
pub use args::{GsArgs, OverrideArgs};
pub use config::{GsConfig, GsConfigBuilder};
pub use error::{ConfigError, ConfigResult};
pub use etype::CanonicalEtype;
pub use registry::TaskType;
pub use settings::{SettingSource, Settings};
pub use task::{TaskConfig, TaskInfo, TaskSummary};
