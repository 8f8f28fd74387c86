//! # Task controllers
//!
//! A task owns the datasets of an experiment and the configuration, builds the
//! model for a given [`ModelType`](crate::models::ModelType), trains and
//! evaluates it. [`experiment`] repeats training runs and reports their results.

mod config;
pub mod experiment;
pub mod sts;

pub use config::{HiddenDims, StsConfig};
pub use experiment::{experiment_config, report_row, summary_row, train_runs, RunReport};
pub use sts::{freeze_layers, StsResults, StsTask};
