//! # Training loop, objectives and optimizers
//!
//! The heavy lifting (automatic differentiation, optimizer updates) is done by
//! libtorch through `tch`; this module wires the objective, L2 regularization,
//! mini-batching, Pearson monitoring, checkpointing and early stopping.

mod callbacks;
mod objectives;
mod optimizer;
mod trainer;

pub use callbacks::{EarlyStopping, ModelCheckpoint};
pub use objectives::{pearson_loss, Loss};
pub use optimizer::{OptimizerOption, OptimizerType};
pub use trainer::{predict, EpochMetrics, Trainer, TrainingHistory};
