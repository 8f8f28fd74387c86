//! # Model building blocks
//!
//! Layers shared by the sentence encoders: the input embedding block, mean
//! pooling over the time axis and the pairwise scorers comparing two sentence
//! vectors.

mod embedding;
mod pooling;
mod scorers;

pub use embedding::EmbeddingBlock;
pub use pooling::{Pooling, PoolingMode};
pub use scorers::{MlpScorer, MlpSum, PtScorer, PtScorerType};
