//! # Semantic Textual Similarity models and task harness
//!
//! Given two sentences, predict how similar their meaning is. Models embed the
//! words of both sentences, encode each sentence into a vector (word averaging or
//! a Deep Averaging Network), compare the two vectors with a pairwise scorer and
//! classify the result into 6 similarity classes. The predicted score is the
//! expected class value, evaluated against gold scores with Pearson correlation.
//!
//! Tensor operations, automatic differentiation and optimizers are provided by
//! [tch-rs](https://github.com/LaurentMazare/tch-rs), the Rust bindings to libtorch.
//!
//! The crate is organized as follows:
//! - [`data`](data): dataset readers, tokenization, vocabulary, pretrained word vectors and model inputs
//! - [`blocks`](blocks): embedding block, mean pooling and pairwise scorers
//! - [`models`](models): sentence encoders and the full sentence pair model
//! - [`training`](training): objectives, optimizers and the training loop
//! - [`eval`](eval): correlation metrics and multi-run summaries
//! - [`tasks`](tasks): the STS task controller and the experiment configuration
//!
//! ```no_run
//! use rust_sts::data::WordEmbeddings;
//! use rust_sts::models::ModelType;
//! use rust_sts::tasks::{StsConfig, StsTask};
//! use tch::{nn, Device};
//!
//! # fn main() -> anyhow::Result<()> {
//! let model_type = ModelType::Dan;
//! let mut task = StsTask::new(Device::cuda_if_available());
//! let mut config = StsConfig::default();
//! task.config(&mut config);
//! model_type.config(&mut config);
//! config.apply_override("inp_w_dropout=1/4")?;
//! task.set_config(config)?;
//!
//! task.set_embeddings(WordEmbeddings::from_glove("glove.6B.300d.txt")?);
//! task.load_data("sts/2015.train.tsv", "sts/2015.val.tsv", Some("sts/2015.test.tsv"))?;
//!
//! let mut vs = nn::VarStore::new(task.device());
//! let model = task.build_model(&vs, model_type)?;
//! task.fit(&model, &mut vs, "weights-dan-bestval.ot")?;
//! let results = task.eval(&model)?;
//! println!("| {} |{} |", model_type, task.res_columns(&results, " "));
//! # Ok(())
//! # }
//! ```

pub mod blocks;
pub mod common;
pub mod data;
pub mod eval;
pub mod models;
pub mod tasks;
pub mod training;

pub use common::error::StsError;
pub use common::Config;
