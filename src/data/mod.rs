//! # Dataset loading and vectorization
//!
//! Sentence pair files are read into an [`StsDataset`](StsDataset) of tokenized
//! sentences, a [`Vocabulary`](Vocabulary) is built from the training sentences
//! and every set is turned into [`StsInputs`](StsInputs) tensors.
//!
//! ```no_run
//! use rust_sts::data::{load_sts, StsInputs, Vocabulary, WordEmbeddings};
//!
//! # fn main() -> anyhow::Result<()> {
//! let emb = WordEmbeddings::from_glove("glove.6B.300d.txt")?;
//! let train = load_sts("data/sts/semeval-sts/all/2015.train.tsv", true)?;
//! let vocab = Vocabulary::new(train.s0.iter().chain(train.s1.iter()), Some(100), false);
//! let inputs = StsInputs::new(&train, &vocab, &emb, 60, 60)?;
//! # Ok(())
//! # }
//! ```

mod embeddings;
mod inputs;
mod loader;
mod nlp;
mod vocab;

pub use embeddings::WordEmbeddings;
pub use inputs::StsInputs;
pub use loader::{
    load_set, load_sick2014, load_sts, sts_categorical2labels, sts_labels2categorical,
    StsDataset, NUM_CLASSES, UNLABELED,
};
pub use nlp::{is_numeric, sentence_flags, tokenize, FLAGS_DIM};
pub use vocab::{VectorizedSentences, Vocabulary, OOV_INDEX, OOV_TOKEN, PAD_INDEX, PAD_TOKEN};
