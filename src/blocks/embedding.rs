// Copyright 2019-present Guillaume Becquin
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//     http://www.apache.org/licenses/LICENSE-2.0
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::common::dropout::{Dropout, WordDropout};
use crate::data::{Vocabulary, WordEmbeddings, FLAGS_DIM};
use crate::tasks::StsConfig;
use std::borrow::Borrow;
use tch::{nn, Tensor};

/// # Input embedding block
///
/// Looks up the trainable embeddings of a sentence (initialized from the
/// pretrained vectors), adds the fixed vectors of the tokens left out of the
/// vocabulary, applies word dropout, optionally concatenates the sentence pair
/// flags and finally applies dropout. The same block embeds both sentences.
#[derive(Debug)]
pub struct EmbeddingBlock {
    word_embeddings: nn::Embedding,
    word_dropout: WordDropout,
    dropout: Dropout,
    add_flags: bool,
    output_dim: i64,
}

impl EmbeddingBlock {
    pub fn new<'p, P>(
        p: P,
        vocab: &Vocabulary,
        emb: &WordEmbeddings,
        config: &StsConfig,
    ) -> EmbeddingBlock
    where
        P: Borrow<nn::Path<'p>>,
    {
        let p = p.borrow();
        let mut word_embeddings = nn::embedding(
            p / "word_embeddings",
            vocab.size(),
            emb.dim(),
            Default::default(),
        );
        let initial_weights = vocab.embmatrix(emb).to(p.device());
        tch::no_grad(|| word_embeddings.ws.copy_(&initial_weights));

        let output_dim = if config.e_add_flags {
            emb.dim() + FLAGS_DIM
        } else {
            emb.dim()
        };

        EmbeddingBlock {
            word_embeddings,
            word_dropout: WordDropout::new(config.inp_w_dropout),
            dropout: Dropout::new(config.inp_e_dropout),
            add_flags: config.e_add_flags,
            output_dim,
        }
    }

    /// Size of the per-token vectors produced (`N`, plus the flags if enabled)
    pub fn output_dim(&self) -> i64 {
        self.output_dim
    }

    /// Embeds a batch of sentences.
    ///
    /// # Arguments
    ///
    /// * `ids` - vocabulary indices `[batch, spad]`
    /// * `fixed` - fixed vectors `[batch, spad, N]`
    /// * `flags` - sentence pair flags `[batch, spad, FLAGS_DIM]`
    /// * `train` - enables dropout
    pub fn forward_t(&self, ids: &Tensor, fixed: &Tensor, flags: &Tensor, train: bool) -> Tensor {
        let embedded = ids.apply(&self.word_embeddings) + fixed;
        let embedded = embedded.apply_t(&self.word_dropout, train);
        let embedded = if self.add_flags {
            Tensor::cat(&[embedded, flags.shallow_clone()], 2)
        } else {
            embedded
        };
        embedded.apply_t(&self.dropout, train)
    }
}
