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

use crate::blocks::{EmbeddingBlock, PtScorer};
use crate::common::linear::{dense, l2_penalty};
use crate::common::Initializer;
use crate::data::{StsInputs, Vocabulary, WordEmbeddings, NUM_CLASSES};
use crate::models::{AvgEncoder, ModelType};
use crate::tasks::StsConfig;
use std::borrow::Borrow;
use tch::{nn, Kind, Tensor};

/// # Abstraction that holds one particular sentence encoder
pub enum EncoderOption {
    /// Word averaging encoder (also used by the Deep Averaging Network)
    Avg(AvgEncoder),
}

impl EncoderOption {
    /// Instantiates the encoder of `model_type` for per-token vectors of size `n_emb`.
    pub fn new<'p, P>(model_type: ModelType, p: P, n_emb: i64, config: &StsConfig) -> Self
    where
        P: Borrow<nn::Path<'p>>,
    {
        match model_type {
            ModelType::Avg | ModelType::Dan => EncoderOption::Avg(AvgEncoder::new(p, n_emb, config)),
        }
    }

    pub fn output_dim(&self) -> i64 {
        match self {
            Self::Avg(encoder) => encoder.output_dim(),
        }
    }

    pub fn forward_t(&self, embedded: &Tensor, mask: &Tensor, train: bool) -> Tensor {
        match self {
            Self::Avg(encoder) => encoder.forward_t(embedded, mask, train),
        }
    }

    pub fn regularized_weights(&self) -> Vec<Tensor> {
        match self {
            Self::Avg(encoder) => encoder.regularized_weights(),
        }
    }
}

/// # Sentence pair similarity model
///
/// Embeds and encodes both sentences with shared weights, compares the two
/// sentence vectors with the configured scorer and maps the (linear) score to
/// logits over the [`NUM_CLASSES`] similarity classes.
///
/// Variables are stored under `emb`, `encoder`, `scorer` and `output`.
pub struct StsModel {
    embedding: EmbeddingBlock,
    encoder: EncoderOption,
    scorer: PtScorer,
    output: nn::Linear,
    l2reg: f64,
}

impl StsModel {
    /// Builds a new `StsModel`
    ///
    /// # Arguments
    ///
    /// * `p` - Variable store path for the root of the model
    /// * `model_type` - sentence encoder to use
    /// * `vocab` - vocabulary indexing the trainable embeddings
    /// * `emb` - pretrained word vectors used to initialize the embeddings
    /// * `config` - experiment configuration
    ///
    /// # Example
    ///
    /// ```no_run
    /// use rust_sts::data::{Vocabulary, WordEmbeddings};
    /// use rust_sts::models::{ModelType, StsModel};
    /// use rust_sts::tasks::StsConfig;
    /// use tch::{nn, Device};
    ///
    /// # fn main() -> anyhow::Result<()> {
    /// let emb = WordEmbeddings::from_glove("glove.6B.300d.txt")?;
    /// let sentences = vec![vec!["a".to_string(), "cat".to_string()]];
    /// let vocab = Vocabulary::new(sentences.iter(), None, false);
    /// let mut config = StsConfig::default();
    /// ModelType::Avg.config(&mut config);
    ///
    /// let vs = nn::VarStore::new(Device::Cpu);
    /// let model = StsModel::new(&vs.root(), ModelType::Avg, &vocab, &emb, &config);
    /// # Ok(())
    /// # }
    /// ```
    pub fn new<'p, P>(
        p: P,
        model_type: ModelType,
        vocab: &Vocabulary,
        emb: &WordEmbeddings,
        config: &StsConfig,
    ) -> StsModel
    where
        P: Borrow<nn::Path<'p>>,
    {
        let p = p.borrow();
        let embedding = EmbeddingBlock::new(p / "emb", vocab, emb, config);
        let encoder = EncoderOption::new(model_type, p / "encoder", embedding.output_dim(), config);
        let scorer = PtScorer::new(p / "scorer", encoder.output_dim(), config);
        let output = dense(p / "output", 1, NUM_CLASSES, Initializer::glorot_uniform);
        StsModel {
            embedding,
            encoder,
            scorer,
            output,
            l2reg: config.l2reg,
        }
    }

    /// Forward pass returning the class logits `[batch, NUM_CLASSES]`.
    pub fn forward_t(&self, inputs: &StsInputs, train: bool) -> Tensor {
        let e0 = self
            .embedding
            .forward_t(&inputs.si0, &inputs.se0, &inputs.f0, train);
        let e1 = self
            .embedding
            .forward_t(&inputs.si1, &inputs.se1, &inputs.f1, train);
        let h0 = self.encoder.forward_t(&e0, &inputs.m0, train);
        let h1 = self.encoder.forward_t(&e1, &inputs.m1, train);
        self.scorer.forward(&h0, &h1).apply(&self.output)
    }

    /// Class probabilities `[batch, NUM_CLASSES]`, without dropout.
    pub fn predict_proba(&self, inputs: &StsInputs) -> Tensor {
        self.forward_t(inputs, false).softmax(-1, Kind::Float)
    }

    /// `l2reg * sum(W^2)` over the dense kernels of the encoder, scorer and classifier.
    pub fn regularization_loss(&self) -> Tensor {
        let device = self.output.ws.device();
        let mut weights = self.encoder.regularized_weights();
        weights.extend(self.scorer.regularized_weights());
        weights.push(self.output.ws.shallow_clone());
        weights
            .iter()
            .map(l2_penalty)
            .fold(Tensor::zeros(&[], (Kind::Float, device)), |acc, penalty| {
                acc + penalty
            })
            * self.l2reg
    }
}
