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

//! # Word averaging sentence encoder
//!
//! In its default settings this is the unigram baseline of Yu et al. (2014),
//! [Deep Learning for Answer Sentence Selection](http://arxiv.org/abs/1412.1632):
//! a sentence is represented by the mean of its word embeddings, followed by a
//! projection. Pairs are then compared with the MLP scorer, which works much
//! better than the original bilinear form.
//!
//! With `inp_e_dropout=0 inp_w_dropout=1/3 deep=2 pact=relu` the same encoder
//! is a Deep Averaging Network ([Iyyer et al., 2015](http://cs.umd.edu/~miyyer/pubs/2015_acl_dan.pdf)),
//! available directly as the `dan` model.
//!
//! The encoder optionally projects each word vector before averaging
//! (`wproject`), which allows the sentence pair flags to be mixed into the
//! word representation.

use crate::blocks::{MlpSum, Pooling, PoolingMode, PtScorerType};
use crate::common::activations::TensorFunction;
use crate::common::linear::dense;
use crate::common::Activation;
use crate::tasks::{HiddenDims, StsConfig};
use std::borrow::Borrow;
use tch::{nn, Tensor};

/// Configuration defaults of the averaging model.
pub fn config(c: &mut StsConfig) {
    c.l2reg = 1e-5;

    c.wproject = false;
    c.wdim = 1.0;
    c.wact = Activation::linear;

    c.pooling = PoolingMode::mean;
    c.deep = 0;
    c.nnact = Activation::relu;
    c.nninit = crate::common::Initializer::glorot_uniform;

    c.project = true;
    c.pdim = 1.0;
    c.pact = Activation::tanh;

    c.inp_e_dropout = 1.0 / 3.0;
    c.inp_w_dropout = 0.0;
    c.ptscorer = PtScorerType::mlp;
    c.mlpsum = MlpSum::sum;
    c.ddim = HiddenDims::Single(1.0);
}

/// Configuration defaults of the Deep Averaging Network.
pub fn dan_config(c: &mut StsConfig) {
    config(c);
    c.inp_e_dropout = 0.0;
    c.inp_w_dropout = 1.0 / 3.0;
    c.deep = 2;
    c.pact = Activation::relu;
}

#[derive(Debug)]
struct ActivatedDense {
    linear: nn::Linear,
    activation: TensorFunction,
}

impl ActivatedDense {
    fn forward(&self, x: &Tensor) -> Tensor {
        self.activation.get_fn()(&x.apply(&self.linear))
    }
}

/// # Averaging encoder
///
/// Shared between the two sentences of a pair.
#[derive(Debug)]
pub struct AvgEncoder {
    word_projection: Option<ActivatedDense>,
    pooling: Pooling,
    deep: Vec<ActivatedDense>,
    projection: Option<ActivatedDense>,
    output_dim: i64,
}

impl AvgEncoder {
    /// Builds the encoder for per-token vectors of size `n_emb`.
    pub fn new<'p, P>(p: P, n_emb: i64, config: &StsConfig) -> AvgEncoder
    where
        P: Borrow<nn::Path<'p>>,
    {
        let p = p.borrow();
        let scaled = |multiplier: f64| ((n_emb as f64 * multiplier) as i64).max(1);

        let mut dim = n_emb;
        let word_projection = if config.wproject {
            let out_dim = scaled(config.wdim);
            let layer = ActivatedDense {
                linear: dense(p / "wproj", dim, out_dim, config.nninit),
                activation: config.wact.get_function(),
            };
            dim = out_dim;
            Some(layer)
        } else {
            None
        };

        let deep = (0..config.deep)
            .map(|layer_index| ActivatedDense {
                linear: dense(p / format!("deep_{}", layer_index), dim, dim, config.nninit),
                activation: config.nnact.get_function(),
            })
            .collect();

        let projection = if config.project {
            let out_dim = scaled(config.pdim);
            let layer = ActivatedDense {
                linear: dense(p / "proj", dim, out_dim, config.nninit),
                activation: config.pact.get_function(),
            };
            dim = out_dim;
            Some(layer)
        } else {
            None
        };

        AvgEncoder {
            word_projection,
            pooling: Pooling::new(config.pooling),
            deep,
            projection,
            output_dim: dim,
        }
    }

    /// Size of the sentence vectors produced
    pub fn output_dim(&self) -> i64 {
        self.output_dim
    }

    /// Encodes embedded sentences `[batch, spad, n_emb]` into `[batch, output_dim]`.
    pub fn forward_t(&self, embedded: &Tensor, mask: &Tensor, _train: bool) -> Tensor {
        let tokens = match &self.word_projection {
            Some(layer) => layer.forward(embedded),
            None => embedded.shallow_clone(),
        };
        let mut sentence = self.pooling.forward(&tokens, mask);
        for layer in &self.deep {
            sentence = layer.forward(&sentence);
        }
        match &self.projection {
            Some(layer) => layer.forward(&sentence),
            None => sentence,
        }
    }

    pub fn regularized_weights(&self) -> Vec<Tensor> {
        self.word_projection
            .iter()
            .chain(self.deep.iter())
            .chain(self.projection.iter())
            .map(|layer| layer.linear.ws.shallow_clone())
            .collect()
    }
}
