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

//! Pairwise comparison functions mapping two sentence vectors to a score.

use crate::common::linear::dense;
use crate::common::Initializer;
use crate::tasks::StsConfig;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use tch::{nn, Kind, Tensor};

#[allow(non_camel_case_types)]
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
/// # Type of pairwise scorer
pub enum PtScorerType {
    /// Dot product of the sentence vectors
    #[serde(alias = "dot_ptscorer", alias = "B.dot_ptscorer")]
    dot,
    /// Cosine similarity of the sentence vectors
    #[serde(alias = "cos_ptscorer", alias = "B.cos_ptscorer")]
    cos,
    /// Small MLP over the sum (or absolute difference) and product of the vectors
    #[serde(alias = "mlp_ptscorer", alias = "B.mlp_ptscorer")]
    mlp,
    /// Linear layer over the concatenated vectors
    #[serde(alias = "cat_ptscorer", alias = "B.cat_ptscorer")]
    cat,
    /// Linear layer over the second sentence vector only
    #[serde(rename = "1")]
    answer_only,
}

#[allow(non_camel_case_types)]
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
/// # Combination fed to the MLP scorer next to the elementwise product
pub enum MlpSum {
    /// Elementwise sum
    sum,
    /// Elementwise absolute difference
    absdiff,
}

#[derive(Debug)]
pub struct MlpScorer {
    sum_mode: MlpSum,
    hidden: Vec<nn::Linear>,
    output: nn::Linear,
}

impl MlpScorer {
    pub fn new<'p, P>(
        p: P,
        input_dim: i64,
        hidden_dims: &[f64],
        init: Initializer,
        sum_mode: MlpSum,
    ) -> MlpScorer
    where
        P: Borrow<nn::Path<'p>>,
    {
        let p = p.borrow();
        let mut hidden = Vec::with_capacity(hidden_dims.len());
        let mut dim = 2 * input_dim;
        for (layer_index, multiplier) in hidden_dims.iter().enumerate() {
            let out_dim = ((input_dim as f64 * multiplier) as i64).max(1);
            hidden.push(dense(
                p / format!("hidden_{}", layer_index),
                dim,
                out_dim,
                init,
            ));
            dim = out_dim;
        }
        let output = dense(p / "output", dim, 1, Initializer::glorot_uniform);
        MlpScorer {
            sum_mode,
            hidden,
            output,
        }
    }

    pub fn forward(&self, e0: &Tensor, e1: &Tensor) -> Tensor {
        let combined = match self.sum_mode {
            MlpSum::sum => e0 + e1,
            MlpSum::absdiff => (e0 - e1).abs(),
        };
        let mut hidden_state = Tensor::cat(&[combined, e0 * e1], 1);
        for layer in &self.hidden {
            hidden_state = hidden_state.apply(layer).tanh();
        }
        hidden_state.apply(&self.output)
    }

    fn kernels(&self) -> Vec<Tensor> {
        self.hidden
            .iter()
            .chain(std::iter::once(&self.output))
            .map(|layer| layer.ws.shallow_clone())
            .collect()
    }
}

/// # Pairwise scorer
///
/// All variants return a `[batch, 1]` score from two `[batch, dim]` sentence
/// vectors.
#[derive(Debug)]
pub enum PtScorer {
    Dot,
    Cos,
    Mlp(MlpScorer),
    Cat(nn::Linear),
    AnswerOnly(nn::Linear),
}

impl PtScorer {
    /// Creates the scorer selected in the configuration for sentence vectors of size `input_dim`.
    pub fn new<'p, P>(p: P, input_dim: i64, config: &StsConfig) -> PtScorer
    where
        P: Borrow<nn::Path<'p>>,
    {
        let p = p.borrow();
        match config.ptscorer {
            PtScorerType::dot => PtScorer::Dot,
            PtScorerType::cos => PtScorer::Cos,
            PtScorerType::mlp => PtScorer::Mlp(MlpScorer::new(
                p / "mlp",
                input_dim,
                &config.ddim.layers(),
                config.dinit,
                config.mlpsum,
            )),
            PtScorerType::cat => PtScorer::Cat(dense(
                p / "cat",
                2 * input_dim,
                1,
                Initializer::glorot_uniform,
            )),
            PtScorerType::answer_only => PtScorer::AnswerOnly(dense(
                p / "cat",
                input_dim,
                1,
                Initializer::glorot_uniform,
            )),
        }
    }

    pub fn forward(&self, e0: &Tensor, e1: &Tensor) -> Tensor {
        match self {
            PtScorer::Dot => (e0 * e1).sum_dim_intlist(&[1], true, Kind::Float),
            PtScorer::Cos => Tensor::cosine_similarity(e0, e1, 1, 1e-8).unsqueeze(1),
            PtScorer::Mlp(scorer) => scorer.forward(e0, e1),
            PtScorer::Cat(linear) => Tensor::cat(&[e0, e1], 1).apply(linear),
            PtScorer::AnswerOnly(linear) => e1.apply(linear),
        }
    }

    /// Kernels subject to L2 regularization.
    pub fn regularized_weights(&self) -> Vec<Tensor> {
        match self {
            PtScorer::Dot | PtScorer::Cos => vec![],
            PtScorer::Mlp(scorer) => scorer.kernels(),
            PtScorer::Cat(linear) | PtScorer::AnswerOnly(linear) => vec![linear.ws.shallow_clone()],
        }
    }
}
