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

use serde::{Deserialize, Serialize};
use tch::{Kind, Tensor};

#[allow(non_camel_case_types)]
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
/// # Reduction of the token vectors of a sentence into a sentence vector
pub enum PoolingMode {
    /// Mean over all `spad` positions, padding included
    mean,
    /// Mean over the real tokens only
    masked_mean,
}

/// Mean over the time axis.
///
/// Turns a `[batch, sequence, dim]` tensor into a `[batch, dim]` sentence vector.
/// With [`PoolingMode::masked_mean`] only the positions where `mask` is non-zero
/// are averaged and empty sentences pool to the zero vector.
#[derive(Debug)]
pub struct Pooling {
    mode: PoolingMode,
}

impl Pooling {
    pub fn new(mode: PoolingMode) -> Pooling {
        Pooling { mode }
    }

    pub fn mode(&self) -> PoolingMode {
        self.mode
    }

    pub fn forward(&self, token_embeddings: &Tensor, mask: &Tensor) -> Tensor {
        match self.mode {
            PoolingMode::mean => token_embeddings.mean_dim(&[1], false, Kind::Float),
            PoolingMode::masked_mean => {
                let input_mask_expanded = mask
                    .unsqueeze(-1)
                    .to_kind(Kind::Float)
                    .expand_as(token_embeddings);
                let sum_embeddings = (token_embeddings * &input_mask_expanded)
                    .sum_dim_intlist(&[1], false, Kind::Float);
                let sum_mask = input_mask_expanded
                    .sum_dim_intlist(&[1], false, Kind::Float)
                    .clamp_min(1e-9);
                sum_embeddings / sum_mask
            }
        }
    }
}
