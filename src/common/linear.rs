// Copyright 2019 Laurent Mazare.
// Copyright 2019 Guillaume Becquin
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
use std::borrow::Borrow;
use tch::nn::{Init, Linear, LinearConfig, Path};
use tch::Tensor;

#[allow(non_camel_case_types)]
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
/// # Weight initialization scheme for dense layer kernels
pub enum Initializer {
    /// Uniform in `[-sqrt(6 / (fan_in + fan_out)), sqrt(6 / (fan_in + fan_out))]`
    glorot_uniform,
    /// Kaiming (He) uniform, the `tch` default
    kaiming_uniform,
    /// All zeros
    zeros,
}

impl Initializer {
    pub fn to_init(self, in_dim: i64, out_dim: i64) -> Init {
        match self {
            Initializer::glorot_uniform => {
                let bound = (6.0 / (in_dim + out_dim) as f64).sqrt();
                Init::Uniform {
                    lo: -bound,
                    up: bound,
                }
            }
            Initializer::kaiming_uniform => Init::KaimingUniform,
            Initializer::zeros => Init::Const(0.),
        }
    }
}

/// Dense layer with a zero-initialized bias and the kernel initialized by `init`.
///
/// The kernel is stored under `<path>/weight` and the bias under `<path>/bias`.
pub fn dense<'a, T: Borrow<Path<'a>>>(
    vs: T,
    in_dim: i64,
    out_dim: i64,
    init: Initializer,
) -> Linear {
    let linear_config = LinearConfig {
        ws_init: init.to_init(in_dim, out_dim),
        bs_init: Some(Init::Const(0.)),
        bias: true,
    };
    tch::nn::linear(vs.borrow(), in_dim, out_dim, linear_config)
}

/// L2 penalty `sum(W^2)` of a kernel, to be scaled by the regularization strength.
pub fn l2_penalty(weights: &Tensor) -> Tensor {
    (weights * weights).sum(tch::Kind::Float)
}
