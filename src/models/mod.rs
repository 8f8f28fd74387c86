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

//! # Sentence pair models
//!
//! A model is an input embedding block, a sentence encoder applied to both
//! sentences, a pairwise scorer and a 6-way softmax classifier over the
//! similarity classes. The encoder is selected with [`ModelType`](ModelType),
//! each model type also contributing its own configuration defaults.

pub mod avg;
mod sts_model;

pub use avg::AvgEncoder;
pub use sts_model::{EncoderOption, StsModel};

use crate::tasks::StsConfig;
use crate::StsError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
/// # Identifies the sentence encoder of a model
pub enum ModelType {
    /// Word averaging baseline
    Avg,
    /// Deep Averaging Network
    Dan,
}

impl ModelType {
    /// Applies the configuration defaults of the model.
    pub fn config(&self, c: &mut StsConfig) {
        match self {
            ModelType::Avg => avg::config(c),
            ModelType::Dan => avg::dan_config(c),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ModelType::Avg => "avg",
            ModelType::Dan => "dan",
        }
    }
}

impl FromStr for ModelType {
    type Err = StsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "avg" => Ok(ModelType::Avg),
            "dan" => Ok(ModelType::Dan),
            _ => Err(StsError::InvalidConfigurationError(format!(
                "Unknown model {:?}, expected one of: avg, dan",
                s
            ))),
        }
    }
}

impl std::fmt::Display for ModelType {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
