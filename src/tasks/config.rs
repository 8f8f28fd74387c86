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

use crate::blocks::{MlpSum, PoolingMode, PtScorerType};
use crate::common::{Activation, Config, Initializer};
use crate::training::{Loss, OptimizerType};
use crate::StsError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Hidden layer sizes of the MLP scorer, as multiples of the sentence vector size.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum HiddenDims {
    /// A single hidden layer (no hidden layer for `0`)
    Single(f64),
    /// One hidden layer per entry
    Layers(Vec<f64>),
}

impl HiddenDims {
    pub fn layers(&self) -> Vec<f64> {
        match self {
            HiddenDims::Single(d) if *d == 0.0 => vec![],
            HiddenDims::Single(d) => vec![*d],
            HiddenDims::Layers(layers) => layers.clone(),
        }
    }
}

/// # Experiment configuration
///
/// Flat set of hyperparameters consumed by the task, the embedding block, the
/// sentence encoders and the scorers. Field names follow the configuration keys
/// accepted on the command line (`key=value`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StsConfig {
    /// Keep only the N most frequent training tokens trainable (`None` keeps all)
    pub embprune: Option<usize>,
    /// Case-insensitive vocabulary
    pub embicase: bool,
    /// Dropout applied to the embedded sequences
    pub inp_e_dropout: f64,
    /// Probability of dropping whole token vectors
    pub inp_w_dropout: f64,
    /// Concatenate per-token sentence pair flags to the embeddings
    pub e_add_flags: bool,

    /// Word-level projection before averaging
    pub wproject: bool,
    pub wdim: f64,
    pub wact: Activation,
    /// Averaging over all padded positions or over the real tokens only
    pub pooling: PoolingMode,
    /// Number of dense layers after averaging (Deep Averaging Network)
    pub deep: usize,
    pub nnact: Activation,
    pub nninit: Initializer,
    /// Projection of the averaged sentence vector
    pub project: bool,
    pub pdim: f64,
    pub pact: Activation,

    /// Pairwise scoring function
    pub ptscorer: PtScorerType,
    /// Combination of the sentence vectors fed to the MLP scorer
    pub mlpsum: MlpSum,
    #[serde(rename = "Ddim")]
    pub ddim: HiddenDims,
    #[serde(rename = "Dinit")]
    pub dinit: Initializer,
    /// L2 regularization strength of the dense kernels
    pub l2reg: f64,

    pub loss: Loss,
    pub opt: OptimizerType,
    pub lr: f64,
    pub epochs: usize,
    pub batch_size: usize,
    /// Fraction of the training set visited per epoch
    pub epoch_fract: f64,
    /// Epochs without validation Pearson improvement before stopping
    pub patience: usize,
    pub nb_runs: usize,
    /// Variable name prefixes excluded from training (e.g. `emb`)
    pub fix_layers: Vec<String>,
    pub predict_batch_size: usize,
    pub skip_unlabeled: bool,
    pub seed: Option<i64>,
}

impl Config for StsConfig {}

impl Default for StsConfig {
    fn default() -> Self {
        StsConfig {
            embprune: Some(100),
            embicase: false,
            inp_e_dropout: 0.5,
            inp_w_dropout: 0.0,
            e_add_flags: true,
            wproject: false,
            wdim: 1.0,
            wact: Activation::linear,
            pooling: PoolingMode::mean,
            deep: 0,
            nnact: Activation::relu,
            nninit: Initializer::glorot_uniform,
            project: false,
            pdim: 1.0,
            pact: Activation::tanh,
            ptscorer: PtScorerType::mlp,
            mlpsum: MlpSum::sum,
            ddim: HiddenDims::Single(2.0),
            dinit: Initializer::glorot_uniform,
            l2reg: 1e-4,
            loss: Loss::mse,
            opt: OptimizerType::adam,
            lr: 1e-3,
            epochs: 16,
            batch_size: 160,
            epoch_fract: 1.0,
            patience: 4,
            nb_runs: 1,
            fix_layers: vec![],
            predict_batch_size: 3000,
            skip_unlabeled: true,
            seed: None,
        }
    }
}

fn parse_value(raw: &str) -> Value {
    let raw = raw.trim();
    for quote in &['\'', '"'] {
        if raw.len() >= 2 && raw.starts_with(*quote) && raw.ends_with(*quote) {
            return Value::String(raw[1..raw.len() - 1].to_string());
        }
    }
    match raw {
        "True" => return Value::Bool(true),
        "False" => return Value::Bool(false),
        "None" => return Value::Null,
        _ => {}
    }
    if let Some(fraction) = parse_fraction(raw) {
        return serde_json::json!(fraction);
    }
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

fn parse_fraction(raw: &str) -> Option<f64> {
    let mut parts = raw.splitn(2, '/');
    let numerator = parts.next()?.trim().parse::<f64>().ok()?;
    let denominator = parts.next()?.trim().parse::<f64>().ok()?;
    Some(numerator / denominator)
}

impl StsConfig {
    /// Sets a single configuration key.
    ///
    /// The value is parsed as JSON, with a few conveniences: quoted values are
    /// taken as strings, `True`/`False`/`None` are accepted, as are fractions
    /// such as `1/3`. Anything else that is not valid JSON is taken as a string.
    ///
    /// # Example
    ///
    /// ```
    /// use rust_sts::tasks::StsConfig;
    ///
    /// # fn main() -> anyhow::Result<()> {
    /// let mut config = StsConfig::default();
    /// config.set("pact", "'relu'")?;
    /// config.set("inp_w_dropout", "1/3")?;
    /// config.set("deep", "2")?;
    /// assert_eq!(config.deep, 2);
    /// # Ok(())
    /// # }
    /// ```
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), StsError> {
        let mut fields = match serde_json::to_value(&*self)? {
            Value::Object(fields) => fields,
            other => {
                return Err(StsError::InvalidConfigurationError(format!(
                    "Configuration did not serialize to an object: {}",
                    other
                )));
            }
        };
        if !fields.contains_key(key) {
            return Err(StsError::InvalidConfigurationError(format!(
                "Unknown configuration key {:?}",
                key
            )));
        }
        fields.insert(key.to_string(), parse_value(value));
        *self = serde_json::from_value(Value::Object(fields)).map_err(|e| {
            StsError::InvalidConfigurationError(format!(
                "Invalid value {:?} for {}: {}",
                value, key, e
            ))
        })?;
        Ok(())
    }

    /// Applies a `key=value` override.
    pub fn apply_override(&mut self, assignment: &str) -> Result<(), StsError> {
        let mut parts = assignment.splitn(2, '=');
        match (parts.next(), parts.next()) {
            (Some(key), Some(value)) if !key.trim().is_empty() => self.set(key.trim(), value),
            _ => Err(StsError::InvalidConfigurationError(format!(
                "Expected key=value, got {:?}",
                assignment
            ))),
        }
    }

    /// Checks value ranges that would otherwise fail deep inside training.
    pub fn validate(&self) -> Result<(), StsError> {
        for (name, p) in &[
            ("inp_e_dropout", self.inp_e_dropout),
            ("inp_w_dropout", self.inp_w_dropout),
        ] {
            if !(0.0..1.0).contains(p) {
                return Err(StsError::InvalidConfigurationError(format!(
                    "{} must be in [0, 1), got {}",
                    name, p
                )));
            }
        }
        if self.batch_size == 0 || self.predict_batch_size == 0 {
            return Err(StsError::InvalidConfigurationError(
                "Batch sizes must be positive".to_string(),
            ));
        }
        if !(self.epoch_fract > 0.0 && self.epoch_fract <= 1.0) {
            return Err(StsError::InvalidConfigurationError(format!(
                "epoch_fract must be in (0, 1], got {}",
                self.epoch_fract
            )));
        }
        if self.nb_runs == 0 {
            return Err(StsError::InvalidConfigurationError(
                "nb_runs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
