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

use crate::data::StsInputs;
use crate::eval::pearson;
use crate::models::StsModel;
use crate::tasks::StsConfig;
use crate::training::callbacks::{EarlyStopping, ModelCheckpoint};
use crate::training::optimizer::OptimizerOption;
use crate::StsError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tch::{nn, no_grad, Device, Kind, Tensor};

/// Metrics recorded at the end of an epoch
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct EpochMetrics {
    pub epoch: usize,
    /// Average training loss (objective and regularization) over the batches
    pub loss: f64,
    pub train_pearson: f64,
    pub val_pearson: f64,
    /// Training pairs visited during the epoch
    pub samples: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrainingHistory {
    pub epochs: Vec<EpochMetrics>,
    /// Epoch whose weights were kept
    pub best_epoch: Option<usize>,
    pub stopped_early: bool,
}

impl TrainingHistory {
    /// Best validation Pearson reached, `NaN` if no epoch produced one.
    pub fn best_val_pearson(&self) -> f64 {
        self.best_epoch
            .and_then(|epoch| self.epochs.iter().find(|m| m.epoch == epoch))
            .map(|m| m.val_pearson)
            .unwrap_or(f64::NAN)
    }

    /// Writes one CSV row per epoch.
    pub fn to_csv<P: AsRef<Path>>(&self, path: P) -> Result<(), StsError> {
        let mut writer = csv::Writer::from_path(path)?;
        for metrics in &self.epochs {
            writer.serialize(metrics)?;
        }
        writer.flush()?;
        Ok(())
    }
}

/// Class probabilities for a whole set, computed in batches without gradient tracking.
pub fn predict(model: &StsModel, inputs: &StsInputs, batch_size: usize) -> Tensor {
    let batch_size = batch_size.max(1);
    no_grad(|| {
        let outputs: Vec<Tensor> = (0..inputs.len())
            .step_by(batch_size)
            .map(|start| model.predict_proba(&inputs.batch(start, batch_size)))
            .collect();
        if outputs.is_empty() {
            Tensor::zeros(
                &[0, crate::data::NUM_CLASSES],
                (Kind::Float, inputs.si0.device()),
            )
        } else {
            Tensor::cat(&outputs, 0)
        }
    })
}

fn set_pearson(model: &StsModel, inputs: &StsInputs, batch_size: usize) -> f64 {
    let probabilities = predict(model, inputs, batch_size);
    let predicted = Vec::<f64>::from(
        &crate::data::sts_categorical2labels(&probabilities)
            .to_kind(Kind::Double)
            .to(Device::Cpu),
    );
    pearson(&predicted, &inputs.scores)
}

/// # Training loop
///
/// Mini-batch training with per-epoch shuffling. After every epoch the Pearson
/// correlation is computed on the training and validation sets; the weights with
/// the best validation Pearson are saved to the checkpoint file and training
/// stops after `patience` epochs without improvement. The best weights are
/// restored into `vs` before returning.
pub struct Trainer<'a> {
    config: &'a StsConfig,
}

impl<'a> Trainer<'a> {
    pub fn new(config: &'a StsConfig) -> Trainer<'a> {
        Trainer { config }
    }

    pub fn fit(
        &self,
        model: &StsModel,
        vs: &mut nn::VarStore,
        train: &StsInputs,
        val: &StsInputs,
        weights_file: &Path,
    ) -> Result<TrainingHistory, StsError> {
        let config = self.config;
        if train.is_empty() {
            return Err(StsError::ValueError(
                "Cannot train on an empty training set".to_string(),
            ));
        }
        let mut optimizer = OptimizerOption::new(config.opt, vs, config.lr)?;
        let mut checkpoint = ModelCheckpoint::new(weights_file);
        let mut early_stopping = EarlyStopping::new(config.patience);
        let mut history = TrainingHistory::default();

        let n = train.len();
        let samples_per_epoch = ((n as f64 * config.epoch_fract).ceil() as usize).max(1).min(n);

        for epoch in 1..=config.epochs {
            let permutation =
                Vec::<i64>::from(&Tensor::randperm(n as i64, (Kind::Int64, Device::Cpu)));
            let mut loss_sum = 0f64;
            let mut batches = 0usize;
            let mut samples = 0usize;
            for indices in permutation[..samples_per_epoch].chunks(config.batch_size) {
                let batch = train.select(indices);
                samples += indices.len();
                let logits = model.forward_t(&batch, true);
                let loss =
                    config.loss.compute(&logits, &batch.classes) + model.regularization_loss();
                optimizer.backward_step(&loss);
                loss_sum += loss.double_value(&[]);
                batches += 1;
            }

            let metrics = EpochMetrics {
                epoch,
                loss: loss_sum / batches as f64,
                train_pearson: set_pearson(model, train, config.predict_batch_size),
                val_pearson: set_pearson(model, val, config.predict_batch_size),
                samples,
            };
            tracing::info!(
                "Epoch {:>3}/{} | loss={:.6} | train Pearson {:.6} | val Pearson {:.6}",
                epoch,
                config.epochs,
                metrics.loss,
                metrics.train_pearson,
                metrics.val_pearson
            );
            history.epochs.push(metrics);

            if checkpoint.on_epoch_end(metrics.val_pearson, vs)? {
                history.best_epoch = Some(epoch);
            }
            if early_stopping.on_epoch_end(metrics.val_pearson) {
                tracing::info!(
                    "No val Pearson improvement for {} epochs, stopping at epoch {}",
                    config.patience,
                    epoch
                );
                history.stopped_early = true;
                break;
            }
        }

        if checkpoint.saved() {
            vs.load(checkpoint.path())?;
            tracing::info!(
                "Restored weights of epoch {:?} (val Pearson {:.6})",
                history.best_epoch,
                checkpoint.best()
            );
        } else {
            tracing::warn!("Validation Pearson never defined, keeping the final weights");
        }
        Ok(history)
    }
}
