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

//! # Semantic Textual Similarity task
//!
//! Task controller for the SemEval STS and SICK 2014 datasets: loads the sets,
//! builds the vocabulary and the model, trains it against the configured
//! objective and reports Pearson correlations.
//!
//! ```no_run
//! use rust_sts::data::WordEmbeddings;
//! use rust_sts::models::ModelType;
//! use rust_sts::tasks::{StsConfig, StsTask};
//! use tch::{nn, Device};
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut task = StsTask::new(Device::cuda_if_available());
//! let mut config = StsConfig::default();
//! task.config(&mut config);
//! ModelType::Avg.config(&mut config);
//! task.set_config(config)?;
//!
//! task.set_embeddings(WordEmbeddings::from_glove("glove.6B.300d.txt")?);
//! task.load_data(
//!     "data/sts/semeval-sts/all/2015.train.tsv",
//!     "data/sts/semeval-sts/all/2015.val.tsv",
//!     None::<&str>,
//! )?;
//!
//! let mut vs = nn::VarStore::new(task.device());
//! let model = task.build_model(&vs, ModelType::Avg)?;
//! task.fit(&model, &mut vs, "weights-avg-bestval.ot")?;
//! let results = task.eval(&model)?;
//! println!("| avg |{} |", task.res_columns(&results, " "));
//! # Ok(())
//! # }
//! ```

use crate::blocks::PtScorerType;
use crate::data::{load_set, StsDataset, StsInputs, Vocabulary, WordEmbeddings};
use crate::eval::{eval_sts, StsResult};
use crate::models::{ModelType, StsModel};
use crate::tasks::StsConfig;
use crate::training::{predict, Loss, Trainer, TrainingHistory};
use crate::StsError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tch::{nn, Device, Tensor};

/// Default padded sentence length
pub const SPAD: usize = 60;

/// Results on the training, validation and (optional) test sets
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct StsResults {
    pub train: StsResult,
    pub val: StsResult,
    pub test: Option<StsResult>,
}

#[derive(Debug)]
struct LoadedSet {
    path: PathBuf,
    inputs: StsInputs,
}

/// # STS task controller
pub struct StsTask {
    pub name: &'static str,
    pub s0pad: usize,
    pub s1pad: usize,
    device: Device,
    config: StsConfig,
    emb: Option<WordEmbeddings>,
    vocab: Option<Vocabulary>,
    train: Option<LoadedSet>,
    val: Option<LoadedSet>,
    test: Option<LoadedSet>,
}

impl StsTask {
    pub fn new(device: Device) -> StsTask {
        StsTask {
            name: "sts",
            s0pad: SPAD,
            s1pad: SPAD,
            device,
            config: StsConfig::default(),
            emb: None,
            vocab: None,
            train: None,
            val: None,
            test: None,
        }
    }

    /// Applies the task configuration defaults.
    pub fn config(&self, c: &mut StsConfig) {
        c.ptscorer = PtScorerType::dot;
        c.loss = Loss::pearson;
        c.epochs = 32;
        c.patience = 3;
    }

    /// Sets the configuration used to load data, build and train models.
    pub fn set_config(&mut self, config: StsConfig) -> Result<(), StsError> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    pub fn get_config(&self) -> &StsConfig {
        &self.config
    }

    pub fn device(&self) -> Device {
        self.device
    }

    pub fn set_embeddings(&mut self, emb: WordEmbeddings) {
        self.emb = Some(emb);
    }

    /// Reuses an existing vocabulary instead of building one from the first loaded set.
    pub fn set_vocabulary(&mut self, vocab: Vocabulary) {
        self.vocab = Some(vocab);
    }

    pub fn vocabulary(&self) -> Option<&Vocabulary> {
        self.vocab.as_ref()
    }

    fn embeddings(&self) -> Result<&WordEmbeddings, StsError> {
        self.emb.as_ref().ok_or_else(|| {
            StsError::InvalidConfigurationError(
                "Word embeddings must be set before loading data or building a model".to_string(),
            )
        })
    }

    /// Loads and vectorizes a dataset file.
    ///
    /// The vocabulary is built from the sentences of the first set loaded (unless
    /// one was supplied) and reused for all subsequent sets.
    pub fn load_set<P: AsRef<Path>>(
        &mut self,
        path: P,
    ) -> Result<(StsInputs, StsDataset), StsError> {
        let dataset = load_set(path.as_ref(), self.config.skip_unlabeled)?;
        tracing::info!(
            "Loaded {} sentence pairs from {}",
            dataset.len(),
            path.as_ref().display()
        );
        let emb = self.embeddings()?;
        let built = match self.vocab {
            Some(_) => None,
            None => {
                let vocab = Vocabulary::new(
                    dataset.s0.iter().chain(dataset.s1.iter()),
                    self.config.embprune,
                    self.config.embicase,
                );
                tracing::debug!("Built vocabulary of {} tokens", vocab.size());
                Some(vocab)
            }
        };
        let vocab = built.as_ref().or_else(|| self.vocab.as_ref()).ok_or_else(|| {
            StsError::InvalidConfigurationError("Vocabulary not available".to_string())
        })?;
        let inputs = StsInputs::new(&dataset, vocab, emb, self.s0pad, self.s1pad)?
            .to_device(self.device);
        if built.is_some() {
            self.vocab = built;
        }
        Ok((inputs, dataset))
    }

    /// Loads the training, validation and optional test sets.
    pub fn load_data<P: AsRef<Path>, Q: AsRef<Path>, R: AsRef<Path>>(
        &mut self,
        trainf: P,
        valf: Q,
        testf: Option<R>,
    ) -> Result<(), StsError> {
        let (inputs, _) = self.load_set(trainf.as_ref())?;
        self.train = Some(LoadedSet {
            path: trainf.as_ref().to_path_buf(),
            inputs,
        });
        let (inputs, _) = self.load_set(valf.as_ref())?;
        self.val = Some(LoadedSet {
            path: valf.as_ref().to_path_buf(),
            inputs,
        });
        self.test = match testf {
            Some(testf) => {
                let (inputs, _) = self.load_set(testf.as_ref())?;
                Some(LoadedSet {
                    path: testf.as_ref().to_path_buf(),
                    inputs,
                })
            }
            None => None,
        };
        Ok(())
    }

    /// Builds the model in `vs` and freezes the variables named by `fix_layers`.
    pub fn build_model(
        &self,
        vs: &nn::VarStore,
        model_type: ModelType,
    ) -> Result<StsModel, StsError> {
        let vocab = self.vocab.as_ref().ok_or_else(|| {
            StsError::InvalidConfigurationError(
                "A vocabulary is required to build the model, load a dataset first".to_string(),
            )
        })?;
        let model = StsModel::new(
            &vs.root(),
            model_type,
            vocab,
            self.embeddings()?,
            &self.config,
        );
        freeze_layers(vs, &self.config.fix_layers)?;
        Ok(model)
    }

    /// Trains the model on the loaded training set, monitoring the validation set.
    pub fn fit<P: AsRef<Path>>(
        &self,
        model: &StsModel,
        vs: &mut nn::VarStore,
        weights_file: P,
    ) -> Result<TrainingHistory, StsError> {
        let (train, val) = match (&self.train, &self.val) {
            (Some(train), Some(val)) => (&train.inputs, &val.inputs),
            _ => {
                return Err(StsError::InvalidConfigurationError(
                    "Training and validation sets must be loaded before fitting".to_string(),
                ));
            }
        };
        Trainer::new(&self.config).fit(model, vs, train, val, weights_file.as_ref())
    }

    /// Class probabilities for a set
    pub fn predict(&self, model: &StsModel, inputs: &StsInputs) -> Tensor {
        predict(model, inputs, self.config.predict_batch_size)
    }

    /// Evaluates a set against its gold scores.
    pub fn eval_set(
        &self,
        model: &StsModel,
        inputs: &StsInputs,
        name: &str,
    ) -> Result<StsResult, StsError> {
        eval_sts(&self.predict(model, inputs), &inputs.scores, name)
    }

    /// Evaluates the model on the loaded training, validation and test sets.
    pub fn eval(&self, model: &StsModel) -> Result<StsResults, StsError> {
        let eval_loaded = |set: &Option<LoadedSet>| -> Result<Option<StsResult>, StsError> {
            set.as_ref()
                .map(|set| {
                    self.eval_set(model, &set.inputs, &set.path.display().to_string())
                })
                .transpose()
        };
        let missing =
            |name: &str| StsError::InvalidConfigurationError(format!("No {} set loaded", name));
        Ok(StsResults {
            train: eval_loaded(&self.train)?.ok_or_else(|| missing("training"))?,
            val: eval_loaded(&self.val)?.ok_or_else(|| missing("validation"))?,
            test: eval_loaded(&self.test)?,
        })
    }

    /// README-format markdown table row piece with the train, val and test Pearson.
    pub fn res_columns(&self, results: &StsResults, pfx: &str) -> String {
        format!(
            "{pfx}{:.6} |{pfx}{:.6} |{pfx}{:.6}",
            results.train.pearson,
            results.val.pearson,
            results.test.map(|r| r.pearson).unwrap_or(f64::NAN),
            pfx = pfx
        )
    }
}

impl Default for StsTask {
    fn default() -> Self {
        StsTask::new(Device::cuda_if_available())
    }
}

/// Excludes from training every variable whose name starts with one of `prefixes`.
///
/// Prefixes may use either `/` or `.` as separator (`emb` or `encoder/proj`).
pub fn freeze_layers(vs: &nn::VarStore, prefixes: &[String]) -> Result<(), StsError> {
    if prefixes.is_empty() {
        return Ok(());
    }
    let variables = vs.variables();
    for prefix in prefixes {
        let prefix = prefix.replace('/', ".");
        let mut matched = false;
        for (name, variable) in variables.iter() {
            if name == &prefix || name.starts_with(&format!("{}.", prefix)) {
                let _ = variable.set_requires_grad(false);
                matched = true;
            }
        }
        if !matched {
            return Err(StsError::InvalidConfigurationError(format!(
                "fix_layers entry {:?} does not match any model variable",
                prefix
            )));
        }
        tracing::debug!("Froze variables under {}", prefix);
    }
    Ok(())
}
