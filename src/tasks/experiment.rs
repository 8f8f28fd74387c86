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

//! # Repeated training runs
//!
//! Trains a model several times (`nb_runs`) on the data loaded in a task, saving
//! the artifacts of every run under a unique run id and reporting the results as
//! README markdown rows.

use crate::eval::RunSummary;
use crate::models::ModelType;
use crate::tasks::{StsConfig, StsResults, StsTask};
use crate::training::TrainingHistory;
use crate::{Config, StsError};
use std::fs;
use std::path::{Path, PathBuf};
use tch::nn;

/// Builds the configuration of an experiment: defaults, then the task and model
/// defaults, then the `key=value` overrides in order.
pub fn experiment_config<S: AsRef<str>>(
    task: &StsTask,
    model_type: ModelType,
    overrides: &[S],
) -> Result<StsConfig, StsError> {
    let mut config = StsConfig::default();
    task.config(&mut config);
    model_type.config(&mut config);
    for assignment in overrides {
        config.apply_override(assignment.as_ref())?;
    }
    config.validate()?;
    Ok(config)
}

/// Outcome and artifacts of a single training run
#[derive(Debug)]
pub struct RunReport {
    pub runid: String,
    pub results: StsResults,
    pub history: TrainingHistory,
    pub weights_file: PathBuf,
    pub config_file: PathBuf,
    pub metrics_file: PathBuf,
}

fn new_runid(model_type: ModelType) -> String {
    let uuid = uuid::Uuid::new_v4().to_simple().to_string();
    format!("{}-{}", model_type, &uuid[..16])
}

/// Vocabulary file written by [`train_runs`]
pub fn vocab_file(output_dir: &Path, model_type: ModelType) -> PathBuf {
    output_dir.join(format!("vocab-{}.json", model_type))
}

/// Trains `nb_runs` models on the data loaded in `task`.
///
/// The vocabulary is saved once as `vocab-<model>.json`; every run writes
/// `config-<runid>.json`, `weights-<runid>-bestval.ot` and `metrics-<runid>.csv`
/// to `output_dir`, which is created if needed.
pub fn train_runs(
    task: &StsTask,
    model_type: ModelType,
    output_dir: &Path,
) -> Result<Vec<RunReport>, StsError> {
    let config = task.get_config();
    fs::create_dir_all(output_dir)?;
    if let Some(vocab) = task.vocabulary() {
        vocab.to_file(vocab_file(output_dir, model_type))?;
    }

    let mut reports = Vec::with_capacity(config.nb_runs);
    for run in 0..config.nb_runs {
        let runid = new_runid(model_type);
        tracing::info!("Run {}/{}: {}", run + 1, config.nb_runs, runid);
        let config_file = output_dir.join(format!("config-{}.json", runid));
        config.to_file(&config_file)?;

        let mut vs = nn::VarStore::new(task.device());
        let model = task.build_model(&vs, model_type)?;
        let weights_file = output_dir.join(format!("weights-{}-bestval.ot", runid));
        let history = task.fit(&model, &mut vs, &weights_file)?;
        let metrics_file = output_dir.join(format!("metrics-{}.csv", runid));
        history.to_csv(&metrics_file)?;

        reports.push(RunReport {
            runid,
            results: task.eval(&model)?,
            history,
            weights_file,
            config_file,
            metrics_file,
        });
    }
    Ok(reports)
}

/// `| <runid> | train | val | test |` row of a run.
pub fn report_row(task: &StsTask, report: &RunReport) -> String {
    format!(
        "| {} |{} |",
        report.runid,
        task.res_columns(&report.results, " ")
    )
}

/// Mean and 95% confidence interval of the Pearson correlations over the runs,
/// `None` for a single run.
pub fn summary_row(model_type: ModelType, reports: &[RunReport]) -> Option<String> {
    if reports.len() < 2 {
        return None;
    }
    let collect = |f: &dyn Fn(&StsResults) -> f64| -> Vec<f64> {
        reports.iter().map(|report| f(&report.results)).collect()
    };
    let train = collect(&|r| r.train.pearson);
    let val = collect(&|r| r.val.pearson);
    let test = collect(&|r| r.test.map(|t| t.pearson).unwrap_or(f64::NAN));
    Some(format!(
        "| {} | {} | {} | {} |",
        model_type,
        RunSummary::new(&train),
        RunSummary::new(&val),
        RunSummary::new(&test)
    ))
}
