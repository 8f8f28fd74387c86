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

//! # Evaluation of similarity predictions
//!
//! Correlation metrics between predicted and gold scores, and the aggregation
//! of results over multiple training runs.

use crate::data::sts_categorical2labels;
use crate::StsError;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use tch::{Device, Kind, Tensor};

/// Pearson correlation coefficient. `NaN` for fewer than two points or constant inputs.
pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len().min(y.len());
    if n < 2 {
        return f64::NAN;
    }
    let mean_x = x[..n].iter().sum::<f64>() / n as f64;
    let mean_y = y[..n].iter().sum::<f64>() / n as f64;
    let (mut covariance, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (a, b) in x[..n].iter().zip(y[..n].iter()) {
        let (dx, dy) = (a - mean_x, b - mean_y);
        covariance += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    if var_x == 0.0 || var_y == 0.0 {
        return f64::NAN;
    }
    covariance / (var_x.sqrt() * var_y.sqrt())
}

/// Ranks starting at 1, tied values sharing their average rank.
pub fn ranks(values: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by_key(|&i| OrderedFloat(values[i]));
    let mut ranks = vec![0.0; values.len()];
    let mut start = 0;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len()
            && OrderedFloat(values[order[end]]) == OrderedFloat(values[order[start]])
        {
            end += 1;
        }
        let average_rank = (start + end + 1) as f64 / 2.0;
        for &index in &order[start..end] {
            ranks[index] = average_rank;
        }
        start = end;
    }
    ranks
}

/// Spearman rank correlation coefficient.
pub fn spearman(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len().min(y.len());
    pearson(&ranks(&x[..n]), &ranks(&y[..n]))
}

/// Mean squared error.
pub fn mse(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len().min(y.len());
    if n == 0 {
        return f64::NAN;
    }
    x.iter()
        .zip(y.iter())
        .map(|(a, b)| (a - b) * (a - b))
        .sum::<f64>()
        / n as f64
}

/// Metrics of one set
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct StsResult {
    #[serde(rename = "Pearson")]
    pub pearson: f64,
    #[serde(rename = "Spearman")]
    pub spearman: f64,
    #[serde(rename = "MSE")]
    pub mse: f64,
}

/// Evaluates class probabilities `[n, NUM_CLASSES]` against gold scores.
///
/// Predicted scores are the expected class values. The metrics are logged
/// under `name`.
pub fn eval_sts(probabilities: &Tensor, gold: &[f64], name: &str) -> Result<StsResult, StsError> {
    let predicted = Vec::<f64>::from(
        &sts_categorical2labels(probabilities)
            .to_kind(Kind::Double)
            .to(Device::Cpu),
    );
    if predicted.len() != gold.len() {
        return Err(StsError::ValueError(format!(
            "Got {} predictions for {} gold scores",
            predicted.len(),
            gold.len()
        )));
    }
    let result = StsResult {
        pearson: pearson(&predicted, gold),
        spearman: spearman(&predicted, gold),
        mse: mse(&predicted, gold),
    };
    tracing::info!(
        "{} Pearson: {:.6} Spearman: {:.6} MSE: {:.6}",
        name,
        result.pearson,
        result.spearman,
        result.mse
    );
    Ok(result)
}

/// Two-sided 95% Student t quantiles for 1 to 30 degrees of freedom.
const T_975: [f64; 30] = [
    12.706, 4.303, 3.182, 2.776, 2.571, 2.447, 2.365, 2.306, 2.262, 2.228, 2.201, 2.179, 2.160,
    2.145, 2.131, 2.120, 2.110, 2.101, 2.093, 2.086, 2.080, 2.074, 2.069, 2.064, 2.060, 2.056,
    2.052, 2.048, 2.045, 2.042,
];

/// Mean of a metric over several runs, with the half-width of its 95% confidence interval.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RunSummary {
    pub mean: f64,
    pub ci95: f64,
    pub runs: usize,
}

impl RunSummary {
    /// Summarizes the values, ignoring `NaN` entries. The interval is `0` for a single run.
    pub fn new(values: &[f64]) -> RunSummary {
        let values: Vec<f64> = values.iter().cloned().filter(|v| !v.is_nan()).collect();
        let runs = values.len();
        if runs == 0 {
            return RunSummary {
                mean: f64::NAN,
                ci95: f64::NAN,
                runs,
            };
        }
        let mean = values.iter().sum::<f64>() / runs as f64;
        if runs == 1 {
            return RunSummary {
                mean,
                ci95: 0.0,
                runs,
            };
        }
        let variance =
            values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / (runs - 1) as f64;
        let quantile = T_975.get(runs - 2).cloned().unwrap_or(1.96);
        RunSummary {
            mean,
            ci95: quantile * variance.sqrt() / (runs as f64).sqrt(),
            runs,
        }
    }
}

impl std::fmt::Display for RunSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:.6} ±{:.6}", self.mean, self.ci95)
    }
}
