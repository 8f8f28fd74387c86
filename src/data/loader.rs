//! Readers for the sentence pair dataset formats.

use crate::data::nlp::tokenize;
use crate::StsError;
use std::path::Path;
use tch::{Kind, Tensor};

/// Number of discretized similarity classes (scores `0..=5`).
pub const NUM_CLASSES: i64 = 6;

/// Gold label assigned to unlabeled pairs when they are kept.
pub const UNLABELED: f64 = -1.0;

/// # Sentence pair dataset
///
/// Parallel sequences of tokenized sentences and their gold similarity scores.
#[derive(Debug, Clone, Default)]
pub struct StsDataset {
    /// First sentence of each pair
    pub s0: Vec<Vec<String>>,
    /// Second sentence of each pair
    pub s1: Vec<Vec<String>>,
    /// Gold similarity score of each pair
    pub labels: Vec<f64>,
}

impl StsDataset {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    fn push(&mut self, s0: &str, s1: &str, label: f64) {
        self.s0.push(tokenize(s0));
        self.s1.push(tokenize(s1));
        self.labels.push(label);
    }
}

fn reader_builder() -> csv::ReaderBuilder {
    let mut builder = csv::ReaderBuilder::new();
    builder.delimiter(b'\t').quoting(false).flexible(true);
    builder
}

fn record_line(record: &csv::StringRecord) -> u64 {
    record.position().map(|p| p.line()).unwrap_or(0)
}

fn parse_score(value: &str, record: &csv::StringRecord) -> Result<f64, StsError> {
    value.trim().parse::<f64>().map_err(|e| {
        StsError::DatasetError(format!(
            "Invalid score {:?} on line {}: {}",
            value,
            record_line(record),
            e
        ))
    })
}

/// Loads a SemEval STS file of `score \t s0 \t s1` lines.
///
/// Pairs with an empty score are dropped when `skip_unlabeled` is set and
/// labelled [`UNLABELED`] otherwise.
pub fn load_sts<P: AsRef<Path>>(path: P, skip_unlabeled: bool) -> Result<StsDataset, StsError> {
    let mut reader = reader_builder().has_headers(false).from_path(path)?;
    let mut dataset = StsDataset::default();
    for record in reader.records() {
        let record = record?;
        if record.len() == 1 && record[0].trim().is_empty() {
            continue;
        }
        if record.len() != 3 {
            return Err(StsError::DatasetError(format!(
                "Expected 3 tab-separated fields on line {}, got {}",
                record_line(&record),
                record.len()
            )));
        }
        let label = if record[0].trim().is_empty() {
            if skip_unlabeled {
                continue;
            }
            UNLABELED
        } else {
            parse_score(&record[0], &record)?
        };
        dataset.push(&record[1], &record[2], label);
    }
    Ok(dataset)
}

/// Loads the SICK 2014 dataset, using the relatedness score as the label.
///
/// The file starts with a header row
/// (`pair_ID sentence_A sentence_B relatedness_score entailment_judgment`).
pub fn load_sick2014<P: AsRef<Path>>(path: P) -> Result<StsDataset, StsError> {
    let mut reader = reader_builder().has_headers(true).from_path(path)?;
    let mut dataset = StsDataset::default();
    for record in reader.records() {
        let record = record?;
        if record.len() < 4 {
            return Err(StsError::DatasetError(format!(
                "Expected at least 4 tab-separated fields on line {}, got {}",
                record_line(&record),
                record.len()
            )));
        }
        let label = parse_score(&record[3], &record)?;
        dataset.push(&record[1], &record[2], label);
    }
    Ok(dataset)
}

/// Loads a dataset file, picking the reader from the file name.
pub fn load_set<P: AsRef<Path>>(path: P, skip_unlabeled: bool) -> Result<StsDataset, StsError> {
    let is_sick = path
        .as_ref()
        .to_string_lossy()
        .to_lowercase()
        .contains("sick2014");
    if is_sick {
        load_sick2014(path)
    } else {
        load_sts(path, skip_unlabeled)
    }
}

/// Converts gold scores to sparse target distributions over [`NUM_CLASSES`] classes.
///
/// A score `y` puts `floor(y) - y + 1` on class `floor(y)` and `y - floor(y)` on
/// class `floor(y) + 1`, so that the expected class value equals `y`. Scores are
/// clamped to the class range first.
pub fn sts_labels2categorical(labels: &[f64], nclass: i64) -> Tensor {
    let mut targets = vec![0f32; labels.len() * nclass as usize];
    for (row, label) in labels.iter().enumerate() {
        let y = label.max(0.0).min((nclass - 1) as f64);
        let floor = y.floor();
        let offset = row * nclass as usize;
        if (floor as i64) + 1 < nclass {
            targets[offset + floor as usize + 1] = (y - floor) as f32;
        }
        targets[offset + floor as usize] = (floor - y + 1.0) as f32;
    }
    Tensor::of_slice(&targets)
        .to_kind(Kind::Float)
        .view(&[labels.len() as i64, nclass][..])
}

/// Expected class value `sum_i p_i * i` of each row of a `[n, nclass]` distribution.
pub fn sts_categorical2labels(probabilities: &Tensor) -> Tensor {
    let nclass = probabilities.size()[1];
    let classes = Tensor::arange(nclass, (Kind::Float, probabilities.device()));
    probabilities.to_kind(Kind::Float).matmul(&classes)
}
