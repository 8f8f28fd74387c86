use crate::data::embeddings::WordEmbeddings;
use crate::data::loader::{sts_labels2categorical, StsDataset, NUM_CLASSES};
use crate::data::nlp::sentence_flags;
use crate::data::vocab::Vocabulary;
use crate::StsError;
use tch::{Device, Kind, Tensor};

/// # Model inputs for a sentence pair set
///
/// Holds every tensor fed to the model for a whole dataset, along with the
/// sparse class targets and raw gold scores used by the objectives and the
/// evaluation.
#[derive(Debug)]
pub struct StsInputs {
    /// Vocabulary indices of the first sentences, `[n, s0pad]`
    pub si0: Tensor,
    /// Fixed pretrained vectors of the first sentences, `[n, s0pad, N]`
    pub se0: Tensor,
    /// Token flags of the first sentences, `[n, s0pad, FLAGS_DIM]`
    pub f0: Tensor,
    /// Token mask of the first sentences, `[n, s0pad]`
    pub m0: Tensor,
    pub si1: Tensor,
    pub se1: Tensor,
    pub f1: Tensor,
    pub m1: Tensor,
    /// Sparse target distributions, `[n, NUM_CLASSES]`
    pub classes: Tensor,
    /// Gold scores
    pub scores: Vec<f64>,
}

impl StsInputs {
    /// Vectorizes a dataset with the given vocabulary and embeddings.
    ///
    /// Fails if `s0`, `s1` and `labels` of the dataset differ in length.
    pub fn new(
        dataset: &StsDataset,
        vocab: &Vocabulary,
        emb: &WordEmbeddings,
        s0pad: usize,
        s1pad: usize,
    ) -> Result<StsInputs, StsError> {
        if dataset.s0.len() != dataset.labels.len() || dataset.s1.len() != dataset.labels.len() {
            return Err(StsError::DatasetError(format!(
                "Sentence pair dataset has {} first sentences, {} second sentences and {} labels",
                dataset.s0.len(),
                dataset.s1.len(),
                dataset.labels.len()
            )));
        }
        let v0 = vocab.vectorize(&dataset.s0, emb, s0pad);
        let v1 = vocab.vectorize(&dataset.s1, emb, s1pad);
        let (f0, f1) = sentence_flags(&dataset.s0, &dataset.s1, s0pad, s1pad);
        Ok(StsInputs {
            si0: v0.ids,
            se0: v0.fixed,
            f0,
            m0: v0.mask,
            si1: v1.ids,
            se1: v1.fixed,
            f1,
            m1: v1.mask,
            classes: sts_labels2categorical(&dataset.labels, NUM_CLASSES),
            scores: dataset.labels.clone(),
        })
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Selects the pairs at `indices`, in that order.
    pub fn select(&self, indices: &[i64]) -> StsInputs {
        let index = Tensor::of_slice(indices).to(self.si0.device());
        let pick = |tensor: &Tensor| tensor.index_select(0, &index);
        StsInputs {
            si0: pick(&self.si0),
            se0: pick(&self.se0),
            f0: pick(&self.f0),
            m0: pick(&self.m0),
            si1: pick(&self.si1),
            se1: pick(&self.se1),
            f1: pick(&self.f1),
            m1: pick(&self.m1),
            classes: pick(&self.classes),
            scores: indices.iter().map(|&i| self.scores[i as usize]).collect(),
        }
    }

    /// Contiguous batch `[start, start + size)`, truncated at the end of the set.
    pub fn batch(&self, start: usize, size: usize) -> StsInputs {
        let end = (start + size).min(self.len());
        let indices: Vec<i64> = (start as i64..end as i64).collect();
        self.select(&indices)
    }

    /// Moves every tensor to `device`.
    pub fn to_device(&self, device: Device) -> StsInputs {
        StsInputs {
            si0: self.si0.to(device),
            se0: self.se0.to(device),
            f0: self.f0.to(device),
            m0: self.m0.to(device),
            si1: self.si1.to(device),
            se1: self.se1.to(device),
            f1: self.f1.to(device),
            m1: self.m1.to(device),
            classes: self.classes.to(device),
            scores: self.scores.clone(),
        }
    }

    /// Gold scores as a float tensor on the inputs' device.
    pub fn score_tensor(&self) -> Tensor {
        Tensor::of_slice(&self.scores)
            .to_kind(Kind::Float)
            .to(self.si0.device())
    }
}
