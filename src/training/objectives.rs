use crate::data::sts_categorical2labels;
use serde::{Deserialize, Serialize};
use tch::{Kind, Tensor};

#[allow(non_camel_case_types)]
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
/// # Training objective
pub enum Loss {
    /// Negative Pearson correlation of the expected class values
    #[serde(alias = "pearsonobj")]
    pearson,
    /// Cross-entropy against the sparse target distributions
    categorical_crossentropy,
    /// Mean squared error between probabilities and target distributions
    mse,
}

impl Loss {
    /// Computes the batch loss from logits `[batch, NUM_CLASSES]` and target distributions.
    pub fn compute(&self, logits: &Tensor, targets: &Tensor) -> Tensor {
        match self {
            Loss::pearson => pearson_loss(&logits.softmax(-1, Kind::Float), targets),
            Loss::categorical_crossentropy => {
                -(targets * logits.log_softmax(-1, Kind::Float))
                    .sum_dim_intlist(&[1], false, Kind::Float)
                    .mean(Kind::Float)
            }
            Loss::mse => {
                let difference = logits.softmax(-1, Kind::Float) - targets;
                (&difference * &difference).mean(Kind::Float)
            }
        }
    }
}

/// Negative Pearson correlation between the expected class values of the
/// predicted and target distributions.
pub fn pearson_loss(probabilities: &Tensor, targets: &Tensor) -> Tensor {
    let x = sts_categorical2labels(probabilities);
    let y = sts_categorical2labels(targets);
    let xm = &x - x.mean(Kind::Float);
    let ym = &y - y.mean(Kind::Float);
    let numerator = (&xm * &ym).sum(Kind::Float);
    let denominator = (&xm * &xm).sum(Kind::Float).sqrt() * (&ym * &ym).sum(Kind::Float).sqrt();
    -(numerator / (denominator + 1e-8))
}
