use crate::StsError;
use serde::{Deserialize, Serialize};
use tch::nn::{self, OptimizerConfig};
use tch::Tensor;

#[allow(non_camel_case_types)]
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
/// # Optimization algorithm
pub enum OptimizerType {
    adam,
    sgd,
    rmsprop,
}

/// # Abstraction that holds one particular optimizer over a variable store
pub enum OptimizerOption {
    Adam(nn::Optimizer<nn::Adam>),
    Sgd(nn::Optimizer<nn::Sgd>),
    RmsProp(nn::Optimizer<nn::RmsProp>),
}

impl OptimizerOption {
    /// Creates an optimizer over all trainable variables of `vs`.
    pub fn new(
        optimizer_type: OptimizerType,
        vs: &nn::VarStore,
        learning_rate: f64,
    ) -> Result<OptimizerOption, StsError> {
        Ok(match optimizer_type {
            OptimizerType::adam => OptimizerOption::Adam(nn::Adam::default().build(vs, learning_rate)?),
            OptimizerType::sgd => OptimizerOption::Sgd(nn::Sgd::default().build(vs, learning_rate)?),
            OptimizerType::rmsprop => {
                OptimizerOption::RmsProp(nn::RmsProp::default().build(vs, learning_rate)?)
            }
        })
    }

    /// Zeroes the gradients, backpropagates `loss` and updates the variables.
    pub fn backward_step(&mut self, loss: &Tensor) {
        match self {
            Self::Adam(optimizer) => optimizer.backward_step(loss),
            Self::Sgd(optimizer) => optimizer.backward_step(loss),
            Self::RmsProp(optimizer) => optimizer.backward_step(loss),
        }
    }
}
