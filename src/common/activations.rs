use serde::{Deserialize, Serialize};
use tch::{Kind, Tensor};

#[allow(non_camel_case_types)]
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
/// # Activation function used in the dense layers of the models
pub enum Activation {
    /// Identity
    linear,
    /// Rectified linear unit
    relu,
    /// Hyperbolic tangent
    tanh,
    /// Logistic sigmoid
    sigmoid,
    /// Softmax over the last dimension
    softmax,
}

pub struct TensorFunction(Box<fn(&Tensor) -> Tensor>);

impl TensorFunction {
    pub fn new(fun: Box<fn(&Tensor) -> Tensor>) -> Self {
        Self(fun)
    }

    pub fn get_fn(&self) -> &fn(&Tensor) -> Tensor {
        &self.0
    }
}

impl std::fmt::Debug for TensorFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "TensorFunction")
    }
}

fn _linear(x: &Tensor) -> Tensor {
    x.shallow_clone()
}

fn _relu(x: &Tensor) -> Tensor {
    x.relu()
}

fn _tanh(x: &Tensor) -> Tensor {
    x.tanh()
}

fn _sigmoid(x: &Tensor) -> Tensor {
    x.sigmoid()
}

fn _softmax(x: &Tensor) -> Tensor {
    x.softmax(-1, Kind::Float)
}

impl Activation {
    pub fn get_function(&self) -> TensorFunction {
        TensorFunction::new(Box::new(match self {
            Activation::linear => _linear,
            Activation::relu => _relu,
            Activation::tanh => _tanh,
            Activation::sigmoid => _sigmoid,
            Activation::softmax => _softmax,
        }))
    }
}
