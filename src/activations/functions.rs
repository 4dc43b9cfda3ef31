use ndarray::{Array1, Array2, ArrayView2};
use serde::{Serialize, Deserialize};

/// Activation applied to a dense layer's pre-activation output.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Activation {
    #[default]
    Relu,
    Linear,
}

impl Activation {
    /// Apply the activation function to an input vector in-place.
    pub fn apply(&self, input: &mut Array1<f64>) {
        match self {
            Activation::Relu => input.mapv_inplace(|v| v.max(0.0)),
            Activation::Linear => {}
        }
    }

    /// Apply the activation function to a batch in-place.
    pub fn apply_batch(&self, inputs: &mut Array2<f64>) {
        match self {
            Activation::Relu => inputs.mapv_inplace(|v| v.max(0.0)),
            Activation::Linear => {}
        }
    }

    /// Derivative of the activation evaluated at a batch of pre-activation values.
    pub fn derivative_batch(&self, inputs: ArrayView2<f64>) -> Array2<f64> {
        match self {
            Activation::Relu => inputs.mapv(|v| if v > 0.0 { 1.0 } else { 0.0 }),
            Activation::Linear => Array2::ones(inputs.dim()),
        }
    }
}
