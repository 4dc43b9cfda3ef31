use ndarray::{Array1, Array2, ArrayView2, Axis};
use rand::Rng;
use serde::{Serialize, Deserialize};

use crate::activations::Activation;
use crate::error::{Result, TdqnError};
use super::initialization::WeightInit;

/// A fully connected (dense) layer in a neural network
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct DenseLayer {
    pub weights: Array2<f64>,
    pub biases: Array1<f64>,
    pub activation: Activation,
    #[serde(skip)]
    pre_activation_output: Option<Array2<f64>>,
    #[serde(skip)]
    inputs: Option<Array2<f64>>,
}

impl DenseLayer {
    /// Create a new dense layer with the given input size, output size, activation
    /// function and weight initialization. Biases start at zero.
    pub fn new<R: Rng + ?Sized>(
        input_size: usize,
        output_size: usize,
        activation: Activation,
        init: WeightInit,
        rng: &mut R,
    ) -> Self {
        DenseLayer {
            weights: init.initialize_weights((input_size, output_size), rng),
            biases: init.initialize_biases(output_size),
            activation,
            pre_activation_output: None,
            inputs: None,
        }
    }

    pub fn with_weights(mut self, weights: Array2<f64>) -> Result<Self> {
        if weights.dim() != self.weights.dim() {
            return Err(TdqnError::dimension_mismatch(
                format!("{:?}", self.weights.dim()),
                format!("{:?}", weights.dim()),
            ));
        }
        self.weights = weights;
        Ok(self)
    }

    pub fn with_biases(mut self, biases: Array1<f64>) -> Result<Self> {
        if biases.len() != self.biases.len() {
            return Err(TdqnError::dimension_mismatch(self.biases.len().to_string(), biases.len().to_string()));
        }
        self.biases = biases;
        Ok(self)
    }

    pub fn input_size(&self) -> usize {
        self.weights.shape()[0]
    }

    pub fn output_size(&self) -> usize {
        self.weights.shape()[1]
    }

    /// Forward pass without touching the backprop caches.
    pub fn forward_batch(&self, inputs: ArrayView2<f64>) -> Array2<f64> {
        let mut outputs = inputs.dot(&self.weights) + &self.biases;
        self.activation.apply_batch(&mut outputs);
        outputs
    }

    /// Forward pass that stores inputs and pre-activations for `backward_batch`.
    pub fn forward_batch_cached(&mut self, inputs: ArrayView2<f64>) -> Array2<f64> {
        self.inputs = Some(inputs.to_owned());
        let mut outputs = inputs.dot(&self.weights) + &self.biases;
        self.pre_activation_output = Some(outputs.clone());
        self.activation.apply_batch(&mut outputs);
        outputs
    }

    /// Returns `(adjusted_error, weight_gradients, bias_gradients)` for a batch of
    /// errors with respect to this layer's outputs.
    pub fn backward_batch(&self, output_errors: ArrayView2<f64>) -> Result<(Array2<f64>, Array2<f64>, Array1<f64>)> {
        let (pre_activation_output, inputs) = match (&self.pre_activation_output, &self.inputs) {
            (Some(pre), Some(inputs)) => (pre, inputs),
            _ => {
                return Err(TdqnError::NumericalError(
                    "forward_batch_cached() must be called before backward_batch()".to_string(),
                ))
            }
        };

        let activation_deriv = self.activation.derivative_batch(pre_activation_output.view());
        let adjusted_error = output_errors.to_owned() * &activation_deriv;
        let weight_gradients = inputs.t().dot(&adjusted_error);
        let bias_gradients = adjusted_error.sum_axis(Axis(0));

        Ok((adjusted_error, weight_gradients, bias_gradients))
    }

    pub(crate) fn clear_cache(&mut self) {
        self.inputs = None;
        self.pre_activation_output = None;
    }
}
