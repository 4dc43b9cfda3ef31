use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis, Zip};
use rand::Rng;
use serde::{Serialize, Deserialize};
use std::fs;
use std::path::Path;

use crate::activations::Activation;
use crate::error::{Result, TdqnError};
use crate::layers::{DenseLayer, WeightInit};
use crate::loss::{Loss, MSE};
use crate::optimizer::{Optimizer, OptimizerWrapper, RMSProp, SGD};

/// Weights and biases of one dense layer.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct LayerParameters {
    pub weights: Array2<f64>,
    pub biases: Array1<f64>,
}

/// An owned snapshot of every tensor of a network, in layer order.
///
/// Target networks are kept in sync with the online network by copying or
/// blending these snapshots; a snapshot never aliases the network it came from.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Parameters {
    pub layers: Vec<LayerParameters>,
}

impl Parameters {
    /// Polyak averaging: `self = self * (1 - tau) + online * tau`, elementwise.
    pub fn blend_toward(&mut self, online: &Parameters, tau: f64) -> Result<()> {
        self.check_compatible(online)?;
        for (target, source) in self.layers.iter_mut().zip(&online.layers) {
            Zip::from(&mut target.weights)
                .and(&source.weights)
                .for_each(|t, &o| *t = *t * (1.0 - tau) + o * tau);
            Zip::from(&mut target.biases)
                .and(&source.biases)
                .for_each(|t, &o| *t = *t * (1.0 - tau) + o * tau);
        }
        Ok(())
    }

    pub fn shapes(&self) -> Vec<((usize, usize), usize)> {
        self.layers
            .iter()
            .map(|l| (l.weights.dim(), l.biases.len()))
            .collect()
    }

    fn check_compatible(&self, other: &Parameters) -> Result<()> {
        if self.shapes() != other.shapes() {
            return Err(TdqnError::dimension_mismatch(
                format!("{:?}", self.shapes()),
                format!("{:?}", other.shapes()),
            ));
        }
        Ok(())
    }
}

/// A feed-forward network of dense layers with its optimizer.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct NeuralNetwork {
    pub layers: Vec<DenseLayer>,
    pub optimizer: OptimizerWrapper,
}

impl NeuralNetwork {
    /// Create a network with the given layer sizes and activations. Weights use
    /// `init`, the optimizer starts with plain SGD; see [`NeuralNetwork::with_rmsprop`].
    pub fn new<R: Rng + ?Sized>(
        layer_sizes: &[usize],
        activations: &[Activation],
        init: WeightInit,
        rng: &mut R,
    ) -> Result<Self> {
        if layer_sizes.len() < 2 {
            return Err(TdqnError::invalid_parameter(
                "layer_sizes",
                "Network must have at least input and output layers",
            ));
        }
        if layer_sizes.len() - 1 != activations.len() {
            return Err(TdqnError::invalid_parameter(
                "activations".to_string(),
                format!("expected {} activations, got {}", layer_sizes.len() - 1, activations.len()),
            ));
        }
        if layer_sizes.iter().any(|&size| size == 0) {
            return Err(TdqnError::invalid_parameter("layer_sizes", "Layer sizes must be positive"));
        }

        let layers = layer_sizes
            .windows(2)
            .zip(activations.iter())
            .map(|(window, &activation)| DenseLayer::new(window[0], window[1], activation, init, rng))
            .collect::<Vec<_>>();

        Ok(NeuralNetwork {
            layers,
            optimizer: OptimizerWrapper::SGD(SGD::new()),
        })
    }

    /// Q-network layout: ReLU hidden layers, linear output, He-uniform everywhere.
    pub fn q_network<R: Rng + ?Sized>(
        state_size: usize,
        hidden: &[usize],
        action_size: usize,
        rng: &mut R,
    ) -> Result<Self> {
        let mut layer_sizes = Vec::with_capacity(hidden.len() + 2);
        layer_sizes.push(state_size);
        layer_sizes.extend_from_slice(hidden);
        layer_sizes.push(action_size);

        let mut activations = vec![Activation::Relu; hidden.len()];
        activations.push(Activation::Linear);

        Self::new(&layer_sizes, &activations, WeightInit::HeUniform, rng)
    }

    /// Replace the optimizer with RMSProp sized for this network's layers.
    pub fn with_rmsprop(mut self, rho: f64, epsilon: f64) -> Self {
        self.optimizer = OptimizerWrapper::RMSProp(RMSProp::new(&self.layers, rho, epsilon));
        self
    }

    pub fn input_size(&self) -> usize {
        self.layers.first().map_or(0, DenseLayer::input_size)
    }

    pub fn output_size(&self) -> usize {
        self.layers.last().map_or(0, DenseLayer::output_size)
    }

    /// Forward pass for a batch of input vectors.
    pub fn predict(&self, inputs: ArrayView2<f64>) -> Result<Array2<f64>> {
        if inputs.ncols() != self.input_size() {
            return Err(TdqnError::dimension_mismatch(
                format!("[batch, {}]", self.input_size()),
                format!("{:?}", inputs.shape()),
            ));
        }
        let mut current = inputs.to_owned();
        for layer in &self.layers {
            current = layer.forward_batch(current.view());
        }
        Ok(current)
    }

    /// Forward pass for a single input vector.
    pub fn predict_one(&self, input: ArrayView1<f64>) -> Result<Array1<f64>> {
        let output = self.predict(input.insert_axis(Axis(0)))?;
        Ok(output.index_axis_move(Axis(0), 0))
    }

    fn forward_cached(&mut self, inputs: ArrayView2<f64>) -> Array2<f64> {
        let mut current = inputs.to_owned();
        for layer in &mut self.layers {
            current = layer.forward_batch_cached(current.view());
        }
        current
    }

    fn backward(&self, output_errors: ArrayView2<f64>) -> Result<Vec<(Array2<f64>, Array1<f64>)>> {
        let mut gradients = Vec::with_capacity(self.layers.len());
        let mut current_error = output_errors.to_owned();

        for (i, layer) in self.layers.iter().enumerate().rev() {
            let (adjusted_error, weight_gradients, bias_gradients) = layer.backward_batch(current_error.view())?;
            gradients.push((weight_gradients, bias_gradients));
            if i != 0 {
                current_error = adjusted_error.dot(&layer.weights.t());
            }
        }

        gradients.reverse();
        Ok(gradients)
    }

    /// One gradient step of mean-squared-error regression over the whole batch.
    /// Returns the loss measured before the step.
    pub fn train_minibatch(
        &mut self,
        inputs: ArrayView2<f64>,
        targets: ArrayView2<f64>,
        learning_rate: f64,
    ) -> Result<f64> {
        if inputs.nrows() == 0 {
            return Err(TdqnError::EmptyBuffer("No samples to train on".to_string()));
        }
        if inputs.nrows() != targets.nrows() || targets.ncols() != self.output_size() {
            return Err(TdqnError::dimension_mismatch(
                format!("[{}, {}]", inputs.nrows(), self.output_size()),
                format!("{:?}", targets.shape()),
            ));
        }
        if inputs.ncols() != self.input_size() {
            return Err(TdqnError::dimension_mismatch(
                format!("[batch, {}]", self.input_size()),
                format!("{:?}", inputs.shape()),
            ));
        }

        let outputs = self.forward_cached(inputs);
        let loss = MSE.compute_batch(outputs.view(), targets);
        if !loss.is_finite() {
            return Err(TdqnError::NumericalError(format!("non-finite loss {}", loss)));
        }
        let output_errors = MSE.gradient_batch(outputs.view(), targets);
        let gradients = self.backward(output_errors.view())?;

        for (idx, (layer, (weight_gradients, bias_gradients))) in self.layers.iter_mut().zip(gradients).enumerate() {
            self.optimizer.update_weights(idx, &mut layer.weights, &weight_gradients, learning_rate)?;
            self.optimizer.update_biases(idx, &mut layer.biases, &bias_gradients, learning_rate)?;
            layer.clear_cache();
        }

        Ok(loss)
    }

    /// Snapshot every weight and bias tensor.
    pub fn parameters(&self) -> Parameters {
        Parameters {
            layers: self
                .layers
                .iter()
                .map(|layer| LayerParameters {
                    weights: layer.weights.clone(),
                    biases: layer.biases.clone(),
                })
                .collect(),
        }
    }

    /// Overwrite every tensor with the snapshot. Shapes must match exactly.
    pub fn set_parameters(&mut self, parameters: &Parameters) -> Result<()> {
        self.parameters().check_compatible(parameters)?;
        for (layer, source) in self.layers.iter_mut().zip(&parameters.layers) {
            layer.weights.assign(&source.weights);
            layer.biases.assign(&source.biases);
        }
        Ok(())
    }

    /// Serialize the network, including its optimizer state, to `path`.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let serialized = bincode::serialize(self)?;
        fs::write(path, serialized)?;
        Ok(())
    }

    /// Load a network previously written by [`NeuralNetwork::save`].
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = fs::read(path)?;
        let network: Self = bincode::deserialize(&data)?;
        Ok(network)
    }
}
