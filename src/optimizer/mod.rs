use ndarray::{Array1, Array2};
use serde::{Serialize, Deserialize};

use crate::error::{Result, TdqnError};
use crate::layers::DenseLayer;

/// Per-layer parameter update rule. `layer` indexes the network's layer list so
/// stateful optimizers keep one accumulator per tensor.
pub trait Optimizer {
    fn update_weights(&mut self, layer: usize, weights: &mut Array2<f64>, gradients: &Array2<f64>, learning_rate: f64) -> Result<()>;
    fn update_biases(&mut self, layer: usize, biases: &mut Array1<f64>, gradients: &Array1<f64>, learning_rate: f64) -> Result<()>;
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub enum OptimizerWrapper {
    SGD(SGD),
    RMSProp(RMSProp),
}

impl Optimizer for OptimizerWrapper {
    fn update_weights(&mut self, layer: usize, weights: &mut Array2<f64>, gradients: &Array2<f64>, learning_rate: f64) -> Result<()> {
        match self {
            OptimizerWrapper::SGD(optimizer) => optimizer.update_weights(layer, weights, gradients, learning_rate),
            OptimizerWrapper::RMSProp(optimizer) => optimizer.update_weights(layer, weights, gradients, learning_rate),
        }
    }

    fn update_biases(&mut self, layer: usize, biases: &mut Array1<f64>, gradients: &Array1<f64>, learning_rate: f64) -> Result<()> {
        match self {
            OptimizerWrapper::SGD(optimizer) => optimizer.update_biases(layer, biases, gradients, learning_rate),
            OptimizerWrapper::RMSProp(optimizer) => optimizer.update_biases(layer, biases, gradients, learning_rate),
        }
    }
}

fn check_shape(expected: &[usize], actual: &[usize]) -> Result<()> {
    if expected != actual {
        return Err(TdqnError::dimension_mismatch(format!("{:?}", expected), format!("{:?}", actual)));
    }
    Ok(())
}

/// Plain gradient descent. Stateless, so it is also what never-trained target
/// networks carry.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct SGD;

impl SGD {
    pub fn new() -> SGD {
        SGD
    }
}

impl Optimizer for SGD {
    fn update_weights(&mut self, _layer: usize, weights: &mut Array2<f64>, gradients: &Array2<f64>, learning_rate: f64) -> Result<()> {
        check_shape(weights.shape(), gradients.shape())?;
        weights.zip_mut_with(gradients, |w, &g| *w -= learning_rate * g);
        Ok(())
    }

    fn update_biases(&mut self, _layer: usize, biases: &mut Array1<f64>, gradients: &Array1<f64>, learning_rate: f64) -> Result<()> {
        check_shape(biases.shape(), gradients.shape())?;
        biases.zip_mut_with(gradients, |b, &g| *b -= learning_rate * g);
        Ok(())
    }
}

/// RMSProp optimizer.
///
/// Keeps an exponential moving average of squared gradients per tensor and
/// scales each step by it:
///
/// ```text
/// v     <- rho * v + (1 - rho) * g^2
/// theta <- theta - lr * g / sqrt(v + epsilon)
/// ```
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct RMSProp {
    pub rho: f64,
    pub epsilon: f64,
    v_weights: Vec<Array2<f64>>,
    v_biases: Vec<Array1<f64>>,
}

impl RMSProp {
    pub fn new(layers: &[DenseLayer], rho: f64, epsilon: f64) -> Self {
        let v_weights = layers
            .iter()
            .map(|layer| Array2::<f64>::zeros(layer.weights.dim()))
            .collect();
        let v_biases = layers
            .iter()
            .map(|layer| Array1::<f64>::zeros(layer.biases.dim()))
            .collect();

        RMSProp {
            rho,
            epsilon,
            v_weights,
            v_biases,
        }
    }

    fn missing_layer(layer: usize, count: usize) -> TdqnError {
        TdqnError::invalid_parameter(
            "layer".to_string(),
            format!("optimizer tracks {} layers, got index {}", count, layer),
        )
    }
}

impl Optimizer for RMSProp {
    fn update_weights(&mut self, layer: usize, weights: &mut Array2<f64>, gradients: &Array2<f64>, learning_rate: f64) -> Result<()> {
        let count = self.v_weights.len();
        let v = self.v_weights.get_mut(layer).ok_or_else(|| Self::missing_layer(layer, count))?;
        check_shape(v.shape(), gradients.shape())?;
        check_shape(weights.shape(), gradients.shape())?;

        let (rho, eps) = (self.rho, self.epsilon);
        v.zip_mut_with(gradients, |v, &g| *v = rho * *v + (1.0 - rho) * g * g);
        ndarray::Zip::from(weights)
            .and(gradients)
            .and(&*v)
            .for_each(|w, &g, &v| *w -= learning_rate * g / (v + eps).sqrt());
        Ok(())
    }

    fn update_biases(&mut self, layer: usize, biases: &mut Array1<f64>, gradients: &Array1<f64>, learning_rate: f64) -> Result<()> {
        let count = self.v_biases.len();
        let v = self.v_biases.get_mut(layer).ok_or_else(|| Self::missing_layer(layer, count))?;
        check_shape(v.shape(), gradients.shape())?;
        check_shape(biases.shape(), gradients.shape())?;

        let (rho, eps) = (self.rho, self.epsilon);
        v.zip_mut_with(gradients, |v, &g| *v = rho * *v + (1.0 - rho) * g * g);
        ndarray::Zip::from(biases)
            .and(gradients)
            .and(&*v)
            .for_each(|b, &g, &v| *b -= learning_rate * g / (v + eps).sqrt());
        Ok(())
    }
}
