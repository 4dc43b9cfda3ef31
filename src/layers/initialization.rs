use ndarray::{Array1, Array2};
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;
use rand::Rng;
use serde::{Serialize, Deserialize};

/// Weight initialization strategies
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub enum WeightInit {
    /// He/Kaiming uniform initialization: `U(-sqrt(6 / fan_in), sqrt(6 / fan_in))`
    #[default]
    HeUniform,

    /// All zeros
    Zeros,
}

impl WeightInit {
    /// Initialize a `(fan_in, fan_out)` weight matrix
    pub fn initialize_weights<R: Rng + ?Sized>(&self, shape: (usize, usize), rng: &mut R) -> Array2<f64> {
        let (fan_in, _fan_out) = shape;

        match self {
            WeightInit::HeUniform => {
                let limit = (6.0 / fan_in as f64).sqrt();
                Array2::random_using(shape, Uniform::new_inclusive(-limit, limit), rng)
            }
            WeightInit::Zeros => Array2::zeros(shape),
        }
    }

    /// Biases always start at zero
    pub fn initialize_biases(&self, size: usize) -> Array1<f64> {
        Array1::zeros(size)
    }
}
