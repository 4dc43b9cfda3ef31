use ndarray::{Array1, ArrayView1};
use rand::Rng;
use serde::{Serialize, Deserialize};

use crate::error::{Result, TdqnError};

/// Epsilon-greedy action selection with a multiplicative decay that only starts
/// once replay memory holds more than `warmup` transitions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EpsilonGreedy {
    epsilon: f64,
    epsilon_min: f64,
    decay: f64,
    warmup: usize,
}

impl EpsilonGreedy {
    pub fn new(epsilon: f64, epsilon_min: f64, decay: f64, warmup: usize) -> Self {
        EpsilonGreedy {
            epsilon,
            epsilon_min,
            decay,
            warmup,
        }
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn set_epsilon(&mut self, epsilon: f64) {
        self.epsilon = epsilon.clamp(0.0, 1.0);
    }

    /// Pick an action: uniformly random with probability epsilon, otherwise the
    /// argmax of `q_values`, which is only evaluated on the greedy branch.
    pub fn select<R, F>(&self, rng: &mut R, action_count: usize, q_values: F) -> Result<usize>
    where
        R: Rng + ?Sized,
        F: FnOnce() -> Result<Array1<f64>>,
    {
        if action_count == 0 {
            return Err(TdqnError::invalid_parameter("action_count", "must be positive"));
        }
        if rng.gen::<f64>() < self.epsilon {
            return Ok(rng.gen_range(0..action_count));
        }
        let q = q_values()?;
        if q.len() != action_count {
            return Err(TdqnError::dimension_mismatch(action_count.to_string(), q.len().to_string()));
        }
        argmax(q.view()).ok_or_else(|| TdqnError::NumericalError("No valid Q-values".to_string()))
    }

    /// Called after every recorded transition with the memory's new length.
    pub fn on_record(&mut self, memory_len: usize) {
        if memory_len > self.warmup && self.epsilon > self.epsilon_min {
            self.epsilon = (self.epsilon * self.decay).max(self.epsilon_min);
        }
    }
}

/// Index of the first maximum. NaN entries never win; `None` if every entry is NaN
/// or the input is empty.
pub fn argmax(values: ArrayView1<f64>) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in values.iter().enumerate() {
        if v.is_nan() {
            continue;
        }
        match best {
            Some((_, b)) if v <= b => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}
