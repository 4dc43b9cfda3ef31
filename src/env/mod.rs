//! # Environments
//!
//! The trainer talks to its environment through [`Environment`], a synchronous
//! gym-style contract: `reset` yields the initial observation, `step` applies a
//! discrete action. An episode is over when the step reports either
//! `terminated` (a failure state of the task) or `truncated` (the step cap).

pub mod cartpole;

pub use cartpole::CartPole;

use ndarray::Array1;

use crate::error::Result;

/// Outcome of a single environment step
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub next_state: Array1<f64>,
    pub reward: f64,
    /// The task reached a terminal state
    pub terminated: bool,
    /// The episode hit `max_episode_steps`
    pub truncated: bool,
}

impl Step {
    pub fn done(&self) -> bool {
        self.terminated || self.truncated
    }
}

pub trait Environment {
    /// Environment identifier, used to name checkpoints and charts
    fn name(&self) -> &str;

    /// Dimensionality of the observation vector
    fn observation_size(&self) -> usize;

    /// Number of discrete actions
    fn action_count(&self) -> usize;

    fn max_episode_steps(&self) -> usize;

    fn set_max_episode_steps(&mut self, max_steps: usize);

    /// Start a new episode. A seed reseeds the environment's random stream.
    fn reset(&mut self, seed: Option<u64>) -> Array1<f64>;

    fn step(&mut self, action: usize) -> Result<Step>;
}
