use ndarray::{array, Array1};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Serialize, Deserialize};

use super::{Environment, Step};
use crate::error::{Result, TdqnError};

/// Physical constants of the cart-pole system
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartPoleConfig {
    pub gravity: f64,
    pub mass_cart: f64,
    pub mass_pole: f64,
    /// Half the pole's length
    pub length: f64,
    pub force_mag: f64,
    /// Seconds between state updates
    pub tau: f64,
    pub x_threshold: f64,
    /// Radians
    pub theta_threshold: f64,
    pub max_episode_steps: usize,
}

impl Default for CartPoleConfig {
    fn default() -> Self {
        Self {
            gravity: 9.8,
            mass_cart: 1.0,
            mass_pole: 0.1,
            length: 0.5,
            force_mag: 10.0,
            tau: 0.02,
            x_threshold: 2.4,
            theta_threshold: 12.0 * 2.0 * std::f64::consts::PI / 360.0,
            max_episode_steps: 500,
        }
    }
}

/// CartPole-v1: push a cart left (0) or right (1) to keep the pole upright.
/// Observation is `[x, x_dot, theta, theta_dot]`, reward is 1 per step.
pub struct CartPole {
    config: CartPoleConfig,
    state: [f64; 4],
    steps: usize,
    /// False before the first reset and after the episode has ended
    running: bool,
    rng: StdRng,
}

impl CartPole {
    pub const NAME: &'static str = "CartPole-v1";

    pub fn new(config: CartPoleConfig) -> Self {
        CartPole {
            config,
            state: [0.0; 4],
            steps: 0,
            running: false,
            rng: StdRng::from_entropy(),
        }
    }

    pub fn config(&self) -> &CartPoleConfig {
        &self.config
    }

    fn observation(&self) -> Array1<f64> {
        array![self.state[0], self.state[1], self.state[2], self.state[3]]
    }

    fn is_terminal(&self) -> bool {
        let [x, _, theta, _] = self.state;
        x.abs() > self.config.x_threshold || theta.abs() > self.config.theta_threshold
    }
}

impl Default for CartPole {
    fn default() -> Self {
        Self::new(CartPoleConfig::default())
    }
}

impl Environment for CartPole {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn observation_size(&self) -> usize {
        4
    }

    fn action_count(&self) -> usize {
        2
    }

    fn max_episode_steps(&self) -> usize {
        self.config.max_episode_steps
    }

    fn set_max_episode_steps(&mut self, max_steps: usize) {
        self.config.max_episode_steps = max_steps;
    }

    fn reset(&mut self, seed: Option<u64>) -> Array1<f64> {
        if let Some(seed) = seed {
            self.rng = StdRng::seed_from_u64(seed);
        }
        for value in self.state.iter_mut() {
            *value = self.rng.gen_range(-0.05..0.05);
        }
        self.steps = 0;
        self.running = true;
        self.observation()
    }

    fn step(&mut self, action: usize) -> Result<Step> {
        if action >= self.action_count() {
            return Err(TdqnError::InvalidAction {
                action,
                max_actions: self.action_count(),
            });
        }
        if !self.running {
            return Err(TdqnError::invalid_parameter(
                "step",
                "episode is not running; call reset() first",
            ));
        }

        let c = &self.config;
        let [x, x_dot, theta, theta_dot] = self.state;
        let force = if action == 1 { c.force_mag } else { -c.force_mag };
        let cos_theta = theta.cos();
        let sin_theta = theta.sin();
        let total_mass = c.mass_cart + c.mass_pole;
        let pole_mass_length = c.mass_pole * c.length;

        let temp = (force + pole_mass_length * theta_dot * theta_dot * sin_theta) / total_mass;
        let theta_acc = (c.gravity * sin_theta - cos_theta * temp)
            / (c.length * (4.0 / 3.0 - c.mass_pole * cos_theta * cos_theta / total_mass));
        let x_acc = temp - pole_mass_length * theta_acc * cos_theta / total_mass;

        // explicit Euler
        self.state = [
            x + c.tau * x_dot,
            x_dot + c.tau * x_acc,
            theta + c.tau * theta_dot,
            theta_dot + c.tau * theta_acc,
        ];
        self.steps += 1;

        let terminated = self.is_terminal();
        let truncated = !terminated && self.steps >= self.config.max_episode_steps;
        if terminated || truncated {
            self.running = false;
        }

        Ok(Step {
            next_state: self.observation(),
            reward: 1.0,
            terminated,
            truncated,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_is_small_and_seeded() {
        let mut a = CartPole::default();
        let mut b = CartPole::default();
        let sa = a.reset(Some(0));
        let sb = b.reset(Some(0));
        assert_eq!(sa, sb);
        assert!(sa.iter().all(|v| v.abs() < 0.05));
    }

    #[test]
    fn constant_push_eventually_terminates() {
        let mut env = CartPole::default();
        env.reset(Some(3));
        let mut steps = 0;
        loop {
            let step = env.step(1).unwrap();
            steps += 1;
            if step.done() {
                assert!(step.terminated);
                assert!(!step.truncated);
                break;
            }
        }
        assert!(steps < 100);
    }

    #[test]
    fn step_cap_truncates() {
        let mut env = CartPole::default();
        env.set_max_episode_steps(3);
        env.reset(Some(1));
        assert!(!env.step(0).unwrap().done());
        assert!(!env.step(1).unwrap().done());
        let last = env.step(0).unwrap();
        assert!(last.truncated);
        assert!(!last.terminated);
    }

    #[test]
    fn rejects_invalid_action_and_step_after_done() {
        let mut env = CartPole::default();
        assert!(env.step(0).is_err());
        env.reset(None);
        assert!(matches!(env.step(2), Err(TdqnError::InvalidAction { action: 2, max_actions: 2 })));
        env.set_max_episode_steps(1);
        env.step(0).unwrap();
        assert!(env.step(0).is_err());
    }
}
