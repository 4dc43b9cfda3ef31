use ndarray::ArrayView1;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::Path;
use tracing::debug;

use crate::config::TdqnConfig;
use crate::error::{Result, TdqnError};
use crate::network::NeuralNetwork;
use crate::replay_buffer::{ReplayBuffer, Transition};
use super::exploration::{argmax, EpsilonGreedy};
use super::learner::{bootstrap_targets, Batch, TargetRule};
use super::target::TargetSet;

/// Deep Q-Network agent with one online network and one or two target networks.
///
/// The online network is the only one trained. Each replay step samples a
/// minibatch, builds one set of Double-DQN regression targets per target network
/// and fits the online network on each set in turn.
///
/// # Example
///
/// ```rust,no_run
/// use tdqn::agent::TdqnAgent;
/// use tdqn::config::TdqnConfig;
/// use tdqn::replay_buffer::Transition;
/// use ndarray::array;
///
/// let config = TdqnConfig::default();
/// let mut agent = TdqnAgent::new(&config, 4, 2).unwrap();
///
/// let state = array![0.01, -0.02, 0.03, 0.0];
/// let action = agent.act(state.view()).unwrap();
/// agent.remember(Transition {
///     state,
///     action,
///     reward: 1.0,
///     next_state: array![0.02, -0.01, 0.02, 0.01],
///     done: false,
/// });
/// // `None` until `train_start` transitions have been recorded
/// assert!(agent.replay().unwrap().is_none());
/// ```
pub struct TdqnAgent {
    /// Network that acts and learns
    pub online: NeuralNetwork,
    pub targets: TargetSet,
    pub memory: ReplayBuffer,
    pub exploration: EpsilonGreedy,
    gamma: f64,
    batch_size: usize,
    train_start: usize,
    learning_rate: f64,
    rule: TargetRule,
    train_steps: usize,
    rng: StdRng,
}

impl TdqnAgent {
    /// Build the online and target networks (each independently initialised),
    /// replay memory and exploration schedule from `config`.
    pub fn new(config: &TdqnConfig, state_size: usize, action_size: usize) -> Result<Self> {
        config.validate()?;
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let online = NeuralNetwork::q_network(state_size, &config.hidden_layers, action_size, &mut rng)?
            .with_rmsprop(config.rmsprop_rho, config.rmsprop_epsilon);
        let targets = (0..config.target_networks.count())
            .map(|_| NeuralNetwork::q_network(state_size, &config.hidden_layers, action_size, &mut rng))
            .collect::<Result<Vec<_>>>()?;

        Ok(TdqnAgent {
            online,
            targets: TargetSet::new(targets, config.sync_mode())?,
            memory: ReplayBuffer::new(config.memory_size),
            exploration: EpsilonGreedy::new(
                config.epsilon,
                config.epsilon_min,
                config.epsilon_decay,
                config.train_start,
            ),
            gamma: config.gamma,
            batch_size: config.batch_size,
            train_start: config.train_start,
            learning_rate: config.learning_rate,
            rule: config.target_rule(),
            train_steps: 0,
            rng,
        })
    }

    pub fn epsilon(&self) -> f64 {
        self.exploration.epsilon()
    }

    pub fn train_steps(&self) -> usize {
        self.train_steps
    }

    pub fn action_count(&self) -> usize {
        self.online.output_size()
    }

    /// Epsilon-greedy action for `state`.
    pub fn act(&mut self, state: ArrayView1<f64>) -> Result<usize> {
        let action_count = self.action_count();
        let online = &self.online;
        self.exploration
            .select(&mut self.rng, action_count, || online.predict_one(state))
    }

    /// Best action according to the online network, no exploration.
    pub fn greedy_action(&self, state: ArrayView1<f64>) -> Result<usize> {
        let q_values = self.online.predict_one(state)?;
        argmax(q_values.view()).ok_or_else(|| TdqnError::NumericalError("No valid Q-values".to_string()))
    }

    /// Store a transition and advance the exploration schedule.
    pub fn remember(&mut self, transition: Transition) {
        self.memory.record(transition);
        self.exploration.on_record(self.memory.len());
    }

    /// One learning step. Returns `Ok(None)` while memory holds fewer than
    /// `train_start` transitions, otherwise the mean loss of the fits.
    pub fn replay(&mut self) -> Result<Option<f64>> {
        if self.memory.len() < self.train_start {
            return Ok(None);
        }

        let batch = Batch::from_transitions(&self.memory.sample(self.batch_size, &mut self.rng))?;

        // Every target set starts from the same online predictions, computed
        // before any fit of this step.
        let online_q = self.online.predict(batch.states.view())?;
        let online_next_q = self.online.predict(batch.next_states.view())?;
        let target_sets = self
            .targets
            .networks()
            .iter()
            .map(|target| {
                let target_next_q = target.predict(batch.next_states.view())?;
                bootstrap_targets(
                    &batch,
                    online_q.view(),
                    online_next_q.view(),
                    target_next_q.view(),
                    self.gamma,
                    self.rule,
                )
            })
            .collect::<Result<Vec<_>>>()?;

        let mut total_loss = 0.0;
        for targets in &target_sets {
            total_loss += self
                .online
                .train_minibatch(batch.states.view(), targets.view(), self.learning_rate)?;
        }
        self.train_steps += 1;

        let loss = total_loss / target_sets.len() as f64;
        debug!(step = self.train_steps, batch = batch.len(), loss, "replay update");
        Ok(Some(loss))
    }

    /// Refresh the target networks from the online network.
    pub fn update_target_networks(&mut self) -> Result<()> {
        self.targets.sync(&self.online)
    }

    /// Persist the online network.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.online.save(path)
    }

    /// Replace the online network with a checkpoint of the same architecture.
    pub fn load<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let network = NeuralNetwork::load(path)?;
        let expected = self.online.parameters().shapes();
        let actual = network.parameters().shapes();
        if expected != actual {
            return Err(TdqnError::dimension_mismatch(format!("{:?}", expected), format!("{:?}", actual)));
        }
        self.online = network;
        Ok(())
    }
}
