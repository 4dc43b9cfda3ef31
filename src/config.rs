//! Training configuration.
//!
//! Every hyperparameter of a run lives in [`TdqnConfig`]. The defaults reproduce
//! the reference CartPole setup; a JSON file may override any subset of fields.

use serde::{Serialize, Deserialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::agent::{SyncMode, TargetNetworks, TargetRule};
use crate::error::{Result, TdqnError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TdqnConfig {
    /// Environment identifier; only `CartPole-v1` is available
    pub env_name: String,
    pub episodes: usize,
    /// Overrides the environment's own step cap (CartPole-v1 ships with 500)
    pub max_episode_steps: usize,
    /// Seed for the first environment reset and for the agent's RNG
    pub seed: Option<u64>,

    pub memory_size: usize,
    pub batch_size: usize,
    /// Transitions required before learning starts
    pub train_start: usize,
    pub gamma: f64,

    pub epsilon: f64,
    pub epsilon_min: f64,
    pub epsilon_decay: f64,

    pub hidden_layers: Vec<usize>,
    pub learning_rate: f64,
    pub rmsprop_rho: f64,
    pub rmsprop_epsilon: f64,

    /// Double-DQN action selection; plain DQN max when false
    pub double_dqn: bool,
    pub target_networks: TargetNetworks,
    pub soft_update: bool,
    pub tau: f64,

    pub checkpoint_dir: PathBuf,
    /// Written when an episode reaches the step cap
    pub solved_checkpoint: String,
    /// Directory for the score chart; `None` disables charting
    pub plot_dir: Option<PathBuf>,
}

impl Default for TdqnConfig {
    fn default() -> Self {
        TdqnConfig {
            env_name: "CartPole-v1".to_string(),
            episodes: 2000,
            max_episode_steps: 4000,
            seed: Some(0),
            memory_size: 2000,
            batch_size: 32,
            train_start: 1000,
            gamma: 0.95,
            epsilon: 1.0,
            epsilon_min: 0.01,
            epsilon_decay: 0.999,
            hidden_layers: vec![512, 256, 64],
            learning_rate: 0.00025,
            rmsprop_rho: 0.95,
            rmsprop_epsilon: 0.01,
            double_dqn: true,
            target_networks: TargetNetworks::Twin,
            soft_update: false,
            tau: 0.1,
            checkpoint_dir: PathBuf::from("Models"),
            solved_checkpoint: "cartpole-tdqn.bin".to_string(),
            plot_dir: Some(PathBuf::from(".")),
        }
    }
}

impl TdqnConfig {
    /// Load a JSON config; missing fields take their defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&data)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        fn positive(name: &str, value: usize) -> Result<()> {
            if value == 0 {
                return Err(TdqnError::invalid_parameter(name, "must be greater than 0"));
            }
            Ok(())
        }
        fn unit(name: &str, value: f64) -> Result<()> {
            if !(0.0..=1.0).contains(&value) {
                return Err(TdqnError::invalid_parameter(name.to_string(), format!("{} is outside [0, 1]", value)));
            }
            Ok(())
        }

        positive("episodes", self.episodes)?;
        positive("max_episode_steps", self.max_episode_steps)?;
        positive("memory_size", self.memory_size)?;
        positive("batch_size", self.batch_size)?;
        unit("gamma", self.gamma)?;
        unit("epsilon", self.epsilon)?;
        unit("epsilon_min", self.epsilon_min)?;
        unit("epsilon_decay", self.epsilon_decay)?;
        unit("tau", self.tau)?;
        unit("rmsprop_rho", self.rmsprop_rho)?;

        if self.train_start < self.batch_size {
            return Err(TdqnError::invalid_parameter(
                "train_start".to_string(),
                format!("{} is smaller than batch_size {}", self.train_start, self.batch_size),
            ));
        }
        if self.train_start > self.memory_size {
            return Err(TdqnError::invalid_parameter(
                "train_start".to_string(),
                format!("{} exceeds memory_size {}; learning would never start", self.train_start, self.memory_size),
            ));
        }
        if self.hidden_layers.iter().any(|&units| units == 0) {
            return Err(TdqnError::invalid_parameter("hidden_layers", "layer widths must be positive"));
        }
        if !(self.learning_rate > 0.0 && self.learning_rate.is_finite()) {
            return Err(TdqnError::invalid_parameter("learning_rate", "must be positive and finite"));
        }
        if self.rmsprop_epsilon <= 0.0 {
            return Err(TdqnError::invalid_parameter("rmsprop_epsilon", "must be positive"));
        }
        if self.solved_checkpoint.is_empty() {
            return Err(TdqnError::invalid_parameter("solved_checkpoint", "must not be empty"));
        }
        Ok(())
    }

    pub fn sync_mode(&self) -> SyncMode {
        if self.soft_update {
            SyncMode::Soft { tau: self.tau }
        } else {
            SyncMode::Hard
        }
    }

    pub fn target_rule(&self) -> TargetRule {
        if self.double_dqn {
            TargetRule::DoubleDqn
        } else {
            TargetRule::Dqn
        }
    }

    /// `TDQN_<env>[_soft]`, shared by the run checkpoint and the chart
    pub fn run_name(&self) -> String {
        let suffix = if self.soft_update { "_soft" } else { "" };
        format!("TDQN_{}{}", self.env_name, suffix)
    }

    /// Checkpoint written when the episode budget runs out
    pub fn run_checkpoint_path(&self) -> PathBuf {
        self.checkpoint_dir.join(format!("TDQN_{}.bin", self.env_name))
    }

    pub fn solved_checkpoint_path(&self) -> PathBuf {
        self.checkpoint_dir.join(&self.solved_checkpoint)
    }

    /// Per-episode telemetry, saved as JSON next to the checkpoints
    pub fn history_path(&self) -> PathBuf {
        self.checkpoint_dir.join(format!("{}_history.json", self.run_name()))
    }

    pub fn plot_path(&self) -> Option<PathBuf> {
        self.plot_dir
            .as_ref()
            .map(|dir| dir.join(format!("{}.png", self.run_name())))
    }
}
