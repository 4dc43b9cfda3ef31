use serde::{Serialize, Deserialize};

/// Per-episode telemetry of a training run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingHistory {
    /// Episode indices, in completion order
    pub episodes: Vec<usize>,

    /// Score (steps survived) per episode
    pub scores: Vec<usize>,

    /// Mean of all scores up to and including each episode
    pub averages: Vec<f64>,

    /// Exploration rate at the end of each episode
    pub epsilons: Vec<f64>,

    /// Mean learner loss per episode, when any update ran
    pub losses: Vec<Option<f64>>,
}

/// Tracks scores and the running average over every completed episode.
#[derive(Debug, Clone, Default)]
pub struct ScoreTracker {
    history: TrainingHistory,
    score_sum: u64,

    current_loss_sum: f64,
    current_loss_count: usize,
}

impl ScoreTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a learner loss within the current episode
    pub fn record_loss(&mut self, loss: f64) {
        self.current_loss_sum += loss;
        self.current_loss_count += 1;
    }

    /// Close an episode and return the updated running average.
    pub fn end_episode(&mut self, episode: usize, score: usize, epsilon: f64) -> f64 {
        self.score_sum += score as u64;
        self.history.episodes.push(episode);
        self.history.scores.push(score);

        let average = self.score_sum as f64 / self.history.scores.len() as f64;
        self.history.averages.push(average);
        self.history.epsilons.push(epsilon);

        let loss = (self.current_loss_count > 0)
            .then(|| self.current_loss_sum / self.current_loss_count as f64);
        self.history.losses.push(loss);
        self.current_loss_sum = 0.0;
        self.current_loss_count = 0;

        average
    }

    pub fn average(&self) -> Option<f64> {
        self.history.averages.last().copied()
    }

    pub fn history(&self) -> &TrainingHistory {
        &self.history
    }

    /// Save the history as JSON
    pub fn save(&self, path: &std::path::Path) -> crate::error::Result<()> {
        let serialized = serde_json::to_string_pretty(&self.history)?;
        std::fs::write(path, serialized)?;
        Ok(())
    }
}
