//! Episode driver.
//!
//! Per step: act, step the environment, penalise early failure, remember, replay.
//! Per episode end: sync target networks, record telemetry, refresh the chart and
//! stop with a checkpoint once an episode survives the full step cap.

use std::path::PathBuf;
use tracing::{info, warn};

use crate::agent::TdqnAgent;
use crate::config::TdqnConfig;
use crate::env::{CartPole, Environment};
use crate::error::{Result, TdqnError};
use crate::metrics::{ScoreTracker, TrainingHistory};
use crate::replay_buffer::Transition;
use crate::visualization::ScoreChart;

/// Reward stored for an episode that ends before the step cap
pub const FAILURE_REWARD: f64 = -100.0;

/// How a training run ended
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// An episode reached the step cap; the online network was saved here
    Solved { episode: usize, checkpoint: PathBuf },
    /// The episode budget ran out; the online network was saved here
    Exhausted { checkpoint: PathBuf },
}

#[derive(Debug, Clone)]
pub struct TrainingSummary {
    pub outcome: RunOutcome,
    pub history: TrainingHistory,
}

pub struct Trainer<E: Environment> {
    config: TdqnConfig,
    env: E,
    agent: TdqnAgent,
    scores: ScoreTracker,
    chart: Option<ScoreChart>,
}

impl Trainer<CartPole> {
    /// Trainer for the CartPole task named in `config`.
    pub fn cartpole(config: TdqnConfig) -> Result<Self> {
        if config.env_name != CartPole::NAME {
            return Err(TdqnError::invalid_parameter(
                "env_name".to_string(),
                format!("unknown environment '{}', only {} is available", config.env_name, CartPole::NAME),
            ));
        }
        Self::new(config, CartPole::default())
    }
}

impl<E: Environment> Trainer<E> {
    pub fn new(config: TdqnConfig, mut env: E) -> Result<Self> {
        config.validate()?;
        env.set_max_episode_steps(config.max_episode_steps);
        let agent = TdqnAgent::new(&config, env.observation_size(), env.action_count())?;
        let chart = config.plot_path().map(ScoreChart::new);

        Ok(Trainer {
            config,
            env,
            agent,
            scores: ScoreTracker::new(),
            chart,
        })
    }

    pub fn agent(&self) -> &TdqnAgent {
        &self.agent
    }

    pub fn agent_mut(&mut self) -> &mut TdqnAgent {
        &mut self.agent
    }

    pub fn env(&self) -> &E {
        &self.env
    }

    pub fn history(&self) -> &TrainingHistory {
        self.scores.history()
    }

    /// Reward recorded for a step: the environment's reward, unless the episode
    /// ended before `max_steps`.
    pub fn shaped_reward(reward: f64, done: bool, steps: usize, max_steps: usize) -> f64 {
        if done && steps != max_steps {
            FAILURE_REWARD
        } else {
            reward
        }
    }

    /// Play one episode with learning. Returns the score (steps survived).
    fn train_episode(&mut self, episode: usize) -> Result<usize> {
        let seed = if episode == 0 { self.config.seed } else { None };
        let mut state = self.env.reset(seed);
        let max_steps = self.env.max_episode_steps();
        let mut steps = 0;

        loop {
            let action = self.agent.act(state.view())?;
            let step = self.env.step(action)?;
            steps += 1;
            let done = step.done();

            self.agent.remember(Transition {
                state,
                action,
                reward: Self::shaped_reward(step.reward, done, steps, max_steps),
                next_state: step.next_state.clone(),
                done,
            });
            if let Some(loss) = self.agent.replay()? {
                self.scores.record_loss(loss);
            }
            state = step.next_state;

            if done {
                return Ok(steps);
            }
        }
    }

    /// Run training until the episode budget is spent or an episode reaches the
    /// step cap.
    pub fn run(&mut self) -> Result<TrainingSummary> {
        let episodes = self.config.episodes;
        let max_steps = self.env.max_episode_steps();
        info!(
            env = self.env.name(),
            episodes,
            max_steps,
            targets = self.agent.targets.len(),
            sync = ?self.agent.targets.mode(),
            "starting training"
        );

        for episode in 0..episodes {
            let score = self.train_episode(episode)?;
            self.agent.update_target_networks()?;

            let epsilon = self.agent.epsilon();
            let average = self.scores.end_episode(episode, score, epsilon);
            if let Some(chart) = &self.chart {
                chart.update(self.scores.history());
            }
            info!(episode, of = episodes, score, epsilon = format_args!("{:.2}", epsilon), average = format_args!("{:.2}", average), "episode finished");

            if score == max_steps {
                let checkpoint = self.config.solved_checkpoint_path();
                info!(path = %checkpoint.display(), "step cap reached, saving trained model");
                self.agent.save(&checkpoint)?;
                return self.finish(RunOutcome::Solved { episode, checkpoint });
            }
        }

        let checkpoint = self.config.run_checkpoint_path();
        warn!(path = %checkpoint.display(), "episode budget exhausted before reaching the step cap");
        self.agent.save(&checkpoint)?;
        self.finish(RunOutcome::Exhausted { checkpoint })
    }

    fn finish(&self, outcome: RunOutcome) -> Result<TrainingSummary> {
        let path = self.config.history_path();
        self.scores.save(&path)?;
        info!(path = %path.display(), "training history saved");
        Ok(TrainingSummary {
            outcome,
            history: self.scores.history().clone(),
        })
    }

    /// Greedy evaluation: no exploration, no learning, no memory writes.
    /// Returns one score per episode.
    pub fn evaluate(&mut self, episodes: usize) -> Result<Vec<usize>> {
        let mut scores = Vec::with_capacity(episodes);
        for episode in 0..episodes {
            let seed = if episode == 0 { self.config.seed } else { None };
            let mut state = self.env.reset(seed);
            let mut steps = 0;
            loop {
                let action = self.agent.greedy_action(state.view())?;
                let step = self.env.step(action)?;
                steps += 1;
                state = step.next_state;
                if step.terminated || step.truncated {
                    break;
                }
            }
            info!(episode, of = episodes, score = steps, "evaluation episode finished");
            scores.push(steps);
        }
        Ok(scores)
    }
}
