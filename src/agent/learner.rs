use ndarray::{Array2, ArrayView2};
use serde::{Serialize, Deserialize};

use crate::error::{Result, TdqnError};
use crate::replay_buffer::Transition;
use super::exploration::argmax;

/// How the bootstrap value of a non-terminal next state is formed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TargetRule {
    /// Online network picks `argmax_a Q(s', a)`, target network scores it
    #[default]
    DoubleDqn,
    /// Target network both picks and scores: `max_a Q_target(s', a)`
    Dqn,
}

/// A sampled minibatch stacked into dense arrays.
#[derive(Clone, Debug)]
pub struct Batch {
    pub states: Array2<f64>,
    pub next_states: Array2<f64>,
    pub actions: Vec<usize>,
    pub rewards: Vec<f64>,
    pub dones: Vec<bool>,
}

impl Batch {
    pub fn from_transitions(transitions: &[&Transition]) -> Result<Self> {
        let first = transitions
            .first()
            .ok_or_else(|| TdqnError::EmptyBuffer("No transitions to train on".to_string()))?;
        let state_size = first.state.len();
        let batch_size = transitions.len();

        let mut states = Array2::zeros((batch_size, state_size));
        let mut next_states = Array2::zeros((batch_size, state_size));
        let mut actions = Vec::with_capacity(batch_size);
        let mut rewards = Vec::with_capacity(batch_size);
        let mut dones = Vec::with_capacity(batch_size);

        for (i, t) in transitions.iter().enumerate() {
            if t.state.len() != state_size || t.next_state.len() != state_size {
                return Err(TdqnError::dimension_mismatch(
                    state_size.to_string(),
                    format!("{}/{}", t.state.len(), t.next_state.len()),
                ));
            }
            states.row_mut(i).assign(&t.state);
            next_states.row_mut(i).assign(&t.next_state);
            actions.push(t.action);
            rewards.push(t.reward);
            dones.push(t.done);
        }

        Ok(Batch {
            states,
            next_states,
            actions,
            rewards,
            dones,
        })
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

/// Regression targets for one target network.
///
/// Starts from the online predictions for the sampled states and overwrites only
/// the entry of the action actually taken:
/// - terminal: `r`
/// - otherwise: `r + gamma * Q_target(s', a*)`, where `a*` comes from `rule`.
pub fn bootstrap_targets(
    batch: &Batch,
    online_q: ArrayView2<f64>,
    online_next_q: ArrayView2<f64>,
    target_next_q: ArrayView2<f64>,
    gamma: f64,
    rule: TargetRule,
) -> Result<Array2<f64>> {
    let n = batch.len();
    let action_count = online_q.ncols();
    let shapes = [
        ("online_q", online_q.dim()),
        ("online_next_q", online_next_q.dim()),
        ("target_next_q", target_next_q.dim()),
    ];
    for (name, dim) in shapes {
        if dim != (n, action_count) {
            return Err(TdqnError::dimension_mismatch(
                format!("{} [{}, {}]", name, n, action_count),
                format!("{:?}", dim),
            ));
        }
    }

    let mut targets = online_q.to_owned();
    for i in 0..n {
        let action = batch.actions[i];
        if action >= action_count {
            return Err(TdqnError::InvalidAction {
                action,
                max_actions: action_count,
            });
        }

        targets[[i, action]] = if batch.dones[i] {
            batch.rewards[i]
        } else {
            let next_value = match rule {
                TargetRule::DoubleDqn => {
                    let best = argmax(online_next_q.row(i))
                        .ok_or_else(|| TdqnError::NumericalError("No valid next-state Q-values".to_string()))?;
                    target_next_q[[i, best]]
                }
                TargetRule::Dqn => target_next_q.row(i).iter().copied().fold(f64::NEG_INFINITY, f64::max),
            };
            batch.rewards[i] + gamma * next_value
        };
    }

    Ok(targets)
}
