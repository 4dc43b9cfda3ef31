//! # TDQN - Double/Triple Deep Q-Learning for CartPole
//!
//! A value-based reinforcement learning trainer built on a small ndarray neural
//! network stack. One online Q-network acts and learns; one or two target
//! networks supply the bootstrap values of Double-DQN regression targets and
//! follow the online network by hard copy or Polyak averaging.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tdqn::config::TdqnConfig;
//! use tdqn::trainer::Trainer;
//!
//! let config = TdqnConfig {
//!     episodes: 200,
//!     soft_update: true,
//!     ..TdqnConfig::default()
//! };
//! let mut trainer = Trainer::cartpole(config).unwrap();
//! let summary = trainer.run().unwrap();
//! println!("{:?}", summary.outcome);
//! ```
//!
//! ## Module Organization
//!
//! - [`activations`] - ReLU and linear activations
//! - [`agent`] - Exploration, target construction, target sync and the agent
//! - [`config`] - Run configuration and its validation
//! - [`env`] - Environment contract and the CartPole simulation
//! - [`error`] - Error types and result handling
//! - [`layers`] - Dense layers and weight initialisation
//! - [`loss`] - Mean squared error
//! - [`metrics`] - Score history and running average
//! - [`network`] - Feed-forward Q-network with save/load
//! - [`optimizer`] - SGD and RMSProp
//! - [`replay_buffer`] - Bounded FIFO experience memory
//! - [`trainer`] - Episode driver and greedy evaluation
//! - [`visualization`] - Score chart

pub mod activations;
pub mod agent;
pub mod config;
pub mod env;
pub mod error;
pub mod layers;
pub mod loss;
pub mod metrics;
pub mod network;
pub mod optimizer;
pub mod replay_buffer;
pub mod trainer;
pub mod visualization;

#[cfg(test)]
mod tests;
