//! # Agent
//!
//! The learning core: an epsilon-greedy policy over an online Q-network, replay
//! memory, target networks that follow the online network, and the replay step
//! that regresses the online network onto bootstrapped targets.
//!
//! - [`EpsilonGreedy`]: exploration with a warm-up gated geometric decay
//! - [`TargetSet`]: one or two target networks, hard or soft (Polyak) sync
//! - [`bootstrap_targets`]: Double-DQN (or plain DQN) regression targets
//! - [`TdqnAgent`]: owns all of the above plus the RNG, and drives a replay step

pub mod exploration;
pub mod learner;
pub mod target;

mod tdqn;

pub use exploration::{argmax, EpsilonGreedy};
pub use learner::{bootstrap_targets, Batch, TargetRule};
pub use target::{SyncMode, TargetNetworks, TargetSet};
pub use tdqn::TdqnAgent;
