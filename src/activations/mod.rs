//! # Activation Functions
//!
//! The Q-network only needs two activations: ReLU on the hidden layers and the
//! identity on the output layer, which regresses unbounded action values.

pub mod functions;

pub use functions::Activation;
