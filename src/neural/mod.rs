//! Neural network module for snake brains.
//!
//! Implements fixed-topology networks with:
//! - Dense matrix arithmetic
//! - Optional Elman-style recurrent feedback
//! - Replacement mutation
//! - Uniform crossover between equal topologies

pub mod matrix;
mod network;
mod mutations;
mod crossover;

pub use matrix::Matrix;
pub use mutations::validate_rate;
pub use network::{Layer, NeuralNet, Topology};
