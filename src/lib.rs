//! # deepq - Deep Q-Learning with Experience Replay
//!
//! deepq trains a neural action-value estimator for environments with
//! continuous state vectors and a small discrete action set. It provides the
//! replay memory, a dense network estimator, the optimizers that update it,
//! and the episode loop that ties them to an environment.
//!
//! ## Key Features
//!
//! - **Replay Memory**: fixed-capacity circular buffer with uniform sampling
//! - **Target Estimator**: full parameter copy refreshed after every episode
//! - **Optimizers**: SGD, Momentum, RMSProp and Adam with lazily shaped state
//! - **Checkpoints**: bincode snapshots of the whole agent on a fixed cadence
//! - **Reproducibility**: every random draw comes from a seedable generator
//!
//! ## Quick Start
//!
//! ```rust
//! use deepq::agent::DqnAgent;
//! use deepq::optimizer::{OptimizerWrapper, SGD};
//! use ndarray::array;
//!
//! // 4 state features, two hidden layers, 2 actions
//! let mut agent = DqnAgent::with_seed(&[4, 64, 64, 2], 10_000, 42).unwrap();
//! let mut optimizer = OptimizerWrapper::SGD(SGD::new(0.001));
//!
//! let state = array![0.1, 0.2, -0.3, 0.4];
//! let action = agent.select_action(state.view()).unwrap();
//! agent.remember(state.view(), action, 1.0, array![0.1, 0.1, -0.2, 0.3].view(), false).unwrap();
//!
//! // Nothing to learn from until the memory holds a full minibatch
//! assert!(!agent.learn_minibatch(32, &mut optimizer, 0.95).unwrap());
//! ```
//!
//! ## Module Organization
//!
//! - [`activations`] - Activation functions (ReLU, LeakyReLU, Sigmoid, Tanh, Linear)
//! - [`agent`] - The DQN agent, its training configuration and environment trait
//! - [`error`] - Error types and result handling
//! - [`estimator`] - The value estimator contract and parameter sets
//! - [`layers`] - Dense layers and weight initialization
//! - [`loss`] - Loss functions for training
//! - [`network`] - Multi-layer perceptron estimator
//! - [`optimizer`] - Optimization algorithms
//! - [`replay_buffer`] - Experience replay memory
//! - [`visualization`] - Text plots of training performance

#[macro_use]
pub mod macros;

pub mod activations;
pub mod agent;
pub mod error;
pub mod estimator;
pub mod layers;
pub mod loss;
pub mod network;
pub mod optimizer;
pub mod replay_buffer;
pub mod visualization;

#[cfg(test)]
mod tests;
