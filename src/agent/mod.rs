//! # Deep Q-Learning Agent Module
//!
//! The agent couples a replay memory with two value estimators and drives an
//! [`Environment`] through whole episodes.
//!
//! ## Core Concepts
//!
//! - **Experience Replay**: every step is stored and learning samples from the
//!   memory instead of the latest transition only
//! - **Target Estimator**: learning targets come from a copy of the online
//!   estimator that is refreshed once per episode
//! - **Exploration**: epsilon-greedy action selection with per-episode decay
//!   towards a floor
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use deepq::agent::{DqnAgent, Environment, TrainConfig};
//! use deepq::error::Result;
//! use deepq::optimizer::{OptimizerWrapper, Adam};
//! use ndarray::{array, Array1};
//!
//! struct Corridor { position: i32 }
//!
//! impl Environment for Corridor {
//!     fn reset(&mut self) -> Result<Array1<f32>> {
//!         self.position = 0;
//!         Ok(array![0.0])
//!     }
//!
//!     fn step(&mut self, action: usize) -> Result<(Array1<f32>, f32, bool)> {
//!         self.position += if action == 1 { 1 } else { -1 };
//!         let done = self.position.abs() >= 3;
//!         let reward = if self.position >= 3 { 1.0 } else { 0.0 };
//!         Ok((array![self.position as f32 / 3.0], reward, done))
//!     }
//!
//!     fn close(&mut self) -> Result<()> {
//!         Ok(())
//!     }
//! }
//!
//! let mut agent = DqnAgent::new(&[1, 16, 2], 10_000)?;
//! let mut optimizer = OptimizerWrapper::Adam(Adam::default());
//! agent.set_save_freq(50, "corridor");
//! agent.train(&mut Corridor { position: 0 }, &mut optimizer, &TrainConfig::default().episodes(200))?;
//! println!("{}", agent.plot_performance(30, 60, 15));
//! # Ok::<(), deepq::error::DqnError>(())
//! ```

pub mod config;
pub mod traits;

mod dqn;
pub use config::{CheckpointSchedule, TrainConfig};
pub use dqn::{DqnAgent, DqnAgentBuilder};
pub use traits::{BincodeCheckpoint, CheckpointSink, Environment};
