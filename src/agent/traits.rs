use ndarray::Array1;
use serde::Serialize;
use std::path::Path;

use crate::agent::DqnAgent;
use crate::error::Result;

/// A sequential-decision environment driven by the training loop.
///
/// Every call blocks until the environment has finished the requested work.
/// State vectors must have the width of the agent's estimator input, and
/// actions are indices in `[0, action_count)`.
pub trait Environment {
    /// Start a new episode and return its initial state.
    fn reset(&mut self) -> Result<Array1<f32>>;

    /// Apply `action` and return `(next_state, reward, done)`.
    fn step(&mut self, action: usize) -> Result<(Array1<f32>, f32, bool)>;

    /// Show a visual representation of the environment.
    fn render(&mut self) -> Result<()> {
        Ok(())
    }

    /// Release the environment after training.
    fn close(&mut self) -> Result<()>;
}

/// Destination for periodic agent checkpoints.
pub trait CheckpointSink<M> {
    fn save(&mut self, agent: &DqnAgent<M>, path: &Path) -> Result<()>;
}

/// Writes checkpoints as bincode files through [`DqnAgent::save`].
#[derive(Clone, Copy, Debug, Default)]
pub struct BincodeCheckpoint;

impl<M: Serialize> CheckpointSink<M> for BincodeCheckpoint {
    fn save(&mut self, agent: &DqnAgent<M>, path: &Path) -> Result<()> {
        agent.save(path)
    }
}
