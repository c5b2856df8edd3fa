use serde::{Serialize, Deserialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{DqnError, Result};

/// Per-call settings of [`crate::agent::DqnAgent::train`].
///
/// The defaults are batch 64, no rendering, exploration starting at 1.0 and
/// decaying by 0.99 per episode down to 0.01, discount 0.95.
///
/// ```rust
/// use deepq::agent::TrainConfig;
///
/// let config = TrainConfig::default()
///     .episodes(500)
///     .batch_size(32)
///     .discount_factor(0.99);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainConfig {
    /// Number of episodes to run.
    pub episodes: usize,

    /// Transitions sampled per learning step. Learning is skipped until the
    /// buffer holds at least this many.
    pub batch_size: usize,

    /// Call `Environment::render` after every step.
    pub render: bool,

    /// Exploration rate to start from. `None` continues from the rate the
    /// agent already holds.
    pub exploration_rate: Option<f32>,

    /// Floor for the decayed exploration rate.
    pub min_exploration_rate: f32,

    /// Multiplier applied to the exploration rate after every episode.
    pub exploration_decay: f32,

    /// Weight of the estimated future value in a learning target.
    pub discount_factor: f32,
}

impl Default for TrainConfig {
    fn default() -> Self {
        TrainConfig {
            episodes: 100,
            batch_size: 64,
            render: false,
            exploration_rate: Some(1.0),
            min_exploration_rate: 0.01,
            exploration_decay: 0.99,
            discount_factor: 0.95,
        }
    }
}

impl TrainConfig {
    pub fn episodes(mut self, episodes: usize) -> Self {
        self.episodes = episodes;
        self
    }

    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn render(mut self, render: bool) -> Self {
        self.render = render;
        self
    }

    pub fn exploration_rate(mut self, rate: f32) -> Self {
        self.exploration_rate = Some(rate);
        self
    }

    /// Keep the agent's current exploration rate instead of resetting it.
    pub fn continue_exploration(mut self) -> Self {
        self.exploration_rate = None;
        self
    }

    pub fn min_exploration_rate(mut self, rate: f32) -> Self {
        self.min_exploration_rate = rate;
        self
    }

    pub fn exploration_decay(mut self, decay: f32) -> Self {
        self.exploration_decay = decay;
        self
    }

    pub fn discount_factor(mut self, discount: f32) -> Self {
        self.discount_factor = discount;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(DqnError::invalid_parameter("batch_size", "Must be at least 1"));
        }
        if let Some(rate) = self.exploration_rate {
            check_unit_interval("exploration_rate", rate)?;
        }
        check_unit_interval("min_exploration_rate", self.min_exploration_rate)?;
        if !(self.exploration_decay > 0.0 && self.exploration_decay <= 1.0) {
            return Err(DqnError::invalid_parameter(
                "exploration_decay".to_string(),
                format!("{} is not in (0, 1]", self.exploration_decay),
            ));
        }
        check_unit_interval("discount_factor", self.discount_factor)?;
        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = fs::read_to_string(path)?;
        Self::from_json(&data)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn check_unit_interval(name: &str, value: f32) -> Result<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(DqnError::invalid_parameter(
            name.to_string(),
            format!("{} is not in [0, 1]", value),
        ));
    }
    Ok(())
}

/// Save the agent every `every` completed episodes to
/// `{prefix}_episode{n}.bin`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CheckpointSchedule {
    pub every: usize,
    pub prefix: String,
}

impl CheckpointSchedule {
    pub fn path_for(&self, episode: usize) -> PathBuf {
        PathBuf::from(format!("{}_episode{}.bin", self.prefix, episode))
    }

    pub fn is_due(&self, completed_episodes: usize) -> bool {
        self.every != 0 && completed_episodes % self.every == 0
    }
}
