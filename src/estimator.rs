//! # Value Estimator Contract
//!
//! The learning loop never looks inside the function approximator. It only
//! needs to run a batched forward pass, read the cached output, obtain a
//! gradient against a supervised target vector, and read or overwrite the
//! full parameter set. [`crate::network::NeuralNetwork`] is the implementation
//! shipped with the crate.

use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use serde::{Serialize, Deserialize};

use crate::error::{DqnError, Result};

/// Weights and biases of one dense layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LayerParameters {
    pub weights: Array2<f32>,
    pub biases: Array1<f32>,
}

impl LayerParameters {
    pub fn zeros_like(&self) -> Self {
        LayerParameters {
            weights: Array2::zeros(self.weights.dim()),
            biases: Array1::zeros(self.biases.dim()),
        }
    }
}

/// The full, ordered parameter set of an estimator.
///
/// This is a value type: cloning copies every array, so two estimators
/// holding clones of the same `Parameters` never share storage.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Parameters {
    pub layers: Vec<LayerParameters>,
}

/// Gradients are laid out exactly like the parameters they belong to.
pub type Gradients = Parameters;

impl Parameters {
    pub fn new(layers: Vec<LayerParameters>) -> Self {
        Parameters { layers }
    }

    pub fn zeros_like(&self) -> Self {
        Parameters {
            layers: self.layers.iter().map(LayerParameters::zeros_like).collect(),
        }
    }

    /// `(weights shape, bias length)` for every layer.
    pub fn shapes(&self) -> Vec<((usize, usize), usize)> {
        self.layers
            .iter()
            .map(|layer| (layer.weights.dim(), layer.biases.len()))
            .collect()
    }

    /// Fails with `DimensionMismatch` unless `other` has the same layout.
    pub fn check_same_shape(&self, other: &Parameters) -> Result<()> {
        let ours = self.shapes();
        let theirs = other.shapes();
        if ours != theirs {
            return Err(DqnError::dimension_mismatch(
                format!("{:?}", ours),
                format!("{:?}", theirs),
            ));
        }
        Ok(())
    }

    /// Total number of scalar parameters.
    pub fn len(&self) -> usize {
        self.layers
            .iter()
            .map(|layer| layer.weights.len() + layer.biases.len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Capability set required from an action-value approximator.
///
/// All calls block until complete. Rows of a fed batch are states; columns
/// of the output are actions.
pub trait ValueEstimator {
    /// Width of a state vector.
    fn input_size(&self) -> usize;

    /// Number of actions, i.e. width of an output row.
    fn output_size(&self) -> usize;

    /// Run a forward pass over a batch of states and cache the output.
    fn feed(&mut self, states: ArrayView2<f32>) -> Result<()>;

    /// One action-value row per row of the most recent `feed`.
    fn output(&self) -> Result<ArrayView2<'_, f32>>;

    /// Gradient of the loss between the most recent single-row output and
    /// `target`.
    fn backpropagate(&mut self, target: ArrayView1<f32>) -> Result<Gradients>;

    /// A value copy of the current parameters.
    fn parameters(&self) -> Parameters;

    /// Overwrite every parameter. The layout must match.
    fn set_parameters(&mut self, parameters: Parameters) -> Result<()>;
}
