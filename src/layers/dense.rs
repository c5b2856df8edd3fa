use ndarray::{Array1, Array2, ArrayView2, Axis};
use rand::Rng;
use serde::{Serialize, Deserialize};

use crate::activations::Activation;
use crate::error::{DqnError, Result};
use crate::estimator::LayerParameters;
use super::initialization::WeightInit;

/// A fully connected (dense) layer in a neural network
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct DenseLayer {
    pub weights: Array2<f32>,
    pub biases: Array1<f32>,
    pub activation: Activation,
    #[serde(skip)]
    pre_activation_output: Option<Array2<f32>>,
    #[serde(skip)]
    inputs: Option<Array2<f32>>,
}

impl DenseLayer {
    /// Create a new dense layer. Weights are drawn from `rng` according to
    /// `init`; biases start at zero.
    pub fn new<R: Rng + ?Sized>(
        input_size: usize,
        output_size: usize,
        activation: Activation,
        init: WeightInit,
        rng: &mut R,
    ) -> Result<Self> {
        let weights = init.initialize_weights((input_size, output_size), rng)?;
        let biases = init.initialize_biases(output_size);
        Ok(DenseLayer {
            weights,
            biases,
            activation,
            pre_activation_output: None,
            inputs: None,
        })
    }

    /// Build a layer around existing weights and biases.
    pub fn from_parameters(
        weights: Array2<f32>,
        biases: Array1<f32>,
        activation: Activation,
    ) -> Result<Self> {
        if weights.ncols() != biases.len() {
            return Err(DqnError::dimension_mismatch(
                format!("{} biases", weights.ncols()),
                format!("{} biases", biases.len()),
            ));
        }
        Ok(DenseLayer {
            weights,
            biases,
            activation,
            pre_activation_output: None,
            inputs: None,
        })
    }

    pub fn input_size(&self) -> usize {
        self.weights.nrows()
    }

    pub fn output_size(&self) -> usize {
        self.weights.ncols()
    }

    /// Forward pass for a batch of input rows. Inputs and pre-activation
    /// values are cached for the next `backward_batch`.
    pub fn forward_batch(&mut self, inputs: ArrayView2<f32>) -> Array2<f32> {
        self.inputs = Some(inputs.to_owned());
        let mut outputs = inputs.dot(&self.weights) + &self.biases.view().insert_axis(Axis(0));
        self.pre_activation_output = Some(outputs.clone());
        self.activation.apply_batch(&mut outputs);
        outputs
    }

    /// Returns `(adjusted_error, weight_gradients, bias_gradients)` for a
    /// batch of output errors.
    pub fn backward_batch(
        &self,
        output_errors: ArrayView2<f32>,
    ) -> Result<(Array2<f32>, Array2<f32>, Array1<f32>)> {
        let (pre_activation_output, inputs) = match (&self.pre_activation_output, &self.inputs) {
            (Some(pre), Some(inputs)) => (pre, inputs),
            _ => {
                return Err(DqnError::TrainingError(
                    "forward_batch() must be called before backward_batch()".to_string(),
                ))
            }
        };

        let activation_deriv = self.activation.derivative_batch(pre_activation_output.view());
        let adjusted_error = output_errors.to_owned() * &activation_deriv;
        let weight_gradients = inputs.t().dot(&adjusted_error);
        let bias_gradients = adjusted_error.sum_axis(Axis(0));

        Ok((adjusted_error, weight_gradients, bias_gradients))
    }

    pub fn parameters(&self) -> LayerParameters {
        LayerParameters {
            weights: self.weights.clone(),
            biases: self.biases.clone(),
        }
    }

    /// Overwrite weights and biases, keeping the layer's shape.
    pub fn set_parameters(&mut self, parameters: LayerParameters) -> Result<()> {
        if parameters.weights.dim() != self.weights.dim()
            || parameters.biases.len() != self.biases.len()
        {
            return Err(DqnError::dimension_mismatch(
                format!("{:?} / {}", self.weights.dim(), self.biases.len()),
                format!("{:?} / {}", parameters.weights.dim(), parameters.biases.len()),
            ));
        }
        self.weights = parameters.weights;
        self.biases = parameters.biases;
        Ok(())
    }
}
