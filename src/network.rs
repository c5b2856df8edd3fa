use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use rand::Rng;
use serde::{Serialize, Deserialize};
use std::fs;
use std::path::Path;

use crate::activations::Activation;
use crate::error::{DqnError, Result};
use crate::estimator::{Gradients, LayerParameters, Parameters, ValueEstimator};
use crate::layers::{DenseLayer, WeightInit};
use crate::loss::{Loss, LossKind};

/// A multi-layer perceptron used as an action-value estimator.
///
/// The network caches the output of the most recent [`ValueEstimator::feed`]
/// so that the learning loop can read it and backpropagate against it.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct NeuralNetwork {
    pub layers: Vec<DenseLayer>,
    pub loss: LossKind,
    #[serde(skip)]
    output: Option<Array2<f32>>,
}

impl NeuralNetwork {
    /// Create a new neural network with the given layer sizes and activations.
    /// Weights are drawn from `rng` using the initialization recommended for
    /// each layer's activation.
    pub fn new<R: Rng + ?Sized>(
        layer_sizes: &[usize],
        activations: &[Activation],
        loss: LossKind,
        rng: &mut R,
    ) -> Result<Self> {
        if layer_sizes.len() < 2 {
            return Err(DqnError::invalid_parameter(
                "layer_sizes",
                "Must have at least input and output layers",
            ));
        }
        if layer_sizes.iter().any(|&size| size == 0) {
            return Err(DqnError::invalid_parameter(
                "layer_sizes",
                "Layer sizes must be positive",
            ));
        }
        if activations.len() != layer_sizes.len() - 1 {
            return Err(DqnError::invalid_parameter(
                "activations".to_string(),
                format!(
                    "expected {} activations, got {}",
                    layer_sizes.len() - 1,
                    activations.len()
                ),
            ));
        }

        let layers = layer_sizes
            .windows(2)
            .zip(activations.iter())
            .map(|(window, &activation)| {
                let init = WeightInit::for_activation(&activation);
                DenseLayer::new(window[0], window[1], activation, init, &mut *rng)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(NeuralNetwork { layers, loss, output: None })
    }

    /// Build a network from already constructed layers. Consecutive layers
    /// must agree on their shared width.
    pub fn from_layers(layers: Vec<DenseLayer>, loss: LossKind) -> Result<Self> {
        if layers.is_empty() {
            return Err(DqnError::invalid_parameter("layers", "Network needs at least one layer"));
        }
        for pair in layers.windows(2) {
            if pair[0].output_size() != pair[1].input_size() {
                return Err(DqnError::dimension_mismatch(
                    format!("{} inputs", pair[0].output_size()),
                    format!("{} inputs", pair[1].input_size()),
                ));
            }
        }
        Ok(NeuralNetwork { layers, loss, output: None })
    }

    /// Forward pass for a single state, returning its action values.
    pub fn predict(&mut self, input: ArrayView1<f32>) -> Result<Array1<f32>> {
        self.feed(input.insert_axis(Axis(0)))?;
        let output = self.output()?;
        Ok(output.row(0).to_owned())
    }

    /// Save the network to a bincode file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let serialized = bincode::serialize(self)?;
        fs::write(path, serialized)?;
        Ok(())
    }

    /// Load a network saved with [`NeuralNetwork::save`].
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = fs::read(path)?;
        let network: Self = bincode::deserialize(&data)?;
        Ok(network)
    }
}

impl ValueEstimator for NeuralNetwork {
    fn input_size(&self) -> usize {
        self.layers.first().map_or(0, DenseLayer::input_size)
    }

    fn output_size(&self) -> usize {
        self.layers.last().map_or(0, DenseLayer::output_size)
    }

    fn feed(&mut self, states: ArrayView2<f32>) -> Result<()> {
        if states.ncols() != self.input_size() {
            return Err(DqnError::dimension_mismatch(
                format!("{} state features", self.input_size()),
                format!("{} state features", states.ncols()),
            ));
        }
        let mut current_output = states.to_owned();
        for layer in &mut self.layers {
            current_output = layer.forward_batch(current_output.view());
        }
        self.output = Some(current_output);
        Ok(())
    }

    fn output(&self) -> Result<ArrayView2<'_, f32>> {
        self.output
            .as_ref()
            .map(|output| output.view())
            .ok_or_else(|| DqnError::TrainingError("feed() must be called before output()".to_string()))
    }

    fn backpropagate(&mut self, target: ArrayView1<f32>) -> Result<Gradients> {
        let output = self.output()?;
        if output.nrows() != 1 {
            return Err(DqnError::dimension_mismatch(
                "a single fed row".to_string(),
                format!("{} rows", output.nrows()),
            ));
        }
        if target.len() != output.ncols() {
            return Err(DqnError::dimension_mismatch(
                format!("{} target values", output.ncols()),
                format!("{} target values", target.len()),
            ));
        }

        let mut current_error = self
            .loss
            .gradient(output.row(0), target)
            .insert_axis(Axis(0));

        let mut gradients = Vec::with_capacity(self.layers.len());
        for (i, layer) in self.layers.iter().enumerate().rev() {
            let (adjusted_error, weight_gradients, bias_gradients) =
                layer.backward_batch(current_error.view())?;
            if i != 0 {
                current_error = adjusted_error.dot(&layer.weights.t());
            }
            gradients.push(LayerParameters {
                weights: weight_gradients,
                biases: bias_gradients,
            });
        }
        gradients.reverse();

        Ok(Parameters::new(gradients))
    }

    fn parameters(&self) -> Parameters {
        Parameters::new(self.layers.iter().map(DenseLayer::parameters).collect())
    }

    fn set_parameters(&mut self, parameters: Parameters) -> Result<()> {
        let same_layout = parameters.layers.len() == self.layers.len()
            && self.layers.iter().zip(&parameters.layers).all(|(layer, p)| {
                layer.weights.dim() == p.weights.dim() && layer.biases.len() == p.biases.len()
            });
        if !same_layout {
            return Err(DqnError::dimension_mismatch(
                format!("{:?}", self.parameters().shapes()),
                format!("{:?}", parameters.shapes()),
            ));
        }
        for (layer, layer_parameters) in self.layers.iter_mut().zip(parameters.layers) {
            layer.set_parameters(layer_parameters)?;
        }
        Ok(())
    }
}
