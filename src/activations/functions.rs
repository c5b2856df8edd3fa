use ndarray::{Array1, Array2, ArrayView2};
use serde::{Serialize, Deserialize};

/// An enumeration of the activation functions a dense layer can apply.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, Default)]
pub enum Activation {
    #[default]
    Relu,
    Linear,
    Sigmoid,
    Tanh,
    LeakyRelu { alpha: f32 },
}

impl Activation {
    /// Apply the activation function to an input array in-place.
    pub fn apply(&self, input: &mut Array1<f32>) {
        let f = self.function();
        input.mapv_inplace(f);
    }

    /// Apply the activation function to a batch of input arrays in-place.
    pub fn apply_batch(&self, inputs: &mut Array2<f32>) {
        if let Activation::Linear = self {
            return;
        }
        let f = self.function();
        inputs.mapv_inplace(f);
    }

    /// Compute the derivative of the activation function for a batch of
    /// pre-activation values.
    pub fn derivative_batch(&self, inputs: ArrayView2<f32>) -> Array2<f32> {
        match self {
            Activation::Relu => {
                inputs.mapv(|v| if v > 0.0 { 1.0 } else { 0.0 })
            }
            Activation::Linear => {
                Array2::ones(inputs.dim())
            }
            Activation::Sigmoid => {
                inputs.mapv(|v| {
                    let sigmoid = 1.0 / (1.0 + (-v).exp());
                    sigmoid * (1.0 - sigmoid)
                })
            }
            Activation::Tanh => {
                inputs.mapv(|v| {
                    let tanh_v = v.tanh();
                    1.0 - tanh_v * tanh_v
                })
            }
            Activation::LeakyRelu { alpha } => {
                let a = *alpha;
                inputs.mapv(|v| if v > 0.0 { 1.0 } else { a })
            }
        }
    }

    fn function(&self) -> impl Fn(f32) -> f32 {
        let activation = *self;
        move |v: f32| match activation {
            Activation::Relu => v.max(0.0),
            Activation::Linear => v,
            Activation::Sigmoid => 1.0 / (1.0 + (-v).exp()),
            Activation::Tanh => v.tanh(),
            Activation::LeakyRelu { alpha } => if v > 0.0 { v } else { alpha * v },
        }
    }
}
