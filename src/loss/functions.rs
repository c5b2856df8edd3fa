use ndarray::{Array1, ArrayView1};
use serde::{Serialize, Deserialize};

/// Trait defining the interface for loss functions
pub trait Loss {
    /// Compute the loss for a single prediction and target
    fn compute(&self, prediction: ArrayView1<f32>, target: ArrayView1<f32>) -> f32;

    /// Compute the gradient of the loss with respect to the prediction
    fn gradient(&self, prediction: ArrayView1<f32>, target: ArrayView1<f32>) -> Array1<f32>;
}

/// Mean Squared Error loss
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct MSE;

impl Loss for MSE {
    fn compute(&self, prediction: ArrayView1<f32>, target: ArrayView1<f32>) -> f32 {
        let diff = &prediction - &target;
        (&diff * &diff).sum() / (2.0 * prediction.len() as f32)
    }

    fn gradient(&self, prediction: ArrayView1<f32>, target: ArrayView1<f32>) -> Array1<f32> {
        (&prediction - &target) / prediction.len() as f32
    }
}

/// Huber loss (smooth L1)
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct HuberLoss {
    pub delta: f32,
}

impl HuberLoss {
    pub fn new(delta: f32) -> Self {
        HuberLoss { delta }
    }
}

impl Default for HuberLoss {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl Loss for HuberLoss {
    fn compute(&self, prediction: ArrayView1<f32>, target: ArrayView1<f32>) -> f32 {
        let diff = &prediction - &target;
        diff.mapv(|x| {
            let abs_x = x.abs();
            if abs_x <= self.delta {
                0.5 * x * x
            } else {
                self.delta * abs_x - 0.5 * self.delta * self.delta
            }
        }).sum() / prediction.len() as f32
    }

    fn gradient(&self, prediction: ArrayView1<f32>, target: ArrayView1<f32>) -> Array1<f32> {
        let diff = &prediction - &target;
        diff.mapv(|x| {
            if x.abs() <= self.delta {
                x
            } else {
                self.delta * x.signum()
            }
        }) / prediction.len() as f32
    }
}

/// Serializable choice of loss carried by a network.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub enum LossKind {
    Mse(MSE),
    Huber(HuberLoss),
}

impl Default for LossKind {
    fn default() -> Self {
        LossKind::Huber(HuberLoss::default())
    }
}

impl Loss for LossKind {
    fn compute(&self, prediction: ArrayView1<f32>, target: ArrayView1<f32>) -> f32 {
        match self {
            LossKind::Mse(loss) => loss.compute(prediction, target),
            LossKind::Huber(loss) => loss.compute(prediction, target),
        }
    }

    fn gradient(&self, prediction: ArrayView1<f32>, target: ArrayView1<f32>) -> Array1<f32> {
        match self {
            LossKind::Mse(loss) => loss.gradient(prediction, target),
            LossKind::Huber(loss) => loss.gradient(prediction, target),
        }
    }
}
