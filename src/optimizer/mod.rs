//! # Optimizers
//!
//! An optimizer maps the current parameters of an estimator and a gradient
//! of the same layout to updated parameters. Any running state (velocity,
//! squared-gradient averages, Adam moments) belongs to the optimizer and is
//! shaped lazily from the first gradient it sees.

use ndarray::{Array, Dimension, Zip};
use serde::{Serialize, Deserialize};

use crate::error::Result;
use crate::estimator::{Gradients, Parameters};

pub trait Optimizer {
    /// Apply one update step and return the new parameters.
    fn optimize(&mut self, parameters: Parameters, gradients: &Gradients) -> Result<Parameters>;
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub enum OptimizerWrapper {
    SGD(SGD),
    Momentum(Momentum),
    RMSProp(RMSProp),
    Adam(Adam),
}

impl Optimizer for OptimizerWrapper {
    fn optimize(&mut self, parameters: Parameters, gradients: &Gradients) -> Result<Parameters> {
        match self {
            OptimizerWrapper::SGD(optimizer) => optimizer.optimize(parameters, gradients),
            OptimizerWrapper::Momentum(optimizer) => optimizer.optimize(parameters, gradients),
            OptimizerWrapper::RMSProp(optimizer) => optimizer.optimize(parameters, gradients),
            OptimizerWrapper::Adam(optimizer) => optimizer.optimize(parameters, gradients),
        }
    }
}

/// Returns the state slot, re-zeroed whenever its layout no longer matches.
fn state_like<'a>(state: &'a mut Option<Parameters>, like: &Parameters) -> &'a mut Parameters {
    let stale = match state {
        Some(existing) => existing.shapes() != like.shapes(),
        None => true,
    };
    if stale {
        *state = Some(like.zeros_like());
    }
    state.get_or_insert_with(|| like.zeros_like())
}

/// Plain gradient descent.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct SGD {
    pub learning_rate: f32,
}

impl SGD {
    pub fn new(learning_rate: f32) -> SGD {
        SGD { learning_rate }
    }
}

impl Default for SGD {
    fn default() -> Self {
        Self::new(0.01)
    }
}

fn sgd_step<D: Dimension>(param: &mut Array<f32, D>, grad: &Array<f32, D>, lr: f32) {
    param.zip_mut_with(grad, |p, &g| *p -= lr * g);
}

impl Optimizer for SGD {
    fn optimize(&mut self, mut parameters: Parameters, gradients: &Gradients) -> Result<Parameters> {
        parameters.check_same_shape(gradients)?;
        for (layer, grad) in parameters.layers.iter_mut().zip(&gradients.layers) {
            sgd_step(&mut layer.weights, &grad.weights, self.learning_rate);
            sgd_step(&mut layer.biases, &grad.biases, self.learning_rate);
        }
        Ok(parameters)
    }
}

/// Gradient descent with a decaying velocity term.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Momentum {
    pub learning_rate: f32,
    pub decay: f32,
    velocity: Option<Parameters>,
}

impl Momentum {
    pub fn new(learning_rate: f32, decay: f32) -> Self {
        Momentum { learning_rate, decay, velocity: None }
    }
}

impl Default for Momentum {
    fn default() -> Self {
        Self::new(0.01, 0.9)
    }
}

fn momentum_step<D: Dimension>(
    param: &mut Array<f32, D>,
    grad: &Array<f32, D>,
    velocity: &mut Array<f32, D>,
    lr: f32,
    decay: f32,
) {
    Zip::from(param).and(grad).and(velocity).for_each(|p, &g, v| {
        *v = decay * *v + g;
        *p -= lr * *v;
    });
}

impl Optimizer for Momentum {
    fn optimize(&mut self, mut parameters: Parameters, gradients: &Gradients) -> Result<Parameters> {
        parameters.check_same_shape(gradients)?;
        let velocity = state_like(&mut self.velocity, gradients);
        for ((layer, grad), v) in parameters
            .layers
            .iter_mut()
            .zip(&gradients.layers)
            .zip(velocity.layers.iter_mut())
        {
            momentum_step(&mut layer.weights, &grad.weights, &mut v.weights, self.learning_rate, self.decay);
            momentum_step(&mut layer.biases, &grad.biases, &mut v.biases, self.learning_rate, self.decay);
        }
        Ok(parameters)
    }
}

/// RMSProp optimizer
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct RMSProp {
    pub learning_rate: f32,
    pub beta: f32,
    pub epsilon: f32,
    cache: Option<Parameters>,
}

impl RMSProp {
    pub fn new(learning_rate: f32, beta: f32, epsilon: f32) -> Self {
        RMSProp { learning_rate, beta, epsilon, cache: None }
    }
}

impl Default for RMSProp {
    fn default() -> Self {
        Self::new(0.001, 0.9, 1e-8)
    }
}

fn rmsprop_step<D: Dimension>(
    param: &mut Array<f32, D>,
    grad: &Array<f32, D>,
    cache: &mut Array<f32, D>,
    config: &RMSProp,
) {
    Zip::from(param).and(grad).and(cache).for_each(|p, &g, c| {
        *c = config.beta * *c + (1.0 - config.beta) * g * g;
        *p -= config.learning_rate * g / (c.sqrt() + config.epsilon);
    });
}

impl Optimizer for RMSProp {
    fn optimize(&mut self, mut parameters: Parameters, gradients: &Gradients) -> Result<Parameters> {
        parameters.check_same_shape(gradients)?;
        let mut cache = self.cache.take();
        let slots = state_like(&mut cache, gradients);
        for ((layer, grad), c) in parameters
            .layers
            .iter_mut()
            .zip(&gradients.layers)
            .zip(slots.layers.iter_mut())
        {
            rmsprop_step(&mut layer.weights, &grad.weights, &mut c.weights, self);
            rmsprop_step(&mut layer.biases, &grad.biases, &mut c.biases, self);
        }
        self.cache = cache;
        Ok(parameters)
    }
}

/// Adam optimizer with bias-corrected moment estimates.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Adam {
    pub learning_rate: f32,
    pub beta1: f32,
    pub beta2: f32,
    pub epsilon: f32,
    /// Number of completed update steps.
    pub t: i32,
    m: Option<Parameters>,
    v: Option<Parameters>,
}

impl Adam {
    pub fn new(learning_rate: f32, beta1: f32, beta2: f32, epsilon: f32) -> Self {
        Adam {
            learning_rate,
            beta1,
            beta2,
            epsilon,
            t: 0,
            m: None,
            v: None,
        }
    }
}

impl Default for Adam {
    fn default() -> Self {
        Self::new(0.001, 0.9, 0.999, 1e-8)
    }
}

struct AdamStep {
    learning_rate: f32,
    beta1: f32,
    beta2: f32,
    epsilon: f32,
    correction1: f32,
    correction2: f32,
}

fn adam_step<D: Dimension>(
    param: &mut Array<f32, D>,
    grad: &Array<f32, D>,
    m: &mut Array<f32, D>,
    v: &mut Array<f32, D>,
    step: &AdamStep,
) {
    Zip::from(param).and(grad).and(m).and(v).for_each(|p, &g, m, v| {
        *m = step.beta1 * *m + (1.0 - step.beta1) * g;
        *v = step.beta2 * *v + (1.0 - step.beta2) * g * g;
        let m_hat = *m / step.correction1;
        let v_hat = *v / step.correction2;
        *p -= step.learning_rate * m_hat / (v_hat.sqrt() + step.epsilon);
    });
}

impl Optimizer for Adam {
    fn optimize(&mut self, mut parameters: Parameters, gradients: &Gradients) -> Result<Parameters> {
        parameters.check_same_shape(gradients)?;
        self.t += 1;
        let step = AdamStep {
            learning_rate: self.learning_rate,
            beta1: self.beta1,
            beta2: self.beta2,
            epsilon: self.epsilon,
            correction1: 1.0 - self.beta1.powi(self.t),
            correction2: 1.0 - self.beta2.powi(self.t),
        };

        let m = state_like(&mut self.m, gradients);
        let v = state_like(&mut self.v, gradients);
        for (((layer, grad), m), v) in parameters
            .layers
            .iter_mut()
            .zip(&gradients.layers)
            .zip(m.layers.iter_mut())
            .zip(v.layers.iter_mut())
        {
            adam_step(&mut layer.weights, &grad.weights, &mut m.weights, &mut v.weights, &step);
            adam_step(&mut layer.biases, &grad.biases, &mut m.biases, &mut v.biases, &step);
        }
        Ok(parameters)
    }
}
