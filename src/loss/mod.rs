//! Loss functions used to turn a supervised Q-value target into an output error.

pub mod functions;

pub use functions::{HuberLoss, Loss, LossKind, MSE};
