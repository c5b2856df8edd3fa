//! # Activation Functions Module
//!
//! Element-wise non-linearities applied by dense layers.
//!
//! ## Available Activations
//!
//! - **ReLU**: `max(0, x)`
//! - **LeakyReLU**: ReLU with a small negative slope, the default for hidden
//!   layers of a Q-network
//! - **Linear**: identity, the default for the Q-value output layer
//! - **Sigmoid**: `1 / (1 + e^(-x))`
//! - **Tanh**: hyperbolic tangent
//!
//! ## Usage Example
//!
//! ```rust
//! use deepq::activations::Activation;
//! use ndarray::array;
//!
//! let leaky_relu = Activation::LeakyRelu { alpha: 0.01 };
//! let mut data = array![1.0, -0.5, 0.0, 2.0];
//! leaky_relu.apply(&mut data);
//! assert_eq!(data[1], -0.005);
//! ```

pub mod functions;

pub use functions::Activation;
