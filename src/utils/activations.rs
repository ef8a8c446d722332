//! Activation functions for neurons
//!
//! Each activation is a pure pair of functions: `compute(z)` maps the
//! pre-activation sum to an output, and `derivative(a)` returns the slope
//! expressed in terms of that output `a`, which is what the backward pass
//! has cached.

use serde::{Deserialize, Serialize};

/// Sigmoid activation function.
///
/// Returns the sigmoid of the input: 1 / (1 + exp(-x))
pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Sigmoid derivative assuming x = sigmoid(z).
///
/// Returns the derivative: x * (1 - x)
pub fn sigmoid_derivative(x: f64) -> f64 {
    x * (1.0 - x)
}

/// Tanh derivative assuming x = tanh(z).
pub fn tanh_derivative(x: f64) -> f64 {
    1.0 - x * x
}

/// ReLU activation function.
pub fn relu(x: f64) -> f64 {
    x.max(0.0)
}

/// ReLU derivative assuming x = relu(z). The kink at zero takes slope 0.
pub fn relu_derivative(x: f64) -> f64 {
    if x > 0.0 {
        1.0
    } else {
        0.0
    }
}

/// Activation strategy attached to a neuron.
///
/// Variants are dispatched by value; there is no per-activation state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activation {
    Sigmoid,
    Tanh,
    #[serde(alias = "re_lu")]
    Relu,
}

impl Activation {
    /// Apply the activation to a pre-activation sum `z`.
    pub fn compute(self, z: f64) -> f64 {
        match self {
            Activation::Sigmoid => sigmoid(z),
            Activation::Tanh => z.tanh(),
            Activation::Relu => relu(z),
        }
    }

    /// Slope of the activation, given its output `a`.
    pub fn derivative(self, a: f64) -> f64 {
        match self {
            Activation::Sigmoid => sigmoid_derivative(a),
            Activation::Tanh => tanh_derivative(a),
            Activation::Relu => relu_derivative(a),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Activation::Sigmoid => "sigmoid",
            Activation::Tanh => "tanh",
            Activation::Relu => "relu",
        }
    }
}
