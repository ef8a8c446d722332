//! Immutable step snapshots returned by neurons and layers.
//!
//! Every vector is an owned copy taken at the moment the step ran, so later
//! mutation of the neuron never changes a snapshot already handed out.

use serde::Serialize;

/// What a single neuron computed during its forward step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NeuronForwardStep {
    pub neuron_id: String,
    pub inputs: Vec<f64>,
    pub weights: Vec<f64>,
    pub bias: f64,
    /// Pre-activation sum: dot(weights, inputs) + bias
    pub z: f64,
    pub activation: f64,
}

/// What a single neuron computed during its backward step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NeuronBackwardStep {
    pub neuron_id: String,
    /// Upstream gradient w.r.t. this neuron's activation
    pub grad_output: f64,
    /// grad_output * grad_z
    pub delta: f64,
    /// Activation derivative at the cached output
    pub grad_z: f64,
    pub grad_weights: Vec<f64>,
    /// Contribution of this neuron to the gradient w.r.t. its inputs
    pub grad_inputs: Vec<f64>,
    pub grad_bias: f64,
}

/// Parameters of a neuron right after its SGD update.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NeuronUpdateStep {
    pub neuron_id: String,
    pub updated_weights: Vec<f64>,
    pub updated_bias: f64,
}

/// A neuron step tagged with the layer that drove it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerStep<R> {
    pub layer_id: String,
    pub neuron_result: R,
}

pub type LayerForwardStep = LayerStep<NeuronForwardStep>;
pub type LayerBackwardStep = LayerStep<NeuronBackwardStep>;
pub type LayerUpdateStep = LayerStep<NeuronUpdateStep>;
