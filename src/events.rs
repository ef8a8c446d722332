//! Records emitted by the network, one per step.
//!
//! Each record carries the training position (epoch, sample) at which the
//! step ran plus a copy of every value the step computed. Records serialize
//! to JSON tagged by `event_type`.

use serde::Serialize;

use crate::layers::{LayerBackwardStep, LayerForwardStep, LayerUpdateStep};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForwardStep {
    pub epoch: usize,
    pub sample_index: usize,
    pub layer_id: String,
    pub neuron_id: String,
    pub inputs: Vec<f64>,
    pub weights: Vec<f64>,
    pub bias: f64,
    pub z: f64,
    pub activation: f64,
}

impl ForwardStep {
    pub fn from_layer_step(epoch: usize, sample_index: usize, step: LayerForwardStep) -> Self {
        let neuron = step.neuron_result;
        Self {
            epoch,
            sample_index,
            layer_id: step.layer_id,
            neuron_id: neuron.neuron_id,
            inputs: neuron.inputs,
            weights: neuron.weights,
            bias: neuron.bias,
            z: neuron.z,
            activation: neuron.activation,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LossStep {
    pub epoch: usize,
    pub sample_index: usize,
    pub predicted: Vec<f64>,
    pub expected: Vec<f64>,
    pub loss: f64,
    /// Gradient of the loss w.r.t. each predicted output
    pub grad_inputs: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BackwardStep {
    pub epoch: usize,
    pub sample_index: usize,
    pub layer_id: String,
    pub neuron_id: String,
    pub grad_output: f64,
    pub delta: f64,
    pub grad_z: f64,
    pub grad_weights: Vec<f64>,
    pub grad_inputs: Vec<f64>,
    pub grad_bias: f64,
}

impl BackwardStep {
    pub fn from_layer_step(epoch: usize, sample_index: usize, step: LayerBackwardStep) -> Self {
        let neuron = step.neuron_result;
        Self {
            epoch,
            sample_index,
            layer_id: step.layer_id,
            neuron_id: neuron.neuron_id,
            grad_output: neuron.grad_output,
            delta: neuron.delta,
            grad_z: neuron.grad_z,
            grad_weights: neuron.grad_weights,
            grad_inputs: neuron.grad_inputs,
            grad_bias: neuron.grad_bias,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdateStep {
    pub epoch: usize,
    pub sample_index: usize,
    pub layer_id: String,
    pub neuron_id: String,
    pub updated_weights: Vec<f64>,
    pub updated_bias: f64,
}

impl UpdateStep {
    pub fn from_layer_step(epoch: usize, sample_index: usize, step: LayerUpdateStep) -> Self {
        let neuron = step.neuron_result;
        Self {
            epoch,
            sample_index,
            layer_id: step.layer_id,
            neuron_id: neuron.neuron_id,
            updated_weights: neuron.updated_weights,
            updated_bias: neuron.updated_bias,
        }
    }
}

/// Final record emitted once the epoch limit is reached.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionEvent {
    /// Loss of the last sample evaluated; `None` if no sample was ever evaluated.
    pub final_loss: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum TrainingEvent {
    ForwardStep(ForwardStep),
    LossStep(LossStep),
    BackwardStep(BackwardStep),
    UpdateStep(UpdateStep),
    Completion(CompletionEvent),
}

impl TrainingEvent {
    /// Short name matching the serialized `event_type` tag.
    pub fn kind(&self) -> &'static str {
        match self {
            TrainingEvent::ForwardStep(_) => "forward_step",
            TrainingEvent::LossStep(_) => "loss_step",
            TrainingEvent::BackwardStep(_) => "backward_step",
            TrainingEvent::UpdateStep(_) => "update_step",
            TrainingEvent::Completion(_) => "completion",
        }
    }

    /// `(layer_id, neuron_id)` for per-neuron events.
    pub fn neuron_position(&self) -> Option<(&str, &str)> {
        match self {
            TrainingEvent::ForwardStep(e) => Some((e.layer_id.as_str(), e.neuron_id.as_str())),
            TrainingEvent::BackwardStep(e) => Some((e.layer_id.as_str(), e.neuron_id.as_str())),
            TrainingEvent::UpdateStep(e) => Some((e.layer_id.as_str(), e.neuron_id.as_str())),
            TrainingEvent::LossStep(_) | TrainingEvent::Completion(_) => None,
        }
    }
}

/// A step event stamped by the scheduler and tagged with its producer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepRecord {
    pub timestamp: u64,
    pub producer_id: String,
    #[serde(flatten)]
    pub event: TrainingEvent,
}
