//! Layer: an ordered set of neurons stepped one at a time
//!
//! The layer keeps a single cursor that walks its neurons. Forward and update
//! traversals walk them in order; the backward traversal walks them in
//! reverse. Once the cursor reaches the neuron count the layer is complete and
//! refuses further steps until [`Layer::reset`] is called.

use serde::Serialize;
use tracing::trace;

use crate::error::{NetworkError, Result};
use crate::layers::neuron::Neuron;
use crate::layers::results::{LayerBackwardStep, LayerForwardStep, LayerStep, LayerUpdateStep};
use crate::utils::{Activation, IdGenerator, SimpleRng};

/// Kind of traversal a layer is currently in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Pass {
    Forward,
    Backward,
    Update,
}

/// Ordered neurons sharing one input arity, stepped through a single cursor.
#[derive(Debug, Clone)]
pub struct Layer {
    id: String,
    neurons: Vec<Neuron>,
    cursor: usize,
    complete: bool,
    pass: Option<Pass>,
    outputs: Vec<f64>,
    grad_inputs: Vec<f64>,
}

impl Layer {
    /// Create a layer from an ordered, non-empty set of neurons sharing one input arity.
    ///
    /// # Errors
    ///
    /// `Configuration` if `neurons` is empty or the neurons disagree on input arity.
    pub fn new(id: impl Into<String>, neurons: Vec<Neuron>) -> Result<Self> {
        let id = id.into();
        let first = neurons.first().ok_or_else(|| {
            NetworkError::Configuration(format!("{} must contain at least one neuron", id))
        })?;

        let input_size = first.input_size();
        if let Some(odd) = neurons.iter().find(|n| n.input_size() != input_size) {
            return Err(NetworkError::Configuration(format!(
                "{}: neuron {} takes {} inputs, expected {}",
                id,
                odd.id(),
                odd.input_size(),
                input_size
            )));
        }

        Ok(Self {
            id,
            neurons,
            cursor: 0,
            complete: false,
            pass: None,
            outputs: Vec::new(),
            grad_inputs: Vec::new(),
        })
    }

    /// Create a fully connected layer of `num_neurons` randomly initialized neurons.
    ///
    /// Neurons are initialized in order, each drawing its weights then its bias.
    pub fn dense(
        ids: &mut IdGenerator,
        num_inputs: usize,
        num_neurons: usize,
        activation: Activation,
        rng: &mut SimpleRng,
    ) -> Result<Self> {
        let neurons = (0..num_neurons)
            .map(|_| Neuron::new(ids.next_neuron_id(), num_inputs, activation, rng))
            .collect();
        Self::new(ids.next_layer_id(), neurons)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn neurons(&self) -> &[Neuron] {
        &self.neurons
    }

    pub fn neuron_count(&self) -> usize {
        self.neurons.len()
    }

    /// Input arity shared by every neuron of the layer.
    pub fn input_size(&self) -> usize {
        self.neurons[0].input_size()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Traversal currently in progress, if any.
    pub fn pass(&self) -> Option<Pass> {
        self.pass
    }

    /// Activations collected so far in the current forward traversal.
    pub fn outputs(&self) -> &[f64] {
        &self.outputs
    }

    /// Gradient w.r.t. the layer input, summed over the neurons stepped so far.
    pub fn grad_inputs(&self) -> &[f64] {
        &self.grad_inputs
    }

    fn check_step(&self, pass: Pass) -> Result<()> {
        if self.complete {
            return Err(NetworkError::StatePrecondition(format!(
                "{} {:?} traversal has already been completed",
                self.id, pass
            )));
        }
        match self.pass {
            Some(active) if active != pass => Err(NetworkError::StatePrecondition(format!(
                "{} is mid {:?} traversal, cannot step {:?} before reset",
                self.id, active, pass
            ))),
            _ => Ok(()),
        }
    }

    fn advance(&mut self, pass: Pass) {
        self.pass = Some(pass);
        self.cursor += 1;
        if self.cursor >= self.neurons.len() {
            self.complete = true;
        }
    }

    /// Forward exactly the neuron at the cursor.
    pub fn forward_step(&mut self, inputs: &[f64]) -> Result<LayerForwardStep> {
        self.check_step(Pass::Forward)?;

        let result = self.neurons[self.cursor].forward(inputs)?;
        self.outputs.push(result.activation);
        self.advance(Pass::Forward);

        trace!(layer = %self.id, neuron = %result.neuron_id, a = result.activation, "forward step");
        Ok(LayerStep {
            layer_id: self.id.clone(),
            neuron_result: result,
        })
    }

    /// Backward the neuron at the reversed cursor position.
    ///
    /// `grad_outputs` holds one gradient per neuron of this layer; the neuron
    /// at index `count - 1 - cursor` receives the component at that same index.
    ///
    /// # Errors
    ///
    /// `StatePrecondition` if the layer is complete, `DimensionMismatch` if
    /// `grad_outputs` does not have one entry per neuron.
    pub fn backward_step(&mut self, grad_outputs: &[f64]) -> Result<LayerBackwardStep> {
        self.check_step(Pass::Backward)?;
        if grad_outputs.len() != self.neurons.len() {
            return Err(NetworkError::dimension(
                format!("{} backward", self.id),
                self.neurons.len(),
                grad_outputs.len(),
            ));
        }

        let index = self.neurons.len() - 1 - self.cursor;
        let result = self.neurons[index].backward(grad_outputs[index])?;

        if self.grad_inputs.is_empty() {
            self.grad_inputs = vec![0.0; result.grad_inputs.len()];
        }
        for (acc, dx) in self.grad_inputs.iter_mut().zip(&result.grad_inputs) {
            *acc += dx;
        }
        self.advance(Pass::Backward);

        trace!(layer = %self.id, neuron = %result.neuron_id, delta = result.delta, "backward step");
        Ok(LayerStep {
            layer_id: self.id.clone(),
            neuron_result: result,
        })
    }

    /// Apply the SGD update of the neuron at the cursor.
    pub fn update_step(&mut self, learning_rate: f64) -> Result<LayerUpdateStep> {
        self.check_step(Pass::Update)?;

        let result = self.neurons[self.cursor].update(learning_rate)?;
        self.advance(Pass::Update);

        trace!(layer = %self.id, neuron = %result.neuron_id, "update step");
        Ok(LayerStep {
            layer_id: self.id.clone(),
            neuron_result: result,
        })
    }

    /// Clear the layer buffers and every neuron's per-sample caches.
    pub fn zero_grad(&mut self) {
        self.outputs.clear();
        self.grad_inputs.clear();
        for neuron in &mut self.neurons {
            neuron.zero_grad();
        }
    }

    /// Clear the layer buffers and rewind the cursor for the next traversal.
    pub fn reset(&mut self) {
        self.outputs.clear();
        self.grad_inputs.clear();
        self.cursor = 0;
        self.complete = false;
        self.pass = None;
    }
}
