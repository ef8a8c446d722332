//! Four-phase training state machine
//!
//! [`SteppedNetwork`] runs plain per-sample SGD, one atomic operation per
//! [`SteppedNetwork::step`] call. For every sample it cycles through:
//!
//! 1. `ForwardPropagation`: one neuron forward per step, layers in order
//! 2. `ComputeLoss`: one step comparing the prediction to the expected output
//! 3. `BackwardPropagation`: one neuron backward per step, layers and neurons reversed
//! 4. `WeightUpdate`: one neuron update per step, layers in order
//!
//! After the last update of a sample the network moves to the next sample
//! (and epoch if the dataset is exhausted). Once the epoch limit is reached
//! the next step emits a completion record and any further step fails.
//!
//! # Example
//!
//! ```
//! use stepwise_nn::dataset::Dataset;
//! use stepwise_nn::layers::Layer;
//! use stepwise_nn::network::SteppedNetwork;
//! use stepwise_nn::utils::{Activation, IdGenerator, Loss, SimpleRng};
//!
//! let mut ids = IdGenerator::new();
//! let mut rng = SimpleRng::new(42);
//! let layers = vec![
//!     Layer::dense(&mut ids, 2, 2, Activation::Sigmoid, &mut rng).unwrap(),
//!     Layer::dense(&mut ids, 2, 1, Activation::Sigmoid, &mut rng).unwrap(),
//! ];
//! let data = Dataset::new(vec![vec![0.0, 1.0]], vec![vec![1.0]]).unwrap();
//! let mut net = SteppedNetwork::new(layers, data, Loss::MeanSquaredError, 0.5, 1, &mut ids).unwrap();
//!
//! let mut t = 0;
//! while !net.is_finished() {
//!     net.step(t).unwrap();
//!     t += 1;
//! }
//! // 3 forward + 1 loss + 3 backward + 3 update + 1 completion
//! assert_eq!(t, 11);
//! ```

use serde::Serialize;
use tracing::{debug, info, trace};

use crate::dataset::Dataset;
use crate::error::{NetworkError, Result};
use crate::events::{
    BackwardStep, CompletionEvent, ForwardStep, LossStep, StepRecord, TrainingEvent, UpdateStep,
};
use crate::layers::Layer;
use crate::producer::Producer;
use crate::utils::{IdGenerator, Loss};

/// Macro-stage of the per-sample training cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    ForwardPropagation,
    ComputeLoss,
    BackwardPropagation,
    WeightUpdate,
    /// Terminal: the completion record has been emitted.
    Completed,
}

/// Feed-forward network trained one neuron computation at a time.
#[derive(Debug, Clone)]
pub struct SteppedNetwork {
    producer_id: String,
    layers: Vec<Layer>,
    dataset: Dataset,
    loss: Loss,
    learning_rate: f64,
    epochs: usize,

    epoch: usize,
    sample_index: usize,
    phase: Phase,
    layer_cursor: usize,
    /// Prediction in progress during forward; final prediction during loss.
    current_inputs: Vec<f64>,
    /// Gradient handed to the layer being stepped backward.
    grad_buffer: Vec<f64>,
    last_loss: Option<f64>,

    epoch_loss_sum: f64,
    epoch_losses: Vec<f64>,
}

impl SteppedNetwork {
    /// Build a network over `layers` that trains on `dataset` for `epochs` epochs.
    ///
    /// # Errors
    ///
    /// `Configuration` if `layers` is empty, consecutive layers are not
    /// dimension-compatible, the dataset arity does not match the first layer's
    /// input or the last layer's output, or `learning_rate` is not a finite
    /// positive number.
    ///
    /// Layers are reset and their caches cleared, so a layer stepped before
    /// construction starts training from its first neuron.
    pub fn new(
        mut layers: Vec<Layer>,
        dataset: Dataset,
        loss: Loss,
        learning_rate: f64,
        epochs: usize,
        ids: &mut IdGenerator,
    ) -> Result<Self> {
        validate_layers(&layers)?;

        let input_size = layers[0].input_size();
        if dataset.input_size() != input_size {
            return Err(NetworkError::Configuration(format!(
                "dataset inputs have length {}, first layer expects {}",
                dataset.input_size(),
                input_size
            )));
        }
        let output_size = layers[layers.len() - 1].neuron_count();
        if dataset.output_size() != output_size {
            return Err(NetworkError::Configuration(format!(
                "dataset expected outputs have length {}, last layer produces {}",
                dataset.output_size(),
                output_size
            )));
        }
        if !(learning_rate.is_finite() && learning_rate > 0.0) {
            return Err(NetworkError::Configuration(format!(
                "learning rate must be a positive number, got {}",
                learning_rate
            )));
        }

        for layer in &mut layers {
            layer.reset();
            layer.zero_grad();
        }

        let producer_id = ids.next_producer_id();
        let current_inputs = dataset.input(0).to_vec();
        debug!(
            producer = %producer_id,
            layers = layers.len(),
            samples = dataset.len(),
            loss = loss.name(),
            learning_rate,
            epochs,
            "network constructed"
        );

        Ok(Self {
            producer_id,
            layers,
            dataset,
            loss,
            learning_rate,
            epochs,
            epoch: 0,
            sample_index: 0,
            phase: Phase::ForwardPropagation,
            layer_cursor: 0,
            current_inputs,
            grad_buffer: Vec::new(),
            last_loss: None,
            epoch_loss_sum: 0.0,
            epoch_losses: Vec::new(),
        })
    }

    pub fn producer_id(&self) -> &str {
        &self.producer_id
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn loss(&self) -> Loss {
        self.loss
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    /// Configured epoch limit.
    pub fn epochs(&self) -> usize {
        self.epochs
    }

    /// Current epoch (0-based).
    pub fn epoch(&self) -> usize {
        self.epoch
    }

    pub fn sample_index(&self) -> usize {
        self.sample_index
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn layer_cursor(&self) -> usize {
        self.layer_cursor
    }

    /// Loss of the most recently evaluated sample.
    pub fn last_loss(&self) -> Option<f64> {
        self.last_loss
    }

    /// Mean sample loss of every completed epoch, in order.
    pub fn epoch_losses(&self) -> &[f64] {
        &self.epoch_losses
    }

    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Completed
    }

    /// Perform exactly one atomic operation and describe it.
    ///
    /// # Errors
    ///
    /// `LifecyclePhase` once the completion record has been emitted. Errors
    /// from the layers or the loss propagate unchanged.
    pub fn step(&mut self, timestamp: u64) -> Result<StepRecord> {
        let event = match self.phase {
            Phase::Completed => {
                return Err(NetworkError::LifecyclePhase(format!(
                    "{} stepped after training completed",
                    self.producer_id
                )));
            }
            _ if self.epoch >= self.epochs => self.complete(),
            Phase::ForwardPropagation => self.forward_step()?,
            Phase::ComputeLoss => self.compute_loss()?,
            Phase::BackwardPropagation => self.backward_step()?,
            Phase::WeightUpdate => self.update_step()?,
        };

        trace!(producer = %self.producer_id, timestamp, event = event.kind(), "step");
        Ok(StepRecord {
            timestamp,
            producer_id: self.producer_id.clone(),
            event,
        })
    }

    fn complete(&mut self) -> TrainingEvent {
        self.phase = Phase::Completed;
        info!(
            producer = %self.producer_id,
            epochs = self.epochs,
            final_loss = ?self.last_loss,
            "training complete"
        );
        TrainingEvent::Completion(CompletionEvent {
            final_loss: self.last_loss,
        })
    }

    fn forward_step(&mut self) -> Result<TrainingEvent> {
        let index = self.layer_cursor;
        let layer = &mut self.layers[index];
        let result = layer.forward_step(&self.current_inputs)?;

        if layer.is_complete() {
            self.current_inputs = layer.outputs().to_vec();
            layer.reset();
            self.layer_cursor += 1;
            self.log_layer_done(index);

            if self.layer_cursor >= self.layers.len() {
                self.layer_cursor = 0;
                self.enter(Phase::ComputeLoss);
            }
        }

        Ok(TrainingEvent::ForwardStep(ForwardStep::from_layer_step(
            self.epoch,
            self.sample_index,
            result,
        )))
    }

    fn compute_loss(&mut self) -> Result<TrainingEvent> {
        let expected = self.dataset.expected(self.sample_index);
        let loss = self.loss.compute(&self.current_inputs, expected)?;
        let grad = self.loss.derivative(&self.current_inputs, expected)?;

        let event = LossStep {
            epoch: self.epoch,
            sample_index: self.sample_index,
            predicted: self.current_inputs.clone(),
            expected: expected.to_vec(),
            loss,
            grad_inputs: grad.clone(),
        };

        self.last_loss = Some(loss);
        self.epoch_loss_sum += loss;
        self.grad_buffer = grad;
        self.enter(Phase::BackwardPropagation);

        Ok(TrainingEvent::LossStep(event))
    }

    fn backward_step(&mut self) -> Result<TrainingEvent> {
        let index = self.layers.len() - 1 - self.layer_cursor;
        let layer = &mut self.layers[index];
        let result = layer.backward_step(&self.grad_buffer)?;

        if layer.is_complete() {
            self.grad_buffer = layer.grad_inputs().to_vec();
            layer.reset();
            self.layer_cursor += 1;
            self.log_layer_done(index);

            if self.layer_cursor >= self.layers.len() {
                self.layer_cursor = 0;
                self.enter(Phase::WeightUpdate);
            }
        }

        Ok(TrainingEvent::BackwardStep(BackwardStep::from_layer_step(
            self.epoch,
            self.sample_index,
            result,
        )))
    }

    fn update_step(&mut self) -> Result<TrainingEvent> {
        let index = self.layer_cursor;
        let layer = &mut self.layers[index];
        let result = layer.update_step(self.learning_rate)?;
        // The event belongs to the sample that was just trained, not the next one.
        let event = TrainingEvent::UpdateStep(UpdateStep::from_layer_step(
            self.epoch,
            self.sample_index,
            result,
        ));

        if layer.is_complete() {
            layer.reset();
            self.layer_cursor += 1;
            self.log_layer_done(index);

            if self.layer_cursor >= self.layers.len() {
                self.layer_cursor = 0;
                self.enter(Phase::ForwardPropagation);
                self.advance_sample();
            }
        }

        Ok(event)
    }

    fn log_layer_done(&self, index: usize) {
        debug!(
            producer = %self.producer_id,
            phase = ?self.phase,
            layer = %self.layers[index].id(),
            next_cursor = self.layer_cursor,
            "layer traversal complete"
        );
    }

    fn enter(&mut self, phase: Phase) {
        debug!(
            producer = %self.producer_id,
            epoch = self.epoch,
            sample = self.sample_index,
            from = ?self.phase,
            to = ?phase,
            "phase transition"
        );
        self.phase = phase;
    }

    fn advance_sample(&mut self) {
        self.sample_index += 1;

        if self.sample_index >= self.dataset.len() {
            let mean_loss = self.epoch_loss_sum / self.dataset.len() as f64;
            self.epoch_losses.push(mean_loss);
            self.epoch_loss_sum = 0.0;
            info!(producer = %self.producer_id, epoch = self.epoch, mean_loss, "epoch complete");

            self.epoch += 1;
            self.sample_index = 0;
        }

        self.zero_grad();
        self.current_inputs = self.dataset.input(self.sample_index).to_vec();
    }

    fn zero_grad(&mut self) {
        self.grad_buffer.clear();
        for layer in &mut self.layers {
            layer.zero_grad();
        }
    }

    /// Inference-only forward pass from the current weights.
    ///
    /// Reads parameters only; no cursor, buffer or neuron cache is touched.
    ///
    /// # Errors
    ///
    /// `DimensionMismatch` if `inputs` does not match the first layer's arity.
    pub fn predict(&self, inputs: &[f64]) -> Result<Vec<f64>> {
        let expected = self.layers[0].input_size();
        if inputs.len() != expected {
            return Err(NetworkError::dimension("predict", expected, inputs.len()));
        }

        let mut current = inputs.to_vec();
        for layer in &self.layers {
            current = layer
                .neurons()
                .iter()
                .map(|neuron| neuron.activate(&current))
                .collect::<Result<Vec<f64>>>()?;
        }
        Ok(current)
    }
}

impl Producer for SteppedNetwork {
    type Record = StepRecord;

    fn producer_id(&self) -> &str {
        &self.producer_id
    }

    fn step(&mut self, timestamp: u64) -> Result<StepRecord> {
        SteppedNetwork::step(self, timestamp)
    }

    fn is_finished(&self) -> bool {
        SteppedNetwork::is_finished(self)
    }
}

fn validate_layers(layers: &[Layer]) -> Result<()> {
    if layers.is_empty() {
        return Err(NetworkError::Configuration(
            "network must contain at least one layer".to_string(),
        ));
    }

    for (i, pair) in layers.windows(2).enumerate() {
        let (current, next) = (&pair[0], &pair[1]);
        if current.neuron_count() != next.input_size() {
            return Err(NetworkError::Configuration(format!(
                "layer connection mismatch: layer {} ({}) has {} neurons but layer {} ({}) expects {} inputs",
                i,
                current.id(),
                current.neuron_count(),
                i + 1,
                next.id(),
                next.input_size()
            )));
        }
    }
    Ok(())
}
