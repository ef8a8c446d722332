//! Single neuron: the atomic compute unit of the stepping engine
//!
//! A neuron owns its weights and bias plus the per-sample caches that the
//! backward and update steps depend on:
//!
//! - `forward` caches the input vector, the pre-activation sum and the output
//! - `backward` caches the weight and bias gradients as a pending update
//! - `update` consumes the pending gradients
//! - `zero_grad` drops every per-sample cache

use crate::error::{NetworkError, Result};
use crate::layers::results::{NeuronBackwardStep, NeuronForwardStep, NeuronUpdateStep};
use crate::utils::{Activation, SimpleRng};

/// Initial weights and bias are drawn uniformly from [-INIT_LIMIT, INIT_LIMIT).
pub const INIT_LIMIT: f64 = 0.5;

/// Gradients produced by `backward` and awaiting `update`.
#[derive(Debug, Clone)]
struct PendingGradient {
    weights: Vec<f64>,
    bias: f64,
}

/// A neuron with a fixed input arity.
///
/// # Example
///
/// ```
/// use stepwise_nn::layers::Neuron;
/// use stepwise_nn::utils::Activation;
///
/// let mut neuron = Neuron::with_parameters("Neuron_0", vec![0.5, -0.5], 0.0, Activation::Sigmoid);
/// let step = neuron.forward(&[1.0, 1.0]).unwrap();
/// assert_eq!(step.z, 0.0);
/// assert_eq!(step.activation, 0.5);
/// ```
#[derive(Debug, Clone)]
pub struct Neuron {
    id: String,
    weights: Vec<f64>,
    bias: f64,
    activation: Activation,

    // Forward cache
    last_inputs: Option<Vec<f64>>,
    last_z: f64,
    last_a: f64,

    // Backward cache
    delta: f64,
    pending: Option<PendingGradient>,
}

impl Neuron {
    /// Create a neuron with `num_inputs` weights drawn from `rng`.
    ///
    /// Weights are drawn first, in order, followed by the bias.
    pub fn new(
        id: impl Into<String>,
        num_inputs: usize,
        activation: Activation,
        rng: &mut SimpleRng,
    ) -> Self {
        let weights = (0..num_inputs)
            .map(|_| rng.gen_range_f64(-INIT_LIMIT, INIT_LIMIT))
            .collect();
        let bias = rng.gen_range_f64(-INIT_LIMIT, INIT_LIMIT);
        Self::with_parameters(id, weights, bias, activation)
    }

    /// Create a neuron with explicit parameters.
    pub fn with_parameters(
        id: impl Into<String>,
        weights: Vec<f64>,
        bias: f64,
        activation: Activation,
    ) -> Self {
        Self {
            id: id.into(),
            weights,
            bias,
            activation,
            last_inputs: None,
            last_z: 0.0,
            last_a: 0.0,
            delta: 0.0,
            pending: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn bias(&self) -> f64 {
        self.bias
    }

    pub fn activation(&self) -> Activation {
        self.activation
    }

    /// Number of inputs this neuron accepts.
    pub fn input_size(&self) -> usize {
        self.weights.len()
    }

    pub fn last_inputs(&self) -> Option<&[f64]> {
        self.last_inputs.as_deref()
    }

    pub fn last_z(&self) -> f64 {
        self.last_z
    }

    pub fn last_activation(&self) -> f64 {
        self.last_a
    }

    pub fn delta(&self) -> f64 {
        self.delta
    }

    /// Weight gradients from the last `backward`, if not yet applied.
    pub fn grad_weights(&self) -> Option<&[f64]> {
        self.pending.as_ref().map(|p| p.weights.as_slice())
    }

    /// Bias gradient from the last `backward`, if not yet applied.
    pub fn grad_bias(&self) -> Option<f64> {
        self.pending.as_ref().map(|p| p.bias)
    }

    /// True when a `backward` has produced gradients that `update` has not consumed.
    pub fn has_pending_update(&self) -> bool {
        self.pending.is_some()
    }

    /// Pre-activation sum for `inputs`. Callers check the arity.
    fn weighted_sum(&self, inputs: &[f64]) -> f64 {
        self.weights
            .iter()
            .zip(inputs)
            .map(|(w, x)| w * x)
            .sum::<f64>()
            + self.bias
    }

    fn check_arity(&self, inputs: &[f64], operation: &str) -> Result<()> {
        if inputs.len() != self.weights.len() {
            return Err(NetworkError::dimension(
                format!("{} {}", self.id, operation),
                self.weights.len(),
                inputs.len(),
            ));
        }
        Ok(())
    }

    /// Compute the activation for `inputs` without touching any cache.
    pub fn activate(&self, inputs: &[f64]) -> Result<f64> {
        self.check_arity(inputs, "activate")?;
        Ok(self.activation.compute(self.weighted_sum(inputs)))
    }

    /// Forward step: z = w·x + b, a = activation(z).
    ///
    /// # Errors
    ///
    /// `DimensionMismatch` if `inputs.len()` differs from the weight count.
    pub fn forward(&mut self, inputs: &[f64]) -> Result<NeuronForwardStep> {
        self.check_arity(inputs, "forward")?;

        let z = self.weighted_sum(inputs);
        let a = self.activation.compute(z);

        self.last_inputs = Some(inputs.to_vec());
        self.last_z = z;
        self.last_a = a;

        Ok(NeuronForwardStep {
            neuron_id: self.id.clone(),
            inputs: inputs.to_vec(),
            weights: self.weights.clone(),
            bias: self.bias,
            z,
            activation: a,
        })
    }

    /// Backward step given the gradient of the loss w.r.t. this neuron's output.
    ///
    /// # Errors
    ///
    /// `StatePrecondition` if no forward input of the right arity is cached.
    pub fn backward(&mut self, gradient: f64) -> Result<NeuronBackwardStep> {
        let inputs = match self.last_inputs.as_deref() {
            Some(inputs) if inputs.len() == self.weights.len() => inputs,
            Some(inputs) => {
                return Err(NetworkError::StatePrecondition(format!(
                    "{} cached {} inputs but has {} weights",
                    self.id,
                    inputs.len(),
                    self.weights.len()
                )))
            }
            None => {
                return Err(NetworkError::StatePrecondition(format!(
                    "{} backward called without a prior forward",
                    self.id
                )))
            }
        };

        let grad_z = self.activation.derivative(self.last_a);
        let delta = gradient * grad_z;
        let grad_weights: Vec<f64> = inputs.iter().map(|x| delta * x).collect();
        let grad_inputs: Vec<f64> = self.weights.iter().map(|w| delta * w).collect();

        self.delta = delta;
        self.pending = Some(PendingGradient {
            weights: grad_weights.clone(),
            bias: delta,
        });

        Ok(NeuronBackwardStep {
            neuron_id: self.id.clone(),
            grad_output: gradient,
            delta,
            grad_z,
            grad_weights,
            grad_inputs,
            grad_bias: delta,
        })
    }

    /// SGD update: w -= lr * dw, b -= lr * db. Consumes the pending gradient.
    ///
    /// # Errors
    ///
    /// `StatePrecondition` if there is no gradient from a preceding `backward`.
    pub fn update(&mut self, learning_rate: f64) -> Result<NeuronUpdateStep> {
        let pending = self.pending.take().ok_or_else(|| {
            NetworkError::StatePrecondition(format!(
                "{} update called without a matching backward",
                self.id
            ))
        })?;

        for (w, dw) in self.weights.iter_mut().zip(&pending.weights) {
            *w -= dw * learning_rate;
        }
        self.bias -= pending.bias * learning_rate;

        Ok(NeuronUpdateStep {
            neuron_id: self.id.clone(),
            updated_weights: self.weights.clone(),
            updated_bias: self.bias,
        })
    }

    /// Drop every per-sample cache ahead of the next sample.
    pub fn zero_grad(&mut self) {
        self.last_inputs = None;
        self.last_z = 0.0;
        self.last_a = 0.0;
        self.delta = 0.0;
        self.pending = None;
    }
}
