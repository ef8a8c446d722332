//! Architecture configuration structures
//!
//! This module describes a network layout in JSON (input arity plus one entry
//! per layer) and builds the corresponding layers with freshly initialized
//! neurons.

use serde::Deserialize;
use std::error::Error;
use std::fs;

use crate::error::NetworkError;
use crate::layers::Layer;
use crate::utils::{Activation, IdGenerator, SimpleRng};

/// Configuration for a single fully connected layer.
///
/// ```json
/// { "neurons": 2, "activation": "sigmoid" }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LayerConfig {
    /// Number of neurons (the layer's output arity)
    pub neurons: usize,

    /// "sigmoid", "tanh" or "relu"
    pub activation: Activation,
}

/// Configuration for the entire network.
///
/// Each layer's input arity is the previous layer's neuron count; the first
/// layer takes `input_size` inputs.
///
/// # Example
///
/// ```json
/// {
///   "input_size": 2,
///   "layers": [
///     { "neurons": 2, "activation": "sigmoid" },
///     { "neurons": 1, "activation": "sigmoid" }
///   ]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ArchitectureConfig {
    pub input_size: usize,
    pub layers: Vec<LayerConfig>,
}

impl ArchitectureConfig {
    /// Number of outputs produced by the last layer.
    pub fn output_size(&self) -> Option<usize> {
        self.layers.last().map(|l| l.neurons)
    }
}

/// Loads an architecture configuration from a JSON file.
///
/// # Examples
///
/// ```no_run
/// use stepwise_nn::architecture::load_architecture;
///
/// let arch = load_architecture("config/xor_architecture.json").unwrap();
/// assert!(!arch.layers.is_empty());
/// ```
pub fn load_architecture(path: &str) -> Result<ArchitectureConfig, Box<dyn Error>> {
    let contents = fs::read_to_string(path)?;
    let config: ArchitectureConfig = serde_json::from_str(&contents)?;
    validate_architecture(&config)?;
    Ok(config)
}

/// Validates an architecture configuration.
///
/// Checks that the input arity is positive, there is at least one layer, and
/// every layer has at least one neuron.
pub fn validate_architecture(config: &ArchitectureConfig) -> Result<(), Box<dyn Error>> {
    if config.input_size == 0 {
        return Err(Box::new(NetworkError::Configuration(
            "input_size must be greater than 0".to_string(),
        )));
    }
    if config.layers.is_empty() {
        return Err(Box::new(NetworkError::Configuration(
            "Architecture must have at least one layer".to_string(),
        )));
    }
    if let Some(index) = config.layers.iter().position(|l| l.neurons == 0) {
        return Err(Box::new(NetworkError::Configuration(format!(
            "Layer {}: neurons must be greater than 0",
            index
        ))));
    }
    Ok(())
}

/// Builds the layers described by `config`.
///
/// Neurons draw their parameters from `rng` in layer order, then neuron order.
/// Ids come from `ids`, so a fresh generator and an equally seeded rng always
/// produce the same network.
pub fn build_layers(
    config: &ArchitectureConfig,
    rng: &mut SimpleRng,
    ids: &mut IdGenerator,
) -> Result<Vec<Layer>, Box<dyn Error>> {
    validate_architecture(config)?;

    let mut layers = Vec::with_capacity(config.layers.len());
    let mut num_inputs = config.input_size;
    for layer_config in &config.layers {
        let layer = Layer::dense(ids, num_inputs, layer_config.neurons, layer_config.activation, rng)?;
        num_inputs = layer_config.neurons;
        layers.push(layer);
    }
    Ok(layers)
}
