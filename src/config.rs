//! Configuration structures for training
//!
//! This module provides the hyperparameters the stepping engine is built
//! with: learning rate, epoch limit, loss function and initialization seed.

use serde::Deserialize;
use std::error::Error;
use std::fs;

use crate::error::NetworkError;
use crate::utils::Loss;

pub const DEFAULT_SEED: u64 = 42;

/// Training hyperparameters parsed from JSON.
///
/// # Example
///
/// ```json
/// {
///   "learning_rate": 0.5,
///   "epochs": 2000,
///   "loss": "binary_cross_entropy",
///   "seed": 42
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TrainingConfig {
    /// Plain SGD step size (must be positive)
    pub learning_rate: f64,

    /// Number of full passes over the dataset
    pub epochs: usize,

    /// "mean_squared_error" / "mse" or "binary_cross_entropy" / "bce"
    pub loss: Loss,

    /// Seed for weight initialization (default 42)
    pub seed: Option<u64>,
}

impl TrainingConfig {
    pub fn seed(&self) -> u64 {
        self.seed.unwrap_or(DEFAULT_SEED)
    }
}

/// Loads a training configuration from a JSON file.
///
/// Reads the file at `path` and deserializes its JSON contents into a `TrainingConfig`.
///
/// # Returns
///
/// `Ok(TrainingConfig)` on success, or an error if the file cannot be read, the
/// JSON is invalid, or a value is out of range.
///
/// # Examples
///
/// ```no_run
/// use stepwise_nn::config::load_config;
///
/// let cfg = load_config("config/xor_training.json").unwrap();
/// assert!(cfg.learning_rate > 0.0);
/// ```
pub fn load_config(path: &str) -> Result<TrainingConfig, Box<dyn Error>> {
    let contents = fs::read_to_string(path)?;
    let config: TrainingConfig = serde_json::from_str(&contents)?;
    validate_config(&config)?;
    Ok(config)
}

fn validate_config(config: &TrainingConfig) -> Result<(), Box<dyn Error>> {
    if !(config.learning_rate.is_finite() && config.learning_rate > 0.0) {
        return Err(Box::new(NetworkError::Configuration(format!(
            "learning_rate must be positive, got {}",
            config.learning_rate
        ))));
    }
    Ok(())
}
