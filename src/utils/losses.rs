//! Loss functions comparing a network prediction against the expected output
//!
//! Both losses average over the output dimension, and both derivatives return
//! one gradient component per output, already divided by that dimension.

use serde::{Deserialize, Serialize};

use crate::error::{NetworkError, Result};

/// Clamp applied to predictions before taking a logarithm in BCE.
pub const BCE_EPSILON: f64 = 1e-12;

/// Loss strategy used by the network's loss phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Loss {
    #[serde(alias = "mse")]
    MeanSquaredError,
    #[serde(alias = "bce")]
    BinaryCrossEntropy,
}

impl Loss {
    /// Scalar loss for one sample.
    ///
    /// # Errors
    ///
    /// `DimensionMismatch` if `predicted` and `expected` differ in length.
    pub fn compute(self, predicted: &[f64], expected: &[f64]) -> Result<f64> {
        check_lengths(self, predicted, expected)?;
        if predicted.is_empty() {
            return Ok(0.0);
        }
        let n = predicted.len() as f64;

        let total: f64 = match self {
            Loss::MeanSquaredError => predicted
                .iter()
                .zip(expected)
                .map(|(p, e)| (p - e) * (p - e))
                .sum(),
            Loss::BinaryCrossEntropy => predicted
                .iter()
                .zip(expected)
                .map(|(&a, &y)| {
                    let a = clamp_probability(a);
                    -(y * a.ln() + (1.0 - y) * (1.0 - a).ln())
                })
                .sum(),
        };

        Ok(total / n)
    }

    /// Gradient of the loss with respect to each predicted component.
    ///
    /// # Errors
    ///
    /// `DimensionMismatch` if `predicted` and `expected` differ in length.
    pub fn derivative(self, predicted: &[f64], expected: &[f64]) -> Result<Vec<f64>> {
        check_lengths(self, predicted, expected)?;
        let n = predicted.len() as f64;

        let gradients: Vec<f64> = match self {
            Loss::MeanSquaredError => predicted
                .iter()
                .zip(expected)
                .map(|(p, e)| 2.0 * (p - e) / n)
                .collect(),
            Loss::BinaryCrossEntropy => predicted
                .iter()
                .zip(expected)
                .map(|(&a, &y)| {
                    let a = clamp_probability(a);
                    (-(y / a) + (1.0 - y) / (1.0 - a)) / n
                })
                .collect(),
        };

        Ok(gradients)
    }

    pub fn name(self) -> &'static str {
        match self {
            Loss::MeanSquaredError => "mean_squared_error",
            Loss::BinaryCrossEntropy => "binary_cross_entropy",
        }
    }
}

fn clamp_probability(a: f64) -> f64 {
    a.clamp(BCE_EPSILON, 1.0 - BCE_EPSILON)
}

fn check_lengths(loss: Loss, predicted: &[f64], expected: &[f64]) -> Result<()> {
    if predicted.len() != expected.len() {
        return Err(NetworkError::dimension(
            format!("{} predicted/expected", loss.name()),
            expected.len(),
            predicted.len(),
        ));
    }
    Ok(())
}
