//! Paired input / expected-output training samples.

use crate::error::{NetworkError, Result};

/// An ordered, non-empty list of samples with consistent input and output arity.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    inputs: Vec<Vec<f64>>,
    expected: Vec<Vec<f64>>,
}

impl Dataset {
    /// Pair `inputs[i]` with `expected[i]`.
    ///
    /// # Errors
    ///
    /// `Configuration` if the two sequences differ in length, are empty, or
    /// contain vectors of inconsistent length.
    pub fn new(inputs: Vec<Vec<f64>>, expected: Vec<Vec<f64>>) -> Result<Self> {
        if inputs.len() != expected.len() {
            return Err(NetworkError::Configuration(format!(
                "inputs and expected outputs must have same dataset size ({} vs {})",
                inputs.len(),
                expected.len()
            )));
        }
        if inputs.is_empty() {
            return Err(NetworkError::Configuration(
                "dataset must contain at least one sample".to_string(),
            ));
        }
        check_uniform(&inputs, "input")?;
        check_uniform(&expected, "expected output")?;

        Ok(Self { inputs, expected })
    }

    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }

    pub fn input(&self, index: usize) -> &[f64] {
        &self.inputs[index]
    }

    pub fn expected(&self, index: usize) -> &[f64] {
        &self.expected[index]
    }

    pub fn input_size(&self) -> usize {
        self.inputs[0].len()
    }

    pub fn output_size(&self) -> usize {
        self.expected[0].len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&[f64], &[f64])> {
        self.inputs
            .iter()
            .zip(&self.expected)
            .map(|(x, y)| (x.as_slice(), y.as_slice()))
    }
}

fn check_uniform(rows: &[Vec<f64>], what: &str) -> Result<()> {
    let width = rows[0].len();
    if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != width) {
        return Err(NetworkError::Configuration(format!(
            "sample {} {} has length {}, expected {}",
            i,
            what,
            row.len(),
            width
        )));
    }
    Ok(())
}
