//! Error types for the stepping engine.
//!
//! All errors are contract violations reported to the caller immediately.
//! Nothing in the engine retries or recovers; the scheduler driving the
//! engine decides what to do with a failure.

/// Errors raised by neurons, layers, losses and the network engine.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NetworkError {
    /// Invalid construction input (layer layout, dataset, hyperparameters).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A vector passed at call time has the wrong length.
    #[error("dimension mismatch in {context}: expected {expected}, got {actual}")]
    DimensionMismatch {
        context: String,
        expected: usize,
        actual: usize,
    },

    /// An operation was invoked while the component was in the wrong state.
    #[error("state precondition violated: {0}")]
    StatePrecondition(String),

    /// The network was stepped after it reported completion.
    #[error("lifecycle phase violated: {0}")]
    LifecyclePhase(String),
}

impl NetworkError {
    pub(crate) fn dimension(context: impl Into<String>, expected: usize, actual: usize) -> Self {
        NetworkError::DimensionMismatch {
            context: context.into(),
            expected,
            actual,
        }
    }
}

pub type Result<T> = std::result::Result<T, NetworkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimension_message() {
        let err = NetworkError::dimension("Neuron_0 forward", 2, 3);
        assert_eq!(
            err.to_string(),
            "dimension mismatch in Neuron_0 forward: expected 2, got 3"
        );
    }

    #[test]
    fn test_configuration_message() {
        let err = NetworkError::Configuration("empty dataset".to_string());
        assert_eq!(err.to_string(), "configuration error: empty dataset");
    }
}
