//! Stepwise Neural Network Library
//!
//! This library decomposes the training of a small feed-forward network into
//! atomic steps. Every call to [`network::SteppedNetwork::step`] performs
//! exactly one neuron computation (or one loss evaluation) and returns an
//! immutable record describing what was computed.
//!
//! # Modules
//!
//! - `error`: Error taxonomy shared by every component
//! - `layers`: Neuron and Layer step machinery
//! - `network`: The four-phase training state machine
//! - `events`: Per-step records emitted by the network
//! - `producer`: Seams toward the external scheduler and event sink
//! - `dataset`: Paired input/expected-output samples
//! - `utils`: Activation and loss strategies, RNG, id generation
//! - `config`: Training hyperparameter configuration
//! - `architecture`: Layer layout configuration and network building

pub mod architecture;
pub mod config;
pub mod dataset;
pub mod error;
pub mod events;
pub mod layers;
pub mod network;
pub mod producer;
pub mod utils;

pub use error::{NetworkError, Result};
