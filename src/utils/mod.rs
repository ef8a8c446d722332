//! Shared utilities for the stepping engine
//!
//! This module provides the activation and loss strategies, a seeded random
//! number generator for weight initialization, and the identity generator
//! used to name neurons, layers and networks.

pub mod activations;
pub mod ids;
pub mod losses;
pub mod rng;

pub use activations::Activation;
pub use ids::IdGenerator;
pub use losses::Loss;
pub use rng::SimpleRng;
