//! Neuron and layer step machinery
//!
//! A [`Neuron`] performs one forward, backward or update computation per
//! call. A [`Layer`] owns an ordered set of neurons and advances a cursor
//! through them one neuron per step, accumulating the layer-level buffers
//! that the network hands to the next (or previous) layer.

pub mod layer;
pub mod neuron;
pub mod results;

pub use layer::{Layer, Pass};
pub use neuron::Neuron;
pub use results::{
    LayerBackwardStep, LayerForwardStep, LayerStep, LayerUpdateStep, NeuronBackwardStep,
    NeuronForwardStep, NeuronUpdateStep,
};
