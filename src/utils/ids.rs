//! Identity generation for neurons, layers and networks.

/// Hands out readable, per-kind sequential identifiers.
///
/// The generator is owned by whoever builds the network and passed down by
/// mutable reference, so two independently built networks get identical ids
/// when built the same way.
#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    neurons: usize,
    layers: usize,
    producers: usize,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next neuron id: `Neuron_0`, `Neuron_1`, ...
    pub fn next_neuron_id(&mut self) -> String {
        let id = format!("Neuron_{}", self.neurons);
        self.neurons += 1;
        id
    }

    /// Next layer id: `Layer_0`, `Layer_1`, ...
    pub fn next_layer_id(&mut self) -> String {
        let id = format!("Layer_{}", self.layers);
        self.layers += 1;
        id
    }

    /// Next network (producer) id: `SteppedNetwork_0`, ...
    pub fn next_producer_id(&mut self) -> String {
        let id = format!("SteppedNetwork_{}", self.producers);
        self.producers += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_are_per_kind() {
        let mut ids = IdGenerator::new();
        assert_eq!(ids.next_neuron_id(), "Neuron_0");
        assert_eq!(ids.next_neuron_id(), "Neuron_1");
        assert_eq!(ids.next_layer_id(), "Layer_0");
        assert_eq!(ids.next_producer_id(), "SteppedNetwork_0");
        assert_eq!(ids.next_neuron_id(), "Neuron_2");
    }

    #[test]
    fn test_independent_generators() {
        let mut a = IdGenerator::new();
        let mut b = IdGenerator::new();
        a.next_layer_id();
        assert_eq!(b.next_layer_id(), "Layer_0");
        assert_eq!(a.next_layer_id(), "Layer_1");
    }
}
