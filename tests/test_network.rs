//! Tests for the SteppedNetwork phase engine
//!
//! - Event stream shape for one sample
//! - Backward order is the exact reverse of the preceding forward order
//! - Training position bookkeeping across samples and epochs
//! - Lifecycle and configuration errors
//! - Reproducibility and predict/forward agreement

use approx::assert_relative_eq;
use stepwise_nn::dataset::Dataset;
use stepwise_nn::events::{StepRecord, TrainingEvent};
use stepwise_nn::layers::Layer;
use stepwise_nn::network::{Phase, SteppedNetwork};
use stepwise_nn::producer::{EventSink, Producer};
use stepwise_nn::utils::{Activation, IdGenerator, Loss, SimpleRng};
use stepwise_nn::NetworkError;

fn xor() -> Dataset {
    Dataset::new(
        vec![
            vec![0.0, 0.0],
            vec![0.0, 1.0],
            vec![1.0, 0.0],
            vec![1.0, 1.0],
        ],
        vec![vec![0.0], vec![1.0], vec![1.0], vec![0.0]],
    )
    .unwrap()
}

/// 2 inputs -> 3 tanh -> 2 sigmoid -> 1 sigmoid
fn deep_network(seed: u64, epochs: usize) -> SteppedNetwork {
    let mut ids = IdGenerator::new();
    let mut rng = SimpleRng::new(seed);
    let layers = vec![
        Layer::dense(&mut ids, 2, 3, Activation::Tanh, &mut rng).unwrap(),
        Layer::dense(&mut ids, 3, 2, Activation::Sigmoid, &mut rng).unwrap(),
        Layer::dense(&mut ids, 2, 1, Activation::Sigmoid, &mut rng).unwrap(),
    ];
    SteppedNetwork::new(layers, xor(), Loss::BinaryCrossEntropy, 0.3, epochs, &mut ids).unwrap()
}

fn run_all(net: &mut SteppedNetwork) -> Vec<StepRecord> {
    let mut sink: Vec<StepRecord> = Vec::new();
    let mut t = 0;
    while !net.is_finished() {
        sink.publish(net.step(t).unwrap());
        t += 1;
    }
    sink
}

// 6 neurons: 6 forward + 1 loss + 6 backward + 6 update
const STEPS_PER_SAMPLE: usize = 19;

mod stream_tests {
    use super::*;

    #[test]
    fn test_one_sample_stream_shape() {
        let mut net = deep_network(1, 1);
        let kinds: Vec<&str> = (0..STEPS_PER_SAMPLE as u64)
            .map(|t| net.step(t).unwrap().event.kind())
            .collect();

        let mut expected = vec!["forward_step"; 6];
        expected.push("loss_step");
        expected.extend(vec!["backward_step"; 6]);
        expected.extend(vec!["update_step"; 6]);
        assert_eq!(kinds, expected);
        assert_eq!(net.phase(), Phase::ForwardPropagation);
        assert_eq!(net.sample_index(), 1);
    }

    #[test]
    fn test_backward_is_reverse_of_forward() {
        let mut net = deep_network(2, 1);
        let records: Vec<StepRecord> = (0..STEPS_PER_SAMPLE as u64)
            .map(|t| net.step(t).unwrap())
            .collect();

        let positions = |kind: &str| -> Vec<(String, String)> {
            records
                .iter()
                .filter(|r| r.event.kind() == kind)
                .filter_map(|r| r.event.neuron_position())
                .map(|(l, n)| (l.to_string(), n.to_string()))
                .collect()
        };

        let forward = positions("forward_step");
        let mut backward = positions("backward_step");
        let update = positions("update_step");
        assert_eq!(forward.len(), 6);

        backward.reverse();
        assert_eq!(forward, backward);
        assert_eq!(forward, update);
    }

    #[test]
    fn test_loss_step_uses_last_forward_outputs() {
        let mut net = deep_network(3, 1);
        let records: Vec<StepRecord> = (0..7).map(|t| net.step(t).unwrap()).collect();

        let last_forward = match &records[5].event {
            TrainingEvent::ForwardStep(e) => e.clone(),
            other => panic!("expected forward step, got {:?}", other),
        };
        match &records[6].event {
            TrainingEvent::LossStep(e) => {
                assert_eq!(e.predicted, vec![last_forward.activation]);
                assert_eq!(e.expected, vec![0.0]);
                assert_eq!(e.grad_inputs.len(), 1);
                assert_eq!(net.last_loss(), Some(e.loss));
            }
            other => panic!("expected loss step, got {:?}", other),
        }
        assert_eq!(net.phase(), Phase::BackwardPropagation);
    }

    #[test]
    fn test_forward_inputs_chain_between_layers() {
        let mut net = deep_network(4, 1);
        let forwards: Vec<_> = (0..6)
            .map(|t| match net.step(t).unwrap().event {
                TrainingEvent::ForwardStep(e) => e,
                other => panic!("unexpected {:?}", other),
            })
            .collect();

        // first layer sees the raw sample
        for e in &forwards[0..3] {
            assert_eq!(e.inputs, vec![0.0, 0.0]);
        }
        // second layer sees the first layer's activations
        let first_outputs: Vec<f64> = forwards[0..3].iter().map(|e| e.activation).collect();
        for e in &forwards[3..5] {
            assert_eq!(e.inputs, first_outputs);
        }
        let second_outputs: Vec<f64> = forwards[3..5].iter().map(|e| e.activation).collect();
        assert_eq!(forwards[5].inputs, second_outputs);
    }

    #[test]
    fn test_backward_gradient_handoff() {
        let mut net = deep_network(5, 1);
        let records: Vec<StepRecord> = (0..13).map(|t| net.step(t).unwrap()).collect();
        let backward: Vec<_> = records[7..13]
            .iter()
            .map(|r| match &r.event {
                TrainingEvent::BackwardStep(e) => e.clone(),
                other => panic!("unexpected {:?}", other),
            })
            .collect();

        // output neuron's grad_inputs become the upstream gradients of layer 2,
        // visited in reverse neuron order
        let out_grad = &backward[0].grad_inputs;
        assert_eq!(backward[1].grad_output, out_grad[1]);
        assert_eq!(backward[2].grad_output, out_grad[0]);

        // layer 2's summed grad_inputs feed layer 1
        for i in 0..3 {
            let summed = backward[1].grad_inputs[i] + backward[2].grad_inputs[i];
            let received = backward[3 + (2 - i)].grad_output;
            assert_relative_eq!(received, summed, epsilon = 1e-15);
        }
    }
}

mod position_tests {
    use super::*;

    #[test]
    fn test_sample_and_epoch_tagging() {
        let mut net = deep_network(6, 2);
        let records = run_all(&mut net);
        assert_eq!(records.len(), 2 * 4 * STEPS_PER_SAMPLE + 1);

        for (i, record) in records[..records.len() - 1].iter().enumerate() {
            let sample = (i / STEPS_PER_SAMPLE) % 4;
            let epoch = i / (4 * STEPS_PER_SAMPLE);
            let (e, s) = match &record.event {
                TrainingEvent::ForwardStep(x) => (x.epoch, x.sample_index),
                TrainingEvent::LossStep(x) => (x.epoch, x.sample_index),
                TrainingEvent::BackwardStep(x) => (x.epoch, x.sample_index),
                TrainingEvent::UpdateStep(x) => (x.epoch, x.sample_index),
                TrainingEvent::Completion(_) => panic!("completion before the end"),
            };
            assert_eq!((e, s), (epoch, sample), "record {}", i);
        }
        assert_eq!(net.epoch(), 2);
        assert_eq!(net.epoch_losses().len(), 2);
    }

    #[test]
    fn test_timestamps_and_producer_id_carried() {
        let mut net = deep_network(7, 1);
        let record = net.step(41).unwrap();
        assert_eq!(record.timestamp, 41);
        assert_eq!(record.producer_id, "SteppedNetwork_0");
        assert_eq!(Producer::producer_id(&net), "SteppedNetwork_0");
    }

    #[test]
    fn test_completion_carries_last_loss() {
        let mut net = deep_network(8, 1);
        let records = run_all(&mut net);
        let last_loss = records
            .iter()
            .rev()
            .find_map(|r| match &r.event {
                TrainingEvent::LossStep(e) => Some(e.loss),
                _ => None,
            })
            .unwrap();
        match &records.last().unwrap().event {
            TrainingEvent::Completion(c) => assert_eq!(c.final_loss, Some(last_loss)),
            other => panic!("expected completion, got {:?}", other),
        }
    }

    #[test]
    fn test_caches_cleared_between_samples() {
        let mut net = deep_network(9, 1);
        for t in 0..STEPS_PER_SAMPLE as u64 {
            net.step(t).unwrap();
        }
        for layer in net.layers() {
            assert_eq!(layer.cursor(), 0);
            for neuron in layer.neurons() {
                assert!(neuron.last_inputs().is_none());
                assert!(!neuron.has_pending_update());
                assert_eq!(neuron.delta(), 0.0);
            }
        }
    }
}

mod lifecycle_tests {
    use super::*;
    use stepwise_nn::layers::Neuron;

    #[test]
    fn test_partially_stepped_layer_starts_from_first_neuron() {
        let mut first = Layer::new(
            "L0",
            vec![
                Neuron::with_parameters("a", vec![1.0, 0.0], 0.0, Activation::Sigmoid),
                Neuron::with_parameters("b", vec![0.0, 1.0], 0.0, Activation::Sigmoid),
            ],
        )
        .unwrap();
        let second = Layer::new(
            "L1",
            vec![Neuron::with_parameters("c", vec![1.0, 1.0], 0.0, Activation::Sigmoid)],
        )
        .unwrap();
        // leaves a cursor and a cached output behind
        first.forward_step(&[100.0, 0.0]).unwrap();

        let data = Dataset::new(vec![vec![0.0, 0.0]], vec![vec![1.0]]).unwrap();
        let mut ids = IdGenerator::new();
        let mut net = SteppedNetwork::new(
            vec![first, second],
            data,
            Loss::MeanSquaredError,
            0.1,
            1,
            &mut ids,
        )
        .unwrap();
        assert!(net.layers().iter().all(|l| l.cursor() == 0 && l.pass().is_none()));
        let predicted = net.predict(&[0.0, 0.0]).unwrap();

        let mut forward = Vec::new();
        let mut t = 0;
        while net.phase() == Phase::ForwardPropagation {
            if let TrainingEvent::ForwardStep(e) = net.step(t).unwrap().event {
                forward.push((e.neuron_id, e.inputs, e.activation));
            }
            t += 1;
        }

        let visited: Vec<&str> = forward.iter().map(|(id, _, _)| id.as_str()).collect();
        assert_eq!(visited, vec!["a", "b", "c"]);
        assert_eq!(forward[2].1, vec![0.5, 0.5]);
        assert_relative_eq!(forward[2].2, predicted[0], epsilon = 1e-15);
    }

    #[test]
    fn test_step_after_finish_fails() {
        let mut net = deep_network(10, 1);
        run_all(&mut net);
        assert!(net.is_finished());
        assert_eq!(net.phase(), Phase::Completed);
        assert!(matches!(net.step(0), Err(NetworkError::LifecyclePhase(_))));
        assert!(matches!(net.step(1), Err(NetworkError::LifecyclePhase(_))));
    }

    #[test]
    fn test_unequal_dataset_rejected_before_any_step() {
        let result = Dataset::new(vec![vec![0.0, 0.0], vec![1.0, 1.0]], vec![vec![0.0]]);
        assert!(matches!(result, Err(NetworkError::Configuration(_))));
    }

    #[test]
    fn test_dataset_arity_checked_against_layers() {
        let mut ids = IdGenerator::new();
        let mut rng = SimpleRng::new(1);
        let layers = vec![Layer::dense(&mut ids, 3, 1, Activation::Sigmoid, &mut rng).unwrap()];
        let err = SteppedNetwork::new(layers, xor(), Loss::MeanSquaredError, 0.1, 1, &mut ids)
            .unwrap_err();
        assert!(matches!(err, NetworkError::Configuration(_)));

        let layers = vec![Layer::dense(&mut ids, 2, 2, Activation::Sigmoid, &mut rng).unwrap()];
        let err = SteppedNetwork::new(layers, xor(), Loss::MeanSquaredError, 0.1, 1, &mut ids)
            .unwrap_err();
        assert!(matches!(err, NetworkError::Configuration(_)));
    }

    #[test]
    fn test_empty_layer_list_rejected() {
        let mut ids = IdGenerator::new();
        let err = SteppedNetwork::new(vec![], xor(), Loss::MeanSquaredError, 0.1, 1, &mut ids)
            .unwrap_err();
        assert!(matches!(err, NetworkError::Configuration(_)));
    }
}

mod determinism_tests {
    use super::*;

    #[test]
    fn test_same_seed_same_stream() {
        let a = run_all(&mut deep_network(11, 3));
        let b = run_all(&mut deep_network(11, 3));
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_seed_different_stream() {
        let a = run_all(&mut deep_network(11, 1));
        let b = run_all(&mut deep_network(12, 1));
        assert_ne!(a, b);
    }

    #[test]
    fn test_predict_matches_forward_step() {
        let mut net = deep_network(13, 2);
        // train for a while, then stop at a sample boundary
        for t in 0..(5 * STEPS_PER_SAMPLE) as u64 {
            net.step(t).unwrap();
        }
        // sample 1 of epoch 1 is next
        let predicted = net.predict(net.dataset().input(1)).unwrap();

        let mut last_activation = None;
        for t in 0..6 {
            if let TrainingEvent::ForwardStep(e) = net.step(1000 + t).unwrap().event {
                last_activation = Some(e.activation);
            }
        }
        assert_relative_eq!(predicted[0], last_activation.unwrap(), epsilon = 1e-12);
    }

    #[test]
    fn test_predict_dimension_mismatch() {
        let net = deep_network(14, 1);
        assert!(matches!(
            net.predict(&[1.0]),
            Err(NetworkError::DimensionMismatch { expected: 2, actual: 1, .. })
        ));
    }
}
