use std::env;
use std::error::Error;
use std::process;

use stepwise_nn::architecture::{build_layers, load_architecture, ArchitectureConfig, LayerConfig};
use stepwise_nn::config::{load_config, TrainingConfig};
use stepwise_nn::dataset::Dataset;
use stepwise_nn::events::{StepRecord, TrainingEvent};
use stepwise_nn::network::SteppedNetwork;
use stepwise_nn::producer::{EventSink, Producer};
use stepwise_nn::utils::{Activation, IdGenerator, Loss, SimpleRng};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

// Counts records by kind; per-step detail goes to the debug log.
#[derive(Default)]
struct CountingSink {
    forward: usize,
    loss: usize,
    backward: usize,
    update: usize,
}

impl EventSink<StepRecord> for CountingSink {
    fn publish(&mut self, record: StepRecord) {
        match &record.event {
            TrainingEvent::ForwardStep(_) => self.forward += 1,
            TrainingEvent::LossStep(e) => {
                self.loss += 1;
                debug!(epoch = e.epoch, sample = e.sample_index, loss = e.loss, "loss");
            }
            TrainingEvent::BackwardStep(_) => self.backward += 1,
            TrainingEvent::UpdateStep(_) => self.update += 1,
            TrainingEvent::Completion(e) => info!(final_loss = ?e.final_loss, "completion record"),
        }
    }
}

fn default_training() -> TrainingConfig {
    TrainingConfig {
        learning_rate: 0.5,
        epochs: 2000,
        loss: Loss::BinaryCrossEntropy,
        seed: Some(42),
    }
}

fn default_architecture() -> ArchitectureConfig {
    ArchitectureConfig {
        input_size: 2,
        layers: vec![
            LayerConfig {
                neurons: 2,
                activation: Activation::Sigmoid,
            },
            LayerConfig {
                neurons: 1,
                activation: Activation::Sigmoid,
            },
        ],
    }
}

fn xor_dataset() -> Result<Dataset, Box<dyn Error>> {
    let inputs = vec![
        vec![0.0, 0.0],
        vec![0.0, 1.0],
        vec![1.0, 0.0],
        vec![1.0, 1.0],
    ];
    let expected = vec![vec![0.0], vec![1.0], vec![1.0], vec![0.0]];
    Ok(Dataset::new(inputs, expected)?)
}

fn run() -> Result<(), Box<dyn Error>> {
    let args: Vec<String> = env::args().collect();
    let training = match args.get(1) {
        Some(path) => load_config(path)?,
        None => default_training(),
    };
    let architecture = match args.get(2) {
        Some(path) => load_architecture(path)?,
        None => default_architecture(),
    };

    let mut rng = SimpleRng::new(training.seed());
    let mut ids = IdGenerator::new();
    let layers = build_layers(&architecture, &mut rng, &mut ids)?;
    let data = xor_dataset()?;

    let mut network = SteppedNetwork::new(
        layers,
        data.clone(),
        training.loss,
        training.learning_rate,
        training.epochs,
        &mut ids,
    )?;

    // Logical clock: one tick per step.
    let mut sink = CountingSink::default();
    let mut timestamp = 0u64;
    while !network.is_finished() {
        let record = Producer::step(&mut network, timestamp)?;
        sink.publish(record);
        timestamp += 1;
    }

    info!(
        steps = timestamp,
        forward = sink.forward,
        loss = sink.loss,
        backward = sink.backward,
        update = sink.update,
        "training finished"
    );
    if let (Some(first), Some(last)) = (network.epoch_losses().first(), network.epoch_losses().last()) {
        println!("Mean loss: first epoch {:.6}, last epoch {:.6}", first, last);
    }

    println!("\nTesting the trained network:");
    for (inputs, expected) in data.iter() {
        let predicted = network.predict(inputs)?;
        println!(
            "Input: {:.1}, {:.1}, Expected Output: {:.1}, Predicted Output: {:.3}",
            inputs[0], inputs[1], expected[0], predicted[0]
        );
    }
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(err) = run() {
        eprintln!("error: {}", err);
        process::exit(1);
    }
}
