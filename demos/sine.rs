//! Fits a dense network to a noisy sine wave.
//!
//! Run with `RUST_LOG=info cargo run --example sine` to follow the training.
use std::{error::Error, f32::consts::PI};

use rand::{rngs::StdRng, SeedableRng};
use rand_distr::{Distribution, Normal};
use tracing::info;
use tracing_subscriber::EnvFilter;

use myras::{
    data::{Scaler, XyData},
    nn::{Activation, LayerGraph, Layers, LossType, Model},
    optim::{OptimizerParams, OptimizerType},
    Shape,
};

const SAMPLES: usize = 1500;
const BATCH_SIZE: usize = 32;
const EPOCHS: usize = 100;

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut generator = StdRng::seed_from_u64(0);
    let noise = Normal::new(0., 0.05)?;
    let table: Vec<[f32; 2]> = (0..SAMPLES)
        .map(|i| {
            let x = -2. * PI + 4. * PI * i as f32 / (SAMPLES - 1) as f32;
            [x, x.sin() + noise.sample(&mut generator)]
        })
        .collect();

    let mut data = XyData::convert(&table, 1)?;
    let x_scaler = Scaler::fit(data.rows().iter().map(|row| row.x[0]), -1., 1.)?;
    let y_scaler = Scaler::fit(data.rows().iter().map(|row| row.y[0]), -1., 1.)?;
    data.scale(&x_scaler, &y_scaler).shuffle();
    let (train, test) = data.split(0.75)?;

    let mut graph = LayerGraph::new();
    let input = Layers::input(&mut graph, Shape::new([1])?, BATCH_SIZE)?;
    let hidden = Layers::dense(50, true, Activation::Relu)(&mut graph, input)?;
    let hidden = Layers::dense(100, true, Activation::Relu)(&mut graph, hidden)?;
    let hidden = Layers::dense(200, true, Activation::Relu)(&mut graph, hidden)?;
    let output = Layers::dense(1, true, Activation::Linear)(&mut graph, hidden)?;

    let mut model = Model::new(graph, vec![input], vec![output])?;
    model.compile(
        OptimizerType::Adam,
        OptimizerParams::default().with_learning_rate(1e-3),
        LossType::Mse,
    )?;

    let history = model.fit(&train, &test, BATCH_SIZE, EPOCHS)?;
    if let (Some(train_loss), Some(test_loss)) =
        (history.train_loss.last(), history.test_loss.last())
    {
        info!(train_loss, test_loss, "final losses");
    }

    let predicted = model.predict(&test, BATCH_SIZE)?;
    for (row, predicted) in test.rows().iter().zip(predicted.rows()).take(20) {
        println!(
            "x = {:>8.4}    target = {:>8.4}    predicted = {:>8.4}",
            x_scaler.scale_back(row.x[0]),
            y_scaler.scale_back(row.y[0]),
            y_scaler.scale_back(predicted.y[0]),
        );
    }

    Ok(())
}
