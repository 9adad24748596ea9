use std::f32::consts::PI;

use rand::{rngs::StdRng, SeedableRng};
use rand_distr::{Distribution, Normal};

use myras::{
    data::{Scaler, XyData},
    nn::{init, Activation, LayerGraph, Layers, LossType, Model},
    optim::{OptimizerParams, OptimizerType},
    Shape,
};

const BATCH_SIZE: usize = 16;

fn noisy_sine(len: usize, seed: u64) -> XyData {
    let mut generator = StdRng::seed_from_u64(seed);
    let noise = Normal::new(0., 0.05).unwrap();

    let table: Vec<[f32; 2]> = (0..len)
        .map(|i| {
            let x = -PI + 2. * PI * i as f32 / len as f32;
            [x, x.sin() + noise.sample(&mut generator)]
        })
        .collect();

    XyData::convert(&table, 1).unwrap()
}

/// Scaled to `[-1, 1]` on both axes, shuffled and split into train and test sets.
fn sine_sets(len: usize, seed: u64) -> (XyData, XyData) {
    let mut data = noisy_sine(len, seed);
    let x_scaler = Scaler::fit(data.rows().iter().map(|row| row.x[0]), -1., 1.).unwrap();
    let y_scaler = Scaler::fit(data.rows().iter().map(|row| row.y[0]), -1., 1.).unwrap();
    data.scale(&x_scaler, &y_scaler).shuffle_with_seed(seed);

    data.split(0.75).unwrap()
}

/// `input(1) -> dense(16, relu) -> dense(1, linear)`, compiled with Adam and MSE.
fn regressor() -> Model {
    let mut graph = LayerGraph::new();
    let input = Layers::input(&mut graph, Shape::new([1]).unwrap(), BATCH_SIZE).unwrap();
    let hidden = Layers::dense(16, true, Activation::Relu)(&mut graph, input).unwrap();
    let output = Layers::dense(1, true, Activation::Linear)(&mut graph, hidden).unwrap();

    let mut model = Model::new(graph, vec![input], vec![output]).unwrap();
    model
        .compile(
            OptimizerType::Adam,
            OptimizerParams::default().with_learning_rate(1e-2),
            LossType::Mse,
        )
        .unwrap();

    model
}

#[test]
fn training_loss_decreases_over_first_epochs() {
    init::manual_seed(0);
    let (train, test) = sine_sets(256, 0);
    let mut model = regressor();

    let history = model.fit(&train, &test, BATCH_SIZE, 8).unwrap();

    assert!(
        history.train_loss[..4].windows(2).all(|pair| pair[1] < pair[0]),
        "training loss {:?}",
        history.train_loss
    );
}

#[test]
fn sine_regression() {
    init::manual_seed(0);
    let (train, test) = sine_sets(256, 0);
    let mut model = regressor();

    let history = model.fit(&train, &test, BATCH_SIZE, 15).unwrap();

    assert_eq!(history.train_loss.len(), 15);
    assert!(history.train_loss[14] < history.train_loss[0]);
    assert!(history.test_loss.iter().all(|loss| loss.is_finite()));

    let predicted = model.predict(&test, BATCH_SIZE).unwrap();
    assert_eq!(predicted.len(), test.len() / BATCH_SIZE * BATCH_SIZE);
    assert!(predicted
        .rows()
        .iter()
        .all(|row| row.y[0].is_finite()));
}

#[test]
fn frozen_layer_keeps_its_weights() {
    init::manual_seed(1);

    let mut graph = LayerGraph::new();
    let input = Layers::input(&mut graph, Shape::new([1]).unwrap(), BATCH_SIZE).unwrap();
    let frozen = Layers::dense(8, true, Activation::Relu)(&mut graph, input).unwrap();
    let output = Layers::dense(1, true, Activation::Linear)(&mut graph, frozen).unwrap();
    graph
        .layer_mut(frozen)
        .unwrap()
        .base_mut()
        .set_trainable(false);

    let mut model = Model::new(graph, vec![input], vec![output]).unwrap();
    model
        .compile(OptimizerType::Adam, OptimizerParams::default(), LossType::Mse)
        .unwrap();

    let snapshot = |model: &Model, id| -> Vec<Vec<f32>> {
        model
            .layer(id)
            .unwrap()
            .base()
            .weights()
            .map(|weight| weight.data().to_vec())
            .collect()
    };
    let frozen_before = snapshot(&model, frozen);
    let output_before = snapshot(&model, output);

    let (train, test) = noisy_sine(64, 1).split(0.75).unwrap();
    model.fit(&train, &test, BATCH_SIZE, 2).unwrap();

    assert_eq!(snapshot(&model, frozen), frozen_before);
    assert_ne!(snapshot(&model, output), output_before);
}
