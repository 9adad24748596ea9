//! The `myras` crate is a minimal deep-learning engine.
//!
//! It is made of a handful of layers, each living in its own crate and re-exported here:
//!
//! * [`Shape`] and [`Matrix`], dense `f32` arrays with broadcasting arithmetic, reductions,
//! products and permutations.
//!
//! * [`Tensor`], an identity bearing handle around a matrix, and the operations in [`ops`]. An
//! operation handed a [`GradientTape`] records itself on it, so that the gradient of a result
//! with respect to any recorded tensor can be computed afterwards.
//!
//! * The [`nn`] module, which declares networks as graphs of input and dense layers and trains
//! them through a [`Model`](nn::Model).
//!
//! * The [`optim`] module, home of the Adam optimizer.
//!
//! * The [`data`] module, which loads, splits, shuffles, scales and batches labelled datasets.
//!
//! # Automatic Differentiation
//!
//! Every operation evaluates eagerly. Gradients are obtained by asking the tape for the
//! derivative of a dependent tensor with respect to a list of independent ones. Contributions
//! flowing into a tensor through several consumers are summed.
//!
//! ```
//! use myras::{ndarray::array, ops, GradientTape, Tensor};
//!
//! let tape = GradientTape::new();
//! let x = Tensor::from_ndarray(array![1., 2., 3.]).unwrap();
//! let w = Tensor::from_ndarray(array![2., 2., 2.]).unwrap();
//!
//! let y = ops::mul(&x, &w, Some(&tape)).unwrap();
//! let z = ops::add(&y, &x, Some(&tape)).unwrap();
//!
//! let gradient = tape.gradient(&z, &x).unwrap();
//! assert_eq!(gradient.data().to_vec(), vec![3., 3., 3.]);
//! ```
//!
//! # Training
//!
//! ```
//! use myras::{
//!     data::XyData,
//!     nn::{init, Activation, LayerGraph, Layers, LossType, Model},
//!     optim::{OptimizerParams, OptimizerType},
//!     Shape,
//! };
//!
//! init::manual_seed(42);
//!
//! let mut graph = LayerGraph::new();
//! let input = Layers::input(&mut graph, Shape::new([1]).unwrap(), 8).unwrap();
//! let hidden = Layers::dense(16, true, Activation::Relu)(&mut graph, input).unwrap();
//! let output = Layers::dense(1, true, Activation::Linear)(&mut graph, hidden).unwrap();
//!
//! let mut model = Model::new(graph, vec![input], vec![output]).unwrap();
//! model
//!     .compile(OptimizerType::Adam, OptimizerParams::default(), LossType::Mse)
//!     .unwrap();
//!
//! let table: Vec<[f32; 2]> = (0..64).map(|i| [i as f32 / 64., (i % 8) as f32 / 8.]).collect();
//! let (train, test) = XyData::convert(&table, 1).unwrap().split(0.75).unwrap();
//!
//! let history = model.fit(&train, &test, 8, 3).unwrap();
//! assert_eq!(history.test_loss.len(), 3);
//! ```
pub use myras_core::{
    ndarray, ConfigError, DataError, Error, GraphError, IndexError, Matrix, ModelError, Result,
    Shape, ShapeError,
};
pub use myras_variable::{ops, GradientTape, OperationType, Tensor, TensorId};

/// Layers, models and weight initializers.
pub mod nn {
    pub use myras_nn::*;
}

/// Optimizers.
pub mod optim {
    pub use myras_optim::*;
}

/// Dataset utilities.
pub mod data {
    pub use myras_data::*;
}
