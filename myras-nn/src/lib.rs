//! Basic building blocks for neural networks.
//!
//! A model is declared as a graph of layers. Layers live in a [`LayerGraph`] and are created and
//! wired with the [`Layers`] factory: [`Layers::input`] adds an entry point, while
//! [`Layers::dense`] returns a binder that appends a fully connected layer after a given one.
//!
//! The graph, together with its input and output layers, is turned into a [`Model`], which can
//! then be compiled with an optimizer and a loss function and trained on a dataset.
//!
//! ```
//! use myras_core::Shape;
//! use myras_nn::{Activation, LayerGraph, Layers, Model};
//! use myras_variable::Tensor;
//!
//! let mut graph = LayerGraph::new();
//! let input = Layers::input(&mut graph, Shape::new([3]).unwrap(), 2).unwrap();
//! let output = Layers::dense(4, true, Activation::Relu)(&mut graph, input).unwrap();
//!
//! let mut model = Model::new(graph, vec![input], vec![output]).unwrap();
//! let x = Tensor::ones(&Shape::new([2, 3]).unwrap());
//! let outputs = model.forward_pass(&[x], None).unwrap();
//!
//! assert_eq!(outputs[0].shape().dimensions(), &[2, 4]);
//! ```
//!
//! Refer to the [`init`] module for the initialization of the weights.
mod activation;
pub mod init;
mod layer;
mod layers;
mod loss;
mod model;

pub use activation::Activation;
pub use layer::{Dense, Input, Layer, LayerBase, LayerId, LayerType};
pub use layers::{LayerBinder, LayerGraph, Layers};
pub use loss::LossType;
pub use model::{History, Model};
