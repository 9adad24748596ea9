//! Tensors and reverse-mode automatic differentiation.
//!
//! Tensors are identity bearing handles around a [`Matrix`](myras_core::Matrix). The operations
//! in [`ops`] evaluate eagerly and, when handed a [`GradientTape`], record themselves on it so
//! that gradients can later be computed by walking the recorded graph backwards.

mod computation_graph;
mod graph;
mod operation;
mod tape;
mod tensor;
mod utils;

pub mod ops;

pub use crate::{
    computation_graph::{ComputationGraph, ComputationNode, NodeKey, OperationNode, ValueNode},
    graph::{Edge, Graph},
    operation::{BackwardFn, ForwardFn, OperationId, OperationType, TensorOperation},
    tape::{GradientTape, TapePhase},
    tensor::{Tensor, TensorId},
};

pub use petgraph::graph::NodeIndex;
