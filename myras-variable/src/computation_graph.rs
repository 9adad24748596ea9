use std::rc::Rc;

use petgraph::{
    graph::NodeIndex,
    visit::{DfsPostOrder, Reversed},
};

use myras_core::{GraphError, Matrix, Result};

use crate::{
    graph::Graph,
    operation::{OperationId, TensorOperation},
    tensor::{Tensor, TensorId},
};

/// Key of a node of the [`ComputationGraph`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum NodeKey {
    Value(TensorId),
    Operation(OperationId),
}

/// A tensor recorded on the graph, together with the gradient accumulated on it.
#[derive(Debug)]
pub struct ValueNode {
    value: Tensor,
    gradient: Matrix,
}

impl ValueNode {
    /// Creates a node whose gradient is zero filled and shaped like `value`.
    pub fn new(value: Tensor) -> Self {
        let gradient = Matrix::zeros(&value.shape());
        Self { value, gradient }
    }

    pub fn value(&self) -> &Tensor {
        &self.value
    }

    pub fn gradient(&self) -> &Matrix {
        &self.gradient
    }

    /// Sums `gradient` into the accumulated gradient.
    pub(crate) fn accumulate(&mut self, gradient: &Matrix) -> Result<()> {
        self.gradient = (&self.gradient + gradient)?;
        Ok(())
    }

    pub(crate) fn reset(&mut self) {
        self.gradient = Matrix::zeros(self.gradient.shape());
    }

    pub(crate) fn seed(&mut self) {
        self.gradient = Matrix::ones(self.gradient.shape());
    }
}

/// A recorded [`TensorOperation`].
#[derive(Debug)]
pub struct OperationNode {
    operation: Rc<TensorOperation>,
}

impl OperationNode {
    pub fn operation(&self) -> &Rc<TensorOperation> {
        &self.operation
    }
}

#[derive(Debug)]
pub enum ComputationNode {
    Value(ValueNode),
    Operation(OperationNode),
}

/// Graph of value and operation nodes recorded during a forward evaluation.
///
/// Edges go from every input value to its consuming operation, and from every operation to the
/// values it produced. A tensor consumed by several operations has a single value node.
#[derive(Default)]
pub struct ComputationGraph {
    graph: Graph<NodeKey, ComputationNode>,
}

impl ComputationGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn graph(&self) -> &Graph<NodeKey, ComputationNode> {
        &self.graph
    }

    pub fn contains_value(&self, id: TensorId) -> bool {
        self.graph.contains(&NodeKey::Value(id))
    }

    pub fn contains_operation(&self, id: OperationId) -> bool {
        self.graph.contains(&NodeKey::Operation(id))
    }

    /// Inserts a value node for `tensor`, unless one exists already.
    pub fn add_value(&mut self, tensor: &Tensor) -> NodeIndex {
        self.graph
            .get_or_insert_with(NodeKey::Value(tensor.id()), || {
                ComputationNode::Value(ValueNode::new(tensor.clone()))
            })
    }

    /// Inserts an operation node, wiring its inputs and cached outputs.
    ///
    /// Fails if the operation is already part of the graph.
    pub fn add_operation(&mut self, operation: &Rc<TensorOperation>) -> Result<NodeIndex> {
        let key = NodeKey::Operation(operation.id());
        if self.graph.contains(&key) {
            return Err(GraphError::OperationRecordedTwice {
                operation: operation.id().get(),
            }
            .into());
        }

        let inputs: Vec<NodeIndex> = operation
            .inputs()
            .iter()
            .map(|input| self.add_value(input))
            .collect();

        let handle = self.graph.get_or_insert_with(key, || {
            ComputationNode::Operation(OperationNode {
                operation: operation.clone(),
            })
        });

        for input in inputs {
            self.graph.add_edge(input, handle);
        }

        for output in operation.outputs() {
            let output = self.add_value(&output);
            self.graph.add_edge(handle, output);
        }

        Ok(handle)
    }

    /// Returns the handle of the value node of tensor `id`.
    pub fn value_handle(&self, id: TensorId) -> Option<NodeIndex> {
        self.graph.handle(&NodeKey::Value(id))
    }

    pub fn value_node(&self, handle: NodeIndex) -> Option<&ValueNode> {
        match self.graph.node(handle) {
            Some(ComputationNode::Value(node)) => Some(node),
            _ => None,
        }
    }

    pub(crate) fn value_node_mut(&mut self, handle: NodeIndex) -> Option<&mut ValueNode> {
        match self.graph.node_mut(handle) {
            Some(ComputationNode::Value(node)) => Some(node),
            _ => None,
        }
    }

    pub fn operation(&self, handle: NodeIndex) -> Option<&Rc<TensorOperation>> {
        match self.graph.node(handle) {
            Some(ComputationNode::Operation(node)) => Some(node.operation()),
            _ => None,
        }
    }

    /// Returns the operation that produced the value at `handle`, if any.
    pub fn producer(&self, handle: NodeIndex) -> Option<NodeIndex> {
        self.graph
            .predecessors(handle)
            .find(|&predecessor| self.operation(predecessor).is_some())
    }

    /// Handles of the operations from which `handle` can be reached, ordered so that every
    /// operation comes before the ones producing its inputs.
    ///
    /// Every node is visited once, so the walk ends on graphs with cycles as well.
    pub fn backward_order(&self, handle: NodeIndex) -> Vec<NodeIndex> {
        let reversed = Reversed(self.graph.inner());
        let mut dfs = DfsPostOrder::new(reversed, handle);
        let mut order = Vec::new();

        while let Some(node) = dfs.next(reversed) {
            if self.operation(node).is_some() {
                order.push(node);
            }
        }
        order.reverse();

        order
    }

    /// Zeroes the gradient of every value node.
    pub(crate) fn reset_gradients(&mut self) {
        let handles: Vec<NodeIndex> = self.graph.nodes().map(|(handle, _)| handle).collect();
        for handle in handles {
            if let Some(node) = self.value_node_mut(handle) {
                node.reset();
            }
        }
    }

    pub fn clear(&mut self) {
        self.graph.clear();
    }
}
