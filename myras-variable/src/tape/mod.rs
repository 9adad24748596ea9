use std::{
    cell::{Cell, Ref, RefCell},
    rc::Rc,
};

use petgraph::graph::NodeIndex;
use tracing::{debug_span, trace};

use myras_core::{GraphError, Result};

use crate::{computation_graph::ComputationGraph, operation::TensorOperation, tensor::Tensor};

/// Lifecycle of a [`GradientTape`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TapePhase {
    /// Tensors and operations can be recorded.
    Recording,
    /// Gradients have been requested at least once. Recording is still allowed.
    Backpropagating,
    /// The recorded graph has been released. The tape can no longer be used.
    Disposed,
}

/// Records tensors and operations during a forward evaluation, then computes gradients by
/// traversing the recorded graph in reverse.
///
/// A tape is meant to be scoped to a single batch: dropping it releases the recorded graph, so
/// the graph is released on every exit path, errors included.
///
/// # Examples
///
/// ```
/// use myras_variable::{ops, GradientTape, Tensor};
///
/// let x = Tensor::scalar(3.);
/// let y = Tensor::scalar(2.);
///
/// let tape = GradientTape::new();
/// let z = ops::mul(&x, &y, Some(&tape)).unwrap();
/// let dz_dx = tape.gradient(&z, &x).unwrap();
///
/// assert_eq!(dz_dx.data().to_vec(), vec![2.]);
/// ```
pub struct GradientTape {
    graph: RefCell<ComputationGraph>,
    phase: Cell<TapePhase>,
}

impl GradientTape {
    pub fn new() -> Self {
        Self {
            graph: RefCell::new(ComputationGraph::new()),
            phase: Cell::new(TapePhase::Recording),
        }
    }

    pub fn phase(&self) -> TapePhase {
        self.phase.get()
    }

    /// Borrows the recorded graph.
    pub fn graph(&self) -> Ref<ComputationGraph> {
        self.graph.borrow()
    }

    fn ensure_live(&self) -> Result<()> {
        match self.phase.get() {
            TapePhase::Disposed => Err(GraphError::TapeDisposed.into()),
            _ => Ok(()),
        }
    }

    /// Records a leaf tensor. Recording the same tensor again has no effect.
    pub fn record_tensor(&self, tensor: &Tensor) -> Result<()> {
        self.ensure_live()?;
        self.graph.borrow_mut().add_value(tensor);

        Ok(())
    }

    /// Records an evaluated operation, its inputs and its outputs.
    ///
    /// An operation can be recorded only once.
    pub fn record(&self, operation: &Rc<TensorOperation>) -> Result<()> {
        self.ensure_live()?;
        self.graph.borrow_mut().add_operation(operation)?;
        trace!(operation = %operation, id = %operation.id(), "recorded");

        Ok(())
    }

    /// Computes the gradient of `dependent` with respect to every tensor of `independents`.
    ///
    /// The gradient of `dependent` is seeded with ones. Gradients reaching a value through
    /// several consumers are summed. The result holds one tensor per independent, in the
    /// requested order.
    ///
    /// # Arguments
    ///
    /// * `dependent` - a tensor produced by a recorded operation.
    ///
    /// * `independents` - recorded tensors to differentiate against.
    pub fn gradients(&self, dependent: &Tensor, independents: &[&Tensor]) -> Result<Vec<Tensor>> {
        self.ensure_live()?;
        self.phase.set(TapePhase::Backpropagating);

        let _span = debug_span!("backpropagate", dependent = %dependent.id()).entered();

        let mut graph = self.graph.borrow_mut();
        let not_recorded = |tensor: &Tensor| GraphError::TensorNotRecorded {
            tensor: tensor.id().get(),
        };

        let root = graph
            .value_handle(dependent.id())
            .ok_or_else(|| not_recorded(dependent))?;
        let targets = independents
            .iter()
            .map(|independent| {
                graph
                    .value_handle(independent.id())
                    .ok_or_else(|| not_recorded(independent))
            })
            .collect::<std::result::Result<Vec<NodeIndex>, GraphError>>()?;

        if graph.producer(root).is_none() {
            return Err(GraphError::NoProducer {
                tensor: dependent.id().get(),
            }
            .into());
        }

        graph.reset_gradients();
        if let Some(node) = graph.value_node_mut(root) {
            node.seed();
        }

        for handle in graph.backward_order(root) {
            backpropagate(&mut graph, handle)?;
        }

        targets
            .into_iter()
            .zip(independents)
            .map(|(handle, independent)| {
                graph
                    .value_node(handle)
                    .map(|node| Tensor::new(node.gradient().clone()).with_trainable(false))
                    .ok_or_else(|| not_recorded(independent).into())
            })
            .collect()
    }

    /// Computes the gradient of `dependent` with respect to `independent`.
    pub fn gradient(&self, dependent: &Tensor, independent: &Tensor) -> Result<Tensor> {
        let mut gradients = self.gradients(dependent, &[independent])?;

        gradients.pop().ok_or_else(|| {
            GraphError::TensorNotRecorded {
                tensor: independent.id().get(),
            }
            .into()
        })
    }

    /// Releases the recorded graph. Only the first call has an effect.
    pub fn dispose(&self) {
        if self.phase.get() == TapePhase::Disposed {
            return;
        }

        self.graph.borrow_mut().clear();
        self.phase.set(TapePhase::Disposed);
    }
}

/// Runs the backward function of the operation at `handle` and scatters the resulting gradients
/// onto the value nodes of its inputs.
fn backpropagate(graph: &mut ComputationGraph, handle: NodeIndex) -> Result<()> {
    let operation = match graph.operation(handle) {
        Some(operation) => operation.clone(),
        None => return Ok(()),
    };
    let missing = |tensor: &Tensor| GraphError::MissingValueNode {
        operation: operation.id().get(),
        tensor: tensor.id().get(),
    };

    let outputs = operation.outputs();
    for output in &outputs {
        let node = graph
            .value_handle(output.id())
            .and_then(|output_handle| graph.value_node(output_handle))
            .ok_or_else(|| missing(output))?;
        let gradients = operation.call_derivative(node)?;

        for (input, gradient) in operation.inputs().iter().zip(gradients) {
            // An output aliasing its own input feeds nothing back.
            if outputs.iter().any(|output| output.id() == input.id()) {
                continue;
            }

            let node = graph
                .value_handle(input.id())
                .and_then(|input_handle| graph.value_node_mut(input_handle))
                .ok_or_else(|| missing(input))?;
            node.accumulate(&gradient.data())?;
        }
    }

    Ok(())
}

impl Default for GradientTape {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for GradientTape {
    fn drop(&mut self) {
        self.dispose();
    }
}

// ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~
// ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~ Tests ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~
// ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~
#[cfg(test)]
mod test;
