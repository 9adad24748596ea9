use std::{
    cell::RefCell,
    fmt,
    sync::atomic::{AtomicUsize, Ordering},
};

use myras_core::{GraphError, Result, ShapeError};

use crate::{computation_graph::ValueNode, Tensor};

static NEXT_OPERATION_ID: AtomicUsize = AtomicUsize::new(0);

/// Process unique identifier of a [`TensorOperation`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OperationId(usize);

impl OperationId {
    fn next() -> Self {
        Self(NEXT_OPERATION_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw value of the identifier.
    pub fn get(self) -> usize {
        self.0
    }
}

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Tag naming what a [`TensorOperation`] computes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum OperationType {
    Input,
    Output,
    Addition,
    Subtraction,
    Multiplication,
    Division,
    SquareRoot,
    DotProduct,
    Transpose,
    LossFunctionMse,
    ActivationFunctionRelu,
    ActivationFunctionLinear,
}

impl OperationType {
    pub fn name(self) -> &'static str {
        match self {
            Self::Input => "INPUT",
            Self::Output => "OUTPUT",
            Self::Addition => "ADDITION",
            Self::Subtraction => "SUBTRACTION",
            Self::Multiplication => "MULTIPLICATION",
            Self::Division => "DIVISION",
            Self::SquareRoot => "SQUARE_ROOT",
            Self::DotProduct => "DOT_PRODUCT",
            Self::Transpose => "TRANSPOSE",
            Self::LossFunctionMse => "LOSS_FUNCTION_MSE",
            Self::ActivationFunctionRelu => "ACTIVATION_FUNCTION_RELU",
            Self::ActivationFunctionLinear => "ACTIVATION_FUNCTION_LINEAR",
        }
    }
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Forward function of a [`TensorOperation`]: computes the outputs from the operation's inputs.
pub type ForwardFn = dyn Fn(&TensorOperation) -> Result<Vec<Tensor>>;

/// Backward function of a [`TensorOperation`]: given the value node of a consumed output, returns
/// one gradient per input, shaped like that input.
pub type BackwardFn = dyn Fn(&TensorOperation, &ValueNode) -> Result<Vec<Tensor>>;

/// A named operation over a fixed list of input tensors.
///
/// Outputs and input gradients are cached by the last call to [`TensorOperation::call`] and
/// [`TensorOperation::call_derivative`] respectively; every call recomputes and overwrites them.
pub struct TensorOperation {
    id: OperationId,
    kind: OperationType,
    inputs: Vec<Tensor>,
    outputs: RefCell<Vec<Tensor>>,
    input_gradients: RefCell<Vec<Tensor>>,
    forward: Box<ForwardFn>,
    backward: Box<BackwardFn>,
}

impl TensorOperation {
    /// Creates a new operation.
    ///
    /// # Arguments
    ///
    /// * `kind` - what the operation computes.
    ///
    /// * `inputs` - ordered input tensors.
    ///
    /// * `forward` - computes the outputs.
    ///
    /// * `backward` - computes the gradient with respect to every input.
    pub fn new<F, B>(kind: OperationType, inputs: Vec<Tensor>, forward: F, backward: B) -> Self
    where
        F: Fn(&TensorOperation) -> Result<Vec<Tensor>> + 'static,
        B: Fn(&TensorOperation, &ValueNode) -> Result<Vec<Tensor>> + 'static,
    {
        let input_gradients = inputs
            .iter()
            .map(|input| Tensor::zeros(&input.shape()))
            .collect();

        Self {
            id: OperationId::next(),
            kind,
            inputs,
            outputs: RefCell::new(Vec::new()),
            input_gradients: RefCell::new(input_gradients),
            forward: Box::new(forward),
            backward: Box::new(backward),
        }
    }

    pub fn id(&self) -> OperationId {
        self.id
    }

    pub fn kind(&self) -> OperationType {
        self.kind
    }

    pub fn inputs(&self) -> &[Tensor] {
        &self.inputs
    }

    /// Returns the input at position `index`.
    pub fn input(&self, index: usize) -> Result<&Tensor> {
        self.inputs.get(index).ok_or_else(|| {
            GraphError::ArityMismatch {
                operation: self.id.get(),
                expected: index + 1,
                got: self.inputs.len(),
            }
            .into()
        })
    }

    /// Outputs cached by the last call, empty if the operation was never called.
    pub fn outputs(&self) -> Vec<Tensor> {
        self.outputs.borrow().clone()
    }

    /// Input gradients cached by the last derivative call, zero filled before that.
    pub fn input_gradients(&self) -> Vec<Tensor> {
        self.input_gradients.borrow().clone()
    }

    /// Evaluates the forward function, caching and returning its outputs.
    pub fn call(&self) -> Result<Vec<Tensor>> {
        let outputs = (self.forward)(self)?;
        *self.outputs.borrow_mut() = outputs.clone();

        Ok(outputs)
    }

    /// Evaluates the forward function, returning its first output.
    pub fn call_single(&self) -> Result<Tensor> {
        self.call()?.into_iter().next().ok_or_else(|| {
            GraphError::ArityMismatch {
                operation: self.id.get(),
                expected: 1,
                got: 0,
            }
            .into()
        })
    }

    /// Evaluates the backward function against the gradient accumulated on `node`, caching and
    /// returning one gradient per input.
    pub fn call_derivative(&self, node: &ValueNode) -> Result<Vec<Tensor>> {
        let gradients = (self.backward)(self, node)?;

        if gradients.len() != self.inputs.len() {
            return Err(GraphError::ArityMismatch {
                operation: self.id.get(),
                expected: self.inputs.len(),
                got: gradients.len(),
            }
            .into());
        }

        for (input, gradient) in self.inputs.iter().zip(&gradients) {
            let (expected, got) = (input.shape(), gradient.shape());
            if expected != got {
                return Err(ShapeError::Mismatch { expected, got }.into());
            }
        }

        *self.input_gradients.borrow_mut() = gradients.clone();
        Ok(gradients)
    }

    /// Evaluates the backward function, returning the gradient of the first input.
    pub fn call_derivative_single(&self, node: &ValueNode) -> Result<Tensor> {
        self.call_derivative(node)?.into_iter().next().ok_or_else(|| {
            GraphError::ArityMismatch {
                operation: self.id.get(),
                expected: 1,
                got: 0,
            }
            .into()
        })
    }
}

impl fmt::Debug for TensorOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TensorOperation")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field(
                "inputs",
                &self.inputs.iter().map(Tensor::id).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl fmt::Display for TensorOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}
