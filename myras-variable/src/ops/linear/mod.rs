use myras_core::Result;

use crate::{GradientTape, OperationType, Tensor, TensorOperation};

use super::evaluate;

/// Builds the identity activation.
///
/// The output is a new tensor holding a copy of the operand's values.
pub fn linear_op(operand: &Tensor) -> TensorOperation {
    TensorOperation::new(
        OperationType::ActivationFunctionLinear,
        vec![operand.clone()],
        |op| Ok(vec![Tensor::new(op.input(0)?.to_matrix())]),
        |_, node| Ok(vec![Tensor::new(node.gradient().clone())]),
    )
}

/// Applies the identity activation, recording the operation on `tape`.
pub fn linear(operand: &Tensor, tape: Option<&GradientTape>) -> Result<Tensor> {
    evaluate(linear_op(operand), tape)
}
