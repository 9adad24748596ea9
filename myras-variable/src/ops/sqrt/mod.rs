use myras_core::Result;

use crate::{GradientTape, OperationType, Tensor, TensorOperation};

use super::evaluate;

/// Builds the operation computing the element-wise square root of `operand`.
pub fn sqrt_op(operand: &Tensor) -> TensorOperation {
    TensorOperation::new(
        OperationType::SquareRoot,
        vec![operand.clone()],
        |op| Ok(vec![Tensor::new(op.input(0)?.data().map(f32::sqrt))]),
        |op, node| {
            let operand = op.input(0)?;
            let gradient = node
                .gradient()
                .element_wise(&operand.data(), |grad_el, data_el| {
                    grad_el / (data_el.sqrt() * 2.)
                })?;

            Ok(vec![Tensor::new(gradient)])
        },
    )
}

/// Computes the element-wise square root of `operand`, recording the operation on `tape`.
pub fn sqrt(operand: &Tensor, tape: Option<&GradientTape>) -> Result<Tensor> {
    evaluate(sqrt_op(operand), tape)
}
