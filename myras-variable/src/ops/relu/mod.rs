use myras_core::{Matrix, Result};

use crate::{GradientTape, OperationType, Tensor, TensorOperation};

use super::evaluate;

/// Derivative of the rectifier.
///
/// The rectifier is not differentiable at zero: the derivative there is `NaN`.
fn relu_derivative(x: f32) -> f32 {
    if x > 0. {
        1.
    } else if x < 0. {
        0.
    } else {
        f32::NAN
    }
}

/// Builds the operation computing `max(0, x)` element-wise.
pub fn relu_op(operand: &Tensor) -> TensorOperation {
    TensorOperation::new(
        OperationType::ActivationFunctionRelu,
        vec![operand.clone()],
        |op| Ok(vec![Tensor::new(op.input(0)?.data().map(|x| x.max(0.)))]),
        |op, node| {
            let derivative: Matrix = op.input(0)?.data().map(relu_derivative);
            let gradient = (&derivative * node.gradient())?;

            Ok(vec![Tensor::new(gradient)])
        },
    )
}

/// Computes `max(0, x)` element-wise, recording the operation on `tape`.
pub fn relu(operand: &Tensor, tape: Option<&GradientTape>) -> Result<Tensor> {
    evaluate(relu_op(operand), tape)
}

#[cfg(test)]
mod test;
