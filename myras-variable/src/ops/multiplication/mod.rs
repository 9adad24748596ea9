use myras_core::Result;

use crate::{GradientTape, OperationType, Tensor, TensorOperation};

use super::evaluate;

/// Builds the operation computing the element-wise product `left * right`, with broadcasting.
///
/// The gradient flowing to each operand is the incoming gradient times the other operand,
/// summed back over the dimensions the operand was broadcast along.
pub fn mul_op(left: &Tensor, right: &Tensor) -> TensorOperation {
    TensorOperation::new(
        OperationType::Multiplication,
        vec![left.clone(), right.clone()],
        |op| {
            let (left, right) = (op.input(0)?, op.input(1)?);
            let data = (&*left.data() * &*right.data())?;

            Ok(vec![Tensor::new(data)])
        },
        |op, node| {
            let (left, right) = (op.input(0)?, op.input(1)?);
            let gradient = node.gradient();

            let left_gradient = (gradient * &*right.data())?.reduce_sum(&left.shape())?;
            let right_gradient = (gradient * &*left.data())?.reduce_sum(&right.shape())?;

            Ok(vec![Tensor::new(left_gradient), Tensor::new(right_gradient)])
        },
    )
}

/// Computes `left * right` element-wise, recording the operation on `tape`.
pub fn mul(left: &Tensor, right: &Tensor, tape: Option<&GradientTape>) -> Result<Tensor> {
    evaluate(mul_op(left, right), tape)
}

#[cfg(test)]
mod test;
