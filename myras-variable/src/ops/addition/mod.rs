use myras_core::Result;

use crate::{GradientTape, OperationType, Tensor, TensorOperation};

use super::evaluate;

/// Builds the operation computing `left + right`, with broadcasting.
pub fn add_op(left: &Tensor, right: &Tensor) -> TensorOperation {
    TensorOperation::new(
        OperationType::Addition,
        vec![left.clone(), right.clone()],
        |op| {
            let (left, right) = (op.input(0)?, op.input(1)?);
            let data = (&*left.data() + &*right.data())?;

            Ok(vec![Tensor::new(data)])
        },
        |op, node| {
            let (left, right) = (op.input(0)?, op.input(1)?);
            let gradient = node.gradient();

            Ok(vec![
                Tensor::new(gradient.reduce_sum(&left.shape())?),
                Tensor::new(gradient.reduce_sum(&right.shape())?),
            ])
        },
    )
}

/// Computes `left + right`, recording the operation on `tape`.
pub fn add(left: &Tensor, right: &Tensor, tape: Option<&GradientTape>) -> Result<Tensor> {
    evaluate(add_op(left, right), tape)
}
