use myras_core::Result;

use crate::{GradientTape, OperationType, Tensor, TensorOperation};

use super::evaluate;

/// Builds the operation computing the element-wise quotient `left / right`, with broadcasting.
pub fn div_op(left: &Tensor, right: &Tensor) -> TensorOperation {
    TensorOperation::new(
        OperationType::Division,
        vec![left.clone(), right.clone()],
        |op| {
            let (left, right) = (op.input(0)?, op.input(1)?);
            let data = (&*left.data() / &*right.data())?;

            Ok(vec![Tensor::new(data)])
        },
        |op, node| {
            let (left, right) = (op.input(0)?, op.input(1)?);
            let (left_data, right_data) = (left.data(), right.data());
            let gradient = node.gradient();

            // d(l / r) / dl = 1 / r
            let left_gradient = (gradient / &*right_data)?.reduce_sum(&left.shape())?;

            // d(l / r) / dr = -l / r^2
            let squared = (&*right_data * &*right_data)?;
            let right_gradient = (&(&-&*left_data / &squared)? * gradient)?
                .reduce_sum(&right.shape())?;

            Ok(vec![Tensor::new(left_gradient), Tensor::new(right_gradient)])
        },
    )
}

/// Computes `left / right` element-wise, recording the operation on `tape`.
pub fn div(left: &Tensor, right: &Tensor, tape: Option<&GradientTape>) -> Result<Tensor> {
    evaluate(div_op(left, right), tape)
}

#[cfg(test)]
mod test;
