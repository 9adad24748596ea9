use myras_core::{Result, ShapeError};

use crate::{GradientTape, OperationType, Tensor, TensorOperation};

use super::evaluate;

/// Builds the operation computing the dot product of `left` and `right`.
///
/// Both operands must be vectors, giving a `(1)` shaped result, or both matrices.
pub fn dot_op(left: &Tensor, right: &Tensor) -> TensorOperation {
    TensorOperation::new(
        OperationType::DotProduct,
        vec![left.clone(), right.clone()],
        |op| {
            let data = op.input(0)?.data().dot(&op.input(1)?.data())?;

            Ok(vec![Tensor::new(data)])
        },
        |op, node| {
            let (left, right) = (op.input(0)?, op.input(1)?);
            let (left_data, right_data) = (left.data(), right.data());
            let gradient = node.gradient();

            let (left_gradient, right_gradient) = match (left_data.rank(), right_data.rank()) {
                (1, 1) => ((gradient * &*right_data)?, (gradient * &*left_data)?),
                (2, 2) => (
                    gradient.dot(&right_data.t()?)?,
                    left_data.t()?.dot(gradient)?,
                ),
                (left, right) => return Err(ShapeError::DotRanks { left, right }.into()),
            };

            Ok(vec![Tensor::new(left_gradient), Tensor::new(right_gradient)])
        },
    )
}

/// Computes the dot product of `left` and `right`, recording the operation on `tape`.
pub fn dot(left: &Tensor, right: &Tensor, tape: Option<&GradientTape>) -> Result<Tensor> {
    evaluate(dot_op(left, right), tape)
}

#[cfg(test)]
mod test;
