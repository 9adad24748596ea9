use myras_core::{inverse_permutation, Result};

use crate::{GradientTape, OperationType, Tensor, TensorOperation};

use super::evaluate;

/// Builds the operation permuting the axes of `operand`.
///
/// When `permutation` is `None` the axes are reversed.
pub fn transpose_op(operand: &Tensor, permutation: Option<Vec<usize>>) -> TensorOperation {
    let backward_permutation = permutation.as_deref().map(inverse_permutation);

    TensorOperation::new(
        OperationType::Transpose,
        vec![operand.clone()],
        move |op| {
            let data = op.input(0)?.data().transpose(permutation.as_deref())?;

            Ok(vec![Tensor::new(data)])
        },
        move |_, node| {
            let gradient = node
                .gradient()
                .transpose(backward_permutation.as_deref())?;

            Ok(vec![Tensor::new(gradient)])
        },
    )
}

/// Permutes the axes of `operand`, recording the operation on `tape`.
pub fn transpose(
    operand: &Tensor,
    permutation: Option<Vec<usize>>,
    tape: Option<&GradientTape>,
) -> Result<Tensor> {
    evaluate(transpose_op(operand, permutation), tape)
}
