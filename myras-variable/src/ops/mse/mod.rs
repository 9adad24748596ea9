use myras_core::Result;

use crate::{GradientTape, OperationType, Tensor, TensorOperation};

use super::evaluate;

/// Builds the operation computing the mean squared error between `predicted` and `target`.
///
/// The result has shape `(1)`.
pub fn mse_op(predicted: &Tensor, target: &Tensor) -> TensorOperation {
    TensorOperation::new(
        OperationType::LossFunctionMse,
        vec![predicted.clone(), target.clone()],
        |op| {
            let (predicted, target) = (op.input(0)?, op.input(1)?);
            let squared_error = predicted
                .data()
                .element_wise(&target.data(), |p, t| (p - t) * (p - t))?;

            Ok(vec![Tensor::scalar(squared_error.mean())])
        },
        |op, node| {
            let (predicted, target) = (op.input(0)?, op.input(1)?);
            let error = (&*predicted.data() - &*target.data())?;
            let scale = 2. / error.len() as f32;

            // The incoming gradient of a loss has shape (1), it broadcasts over the error.
            let gradient = error.element_wise(node.gradient(), move |e, g| scale * e * g)?;

            Ok(vec![
                Tensor::new(gradient.reduce_sum(&predicted.shape())?),
                Tensor::new((-&gradient).reduce_sum(&target.shape())?),
            ])
        },
    )
}

/// Computes the mean squared error between `predicted` and `target`, recording the operation on
/// `tape`.
pub fn mse(predicted: &Tensor, target: &Tensor, tape: Option<&GradientTape>) -> Result<Tensor> {
    evaluate(mse_op(predicted, target), tape)
}

#[cfg(test)]
mod test;
