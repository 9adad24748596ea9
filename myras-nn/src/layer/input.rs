use myras_core::{Result, Shape, ShapeError};
use myras_variable::{ops, GradientTape, Tensor};

use super::LayerBase;

/// Entry point of a model. Its forward pass is the identity on the assigned tensor.
#[derive(Debug)]
pub struct Input {
    pub(crate) base: LayerBase,
}

impl Input {
    /// Creates an input layer for records of shape `shape`.
    pub fn new(shape: Shape, batch_size: usize) -> Result<Self> {
        let base = LayerBase::new(Vec::new(), shape.clone(), shape, batch_size, false)?;

        Ok(Self { base })
    }

    /// Fails if the trailing dimensions of `input` differ from the record shape.
    pub fn forward_pass(&mut self, input: Tensor, tape: Option<&GradientTape>) -> Result<Tensor> {
        let shape = input.shape();
        if shape.dimensions().get(1..) != Some(self.base.input_shape().dimensions()) {
            return Err(ShapeError::Mismatch {
                expected: self.base.batch_input_shape().clone(),
                got: shape,
            }
            .into());
        }

        let output = ops::linear(&input, tape)?;

        Ok(self.base.store(input, output))
    }
}
