//! Differentiable tensor operations.
//!
//! Every operation comes as a pair: a factory building the [`TensorOperation`] with its forward
//! and backward functions, and a wrapper that evaluates it and records it on an optional
//! [`GradientTape`].

mod addition;
mod division;
mod dot_product;
mod linear;
mod mse;
mod multiplication;
mod relu;
mod sqrt;
mod subtraction;
mod transpose;

use std::rc::Rc;

use myras_core::Result;

use crate::{GradientTape, Tensor, TensorOperation};

pub use addition::{add, add_op};
pub use division::{div, div_op};
pub use dot_product::{dot, dot_op};
pub use linear::{linear, linear_op};
pub use mse::{mse, mse_op};
pub use multiplication::{mul, mul_op};
pub use relu::{relu, relu_op};
pub use sqrt::{sqrt, sqrt_op};
pub use subtraction::{sub, sub_op};
pub use transpose::{transpose, transpose_op};

/// Evaluates `operation` and records it on `tape`, when one is given.
pub fn evaluate(operation: TensorOperation, tape: Option<&GradientTape>) -> Result<Tensor> {
    let operation = Rc::new(operation);
    let output = operation.call_single()?;

    if let Some(tape) = tape {
        tape.record(&operation)?;
    }

    Ok(output)
}
