//! Optimizers updating trainable tensors in place from their gradients.

mod adam;
mod optimizer;

pub use adam::*;
pub use optimizer::*;
