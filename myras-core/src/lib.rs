//! Numeric foundations of the engine: shapes, dense matrices and the error taxonomy shared by
//! every other crate of the workspace.

mod error;
mod matrix;
mod shape;

pub use crate::{
    error::{ConfigError, DataError, Error, GraphError, IndexError, ModelError, Result, ShapeError},
    matrix::{inverse_permutation, Matrix},
    shape::Shape,
};

pub use ndarray;
