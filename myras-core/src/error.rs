use thiserror::Error;

use crate::Shape;

/// Shorthand for results carrying the crate wide [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Failures raised by shape arithmetic: broadcasting, reductions, products and permutations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ShapeError {
    #[error("shapes {left} and {right} cannot be broadcast together")]
    NotBroadcastable { left: Shape, right: Shape },

    #[error("shape {from} cannot be reduced to {to}")]
    NotReducible { from: Shape, to: Shape },

    #[error("shape {from} cannot be reduced to {to}: values along axis {axis} differ")]
    NotReducibleValues { from: Shape, to: Shape, axis: usize },

    #[error("{operation} is not defined for operands of rank {rank}")]
    InvalidRank {
        operation: &'static str,
        rank: usize,
    },

    #[error("permutation {permutation:?} is not valid for an operand of rank {rank}")]
    InvalidPermutation {
        permutation: Vec<usize>,
        rank: usize,
    },

    #[error("dot product is not defined for operands of rank {left} and {right}")]
    DotRanks { left: usize, right: usize },

    #[error("inner dimensions of {left} and {right} do not agree")]
    DotMismatch { left: Shape, right: Shape },

    #[error("dimensions {dimensions:?} do not describe a valid shape")]
    InvalidShape { dimensions: Vec<usize> },

    #[error("shape {shape} holds {expected} values, got {got}")]
    ValueCount {
        shape: Shape,
        expected: usize,
        got: usize,
    },

    #[error("expected shape {expected}, got {got}")]
    Mismatch { expected: Shape, got: Shape },
}

/// Failures raised while converting between flat and multi-dimensional indices.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IndexError {
    #[error("index {index:?} has {len} components, but the shape has rank {rank}")]
    RankMismatch {
        index: Vec<usize>,
        len: usize,
        rank: usize,
    },

    #[error("index {index:?} is out of bounds for shape {shape}")]
    OutOfBounds { index: Vec<usize>, shape: Shape },

    #[error("index {index:?} has a negative component")]
    Negative { index: Vec<isize> },

    #[error("flat index {index} is out of bounds for {size} elements")]
    FlatOutOfBounds { index: usize, size: usize },
}

/// Failures raised by the computation graph and the gradient tape.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("operation #{operation} has already been recorded")]
    OperationRecordedTwice { operation: usize },

    #[error("tensor #{tensor} was not recorded on the tape")]
    TensorNotRecorded { tensor: usize },

    #[error("no recorded operation produced tensor #{tensor}")]
    NoProducer { tensor: usize },

    #[error("operation #{operation} references tensor #{tensor}, which has no value node")]
    MissingValueNode { operation: usize, tensor: usize },

    #[error("operation #{operation} expected {expected} tensors, got {got}")]
    ArityMismatch {
        operation: usize,
        expected: usize,
        got: usize,
    },

    #[error("the gradient tape has been disposed")]
    TapeDisposed,
}

/// Failures raised by invalid optimizer or model configuration.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("the optimizer requires non empty first and second momentum vectors")]
    MissingMomentumVectors,

    #[error(
        "got {weights} weights, {gradients} gradients and {first_momentum}/{second_momentum} momentum tensors"
    )]
    LengthMismatch {
        weights: usize,
        gradients: usize,
        first_momentum: usize,
        second_momentum: usize,
    },

    #[error("got {first} first momentum tensors but {second} second momentum tensors")]
    MomentumLengthMismatch { first: usize, second: usize },

    #[error("the model has {expected} input layers, got {got} input tensors")]
    InputCountMismatch { expected: usize, got: usize },

    #[error("batch size must be positive")]
    InvalidBatchSize,

    #[error("hyperparameter `{name}` has invalid value {value}")]
    InvalidHyperparameter { name: &'static str, value: f32 },

    #[error("layer `{layer}` is not connected to a previous layer")]
    Disconnected { layer: String },

    #[error("no layer with id {layer}")]
    UnknownLayer { layer: usize },

    #[error("layer `{layer}` is not an input layer")]
    NotAnInput { layer: String },

    #[error("a model needs at least one {role} layer")]
    NoLayers { role: &'static str },
}

/// Failures raised by the model lifecycle.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("the model must be compiled before fitting")]
    NotCompiled,
}

/// Failures raised while preparing datasets.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DataError {
    #[error("split factor must lie in [0, 1], got {factor}")]
    SplitFactor { factor: f32 },

    #[error("row {row} has {got} columns, expected {expected}")]
    RowWidth {
        row: usize,
        expected: usize,
        got: usize,
    },

    #[error("target start column {start} is past the row width {width}")]
    TargetColumn { start: usize, width: usize },

    #[error("scaler range [{min}, {max}] is empty")]
    EmptyRange { min: f32, max: f32 },

    #[error("csv: {0}")]
    Csv(String),
}

/// Errors raised anywhere in the engine.
///
/// Every failure is fatal for the operation that raised it and is propagated unchanged to the
/// caller of the top level API.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    #[error(transparent)]
    Shape(#[from] ShapeError),

    #[error(transparent)]
    Index(#[from] IndexError),

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Data(#[from] DataError),

    #[error("{kind} `{name}` is not implemented")]
    NotImplemented { kind: &'static str, name: String },
}

impl Error {
    /// Builds a [`Error::NotImplemented`] for the given kind of component.
    pub fn not_implemented(kind: &'static str, name: impl Into<String>) -> Self {
        Self::NotImplemented {
            kind,
            name: name.into(),
        }
    }
}
