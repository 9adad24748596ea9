use std::fmt;

use myras_core::{Result, Shape};
use myras_variable::{GradientTape, Tensor};

mod dense;
mod input;

pub use dense::Dense;
pub use input::Input;

/// Handle of a layer inside a [`LayerGraph`](crate::LayerGraph).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerId(pub(crate) usize);

impl LayerId {
    pub fn get(self) -> usize {
        self.0
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum LayerType {
    Input,
    Dense,
}

impl LayerType {
    /// Prefix of the default names of layers of this type.
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::Dense => "dense",
        }
    }
}

impl fmt::Display for LayerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Input => f.write_str("INPUT"),
            Self::Dense => f.write_str("DENSE"),
        }
    }
}

/// State shared by every kind of layer.
///
/// The input and output tensors start zero filled with the batched shapes, and are replaced
/// by every forward pass.
#[derive(Debug)]
pub struct LayerBase {
    name: String,
    trainable: bool,
    trainable_weights: Vec<Tensor>,
    non_trainable_weights: Vec<Tensor>,
    input: Tensor,
    output: Tensor,
    input_shape: Shape,
    output_shape: Shape,
    batch_size: usize,
    batch_input_shape: Shape,
    batch_output_shape: Shape,
    pub(crate) previous: Vec<LayerId>,
    pub(crate) next: Vec<LayerId>,
}

impl LayerBase {
    /// Binds shapes and weights.
    ///
    /// # Arguments
    ///
    /// * `trainable_weights` - weights updated by the optimizer.
    ///
    /// * `input_shape` - shape of a single input record.
    ///
    /// * `output_shape` - shape of a single output record.
    ///
    /// * `batch_size` - number of records processed by a forward pass.
    ///
    /// * `trainable` - whether the trainable weights are collected at compile time.
    pub(crate) fn new(
        trainable_weights: Vec<Tensor>,
        input_shape: Shape,
        output_shape: Shape,
        batch_size: usize,
        trainable: bool,
    ) -> Result<Self> {
        let batch_input_shape = input_shape.batched(batch_size)?;
        let batch_output_shape = output_shape.batched(batch_size)?;

        Ok(Self {
            name: String::new(),
            trainable,
            trainable_weights,
            non_trainable_weights: Vec::new(),
            input: Tensor::zeros(&batch_input_shape).with_trainable(false),
            output: Tensor::zeros(&batch_output_shape).with_trainable(false),
            input_shape,
            output_shape,
            batch_size,
            batch_input_shape,
            batch_output_shape,
            previous: Vec::new(),
            next: Vec::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn set_name(&mut self, name: String) {
        self.name = name;
    }

    pub fn is_trainable(&self) -> bool {
        self.trainable
    }

    /// Freezes or unfreezes the layer. It has effect at the next compilation of the model.
    pub fn set_trainable(&mut self, trainable: bool) {
        self.trainable = trainable;
    }

    pub fn trainable_weights(&self) -> &[Tensor] {
        &self.trainable_weights
    }

    pub fn non_trainable_weights(&self) -> &[Tensor] {
        &self.non_trainable_weights
    }

    /// Trainable weights followed by the non-trainable ones.
    pub fn weights(&self) -> impl Iterator<Item = &Tensor> {
        self.trainable_weights
            .iter()
            .chain(&self.non_trainable_weights)
    }

    /// Tensor consumed by the last forward pass.
    pub fn input(&self) -> &Tensor {
        &self.input
    }

    /// Tensor produced by the last forward pass.
    pub fn output(&self) -> &Tensor {
        &self.output
    }

    pub fn input_shape(&self) -> &Shape {
        &self.input_shape
    }

    pub fn output_shape(&self) -> &Shape {
        &self.output_shape
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn batch_input_shape(&self) -> &Shape {
        &self.batch_input_shape
    }

    pub fn batch_output_shape(&self) -> &Shape {
        &self.batch_output_shape
    }

    /// Layers feeding this one.
    pub fn previous(&self) -> &[LayerId] {
        &self.previous
    }

    /// Layers fed by this one.
    pub fn next(&self) -> &[LayerId] {
        &self.next
    }

    fn store(&mut self, input: Tensor, output: Tensor) -> Tensor {
        self.input = input;
        self.output = output.clone();
        output
    }
}

/// The layers a model can be assembled from.
#[derive(Debug)]
pub enum Layer {
    Input(Input),
    Dense(Dense),
}

impl Layer {
    pub fn kind(&self) -> LayerType {
        match self {
            Self::Input(_) => LayerType::Input,
            Self::Dense(_) => LayerType::Dense,
        }
    }

    pub fn base(&self) -> &LayerBase {
        match self {
            Self::Input(layer) => &layer.base,
            Self::Dense(layer) => &layer.base,
        }
    }

    pub fn base_mut(&mut self) -> &mut LayerBase {
        match self {
            Self::Input(layer) => &mut layer.base,
            Self::Dense(layer) => &mut layer.base,
        }
    }

    pub fn name(&self) -> &str {
        self.base().name()
    }

    /// Evaluates the layer on `input`, recording every operation on `tape`.
    ///
    /// The input and output tensors of the layer are replaced.
    pub fn forward_pass(&mut self, input: Tensor, tape: Option<&GradientTape>) -> Result<Tensor> {
        match self {
            Self::Input(layer) => layer.forward_pass(input, tape),
            Self::Dense(layer) => layer.forward_pass(input, tape),
        }
    }
}

impl From<Input> for Layer {
    fn from(layer: Input) -> Self {
        Self::Input(layer)
    }
}

impl From<Dense> for Layer {
    fn from(layer: Dense) -> Self {
        Self::Dense(layer)
    }
}

// ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~
// ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~ Tests ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~
// ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~
#[cfg(test)]
mod test;
