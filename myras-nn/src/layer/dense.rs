use myras_core::{Result, Shape};
use myras_variable::{ops, GradientTape, Tensor};

use super::LayerBase;
use crate::{init, Activation};

/// Bound of the uniform distribution the kernel is drawn from on creation. The kernel is drawn
/// again when the model is compiled.
const INITIAL_RANGE: f32 = 0.1;
const INITIAL_BIAS: f32 = 0.01;

/// Fully connected layer.
///
/// Applies `activation(input · kernelᵀ + biases)`, where the kernel has shape
/// `(units, previous_units)` and the biases have shape `(units)`.
#[derive(Debug)]
pub struct Dense {
    pub(crate) base: LayerBase,
    units: usize,
    activation: Activation,
    kernel: Tensor,
    biases: Option<Tensor>,
}

impl Dense {
    /// Creates a dense layer fed by records of `previous_units` values.
    ///
    /// # Arguments
    ///
    /// * `units` - number of output features.
    ///
    /// * `previous_units` - number of input features.
    ///
    /// * `batch_size` - number of records processed by a forward pass.
    ///
    /// * `use_biases` - whether a bias vector is added to the product with the kernel.
    ///
    /// * `activation` - non-linearity applied at the output.
    pub fn new(
        units: usize,
        previous_units: usize,
        batch_size: usize,
        use_biases: bool,
        activation: Activation,
    ) -> Result<Self> {
        let kernel = init::random(
            &Shape::new([units, previous_units])?,
            -INITIAL_RANGE,
            INITIAL_RANGE,
        )?;
        let biases = if use_biases {
            Some(Tensor::full(&Shape::new([units])?, INITIAL_BIAS))
        } else {
            None
        };

        let weights = std::iter::once(kernel.clone())
            .chain(biases.clone())
            .collect();
        let base = LayerBase::new(
            weights,
            Shape::new([previous_units])?,
            Shape::new([units])?,
            batch_size,
            true,
        )?;

        Ok(Self {
            base,
            units,
            activation,
            kernel,
            biases,
        })
    }

    pub fn units(&self) -> usize {
        self.units
    }

    pub fn use_biases(&self) -> bool {
        self.biases.is_some()
    }

    pub fn activation(&self) -> Activation {
        self.activation
    }

    pub fn kernel(&self) -> &Tensor {
        &self.kernel
    }

    pub fn biases(&self) -> Option<&Tensor> {
        self.biases.as_ref()
    }

    pub fn forward_pass(&mut self, input: Tensor, tape: Option<&GradientTape>) -> Result<Tensor> {
        let kernel_t = ops::transpose(&self.kernel, None, tape)?;
        let mut output = ops::dot(&input, &kernel_t, tape)?;

        if let Some(biases) = &self.biases {
            output = ops::add(&output, biases, tape)?;
        }

        let output = self.activation.apply(&output, tape)?;

        Ok(self.base.store(input, output))
    }
}
