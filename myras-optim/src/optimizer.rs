use std::{fmt, str::FromStr};

#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

use myras_core::{Error, Matrix, Result};
use myras_variable::Tensor;

use crate::{Adam, AdamConfig};

/// The optimization algorithms a model can be compiled with.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum OptimizerType {
    Adam,
}

impl FromStr for OptimizerType {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self> {
        match name.to_ascii_uppercase().as_str() {
            "ADAM" => Ok(Self::Adam),
            _ => Err(Error::not_implemented("optimizer", name)),
        }
    }
}

impl fmt::Display for OptimizerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Adam => f.write_str("ADAM"),
        }
    }
}

/// Hyperparameters chosen by the user when compiling a model.
///
/// The momentum vectors are sized by the model itself and merged with these values.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serialize", serde(default))]
pub struct OptimizerParams {
    /// Step size. Defaults to *1e-3*.
    pub learning_rate: f32,
    /// Decay of the running average of the gradient. Defaults to *0.9*.
    pub decay_rate1: f32,
    /// Decay of the running average of the squared gradient. Defaults to *0.999*.
    pub decay_rate2: f32,
    /// Small constant for numerical stability. Defaults to *1e-7*.
    pub epsilon: f32,
}

impl Default for OptimizerParams {
    fn default() -> Self {
        Self {
            learning_rate: 1e-3,
            decay_rate1: 0.9,
            decay_rate2: 0.999,
            epsilon: 1e-7,
        }
    }
}

impl OptimizerParams {
    pub fn with_learning_rate(mut self, learning_rate: f32) -> Self {
        self.learning_rate = learning_rate;
        self
    }
}

/// An optimizer bound to the trainable weights of a model.
#[derive(Debug)]
pub enum Optimizer {
    Adam(Adam),
}

impl Optimizer {
    /// Creates an optimizer of type `kind`.
    ///
    /// # Arguments
    ///
    /// * `kind` - algorithm to use.
    ///
    /// * `params` - user hyperparameters.
    ///
    /// * `first_momentum_vector` - zero filled tensors, one per trainable weight.
    ///
    /// * `second_momentum_vector` - zero filled tensors, one per trainable weight.
    pub fn new(
        kind: OptimizerType,
        params: &OptimizerParams,
        first_momentum_vector: Vec<Matrix>,
        second_momentum_vector: Vec<Matrix>,
    ) -> Result<Self> {
        match kind {
            OptimizerType::Adam => {
                let config = AdamConfig::new(first_momentum_vector, second_momentum_vector)
                    .with_params(params);

                Ok(Self::Adam(Adam::new(config)?))
            }
        }
    }

    pub fn kind(&self) -> OptimizerType {
        match self {
            Self::Adam(_) => OptimizerType::Adam,
        }
    }

    /// Performs a single optimization step, overwriting the values of `weights` in place.
    ///
    /// `weights` and `gradients` are matched by position.
    pub fn optimize(&mut self, weights: &[Tensor], gradients: &[Tensor]) -> Result<()> {
        match self {
            Self::Adam(adam) => adam.optimize(weights, gradients),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parse_type() {
        assert_eq!("adam".parse::<OptimizerType>().unwrap(), OptimizerType::Adam);
        assert_eq!("ADAM".parse::<OptimizerType>().unwrap(), OptimizerType::Adam);
        assert!(matches!(
            "sgd".parse::<OptimizerType>(),
            Err(Error::NotImplemented { .. })
        ));
    }

    #[test]
    fn creation() {
        let shape = myras_core::Shape::scalar();
        let optimizer = Optimizer::new(
            OptimizerType::Adam,
            &OptimizerParams::default().with_learning_rate(0.1),
            vec![Matrix::zeros(&shape)],
            vec![Matrix::zeros(&shape)],
        )
        .unwrap();

        assert_eq!(optimizer.kind(), OptimizerType::Adam);
        let Optimizer::Adam(adam) = optimizer;
        assert!((adam.learning_rate() - 0.1).abs() <= f32::EPSILON);
    }
}
