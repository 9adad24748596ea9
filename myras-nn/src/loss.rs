use std::{convert::TryFrom, fmt, str::FromStr};

#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

use myras_core::{Error, Result};
use myras_variable::{ops, GradientTape, Tensor};

/// Loss functions a model can be compiled with.
///
/// Only [`LossType::Mse`] can be evaluated, [`LossType::Mae`] is reserved and fails with
/// [`Error::NotImplemented`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum LossType {
    /// Mean squared error.
    Mse,
    /// Mean absolute error.
    Mae,
}

impl LossType {
    /// Fails if the loss cannot be evaluated.
    pub fn ensure_implemented(self) -> Result<()> {
        match self {
            Self::Mse => Ok(()),
            Self::Mae => Err(Error::not_implemented("loss", self.to_string())),
        }
    }

    /// Computes the loss between `predicted` and `target`, recording it on `tape`.
    ///
    /// The result has shape `(1)`.
    pub fn compute(
        self,
        predicted: &Tensor,
        target: &Tensor,
        tape: Option<&GradientTape>,
    ) -> Result<Tensor> {
        self.ensure_implemented()?;

        ops::mse(predicted, target, tape)
    }
}

impl TryFrom<&str> for LossType {
    type Error = Error;

    fn try_from(name: &str) -> Result<Self> {
        match name.to_ascii_uppercase().as_str() {
            "MSE" => Ok(Self::Mse),
            "MAE" => Ok(Self::Mae),
            _ => Err(Error::not_implemented("loss", name)),
        }
    }
}

impl FromStr for LossType {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self> {
        Self::try_from(name)
    }
}

impl fmt::Display for LossType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mse => f.write_str("MSE"),
            Self::Mae => f.write_str("MAE"),
        }
    }
}
