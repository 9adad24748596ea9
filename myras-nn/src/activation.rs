use std::{convert::TryFrom, fmt, str::FromStr};

#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

use myras_core::{Error, Result};
use myras_variable::{ops, GradientTape, Tensor};

/// Non-linearities applied at the output of a dense layer.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum Activation {
    /// *max(0, x)*.
    Relu,
    /// The identity.
    Linear,
}

impl Activation {
    /// Applies the activation to `input`, recording the operation on `tape`.
    pub fn apply(self, input: &Tensor, tape: Option<&GradientTape>) -> Result<Tensor> {
        match self {
            Self::Relu => ops::relu(input, tape),
            Self::Linear => ops::linear(input, tape),
        }
    }
}

impl Default for Activation {
    fn default() -> Self {
        Self::Linear
    }
}

impl TryFrom<&str> for Activation {
    type Error = Error;

    fn try_from(name: &str) -> Result<Self> {
        match name.to_ascii_lowercase().as_str() {
            "relu" | "re_lu" => Ok(Self::Relu),
            "linear" => Ok(Self::Linear),
            _ => Err(Error::not_implemented("activation", name)),
        }
    }
}

impl FromStr for Activation {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self> {
        Self::try_from(name)
    }
}

impl fmt::Display for Activation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Relu => f.write_str("relu"),
            Self::Linear => f.write_str("linear"),
        }
    }
}
