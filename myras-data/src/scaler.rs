use itertools::{Itertools, MinMaxResult};
#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

use myras_core::{DataError, Result};

/// Linear map from the range *[original_min, original_max]* to *[new_min, new_max]*.
///
/// Values outside the original range are extrapolated, not clamped.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Scaler {
    pub original_min: f32,
    pub original_max: f32,
    pub new_min: f32,
    pub new_max: f32,
}

impl Scaler {
    /// Creates a new scaler.
    ///
    /// # Errors
    ///
    /// If either range is empty, as the map would not be invertible.
    pub fn new(original_min: f32, original_max: f32, new_min: f32, new_max: f32) -> Result<Self> {
        check_range(original_min, original_max)?;
        check_range(new_min, new_max)?;

        Ok(Self {
            original_min,
            original_max,
            new_min,
            new_max,
        })
    }

    /// Creates a scaler whose original range spans the smallest and the largest of `values`.
    pub fn fit<I>(values: I, new_min: f32, new_max: f32) -> Result<Self>
    where
        I: IntoIterator<Item = f32>,
    {
        let (min, max) = match values.into_iter().minmax_by(f32::total_cmp) {
            MinMaxResult::MinMax(min, max) => (min, max),
            MinMaxResult::OneElement(value) => (value, value),
            MinMaxResult::NoElements => (0., 0.),
        };

        Self::new(min, max, new_min, new_max)
    }

    /// Maps `value` from the original range to the new one.
    pub fn scale(&self, value: f32) -> f32 {
        (value - self.original_min) * (self.new_max - self.new_min)
            / (self.original_max - self.original_min)
            + self.new_min
    }

    /// Maps `value` from the new range back to the original one.
    pub fn scale_back(&self, value: f32) -> f32 {
        (value - self.new_min) * (self.original_max - self.original_min)
            / (self.new_max - self.new_min)
            + self.original_min
    }

    pub fn scale_slice(&self, values: &[f32]) -> Vec<f32> {
        values.iter().map(|&value| self.scale(value)).collect()
    }

    pub fn scale_back_slice(&self, values: &[f32]) -> Vec<f32> {
        values.iter().map(|&value| self.scale_back(value)).collect()
    }

    pub fn scale_in_place(&self, values: &mut [f32]) {
        values
            .iter_mut()
            .for_each(|value| *value = self.scale(*value));
    }

    pub fn scale_back_in_place(&self, values: &mut [f32]) {
        values
            .iter_mut()
            .for_each(|value| *value = self.scale_back(*value));
    }
}

fn check_range(min: f32, max: f32) -> Result<()> {
    if min == max || !min.is_finite() || !max.is_finite() {
        return Err(DataError::EmptyRange { min, max }.into());
    }

    Ok(())
}
