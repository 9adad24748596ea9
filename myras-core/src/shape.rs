use std::fmt;

#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

use crate::{IndexError, Result, ShapeError};

/// Ordered, non empty sequence of positive dimension sizes.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Shape(Vec<usize>);

impl Shape {
    /// Creates a new shape, rejecting empty dimension lists and zero sized dimensions.
    pub fn new(dimensions: impl Into<Vec<usize>>) -> Result<Self> {
        let dimensions = dimensions.into();
        if dimensions.is_empty() || dimensions.contains(&0) {
            return Err(ShapeError::InvalidShape { dimensions }.into());
        }

        Ok(Self(dimensions))
    }

    /// The shape of a scalar, `(1)`.
    pub fn scalar() -> Self {
        Self(vec![1])
    }

    pub fn dimensions(&self) -> &[usize] {
        &self.0
    }

    pub fn rank(&self) -> usize {
        self.0.len()
    }

    /// Number of elements described by this shape.
    pub fn total_size(&self) -> usize {
        self.0.iter().product()
    }

    /// Size of the trailing dimension.
    pub fn last(&self) -> usize {
        self.0.last().copied().unwrap_or(1)
    }

    /// Returns this shape with a leading batch axis of size `batch_size`.
    pub fn batched(&self, batch_size: usize) -> Result<Self> {
        let mut dimensions = Vec::with_capacity(self.rank() + 1);
        dimensions.push(batch_size);
        dimensions.extend_from_slice(&self.0);

        Self::new(dimensions)
    }

    /// Wraps dimensions read back from a non empty array.
    pub(crate) fn from_raw(dimensions: &[usize]) -> Self {
        Self(dimensions.to_vec())
    }

    /// Converts a multi-dimensional index into its row-major flat offset.
    pub fn flat_index(&self, index: &[usize]) -> Result<usize> {
        if index.len() != self.rank() {
            return Err(IndexError::RankMismatch {
                index: index.to_vec(),
                len: index.len(),
                rank: self.rank(),
            }
            .into());
        }

        let mut flat = 0;
        for (&component, &dimension) in index.iter().zip(&self.0) {
            if component >= dimension {
                return Err(IndexError::OutOfBounds {
                    index: index.to_vec(),
                    shape: self.clone(),
                }
                .into());
            }
            flat = flat * dimension + component;
        }

        Ok(flat)
    }

    /// Same as [`Shape::flat_index`], for indices coming from signed arithmetic.
    pub fn flat_index_signed(&self, index: &[isize]) -> Result<usize> {
        let unsigned = index
            .iter()
            .map(|&component| usize::try_from(component))
            .collect::<std::result::Result<Vec<usize>, _>>()
            .map_err(|_| IndexError::Negative {
                index: index.to_vec(),
            })?;

        self.flat_index(&unsigned)
    }

    /// Converts a row-major flat offset back into a multi-dimensional index.
    pub fn multi_index(&self, flat: usize) -> Result<Vec<usize>> {
        let size = self.total_size();
        if flat >= size {
            return Err(IndexError::FlatOutOfBounds { index: flat, size }.into());
        }

        let mut index = vec![0; self.rank()];
        let mut rest = flat;
        for (component, &dimension) in index.iter_mut().zip(&self.0).rev() {
            *component = rest % dimension;
            rest /= dimension;
        }

        Ok(index)
    }

    /// Returns the dimensions left padded with ones up to `rank`.
    pub(crate) fn padded(&self, rank: usize) -> Vec<usize> {
        let mut padded = vec![1; rank.saturating_sub(self.rank())];
        padded.extend_from_slice(&self.0);
        padded
    }

    /// Computes the shape resulting from broadcasting `left` and `right` together.
    ///
    /// The shorter shape is left padded with ones, then every pair of aligned dimensions must
    /// either agree or contain a one.
    ///
    /// # Arguments
    ///
    /// * `left` - left operand shape.
    ///
    /// * `right` - right operand shape.
    pub fn broadcast(left: &Shape, right: &Shape) -> Result<Shape> {
        let rank = left.rank().max(right.rank());

        left.padded(rank)
            .into_iter()
            .zip(right.padded(rank))
            .map(|(l, r)| match (l, r) {
                (l, r) if l == r => Ok(l),
                (1, r) => Ok(r),
                (l, 1) => Ok(l),
                _ => Err(ShapeError::NotBroadcastable {
                    left: left.clone(),
                    right: right.clone(),
                }
                .into()),
            })
            .collect::<Result<Vec<usize>>>()
            .map(Shape)
    }
}

impl TryFrom<&[usize]> for Shape {
    type Error = crate::Error;

    fn try_from(dimensions: &[usize]) -> Result<Self> {
        Self::new(dimensions)
    }
}

impl<const N: usize> TryFrom<[usize; N]> for Shape {
    type Error = crate::Error;

    fn try_from(dimensions: [usize; N]) -> Result<Self> {
        Self::new(dimensions)
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, dimension) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", dimension)?;
        }
        write!(f, ")")
    }
}
