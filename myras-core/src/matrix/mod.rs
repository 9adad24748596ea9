use std::{
    fmt,
    ops::{Add, Div, Mul, Neg, Sub},
};

use ndarray::{
    Array, ArrayD, ArrayView1, ArrayView2, ArrayViewMutD, Axis, Dimension, Ix1, Ix2, IxDyn, Zip,
};

use crate::{Result, Shape, ShapeError};

/// Dense, row-major buffer of `f32` values together with its [`Shape`].
///
/// Every operation returns a fresh matrix; the only in-place writes are the ones performed
/// through [`Matrix::assign`] and [`Matrix::set_value`].
#[derive(Clone, Debug, PartialEq)]
pub struct Matrix {
    shape: Shape,
    data: ArrayD<f32>,
}

impl Matrix {
    /// Wraps an array produced inside this module, which is always non empty.
    fn from_data(data: ArrayD<f32>) -> Self {
        let shape = Shape::from_raw(data.shape());
        Self { shape, data }
    }

    /// Creates a matrix from a shape and a row-major list of values.
    pub fn from_shape_vec(shape: &Shape, values: Vec<f32>) -> Result<Self> {
        if values.len() != shape.total_size() {
            return Err(ShapeError::ValueCount {
                shape: shape.clone(),
                expected: shape.total_size(),
                got: values.len(),
            }
            .into());
        }

        let data = ArrayD::from_shape_vec(IxDyn(shape.dimensions()), values).map_err(|_| {
            ShapeError::InvalidShape {
                dimensions: shape.dimensions().to_vec(),
            }
        })?;

        Ok(Self {
            shape: shape.clone(),
            data,
        })
    }

    /// Creates a matrix with every element set to `value`.
    pub fn full(shape: &Shape, value: f32) -> Self {
        Self {
            shape: shape.clone(),
            data: ArrayD::from_elem(IxDyn(shape.dimensions()), value),
        }
    }

    pub fn zeros(shape: &Shape) -> Self {
        Self::full(shape, 0.)
    }

    pub fn ones(shape: &Shape) -> Self {
        Self::full(shape, 1.)
    }

    /// Creates a matrix of shape `(1)` holding `value`.
    pub fn scalar(value: f32) -> Self {
        Self::full(&Shape::scalar(), value)
    }

    /// Creates a matrix from a **[ndarray]** array of any dimensionality.
    ///
    /// Zero dimensional arrays become matrices of shape `(1)`.
    pub fn from_ndarray<D>(array: Array<f32, D>) -> Result<Self>
    where
        D: Dimension,
    {
        if array.ndim() == 0 {
            return Ok(Self::scalar(array.iter().sum()));
        }

        let shape = Shape::new(array.shape())?;
        let data = if array.is_standard_layout() {
            array.into_dyn()
        } else {
            array.as_standard_layout().into_owned().into_dyn()
        };

        Ok(Self { shape, data })
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn rank(&self) -> usize {
        self.shape.rank()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Always `false`, shapes are never empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns a view of the underlying array.
    pub fn array(&self) -> &ArrayD<f32> {
        &self.data
    }

    /// Returns a mutable view of the values. The shape cannot be changed through it.
    pub fn view_mut(&mut self) -> ArrayViewMutD<f32> {
        self.data.view_mut()
    }

    /// Consumes the matrix, returning the underlying array.
    pub fn into_array(self) -> ArrayD<f32> {
        self.data
    }

    /// Iterates over the values in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = &f32> {
        self.data.iter()
    }

    /// Returns a copy of the values in row-major order.
    pub fn to_vec(&self) -> Vec<f32> {
        self.data.iter().copied().collect()
    }

    /// Converts a multi-dimensional index into its flat offset.
    pub fn flat_index(&self, index: &[usize]) -> Result<usize> {
        self.shape.flat_index(index)
    }

    /// Converts a flat offset into its multi-dimensional index.
    pub fn multi_index(&self, flat: usize) -> Result<Vec<usize>> {
        self.shape.multi_index(flat)
    }

    /// Reads the value at the given multi-dimensional index.
    pub fn get(&self, index: &[usize]) -> Result<f32> {
        self.shape.flat_index(index)?;
        Ok(self.data[IxDyn(index)])
    }

    /// Writes `value` at the given multi-dimensional index.
    pub fn set(&mut self, index: &[usize], value: f32) -> Result<()> {
        self.shape.flat_index(index)?;
        self.data[IxDyn(index)] = value;
        Ok(())
    }

    /// Reads the value stored at the flat offset `flat`.
    pub fn value(&self, flat: usize) -> Result<f32> {
        let index = self.shape.multi_index(flat)?;
        Ok(self.data[IxDyn(&index)])
    }

    /// Writes `value` at the flat offset `flat`.
    pub fn set_value(&mut self, flat: usize, value: f32) -> Result<()> {
        let index = self.shape.multi_index(flat)?;
        self.data[IxDyn(&index)] = value;
        Ok(())
    }

    /// Overwrites the values of `self` with those of `other`, which must have the same shape.
    pub fn assign(&mut self, other: &Matrix) -> Result<()> {
        if self.shape != other.shape {
            return Err(ShapeError::Mismatch {
                expected: self.shape.clone(),
                got: other.shape.clone(),
            }
            .into());
        }

        self.data.assign(&other.data);
        Ok(())
    }

    /// Sum of all the elements.
    pub fn sum(&self) -> f32 {
        self.data.sum()
    }

    /// Arithmetic mean of all the elements.
    pub fn mean(&self) -> f32 {
        self.data.sum() / self.data.len() as f32
    }

    /// Replicates the values of `self` so that it takes `shape`.
    ///
    /// The source shape is left padded with ones up to the target rank, then every dimension of
    /// size one is repeated as many times as the target dimension requires.
    pub fn broadcast(&self, shape: &Shape) -> Result<Matrix> {
        if &self.shape == shape {
            return Ok(self.clone());
        }

        let view = self
            .data
            .broadcast(IxDyn(shape.dimensions()))
            .ok_or_else(|| ShapeError::NotBroadcastable {
                left: self.shape.clone(),
                right: shape.clone(),
            })?;

        Ok(Self::from_data(view.as_standard_layout().into_owned()))
    }

    /// Reverts a broadcast by summing the values that were replicated along every collapsed
    /// dimension.
    pub fn reduce_sum(&self, shape: &Shape) -> Result<Matrix> {
        self.collapse(shape, |data, axis| {
            Ok(data.sum_axis(Axis(axis)).insert_axis(Axis(axis)))
        })
    }

    /// Reverts a broadcast that must have been a pure replication, keeping a single copy of the
    /// values along every collapsed dimension.
    ///
    /// Fails if the values along a collapsed dimension are not all identical.
    pub fn reduce(&self, shape: &Shape) -> Result<Matrix> {
        self.collapse(shape, |data, axis| {
            let first = data.index_axis(Axis(axis), 0);
            if data.axis_iter(Axis(axis)).any(|lane| lane != first) {
                return Err(ShapeError::NotReducibleValues {
                    from: self.shape.clone(),
                    to: shape.clone(),
                    axis,
                }
                .into());
            }

            Ok(first.insert_axis(Axis(axis)).to_owned())
        })
    }

    /// Collapses every dimension of `self` that is one in the left padded `shape`.
    ///
    /// # Arguments
    ///
    /// * `shape` - target shape.
    ///
    /// * `fold` - collapses a single axis of the running array, keeping it with size one.
    fn collapse<F>(&self, shape: &Shape, mut fold: F) -> Result<Matrix>
    where
        F: FnMut(ArrayD<f32>, usize) -> Result<ArrayD<f32>>,
    {
        if &self.shape == shape {
            return Ok(self.clone());
        }

        let not_reducible = || ShapeError::NotReducible {
            from: self.shape.clone(),
            to: shape.clone(),
        };

        if shape.rank() > self.rank() {
            return Err(not_reducible().into());
        }

        let target = shape.padded(self.rank());
        let mut data = self.data.clone();
        for (axis, (&from, &to)) in self.shape.dimensions().iter().zip(&target).enumerate() {
            match (from, to) {
                (from, to) if from == to => (),
                (_, 1) => data = fold(data, axis)?,
                _ => return Err(not_reducible().into()),
            }
        }

        Self::from_shape_vec(shape, data.iter().copied().collect())
    }

    /// Applies `op` to every pair of elements of `self` and `other` after broadcasting them
    /// together.
    ///
    /// Positions are independent, so the work is spread across the rayon thread pool.
    pub fn element_wise<F>(&self, other: &Matrix, op: F) -> Result<Matrix>
    where
        F: Fn(f32, f32) -> f32 + Send + Sync,
    {
        let shape = Shape::broadcast(&self.shape, &other.shape)?;
        let dim = IxDyn(shape.dimensions());
        let not_broadcastable = || ShapeError::NotBroadcastable {
            left: self.shape.clone(),
            right: other.shape.clone(),
        };

        let left = self.data.broadcast(dim.clone()).ok_or_else(not_broadcastable)?;
        let right = other.data.broadcast(dim.clone()).ok_or_else(not_broadcastable)?;

        let mut data = ArrayD::zeros(dim);
        Zip::from(&mut data)
            .and(&left)
            .and(&right)
            .par_for_each(|data_el, &left_el, &right_el| *data_el = op(left_el, right_el));

        Ok(Self { shape, data })
    }

    /// Applies `op` to every element, without broadcasting.
    pub fn map<F>(&self, op: F) -> Matrix
    where
        F: Fn(f32) -> f32 + Send + Sync,
    {
        let mut data = ArrayD::zeros(self.data.raw_dim());
        Zip::from(&mut data)
            .and(&self.data)
            .par_for_each(|data_el, &el| *data_el = op(el));

        Self {
            shape: self.shape.clone(),
            data,
        }
    }

    fn view1(&self) -> Result<ArrayView1<f32>> {
        self.data
            .view()
            .into_dimensionality::<Ix1>()
            .map_err(|_| self.rank_error("dot product"))
    }

    fn view2(&self) -> Result<ArrayView2<f32>> {
        self.data
            .view()
            .into_dimensionality::<Ix2>()
            .map_err(|_| self.rank_error("dot product"))
    }

    fn rank_error(&self, operation: &'static str) -> crate::Error {
        ShapeError::InvalidRank {
            operation,
            rank: self.rank(),
        }
        .into()
    }

    /// Computes the dot product between `self` and `other`.
    ///
    /// Two vectors give a matrix of shape `(1)`, two matrices give the usual matrix product.
    /// Any other combination of ranks is rejected.
    pub fn dot(&self, other: &Matrix) -> Result<Matrix> {
        let mismatch = || ShapeError::DotMismatch {
            left: self.shape.clone(),
            right: other.shape.clone(),
        };

        match (self.rank(), other.rank()) {
            (1, 1) => {
                if self.len() != other.len() {
                    return Err(mismatch().into());
                }

                Ok(Self::scalar(self.view1()?.dot(&other.view1()?)))
            }
            (2, 2) => {
                let (left, right) = (self.view2()?, other.view2()?);
                if left.ncols() != right.nrows() {
                    return Err(mismatch().into());
                }

                let mut data = Array::zeros((left.nrows(), right.ncols()));
                Zip::from(data.rows_mut())
                    .and(left.rows())
                    .par_for_each(|mut data_row, left_row| data_row.assign(&left_row.dot(&right)));

                Ok(Self::from_data(data.into_dyn()))
            }
            (left, right) => Err(ShapeError::DotRanks { left, right }.into()),
        }
    }

    /// Permutes the axes of `self`.
    ///
    /// Axis `i` of the result is axis `permutation[i]` of `self`. When no permutation is given
    /// the axes are reversed.
    pub fn transpose(&self, permutation: Option<&[usize]>) -> Result<Matrix> {
        let rank = self.rank();
        if rank < 2 {
            return Err(self.rank_error("transpose"));
        }

        let permutation = match permutation {
            Some(permutation) => permutation.to_vec(),
            None => (0..rank).rev().collect(),
        };

        let mut seen = vec![false; rank];
        let is_permutation = permutation.len() == rank
            && permutation
                .iter()
                .all(|&axis| axis < rank && !std::mem::replace(&mut seen[axis], true));
        if !is_permutation {
            return Err(ShapeError::InvalidPermutation { permutation, rank }.into());
        }

        let data = self
            .data
            .view()
            .permuted_axes(IxDyn(&permutation))
            .as_standard_layout()
            .into_owned();

        Ok(Self::from_data(data))
    }

    /// Transposes with the reversed axes permutation.
    pub fn t(&self) -> Result<Matrix> {
        self.transpose(None)
    }
}

/// Computes the permutation that undoes `permutation`.
pub fn inverse_permutation(permutation: &[usize]) -> Vec<usize> {
    let mut inverse = vec![0; permutation.len()];
    for (position, &axis) in permutation.iter().enumerate() {
        if let Some(slot) = inverse.get_mut(axis) {
            *slot = position;
        }
    }
    inverse
}

macro_rules! impl_binary_op {
    ($trait:ident, $method:ident, $op:tt) => {
        impl $trait<&Matrix> for &Matrix {
            type Output = Result<Matrix>;

            fn $method(self, rhs: &Matrix) -> Result<Matrix> {
                self.element_wise(rhs, |l, r| l $op r)
            }
        }
    };
}

impl_binary_op!(Add, add, +);
impl_binary_op!(Sub, sub, -);
impl_binary_op!(Mul, mul, *);
impl_binary_op!(Div, div, /);

impl Neg for &Matrix {
    type Output = Matrix;

    fn neg(self) -> Matrix {
        self.map(|el| -el)
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.data)
    }
}
