use std::{
    cell::{Cell, Ref, RefCell, RefMut},
    fmt,
    ptr,
    rc::Rc,
    sync::atomic::{AtomicUsize, Ordering},
};

use ndarray::{Array, Dimension};

use myras_core::{Matrix, Result, Shape};

static NEXT_TENSOR_ID: AtomicUsize = AtomicUsize::new(0);

/// Process unique identifier of a [`Tensor`].
///
/// The computation graph keys value nodes on this identifier, never on the tensor's values.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TensorId(usize);

impl TensorId {
    fn next() -> Self {
        Self(NEXT_TENSOR_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw value of the identifier.
    pub fn get(self) -> usize {
        self.0
    }
}

impl fmt::Display for TensorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

struct TensorInner {
    id: TensorId,
    data: RefCell<Matrix>,
    trainable: Cell<bool>,
}

/// Identity bearing handle around a [`Matrix`].
///
/// Cloning a tensor clones the handle: both clones share the identifier and the data, so an
/// in-place update made by the optimizer is observed through every clone. Use
/// [`Tensor::deep_clone`] to obtain a new, independent tensor.
#[derive(Clone)]
pub struct Tensor {
    inner: Rc<TensorInner>,
}

impl Tensor {
    /// Creates a trainable tensor wrapping `matrix`, with a fresh identifier.
    pub fn new(matrix: Matrix) -> Self {
        Self {
            inner: Rc::new(TensorInner {
                id: TensorId::next(),
                data: RefCell::new(matrix),
                trainable: Cell::new(true),
            }),
        }
    }

    /// Creates a tensor from a shape and a row-major list of values.
    pub fn from_shape_vec(shape: &Shape, values: Vec<f32>) -> Result<Self> {
        Ok(Self::new(Matrix::from_shape_vec(shape, values)?))
    }

    /// Creates a tensor with every element set to `value`.
    pub fn full(shape: &Shape, value: f32) -> Self {
        Self::new(Matrix::full(shape, value))
    }

    pub fn zeros(shape: &Shape) -> Self {
        Self::new(Matrix::zeros(shape))
    }

    pub fn ones(shape: &Shape) -> Self {
        Self::new(Matrix::ones(shape))
    }

    /// Creates a tensor of shape `(1)` holding `value`.
    pub fn scalar(value: f32) -> Self {
        Self::new(Matrix::scalar(value))
    }

    /// Creates a tensor from a **[ndarray]** array that owns its data.
    ///
    /// # Examples
    ///
    /// ```
    /// use myras_variable::Tensor;
    /// use ndarray::array;
    ///
    /// let t = Tensor::from_ndarray(array![[1., 2.], [3., 4.]]).unwrap();
    ///
    /// assert_eq!(t.shape().dimensions(), &[2, 2]);
    /// ```
    pub fn from_ndarray<D>(array: Array<f32, D>) -> Result<Self>
    where
        D: Dimension,
    {
        Ok(Self::new(Matrix::from_ndarray(array)?))
    }

    /// Sets the trainable flag, returning the tensor.
    pub fn with_trainable(self, trainable: bool) -> Self {
        self.set_trainable(trainable);
        self
    }

    pub fn id(&self) -> TensorId {
        self.inner.id
    }

    pub fn shape(&self) -> Shape {
        self.inner.data.borrow().shape().clone()
    }

    /// Borrows the underlying matrix.
    pub fn data(&self) -> Ref<Matrix> {
        self.inner.data.borrow()
    }

    /// Mutably borrows the underlying matrix.
    ///
    /// Writes are observed by every handle sharing this tensor's identity.
    pub fn data_mut(&self) -> RefMut<Matrix> {
        self.inner.data.borrow_mut()
    }

    /// Overwrites the values of the tensor in place, keeping its identity.
    ///
    /// Assigning a tensor its own borrowed data, as in `t.assign(&t.data())`, leaves it
    /// unchanged. Any other outstanding borrow of the data makes this call panic.
    pub fn assign(&self, values: &Matrix) -> Result<()> {
        if ptr::eq(values, self.inner.data.as_ptr()) {
            return Ok(());
        }

        self.inner.data.borrow_mut().assign(values)
    }

    /// Returns a copy of the underlying matrix.
    pub fn to_matrix(&self) -> Matrix {
        self.inner.data.borrow().clone()
    }

    pub fn is_trainable(&self) -> bool {
        self.inner.trainable.get()
    }

    pub fn set_trainable(&self, trainable: bool) {
        self.inner.trainable.set(trainable)
    }

    /// Creates a new tensor, with its own identifier, holding a copy of the values.
    pub fn deep_clone(&self) -> Self {
        Self::new(self.to_matrix()).with_trainable(self.is_trainable())
    }
}

impl fmt::Debug for Tensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tensor")
            .field("id", &self.id())
            .field("trainable", &self.is_trainable())
            .field("data", &*self.data())
            .finish()
    }
}

impl fmt::Display for Tensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.data())
    }
}
