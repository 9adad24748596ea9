//! Layers' parameters initialization functions.
//!
//! Every random draw of this module goes through a thread local generator, which can be seeded
//! with [`manual_seed`] to make weight initialization reproducible.
//!
//! ```
//! use myras_core::Shape;
//! use myras_nn::init;
//!
//! init::manual_seed(42);
//! let first = init::random(&Shape::new([2, 3]).unwrap(), -0.1, 0.1).unwrap();
//!
//! init::manual_seed(42);
//! let second = init::random(&Shape::new([2, 3]).unwrap(), -0.1, 0.1).unwrap();
//!
//! assert_eq!(*first.data(), *second.data());
//! ```
use std::cell::RefCell;

use ndarray::{ArrayD, IxDyn};
use ndarray_rand::RandomExt;
use rand::{rngs::StdRng, SeedableRng};
use rand_distr::{Distribution, Uniform};

use myras_core::{ConfigError, Matrix, Result, Shape};
use myras_variable::Tensor;

thread_local! {
    static GENERATOR: RefCell<StdRng> = RefCell::new(StdRng::from_entropy());
}

/// Seeds the generator used by the initializers of the current thread.
pub fn manual_seed(seed: u64) {
    GENERATOR.with(|generator| *generator.borrow_mut() = StdRng::seed_from_u64(seed));
}

fn with_generator<T>(f: impl FnOnce(&mut StdRng) -> T) -> T {
    GENERATOR.with(|generator| f(&mut generator.borrow_mut()))
}

fn distribution(low: f32, high: f32) -> Result<Uniform<f32>> {
    if !(low < high) {
        return Err(ConfigError::InvalidHyperparameter {
            name: "high",
            value: high,
        }
        .into());
    }

    Ok(Uniform::new(low, high))
}

/// Returns the bound *r* of the *U(-r, r)* distribution proposed in [Understanding the difficulty
/// of training deep feedforward neural
/// networks](http://proceedings.mlr.press/v9/glorot10a/glorot10a.pdf) - Glorot, X. & Bengio, Y.
/// (2010), that is *sqrt(6 / (fan_in + fan_out))*.
pub fn glorot_range(fan_in: usize, fan_out: usize) -> f32 {
    (6. / (fan_in + fan_out) as f32).sqrt()
}

/// Creates a tensor of shape `shape` with elements drawn from *U(low, high)*.
///
/// # Errors
///
/// If `low` >= `high`.
pub fn random(shape: &Shape, low: f32, high: f32) -> Result<Tensor> {
    let distribution = distribution(low, high)?;
    let array = with_generator(|generator| {
        ArrayD::random_using(IxDyn(shape.dimensions()), distribution, generator)
    });

    Ok(Tensor::new(Matrix::from_ndarray(array)?))
}

/// Fills the tensor with a constant value.
///
/// # Arguments
///
/// * `param` - tensor to initialize.
///
/// * `value` - value to fill the tensor with.
pub fn constant(param: &Tensor, value: f32) {
    param.data_mut().view_mut().map_inplace(|el| *el = value);
}

/// Fills the tensor with elements drawn from the uniform distribution *U(low, high)*.
///
/// # Arguments
///
/// * `param` - tensor to initialize.
///
/// * `low` - lower bound of the uniform distribution.
///
/// * `high` - upper bound of the uniform distribution.
///
/// # Errors
///
/// If `low` >= `high`.
pub fn uniform(param: &Tensor, low: f32, high: f32) -> Result<()> {
    let unif_dstr = distribution(low, high)?;
    with_generator(|generator| {
        param
            .data_mut()
            .view_mut()
            .map_inplace(|el| *el = unif_dstr.sample(generator))
    });

    Ok(())
}

/// Fills the tensor with elements drawn from *U(-r, r)*, with *r* given by [`glorot_range`].
///
/// # Errors
///
/// If both `fan_in` and `fan_out` are zero.
pub fn xavier_uniform(param: &Tensor, fan_in: usize, fan_out: usize) -> Result<()> {
    let range = glorot_range(fan_in, fan_out);
    if !range.is_finite() {
        return Err(ConfigError::InvalidHyperparameter {
            name: "fan_in + fan_out",
            value: 0.,
        }
        .into());
    }

    uniform(param, -range, range)
}

#[cfg(test)]
mod test {
    use super::*;

    fn shape() -> Shape {
        Shape::new([4, 5]).unwrap()
    }

    #[test]
    fn seeded_draws_are_reproducible() {
        manual_seed(7);
        let first = random(&shape(), -1., 1.).unwrap();
        manual_seed(7);
        let second = random(&shape(), -1., 1.).unwrap();

        assert_eq!(*first.data(), *second.data());
    }

    #[test]
    fn random_is_bounded() {
        let tensor = random(&shape(), -0.1, 0.1).unwrap();

        assert_eq!(tensor.shape(), shape());
        assert!(tensor.data().iter().all(|&el| (-0.1..0.1).contains(&el)));
    }

    #[test]
    fn uniform_is_in_place() {
        let tensor = Tensor::zeros(&shape());
        let handle = tensor.clone();

        uniform(&tensor, 2., 3.).unwrap();

        assert!(handle.data().iter().all(|&el| (2. ..3.).contains(&el)));
    }

    #[test]
    fn empty_interval() {
        assert!(uniform(&Tensor::zeros(&shape()), 1., 1.).is_err());
        assert!(random(&shape(), 1., 0.).is_err());
    }

    #[test]
    fn constant_fill() {
        let tensor = Tensor::zeros(&shape());

        constant(&tensor, 0.01);

        assert!(tensor.data().iter().all(|&el| (el - 0.01).abs() <= f32::EPSILON));
    }

    #[test]
    fn glorot() {
        assert!((glorot_range(1, 2) - 2f32.sqrt()).abs() <= f32::EPSILON);

        let tensor = Tensor::zeros(&shape());
        xavier_uniform(&tensor, 50, 100).unwrap();
        let range = glorot_range(50, 100);
        assert!(tensor.data().iter().all(|&el| el.abs() <= range));

        assert!(xavier_uniform(&tensor, 0, 0).is_err());
    }
}
