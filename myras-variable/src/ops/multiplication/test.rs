use std::error::Error;

use ndarray::{array, Array};

use crate::{
    ops::mul,
    utils::{are_similar, new_tensor, numerical_gradient},
    GradientTape,
};

mod forward {
    use super::*;

    #[test]
    fn base_case() -> Result<(), Box<dyn Error>> {
        let left = new_tensor(Array::linspace(1., 9., 9).into_shape((3, 3))?);
        let right = new_tensor(Array::from_elem((3, 3), 2.));

        are_similar(
            &mul(&left, &right, None)?,
            &Array::linspace(2., 18., 9).into_shape((3, 3))?,
        )
    }

    #[test]
    fn left_broadcast() -> Result<(), Box<dyn Error>> {
        let left = new_tensor(array![[1., 2., 3.]]);
        let right = new_tensor(Array::from_elem((2, 2, 3), 2.));

        are_similar(
            &mul(&left, &right, None)?,
            &array![[[2., 4., 6.], [2., 4., 6.]], [[2., 4., 6.], [2., 4., 6.]]],
        )
    }
}

mod backward {
    use super::*;

    #[test]
    fn same_shape() -> Result<(), Box<dyn Error>> {
        let left = new_tensor(array![[1., 2.], [3., 4.]]);
        let right = new_tensor(array![[5., 6.], [7., 8.]]);

        let tape = GradientTape::new();
        let product = mul(&left, &right, Some(&tape))?;
        let gradients = tape.gradients(&product, &[&left, &right])?;

        are_similar(&gradients[0], &array![[5., 6.], [7., 8.]])?;
        are_similar(&gradients[1], &array![[1., 2.], [3., 4.]])
    }

    #[test]
    fn broadcast_matches_finite_differences() -> Result<(), Box<dyn Error>> {
        let left = new_tensor(array![0.5, -1., 2.]);
        let right = new_tensor(array![[1., 2., 3.], [-4., 5., 0.5]]);
        let weights = new_tensor(array![[1., -2., 3.], [0.5, 1., -1.]]);

        // Weighting the product gives a non uniform incoming gradient.
        let loss = || {
            let product = mul(&left, &right, None).unwrap();
            let weighted = mul(&product, &weights, None).unwrap();
            let total = weighted.data().sum();
            total
        };

        let tape = GradientTape::new();
        let product = mul(&left, &right, Some(&tape))?;
        let weighted = mul(&product, &weights, Some(&tape))?;
        let gradients = tape.gradients(&weighted, &[&left, &right])?;

        are_similar(&gradients[0], &numerical_gradient(&left, loss))?;
        are_similar(&gradients[1], &numerical_gradient(&right, loss))
    }

    #[test]
    fn square() -> Result<(), Box<dyn Error>> {
        let x = new_tensor(array![1., -2., 3.]);

        let tape = GradientTape::new();
        let squared = mul(&x, &x, Some(&tape))?;

        are_similar(&tape.gradient(&squared, &x)?, &array![2., -4., 6.])
    }
}
