use std::error::Error;

use ndarray::{array, Array};

use crate::{
    ops::{div, mul},
    utils::{are_similar, new_tensor, numerical_gradient},
    GradientTape,
};

mod forward {
    use super::*;

    #[test]
    fn base_case() -> Result<(), Box<dyn Error>> {
        let left = new_tensor(array![[2., 4.], [6., 8.]]);
        let right = new_tensor(Array::from_elem((2, 2), 2.));

        are_similar(&div(&left, &right, None)?, &array![[1., 2.], [3., 4.]])
    }

    #[test]
    fn scalar_divisor() -> Result<(), Box<dyn Error>> {
        let left = new_tensor(array![[2., 4.], [6., 8.]]);
        let right = new_tensor(array![4.]);

        are_similar(&div(&left, &right, None)?, &array![[0.5, 1.], [1.5, 2.]])
    }
}

mod backward {
    use super::*;

    #[test]
    fn same_shape() -> Result<(), Box<dyn Error>> {
        let left = new_tensor(array![1., 2.]);
        let right = new_tensor(array![2., 4.]);

        let tape = GradientTape::new();
        let quotient = div(&left, &right, Some(&tape))?;
        let gradients = tape.gradients(&quotient, &[&left, &right])?;

        are_similar(&gradients[0], &array![0.5, 0.25])?;
        are_similar(&gradients[1], &array![-0.25, -0.125])
    }

    #[test]
    fn broadcast_matches_finite_differences() -> Result<(), Box<dyn Error>> {
        let left = new_tensor(array![[1., 2.], [3., -4.]]);
        let right = new_tensor(array![2., 4.]);
        let weights = new_tensor(array![[1., 2.], [-1., 0.5]]);

        let loss = || {
            let quotient = div(&left, &right, None).unwrap();
            mul(&quotient, &weights, None).unwrap().data().sum()
        };

        let tape = GradientTape::new();
        let quotient = div(&left, &right, Some(&tape))?;
        let weighted = mul(&quotient, &weights, Some(&tape))?;
        let gradients = tape.gradients(&weighted, &[&left, &right])?;

        are_similar(&gradients[0], &numerical_gradient(&left, loss))?;
        are_similar(&gradients[1], &numerical_gradient(&right, loss))
    }
}
