use std::error::Error;

use ndarray::{array, Array};

use crate::{
    ops::{dot, mul},
    utils::{are_similar, new_tensor, numerical_gradient},
    GradientTape,
};

mod forward {
    use super::*;

    #[test]
    fn matrices() -> Result<(), Box<dyn Error>> {
        let left = new_tensor(array![[1., 2., 3.], [4., 5., 6.]]);
        let right = new_tensor(array![[7., 8.], [9., 10.], [11., 12.]]);

        are_similar(&dot(&left, &right, None)?, &array![[58., 64.], [139., 154.]])
    }

    #[test]
    fn vectors() -> Result<(), Box<dyn Error>> {
        let left = new_tensor(array![1., 2., 3.]);
        let right = new_tensor(array![4., 5., 6.]);

        are_similar(&dot(&left, &right, None)?, &array![32.])
    }

    #[test]
    fn invalid_rank() {
        let left = new_tensor(Array::zeros((2, 2, 2)));
        let right = new_tensor(Array::zeros((2, 2)));

        assert!(dot(&left, &right, None).is_err());
    }
}

mod backward {
    use super::*;

    #[test]
    fn matrices() -> Result<(), Box<dyn Error>> {
        let left = new_tensor(array![[1., 2., 3.], [4., 5., 6.]]);
        let right = new_tensor(array![[7., 8.], [9., 10.], [11., 12.]]);

        let tape = GradientTape::new();
        let product = dot(&left, &right, Some(&tape))?;
        let gradients = tape.gradients(&product, &[&left, &right])?;

        are_similar(
            &gradients[0],
            &array![[15., 19., 23.], [15., 19., 23.]],
        )?;
        are_similar(&gradients[1], &array![[5., 5.], [7., 7.], [9., 9.]])
    }

    #[test]
    fn vectors() -> Result<(), Box<dyn Error>> {
        let left = new_tensor(array![1., 2., 3.]);
        let right = new_tensor(array![4., 5., 6.]);

        let tape = GradientTape::new();
        let product = dot(&left, &right, Some(&tape))?;
        let gradients = tape.gradients(&product, &[&left, &right])?;

        are_similar(&gradients[0], &array![4., 5., 6.])?;
        are_similar(&gradients[1], &array![1., 2., 3.])
    }

    #[test]
    fn matches_finite_differences() -> Result<(), Box<dyn Error>> {
        let left = new_tensor(array![[0.5, -1.], [2., 0.25], [1., 1.]]);
        let right = new_tensor(array![[1., -2., 0.5], [3., 0., -1.]]);
        let weights = new_tensor(array![[1., 2., 3.], [-1., 0.5, 2.], [0., 1., -2.]]);

        let loss = || {
            let product = dot(&left, &right, None).unwrap();
            mul(&product, &weights, None).unwrap().data().sum()
        };

        let tape = GradientTape::new();
        let product = dot(&left, &right, Some(&tape))?;
        let weighted = mul(&product, &weights, Some(&tape))?;
        let gradients = tape.gradients(&weighted, &[&left, &right])?;

        are_similar(&gradients[0], &numerical_gradient(&left, loss))?;
        are_similar(&gradients[1], &numerical_gradient(&right, loss))
    }
}
