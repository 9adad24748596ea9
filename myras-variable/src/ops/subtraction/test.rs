use std::error::Error;

use ndarray::{array, Array};

use crate::{
    ops::sub,
    utils::{are_similar, new_tensor},
    GradientTape,
};

mod forward {
    use super::*;

    #[test]
    fn base_case() -> Result<(), Box<dyn Error>> {
        let left = new_tensor(array![[5., 6.], [7., 8.]]);
        let right = new_tensor(array![[1., 2.], [3., 4.]]);

        are_similar(&sub(&left, &right, None)?, &Array::from_elem((2, 2), 4.))
    }

    #[test]
    fn right_broadcast() -> Result<(), Box<dyn Error>> {
        let left = new_tensor(array![[5., 6.], [7., 8.]]);
        let right = new_tensor(array![[1.], [2.]]);

        are_similar(&sub(&left, &right, None)?, &array![[4., 5.], [5., 6.]])
    }
}

mod backward {
    use super::*;

    #[test]
    fn negates_subtrahend() -> Result<(), Box<dyn Error>> {
        let left = new_tensor(array![[5., 6.], [7., 8.]]);
        let right = new_tensor(array![[1.], [2.]]);

        let tape = GradientTape::new();
        let difference = sub(&left, &right, Some(&tape))?;
        let gradients = tape.gradients(&difference, &[&left, &right])?;

        are_similar(&gradients[0], &Array::ones((2, 2)))?;
        are_similar(&gradients[1], &array![[-2.], [-2.]])
    }
}
