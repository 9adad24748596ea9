use std::error::Error;

use ndarray::array;

use crate::{
    ops::mse,
    utils::{are_similar, new_tensor},
    GradientTape,
};

mod forward {
    use super::*;

    #[test]
    fn mean_of_squared_errors() -> Result<(), Box<dyn Error>> {
        let predicted = new_tensor(array![[1.], [2.], [3.], [4.]]);
        let target = new_tensor(array![[0.], [2.], [5.], [4.]]);

        are_similar(&mse(&predicted, &target, None)?, &array![1.25])
    }
}

mod backward {
    use super::*;

    #[test]
    fn derivative() -> Result<(), Box<dyn Error>> {
        let predicted = new_tensor(array![[1.], [2.], [3.], [4.]]);
        let target = new_tensor(array![[0.], [2.], [5.], [4.]]);

        let tape = GradientTape::new();
        let loss = mse(&predicted, &target, Some(&tape))?;
        let gradients = tape.gradients(&loss, &[&predicted, &target])?;

        are_similar(&gradients[0], &array![[0.5], [0.], [-1.], [0.]])?;
        are_similar(&gradients[1], &array![[-0.5], [0.], [1.], [0.]])
    }
}
