use std::error::Error;

use ndarray::array;

use crate::{
    ops::relu,
    utils::{are_similar, new_tensor},
    GradientTape,
};

mod forward {
    use super::*;

    #[test]
    fn base_case() -> Result<(), Box<dyn Error>> {
        let operand = new_tensor(array![[-2., -0.5], [0.5, 3.]]);

        are_similar(&relu(&operand, None)?, &array![[0., 0.], [0.5, 3.]])
    }
}

mod backward {
    use super::*;

    #[test]
    fn derivative() -> Result<(), Box<dyn Error>> {
        let operand = new_tensor(array![-2., 0.5, 3.]);

        let tape = GradientTape::new();
        let activated = relu(&operand, Some(&tape))?;

        are_similar(&tape.gradient(&activated, &operand)?, &array![0., 1., 1.])
    }

    #[test]
    fn undefined_at_zero() -> Result<(), Box<dyn Error>> {
        let operand = new_tensor(array![0., 1.]);

        let tape = GradientTape::new();
        let activated = relu(&operand, Some(&tape))?;
        let gradient = tape.gradient(&activated, &operand)?.data().to_vec();

        assert!(gradient[0].is_nan());
        assert_eq!(gradient[1], 1.);
        Ok(())
    }
}
