#[cfg(test)]
use approx::AbsDiffEq;

#[cfg(test)]
use ndarray::{ArrayD, Dimension};

#[cfg(test)]
use crate::Tensor;

#[cfg(test)]
pub(crate) const F16_EPSILON: f32 = 4.88e-04;

#[cfg(test)]
pub(crate) fn new_tensor<D: Dimension>(array: ndarray::Array<f32, D>) -> Tensor {
    Tensor::from_ndarray(array).unwrap()
}

#[cfg(test)]
pub(crate) fn are_similar<D: Dimension>(
    result: &Tensor,
    expected: &ndarray::Array<f32, D>,
) -> Result<(), Box<dyn std::error::Error>> {
    let expected: ArrayD<f32> = expected.clone().into_dyn();
    let data = result.data();

    if data.array().shape() != expected.shape() || !data.array().abs_diff_eq(&expected, F16_EPSILON)
    {
        return Err(format!("Result: {} | Expected: {}", data, expected).into());
    }

    Ok(())
}

/// Central finite difference of the scalar `f` with respect to every element of `input`.
#[cfg(test)]
pub(crate) fn numerical_gradient<F>(input: &Tensor, f: F) -> ArrayD<f32>
where
    F: Fn() -> f32,
{
    const H: f32 = 1e-2;

    let original = input.to_matrix();
    let mut gradient = ArrayD::zeros(original.array().raw_dim());

    for (flat, gradient_el) in gradient.iter_mut().enumerate() {
        let value = original.value(flat).unwrap();

        input.data_mut().set_value(flat, value + H).unwrap();
        let plus = f();
        input.data_mut().set_value(flat, value - H).unwrap();
        let minus = f();
        input.data_mut().set_value(flat, value).unwrap();

        *gradient_el = (plus - minus) / (2. * H);
    }

    gradient
}
