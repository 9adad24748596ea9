use ndarray::Zip;
use tracing::trace;

use myras_core::{ConfigError, Matrix, Result, ShapeError};
use myras_variable::Tensor;

use crate::OptimizerParams;

/// Configuration of the [`Adam`] optimizer.
///
/// The momentum vectors hold one zero filled matrix per trainable weight, shaped like that
/// weight and in the same order.
#[derive(Clone, Debug, PartialEq)]
pub struct AdamConfig {
    pub first_momentum_vector: Vec<Matrix>,
    pub second_momentum_vector: Vec<Matrix>,
    /// Defaults to *1e-3*.
    pub learning_rate: f32,
    /// Defaults to *0.9*.
    pub decay_rate1: f32,
    /// Defaults to *0.999*.
    pub decay_rate2: f32,
    /// Defaults to *1e-7*.
    pub epsilon: f32,
}

impl AdamConfig {
    /// Creates a configuration with default hyperparameters.
    pub fn new(first_momentum_vector: Vec<Matrix>, second_momentum_vector: Vec<Matrix>) -> Self {
        Self {
            first_momentum_vector,
            second_momentum_vector,
            ..Self::from_params(&OptimizerParams::default())
        }
    }

    /// Overrides the hyperparameters with `params`.
    pub fn with_params(self, params: &OptimizerParams) -> Self {
        Self {
            first_momentum_vector: self.first_momentum_vector,
            second_momentum_vector: self.second_momentum_vector,
            ..Self::from_params(params)
        }
    }

    fn from_params(params: &OptimizerParams) -> Self {
        Self {
            first_momentum_vector: Vec::new(),
            second_momentum_vector: Vec::new(),
            learning_rate: params.learning_rate,
            decay_rate1: params.decay_rate1,
            decay_rate2: params.decay_rate2,
            epsilon: params.epsilon,
        }
    }
}

/// Adam optimizer.
///
/// It has been proposed in
/// [Adam: A Method for Stochastic Optimization](https://arxiv.org/abs/1412.6980).
#[derive(Debug)]
pub struct Adam {
    lr: f32,
    beta1: f32,
    beta2: f32,
    eps: f32,
    step: usize,
    exp_avg: Vec<Matrix>,
    exp_avg_sq: Vec<Matrix>,
}

impl Adam {
    /// Creates a new Adam optimizer, validating `config`.
    ///
    /// Fails if the momentum vectors are empty or of different lengths, if two momentum
    /// matrices at the same position disagree on their shape, or if a hyperparameter is out of
    /// its range.
    pub fn new(config: AdamConfig) -> Result<Self> {
        let AdamConfig {
            first_momentum_vector,
            second_momentum_vector,
            learning_rate,
            decay_rate1,
            decay_rate2,
            epsilon,
        } = config;

        if first_momentum_vector.is_empty() || second_momentum_vector.is_empty() {
            return Err(ConfigError::MissingMomentumVectors.into());
        }

        if first_momentum_vector.len() != second_momentum_vector.len() {
            return Err(ConfigError::MomentumLengthMismatch {
                first: first_momentum_vector.len(),
                second: second_momentum_vector.len(),
            }
            .into());
        }

        for (first, second) in first_momentum_vector.iter().zip(&second_momentum_vector) {
            check_shape(first, second)?;
        }

        check_hyperparameter("learning_rate", learning_rate, learning_rate > 0.)?;
        check_hyperparameter("decay_rate1", decay_rate1, (0. ..1.).contains(&decay_rate1))?;
        check_hyperparameter("decay_rate2", decay_rate2, (0. ..1.).contains(&decay_rate2))?;
        check_hyperparameter("epsilon", epsilon, epsilon >= 0.)?;

        Ok(Self {
            lr: learning_rate,
            beta1: decay_rate1,
            beta2: decay_rate2,
            eps: epsilon,
            step: 0,
            exp_avg: first_momentum_vector,
            exp_avg_sq: second_momentum_vector,
        })
    }

    /// Return the current learning rate.
    pub fn learning_rate(&self) -> f32 {
        self.lr
    }

    /// Sets `lr` as the new value for the learning rate.
    pub fn set_learning_rate(&mut self, lr: f32) {
        self.lr = lr;
    }

    /// Return the current values for the first exponential decay rate.
    pub fn decay_rate1(&self) -> f32 {
        self.beta1
    }

    /// Return the current values for the second exponential decay rate.
    pub fn decay_rate2(&self) -> f32 {
        self.beta2
    }

    /// Returns the current epsilon constant.
    pub fn epsilon(&self) -> f32 {
        self.eps
    }

    /// Number of steps performed so far.
    pub fn iteration(&self) -> usize {
        self.step
    }

    /// Running averages of the gradients, one per weight.
    pub fn first_momentum(&self) -> &[Matrix] {
        &self.exp_avg
    }

    /// Running averages of the squared gradients, one per weight.
    pub fn second_momentum(&self) -> &[Matrix] {
        &self.exp_avg_sq
    }

    /// Performs a single optimization step.
    ///
    /// The values of every tensor in `weights` are overwritten in place, so the update is
    /// observed through every handle sharing the tensor.
    ///
    /// # Arguments
    ///
    /// * `weights` - trainable tensors, in the order the momentum vectors were built.
    ///
    /// * `gradients` - gradient of the loss with respect to each weight.
    pub fn optimize(&mut self, weights: &[Tensor], gradients: &[Tensor]) -> Result<()> {
        if weights.len() != gradients.len() || weights.len() != self.exp_avg.len() {
            return Err(ConfigError::LengthMismatch {
                weights: weights.len(),
                gradients: gradients.len(),
                first_momentum: self.exp_avg.len(),
                second_momentum: self.exp_avg_sq.len(),
            }
            .into());
        }

        for ((weight, gradient), exp_avg) in weights.iter().zip(gradients).zip(&self.exp_avg) {
            check_shape(exp_avg, &weight.data())?;
            check_shape(exp_avg, &gradient.data())?;
        }

        self.step += 1;
        trace!(step = self.step, parameters = weights.len(), "adam step");

        let (beta1, beta2, lr, eps) = (self.beta1, self.beta2, self.lr, self.eps);
        let bias_correction1 = 1.0 - beta1.powi(self.step as i32);
        let bias_correction2 = 1.0 - beta2.powi(self.step as i32);

        for (((weight, gradient), exp_avg), exp_avg_sq) in weights
            .iter()
            .zip(gradients)
            .zip(&mut self.exp_avg)
            .zip(&mut self.exp_avg_sq)
        {
            // Copied so that a weight passed as its own gradient does not alias the update.
            let grad = gradient.to_matrix();

            Zip::from(exp_avg.view_mut())
                .and(grad.array())
                .par_for_each(|exp_avg_el, &grad_el| {
                    *exp_avg_el = *exp_avg_el * beta1 + grad_el * (1.0 - beta1)
                });

            Zip::from(exp_avg_sq.view_mut())
                .and(grad.array())
                .par_for_each(|exp_avg_sq_el, &grad_el| {
                    *exp_avg_sq_el = *exp_avg_sq_el * beta2 + grad_el * grad_el * (1.0 - beta2)
                });

            let mut data = weight.data_mut();
            Zip::from(data.view_mut())
                .and(exp_avg.array())
                .and(exp_avg_sq.array())
                .par_for_each(|data_el, &exp_avg_el, &exp_avg_sq_el| {
                    *data_el -= exp_avg_el / ((exp_avg_sq_el.sqrt() / bias_correction2.sqrt()) + eps)
                        * (lr / bias_correction1)
                });
        }

        Ok(())
    }
}

fn check_shape(expected: &Matrix, got: &Matrix) -> Result<()> {
    if expected.shape() != got.shape() {
        return Err(ShapeError::Mismatch {
            expected: expected.shape().clone(),
            got: got.shape().clone(),
        }
        .into());
    }

    Ok(())
}

fn check_hyperparameter(name: &'static str, value: f32, valid: bool) -> Result<()> {
    if !valid {
        return Err(ConfigError::InvalidHyperparameter { name, value }.into());
    }

    Ok(())
}
