#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};
use tracing::{debug, info, info_span};

use myras_core::{ConfigError, Matrix, ModelError, Result};
use myras_data::{XyData, XyRow};
use myras_optim::{Optimizer, OptimizerParams, OptimizerType};
use myras_variable::{GradientTape, Tensor};

use crate::{init, Layer, LayerGraph, LayerId, LossType};

/// Mean losses recorded by [`Model::fit`], one entry per epoch.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct History {
    pub train_loss: Vec<f32>,
    pub test_loss: Vec<f32>,
}

/// A neural network: a graph of layers, the designated input and output layers, and, once
/// compiled, the optimizer driving the training.
///
/// # Examples
///
/// ```
/// use myras_core::Shape;
/// use myras_data::XyData;
/// use myras_nn::{init, Activation, LayerGraph, Layers, LossType, Model};
/// use myras_optim::{OptimizerParams, OptimizerType};
///
/// init::manual_seed(0);
///
/// let mut graph = LayerGraph::new();
/// let input = Layers::input(&mut graph, Shape::new([1]).unwrap(), 4).unwrap();
/// let hidden = Layers::dense(8, true, Activation::Relu)(&mut graph, input).unwrap();
/// let output = Layers::dense(1, true, Activation::Linear)(&mut graph, hidden).unwrap();
///
/// let mut model = Model::new(graph, vec![input], vec![output]).unwrap();
/// model
///     .compile(OptimizerType::Adam, OptimizerParams::default(), LossType::Mse)
///     .unwrap();
///
/// let table: Vec<[f32; 2]> = (0..16).map(|i| [i as f32 / 16., i as f32 / 32.]).collect();
/// let data = XyData::convert(&table, 1).unwrap();
/// let (train, test) = data.split(0.75).unwrap();
///
/// let history = model.fit(&train, &test, 4, 2).unwrap();
/// assert_eq!(history.train_loss.len(), 2);
/// ```
#[derive(Debug)]
pub struct Model {
    layers: LayerGraph,
    inputs: Vec<LayerId>,
    outputs: Vec<LayerId>,
    trainable_weights: Vec<Tensor>,
    optimizer: Option<Optimizer>,
    loss: LossType,
}

impl Model {
    /// Creates a model over `layers`.
    ///
    /// # Arguments
    ///
    /// * `layers` - graph holding every layer of the model.
    ///
    /// * `inputs` - input layers, in the order the input tensors are given to
    /// [`forward_pass`](Model::forward_pass).
    ///
    /// * `outputs` - layers whose outputs are returned by the forward pass.
    pub fn new(layers: LayerGraph, inputs: Vec<LayerId>, outputs: Vec<LayerId>) -> Result<Self> {
        if inputs.is_empty() {
            return Err(ConfigError::NoLayers { role: "input" }.into());
        }
        if outputs.is_empty() {
            return Err(ConfigError::NoLayers { role: "output" }.into());
        }

        for &id in &inputs {
            let layer = layers.get(id)?;
            if !matches!(layer, Layer::Input(_)) {
                return Err(ConfigError::NotAnInput {
                    layer: layer.name().to_string(),
                }
                .into());
            }
        }
        for &id in &outputs {
            layers.get(id)?;
        }

        Ok(Self {
            layers,
            inputs,
            outputs,
            trainable_weights: Vec::new(),
            optimizer: None,
            loss: LossType::Mse,
        })
    }

    pub fn layers(&self) -> &LayerGraph {
        &self.layers
    }

    pub fn layer(&self, id: LayerId) -> Option<&Layer> {
        self.layers.layer(id)
    }

    pub fn inputs(&self) -> &[LayerId] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[LayerId] {
        &self.outputs
    }

    /// Weights updated by the optimizer, in the order its state is aligned to.
    pub fn trainable_weights(&self) -> &[Tensor] {
        &self.trainable_weights
    }

    pub fn optimizer(&self) -> Option<&Optimizer> {
        self.optimizer.as_ref()
    }

    pub fn loss(&self) -> LossType {
        self.loss
    }

    pub fn is_compiled(&self) -> bool {
        self.optimizer.is_some()
    }

    /// Prepares the model for training.
    ///
    /// Layers are visited breadth first from the inputs. The kernel of every dense layer is
    /// drawn again from *U(-r, r)* with *r = sqrt(6 / (fan_in + fan_out))*, where *fan_in* is
    /// the trailing output dimension of its first previous layer and *fan_out* the trailing
    /// input dimension of its first next layer, or zero if it has none. The kernel and the
    /// biases of trainable dense layers are collected in visiting order. A second pass in the
    /// same order builds the zero filled optimizer state. Compiling again starts over.
    ///
    /// # Arguments
    ///
    /// * `optimizer` - optimization algorithm.
    ///
    /// * `params` - hyperparameters of the optimizer.
    ///
    /// * `loss` - loss function minimized by [`fit`](Model::fit).
    pub fn compile(
        &mut self,
        optimizer: OptimizerType,
        params: OptimizerParams,
        loss: LossType,
    ) -> Result<()> {
        loss.ensure_implemented()?;

        let order = self.layers.breadth_first(&self.inputs)?;
        let mut trainable_weights = Vec::new();

        for &id in &order {
            let dense = match self.layers.get(id)? {
                Layer::Input(_) => continue,
                Layer::Dense(dense) => dense,
            };

            let fan_in = match dense.base.previous().first() {
                Some(&previous) => self.layers.get(previous)?.base().output_shape().last(),
                None => 0,
            };
            let fan_out = match dense.base.next().first() {
                Some(&next) => self.layers.get(next)?.base().input_shape().last(),
                None => 0,
            };
            init::xavier_uniform(dense.kernel(), fan_in, fan_out)?;

            if dense.base.is_trainable() {
                trainable_weights.extend(dense.base.trainable_weights().iter().cloned());
            }
        }

        let mut first_momentum = Vec::with_capacity(trainable_weights.len());
        for &id in &order {
            if let Layer::Dense(dense) = self.layers.get(id)? {
                if dense.base.is_trainable() {
                    first_momentum.extend(
                        dense
                            .base
                            .trainable_weights()
                            .iter()
                            .map(|weight| Matrix::zeros(&weight.shape())),
                    );
                }
            }
        }
        let second_momentum = first_momentum.clone();
        let optimizer = Optimizer::new(optimizer, &params, first_momentum, second_momentum)?;

        debug!(
            optimizer = %optimizer.kind(),
            %loss,
            weights = trainable_weights.len(),
            "compiled model"
        );

        self.trainable_weights = trainable_weights;
        self.optimizer = Some(optimizer);
        self.loss = loss;

        Ok(())
    }

    /// Evaluates the model.
    ///
    /// Every input tensor is assigned to the input layer at the same position, then the layers
    /// are evaluated breadth first following their successor links. A layer consumes the output
    /// of its first previous layer.
    ///
    /// Returns the outputs of the output layers, in order.
    ///
    /// # Arguments
    ///
    /// * `inputs` - one tensor per input layer, of shape `(batch, ..record_shape)`.
    ///
    /// * `tape` - tape recording every operation, if gradients are needed.
    pub fn forward_pass(
        &mut self,
        inputs: &[Tensor],
        tape: Option<&GradientTape>,
    ) -> Result<Vec<Tensor>> {
        if inputs.len() != self.inputs.len() {
            return Err(ConfigError::InputCountMismatch {
                expected: self.inputs.len(),
                got: inputs.len(),
            }
            .into());
        }

        for (&id, input) in self.inputs.iter().zip(inputs) {
            self.layers.get_mut(id)?.forward_pass(input.clone(), tape)?;
        }

        for id in self.layers.breadth_first(&self.inputs)? {
            let input = {
                let layer = self.layers.get(id)?;
                if matches!(layer, Layer::Input(_)) {
                    continue;
                }

                let previous = layer.base().previous().first().ok_or_else(|| {
                    ConfigError::Disconnected {
                        layer: layer.name().to_string(),
                    }
                })?;
                self.layers.get(*previous)?.base().output().clone()
            };

            self.layers.get_mut(id)?.forward_pass(input, tape)?;
        }

        self.outputs
            .iter()
            .map(|&id| -> Result<Tensor> { Ok(self.layers.get(id)?.base().output().clone()) })
            .collect()
    }

    fn predict_batch(&mut self, x: &Tensor, tape: Option<&GradientTape>) -> Result<Tensor> {
        self.forward_pass(std::slice::from_ref(x), tape)?
            .into_iter()
            .next()
            .ok_or_else(|| ConfigError::NoLayers { role: "output" }.into())
    }

    /// Trains the model.
    ///
    /// Every epoch runs one optimizer step per full batch of `train`, then measures the loss
    /// over the full batches of `test`. The loss is computed on the first output layer. The
    /// mean losses of each epoch are logged and returned. A set with no full batch has a mean
    /// loss of `NaN`.
    ///
    /// # Arguments
    ///
    /// * `train` - training set.
    ///
    /// * `test` - held out set.
    ///
    /// * `batch_size` - rows per batch.
    ///
    /// * `epochs` - number of passes over `train`.
    ///
    /// # Errors
    ///
    /// If the model is not compiled, and on the first failure of any batch.
    pub fn fit(
        &mut self,
        train: &XyData,
        test: &XyData,
        batch_size: usize,
        epochs: usize,
    ) -> Result<History> {
        if self.optimizer.is_none() {
            return Err(ModelError::NotCompiled.into());
        }

        let _span = info_span!("fit", epochs, batch_size).entered();
        info!(train = train.len(), test = test.len(), "training started");

        let mut history = History::default();
        for epoch in 0..epochs {
            let mut train_losses = Vec::new();

            for batch in train.batches(batch_size)? {
                let (x, y) = batch?;
                train_losses.push(self.train_batch(&x, &y)?);
            }

            let train_loss = mean(&train_losses);
            let test_loss = self.evaluate(test, batch_size)?;

            info!(epoch = epoch + 1, train_loss, test_loss, "epoch finished");
            history.train_loss.push(train_loss);
            history.test_loss.push(test_loss);
        }

        info!("training done");
        Ok(history)
    }

    /// Runs a forward pass on a recording tape, then one optimizer step. Returns the loss.
    fn train_batch(&mut self, x: &Tensor, y: &Tensor) -> Result<f32> {
        let tape = GradientTape::new();
        let predicted = self.predict_batch(x, Some(&tape))?;
        let error = self.loss.compute(&predicted, y, Some(&tape))?;

        let weights: Vec<&Tensor> = self.trainable_weights.iter().collect();
        let gradients = tape.gradients(&error, &weights)?;
        let loss = error.data().mean();
        tape.dispose();

        self.optimizer
            .as_mut()
            .ok_or(ModelError::NotCompiled)?
            .optimize(&self.trainable_weights, &gradients)?;

        Ok(loss)
    }

    /// Mean loss over the full batches of `data`, without updating the weights.
    pub fn evaluate(&mut self, data: &XyData, batch_size: usize) -> Result<f32> {
        let mut losses = Vec::new();

        for batch in data.batches(batch_size)? {
            let (x, y) = batch?;
            let predicted = self.predict_batch(&x, None)?;
            losses.push(self.loss.compute(&predicted, &y, None)?.data().mean());
        }

        Ok(mean(&losses))
    }

    /// Predicts the targets of the full batches of `data`.
    ///
    /// Returns one row per predicted record, holding its features and the values of the first
    /// output layer.
    pub fn predict(&mut self, data: &XyData, batch_size: usize) -> Result<XyData> {
        let mut rows = Vec::with_capacity(data.len());

        for batch in data.batches(batch_size)? {
            let (x, _) = batch?;
            let predicted = self.predict_batch(&x, None)?;

            let features = x.data().to_vec();
            let targets = predicted.data().to_vec();
            rows.extend(
                features
                    .chunks(x.shape().last())
                    .zip(targets.chunks(predicted.shape().last()))
                    .map(|(x, y)| XyRow::new(x.to_vec(), y.to_vec())),
            );
        }

        Ok(XyData::new(rows))
    }
}

fn mean(values: &[f32]) -> f32 {
    values.iter().sum::<f32>() / values.len() as f32
}
