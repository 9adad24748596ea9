use std::collections::{HashMap, HashSet, VecDeque};

use tracing::debug;

use myras_core::{ConfigError, Result, Shape};

use crate::{Activation, Dense, Input, Layer, LayerId, LayerType};

/// Arena owning the layers of a model and their connections.
///
/// Layers are addressed by [`LayerId`] handles. Connections are stored on both ends: every
/// layer knows the layers feeding it and the layers it feeds.
#[derive(Debug, Default)]
pub struct LayerGraph {
    layers: Vec<Layer>,
    names: HashMap<LayerType, usize>,
}

impl LayerGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Moves `layer` into the graph. A layer with an empty name gets a default one, unique
    /// among the layers of its type, such as `dense_3`.
    pub fn add(&mut self, layer: impl Into<Layer>) -> LayerId {
        let mut layer = layer.into();
        let counter = self.names.entry(layer.kind()).or_insert(0);
        *counter += 1;

        if layer.name().is_empty() {
            let name = format!("{}_{}", layer.kind().prefix(), counter);
            layer.base_mut().set_name(name);
        }

        let id = LayerId(self.layers.len());
        debug!(layer = layer.name(), id = id.get(), "added layer");
        self.layers.push(layer);

        id
    }

    /// Adds `layer` under the given name.
    pub fn add_named(&mut self, layer: impl Into<Layer>, name: impl Into<String>) -> LayerId {
        let mut layer = layer.into();
        layer.base_mut().set_name(name.into());

        self.add(layer)
    }

    pub fn layer(&self, id: LayerId) -> Option<&Layer> {
        self.layers.get(id.0)
    }

    pub fn layer_mut(&mut self, id: LayerId) -> Option<&mut Layer> {
        self.layers.get_mut(id.0)
    }

    pub(crate) fn get(&self, id: LayerId) -> Result<&Layer> {
        self.layer(id)
            .ok_or_else(|| ConfigError::UnknownLayer { layer: id.0 }.into())
    }

    pub(crate) fn get_mut(&mut self, id: LayerId) -> Result<&mut Layer> {
        self.layer_mut(id)
            .ok_or_else(|| ConfigError::UnknownLayer { layer: id.0 }.into())
    }

    /// Makes `to` a successor of `from`.
    pub fn connect(&mut self, from: LayerId, to: LayerId) -> Result<()> {
        self.get(to)?;
        self.get_mut(from)?.base_mut().next.push(to);
        self.get_mut(to)?.base_mut().previous.push(from);

        Ok(())
    }

    /// Iterates over the layers in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (LayerId, &Layer)> {
        self.layers
            .iter()
            .enumerate()
            .map(|(index, layer)| (LayerId(index), layer))
    }

    /// Lists the layers reachable from `roots`, level by level, following the successor links.
    ///
    /// The roots come first, in the given order. A layer reachable through several paths is
    /// listed once, at its first occurrence.
    pub fn breadth_first(&self, roots: &[LayerId]) -> Result<Vec<LayerId>> {
        let mut visited = HashSet::new();
        let mut queue: VecDeque<LayerId> = roots.iter().copied().collect();
        let mut order = Vec::with_capacity(self.layers.len());

        while let Some(id) = queue.pop_front() {
            if !visited.insert(id) {
                continue;
            }

            order.push(id);
            queue.extend(self.get(id)?.base().next());
        }

        Ok(order)
    }
}

/// Binder returned by [`Layers::dense`].
pub type LayerBinder = Box<dyn FnOnce(&mut LayerGraph, LayerId) -> Result<LayerId>>;

/// Factory of layers, used to declare the topology of a model.
///
/// ```
/// use myras_core::Shape;
/// use myras_nn::{Activation, LayerGraph, Layers};
///
/// let mut graph = LayerGraph::new();
/// let input = Layers::input(&mut graph, Shape::new([1]).unwrap(), 32).unwrap();
/// let hidden = Layers::dense(16, true, Activation::Relu)(&mut graph, input).unwrap();
/// let output = Layers::dense(1, true, Activation::Linear)(&mut graph, hidden).unwrap();
///
/// assert_eq!(graph.layer(output).unwrap().name(), "dense_2");
/// ```
pub struct Layers;

impl Layers {
    /// Adds an input layer for records of shape `shape` to `graph`.
    pub fn input(graph: &mut LayerGraph, shape: Shape, batch_size: usize) -> Result<LayerId> {
        if batch_size == 0 {
            return Err(ConfigError::InvalidBatchSize.into());
        }

        Ok(graph.add(Input::new(shape, batch_size)?))
    }

    /// Returns a binder that adds a dense layer after a given layer.
    ///
    /// The new layer is sized from the trailing output dimension of the previous one and
    /// inherits its batch size.
    ///
    /// # Arguments
    ///
    /// * `units` - number of output features.
    ///
    /// * `use_biases` - whether the layer adds a bias vector.
    ///
    /// * `activation` - non-linearity applied at the output.
    pub fn dense(units: usize, use_biases: bool, activation: Activation) -> LayerBinder {
        Box::new(move |graph: &mut LayerGraph, previous: LayerId| {
            let (previous_units, batch_size) = {
                let base = graph.get(previous)?.base();
                (base.output_shape().last(), base.batch_size())
            };

            let dense = Dense::new(units, previous_units, batch_size, use_biases, activation)?;
            let id = graph.add(dense);
            graph.connect(previous, id)?;

            Ok(id)
        })
    }
}
