use ndarray::array;

use myras_core::{ConfigError, Error, Matrix, Shape, ShapeError};
use myras_variable::Tensor;

use super::*;
use crate::{Activation, LayerGraph, Layers};

fn shape(dimensions: &[usize]) -> Shape {
    Shape::new(dimensions.to_vec()).unwrap()
}

mod input {
    use super::*;

    #[test]
    fn creation() {
        let layer = Input::new(shape(&[3]), 8).unwrap();

        assert_eq!(layer.base.input_shape(), &shape(&[3]));
        assert_eq!(layer.base.batch_output_shape(), &shape(&[8, 3]));
        assert!(!layer.base.is_trainable());
        assert_eq!(layer.base.weights().count(), 0);
        assert_eq!(layer.base.output().shape(), shape(&[8, 3]));
    }

    #[test]
    fn forward_is_identity() {
        let mut layer = Input::new(shape(&[2]), 2).unwrap();
        let x = Tensor::from_ndarray(array![[1., 2.], [3., 4.]]).unwrap();

        let output = layer.forward_pass(x.clone(), None).unwrap();

        assert_eq!(output.data().to_vec(), vec![1., 2., 3., 4.]);
        assert_eq!(layer.base.input().id(), x.id());
        assert_eq!(layer.base.output().id(), output.id());
    }

    #[test]
    fn forward_wrong_record_shape() {
        let mut layer = Input::new(shape(&[2]), 2).unwrap();
        let x = Tensor::zeros(&shape(&[2, 3]));

        assert!(matches!(
            layer.forward_pass(x, None),
            Err(Error::Shape(ShapeError::Mismatch { .. }))
        ));
    }
}

mod dense {
    use super::*;

    #[test]
    fn creation() {
        let layer = Dense::new(4, 3, 2, true, Activation::Relu).unwrap();

        assert_eq!(layer.kernel().shape(), shape(&[4, 3]));
        assert!(layer
            .kernel()
            .data()
            .iter()
            .all(|&el| (-0.1..0.1).contains(&el)));

        let biases = layer.biases().unwrap();
        assert_eq!(biases.shape(), shape(&[4]));
        assert!(biases.data().iter().all(|&el| (el - 0.01).abs() <= f32::EPSILON));

        assert_eq!(layer.base.input_shape(), &shape(&[3]));
        assert_eq!(layer.base.batch_output_shape(), &shape(&[2, 4]));

        let weights: Vec<_> = layer.base.trainable_weights().iter().map(Tensor::id).collect();
        assert_eq!(weights, vec![layer.kernel().id(), biases.id()]);
    }

    #[test]
    fn without_biases() {
        let layer = Dense::new(4, 3, 2, false, Activation::Linear).unwrap();

        assert!(!layer.use_biases());
        assert_eq!(layer.base.trainable_weights().len(), 1);
        assert_eq!(layer.base.trainable_weights()[0].id(), layer.kernel().id());
    }

    #[test]
    fn zero_units() {
        assert!(Dense::new(0, 3, 2, true, Activation::Linear).is_err());
    }

    #[test]
    fn forward() {
        let mut layer = Dense::new(2, 2, 1, true, Activation::Relu).unwrap();
        layer
            .kernel()
            .assign(&Matrix::from_ndarray(array![[1., -1.], [2., 0.]]).unwrap())
            .unwrap();
        let x = Tensor::from_ndarray(array![[1., 2.]]).unwrap();

        let output = layer.forward_pass(x, None).unwrap();

        // x · kernelᵀ = [-1, 2], plus 0.01 of bias.
        let values = output.data().to_vec();
        assert_eq!(values[0], 0.);
        assert!((values[1] - 2.01).abs() <= 1e-6);
    }

    #[test]
    fn forward_without_biases() {
        let mut layer = Dense::new(2, 2, 1, false, Activation::Linear).unwrap();
        layer
            .kernel()
            .assign(&Matrix::from_ndarray(array![[1., -1.], [2., 0.]]).unwrap())
            .unwrap();
        let x = Tensor::from_ndarray(array![[1., 2.]]).unwrap();

        let output = layer.forward_pass(x, None).unwrap();

        assert_eq!(output.data().to_vec(), vec![-1., 2.]);
    }
}

mod graph {
    use super::*;

    #[test]
    fn default_names() {
        let mut graph = LayerGraph::new();
        let input = Layers::input(&mut graph, shape(&[1]), 4).unwrap();
        let first = Layers::dense(3, true, Activation::Relu)(&mut graph, input).unwrap();
        let second = Layers::dense(2, true, Activation::Linear)(&mut graph, first).unwrap();
        let named = graph.add_named(Input::new(shape(&[1]), 4).unwrap(), "features");

        assert_eq!(graph.layer(input).unwrap().name(), "input_1");
        assert_eq!(graph.layer(first).unwrap().name(), "dense_1");
        assert_eq!(graph.layer(second).unwrap().name(), "dense_2");
        assert_eq!(graph.layer(named).unwrap().name(), "features");
        assert_eq!(graph.len(), 4);
    }

    #[test]
    fn dense_binder_wiring() {
        let mut graph = LayerGraph::new();
        let input = Layers::input(&mut graph, shape(&[5]), 4).unwrap();
        let dense = Layers::dense(3, true, Activation::Relu)(&mut graph, input).unwrap();

        let layer = graph.layer(dense).unwrap();
        assert_eq!(layer.kind(), LayerType::Dense);
        assert_eq!(layer.base().previous(), &[input]);
        assert_eq!(graph.layer(input).unwrap().base().next(), &[dense]);
        assert_eq!(layer.base().batch_size(), 4);

        match layer {
            Layer::Dense(dense) => assert_eq!(dense.kernel().shape(), shape(&[3, 5])),
            Layer::Input(_) => panic!("expected a dense layer"),
        }
    }

    #[test]
    fn unknown_layer() {
        let mut graph = LayerGraph::new();
        let input = Layers::input(&mut graph, shape(&[1]), 1).unwrap();

        assert!(matches!(
            graph.connect(input, LayerId(7)),
            Err(Error::Config(ConfigError::UnknownLayer { layer: 7 }))
        ));
        assert!(Layers::dense(1, true, Activation::Relu)(&mut graph, LayerId(7)).is_err());
    }

    #[test]
    fn invalid_batch_size() {
        let mut graph = LayerGraph::new();

        assert!(matches!(
            Layers::input(&mut graph, shape(&[1]), 0),
            Err(Error::Config(ConfigError::InvalidBatchSize))
        ));
    }

    #[test]
    fn breadth_first_visits_once() {
        // input -> a -> c, input -> b -> c
        let mut graph = LayerGraph::new();
        let input = Layers::input(&mut graph, shape(&[2]), 1).unwrap();
        let a = Layers::dense(2, true, Activation::Relu)(&mut graph, input).unwrap();
        let b = Layers::dense(2, true, Activation::Relu)(&mut graph, input).unwrap();
        let c = Layers::dense(2, true, Activation::Linear)(&mut graph, a).unwrap();
        graph.connect(b, c).unwrap();

        assert_eq!(graph.breadth_first(&[input]).unwrap(), vec![input, a, b, c]);
    }
}
