use std::{error::Error, rc::Rc, result::Result};

use ndarray::array;

use myras_core::{Error as EngineError, GraphError};

use super::*;
use crate::{
    ops::{add, add_op, evaluate, mul, relu, sub},
    utils::{are_similar, new_tensor},
    NodeKey, OperationType, TensorOperation,
};

mod recording {
    use super::*;

    #[test]
    fn tensors_are_idempotent() -> Result<(), Box<dyn Error>> {
        let tape = GradientTape::new();
        let tensor = new_tensor(array![1., 2.]);

        tape.record_tensor(&tensor)?;
        tape.record_tensor(&tensor)?;

        assert_eq!(tape.graph().graph().node_count(), 1);
        assert!(tape.graph().contains_value(tensor.id()));
        Ok(())
    }

    #[test]
    fn operation_wiring() -> Result<(), Box<dyn Error>> {
        let tape = GradientTape::new();
        let x = new_tensor(array![1., 2.]);
        let y = new_tensor(array![3., 4.]);

        let z = add(&x, &y, Some(&tape))?;

        let graph = tape.graph();
        assert_eq!(graph.graph().node_count(), 4);
        assert_eq!(graph.graph().edge_count(), 3);

        let z_handle = graph.value_handle(z.id()).ok_or("z was not recorded")?;
        let producer = graph.producer(z_handle).ok_or("z has no producer")?;
        let operation = graph.operation(producer).ok_or("not an operation")?;
        assert_eq!(operation.kind(), OperationType::Addition);
        assert!(graph
            .graph()
            .contains(&NodeKey::Operation(operation.id())));
        Ok(())
    }

    #[test]
    fn shared_inputs_have_one_node() -> Result<(), Box<dyn Error>> {
        let tape = GradientTape::new();
        let x = new_tensor(array![1., 2.]);

        let squared = mul(&x, &x, Some(&tape))?;
        add(&squared, &x, Some(&tape))?;

        // x, x * x, x * x + x and the two operations.
        assert_eq!(tape.graph().graph().node_count(), 5);
        Ok(())
    }

    #[test]
    fn operations_are_recorded_once() -> Result<(), Box<dyn Error>> {
        let tape = GradientTape::new();
        let operation = Rc::new(add_op(&Tensor::scalar(1.), &Tensor::scalar(2.)));
        operation.call()?;

        tape.record(&operation)?;
        let result = tape.record(&operation);

        assert!(matches!(
            result,
            Err(EngineError::Graph(GraphError::OperationRecordedTwice { .. }))
        ));
        Ok(())
    }

    #[test]
    fn disposed_tape_rejects_recording() {
        let tape = GradientTape::new();
        tape.dispose();
        tape.dispose();

        assert_eq!(tape.phase(), TapePhase::Disposed);
        assert!(matches!(
            tape.record_tensor(&Tensor::scalar(1.)),
            Err(EngineError::Graph(GraphError::TapeDisposed))
        ));
        assert!(add(&Tensor::scalar(1.), &Tensor::scalar(2.), Some(&tape)).is_err());
    }

    #[test]
    fn dispose_clears_the_graph() -> Result<(), Box<dyn Error>> {
        let tape = GradientTape::new();
        add(&Tensor::scalar(1.), &Tensor::scalar(2.), Some(&tape))?;

        tape.dispose();

        assert!(tape.graph().graph().is_empty());
        Ok(())
    }
}

mod gradients {
    use super::*;

    #[test]
    fn phases() -> Result<(), Box<dyn Error>> {
        let tape = GradientTape::new();
        assert_eq!(tape.phase(), TapePhase::Recording);

        let x = Tensor::scalar(2.);
        let y = mul(&x, &x, Some(&tape))?;
        tape.gradient(&y, &x)?;

        assert_eq!(tape.phase(), TapePhase::Backpropagating);
        Ok(())
    }

    #[test]
    fn dependent_not_recorded() {
        let tape = GradientTape::new();
        let x = Tensor::scalar(2.);

        assert!(matches!(
            tape.gradient(&x, &x),
            Err(EngineError::Graph(GraphError::TensorNotRecorded { .. }))
        ));
    }

    #[test]
    fn independent_not_recorded() -> Result<(), Box<dyn Error>> {
        let tape = GradientTape::new();
        let x = Tensor::scalar(2.);
        let y = mul(&x, &x, Some(&tape))?;

        assert!(matches!(
            tape.gradient(&y, &Tensor::scalar(2.)),
            Err(EngineError::Graph(GraphError::TensorNotRecorded { .. }))
        ));
        Ok(())
    }

    #[test]
    fn dependent_without_producer() -> Result<(), Box<dyn Error>> {
        let tape = GradientTape::new();
        let x = Tensor::scalar(2.);
        tape.record_tensor(&x)?;

        assert!(matches!(
            tape.gradient(&x, &x),
            Err(EngineError::Graph(GraphError::NoProducer { .. }))
        ));
        Ok(())
    }

    #[test]
    fn diamond_accumulates_both_branches() -> Result<(), Box<dyn Error>> {
        // z = (x * y) + (x - y), dz/dx = y + 1, dz/dy = x - 1.
        let tape = GradientTape::new();
        let x = new_tensor(array![1., 2., 3.]);
        let y = new_tensor(array![4., 5., 6.]);

        let product = mul(&x, &y, Some(&tape))?;
        let difference = sub(&x, &y, Some(&tape))?;
        let z = add(&product, &difference, Some(&tape))?;

        let gradients = tape.gradients(&z, &[&x, &y])?;
        are_similar(&gradients[0], &array![5., 6., 7.])?;
        are_similar(&gradients[1], &array![0., 1., 2.])
    }

    #[test]
    fn unrelated_branches_are_ignored() -> Result<(), Box<dyn Error>> {
        let tape = GradientTape::new();
        let x = new_tensor(array![1., -2.]);
        let y = new_tensor(array![3., 4.]);

        let z = mul(&x, &y, Some(&tape))?;
        relu(&y, Some(&tape))?;

        let gradients = tape.gradients(&z, &[&y, &x])?;
        are_similar(&gradients[0], &array![1., -2.])?;
        are_similar(&gradients[1], &array![3., 4.])
    }

    #[test]
    fn repeated_requests_are_consistent() -> Result<(), Box<dyn Error>> {
        let tape = GradientTape::new();
        let x = new_tensor(array![1., 2.]);
        let y = mul(&x, &x, Some(&tape))?;

        let first = tape.gradient(&y, &x)?;
        let second = tape.gradient(&y, &x)?;

        assert_eq!(*first.data(), *second.data());
        assert!(!first.is_trainable());
        Ok(())
    }

    #[test]
    fn gradient_of_intermediate_value() -> Result<(), Box<dyn Error>> {
        let tape = GradientTape::new();
        let x = new_tensor(array![1., 2.]);
        let y = mul(&x, &x, Some(&tape))?;
        let z = add(&y, &x, Some(&tape))?;

        are_similar(&tape.gradient(&z, &y)?, &array![1., 1.])?;
        are_similar(&tape.gradient(&z, &x)?, &array![3., 5.])
    }

    #[test]
    fn operation_returning_its_input() -> Result<(), Box<dyn Error>> {
        // The output of the operation is its input handle, so the recorded graph has a cycle.
        let tape = GradientTape::new();
        let x = new_tensor(array![1., 2., 3.]);
        let pass_through = TensorOperation::new(
            OperationType::Output,
            vec![x.clone()],
            |op| Ok(vec![op.input(0)?.clone()]),
            |_, node| Ok(vec![Tensor::new(node.gradient().clone())]),
        );

        let out = evaluate(pass_through, Some(&tape))?;
        assert_eq!(out.id(), x.id());
        let y = mul(&out, &out, Some(&tape))?;

        are_similar(&tape.gradient(&y, &x)?, &array![2., 4., 6.])
    }

    #[test]
    fn cycle_off_the_dependent_path() -> Result<(), Box<dyn Error>> {
        let tape = GradientTape::new();
        let x = new_tensor(array![1., 2.]);
        let y = new_tensor(array![3., 4.]);
        evaluate(
            TensorOperation::new(
                OperationType::Output,
                vec![y.clone()],
                |op| Ok(vec![op.input(0)?.clone()]),
                |_, node| Ok(vec![Tensor::new(node.gradient().clone())]),
            ),
            Some(&tape),
        )?;

        let z = mul(&x, &x, Some(&tape))?;

        are_similar(&tape.gradient(&z, &x)?, &array![2., 4.])
    }
}
