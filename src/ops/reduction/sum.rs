use ndarray::{arr0, ArrayD};

use crate::autograd::BackwardOp;
use crate::error::MinigradError;
use crate::node::broadcast_utils::broadcast_zip;
use crate::node::Node;

/// Reduction of all elements to a 0-dimensional scalar sum.
pub fn sum_op(x: &Node) -> Result<Node, MinigradError> {
    let value = arr0(x.value().sum()).into_dyn();
    Ok(Node::from_op(value, vec![x.clone()], Box::new(SumBackward)))
}

/// Backward rule for the sum reduction: the scalar gradient is broadcast over
/// a same-shape array of ones, so every input element receives it.
#[derive(Debug)]
pub(crate) struct SumBackward;

impl BackwardOp for SumBackward {
    fn pass_gradients(&self, grad: &ArrayD<f64>, node: &Node) -> Result<(), MinigradError> {
        let parent = &node.parents()[0];
        let ones = ArrayD::ones(parent.value().raw_dim());
        let contribution = broadcast_zip(grad, &ones, |g, one| g * one)?;
        parent.receive_gradient(&contribution)
    }
}
