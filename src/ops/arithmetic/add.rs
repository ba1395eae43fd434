use ndarray::ArrayD;

use crate::autograd::BackwardOp;
use crate::error::MinigradError;
use crate::node::broadcast_utils::broadcast_zip;
use crate::node::Node;

/// Element-wise addition with broadcasting.
pub fn add_op(a: &Node, b: &Node) -> Result<Node, MinigradError> {
    let value = broadcast_zip(a.value(), b.value(), |x, y| x + y)?;
    Ok(Node::from_op(
        value,
        vec![a.clone(), b.clone()],
        Box::new(AddBackward),
    ))
}

/// Backward rule for addition: the gradient flows through unchanged.
#[derive(Debug)]
pub(crate) struct AddBackward;

impl BackwardOp for AddBackward {
    fn pass_gradients(&self, grad: &ArrayD<f64>, node: &Node) -> Result<(), MinigradError> {
        let parents = node.parents();
        parents[0].receive_gradient(grad)?;
        parents[1].receive_gradient(grad)?;
        Ok(())
    }
}
