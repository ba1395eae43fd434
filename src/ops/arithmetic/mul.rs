use ndarray::ArrayD;

use crate::autograd::BackwardOp;
use crate::error::MinigradError;
use crate::node::broadcast_utils::broadcast_zip;
use crate::node::Node;

/// Element-wise multiplication with broadcasting.
pub fn mul_op(a: &Node, b: &Node) -> Result<Node, MinigradError> {
    let value = broadcast_zip(a.value(), b.value(), |x, y| x * y)?;
    Ok(Node::from_op(
        value,
        vec![a.clone(), b.clone()],
        Box::new(MulBackward),
    ))
}

/// Backward rule for multiplication: each operand's contribution is the
/// gradient times the sibling's forward value (product rule).
#[derive(Debug)]
pub(crate) struct MulBackward;

impl BackwardOp for MulBackward {
    fn pass_gradients(&self, grad: &ArrayD<f64>, node: &Node) -> Result<(), MinigradError> {
        let parents = node.parents();
        let grad_a = broadcast_zip(grad, parents[1].value(), |g, v| g * v)?;
        parents[0].receive_gradient(&grad_a)?;
        let grad_b = broadcast_zip(grad, parents[0].value(), |g, v| g * v)?;
        parents[1].receive_gradient(&grad_b)?;
        Ok(())
    }
}
