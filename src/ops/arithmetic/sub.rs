use ndarray::ArrayD;

use crate::autograd::BackwardOp;
use crate::error::MinigradError;
use crate::node::broadcast_utils::broadcast_zip;
use crate::node::Node;

/// Element-wise subtraction with broadcasting.
pub fn sub_op(a: &Node, b: &Node) -> Result<Node, MinigradError> {
    let value = broadcast_zip(a.value(), b.value(), |x, y| x - y)?;
    Ok(Node::from_op(
        value,
        vec![a.clone(), b.clone()],
        Box::new(SubBackward),
    ))
}

/// Backward rule for subtraction: the right operand's contribution is negated.
#[derive(Debug)]
pub(crate) struct SubBackward;

impl BackwardOp for SubBackward {
    fn pass_gradients(&self, grad: &ArrayD<f64>, node: &Node) -> Result<(), MinigradError> {
        let parents = node.parents();
        parents[0].receive_gradient(grad)?;
        parents[1].receive_gradient(&grad.mapv(|g| -g))?;
        Ok(())
    }
}
