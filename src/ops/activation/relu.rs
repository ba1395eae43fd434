use ndarray::ArrayD;

use crate::autograd::BackwardOp;
use crate::error::MinigradError;
use crate::node::broadcast_utils::broadcast_zip;
use crate::node::Node;

/// Rectified Linear Unit, element-wise: `max(x, 0)`.
pub fn relu_op(x: &Node) -> Result<Node, MinigradError> {
    let value = x.value().mapv(|v| v.max(0.0));
    Ok(Node::from_op(value, vec![x.clone()], Box::new(ReluBackward)))
}

/// Backward rule for ReLU. The mask is derived from the forward output, which
/// is already clamped to be non-negative: the gradient flows where the output
/// is strictly positive and is exactly 0 at the kink.
#[derive(Debug)]
pub(crate) struct ReluBackward;

impl BackwardOp for ReluBackward {
    fn pass_gradients(&self, grad: &ArrayD<f64>, node: &Node) -> Result<(), MinigradError> {
        let mask = node.value().mapv(|v| if v > 0.0 { 1.0 } else { 0.0 });
        let contribution = broadcast_zip(&mask, grad, |m, g| m * g)?;
        node.parents()[0].receive_gradient(&contribution)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr1;

    #[test]
    fn relu_forward() {
        let x = Node::new(vec![-2.0, -1.0, 0.0, 1.0, 2.0]);
        let y = relu_op(&x).unwrap();
        assert_eq!(y.value(), &arr1(&[0.0, 0.0, 0.0, 1.0, 2.0]).into_dyn());
    }

    #[test]
    fn relu_backward_masks_non_positive() {
        let x = Node::new(vec![-2.0, -1.0, 0.0, 1.0, 2.0]);
        let loss = relu_op(&x).unwrap().sum().unwrap();
        loss.backward().unwrap();

        // Zero gradient at exactly 0: the mask comes from the clamped output.
        assert_eq!(
            x.grad().unwrap(),
            arr1(&[0.0, 0.0, 0.0, 1.0, 1.0]).into_dyn()
        );
    }

    #[test]
    fn relu_backward_in_chain() {
        // loss = sum(relu(x * 2))
        let x = Node::new(vec![-1.0, 1.0, 2.0]);
        let y = x.mul(vec![2.0, 2.0, 2.0]).unwrap();
        let loss = relu_op(&y).unwrap().sum().unwrap();
        loss.backward().unwrap();

        assert_eq!(x.grad().unwrap(), arr1(&[0.0, 2.0, 2.0]).into_dyn());
    }
}
