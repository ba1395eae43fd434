use crate::error::MinigradError;
use crate::node::Node;
use crate::ops::arithmetic::mul_op;

/// Unary negation, defined as multiplication by a wrapped `-1` leaf. There is
/// no dedicated backward rule; the multiply's product rule handles it.
pub fn neg_op(x: &Node) -> Result<Node, MinigradError> {
    mul_op(x, &Node::from(-1.0))
}
