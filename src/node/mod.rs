//! The computation-graph node type.
//!
//! A [`Node`] is a cheap handle (`Rc`) over one unit of the graph: the
//! forward value, the accumulating gradient, the `requires_grad` flag and the
//! ordered list of parent nodes. Cloning a `Node` aliases the same graph
//! node; a parent is kept alive by every child that references it, so the
//! graph is a DAG with shared ownership rather than a tree.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use ndarray::{arr0, Array1, Array2, ArrayD};

use crate::autograd::BackwardOp;
use crate::error::MinigradError;
use crate::ops;

mod autograd_methods;
pub(crate) mod broadcast_utils;

pub(crate) struct NodeData {
    /// Forward value, fixed at construction.
    pub(crate) value: ArrayD<f64>,
    /// Accumulated gradient; absent until the first contribution arrives.
    pub(crate) grad: RefCell<Option<ArrayD<f64>>>,
    /// When false, every gradient contribution is silently discarded.
    pub(crate) requires_grad: bool,
    /// The operation's inputs, in operand order. Empty for leaves.
    pub(crate) parents: Vec<Node>,
    /// Backward rule of the operation that produced this node, if any.
    pub(crate) grad_fn: Option<Box<dyn BackwardOp>>,
}

/// A unit of the computation graph.
///
/// `Node` uses `Rc<NodeData>` internally: multiple handles (and multiple
/// child nodes) share the same underlying node without copying it, and the
/// gradient slot is mutated through a `RefCell`. Node identity for graph
/// traversal is the `Rc` pointer, never value equality.
pub struct Node {
    pub(crate) data: Rc<NodeData>,
}

impl Clone for Node {
    fn clone(&self) -> Self {
        Node {
            data: Rc::clone(&self.data),
        }
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("value", &self.data.value)
            .field("grad", &*self.data.grad.borrow())
            .field("requires_grad", &self.data.requires_grad)
            .field("parents", &self.data.parents.len())
            .finish()
    }
}

/// Conversion into the engine's array value type, used by the leaf
/// constructors. Scalars become 0-dimensional arrays.
pub trait IntoArray {
    fn into_array(self) -> ArrayD<f64>;
}

impl IntoArray for f64 {
    fn into_array(self) -> ArrayD<f64> {
        arr0(self).into_dyn()
    }
}

impl IntoArray for Vec<f64> {
    fn into_array(self) -> ArrayD<f64> {
        Array1::from(self).into_dyn()
    }
}

impl IntoArray for Array1<f64> {
    fn into_array(self) -> ArrayD<f64> {
        self.into_dyn()
    }
}

impl IntoArray for Array2<f64> {
    fn into_array(self) -> ArrayD<f64> {
        self.into_dyn()
    }
}

impl IntoArray for ArrayD<f64> {
    fn into_array(self) -> ArrayD<f64> {
        self
    }
}

impl Node {
    /// Creates a leaf node that accumulates gradients (`requires_grad = true`).
    pub fn new(value: impl IntoArray) -> Node {
        Node::leaf(value.into_array(), true)
    }

    /// Creates a constant leaf node that discards gradient contributions.
    pub fn constant(value: impl IntoArray) -> Node {
        Node::leaf(value.into_array(), false)
    }

    fn leaf(value: ArrayD<f64>, requires_grad: bool) -> Node {
        Node {
            data: Rc::new(NodeData {
                value,
                grad: RefCell::new(None),
                requires_grad,
                parents: Vec::new(),
                grad_fn: None,
            }),
        }
    }

    /// Creates an operation node. Operation nodes always participate in
    /// differentiation; the `requires_grad` gate only matters at the leaves.
    pub(crate) fn from_op(
        value: ArrayD<f64>,
        parents: Vec<Node>,
        grad_fn: Box<dyn BackwardOp>,
    ) -> Node {
        Node {
            data: Rc::new(NodeData {
                value,
                grad: RefCell::new(None),
                requires_grad: true,
                parents,
                grad_fn: Some(grad_fn),
            }),
        }
    }

    /// The forward value.
    pub fn value(&self) -> &ArrayD<f64> {
        &self.data.value
    }

    /// A clone of the accumulated gradient, if any contribution has arrived.
    pub fn grad(&self) -> Option<ArrayD<f64>> {
        self.data.grad.borrow().clone()
    }

    /// Whether this node accumulates gradient contributions.
    pub fn requires_grad(&self) -> bool {
        self.data.requires_grad
    }

    /// The operation's inputs, in operand order. Empty for leaves.
    pub fn parents(&self) -> &[Node] {
        &self.data.parents
    }

    /// Stable identity of the underlying graph node.
    ///
    /// Two handles compare equal here exactly when they alias the same node;
    /// structurally equal values on distinct nodes do not. This is the
    /// deduplication key for the graph traversals.
    pub fn node_id(&self) -> usize {
        Rc::as_ptr(&self.data) as usize
    }

    // --- Operation methods ---
    //
    // Raw scalars and arrays are wrapped into fresh leaves via `Into<Node>`,
    // so `x.mul(4.0)` and `x.mul(&y)` both work.

    /// Element-wise addition.
    pub fn add(&self, other: impl Into<Node>) -> Result<Node, MinigradError> {
        ops::arithmetic::add_op(self, &other.into())
    }

    /// Element-wise subtraction.
    pub fn sub(&self, other: impl Into<Node>) -> Result<Node, MinigradError> {
        ops::arithmetic::sub_op(self, &other.into())
    }

    /// Element-wise multiplication.
    pub fn mul(&self, other: impl Into<Node>) -> Result<Node, MinigradError> {
        ops::arithmetic::mul_op(self, &other.into())
    }

    /// Element-wise power.
    pub fn pow(&self, exponent: impl Into<Node>) -> Result<Node, MinigradError> {
        ops::arithmetic::pow_op(self, &exponent.into())
    }

    /// Unary negation (multiplication by -1).
    pub fn neg(&self) -> Result<Node, MinigradError> {
        ops::arithmetic::neg_op(self)
    }

    /// Matrix product with the usual 1-D/2-D semantics.
    pub fn matmul(&self, other: impl Into<Node>) -> Result<Node, MinigradError> {
        ops::linalg::matmul_op(self, &other.into())
    }

    /// Rectified linear unit, element-wise.
    pub fn relu(&self) -> Result<Node, MinigradError> {
        ops::activation::relu_op(self)
    }

    /// Reduction of all elements to a scalar sum.
    pub fn sum(&self) -> Result<Node, MinigradError> {
        ops::reduction::sum_op(self)
    }
}

impl From<&Node> for Node {
    fn from(node: &Node) -> Node {
        node.clone()
    }
}

impl From<f64> for Node {
    fn from(value: f64) -> Node {
        Node::new(value)
    }
}

impl From<Vec<f64>> for Node {
    fn from(value: Vec<f64>) -> Node {
        Node::new(value)
    }
}

impl From<Array1<f64>> for Node {
    fn from(value: Array1<f64>) -> Node {
        Node::new(value)
    }
}

impl From<Array2<f64>> for Node {
    fn from(value: Array2<f64>) -> Node {
        Node::new(value)
    }
}

impl From<ArrayD<f64>> for Node {
    fn from(value: ArrayD<f64>) -> Node {
        Node::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr1, arr2, IxDyn};

    #[test]
    fn scalar_leaf_wraps_to_zero_dim() {
        let x = Node::new(3.0);
        assert_eq!(x.value().ndim(), 0);
        assert_eq!(x.value().sum(), 3.0);
        assert!(x.requires_grad());
        assert!(x.parents().is_empty());
        assert!(x.grad().is_none());
    }

    #[test]
    fn constant_leaf_does_not_require_grad() {
        let c = Node::constant(vec![1.0, 2.0]);
        assert!(!c.requires_grad());
    }

    #[test]
    fn from_conversions_wrap_arrays() {
        let v = Node::from(arr1(&[1.0, 2.0, 3.0]));
        assert_eq!(v.value().shape(), &[3]);

        let m = Node::from(arr2(&[[1.0, 2.0], [3.0, 4.0]]));
        assert_eq!(m.value().shape(), &[2, 2]);

        let d = Node::from(ArrayD::zeros(IxDyn(&[2, 2, 2])));
        assert_eq!(d.value().shape(), &[2, 2, 2]);
    }

    #[test]
    fn wrapping_a_node_reference_aliases_it() {
        let x = Node::new(5.0);
        let wrapped = Node::from(&x);
        assert_eq!(wrapped.node_id(), x.node_id());
    }

    #[test]
    fn node_identity_is_pointer_identity() {
        let a = Node::new(1.0);
        let b = Node::new(1.0);
        assert_ne!(a.node_id(), b.node_id(), "equal values, distinct nodes");
        assert_eq!(a.node_id(), a.clone().node_id());
    }

    #[test]
    fn operation_methods_auto_wrap_raw_operands() {
        let x = Node::new(2.0);
        let y = x.mul(4.0).unwrap();
        assert_eq!(y.value().sum(), 8.0);
        assert_eq!(y.parents().len(), 2);
        assert_eq!(y.parents()[0].node_id(), x.node_id());
    }
}
