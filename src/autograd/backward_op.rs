use std::fmt::Debug;

use ndarray::ArrayD;

use crate::error::MinigradError;
use crate::node::Node;

/// Trait representing the backward rule of a differentiable operation.
///
/// Each operation (Add, Mul, Matmul, ...) has a corresponding struct
/// implementing this trait, attached to the node the operation produced.
pub trait BackwardOp: Debug {
    /// Computes and pushes a gradient contribution into each parent of `node`.
    ///
    /// `grad` is the node's own gradient, fully accumulated by the time this
    /// runs; the topological order of the backward pass guarantees every
    /// child has already pushed its contribution. Implementations must
    /// compute contributions from `grad` and the parents' stored forward
    /// values only (never a parent's gradient, which may not be final), and
    /// must hand them to [`Node::receive_gradient`] rather than writing
    /// gradient slots directly, so accumulation and the `requires_grad` gate
    /// apply uniformly.
    fn pass_gradients(&self, grad: &ArrayD<f64>, node: &Node) -> Result<(), MinigradError>;
}
