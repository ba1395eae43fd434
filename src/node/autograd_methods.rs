//! Gradient accumulation and the backward driver.

use ndarray::{ArrayD, IxDyn};

use crate::error::MinigradError;
use crate::graph::{gmap, topological_order};
use crate::node::broadcast_utils::broadcast_zip;
use crate::node::Node;

impl Node {
    /// Accumulates a gradient contribution into this node.
    ///
    /// A no-op when `requires_grad` is false. The first contribution sets the
    /// gradient; later ones are added element-wise, broadcasting as needed.
    /// Contributions are never allowed to overwrite: a node receives one per
    /// child that references it, in whatever order those children are visited.
    pub fn receive_gradient(&self, gradient: &ArrayD<f64>) -> Result<(), MinigradError> {
        if !self.data.requires_grad {
            return Ok(());
        }

        let mut slot = self.data.grad.borrow_mut();
        let updated = match slot.as_ref() {
            Some(existing) => broadcast_zip(existing, gradient, |a, b| a + b)?,
            None => gradient.clone(),
        };
        *slot = Some(updated);
        Ok(())
    }

    /// Resets the gradient to absent.
    ///
    /// The engine never clears gradients itself; call this (or
    /// [`clear_graph_gradients`](Node::clear_graph_gradients)) before reusing
    /// a graph for an independent backward pass.
    pub fn clear_gradient(&self) {
        *self.data.grad.borrow_mut() = None;
    }

    /// Clears the gradient of every node reachable from this one.
    pub fn clear_graph_gradients(&self) {
        gmap(
            self,
            |node: &Node| node.parents().to_vec(),
            Node::node_id,
            |node| node.clear_gradient(),
        );
    }

    /// Pushes this node's locally computed gradient contributions into its
    /// parents. A no-op for leaves, and for nodes whose gradient slot is
    /// still empty when visited.
    pub fn pass_gradients(&self) -> Result<(), MinigradError> {
        if let Some(op) = self.data.grad_fn.as_ref() {
            if let Some(grad) = self.grad() {
                return op.pass_gradients(&grad, self);
            }
        }
        Ok(())
    }

    /// Runs a backward pass from this node, populating (accumulating into)
    /// the gradient of every ancestor.
    ///
    /// The node's own gradient slot is overwritten with a scalar `1` seed, so
    /// the node should be a scalar or the seed must broadcast against its
    /// value. Repeated calls without clearing keep accumulating on the
    /// ancestors; that is intentional.
    pub fn backward(&self) -> Result<(), MinigradError> {
        let order = topological_order(
            self,
            |node: &Node| node.parents().to_vec(),
            Node::node_id,
        );
        log::debug!("backward: visiting {} nodes", order.len());

        *self.data.grad.borrow_mut() = Some(ArrayD::ones(IxDyn(&[])));
        for node in &order {
            node.pass_gradients()?;
        }
        Ok(())
    }
}
