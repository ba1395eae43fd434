use ndarray::ArrayD;

use crate::autograd::BackwardOp;
use crate::error::MinigradError;
use crate::node::broadcast_utils::broadcast_zip;
use crate::node::Node;

/// Element-wise power with broadcasting: `l ** r`.
pub fn pow_op(l: &Node, r: &Node) -> Result<Node, MinigradError> {
    let value = broadcast_zip(l.value(), r.value(), f64::powf)?;
    Ok(Node::from_op(
        value,
        vec![l.clone(), r.clone()],
        Box::new(PowBackward),
    ))
}

/// Backward rule for power, applied against the stored forward values:
///
/// - base:     g * value * r / l   (power rule, reusing `value = l^r`)
/// - exponent: g * value * ln(l)
///
/// A zero or negative base makes the division or the logarithm produce
/// NaN/inf, which propagates silently rather than raising.
#[derive(Debug)]
pub(crate) struct PowBackward;

impl BackwardOp for PowBackward {
    fn pass_gradients(&self, grad: &ArrayD<f64>, node: &Node) -> Result<(), MinigradError> {
        let parents = node.parents();
        let (l, r) = (&parents[0], &parents[1]);

        let g_value = broadcast_zip(grad, node.value(), |g, v| g * v)?;

        let grad_l = {
            let scaled = broadcast_zip(&g_value, r.value(), |gv, rv| gv * rv)?;
            broadcast_zip(&scaled, l.value(), |s, lv| s / lv)?
        };
        l.receive_gradient(&grad_l)?;

        let grad_r = broadcast_zip(&g_value, &l.value().mapv(f64::ln), |gv, ln_l| gv * ln_l)?;
        r.receive_gradient(&grad_r)?;
        Ok(())
    }
}
