use ndarray::ArrayD;
use thiserror::Error;

use crate::error::MinigradError;
use crate::node::Node;

/// Error type specifically for gradient checking failures.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GradCheckError {
    #[error("Gradient check failed for input {input_index}, element {element_index}: analytical {analytical:?} != numerical {numerical:?} (difference {difference:?})")]
    GradientMismatch {
        input_index: usize,
        element_index: usize,
        analytical: f64,
        numerical: f64,
        difference: f64,
    },

    #[error("Forward function execution failed during gradient check: {0}")]
    ForwardPassError(MinigradError),

    #[error("Backward pass execution failed during gradient check: {0}")]
    BackwardPassError(MinigradError),

    #[error("Input {input_index} requires grad but has no gradient after the backward pass")]
    MissingAnalyticalGrad { input_index: usize },

    #[error("Analytical gradient for input {input_index} has shape {actual:?}, expected {expected:?}")]
    GradientShapeMismatch {
        input_index: usize,
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    #[error("Numerical gradient is NaN or infinite for input {input_index}, element {element_index} (loss+: {loss_plus:?}, loss-: {loss_minus:?})")]
    NumericalGradNaNOrInfinite {
        input_index: usize,
        element_index: usize,
        loss_plus: f64,
        loss_minus: f64,
    },

    #[error("Gradient check requires contiguous input arrays (input {input_index})")]
    NonContiguousInput { input_index: usize },
}

/// Checks analytical gradients against numerical gradients using central
/// finite differences.
///
/// `func` builds a computation from leaf nodes created over `inputs`. Its
/// output is reduced to a scalar loss with `sum()`, backpropagated, and every
/// element of every leaf's analytical gradient is compared against
/// `(loss(x + eps) - loss(x - eps)) / (2 * eps)`.
///
/// The comparison passes when either the absolute or the relative difference
/// is within `tolerance`.
pub fn check_grad<F>(
    func: F,
    inputs: &[ArrayD<f64>],
    epsilon: f64,
    tolerance: f64,
) -> Result<(), GradCheckError>
where
    F: Fn(&[Node]) -> Result<Node, MinigradError>,
{
    // --- Analytical pass ---
    let leaves: Vec<Node> = inputs.iter().map(|a| Node::new(a.clone())).collect();
    let output = func(&leaves).map_err(GradCheckError::ForwardPassError)?;
    let loss = output.sum().map_err(GradCheckError::ForwardPassError)?;
    loss.backward().map_err(GradCheckError::BackwardPassError)?;

    let loss_of = |perturbed: &[ArrayD<f64>]| -> Result<f64, GradCheckError> {
        let leaves: Vec<Node> = perturbed.iter().map(|a| Node::new(a.clone())).collect();
        let output = func(&leaves).map_err(GradCheckError::ForwardPassError)?;
        Ok(output.value().sum())
    };

    for (i, leaf) in leaves.iter().enumerate() {
        let analytical_grad = leaf
            .grad()
            .ok_or(GradCheckError::MissingAnalyticalGrad { input_index: i })?;
        if analytical_grad.shape() != inputs[i].shape() {
            return Err(GradCheckError::GradientShapeMismatch {
                input_index: i,
                expected: inputs[i].shape().to_vec(),
                actual: analytical_grad.shape().to_vec(),
            });
        }
        let analytical: Vec<f64> = analytical_grad.iter().copied().collect();

        // --- Numerical pass, one element at a time ---
        let numel = inputs[i].len();
        for elem_idx in 0..numel {
            let loss_plus = {
                let mut perturbed: Vec<ArrayD<f64>> = inputs.to_vec();
                nudge(&mut perturbed[i], elem_idx, epsilon)
                    .ok_or(GradCheckError::NonContiguousInput { input_index: i })?;
                loss_of(&perturbed)?
            };
            let loss_minus = {
                let mut perturbed: Vec<ArrayD<f64>> = inputs.to_vec();
                nudge(&mut perturbed[i], elem_idx, -epsilon)
                    .ok_or(GradCheckError::NonContiguousInput { input_index: i })?;
                loss_of(&perturbed)?
            };

            let numerical = (loss_plus - loss_minus) / (2.0 * epsilon);
            if numerical.is_nan() || numerical.is_infinite() {
                return Err(GradCheckError::NumericalGradNaNOrInfinite {
                    input_index: i,
                    element_index: elem_idx,
                    loss_plus,
                    loss_minus,
                });
            }

            let difference = (analytical[elem_idx] - numerical).abs();
            let relative = difference / (analytical[elem_idx].abs() + epsilon);
            if difference > tolerance && relative > tolerance {
                return Err(GradCheckError::GradientMismatch {
                    input_index: i,
                    element_index: elem_idx,
                    analytical: analytical[elem_idx],
                    numerical,
                    difference,
                });
            }
        }
    }

    Ok(())
}

fn nudge(array: &mut ArrayD<f64>, flat_index: usize, delta: f64) -> Option<()> {
    let slice = array.as_slice_mut()?;
    slice[flat_index] += delta;
    Some(())
}
