//! Co-broadcasting helpers for elementwise operations.
//!
//! `ndarray`'s operator overloads only broadcast the right-hand side towards
//! the left, so the engine unifies shapes itself with the usual trailing-axis
//! rules and broadcasts both operands to the result shape.

use ndarray::{ArrayD, IxDyn, Zip};

use crate::error::MinigradError;

/// Computes the broadcast result shape of two shapes.
///
/// Shapes are aligned on their trailing axes; along each axis the extents
/// must match or one of them must be 1.
pub(crate) fn broadcast_shape(a: &[usize], b: &[usize]) -> Result<Vec<usize>, MinigradError> {
    let rank = a.len().max(b.len());
    let mut shape = vec![0; rank];

    for i in 0..rank {
        let da = if i < rank - a.len() { 1 } else { a[i - (rank - a.len())] };
        let db = if i < rank - b.len() { 1 } else { b[i - (rank - b.len())] };

        shape[i] = if da == db || db == 1 {
            da
        } else if da == 1 {
            db
        } else {
            return Err(MinigradError::BroadcastError {
                shape1: a.to_vec(),
                shape2: b.to_vec(),
            });
        };
    }

    Ok(shape)
}

/// Broadcasts both arrays to their common shape and applies `f` elementwise.
pub(crate) fn broadcast_zip<F>(
    a: &ArrayD<f64>,
    b: &ArrayD<f64>,
    f: F,
) -> Result<ArrayD<f64>, MinigradError>
where
    F: Fn(f64, f64) -> f64,
{
    let shape = broadcast_shape(a.shape(), b.shape())?;
    let dim = IxDyn(&shape);

    let broadcast_err = || MinigradError::BroadcastError {
        shape1: a.shape().to_vec(),
        shape2: b.shape().to_vec(),
    };
    let a_view = a.broadcast(dim.clone()).ok_or_else(broadcast_err)?;
    let b_view = b.broadcast(dim).ok_or_else(broadcast_err)?;

    Ok(Zip::from(&a_view).and(&b_view).map_collect(|&x, &y| f(x, y)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr0;

    #[test]
    fn broadcast_shape_trailing_axes() {
        assert_eq!(broadcast_shape(&[2, 3], &[3]).unwrap(), vec![2, 3]);
        assert_eq!(broadcast_shape(&[2, 1], &[1, 3]).unwrap(), vec![2, 3]);
        assert_eq!(broadcast_shape(&[], &[4]).unwrap(), vec![4]);
        assert_eq!(broadcast_shape(&[5], &[5]).unwrap(), vec![5]);
    }

    #[test]
    fn broadcast_shape_rejects_mismatch() {
        let err = broadcast_shape(&[2, 2], &[2, 3]).unwrap_err();
        assert_eq!(
            err,
            MinigradError::BroadcastError {
                shape1: vec![2, 2],
                shape2: vec![2, 3],
            }
        );
    }

    #[test]
    fn broadcast_zip_scalar_against_matrix() {
        let scalar = arr0(2.0).into_dyn();
        let matrix = ArrayD::from_shape_vec(IxDyn(&[2, 2]), vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let result = broadcast_zip(&scalar, &matrix, |x, y| x * y).unwrap();

        let expected =
            ArrayD::from_shape_vec(IxDyn(&[2, 2]), vec![2.0, 4.0, 6.0, 8.0]).unwrap();
        assert_eq!(result, expected);
    }

    #[test]
    fn broadcast_zip_vector_against_matrix() {
        let row = ArrayD::from_shape_vec(IxDyn(&[3]), vec![10.0, 20.0, 30.0]).unwrap();
        let matrix =
            ArrayD::from_shape_vec(IxDyn(&[2, 3]), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        let result = broadcast_zip(&matrix, &row, |x, y| x + y).unwrap();

        let expected =
            ArrayD::from_shape_vec(IxDyn(&[2, 3]), vec![11.0, 22.0, 33.0, 14.0, 25.0, 36.0])
                .unwrap();
        assert_eq!(result, expected);
    }
}
