use ndarray::{arr0, Array2, ArrayD, ArrayView1, ArrayView2, Ix1, Ix2};

use crate::autograd::BackwardOp;
use crate::error::MinigradError;
use crate::node::Node;

/// Matrix product with the usual 1-D/2-D semantics: vector·vector is a
/// scalar, vector@matrix and matrix@vector are vectors, matrix@matrix is a
/// matrix. Higher ranks are rejected.
pub fn matmul_op(a: &Node, b: &Node) -> Result<Node, MinigradError> {
    let value = matmul_forward(a.value(), b.value())?;
    Ok(Node::from_op(
        value,
        vec![a.clone(), b.clone()],
        Box::new(MatmulBackward),
    ))
}

fn matmul_forward(a: &ArrayD<f64>, b: &ArrayD<f64>) -> Result<ArrayD<f64>, MinigradError> {
    for operand in [a, b] {
        if operand.ndim() == 0 || operand.ndim() > 2 {
            return Err(MinigradError::UnsupportedRank {
                rank: operand.ndim(),
                operation: "matmul".to_string(),
            });
        }
    }

    let inner_a = a.shape()[a.ndim() - 1];
    let inner_b = b.shape()[0];
    if inner_a != inner_b {
        return Err(MinigradError::IncompatibleShapes {
            shape1: a.shape().to_vec(),
            shape2: b.shape().to_vec(),
            operation: "matmul".to_string(),
        });
    }

    let value = match (a.ndim(), b.ndim()) {
        (1, 1) => arr0(view_1d(a)?.dot(&view_1d(b)?)).into_dyn(),
        (1, 2) => view_1d(a)?.dot(&view_2d(b)?).into_dyn(),
        (2, 1) => view_2d(a)?.dot(&view_1d(b)?).into_dyn(),
        _ => view_2d(a)?.dot(&view_2d(b)?).into_dyn(),
    };
    Ok(value)
}

/// Backward rule for the matrix product.
///
/// A 1-D operand's "transpose" for gradient purposes is an outer product
/// with the upstream gradient rather than a matrix transpose, hence the
/// asymmetric branches:
///
/// - a 1-D: b ← outer(a, g), otherwise b ← aᵀ @ g
/// - b 1-D: a ← outer(g, b), otherwise a ← g @ bᵀ
#[derive(Debug)]
pub(crate) struct MatmulBackward;

impl BackwardOp for MatmulBackward {
    fn pass_gradients(&self, grad: &ArrayD<f64>, node: &Node) -> Result<(), MinigradError> {
        let parents = node.parents();
        let (a, b) = (&parents[0], &parents[1]);
        let (a_val, b_val) = (a.value(), b.value());

        let grad_b = if a_val.ndim() == 1 {
            outer(a_val, grad).into_dyn()
        } else {
            let a2 = view_2d(a_val)?;
            if grad.ndim() == 1 {
                a2.t().dot(&view_1d(grad)?).into_dyn()
            } else {
                a2.t().dot(&view_2d(grad)?).into_dyn()
            }
        };
        b.receive_gradient(&grad_b)?;

        let grad_a = if b_val.ndim() == 1 {
            outer(grad, b_val).into_dyn()
        } else {
            let b2 = view_2d(b_val)?;
            if grad.ndim() == 1 {
                view_1d(grad)?.dot(&b2.t()).into_dyn()
            } else {
                view_2d(grad)?.dot(&b2.t()).into_dyn()
            }
        };
        a.receive_gradient(&grad_a)?;
        Ok(())
    }
}

fn view_1d(x: &ArrayD<f64>) -> Result<ArrayView1<f64>, MinigradError> {
    x.view()
        .into_dimensionality::<Ix1>()
        .map_err(|_| MinigradError::UnsupportedRank {
            rank: x.ndim(),
            operation: "matmul".to_string(),
        })
}

fn view_2d(x: &ArrayD<f64>) -> Result<ArrayView2<f64>, MinigradError> {
    x.view()
        .into_dimensionality::<Ix2>()
        .map_err(|_| MinigradError::UnsupportedRank {
            rank: x.ndim(),
            operation: "matmul".to_string(),
        })
}

/// Outer product of two arrays, flattened to vectors first (a 0-d operand
/// behaves as a length-1 vector).
fn outer(x: &ArrayD<f64>, y: &ArrayD<f64>) -> Array2<f64> {
    let xs: Vec<f64> = x.iter().copied().collect();
    let ys: Vec<f64> = y.iter().copied().collect();
    Array2::from_shape_fn((xs.len(), ys.len()), |(i, j)| xs[i] * ys[j])
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr1, arr2};

    #[test]
    fn matmul_forward_matrix_matrix() {
        let a = Node::new(arr2(&[[1.0, 2.0], [3.0, 4.0]]));
        let b = Node::new(arr2(&[[5.0, 6.0], [7.0, 8.0]]));
        let c = matmul_op(&a, &b).unwrap();
        assert_eq!(c.value(), &arr2(&[[19.0, 22.0], [43.0, 50.0]]).into_dyn());
    }

    #[test]
    fn matmul_forward_vector_cases() {
        let v = Node::new(vec![1.0, 2.0]);
        let m = Node::new(arr2(&[[1.0, 0.0], [0.0, 1.0]]));

        let vm = matmul_op(&v, &m).unwrap();
        assert_eq!(vm.value(), &arr1(&[1.0, 2.0]).into_dyn());

        let mv = matmul_op(&m, &v).unwrap();
        assert_eq!(mv.value(), &arr1(&[1.0, 2.0]).into_dyn());

        let vv = matmul_op(&v, &v).unwrap();
        assert_eq!(vv.value().ndim(), 0);
        assert_eq!(vv.value().sum(), 5.0);
    }

    #[test]
    fn matmul_forward_rejects_bad_shapes() {
        let a = Node::new(arr2(&[[1.0, 2.0], [3.0, 4.0]]));
        let b = Node::new(vec![1.0, 2.0, 3.0]);
        assert!(matches!(
            matmul_op(&a, &b).unwrap_err(),
            MinigradError::IncompatibleShapes { .. }
        ));

        let scalar = Node::new(2.0);
        assert!(matches!(
            matmul_op(&a, &scalar).unwrap_err(),
            MinigradError::UnsupportedRank { rank: 0, .. }
        ));
    }

    #[test]
    fn matmul_backward_matrix_matrix() {
        // s = sum(A @ B): dA = ones @ B^T, dB = A^T @ ones.
        let a = Node::new(arr2(&[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]));
        let b = Node::new(arr2(&[[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]]));
        let s = matmul_op(&a, &b).unwrap().sum().unwrap();
        s.backward().unwrap();

        let expected_a = arr2(&[[3.0, 7.0, 11.0], [3.0, 7.0, 11.0]]).into_dyn();
        let expected_b = arr2(&[[5.0, 5.0], [7.0, 7.0], [9.0, 9.0]]).into_dyn();
        assert_eq!(a.grad().unwrap(), expected_a);
        assert_eq!(b.grad().unwrap(), expected_b);
    }

    #[test]
    fn matmul_backward_vector_matrix() {
        // s = sum(v @ M): dv = g @ M^T with g = ones, dM = outer(v, g).
        let v = Node::new(vec![1.0, 2.0]);
        let m = Node::new(arr2(&[[1.0, 2.0], [3.0, 4.0]]));
        let s = matmul_op(&v, &m).unwrap().sum().unwrap();
        s.backward().unwrap();

        assert_eq!(v.grad().unwrap(), arr1(&[3.0, 7.0]).into_dyn());
        assert_eq!(
            m.grad().unwrap(),
            arr2(&[[1.0, 1.0], [2.0, 2.0]]).into_dyn()
        );
    }

    #[test]
    fn matmul_backward_matrix_vector() {
        // s = sum(M @ v): dM = outer(g, v), dv = M^T @ g.
        let m = Node::new(arr2(&[[1.0, 2.0], [3.0, 4.0]]));
        let v = Node::new(vec![5.0, 6.0]);
        let s = matmul_op(&m, &v).unwrap().sum().unwrap();
        s.backward().unwrap();

        assert_eq!(
            m.grad().unwrap(),
            arr2(&[[5.0, 6.0], [5.0, 6.0]]).into_dyn()
        );
        assert_eq!(v.grad().unwrap(), arr1(&[4.0, 6.0]).into_dyn());
    }

    #[test]
    fn matmul_backward_vector_vector_outer_shapes() {
        // Dot product of two vectors: the outer-product construction gives
        // column/row shaped gradients, matching the reference semantics.
        let u = Node::new(vec![1.0, 2.0]);
        let w = Node::new(vec![3.0, 4.0]);
        let s = matmul_op(&u, &w).unwrap();
        s.backward().unwrap();

        let grad_u = u.grad().unwrap();
        let grad_w = w.grad().unwrap();
        assert_eq!(grad_u.shape(), &[1, 2]);
        assert_eq!(grad_u, arr2(&[[3.0, 4.0]]).into_dyn());
        assert_eq!(grad_w.shape(), &[2, 1]);
        assert_eq!(grad_w, arr2(&[[1.0], [2.0]]).into_dyn());
    }
}
