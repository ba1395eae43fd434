//! Autograd support: the per-operation backward rule trait and the
//! finite-difference gradient checker used by the test suite.

pub mod backward_op;
pub mod grad_check;

pub use backward_op::BackwardOp;
