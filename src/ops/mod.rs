//! # Operation catalogue (`ops`)
//!
//! One file per differentiable operation. Each file holds:
//!
//! - an `xxx_op` function that eagerly computes the forward value, records
//!   the operands as parents, and attaches the backward rule;
//! - an `XxxBackward` struct implementing
//!   [`BackwardOp`](crate::autograd::BackwardOp), which reads the node's
//!   accumulated gradient and the parents' forward values and pushes one
//!   contribution per parent through `receive_gradient`.
//!
//! ## Submodules
//!
//! - [`arithmetic`]: element-wise add, sub, mul, pow, and negation.
//! - [`linalg`]: matrix multiplication.
//! - [`activation`]: ReLU.
//! - [`reduction`]: scalar sum.

pub mod activation;
pub mod arithmetic;
pub mod linalg;
pub mod reduction;
