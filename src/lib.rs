//! # minigrad
//!
//! A minimal reverse-mode automatic differentiation engine.
//!
//! Computations over [`ndarray`] arrays are recorded eagerly into a directed
//! acyclic graph of [`Node`]s as operations are invoked; calling
//! [`Node::backward`] on an output node then computes the gradient of that
//! output with respect to every node in its ancestor graph in a single pass.
//!
//! ```
//! use minigrad::Node;
//!
//! # fn main() -> Result<(), minigrad::MinigradError> {
//! let x = Node::new(3.0);
//! let y = Node::new(4.0);
//! // z = x*y + x^2
//! let z = x.mul(&y)?.add(x.pow(2.0)?)?;
//! z.backward()?;
//! assert_eq!(x.grad().unwrap().sum(), 10.0);
//! assert_eq!(y.grad().unwrap().sum(), 3.0);
//! # Ok(())
//! # }
//! ```

pub mod autograd;
pub mod error;
pub mod graph;
pub mod node;
pub mod ops;

pub use error::MinigradError;
pub use node::Node;
