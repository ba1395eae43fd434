pub mod sum;

pub use sum::sum_op;
