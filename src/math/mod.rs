//! Mathematical utilities: the least-squares solve backing the fitter.

pub mod ols;

pub use ols::*;
