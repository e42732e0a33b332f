//! Curve fitting.
//!
//! Responsibilities:
//!
//! - damped Gauss–Newton minimization per series
//! - typed per-series failure conditions (skip-and-continue, never abort)
//! - parallel fan-out over every (dataset, metric) series

pub mod fitter;

pub use fitter::*;
