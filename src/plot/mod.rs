//! Chart rendering (Plotters PNG backend).

pub mod chart;

pub use chart::*;
