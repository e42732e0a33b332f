//! Reporting utilities: formatted run summaries for the terminal.

pub mod format;

pub use format::*;
