//! File I/O: dataset ingest and fit export.

pub mod export;
pub mod ingest;
