//! Growth-model family implementations.
//!
//! Models are implemented as small, pure functions so that fitting/plotting
//! code can stay generic over [`crate::domain::GrowthKind`].

pub mod model;

pub use model::*;
