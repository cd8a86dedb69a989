#![forbid(unsafe_code)]

//! Core: geometric primitives shared across the weft toolkit.

pub mod geometry;
pub mod logging;

pub use geometry::{Rect, Sides, Size};

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{debug, error, info, trace, warn};
