//! Common types used across the formfill pipeline.

mod field;
mod resolution;

pub use field::*;
pub use resolution::*;
