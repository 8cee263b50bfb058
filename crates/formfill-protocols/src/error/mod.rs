//! Error types for the formfill protocol layer.

mod classifier;
mod dom;
mod messaging;
mod profile;
mod store;

pub use classifier::*;
pub use dom::*;
pub use messaging::*;
pub use profile::*;
pub use store::*;
