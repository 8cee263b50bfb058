//! Document protocol definitions.
//!
//! The pipeline never touches a browser directly. It reads and mutates a page
//! through the [`Document`] trait, which a browser binding or the in-memory
//! page snapshot implements.

mod document;
mod dom_types;
mod element;

pub use document::*;
pub use dom_types::*;
pub use element::*;
