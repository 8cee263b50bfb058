//! # formfill protocols
//!
//! Interface definitions shared by every formfill crate. Contains only
//! traits and plain data types, no pipeline logic.
//!
//! ## Core Traits
//!
//! - [`Document`] - A page the pipeline can scan and mutate
//! - [`ChatClassifier`] - An external chat-completion endpoint used to guess field values
//! - [`KeyValueStore`] - Persisted state (profile, usage counters)

pub mod classifier;
pub mod dom;
pub mod error;
pub mod store;
pub mod types;

pub use classifier::{ChatClassifier, ClassificationRequest};
pub use dom::{
    BoundingBox, ComputedStyle, Document, DomEvent, ElementId, ElementInfo, FrameId, FrameInfo,
    NodeAttributes, OptionInfo, ViewportInfo,
};
pub use error::{ClassifierError, DomError, MessagingError, ProfileError, StoreError};
pub use store::KeyValueStore;
pub use types::*;
