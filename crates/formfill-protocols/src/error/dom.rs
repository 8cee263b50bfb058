//! Document access and mutation errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomError {
    #[error("Frame {index} is cross-origin and cannot be accessed")]
    CrossOrigin { index: usize },

    #[error("Frame not found: {0}")]
    FrameNotFound(usize),

    #[error("Element not found: {0}")]
    ElementNotFound(usize),

    #[error("Duplicate element id: {0}")]
    DuplicateElement(usize),

    #[error("Invalid state: {0}")]
    InvalidState(String),
}
