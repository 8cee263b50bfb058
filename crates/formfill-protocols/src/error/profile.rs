//! Profile management errors.

use thiserror::Error;

use super::StoreError;

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("Profile store error: {0}")]
    Store(#[from] StoreError),

    #[error("Invalid profile data: {0}")]
    InvalidImport(String),

    #[error("Entry not found: {0}")]
    EntryNotFound(String),
}
