//! Key-value store protocol definitions.
//!
//! Holds the user profile, usage statistics and rate-limit counters between
//! runs. Values are JSON documents addressed by string keys.

use async_trait::async_trait;

use crate::error::StoreError;

/// Core trait for persisted state backends.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read a value. Missing keys are `Ok(None)`.
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>, StoreError>;

    /// Write a value, replacing any previous one.
    async fn set(&self, key: &str, value: serde_json::Value) -> Result<(), StoreError>;

    /// Remove a value. Removing a missing key is not an error.
    async fn remove(&self, key: &str) -> Result<(), StoreError>;
}
