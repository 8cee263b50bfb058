//! Key-value store implementations.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;
use tokio::fs;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, warn};

use formfill_protocols::error::StoreError;
use formfill_protocols::store::KeyValueStore;

/// Key holding the user profile document.
pub const PROFILE_KEY: &str = "user_profile";
/// Key holding cumulative usage statistics.
pub const USAGE_STATS_KEY: &str = "usage_stats";
/// Key holding the per-minute rate-limit window.
pub const RATE_LIMIT_KEY: &str = "rate_limit";

/// In-memory store for testing.
pub struct MemoryStore {
    values: RwLock<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            values: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let values = self.values.read().await;
        Ok(values.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        let mut values = self.values.write().await;
        values.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut values = self.values.write().await;
        values.remove(key);
        Ok(())
    }
}

/// Store backed by a single JSON object on disk.
///
/// The whole document is rewritten on every mutation through a sibling
/// temporary file followed by a rename, so readers never see a torn file.
pub struct JsonFileStore {
    path: PathBuf,
    values: Mutex<HashMap<String, Value>>,
}

impl JsonFileStore {
    /// Open the store, reading the existing document if there is one.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();

        let values = if fs::try_exists(&path).await? {
            let content = fs::read_to_string(&path).await?;
            if content.trim().is_empty() {
                HashMap::new()
            } else {
                match serde_json::from_str::<HashMap<String, Value>>(&content) {
                    Ok(values) => values,
                    Err(e) => {
                        warn!("State file {:?} is not a JSON object: {}", path, e);
                        return Err(e.into());
                    }
                }
            }
        } else {
            HashMap::new()
        };

        debug!("JsonFileStore opened at {:?} with {} keys", path, values.len());

        Ok(Self {
            path,
            values: Mutex::new(values),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn flush(&self, values: &HashMap<String, Value>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let content = serde_json::to_string_pretty(values)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, content).await?;
        fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for JsonFileStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let values = self.values.lock().await;
        Ok(values.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        let mut values = self.values.lock().await;
        let previous = values.insert(key.to_string(), value);
        if let Err(e) = self.flush(&values).await {
            match previous {
                Some(old) => values.insert(key.to_string(), old),
                None => values.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut values = self.values.lock().await;
        if let Some(old) = values.remove(key) {
            if let Err(e) = self.flush(&values).await {
                values.insert(key.to_string(), old);
                return Err(e);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
