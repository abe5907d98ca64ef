//! In-memory key/value store.

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{KeyValueStore, Record, StorageError, select};

/// Process-local [`KeyValueStore`].
///
/// Values are cloned in and out, so callers never observe each other's
/// in-flight mutations.
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: Mutex<Record>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with `initial`.
    #[must_use]
    pub fn with_record(initial: Record) -> Self {
        Self {
            data: Mutex::new(initial),
        }
    }

    /// Returns a copy of everything stored.
    pub async fn snapshot(&self) -> Record {
        self.data.lock().await.clone()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, keys: &[&str]) -> Result<Record, StorageError> {
        let data = self.data.lock().await;
        Ok(select(&data, keys))
    }

    async fn set(&self, patch: Record) -> Result<(), StorageError> {
        let mut data = self.data.lock().await;
        data.extend(patch);
        Ok(())
    }
}
