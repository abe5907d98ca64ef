//! Key/value persistence behind the bridge core.
//!
//! The core never touches a concrete storage backend. Every component takes an
//! injected [`KeyValueStore`] and works with whole JSON values per key:
//!
//! - the *sync* namespace holds [`Config`](crate::Config) fields
//! - the *local* namespace holds the media candidate catalog and the
//!   activity record slots
//!
//! Two backends ship with the crate:
//! - [`MemoryStore`] - in-process map, used by tests and embedders
//! - [`JsonFileStore`] - one JSON object per file, replaced atomically on write

mod error;
mod file;
mod memory;

pub use error::StorageError;
pub use file::JsonFileStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use serde_json::{Map, Value};

/// A set of top-level keys and their JSON values.
pub type Record = Map<String, Value>;

/// Async key/value capability with browser-storage semantics.
///
/// `get` returns only the keys that are present; absent keys are simply
/// missing from the returned record. `set` merges the patch into the stored
/// record key by key, replacing each named value wholesale.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Reads the given keys.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backend cannot be read.
    async fn get(&self, keys: &[&str]) -> Result<Record, StorageError>;

    /// Merges `patch` into the stored record.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backend cannot be written.
    async fn set(&self, patch: Record) -> Result<(), StorageError>;
}

/// Picks `keys` out of `source`, skipping the ones it does not contain.
pub(crate) fn select(source: &Record, keys: &[&str]) -> Record {
    keys.iter()
        .filter_map(|key| {
            source
                .get(*key)
                .map(|value| ((*key).to_string(), value.clone()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_select_skips_missing_keys() {
        let mut source = Record::new();
        source.insert("enabled".to_string(), json!(true));
        source.insert("token".to_string(), json!("abc"));

        let picked = select(&source, &["enabled", "endpoint"]);
        assert_eq!(picked.len(), 1);
        assert_eq!(picked.get("enabled"), Some(&json!(true)));
        assert!(!picked.contains_key("endpoint"));
    }
}
