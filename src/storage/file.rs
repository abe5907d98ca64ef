//! JSON-file backed key/value store.

use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, instrument};

use super::{KeyValueStore, Record, StorageError, select};

/// [`KeyValueStore`] persisted as a single JSON object in one file.
///
/// Every `set` rewrites the whole file through a sibling temp file and a
/// rename, so a reader sees either the old or the new object, never a mix.
/// Writers inside one process are serialized by an internal lock.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    /// Creates a store over `path`. The file is created on first write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    async fn load(&self) -> Result<Record, StorageError> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Record::new()),
            Err(err) => return Err(StorageError::io(&self.path, err)),
        };
        if raw.trim().is_empty() {
            return Ok(Record::new());
        }
        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(StorageError::corrupt(&self.path, "top-level value is not an object")),
            Err(err) => Err(StorageError::corrupt(&self.path, err.to_string())),
        }
    }

    async fn store(&self, record: &Record) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|err| StorageError::io(parent, err))?;
        }
        let encoded = serde_json::to_vec_pretty(record)
            .map_err(|err| StorageError::encode(self.path.display().to_string(), err))?;

        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, encoded)
            .await
            .map_err(|err| StorageError::io(&tmp, err))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|err| StorageError::io(&self.path, err))?;
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for JsonFileStore {
    async fn get(&self, keys: &[&str]) -> Result<Record, StorageError> {
        let record = self.load().await?;
        Ok(select(&record, keys))
    }

    #[instrument(skip(self, patch), fields(path = %self.path.display(), keys = patch.len()))]
    async fn set(&self, patch: Record) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().await;
        let mut record = self.load().await?;
        record.extend(patch);
        self.store(&record).await?;
        debug!("store file replaced");
        Ok(())
    }
}
