//! Serialized writer over the persisted candidate catalog.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, instrument, warn};

use super::catalog::{self, CATALOG_KEY, merge_observation};
use super::item::{MediaCandidate, MediaObservation};
use crate::storage::{KeyValueStore, StorageError};

const COMMAND_QUEUE_DEPTH: usize = 256;

enum Command {
    Upsert {
        observation: MediaObservation,
        reply: oneshot::Sender<Result<Option<MediaCandidate>, StorageError>>,
    },
    Clear {
        reply: oneshot::Sender<Result<(), StorageError>>,
    },
}

/// Handle to the candidate catalog.
///
/// Every mutation is funneled through one background task, so the
/// read-modify-write cycle of one `upsert` never interleaves with another
/// `upsert` or `clear` issued through any clone of this handle. Reads go
/// straight to storage.
///
/// The worker stops once every handle has been dropped.
#[derive(Clone)]
pub struct CandidateStore {
    local: Arc<dyn KeyValueStore>,
    commands: mpsc::Sender<Command>,
}

impl std::fmt::Debug for CandidateStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CandidateStore").finish_non_exhaustive()
    }
}

impl CandidateStore {
    /// Starts the writer task on the current Tokio runtime.
    #[must_use]
    pub fn spawn(local: Arc<dyn KeyValueStore>) -> Self {
        let (commands, queue) = mpsc::channel(COMMAND_QUEUE_DEPTH);
        tokio::spawn(run_writer(Arc::clone(&local), queue));
        Self { local, commands }
    }

    /// Records a sighting, merging with any existing entry for the URL.
    ///
    /// Returns the stored entry, or `None` if the URL was blank or the entry
    /// was evicted straight away for being older than the whole catalog.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the catalog cannot be read or written.
    pub async fn upsert(
        &self,
        observation: MediaObservation,
    ) -> Result<Option<MediaCandidate>, StorageError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(Command::Upsert { observation, reply })
            .await
            .map_err(|_| StorageError::WorkerStopped)?;
        response.await.map_err(|_| StorageError::WorkerStopped)?
    }

    /// Empties the catalog.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the catalog cannot be written.
    pub async fn clear(&self) -> Result<(), StorageError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(Command::Clear { reply })
            .await
            .map_err(|_| StorageError::WorkerStopped)?;
        response.await.map_err(|_| StorageError::WorkerStopped)?
    }

    /// Returns the persisted catalog as last written.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the catalog cannot be read.
    pub async fn list(&self) -> Result<Vec<MediaCandidate>, StorageError> {
        let record = self.local.get(&[CATALOG_KEY]).await?;
        Ok(catalog::decode(&record))
    }
}

async fn run_writer(local: Arc<dyn KeyValueStore>, mut queue: mpsc::Receiver<Command>) {
    while let Some(command) = queue.recv().await {
        match command {
            Command::Upsert { observation, reply } => {
                let result = apply_upsert(local.as_ref(), observation).await;
                if let Err(err) = &result {
                    warn!(error = %err, "media candidate upsert failed");
                }
                let _ = reply.send(result);
            }
            Command::Clear { reply } => {
                let result = apply_clear(local.as_ref()).await;
                let _ = reply.send(result);
            }
        }
    }
    debug!("candidate writer stopped");
}

#[instrument(skip(local, observation), fields(url = %observation.url))]
async fn apply_upsert(
    local: &dyn KeyValueStore,
    observation: MediaObservation,
) -> Result<Option<MediaCandidate>, StorageError> {
    let url = observation.url.trim().to_string();
    if url.is_empty() {
        return Ok(None);
    }
    let record = local.get(&[CATALOG_KEY]).await?;
    let next = merge_observation(catalog::decode(&record), observation);
    local.set(catalog::encode(&next)?).await?;

    let stored = next.into_iter().find(|item| item.url == url);
    if let Some(item) = &stored {
        debug!(hits = item.hits, "media candidate stored");
    }
    Ok(stored)
}

async fn apply_clear(local: &dyn KeyValueStore) -> Result<(), StorageError> {
    local.set(catalog::encode(&[])?).await?;
    debug!("media candidates cleared");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::candidates::CATALOG_CAPACITY;
    use crate::media::MediaReason;
    use crate::storage::MemoryStore;

    fn obs(url: &str, at: i64) -> MediaObservation {
        MediaObservation::new(url, MediaReason::ContentType, at)
    }

    #[tokio::test]
    async fn test_upsert_then_list_returns_entry() {
        let store = CandidateStore::spawn(Arc::new(MemoryStore::new()));
        let stored = store.upsert(obs("https://e.com/v", 7)).await.unwrap();
        assert_eq!(stored.map(|c| c.hits), Some(1));

        let listed = store.list().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].first_seen_at, 7);
    }

    #[tokio::test]
    async fn test_upsert_same_url_twice_counts_hits() {
        let store = CandidateStore::spawn(Arc::new(MemoryStore::new()));
        store.upsert(obs("https://e.com/v", 1)).await.unwrap();
        let stored = store.upsert(obs("https://e.com/v", 2)).await.unwrap().unwrap();

        assert_eq!(stored.hits, 2);
        assert_eq!(stored.first_seen_at, 1);
        assert_eq!(stored.last_seen_at, 2);
    }

    #[tokio::test]
    async fn test_clear_empties_catalog() {
        let store = CandidateStore::spawn(Arc::new(MemoryStore::new()));
        store.upsert(obs("https://e.com/v", 1)).await.unwrap();
        store.clear().await.unwrap();
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_distinct_upserts_are_not_lost() {
        let store = CandidateStore::spawn(Arc::new(MemoryStore::new()));
        let mut tasks = Vec::new();
        for i in 0..50_i64 {
            let store = store.clone();
            tasks.push(tokio::spawn(async move {
                store.upsert(obs(&format!("https://e.com/{i}"), i)).await
            }));
        }
        for task in tasks {
            task.await.unwrap().unwrap();
        }
        assert_eq!(store.list().await.unwrap().len(), 50);
    }

    #[tokio::test]
    async fn test_catalog_never_exceeds_capacity() {
        let store = CandidateStore::spawn(Arc::new(MemoryStore::new()));
        for i in 0..(CATALOG_CAPACITY as i64 + 15) {
            store.upsert(obs(&format!("https://e.com/{i}"), i)).await.unwrap();
        }
        let listed = store.list().await.unwrap();
        assert_eq!(listed.len(), CATALOG_CAPACITY);
        assert_eq!(listed[0].last_seen_at, CATALOG_CAPACITY as i64 + 14);
    }
}
