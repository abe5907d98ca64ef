//! Pure catalog transitions and their storage encoding.

use serde_json::Value;
use tracing::warn;

use super::item::{MediaCandidate, MediaObservation};
use crate::storage::{Record, StorageError};

/// Maximum number of candidates retained.
pub const CATALOG_CAPACITY: usize = 200;

/// Local-namespace key holding the catalog array.
pub const CATALOG_KEY: &str = "mediaCandidates";

/// Folds one observation into `catalog`.
///
/// An existing entry with the same (trimmed) URL is updated in place;
/// otherwise a new entry with `hits = 1` is inserted at the front. The result
/// is re-sorted by `last_seen_at` descending and cut to [`CATALOG_CAPACITY`],
/// so only the most recently *detected* URLs survive.
///
/// Returns the catalog unchanged if the observation URL is blank.
#[must_use]
pub fn merge_observation(
    mut catalog: Vec<MediaCandidate>,
    observation: MediaObservation,
) -> Vec<MediaCandidate> {
    let url = observation.url.trim().to_string();
    if url.is_empty() {
        return catalog;
    }

    if let Some(existing) = catalog.iter_mut().find(|item| item.url == url) {
        existing.absorb(observation);
    } else {
        catalog.insert(0, observation.into_candidate(url));
    }

    // Stable sort: equal timestamps keep insertion order, newest insert first.
    catalog.sort_by(|a, b| b.last_seen_at.cmp(&a.last_seen_at));
    catalog.truncate(CATALOG_CAPACITY);
    catalog
}

/// Decodes the stored catalog, dropping entries that no longer parse.
pub(crate) fn decode(record: &Record) -> Vec<MediaCandidate> {
    let Some(Value::Array(items)) = record.get(CATALOG_KEY) else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| match serde_json::from_value::<MediaCandidate>(item.clone()) {
            Ok(candidate) if !candidate.url.is_empty() => Some(candidate),
            Ok(_) => None,
            Err(err) => {
                warn!(error = %err, "dropping undecodable media candidate");
                None
            }
        })
        .collect()
}

/// Encodes a full catalog as a storage patch.
pub(crate) fn encode(catalog: &[MediaCandidate]) -> Result<Record, StorageError> {
    let value = serde_json::to_value(catalog).map_err(|err| StorageError::encode(CATALOG_KEY, err))?;
    let mut record = Record::new();
    record.insert(CATALOG_KEY.to_string(), value);
    Ok(record)
}
