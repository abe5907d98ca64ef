//! Bounded catalog of detected media candidates.
//!
//! The catalog lives under one key in the local storage namespace and is
//! always read and written whole. It holds at most [`CATALOG_CAPACITY`]
//! entries, one per URL, ordered by `last_seen_at` descending.
//!
//! # Overview
//!
//! - [`MediaCandidate`] - a stored catalog entry
//! - [`MediaObservation`] - one sighting of a media URL, fed to `upsert`
//! - [`CandidateStore`] - serialized writer over the persisted catalog
//! - [`merge_observation`] - the pure merge/sort/evict step

mod catalog;
mod item;
mod store;

pub use catalog::{CATALOG_CAPACITY, CATALOG_KEY, merge_observation};
pub use item::{MediaCandidate, MediaObservation, UNKNOWN_TAB_ID};
pub use store::CandidateStore;
