//! Flamingo Bridge Core Library
//!
//! Policy and state core of the Flamingo browser bridge: decides which
//! browser downloads are handed to the Flamingo download manager, keeps a
//! catalog of media URLs seen on the wire, and delivers URLs over HTTP or
//! native messaging.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`storage`] - Key-value namespaces (sync settings, local state)
//! - [`config`] - Runtime policy config with per-field defaults
//! - [`media`] - Media URL / content-type detection
//! - [`allowlist`] - Host allow-list parsing and matching
//! - [`candidates`] - Bounded, most-recent-first media catalog
//! - [`activity`] - Last success / skip / error slots
//! - [`bridge`] - Transport selection, HTTP and native-messaging delivery
//! - [`intercept`] - Download interception state machine
//! - [`service`] - Event listeners and the UI message router
//! - [`host`] - Native-messaging host that relays to the HTTP bridge

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod activity;
pub mod allowlist;
pub mod bridge;
pub mod candidates;
pub mod config;
pub mod host;
pub mod intercept;
pub mod media;
pub mod service;
pub mod storage;
pub mod text;
mod user_agent;

// Re-export commonly used types
pub use activity::{ActivityKind, ActivityLog, ActivityRecord};
pub use bridge::{DispatchBridge, DispatchOutcome, TransportError};
pub use candidates::{CATALOG_CAPACITY, CandidateStore, MediaCandidate, MediaObservation};
pub use config::{Config, ConfigPatch, ConfigStore};
pub use intercept::{DownloadEvent, DownloadsApi, InterceptOutcome, InterceptionEngine, SkipReason};
pub use media::MediaReason;
pub use service::{BridgeService, ContextMenuClick, HeadersReceivedEvent, Request, Response};
pub use storage::{JsonFileStore, KeyValueStore, MemoryStore, StorageError};
