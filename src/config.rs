//! Bridge policy configuration held in the sync storage namespace.
//!
//! Every field has a total default: a missing key, or a stored value of the
//! wrong JSON type, reads back as the default rather than failing.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument};

use crate::storage::{KeyValueStore, Record, StorageError};

/// Default bridge endpoint exposed by the desktop app.
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:16789/add";

/// Default native-messaging host name registered by the desktop installer.
pub const DEFAULT_NATIVE_HOST: &str = "com.lc5900.flamingo.bridge";

const KEY_ENABLED: &str = "enabled";
const KEY_USE_NATIVE: &str = "useNativeMessaging";
const KEY_AUTO_INTERCEPT: &str = "autoIntercept";
const KEY_SNIFF_MEDIA: &str = "sniffMediaEnabled";
const KEY_ALLOWLIST: &str = "interceptAllowlist";
const KEY_NATIVE_HOST: &str = "nativeHost";
const KEY_ENDPOINT: &str = "endpoint";
const KEY_TOKEN: &str = "token";

/// All keys owned by [`Config`] in the sync namespace.
pub const CONFIG_KEYS: [&str; 8] = [
    KEY_ENABLED,
    KEY_USE_NATIVE,
    KEY_AUTO_INTERCEPT,
    KEY_SNIFF_MEDIA,
    KEY_ALLOWLIST,
    KEY_NATIVE_HOST,
    KEY_ENDPOINT,
    KEY_TOKEN,
];

/// Effective bridge configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Master switch for everything that talks to the bridge.
    pub enabled: bool,
    /// Dispatch over native messaging instead of HTTP.
    pub use_native_messaging: bool,
    /// Take over browser downloads as they are created.
    pub auto_intercept: bool,
    /// Record media candidates from response headers.
    pub sniff_media_enabled: bool,
    /// Raw allow-list text, comma or newline separated.
    pub intercept_allowlist: String,
    /// Native-messaging host name or executable path.
    pub native_host: String,
    /// HTTP bridge endpoint.
    pub endpoint: String,
    /// Token sent as `X-Token` to the HTTP bridge.
    pub token: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            enabled: false,
            use_native_messaging: false,
            auto_intercept: true,
            sniff_media_enabled: true,
            intercept_allowlist: String::new(),
            native_host: DEFAULT_NATIVE_HOST.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            token: String::new(),
        }
    }
}

impl Config {
    /// Decodes a config from raw stored values, defaulting field by field.
    #[must_use]
    pub fn from_record(record: &Record) -> Self {
        let defaults = Self::default();
        let endpoint = read_string(record, KEY_ENDPOINT).unwrap_or_default();
        Self {
            enabled: read_bool(record, KEY_ENABLED).unwrap_or(defaults.enabled),
            use_native_messaging: read_bool(record, KEY_USE_NATIVE)
                .unwrap_or(defaults.use_native_messaging),
            auto_intercept: read_bool(record, KEY_AUTO_INTERCEPT)
                .unwrap_or(defaults.auto_intercept),
            sniff_media_enabled: read_bool(record, KEY_SNIFF_MEDIA)
                .unwrap_or(defaults.sniff_media_enabled),
            intercept_allowlist: read_string(record, KEY_ALLOWLIST)
                .unwrap_or(defaults.intercept_allowlist),
            native_host: read_string(record, KEY_NATIVE_HOST).unwrap_or(defaults.native_host),
            // An empty endpoint is never useful, so it falls back like a missing one.
            endpoint: if endpoint.is_empty() {
                defaults.endpoint
            } else {
                endpoint
            },
            token: read_string(record, KEY_TOKEN).unwrap_or(defaults.token),
        }
    }

    /// Encodes every field for writing back to the sync namespace.
    #[must_use]
    pub fn to_record(&self) -> Record {
        let mut record = Record::new();
        record.insert(KEY_ENABLED.into(), Value::Bool(self.enabled));
        record.insert(KEY_USE_NATIVE.into(), Value::Bool(self.use_native_messaging));
        record.insert(KEY_AUTO_INTERCEPT.into(), Value::Bool(self.auto_intercept));
        record.insert(KEY_SNIFF_MEDIA.into(), Value::Bool(self.sniff_media_enabled));
        record.insert(
            KEY_ALLOWLIST.into(),
            Value::String(self.intercept_allowlist.clone()),
        );
        record.insert(KEY_NATIVE_HOST.into(), Value::String(self.native_host.clone()));
        record.insert(KEY_ENDPOINT.into(), Value::String(self.endpoint.clone()));
        record.insert(KEY_TOKEN.into(), Value::String(self.token.clone()));
        record
    }
}

fn read_bool(record: &Record, key: &str) -> Option<bool> {
    record.get(key).and_then(Value::as_bool)
}

fn read_string(record: &Record, key: &str) -> Option<String> {
    record
        .get(key)
        .and_then(Value::as_str)
        .map(|s| s.trim().to_string())
}

/// Partial config update; `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_native_messaging: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_intercept: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sniff_media_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intercept_allowlist: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub native_host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl ConfigPatch {
    /// Returns true when the patch changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Encodes only the fields that are set. String values are trimmed.
    #[must_use]
    pub fn to_record(&self) -> Record {
        let mut record = Record::new();
        let bools = [
            (KEY_ENABLED, self.enabled),
            (KEY_USE_NATIVE, self.use_native_messaging),
            (KEY_AUTO_INTERCEPT, self.auto_intercept),
            (KEY_SNIFF_MEDIA, self.sniff_media_enabled),
        ];
        for (key, value) in bools {
            if let Some(value) = value {
                record.insert(key.into(), Value::Bool(value));
            }
        }
        let strings = [
            (KEY_ALLOWLIST, &self.intercept_allowlist),
            (KEY_NATIVE_HOST, &self.native_host),
            (KEY_ENDPOINT, &self.endpoint),
            (KEY_TOKEN, &self.token),
        ];
        for (key, value) in strings {
            if let Some(value) = value {
                record.insert(key.into(), Value::String(value.trim().to_string()));
            }
        }
        record
    }
}

/// Reads and updates [`Config`] in the sync namespace.
#[derive(Clone)]
pub struct ConfigStore {
    sync: Arc<dyn KeyValueStore>,
}

impl std::fmt::Debug for ConfigStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigStore").finish_non_exhaustive()
    }
}

impl ConfigStore {
    /// Wraps the sync namespace.
    #[must_use]
    pub fn new(sync: Arc<dyn KeyValueStore>) -> Self {
        Self { sync }
    }

    /// Loads the effective config.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the sync namespace cannot be read.
    pub async fn get(&self) -> Result<Config, StorageError> {
        let record = self.sync.get(&CONFIG_KEYS).await?;
        Ok(Config::from_record(&record))
    }

    /// Applies a partial update.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the sync namespace cannot be written.
    #[instrument(skip(self, patch))]
    pub async fn set(&self, patch: &ConfigPatch) -> Result<(), StorageError> {
        if patch.is_empty() {
            return Ok(());
        }
        self.sync.set(patch.to_record()).await?;
        debug!("config updated");
        Ok(())
    }

    /// Writes the fully-defaulted config back so every key is materialized.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the sync namespace cannot be read or written.
    pub async fn ensure_defaults(&self) -> Result<Config, StorageError> {
        let config = self.get().await?;
        self.sync.set(config.to_record()).await?;
        Ok(config)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use serde_json::json;

    #[test]
    fn test_config_from_empty_record_uses_defaults() {
        let config = Config::from_record(&Record::new());
        assert_eq!(config, Config::default());
        assert!(!config.enabled);
        assert!(config.auto_intercept);
        assert!(config.sniff_media_enabled);
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
    }

    #[test]
    fn test_config_wrong_types_fall_back_to_defaults() {
        let mut record = Record::new();
        record.insert("enabled".into(), json!("yes"));
        record.insert("autoIntercept".into(), json!(0));
        record.insert("token".into(), json!(42));

        let config = Config::from_record(&record);
        assert!(!config.enabled);
        assert!(config.auto_intercept);
        assert_eq!(config.token, "");
    }

    #[test]
    fn test_config_empty_endpoint_falls_back_but_empty_host_is_kept() {
        let mut record = Record::new();
        record.insert("endpoint".into(), json!("   "));
        record.insert("nativeHost".into(), json!(""));

        let config = Config::from_record(&record);
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.native_host, "");
    }

    #[test]
    fn test_config_patch_only_encodes_set_fields() {
        let patch = ConfigPatch {
            auto_intercept: Some(false),
            token: Some("  secret ".into()),
            ..ConfigPatch::default()
        };
        let record = patch.to_record();
        assert_eq!(record.len(), 2);
        assert_eq!(record.get("autoIntercept"), Some(&json!(false)));
        assert_eq!(record.get("token"), Some(&json!("secret")));
    }

    #[test]
    fn test_config_patch_deserializes_camel_case() {
        let patch: ConfigPatch =
            serde_json::from_value(json!({"sniffMediaEnabled": false})).unwrap();
        assert_eq!(patch.sniff_media_enabled, Some(false));
        assert!(patch.enabled.is_none());
    }

    #[tokio::test]
    async fn test_config_store_set_then_get_round_trips() {
        let store = ConfigStore::new(Arc::new(MemoryStore::new()));
        store
            .set(&ConfigPatch {
                enabled: Some(true),
                intercept_allowlist: Some("example.com".into()),
                ..ConfigPatch::default()
            })
            .await
            .unwrap();

        let config = store.get().await.unwrap();
        assert!(config.enabled);
        assert_eq!(config.intercept_allowlist, "example.com");
        assert!(config.auto_intercept);
    }

    #[tokio::test]
    async fn test_config_store_ensure_defaults_materializes_every_key() {
        let backing = Arc::new(MemoryStore::new());
        let store = ConfigStore::new(backing.clone());
        store.ensure_defaults().await.unwrap();

        let snapshot = backing.snapshot().await;
        for key in CONFIG_KEYS {
            assert!(snapshot.contains_key(key), "missing key {key}");
        }
    }
}
