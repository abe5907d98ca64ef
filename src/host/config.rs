//! Host configuration: environment defaults overridden by `native-host.json`.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::DEFAULT_ENDPOINT;

/// File name looked up in the platform config directory.
pub const CONFIG_FILE_NAME: &str = "native-host.json";

/// Environment variable for the bridge endpoint.
pub const ENDPOINT_ENV: &str = "FLAMINGO_BRIDGE_ENDPOINT";
/// Environment variable for the bridge token.
pub const TOKEN_ENV: &str = "FLAMINGO_BRIDGE_TOKEN";

/// Where the host sends downloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostConfig {
    pub endpoint: String,
    pub token: String,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            token: String::new(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    #[serde(default)]
    endpoint: Option<String>,
    #[serde(default)]
    token: Option<String>,
}

impl HostConfig {
    /// Builds the config from explicit env values, then applies non-empty
    /// values from `file` if it exists and parses.
    #[must_use]
    pub fn resolve(endpoint: Option<String>, token: Option<String>, file: Option<&Path>) -> Self {
        let mut config = Self {
            endpoint: endpoint.unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            token: token.unwrap_or_default(),
        };
        if let Some(path) = file {
            config.apply_file(path);
        }
        config
    }

    /// Reads `FLAMINGO_BRIDGE_ENDPOINT` / `FLAMINGO_BRIDGE_TOKEN` and the
    /// platform config file.
    #[must_use]
    pub fn load() -> Self {
        let path = config_path();
        Self::resolve(
            std::env::var(ENDPOINT_ENV).ok(),
            std::env::var(TOKEN_ENV).ok(),
            path.as_deref(),
        )
    }

    fn apply_file(&mut self, path: &Path) {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no host config file");
                return;
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "failed to read host config");
                return;
            }
        };
        let file: FileConfig = match serde_json::from_str(&raw) {
            Ok(file) => file,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "failed to parse host config");
                return;
            }
        };
        if let Some(endpoint) = non_empty(file.endpoint) {
            self.endpoint = endpoint;
        }
        if let Some(token) = non_empty(file.token) {
            self.token = token;
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// `native-host.json` in the platform config directory.
#[must_use]
pub fn config_path() -> Option<PathBuf> {
    let home = std::env::var_os("HOME").map(PathBuf::from);
    let dir = if cfg!(windows) {
        std::env::var_os("APPDATA")
            .map(PathBuf::from)
            .or_else(|| {
                std::env::var_os("USERPROFILE")
                    .map(|profile| PathBuf::from(profile).join("AppData").join("Roaming"))
            })?
            .join("Flamingo Downloader")
    } else if cfg!(target_os = "macos") {
        home?
            .join("Library")
            .join("Application Support")
            .join("Flamingo Downloader")
    } else {
        std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| home.map(|h| h.join(".config")))?
            .join("flamingo-downloader")
    };
    Some(dir.join(CONFIG_FILE_NAME))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_without_env_or_file() {
        let config = HostConfig::resolve(None, None, None);
        assert_eq!(config, HostConfig::default());
        assert_eq!(config.endpoint, "http://127.0.0.1:16789/add");
    }

    #[test]
    fn test_file_overrides_env_when_non_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, r#"{"endpoint": " http://127.0.0.1:5000/add ", "token": ""}"#)
            .unwrap();

        let config = HostConfig::resolve(
            Some("http://env/add".into()),
            Some("env-token".into()),
            Some(&path),
        );
        assert_eq!(config.endpoint, "http://127.0.0.1:5000/add");
        assert_eq!(config.token, "env-token");
    }

    #[test]
    fn test_unparseable_file_is_ignored() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "not json").unwrap();
        let config = HostConfig::resolve(None, Some("t".into()), Some(&path));
        assert_eq!(config.token, "t");
    }

    #[test]
    fn test_missing_file_is_ignored() {
        let dir = TempDir::new().unwrap();
        let config = HostConfig::resolve(None, None, Some(&dir.path().join("absent.json")));
        assert_eq!(config, HostConfig::default());
    }

    #[test]
    fn test_config_path_ends_with_file_name() {
        if let Some(path) = config_path() {
            assert!(path.ends_with(CONFIG_FILE_NAME));
        }
    }
}
