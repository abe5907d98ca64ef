//! Native-messaging host lookup.
//!
//! A configured host is either a path to an executable, used as-is, or a
//! registered host *name*, resolved through the `<name>.json` manifests that
//! browsers read from their per-user and system manifest directories.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use super::TransportError;

/// Manifest fields the resolver needs.
#[derive(Debug, Clone, Deserialize)]
pub struct HostManifest {
    pub name: String,
    pub path: PathBuf,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

/// Returns whether `name` follows the native-messaging host name grammar:
/// dot-separated segments of lowercase ASCII letters, digits, and `_`.
#[must_use]
pub fn is_valid_host_name(name: &str) -> bool {
    !name.is_empty()
        && name.split('.').all(|segment| {
            !segment.is_empty()
                && segment
                    .chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
        })
}

/// Manifest directories checked for this platform, user locations first.
#[must_use]
pub fn manifest_dirs() -> Vec<PathBuf> {
    let home = std::env::var_os("HOME").map(PathBuf::from);
    let mut dirs = Vec::new();
    if cfg!(target_os = "macos") {
        if let Some(home) = &home {
            let support = home.join("Library").join("Application Support");
            dirs.push(support.join("Google/Chrome/NativeMessagingHosts"));
            dirs.push(support.join("Chromium/NativeMessagingHosts"));
            dirs.push(support.join("Microsoft Edge/NativeMessagingHosts"));
            dirs.push(support.join("Mozilla/NativeMessagingHosts"));
        }
        dirs.push(PathBuf::from(
            "/Library/Google/Chrome/NativeMessagingHosts",
        ));
        dirs.push(PathBuf::from(
            "/Library/Application Support/Mozilla/NativeMessagingHosts",
        ));
    } else if cfg!(unix) {
        let config_home = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| home.as_ref().map(|h| h.join(".config")));
        if let Some(config) = &config_home {
            dirs.push(config.join("google-chrome/NativeMessagingHosts"));
            dirs.push(config.join("chromium/NativeMessagingHosts"));
            dirs.push(config.join("microsoft-edge/NativeMessagingHosts"));
        }
        if let Some(home) = &home {
            dirs.push(home.join(".mozilla/native-messaging-hosts"));
        }
        dirs.push(PathBuf::from("/etc/opt/chrome/native-messaging-hosts"));
        dirs.push(PathBuf::from("/etc/chromium/native-messaging-hosts"));
        dirs.push(PathBuf::from("/usr/lib/mozilla/native-messaging-hosts"));
    }
    // Windows registers hosts in the registry; only explicit paths work there.
    dirs
}

/// Resolves a configured host to an executable using [`manifest_dirs`].
///
/// # Errors
///
/// Returns [`TransportError`] if the host is neither an existing file nor a
/// valid name with a readable manifest.
pub async fn resolve_host(host: &str) -> Result<PathBuf, TransportError> {
    resolve_host_in(host, &manifest_dirs()).await
}

/// Resolves a configured host against explicit manifest directories.
///
/// # Errors
///
/// See [`resolve_host`].
pub async fn resolve_host_in(host: &str, dirs: &[PathBuf]) -> Result<PathBuf, TransportError> {
    let host = host.trim();
    let as_path = Path::new(host);
    if tokio::fs::metadata(as_path)
        .await
        .is_ok_and(|meta| meta.is_file())
    {
        return Ok(as_path.to_path_buf());
    }
    if !is_valid_host_name(host) {
        return Err(TransportError::channel(&format!(
            "invalid native host name: {host}"
        )));
    }

    let file_name = format!("{host}.json");
    for dir in dirs {
        let manifest_path = dir.join(&file_name);
        let raw = match tokio::fs::read_to_string(&manifest_path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => continue,
            Err(err) => {
                debug!(path = %manifest_path.display(), error = %err, "unreadable host manifest");
                continue;
            }
        };
        let manifest: HostManifest = serde_json::from_str(&raw).map_err(|err| {
            TransportError::channel(&format!(
                "invalid host manifest {}: {err}",
                manifest_path.display()
            ))
        })?;
        if manifest.name != host {
            debug!(path = %manifest_path.display(), name = %manifest.name, "manifest name mismatch");
            continue;
        }
        let exe = if manifest.path.is_absolute() {
            manifest.path
        } else {
            dir.join(manifest.path)
        };
        debug!(host, exe = %exe.display(), "native host resolved");
        return Ok(exe);
    }
    Err(TransportError::host_not_found(host, dirs.to_vec()))
}
