//! # Configuration
//!
//! Inbox configuration is managed by [`confique`], which handles layered loading from a
//! TOML file, environment variables and compiled defaults.
//!
//! ## Resolution Order
//!
//! 1. **Environment variables**: `INBOX_MAX_ENTRIES`, `INBOX_QUOTA_BYTES`, ...
//! 2. **Config file**: `<data dir>/inbox.toml`, if present.
//! 3. **Compiled Defaults**: via `#[config(default = ...)]`.
//!
//! ## Available Settings
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `max_entries` | `1000` | Hard cap on saved entries |
//! | `quota_bytes` | `5242880` | Total bytes the store may occupy |
//! | `preview_tick_ms` | `1000` | Safety-net re-render interval of the live preview |
//! | `export_prefix` | `inbox` | File name prefix for text exports |
//!
//! The reserved settings key inside the store is not used for any of these.

use crate::error::{InboxError, Result};
use confique::Config;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const CONFIG_FILENAME: &str = "inbox.toml";

#[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct InboxConfig {
    /// Maximum number of saved entries
    #[config(default = 1000, env = "INBOX_MAX_ENTRIES")]
    pub max_entries: usize,

    /// Storage quota in bytes, across all inbox keys
    #[config(default = 5242880, env = "INBOX_QUOTA_BYTES")]
    pub quota_bytes: usize,

    /// Live preview re-render interval in milliseconds
    #[config(default = 1000, env = "INBOX_PREVIEW_TICK_MS")]
    pub preview_tick_ms: u64,

    /// Prefix of exported text file names
    #[config(default = "inbox", env = "INBOX_EXPORT_PREFIX")]
    pub export_prefix: String,
}

impl Default for InboxConfig {
    fn default() -> Self {
        Self {
            max_entries: crate::repository::DEFAULT_MAX_ENTRIES,
            quota_bytes: 5 * 1024 * 1024,
            preview_tick_ms: 1000,
            export_prefix: "inbox".to_string(),
        }
    }
}

impl InboxConfig {
    /// Loads configuration for the store rooted at `data_dir`.
    pub fn load(data_dir: &Path) -> Result<Self> {
        Self::builder()
            .env()
            .file(data_dir.join(CONFIG_FILENAME))
            .load()
            .map_err(|e| InboxError::Config(e.to_string()))
    }

    pub fn preview_interval(&self) -> Duration {
        Duration::from_millis(self.preview_tick_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_default_config() {
        let config = InboxConfig::default();
        assert_eq!(config.max_entries, 1000);
        assert_eq!(config.quota_bytes, 5 * 1024 * 1024);
        assert_eq!(config.preview_interval(), Duration::from_secs(1));
        assert_eq!(config.export_prefix, "inbox");
    }

    #[test]
    fn test_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILENAME),
            "max_entries = 5\nexport_prefix = \"tw\"\n",
        )
        .unwrap();

        let config = InboxConfig::load(dir.path()).unwrap();
        assert_eq!(config.max_entries, 5);
        assert_eq!(config.export_prefix, "tw");
        assert_eq!(config.preview_tick_ms, 1000);
    }

    #[test]
    fn test_invalid_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILENAME), "max_entries = \"many\"").unwrap();
        assert!(matches!(
            InboxConfig::load(dir.path()),
            Err(InboxError::Config(_))
        ));
    }
}
