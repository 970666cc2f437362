//! # Initialization
//!
//! Resolves the data directory, loads configuration and opens the file-backed store.
//!
//! ## Data Directory Resolution
//!
//! 1. The explicit override (the CLI's `--data <path>`).
//! 2. The `INBOX_DATA` environment variable.
//! 3. The OS data directory for `inbox` (via the `directories` crate), e.g.
//!    `~/.local/share/inbox` on Linux.
//!
//! The directory is created if it does not exist. `inbox.toml` is read from the same
//! directory, next to the stored JSON documents.

use crate::api::InboxApi;
use crate::config::InboxConfig;
use crate::error::{InboxError, Result};
use crate::store::fs_medium::FsMedium;
use crate::store::DurableStore;
use directories::ProjectDirs;
use std::path::PathBuf;
use tracing::debug;

pub const DATA_ENV: &str = "INBOX_DATA";

pub struct InboxContext {
    pub api: InboxApi<FsMedium>,
    pub config: InboxConfig,
    pub data_dir: PathBuf,
}

pub fn resolve_data_dir(data_override: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(path) = data_override {
        return Ok(path);
    }
    if let Some(path) = std::env::var_os(DATA_ENV).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(path));
    }
    ProjectDirs::from("", "", "inbox")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| InboxError::Config("could not determine a data directory".into()))
}

pub fn initialize(data_override: Option<PathBuf>) -> Result<InboxContext> {
    let data_dir = resolve_data_dir(data_override)?;
    std::fs::create_dir_all(&data_dir)?;

    let config = InboxConfig::load(&data_dir)?;
    debug!(data_dir = %data_dir.display(), max_entries = config.max_entries, "Opening inbox");

    let medium = FsMedium::new(data_dir.clone(), config.quota_bytes);
    let api = InboxApi::new(DurableStore::with_medium(medium), config.clone());

    Ok(InboxContext {
        api,
        config,
        data_dir,
    })
}
