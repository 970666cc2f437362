//! # Storage Layer
//!
//! The durable store wraps a raw key/value [`StorageMedium`] with JSON encoding, corruption
//! detection and an availability probe. It knows nothing about entries; the
//! [`crate::repository::EntryRepository`] builds the collection semantics on top.
//!
//! ## Contract
//!
//! - [`DurableStore::set`]: encode and write. Encoding failures surface as
//!   `Serialization`, medium rejections as `Quota` or `Io`. Nothing is swallowed.
//! - [`DurableStore::get`]: read and decode. An absent key is `Ok(None)`; bytes that do
//!   not decode are `CorruptData` and the caller decides whether that is fatal.
//! - [`DurableStore::remove`]: idempotent delete.
//! - [`DurableStore::is_available`]: write-then-delete probe that never fails; it is run
//!   once at startup to decide whether persistence is usable at all.
//!
//! ## Storage Layout
//!
//! ```text
//! <data dir>/
//! ├── inbox_saved_entries.json   # array of Entry records
//! ├── inbox_backup_data.json     # {timestamp, data: {savedEntries}}
//! ├── inbox_settings.json        # reserved
//! └── inbox.toml                 # configuration (not part of the store)
//! ```
//!
//! ## Implementations
//!
//! - [`fs_medium::FsMedium`]: production medium, one file per key, atomic writes.
//! - [`mem_medium::MemMedium`]: for testing logic without filesystem I/O.

use crate::error::{InboxError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

pub mod fs_medium;
pub mod medium;
pub mod mem_medium;

pub use medium::StorageMedium;

pub const SAVED_ENTRIES_KEY: &str = "inbox_saved_entries";
pub const BACKUP_KEY: &str = "inbox_backup_data";
/// Reserved; nothing reads or writes it yet.
pub const SETTINGS_KEY: &str = "inbox_settings";

const PROBE_KEY: &str = "__probe__";

/// Usage report over the inbox keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StorageInfo {
    pub is_available: bool,
    pub entries_count: usize,
    pub bytes_used: usize,
}

pub struct DurableStore<M: StorageMedium> {
    medium: M,
}

pub type FileStore = DurableStore<fs_medium::FsMedium>;
pub type InMemoryStore = DurableStore<mem_medium::MemMedium>;

impl<M: StorageMedium> DurableStore<M> {
    pub fn with_medium(medium: M) -> Self {
        Self { medium }
    }

    pub fn medium(&self) -> &M {
        &self.medium
    }

    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let text = serde_json::to_string(value).map_err(InboxError::Serialization)?;
        self.medium.set_item(key, &text).inspect_err(|e| {
            warn!(key, bytes = text.len(), error = %e, "Store write rejected");
        })?;
        debug!(key, bytes = text.len(), "Stored value");
        Ok(())
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let Some(text) = self.medium.get_item(key)? else {
            return Ok(None);
        };
        serde_json::from_str(&text)
            .map(Some)
            .map_err(|source| InboxError::CorruptData {
                key: key.to_string(),
                source,
            })
    }

    pub fn remove(&self, key: &str) -> Result<()> {
        self.medium.remove_item(key)
    }

    /// True when a throwaway write and delete both succeed.
    ///
    /// A full medium is still usable: reads and deletes work, so a quota rejection of the
    /// throwaway write does not count as unavailable.
    pub fn is_available(&self) -> bool {
        let probe = self
            .medium
            .set_item(PROBE_KEY, "probe")
            .and_then(|_| self.medium.remove_item(PROBE_KEY));
        match probe {
            Ok(()) => true,
            Err(InboxError::Quota { .. }) => {
                debug!("Storage medium is full; treating it as available");
                true
            }
            Err(e) => {
                warn!(error = %e, "Storage medium failed availability probe");
                false
            }
        }
    }

    /// Combined stored size of `keys`. Unreadable keys count as empty.
    pub fn bytes_used(&self, keys: &[&str]) -> usize {
        keys.iter()
            .map(|key| self.medium.item_size(key).unwrap_or(0))
            .sum()
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::with_medium(mem_medium::MemMedium::new())
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}
