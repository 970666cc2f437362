use super::medium::{check_quota, StorageMedium};
use crate::error::{InboxError, Result};
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::io;

/// In-memory storage medium for testing.
///
/// Uses `RefCell` for interior mutability since the inbox is single-threaded.
/// Failure switches let tests exercise the unavailable and write-error paths.
pub struct MemMedium {
    items: RefCell<BTreeMap<String, String>>,
    quota: usize,
    simulate_write_error: Cell<bool>,
    unavailable: Cell<bool>,
}

impl Default for MemMedium {
    fn default() -> Self {
        Self::with_quota(usize::MAX)
    }
}

impl MemMedium {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(quota: usize) -> Self {
        Self {
            items: RefCell::new(BTreeMap::new()),
            quota,
            simulate_write_error: Cell::new(false),
            unavailable: Cell::new(false),
        }
    }

    /// Enable write error simulation for testing error handling.
    pub fn set_simulate_write_error(&self, simulate: bool) {
        self.simulate_write_error.set(simulate);
    }

    /// Make every operation fail, as a browser does when storage is disabled.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.set(unavailable);
    }

    /// Test helper to plant raw text, bypassing quota and encoding.
    pub fn put_raw(&self, key: &str, value: &str) {
        self.items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
    }

    fn ensure_usable(&self) -> Result<()> {
        if self.unavailable.get() {
            return Err(InboxError::Io(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "storage disabled",
            )));
        }
        Ok(())
    }
}

impl StorageMedium for MemMedium {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        self.ensure_usable()?;
        Ok(self.items.borrow().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.ensure_usable()?;
        if self.simulate_write_error.get() {
            return Err(InboxError::Io(io::Error::other("Simulated write error")));
        }

        let mut items = self.items.borrow_mut();
        let used_by_others: usize = items
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(_, v)| v.len())
            .sum();
        check_quota(key, used_by_others, value.len(), self.quota)?;

        items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        self.ensure_usable()?;
        self.items.borrow_mut().remove(key);
        Ok(())
    }

    fn item_size(&self, key: &str) -> Result<usize> {
        self.ensure_usable()?;
        Ok(self.items.borrow().get(key).map_or(0, String::len))
    }
}
