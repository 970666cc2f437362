use crate::error::{InboxError, Result};

/// Abstract interface for the raw key/value medium.
///
/// This trait handles the "how" of storage (filesystem vs memory), while
/// [`super::DurableStore`] handles the "what" (JSON encoding, corruption detection,
/// availability probing).
///
/// All methods take `&self`; implementations that keep state in memory use interior
/// mutability since the whole system is single-threaded.
pub trait StorageMedium {
    /// Read the raw text stored under `key`.
    /// Returns Ok(None) if the key is absent.
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    /// MUST leave the previous value intact when the write is rejected.
    fn set_item(&self, key: &str, value: &str) -> Result<()>;

    /// Delete `key`. Deleting an absent key is not an error.
    fn remove_item(&self, key: &str) -> Result<()>;

    /// Size in bytes of the value under `key`, 0 if absent.
    fn item_size(&self, key: &str) -> Result<usize>;
}

/// Rejects a write that would push the medium over its quota.
///
/// `used_by_others` is the total size of every stored value except the one being replaced.
pub(crate) fn check_quota(
    key: &str,
    used_by_others: usize,
    value_len: usize,
    quota: usize,
) -> Result<()> {
    let needed = used_by_others + value_len;
    if needed > quota {
        return Err(InboxError::Quota {
            key: key.to_string(),
            needed,
            quota,
        });
    }
    Ok(())
}
