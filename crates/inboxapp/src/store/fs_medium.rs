use super::medium::{check_quota, StorageMedium};
use crate::error::{InboxError, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use uuid::Uuid;

const ITEM_EXT: &str = "json";

/// Directory-backed storage medium: one `<key>.json` file per key.
pub struct FsMedium {
    root: PathBuf,
    quota: usize,
}

impl FsMedium {
    pub fn new(root: PathBuf, quota: usize) -> Self {
        Self { root, quota }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn item_path(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(InboxError::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid storage key '{}'", key),
            )));
        }
        Ok(self.root.join(format!("{}.{}", key, ITEM_EXT)))
    }

    fn ensure_dir(&self) -> Result<()> {
        if !self.root.exists() {
            fs::create_dir_all(&self.root)?;
        }
        Ok(())
    }

    /// Total size of every stored item except `skip`.
    fn used_by_others(&self, skip: &Path) -> Result<usize> {
        let mut total = 0usize;
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path == skip || !path.is_file() {
                continue;
            }
            if path.extension().and_then(|e| e.to_str()) == Some(ITEM_EXT) {
                total += fs::metadata(&path)?.len() as usize;
            }
        }
        Ok(total)
    }
}

impl StorageMedium for FsMedium {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        let path = self.item_path(key)?;
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(path)?))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let path = self.item_path(key)?;
        self.ensure_dir()?;
        check_quota(key, self.used_by_others(&path)?, value.len(), self.quota)?;

        // Atomic write
        let tmp_path = self.root.join(format!(".{}-{}.tmp", key, Uuid::new_v4()));
        fs::write(&tmp_path, value)?;
        if let Err(e) = fs::rename(&tmp_path, &path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e.into());
        }
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        let path = self.item_path(key)?;
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn item_size(&self, key: &str) -> Result<usize> {
        let path = self.item_path(key)?;
        if !path.exists() {
            return Ok(0);
        }
        Ok(fs::metadata(path)?.len() as usize)
    }
}
