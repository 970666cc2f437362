use crate::api::InboxApi;
use crate::config::InboxConfig;
use crate::store::fs_medium::FsMedium;
use crate::store::{DurableStore, FileStore};
use std::path::PathBuf;
use tempfile::TempDir;

pub struct TestEnv {
    // Keeps the directory alive until the test is done
    pub _temp_dir: TempDir,
    pub root: PathBuf,
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

impl TestEnv {
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("failed to create temp dir");
        let root = temp_dir.path().to_path_buf();
        Self {
            _temp_dir: temp_dir,
            root,
        }
    }

    pub fn store(&self) -> FileStore {
        DurableStore::with_medium(FsMedium::new(
            self.root.clone(),
            InboxConfig::default().quota_bytes,
        ))
    }

    pub fn api(&self) -> InboxApi<FsMedium> {
        self.api_with(InboxConfig::default())
    }

    pub fn api_with(&self, config: InboxConfig) -> InboxApi<FsMedium> {
        InboxApi::new(self.store(), config)
    }
}
