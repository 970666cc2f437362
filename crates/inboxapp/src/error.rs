use thiserror::Error;

#[derive(Error, Debug)]
pub enum InboxError {
    #[error("Storage is unavailable")]
    StoreUnavailable,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Storage quota exceeded writing '{key}': {needed} bytes needed, {quota} allowed")]
    Quota {
        key: String,
        needed: usize,
        quota: usize,
    },

    #[error("Stored data under '{key}' is corrupt: {source}")]
    CorruptData {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Maximum number of saved entries reached ({max})")]
    CapacityExceeded { max: usize },

    #[error("Invalid import format: {0}")]
    InvalidImportFormat(String),

    #[error("No backup available")]
    NoBackupAvailable,

    #[error("{0}")]
    Validation(String),

    #[error("Unknown state path: {0}")]
    UnknownStatePath(String),

    #[error("Invalid value for '{path}': expected {expected}")]
    InvalidStateValue { path: String, expected: &'static str },

    #[error("Could not allocate a unique entry id after {0} attempts")]
    IdExhausted(usize),

    #[error("Config error: {0}")]
    Config(String),
}

impl InboxError {
    /// True for failures caused by size limits, either the medium's or the repository's.
    pub fn is_capacity(&self) -> bool {
        matches!(
            self,
            InboxError::Quota { .. } | InboxError::CapacityExceeded { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, InboxError>;
