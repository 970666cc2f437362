//! # Command Layer
//!
//! This module contains the **core business logic** of the inbox. Each command lives in its
//! own submodule and is a plain function over the repository and the composer state.
//!
//! ## What Commands Do NOT Do
//!
//! - **Any I/O**: No stdout, stderr, or terminal concerns
//! - **Argument parsing**: That's the CLI layer's job
//! - **Error presentation**: Commands return `Result`; the API decides which failures
//!   become user notifications
//!
//! ## Structured Returns
//!
//! Commands return [`CmdResult`], not strings:
//! - `messages`: leveled messages (info, success, warning, error)
//! - `listed_entries`: entries to display
//! - `affected_ids`: ids created or removed by the command
//!
//! ## Command Modules
//!
//! - [`save`]: Validate the composer, render and persist a new entry
//! - [`delete`]: Remove one entry
//! - [`clear`]: Remove all entries
//! - [`restore`]: Restore the backup slot
//! - [`list`]: Entries newest-first
//! - [`export`]: Plain-text export of saved commands
//! - [`transfer`]: Versioned JSON snapshot export/import
//! - [`helpers`]: Shared utilities (count syncing)

use crate::model::Entry;
use serde::Serialize;

pub mod clear;
pub mod delete;
pub mod export;
pub mod helpers;
pub mod list;
pub mod restore;
pub mod save;
pub mod transfer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, Serialize)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            content: content.into(),
        }
    }
}

#[derive(Debug, Default, Serialize)]
pub struct CmdResult {
    pub messages: Vec<CmdMessage>,
    pub listed_entries: Vec<Entry>,
    pub affected_ids: Vec<String>,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn with_listed_entries(mut self, entries: Vec<Entry>) -> Self {
        self.listed_entries = entries;
        self
    }

    pub fn with_affected_ids(mut self, ids: Vec<String>) -> Self {
        self.affected_ids = ids;
        self
    }

    pub fn has_errors(&self) -> bool {
        self.messages
            .iter()
            .any(|m| m.level == MessageLevel::Error)
    }
}
