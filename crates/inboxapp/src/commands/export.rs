//! Plain-text export: every saved command, one blank line apart, ready to paste into a
//! task manager.

use crate::error::{InboxError, Result};
use crate::repository::EntryRepository;
use crate::store::StorageMedium;
use chrono::NaiveDate;
use serde::Serialize;

pub const NOTHING_TO_EXPORT: &str = "no saved entries to export";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportedText {
    pub file_name: String,
    pub content: String,
    pub count: usize,
}

pub fn file_name(prefix: &str, date: NaiveDate) -> String {
    format!("{}_{}.txt", prefix, date.format("%Y-%m-%d"))
}

pub fn run<M: StorageMedium>(
    repo: &EntryRepository<M>,
    prefix: &str,
    date: NaiveDate,
) -> Result<ExportedText> {
    let entries = repo.list()?;
    if entries.is_empty() {
        return Err(InboxError::Validation(NOTHING_TO_EXPORT.to_string()));
    }

    let content = entries
        .iter()
        .map(|e| e.task_command.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");

    Ok(ExportedText {
        file_name: file_name(prefix, date),
        content,
        count: entries.len(),
    })
}
