//! # Domain Model: Entries, Backups and Snapshots
//!
//! An [`Entry`] is one saved note: the raw field values the user typed ([`TaskData`])
//! plus the command text rendered at save time (`task_command`). The rendered text is
//! frozen on purpose; export and display never re-run the formatter over old fields.
//!
//! ## Wire Shape
//!
//! Records are stored as camelCase JSON so that snapshots stay readable by hand:
//!
//! ```text
//! {
//!   "id": "task_1760788800000_k3j9x0a2b",
//!   "taskData": { "description": { "text": "Buy milk", "isMilestone": false }, "annotate": "" },
//!   "taskCommand": "Buy milk",
//!   "timestamp": "2026-10-18T12:00:00.000Z",
//!   "version": "1.0.0"
//! }
//! ```
//!
//! ## Ids
//!
//! `task_<unix-millis>_<9 base-36 chars>`. The random part is drawn from a v4 UUID.
//! Uniqueness inside a collection is enforced by the repository, which retries on
//! collision; see [`crate::repository`].
//!
//! ## Ordering
//!
//! Storage keeps insertion order. Newest-first is a presentation concern and is applied
//! with [`sort_newest_first`] at read time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Schema tag stamped on every entry and snapshot.
pub const SCHEMA_VERSION: &str = "1.0.0";

pub const ENTRY_ID_PREFIX: &str = "task_";
const ID_SUFFIX_LEN: usize = 9;
const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Description {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub is_milestone: bool,
}

impl Description {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_milestone: false,
        }
    }

    pub fn milestone(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_milestone: true,
        }
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Field values captured from the composer when an entry is saved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskData {
    #[serde(default)]
    pub description: Description,
    #[serde(default)]
    pub annotate: String,
}

impl TaskData {
    pub fn new(description: Description, annotate: impl Into<String>) -> Self {
        Self {
            description,
            annotate: annotate.into(),
        }
    }

    /// True when neither field carries any visible text.
    pub fn is_empty(&self) -> bool {
        self.description.is_blank() && self.annotate.trim().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    pub id: String,
    pub task_data: TaskData,
    pub task_command: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl Entry {
    pub fn new(id: String, task_data: TaskData, task_command: String) -> Self {
        Self {
            id,
            task_data,
            task_command,
            timestamp: Utc::now(),
            version: SCHEMA_VERSION.to_string(),
        }
    }
}

/// Contents of the single backup slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupRecord {
    pub timestamp: DateTime<Utc>,
    pub data: BackupData,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupData {
    #[serde(default)]
    pub saved_entries: Option<Vec<Entry>>,
}

impl BackupRecord {
    pub fn capture(entries: Vec<Entry>) -> Self {
        Self {
            timestamp: Utc::now(),
            data: BackupData {
                saved_entries: Some(entries),
            },
        }
    }
}

/// Versioned export of the whole collection, used for moving data between machines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub timestamp: DateTime<Utc>,
    pub version: String,
    pub saved_entries: Vec<Entry>,
}

/// Import-side view of a snapshot. Markers are optional here so that a missing one is
/// reported as a format error instead of a generic parse failure.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawSnapshot {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub saved_entries: Option<Vec<Entry>>,
}

/// Builds a fresh entry id for the given instant.
pub fn generate_entry_id(now: DateTime<Utc>) -> String {
    let suffix = to_base36(Uuid::new_v4().as_u128(), ID_SUFFIX_LEN);
    format!("{}{}_{}", ENTRY_ID_PREFIX, now.timestamp_millis(), suffix)
}

fn to_base36(mut n: u128, len: usize) -> String {
    let mut out = Vec::with_capacity(len);
    for _ in 0..len {
        out.push(BASE36[(n % 36) as usize]);
        n /= 36;
    }
    // Only ASCII digits and lowercase letters are pushed
    String::from_utf8_lossy(&out).into_owned()
}

/// Major component of a dotted version string ("1.2.3" -> 1).
pub fn schema_major(version: &str) -> Option<u64> {
    version.split('.').next()?.trim().parse().ok()
}

/// Sorts entries newest first. Entries with equal timestamps keep their storage order.
pub fn sort_newest_first(entries: &mut [Entry]) {
    entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
}
