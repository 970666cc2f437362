//! # Entry Repository
//!
//! The repository is the single writer of the saved-entry collection and the backup slot.
//! Both live in the [`DurableStore`] under fixed keys.
//!
//! ## Backup Before Mutate
//!
//! Every mutating call (`create`, `delete`, `clear`, `import_all`) first copies the current
//! collection into the backup slot and only then applies its change. There is one slot; each
//! mutation overwrites it. The backup is never replayed automatically: it is only used by
//! [`EntryRepository::restore_from_backup`].
//!
//! If the backup itself cannot be written, the mutation is aborted. The exception is a
//! full medium under `delete` or `clear`: those free space, so a quota rejection of the
//! backup drops the stale slot and the mutation goes ahead without an undo point.
//!
//! ## Degraded Mode
//!
//! Availability is probed once, when the repository is opened. When the medium is unusable:
//! - mutations, restore and import fail with `StoreUnavailable`;
//! - `list`, `count` and `export_all` return empty results so the UI can still render.
//!
//! ## Limits
//!
//! The collection never holds more than `max_entries` records. Hitting the limit is a hard
//! `CapacityExceeded` failure on create; nothing is evicted.

use crate::error::{InboxError, Result};
use crate::model::{
    generate_entry_id, schema_major, BackupRecord, Entry, RawSnapshot, Snapshot, TaskData,
    SCHEMA_VERSION,
};
use crate::store::{
    DurableStore, StorageInfo, StorageMedium, BACKUP_KEY, SAVED_ENTRIES_KEY, SETTINGS_KEY,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, info, warn};

pub const DEFAULT_MAX_ENTRIES: usize = 1000;
const ID_ATTEMPTS: usize = 16;

/// Summary of the backup slot, for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackupSummary {
    pub timestamp: DateTime<Utc>,
    pub entries: usize,
}

pub struct EntryRepository<M: StorageMedium> {
    store: DurableStore<M>,
    max_entries: usize,
    available: bool,
}

impl<M: StorageMedium> EntryRepository<M> {
    /// Opens the repository, probing the medium and seeding an empty collection if none exists.
    pub fn open(store: DurableStore<M>, max_entries: usize) -> Self {
        let available = store.is_available();
        let repo = Self {
            store,
            max_entries,
            available,
        };

        if !available {
            warn!("Storage unavailable; entries will not be saved this session");
            return repo;
        }

        match repo.store.get::<Vec<Entry>>(SAVED_ENTRIES_KEY) {
            Ok(Some(_)) => {}
            Ok(None) => {
                if let Err(e) = repo.store.set(SAVED_ENTRIES_KEY, &Vec::<Entry>::new()) {
                    warn!(error = %e, "Could not seed empty entry collection");
                }
            }
            Err(e) => warn!(error = %e, "Saved entries are unreadable"),
        }
        repo
    }

    pub fn is_available(&self) -> bool {
        self.available
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    pub fn store(&self) -> &DurableStore<M> {
        &self.store
    }

    fn ensure_available(&self) -> Result<()> {
        if !self.available {
            return Err(InboxError::StoreUnavailable);
        }
        Ok(())
    }

    fn load(&self) -> Result<Vec<Entry>> {
        Ok(self.store.get(SAVED_ENTRIES_KEY)?.unwrap_or_default())
    }

    fn persist(&self, entries: &[Entry]) -> Result<()> {
        self.store.set(SAVED_ENTRIES_KEY, entries)
    }

    /// Copies the live collection into the backup slot and hands it back for mutation.
    fn backup(&self) -> Result<Vec<Entry>> {
        let current = self.load()?;
        self.store
            .set(BACKUP_KEY, &BackupRecord::capture(current.clone()))?;
        debug!(entries = current.len(), "Backup captured");
        Ok(current)
    }

    /// Backup for mutations that shrink the collection.
    ///
    /// On a full medium the new backup may not fit. The old slot is removed so `restore`
    /// cannot resurrect an unrelated state, then the backup is retried once.
    fn backup_before_shrink(&self) -> Result<Vec<Entry>> {
        match self.backup() {
            Err(InboxError::Quota { .. }) => {
                self.store.remove(BACKUP_KEY)?;
                match self.backup() {
                    Err(InboxError::Quota { .. }) => {
                        warn!("Storage full; removing entries without a backup");
                        self.load()
                    }
                    other => other,
                }
            }
            other => other,
        }
    }

    fn fresh_id(&self, entries: &[Entry]) -> Result<String> {
        let taken: HashSet<&str> = entries.iter().map(|e| e.id.as_str()).collect();
        for _ in 0..ID_ATTEMPTS {
            let id = generate_entry_id(Utc::now());
            if !taken.contains(id.as_str()) {
                return Ok(id);
            }
            warn!(id, "Entry id collision, retrying");
        }
        Err(InboxError::IdExhausted(ID_ATTEMPTS))
    }

    pub fn create(&self, task_data: TaskData, task_command: String) -> Result<String> {
        self.ensure_available()?;
        let mut entries = self.backup()?;

        if entries.len() >= self.max_entries {
            return Err(InboxError::CapacityExceeded {
                max: self.max_entries,
            });
        }

        let id = self.fresh_id(&entries)?;
        entries.push(Entry::new(id.clone(), task_data, task_command));
        self.persist(&entries)?;

        info!(id, count = entries.len(), "Entry created");
        Ok(id)
    }

    /// Removes the entry with `id`. Returns false when no such entry exists.
    pub fn delete(&self, id: &str) -> Result<bool> {
        self.ensure_available()?;
        let mut entries = self.backup_before_shrink()?;

        let before = entries.len();
        entries.retain(|e| e.id != id);
        let removed = entries.len() != before;

        self.persist(&entries)?;
        debug!(id, removed, "Entry delete");
        Ok(removed)
    }

    pub fn clear(&self) -> Result<bool> {
        self.ensure_available()?;
        let previous = self.backup_before_shrink()?;
        self.persist(&[])?;
        info!(cleared = previous.len(), "Entries cleared");
        Ok(true)
    }

    /// All entries in storage (insertion) order.
    pub fn list(&self) -> Result<Vec<Entry>> {
        if !self.available {
            return Ok(Vec::new());
        }
        self.load()
    }

    pub fn count(&self) -> Result<usize> {
        Ok(self.list()?.len())
    }

    /// Serializes the whole collection as a versioned, timestamped snapshot.
    pub fn export_all(&self) -> Result<String> {
        let snapshot = Snapshot {
            timestamp: Utc::now(),
            version: SCHEMA_VERSION.to_string(),
            saved_entries: self.list()?,
        };
        serde_json::to_string_pretty(&snapshot).map_err(InboxError::Serialization)
    }

    /// Replaces the collection with the entries from a snapshot. Returns the new count.
    pub fn import_all(&self, serialized: &str) -> Result<usize> {
        self.ensure_available()?;
        self.backup()?;

        let entries = self.validate_snapshot(serialized)?;
        self.persist(&entries)?;

        info!(count = entries.len(), "Entries imported");
        Ok(entries.len())
    }

    fn validate_snapshot(&self, serialized: &str) -> Result<Vec<Entry>> {
        let raw: RawSnapshot = serde_json::from_str(serialized)
            .map_err(|e| InboxError::InvalidImportFormat(e.to_string()))?;

        let version = raw
            .version
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| InboxError::InvalidImportFormat("missing version marker".into()))?;
        if raw.timestamp.filter(|t| !t.trim().is_empty()).is_none() {
            return Err(InboxError::InvalidImportFormat(
                "missing timestamp marker".into(),
            ));
        }

        let supported = schema_major(SCHEMA_VERSION).unwrap_or(0);
        let readable = |v: &str| matches!(schema_major(v), Some(major) if major <= supported);
        if !readable(&version) {
            return Err(InboxError::InvalidImportFormat(format!(
                "unsupported version '{}'",
                version
            )));
        }

        let entries = raw
            .saved_entries
            .ok_or_else(|| InboxError::InvalidImportFormat("missing savedEntries".into()))?;

        if entries.len() > self.max_entries {
            return Err(InboxError::CapacityExceeded {
                max: self.max_entries,
            });
        }

        if let Some(entry) = entries.iter().find(|e| !readable(&e.version)) {
            return Err(InboxError::InvalidImportFormat(format!(
                "entry '{}' has unsupported version '{}'",
                entry.id, entry.version
            )));
        }

        let mut seen = HashSet::new();
        if let Some(dup) = entries.iter().find(|e| !seen.insert(e.id.as_str())) {
            return Err(InboxError::InvalidImportFormat(format!(
                "duplicate entry id '{}'",
                dup.id
            )));
        }

        Ok(entries)
    }

    /// Overwrites the live collection with the backup slot.
    pub fn restore_from_backup(&self) -> Result<bool> {
        self.ensure_available()?;
        let entries = self
            .store
            .get::<BackupRecord>(BACKUP_KEY)?
            .and_then(|record| record.data.saved_entries)
            .ok_or(InboxError::NoBackupAvailable)?;

        self.persist(&entries)?;
        info!(count = entries.len(), "Entries restored from backup");
        Ok(true)
    }

    /// The backup slot, if one has been captured.
    pub fn backup_record(&self) -> Result<Option<BackupRecord>> {
        if !self.available {
            return Ok(None);
        }
        self.store.get(BACKUP_KEY)
    }

    pub fn backup_summary(&self) -> Result<Option<BackupSummary>> {
        Ok(self.backup_record()?.map(|record| BackupSummary {
            timestamp: record.timestamp,
            entries: record.data.saved_entries.map_or(0, |e| e.len()),
        }))
    }

    pub fn info(&self) -> StorageInfo {
        StorageInfo {
            is_available: self.available,
            entries_count: self.count().unwrap_or(0),
            bytes_used: self
                .store
                .bytes_used(&[SAVED_ENTRIES_KEY, BACKUP_KEY, SETTINGS_KEY]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Description;
    use crate::store::mem_medium::MemMedium;
    use crate::store::InMemoryStore;

    fn repo() -> EntryRepository<MemMedium> {
        EntryRepository::open(InMemoryStore::new(), DEFAULT_MAX_ENTRIES)
    }

    fn repo_with_max(max: usize) -> EntryRepository<MemMedium> {
        EntryRepository::open(InMemoryStore::new(), max)
    }

    fn unavailable_repo() -> EntryRepository<MemMedium> {
        let medium = MemMedium::new();
        medium.set_unavailable(true);
        EntryRepository::open(DurableStore::with_medium(medium), DEFAULT_MAX_ENTRIES)
    }

    /// Two saved entries copied into a medium whose quota is exactly what they use.
    fn full_repo() -> (EntryRepository<MemMedium>, Vec<String>) {
        let source = repo();
        let stored = vec![add(&source, "a"), add(&source, "b")];

        let keys = [SAVED_ENTRIES_KEY, BACKUP_KEY];
        let medium = MemMedium::with_quota(source.store().bytes_used(&keys));
        for key in keys {
            if let Some(raw) = source.store().medium().get_item(key).unwrap() {
                medium.put_raw(key, &raw);
            }
        }
        let full = EntryRepository::open(DurableStore::with_medium(medium), DEFAULT_MAX_ENTRIES);
        (full, stored)
    }

    fn add(repo: &EntryRepository<MemMedium>, text: &str) -> String {
        repo.create(
            TaskData::new(Description::new(text), ""),
            text.to_string(),
        )
        .unwrap()
    }

    fn ids(entries: &[Entry]) -> Vec<String> {
        entries.iter().map(|e| e.id.clone()).collect()
    }

    #[test]
    fn open_seeds_empty_collection() {
        let repo = repo();
        let stored = repo.store().medium().get_item(SAVED_ENTRIES_KEY).unwrap();
        assert_eq!(stored.as_deref(), Some("[]"));
    }

    #[test]
    fn open_keeps_existing_collection() {
        let store = InMemoryStore::new();
        let first = EntryRepository::open(store, 10);
        add(&first, "kept");

        let reopened = EntryRepository::open(first.store, 10);
        assert_eq!(reopened.count().unwrap(), 1);
    }

    #[test]
    fn create_counts_and_unique_ids() {
        let repo = repo();
        let created: Vec<String> = (0..50).map(|i| add(&repo, &format!("t{}", i))).collect();

        assert_eq!(repo.count().unwrap(), 50);
        let unique: HashSet<&String> = created.iter().collect();
        assert_eq!(unique.len(), 50);
    }

    #[test]
    fn create_stamps_version_and_keeps_command() {
        let repo = repo();
        let id = repo
            .create(
                TaskData::new(Description::milestone("Ship"), "a\nb"),
                "MILESTONE: Ship\n+\na\nb".into(),
            )
            .unwrap();

        let entry = repo.list().unwrap().into_iter().next().unwrap();
        assert_eq!(entry.id, id);
        assert_eq!(entry.version, SCHEMA_VERSION);
        assert_eq!(entry.task_command, "MILESTONE: Ship\n+\na\nb");
        assert!(entry.task_data.description.is_milestone);
    }

    #[test]
    fn list_keeps_insertion_order() {
        let repo = repo();
        let a = add(&repo, "a");
        let b = add(&repo, "b");
        let c = add(&repo, "c");
        assert_eq!(ids(&repo.list().unwrap()), vec![a, b, c]);
    }

    #[test]
    fn create_at_capacity_fails_and_changes_nothing() {
        let repo = repo_with_max(2);
        add(&repo, "a");
        add(&repo, "b");
        let before = repo.list().unwrap();

        let err = repo
            .create(TaskData::new(Description::new("c"), ""), "c".into())
            .unwrap_err();
        assert!(matches!(err, InboxError::CapacityExceeded { max: 2 }));
        assert_eq!(repo.list().unwrap(), before);
    }

    #[test]
    fn delete_missing_id_returns_false() {
        let repo = repo();
        add(&repo, "a");
        let before = repo.list().unwrap();

        assert!(!repo.delete("task_0_nothere").unwrap());
        assert_eq!(repo.list().unwrap(), before);
    }

    #[test]
    fn delete_removes_exactly_one() {
        let repo = repo();
        let a = add(&repo, "a");
        let b = add(&repo, "b");
        let c = add(&repo, "c");

        assert!(repo.delete(&b).unwrap());
        assert_eq!(repo.count().unwrap(), 2);
        assert_eq!(ids(&repo.list().unwrap()), vec![a, c]);
    }

    #[test]
    fn clear_empties_and_backs_up() {
        let repo = repo();
        add(&repo, "a");
        add(&repo, "b");
        let before = repo.list().unwrap();

        assert!(repo.clear().unwrap());
        assert!(repo.list().unwrap().is_empty());

        let backup = repo.backup_record().unwrap().unwrap();
        assert_eq!(backup.data.saved_entries, Some(before));
    }

    #[test]
    fn backup_holds_only_latest_snapshot() {
        let repo = repo();
        add(&repo, "a");
        add(&repo, "b");

        // Backup taken before the second create holds one entry
        let summary = repo.backup_summary().unwrap().unwrap();
        assert_eq!(summary.entries, 1);
    }

    #[test]
    fn restore_without_backup_fails() {
        let repo = repo();
        assert!(matches!(
            repo.restore_from_backup(),
            Err(InboxError::NoBackupAvailable)
        ));
    }

    #[test]
    fn restore_undoes_last_mutation() {
        let repo = repo();
        add(&repo, "a");
        add(&repo, "b");
        let before = repo.list().unwrap();
        repo.clear().unwrap();

        assert!(repo.restore_from_backup().unwrap());
        assert_eq!(repo.list().unwrap(), before);
    }

    #[test]
    fn restore_twice_is_idempotent() {
        let repo = repo();
        add(&repo, "a");
        let b = add(&repo, "b");
        repo.delete(&b).unwrap();

        repo.restore_from_backup().unwrap();
        let first = repo.list().unwrap();
        repo.restore_from_backup().unwrap();
        assert_eq!(repo.list().unwrap(), first);
        assert_eq!(first.len(), 2);
    }

    #[test]
    fn export_import_round_trip() {
        let source = repo();
        add(&source, "one");
        add(&source, "two");
        add(&source, "three");
        let snapshot = source.export_all().unwrap();

        let target = repo();
        assert_eq!(target.import_all(&snapshot).unwrap(), 3);
        assert_eq!(target.list().unwrap(), source.list().unwrap());
    }

    #[test]
    fn export_carries_markers() {
        let repo = repo();
        add(&repo, "a");
        let json: serde_json::Value = serde_json::from_str(&repo.export_all().unwrap()).unwrap();
        assert_eq!(json["version"], SCHEMA_VERSION);
        assert!(json["timestamp"].is_string());
        assert_eq!(json["savedEntries"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn import_rejects_missing_markers_without_touching_data() {
        let repo = repo();
        add(&repo, "keep");
        let before = repo.list().unwrap();

        for bad in [
            r#"{"timestamp":"2026-01-01T00:00:00Z","savedEntries":[]}"#,
            r#"{"version":"1.0.0","savedEntries":[]}"#,
            r#"{"version":"1.0.0","timestamp":"2026-01-01T00:00:00Z"}"#,
            r#"{"version":"","timestamp":"2026-01-01T00:00:00Z","savedEntries":[]}"#,
            "not json at all",
        ] {
            let err = repo.import_all(bad).unwrap_err();
            assert!(
                matches!(err, InboxError::InvalidImportFormat(_)),
                "{} -> {:?}",
                bad,
                err
            );
            assert_eq!(repo.list().unwrap(), before);
        }
    }

    #[test]
    fn import_rejects_newer_major_version() {
        let repo = repo();
        let payload = r#"{"version":"2.0.0","timestamp":"2026-01-01T00:00:00Z","savedEntries":[]}"#;
        assert!(matches!(
            repo.import_all(payload),
            Err(InboxError::InvalidImportFormat(_))
        ));
    }

    #[test]
    fn full_medium_still_lists_and_deletes() {
        let (repo, stored) = full_repo();
        assert!(repo.is_available());
        assert_eq!(ids(&repo.list().unwrap()), stored);

        assert!(repo.delete(&stored[0]).unwrap());
        assert_eq!(ids(&repo.list().unwrap()), vec![stored[1].clone()]);
        // The pre-delete backup did not fit, so no stale undo point is left behind
        assert!(repo.backup_record().unwrap().is_none());
    }

    #[test]
    fn full_medium_can_be_cleared() {
        let (repo, _) = full_repo();
        assert!(repo.clear().unwrap());
        assert_eq!(repo.count().unwrap(), 0);
    }

    #[test]
    fn import_rejects_entries_with_unreadable_versions() {
        let source = repo();
        add(&source, "a");
        let entry = source.list().unwrap().remove(0);

        for bad in ["9.0.0", ""] {
            let mut tagged = entry.clone();
            tagged.version = bad.to_string();
            let snapshot = Snapshot {
                timestamp: Utc::now(),
                version: SCHEMA_VERSION.into(),
                saved_entries: vec![tagged],
            };
            let payload = serde_json::to_string(&snapshot).unwrap();

            let target = repo();
            add(&target, "keep");
            assert!(matches!(
                target.import_all(&payload),
                Err(InboxError::InvalidImportFormat(msg)) if msg.contains(&entry.id)
            ));
            assert_eq!(target.count().unwrap(), 1);
        }
    }

    #[test]
    fn import_rejects_duplicate_ids() {
        let source = repo();
        add(&source, "a");
        let entry = source.list().unwrap().remove(0);
        let snapshot = Snapshot {
            timestamp: Utc::now(),
            version: SCHEMA_VERSION.into(),
            saved_entries: vec![entry.clone(), entry],
        };
        let payload = serde_json::to_string(&snapshot).unwrap();

        let target = repo();
        assert!(matches!(
            target.import_all(&payload),
            Err(InboxError::InvalidImportFormat(msg)) if msg.contains("duplicate")
        ));
    }

    #[test]
    fn import_over_capacity_fails() {
        let source = repo();
        add(&source, "a");
        add(&source, "b");
        let payload = source.export_all().unwrap();

        let target = repo_with_max(1);
        assert!(matches!(
            target.import_all(&payload),
            Err(InboxError::CapacityExceeded { max: 1 })
        ));
        assert_eq!(target.count().unwrap(), 0);
    }

    #[test]
    fn import_backs_up_previous_collection() {
        let repo = repo();
        add(&repo, "old");
        let before = repo.list().unwrap();

        let empty = r#"{"version":"1.0.0","timestamp":"2026-01-01T00:00:00Z","savedEntries":[]}"#;
        repo.import_all(empty).unwrap();
        assert_eq!(repo.count().unwrap(), 0);

        repo.restore_from_backup().unwrap();
        assert_eq!(repo.list().unwrap(), before);
    }

    #[test]
    fn unavailable_store_fails_mutations_and_degrades_reads() {
        let repo = unavailable_repo();
        assert!(!repo.is_available());

        assert!(matches!(
            repo.create(TaskData::default(), "x".into()),
            Err(InboxError::StoreUnavailable)
        ));
        assert!(matches!(repo.delete("x"), Err(InboxError::StoreUnavailable)));
        assert!(matches!(repo.clear(), Err(InboxError::StoreUnavailable)));
        assert!(matches!(
            repo.restore_from_backup(),
            Err(InboxError::StoreUnavailable)
        ));
        assert!(matches!(
            repo.import_all("{}"),
            Err(InboxError::StoreUnavailable)
        ));

        assert!(repo.list().unwrap().is_empty());
        assert_eq!(repo.count().unwrap(), 0);
        assert!(repo.export_all().is_ok());
        assert_eq!(repo.backup_summary().unwrap(), None);
    }

    #[test]
    fn corrupt_collection_aborts_mutation() {
        let repo = repo();
        repo.store().medium().put_raw(SAVED_ENTRIES_KEY, "{broken");

        assert!(matches!(
            repo.create(TaskData::default(), "x".into()),
            Err(InboxError::CorruptData { .. })
        ));
        assert_eq!(
            repo.store()
                .medium()
                .get_item(SAVED_ENTRIES_KEY)
                .unwrap()
                .as_deref(),
            Some("{broken")
        );
    }

    #[test]
    fn failed_backup_aborts_mutation() {
        let repo = repo();
        add(&repo, "a");
        repo.store().medium().set_simulate_write_error(true);

        assert!(repo.clear().is_err());
        repo.store().medium().set_simulate_write_error(false);
        assert_eq!(repo.count().unwrap(), 1);
    }

    #[test]
    fn quota_error_surfaces_on_create() {
        let store = DurableStore::with_medium(MemMedium::with_quota(400));
        let repo = EntryRepository::open(store, DEFAULT_MAX_ENTRIES);

        let big = "x".repeat(500);
        let err = repo
            .create(TaskData::new(Description::new(big.clone()), ""), big)
            .unwrap_err();
        assert!(matches!(err, InboxError::Quota { .. }));
        assert_eq!(repo.count().unwrap(), 0);
    }

    #[test]
    fn info_reports_usage() {
        let repo = repo();
        add(&repo, "a");
        let info = repo.info();
        assert!(info.is_available);
        assert_eq!(info.entries_count, 1);
        assert!(info.bytes_used > 0);
    }
}
