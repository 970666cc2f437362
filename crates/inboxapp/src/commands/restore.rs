use crate::commands::helpers::{entries_label, sync_count};
use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::repository::EntryRepository;
use crate::state::ComposerState;
use crate::store::StorageMedium;

/// Replaces the live collection with the backup slot.
pub fn run<M: StorageMedium>(
    repo: &EntryRepository<M>,
    composer: &mut ComposerState,
) -> Result<CmdResult> {
    repo.restore_from_backup()?;
    let count = sync_count(repo, composer)?;

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Restored {} from backup",
        entries_label(count)
    )));
    Ok(result)
}

/// Describes the backup slot without touching it.
pub fn summary<M: StorageMedium>(repo: &EntryRepository<M>) -> Result<CmdResult> {
    let mut result = CmdResult::default();
    match repo.backup_summary()? {
        Some(backup) => result.add_message(CmdMessage::info(format!(
            "Backup from {} holds {}",
            backup.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
            entries_label(backup.entries)
        ))),
        None => result.add_message(CmdMessage::info("No backup yet")),
    }
    Ok(result)
}
