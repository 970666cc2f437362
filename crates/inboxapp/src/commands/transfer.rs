use crate::commands::helpers::{entries_label, sync_count};
use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::repository::EntryRepository;
use crate::state::ComposerState;
use crate::store::StorageMedium;

/// The whole collection as a versioned JSON snapshot.
pub fn export<M: StorageMedium>(repo: &EntryRepository<M>) -> Result<String> {
    repo.export_all()
}

/// Replaces the collection with a snapshot. The previous collection goes to the backup slot.
pub fn import<M: StorageMedium>(
    repo: &EntryRepository<M>,
    composer: &mut ComposerState,
    serialized: &str,
) -> Result<CmdResult> {
    let imported = repo.import_all(serialized)?;
    sync_count(repo, composer)?;

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Imported {}",
        entries_label(imported)
    )));
    Ok(result)
}
