use crate::commands::helpers::{entries_label, sync_count};
use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::repository::EntryRepository;
use crate::state::ComposerState;
use crate::store::StorageMedium;

pub fn run<M: StorageMedium>(
    repo: &EntryRepository<M>,
    composer: &mut ComposerState,
) -> Result<CmdResult> {
    let removed: Vec<String> = repo.list()?.into_iter().map(|e| e.id).collect();
    repo.clear()?;
    sync_count(repo, composer)?;

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Cleared {}. Run `restore` to undo.",
        entries_label(removed.len())
    )));
    Ok(result.with_affected_ids(removed))
}
