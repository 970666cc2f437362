use crate::error::Result;
use crate::repository::EntryRepository;
use crate::state::ComposerState;
use crate::store::StorageMedium;

/// Pushes the repository's current count into `app.savedEntriesCount`.
pub fn sync_count<M: StorageMedium>(
    repo: &EntryRepository<M>,
    composer: &mut ComposerState,
) -> Result<usize> {
    let count = repo.count()?;
    composer.set_field("app.savedEntriesCount", count as u64)?;
    Ok(count)
}

/// "1 entry", "3 entries".
pub fn entries_label(count: usize) -> String {
    if count == 1 {
        "1 entry".to_string()
    } else {
        format!("{} entries", count)
    }
}
