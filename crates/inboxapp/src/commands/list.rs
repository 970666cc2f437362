use crate::commands::CmdResult;
use crate::error::Result;
use crate::model::sort_newest_first;
use crate::repository::EntryRepository;
use crate::store::StorageMedium;

/// Lists saved entries, newest first.
pub fn run<M: StorageMedium>(repo: &EntryRepository<M>) -> Result<CmdResult> {
    let mut entries = repo.list()?;
    sort_newest_first(&mut entries);
    Ok(CmdResult::default().with_listed_entries(entries))
}
