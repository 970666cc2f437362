use crate::commands::helpers::sync_count;
use crate::commands::{CmdMessage, CmdResult};
use crate::error::{InboxError, Result};
use crate::formatter::render;
use crate::fragments::FormFragment;
use crate::repository::EntryRepository;
use crate::state::ComposerState;
use crate::store::StorageMedium;

pub const EMPTY_FORM: &str = "Enter a description or at least one annotation before saving";

/// Saves the form as a new entry, then resets every form fragment.
pub fn run<M: StorageMedium>(
    repo: &EntryRepository<M>,
    composer: &mut ComposerState,
    fragments: &[Box<dyn FormFragment>],
) -> Result<CmdResult> {
    let task = composer.current_task().clone();
    let rendered = render(&task);
    if !rendered.is_valid {
        return Err(InboxError::Validation(EMPTY_FORM.to_string()));
    }

    let id = repo.create(task, rendered.plain.clone())?;

    for fragment in fragments {
        fragment.clear_form(composer)?;
    }
    let count = sync_count(repo, composer)?;

    let headline = rendered.plain.lines().next().unwrap_or_default();
    let mut result = CmdResult::default().with_affected_ids(vec![id.clone()]);
    result.add_message(CmdMessage::success(format!(
        "Entry saved ({}): {}",
        id, headline
    )));
    result.add_message(CmdMessage::info(format!("{} saved in total", count)));
    Ok(result)
}
