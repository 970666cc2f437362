use crate::commands::helpers::sync_count;
use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::repository::EntryRepository;
use crate::state::ComposerState;
use crate::store::StorageMedium;

pub fn run<M: StorageMedium>(
    repo: &EntryRepository<M>,
    composer: &mut ComposerState,
    id: &str,
) -> Result<CmdResult> {
    let removed = repo.delete(id)?;
    sync_count(repo, composer)?;

    let mut result = CmdResult::default();
    if removed {
        result.add_message(CmdMessage::success(format!("Entry deleted: {}", id)));
        result.affected_ids.push(id.to_string());
    } else {
        result.add_message(CmdMessage::warning(format!("No entry with id {}", id)));
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::MessageLevel;
    use crate::events::EventBus;
    use crate::model::{Description, TaskData};
    use crate::store::InMemoryStore;
    use std::rc::Rc;

    #[test]
    fn deletes_and_refreshes_count() {
        let repo = EntryRepository::open(InMemoryStore::new(), 10);
        let id = repo
            .create(TaskData::new(Description::new("a"), ""), "a".into())
            .unwrap();
        repo.create(TaskData::new(Description::new("b"), ""), "b".into())
            .unwrap();
        let mut composer = ComposerState::new(Rc::new(EventBus::new()));

        let result = run(&repo, &mut composer, &id).unwrap();
        assert_eq!(result.affected_ids, vec![id]);
        assert_eq!(composer.app().saved_entries_count, 1);
    }

    #[test]
    fn unknown_id_warns() {
        let repo = EntryRepository::open(InMemoryStore::new(), 10);
        let mut composer = ComposerState::new(Rc::new(EventBus::new()));

        let result = run(&repo, &mut composer, "task_1_missing").unwrap();
        assert!(result.affected_ids.is_empty());
        assert_eq!(result.messages[0].level, MessageLevel::Warning);
        assert!(!result.has_errors());
    }
}
