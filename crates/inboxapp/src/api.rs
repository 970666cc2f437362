//! # API Facade
//!
//! [`InboxApi`] is the single entry point for every inbox operation, regardless of the UI.
//! It owns the context object that wires the application together: the repository, the
//! composer state with its event bus, the form fragments and the saved-entry counter.
//!
//! ## Role and Responsibilities
//!
//! - **Dispatches** to the command layer
//! - **Refreshes** `app.savedEntriesCount` after every change to the collection
//! - **Converts failures into notifications** for the form-facing operations
//!
//! ## Notifications vs. Results
//!
//! `save`, `delete` and `clear` are what a user triggers from the form. Their failures are
//! logged and turned into an error [`CmdMessage`] inside the returned [`CmdResult`], so a
//! client only has to render messages. Use [`CmdResult::has_errors`] to pick an exit code.
//!
//! `restore_backup`, `import_snapshot` and the exports return `Result`; the caller decides.
//!
//! ## Generic Over StorageMedium
//!
//! - Production: `InboxApi<FsMedium>`
//! - Testing: `InboxApi<MemMedium>`

use crate::commands::{self, export::ExportedText, CmdMessage, CmdResult};
use crate::config::InboxConfig;
use crate::error::{InboxError, Result};
use crate::events::{AppStarted, Event, EventBus, PublishReport};
use crate::formatter::{render_with, HtmlMarkup, Markup, Rendered};
use crate::fragments::{AnnotatePanel, DescriptionPanel, EntryCounter, FormFragment, LivePreview};
use crate::repository::EntryRepository;
use crate::state::{AppState, ComposerState};
use crate::store::{DurableStore, StorageInfo, StorageMedium};
use chrono::{Local, NaiveDate};
use serde_json::Value;
use std::rc::Rc;
use tracing::{error, info, warn};

pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub struct InboxApi<M: StorageMedium> {
    repo: EntryRepository<M>,
    composer: ComposerState,
    fragments: Vec<Box<dyn FormFragment>>,
    counter: EntryCounter,
    config: InboxConfig,
    started: bool,
}

impl<M: StorageMedium> InboxApi<M> {
    pub fn new(store: DurableStore<M>, config: InboxConfig) -> Self {
        let repo = EntryRepository::open(store, config.max_entries);
        let bus = Rc::new(EventBus::new());

        let initial_count = repo.count().unwrap_or_else(|e| {
            warn!(error = %e, "Could not count saved entries");
            0
        });
        let mut state = AppState::default();
        state.app.saved_entries_count = initial_count;

        let counter = EntryCounter::attach(&bus, initial_count);
        Self {
            repo,
            composer: ComposerState::with_state(bus, state),
            fragments: vec![Box::new(DescriptionPanel), Box::new(AnnotatePanel)],
            counter,
            config,
            started: false,
        }
    }

    /// Announces `appStarted`. Only the first call does anything.
    pub fn start(&mut self) -> bool {
        if self.started {
            return false;
        }
        self.started = true;

        if let Err(e) = commands::helpers::sync_count(&self.repo, &mut self.composer) {
            warn!(error = %e, "Could not refresh saved entry count");
        }
        let report = self.composer.bus().publish(&Event::AppStarted(AppStarted {
            version: APP_VERSION.to_string(),
            state: self.composer.snapshot(),
        }));
        info!(
            version = APP_VERSION,
            available = self.repo.is_available(),
            listeners = report.delivered,
            "Inbox started"
        );
        true
    }

    pub fn bus(&self) -> &Rc<EventBus> {
        self.composer.bus()
    }

    pub fn config(&self) -> &InboxConfig {
        &self.config
    }

    pub fn composer(&self) -> &ComposerState {
        &self.composer
    }

    /// Mutable access for form fragments, which write through `set_field`.
    pub fn composer_mut(&mut self) -> &mut ComposerState {
        &mut self.composer
    }

    pub fn fragments(&self) -> &[Box<dyn FormFragment>] {
        &self.fragments
    }

    /// Empties every form fragment without touching saved entries.
    pub fn clear_form(&mut self) -> Result<()> {
        for fragment in &self.fragments {
            fragment.clear_form(&mut self.composer)?;
        }
        Ok(())
    }

    pub fn set_field(&mut self, path: &str, value: impl Into<Value>) -> Result<PublishReport> {
        self.composer.set_field(path, value)
    }

    pub fn get_field(&self, path: &str) -> Option<Value> {
        self.composer.get_field(path)
    }

    pub fn state(&self) -> AppState {
        self.composer.snapshot()
    }

    pub fn set_online(&mut self, online: bool) -> Result<PublishReport> {
        self.composer.set_field("app.isOnline", online)
    }

    pub fn preview(&self) -> Rendered {
        self.preview_with(&HtmlMarkup)
    }

    pub fn preview_with<K: Markup + ?Sized>(&self, markup: &K) -> Rendered {
        render_with(self.composer.current_task(), markup)
    }

    /// A preview fragment bound to this app's bus, ticking at the configured interval.
    pub fn live_preview(&self, markup: Rc<dyn Markup>) -> LivePreview {
        LivePreview::attach(
            self.composer.bus(),
            markup,
            self.composer.current_task(),
            self.config.preview_interval(),
        )
    }

    pub fn saved_count(&self) -> usize {
        self.counter.count()
    }

    pub fn save(&mut self) -> CmdResult {
        let outcome = commands::save::run(&self.repo, &mut self.composer, &self.fragments);
        notify("save", outcome)
    }

    pub fn delete(&mut self, id: &str) -> CmdResult {
        let outcome = commands::delete::run(&self.repo, &mut self.composer, id);
        notify("delete", outcome)
    }

    pub fn clear(&mut self) -> CmdResult {
        let outcome = commands::clear::run(&self.repo, &mut self.composer);
        notify("clear", outcome)
    }

    pub fn restore_backup(&mut self) -> Result<CmdResult> {
        commands::restore::run(&self.repo, &mut self.composer)
    }

    pub fn backup_info(&self) -> Result<CmdResult> {
        commands::restore::summary(&self.repo)
    }

    pub fn import_snapshot(&mut self, serialized: &str) -> Result<CmdResult> {
        commands::transfer::import(&self.repo, &mut self.composer, serialized)
    }

    pub fn export_snapshot(&self) -> Result<String> {
        commands::transfer::export(&self.repo)
    }

    /// Plain-text export named after today's local date.
    pub fn export_text(&self) -> Result<ExportedText> {
        self.export_text_on(Local::now().date_naive())
    }

    pub fn export_text_on(&self, date: NaiveDate) -> Result<ExportedText> {
        commands::export::run(&self.repo, &self.config.export_prefix, date)
    }

    /// Saved entries, newest first.
    pub fn entries(&self) -> Result<CmdResult> {
        commands::list::run(&self.repo)
    }

    pub fn storage_info(&self) -> StorageInfo {
        self.repo.info()
    }
}

fn notify(operation: &'static str, outcome: Result<CmdResult>) -> CmdResult {
    match outcome {
        Ok(result) => result,
        Err(e) => {
            error!(operation, error = %e, "Operation failed");
            let mut result = CmdResult::default();
            result.add_message(CmdMessage::error(user_message(&e)));
            result
        }
    }
}

fn user_message(e: &InboxError) -> String {
    match e {
        InboxError::CapacityExceeded { max } => format!(
            "The inbox is full ({} entries). Delete or export some entries first.",
            max
        ),
        quota if quota.is_capacity() => {
            "Storage quota reached. Delete or export some entries first.".to_string()
        }
        InboxError::StoreUnavailable => {
            "Storage is unavailable; nothing can be saved right now.".to_string()
        }
        other => other.to_string(),
    }
}
