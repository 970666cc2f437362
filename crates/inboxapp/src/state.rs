//! # Composer State
//!
//! Ephemeral, in-memory state of the form being edited plus application meta-state. It is
//! created with defaults at startup, changed only through [`ComposerState::set_field`], and
//! never persisted directly; only the entries derived from it are saved.
//!
//! ## Paths
//!
//! Fields are addressed by dot-delimited paths. The reserved roots have a fixed whitelist:
//!
//! | Path | Type |
//! |------|------|
//! | `currentTask.description` | `{text, isMilestone}` object, or a string for the text alone |
//! | `currentTask.description.text` | string |
//! | `currentTask.description.isMilestone` | bool |
//! | `currentTask.annotate` | string |
//! | `app.activeCard` | string or null |
//! | `app.isOnline` | bool |
//! | `app.savedEntriesCount` | unsigned integer |
//! | `ui.theme` | string |
//! | `ui.language` | string |
//!
//! A path under `currentTask`, `app` or `ui` that is not listed is rejected, so a typo cannot
//! silently grow a new branch. Any other root is a free-form extension namespace where
//! intermediate objects are created on demand (`x.y` is legal).
//!
//! Every successful `set_field` publishes exactly one `stateChange` event carrying the path,
//! the value and a deep copy of the whole state. Reads never fail: an unknown path is `None`.

use crate::error::{InboxError, Result};
use crate::events::{Event, EventBus, PublishReport, StateChange};
use crate::model::{Description, TaskData};
use serde::Serialize;
use serde_json::{Map, Value};
use std::rc::Rc;
use std::str::FromStr;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppMeta {
    pub active_card: Option<String>,
    pub is_online: bool,
    pub saved_entries_count: usize,
}

impl Default for AppMeta {
    fn default() -> Self {
        Self {
            active_card: None,
            is_online: true,
            saved_entries_count: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UiPrefs {
    pub theme: String,
    pub language: String,
}

impl Default for UiPrefs {
    fn default() -> Self {
        Self {
            theme: "light".to_string(),
            language: "en".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    pub current_task: TaskData,
    pub app: AppMeta,
    pub ui: UiPrefs,
    #[serde(flatten)]
    pub extensions: Map<String, Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Description,
    DescriptionText,
    DescriptionMilestone,
    Annotate,
    ActiveCard,
    IsOnline,
    SavedEntriesCount,
    Theme,
    Language,
}

const FIELDS: &[(&str, Field)] = &[
    ("currentTask.description", Field::Description),
    ("currentTask.description.text", Field::DescriptionText),
    ("currentTask.description.isMilestone", Field::DescriptionMilestone),
    ("currentTask.annotate", Field::Annotate),
    ("app.activeCard", Field::ActiveCard),
    ("app.isOnline", Field::IsOnline),
    ("app.savedEntriesCount", Field::SavedEntriesCount),
    ("ui.theme", Field::Theme),
    ("ui.language", Field::Language),
];

const RESERVED_ROOTS: &[&str] = &["currentTask", "app", "ui"];

/// A validated state path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatePath {
    Field(Field),
    Extension(Vec<String>),
}

impl FromStr for StatePath {
    type Err = InboxError;

    fn from_str(path: &str) -> Result<Self> {
        let segments: Vec<&str> = path.split('.').collect();
        let well_formed = segments.iter().all(|s| {
            !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        });
        if !well_formed {
            return Err(InboxError::UnknownStatePath(path.to_string()));
        }

        if let Some((_, field)) = FIELDS.iter().find(|(p, _)| *p == path) {
            return Ok(StatePath::Field(*field));
        }
        if RESERVED_ROOTS.contains(&segments[0]) {
            return Err(InboxError::UnknownStatePath(path.to_string()));
        }
        Ok(StatePath::Extension(
            segments.into_iter().map(String::from).collect(),
        ))
    }
}

pub struct ComposerState {
    bus: Rc<EventBus>,
    state: AppState,
}

impl ComposerState {
    pub fn new(bus: Rc<EventBus>) -> Self {
        Self::with_state(bus, AppState::default())
    }

    pub fn with_state(bus: Rc<EventBus>, state: AppState) -> Self {
        Self { bus, state }
    }

    pub fn bus(&self) -> &Rc<EventBus> {
        &self.bus
    }

    /// Sets one field and announces it. Subscribers have all run when this returns.
    pub fn set_field(&mut self, path: &str, value: impl Into<Value>) -> Result<PublishReport> {
        let value = value.into();
        let parsed: StatePath = path.parse()?;
        self.apply(path, &parsed, value.clone())?;
        debug!(path, "State changed");

        let event = Event::StateChange(StateChange {
            path: path.to_string(),
            value,
            state: self.state.clone(),
        });
        Ok(self.bus.publish(&event))
    }

    fn apply(&mut self, path: &str, parsed: &StatePath, value: Value) -> Result<()> {
        let invalid = |expected: &'static str| InboxError::InvalidStateValue {
            path: path.to_string(),
            expected,
        };
        let task = &mut self.state.current_task;

        match parsed {
            StatePath::Field(Field::Description) => match value {
                Value::String(text) => task.description.text = text,
                Value::Object(_) => {
                    task.description = serde_json::from_value::<Description>(value)
                        .map_err(|_| invalid("{text, isMilestone} object"))?;
                }
                _ => return Err(invalid("{text, isMilestone} object or string")),
            },
            StatePath::Field(Field::DescriptionText) => {
                task.description.text = as_string(value).ok_or_else(|| invalid("string"))?;
            }
            StatePath::Field(Field::DescriptionMilestone) => {
                task.description.is_milestone = value.as_bool().ok_or_else(|| invalid("bool"))?;
            }
            StatePath::Field(Field::Annotate) => {
                task.annotate = as_string(value).ok_or_else(|| invalid("string"))?;
            }
            StatePath::Field(Field::ActiveCard) => {
                self.state.app.active_card = match value {
                    Value::Null => None,
                    Value::String(card) => Some(card),
                    _ => return Err(invalid("string or null")),
                };
            }
            StatePath::Field(Field::IsOnline) => {
                self.state.app.is_online = value.as_bool().ok_or_else(|| invalid("bool"))?;
            }
            StatePath::Field(Field::SavedEntriesCount) => {
                let count = value
                    .as_u64()
                    .ok_or_else(|| invalid("unsigned integer"))?;
                self.state.app.saved_entries_count =
                    usize::try_from(count).map_err(|_| invalid("unsigned integer"))?;
            }
            StatePath::Field(Field::Theme) => {
                self.state.ui.theme = as_string(value).ok_or_else(|| invalid("string"))?;
            }
            StatePath::Field(Field::Language) => {
                self.state.ui.language = as_string(value).ok_or_else(|| invalid("string"))?;
            }
            StatePath::Extension(segments) => {
                set_nested(&mut self.state.extensions, segments, value)
                    .map_err(|_| invalid("a path that does not cross a non-object value"))?;
            }
        }
        Ok(())
    }

    /// Reads any path, including whole sections ("currentTask") and extension branches.
    pub fn get_field(&self, path: &str) -> Option<Value> {
        let mut current = serde_json::to_value(&self.state).ok()?;
        for segment in path.split('.') {
            current = match current {
                Value::Object(mut map) => map.remove(segment)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Deep copy of the whole state.
    pub fn snapshot(&self) -> AppState {
        self.state.clone()
    }

    pub fn current_task(&self) -> &TaskData {
        &self.state.current_task
    }

    pub fn app(&self) -> &AppMeta {
        &self.state.app
    }
}

fn as_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        _ => None,
    }
}

fn set_nested(
    root: &mut Map<String, Value>,
    segments: &[String],
    value: Value,
) -> std::result::Result<(), ()> {
    let Some((leaf, parents)) = segments.split_last() else {
        return Err(());
    };
    let mut current = root;
    for segment in parents {
        let next = current
            .entry(segment.clone())
            .or_insert_with(|| Value::Object(Map::new()));
        current = match next {
            Value::Object(map) => map,
            _ => return Err(()),
        };
    }
    current.insert(leaf.clone(), value);
    Ok(())
}
