//! # UI Fragments
//!
//! Fragments are the pieces a client composes its screen from. There are two kinds.
//!
//! **Form fragments** ([`FormFragment`]) own one part of the composer form. The controller
//! holds them as trait objects, so "can this fragment be cleared / rendered?" is answered
//! when the controller is built, not probed on every call. They keep no copy of their
//! field; the value lives in [`ComposerState`] and is written only through `set_field`.
//!
//! **Reactive fragments** ([`LivePreview`], [`EntryCounter`]) subscribe to the
//! [`EventBus`] and re-derive their view from each event's state copy. The preview also
//! has a periodic re-render ([`LivePreview::tick_if_due`]) as a safety net against a
//! missed notification; it is never the primary path.

use crate::error::Result;
use crate::events::{handler, Event, EventBus, EventName, Handler};
use crate::formatter::{render_with, units, Markup, Rendered, Unit};
use crate::model::TaskData;
use crate::state::ComposerState;
use serde_json::{json, Value};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::{Duration, Instant};

pub trait FormFragment {
    fn name(&self) -> &'static str;

    /// The fragment's current field value, read from the composer.
    fn value(&self, state: &ComposerState) -> Value;

    /// Resets the fragment's fields to empty, through `set_field`.
    fn clear_form(&self, state: &mut ComposerState) -> Result<()>;

    /// This fragment's share of the command text, or None when it contributes nothing.
    fn to_command_fragment(&self, state: &ComposerState) -> Option<String>;
}

fn plain_of(units: Vec<Unit>, keep: impl Fn(&Unit) -> bool) -> Option<String> {
    let lines: Vec<String> = units
        .into_iter()
        .filter(|u| keep(u))
        .map(|u| u.plain().to_string())
        .collect();
    (!lines.is_empty()).then(|| lines.join("\n"))
}

#[derive(Debug, Default, Clone, Copy)]
pub struct DescriptionPanel;

impl DescriptionPanel {
    pub fn input(&self, state: &mut ComposerState, text: &str) -> Result<()> {
        state.set_field("currentTask.description.text", text.trim())?;
        Ok(())
    }

    pub fn set_milestone(&self, state: &mut ComposerState, on: bool) -> Result<()> {
        state.set_field("currentTask.description.isMilestone", on)?;
        Ok(())
    }

    pub fn toggle_milestone(&self, state: &mut ComposerState) -> Result<bool> {
        let on = !state.current_task().description.is_milestone;
        self.set_milestone(state, on)?;
        Ok(on)
    }
}

impl FormFragment for DescriptionPanel {
    fn name(&self) -> &'static str {
        "description"
    }

    fn value(&self, state: &ComposerState) -> Value {
        state
            .get_field("currentTask.description")
            .unwrap_or(Value::Null)
    }

    fn clear_form(&self, state: &mut ComposerState) -> Result<()> {
        state.set_field(
            "currentTask.description",
            json!({ "text": "", "isMilestone": false }),
        )?;
        Ok(())
    }

    fn to_command_fragment(&self, state: &ComposerState) -> Option<String> {
        let only_description = TaskData {
            annotate: String::new(),
            ..state.current_task().clone()
        };
        plain_of(units(&only_description), |u| {
            matches!(u, Unit::Description(_))
        })
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct AnnotatePanel;

impl AnnotatePanel {
    pub fn input(&self, state: &mut ComposerState, text: &str) -> Result<()> {
        state.set_field("currentTask.annotate", text)?;
        Ok(())
    }

    /// Appends one line to the annotate text.
    pub fn push_line(&self, state: &mut ComposerState, line: &str) -> Result<()> {
        let current = &state.current_task().annotate;
        let next = if current.is_empty() {
            line.to_string()
        } else {
            format!("{}\n{}", current, line)
        };
        self.input(state, &next)
    }
}

impl FormFragment for AnnotatePanel {
    fn name(&self) -> &'static str {
        "annotate"
    }

    fn value(&self, state: &ComposerState) -> Value {
        state
            .get_field("currentTask.annotate")
            .unwrap_or(Value::Null)
    }

    fn clear_form(&self, state: &mut ComposerState) -> Result<()> {
        state.set_field("currentTask.annotate", "")?;
        Ok(())
    }

    fn to_command_fragment(&self, state: &ComposerState) -> Option<String> {
        let only_annotate =
            TaskData::new(Default::default(), state.current_task().annotate.clone());
        plain_of(units(&only_annotate), |u| matches!(u, Unit::Annotate(_)))
    }
}

/// Live command preview, re-rendered on every `stateChange`.
pub struct LivePreview {
    rendered: Rc<RefCell<Rendered>>,
    renders: Rc<Cell<u64>>,
    markup: Rc<dyn Markup>,
    handler: Handler,
    interval: Duration,
    last_tick: Cell<Instant>,
}

impl LivePreview {
    pub fn attach(
        bus: &EventBus,
        markup: Rc<dyn Markup>,
        initial: &TaskData,
        interval: Duration,
    ) -> Self {
        let rendered = Rc::new(RefCell::new(render_with(initial, markup.as_ref())));
        let renders = Rc::new(Cell::new(1));

        let on_change = {
            let rendered = rendered.clone();
            let renders = renders.clone();
            let markup = markup.clone();
            handler(move |event| {
                if let Event::StateChange(change) = event {
                    *rendered.borrow_mut() =
                        render_with(&change.state.current_task, markup.as_ref());
                    renders.set(renders.get() + 1);
                }
                Ok(())
            })
        };
        bus.subscribe(EventName::StateChange, on_change.clone());

        Self {
            rendered,
            renders,
            markup,
            handler: on_change,
            interval,
            last_tick: Cell::new(Instant::now()),
        }
    }

    pub fn current(&self) -> Rendered {
        self.rendered.borrow().clone()
    }

    /// How many times the preview has been rendered, including the initial render.
    pub fn render_count(&self) -> u64 {
        self.renders.get()
    }

    /// Re-renders from `state` when the tick interval has elapsed since the last tick.
    pub fn tick_if_due(&self, now: Instant, state: &ComposerState) -> bool {
        if now.saturating_duration_since(self.last_tick.get()) < self.interval {
            return false;
        }
        self.last_tick.set(now);
        *self.rendered.borrow_mut() = render_with(state.current_task(), self.markup.as_ref());
        self.renders.set(self.renders.get() + 1);
        true
    }

    pub fn detach(&self, bus: &EventBus) {
        bus.unsubscribe(EventName::StateChange, &self.handler);
    }
}

/// Mirrors `app.savedEntriesCount` for status displays.
pub struct EntryCounter {
    count: Rc<Cell<usize>>,
    handler: Handler,
}

impl EntryCounter {
    pub fn attach(bus: &EventBus, initial: usize) -> Self {
        let count = Rc::new(Cell::new(initial));
        let sink = count.clone();
        let on_event = handler(move |event| {
            let state = match event {
                Event::StateChange(change) => &change.state,
                Event::AppStarted(started) => &started.state,
            };
            sink.set(state.app.saved_entries_count);
            Ok(())
        });
        bus.subscribe(EventName::StateChange, on_event.clone());
        bus.subscribe(EventName::AppStarted, on_event.clone());
        Self {
            count,
            handler: on_event,
        }
    }

    pub fn count(&self) -> usize {
        self.count.get()
    }

    pub fn detach(&self, bus: &EventBus) {
        bus.unsubscribe(EventName::StateChange, &self.handler);
        bus.unsubscribe(EventName::AppStarted, &self.handler);
    }
}
