//! # Event Bus
//!
//! Synchronous publish/subscribe registry that keeps independent UI fragments in step
//! without a central re-render pass. A fragment never reads another fragment's cached data;
//! it reacts to an event and re-derives its own view.
//!
//! ## Event Names
//!
//! | Name | Payload | Fired by |
//! |------|---------|----------|
//! | `stateChange` | path, value, full state | every [`crate::state::ComposerState::set_field`] |
//! | `appStarted` | version, full state | [`crate::api::InboxApi::start`], once |
//!
//! ## Delivery Rules
//!
//! - Handlers run synchronously, in registration order, before `publish` returns.
//! - Registering the same handler twice makes it run twice. `unsubscribe` removes every
//!   registration of that handler (compared by `Rc` identity).
//! - Each invocation is isolated: a handler that returns an error or panics is logged and
//!   counted, and the remaining handlers still run.
//! - The handler list is copied before dispatch, so (un)subscribing from inside a handler
//!   takes effect on the next publish.

use crate::state::AppState;
use serde_json::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;
use tracing::{error, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventName {
    StateChange,
    AppStarted,
}

impl EventName {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventName::StateChange => "stateChange",
            EventName::AppStarted => "appStarted",
        }
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StateChange {
    pub path: String,
    pub value: Value,
    /// Deep copy of the state right after the change.
    pub state: AppState,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppStarted {
    pub version: String,
    pub state: AppState,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    StateChange(StateChange),
    AppStarted(AppStarted),
}

impl Event {
    pub fn name(&self) -> EventName {
        match self {
            Event::StateChange(_) => EventName::StateChange,
            Event::AppStarted(_) => EventName::AppStarted,
        }
    }
}

pub type HandlerError = Box<dyn std::error::Error>;
pub type HandlerResult = std::result::Result<(), HandlerError>;
pub type Handler = Rc<dyn Fn(&Event) -> HandlerResult>;

/// Wraps a closure as a [`Handler`]. Keep the returned `Rc` to unsubscribe later.
pub fn handler<F>(f: F) -> Handler
where
    F: Fn(&Event) -> HandlerResult + 'static,
{
    Rc::new(f)
}

/// Outcome of one `publish` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublishReport {
    pub delivered: usize,
    pub failed: usize,
}

#[derive(Default)]
pub struct EventBus {
    listeners: RefCell<HashMap<EventName, Vec<Handler>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, name: EventName, handler: Handler) {
        self.listeners
            .borrow_mut()
            .entry(name)
            .or_default()
            .push(handler);
    }

    /// Removes every registration of `handler` under `name`. Returns how many were removed.
    pub fn unsubscribe(&self, name: EventName, handler: &Handler) -> usize {
        let mut listeners = self.listeners.borrow_mut();
        let Some(list) = listeners.get_mut(&name) else {
            return 0;
        };
        let before = list.len();
        list.retain(|h| !Rc::ptr_eq(h, handler));
        before - list.len()
    }

    pub fn listener_count(&self, name: EventName) -> usize {
        self.listeners.borrow().get(&name).map_or(0, Vec::len)
    }

    pub fn publish(&self, event: &Event) -> PublishReport {
        let name = event.name();
        let handlers: Vec<Handler> = self
            .listeners
            .borrow()
            .get(&name)
            .cloned()
            .unwrap_or_default();

        let mut report = PublishReport::default();
        for (position, handler) in handlers.iter().enumerate() {
            match panic::catch_unwind(AssertUnwindSafe(|| handler(event))) {
                Ok(Ok(())) => report.delivered += 1,
                Ok(Err(e)) => {
                    error!(event = %name, position, error = %e, "Event handler failed");
                    report.failed += 1;
                }
                Err(payload) => {
                    error!(
                        event = %name,
                        position,
                        panic = panic_message(payload.as_ref()),
                        "Event handler panicked"
                    );
                    report.failed += 1;
                }
            }
        }
        trace!(event = %name, delivered = report.delivered, failed = report.failed, "Published");
        report
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic"
    }
}
