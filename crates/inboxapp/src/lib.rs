//! # Inbox Architecture
//!
//! Inbox is a **UI-agnostic task composer library**. A user fills in a short form (a
//! description and free-form annotation lines), watches a live preview of the resulting
//! command text, and saves it into a local inbox for later export. The terminal client in
//! `crates/inbox` is one client of this library; nothing here knows about terminals.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Client (crates/inbox)                                      │
//! │  - Parses arguments, renders output, owns stdout/stderr     │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Context object: repository, composer state, fragments    │
//! │  - Turns form-level failures into notifications             │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌──────────────────────────────┐  ┌──────────────────────────┐
//! │  Command Layer (commands/)   │  │  Composer State + Bus    │
//! │  - save, delete, clear, ...  │  │  (state.rs, events.rs)   │
//! └──────────────────────────────┘  └──────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Entry Repository (repository.rs)                           │
//! │  - Backup before every mutation, capacity, import/export    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Durable Store (store/)                                     │
//! │  - StorageMedium trait: FsMedium (production), MemMedium    │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Data Flow
//!
//! A keystroke in a client becomes a `set_field` call on the composer state. The state
//! publishes a `stateChange` event carrying a copy of itself, and the subscribed fragments
//! (the live preview, the entry counter) re-derive their view from that copy before
//! `set_field` returns. Saving asks the [`formatter`] for the command text, stores it through
//! the repository, clears the form and refreshes `app.savedEntriesCount`.
//!
//! ## Key Principle: No I/O Assumptions in Core
//!
//! From `api.rs` inward, code never writes to stdout/stderr and never exits the process.
//! Diagnostics go through `tracing`; the client decides where they end up.
//!
//! ## Module Overview
//!
//! - [`api`]: The facade every client talks to
//! - [`commands`]: Business logic for each operation
//! - [`repository`]: The saved-entry collection and its backup slot
//! - [`store`]: Key/value persistence over a storage medium
//! - [`state`]: Composer state and path-addressed updates
//! - [`events`]: Synchronous publish/subscribe bus
//! - [`formatter`]: Pure rendering of fields into command text
//! - [`fragments`]: Form panels, live preview, entry counter
//! - [`model`]: Entry, snapshot and backup records
//! - [`config`]: Configuration management
//! - [`init`]: Data directory resolution and startup
//! - [`error`]: Error types

pub mod api;
pub mod commands;
pub mod config;
pub mod error;
pub mod events;
pub mod formatter;
pub mod fragments;
pub mod init;
pub mod model;
pub mod repository;
pub mod state;
pub mod store;

#[cfg(any(test, feature = "test_utils"))]
pub mod test_utils;
