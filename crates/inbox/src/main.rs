//! # Inbox CLI
//!
//! The binary is intentionally thin: the CLI lives in `src/cli/`, while this file only
//! invokes `cli::run()` and handles process termination.
//!
//! ## Workspace Structure
//!
//! - `crates/inboxapp/`: Core library: store, repository, composer state, event bus,
//!   formatter and the `InboxApi` facade
//! - `crates/inbox/`: This terminal client, depends on `inboxapp`
//!
//! ## Layering
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (crates/inbox/src/cli/)                          │
//! │  - clap argument parsing (setup.rs)                         │
//! │  - Dispatch + logging setup (commands.rs)                   │
//! │  - Terminal rendering (render.rs, styles.rs)                │
//! │  - Interactive composer loop (compose.rs)                   │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (crates/inboxapp/src/api.rs)                     │
//! │  - Owns repository, composer state, bus and fragments       │
//! │  - Returns structured `CmdResult` values                    │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The CLI plays the part a browser page would: user input becomes `set_field` calls on
//! the composer, the live preview fragment reacts to the resulting `stateChange` events,
//! and the CLI prints whatever the API hands back.
//!
//! ## Testing Approach
//!
//! - **Library**: unit tests next to each module, against the in-memory medium.
//! - **CLI**: rendering is unit tested with canned entries and messages; `tests/` drives
//!   the built binary end to end with `INBOX_DATA` pointing at a temp dir.

mod cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
