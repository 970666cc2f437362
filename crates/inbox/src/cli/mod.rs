//! # CLI Behavior
//!
//! This is **one possible UI client** for the inbox, not the application itself.
//! The CLI is the only place that knows about terminal I/O, exit codes and output formatting.
//!
//! ## Naked Execution (`inbox`)
//!
//! Running `inbox` with no arguments defaults to `inbox list`.
//!
//! ## One-Shot vs. Interactive
//!
//! - `inbox add "Buy milk" -n "2 liters"` fills the form from arguments and saves it.
//! - `inbox preview ...` renders the same form without saving.
//! - `inbox compose` opens a line-oriented composer with a live preview.
//!
//! ## Exit Codes
//!
//! A failed operation exits with 1. Form-level failures (an empty form, a full inbox) are
//! printed as error messages; everything else goes through `main`'s `Error:` line.
//!
//! ## Module Structure
//!
//! - `commands`: Per-command handlers that call the API and print output
//! - `compose`: The interactive composer loop
//! - `render`: Output formatting (entry list, messages, preview)
//! - `setup`: Argument parsing via clap
//! - `styles`: Terminal styling constants

mod commands;
mod compose;
mod render;
pub mod setup;
mod styles;

pub use commands::run;
