//! Styles for the inbox CLI.
//!
//! Code refers to styles by what the text *is* (an id, a time, a separator), never by
//! color. The palette lives here only, registered once through `once_cell::sync::Lazy`.
//! `console` drops the escape codes on its own when stdout is not a terminal.

use console::Style;
use once_cell::sync::Lazy;

pub static ID: Lazy<Style> = Lazy::new(|| Style::new().yellow());
pub static TIME: Lazy<Style> = Lazy::new(|| Style::new().color256(247).italic());
pub static MILESTONE: Lazy<Style> = Lazy::new(|| Style::new().magenta().bold());
pub static SEPARATOR: Lazy<Style> = Lazy::new(|| Style::new().dim());
pub static ANNOTATE: Lazy<Style> = Lazy::new(|| Style::new().cyan());
pub static MISSING: Lazy<Style> = Lazy::new(|| Style::new().red().italic());
pub static HEADING: Lazy<Style> = Lazy::new(|| Style::new().bold());

pub static INFO: Lazy<Style> = Lazy::new(Style::new);
pub static SUCCESS: Lazy<Style> = Lazy::new(|| Style::new().green());
pub static WARNING: Lazy<Style> = Lazy::new(|| Style::new().yellow());
pub static ERROR: Lazy<Style> = Lazy::new(|| Style::new().red().bold());
