//! # Command Formatter
//!
//! Pure rendering of the composer fields into the inbox's textual command format.
//!
//! ## Layout
//!
//! ```text
//! MILESTONE: Write report     <-- description (prefix only when flagged)
//! +                           <-- separator, only when both blocks are present
//! first annotate line         <-- one unit per non-blank annotate line
//! second annotate line
//! ```
//!
//! With no content at all the output is the [`MISSING_FIELDS`] sentinel and
//! `is_valid` is false.
//!
//! ## Two Forms, One Source
//!
//! [`units`] breaks the fields into an ordered list of [`Unit`]s. The plain form joins the
//! units with `\n`; the display form passes the same units through a [`Markup`]. Since both
//! come from the same list they cannot disagree about what is in the command.

use crate::model::TaskData;
use serde::Serialize;

pub const SEPARATOR: &str = "+";
pub const MILESTONE_PREFIX: &str = "MILESTONE: ";
pub const MISSING_FIELDS: &str = "[At least one field is required: DESCRIPTION or ANNOTATE]";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unit {
    Description(String),
    Separator,
    Annotate(String),
    Missing,
}

impl Unit {
    pub fn plain(&self) -> &str {
        match self {
            Unit::Description(text) | Unit::Annotate(text) => text,
            Unit::Separator => SEPARATOR,
            Unit::Missing => MISSING_FIELDS,
        }
    }
}

/// Presentation hooks for the display form.
pub trait Markup {
    fn line_break(&self) -> &str;

    fn description(&self, text: &str) -> String {
        text.replace('\n', self.line_break())
    }

    fn separator(&self) -> String {
        SEPARATOR.to_string()
    }

    fn annotate(&self, line: &str) -> String {
        line.to_string()
    }

    fn missing(&self, text: &str) -> String;
}

/// Display form for HTML views.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlMarkup;

impl Markup for HtmlMarkup {
    fn line_break(&self) -> &str {
        "<br>"
    }

    fn description(&self, text: &str) -> String {
        escape_html(text).replace('\n', self.line_break())
    }

    fn annotate(&self, line: &str) -> String {
        format!("<span class=\"field-annotate\">{}</span>", escape_html(line))
    }

    fn missing(&self, text: &str) -> String {
        format!("<span class=\"missing-field\">{}</span>", escape_html(text))
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rendered {
    pub plain: String,
    pub display: String,
    pub is_valid: bool,
}

impl Rendered {
    /// The plain command, unless it is only the missing-field sentinel.
    pub fn copyable(&self) -> Option<&str> {
        self.is_valid.then_some(self.plain.as_str())
    }
}

pub fn units(task: &TaskData) -> Vec<Unit> {
    let mut out = Vec::new();

    let text = task.description.text.trim();
    if !text.is_empty() {
        let text = if task.description.is_milestone {
            format!("{}{}", MILESTONE_PREFIX, text)
        } else {
            text.to_string()
        };
        out.push(Unit::Description(text));
    }

    let mut annotations = task
        .annotate
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| Unit::Annotate(line.to_string()))
        .peekable();
    if annotations.peek().is_some() {
        if !out.is_empty() {
            out.push(Unit::Separator);
        }
        out.extend(annotations);
    }

    if out.is_empty() {
        out.push(Unit::Missing);
    }
    out
}

pub fn render(task: &TaskData) -> Rendered {
    render_with(task, &HtmlMarkup)
}

pub fn render_with<M: Markup + ?Sized>(task: &TaskData, markup: &M) -> Rendered {
    let units = units(task);
    let is_valid = !matches!(units.as_slice(), [Unit::Missing]);

    let plain = units.iter().map(Unit::plain).collect::<Vec<_>>().join("\n");
    let display = units
        .iter()
        .map(|unit| match unit {
            Unit::Description(text) => markup.description(text),
            Unit::Separator => markup.separator(),
            Unit::Annotate(line) => markup.annotate(line),
            Unit::Missing => markup.missing(MISSING_FIELDS),
        })
        .collect::<Vec<_>>()
        .join(markup.line_break());

    Rendered {
        plain,
        display,
        is_valid,
    }
}
