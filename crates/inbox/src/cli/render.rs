//! # Rendering
//!
//! Turns library results into terminal text. Layout (widths, truncation, alignment) is
//! computed here; colors come from `styles.rs`.
//!
//! Every `render_*` function has an internal variant taking `use_color: Option<bool>`:
//! `None` lets `console` decide from the terminal, `Some(false)` forces plain text so tests
//! can compare output exactly.

use super::styles;
use chrono::{DateTime, Utc};
use console::Style;
use inboxapp::commands::{CmdMessage, MessageLevel};
use inboxapp::formatter::{Markup, Rendered, MILESTONE_PREFIX, SEPARATOR};
use inboxapp::model::Entry;
use inboxapp::store::StorageInfo;
use serde::Serialize;
use std::path::Path;
use unicode_width::UnicodeWidthStr;

const LINE_WIDTH: usize = 100;
const TIME_WIDTH: usize = 16;

fn paint(style: &Style, text: &str, use_color: Option<bool>) -> String {
    let styled = style.apply_to(text);
    match use_color {
        Some(force) => styled.force_styling(force).to_string(),
        None => styled.to_string(),
    }
}

/// Display form of the composer for terminals.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalMarkup {
    pub use_color: Option<bool>,
}

impl Markup for TerminalMarkup {
    fn line_break(&self) -> &str {
        "\n"
    }

    fn description(&self, text: &str) -> String {
        match text.strip_prefix(MILESTONE_PREFIX) {
            Some(rest) => format!(
                "{}{}",
                paint(&styles::MILESTONE, MILESTONE_PREFIX, self.use_color),
                paint(&styles::HEADING, rest, self.use_color)
            ),
            None => paint(&styles::HEADING, text, self.use_color),
        }
    }

    fn separator(&self) -> String {
        paint(&styles::SEPARATOR, SEPARATOR, self.use_color)
    }

    fn annotate(&self, line: &str) -> String {
        paint(&styles::ANNOTATE, line, self.use_color)
    }

    fn missing(&self, text: &str) -> String {
        paint(&styles::MISSING, text, self.use_color)
    }
}

pub fn render_preview(rendered: &Rendered) -> String {
    format!("{}\n", rendered.display)
}

pub fn render_entry_list(entries: &[Entry]) -> String {
    render_entry_list_internal(entries, None)
}

fn render_entry_list_internal(entries: &[Entry], use_color: Option<bool>) -> String {
    if entries.is_empty() {
        return "No saved entries. Add one with `inbox add` or `inbox compose`.\n".to_string();
    }

    let id_width = entries.iter().map(|e| e.id.width()).max().unwrap_or(0);
    let mut out = String::new();

    for entry in entries {
        let mut lines = entry.task_command.lines();
        let headline = lines.next().unwrap_or_default();
        let extra = lines.count();
        let suffix = if extra > 0 {
            format!(" (+{})", extra)
        } else {
            String::new()
        };

        let fixed = id_width + 2 + suffix.width() + 2 + TIME_WIDTH;
        let available = LINE_WIDTH.saturating_sub(fixed);
        let title = truncate_to_width(headline, available);
        let padding = " ".repeat(available.saturating_sub(title.width()));

        let id = format!("{:<width$}", entry.id, width = id_width);
        out.push_str(&format!(
            "{}  {}{}{}  {}\n",
            paint(&styles::ID, &id, use_color),
            title,
            suffix,
            padding,
            paint(&styles::TIME, &format_time_ago(entry.timestamp), use_color),
        ));
    }
    out
}

#[derive(Serialize)]
struct ListedEntry<'a> {
    id: &'a str,
    command: &'a str,
    milestone: bool,
    timestamp: DateTime<Utc>,
}

pub fn render_entries_json(entries: &[Entry]) -> serde_json::Result<String> {
    let listed: Vec<ListedEntry> = entries
        .iter()
        .map(|e| ListedEntry {
            id: &e.id,
            command: &e.task_command,
            milestone: e.task_data.description.is_milestone,
            timestamp: e.timestamp,
        })
        .collect();
    serde_json::to_string_pretty(&listed)
}

pub fn render_messages(messages: &[CmdMessage]) -> String {
    render_messages_internal(messages, None)
}

fn render_messages_internal(messages: &[CmdMessage], use_color: Option<bool>) -> String {
    messages
        .iter()
        .map(|msg| {
            let style = match msg.level {
                MessageLevel::Info => &*styles::INFO,
                MessageLevel::Success => &*styles::SUCCESS,
                MessageLevel::Warning => &*styles::WARNING,
                MessageLevel::Error => &*styles::ERROR,
            };
            format!("{}\n", paint(style, &msg.content, use_color))
        })
        .collect()
}

/// Prints informational messages to stdout and problems to stderr.
pub fn print_messages(messages: &[CmdMessage]) {
    let (problems, notes): (Vec<CmdMessage>, Vec<CmdMessage>) = messages
        .iter()
        .cloned()
        .partition(|m| matches!(m.level, MessageLevel::Warning | MessageLevel::Error));
    print!("{}", render_messages(&notes));
    eprint!("{}", render_messages(&problems));
}

pub fn render_info(info: &StorageInfo, data_dir: &Path, max_entries: usize) -> String {
    render_info_internal(info, data_dir, max_entries, None)
}

fn render_info_internal(
    info: &StorageInfo,
    data_dir: &Path,
    max_entries: usize,
    use_color: Option<bool>,
) -> String {
    let status = if info.is_available {
        paint(&styles::SUCCESS, "available", use_color)
    } else {
        paint(&styles::ERROR, "unavailable", use_color)
    };
    format!(
        "Data dir:  {}\nStorage:   {}\nEntries:   {} / {}\nBytes:     {}\n",
        data_dir.display(),
        status,
        info.entries_count,
        max_entries,
        info.bytes_used
    )
}

fn truncate_to_width(s: &str, max_width: usize) -> String {
    use unicode_width::UnicodeWidthChar;

    if s.width() <= max_width {
        return s.to_string();
    }

    let mut result = String::new();
    let mut current_width = 0;
    let limit = max_width.saturating_sub(1);

    for c in s.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > limit {
            break;
        }
        result.push(c);
        current_width += char_width;
    }
    result.push('…');
    result
}

fn format_time_ago(timestamp: DateTime<Utc>) -> String {
    let duration = Utc::now().signed_duration_since(timestamp);
    let formatter = timeago::Formatter::new();
    let time_str = formatter.convert(duration.to_std().unwrap_or_default());
    format!("{:>width$}", time_str, width = TIME_WIDTH)
}
