//! Interactive composer.
//!
//! A line-oriented stand-in for the form: each input line is one action. Field edits go
//! through the description and annotate panels, which write via `set_field`; the live
//! preview fragment re-renders from the resulting `stateChange` events. Every loop
//! iteration also calls `tick_if_due`, the periodic safety-net render.
//!
//! ```text
//! desc <text>    set the description
//! note <text>    append an annotation line
//! milestone      toggle the milestone flag
//! preview        show the command text
//! save           save the entry and reset the form
//! clear          reset the form
//! quit           leave (also on end of input)
//! ```

use super::render::{render_messages, TerminalMarkup};
use inboxapp::api::InboxApi;
use inboxapp::error::Result;
use inboxapp::fragments::{AnnotatePanel, DescriptionPanel};
use inboxapp::store::StorageMedium;
use std::io::{BufRead, Write};
use std::rc::Rc;
use std::time::Instant;

const HELP: &str = "Commands: desc <text>, note <text>, milestone, preview, save, clear, quit";

pub fn run<M: StorageMedium>(api: &mut InboxApi<M>) -> Result<()> {
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    run_with(api, stdin.lock(), stdout.lock(), TerminalMarkup::default())
}

fn run_with<M, R, W>(
    api: &mut InboxApi<M>,
    input: R,
    mut out: W,
    markup: TerminalMarkup,
) -> Result<()>
where
    M: StorageMedium,
    R: BufRead,
    W: Write,
{
    let live = api.live_preview(Rc::new(markup));
    writeln!(out, "{}", HELP)?;
    write!(out, "> ")?;
    out.flush()?;

    for line in input.lines() {
        let line = line?;
        live.tick_if_due(Instant::now(), api.composer());

        let (command, rest) = match line.trim().split_once(' ') {
            Some((command, rest)) => (command, rest.trim()),
            None => (line.trim(), ""),
        };

        match command {
            "" => {}
            "desc" | "d" => {
                DescriptionPanel.input(api.composer_mut(), rest)?;
                writeln!(out, "{}", live.current().display)?;
            }
            "note" | "n" => {
                AnnotatePanel.push_line(api.composer_mut(), rest)?;
                writeln!(out, "{}", live.current().display)?;
            }
            "milestone" | "m" => {
                let on = DescriptionPanel.toggle_milestone(api.composer_mut())?;
                writeln!(out, "Milestone {}", if on { "on" } else { "off" })?;
            }
            "preview" | "p" => writeln!(out, "{}", live.current().display)?,
            "save" | "s" => {
                let result = api.save();
                write!(out, "{}", render_messages(&result.messages))?;
                writeln!(out, "{} saved", api.saved_count())?;
            }
            "clear" => {
                api.clear_form()?;
                writeln!(out, "Form cleared")?;
            }
            "quit" | "q" | "exit" => break,
            _ => writeln!(out, "{}", HELP)?,
        }

        write!(out, "> ")?;
        out.flush()?;
    }

    live.detach(api.bus());
    writeln!(out)?;
    Ok(())
}
