//! # CLI Layer
//!
//! The CLI layer is the **only** place in the codebase that:
//! - Knows about terminal I/O (stdout, stderr)
//! - Uses `std::process::exit`
//! - Handles argument parsing
//! - Installs the `tracing` subscriber
//!
//! ## Structure
//!
//! - `run()`: Main dispatch logic (called by `main.rs`)
//! - `init_logging()`: stderr subscriber, filtered by `INBOX_LOG` or `-v`
//! - `handle_*()`: Per-command handlers that call the API and print output

use super::compose;
use super::render::{
    print_messages, render_entries_json, render_entry_list, render_info, render_preview,
    TerminalMarkup,
};
use super::setup::{Cli, Commands, FormArgs, OutputFormat, SnapshotAction};
use clap::Parser;
use inboxapp::api::InboxApi;
use inboxapp::commands::{CmdMessage, CmdResult};
use inboxapp::config::InboxConfig;
use inboxapp::error::Result;
use inboxapp::fragments::{AnnotatePanel, DescriptionPanel};
use inboxapp::init::initialize;
use inboxapp::store::fs_medium::FsMedium;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "INBOX_LOG";

struct AppContext {
    api: InboxApi<FsMedium>,
    config: InboxConfig,
    data_dir: PathBuf,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut ctx = init_context(&cli)?;

    match cli.command {
        Some(Commands::Add { form }) => handle_add(&mut ctx, form),
        Some(Commands::Preview { form }) => handle_preview(&mut ctx, form),
        Some(Commands::Compose) => compose::run(&mut ctx.api),
        Some(Commands::List { output }) => handle_list(&ctx, output),
        Some(Commands::Delete { id }) => handle_delete(&mut ctx, &id),
        Some(Commands::Clear) => handle_clear(&mut ctx),
        Some(Commands::Restore) => handle_restore(&mut ctx),
        Some(Commands::BackupInfo) => handle_backup_info(&ctx),
        Some(Commands::Export { out }) => handle_export(&ctx, out),
        Some(Commands::Snapshot { action }) => match action {
            SnapshotAction::Export { out } => handle_snapshot_export(&ctx, out),
            SnapshotAction::Import { file } => handle_snapshot_import(&mut ctx, &file),
        },
        Some(Commands::Info) => handle_info(&ctx),
        None => handle_list(&ctx, OutputFormat::Text),
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn init_context(cli: &Cli) -> Result<AppContext> {
    let ctx = initialize(cli.data.clone())?;
    let mut api = ctx.api;
    // A local store is always reachable from a terminal session
    api.set_online(true)?;
    api.start();

    Ok(AppContext {
        api,
        config: ctx.config,
        data_dir: ctx.data_dir,
    })
}

/// Prints the result and exits with 1 if it carries an error message.
fn finish(result: CmdResult) -> Result<()> {
    print_messages(&result.messages);
    if result.has_errors() {
        std::process::exit(1);
    }
    Ok(())
}

fn fill_form(api: &mut InboxApi<FsMedium>, form: FormArgs) -> Result<()> {
    let composer = api.composer_mut();
    if let Some(description) = form.description {
        DescriptionPanel.input(composer, &description)?;
    }
    DescriptionPanel.set_milestone(composer, form.milestone)?;
    for note in form.notes {
        AnnotatePanel.push_line(composer, &note)?;
    }
    Ok(())
}

fn handle_add(ctx: &mut AppContext, form: FormArgs) -> Result<()> {
    fill_form(&mut ctx.api, form)?;
    let result = ctx.api.save();
    finish(result)
}

fn handle_preview(ctx: &mut AppContext, form: FormArgs) -> Result<()> {
    fill_form(&mut ctx.api, form)?;

    if std::io::stdout().is_terminal() {
        let rendered = ctx.api.preview_with(&TerminalMarkup::default());
        print!("{}", render_preview(&rendered));
        return Ok(());
    }

    // Piped: emit only text that is safe to paste elsewhere
    let rendered = ctx.api.preview();
    match rendered.copyable() {
        Some(plain) => {
            println!("{}", plain);
            Ok(())
        }
        None => finish(CmdResult {
            messages: vec![CmdMessage::error(rendered.plain.clone())],
            ..Default::default()
        }),
    }
}

fn handle_list(ctx: &AppContext, output: OutputFormat) -> Result<()> {
    let result = ctx.api.entries()?;
    match output {
        OutputFormat::Text => print!("{}", render_entry_list(&result.listed_entries)),
        OutputFormat::Json => println!("{}", render_entries_json(&result.listed_entries)?),
    }
    Ok(())
}

fn handle_delete(ctx: &mut AppContext, id: &str) -> Result<()> {
    let result = ctx.api.delete(id);
    finish(result)
}

fn handle_clear(ctx: &mut AppContext) -> Result<()> {
    let result = ctx.api.clear();
    finish(result)
}

fn handle_restore(ctx: &mut AppContext) -> Result<()> {
    let result = ctx.api.restore_backup()?;
    finish(result)
}

fn handle_backup_info(ctx: &AppContext) -> Result<()> {
    finish(ctx.api.backup_info()?)
}

fn handle_export(ctx: &AppContext, out: Option<PathBuf>) -> Result<()> {
    let exported = ctx.api.export_text()?;
    let dir = match out {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };
    std::fs::create_dir_all(&dir)?;
    let path = dir.join(&exported.file_name);
    std::fs::write(&path, format!("{}\n", exported.content))?;

    finish(CmdResult {
        messages: vec![CmdMessage::success(format!(
            "Exported {} to {}",
            inboxapp::commands::helpers::entries_label(exported.count),
            path.display()
        ))],
        ..Default::default()
    })
}

fn handle_snapshot_export(ctx: &AppContext, out: Option<PathBuf>) -> Result<()> {
    let snapshot = ctx.api.export_snapshot()?;
    match out {
        Some(path) => {
            std::fs::write(&path, &snapshot)?;
            finish(CmdResult {
                messages: vec![CmdMessage::success(format!(
                    "Snapshot written to {}",
                    path.display()
                ))],
                ..Default::default()
            })
        }
        None => {
            println!("{}", snapshot);
            Ok(())
        }
    }
}

fn handle_snapshot_import(ctx: &mut AppContext, file: &Path) -> Result<()> {
    let serialized = std::fs::read_to_string(file)?;
    let result = ctx.api.import_snapshot(&serialized)?;
    finish(result)
}

fn handle_info(ctx: &AppContext) -> Result<()> {
    print!(
        "{}",
        render_info(
            &ctx.api.storage_info(),
            &ctx.data_dir,
            ctx.config.max_entries
        )
    );
    finish(ctx.api.backup_info()?)
}
