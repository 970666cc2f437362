use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "inbox",
    bin_name = "inbox",
    version,
    about = "Compose task notes, preview the command text and keep them in a local inbox",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Data directory (overrides INBOX_DATA)
    #[arg(long, global = true, value_name = "DIR", help_heading = "Options")]
    pub data: Option<PathBuf>,

    /// Verbose output (debug logging on stderr)
    #[arg(short, long, global = true, help_heading = "Options")]
    pub verbose: bool,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// The composer form, filled from arguments.
#[derive(Args, Debug, Clone, Default)]
pub struct FormArgs {
    /// Task description
    pub description: Option<String>,

    /// Annotation line (repeatable)
    #[arg(short = 'n', long = "note", value_name = "TEXT")]
    pub notes: Vec<String>,

    /// Mark the description as a milestone
    #[arg(short, long)]
    pub milestone: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Save a new entry
    #[command(alias = "a", display_order = 1)]
    Add {
        #[command(flatten)]
        form: FormArgs,
    },

    /// Show the command text an entry would produce, without saving
    #[command(display_order = 2)]
    Preview {
        #[command(flatten)]
        form: FormArgs,
    },

    /// Interactive composer with a live preview
    #[command(alias = "c", display_order = 3)]
    Compose,

    /// List saved entries, newest first
    #[command(alias = "ls", display_order = 4)]
    List {
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        output: OutputFormat,
    },

    /// Delete a saved entry
    #[command(alias = "rm", display_order = 5)]
    Delete {
        /// Entry id, as shown by `list`
        id: String,
    },

    /// Delete every saved entry
    #[command(display_order = 6)]
    Clear,

    /// Undo the last change by restoring the backup
    #[command(display_order = 7)]
    Restore,

    /// Describe the current backup
    #[command(name = "backup-info", display_order = 8)]
    BackupInfo,

    /// Write all saved commands to a dated text file
    #[command(display_order = 9)]
    Export {
        /// Directory to write into (defaults to the current directory)
        #[arg(long, value_name = "DIR")]
        out: Option<PathBuf>,
    },

    /// Export or import a JSON snapshot of the inbox
    #[command(display_order = 10)]
    Snapshot {
        #[command(subcommand)]
        action: SnapshotAction,
    },

    /// Show storage status
    #[command(display_order = 11)]
    Info,
}

#[derive(Subcommand, Debug)]
pub enum SnapshotAction {
    /// Print the snapshot, or write it to a file
    Export {
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,
    },

    /// Replace the inbox with a snapshot file
    Import { file: PathBuf },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("inbox").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn no_subcommand_is_allowed() {
        assert!(parse(&[]).command.is_none());
    }

    #[test]
    fn add_collects_repeated_notes() {
        let cli = parse(&["add", "Buy milk", "-n", "2 liters", "--note", "skimmed", "-m"]);
        match cli.command {
            Some(Commands::Add { form }) => {
                assert_eq!(form.description.as_deref(), Some("Buy milk"));
                assert_eq!(form.notes, vec!["2 liters", "skimmed"]);
                assert!(form.milestone);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn global_options_after_subcommand() {
        let cli = parse(&["list", "--output", "json", "--data", "/tmp/x", "-v"]);
        assert_eq!(cli.data, Some(PathBuf::from("/tmp/x")));
        assert!(cli.verbose);
        assert!(matches!(
            cli.command,
            Some(Commands::List {
                output: OutputFormat::Json
            })
        ));
    }

    #[test]
    fn snapshot_import_takes_file() {
        let cli = parse(&["snapshot", "import", "backup.json"]);
        match cli.command {
            Some(Commands::Snapshot {
                action: SnapshotAction::Import { file },
            }) => assert_eq!(file, PathBuf::from("backup.json")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn backup_info_is_kebab_case() {
        assert!(matches!(
            parse(&["backup-info"]).command,
            Some(Commands::BackupInfo)
        ));
    }
}
