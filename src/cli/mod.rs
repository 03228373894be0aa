use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use shiptrace::render::OutputFormat;
use shiptrace::render::present::Schema;

#[derive(Parser)]
#[command(name = "ship")]
#[command(about = "Decode, pair, filter and tail SHIP signal trace files", long_about = None)]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(disable_help_subcommand = true)]
pub(crate) struct Cli {
    /// Verbose logging (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Config file (default: ~/.config/shiptrace/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// How `procId` / `connId` are shown
#[derive(Args, Debug, Clone, Default)]
pub(crate) struct TagArgs {
    /// Show procId/connId as raw hex bytes
    #[arg(long, alias = "dont_convert_hex_data")]
    pub dont_convert_hex_data: bool,

    /// Read procId/connId as little-endian (default: big-endian)
    #[arg(long, alias = "little_endian")]
    pub little_endian: bool,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Decode trace files and print them
    ///
    /// Files default to every `*.ship` file under $APP_TMP (or /tmp). An
    /// argument that is not an existing path is a name prefix.
    #[command(after_long_help = r#"Filters are comma separated terms, applied left to right:

  17000            decimal id
  0x17000-0x17fff  hex range
  _req$            regex on the name, case-insensitive
  -term            remove matches
  ~term            keep only matches

A mailbox filter `A:B` selects signals between the two sides."#)]
    Show {
        /// Trace files or name prefixes
        #[arg(value_name = "FILE")]
        files: Vec<String>,

        #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
        format: OutputFormat,

        /// Mailbox table in `um list` layout (default: output of `um list`)
        #[arg(long, value_name = "FILE")]
        mailboxes: Option<PathBuf>,

        /// Signal list of `NAME HEX DEC` lines (default: ~/signal_list)
        #[arg(long, value_name = "FILE")]
        signals: Option<PathBuf>,

        /// Signals to include (or exclude when prefixed with -)
        #[arg(long, value_name = "FILTER", allow_hyphen_values = true)]
        signal_filter: Option<String>,

        /// Mailboxes to include (or exclude when prefixed with -)
        #[arg(long, value_name = "FILTER", allow_hyphen_values = true)]
        mailbox_filter: Option<String>,

        #[command(flatten)]
        tags: TagArgs,
    },

    /// Print signals as they are written
    Tail {
        /// Trace files or name prefixes
        #[arg(value_name = "FILE")]
        files: Vec<String>,

        /// Poll interval in milliseconds
        #[arg(long, value_name = "MS")]
        interval_ms: Option<u64>,

        /// Scheduling niceness while polling
        #[arg(long, allow_hyphen_values = true)]
        niceness: Option<i32>,

        #[command(flatten)]
        tags: TagArgs,
    },

    /// Zero every record of binary trace files, keeping the header
    Clear {
        /// Trace files or name prefixes
        #[arg(value_name = "FILE")]
        files: Vec<String>,
    },

    /// Pretty-print a JSON event file through a pager
    Present {
        /// JSON event file
        file: PathBuf,

        /// Document layout
        #[arg(long, value_enum, default_value_t = Schema::Ship)]
        schema: Schema,

        /// Only events with one of these participants as sender or receiver
        #[arg(short = 'd', long = "display-participants", num_args = 0.., value_name = "NAME")]
        display_participants: Vec<String>,

        /// Drop events whose sender or receiver contains one of these
        #[arg(short = 'e', long = "exclude-participants", num_args = 0.., value_name = "NAME")]
        exclude_participants: Vec<String>,

        /// Show sender and receiver ids
        #[arg(short = 'i', long)]
        id: bool,

        /// Show signal seconds
        #[arg(short = 's', long)]
        seconds: bool,

        /// Show signal numbers
        #[arg(short = 'g', long)]
        signo: bool,

        /// Truncate event names to 35 characters
        #[arg(short = 'n', long)]
        truncate_names: bool,

        /// Only events at or after this time of day
        #[arg(short = 't', long, value_name = "HH:MM:SS")]
        timestamp: Option<String>,

        /// Show payloads
        #[arg(short = 'p', long)]
        payload: bool,

        /// Show receive queue lengths
        #[arg(short = 'q', long)]
        queue: bool,

        /// Print directly instead of through the pager
        #[arg(long)]
        no_pager: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_filters_may_start_with_a_dash() {
        let cli = Cli::try_parse_from(["ship", "show", "--signal-filter", "-cfm$", "lm0"]).unwrap();
        let Commands::Show {
            files,
            signal_filter,
            ..
        } = cli.command
        else {
            panic!("expected show");
        };
        assert_eq!(files, vec!["lm0"]);
        assert_eq!(signal_filter.as_deref(), Some("-cfm$"));
    }

    #[test]
    fn test_present_participants() {
        let cli =
            Cli::try_parse_from(["ship", "present", "events.json", "-d", "a", "b", "-i", "--schema", "orc"])
                .unwrap();
        let Commands::Present {
            display_participants,
            id,
            schema,
            ..
        } = cli.command
        else {
            panic!("expected present");
        };
        assert_eq!(display_participants, vec!["a", "b"]);
        assert!(id);
        assert_eq!(schema, Schema::Orc);
    }
}
