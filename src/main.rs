use std::process;

use clap::Parser;
use shiptrace::config::{self, ShipConfig};
use shiptrace::render::present::PresentOptions;
use shiptrace::styling::{eprintln, error_message};

mod cli;
mod commands;

use cli::{Cli, Commands};
use commands::ShowOptions;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Some(path) = cli.config {
        config::set_config_path(path);
    }

    if let Err(e) = run(cli.command) {
        eprintln!("{}", error_message(format!("{e:#}")));
        process::exit(1);
    }
}

/// `RUST_LOG` wins; otherwise warnings, raised by each `-v`.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    let mut builder = env_logger::Builder::new();
    builder.filter_level(level).format_timestamp(None);
    if verbose == 0 {
        builder.parse_default_env();
    }
    builder.init();
}

fn run(command: Commands) -> anyhow::Result<()> {
    let config = ShipConfig::load()?;

    match command {
        Commands::Show {
            files,
            format,
            mailboxes,
            signals,
            signal_filter,
            mailbox_filter,
            tags,
        } => commands::handle_show(
            &config,
            ShowOptions {
                files,
                format,
                mailboxes,
                signals,
                signal_filter,
                mailbox_filter,
                tags,
            },
        ),
        Commands::Tail {
            files,
            interval_ms,
            niceness,
            tags,
        } => commands::handle_tail(&config, files, interval_ms, niceness, &tags),
        Commands::Clear { files } => commands::handle_clear(&config, &files),
        Commands::Present {
            file,
            schema,
            display_participants,
            exclude_participants,
            id,
            seconds,
            signo,
            truncate_names,
            timestamp,
            payload,
            queue,
            no_pager,
        } => commands::handle_present(
            &config,
            &file,
            PresentOptions {
                schema,
                show_participants: display_participants,
                exclude_participants,
                show_ids: id,
                show_seconds: seconds,
                show_signo: signo,
                show_payload: payload,
                show_queue: queue,
                truncate_names,
                after: None,
            },
            timestamp.as_deref(),
            no_pager,
        ),
    }
}
