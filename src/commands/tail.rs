use std::io::Write;
use std::time::Duration;

use anyhow::Context;
use shiptrace::config::ShipConfig;
use shiptrace::render::text;
use shiptrace::styling::{eprintln, info_message, warning_message};
use shiptrace::tail::{
    DEFAULT_INTERVAL, DEFAULT_NICENESS, PollReport, TailConfig, TailError, TailMonitor,
};

use super::{search_dir, tag_display};
use crate::cli::TagArgs;

pub(crate) fn handle_tail(
    config: &ShipConfig,
    files: Vec<String>,
    interval_ms: Option<u64>,
    niceness: Option<i32>,
    tags: &TagArgs,
) -> anyhow::Result<()> {
    let tail_config = TailConfig {
        search_dir: search_dir(config),
        patterns: files,
        interval: interval_ms
            .or(config.poll_interval_ms)
            .map_or(DEFAULT_INTERVAL, Duration::from_millis),
        niceness: Some(niceness.or(config.niceness).unwrap_or(DEFAULT_NICENESS)),
    };
    let tags = tag_display(config, tags);

    let mut monitor = TailMonitor::new();
    let result = monitor.run(&tail_config, |report: &PollReport| {
        for diagnostic in &report.diagnostics {
            let message = diagnostic.message(&report.path);
            if diagnostic.is_loss() {
                eprintln!("{}", warning_message(message));
            } else {
                eprintln!("{}", info_message(message));
            }
        }

        let mut stdout = std::io::stdout().lock();
        for event in &report.new_events {
            writeln!(stdout, "{}", text::line(event, tags))?;
        }
        stdout.flush()
    });

    match result {
        // A closed pipe ends the tail quietly
        Err(TailError::Output(e)) if e.kind() == std::io::ErrorKind::BrokenPipe => Ok(()),
        other => other.context("Tail stopped"),
    }
}
