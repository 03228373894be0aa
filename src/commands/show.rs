use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use shiptrace::config::ShipConfig;
use shiptrace::filter::TraceFilter;
use shiptrace::names::{self, NameMap};
use shiptrace::pager;
use shiptrace::path::{expand_tilde, format_path_for_display};
use shiptrace::render::{OutputFormat, Renderer};
use shiptrace::styling::{eprintln, warning_message};
use shiptrace::trace;

use super::{resolve_files, tag_display};
use crate::cli::TagArgs;

pub(crate) struct ShowOptions {
    pub files: Vec<String>,
    pub format: OutputFormat,
    pub mailboxes: Option<PathBuf>,
    pub signals: Option<PathBuf>,
    pub signal_filter: Option<String>,
    pub mailbox_filter: Option<String>,
    pub tags: TagArgs,
}

pub(crate) fn handle_show(config: &ShipConfig, options: ShowOptions) -> anyhow::Result<()> {
    // Parse filters before touching any file so a typo fails fast
    let filter = TraceFilter::new(
        options.signal_filter.as_deref(),
        options.mailbox_filter.as_deref(),
    )?;

    let files = resolve_files(config, &options.files)?;
    let loaded = trace::load(&files)?;
    for skipped in &loaded.skipped {
        eprintln!("{}", warning_message(skipped.to_string()));
    }

    let mailboxes = mailbox_names(options.mailboxes.as_deref().or(config.mailboxes.as_deref()))?;
    let signals = signal_names(options.signals.as_deref().or(config.signals.as_deref()))?;

    let mut trace = loaded.trace;
    if !filter.is_noop() {
        trace = filter.apply(trace, &signals, &mailboxes);
        if trace.is_empty() {
            bail!("No signals selected! Check your filters or try summary without filters.");
        }
    }

    let renderer = Renderer::new(&signals, &mailboxes, tag_display(config, &options.tags));
    pager::print(&renderer.render(options.format, &trace))?;
    Ok(())
}

fn mailbox_names(path: Option<&Path>) -> anyhow::Result<NameMap> {
    match path.map(expand_tilde) {
        Some(path) => names::read_mailbox_file(&path).with_context(|| {
            format!("Failed to read mailbox table {}", format_path_for_display(&path))
        }),
        None => Ok(names::system_mailboxes()),
    }
}

fn signal_names(path: Option<&Path>) -> anyhow::Result<NameMap> {
    let Some(path) = path.map(expand_tilde).or_else(names::find_signal_file) else {
        log::debug!("No signal list found");
        return Ok(NameMap::new());
    };
    names::read_signal_file(&path)
        .with_context(|| format!("Failed to read signal list {}", format_path_for_display(&path)))
}
