use std::path::Path;

use anyhow::Context;
use shiptrace::config::ShipConfig;
use shiptrace::pager;
use shiptrace::path::format_path_for_display;
use shiptrace::render::present::{self, PresentOptions};

pub(crate) fn handle_present(
    config: &ShipConfig,
    file: &Path,
    mut options: PresentOptions,
    after: Option<&str>,
    no_pager: bool,
) -> anyhow::Result<()> {
    options.after = after.map(present::parse_time).transpose()?;

    let input = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", format_path_for_display(file)))?;
    let lines = present::present(&input, &options)
        .with_context(|| format!("Failed to present {}", format_path_for_display(file)))?;

    let mut output: String = lines
        .iter()
        .map(|line| line.render())
        .collect::<Vec<_>>()
        .join("\n");
    output.push('\n');

    if no_pager {
        pager::print(&output)?;
    } else {
        pager::page(&output, config.pager.as_deref())?;
    }
    Ok(())
}
