mod clear;
mod present;
mod show;
mod tail;

pub(crate) use clear::handle_clear;
pub(crate) use present::handle_present;
pub(crate) use show::{ShowOptions, handle_show};
pub(crate) use tail::handle_tail;

use std::path::PathBuf;

use anyhow::{Context, bail};
use shiptrace::config::ShipConfig;
use shiptrace::discover;
use shiptrace::path::{expand_tilde, format_path_for_display};
use shiptrace::render::TagDisplay;
use shiptrace::trace::ByteOrder;

use crate::cli::TagArgs;

/// Search directory: config, else `$APP_TMP`, else `/tmp`.
fn search_dir(config: &ShipConfig) -> PathBuf {
    config
        .search_dir
        .as_deref()
        .map(expand_tilde)
        .unwrap_or_else(discover::default_search_dir)
}

/// Resolve file arguments; finding nothing is an error.
fn resolve_files(config: &ShipConfig, files: &[String]) -> anyhow::Result<Vec<PathBuf>> {
    let search_dir = search_dir(config);
    let found = discover::find_trace_files(&search_dir, files).with_context(|| {
        format!(
            "Failed to search {} for trace files",
            format_path_for_display(&search_dir)
        )
    })?;
    if found.is_empty() {
        bail!("No ship files found!");
    }
    log::debug!("Using {} trace files", found.len());
    Ok(found)
}

fn tag_display(config: &ShipConfig, args: &TagArgs) -> TagDisplay {
    if args.dont_convert_hex_data {
        TagDisplay::Escaped
    } else if args.little_endian || config.little_endian {
        TagDisplay::Number(ByteOrder::Little)
    } else {
        TagDisplay::Number(ByteOrder::Big)
    }
}
