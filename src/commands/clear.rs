use anyhow::bail;
use shiptrace::config::ShipConfig;
use shiptrace::path::format_path_for_display;
use shiptrace::styling::{eprintln, println, warning_message};
use shiptrace::trace;

use super::resolve_files;

/// Zero every resolved file after its header.
///
/// Files that fail header validation are reported and left untouched; the
/// command still fails once every other file has been cleared.
pub(crate) fn handle_clear(config: &ShipConfig, files: &[String]) -> anyhow::Result<()> {
    let files = resolve_files(config, files)?;
    println!("Clearing {} files", files.len());

    let mut refused = 0;
    for path in &files {
        match trace::clear(path) {
            Ok(()) => log::debug!("Cleared {}", format_path_for_display(path)),
            Err(e) => {
                eprintln!("{}", warning_message(e.to_string()));
                refused += 1;
            }
        }
    }

    if refused > 0 {
        bail!("{refused} of {} files could not be cleared", files.len());
    }
    Ok(())
}
