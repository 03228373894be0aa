//! Showing long output through a pager.

use std::io::{IsTerminal, Write};
use std::process::{Command, Stdio};

/// Chopped lines, ANSI colors, no screen clear, line numbers, smart case search.
pub const DEFAULT_PAGER: &str = "less -SRXNi";

/// Show `text` through `pager_cmd`, or print it when stdout is not a
/// terminal or the pager cannot be started.
///
/// The pager inherits stdout, so it takes over the terminal until the user
/// quits.
pub fn page(text: &str, pager_cmd: Option<&str>) -> std::io::Result<()> {
    let pager_cmd = pager_cmd
        .map(str::trim)
        .filter(|cmd| !cmd.is_empty())
        .unwrap_or(DEFAULT_PAGER);

    if !std::io::stdout().is_terminal() {
        log::debug!("stdout is not a terminal, not paging");
        return print(text);
    }

    log::debug!("Piping through pager: {pager_cmd}");
    let mut child = match Command::new("sh")
        .arg("-c")
        .arg(pager_cmd)
        .stdin(Stdio::piped())
        .spawn()
    {
        Ok(child) => child,
        Err(e) => {
            log::debug!("Failed to spawn pager: {e}");
            return print(text);
        }
    };

    if let Some(mut stdin) = child.stdin.take() {
        // The pager may quit before reading everything
        if let Err(e) = stdin.write_all(text.as_bytes())
            && e.kind() != std::io::ErrorKind::BrokenPipe
        {
            return Err(e);
        }
    }

    let status = child.wait()?;
    if !status.success() {
        log::debug!("Pager exited with status: {status}");
    }
    Ok(())
}

/// Print without a pager; styling is stripped when stdout is not a terminal.
pub fn print(text: &str) -> std::io::Result<()> {
    let mut stdout = anstream::stdout().lock();
    match stdout.write_all(text.as_bytes()).and_then(|()| stdout.flush()) {
        Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => Ok(()),
        other => other,
    }
}
