//! Live tail of ring-buffer trace files.
//!
//! Every poll re-decodes each file with unwritten slots kept and compares it
//! slot by slot with the previous poll:
//!
//! - a written slot past the end of the previous snapshot, or different from
//!   the slot at the same index, is new;
//! - an unwritten slot means the ring has not wrapped yet;
//! - a written slot equal to the previous one confirms the two polls overlap.
//!
//! A poll with no overlap against a non-empty previous snapshot means the
//! producer wrapped the whole ring between polls. Only a single wrap is
//! detectable this way; anything faster goes unnoticed.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;

use crate::discover;
use crate::path::format_path_for_display;
use crate::trace::{self, TraceError, TraceEvent};

#[derive(Debug, thiserror::Error)]
pub enum TailError {
    #[error("Failed to search for trace files")]
    Discover(#[from] ignore::Error),

    /// The report callback failed, typically writing to a closed pipe.
    #[error("Failed to write tail output")]
    Output(#[source] std::io::Error),
}

pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(100);
pub const DEFAULT_NICENESS: i32 = 19;

#[derive(Debug, Clone)]
pub struct TailConfig {
    pub search_dir: PathBuf,
    /// Paths or name prefixes; empty means every trace file in `search_dir`.
    pub patterns: Vec<String>,
    pub interval: Duration,
    /// Scheduling niceness applied once when [`TailMonitor::run`] starts.
    pub niceness: Option<i32>,
}

impl Default for TailConfig {
    fn default() -> Self {
        Self {
            search_dir: discover::default_search_dir(),
            patterns: Vec::new(),
            interval: DEFAULT_INTERVAL,
            niceness: Some(DEFAULT_NICENESS),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TailDiagnostic {
    /// File was present when monitoring started.
    UsingInput,
    /// File appeared after monitoring started.
    NewInput,
    /// No slot matched the previous poll: the ring wrapped between polls.
    SignalsMayBeLost,
    /// First sight of the file, reported as possibly missing its earliest records.
    InitialSignalsMayBeLost,
}

impl TailDiagnostic {
    pub fn is_loss(self) -> bool {
        matches!(self, Self::SignalsMayBeLost | Self::InitialSignalsMayBeLost)
    }

    pub fn message(self, path: &Path) -> String {
        let path = format_path_for_display(path);
        match self {
            Self::UsingInput => format!("Using input {path}"),
            Self::NewInput => format!("Detected new input {path}"),
            Self::SignalsMayBeLost => format!("Signals may have been lost from input {path}"),
            Self::InitialSignalsMayBeLost => {
                format!("Initial signals may have been lost from input {path}")
            }
        }
    }
}

/// What one poll found in one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollReport {
    pub path: PathBuf,
    pub new_events: Vec<TraceEvent>,
    pub diagnostics: Vec<TailDiagnostic>,
}

impl fmt::Display for PollReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} new events",
            format_path_for_display(&self.path),
            self.new_events.len()
        )
    }
}

/// Result of comparing two decodes of the same file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotDiff {
    pub new_events: Vec<TraceEvent>,
    pub saw_unwritten: bool,
    pub overlaps: bool,
}

pub fn diff_snapshot(previous: &[TraceEvent], current: &[TraceEvent]) -> SnapshotDiff {
    let mut diff = SnapshotDiff::default();
    for (idx, event) in current.iter().enumerate() {
        if event.time.is_unwritten() {
            // An unwritten slot also counts as overlap: nothing was wrapped over
            diff.saw_unwritten = true;
            diff.overlaps = true;
        } else if previous
            .get(idx)
            .is_some_and(|before| before.same_record(event))
        {
            diff.overlaps = true;
        } else {
            diff.new_events.push(event.clone());
        }
    }
    diff
}

/// Last decoded contents of every monitored file.
#[derive(Debug, Default)]
pub struct TailMonitor {
    snapshots: HashMap<PathBuf, Vec<TraceEvent>>,
}

impl TailMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the current contents of files present at startup.
    ///
    /// Their existing records are not reported as new, and no initial-loss
    /// diagnostic is raised for them later.
    pub fn prime(&mut self, paths: &[PathBuf]) -> Vec<PollReport> {
        let mut reports = Vec::new();
        for path in paths {
            let Some(slots) = read_slots(path) else {
                continue;
            };
            self.snapshots.insert(path.clone(), slots);
            reports.push(PollReport {
                path: path.clone(),
                new_events: Vec::new(),
                diagnostics: vec![TailDiagnostic::UsingInput],
            });
        }
        reports
    }

    /// Poll every path once.
    pub fn poll(&mut self, paths: &[PathBuf]) -> Vec<PollReport> {
        paths.iter().filter_map(|path| self.poll_path(path)).collect()
    }

    /// Poll one path. Returns `None` if the file could not be read.
    pub fn poll_path(&mut self, path: &Path) -> Option<PollReport> {
        let current = read_slots(path)?;
        let previous = self.snapshots.insert(path.to_path_buf(), current);
        let current = self.snapshots.get(path)?;

        let mut diagnostics = Vec::new();
        if previous.is_none() {
            diagnostics.push(TailDiagnostic::NewInput);
        }

        let before = previous.as_deref().unwrap_or_default();
        let diff = diff_snapshot(before, current);

        if !diff.overlaps && !before.is_empty() {
            diagnostics.push(TailDiagnostic::SignalsMayBeLost);
        }
        if previous.is_none() && diff.saw_unwritten {
            diagnostics.push(TailDiagnostic::InitialSignalsMayBeLost);
        }

        Some(PollReport {
            path: path.to_path_buf(),
            new_events: diff.new_events,
            diagnostics,
        })
    }

    /// Poll forever, rediscovering files every iteration.
    ///
    /// Returns only when discovery fails or `on_report` does.
    pub fn run(
        &mut self,
        config: &TailConfig,
        mut on_report: impl FnMut(&PollReport) -> std::io::Result<()>,
    ) -> Result<(), TailError> {
        if let Some(niceness) = config.niceness {
            lower_priority(niceness);
        }

        let initial = discover::find_trace_files(&config.search_dir, &config.patterns)?;
        for report in self.prime(&initial) {
            on_report(&report).map_err(TailError::Output)?;
        }

        loop {
            let paths = discover::find_trace_files(&config.search_dir, &config.patterns)?;
            for report in self.poll(&paths) {
                log::trace!("{report}");
                on_report(&report).map_err(TailError::Output)?;
            }
            std::thread::sleep(config.interval);
        }
    }
}

fn read_slots(path: &Path) -> Option<Vec<TraceEvent>> {
    match trace::decode_binary_slots(path) {
        Ok(Some(slots)) => Some(slots),
        Ok(None) => {
            log::debug!("Not tailing text trace {}", format_path_for_display(path));
            None
        }
        // Rotated away between discovery and read
        Err(TraceError::Io { source, .. }) if source.kind() == std::io::ErrorKind::NotFound => {
            None
        }
        Err(e) => {
            log::warn!("{e}");
            None
        }
    }
}

/// Renice the current process so continuous polling yields to real work.
fn lower_priority(niceness: i32) {
    let pid = std::process::id().to_string();
    let niceness = niceness.to_string();
    match Command::new("renice")
        .args(["-n", niceness.as_str(), "-p", pid.as_str()])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
    {
        Ok(status) if status.success() => log::debug!("Niceness set to {niceness}"),
        Ok(status) => log::debug!("renice exited with {status}"),
        Err(e) => log::debug!("Failed to run renice: {e}"),
    }
}
