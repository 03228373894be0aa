//! Per-signal and per-mailbox tables: counts plus first and last timestamp.
//!
//! Named entries come first, ordered by upper-cased name; unnamed entries
//! follow in id order.

use std::collections::BTreeSet;

use super::Renderer;
use crate::names::{NameMap, UNKNOWN};
use crate::trace::{Timestamp, Trace, TraceEvent};

/// Width of a full `YYYY-mm-dd HH:MM:SS.ffffff` timestamp plus one space.
const FIRST_WIDTH: usize = 27;

pub fn render(trace: &Trace, renderer: &Renderer<'_>) -> String {
    let events: Vec<&TraceEvent> = trace.without_duplicates().map(|item| item.event).collect();
    let mut out = String::new();

    let signals: BTreeSet<u32> = events.iter().map(|e| e.signo).collect();
    let width = name_width(&signals, renderer.signals);
    out.push_str(&format!(
        "{:<10} {:<width$} {:<5} {:<FIRST_WIDTH$} {}\n",
        "# Signal", "Name", "Count", "First", "Last"
    ));
    for signo in sorted_by_name(&signals, renderer.signals) {
        let matching: Vec<&TraceEvent> = events.iter().copied().filter(|e| e.signo == signo).collect();
        let (first, last) = span(&matching);
        out.push_str(&format!(
            "{:<10} {:<width$} {:<5} {:<FIRST_WIDTH$} {}\n",
            format!("0x{signo:07x}"),
            renderer.signals.name_or_unknown(signo),
            matching.len(),
            first.format_utc(),
            short_time(last),
        ));
    }

    let mailboxes: BTreeSet<u32> = events.iter().flat_map(|e| [e.sender, e.receiver]).collect();
    let width = name_width(&mailboxes, renderer.mailboxes);
    out.push('\n');
    out.push_str(&format!(
        "{:<10} {:<width$} {:<5} {:<9} {:<FIRST_WIDTH$} {}\n",
        "# Mailbox", "Name", "Sent", "Received", "First", "Last"
    ));
    for mailbox in sorted_by_name(&mailboxes, renderer.mailboxes) {
        let sent = events.iter().filter(|e| e.sender == mailbox).count();
        let received = events.iter().filter(|e| e.receiver == mailbox).count();
        let touching: Vec<&TraceEvent> = events
            .iter()
            .copied()
            .filter(|e| e.sender == mailbox || e.receiver == mailbox)
            .collect();
        let (first, last) = span(&touching);
        out.push_str(&format!(
            "{:<10} {:<width$} {:<5} {:<9} {:<FIRST_WIDTH$} {}\n",
            mailbox,
            renderer.mailboxes.name_or_unknown(mailbox),
            sent,
            received,
            first.format_utc(),
            short_time(last),
        ));
    }

    out
}

/// Longest name, counting unnamed ids as `<unknown>`, plus one.
fn name_width(ids: &BTreeSet<u32>, names: &NameMap) -> usize {
    ids.iter()
        .map(|&id| names.get(id).map_or(UNKNOWN.len(), str::len))
        .max()
        .unwrap_or(UNKNOWN.len())
        + 1
}

fn sorted_by_name(ids: &BTreeSet<u32>, names: &NameMap) -> Vec<u32> {
    let mut sorted: Vec<u32> = ids.iter().copied().collect();
    sorted.sort_by_key(|&id| match names.get(id) {
        Some(name) => (0, name.to_uppercase(), id),
        None => (1, String::new(), id),
    });
    sorted
}

fn span(events: &[&TraceEvent]) -> (Timestamp, Timestamp) {
    let first = events.iter().map(|e| e.time).min().unwrap_or_default();
    let last = events.iter().map(|e| e.time).max().unwrap_or_default();
    (first, last)
}

fn short_time(time: Timestamp) -> String {
    time.to_datetime().format("%m-%d %H:%M:%S%.6f").to_string()
}
