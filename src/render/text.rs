//! Raw record lines.
//!
//! With escaped tags the output is the text trace format itself, so it can
//! be fed back in as input.

use super::TagDisplay;
use crate::trace::{Trace, TraceEvent, text};

pub fn render(trace: &Trace, tags: TagDisplay) -> String {
    trace
        .events()
        .iter()
        .map(|event| format!("{}\n", line(event, tags)))
        .collect()
}

pub fn line(event: &TraceEvent, tags: TagDisplay) -> String {
    match tags {
        TagDisplay::Escaped => text::format_line(event),
        TagDisplay::Number(_) => format!(
            "{} {} {} {} {} 0x{:x} {} {}",
            event.time,
            event.kind.raw(),
            event.source,
            event.sender,
            event.receiver,
            event.signo,
            tags.number(&event.proc_id),
            tags.number(&event.conn_id),
        ),
    }
}
