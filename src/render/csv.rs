use super::{Renderer, TagDisplay};
use crate::names::UNKNOWN;
use crate::trace::{EventRef, Tag, Trace};

pub const HEADER: &str = "time, direction, queue_time, from_msgboxId, from_name, to_msgboxId, to_name, signalNumber, signalName, procId, connId";

/// One row per message; a paired receive is folded into its send.
pub fn render(trace: &Trace, renderer: &Renderer<'_>) -> String {
    let mut out = format!("{HEADER}\n");
    for item in trace.without_duplicates() {
        out.push_str(&row(item, renderer));
        out.push('\n');
    }
    out
}

fn row(item: EventRef<'_>, renderer: &Renderer<'_>) -> String {
    let event = item.event;
    let queue_time = match item.queue_time() {
        Some(diff) => format!("{diff:+.6}"),
        None => UNKNOWN.to_string(),
    };

    format!(
        "{}, {}, {}, {}, {}, {}, {}, 0x{:x}, {}, {}",
        event.time.format_utc(),
        event.kind.direction(),
        queue_time,
        event.sender,
        renderer.mailboxes.name_or_unknown(event.sender),
        event.receiver,
        renderer.mailboxes.name_or_unknown(event.receiver),
        event.signo,
        renderer.signals.name_or_unknown(event.signo),
        tags(&event.proc_id, &event.conn_id, renderer.tags),
    )
}

fn tags(proc_id: &Tag, conn_id: &Tag, display: TagDisplay) -> String {
    match display {
        TagDisplay::Escaped => format!("{{{} {}}}", proc_id.spaced_hex(), conn_id.spaced_hex()),
        TagDisplay::Number(_) => format!("{}, {}", display.number(proc_id), display.number(conn_id)),
    }
}
