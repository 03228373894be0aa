//! JSON array of every event.
//!
//! Pair links are not serialized; the array is flat.

use serde::Serialize;

use super::{Renderer, TagDisplay};
use crate::trace::{Tag, Trace, TraceEvent};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonEvent<'a> {
    #[serde(rename = "type")]
    pub kind: u32,
    pub source: u32,
    pub sender: u32,
    pub receiver: u32,
    /// Seconds since the epoch, microseconds as the fraction
    pub seconds: f64,
    pub signo: u32,
    pub proc_id: TagValue,
    pub conn_id: TagValue,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receiver_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signal_name: Option<&'a str>,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum TagValue {
    Number(i64),
    Escaped(String),
}

impl TagValue {
    fn new(tag: &Tag, display: TagDisplay) -> Self {
        match display {
            TagDisplay::Escaped => Self::Escaped(tag.escaped()),
            TagDisplay::Number(_) => Self::Number(display.number(tag)),
        }
    }
}

impl<'a> JsonEvent<'a> {
    pub fn new(event: &TraceEvent, renderer: &Renderer<'a>) -> Self {
        Self {
            kind: event.kind.raw(),
            source: event.source,
            sender: event.sender,
            receiver: event.receiver,
            seconds: event.time.as_secs_f64(),
            signo: event.signo,
            proc_id: TagValue::new(&event.proc_id, renderer.tags),
            conn_id: TagValue::new(&event.conn_id, renderer.tags),
            sender_name: renderer.mailboxes.get(event.sender),
            receiver_name: renderer.mailboxes.get(event.receiver),
            signal_name: renderer.signals.get(event.signo),
            timestamp: event.time.format_utc(),
        }
    }
}

pub fn render(trace: &Trace, renderer: &Renderer<'_>) -> String {
    let events: Vec<JsonEvent<'_>> = trace
        .events()
        .iter()
        .map(|event| JsonEvent::new(event, renderer))
        .collect();
    // Serializing plain structs of numbers and strings cannot fail
    let mut out = serde_json::to_string_pretty(&events).unwrap_or_default();
    out.push('\n');
    out
}
