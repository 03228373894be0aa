//! Pretty-printer for JSON event files.
//!
//! Two document layouts are supported, each through a [`SchemaAdapter`]:
//!
//! - [`Schema::Ship`]: the array written by `ship show --format json`
//! - [`Schema::Orc`]: `{"events": [...]}` with nested `sender.name` /
//!   `receiver.name`, `sent` / `received` timestamps, an optional `payload`
//!   and `receive_queue_len`
//!
//! Adapters only normalize; filtering, coloring and layout are shared.

use anstyle::Style;
use chrono::{DateTime, NaiveDateTime, NaiveTime};
use indexmap::IndexSet;
use serde_json::Value;

use crate::styling::{
    BOLD, CONFIRM, INDICATION, JSON_BOOL, JSON_KEY, JSON_NULL, JSON_NUMBER, JSON_STRING,
    OTHER_EVENT, PALETTE, REJECT, REQUEST, StyledLine, truncate_with_ellipsis,
};

/// Shown when an event lacks a field.
const MISSING: &str = "N/A";
const TIMESTAMP_WIDTH: usize = 30;
const ID_WIDTH: usize = 5;
const QUEUE_WIDTH: usize = 7;
const SECONDS_WIDTH: usize = 25;
const SIGNO_WIDTH: usize = 15;
/// Event names are cut to this with `truncate_names`.
pub const MAX_EVENT_NAME_WIDTH: usize = 35;

#[derive(Debug, thiserror::Error)]
pub enum PresentError {
    #[error("Not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("No event list found for the {0} schema")]
    MissingEvents(Schema),

    #[error("Invalid time '{0}', expected HH:MM:SS")]
    InvalidTime(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, strum::Display, strum::EnumString)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[strum(serialize_all = "kebab-case")]
pub enum Schema {
    #[default]
    Ship,
    Orc,
}

impl Schema {
    pub fn adapter(self) -> &'static dyn SchemaAdapter {
        match self {
            Self::Ship => &ShipSchema,
            Self::Orc => &OrcSchema,
        }
    }
}

/// One event, normalized from either schema.
#[derive(Debug, Clone, PartialEq)]
pub struct PresentEvent {
    pub timestamp: String,
    pub sender: String,
    pub receiver: String,
    pub sender_id: String,
    pub receiver_id: String,
    pub name: String,
    pub seconds: String,
    pub signo: Option<u64>,
    pub payload: Option<Value>,
    pub queue_len: u64,
}

/// Sender and receiver column geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NameColumn {
    pub width: usize,
    /// Names longer than this are cut with `...`
    pub truncate: usize,
}

/// Maps a parsed document of one layout onto [`PresentEvent`]s.
pub trait SchemaAdapter {
    fn events<'a>(&self, document: &'a Value) -> Option<&'a Vec<Value>>;

    fn event(&self, value: &Value) -> PresentEvent;

    fn name_column(&self) -> NameColumn;
}

pub struct ShipSchema;

impl SchemaAdapter for ShipSchema {
    fn events<'a>(&self, document: &'a Value) -> Option<&'a Vec<Value>> {
        document.as_array()
    }

    fn event(&self, value: &Value) -> PresentEvent {
        PresentEvent {
            timestamp: text_at(value, "/timestamp").unwrap_or_default(),
            sender: text_at(value, "/senderName").unwrap_or_else(|| MISSING.into()),
            receiver: text_at(value, "/receiverName").unwrap_or_else(|| MISSING.into()),
            sender_id: text_at(value, "/sender").unwrap_or_else(|| "0".into()),
            receiver_id: text_at(value, "/receiver").unwrap_or_else(|| "0".into()),
            name: text_at(value, "/signalName").unwrap_or_else(|| MISSING.into()),
            seconds: text_at(value, "/seconds").unwrap_or_default(),
            signo: value.pointer("/signo").and_then(Value::as_u64),
            payload: None,
            queue_len: 0,
        }
    }

    fn name_column(&self) -> NameColumn {
        NameColumn {
            width: 25,
            truncate: 30,
        }
    }
}

pub struct OrcSchema;

impl SchemaAdapter for OrcSchema {
    fn events<'a>(&self, document: &'a Value) -> Option<&'a Vec<Value>> {
        document.get("events")?.as_array()
    }

    fn event(&self, value: &Value) -> PresentEvent {
        PresentEvent {
            timestamp: text_at(value, "/sent")
                .or_else(|| text_at(value, "/received"))
                .unwrap_or_else(|| MISSING.into()),
            sender: text_at(value, "/sender/name").unwrap_or_else(|| MISSING.into()),
            receiver: text_at(value, "/receiver/name").unwrap_or_else(|| MISSING.into()),
            sender_id: text_at(value, "/sender/id").unwrap_or_default(),
            receiver_id: text_at(value, "/receiver/id").unwrap_or_default(),
            name: text_at(value, "/name").unwrap_or_else(|| MISSING.into()),
            seconds: String::new(),
            signo: None,
            payload: value.get("payload").cloned(),
            queue_len: value
                .get("receive_queue_len")
                .and_then(Value::as_u64)
                .unwrap_or(0),
        }
    }

    fn name_column(&self) -> NameColumn {
        NameColumn {
            width: 35,
            truncate: 35,
        }
    }
}

/// A scalar at `pointer` as display text; strings unquoted.
fn text_at(value: &Value, pointer: &str) -> Option<String> {
    match value.pointer(pointer)? {
        Value::String(s) => Some(s.clone()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
        other => Some(other.to_string()),
    }
}

#[derive(Debug, Clone, Default)]
pub struct PresentOptions {
    pub schema: Schema,
    /// Keep events whose sender or receiver is exactly one of these
    pub show_participants: Vec<String>,
    /// Drop events whose sender or receiver contains one of these
    pub exclude_participants: Vec<String>,
    pub show_ids: bool,
    pub show_seconds: bool,
    pub show_signo: bool,
    pub show_payload: bool,
    pub show_queue: bool,
    pub truncate_names: bool,
    /// Keep events at or after this time of day
    pub after: Option<NaiveTime>,
}

/// Parse a `HH:MM:SS` time-of-day filter.
pub fn parse_time(input: &str) -> Result<NaiveTime, PresentError> {
    NaiveTime::parse_from_str(input, "%H:%M:%S").map_err(|_| PresentError::InvalidTime(input.into()))
}

/// Time of day of an event timestamp, `None` when it does not parse.
///
/// RFC 3339 (`2024-05-01T10:00:00.5Z`) and the naive forms with `T` or a
/// space separator are accepted; anything past microseconds is ignored.
fn time_of_day(timestamp: &str) -> Option<NaiveTime> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(timestamp) {
        return Some(parsed.time());
    }
    let cut: String = timestamp.chars().take(26).collect();
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(&cut, format).ok())
        .map(|parsed| parsed.time())
}

/// Parse `input` and lay it out, header first.
pub fn present(input: &str, options: &PresentOptions) -> Result<Vec<StyledLine>, PresentError> {
    let document: Value = serde_json::from_str(input)?;
    let adapter = options.schema.adapter();
    let events: Vec<PresentEvent> = adapter
        .events(&document)
        .ok_or(PresentError::MissingEvents(options.schema))?
        .iter()
        .map(|value| adapter.event(value))
        .collect();

    Ok(Layout::new(&events, adapter.name_column(), options).lines(&events))
}

/// Column widths and color assignments, computed over every event before
/// filtering so colors stay stable across filters.
struct Layout<'a> {
    options: &'a PresentOptions,
    names: NameColumn,
    event_name_width: usize,
    participants: IndexSet<&'a str>,
    signos: IndexSet<u64>,
}

impl<'a> Layout<'a> {
    fn new(events: &'a [PresentEvent], names: NameColumn, options: &'a PresentOptions) -> Self {
        let mut event_name_width = events.iter().map(|e| e.name.chars().count()).max().unwrap_or(0) + 2;
        if options.truncate_names {
            event_name_width = event_name_width.min(MAX_EVENT_NAME_WIDTH);
        }

        let participants = events
            .iter()
            .flat_map(|e| [e.sender.as_str(), e.receiver.as_str()])
            .filter(|name| !name.is_empty() && *name != MISSING)
            .collect();
        let signos = events.iter().filter_map(|e| e.signo).collect();

        Self {
            options,
            names,
            event_name_width,
            participants,
            signos,
        }
    }

    fn participant_style(&self, name: &str) -> Style {
        self.participants
            .get_index_of(name)
            .map_or(Style::new(), |idx| PALETTE[idx % PALETTE.len()])
    }

    fn signo_style(&self, signo: Option<u64>) -> Style {
        signo
            .and_then(|signo| self.signos.get_index_of(&signo))
            .map_or(Style::new(), |idx| PALETTE[idx % PALETTE.len()])
    }

    fn keep(&self, event: &PresentEvent) -> bool {
        let options = self.options;
        if let Some(after) = options.after {
            match time_of_day(&event.timestamp) {
                Some(time) if time >= after => {}
                _ => return false,
            }
        }

        let shown = options.show_participants.is_empty()
            || options
                .show_participants
                .iter()
                .any(|p| *p == event.sender || *p == event.receiver);
        let excluded = options
            .exclude_participants
            .iter()
            .any(|p| event.sender.contains(p.as_str()) || event.receiver.contains(p.as_str()));
        shown && !excluded
    }

    fn lines(&self, events: &[PresentEvent]) -> Vec<StyledLine> {
        std::iter::once(self.header())
            .chain(events.iter().filter(|e| self.keep(e)).map(|e| self.line(e)))
            .collect()
    }

    fn header(&self) -> StyledLine {
        let options = self.options;
        let mut line = StyledLine::new();
        line.push_cell("Timestamp", TIMESTAMP_WIDTH, BOLD);
        if options.show_ids {
            line.push_cell("ID", ID_WIDTH, BOLD);
        }
        line.push_cell("Sender", self.names.width, BOLD);
        if options.show_ids {
            line.push_cell("ID", ID_WIDTH, BOLD);
        }
        line.push_cell("Receiver", self.names.width, BOLD);
        if options.show_queue {
            line.push_cell("Queue", QUEUE_WIDTH, BOLD);
        }
        line.push_cell("Event Name", self.event_name_width + 6, BOLD);
        if options.show_seconds {
            line.push_cell("Seconds", SECONDS_WIDTH, BOLD);
        }
        if options.show_signo {
            line.push_cell("Signo", SIGNO_WIDTH, BOLD);
        }
        if options.show_payload {
            line.push_styled("Payload", BOLD);
        }
        line
    }

    fn line(&self, event: &PresentEvent) -> StyledLine {
        let options = self.options;
        let sender_style = self.participant_style(&event.sender);
        let receiver_style = self.participant_style(&event.receiver);

        let mut line = StyledLine::new();
        line.push_cell(&event.timestamp, TIMESTAMP_WIDTH, BOLD);
        if options.show_ids {
            line.push_cell(&event.sender_id, ID_WIDTH, sender_style);
        }
        line.push_cell(
            &truncate_with_ellipsis(&event.sender, self.names.truncate),
            self.names.width,
            sender_style,
        );
        if options.show_ids {
            line.push_cell(&event.receiver_id, ID_WIDTH, receiver_style);
        }
        line.push_cell(
            &truncate_with_ellipsis(&event.receiver, self.names.truncate),
            self.names.width,
            receiver_style,
        );
        if options.show_queue {
            line.push_cell(&event.queue_len.to_string(), QUEUE_WIDTH, Style::new());
        }
        let name = abbreviate(&truncate_with_ellipsis(&event.name, self.event_name_width));
        line.push_cell(&name, self.event_name_width + 6, event_name_style(&event.name));
        if options.show_seconds {
            line.push_cell(&event.seconds, SECONDS_WIDTH, BOLD);
        }
        if options.show_signo {
            let signo = event.signo.map(|s| s.to_string()).unwrap_or_default();
            line.push_cell(&signo, SIGNO_WIDTH, self.signo_style(event.signo));
        }
        if options.show_payload
            && let Some(payload) = &event.payload
        {
            push_payload(&mut line, payload);
        }
        line
    }
}

/// Color for an event name by its suffix, ignoring case and trailing digits.
pub fn event_name_style(name: &str) -> Style {
    let lower = name.to_lowercase();
    let stem = lower.trim_end_matches(|c: char| c.is_ascii_digit());
    if stem.ends_with("req") || stem.ends_with("fwd") {
        REQUEST
    } else if stem.ends_with("cfm") || stem.ends_with("rsp") {
        CONFIRM
    } else if stem.ends_with("rej") {
        REJECT
    } else if stem.ends_with("ind") {
        INDICATION
    } else {
        OTHER_EVENT
    }
}

/// `LongServiceName_PbStartReq` becomes `LSN_PbStartReq`.
pub fn abbreviate(name: &str) -> String {
    let mut parts = name.split("_Pb");
    let (Some(prefix), Some(rest)) = (parts.next(), parts.next()) else {
        return name.to_string();
    };
    let initials: String = prefix.chars().filter(|c| c.is_uppercase()).collect();
    format!("{initials}_Pb{rest}")
}

fn push_payload(line: &mut StyledLine, payload: &Value) {
    if let Value::Array(items) = payload
        && !items.is_empty()
        && let Some(bytes) = items.iter().map(Value::as_u64).collect::<Option<Vec<u64>>>()
    {
        let ascii: String = bytes
            .iter()
            .map(|&b| match u8::try_from(b) {
                Ok(c @ 32..=126) => char::from(c),
                _ => '.',
            })
            .collect();
        let hex: Vec<String> = bytes.iter().map(|b| format!("{b:02x}")).collect();
        line.push_styled(ascii, JSON_STRING);
        line.push_raw(" ");
        line.push_styled(hex.join(" "), JSON_NUMBER);
        return;
    }
    push_json(line, payload);
}

fn push_json(line: &mut StyledLine, value: &Value) {
    match value {
        Value::Object(map) => {
            line.push_raw("{");
            for (idx, (key, value)) in map.iter().enumerate() {
                if idx > 0 {
                    line.push_raw(", ");
                }
                line.push_styled(Value::String(key.clone()).to_string(), JSON_KEY);
                line.push_raw(": ");
                push_json(line, value);
            }
            line.push_raw("}");
        }
        Value::Array(items) => {
            line.push_raw("[");
            for (idx, item) in items.iter().enumerate() {
                if idx > 0 {
                    line.push_raw(", ");
                }
                push_json(line, item);
            }
            line.push_raw("]");
        }
        Value::String(_) => line.push_styled(value.to_string(), JSON_STRING),
        Value::Number(n) => line.push_styled(n.to_string(), JSON_NUMBER),
        Value::Bool(b) => line.push_styled(b.to_string(), JSON_BOOL),
        Value::Null => line.push_styled("null", JSON_NULL),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const SHIP_DOC: &str = r#"[
      {"type": 0, "source": 3, "sender": 100, "receiver": 200, "seconds": 1700000000.00025,
       "signo": 94208, "procId": 1, "connId": 256, "senderName": "app_main",
       "receiverName": "foo_server", "signalName": "FOO_REQ", "timestamp": "2023-11-14 22:13:20.000250"},
      {"type": 0, "source": 3, "sender": 200, "receiver": 100, "seconds": 1700000001.00025,
       "signo": 94209, "procId": 1, "connId": 256, "senderName": "foo_server",
       "receiverName": "app_main", "signalName": "FOO_CFM", "timestamp": "2023-11-14 22:13:21.000250"},
      {"type": 1, "source": 3, "sender": 300, "receiver": 100, "seconds": 1700000004.00025,
       "signo": 96820, "procId": 1, "connId": 256, "receiverName": "app_main",
       "timestamp": "2023-11-14 22:13:24.000250"}
    ]"#;

    const ORC_DOC: &str = r#"{"events": [
      {"sender": {"name": "Dispatcher"}, "receiver": {"name": "Worker"},
       "name": "StartReq", "sent": "2024-05-01T09:59:59.000001Z", "payload": [72, 105, 0],
       "receive_queue_len": 2},
      {"sender": {"name": "Worker"}, "receiver": {"name": "Dispatcher"},
       "name": "LongServiceName_PbStartCfm", "received": "2024-05-01T10:00:01.5Z",
       "payload": {"ok": true}}
    ]}"#;

    fn plain(lines: &[StyledLine]) -> String {
        lines
            .iter()
            .map(|line| line.plain_text().trim_end().to_string())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_present_ship_schema() {
        let options = PresentOptions {
            show_ids: true,
            show_signo: true,
            ..Default::default()
        };
        let lines = present(SHIP_DOC, &options).unwrap();
        insta::assert_snapshot!(plain(&lines), @r"
        Timestamp                       ID     Sender                     ID     Receiver                   Event Name       Signo
        2023-11-14 22:13:20.000250      100    app_main                   200    foo_server                 FOO_REQ          94208
        2023-11-14 22:13:21.000250      200    foo_server                 100    app_main                   FOO_CFM          94209
        2023-11-14 22:13:24.000250      300    N/A                        100    app_main                   N/A              96820
        ");
    }

    #[test]
    fn test_present_orc_schema() {
        let options = PresentOptions {
            schema: Schema::Orc,
            show_payload: true,
            show_queue: true,
            ..Default::default()
        };
        let lines = present(ORC_DOC, &options).unwrap();
        let text = plain(&lines);
        let rows: Vec<&str> = text.lines().collect();
        assert_eq!(rows.len(), 3);
        assert!(rows[0].starts_with("Timestamp"));
        assert!(rows[0].contains("Queue"));
        assert!(rows[1].contains("StartReq"));
        assert!(rows[1].ends_with("Hi. 48 69 00"), "{}", rows[1]);
        assert!(rows[2].contains("LSN_PbStartCfm"));
        assert!(rows[2].ends_with(r#"{"ok": true}"#), "{}", rows[2]);
    }

    #[test]
    fn test_time_filter() {
        let options = PresentOptions {
            schema: Schema::Orc,
            after: Some(parse_time("10:00:00").unwrap()),
            ..Default::default()
        };
        let lines = present(ORC_DOC, &options).unwrap();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].plain_text().contains("LSN_PbStartCfm"));

        let options = PresentOptions {
            after: Some(parse_time("22:13:21").unwrap()),
            ..Default::default()
        };
        assert_eq!(present(SHIP_DOC, &options).unwrap().len(), 3);
    }

    #[test]
    fn test_participant_filters() {
        let options = PresentOptions {
            show_participants: vec!["foo_server".into()],
            ..Default::default()
        };
        assert_eq!(present(SHIP_DOC, &options).unwrap().len(), 3);

        let options = PresentOptions {
            exclude_participants: vec!["foo".into()],
            ..Default::default()
        };
        let lines = present(SHIP_DOC, &options).unwrap();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].plain_text().contains("N/A"));
    }

    #[test]
    fn test_present_errors() {
        let options = PresentOptions::default();
        assert!(matches!(present("{not json", &options), Err(PresentError::InvalidJson(_))));
        assert!(matches!(present(ORC_DOC, &options), Err(PresentError::MissingEvents(Schema::Ship))));
        assert!(matches!(parse_time("25:00"), Err(PresentError::InvalidTime(_))));
    }

    #[test]
    fn test_participant_colors_are_stable() {
        let lines = present(SHIP_DOC, &PresentOptions::default()).unwrap();
        let sender_style = |line: &StyledLine| line.segments[1].style;
        // app_main sends the first event and receives the second
        assert_eq!(sender_style(&lines[1]), Some(PALETTE[0]));
        assert_eq!(lines[2].segments[2].style, Some(PALETTE[0]));
        assert_eq!(sender_style(&lines[2]), Some(PALETTE[1]));
    }

    #[rstest]
    #[case::request("FOO_REQ", REQUEST)]
    #[case::numbered_confirm("FooCfm2", CONFIRM)]
    #[case::response("bar_rsp", CONFIRM)]
    #[case::reject("FOO_REJ", REJECT)]
    #[case::indication("FOO_IND", INDICATION)]
    #[case::forward("FOO_FWD", REQUEST)]
    #[case::other("FOO_TIMEOUT", OTHER_EVENT)]
    fn test_event_name_style(#[case] name: &str, #[case] expected: Style) {
        assert_eq!(event_name_style(name), expected);
    }

    #[test]
    fn test_abbreviate() {
        assert_eq!(abbreviate("LongServiceName_PbStartReq"), "LSN_PbStartReq");
        assert_eq!(abbreviate("FOO_REQ"), "FOO_REQ");
    }
}
