//! Normalized trace records.

use std::fmt;

use super::format::ByteOrder;

/// Raw `type` value of a send record.
pub const ITC_SEND: u32 = 0;
/// Raw `type` value of a receive record.
pub const ITC_RECV: u32 = 1;

/// Direction of a traced signal.
///
/// Only [`EventKind::Send`] and [`EventKind::Receive`] take part in pairing.
/// Any other raw value is kept verbatim so that re-encoding a decoded file
/// reproduces the original bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Send,
    Receive,
    Other(u32),
}

impl EventKind {
    pub fn from_raw(raw: u32) -> Self {
        match raw {
            ITC_SEND => Self::Send,
            ITC_RECV => Self::Receive,
            other => Self::Other(other),
        }
    }

    pub fn raw(self) -> u32 {
        match self {
            Self::Send => ITC_SEND,
            Self::Receive => ITC_RECV,
            Self::Other(raw) => raw,
        }
    }

    /// Single-letter direction used by the CSV renderer.
    pub fn direction(self) -> &'static str {
        match self {
            Self::Send => "S",
            _ => "R",
        }
    }
}

/// Opaque `procId` / `connId` value.
///
/// Binary v2 files and the 32-character text form carry four raw bytes, the
/// two-integer text form carries plain numbers, and v1 files carry nothing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Tag {
    #[default]
    Empty,
    Bytes([u8; 4]),
    Number(u64),
}

impl Tag {
    /// Numeric value of the tag, reading four-byte tags with `order`.
    ///
    /// Returns `None` when the tag has no numeric reading (an empty tag).
    pub fn to_number(&self, order: ByteOrder) -> Option<u64> {
        match self {
            Self::Empty => None,
            Self::Bytes(bytes) => Some(u64::from(order.read_u32(bytes))),
            Self::Number(n) => Some(*n),
        }
    }

    /// `\xHH` escape form, as written into text trace files.
    pub fn escaped(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Bytes(bytes) => bytes.iter().map(|b| format!("\\x{b:02x}")).collect(),
            Self::Number(n) => n.to_string(),
        }
    }

    /// Space separated hex bytes, as shown in the CSV renderer.
    pub fn spaced_hex(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Bytes(bytes) => bytes
                .iter()
                .map(|b| format!("{b:02x}"))
                .collect::<Vec<_>>()
                .join(" "),
            Self::Number(n) => n.to_string(),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

/// Wall-clock timestamp of a record, ordered by `(seconds, microseconds)`.
///
/// Both fields are read unsigned. Writers stamp records with the current
/// time, so a value with the top bit set is a date past 2038 rather than
/// one before 1970, and it sorts after every earlier record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Timestamp {
    pub seconds: u32,
    pub microseconds: u32,
}

impl Timestamp {
    pub fn new(seconds: u32, microseconds: u32) -> Self {
        Self {
            seconds,
            microseconds,
        }
    }

    /// Unwritten ring-buffer slots carry a zero `seconds` field.
    pub fn is_unwritten(&self) -> bool {
        self.seconds == 0
    }

    pub fn as_secs_f64(&self) -> f64 {
        f64::from(self.seconds) + f64::from(self.microseconds) / 1e6
    }

    pub fn to_datetime(&self) -> chrono::DateTime<chrono::Utc> {
        let total_micros = i64::from(self.seconds) * 1_000_000 + i64::from(self.microseconds);
        chrono::DateTime::from_timestamp_micros(total_micros).unwrap_or_default()
    }

    /// `YYYY-mm-dd HH:MM:SS.ffffff` in UTC.
    pub fn format_utc(&self) -> String {
        self.to_datetime()
            .format("%Y-%m-%d %H:%M:%S%.6f")
            .to_string()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:06}", self.seconds, self.microseconds)
    }
}

/// One decoded signal record.
///
/// `pair` is an index into the sequence that owns this event (see
/// [`super::Trace`]); it is a relation, never an owned copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceEvent {
    pub kind: EventKind,
    pub source: u32,
    pub sender: u32,
    pub receiver: u32,
    pub time: Timestamp,
    pub signo: u32,
    pub proc_id: Tag,
    pub conn_id: Tag,
    pub pair: Option<usize>,
}

/// Fields that must agree for a send and a receive to describe one message.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PairKey {
    pub signo: u32,
    pub sender: u32,
    pub receiver: u32,
    pub proc_id: Tag,
    pub conn_id: Tag,
}

impl TraceEvent {
    pub fn pair_key(&self) -> PairKey {
        PairKey {
            signo: self.signo,
            sender: self.sender,
            receiver: self.receiver,
            proc_id: self.proc_id.clone(),
            conn_id: self.conn_id.clone(),
        }
    }

    /// Equality on the recorded fields, ignoring pair links.
    pub fn same_record(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.source == other.source
            && self.sender == other.sender
            && self.receiver == other.receiver
            && self.time == other.time
            && self.signo == other.signo
            && self.proc_id == other.proc_id
            && self.conn_id == other.conn_id
    }
}

/// Stable sort by timestamp; records with equal timestamps keep read order.
pub fn sort_by_time(events: &mut [TraceEvent]) {
    events.sort_by_key(|e| e.time);
}
