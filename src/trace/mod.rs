//! Trace file decoding and send/receive pairing.
//!
//! A trace is built in three steps:
//!
//! 1. [`format::detect`] classifies each file as text or binary (v1/v2,
//!    either byte order);
//! 2. [`decode`] turns it into [`TraceEvent`]s;
//! 3. [`Trace::new`] stable-sorts the combined events by timestamp and
//!    [`pair::pair`]s sends with receives.
//!
//! # Usage
//!
//! ```ignore
//! use shiptrace::trace;
//!
//! let loaded = trace::load(&paths)?;
//! for item in loaded.trace.without_duplicates() {
//!     println!("{} {:?}", item.event.time, item.queue_time());
//! }
//! ```

pub mod binary;
pub mod error;
pub mod event;
pub mod format;
pub mod pair;
pub mod text;

use std::path::Path;

pub use binary::Slots;
pub use error::{HeaderError, TraceError};
pub use event::{EventKind, Tag, Timestamp, TraceEvent};
pub use format::{ByteOrder, SchemaVersion, TraceFormat};

/// Decode a trace file, dropping unwritten ring-buffer slots.
pub fn decode(path: &Path) -> Result<Vec<TraceEvent>, TraceError> {
    let bytes = std::fs::read(path).map_err(|e| TraceError::io(path, e))?;
    decode_bytes(path, &bytes, Slots::Written)
}

/// Decode a binary trace file keeping every slot, written or not.
///
/// Returns `None` for a text file, which has no slots to compare.
pub fn decode_binary_slots(path: &Path) -> Result<Option<Vec<TraceEvent>>, TraceError> {
    let bytes = std::fs::read(path).map_err(|e| TraceError::io(path, e))?;
    if format::is_text(&bytes) {
        return Ok(None);
    }
    decode_bytes(path, &bytes, Slots::All).map(Some)
}

/// Decode already-read file contents. `path` is only used in errors.
pub fn decode_bytes(path: &Path, bytes: &[u8], slots: Slots) -> Result<Vec<TraceEvent>, TraceError> {
    let format = format::detect(bytes).map_err(|reason| TraceError::InvalidHeader {
        path: path.to_path_buf(),
        reason,
    })?;

    match format {
        TraceFormat::Text => {
            // Text detection only accepts valid UTF-8
            let input = String::from_utf8_lossy(bytes);
            text::parse_lines(&input).map_err(|e| TraceError::MalformedTextLine {
                path: path.to_path_buf(),
                line: e.line,
                reason: e.reason,
            })
        }
        TraceFormat::Binary(header) => {
            let decoded = binary::decode_records(bytes, &header, slots);
            if decoded.trailing > 0 {
                let truncated = TraceError::TruncatedRecord {
                    path: path.to_path_buf(),
                    trailing: decoded.trailing,
                    record_size: header.version.record_size(),
                };
                log::warn!("{truncated}; keeping the complete records before it");
            }
            Ok(decoded.events)
        }
    }
}

/// A time-sorted, paired event sequence.
///
/// Owns every event; pair links are indexes into [`Trace::events`].
#[derive(Debug, Clone, Default)]
pub struct Trace {
    events: Vec<TraceEvent>,
}

/// An event together with its paired counterpart, if any.
#[derive(Debug, Clone, Copy)]
pub struct EventRef<'a> {
    pub event: &'a TraceEvent,
    pub pair: Option<&'a TraceEvent>,
}

impl EventRef<'_> {
    /// Seconds from this event to its counterpart (negative for a receive).
    pub fn queue_time(&self) -> Option<f64> {
        self.pair
            .map(|pair| pair.time.as_secs_f64() - self.event.time.as_secs_f64())
    }
}

impl Trace {
    /// Sort (stable, by timestamp) and pair.
    pub fn new(mut events: Vec<TraceEvent>) -> Self {
        event::sort_by_time(&mut events);
        pair::pair(&mut events);
        Self { events }
    }

    pub fn events(&self) -> &[TraceEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<EventRef<'_>> {
        let event = self.events.get(idx)?;
        Some(EventRef {
            event,
            pair: event.pair.and_then(|p| self.events.get(p)),
        })
    }

    /// Every event, in time order.
    pub fn iter(&self) -> impl Iterator<Item = EventRef<'_>> {
        (0..self.events.len()).filter_map(|idx| self.get(idx))
    }

    /// Every event except receives that were paired with a send.
    ///
    /// A paired receive describes the same message as its send, so
    /// human-readable output folds it into the send. Unpaired receives stay.
    pub fn without_duplicates(&self) -> impl Iterator<Item = EventRef<'_>> {
        self.iter()
            .filter(|item| item.event.kind == EventKind::Send || item.pair.is_none())
    }

    /// Keep only events matching `keep`.
    ///
    /// Pair links are remapped to the new positions; a link whose
    /// counterpart was dropped is removed.
    pub fn retain(self, mut keep: impl FnMut(&TraceEvent) -> bool) -> Self {
        let mut new_index = vec![None; self.events.len()];
        let mut next = 0;
        for (idx, event) in self.events.iter().enumerate() {
            if keep(event) {
                new_index[idx] = Some(next);
                next += 1;
            }
        }

        let events = self
            .events
            .into_iter()
            .enumerate()
            .filter(|(idx, _)| new_index[*idx].is_some())
            .map(|(_, mut event)| {
                event.pair = event.pair.and_then(|p| new_index[p]);
                event
            })
            .collect();

        Self { events }
    }

    /// Every mailbox seen as sender or receiver.
    pub fn mailboxes(&self) -> std::collections::BTreeSet<u32> {
        self.events
            .iter()
            .flat_map(|e| [e.sender, e.receiver])
            .collect()
    }

    /// Every signal number seen.
    pub fn signals(&self) -> std::collections::BTreeSet<u32> {
        self.events.iter().map(|e| e.signo).collect()
    }
}

/// Result of loading several files into one trace.
#[derive(Debug, Default)]
pub struct Loaded {
    pub trace: Trace,
    /// Files skipped because their header was invalid.
    pub skipped: Vec<TraceError>,
}

/// Decode every file and build one sorted, paired trace.
///
/// A file with an invalid header is skipped (and returned in
/// [`Loaded::skipped`]); any other error aborts the load.
pub fn load<P: AsRef<Path>>(paths: &[P]) -> Result<Loaded, TraceError> {
    let mut events = Vec::new();
    let mut skipped = Vec::new();

    for path in paths {
        let path = path.as_ref();
        match decode(path) {
            Ok(decoded) => {
                log::debug!("Decoded {} events from {}", decoded.len(), path.display());
                events.extend(decoded);
            }
            Err(e) if e.is_invalid_header() => skipped.push(e),
            Err(e) => return Err(e),
        }
    }

    Ok(Loaded {
        trace: Trace::new(events),
        skipped,
    })
}

/// Zero a binary trace file after its header. See [`binary::clear`].
pub fn clear(path: &Path) -> Result<(), TraceError> {
    binary::clear(path)
}
