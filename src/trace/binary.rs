//! Binary record layouts.
//!
//! ```text
//! v1, 24 bytes: type:u16 reserved:u16 source:u32 sender:u32 receiver:u32
//!               seconds:i32 microseconds:i32 signo:u32 reserved:u32
//! v2, 32 bytes: seconds:i32 microseconds:i32 source:u32 type:u32 sender:u32
//!               receiver:u32 signo:u32 procId:[u8; 4] connId:[u8; 4]
//! ```
//!
//! Files are fixed-size ring buffers, so slots that were never written carry
//! a zero `seconds` field.

use std::fs::OpenOptions;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use fs2::FileExt;

use super::error::TraceError;
use super::event::{EventKind, Tag, Timestamp, TraceEvent};
use super::format::{self, ByteOrder, Header, SchemaVersion};

/// Whether unwritten (zero-timestamp) slots are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slots {
    /// Drop unwritten slots; what every presentation wants.
    Written,
    /// Keep every slot; the tail monitor compares slot by slot.
    All,
}

/// Result of decoding the records after a header.
#[derive(Debug, Default)]
pub struct BinaryRecords {
    pub events: Vec<TraceEvent>,
    /// Number of trailing bytes that did not make up a whole record.
    pub trailing: usize,
}

/// Decode every complete record after `header`.
///
/// Trailing bytes short of a full record stop decoding; the caller decides
/// whether to report them.
pub fn decode_records(bytes: &[u8], header: &Header, slots: Slots) -> BinaryRecords {
    let data = bytes.get(header.data_offset..).unwrap_or_default();
    let size = header.version.record_size();
    let chunks = data.chunks_exact(size);
    let trailing = chunks.remainder().len();

    let events = chunks
        .map(|chunk| decode_record(chunk, header.order, header.version))
        .filter(|event| slots == Slots::All || !event.time.is_unwritten())
        .collect();

    BinaryRecords { events, trailing }
}

/// Decode one record. `chunk` must be exactly one record long.
pub fn decode_record(chunk: &[u8], order: ByteOrder, version: SchemaVersion) -> TraceEvent {
    let mut fields = FieldReader { chunk, order, pos: 0 };
    match version {
        SchemaVersion::V1 => {
            let kind = u32::from(fields.u16());
            fields.skip(2);
            let source = fields.u32();
            let sender = fields.u32();
            let receiver = fields.u32();
            let seconds = fields.u32();
            let microseconds = fields.u32();
            let signo = fields.u32();
            TraceEvent {
                kind: EventKind::from_raw(kind),
                source,
                sender,
                receiver,
                time: Timestamp::new(seconds, microseconds),
                signo,
                proc_id: Tag::Empty,
                conn_id: Tag::Empty,
                pair: None,
            }
        }
        SchemaVersion::V2 => {
            let seconds = fields.u32();
            let microseconds = fields.u32();
            let source = fields.u32();
            let kind = fields.u32();
            let sender = fields.u32();
            let receiver = fields.u32();
            let signo = fields.u32();
            let proc_id = Tag::Bytes(fields.raw4());
            let conn_id = Tag::Bytes(fields.raw4());
            TraceEvent {
                kind: EventKind::from_raw(kind),
                source,
                sender,
                receiver,
                time: Timestamp::new(seconds, microseconds),
                signo,
                proc_id,
                conn_id,
                pair: None,
            }
        }
    }
}

struct FieldReader<'a> {
    chunk: &'a [u8],
    order: ByteOrder,
    pos: usize,
}

impl FieldReader<'_> {
    fn raw4(&mut self) -> [u8; 4] {
        let mut out = [0u8; 4];
        out.copy_from_slice(&self.chunk[self.pos..self.pos + 4]);
        self.pos += 4;
        out
    }

    fn u32(&mut self) -> u32 {
        let raw = self.raw4();
        self.order.read_u32(&raw)
    }

    fn u16(&mut self) -> u16 {
        let raw = [self.chunk[self.pos], self.chunk[self.pos + 1]];
        self.pos += 2;
        self.order.read_u16(raw)
    }

    fn skip(&mut self, n: usize) {
        self.pos += n;
    }
}

/// Encode one record in the given layout.
///
/// v1 has no room for `procId`/`connId` and stores the type in 16 bits;
/// reserved fields are written as zero. A non-byte tag is written as its
/// low 32 bits in `order`.
pub fn encode_record(event: &TraceEvent, order: ByteOrder, version: SchemaVersion) -> Vec<u8> {
    let mut out = Vec::with_capacity(version.record_size());
    match version {
        SchemaVersion::V1 => {
            out.extend_from_slice(&order.u16_bytes(event.kind.raw() as u16));
            out.extend_from_slice(&[0, 0]);
            for value in [
                event.source,
                event.sender,
                event.receiver,
                event.time.seconds,
                event.time.microseconds,
                event.signo,
                0,
            ] {
                out.extend_from_slice(&order.u32_bytes(value));
            }
        }
        SchemaVersion::V2 => {
            for value in [
                event.time.seconds,
                event.time.microseconds,
                event.source,
                event.kind.raw(),
                event.sender,
                event.receiver,
                event.signo,
            ] {
                out.extend_from_slice(&order.u32_bytes(value));
            }
            out.extend_from_slice(&tag_bytes(&event.proc_id, order));
            out.extend_from_slice(&tag_bytes(&event.conn_id, order));
        }
    }
    out
}

fn tag_bytes(tag: &Tag, order: ByteOrder) -> [u8; 4] {
    match tag {
        Tag::Empty => [0; 4],
        Tag::Bytes(bytes) => *bytes,
        Tag::Number(n) => order.u32_bytes(*n as u32),
    }
}

/// Encode a complete binary trace file: header followed by every record.
pub fn encode_file(events: &[TraceEvent], order: ByteOrder, version: SchemaVersion) -> Vec<u8> {
    let mut out = format::encode_header(order, version).to_vec();
    for event in events {
        out.extend(encode_record(event, order, version));
    }
    out
}

/// Overwrite every byte after the header with zero.
///
/// The header itself is left untouched, and a file whose header does not
/// validate is not modified at all. The write happens under an exclusive
/// advisory lock; a producer that ignores the lock and appends concurrently
/// is the caller's problem.
pub fn clear(path: &Path) -> Result<(), TraceError> {
    let mut file = OpenOptions::new()
        .read(true)
        .write(true)
        .open(path)
        .map_err(|e| TraceError::io(path, e))?;

    file.lock_exclusive().map_err(|e| TraceError::io(path, e))?;

    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)
        .map_err(|e| TraceError::io(path, e))?;

    let header = format::detect_header(&bytes).map_err(|reason| TraceError::ClearOnInvalidFile {
        path: path.to_path_buf(),
        reason,
    })?;

    let remaining = bytes.len().saturating_sub(header.data_offset);
    log::debug!(
        "Zeroing {} bytes after header of {}",
        remaining,
        path.display()
    );

    file.seek(SeekFrom::Start(header.data_offset as u64))
        .and_then(|_| file.write_all(&vec![0u8; remaining]))
        .and_then(|_| file.flush())
        .map_err(|e| TraceError::io(path, e))?;

    // Dropping the file releases the lock.
    Ok(())
}
