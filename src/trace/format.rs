//! Trace file format detection.
//!
//! Binary trace files start (after any number of leading bytes) with an
//! eight byte header:
//!
//! ```text
//! "SHIP"  bom:u16  version:u16
//! ```
//!
//! The byte-order mark is read little-endian: `0xFEFF` (or `1`, where legacy
//! little-endian v1 writers put their version) means little-endian, anything
//! else big-endian. The version is then read with that byte order; `0` and
//! `1` are both v1 because true v1 writers stored `0` there.

use super::error::HeaderError;

pub const MAGIC: &[u8; 4] = b"SHIP";
pub const HEADER_LEN: usize = 8;
pub const BOM: u16 = 0xFEFF;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ByteOrder {
    Little,
    #[default]
    Big,
}

impl ByteOrder {
    pub fn read_u16(self, bytes: [u8; 2]) -> u16 {
        match self {
            Self::Little => u16::from_le_bytes(bytes),
            Self::Big => u16::from_be_bytes(bytes),
        }
    }

    pub fn read_u32(self, bytes: &[u8; 4]) -> u32 {
        match self {
            Self::Little => u32::from_le_bytes(*bytes),
            Self::Big => u32::from_be_bytes(*bytes),
        }
    }

    pub fn u16_bytes(self, value: u16) -> [u8; 2] {
        match self {
            Self::Little => value.to_le_bytes(),
            Self::Big => value.to_be_bytes(),
        }
    }

    pub fn u32_bytes(self, value: u32) -> [u8; 4] {
        match self {
            Self::Little => value.to_le_bytes(),
            Self::Big => value.to_be_bytes(),
        }
    }
}

/// On-disk record schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaVersion {
    V1,
    V2,
}

impl SchemaVersion {
    pub fn record_size(self) -> usize {
        match self {
            Self::V1 => 24,
            Self::V2 => 32,
        }
    }
}

/// A validated binary header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub order: ByteOrder,
    pub version: SchemaVersion,
    /// Offset of the first record, just past the header.
    pub data_offset: usize,
}

/// How a file's contents should be decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceFormat {
    Binary(Header),
    Text,
}

/// Locate and validate the binary header.
pub fn detect_header(bytes: &[u8]) -> Result<Header, HeaderError> {
    let start = bytes
        .windows(MAGIC.len())
        .position(|window| window == MAGIC)
        .ok_or(HeaderError::MagicNotFound)?;

    let &[b0, b1, v0, v1, ..] = &bytes[start + MAGIC.len()..] else {
        return Err(HeaderError::Truncated);
    };

    let bom = u16::from_le_bytes([b0, b1]);
    let order = if bom == BOM || bom == 1 {
        ByteOrder::Little
    } else {
        ByteOrder::Big
    };

    let version = match order.read_u16([v0, v1]) {
        0 | 1 => SchemaVersion::V1,
        2 => SchemaVersion::V2,
        other => return Err(HeaderError::UnsupportedVersion(other)),
    };

    Ok(Header {
        order,
        version,
        data_offset: start + HEADER_LEN,
    })
}

/// Content sniffing: empty files and UTF-8 text without NUL bytes are text.
///
/// A file containing the `SHIP` magic with a valid header is always binary,
/// even when its bytes happen to be printable.
pub fn is_text(bytes: &[u8]) -> bool {
    if bytes.is_empty() {
        return true;
    }
    if detect_header(bytes).is_ok() {
        return false;
    }
    !bytes.contains(&0) && std::str::from_utf8(bytes).is_ok()
}

/// Classify file contents.
pub fn detect(bytes: &[u8]) -> Result<TraceFormat, HeaderError> {
    if is_text(bytes) {
        return Ok(TraceFormat::Text);
    }
    detect_header(bytes).map(TraceFormat::Binary)
}

/// Serialize a header in the given byte order.
pub fn encode_header(order: ByteOrder, version: SchemaVersion) -> [u8; HEADER_LEN] {
    let mut header = [0u8; HEADER_LEN];
    header[..4].copy_from_slice(MAGIC);
    header[4..6].copy_from_slice(&order.u16_bytes(BOM));
    let raw_version = match version {
        SchemaVersion::V1 => 1,
        SchemaVersion::V2 => 2,
    };
    header[6..8].copy_from_slice(&order.u16_bytes(raw_version));
    header
}
