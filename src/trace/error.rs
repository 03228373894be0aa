//! Trace decoding errors
//!
//! - **`TraceError`** - typed errors for a single trace file. Convert to
//!   `anyhow::Error` with `?` in the command layer; tests pattern-match them.
//! - **`HeaderError`** - why a binary header was rejected.

use std::path::PathBuf;

use crate::path::format_path_for_display;

/// Why a binary header was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum HeaderError {
    /// The `SHIP` magic never appeared before end of file
    #[error("SHIP magic not found")]
    MagicNotFound,

    /// The magic was found but the byte-order mark or version was cut off
    #[error("header truncated after SHIP magic")]
    Truncated,

    /// The version field holds a value other than 0, 1 or 2
    #[error("unsupported format version {0}")]
    UnsupportedVersion(u16),
}

/// Errors for decoding or clearing one trace file.
#[derive(Debug, thiserror::Error)]
pub enum TraceError {
    #[error("failed to read {}", format_path_for_display(path))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Fatal for this file; other files continue
    #[error("{} is not a valid ship file: {reason}", format_path_for_display(path))]
    InvalidHeader { path: PathBuf, reason: HeaderError },

    /// Trailing bytes shorter than one record. Decoding keeps every complete
    /// record before them, so this is reported rather than returned.
    #[error(
        "{} ends with {trailing} bytes, less than one {record_size}-byte record",
        format_path_for_display(path)
    )]
    TruncatedRecord {
        path: PathBuf,
        trailing: usize,
        record_size: usize,
    },

    /// Fatal for the file: a text line with a field that does not parse
    #[error("{}:{line}: {reason}", format_path_for_display(path))]
    MalformedTextLine {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    /// Refused to zero a file whose header does not validate
    #[error("refusing to clear {}: {reason}", format_path_for_display(path))]
    ClearOnInvalidFile { path: PathBuf, reason: HeaderError },
}

impl TraceError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether the error only concerns this file's format (the caller may
    /// skip the file and continue with the rest).
    pub fn is_invalid_header(&self) -> bool {
        matches!(self, Self::InvalidHeader { .. })
    }
}
