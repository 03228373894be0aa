//! Presentation of a decoded trace.
//!
//! Every renderer returns the full output as a `String` (one `\n`-terminated
//! line per row) so the caller decides where it goes: stdout, or the pager.
//!
//! - [`csv`]: default, one row per message with queue time
//! - [`json`]: every event, names resolved
//! - [`uml`]: PlantUML sequence diagram
//! - [`summary`]: per-signal and per-mailbox counts
//! - [`text`]: raw records, no name lookup
//! - [`present`]: pretty-printer for JSON event files

pub mod csv;
pub mod json;
pub mod present;
pub mod summary;
pub mod text;
pub mod uml;

use crate::names::NameMap;
use crate::trace::{ByteOrder, Tag, Trace};

/// How `procId` / `connId` values are shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagDisplay {
    /// `\xHH` escapes of the raw bytes
    Escaped,
    /// The four bytes read as a u32; `-1` when the tag is not four bytes
    Number(ByteOrder),
}

impl Default for TagDisplay {
    fn default() -> Self {
        Self::Number(ByteOrder::Big)
    }
}

impl TagDisplay {
    pub fn number(self, tag: &Tag) -> i64 {
        let order = match self {
            Self::Number(order) => order,
            Self::Escaped => ByteOrder::Big,
        };
        tag.to_number(order)
            .and_then(|n| i64::try_from(n).ok())
            .unwrap_or(-1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, strum::Display, strum::EnumString)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[strum(serialize_all = "kebab-case")]
pub enum OutputFormat {
    #[default]
    Csv,
    Json,
    Uml,
    Summary,
    Text,
}

/// Name tables and tag display shared by the trace renderers.
#[derive(Debug, Clone, Copy)]
pub struct Renderer<'a> {
    pub signals: &'a NameMap,
    pub mailboxes: &'a NameMap,
    pub tags: TagDisplay,
}

impl<'a> Renderer<'a> {
    pub fn new(signals: &'a NameMap, mailboxes: &'a NameMap, tags: TagDisplay) -> Self {
        Self {
            signals,
            mailboxes,
            tags,
        }
    }

    pub fn render(&self, format: OutputFormat, trace: &Trace) -> String {
        match format {
            OutputFormat::Csv => csv::render(trace, self),
            OutputFormat::Json => json::render(trace, self),
            OutputFormat::Uml => uml::render(trace, self),
            OutputFormat::Summary => summary::render(trace, self),
            OutputFormat::Text => text::render(trace, self.tags),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_number() {
        let tag = Tag::Bytes([0x00, 0x00, 0x01, 0x02]);
        assert_eq!(TagDisplay::Number(ByteOrder::Big).number(&tag), 0x0102);
        assert_eq!(TagDisplay::Number(ByteOrder::Little).number(&tag), 0x0201_0000);
        assert_eq!(TagDisplay::default().number(&Tag::Empty), -1);
        assert_eq!(TagDisplay::default().number(&Tag::Number(7)), 7);
    }

    #[test]
    fn test_output_format_names() {
        assert_eq!(OutputFormat::Summary.to_string(), "summary");
        assert_eq!("uml".parse::<OutputFormat>().unwrap(), OutputFormat::Uml);
    }
}
