//! Style constants, palettes and emojis for terminal output
//!
//! User-facing messages are built with `cformat!` tags:
//!
//! ```rust,ignore
//! use color_print::cformat;
//!
//! cformat!("<yellow>Signals may have been lost from input <bold>{path}</></>")
//! ```
//!
//! The `Style` constants are for `StyledLine` columns, where the style is
//! picked at runtime (per participant, per signal, per event name).

use anstyle::{AnsiColor, Color, Style};
use color_print::cformat;

const fn fg(color: AnsiColor) -> Style {
    Style::new().fg_color(Some(Color::Ansi(color)))
}

pub const BOLD: Style = Style::new().bold();

/// Rotating colors for participants and signal numbers, in first-seen order
pub const PALETTE: [Style; 9] = [
    fg(AnsiColor::BrightBlack),
    fg(AnsiColor::Blue),
    fg(AnsiColor::Magenta),
    fg(AnsiColor::Cyan),
    fg(AnsiColor::Red),
    fg(AnsiColor::Green),
    fg(AnsiColor::BrightYellow),
    fg(AnsiColor::BrightBlue),
    fg(AnsiColor::BrightMagenta),
];

// Event names, by suffix
pub const REQUEST: Style = fg(AnsiColor::BrightBlue);
pub const CONFIRM: Style = fg(AnsiColor::BrightGreen);
pub const REJECT: Style = fg(AnsiColor::BrightRed);
pub const INDICATION: Style = fg(AnsiColor::Yellow);
pub const OTHER_EVENT: Style = fg(AnsiColor::White);

// JSON payloads
pub const JSON_KEY: Style = fg(AnsiColor::Yellow);
pub const JSON_STRING: Style = fg(AnsiColor::BrightGreen);
pub const JSON_NUMBER: Style = fg(AnsiColor::BrightCyan);
pub const JSON_BOOL: Style = fg(AnsiColor::BrightBlue);
pub const JSON_NULL: Style = fg(AnsiColor::BrightRed);

// ============================================================================
// Message Emojis
// ============================================================================

pub const ERROR_EMOJI: &str = "❌";
pub const WARNING_EMOJI: &str = "🟡";
pub const INFO_EMOJI: &str = "⚪";

// ============================================================================
// Message Formatting Functions
// ============================================================================

/// Format an error message with emoji and red styling
pub fn error_message(content: impl AsRef<str>) -> String {
    cformat!("{ERROR_EMOJI} <red>{}</>", content.as_ref())
}

/// Format a warning message with emoji and yellow styling
pub fn warning_message(content: impl AsRef<str>) -> String {
    cformat!("{WARNING_EMOJI} <yellow>{}</>", content.as_ref())
}

/// Format an info message with emoji (no color - neutral status)
pub fn info_message(content: impl AsRef<str>) -> String {
    cformat!("{INFO_EMOJI} {}", content.as_ref())
}
