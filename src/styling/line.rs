//! Styled line and string types for column output.
//!
//! Widths are computed on the unstyled text, so padding a styled cell lines
//! up with plain ones.

use anstyle::Style;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Shorten `text` to at most `max_width` columns, ending in `...` when cut.
pub fn truncate_with_ellipsis(text: &str, max_width: usize) -> String {
    const ELLIPSIS: &str = "...";
    if text.width() <= max_width {
        return text.to_owned();
    }

    let budget = max_width.saturating_sub(ELLIPSIS.len());
    let mut width = 0;
    let mut out = String::new();
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if width + w > budget {
            break;
        }
        width += w;
        out.push(ch);
    }
    out.push_str(ELLIPSIS);
    out
}

/// A piece of text with an optional style
#[derive(Clone, Debug)]
pub struct StyledString {
    pub text: String,
    pub style: Option<Style>,
}

impl StyledString {
    fn new(text: impl Into<String>, style: Option<Style>) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }

    pub fn raw(text: impl Into<String>) -> Self {
        Self::new(text, None)
    }

    pub fn styled(text: impl Into<String>, style: Style) -> Self {
        Self::new(text, Some(style))
    }

    pub fn width(&self) -> usize {
        self.text.width()
    }

    /// Renders to a string with ANSI escape codes
    pub fn render(&self) -> String {
        match &self.style {
            Some(style) => format!("{}{}{}", style.render(), self.text, style.render_reset()),
            None => self.text.clone(),
        }
    }
}

/// A line composed of multiple styled strings
#[derive(Clone, Debug, Default)]
pub struct StyledLine {
    pub segments: Vec<StyledString>,
}

impl StyledLine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_raw(&mut self, text: impl Into<String>) {
        self.segments.push(StyledString::raw(text));
    }

    pub fn push_styled(&mut self, text: impl Into<String>, style: Style) {
        self.segments.push(StyledString::styled(text, style));
    }

    /// Push `text` in `style`, padded to `width` columns, then a two-space gap.
    ///
    /// The padding is styled too, so a background or bold carries across the
    /// whole cell.
    pub fn push_cell(&mut self, text: &str, width: usize, style: Style) {
        let padding = width.saturating_sub(text.width());
        self.push_styled(format!("{text}{}  ", " ".repeat(padding)), style);
    }

    pub fn width(&self) -> usize {
        self.segments.iter().map(|s| s.width()).sum()
    }

    /// Renders the entire line with ANSI escape codes
    pub fn render(&self) -> String {
        self.segments.iter().map(|s| s.render()).collect()
    }

    /// Returns the plain text without any styling
    pub fn plain_text(&self) -> String {
        self.segments.iter().map(|s| s.text.as_str()).collect()
    }
}
