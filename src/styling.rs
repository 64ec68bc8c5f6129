//! Consolidated styling module for terminal output.
//!
//! Uses the anstyle ecosystem:
//! - anstream for auto-detecting color support
//! - anstyle for composable styling

mod constants;

pub use constants::*;

use anstyle::Style;
use unicode_width::UnicodeWidthStr;

/// Auto-detecting println that respects NO_COLOR, CLICOLOR_FORCE, and terminal capabilities
pub use anstream::println;
/// Auto-detecting eprintln that respects NO_COLOR, CLICOLOR_FORCE, and terminal capabilities
pub use anstream::eprintln;

/// A piece of text with an optional style
#[derive(Clone, Debug)]
pub struct StyledString {
    pub text: String,
    pub style: Option<Style>,
}

impl StyledString {
    pub fn new(text: impl Into<String>, style: Option<Style>) -> Self {
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

    /// Returns the visual width (unicode-aware, no ANSI codes)
    pub fn width(&self) -> usize {
        self.text.width()
    }

    /// Renders to a string with ANSI escape codes
    pub fn render(&self) -> String {
        if let Some(style) = &self.style {
            format!("{}{}{}", style.render(), self.text, style.render_reset())
        } else {
            self.text.clone()
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

    pub fn push(&mut self, segment: StyledString) {
        self.segments.push(segment);
    }

    pub fn width(&self) -> usize {
        self.segments.iter().map(|s| s.width()).sum()
    }

    pub fn render(&self) -> String {
        self.segments.iter().map(|s| s.render()).collect()
    }
}

/// Format a block of quoted content (git plumbing stderr/stdout) with a left
/// gutter, the way error diagnostics present raw VCS output to the user.
///
/// `label` prefixes the gutter (often empty); `width` caps line length before
/// wrapping, `None` meaning "don't wrap".
pub fn format_with_gutter(content: &str, label: &str, width: Option<usize>) -> String {
    let gutter = if label.is_empty() { "  │ " } else { label };
    content
        .lines()
        .map(|line| {
            let line = match width {
                Some(w) if line.width() > w => {
                    let mut truncated: String = line.chars().take(w.saturating_sub(1)).collect();
                    truncated.push('…');
                    truncated
                }
                _ => line.to_string(),
            };
            format!("{gutter}{line}\n")
        })
        .collect()
}
