//! Style constants and emojis for terminal output.
//!
//! Semantic mapping:
//! - Errors: red, bold for the emphasized span within an error message
//! - Warnings: yellow
//! - Hints: dimmed, bold for the emphasized span
//! - Info: unstyled, used for neutral status lines

use anstyle::{AnsiColor, Color, Style};

/// Error style (red) - use as `{ERROR}text{ERROR:#}`
pub const ERROR: Style = Style::new().fg_color(Some(Color::Ansi(AnsiColor::Red)));

/// Error style with emphasis (red + bold), for the specific name/path being complained about
pub const ERROR_BOLD: Style = Style::new()
    .bold()
    .fg_color(Some(Color::Ansi(AnsiColor::Red)));

/// Warning style (yellow) - use as `{WARNING}text{WARNING:#}`
pub const WARNING: Style = Style::new().fg_color(Some(Color::Ansi(AnsiColor::Yellow)));

/// Hint style (dimmed) - use as `{HINT}text{HINT:#}`
pub const HINT: Style = Style::new().dimmed();

/// Hint style with emphasis (dimmed + bold)
pub const HINT_BOLD: Style = Style::new().bold().dimmed();

/// Error emoji - use with ERROR style: `eprintln!("{ERROR_EMOJI} {ERROR}message{ERROR:#}");`
pub const ERROR_EMOJI: &str = "❌";

/// Warning emoji - use with WARNING style: `eprintln!("{WARNING_EMOJI} {WARNING}message{WARNING:#}");`
pub const WARNING_EMOJI: &str = "🟡";

/// Hint emoji - use with HINT style: `println!("{HINT_EMOJI} {HINT}message{HINT:#}");`
pub const HINT_EMOJI: &str = "💡";

/// Info emoji - use for neutral status (e.g. `subdir status` reports)
pub const INFO_EMOJI: &str = "⚪";
