//! Themed message helpers shared by every command.
//!
//! All helpers take an explicit writer and a `supports_color` flag so that
//! output can be captured in tests and kept plain when not writing to a terminal.

use owo_colors::OwoColorize;
use std::io::{self, Write};

use blackline_core::{Severity, StatusMessage};

use crate::ui::theme::{color_for, ThemeEntry, ThemeMap};

/// Applies the theme color of `entry` to `text` when color is enabled.
pub fn paint(text: &str, entry: ThemeEntry, theme_map: &ThemeMap, supports_color: bool) -> String {
    match color_for(entry, theme_map) {
        Some(color) if supports_color => text.color(color).to_string(),
        _ => text.to_string(),
    }
}

fn print_tagged<W: Write>(
    writer: &mut W,
    tag: &str,
    msg: &str,
    entry: ThemeEntry,
    theme_map: &ThemeMap,
    supports_color: bool,
) -> io::Result<()> {
    writeln!(writer, "{} {}", paint(tag, entry, theme_map, supports_color), msg)
}

pub fn print_info_message<W: Write>(writer: &mut W, msg: &str, theme_map: &ThemeMap, supports_color: bool) -> io::Result<()> {
    print_tagged(writer, "[info]", msg, ThemeEntry::Info, theme_map, supports_color)
}

pub fn print_success_message<W: Write>(writer: &mut W, msg: &str, theme_map: &ThemeMap, supports_color: bool) -> io::Result<()> {
    print_tagged(writer, "[ok]", msg, ThemeEntry::Success, theme_map, supports_color)
}

pub fn print_warn_message<W: Write>(writer: &mut W, msg: &str, theme_map: &ThemeMap, supports_color: bool) -> io::Result<()> {
    print_tagged(writer, "[warn]", msg, ThemeEntry::Warn, theme_map, supports_color)
}

pub fn print_error_message<W: Write>(writer: &mut W, msg: &str, theme_map: &ThemeMap, supports_color: bool) -> io::Result<()> {
    print_tagged(writer, "[error]", msg, ThemeEntry::Error, theme_map, supports_color)
}

/// Prints a status message with the helper matching its severity.
pub fn print_status<W: Write>(writer: &mut W, status: &StatusMessage, theme_map: &ThemeMap, supports_color: bool) -> io::Result<()> {
    match status.severity {
        Severity::Info => print_info_message(writer, &status.text, theme_map, supports_color),
        Severity::Success => print_success_message(writer, &status.text, theme_map, supports_color),
        Severity::Error => print_error_message(writer, &status.text, theme_map, supports_color),
    }
}
