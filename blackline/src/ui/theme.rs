//! Terminal color theme.
//!
//! A theme maps each [`ThemeEntry`] (a kind of output line or fragment) to a
//! foreground color. Users can override any entry from a YAML file such as:
//!
//! ```yaml
//! error:
//!   fg: brightmagenta
//! redacted_text:
//!   fg: white
//! ```
//!
//! Entries missing from the file keep their default color.

use anyhow::{Context, Result};
use owo_colors::AnsiColors;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

pub type ThemeMap = HashMap<ThemeEntry, ThemeStyle>;

/// Styled parts of the CLI output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ThemeEntry {
    Header,
    Success,
    Info,
    Warn,
    Error,
    /// Marker glyphs when document text is echoed.
    RedactedText,
    DiffAdded,
    DiffRemoved,
    DiffHeader,
    /// Category labels in scan and redaction summaries.
    SummaryCategory,
    /// Counts next to a summary category.
    SummaryOccurrences,
    /// Session prompts, including the reset confirmation.
    Prompt,
}

impl ThemeEntry {
    pub const ALL: [ThemeEntry; 12] = [
        ThemeEntry::Header,
        ThemeEntry::Success,
        ThemeEntry::Info,
        ThemeEntry::Warn,
        ThemeEntry::Error,
        ThemeEntry::RedactedText,
        ThemeEntry::DiffAdded,
        ThemeEntry::DiffRemoved,
        ThemeEntry::DiffHeader,
        ThemeEntry::SummaryCategory,
        ThemeEntry::SummaryOccurrences,
        ThemeEntry::Prompt,
    ];

    fn default_color(self) -> AnsiColors {
        match self {
            ThemeEntry::Header => AnsiColors::BrightWhite,
            ThemeEntry::Success | ThemeEntry::DiffAdded => AnsiColors::Green,
            ThemeEntry::Info => AnsiColors::Cyan,
            ThemeEntry::Warn | ThemeEntry::DiffHeader => AnsiColors::Yellow,
            ThemeEntry::Error | ThemeEntry::DiffRemoved => AnsiColors::Red,
            ThemeEntry::RedactedText => AnsiColors::BrightBlack,
            ThemeEntry::SummaryCategory => AnsiColors::Magenta,
            ThemeEntry::SummaryOccurrences => AnsiColors::White,
            ThemeEntry::Prompt => AnsiColors::BrightYellow,
        }
    }
}

/// The 16 ANSI colors a theme file may name.
const NAMED_COLORS: [(&str, AnsiColors); 16] = [
    ("black", AnsiColors::Black),
    ("red", AnsiColors::Red),
    ("green", AnsiColors::Green),
    ("yellow", AnsiColors::Yellow),
    ("blue", AnsiColors::Blue),
    ("magenta", AnsiColors::Magenta),
    ("cyan", AnsiColors::Cyan),
    ("white", AnsiColors::White),
    ("brightblack", AnsiColors::BrightBlack),
    ("brightred", AnsiColors::BrightRed),
    ("brightgreen", AnsiColors::BrightGreen),
    ("brightyellow", AnsiColors::BrightYellow),
    ("brightblue", AnsiColors::BrightBlue),
    ("brightmagenta", AnsiColors::BrightMagenta),
    ("brightcyan", AnsiColors::BrightCyan),
    ("brightwhite", AnsiColors::BrightWhite),
];

#[derive(Debug, Clone, Error)]
#[error("unknown theme color '{0}'; use one of the 16 ANSI names, e.g. red or brightcyan")]
pub struct ParseThemeColorError(String);

/// A named ANSI color, stored and written by its lower-case name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(try_from = "String", into = "String")]
pub struct ThemeColor(AnsiColors);

impl ThemeColor {
    pub fn ansi(self) -> AnsiColors {
        self.0
    }
}

impl FromStr for ThemeColor {
    type Err = ParseThemeColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NAMED_COLORS
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(s.trim()))
            .map(|(_, color)| ThemeColor(*color))
            .ok_or_else(|| ParseThemeColorError(s.to_string()))
    }
}

impl TryFrom<String> for ThemeColor {
    type Error = ParseThemeColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for ThemeColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = NAMED_COLORS
            .iter()
            .find(|(_, color)| *color == self.0)
            .map_or("white", |(name, _)| name);
        f.write_str(name)
    }
}

impl From<ThemeColor> for String {
    fn from(color: ThemeColor) -> Self {
        color.to_string()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ThemeStyle {
    pub fg: Option<ThemeColor>,
}

/// The theme from `--theme`, or the built-in one.
pub fn build_theme_map(theme_path: Option<&PathBuf>) -> Result<ThemeMap> {
    match theme_path {
        Some(path) => ThemeStyle::load_from_file(path),
        None => Ok(ThemeStyle::default_theme_map()),
    }
}

pub fn color_for(entry: ThemeEntry, theme_map: &ThemeMap) -> Option<AnsiColors> {
    theme_map
        .get(&entry)
        .and_then(|style| style.fg)
        .map(ThemeColor::ansi)
}

impl ThemeStyle {
    /// Reads a YAML theme; entries it leaves out keep their default colors.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<ThemeMap> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read theme file {}", path.display()))?;
        let overrides: ThemeMap = serde_yaml::from_str(&text)
            .with_context(|| format!("Failed to parse theme file {}", path.display()))?;

        let mut theme = Self::default_theme_map();
        theme.extend(overrides);
        Ok(theme)
    }

    pub fn default_theme_map() -> ThemeMap {
        ThemeEntry::ALL
            .iter()
            .map(|entry| (*entry, ThemeStyle { fg: Some(ThemeColor(entry.default_color())) }))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn color_names_are_case_insensitive() {
        assert_eq!("BrightGreen".parse::<ThemeColor>().unwrap().ansi(), AnsiColors::BrightGreen);
        let err = "orange".parse::<ThemeColor>().unwrap_err();
        assert!(err.to_string().contains("'orange'"));
    }

    #[test]
    fn colors_serialize_by_name() {
        let style = ThemeStyle { fg: Some("cyan".parse().unwrap()) };
        assert_eq!(serde_yaml::to_string(&style).unwrap().trim(), "fg: cyan");
    }

    #[test]
    fn default_theme_covers_every_entry() {
        let theme = ThemeStyle::default_theme_map();
        for entry in ThemeEntry::ALL {
            assert!(color_for(entry, &theme).is_some(), "{:?} has no color", entry);
        }
    }

    #[test]
    fn theme_file_overrides_and_falls_back() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "error:\n  fg: brightmagenta").unwrap();
        let theme = ThemeStyle::load_from_file(file.path()).unwrap();
        assert_eq!(color_for(ThemeEntry::Error, &theme), Some(AnsiColors::BrightMagenta));
        assert_eq!(color_for(ThemeEntry::Success, &theme), Some(AnsiColors::Green));
    }

    #[test]
    fn theme_file_with_unknown_color_is_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "info:\n  fg: orange").unwrap();
        assert!(ThemeStyle::load_from_file(file.path()).is_err());
    }
}
