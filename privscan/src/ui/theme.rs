// privscan/src/ui/theme.rs
//! Colour theme for terminal output.
//!
//! A theme maps logical output elements to one of the 16 named ANSI colours.
//! Users may supply a YAML file (`--theme`) overriding any subset of entries;
//! entries it leaves out keep their default colour.

use anyhow::{Context, Result};
use owo_colors::AnsiColors;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

pub type ThemeMap = HashMap<ThemeEntry, ThemeStyle>;

/// The parts of the output that can be styled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ThemeEntry {
    Header,
    Success,
    Info,
    Warn,
    Error,
    /// Masked replacement text shown in scan tables.
    RedactedText,
    DiffAdded,
    DiffRemoved,
    DiffHeader,
    /// Rule names in match tables and the redaction summary.
    SummaryRuleName,
    /// Counts and positions in match tables and summaries.
    SummaryOccurrences,
    /// Rules that are switched off in `rules list`.
    RuleInactive,
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
        ThemeEntry::SummaryRuleName,
        ThemeEntry::SummaryOccurrences,
        ThemeEntry::RuleInactive,
    ];
}

/// A named ANSI colour.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(try_from = "String", into = "String")]
pub struct ThemeColor(String);

#[derive(Debug, Clone)]
pub struct ParseThemeColorError(String);

impl fmt::Display for ParseThemeColorError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Invalid theme color '{}'; expected one of: black, red, green, yellow, blue, \
            magenta, cyan, white, or their bright variants (e.g. brightred).",
            self.0
        )
    }
}

impl std::error::Error for ParseThemeColorError {}

const COLOR_NAMES: [(&str, AnsiColors); 16] = [
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

impl FromStr for ThemeColor {
    type Err = ParseThemeColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        if COLOR_NAMES.iter().any(|(name, _)| *name == lower) {
            Ok(ThemeColor(lower))
        } else {
            Err(ParseThemeColorError(s.to_string()))
        }
    }
}

impl TryFrom<String> for ThemeColor {
    type Error = ParseThemeColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ThemeColor> for String {
    fn from(color: ThemeColor) -> Self {
        color.0
    }
}

impl ThemeColor {
    fn named(name: &str) -> Self {
        ThemeColor(name.to_string())
    }

    pub fn to_ansi_color(&self) -> AnsiColors {
        COLOR_NAMES
            .iter()
            .find(|(name, _)| *name == self.0)
            .map(|(_, c)| *c)
            .unwrap_or(AnsiColors::White)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ThemeStyle {
    pub fg: Option<ThemeColor>,
}

impl ThemeStyle {
    fn fg(name: &str) -> Self {
        ThemeStyle { fg: Some(ThemeColor::named(name)) }
    }
}

/// Loads a theme file, or the default theme when no path is given.
pub fn build_theme_map(theme_path: Option<&Path>) -> Result<ThemeMap> {
    match theme_path {
        Some(path) => load_from_file(path),
        None => Ok(default_theme_map()),
    }
}

/// Reads a YAML theme and fills unspecified entries from the default theme.
pub fn load_from_file(path: &Path) -> Result<ThemeMap> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read theme file {}", path.display()))?;
    let mut custom: ThemeMap = serde_yaml::from_str(&text)
        .with_context(|| format!("Failed to parse theme file {}", path.display()))?;
    for (entry, style) in default_theme_map() {
        custom.entry(entry).or_insert(style);
    }
    Ok(custom)
}

pub fn default_theme_map() -> ThemeMap {
    ThemeEntry::ALL
        .into_iter()
        .map(|entry| {
            let style = match entry {
                ThemeEntry::Header | ThemeEntry::DiffHeader => ThemeStyle::fg("cyan"),
                ThemeEntry::Success | ThemeEntry::DiffAdded => ThemeStyle::fg("green"),
                ThemeEntry::Warn => ThemeStyle::fg("yellow"),
                ThemeEntry::Error | ThemeEntry::DiffRemoved => ThemeStyle::fg("red"),
                ThemeEntry::RedactedText => ThemeStyle::fg("brightmagenta"),
                ThemeEntry::SummaryRuleName => ThemeStyle::fg("brightblue"),
                ThemeEntry::RuleInactive => ThemeStyle::fg("brightblack"),
                ThemeEntry::Info | ThemeEntry::SummaryOccurrences => ThemeStyle::fg("white"),
            };
            (entry, style)
        })
        .collect()
}

/// The foreground colour for `entry`, if the theme sets one.
pub fn color_for(theme: &ThemeMap, entry: ThemeEntry) -> Option<AnsiColors> {
    theme
        .get(&entry)
        .and_then(|s| s.fg.as_ref())
        .map(ThemeColor::to_ansi_color)
}

/// The same colour in comfy-table's palette, for table cells.
pub fn table_color_for(theme: &ThemeMap, entry: ThemeEntry) -> Option<comfy_table::Color> {
    use comfy_table::Color;
    color_for(theme, entry).map(|c| match c {
        AnsiColors::Black => Color::Black,
        AnsiColors::Red => Color::DarkRed,
        AnsiColors::Green => Color::DarkGreen,
        AnsiColors::Yellow => Color::DarkYellow,
        AnsiColors::Blue => Color::DarkBlue,
        AnsiColors::Magenta => Color::DarkMagenta,
        AnsiColors::Cyan => Color::DarkCyan,
        AnsiColors::White => Color::Grey,
        AnsiColors::BrightBlack => Color::DarkGrey,
        AnsiColors::BrightRed => Color::Red,
        AnsiColors::BrightGreen => Color::Green,
        AnsiColors::BrightYellow => Color::Yellow,
        AnsiColors::BrightBlue => Color::Blue,
        AnsiColors::BrightMagenta => Color::Magenta,
        AnsiColors::BrightCyan => Color::Cyan,
        AnsiColors::BrightWhite => Color::White,
        _ => Color::Reset,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parse_named_colors() {
        assert!("red".parse::<ThemeColor>().is_ok());
        assert!("BrightGreen".parse::<ThemeColor>().is_ok());
        assert!("unknown".parse::<ThemeColor>().is_err());
        let tc: ThemeColor = "brightmagenta".parse().unwrap();
        assert_eq!(tc.to_ansi_color(), AnsiColors::BrightMagenta);
    }

    #[test]
    fn default_theme_covers_every_entry() {
        let theme = default_theme_map();
        for entry in ThemeEntry::ALL {
            assert!(color_for(&theme, entry).is_some(), "{:?} has no colour", entry);
        }
    }

    #[test]
    fn partial_theme_file_is_merged() -> Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        writeln!(file, "error:\n  fg: blue")?;
        let theme = load_from_file(file.path())?;
        assert_eq!(color_for(&theme, ThemeEntry::Error), Some(AnsiColors::Blue));
        assert_eq!(color_for(&theme, ThemeEntry::Success), Some(AnsiColors::Green));
        Ok(())
    }

    #[test]
    fn bad_color_in_theme_file_is_an_error() -> Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        writeln!(file, "error:\n  fg: mauve")?;
        assert!(load_from_file(file.path()).is_err());
        Ok(())
    }
}
