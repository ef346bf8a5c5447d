// privscan/src/ui/output_format.rs
//! Status messages written to stderr (or any writer) with theme colours.
//!
//! Colour is only applied when the caller says the target supports it, so
//! piped output and test captures stay plain.

use owo_colors::OwoColorize;
use std::io::{self, Write};

use crate::ui::theme::{ThemeEntry, ThemeMap, color_for};

/// Paints `text` with the theme colour for `entry` when `supports_color`.
pub fn paint(text: &str, entry: ThemeEntry, theme: &ThemeMap, supports_color: bool) -> String {
    match color_for(theme, entry) {
        Some(color) if supports_color => text.color(color).to_string(),
        _ => text.to_string(),
    }
}

fn print_tagged<W: Write>(
    writer: &mut W,
    tag: &str,
    msg: &str,
    entry: ThemeEntry,
    theme: &ThemeMap,
    supports_color: bool,
) -> io::Result<()> {
    writeln!(writer, "{} {}", paint(tag, entry, theme, supports_color), msg)
}

pub fn print_info_message<W: Write>(writer: &mut W, msg: &str, theme: &ThemeMap, supports_color: bool) -> io::Result<()> {
    print_tagged(writer, "[info]", msg, ThemeEntry::Info, theme, supports_color)
}

pub fn print_success_message<W: Write>(writer: &mut W, msg: &str, theme: &ThemeMap, supports_color: bool) -> io::Result<()> {
    print_tagged(writer, "[ok]", msg, ThemeEntry::Success, theme, supports_color)
}

pub fn print_warn_message<W: Write>(writer: &mut W, msg: &str, theme: &ThemeMap, supports_color: bool) -> io::Result<()> {
    print_tagged(writer, "[warn]", msg, ThemeEntry::Warn, theme, supports_color)
}

pub fn print_error_message<W: Write>(writer: &mut W, msg: &str, theme: &ThemeMap, supports_color: bool) -> io::Result<()> {
    print_tagged(writer, "[error]", msg, ThemeEntry::Error, theme, supports_color)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::theme::default_theme_map;

    #[test]
    fn plain_when_color_unsupported() {
        let theme = default_theme_map();
        let mut buf = Vec::new();
        print_warn_message(&mut buf, "careful", &theme, false).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "[warn] careful\n");
    }

    #[test]
    fn colored_output_strips_to_plain() {
        let theme = default_theme_map();
        let mut buf = Vec::new();
        print_error_message(&mut buf, "boom", &theme, true).unwrap();
        let raw = String::from_utf8(buf).unwrap();
        assert!(raw.contains("\u{1b}["));
        assert!(raw.ends_with(" boom\n"));
    }
}
