// privscan/src/ui/diff_viewer.rs
//! Unified line diff between the original and the redacted text.

use diffy::{Line as DiffLine, create_patch};
use std::io::{self, Write};

use crate::ui::output_format::paint;
use crate::ui::theme::{ThemeEntry, ThemeMap};

/// Writes the changed lines of `original` -> `redacted` as `-`/`+` pairs
/// with their surrounding context.
pub fn print_diff<W: Write>(
    original: &str,
    redacted: &str,
    writer: &mut W,
    theme: &ThemeMap,
    supports_color: bool,
) -> io::Result<()> {
    let patch = create_patch(original, redacted);
    writeln!(writer, "{}", paint("--- Diff View ---", ThemeEntry::DiffHeader, theme, supports_color))?;

    let mut changed = false;
    for hunk in patch.hunks() {
        for line in hunk.lines() {
            match line {
                DiffLine::Delete(s) => {
                    changed = true;
                    let text = format!("-{}", s.trim_end_matches('\n'));
                    writeln!(writer, "{}", paint(&text, ThemeEntry::DiffRemoved, theme, supports_color))?;
                }
                DiffLine::Insert(s) => {
                    changed = true;
                    let text = format!("+{}", s.trim_end_matches('\n'));
                    writeln!(writer, "{}", paint(&text, ThemeEntry::DiffAdded, theme, supports_color))?;
                }
                DiffLine::Context(s) => {
                    writeln!(writer, " {}", s.trim_end_matches('\n'))?;
                }
            }
        }
    }
    if !changed {
        writeln!(writer, "No changes.")?;
    }
    writeln!(writer, "{}", paint("-----------------", ThemeEntry::DiffHeader, theme, supports_color))?;
    Ok(())
}
