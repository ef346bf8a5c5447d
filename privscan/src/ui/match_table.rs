// privscan/src/ui/match_table.rs
//! Tabular rendering of scan results and the redaction summary.

use comfy_table::{Cell, ContentArrangement, Table, presets};
use std::collections::BTreeMap;
use std::io::{self, Write};

use privscan_core::{Match, Position};

use crate::ui::output_format::paint;
use crate::ui::theme::{ThemeEntry, ThemeMap, table_color_for};

/// One row of the scan table.
#[derive(Debug, Clone)]
pub struct MatchRow {
    pub rule_name: String,
    pub detected: String,
    pub position: Position,
    pub masked: Option<String>,
}

/// Makes control characters visible so a match cannot break the table.
fn single_line(s: &str) -> String {
    s.chars()
        .flat_map(|c| match c {
            '\n' | '\r' | '\t' => c.escape_default().collect::<Vec<_>>(),
            _ => vec![c],
        })
        .collect()
}

pub(crate) fn new_table(supports_color: bool) -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    if supports_color {
        table.enforce_styling();
    } else {
        table.force_no_tty();
    }
    table
}

pub(crate) fn styled(text: impl Into<String>, entry: ThemeEntry, theme: &ThemeMap) -> Cell {
    let cell = Cell::new(text.into());
    match table_color_for(theme, entry) {
        Some(color) => cell.fg(color),
        None => cell,
    }
}

/// Prints the detected matches, one row each, in text order.
pub fn print_match_table<W: Write>(
    rows: &[MatchRow],
    writer: &mut W,
    theme: &ThemeMap,
    supports_color: bool,
) -> io::Result<()> {
    if rows.is_empty() {
        writeln!(writer, "No sensitive data found.")?;
        return Ok(());
    }
    let show_masked = rows.iter().any(|r| r.masked.is_some());

    let mut table = new_table(supports_color);
    let mut header = vec![
        styled("Rule Name", ThemeEntry::Header, theme),
        styled("Detected Text", ThemeEntry::Header, theme),
        styled("Position", ThemeEntry::Header, theme),
    ];
    if show_masked {
        header.push(styled("Masked", ThemeEntry::Header, theme));
    }
    table.set_header(header);

    for row in rows {
        let mut cells = vec![
            styled(&row.rule_name, ThemeEntry::SummaryRuleName, theme),
            Cell::new(single_line(&row.detected)),
            styled(row.position.to_string(), ThemeEntry::SummaryOccurrences, theme),
        ];
        if show_masked {
            cells.push(styled(
                single_line(row.masked.as_deref().unwrap_or("")),
                ThemeEntry::RedactedText,
                theme,
            ));
        }
        table.add_row(cells);
    }
    writeln!(writer, "{table}")?;
    writeln!(
        writer,
        "{}",
        paint(&format!("{} match(es) found.", rows.len()), ThemeEntry::Warn, theme, supports_color)
    )?;
    Ok(())
}

/// Prints how many matches each rule contributed.
pub fn print_summary<W: Write>(
    matches: &[Match],
    writer: &mut W,
    theme: &ThemeMap,
    supports_color: bool,
) -> io::Result<()> {
    writeln!(writer, "{}", paint("Redaction Summary", ThemeEntry::Header, theme, supports_color))?;
    if matches.is_empty() {
        writeln!(writer, "No redactions applied.")?;
        return Ok(());
    }
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for m in matches {
        *counts.entry(m.rule_name.as_str()).or_default() += 1;
    }
    for (rule, count) in counts {
        writeln!(
            writer,
            "  {}: {} occurrence(s)",
            paint(rule, ThemeEntry::SummaryRuleName, theme, supports_color),
            paint(&count.to_string(), ThemeEntry::SummaryOccurrences, theme, supports_color)
        )?;
    }
    Ok(())
}
