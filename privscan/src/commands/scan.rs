// privscan/src/commands/scan.rs
//! `privscan scan`: report sensitive matches with their positions.
//!
//! In `--follow` mode stdin is read line by line; after each line the
//! accumulated text is rescanned through a `ScanSession` and a report is
//! printed only when the match set changed.

use anyhow::{Context, Result};
use is_terminal::IsTerminal;
use log::{debug, info};
use serde::Serialize;
use std::io::{self, BufRead, Write};

use privscan_core::{DetectionEngine, Match, RuleEngine, RuleSet, RuleWarning, ScanSession, locate};

use crate::cli::ScanCommand;
use crate::commands::{AppContext, CommandError, read_input};
use crate::ui::match_table::{MatchRow, print_match_table};
use crate::utils::rule_store;

/// JSON form of one match, with its display position.
///
/// `index` and `length` are UTF-8 byte offsets into the scanned text.
/// `line` and `column` are 1-based and `column` counts characters.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRecord<'a> {
    pub rule_id: u32,
    pub rule_name: &'a str,
    pub matched_text: &'a str,
    pub index: usize,
    pub length: usize,
    pub line: usize,
    pub column: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub masked: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ScanOutput<'a> {
    pub matches: Vec<MatchRecord<'a>>,
    pub warnings: &'a [RuleWarning],
}

/// Options that shape a report, independent of where the text came from.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportOptions {
    pub json: bool,
    pub masked: bool,
    pub supports_color: bool,
}

pub fn run_scan(ctx: &AppContext, cmd: &ScanCommand) -> Result<()> {
    let rule_set = rule_store::load(&ctx.rules_path)?;
    if !rule_set.enabled {
        ctx.warn("The checker is off; nothing will be reported. Run `privscan checker on` to enable it.");
    }
    let opts = ReportOptions {
        json: cmd.json,
        masked: cmd.masked,
        supports_color: io::stdout().is_terminal(),
    };

    let found = if cmd.follow {
        let stdin = io::stdin();
        follow(ctx, rule_set, stdin.lock(), &mut io::stdout().lock(), opts)?
    } else {
        let text = read_input(cmd.input_file.as_deref())?;
        let engine = RuleEngine::new(rule_set);
        let report = engine.scan(&text);
        for w in &report.warnings {
            ctx.warn(format!("Rule '{}' (id {}) skipped: {}", w.rule_name, w.rule_id, w.message));
        }
        write_report(ctx, &engine, &text, &report.matches, &report.warnings, &mut io::stdout().lock(), opts)?;
        report.matches.len()
    };

    info!("Scan finished with {} match(es).", found);
    if cmd.fail_on_match && found > 0 {
        return Err(CommandError::MatchesFound(found).into());
    }
    Ok(())
}

/// Rescans the growing input after every line, printing a report whenever
/// the matches change. Returns the number of matches in the final text.
pub fn follow<R: BufRead, W: Write>(
    ctx: &AppContext,
    rule_set: RuleSet,
    reader: R,
    writer: &mut W,
    opts: ReportOptions,
) -> Result<usize> {
    let mut session = ScanSession::new(rule_set)?;
    let mut text = String::new();
    let mut warned = false;
    let mut reported = false;

    for (n, line) in reader.lines().enumerate() {
        let line = line.context("Failed to read from stdin")?;
        text.push_str(&line);
        text.push('\n');

        let update = session.update(&text);
        if !warned {
            for w in &update.report.warnings {
                ctx.warn(format!("Rule '{}' (id {}) skipped: {}", w.rule_name, w.rule_id, w.message));
            }
            warned = true;
        }
        if !update.changed {
            continue;
        }
        debug!("Matches changed after line {}.", n + 1);
        if !opts.json {
            writeln!(writer, "After line {}:", n + 1)?;
        }
        // Warnings go out with the first report only.
        let warnings: &[RuleWarning] = if reported { &[] } else { &update.report.warnings };
        write_report(ctx, session.engine(), &text, &update.report.matches, warnings, writer, opts)?;
        reported = true;
        writer.flush()?;
    }
    Ok(session.last_matches().len())
}

fn write_report<W: Write>(
    ctx: &AppContext,
    engine: &dyn DetectionEngine,
    text: &str,
    matches: &[Match],
    warnings: &[RuleWarning],
    writer: &mut W,
    opts: ReportOptions,
) -> Result<()> {
    let masked_form = |m: &Match| -> Option<String> {
        if !opts.masked {
            return None;
        }
        match engine.mask_match(m) {
            Ok(masked) => Some(masked),
            Err(e) => {
                ctx.warn(format!("Could not mask match of '{}': {}", m.rule_name, e));
                Some("[unmaskable]".to_string())
            }
        }
    };

    if opts.json {
        let mut records = Vec::with_capacity(matches.len());
        for m in matches {
            let pos = locate(text, m.index)?;
            records.push(MatchRecord {
                rule_id: m.rule_id,
                rule_name: &m.rule_name,
                matched_text: &m.matched_text,
                index: m.index,
                length: m.length,
                line: pos.line,
                column: pos.column,
                masked: masked_form(m),
            });
        }
        let output = ScanOutput { matches: records, warnings };
        let body = if opts.supports_color {
            serde_json::to_string_pretty(&output)?
        } else {
            serde_json::to_string(&output)?
        };
        writeln!(writer, "{body}")?;
        return Ok(());
    }

    let mut rows = Vec::with_capacity(matches.len());
    for m in matches {
        rows.push(MatchRow {
            rule_name: m.rule_name.clone(),
            detected: m.matched_text.clone(),
            position: locate(text, m.index)?,
            masked: masked_form(m),
        });
    }
    print_match_table(&rows, writer, &ctx.theme, opts.supports_color)?;
    Ok(())
}
