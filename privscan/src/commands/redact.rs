// privscan/src/commands/redact.rs
//! `privscan redact`: write the input back out with every match masked.

use anyhow::{Context, Result};
use is_terminal::IsTerminal;
use log::{debug, info};
use std::fs;
use std::io::{self, Write};

use privscan_core::{DetectionEngine, Match, RuleEngine, RuleSet, redact_with_applied};

use crate::cli::RedactCommand;
use crate::commands::{AppContext, read_input};
use crate::ui::{diff_viewer, match_table};
use crate::utils::clipboard::copy_to_clipboard;
use crate::utils::rule_store;

/// The redacted text plus the matches that were actually masked.
#[derive(Debug, Clone)]
pub struct Redaction {
    pub text: String,
    pub applied: Vec<Match>,
}

/// Scans and masks `input` with `rule_set`.
pub fn redact(ctx: &AppContext, rule_set: RuleSet, input: &str) -> Result<Redaction> {
    let engine = RuleEngine::new(rule_set);
    let report = engine.scan(input);
    for w in &report.warnings {
        ctx.warn(format!("Rule '{}' (id {}) skipped: {}", w.rule_name, w.rule_id, w.message));
    }
    let (text, applied) = redact_with_applied(input, &report.matches, engine.rule_set())
        .context("Redaction failed")?;
    debug!(
        "Redacted {} match(es); input {} bytes, output {} bytes.",
        applied.len(),
        input.len(),
        text.len()
    );
    Ok(Redaction { text, applied })
}

pub fn run_redact(ctx: &AppContext, cmd: &RedactCommand) -> Result<()> {
    info!("Starting redaction.");
    let input = read_input(cmd.input_file.as_deref())?;
    let rule_set = rule_store::load(&ctx.rules_path)?;
    if !rule_set.enabled {
        ctx.warn("The checker is off; the input is written unchanged.");
    }
    let redaction = redact(ctx, rule_set, &input)?;

    match &cmd.output {
        Some(path) => {
            ctx.info(format!("Writing redacted content to file: {}", path.display()));
            let mut file = fs::File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            if cmd.diff {
                diff_viewer::print_diff(&input, &redaction.text, &mut file, &ctx.theme, false)?;
            } else {
                file.write_all(redaction.text.as_bytes())?;
            }
        }
        None => {
            let stdout = io::stdout();
            let supports_color = stdout.is_terminal();
            let mut writer = stdout.lock();
            if cmd.diff {
                diff_viewer::print_diff(&input, &redaction.text, &mut writer, &ctx.theme, supports_color)?;
            } else {
                writer.write_all(redaction.text.as_bytes())?;
            }
            writer.flush()?;
        }
    }

    if cmd.clipboard {
        match copy_to_clipboard(&redaction.text) {
            Ok(()) => ctx.success("Redacted content copied to clipboard."),
            Err(e) => ctx.warn(format!("Failed to copy to clipboard: {e}")),
        }
    }

    if !cmd.no_summary && !ctx.quiet {
        let stderr = io::stderr();
        let supports_color = stderr.is_terminal();
        match_table::print_summary(&redaction.applied, &mut stderr.lock(), &ctx.theme, supports_color)?;
    }
    info!("Redaction finished.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::theme::default_theme_map;
    use std::path::PathBuf;

    fn ctx() -> AppContext {
        AppContext {
            rules_path: PathBuf::from("unused.yaml"),
            theme: default_theme_map(),
            quiet: true,
        }
    }

    #[test]
    fn applied_matches_exclude_overlaps_and_unmasked_rules() -> Result<()> {
        let mut set = RuleSet::load_default_rules()?;
        set.set_masking(5, None)?;
        let r = redact(&ctx(), set, "secret = \"abc\" confidential")?;
        assert_eq!(r.text, "secret = \"***\" confidential");
        let names: Vec<&str> = r.applied.iter().map(|m| m.rule_name.as_str()).collect();
        assert_eq!(names, vec!["Secret Variable"]);
        Ok(())
    }

    #[test]
    fn disabled_checker_passes_text_through() -> Result<()> {
        let mut set = RuleSet::load_default_rules()?;
        set.enabled = false;
        let r = redact(&ctx(), set, "secret")?;
        assert_eq!(r.text, "secret");
        assert!(r.applied.is_empty());
        Ok(())
    }
}
