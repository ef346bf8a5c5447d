// privscan/src/commands/rules.rs
//! `privscan rules ...` and `privscan checker on|off`: rule store management.
//!
//! Every mutating command loads the store, applies one change and saves it
//! back. Nothing is written when the change is rejected.

use anyhow::{Context, Result};
use is_terminal::IsTerminal;
use std::fs;
use std::io::{self, Write};

use privscan_core::interchange::{export_rules, parse_rules};
use privscan_core::{MaskingPolicy, RuleDraft, RuleFormat, RuleSet, import_rules};

use crate::cli::{MaskCommand, RulesCommand, Toggle};
use crate::commands::{AppContext, CommandError};
use crate::ui::rules_table::{describe_masking, print_rules_table};
use crate::utils::rule_store;

pub fn run_rules(ctx: &AppContext, cmd: &RulesCommand) -> Result<()> {
    let mut set = rule_store::load(&ctx.rules_path)?;

    match cmd {
        RulesCommand::List { json } => {
            let stdout = io::stdout();
            let supports_color = stdout.is_terminal();
            let mut out = stdout.lock();
            if *json {
                writeln!(out, "{}", serde_json::to_string_pretty(&set)?)?;
            } else {
                print_rules_table(&set, &mut out, &ctx.theme, supports_color)?;
            }
            return Ok(());
        }
        RulesCommand::Add { name, rule_type, pattern, case_sensitive, description } => {
            let mut draft = RuleDraft::new(name.as_str(), (*rule_type).into(), pattern.as_str())
                .case_sensitive(*case_sensitive);
            if let Some(d) = description {
                draft = draft.description(d.as_str());
            }
            let id = set.add_rule(draft)?;
            rule_store::save(&set, &ctx.rules_path)?;
            ctx.success(format!("Added rule {id}."));
        }
        RulesCommand::Edit { id, name, rule_type, pattern, case_sensitive, description } => {
            let current = set
                .get(*id)
                .ok_or(privscan_core::PrivscanError::RuleNotFound(*id))?;
            let draft = RuleDraft {
                name: name.clone().unwrap_or_else(|| current.name.clone()),
                rule_type: rule_type.map(Into::into).unwrap_or(current.rule_type),
                pattern: pattern.clone().unwrap_or_else(|| current.pattern.clone()),
                case_sensitive: case_sensitive.unwrap_or(current.case_sensitive),
                description: match description.as_deref() {
                    Some(d) if d.trim().is_empty() => None,
                    Some(d) => Some(d.to_string()),
                    None => current.description.clone(),
                },
            };
            set.update_rule(*id, draft)?;
            rule_store::save(&set, &ctx.rules_path)?;
            ctx.success(format!("Updated rule {id}."));
        }
        RulesCommand::Delete { id } => {
            let removed = set.remove_rule(*id)?;
            rule_store::save(&set, &ctx.rules_path)?;
            ctx.success(format!("Deleted rule {} ('{}').", id, removed.name));
        }
        RulesCommand::Enable { id } | RulesCommand::Disable { id } => {
            let active = matches!(cmd, RulesCommand::Enable { .. });
            set.set_active(*id, active)?;
            rule_store::save(&set, &ctx.rules_path)?;
            let state = if active { "enabled" } else { "disabled" };
            ctx.success(format!("Rule {id} {state}."));
        }
        RulesCommand::Mask(mask) => {
            let policy = masking_policy(mask);
            set.set_masking(mask.id, policy.clone())?;
            rule_store::save(&set, &ctx.rules_path)?;
            ctx.success(format!(
                "Masking for rule {}: {}.",
                mask.id,
                describe_masking(policy.as_ref())
            ));
        }
        RulesCommand::Clear { yes } => {
            if !yes {
                return Err(CommandError::ConfirmationRequired("delete every rule").into());
            }
            let count = set.rules.len();
            set.clear();
            rule_store::save(&set, &ctx.rules_path)?;
            ctx.success(format!("Deleted {count} rule(s)."));
        }
        RulesCommand::Export { format, output } => {
            let format = format
                .map(RuleFormat::from)
                .or_else(|| output.as_deref().map(RuleFormat::from_path))
                .unwrap_or(RuleFormat::Tsv);
            let body = export_rules(&set.rules, format)?;
            match output {
                Some(path) => {
                    fs::write(path, format!("{body}\n"))
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    ctx.success(format!("Exported {} rule(s) to {}.", set.rules.len(), path.display()));
                }
                None => writeln!(io::stdout().lock(), "{body}")?,
            }
        }
        RulesCommand::Import { file, format } => {
            let format = format.map(RuleFormat::from).unwrap_or_else(|| RuleFormat::from_path(file));
            let input = fs::read_to_string(file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let imported = parse_rules(&input, format)
                .with_context(|| format!("Failed to parse {}", file.display()))?;
            let summary = import_rules(&mut set, imported);
            rule_store::save(&set, &ctx.rules_path)?;
            ctx.success(format!(
                "Imported {} rule(s); {} already present; {} invalid.",
                summary.added, summary.duplicates, summary.skipped
            ));
        }
        RulesCommand::Reset { yes } => {
            if !yes {
                return Err(CommandError::ConfirmationRequired("replace every rule").into());
            }
            let mut defaults = RuleSet::load_default_rules()?;
            defaults.next_rule_id = defaults.next_rule_id.max(set.next_rule_id);
            rule_store::save(&defaults, &ctx.rules_path)?;
            ctx.success("Rules reset to the built-in set.");
        }
    }
    Ok(())
}

fn masking_policy(cmd: &MaskCommand) -> Option<MaskingPolicy> {
    if cmd.off {
        return None;
    }
    Some(MaskingPolicy {
        enabled: true,
        mode: cmd.mode.into(),
        pattern: cmd.token.clone(),
        preserve_format: cmd.preserve_format,
        preserve_start: cmd.preserve_start,
        preserve_end: cmd.preserve_end,
        preserve_length: cmd.preserve_length,
        fixed_length: cmd.fixed_length,
    })
}

pub fn run_checker(ctx: &AppContext, state: Toggle) -> Result<()> {
    let mut set = rule_store::load(&ctx.rules_path)?;
    set.enabled = state == Toggle::On;
    rule_store::save(&set, &ctx.rules_path)?;
    ctx.success(if set.enabled { "Checker is on." } else { "Checker is off." });
    Ok(())
}
