// privscan/src/ui/rules_table.rs
//! `rules list` rendering.

use comfy_table::Cell;
use std::io::{self, Write};

use privscan_core::{MaskingMode, MaskingPolicy, Rule, RuleSet, RuleType};

use crate::ui::match_table::{new_table, styled};
use crate::ui::output_format::paint;
use crate::ui::theme::{ThemeEntry, ThemeMap};

/// Short human description of a masking policy, e.g. `keep 1 start`.
pub fn describe_masking(policy: Option<&MaskingPolicy>) -> String {
    let Some(p) = policy.filter(|p| p.enabled) else {
        return "off".to_string();
    };
    let token = p.mask_token();
    match p.mode {
        MaskingMode::VariableValue => format!("value -> {}", token.repeat(p.value_width())),
        MaskingMode::DirectText if p.preserve_format => format!("format ({token})"),
        MaskingMode::DirectText => {
            let mut parts = Vec::new();
            if p.preserve_start > 0 {
                parts.push(format!("keep {} start", p.preserve_start));
            }
            if p.preserve_end > 0 {
                parts.push(format!("keep {} end", p.preserve_end));
            }
            if p.preserve_length {
                parts.push("full length".to_string());
            }
            if parts.is_empty() {
                parts.push(token.repeat(3));
            }
            format!("{} ({token})", parts.join(", "))
        }
    }
}

fn type_label(rule: &Rule) -> String {
    match rule.rule_type {
        RuleType::String if rule.case_sensitive => "string (Aa)".to_string(),
        other => other.to_string(),
    }
}

pub fn print_rules_table<W: Write>(
    rule_set: &RuleSet,
    writer: &mut W,
    theme: &ThemeMap,
    supports_color: bool,
) -> io::Result<()> {
    let status = if rule_set.enabled { "on" } else { "off" };
    writeln!(
        writer,
        "{} (checker {}, next id {})",
        paint("Rules", ThemeEntry::Header, theme, supports_color),
        status,
        rule_set.next_rule_id
    )?;
    if rule_set.rules.is_empty() {
        writeln!(writer, "No rules defined.")?;
        return Ok(());
    }

    let mut table = new_table(supports_color);
    table.set_header(
        ["ID", "Name", "Type", "Pattern", "Active", "Masking"]
            .map(|h| styled(h, ThemeEntry::Header, theme)),
    );
    for rule in &rule_set.rules {
        let name = if rule.active {
            styled(&rule.name, ThemeEntry::SummaryRuleName, theme)
        } else {
            styled(&rule.name, ThemeEntry::RuleInactive, theme)
        };
        table.add_row(vec![
            Cell::new(rule.id),
            name,
            Cell::new(type_label(rule)),
            Cell::new(&rule.pattern),
            Cell::new(if rule.active { "yes" } else { "no" }),
            Cell::new(describe_masking(rule.masking.as_ref())),
        ]);
    }
    writeln!(writer, "{table}")
}
