//! compiler.rs - Turns rules into ready-to-run matchers.
//!
//! Every rule type compiles to a `regex::Regex`: `regex` and `variable`
//! rules use their pattern directly, `string` rules use the escaped literal
//! (case-insensitive unless the rule asks otherwise). A rule that fails to
//! compile is reported as a `RuleWarning` and left out; it never aborts the
//! compilation of the others.
//!
//! License: MIT OR APACHE 2.0

use log::{debug, warn};
use regex::{Regex, RegexBuilder};

use crate::config::{Rule, RuleSet, RuleType, MAX_PATTERN_LENGTH};
use crate::errors::PrivscanError;
use crate::redaction_match::RuleWarning;

/// Upper bound on the compiled size of a single rule.
const REGEX_SIZE_LIMIT: usize = 10 * (1 << 20);

/// Capture group indices that locate the name and value of an assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssignmentGroups {
    pub name: usize,
    pub value: usize,
}

/// Represents a single compiled rule.
#[derive(Debug)]
pub struct CompiledRule {
    pub rule_id: u32,
    pub name: String,
    pub rule_type: RuleType,
    pub regex: Regex,
    /// Present when the pattern exposes `name`/`value` captures.
    pub assignment_groups: Option<AssignmentGroups>,
}

/// The compiled form of a rule set's active rules, in rule order.
#[derive(Debug, Default)]
pub struct CompiledRules {
    pub rules: Vec<CompiledRule>,
    /// Rules that were active but could not be compiled.
    pub warnings: Vec<RuleWarning>,
}

fn build_regex(rule_name: &str, source: &str, case_insensitive: bool) -> Result<Regex, PrivscanError> {
    RegexBuilder::new(source)
        .case_insensitive(case_insensitive)
        .size_limit(REGEX_SIZE_LIMIT)
        .build()
        .map_err(|e| PrivscanError::InvalidPattern(rule_name.to_string(), e))
}

/// Checks that a pattern is usable for the given rule type.
pub fn validate_pattern(rule_name: &str, rule_type: RuleType, pattern: &str) -> Result<(), PrivscanError> {
    if pattern.is_empty() {
        return Err(PrivscanError::EmptyPattern(rule_name.to_string()));
    }
    if rule_type.is_pattern() {
        if pattern.len() > MAX_PATTERN_LENGTH {
            return Err(PrivscanError::PatternLengthExceeded(
                rule_name.to_string(),
                pattern.len(),
                MAX_PATTERN_LENGTH,
            ));
        }
        build_regex(rule_name, pattern, false)?;
    }
    Ok(())
}

/// Finds the name/value captures of a pattern: named groups `name` and
/// `value` win, otherwise the first two positional groups.
pub fn assignment_groups(regex: &Regex) -> Option<AssignmentGroups> {
    let mut name = None;
    let mut value = None;
    for (i, group) in regex.capture_names().enumerate() {
        match group {
            Some("name") => name = Some(i),
            Some("value") => value = Some(i),
            _ => {}
        }
    }
    match (name, value) {
        (Some(name), Some(value)) => Some(AssignmentGroups { name, value }),
        _ if regex.captures_len() >= 3 => Some(AssignmentGroups { name: 1, value: 2 }),
        _ => None,
    }
}

/// Compiles one rule.
pub fn compile_rule(rule: &Rule) -> Result<CompiledRule, PrivscanError> {
    validate_pattern(&rule.name, rule.rule_type, &rule.pattern)?;
    let (regex, assignment) = match rule.rule_type {
        RuleType::Regex | RuleType::Variable => {
            let regex = build_regex(&rule.name, &rule.pattern, false)?;
            let groups = assignment_groups(&regex);
            (regex, groups)
        }
        RuleType::String => {
            let source = regex::escape(&rule.pattern);
            (build_regex(&rule.name, &source, !rule.case_sensitive)?, None)
        }
    };
    Ok(CompiledRule {
        rule_id: rule.id,
        name: rule.name.clone(),
        rule_type: rule.rule_type,
        regex,
        assignment_groups: assignment,
    })
}

/// Compiles every active rule of the set. Failures become warnings.
pub fn compile_rules(rule_set: &RuleSet) -> CompiledRules {
    debug!("Starting compilation of {} rules.", rule_set.rules.len());
    let mut compiled = CompiledRules::default();

    for rule in rule_set.active_rules() {
        match compile_rule(rule) {
            Ok(c) => {
                log::debug!(
                    target: "privscan_core::sanitizer",
                    "Rule '{}' compiled successfully.",
                    &rule.name
                );
                compiled.rules.push(c);
            }
            Err(e) => {
                warn!("Skipping rule '{}' (id {}): {}", rule.name, rule.id, e);
                compiled.warnings.push(RuleWarning {
                    rule_id: rule.id,
                    rule_name: rule.name.clone(),
                    message: e.to_string(),
                });
            }
        }
    }

    debug!(
        "Finished compiling rules. Total compiled: {}, skipped: {}.",
        compiled.rules.len(),
        compiled.warnings.len()
    );
    compiled
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RuleDraft;

    #[test]
    fn positional_groups_are_used_without_names() {
        let re = Regex::new(r#"(password)\s*=\s*["']([^"']+)["']"#).unwrap();
        assert_eq!(assignment_groups(&re), Some(AssignmentGroups { name: 1, value: 2 }));
    }

    #[test]
    fn named_groups_take_precedence() {
        let re = Regex::new(r#"(export )?(?P<name>\w+)=(?P<value>\S+)"#).unwrap();
        assert_eq!(assignment_groups(&re), Some(AssignmentGroups { name: 2, value: 3 }));
    }

    #[test]
    fn plain_pattern_has_no_assignment() {
        let re = Regex::new(r"\d{4}").unwrap();
        assert_eq!(assignment_groups(&re), None);
    }

    #[test]
    fn string_rules_compile_as_literals() {
        let mut set = RuleSet::default();
        set.add_rule(RuleDraft::new("dots", RuleType::String, "a.b(")).unwrap();
        let compiled = compile_rules(&set);
        assert!(compiled.warnings.is_empty());
        assert!(compiled.rules[0].regex.is_match("x A.B( y"));
        assert!(!compiled.rules[0].regex.is_match("axb("));
    }

    #[test]
    fn broken_rules_become_warnings() {
        let mut set = RuleSet::default();
        set.add_rule(RuleDraft::new("ok", RuleType::Regex, "ok")).unwrap();
        set.rules.push(Rule {
            id: 9,
            rule_type: RuleType::Regex,
            pattern: "(".to_string(),
            name: "broken".to_string(),
            active: true,
            case_sensitive: false,
            description: None,
            masking: None,
        });
        let compiled = compile_rules(&set);
        assert_eq!(compiled.rules.len(), 1);
        assert_eq!(compiled.warnings.len(), 1);
        assert_eq!(compiled.warnings[0].rule_id, 9);
    }

    #[test]
    fn overlong_patterns_are_rejected() {
        let pattern = "a".repeat(MAX_PATTERN_LENGTH + 1);
        assert!(matches!(
            validate_pattern("long", RuleType::Regex, &pattern),
            Err(PrivscanError::PatternLengthExceeded(_, _, _))
        ));
        assert!(validate_pattern("long", RuleType::String, &pattern).is_ok());
    }
}
