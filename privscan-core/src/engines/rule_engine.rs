// privscan-core/src/engines/rule_engine.rs
//! The rule matcher: runs a rule set over a text and returns the matches in
//! position order.
//!
//! `regex` and `variable` rules advance past each match (a zero-width match
//! still advances one character), so their matches never overlap. `string`
//! rules restart one character after the previous hit's start, so repeated
//! keywords are reported densely: `"aa"` in `"aaa"` is found at 0 and at 1.
//! License: MIT OR APACHE 2.0

use log::debug;

use crate::config::{RuleSet, RuleType};
use crate::engine::DetectionEngine;
use crate::errors::PrivscanError;
use crate::masking;
use crate::redaction_match::{log_captured_match_debug, Assignment, Match, ScanReport, Span};
use crate::sanitizers::compiler::{compile_rules, CompiledRule, CompiledRules};

/// Byte length of the character starting at `pos`, if any.
fn next_char_len(text: &str, pos: usize) -> Option<usize> {
    text[pos..].chars().next().map(char::len_utf8)
}

fn record(rule: &CompiledRule, text: &str, start: usize, end: usize, assignment: Option<Assignment>) -> Match {
    let matched = &text[start..end];
    log_captured_match_debug(module_path!(), &rule.name, start, matched);
    Match {
        rule_id: rule.rule_id,
        rule_name: rule.name.clone(),
        matched_text: matched.to_string(),
        index: start,
        length: end - start,
        assignment,
    }
}

fn scan_pattern(text: &str, rule: &CompiledRule, out: &mut Vec<Match>) {
    let mut pos = 0;
    while pos <= text.len() {
        let Some(caps) = rule.regex.captures_at(text, pos) else { break };
        let Some(whole) = caps.get(0) else { break };

        let assignment = rule.assignment_groups.and_then(|groups| {
            let name = caps.get(groups.name)?;
            let value = caps.get(groups.value)?;
            let base = whole.start();
            Some(Assignment {
                name: Span::new(name.start() - base, name.end() - base),
                value: Span::new(value.start() - base, value.end() - base),
            })
        });
        out.push(record(rule, text, whole.start(), whole.end(), assignment));

        pos = if whole.is_empty() {
            match next_char_len(text, whole.start()) {
                Some(step) => whole.start() + step,
                None => break,
            }
        } else {
            whole.end()
        };
    }
}

fn scan_literal(text: &str, rule: &CompiledRule, out: &mut Vec<Match>) {
    let mut pos = 0;
    while let Some(found) = rule.regex.find_at(text, pos) {
        out.push(record(rule, text, found.start(), found.end(), None));
        match next_char_len(text, found.start()) {
            Some(step) => pos = found.start() + step,
            None => break,
        }
    }
}

/// Runs already compiled rules over `text`.
pub fn scan_compiled(text: &str, compiled: &CompiledRules) -> ScanReport {
    let mut matches = Vec::new();
    for rule in &compiled.rules {
        let before = matches.len();
        match rule.rule_type {
            RuleType::Regex | RuleType::Variable => scan_pattern(text, rule, &mut matches),
            RuleType::String => scan_literal(text, rule, &mut matches),
        }
        debug!("Rule '{}' produced {} matches.", rule.name, matches.len() - before);
    }
    // Stable: matches at the same index keep rule order.
    matches.sort_by_key(|m| m.index);
    ScanReport {
        matches,
        warnings: compiled.warnings.clone(),
    }
}

/// Scans `text` with every active rule of `rule_set`.
///
/// Rules with unusable patterns are skipped and listed in the report's
/// warnings; they never stop the other rules.
pub fn find_matches(text: &str, rule_set: &RuleSet) -> ScanReport {
    if !rule_set.enabled {
        debug!("Rule set is disabled; skipping scan.");
        return ScanReport::default();
    }
    scan_compiled(text, &compile_rules(rule_set))
}

/// A `DetectionEngine` that keeps a rule set together with its compiled
/// rules.
#[derive(Debug)]
pub struct RuleEngine {
    rule_set: RuleSet,
    compiled: CompiledRules,
}

impl RuleEngine {
    pub fn new(rule_set: RuleSet) -> Self {
        let compiled = compile_rules(&rule_set);
        Self { rule_set, compiled }
    }

    pub fn into_rule_set(self) -> RuleSet {
        self.rule_set
    }
}

impl DetectionEngine for RuleEngine {
    fn scan(&self, text: &str) -> ScanReport {
        if !self.rule_set.enabled {
            debug!("Rule set is disabled; skipping scan.");
            return ScanReport::default();
        }
        scan_compiled(text, &self.compiled)
    }

    fn mask_match(&self, m: &Match) -> Result<String, PrivscanError> {
        let rule = self
            .rule_set
            .get(m.rule_id)
            .ok_or(PrivscanError::RuleNotFound(m.rule_id))?;
        masking::mask_match(m, rule)
    }

    fn redact(&self, text: &str, matches: &[Match]) -> Result<String, PrivscanError> {
        masking::redact_text(text, matches, &self.rule_set)
    }

    fn rule_set(&self) -> &RuleSet {
        &self.rule_set
    }

    fn compiled_rules(&self) -> &CompiledRules {
        &self.compiled
    }
}
