//! Rule import and export.
//!
//! Two formats are supported:
//!
//! * TSV with the columns `id, type, pattern, name, active, description,
//!   caseSensitive`. Fields are written raw, so a field containing a tab or a
//!   line break cannot be exported. Masking policies are not part of TSV.
//! * JSON: a list of rules with every field, or a whole rule set document.
//!
//! Importing merges into an existing rule set: invalid rules are skipped,
//! rules whose `(type, pattern)` already exists are ignored, and every added
//! rule receives a fresh id.
//!
//! License: MIT OR Apache-2.0

use log::{debug, warn};
use serde::Deserialize;
use std::path::Path;

use crate::config::{Rule, RuleSet, RuleType};
use crate::errors::PrivscanError;

pub const TSV_HEADERS: [&str; 7] = [
    "id",
    "type",
    "pattern",
    "name",
    "active",
    "description",
    "caseSensitive",
];

/// Number of leading TSV columns a row must carry.
const TSV_REQUIRED_COLUMNS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleFormat {
    Tsv,
    Json,
}

impl RuleFormat {
    /// Picks the format from a file extension; anything but `.json` is TSV.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => RuleFormat::Json,
            _ => RuleFormat::Tsv,
        }
    }
}

/// Counts reported after an import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImportSummary {
    pub added: usize,
    pub duplicates: usize,
    pub skipped: usize,
}

fn check_tsv_field(id: u32, field: &'static str, value: &str) -> Result<(), PrivscanError> {
    if value.contains(['\t', '\n', '\r']) {
        return Err(PrivscanError::UnrepresentableField { id, field });
    }
    Ok(())
}

pub fn export_tsv(rules: &[Rule]) -> Result<String, PrivscanError> {
    let mut rows = Vec::with_capacity(rules.len() + 1);
    rows.push(TSV_HEADERS.join("\t"));
    for rule in rules {
        check_tsv_field(rule.id, "pattern", &rule.pattern)?;
        check_tsv_field(rule.id, "name", &rule.name)?;
        let description = rule.description.as_deref().unwrap_or("");
        check_tsv_field(rule.id, "description", description)?;
        rows.push(
            [
                rule.id.to_string(),
                rule.rule_type.to_string(),
                rule.pattern.clone(),
                rule.name.clone(),
                rule.active.to_string(),
                description.to_string(),
                if rule.case_sensitive { "true".to_string() } else { String::new() },
            ]
            .join("\t"),
        );
    }
    Ok(rows.join("\n"))
}

pub fn parse_tsv(input: &str) -> Result<Vec<Rule>, PrivscanError> {
    let mut rules = Vec::new();
    // Line 1 is the header.
    for (n, line) in input.lines().enumerate().skip(1) {
        let line_no = n + 1;
        if line.trim().is_empty() {
            continue;
        }
        let values: Vec<&str> = line.split('\t').collect();
        if values.len() < TSV_REQUIRED_COLUMNS {
            return Err(PrivscanError::TsvParse {
                line: line_no,
                message: format!(
                    "expected at least {} columns, found {}",
                    TSV_REQUIRED_COLUMNS,
                    values.len()
                ),
            });
        }
        let id = values[0].trim().parse::<u32>().map_err(|e| PrivscanError::TsvParse {
            line: line_no,
            message: format!("invalid id '{}': {}", values[0], e),
        })?;
        let rule_type = values[1]
            .parse::<RuleType>()
            .map_err(|message| PrivscanError::TsvParse { line: line_no, message })?;
        let description = values
            .get(5)
            .filter(|d| !d.is_empty())
            .map(|d| d.to_string());
        let case_sensitive =
            rule_type == RuleType::String && values.get(6).is_some_and(|v| v.trim() == "true");

        rules.push(Rule {
            id,
            rule_type,
            pattern: values[2].to_string(),
            name: values[3].to_string(),
            active: values[4].trim() == "true",
            case_sensitive,
            description,
            masking: None,
        });
    }
    debug!("Parsed {} rules from TSV.", rules.len());
    Ok(rules)
}

pub fn export_json(rules: &[Rule]) -> Result<String, PrivscanError> {
    serde_json::to_string_pretty(rules).map_err(|e| PrivscanError::SerializationError(e.to_string()))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RuleDocument {
    List(Vec<Rule>),
    Set(RuleSet),
}

pub fn parse_json(input: &str) -> Result<Vec<Rule>, PrivscanError> {
    let doc: RuleDocument =
        serde_json::from_str(input).map_err(|e| PrivscanError::SerializationError(e.to_string()))?;
    Ok(match doc {
        RuleDocument::List(rules) => rules,
        RuleDocument::Set(set) => set.rules,
    })
}

pub fn export_rules(rules: &[Rule], format: RuleFormat) -> Result<String, PrivscanError> {
    match format {
        RuleFormat::Tsv => export_tsv(rules),
        RuleFormat::Json => export_json(rules),
    }
}

pub fn parse_rules(input: &str, format: RuleFormat) -> Result<Vec<Rule>, PrivscanError> {
    match format {
        RuleFormat::Tsv => parse_tsv(input),
        RuleFormat::Json => parse_json(input),
    }
}

/// Merges imported rules into `set`, assigning each new rule the next id.
pub fn import_rules(set: &mut RuleSet, imported: Vec<Rule>) -> ImportSummary {
    let mut summary = ImportSummary::default();
    for mut rule in imported {
        if let Err(e) = rule.validate() {
            warn!("Skipping imported rule '{}': {}", rule.name, e);
            summary.skipped += 1;
            continue;
        }
        let exists = set
            .rules
            .iter()
            .any(|r| r.rule_type == rule.rule_type && r.pattern == rule.pattern);
        if exists {
            debug!("Imported rule '{}' already exists; not added.", rule.name);
            summary.duplicates += 1;
            continue;
        }
        rule.id = match set.allocate_id() {
            Ok(id) => id,
            Err(e) => {
                warn!("Skipping imported rule '{}': {}", rule.name, e);
                summary.skipped += 1;
                continue;
            }
        };
        set.rules.push(rule);
        summary.added += 1;
    }
    summary
}
