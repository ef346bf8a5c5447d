//! Rule configuration for `privscan-core`.
//!
//! This module defines the rule model (rules, masking policies and the rule
//! set that owns them) and the operations a rule store performs on it:
//! creating, editing, toggling and deleting rules, plus loading and saving a
//! rule set as YAML or JSON.
//!
//! The rule set is a plain value. Callers own it, mutate it through the
//! methods below and hand it to an engine; nothing here holds global state.
//!
//! License: MIT OR Apache-2.0

use anyhow::{anyhow, Context, Result};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::errors::PrivscanError;
use crate::sanitizers::compiler::validate_pattern;

/// Maximum allowed length for a rule pattern string.
pub const MAX_PATTERN_LENGTH: usize = 500;

/// Mask token used when a policy leaves `pattern` empty.
pub const DEFAULT_MASK_TOKEN: &str = "*";

/// Width of a fixed-length mask.
pub const DEFAULT_MASK_WIDTH: usize = 3;

/// Selects the matching algorithm for a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuleType {
    /// A regular expression searched without overlap.
    #[default]
    Regex,
    /// A regular expression shaped like `name = "value"`.
    Variable,
    /// A literal keyword, searched with overlap.
    String,
}

impl RuleType {
    /// Whether the pattern is a regular expression rather than a literal.
    pub fn is_pattern(self) -> bool {
        matches!(self, RuleType::Regex | RuleType::Variable)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RuleType::Regex => "regex",
            RuleType::Variable => "variable",
            RuleType::String => "string",
        }
    }
}

impl fmt::Display for RuleType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RuleType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim() {
            "regex" => Ok(RuleType::Regex),
            "variable" => Ok(RuleType::Variable),
            "string" => Ok(RuleType::String),
            other => Err(format!("unknown rule type '{}'", other)),
        }
    }
}

/// How a masking policy rewrites a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MaskingMode {
    /// Replace the whole matched span.
    #[default]
    DirectText,
    /// Replace only the value of a `name = "value"` match.
    VariableValue,
}

/// Per-rule redaction policy.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MaskingPolicy {
    pub enabled: bool,
    pub mode: MaskingMode,
    /// The mask token repeated in place of hidden characters.
    pub pattern: String,
    /// Mask every non-whitespace character in place. Overrides the other
    /// direct-text options.
    pub preserve_format: bool,
    pub preserve_start: usize,
    pub preserve_end: usize,
    /// Keep the masked segment as long as the text it hides instead of
    /// collapsing it to a fixed width.
    pub preserve_length: bool,
    /// Mask width for `variable_value` mode; `None` or 0 means 3.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixed_length: Option<usize>,
}

impl Default for MaskingPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            mode: MaskingMode::DirectText,
            pattern: DEFAULT_MASK_TOKEN.to_string(),
            preserve_format: false,
            preserve_start: 0,
            preserve_end: 0,
            preserve_length: false,
            fixed_length: None,
        }
    }
}

impl MaskingPolicy {
    /// The token to repeat, falling back to `*` when unset.
    pub fn mask_token(&self) -> &str {
        if self.pattern.is_empty() {
            DEFAULT_MASK_TOKEN
        } else {
            &self.pattern
        }
    }

    /// The effective `variable_value` mask width.
    pub fn value_width(&self) -> usize {
        self.fixed_length
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_MASK_WIDTH)
    }
}

/// A single detection rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    pub id: u32,
    #[serde(rename = "type")]
    pub rule_type: RuleType,
    pub pattern: String,
    pub name: String,
    #[serde(default = "default_true")]
    pub active: bool,
    /// Only consulted for `string` rules.
    #[serde(default)]
    pub case_sensitive: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub masking: Option<MaskingPolicy>,
}

fn default_true() -> bool {
    true
}

impl Rule {
    /// The masking policy if one is attached and switched on.
    pub fn active_masking(&self) -> Option<&MaskingPolicy> {
        self.masking.as_ref().filter(|m| m.enabled)
    }

    /// Checks the fields an editor would refuse to save.
    pub fn validate(&self) -> Result<(), PrivscanError> {
        if self.name.trim().is_empty() {
            return Err(PrivscanError::EmptyRuleName);
        }
        validate_pattern(&self.name, self.rule_type, &self.pattern)
    }
}

/// The editable fields of a rule, as submitted by an editor or the CLI.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RuleDraft {
    pub name: String,
    pub rule_type: RuleType,
    pub pattern: String,
    pub case_sensitive: bool,
    pub description: Option<String>,
}

impl RuleDraft {
    pub fn new(name: impl Into<String>, rule_type: RuleType, pattern: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rule_type,
            pattern: pattern.into(),
            ..Default::default()
        }
    }

    pub fn case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    fn into_rule(self, id: u32) -> Rule {
        let case_sensitive = self.rule_type == RuleType::String && self.case_sensitive;
        Rule {
            id,
            rule_type: self.rule_type,
            pattern: self.pattern,
            name: self.name.trim().to_string(),
            active: true,
            case_sensitive,
            description: self.description.filter(|d| !d.trim().is_empty()),
            masking: None,
        }
    }
}

/// An ordered collection of rules plus the id counter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleSet {
    /// Global switch; a disabled rule set produces no matches.
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub rules: Vec<Rule>,
    #[serde(default = "default_next_id")]
    pub next_rule_id: u32,
}

fn default_next_id() -> u32 {
    1
}

impl Default for RuleSet {
    fn default() -> Self {
        Self {
            enabled: true,
            rules: Vec::new(),
            next_rule_id: default_next_id(),
        }
    }
}

impl RuleSet {
    /// Loads the built-in rules embedded in the library.
    pub fn load_default_rules() -> Result<Self> {
        debug!("Loading default rules from embedded string...");
        let default_yaml = include_str!("../config/default_rules.yaml");
        let mut set: RuleSet =
            serde_yml::from_str(default_yaml).context("Failed to parse default rules")?;
        set.normalize()?;
        debug!("Loaded {} default rules.", set.rules.len());
        Ok(set)
    }

    /// Loads a rule set from disk. Files ending in `.json` are read as JSON,
    /// anything else as YAML.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading rules from: {}", path.display());
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read rules file {}", path.display()))?;
        let mut set: RuleSet = if is_json_path(path) {
            serde_json::from_str(&text)
                .with_context(|| format!("Failed to parse rules file {}", path.display()))?
        } else {
            serde_yml::from_str(&text)
                .with_context(|| format!("Failed to parse rules file {}", path.display()))?
        };
        set.normalize()
            .with_context(|| format!("Invalid rules file {}", path.display()))?;
        info!("Loaded {} rules from file {}.", set.rules.len(), path.display());
        Ok(set)
    }

    /// Serializes the rule set in the format implied by the file extension.
    pub fn to_string_for_path(&self, path: &Path) -> Result<String> {
        if is_json_path(path) {
            serde_json::to_string_pretty(self).context("Failed to serialize rules as JSON")
        } else {
            serde_yml::to_string(self).context("Failed to serialize rules as YAML")
        }
    }

    /// Writes the rule set to disk, creating parent directories as needed.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
        let body = self.to_string_for_path(path)?;
        std::fs::write(path, body)
            .with_context(|| format!("Failed to write rules file {}", path.display()))?;
        debug!("Saved {} rules to {}.", self.rules.len(), path.display());
        Ok(())
    }

    /// Rejects duplicate ids and repairs a counter that would reuse an id.
    ///
    /// Invalid patterns are tolerated here: a stored rule with a broken
    /// pattern is skipped with a warning at scan time instead.
    fn normalize(&mut self) -> Result<()> {
        let mut seen = HashSet::new();
        for rule in &self.rules {
            if !seen.insert(rule.id) {
                return Err(anyhow!(PrivscanError::DuplicateRuleId(rule.id)));
            }
            if rule.name.trim().is_empty() {
                return Err(anyhow!("Rule {} has an empty `name` field.", rule.id));
            }
            if let Err(e) = rule.validate() {
                warn!("Rule {} will be skipped when scanning: {}", rule.id, e);
            }
        }
        // A rule at u32::MAX pins the counter there; allocation then fails.
        let floor = self
            .max_id()
            .map_or(1, |max| max.checked_add(1).unwrap_or(u32::MAX));
        if self.next_rule_id < floor {
            debug!(
                "Raising nextRuleId from {} to {} to stay above existing ids.",
                self.next_rule_id, floor
            );
            self.next_rule_id = floor;
        }
        Ok(())
    }

    fn max_id(&self) -> Option<u32> {
        self.rules.iter().map(|r| r.id).max()
    }

    /// Hands out the next id and advances the counter. The counter never
    /// wraps, so an id is never handed out twice.
    pub(crate) fn allocate_id(&mut self) -> Result<u32, PrivscanError> {
        let id = self.next_rule_id;
        let next = id.checked_add(1).ok_or(PrivscanError::IdSpaceExhausted)?;
        if self.get(id).is_some() {
            return Err(PrivscanError::IdSpaceExhausted);
        }
        self.next_rule_id = next;
        Ok(id)
    }

    pub fn get(&self, id: u32) -> Option<&Rule> {
        self.rules.iter().find(|r| r.id == id)
    }

    fn get_mut(&mut self, id: u32) -> Result<&mut Rule, PrivscanError> {
        self.rules
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(PrivscanError::RuleNotFound(id))
    }

    pub fn active_rules(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter().filter(|r| r.active)
    }

    /// Validates the draft and appends it as a new active rule.
    pub fn add_rule(&mut self, draft: RuleDraft) -> Result<u32, PrivscanError> {
        if draft.name.trim().is_empty() {
            return Err(PrivscanError::EmptyRuleName);
        }
        validate_pattern(draft.name.trim(), draft.rule_type, &draft.pattern)?;
        let id = self.allocate_id()?;
        self.rules.push(draft.into_rule(id));
        debug!("Added rule {}.", id);
        Ok(id)
    }

    /// Replaces the editable fields of a rule. Id, activation and masking
    /// policy are kept.
    pub fn update_rule(&mut self, id: u32, draft: RuleDraft) -> Result<(), PrivscanError> {
        if draft.name.trim().is_empty() {
            return Err(PrivscanError::EmptyRuleName);
        }
        validate_pattern(draft.name.trim(), draft.rule_type, &draft.pattern)?;
        let rule = self.get_mut(id)?;
        let updated = draft.into_rule(id);
        rule.name = updated.name;
        rule.rule_type = updated.rule_type;
        rule.pattern = updated.pattern;
        rule.case_sensitive = updated.case_sensitive;
        rule.description = updated.description;
        debug!("Updated rule {}.", id);
        Ok(())
    }

    pub fn remove_rule(&mut self, id: u32) -> Result<Rule, PrivscanError> {
        let pos = self
            .rules
            .iter()
            .position(|r| r.id == id)
            .ok_or(PrivscanError::RuleNotFound(id))?;
        debug!("Removed rule {}.", id);
        Ok(self.rules.remove(pos))
    }

    pub fn set_active(&mut self, id: u32, active: bool) -> Result<(), PrivscanError> {
        self.get_mut(id)?.active = active;
        Ok(())
    }

    pub fn set_masking(
        &mut self,
        id: u32,
        masking: Option<MaskingPolicy>,
    ) -> Result<(), PrivscanError> {
        self.get_mut(id)?.masking = masking;
        Ok(())
    }

    /// Drops every rule. The id counter keeps its value so ids are never
    /// reused.
    pub fn clear(&mut self) {
        debug!("Clearing {} rules.", self.rules.len());
        self.rules.clear();
    }

    /// Hex SHA-256 of the rule set's JSON form. Two rule sets with the same
    /// fingerprint compile to the same matcher.
    pub fn fingerprint(&self) -> Result<String, PrivscanError> {
        let bytes = serde_json::to_vec(self)
            .map_err(|e| PrivscanError::SerializationError(e.to_string()))?;
        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        Ok(hex::encode(hasher.finalize()))
    }
}

fn is_json_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_rules_load_and_keep_counter_ahead() {
        let set = RuleSet::load_default_rules().unwrap();
        assert_eq!(set.rules.len(), 6);
        assert!(set.next_rule_id > set.max_id().unwrap());
        assert!(set.rules.iter().all(|r| r.validate().is_ok()));
    }

    #[test]
    fn ids_are_never_reused() {
        let mut set = RuleSet::default();
        let a = set.add_rule(RuleDraft::new("a", RuleType::String, "a")).unwrap();
        let b = set.add_rule(RuleDraft::new("b", RuleType::String, "b")).unwrap();
        set.remove_rule(b).unwrap();
        set.clear();
        let c = set.add_rule(RuleDraft::new("c", RuleType::String, "c")).unwrap();
        assert_eq!((a, b, c), (1, 2, 3));
    }

    #[test]
    fn add_rejects_invalid_regex_and_blank_name() {
        let mut set = RuleSet::default();
        assert!(matches!(
            set.add_rule(RuleDraft::new("bad", RuleType::Regex, "(")),
            Err(PrivscanError::InvalidPattern(..))
        ));
        assert!(matches!(
            set.add_rule(RuleDraft::new("   ", RuleType::String, "x")),
            Err(PrivscanError::EmptyRuleName)
        ));
        assert_eq!(set.next_rule_id, 1);
    }

    #[test]
    fn update_keeps_masking_and_drops_case_flag_for_regex() {
        let mut set = RuleSet::default();
        let id = set
            .add_rule(RuleDraft::new("kw", RuleType::String, "kw").case_sensitive(true))
            .unwrap();
        set.set_masking(id, Some(MaskingPolicy::default())).unwrap();
        set.update_rule(id, RuleDraft::new("digits", RuleType::Regex, r"\d+").case_sensitive(true))
            .unwrap();
        let rule = set.get(id).unwrap();
        assert_eq!(rule.rule_type, RuleType::Regex);
        assert!(!rule.case_sensitive);
        assert!(rule.masking.is_some());
    }

    #[test]
    fn masking_policy_fallbacks() {
        let policy = MaskingPolicy {
            pattern: String::new(),
            fixed_length: Some(0),
            ..Default::default()
        };
        assert_eq!(policy.mask_token(), "*");
        assert_eq!(policy.value_width(), 3);
    }

    #[test]
    fn fingerprint_tracks_changes() {
        let mut set = RuleSet::load_default_rules().unwrap();
        let before = set.fingerprint().unwrap();
        assert_eq!(before, set.clone().fingerprint().unwrap());
        set.set_active(1, false).unwrap();
        assert_ne!(before, set.fingerprint().unwrap());
    }
}
