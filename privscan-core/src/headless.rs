// privscan-core/src/headless.rs

//! `headless.rs`
//! Convenience wrappers for using the core engine in headless mode (non-UI).
//! Provides helper functions for one-shot scanning and redaction of strings.

use log::warn;

use crate::config::RuleSet;
use crate::engine::DetectionEngine;
use crate::engines::rule_engine::RuleEngine;
use crate::errors::PrivscanError;
use crate::redaction_match::ScanReport;

/// Scans `content` once with a fresh engine.
pub fn headless_scan(rule_set: RuleSet, content: &str) -> ScanReport {
    RuleEngine::new(rule_set).scan(content)
}

/// Scans and redacts `content` in one call, returning the masked text.
///
/// Rule warnings are logged; they do not fail the call.
///
/// # Arguments
///
/// * `rule_set` - The rules to apply.
/// * `content` - The string to be redacted.
pub fn headless_redact_string(rule_set: RuleSet, content: &str) -> Result<String, PrivscanError> {
    let engine = RuleEngine::new(rule_set);
    let report = engine.scan(content);
    for w in &report.warnings {
        warn!("Rule '{}' (id {}) skipped: {}", w.rule_name, w.rule_id, w.message);
    }
    engine.redact(content, &report.matches)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn test_headless_redact_string_defaults() -> Result<()> {
        let content = "Mail john.doe@example.com, card 4111 1111 1111 1111, password = \"hunter2\".";
        let redacted = headless_redact_string(RuleSet::load_default_rules()?, content)?;
        assert_eq!(
            redacted,
            "Mail j***, card **** **** **** ****, password = \"***\"."
        );
        Ok(())
    }

    #[test]
    fn test_headless_scan_disabled_set() -> Result<()> {
        let mut set = RuleSet::load_default_rules()?;
        set.enabled = false;
        assert!(headless_scan(set, "secret").is_clean());
        Ok(())
    }
}
