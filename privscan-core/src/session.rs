//! Incremental scanning for a text that keeps changing.
//!
//! A `ScanSession` rescans the full text on every update and remembers the
//! last reported match list, so the host only redraws when the matches
//! actually changed. The session is single-owner; hosts that receive edits
//! faster than they scan should coalesce them and pass the latest text.

use log::debug;

use crate::config::RuleSet;
use crate::differ::matches_equivalent;
use crate::engine::DetectionEngine;
use crate::engines::rule_engine::RuleEngine;
use crate::errors::PrivscanError;
use crate::redaction_match::{Match, ScanReport};

/// Result of feeding a new text snapshot to a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanUpdate {
    /// False when the matches equal the previously reported ones.
    pub changed: bool,
    pub report: ScanReport,
}

#[derive(Debug)]
pub struct ScanSession {
    engine: RuleEngine,
    fingerprint: String,
    last_matches: Vec<Match>,
    force_refresh: bool,
}

impl ScanSession {
    pub fn new(rule_set: RuleSet) -> Result<Self, PrivscanError> {
        let fingerprint = rule_set.fingerprint()?;
        Ok(Self {
            engine: RuleEngine::new(rule_set),
            fingerprint,
            last_matches: Vec::new(),
            force_refresh: false,
        })
    }

    pub fn engine(&self) -> &RuleEngine {
        &self.engine
    }

    pub fn last_matches(&self) -> &[Match] {
        &self.last_matches
    }

    /// Swaps in an edited rule set. Recompiles only when the rules really
    /// differ; in that case the next update is reported as changed even if
    /// the matches happen to be equal.
    pub fn replace_rules(&mut self, rule_set: RuleSet) -> Result<bool, PrivscanError> {
        let fingerprint = rule_set.fingerprint()?;
        if fingerprint == self.fingerprint {
            debug!("Rule set unchanged; keeping compiled rules.");
            return Ok(false);
        }
        debug!("Rule set changed; recompiling.");
        self.engine = RuleEngine::new(rule_set);
        self.fingerprint = fingerprint;
        self.force_refresh = true;
        Ok(true)
    }

    /// Scans a new snapshot of the text.
    pub fn update(&mut self, text: &str) -> ScanUpdate {
        let report = self.engine.scan(text);
        let changed = self.force_refresh || !matches_equivalent(&self.last_matches, &report.matches);
        if changed {
            self.last_matches = report.matches.clone();
            self.force_refresh = false;
        }
        debug!(
            "Session update: {} matches, changed = {}.",
            report.matches.len(),
            changed
        );
        ScanUpdate { changed, report }
    }
}
