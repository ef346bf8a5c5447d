// privscan-core/src/engine.rs
//! Defines the core `DetectionEngine` trait.
//!
//! The trait decouples callers (the scan session, the CLI, headless helpers)
//! from how a rule set is compiled and matched, so a host can hold one engine
//! per rule set and rescan text without recompiling.
//!
//! License: MIT OR APACHE 2.0

use crate::config::RuleSet;
use crate::errors::PrivscanError;
use crate::redaction_match::{Match, ScanReport};
use crate::sanitizers::compiler::CompiledRules;

/// A trait that defines the core functionality of a detection engine.
pub trait DetectionEngine: Send + Sync {
    /// Runs every active rule over `text`.
    ///
    /// Never fails: rules that cannot be compiled are reported in
    /// `ScanReport::warnings` and the remaining rules still run.
    fn scan(&self, text: &str) -> ScanReport;

    /// Computes the masked replacement for a single match using the policy
    /// of the rule that produced it.
    fn mask_match(&self, m: &Match) -> Result<String, PrivscanError>;

    /// Rewrites `text` with every masked match applied.
    ///
    /// # Arguments
    /// * `text` - The text the matches were found in.
    /// * `matches` - Matches from a scan of exactly this text.
    fn redact(&self, text: &str, matches: &[Match]) -> Result<String, PrivscanError>;

    /// Returns a reference to the engine's rule set.
    fn rule_set(&self) -> &RuleSet;

    /// Returns the compiled rules, including the compile warnings.
    fn compiled_rules(&self) -> &CompiledRules;
}
