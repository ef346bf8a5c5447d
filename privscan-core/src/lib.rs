// privscan-core/src/lib.rs
//! # privscan Core Library
//!
//! `privscan-core` finds sensitive substrings (card numbers, emails, SSNs,
//! secrets in `key = "value"` assignments, keyword references) in free text,
//! masks them according to per-rule policies, and tells a host whether a
//! rescan changed anything.
//!
//! The library is pure: it performs no terminal or network I/O, keeps no
//! global mutable state, and leaves persistence of rule sets to the caller
//! (helpers for YAML/JSON files are provided).
//!
//! ## Modules
//!
//! * `config`: The rule model (`Rule`, `MaskingPolicy`, `RuleSet`) and rule store operations.
//! * `sanitizers`: Rule compilation and pattern validation.
//! * `engine`: The `DetectionEngine` trait.
//! * `engines`: The rule matcher and the `RuleEngine` implementation.
//! * `masking`: Direct-text and variable-value masking, plus whole-text redaction.
//! * `position`: Byte offset to line/column mapping.
//! * `differ`: Order-insensitive match-set comparison.
//! * `session`: Incremental rescanning of a changing text.
//! * `interchange`: TSV/JSON rule import and export.
//! * `redaction_match`: Match records and PII-safe logging helpers.
//! * `headless`: One-shot convenience wrappers.
//!
//! ## Usage Example
//!
//! ```rust
//! use privscan_core::{find_matches, locate, mask_text, RuleSet};
//! use anyhow::Result;
//!
//! fn main() -> Result<()> {
//!     let rules = RuleSet::load_default_rules()?;
//!     let text = "contact: jane@example.org\npassword = \"hunter2\"";
//!
//!     let report = find_matches(text, &rules);
//!     for m in &report.matches {
//!         let rule = rules.get(m.rule_id).expect("match from this rule set");
//!         let pos = locate(text, m.index)?;
//!         println!("{} at {}: {}", m.rule_name, pos, mask_text(&m.matched_text, rule)?);
//!     }
//!     assert_eq!(report.matches.len(), 2);
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Domain failures are `PrivscanError` values. File loading and saving use
//! `anyhow::Error` with context. Scanning itself never fails: a rule with a
//! broken pattern becomes a warning in the `ScanReport`.
//!
//! ---
//! License: MIT OR Apache-2.0

pub mod config;
pub mod differ;
pub mod engine;
pub mod engines;
pub mod errors;
pub mod headless;
pub mod interchange;
pub mod masking;
pub mod position;
pub mod redaction_match;
pub mod sanitizers;
pub mod session;

/// Re-exports the rule model and store operations.
pub use config::{
    MaskingMode, MaskingPolicy, Rule, RuleDraft, RuleSet, RuleType, DEFAULT_MASK_TOKEN,
    MAX_PATTERN_LENGTH,
};

pub use errors::PrivscanError;

pub use engine::DetectionEngine;
pub use engines::rule_engine::{find_matches, RuleEngine};

pub use masking::{mask_match, mask_text, redact_text, redact_with_applied};
pub use position::{locate, Position};
pub use differ::matches_equivalent;
pub use session::{ScanSession, ScanUpdate};

pub use redaction_match::{Assignment, Match, RuleWarning, ScanReport, Span};

pub use interchange::{import_rules, ImportSummary, RuleFormat};

pub use headless::{headless_redact_string, headless_scan};

pub use sanitizers::compiler::{compile_rules, CompiledRule, CompiledRules};
