// privscan-core/src/redaction_match.rs
//! Match records produced by a scan, plus helpers for logging matched
//! content without leaking it.

use lazy_static::lazy_static;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::errors::PrivscanError;

lazy_static! {
    /// A static boolean that is initialized once to determine if PII is allowed in debug logs.
    static ref PII_DEBUG_ALLOWED: bool = {
        std::env::var("PRIVSCAN_ALLOW_DEBUG_PII")
            .map(|s| s.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    };
}

/// A byte range relative to the start of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// Where the name and the value of a `name = "value"` match sit inside the
/// matched text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Assignment {
    pub name: Span,
    pub value: Span,
}

/// One located occurrence of a rule in a scanned text.
///
/// `index` and `length` are byte offsets into the scanned text and always
/// fall on character boundaries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub rule_id: u32,
    pub rule_name: String,
    pub matched_text: String,
    pub index: usize,
    pub length: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignment: Option<Assignment>,
}

impl Match {
    pub fn end(&self) -> usize {
        self.index + self.length
    }

    /// Confirms the match still describes `text`: in range, on character
    /// boundaries, and covering the same characters it was found on.
    pub fn verify_in(&self, text: &str) -> Result<(), PrivscanError> {
        let end = self
            .index
            .checked_add(self.length)
            .filter(|end| *end <= text.len())
            .ok_or(PrivscanError::OutOfRange {
                index: self.index,
                length: self.length,
                text_len: text.len(),
            })?;
        if !text.is_char_boundary(self.index) {
            return Err(PrivscanError::NotCharBoundary(self.index));
        }
        if !text.is_char_boundary(end) {
            return Err(PrivscanError::NotCharBoundary(end));
        }
        if text[self.index..end] != self.matched_text {
            return Err(PrivscanError::StaleMatch {
                rule: self.rule_name.clone(),
                index: self.index,
            });
        }
        Ok(())
    }
}

/// A rule that was skipped during a scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleWarning {
    pub rule_id: u32,
    pub rule_name: String,
    pub message: String,
}

/// The outcome of one detection pass.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScanReport {
    /// All matches, ascending by index; ties keep rule order.
    pub matches: Vec<Match>,
    pub warnings: Vec<RuleWarning>,
}

impl ScanReport {
    pub fn is_clean(&self) -> bool {
        self.matches.is_empty()
    }
}

pub fn redact_sensitive(s: &str) -> String {
    const MAX_LEN: usize = 8;
    if s.len() <= MAX_LEN {
        "[REDACTED]".to_string()
    } else {
        format!("[REDACTED: {} chars]", s.chars().count())
    }
}

fn get_loggable_content(sensitive_content: &str) -> String {
    if *PII_DEBUG_ALLOWED {
        sensitive_content.to_string()
    } else {
        redact_sensitive(sensitive_content)
    }
}

pub fn log_captured_match_debug(module_path: &str, rule_name: &str, index: usize, original: &str) {
    debug!(
        "{} Captured match for rule '{}' at {}: '{}'",
        module_path,
        rule_name,
        index,
        get_loggable_content(original)
    );
}

pub fn log_masking_action_debug(module_path: &str, original: &str, masked: &str, rule_name: &str) {
    debug!(
        "{} Masking action: Original='{}', Masked='{}' for rule '{}'",
        module_path,
        get_loggable_content(original),
        masked,
        rule_name
    );
}
