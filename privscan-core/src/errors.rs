//! errors.rs - Custom error types for the privscan-core library.
//!
//! This module defines a structured error enum for the library, providing
//! specific, actionable error types that can be handled programmatically.
//!
//! License: MIT OR APACHE 2.0

use thiserror::Error;

/// This enum represents all possible error types in the `privscan-core` library.
///
/// Marked `#[non_exhaustive]`: new variants may be added without breaking
/// downstream matches.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum PrivscanError {
    #[error("Rule '{0}' has an invalid pattern: {1}")]
    InvalidPattern(String, regex::Error),

    #[error("Rule '{0}' has an empty pattern")]
    EmptyPattern(String),

    #[error("Rule '{0}': pattern length ({1}) exceeds maximum allowed ({2})")]
    PatternLengthExceeded(String, usize, usize),

    #[error("A rule name must not be empty")]
    EmptyRuleName,

    #[error("Duplicate rule id {0} in rule set")]
    DuplicateRuleId(u32),

    #[error("No rule with id {0}")]
    RuleNotFound(u32),

    #[error("Rule id space is exhausted; no new rule id can be assigned")]
    IdSpaceExhausted,

    #[error("Rule '{rule}': matched text does not have the `name = \"value\"` shape ({reason})")]
    StructuralMismatch { rule: String, reason: String },

    #[error("Range {index}..{end} is outside of the text (length {text_len})", end = .index + .length)]
    OutOfRange {
        index: usize,
        length: usize,
        text_len: usize,
    },

    #[error("Offset {0} does not fall on a character boundary")]
    NotCharBoundary(usize),

    #[error("Match for rule '{rule}' at offset {index} no longer agrees with the text")]
    StaleMatch { rule: String, index: usize },

    #[error("Rule {id}: field '{field}' contains a tab or line break and cannot be exported as TSV")]
    UnrepresentableField { id: u32, field: &'static str },

    #[error("TSV line {line}: {message}")]
    TsvParse { line: usize, message: String },

    #[error("Failed to serialize rule data: {0}")]
    SerializationError(String),

    #[error("An unexpected I/O error occurred: {0}")]
    IoError(#[from] std::io::Error),
}
