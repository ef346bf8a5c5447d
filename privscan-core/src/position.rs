//! Maps byte offsets in a text to 1-based line/column positions for display.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::PrivscanError;

/// A 1-based line and column. Columns count characters, not bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Line {}, Char {}", self.line, self.column)
    }
}

/// Locates `index` in `text`. `index == text.len()` (the end of the text) is
/// a valid position.
pub fn locate(text: &str, index: usize) -> Result<Position, PrivscanError> {
    if index > text.len() {
        return Err(PrivscanError::OutOfRange {
            index,
            length: 0,
            text_len: text.len(),
        });
    }
    if !text.is_char_boundary(index) {
        return Err(PrivscanError::NotCharBoundary(index));
    }
    let before = &text[..index];
    let (line, last_segment) = match before.rfind('\n') {
        Some(nl) => (before.matches('\n').count() + 1, &before[nl + 1..]),
        None => (1, before),
    };
    Ok(Position {
        line,
        column: last_segment.chars().count() + 1,
    })
}
