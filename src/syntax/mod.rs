//! Source text of record literals, tuple literals and lens paths.

use std::fmt;

pub mod lex;
pub mod parse;

/// Source location of a token or literal.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Span {
    pub line: u32,
    pub column: usize,
    pub offset: usize,
    /// Length of the spanned text in bytes.
    pub len: usize,
}

impl Span {
    pub fn new(line: u32, column: usize, offset: usize, len: usize) -> Self {
        Self {
            line,
            column,
            offset,
            len,
        }
    }

    /// Span covering `self` through the end of `end`.
    pub fn to(self, end: Span) -> Span {
        Span {
            len: (end.offset + end.len).saturating_sub(self.offset),
            ..self
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

impl Default for Span {
    fn default() -> Self {
        Self {
            line: 1,
            column: 1,
            offset: 0,
            len: 0,
        }
    }
}
