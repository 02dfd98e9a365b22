use std::ops::Range;

use thiserror::Error;

use crate::syntax::lexer::BOM;

pub type Span = Range<usize>;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq, Default)]
pub enum LexErrorKind {
    #[default]
    #[error("invalid character")]
    InvalidToken,
    #[error("unterminated comment")]
    UnterminatedComment,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{kind} at byte {}", span.start)]
pub struct LexError {
    pub kind: LexErrorKind,
    pub span: Span,
}

/// A lex or parse failure, located in its source file.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{file}:{line}:{column}: {message}")]
pub struct SyntaxError {
    pub file: String,
    pub line: usize,
    pub column: usize,
    pub message: String,
}

impl SyntaxError {
    /// Build an error for byte `offset` of `src`, computing a 1-based line and column.
    pub fn at(file: &str, src: &str, offset: usize, message: impl Into<String>) -> Self {
        let offset = offset.min(src.len());
        let before = &src[..offset];
        let line = before.matches('\n').count() + 1;
        let column = match before.rfind('\n') {
            Some(nl) => before[nl + 1..].chars().count() + 1,
            None => before.strip_prefix(BOM).unwrap_or(before).chars().count() + 1,
        };
        Self {
            file: file.to_string(),
            line,
            column,
            message: message.into(),
        }
    }

    pub fn from_lex(file: &str, src: &str, err: &LexError) -> Self {
        Self::at(file, src, err.span.start, err.kind.to_string())
    }
}
