//! Diagnostics produced by the lexer, parser and semantic analyzer.
//!
//! Every stage reports problems as data. A stage never aborts because of
//! bad input: it records a [`Diagnostic`] and keeps going, returning the
//! full list alongside its primary output.

use core::fmt;

use serde::Serialize;

use crate::lexer::Position;

/// The stage a diagnostic originates from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DiagnosticKind {
    /// Malformed tokens (unterminated strings, invalid characters, ...).
    Lexical,
    /// Grammar violations.
    Syntax,
    /// Name resolution and type violations.
    Semantic,
}

impl DiagnosticKind {
    /// Returns the human-readable name of the kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Lexical => "Lexical",
            Self::Syntax => "Syntax",
            Self::Semantic => "Semantic",
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single error record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{kind} Error: {message} at line {line}, position {column}")]
pub struct Diagnostic {
    /// Which stage reported the problem.
    pub kind: DiagnosticKind,
    /// Description of the problem.
    pub message: String,
    /// 1-based source line.
    pub line: usize,
    /// 1-based source column.
    pub column: usize,
}

impl Diagnostic {
    /// Creates a diagnostic of the given kind at a position.
    #[must_use]
    pub fn new(kind: DiagnosticKind, message: impl Into<String>, pos: Position) -> Self {
        Self {
            kind,
            message: message.into(),
            line: pos.line,
            column: pos.column,
        }
    }

    /// Creates a lexical diagnostic.
    #[must_use]
    pub fn lexical(message: impl Into<String>, pos: Position) -> Self {
        Self::new(DiagnosticKind::Lexical, message, pos)
    }

    /// Creates a syntax diagnostic.
    #[must_use]
    pub fn syntax(message: impl Into<String>, pos: Position) -> Self {
        Self::new(DiagnosticKind::Syntax, message, pos)
    }

    /// Creates a semantic diagnostic.
    #[must_use]
    pub fn semantic(message: impl Into<String>, pos: Position) -> Self {
        Self::new(DiagnosticKind::Semantic, message, pos)
    }

    /// Returns the source position of the diagnostic.
    #[must_use]
    pub const fn position(&self) -> Position {
        Position::new(self.line, self.column)
    }
}
