//! Runs the three stages in order with error gating.
//!
//! The stages themselves never gate each other. This driver does: a
//! program with lexical errors is not parsed, and a program with syntax
//! errors is not analyzed.

use core::fmt;

use serde::Serialize;
use tracing::debug;

use crate::diagnostic::Diagnostic;
use crate::lexer::{tokenize, LexOutput};
use crate::parser::{parse, ParseOutput};
use crate::semantic::{analyze, Analysis};

/// A pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Lexer,
    Parser,
    Analyzer,
}

impl Stage {
    /// Returns the stage name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Lexer => "lexer",
            Self::Parser => "parser",
            Self::Analyzer => "analyzer",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything the pipeline produced for one source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compilation {
    /// Lexer output. Always present.
    pub lex: LexOutput,
    /// Parser output, absent when lexing failed.
    pub parse: Option<ParseOutput>,
    /// Analyzer output, absent when lexing or parsing failed.
    pub analysis: Option<Analysis>,
}

impl Compilation {
    /// Returns the first stage that reported errors, if any.
    #[must_use]
    pub fn failed_stage(&self) -> Option<Stage> {
        if self.lex.has_errors() {
            return Some(Stage::Lexer);
        }
        if self.parse.as_ref().is_some_and(ParseOutput::has_errors) {
            return Some(Stage::Parser);
        }
        if self.analysis.as_ref().is_some_and(|a| !a.is_success()) {
            return Some(Stage::Analyzer);
        }
        None
    }

    /// Returns true if all three stages ran and none reported an error.
    #[must_use]
    pub fn success(&self) -> bool {
        self.analysis.is_some() && self.failed_stage().is_none()
    }

    /// Iterates over all diagnostics, stage by stage.
    pub fn diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
        let parse = self.parse.iter().flat_map(|p| p.errors.iter());
        let analysis = self.analysis.iter().flat_map(|a| a.errors.iter());
        self.lex.errors.iter().chain(parse).chain(analysis)
    }
}

/// Lexes, parses and analyzes `source`, stopping after the first stage
/// that reports errors.
#[must_use]
pub fn compile(source: &str) -> Compilation {
    let lex = tokenize(source);
    if lex.has_errors() {
        debug!(errors = lex.errors.len(), "stopping after lexer");
        return Compilation {
            lex,
            parse: None,
            analysis: None,
        };
    }

    let parsed = parse(&lex.tokens);
    if parsed.has_errors() {
        debug!(errors = parsed.errors.len(), "stopping after parser");
        return Compilation {
            lex,
            parse: Some(parsed),
            analysis: None,
        };
    }

    let analysis = analyze(&parsed.tree);
    Compilation {
        lex,
        parse: Some(parsed),
        analysis: Some(analysis),
    }
}
