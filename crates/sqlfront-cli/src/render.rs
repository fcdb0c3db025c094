//! Text and JSON renderings of pipeline output.
//!
//! The text forms are line-oriented:
//!
//! - tokens: `<KIND, 'lexeme', line, column>`
//! - trees: two spaces per depth, `NODE_KIND (value) [type: T] [ref: R]`
//! - symbol tables: `Table: <name>` followed by `  <column>: <TYPE>`

use core::fmt;

use serde::Serialize;
use sqlfront_core::{Compilation, Diagnostic, DiagnosticKind, Node, Stage, SymbolTable, Token};

use crate::Mode;

/// Token listing, one token per line.
pub struct TokenListing<'a>(pub &'a [Token]);

impl fmt::Display for TokenListing<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for token in self.0 {
            writeln!(f, "{token}")?;
        }
        Ok(())
    }
}

/// Indented tree, one node per line.
pub struct TreeText<'a>(pub &'a Node);

impl TreeText<'_> {
    fn write_node(f: &mut fmt::Formatter<'_>, node: &Node, depth: usize) -> fmt::Result {
        write!(f, "{:indent$}{}", "", node.kind, indent = depth * 2)?;
        if let Some(value) = node.value.as_deref().filter(|v| !v.is_empty()) {
            write!(f, " ({value})")?;
        }
        if let Some(ty) = node.inferred_type {
            write!(f, " [type: {ty}]")?;
        }
        if let Some(symbol) = &node.symbol_ref {
            write!(f, " [ref: {symbol}]")?;
        }
        writeln!(f)?;
        for child in &node.children {
            Self::write_node(f, child, depth + 1)?;
        }
        Ok(())
    }
}

impl fmt::Display for TreeText<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Self::write_node(f, self.0, 0)
    }
}

/// Symbol table dump in declaration order.
pub struct SymbolText<'a>(pub &'a SymbolTable);

impl fmt::Display for SymbolText<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return writeln!(f, "(Empty)");
        }
        for table in self.0.tables() {
            writeln!(f, "Table: {}", table.name)?;
            for column in &table.columns {
                writeln!(f, "  {}: {}", column.name, column.ty)?;
            }
        }
        Ok(())
    }
}

/// Diagnostics grouped by the stages that ran, followed by a summary.
pub struct DiagnosticsText<'a>(pub &'a Compilation);

impl DiagnosticsText<'_> {
    fn write_group(f: &mut fmt::Formatter<'_>, title: &str, errors: &[Diagnostic]) -> fmt::Result {
        writeln!(f, "{title} Errors:")?;
        if errors.is_empty() {
            return writeln!(f, "  (none)");
        }
        for error in errors {
            writeln!(f, "  {error}")?;
        }
        Ok(())
    }
}

impl fmt::Display for DiagnosticsText<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = self.0;
        Self::write_group(f, "Lexical", &c.lex.errors)?;
        if let Some(parse) = &c.parse {
            Self::write_group(f, "Syntax", &parse.errors)?;
        }
        if let Some(analysis) = &c.analysis {
            Self::write_group(f, "Semantic", &analysis.errors)?;
        }

        let count = |kind| c.diagnostics().filter(|d| d.kind == kind).count();
        write!(
            f,
            "Summary: {} lexical, {} syntax, {} semantic",
            count(DiagnosticKind::Lexical),
            count(DiagnosticKind::Syntax),
            count(DiagnosticKind::Semantic),
        )?;
        match c.failed_stage() {
            Some(stage) => writeln!(f, " (stopped after {stage})"),
            None => writeln!(f),
        }
    }
}

/// The full text report for a run.
pub struct TextReport<'a> {
    /// What was requested.
    pub mode: Mode,
    /// What the pipeline produced.
    pub compilation: &'a Compilation,
}

impl fmt::Display for TextReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = self.compilation;
        match self.mode {
            Mode::Lex => {
                writeln!(f, "=== Tokens ===")?;
                write!(f, "{}", TokenListing(&c.lex.tokens))?;
            }
            Mode::Parse | Mode::Check => {
                if let Some(tree) = final_tree(c) {
                    writeln!(f, "=== Parse Tree ===")?;
                    write!(f, "{}", TreeText(tree))?;
                    writeln!(f)?;
                }
                if let Some(analysis) = &c.analysis {
                    writeln!(f, "=== Symbol Table ===")?;
                    write!(f, "{}", SymbolText(&analysis.symbols))?;
                    writeln!(f)?;
                }
            }
        }
        writeln!(f, "=== Diagnostics ===")?;
        write!(f, "{}", DiagnosticsText(c))
    }
}

/// The annotated tree when analysis ran, else the parse tree.
fn final_tree(c: &Compilation) -> Option<&Node> {
    c.analysis
        .as_ref()
        .map(|a| &a.tree)
        .or_else(|| c.parse.as_ref().map(|p| &p.tree))
}

#[derive(Serialize)]
struct JsonReport<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    tokens: Option<&'a [Token]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tree: Option<&'a Node>,
    #[serde(skip_serializing_if = "Option::is_none")]
    symbols: Option<&'a SymbolTable>,
    diagnostics: Vec<&'a Diagnostic>,
    failed_stage: Option<Stage>,
    success: bool,
}

/// Renders the run as pretty-printed JSON.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn json_report(mode: Mode, c: &Compilation) -> serde_json::Result<String> {
    let report = JsonReport {
        tokens: (mode == Mode::Lex).then_some(c.lex.tokens.as_slice()),
        tree: (mode != Mode::Lex).then(|| final_tree(c)).flatten(),
        symbols: c.analysis.as_ref().map(|a| &a.symbols),
        diagnostics: c.diagnostics().collect(),
        failed_stage: c.failed_stage(),
        success: c.failed_stage().is_none(),
    };
    serde_json::to_string_pretty(&report)
}
