//! Command-line driver for the `sqlfront` pipeline.
//!
//! The driver reads a SQL file, runs the pipeline up to the requested
//! stage and renders the result:
//!
//! - `lex` prints the token stream
//! - `parse` prints the parse tree
//! - `check` prints the annotated tree and the symbol table
//!
//! Every mode finishes with the diagnostics of the stages that ran.
//!
//! # Example
//!
//! ```rust
//! use sqlfront_cli::{run, Format, Mode};
//!
//! let report = run(Mode::Check, "CREATE TABLE t (a INT);", Format::Text).unwrap();
//! assert!(report.failed.is_none());
//! assert!(report.output.contains("Table: t"));
//! ```

use std::path::Path;

use anyhow::Context;
use clap::ValueEnum;
use sqlfront_core::{compile, parse, tokenize, Compilation, Stage};
use tracing::{debug, info};

pub mod error;
pub mod render;

use error::CliError;
use render::{json_report, TextReport};

/// Output format of a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Format {
    /// Human-readable listing.
    #[default]
    Text,
    /// Pretty-printed JSON.
    Json,
}

/// How far to run the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Tokenize only.
    Lex,
    /// Tokenize and parse.
    Parse,
    /// Run every stage.
    Check,
}

/// The rendered outcome of one run.
#[derive(Debug, Clone)]
pub struct Report {
    /// The rendered report.
    pub output: String,
    /// The first stage that reported errors.
    pub failed: Option<Stage>,
    /// Number of diagnostics across all stages that ran.
    pub errors: usize,
}

impl Report {
    /// Converts a failed run into an error.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::Diagnostics`] if any stage reported errors.
    pub fn check(&self) -> error::Result<()> {
        match self.failed {
            Some(stage) => Err(CliError::Diagnostics {
                stage,
                count: self.errors,
            }),
            None => Ok(()),
        }
    }
}

/// Runs the pipeline on `source` up to the stage `mode` asks for.
fn run_stages(mode: Mode, source: &str) -> Compilation {
    match mode {
        Mode::Lex => Compilation {
            lex: tokenize(source),
            parse: None,
            analysis: None,
        },
        Mode::Parse => {
            let lex = tokenize(source);
            let parsed = (!lex.has_errors()).then(|| parse(&lex.tokens));
            Compilation {
                lex,
                parse: parsed,
                analysis: None,
            }
        }
        Mode::Check => compile(source),
    }
}

/// Runs `source` and renders the report.
///
/// # Errors
///
/// Returns an error if the JSON report cannot be serialized. Diagnostics
/// are not errors here; see [`Report::check`].
pub fn run(mode: Mode, source: &str, format: Format) -> error::Result<Report> {
    let compilation = run_stages(mode, source);
    let failed = compilation.failed_stage();
    let errors = compilation.diagnostics().count();
    debug!(?mode, ?failed, errors, "pipeline finished");

    let output = match format {
        Format::Text => TextReport {
            mode,
            compilation: &compilation,
        }
        .to_string(),
        Format::Json => json_report(mode, &compilation)?,
    };

    Ok(Report {
        output,
        failed,
        errors,
    })
}

/// Reads `path` and runs it.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the report cannot be
/// rendered.
pub fn run_file(mode: Mode, path: &Path, format: Format) -> anyhow::Result<Report> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read '{}'", path.display()))?;
    info!("Processing {} ({} bytes)", path.display(), source.len());
    Ok(run(mode, &source, format)?)
}
