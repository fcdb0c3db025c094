//! # sqlfront-core
//!
//! Front-end for a small SQL-like language.
//!
//! This crate provides:
//! - A single-pass lexer producing positioned tokens
//! - A hand-written recursive descent parser that recovers from syntax
//!   errors by synchronizing to the next statement boundary
//! - A semantic analyzer that resolves tables and columns, checks value
//!   types and annotates a copy of the parse tree
//!
//! Each stage returns its primary output together with the diagnostics it
//! found; bad input never makes a stage fail.
//!
//! ## Running the pipeline
//!
//! ```rust
//! use sqlfront_core::{compile, SqlType};
//!
//! let compilation = compile(
//!     "CREATE TABLE users (id INT, name TEXT);
//!      INSERT INTO users VALUES (1, 'ada');",
//! );
//! assert!(compilation.success());
//!
//! let analysis = compilation.analysis.unwrap();
//! assert_eq!(analysis.symbols.column_type("users", "name"), Some(SqlType::Text));
//! ```
//!
//! ## Running stages individually
//!
//! ```rust
//! use sqlfront_core::{analyze, parse, tokenize};
//!
//! let lexed = tokenize("SELECT id FROM users;");
//! let parsed = parse(&lexed.tokens);
//! assert!(parsed.errors.is_empty());
//!
//! let analysis = analyze(&parsed.tree);
//! assert_eq!(
//!     analysis.errors[0].to_string(),
//!     "Semantic Error: Table 'users' does not exist at line 1, position 16"
//! );
//! ```

pub mod diagnostic;
pub mod lexer;
pub mod parser;
pub mod pipeline;
pub mod semantic;
pub mod tree;

pub use diagnostic::{Diagnostic, DiagnosticKind};
pub use lexer::{tokenize, LexOutput, Lexer, Position, Token, TokenKind};
pub use parser::{parse, ParseOutput, Parser};
pub use pipeline::{compile, Compilation, Stage};
pub use semantic::{analyze, Analysis, Analyzer, SqlType, SymbolTable};
pub use tree::{Node, NodeKind};
