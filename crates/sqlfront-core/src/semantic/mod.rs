//! Semantic Analysis
//!
//! Walks a parse tree top-down, building the symbol table from CREATE
//! TABLE statements and checking every table and column reference and
//! every value against the declared column types. The result is an
//! annotated copy of the tree: identifiers carry their resolved symbol
//! and type, literals their inferred type.

mod analyzer;
mod symbol_table;
mod types;

pub use analyzer::{analyze, Analysis, Analyzer};
pub use symbol_table::{ColumnSchema, SymbolTable, TableSchema};
pub use types::{compatible, SqlType, UnknownType};
