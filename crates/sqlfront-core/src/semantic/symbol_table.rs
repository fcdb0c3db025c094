//! Tables and columns declared during one analysis pass.

use serde::Serialize;

use super::SqlType;

/// A declared column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnSchema {
    /// Column name.
    pub name: String,
    /// Declared type.
    #[serde(rename = "type")]
    pub ty: SqlType,
}

/// A declared table with its columns in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableSchema {
    /// Table name.
    pub name: String,
    /// Columns, in declaration order.
    pub columns: Vec<ColumnSchema>,
}

impl TableSchema {
    /// Creates a table without columns.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
        }
    }

    /// Appends a column. Returns false, leaving the table unchanged, if a
    /// column with that name already exists.
    pub fn add_column(&mut self, name: impl Into<String>, ty: SqlType) -> bool {
        let name = name.into();
        if self.column(&name).is_some() {
            return false;
        }
        self.columns.push(ColumnSchema { name, ty });
        true
    }

    /// Looks up a column by name.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&ColumnSchema> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Returns the declared type of a column.
    #[must_use]
    pub fn column_type(&self, name: &str) -> Option<SqlType> {
        self.column(name).map(|c| c.ty)
    }

    /// Returns the number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Returns true if the table has no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Table name to column schema mapping, in insertion order.
///
/// A table name can be added only once; re-adding is rejected rather than
/// overwriting the existing definition.
///
/// # Example
///
/// ```rust
/// use sqlfront_core::semantic::{SqlType, SymbolTable, TableSchema};
///
/// let mut users = TableSchema::new("users");
/// users.add_column("id", SqlType::Int);
/// users.add_column("name", SqlType::Text);
///
/// let mut symbols = SymbolTable::new();
/// assert!(symbols.add_table(users));
/// assert_eq!(symbols.column_type("users", "name"), Some(SqlType::Text));
/// assert!(!symbols.add_table(TableSchema::new("users")));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SymbolTable {
    tables: Vec<TableSchema>,
}

impl SymbolTable {
    /// Creates an empty symbol table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a table. Returns false if the name is already taken.
    pub fn add_table(&mut self, table: TableSchema) -> bool {
        if self.table_exists(&table.name) {
            return false;
        }
        self.tables.push(table);
        true
    }

    /// Checks if a table has been declared.
    #[must_use]
    pub fn table_exists(&self, name: &str) -> bool {
        self.table(name).is_some()
    }

    /// Looks up a table by name.
    #[must_use]
    pub fn table(&self, name: &str) -> Option<&TableSchema> {
        self.tables.iter().find(|t| t.name == name)
    }

    /// Returns the declared type of `table.column`.
    #[must_use]
    pub fn column_type(&self, table: &str, column: &str) -> Option<SqlType> {
        self.table(table)?.column_type(column)
    }

    /// Iterates over the tables in insertion order.
    pub fn tables(&self) -> impl Iterator<Item = &TableSchema> {
        self.tables.iter()
    }

    /// Returns the number of tables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Returns true if no table has been declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}
