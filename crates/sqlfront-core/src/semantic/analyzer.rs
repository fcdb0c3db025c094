//! Name resolution and type checking over a parse tree.

use tracing::{debug, trace};

use super::types::compatible;
use super::{SqlType, SymbolTable, TableSchema, UnknownType};
use crate::diagnostic::Diagnostic;
use crate::tree::{Node, NodeKind};

/// The result of semantic analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Analysis {
    /// Annotated copy of the input tree.
    pub tree: Node,
    /// Tables declared by the program, in declaration order.
    pub symbols: SymbolTable,
    /// Semantic errors, in the order they were found.
    pub errors: Vec<Diagnostic>,
}

impl Analysis {
    /// Returns true if no semantic error was reported.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Analyzes a PROGRAM tree. The input is left untouched.
#[must_use]
pub fn analyze(tree: &Node) -> Analysis {
    Analyzer::new().analyze(tree)
}

/// How a comparison operand resolved.
enum Operand {
    Column(String, SqlType),
    Literal(Option<SqlType>),
    /// Already reported.
    Unresolved,
}

/// Single-pass semantic analyzer. Each instance analyzes one program.
#[derive(Debug, Default)]
pub struct Analyzer {
    symbols: SymbolTable,
    errors: Vec<Diagnostic>,
}

impl Analyzer {
    /// Creates an analyzer with an empty symbol table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs the analysis over `tree` and returns the annotated copy.
    #[must_use]
    pub fn analyze(mut self, tree: &Node) -> Analysis {
        let mut annotated = tree.clone();

        if annotated.kind == NodeKind::Program {
            for statement in &mut annotated.children {
                self.analyze_statement(statement);
            }
        } else {
            self.error("Invalid parse tree: expected PROGRAM node", &annotated);
        }

        debug!(
            tables = self.symbols.len(),
            errors = self.errors.len(),
            "analyzed program"
        );
        Analysis {
            tree: annotated,
            symbols: self.symbols,
            errors: self.errors,
        }
    }

    fn analyze_statement(&mut self, statement: &mut Node) {
        if statement.has_error() {
            trace!(line = statement.line, "skipping statement with syntax errors");
            return;
        }

        let command = if statement.kind.is_command() {
            statement
        } else {
            match statement.children.iter_mut().find(|c| c.kind.is_command()) {
                Some(command) => command,
                None => return,
            }
        };

        let before = self.errors.len();
        let summary = match command.kind {
            NodeKind::CreateTable => self.analyze_create_table(command),
            NodeKind::Insert => self.analyze_insert(command),
            NodeKind::Select => self.analyze_select(command),
            NodeKind::Update => self.analyze_update(command),
            NodeKind::Delete => self.analyze_delete(command),
            _ => None,
        };
        trace!(
            kind = %command.kind,
            errors = self.errors.len() - before,
            "analyzed statement"
        );

        if let Some(summary) = summary {
            if self.errors.len() == before {
                let pos = command.position();
                command.push(Node::leaf(NodeKind::Success, summary, pos));
            }
        }
    }

    fn analyze_create_table(&mut self, node: &mut Node) -> Option<String> {
        let name_node = node.child(NodeKind::Identifier)?;
        let table_name = name_node.text().to_owned();

        if self.symbols.table_exists(&table_name) {
            self.error(format!("Table '{table_name}' already exists"), name_node);
            return None;
        }

        let mut table = TableSchema::new(table_name.as_str());
        if let Some(columns) = node.child_mut(NodeKind::ColumnList) {
            for definition in columns.children_of_mut(NodeKind::ColumnDefinition) {
                self.declare_column(&mut table, definition);
            }
        }

        if table.is_empty() {
            return None;
        }
        let count = table.len();
        self.symbols.add_table(table);
        debug!(table = %table_name, columns = count, "registered table");

        if let Some(name_node) = node.child_mut(NodeKind::Identifier) {
            name_node.symbol_ref = Some(format!("table:{table_name}"));
        }
        Some(format!("✓ Table '{table_name}' created with {count} columns"))
    }

    /// Adds one COLUMN_DEFINITION to `table`, reporting invalid types and
    /// duplicate names. Rejected columns are left out of the table.
    fn declare_column(&mut self, table: &mut TableSchema, definition: &mut Node) {
        let [name_node, type_node] = definition.children.as_mut_slice() else {
            return;
        };
        let column = name_node.text().to_owned();

        // Synonyms such as INTEGER or VARCHAR normalize to their base type.
        let ty = match type_node.text().parse::<SqlType>() {
            Ok(ty) => ty,
            Err(UnknownType(name)) => {
                self.error(
                    format!("Invalid data type '{name}' for column '{column}'"),
                    type_node,
                );
                return;
            }
        };

        if !table.add_column(column.as_str(), ty) {
            self.error(
                format!("Duplicate column '{column}' in table '{}'", table.name),
                name_node,
            );
            return;
        }

        type_node.inferred_type = Some(ty);
        name_node.inferred_type = Some(ty);
        name_node.symbol_ref = Some(format!("{}.{column}", table.name));
    }

    fn analyze_insert(&mut self, node: &mut Node) -> Option<String> {
        let table = self.resolve_table(node.child_mut(NodeKind::Identifier)?)?;

        let explicit = node.child(NodeKind::IdentifierList).is_some();
        let targets: Vec<(String, SqlType)> = match node.child_mut(NodeKind::IdentifierList) {
            Some(list) => {
                let mut targets = Vec::new();
                for ident in list.children_of_mut(NodeKind::Identifier) {
                    let column = ident.text().to_owned();
                    let Some(ty) = table.column_type(&column) else {
                        self.error(
                            format!(
                                "Column '{column}' does not exist in table '{}'",
                                table.name
                            ),
                            ident,
                        );
                        return None;
                    };
                    annotate_column(ident, &table, ty);
                    targets.push((column, ty));
                }
                targets
            }
            None => table
                .columns
                .iter()
                .map(|c| (c.name.clone(), c.ty))
                .collect(),
        };

        let values_node = node.child_mut(NodeKind::ValueList)?;
        let found = values_node
            .children
            .iter()
            .filter(|c| c.kind != NodeKind::Delimiter)
            .count();
        if found != targets.len() {
            let expected = if explicit {
                format!("{} columns listed", targets.len())
            } else {
                format!("table has {} columns", targets.len())
            };
            self.error(
                format!("Column count mismatch: {expected}, but {found} values provided"),
                values_node,
            );
            return None;
        }

        let values = values_node
            .children
            .iter_mut()
            .filter(|c| c.kind != NodeKind::Delimiter);
        for (value, (column, expected)) in values.zip(&targets) {
            let actual = literal_type(value);
            if !compatible(Some(*expected), actual) {
                self.error(
                    format!(
                        "Type mismatch for column '{column}': expected {expected}, got {}",
                        type_name(actual)
                    ),
                    value,
                );
            }
        }

        Some(format!("✓ INSERT values match table '{}' schema", table.name))
    }

    fn analyze_select(&mut self, node: &mut Node) -> Option<String> {
        let mut tables = Vec::new();
        let mut missing = false;
        for ident in node
            .child_mut(NodeKind::TableList)?
            .children_of_mut(NodeKind::Identifier)
        {
            match self.resolve_table(ident) {
                Some(table) => tables.push(table),
                None => missing = true,
            }
        }
        if missing {
            return None;
        }

        if let Some(list) = node
            .child_mut(NodeKind::SelectList)
            .and_then(|s| s.child_mut(NodeKind::IdentifierList))
        {
            for ident in list.children_of_mut(NodeKind::Identifier) {
                self.resolve_column(ident, &tables);
            }
        }

        if let Some(clause) = node.child_mut(NodeKind::WhereClause) {
            self.analyze_where(clause, &tables);
        }

        let names: Vec<&str> = tables.iter().map(|t| t.name.as_str()).collect();
        Some(format!("✓ SELECT from tables {} is valid", names.join(", ")))
    }

    fn analyze_update(&mut self, node: &mut Node) -> Option<String> {
        let table = self.resolve_table(node.child_mut(NodeKind::Identifier)?)?;
        let tables = [table];

        if let Some(assignments) = node.child_mut(NodeKind::AssignmentList) {
            for assignment in assignments.children_of_mut(NodeKind::Assignment) {
                let [target, _, value] = assignment.children.as_mut_slice() else {
                    continue;
                };
                let Some(expected) = self.resolve_column(target, &tables) else {
                    continue;
                };
                let actual = match self.operand(value, &tables) {
                    Operand::Column(_, ty) => Some(ty),
                    Operand::Literal(ty) => ty,
                    Operand::Unresolved => continue,
                };
                if !compatible(Some(expected), actual) {
                    self.error(
                        format!(
                            "Type mismatch for column '{}': expected {expected}, got {}",
                            target.text(),
                            type_name(actual)
                        ),
                        value,
                    );
                }
            }
        }

        if let Some(clause) = node.child_mut(NodeKind::WhereClause) {
            self.analyze_where(clause, &tables);
        }

        let [table] = tables;
        Some(format!("✓ UPDATE of table '{}' is valid", table.name))
    }

    fn analyze_delete(&mut self, node: &mut Node) -> Option<String> {
        let table = self.resolve_table(node.child_mut(NodeKind::Identifier)?)?;
        let tables = [table];

        if let Some(clause) = node.child_mut(NodeKind::WhereClause) {
            self.analyze_where(clause, &tables);
        }

        let [table] = tables;
        Some(format!("✓ DELETE from table '{}' is valid", table.name))
    }

    fn analyze_where(&mut self, clause: &mut Node, tables: &[TableSchema]) {
        for condition in clause.children.iter_mut().filter(|c| c.kind.is_condition()) {
            self.analyze_condition(condition, tables);
        }
    }

    /// Recurses through AND/OR/NOT down to the comparisons.
    fn analyze_condition(&mut self, condition: &mut Node, tables: &[TableSchema]) {
        if condition.kind != NodeKind::Comparison {
            for child in condition.children.iter_mut().filter(|c| c.kind.is_condition()) {
                self.analyze_condition(child, tables);
            }
            return;
        }

        let [left, _, right] = condition.children.as_mut_slice() else {
            return;
        };
        let left = self.operand(left, tables);
        let right = self.operand(right, tables);

        let mismatch = match (&left, &right) {
            (Operand::Column(name, ty), Operand::Literal(other))
            | (Operand::Literal(other), Operand::Column(name, ty)) => {
                (!compatible(Some(*ty), *other)).then(|| {
                    format!(
                        "Type mismatch in comparison: column '{name}' is {ty}, but compared with {}",
                        type_name(*other)
                    )
                })
            }
            (Operand::Column(a, a_ty), Operand::Column(b, b_ty)) => {
                (!a_ty.is_compatible_with(*b_ty)).then(|| {
                    format!(
                        "Type mismatch in comparison: column '{a}' is {a_ty}, but column '{b}' is {b_ty}"
                    )
                })
            }
            (Operand::Literal(a), Operand::Literal(b)) => (!compatible(*a, *b)).then(|| {
                format!(
                    "Type mismatch in comparison: {} compared with {}",
                    type_name(*a),
                    type_name(*b)
                )
            }),
            _ => None,
        };

        if let Some(message) = mismatch {
            self.error(message, condition);
        }
    }

    /// Resolves and annotates one side of a comparison or assignment.
    fn operand(&mut self, node: &mut Node, tables: &[TableSchema]) -> Operand {
        match node.kind {
            NodeKind::Identifier => match self.resolve_column(node, tables) {
                Some(ty) => Operand::Column(node.text().to_owned(), ty),
                None => Operand::Unresolved,
            },
            NodeKind::Literal(_) => Operand::Literal(literal_type(node)),
            _ => Operand::Unresolved,
        }
    }

    /// Looks up a table name, annotating the identifier on success.
    fn resolve_table(&mut self, ident: &mut Node) -> Option<TableSchema> {
        let Some(table) = self.symbols.table(ident.text()).cloned() else {
            self.error(format!("Table '{}' does not exist", ident.text()), ident);
            return None;
        };
        ident.symbol_ref = Some(format!("table:{}", table.name));
        Some(table)
    }

    /// Finds the single table among `tables` that declares the column.
    fn resolve_column(&mut self, ident: &mut Node, tables: &[TableSchema]) -> Option<SqlType> {
        let column = ident.text();
        let matches: Vec<(&TableSchema, SqlType)> = tables
            .iter()
            .filter_map(|t| t.column_type(column).map(|ty| (t, ty)))
            .collect();

        match matches.as_slice() {
            [(table, ty)] => {
                let ty = *ty;
                annotate_column(ident, table, ty);
                Some(ty)
            }
            [] => {
                let message = match tables {
                    [table] => format!(
                        "Column '{column}' does not exist in table '{}'",
                        table.name
                    ),
                    _ => format!(
                        "Column '{column}' does not exist in any of the selected tables: {}",
                        table_names(tables.iter())
                    ),
                };
                self.error(message, ident);
                None
            }
            _ => {
                let message = format!(
                    "Column '{column}' is ambiguous (exists in tables: {})",
                    table_names(matches.iter().map(|(t, _)| *t))
                );
                self.error(message, ident);
                None
            }
        }
    }

    fn error(&mut self, message: impl Into<String>, node: &Node) {
        let diagnostic = Diagnostic::semantic(message, node.position());
        trace!(%diagnostic, "semantic error");
        self.errors.push(diagnostic);
    }
}

fn annotate_column(ident: &mut Node, table: &TableSchema, ty: SqlType) {
    ident.inferred_type = Some(ty);
    ident.symbol_ref = Some(format!("{}.{}", table.name, ident.text()));
}

/// Infers a literal's type and records it on the node.
fn literal_type(node: &mut Node) -> Option<SqlType> {
    let NodeKind::Literal(kind) = node.kind else {
        return None;
    };
    let ty = SqlType::infer_literal(kind, node.text());
    node.inferred_type = ty;
    ty
}

fn type_name(ty: Option<SqlType>) -> &'static str {
    ty.map_or("UNKNOWN", |ty| ty.as_str())
}

fn table_names<'a>(tables: impl Iterator<Item = &'a TableSchema>) -> String {
    tables.map(|t| t.name.as_str()).collect::<Vec<_>>().join(", ")
}
