//! Parse tree nodes.

use core::fmt;

use serde::Serialize;

use crate::lexer::{Position, Token, TokenKind};
use crate::semantic::SqlType;

/// The lexical form a literal was written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum LiteralKind {
    /// Digits only.
    Int,
    /// Digits with a decimal point.
    Float,
    /// Single-quoted text.
    String,
}

impl LiteralKind {
    /// Maps a literal token kind to its literal kind.
    #[must_use]
    pub const fn from_token_kind(kind: TokenKind) -> Option<Self> {
        match kind {
            TokenKind::IntLiteral => Some(Self::Int),
            TokenKind::FloatLiteral => Some(Self::Float),
            TokenKind::StringLiteral => Some(Self::String),
            _ => None,
        }
    }
}

/// Node tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum NodeKind {
    Program,
    Statement,
    CreateTable,
    Insert,
    Select,
    Update,
    Delete,
    ColumnList,
    ColumnDefinition,
    DataType,
    Identifier,
    IdentifierList,
    TableList,
    SelectList,
    ValueList,
    AssignmentList,
    Assignment,
    WhereClause,
    AndCondition,
    OrCondition,
    NotCondition,
    Comparison,
    Literal(LiteralKind),
    Keyword,
    Operator,
    Delimiter,
    /// A grammar rule could not be satisfied here. Always a leaf.
    Error,
    /// Informational note attached by the semantic analyzer.
    Success,
}

impl NodeKind {
    /// Returns the tag name used by renderers.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Program => "PROGRAM",
            Self::Statement => "STATEMENT",
            Self::CreateTable => "CREATE_TABLE",
            Self::Insert => "INSERT",
            Self::Select => "SELECT",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
            Self::ColumnList => "COLUMN_LIST",
            Self::ColumnDefinition => "COLUMN_DEFINITION",
            Self::DataType => "DATA_TYPE",
            Self::Identifier => "IDENTIFIER",
            Self::IdentifierList => "IDENTIFIER_LIST",
            Self::TableList => "TABLE_LIST",
            Self::SelectList => "SELECT_LIST",
            Self::ValueList => "VALUE_LIST",
            Self::AssignmentList => "ASSIGNMENT_LIST",
            Self::Assignment => "ASSIGNMENT",
            Self::WhereClause => "WHERE_CLAUSE",
            Self::AndCondition => "AND_CONDITION",
            Self::OrCondition => "OR_CONDITION",
            Self::NotCondition => "NOT_CONDITION",
            Self::Comparison => "COMPARISON",
            Self::Literal(_) => "LITERAL",
            Self::Keyword => "KEYWORD",
            Self::Operator => "OPERATOR",
            Self::Delimiter => "DELIMITER",
            Self::Error => "ERROR",
            Self::Success => "SUCCESS",
        }
    }

    /// Returns true for the five command kinds a STATEMENT wraps.
    #[must_use]
    pub const fn is_command(&self) -> bool {
        matches!(
            self,
            Self::CreateTable | Self::Insert | Self::Select | Self::Update | Self::Delete
        )
    }

    /// Returns true for AND/OR/NOT wrappers and comparisons.
    #[must_use]
    pub const fn is_condition(&self) -> bool {
        matches!(
            self,
            Self::AndCondition | Self::OrCondition | Self::NotCondition | Self::Comparison
        )
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parse tree node. A parent exclusively owns its children.
///
/// `inferred_type` and `symbol_ref` are empty after parsing; only the
/// semantic analyzer fills them in, on its own copy of the tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Node {
    /// The node tag.
    pub kind: NodeKind,
    /// Text payload (lexeme, type name, message, ...).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Ordered children.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Self>,
    /// Line of the construct's first token.
    pub line: usize,
    /// Column of the construct's first token.
    pub column: usize,
    /// Scalar type inferred by the semantic analyzer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inferred_type: Option<SqlType>,
    /// Resolved symbol, e.g. `table:users` or `users.id`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol_ref: Option<String>,
}

impl Node {
    /// Creates an interior node without a value.
    #[must_use]
    pub const fn new(kind: NodeKind, pos: Position) -> Self {
        Self {
            kind,
            value: None,
            children: Vec::new(),
            line: pos.line,
            column: pos.column,
            inferred_type: None,
            symbol_ref: None,
        }
    }

    /// Creates a leaf carrying a value.
    #[must_use]
    pub fn leaf(kind: NodeKind, value: impl Into<String>, pos: Position) -> Self {
        Self {
            value: Some(value.into()),
            ..Self::new(kind, pos)
        }
    }

    /// Creates a leaf from a token, using its lexeme as value.
    #[must_use]
    pub fn from_token(kind: NodeKind, token: &Token) -> Self {
        Self::leaf(kind, token.lexeme.clone(), token.position())
    }

    /// Creates an ERROR leaf.
    #[must_use]
    pub fn error(message: impl Into<String>, pos: Position) -> Self {
        Self::leaf(NodeKind::Error, message, pos)
    }

    /// Appends a child.
    pub fn push(&mut self, child: Self) {
        self.children.push(child);
    }

    /// Builder-style [`push`](Self::push).
    #[must_use]
    pub fn with_child(mut self, child: Self) -> Self {
        self.push(child);
        self
    }

    /// Returns where the construct starts.
    #[must_use]
    pub const fn position(&self) -> Position {
        Position::new(self.line, self.column)
    }

    /// Returns the value, or the empty string.
    #[must_use]
    pub fn text(&self) -> &str {
        self.value.as_deref().unwrap_or_default()
    }

    /// Returns true if this node is an ERROR leaf.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.kind == NodeKind::Error
    }

    /// Returns true if this node or any descendant is an ERROR node.
    #[must_use]
    pub fn has_error(&self) -> bool {
        self.is_error() || self.children.iter().any(Self::has_error)
    }

    /// Returns the first direct child of the given kind.
    #[must_use]
    pub fn child(&self, kind: NodeKind) -> Option<&Self> {
        self.children.iter().find(|c| c.kind == kind)
    }

    /// Mutable variant of [`child`](Self::child).
    pub fn child_mut(&mut self, kind: NodeKind) -> Option<&mut Self> {
        self.children.iter_mut().find(|c| c.kind == kind)
    }

    /// Iterates over the direct children of the given kind.
    pub fn children_of(&self, kind: NodeKind) -> impl Iterator<Item = &Self> {
        self.children.iter().filter(move |c| c.kind == kind)
    }

    /// Mutable variant of [`children_of`](Self::children_of).
    pub fn children_of_mut(&mut self, kind: NodeKind) -> impl Iterator<Item = &mut Self> {
        self.children.iter_mut().filter(move |c| c.kind == kind)
    }

    /// Iterates over this node and all its descendants, depth first.
    #[must_use]
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }

    /// Counts the nodes of the given kind in this subtree.
    #[must_use]
    pub fn count(&self, kind: NodeKind) -> usize {
        self.descendants().filter(|n| n.kind == kind).count()
    }
}

/// Pre-order iterator returned by [`Node::descendants`].
pub struct Descendants<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(name: &str, column: usize) -> Node {
        Node::leaf(NodeKind::Identifier, name, Position::new(1, column))
    }

    #[test]
    fn test_new_node_has_no_annotations() {
        let node = Node::new(NodeKind::Select, Position::new(2, 3));
        assert_eq!(node.position(), Position::new(2, 3));
        assert!(node.value.is_none());
        assert!(node.inferred_type.is_none());
        assert!(node.symbol_ref.is_none());
        assert_eq!(node.text(), "");
    }

    #[test]
    fn test_has_error_is_recursive() {
        let clean = Node::new(NodeKind::TableList, Position::start()).with_child(ident("t", 1));
        assert!(!clean.has_error());

        let broken = Node::new(NodeKind::Select, Position::start()).with_child(
            Node::new(NodeKind::TableList, Position::start())
                .with_child(Node::error("MISSING table name", Position::start())),
        );
        assert!(broken.has_error());
    }

    #[test]
    fn test_child_lookup() {
        let list = Node::new(NodeKind::IdentifierList, Position::start())
            .with_child(ident("a", 1))
            .with_child(Node::leaf(NodeKind::Delimiter, ",", Position::new(1, 2)))
            .with_child(ident("b", 4));
        assert_eq!(list.child(NodeKind::Identifier).map(Node::text), Some("a"));
        let names: Vec<_> = list.children_of(NodeKind::Identifier).map(Node::text).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert!(list.child(NodeKind::Literal(LiteralKind::Int)).is_none());
    }

    #[test]
    fn test_descendants_pre_order() {
        let tree = Node::new(NodeKind::Program, Position::start())
            .with_child(Node::new(NodeKind::Statement, Position::start()).with_child(ident("x", 1)))
            .with_child(Node::new(NodeKind::Statement, Position::start()));
        let kinds: Vec<_> = tree.descendants().map(|n| n.kind).collect();
        assert_eq!(
            kinds,
            vec![
                NodeKind::Program,
                NodeKind::Statement,
                NodeKind::Identifier,
                NodeKind::Statement,
            ]
        );
        assert_eq!(tree.count(NodeKind::Statement), 2);
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(NodeKind::CreateTable.to_string(), "CREATE_TABLE");
        assert_eq!(NodeKind::Literal(LiteralKind::String).to_string(), "LITERAL");
        assert_eq!(NodeKind::NotCondition.to_string(), "NOT_CONDITION");
        assert!(NodeKind::Delete.is_command());
        assert!(NodeKind::Comparison.is_condition());
        assert!(!NodeKind::WhereClause.is_condition());
    }

    #[test]
    fn test_literal_kind_from_token_kind() {
        assert_eq!(
            LiteralKind::from_token_kind(TokenKind::FloatLiteral),
            Some(LiteralKind::Float)
        );
        assert_eq!(LiteralKind::from_token_kind(TokenKind::Identifier), None);
    }
}
