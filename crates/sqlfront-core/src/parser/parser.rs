//! Statement-level grammar, token cursor and error recovery.

use tracing::{debug, trace};

use super::error::{Incomplete, Rule};
use crate::diagnostic::Diagnostic;
use crate::lexer::{Delimiter, Keyword, Operator, Position, Token, TokenKind};
use crate::tree::{Node, NodeKind};

/// How deep parentheses, `NOT` and chained AND/OR operands may nest in one
/// condition. Deeper input is a syntax error.
pub const MAX_CONDITION_DEPTH: usize = 128;

/// The result of parsing a token sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOutput {
    /// The PROGRAM root. Failed rules appear as ERROR leaves.
    pub tree: Node,
    /// Syntax errors, in the order they were found.
    pub errors: Vec<Diagnostic>,
}

impl ParseOutput {
    /// Returns true if any syntax error was reported.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Parses a token sequence into a PROGRAM tree.
///
/// Terminates on any input, including sequences without a trailing EOF.
#[must_use]
pub fn parse(tokens: &[Token]) -> ParseOutput {
    Parser::new(tokens).parse()
}

/// Recursive descent parser with a single cursor into the tokens.
pub struct Parser<'a> {
    tokens: &'a [Token],
    current: usize,
    /// Returned once the cursor runs past the last token.
    eof: Token,
    errors: Vec<Diagnostic>,
    /// Nesting level inside the condition being parsed.
    pub(super) depth: usize,
}

impl<'a> Parser<'a> {
    /// Creates a new parser over `tokens`.
    #[must_use]
    pub fn new(tokens: &'a [Token]) -> Self {
        let end = tokens
            .last()
            .map_or_else(Position::start, |t| {
                Position::new(t.line, t.column + t.lexeme.chars().count())
            });
        Self {
            tokens,
            current: 0,
            eof: Token::eof(end),
            errors: Vec::new(),
            depth: 0,
        }
    }

    /// Parses the whole program.
    #[must_use]
    pub fn parse(mut self) -> ParseOutput {
        let mut program = Node::new(NodeKind::Program, self.current().position());

        while !self.current().is_eof() {
            // Stray semicolons between statements.
            if self.check_delimiter(Delimiter::Semicolon) {
                self.advance();
                continue;
            }
            let statement = self.parse_statement();
            trace!(
                line = statement.line,
                ok = !statement.has_error(),
                "parsed statement"
            );
            program.push(statement);
        }

        debug!(
            statements = program.children.len(),
            errors = self.errors.len(),
            "parsed program"
        );
        ParseOutput {
            tree: program,
            errors: self.errors,
        }
    }

    /// statement := sql_command ';'
    fn parse_statement(&mut self) -> Node {
        let mut statement = Node::new(NodeKind::Statement, self.current().position());

        let command = match self.current().as_keyword() {
            Some(Keyword::Create) => self.parse_create_table(),
            Some(Keyword::Insert) => self.parse_insert(),
            Some(Keyword::Select) => self.parse_select(),
            Some(Keyword::Update) => self.parse_update(),
            Some(Keyword::Delete) => self.parse_delete(),
            _ => Err(self.fail("a statement (CREATE, INSERT, SELECT, UPDATE or DELETE)")),
        };

        match command {
            Ok(command) => {
                statement.push(command);
                if self.check_delimiter(Delimiter::Semicolon) {
                    statement.push(self.take(NodeKind::Delimiter));
                } else {
                    let Incomplete(error) = self.fail("';' after statement");
                    statement.push(error);
                    self.synchronize();
                }
            }
            Err(Incomplete(partial)) => {
                // The command already reported its error; don't also demand a ';'.
                statement.push(partial);
                self.synchronize();
            }
        }
        statement
    }

    /// create_table := 'CREATE' 'TABLE' identifier '(' column_list ')'
    fn parse_create_table(&mut self) -> Rule {
        let mut node = Node::new(NodeKind::CreateTable, self.current().position());
        attach!(node, self.expect_keyword(Keyword::Create));
        attach!(node, self.expect_keyword(Keyword::Table));
        attach!(node, self.expect_identifier("table name"));
        attach!(node, self.expect_delimiter(Delimiter::LeftParen));
        attach!(
            node,
            self.parse_comma_list(NodeKind::ColumnList, Self::parse_column_definition)
        );
        attach!(node, self.expect_delimiter(Delimiter::RightParen));
        Ok(node)
    }

    /// column_def := identifier data_type
    fn parse_column_definition(&mut self) -> Rule {
        let mut node = Node::new(NodeKind::ColumnDefinition, self.current().position());
        attach!(node, self.expect_identifier("column name"));
        attach!(node, self.parse_data_type());
        Ok(node)
    }

    /// data_type := 'INT' | 'FLOAT' | 'TEXT'
    fn parse_data_type(&mut self) -> Rule {
        if self.current().as_keyword().is_some_and(|kw| kw.is_data_type()) {
            Ok(self.take(NodeKind::DataType))
        } else {
            Err(self.fail("data type (INT, FLOAT or TEXT)"))
        }
    }

    /// insert := 'INSERT' 'INTO' identifier ['(' identifier_list ')'] 'VALUES' value_list
    fn parse_insert(&mut self) -> Rule {
        let mut node = Node::new(NodeKind::Insert, self.current().position());
        attach!(node, self.expect_keyword(Keyword::Insert));
        attach!(node, self.expect_keyword(Keyword::Into));
        attach!(node, self.expect_identifier("table name"));
        if self.check_delimiter(Delimiter::LeftParen) {
            node.push(self.take(NodeKind::Delimiter));
            attach!(node, self.parse_identifier_list("column name"));
            attach!(node, self.expect_delimiter(Delimiter::RightParen));
        }
        attach!(node, self.expect_keyword(Keyword::Values));
        attach!(node, self.parse_value_list());
        Ok(node)
    }

    /// value_list := '(' expression (',' expression)* ')'
    fn parse_value_list(&mut self) -> Rule {
        let mut node = Node::new(NodeKind::ValueList, self.current().position());
        attach!(node, self.expect_delimiter(Delimiter::LeftParen));
        attach!(node, self.parse_expression());
        while self.check_delimiter(Delimiter::Comma) {
            node.push(self.take(NodeKind::Delimiter));
            attach!(node, self.parse_expression());
        }
        attach!(node, self.expect_delimiter(Delimiter::RightParen));
        Ok(node)
    }

    /// select := 'SELECT' select_list 'FROM' table_list [where_clause]
    fn parse_select(&mut self) -> Rule {
        let mut node = Node::new(NodeKind::Select, self.current().position());
        attach!(node, self.expect_keyword(Keyword::Select));
        attach!(node, self.parse_select_list());
        attach!(node, self.expect_keyword(Keyword::From));
        attach!(
            node,
            self.parse_comma_list(NodeKind::TableList, |p| p.expect_identifier("table name"))
        );
        if self.check_keyword(Keyword::Where) {
            attach!(node, self.parse_where_clause());
        }
        Ok(node)
    }

    /// select_list := '*' | identifier_list
    fn parse_select_list(&mut self) -> Rule {
        let mut node = Node::new(NodeKind::SelectList, self.current().position());
        if self.check_operator(Operator::Star) {
            node.push(self.take(NodeKind::Operator));
        } else {
            attach!(node, self.parse_identifier_list("column name or '*'"));
        }
        Ok(node)
    }

    /// update := 'UPDATE' identifier 'SET' assignment_list [where_clause]
    fn parse_update(&mut self) -> Rule {
        let mut node = Node::new(NodeKind::Update, self.current().position());
        attach!(node, self.expect_keyword(Keyword::Update));
        attach!(node, self.expect_identifier("table name"));
        attach!(node, self.expect_keyword(Keyword::Set));
        attach!(
            node,
            self.parse_comma_list(NodeKind::AssignmentList, Self::parse_assignment)
        );
        if self.check_keyword(Keyword::Where) {
            attach!(node, self.parse_where_clause());
        }
        Ok(node)
    }

    /// assignment := identifier '=' expression
    fn parse_assignment(&mut self) -> Rule {
        let mut node = Node::new(NodeKind::Assignment, self.current().position());
        attach!(node, self.expect_identifier("column name"));
        attach!(node, self.expect_operator(Operator::Eq));
        attach!(node, self.parse_expression());
        Ok(node)
    }

    /// delete := 'DELETE' 'FROM' identifier [where_clause]
    fn parse_delete(&mut self) -> Rule {
        let mut node = Node::new(NodeKind::Delete, self.current().position());
        attach!(node, self.expect_keyword(Keyword::Delete));
        attach!(node, self.expect_keyword(Keyword::From));
        attach!(node, self.expect_identifier("table name"));
        if self.check_keyword(Keyword::Where) {
            attach!(node, self.parse_where_clause());
        }
        Ok(node)
    }

    /// identifier_list := identifier (',' identifier)*
    fn parse_identifier_list(&mut self, what: &str) -> Rule {
        self.parse_comma_list(NodeKind::IdentifierList, |p| p.expect_identifier(what))
    }

    /// Parses `item (',' item)*` into a node of the given kind, keeping
    /// the commas as DELIMITER children.
    fn parse_comma_list(
        &mut self,
        kind: NodeKind,
        mut item: impl FnMut(&mut Self) -> Rule,
    ) -> Rule {
        let mut node = Node::new(kind, self.current().position());
        attach!(node, item(self));
        while self.check_delimiter(Delimiter::Comma) {
            node.push(self.take(NodeKind::Delimiter));
            attach!(node, item(self));
        }
        Ok(node)
    }

    /// Skips tokens up to the next statement boundary: a `;` (consumed),
    /// a statement keyword (not consumed) or EOF.
    fn synchronize(&mut self) {
        let from = self.current;
        loop {
            let token = self.current();
            if token.is_eof() {
                break;
            }
            if token.is_delimiter(Delimiter::Semicolon) {
                self.advance();
                break;
            }
            if token.as_keyword().is_some_and(|kw| kw.starts_statement()) {
                break;
            }
            self.advance();
        }
        debug!(skipped = self.current - from, "synchronized after syntax error");
    }

    // --- Helper methods ---

    /// Returns the token under the cursor.
    pub(super) fn current(&self) -> &Token {
        self.tokens.get(self.current).unwrap_or(&self.eof)
    }

    /// Advances to the next token. Never moves past the end.
    pub(super) fn advance(&mut self) {
        if self.current < self.tokens.len() {
            self.current += 1;
        }
    }

    /// Turns the current token into a leaf of the given kind and advances.
    pub(super) fn take(&mut self, kind: NodeKind) -> Node {
        let node = Node::from_token(kind, self.current());
        self.advance();
        node
    }

    /// Checks if the current token is the given keyword.
    pub(super) fn check_keyword(&self, keyword: Keyword) -> bool {
        self.current().is_keyword(keyword)
    }

    /// Checks if the current token is the given delimiter.
    pub(super) fn check_delimiter(&self, delimiter: Delimiter) -> bool {
        self.current().is_delimiter(delimiter)
    }

    /// Checks if the current token is the given operator.
    pub(super) fn check_operator(&self, operator: Operator) -> bool {
        self.current().is_operator(operator)
    }

    /// Records "expected X but found Y" and builds the ERROR leaf for it.
    pub(super) fn fail(&mut self, expected: &str) -> Incomplete {
        let found = self.current().describe().to_owned();
        self.fail_with(
            format!("Expected {expected} but found '{found}'"),
            format!("MISSING {expected} (found '{found}' instead)"),
        )
    }

    /// Records `message` at the current token and builds an ERROR leaf
    /// holding `leaf`.
    pub(super) fn fail_with(&mut self, message: String, leaf: String) -> Incomplete {
        let pos = self.current().position();
        self.errors.push(Diagnostic::syntax(message, pos));
        Incomplete(Node::error(leaf, pos))
    }

    /// Expects the current token to be the given keyword.
    pub(super) fn expect_keyword(&mut self, keyword: Keyword) -> Rule {
        if self.check_keyword(keyword) {
            Ok(self.take(NodeKind::Keyword))
        } else {
            Err(self.fail(&format!("'{keyword}'")))
        }
    }

    /// Expects the current token to be the given delimiter.
    pub(super) fn expect_delimiter(&mut self, delimiter: Delimiter) -> Rule {
        if self.check_delimiter(delimiter) {
            Ok(self.take(NodeKind::Delimiter))
        } else {
            Err(self.fail(&format!("'{}'", delimiter.as_str())))
        }
    }

    /// Expects the current token to be the given operator.
    pub(super) fn expect_operator(&mut self, operator: Operator) -> Rule {
        if self.check_operator(operator) {
            Ok(self.take(NodeKind::Operator))
        } else {
            Err(self.fail(&format!("'{}'", operator.as_str())))
        }
    }

    /// Expects an identifier; `what` names it in the error message.
    pub(super) fn expect_identifier(&mut self, what: &str) -> Rule {
        if self.current().kind == TokenKind::Identifier {
            Ok(self.take(NodeKind::Identifier))
        } else {
            Err(self.fail(what))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use crate::tree::LiteralKind;

    fn parse_sql(sql: &str) -> ParseOutput {
        let lexed = tokenize(sql);
        assert!(lexed.errors.is_empty(), "lexical errors: {:?}", lexed.errors);
        parse(&lexed.tokens)
    }

    fn command(out: &ParseOutput, index: usize) -> &Node {
        &out.tree.children[index].children[0]
    }

    fn kinds(node: &Node) -> Vec<NodeKind> {
        node.children.iter().map(|c| c.kind).collect()
    }

    #[test]
    fn test_empty_program() {
        let out = parse(&tokenize("").tokens);
        assert_eq!(out.tree.kind, NodeKind::Program);
        assert!(out.tree.children.is_empty());
        assert!(!out.has_errors());
    }

    #[test]
    fn test_create_table_shape() {
        let out = parse_sql("CREATE TABLE t (a INT, b TEXT);");
        assert!(!out.has_errors());
        let create = command(&out, 0);
        assert_eq!(create.kind, NodeKind::CreateTable);
        assert_eq!(
            kinds(create),
            vec![
                NodeKind::Keyword,
                NodeKind::Keyword,
                NodeKind::Identifier,
                NodeKind::Delimiter,
                NodeKind::ColumnList,
                NodeKind::Delimiter,
            ]
        );
        let columns = create.child(NodeKind::ColumnList).unwrap();
        let defs: Vec<_> = columns.children_of(NodeKind::ColumnDefinition).collect();
        assert_eq!(defs.len(), 2);
        assert_eq!(defs[1].children[1].kind, NodeKind::DataType);
        assert_eq!(defs[1].children[1].text(), "TEXT");
    }

    #[test]
    fn test_semicolon_kept_in_statement() {
        let out = parse_sql("DELETE FROM t;");
        let statement = &out.tree.children[0];
        assert_eq!(kinds(statement), vec![NodeKind::Delete, NodeKind::Delimiter]);
        assert_eq!(statement.children[1].text(), ";");
    }

    #[test]
    fn test_literal_kinds() {
        let out = parse_sql("INSERT INTO t VALUES (1, 2.5, 'x');");
        let values = command(&out, 0).child(NodeKind::ValueList).unwrap();
        let literal_kinds: Vec<_> = values
            .children
            .iter()
            .filter(|c| c.kind != NodeKind::Delimiter)
            .map(|c| c.kind)
            .collect();
        assert_eq!(
            literal_kinds,
            vec![
                NodeKind::Literal(LiteralKind::Int),
                NodeKind::Literal(LiteralKind::Float),
                NodeKind::Literal(LiteralKind::String),
            ]
        );
    }

    #[test]
    fn test_positions_point_at_first_token() {
        let out = parse_sql("\n  SELECT a FROM t;");
        let statement = &out.tree.children[0];
        assert_eq!(statement.position(), Position::new(2, 3));
        assert_eq!(command(&out, 0).position(), Position::new(2, 3));
    }

    #[test]
    fn test_stray_semicolons_are_skipped() {
        let out = parse_sql(";; SELECT * FROM t;;;");
        assert!(!out.has_errors());
        assert_eq!(out.tree.children.len(), 1);
    }

    #[test]
    fn test_missing_semicolon() {
        let out = parse_sql("SELECT * FROM t DELETE FROM t;");
        assert_eq!(out.errors.len(), 1);
        assert_eq!(out.errors[0].message, "Expected ';' after statement but found 'DELETE'");
        assert_eq!(out.tree.children.len(), 2);
        let first = &out.tree.children[0];
        assert_eq!(kinds(first), vec![NodeKind::Select, NodeKind::Error]);
        assert!(!out.tree.children[1].has_error());
    }

    #[test]
    fn test_missing_semicolon_at_eof() {
        let out = parse_sql("SELECT * FROM t");
        assert_eq!(out.errors.len(), 1);
        assert!(out.errors[0].message.contains("found 'EOF'"));
    }

    #[test]
    fn test_unknown_statement_start() {
        let out = parse_sql("FROM t; SELECT * FROM t;");
        assert_eq!(out.errors.len(), 1);
        assert!(out.errors[0].message.starts_with("Expected a statement"));
        assert_eq!(out.tree.children.len(), 2);
        assert_eq!(kinds(&out.tree.children[0]), vec![NodeKind::Error]);
        assert_eq!(out.tree.children[1].children[0].kind, NodeKind::Select);
    }

    #[test]
    fn test_error_stops_rule_and_skips_semicolon_check() {
        let out = parse_sql("CREATE TABLE (a INT);");
        assert_eq!(out.errors.len(), 1);
        assert_eq!(out.errors[0].message, "Expected table name but found '('");
        let create = command(&out, 0);
        assert_eq!(
            kinds(create),
            vec![NodeKind::Keyword, NodeKind::Keyword, NodeKind::Error]
        );
    }

    #[test]
    fn test_nested_error_is_attached_in_place() {
        let out = parse_sql("INSERT INTO t VALUES (1, );");
        assert_eq!(out.errors.len(), 1);
        let values = command(&out, 0).child(NodeKind::ValueList).unwrap();
        assert_eq!(values.children.last().map(|n| n.kind), Some(NodeKind::Error));
        assert_eq!(out.tree.count(NodeKind::Error), 1);
    }

    #[test]
    fn test_synchronize_stops_at_statement_keyword() {
        let out = parse_sql("UPDATE t SET a 1 SELECT * FROM t;");
        assert_eq!(out.errors.len(), 1);
        assert_eq!(out.tree.children.len(), 2);
        assert!(!out.tree.children[1].has_error());
    }

    #[test]
    fn test_tokens_without_eof() {
        let mut tokens = tokenize("SELECT a FROM t;").tokens;
        tokens.pop();
        let out = parse(&tokens);
        assert!(!out.has_errors());
        assert_eq!(out.tree.children.len(), 1);
    }

    #[test]
    fn test_truncated_tokens_report_eof() {
        let mut tokens = tokenize("SELECT a FROM").tokens;
        tokens.pop();
        let out = parse(&tokens);
        assert_eq!(out.errors.len(), 1);
        assert_eq!(out.errors[0].message, "Expected table name but found 'EOF'");
        assert_eq!(out.errors[0].position(), Position::new(1, 14));
    }
}
