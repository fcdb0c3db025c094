//! WHERE clauses, boolean conditions and expressions.

use super::error::{Incomplete, Rule};
use super::parser::{Parser, MAX_CONDITION_DEPTH};
use crate::lexer::{Delimiter, Keyword, TokenKind};
use crate::tree::{LiteralKind, Node, NodeKind};

impl Parser<'_> {
    /// where_clause := 'WHERE' condition
    pub(super) fn parse_where_clause(&mut self) -> Rule {
        let mut node = Node::new(NodeKind::WhereClause, self.current().position());
        attach!(node, self.expect_keyword(Keyword::Where));
        attach!(node, self.parse_condition());
        Ok(node)
    }

    /// condition := 'NOT' condition
    ///            | simple_condition (('AND' | 'OR') simple_condition)*
    ///
    /// AND and OR share one precedence level and fold to the left. Every
    /// `NOT`, `(` and folded operand counts towards [`MAX_CONDITION_DEPTH`].
    fn parse_condition(&mut self) -> Rule {
        let entry = self.depth;
        let result = self.parse_condition_at_depth();
        self.depth = entry;
        result
    }

    fn parse_condition_at_depth(&mut self) -> Rule {
        if self.check_keyword(Keyword::Not) {
            let mut node = Node::new(NodeKind::NotCondition, self.current().position());
            if let Err(Incomplete(error)) = self.descend() {
                node.push(error);
                return Err(Incomplete(node));
            }
            node.push(self.take(NodeKind::Keyword));
            attach!(node, self.parse_condition());
            return Ok(node);
        }

        let mut left = self.parse_simple_condition()?;
        loop {
            let kind = if self.check_keyword(Keyword::And) {
                NodeKind::AndCondition
            } else if self.check_keyword(Keyword::Or) {
                NodeKind::OrCondition
            } else {
                break;
            };
            let mut node = Node::new(kind, left.position());
            node.push(left);
            if let Err(Incomplete(error)) = self.descend() {
                node.push(error);
                return Err(Incomplete(node));
            }
            node.push(self.take(NodeKind::Keyword));
            attach!(node, self.parse_simple_condition());
            left = node;
        }
        Ok(left)
    }

    /// simple_condition := expression comparison_op expression
    ///                   | '(' condition ')'
    ///
    /// Parentheses only group; they leave no nodes behind.
    fn parse_simple_condition(&mut self) -> Rule {
        if self.check_delimiter(Delimiter::LeftParen) {
            self.descend()?;
            self.advance();
            let mut inner = self.parse_condition()?;
            if let Err(Incomplete(error)) = self.expect_delimiter(Delimiter::RightParen) {
                inner.push(error);
                return Err(Incomplete(inner));
            }
            return Ok(inner);
        }

        let mut node = Node::new(NodeKind::Comparison, self.current().position());
        attach!(node, self.parse_expression());
        attach!(node, self.parse_comparison_operator());
        attach!(node, self.parse_expression());
        Ok(node)
    }

    /// Goes one condition level deeper, failing at the current token once
    /// the limit is reached. The caller restores the level.
    fn descend(&mut self) -> Result<(), Incomplete> {
        if self.depth >= MAX_CONDITION_DEPTH {
            let found = self.current().describe().to_owned();
            return Err(self.fail_with(
                format!("Condition nested too deeply (more than {MAX_CONDITION_DEPTH} levels)"),
                format!("CONDITION TOO DEEP (at '{found}')"),
            ));
        }
        self.depth += 1;
        Ok(())
    }

    fn parse_comparison_operator(&mut self) -> Rule {
        let is_comparison = matches!(
            self.current().kind,
            TokenKind::Operator(op) if op.is_comparison()
        );
        if is_comparison {
            Ok(self.take(NodeKind::Operator))
        } else {
            Err(self.fail("comparison operator (=, <, >, <=, >=, <>, !=)"))
        }
    }

    /// expression := identifier | literal
    pub(super) fn parse_expression(&mut self) -> Rule {
        let token_kind = self.current().kind;
        if token_kind == TokenKind::Identifier {
            return Ok(self.take(NodeKind::Identifier));
        }
        match LiteralKind::from_token_kind(token_kind) {
            Some(kind) => Ok(self.take(NodeKind::Literal(kind))),
            None => Err(self.fail("identifier or literal")),
        }
    }
}
