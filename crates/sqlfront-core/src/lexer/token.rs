//! Token types for the lexer.

use core::fmt;

use serde::Serialize;

use super::Position;

/// Reserved words. Matching is case-sensitive: `select` is an identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Keyword {
    // Statements
    Select,
    From,
    Where,
    Insert,
    Into,
    Values,
    Update,
    Set,
    Delete,
    Create,
    Table,

    // Data types
    Int,
    Float,
    Text,

    // Logical operators
    And,
    Or,
    Not,
}

impl Keyword {
    /// Every keyword, in declaration order.
    pub const ALL: [Self; 17] = [
        Self::Select,
        Self::From,
        Self::Where,
        Self::Insert,
        Self::Into,
        Self::Values,
        Self::Update,
        Self::Set,
        Self::Delete,
        Self::Create,
        Self::Table,
        Self::Int,
        Self::Float,
        Self::Text,
        Self::And,
        Self::Or,
        Self::Not,
    ];

    /// Looks up a keyword by its exact (upper-case) spelling.
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "SELECT" => Some(Self::Select),
            "FROM" => Some(Self::From),
            "WHERE" => Some(Self::Where),
            "INSERT" => Some(Self::Insert),
            "INTO" => Some(Self::Into),
            "VALUES" => Some(Self::Values),
            "UPDATE" => Some(Self::Update),
            "SET" => Some(Self::Set),
            "DELETE" => Some(Self::Delete),
            "CREATE" => Some(Self::Create),
            "TABLE" => Some(Self::Table),
            "INT" => Some(Self::Int),
            "FLOAT" => Some(Self::Float),
            "TEXT" => Some(Self::Text),
            "AND" => Some(Self::And),
            "OR" => Some(Self::Or),
            "NOT" => Some(Self::Not),
            _ => None,
        }
    }

    /// Returns the keyword as a string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Select => "SELECT",
            Self::From => "FROM",
            Self::Where => "WHERE",
            Self::Insert => "INSERT",
            Self::Into => "INTO",
            Self::Values => "VALUES",
            Self::Update => "UPDATE",
            Self::Set => "SET",
            Self::Delete => "DELETE",
            Self::Create => "CREATE",
            Self::Table => "TABLE",
            Self::Int => "INT",
            Self::Float => "FLOAT",
            Self::Text => "TEXT",
            Self::And => "AND",
            Self::Or => "OR",
            Self::Not => "NOT",
        }
    }

    /// Returns true for keywords that begin a statement.
    ///
    /// These are the points the parser synchronizes on after an error.
    #[must_use]
    pub const fn starts_statement(&self) -> bool {
        matches!(
            self,
            Self::Create | Self::Insert | Self::Select | Self::Update | Self::Delete
        )
    }

    /// Returns true for the column data type keywords.
    #[must_use]
    pub const fn is_data_type(&self) -> bool {
        matches!(self, Self::Int | Self::Float | Self::Text)
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Operator {
    /// `=`
    Eq,
    /// `<`
    Lt,
    /// `>`
    Gt,
    /// `<=`
    LtEq,
    /// `>=`
    GtEq,
    /// `<>`
    LtGt,
    /// `!=`
    NotEq,
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Star,
    /// `/`
    Slash,
    /// `%`
    Percent,
}

impl Operator {
    /// Matches one of the two-character operators.
    #[must_use]
    pub const fn from_pair(first: char, second: char) -> Option<Self> {
        match (first, second) {
            ('<', '=') => Some(Self::LtEq),
            ('>', '=') => Some(Self::GtEq),
            ('<', '>') => Some(Self::LtGt),
            ('!', '=') => Some(Self::NotEq),
            _ => None,
        }
    }

    /// Matches one of the single-character operators.
    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            '=' => Some(Self::Eq),
            '<' => Some(Self::Lt),
            '>' => Some(Self::Gt),
            '+' => Some(Self::Plus),
            '-' => Some(Self::Minus),
            '*' => Some(Self::Star),
            '/' => Some(Self::Slash),
            '%' => Some(Self::Percent),
            _ => None,
        }
    }

    /// Returns the operator as a string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Lt => "<",
            Self::Gt => ">",
            Self::LtEq => "<=",
            Self::GtEq => ">=",
            Self::LtGt => "<>",
            Self::NotEq => "!=",
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Star => "*",
            Self::Slash => "/",
            Self::Percent => "%",
        }
    }

    /// Returns true for operators allowed between the two sides of a comparison.
    #[must_use]
    pub const fn is_comparison(&self) -> bool {
        matches!(
            self,
            Self::Eq | Self::Lt | Self::Gt | Self::LtEq | Self::GtEq | Self::LtGt | Self::NotEq
        )
    }
}

/// Single-character delimiters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Delimiter {
    /// `(`
    LeftParen,
    /// `)`
    RightParen,
    /// `,`
    Comma,
    /// `;`
    Semicolon,
    /// `.`
    Dot,
}

impl Delimiter {
    /// Matches a delimiter character.
    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            '(' => Some(Self::LeftParen),
            ')' => Some(Self::RightParen),
            ',' => Some(Self::Comma),
            ';' => Some(Self::Semicolon),
            '.' => Some(Self::Dot),
            _ => None,
        }
    }

    /// Returns the delimiter as a string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::LeftParen => "(",
            Self::RightParen => ")",
            Self::Comma => ",",
            Self::Semicolon => ";",
            Self::Dot => ".",
        }
    }
}

/// The kind of token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TokenKind {
    /// Reserved word.
    Keyword(Keyword),
    /// Table or column name.
    Identifier,
    /// Integer literal (e.g., 42)
    IntLiteral,
    /// Decimal literal (e.g., 3.14)
    FloatLiteral,
    /// Single-quoted string literal (e.g., 'hello')
    StringLiteral,
    /// Operator
    Operator(Operator),
    /// Delimiter
    Delimiter(Delimiter),
    /// End of input
    Eof,
}

impl TokenKind {
    /// Returns the category name used in token listings and messages.
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match self {
            Self::Keyword(_) => "KEYWORD",
            Self::Identifier => "IDENTIFIER",
            Self::IntLiteral => "INT_LITERAL",
            Self::FloatLiteral => "FLOAT_LITERAL",
            Self::StringLiteral => "STRING_LITERAL",
            Self::Operator(_) => "OPERATOR",
            Self::Delimiter(_) => "DELIMITER",
            Self::Eof => "EOF",
        }
    }

    /// Returns true for the three literal kinds.
    #[must_use]
    pub const fn is_literal(&self) -> bool {
        matches!(
            self,
            Self::IntLiteral | Self::FloatLiteral | Self::StringLiteral
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.category())
    }
}

/// A token with the text it was scanned from and where it starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    /// The kind of token.
    pub kind: TokenKind,
    /// The scanned text. String literals hold their unescaped content.
    pub lexeme: String,
    /// 1-based line of the first character.
    pub line: usize,
    /// 1-based column of the first character.
    pub column: usize,
}

impl Token {
    /// Creates a new token.
    #[must_use]
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, pos: Position) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            line: pos.line,
            column: pos.column,
        }
    }

    /// Creates the end-of-input marker.
    #[must_use]
    pub const fn eof(pos: Position) -> Self {
        Self {
            kind: TokenKind::Eof,
            lexeme: String::new(),
            line: pos.line,
            column: pos.column,
        }
    }

    /// Returns where the token starts.
    #[must_use]
    pub const fn position(&self) -> Position {
        Position::new(self.line, self.column)
    }

    /// Returns true if this is an EOF token.
    #[must_use]
    pub const fn is_eof(&self) -> bool {
        matches!(self.kind, TokenKind::Eof)
    }

    /// Returns the keyword if this is a keyword token.
    #[must_use]
    pub const fn as_keyword(&self) -> Option<Keyword> {
        match self.kind {
            TokenKind::Keyword(kw) => Some(kw),
            _ => None,
        }
    }

    /// Returns true if this token is the given keyword.
    #[must_use]
    pub fn is_keyword(&self, keyword: Keyword) -> bool {
        self.kind == TokenKind::Keyword(keyword)
    }

    /// Returns true if this token is the given delimiter.
    #[must_use]
    pub fn is_delimiter(&self, delimiter: Delimiter) -> bool {
        self.kind == TokenKind::Delimiter(delimiter)
    }

    /// Returns true if this token is the given operator.
    #[must_use]
    pub fn is_operator(&self, operator: Operator) -> bool {
        self.kind == TokenKind::Operator(operator)
    }

    /// Text used to describe this token in "found ..." messages.
    #[must_use]
    pub fn describe(&self) -> &str {
        if self.is_eof() {
            "EOF"
        } else {
            &self.lexeme
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<{}, '{}', {}, {}>",
            self.kind, self.lexeme, self.line, self.column
        )
    }
}
