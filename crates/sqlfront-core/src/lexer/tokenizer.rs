//! Tokenizer implementation.

use tracing::{debug, trace};

use super::{Delimiter, Keyword, Operator, Position, Token, TokenKind};
use crate::diagnostic::Diagnostic;

/// The result of tokenizing a source text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LexOutput {
    /// Scanned tokens; always ends with exactly one EOF token.
    pub tokens: Vec<Token>,
    /// Lexical errors, in source order.
    pub errors: Vec<Diagnostic>,
}

impl LexOutput {
    /// Returns true if any lexical error was reported.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Tokenizes `source`.
///
/// Never fails: malformed constructs are reported in
/// [`LexOutput::errors`] and scanning continues after them.
#[must_use]
pub fn tokenize(source: &str) -> LexOutput {
    Lexer::new(source).tokenize()
}

/// A single-pass, character-by-character scanner.
pub struct Lexer<'a> {
    /// The input source code.
    input: &'a str,
    /// The current byte position.
    pos: usize,
    /// Line/column of the character at `pos`.
    position: Position,
    tokens: Vec<Token>,
    errors: Vec<Diagnostic>,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer for the given input.
    #[must_use]
    pub const fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            position: Position::start(),
            tokens: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Returns the current character without advancing.
    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    /// Returns the next character without advancing.
    fn peek_next(&self) -> Option<char> {
        let mut chars = self.input[self.pos..].chars();
        chars.next();
        chars.next()
    }

    /// Advances to the next character and returns it.
    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        self.position = self.position.advance(c);
        Some(c)
    }

    fn push_token(&mut self, kind: TokenKind, lexeme: impl Into<String>, start: Position) {
        let token = Token::new(kind, lexeme, start);
        trace!(%token, "scanned token");
        self.tokens.push(token);
    }

    fn error(&mut self, message: impl Into<String>, at: Position) {
        let diagnostic = Diagnostic::lexical(message, at);
        trace!(%diagnostic, "lexical error");
        self.errors.push(diagnostic);
    }

    /// Scans the whole input.
    #[must_use]
    pub fn tokenize(mut self) -> LexOutput {
        while let Some(c) = self.peek() {
            let start = self.position;
            match c {
                ' ' | '\t' | '\r' | '\n' => {
                    self.advance();
                }
                '-' if self.peek_next() == Some('-') => self.skip_line_comment(),
                '#' => self.skip_block_comment(start),
                '\'' => self.scan_string(start),
                c if c.is_ascii_digit() => self.scan_number(start),
                c if c.is_alphabetic() => self.scan_identifier(start),
                _ => self.scan_symbol(c, start),
            }
        }

        self.tokens.push(Token::eof(self.position));
        debug!(
            tokens = self.tokens.len(),
            errors = self.errors.len(),
            "tokenized source"
        );
        LexOutput {
            tokens: self.tokens,
            errors: self.errors,
        }
    }

    /// Skips a `--` comment up to and including the end of the line.
    fn skip_line_comment(&mut self) {
        while let Some(c) = self.advance() {
            if c == '\n' {
                break;
            }
        }
    }

    /// Skips a `## ... ##` comment.
    fn skip_block_comment(&mut self, start: Position) {
        self.advance(); // #
        if self.peek() != Some('#') {
            self.error(
                "Invalid character '#'. Expected '##' for multi-line comment",
                start,
            );
            return;
        }
        self.advance(); // #

        loop {
            match self.peek() {
                Some('#') if self.peek_next() == Some('#') => {
                    self.advance();
                    self.advance();
                    return;
                }
                Some(_) => {
                    self.advance();
                }
                None => {
                    self.error("Unclosed multi-line comment", start);
                    return;
                }
            }
        }
    }

    /// Scans a single-quoted string literal; `''` is an escaped quote.
    fn scan_string(&mut self, start: Position) {
        self.advance(); // consume opening quote
        let mut value = String::new();

        loop {
            match self.peek() {
                Some('\'') => {
                    if self.peek_next() == Some('\'') {
                        value.push('\'');
                        self.advance();
                        self.advance();
                    } else {
                        self.advance();
                        self.push_token(TokenKind::StringLiteral, value, start);
                        return;
                    }
                }
                Some('\n') => {
                    self.error(
                        "Unclosed string literal. Newline found before closing quote",
                        start,
                    );
                    return;
                }
                Some(c) => {
                    value.push(c);
                    self.advance();
                }
                None => {
                    self.error("Unclosed string literal", start);
                    return;
                }
            }
        }
    }

    /// Scans an integer or a decimal number.
    fn scan_number(&mut self, start: Position) {
        let begin = self.pos;
        self.consume_digits();

        if self.peek() != Some('.') {
            let lexeme = &self.input[begin..self.pos];
            self.push_token(TokenKind::IntLiteral, lexeme, start);
            return;
        }

        self.advance(); // consume .
        if !self.peek().is_some_and(|c| c.is_ascii_digit()) {
            let message = format!(
                "Invalid number format '{}'. Expected digit after decimal point",
                &self.input[begin..self.pos]
            );
            self.error(message, start);
            return;
        }
        self.consume_digits();

        let lexeme = &self.input[begin..self.pos];
        self.push_token(TokenKind::FloatLiteral, lexeme, start);
    }

    fn consume_digits(&mut self) {
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }
    }

    /// Scans an identifier or keyword.
    fn scan_identifier(&mut self, start: Position) {
        let begin = self.pos;
        while self.peek().is_some_and(|c| c.is_alphanumeric() || c == '_') {
            self.advance();
        }

        let text = &self.input[begin..self.pos];
        let kind = Keyword::from_str(text).map_or(TokenKind::Identifier, TokenKind::Keyword);
        self.push_token(kind, text, start);
    }

    /// Scans an operator or delimiter, or reports an invalid character.
    fn scan_symbol(&mut self, c: char, start: Position) {
        if let Some(op) = self.peek_next().and_then(|next| Operator::from_pair(c, next)) {
            self.advance();
            self.advance();
            self.push_token(TokenKind::Operator(op), op.as_str(), start);
        } else if let Some(op) = Operator::from_char(c) {
            self.advance();
            self.push_token(TokenKind::Operator(op), op.as_str(), start);
        } else if let Some(delim) = Delimiter::from_char(c) {
            self.advance();
            self.push_token(TokenKind::Delimiter(delim), delim.as_str(), start);
        } else {
            self.error(format!("Invalid character '{c}'"), start);
            self.advance();
        }
    }
}
