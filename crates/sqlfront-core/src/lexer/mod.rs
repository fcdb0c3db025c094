//! Lexer/Tokenizer
//!
//! Turns source text into an ordered sequence of typed tokens carrying
//! their line and column. Lexical errors are collected, never raised.

mod position;
mod token;
mod tokenizer;

pub use position::Position;
pub use token::{Delimiter, Keyword, Operator, Token, TokenKind};
pub use tokenizer::{tokenize, LexOutput, Lexer};
