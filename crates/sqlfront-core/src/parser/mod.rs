//! SQL Parser
//!
//! A hand-written recursive descent parser over the lexer's token
//! sequence. Syntax errors are recorded as diagnostics and marked with
//! ERROR leaves in the tree; the parser then synchronizes to the next
//! statement boundary and keeps going.

/// Runs a rule and appends its node to `$parent`. When the rule failed,
/// the partial node is still appended and the enclosing rule returns
/// `$parent` as its own partial result.
macro_rules! attach {
    ($parent:ident, $rule:expr) => {
        match $rule {
            Ok(child) => $parent.push(child),
            Err(Incomplete(child)) => {
                $parent.push(child);
                return Err(Incomplete($parent));
            }
        }
    };
}

mod condition;
mod error;
mod parser;

pub use parser::{parse, ParseOutput, Parser, MAX_CONDITION_DEPTH};
