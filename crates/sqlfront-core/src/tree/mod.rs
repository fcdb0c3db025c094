//! Parse tree shared by the parser and the semantic analyzer.

mod node;

pub use node::{Descendants, LiteralKind, Node, NodeKind};
