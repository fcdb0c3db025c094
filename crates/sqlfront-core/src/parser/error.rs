//! Failure signal for grammar rules.

use crate::tree::Node;

/// A grammar rule that could not be completed.
///
/// Carries the subtree built so far; its last leaf is the ERROR node
/// marking where parsing stopped. The matching diagnostic has already
/// been recorded, so callers only attach the subtree and bail out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct Incomplete(pub(super) Node);

/// Result of a single grammar rule.
pub(super) type Rule = Result<Node, Incomplete>;
