#![allow(dead_code)]

use sqlfront_core::{analyze, parse, tokenize, Analysis, Node, NodeKind, ParseOutput};

/// Lexes and parses `sql`, panicking on lexical errors.
pub fn parse_sql(sql: &str) -> ParseOutput {
    let lexed = tokenize(sql);
    assert!(
        lexed.errors.is_empty(),
        "Lexical errors for: {sql}\n{:?}",
        lexed.errors
    );
    parse(&lexed.tokens)
}

/// Parses `sql` and panics unless it is syntactically clean.
pub fn parse_ok(sql: &str) -> Node {
    let out = parse_sql(sql);
    assert!(
        out.errors.is_empty(),
        "Syntax errors for: {sql}\n{:?}",
        out.errors
    );
    out.tree
}

/// Returns the command node (CREATE_TABLE, SELECT, ...) of the only
/// statement in `sql`.
pub fn parse_command(sql: &str) -> Node {
    let tree = parse_ok(sql);
    assert_eq!(tree.children.len(), 1, "Expected one statement in: {sql}");
    tree.children[0]
        .children
        .iter()
        .find(|c| c.kind.is_command())
        .cloned()
        .unwrap_or_else(|| panic!("No command node for: {sql}"))
}

/// Parses and analyzes `sql`, panicking on lexical or syntax errors.
pub fn analyze_sql(sql: &str) -> Analysis {
    analyze(&parse_ok(sql))
}

/// Semantic error messages of `sql`.
pub fn semantic_errors(sql: &str) -> Vec<String> {
    analyze_sql(sql)
        .errors
        .into_iter()
        .map(|e| e.message)
        .collect()
}

/// Kinds of the direct children of `node`.
pub fn child_kinds(node: &Node) -> Vec<NodeKind> {
    node.children.iter().map(|c| c.kind).collect()
}

/// Texts of the direct children of `node` with the given kind.
pub fn child_texts(node: &Node, kind: NodeKind) -> Vec<String> {
    node.children_of(kind).map(|c| c.text().to_owned()).collect()
}

/// First node in `tree` of the given kind and text.
pub fn find<'a>(tree: &'a Node, kind: NodeKind, text: &str) -> &'a Node {
    tree.descendants()
        .find(|n| n.kind == kind && n.text() == text)
        .unwrap_or_else(|| panic!("No {kind} node with text '{text}'"))
}
