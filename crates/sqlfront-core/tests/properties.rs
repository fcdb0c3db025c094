//! Property-based tests for termination and stage invariants.

use proptest::prelude::*;

use sqlfront_core::lexer::{Delimiter, Keyword, Operator};
use sqlfront_core::{analyze, parse, tokenize, NodeKind, Position, Token, TokenKind};

// ============================================================================
// Strategies
// ============================================================================

fn arb_table() -> BoxedStrategy<String> {
    prop::sample::select(vec!["t", "u", "v"])
        .prop_map(str::to_owned)
        .boxed()
}

fn arb_column() -> BoxedStrategy<String> {
    prop::sample::select(vec!["a", "b", "c"])
        .prop_map(str::to_owned)
        .boxed()
}

fn arb_value() -> BoxedStrategy<String> {
    prop_oneof![
        (0u32..1000).prop_map(|n| n.to_string()),
        (0u32..100, 0u32..100).prop_map(|(a, b)| format!("{a}.{b}")),
        prop::sample::select(vec!["'x'", "'it''s'", "''"]).prop_map(str::to_owned),
        arb_column(),
    ]
    .boxed()
}

fn arb_condition() -> BoxedStrategy<String> {
    let op = prop::sample::select(vec!["=", "<", ">", "<=", ">=", "<>", "!="]);
    let comparison = (arb_column(), op, arb_value()).prop_map(|(c, op, v)| format!("{c} {op} {v}"));
    comparison
        .prop_recursive(3, 8, 2, |inner| {
            prop_oneof![
                (inner.clone(), inner.clone()).prop_map(|(l, r)| format!("({l}) AND ({r})")),
                (inner.clone(), inner.clone()).prop_map(|(l, r)| format!("({l}) OR ({r})")),
                inner.prop_map(|c| format!("NOT ({c})")),
            ]
        })
        .boxed()
}

fn arb_statement() -> BoxedStrategy<String> {
    let ty = prop::sample::select(vec!["INT", "FLOAT", "TEXT"]);
    let create = (
        arb_table(),
        prop::collection::vec((arb_column(), ty), 1..4),
    )
        .prop_map(|(t, cols)| {
            let cols: Vec<String> = cols.iter().map(|(c, ty)| format!("{c} {ty}")).collect();
            format!("CREATE TABLE {t} ({})", cols.join(", "))
        });
    let insert = (arb_table(), prop::collection::vec(arb_value(), 1..4))
        .prop_map(|(t, vals)| format!("INSERT INTO {t} VALUES ({})", vals.join(", ")));
    let select = (
        prop::collection::vec(arb_column(), 0..3),
        prop::collection::vec(arb_table(), 1..3),
        prop::option::of(arb_condition()),
    )
        .prop_map(|(cols, tables, cond)| {
            let cols = if cols.is_empty() {
                "*".to_owned()
            } else {
                cols.join(", ")
            };
            let mut sql = format!("SELECT {cols} FROM {}", tables.join(", "));
            if let Some(cond) = cond {
                sql.push_str(&format!(" WHERE {cond}"));
            }
            sql
        });
    let update = (arb_table(), arb_column(), arb_value(), prop::option::of(arb_condition()))
        .prop_map(|(t, c, v, cond)| match cond {
            Some(cond) => format!("UPDATE {t} SET {c} = {v} WHERE {cond}"),
            None => format!("UPDATE {t} SET {c} = {v}"),
        });
    let delete = (arb_table(), prop::option::of(arb_condition())).prop_map(|(t, cond)| match cond {
        Some(cond) => format!("DELETE FROM {t} WHERE {cond}"),
        None => format!("DELETE FROM {t}"),
    });

    prop_oneof![create, insert, select, update, delete].boxed()
}

fn arb_program() -> BoxedStrategy<String> {
    prop::collection::vec(arb_statement(), 0..8)
        .prop_map(|stmts| {
            stmts
                .iter()
                .map(|s| format!("{s};"))
                .collect::<Vec<_>>()
                .join("\n")
        })
        .boxed()
}

/// Texts that scan to exactly one token with the same lexeme.
fn arb_piece() -> BoxedStrategy<String> {
    let keyword = prop::sample::select(Keyword::ALL.to_vec()).prop_map(|k| k.as_str().to_owned());
    let operator = prop::sample::select(vec![
        "=", "<", ">", "<=", ">=", "<>", "!=", "+", "-", "*", "/", "%",
    ])
    .prop_map(str::to_owned);
    let delimiter = prop::sample::select(vec!["(", ")", ",", ";", "."]).prop_map(str::to_owned);
    let identifier = prop::string::string_regex("[a-z][a-z0-9_]{0,6}")
        .expect("valid regex")
        .prop_filter("must not be keyword", |s| Keyword::from_str(s).is_none());
    let number = prop_oneof![
        any::<u32>().prop_map(|n| n.to_string()),
        (any::<u16>(), any::<u16>()).prop_map(|(a, b)| format!("{a}.{b}")),
    ];
    prop_oneof![keyword, operator, delimiter, identifier, number].boxed()
}

/// An arbitrary token, without any relation to real source text.
fn arb_token() -> BoxedStrategy<Token> {
    let kind = prop_oneof![
        prop::sample::select(Keyword::ALL.to_vec()).prop_map(TokenKind::Keyword),
        Just(TokenKind::Identifier),
        Just(TokenKind::IntLiteral),
        Just(TokenKind::FloatLiteral),
        Just(TokenKind::StringLiteral),
        prop::sample::select(vec![
            Operator::Eq,
            Operator::Lt,
            Operator::GtEq,
            Operator::NotEq,
            Operator::Star,
            Operator::Plus,
        ])
        .prop_map(TokenKind::Operator),
        prop::sample::select(vec![
            Delimiter::LeftParen,
            Delimiter::RightParen,
            Delimiter::Comma,
            Delimiter::Semicolon,
        ])
        .prop_map(TokenKind::Delimiter),
        Just(TokenKind::Eof),
    ];
    (kind, 1usize..5, 1usize..80)
        .prop_map(|(kind, line, column)| Token::new(kind, "x", Position::new(line, column)))
        .boxed()
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn tokenize_ends_with_single_eof(source in any::<String>()) {
        let out = tokenize(&source);
        prop_assert!(out.tokens.last().is_some_and(Token::is_eof));
        prop_assert_eq!(out.tokens.iter().filter(|t| t.is_eof()).count(), 1);
    }

    #[test]
    fn tokenize_ascii_soup_terminates(source in "[ -~\n\t]{0,200}") {
        let out = tokenize(&source);
        prop_assert!(out.tokens.last().is_some_and(Token::is_eof));
        for token in &out.tokens {
            prop_assert!(token.line >= 1 && token.column >= 1);
        }
    }

    #[test]
    fn lexemes_are_preserved(pieces in prop::collection::vec(arb_piece(), 0..40)) {
        let source = pieces.join(" ");
        let out = tokenize(&source);
        prop_assert!(out.errors.is_empty(), "{:?}", out.errors);
        let lexemes: Vec<&str> = out
            .tokens
            .iter()
            .filter(|t| !t.is_eof())
            .map(|t| t.lexeme.as_str())
            .collect();
        prop_assert_eq!(lexemes, pieces.iter().map(String::as_str).collect::<Vec<_>>());
    }

    #[test]
    fn parse_terminates_on_arbitrary_tokens(tokens in prop::collection::vec(arb_token(), 0..60)) {
        let out = parse(&tokens);
        prop_assert_eq!(out.tree.kind, NodeKind::Program);
        prop_assert!(out.tree.children.len() <= tokens.len());
        // Every recorded syntax error is marked by exactly one ERROR leaf.
        prop_assert_eq!(out.tree.count(NodeKind::Error), out.errors.len());
        for node in out.tree.descendants().filter(|n| n.is_error()) {
            prop_assert!(node.children.is_empty());
        }
    }

    #[test]
    fn generated_programs_parse_cleanly(program in arb_program()) {
        let lexed = tokenize(&program);
        prop_assert!(lexed.errors.is_empty(), "{:?}", lexed.errors);
        let parsed = parse(&lexed.tokens);
        prop_assert!(parsed.errors.is_empty(), "{}\n{:?}", program, parsed.errors);
        prop_assert_eq!(parsed.tree.count(NodeKind::Error), 0);
    }

    #[test]
    fn analysis_is_idempotent(program in arb_program()) {
        let parsed = parse(&tokenize(&program).tokens);
        let before = parsed.tree.clone();

        let first = analyze(&parsed.tree);
        let second = analyze(&parsed.tree);

        prop_assert_eq!(&parsed.tree, &before);
        prop_assert_eq!(&first.errors, &second.errors);
        prop_assert_eq!(&first.symbols, &second.symbols);
        prop_assert_eq!(&first.tree, &second.tree);
    }
}
