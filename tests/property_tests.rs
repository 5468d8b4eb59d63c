//! Property-based tests for the scanner and parser
//!
//! Arbitrary text exercises the scanner and the error paths of the parser;
//! generated pipelines exercise the canonical rendering.

use ppl_lang::{Token, parse, scan};
use proptest::prelude::*;

/// Field names that can never collide with a reserved word
fn field_strategy() -> impl Strategy<Value = String> {
    "[a-z]{1,6}".prop_map(|s| format!("fld_{}", s))
}

fn operand_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        field_strategy(),
        (0u32..100_000).prop_map(|n| n.to_string()),
        "[a-z ]{0,8}".prop_map(|s| format!("'{}'", s)),
    ]
}

/// Arithmetic and boolean expressions, parenthesized where they nest
fn expr_strategy() -> impl Strategy<Value = String> {
    operand_strategy().prop_recursive(4, 24, 2, |inner| {
        let op = prop_oneof![
            Just("+"),
            Just("-"),
            Just("*"),
            Just("/"),
            Just("%"),
            Just("="),
            Just("!="),
            Just("<"),
            Just(">="),
            Just("and"),
            Just("or"),
            Just("xor"),
        ];
        prop_oneof![
            (inner.clone(), op, inner.clone()).prop_map(|(l, op, r)| format!("({} {} {})", l, op, r)),
            inner.clone().prop_map(|e| format!("(not ({}))", e)),
            inner.prop_map(|e| format!("abs({})", e)),
        ]
    })
}

fn command_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        expr_strategy().prop_map(|e| format!("where {}", e)),
        (field_strategy(), expr_strategy()).prop_map(|(f, e)| format!("eval {} = {}", f, e)),
        prop::collection::vec(field_strategy(), 1..4).prop_map(|fs| format!("fields {}", fs.join(", "))),
        (field_strategy(), field_strategy())
            .prop_map(|(a, b)| format!("stats count() as n, avg({}) by {}", a, b)),
        (field_strategy(), any::<bool>())
            .prop_map(|(f, desc)| format!("sort {}{}", if desc { "-" } else { "" }, f)),
        (1u32..50).prop_map(|n| format!("head {}", n)),
        (field_strategy(), 1u32..5).prop_map(|(f, n)| format!("dedup {} {}", n, f)),
    ]
}

fn query_strategy() -> impl Strategy<Value = String> {
    (
        prop_oneof![Just("logs"), Just("logs-*"), Just("remote:logs"), Just("logs.2024.01")],
        prop::collection::vec(command_strategy(), 0..5),
    )
        .prop_map(|(source, commands)| {
            let mut text = format!("source={}", source);
            for command in commands {
                text.push_str(" | ");
                text.push_str(&command);
            }
            text
        })
}

proptest! {
    /// Every byte of the input belongs to exactly one token, in order
    #[test]
    fn tokens_tile_the_input(input in "\\PC{0,64}") {
        let mut offset = 0;
        for token in scan(&input) {
            prop_assert_eq!(token.span.start, offset);
            prop_assert!(token.span.end > token.span.start);
            prop_assert_eq!(&input[token.span.start..token.span.end], token.text);
            offset = token.span.end;
        }
        prop_assert_eq!(offset, input.len());
    }

    #[test]
    fn rescanning_gives_the_same_tokens(input in "\\PC{0,64}") {
        let first: Vec<Token<'_>> = scan(&input).collect();
        let second: Vec<Token<'_>> = scan(&input).collect();
        prop_assert_eq!(first, second);
    }

    /// Arbitrary text never panics, and diagnostics come back in order
    #[test]
    fn parse_accepts_any_text(input in "[ -~]{0,80}") {
        let result = parse(&input);
        let starts: Vec<usize> = result.diagnostics.iter().map(|d| d.span.start).collect();
        let mut sorted = starts.clone();
        sorted.sort_unstable();
        prop_assert_eq!(starts, sorted);
        for d in &result.diagnostics {
            prop_assert!(d.span.end <= input.len());
            prop_assert!(d.line >= 1 && d.column >= 1);
        }
    }

    /// Rendering a parsed query and parsing it again yields the same tree
    #[test]
    fn canonical_text_reparses_to_the_same_query(text in query_strategy()) {
        let first = parse(&text);
        prop_assert!(first.is_success(), "{}: {:?}", text, first.diagnostics);

        let rendered = first.query.to_string();
        let second = parse(&rendered);
        prop_assert!(second.is_success(), "{}: {:?}", rendered, second.diagnostics);
        prop_assert_eq!(&first.query, &second.query);
        prop_assert_eq!(second.query.to_string(), rendered);
    }
}
