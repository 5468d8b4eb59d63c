// tests/recovery_tests.rs

use ppl_lang::ast::Command;
use ppl_lang::{DiagnosticKind, ParseOptions, Severity, parse, parse_with_options};

fn messages(text: &str) -> Vec<String> {
    parse(text)
        .diagnostics
        .into_iter()
        .map(|d| d.message)
        .collect()
}

// ============================================================================
// Resynchronization
// ============================================================================

#[test]
fn test_error_skips_to_next_pipe() {
    let result = parse("source=logs | where | head 5");
    assert_eq!(result.query.command_names(), vec!["search", "head"]);
    assert_eq!(result.diagnostics.len(), 1);

    let d = &result.diagnostics[0];
    assert_eq!(d.kind, DiagnosticKind::MissingRequiredClause);
    assert_eq!(d.message, "where needs a condition");
    assert_eq!(d.span.start, 20);
    assert_eq!((d.line, d.column), (1, 21));
}

#[test]
fn test_every_bad_command_is_reported() {
    let result = parse("source=logs | where | eval | sort | head 1");
    assert_eq!(result.query.command_names(), vec!["search", "head"]);
    assert_eq!(
        result
            .diagnostics
            .iter()
            .map(|d| d.message.as_str())
            .collect::<Vec<_>>(),
        vec![
            "where needs a condition",
            "eval needs `<field> = <expression>`",
            "sort needs at least one field",
        ]
    );
}

#[test]
fn test_trailing_tokens_after_command() {
    let result = parse("source=logs | head 5 6 | where a = 1");
    assert_eq!(result.query.command_names(), vec!["search", "head", "where"]);
    assert_eq!(
        messages("source=logs | head 5 6 | where a = 1"),
        vec!["expected `|` or end of query, found number `6`"]
    );
}

#[test]
fn test_unknown_command() {
    let result = parse("source=logs | frobnicate x | head");
    assert_eq!(result.query.command_names(), vec!["search", "head"]);
    assert_eq!(
        result.diagnostics[0].message,
        "expected a command, found `frobnicate`"
    );
}

#[test]
fn test_leading_pipe() {
    let result = parse("| head 3");
    assert_eq!(result.query.command_names(), vec!["head"]);
    assert_eq!(result.diagnostics.len(), 1);
    assert_eq!(result.diagnostics[0].span.start, 0);
}

#[test]
fn test_partial_list_is_kept() {
    let result = parse("source=logs | fields a, b,");
    assert_eq!(result.diagnostics.len(), 1);
    assert_eq!(result.diagnostics[0].kind, DiagnosticKind::UnexpectedToken);
    match &result.query.commands[1] {
        Command::Fields(cmd) => {
            let names: Vec<_> = cmd.fields.iter().map(|f| f.name.as_str()).collect();
            assert_eq!(names, vec!["a", "b"]);
        }
        other => panic!("Expected fields, got {:?}", other),
    }
}

#[test]
fn test_soft_errors_keep_the_command() {
    // arity and option problems do not drop the command they occur in
    let result = parse("source=logs | eval x = abs(a, b) | where match(msg, 'x', colour='red')");
    assert_eq!(result.query.command_names(), vec!["search", "eval", "where"]);
    let kinds: Vec<_> = result.diagnostics.iter().map(|d| d.kind).collect();
    assert_eq!(
        kinds,
        vec![DiagnosticKind::ArityMismatch, DiagnosticKind::InvalidOptionName]
    );
}

#[test]
fn test_deeply_nested_condition_recovers() {
    let tests = vec![
        format!("source=logs | where {}a{} | head 5", "(".repeat(10_000), ")".repeat(10_000)),
        format!("source=logs | where {}a | head 5", "not ".repeat(10_000)),
    ];

    for input in tests {
        let result = parse(&input);
        assert_eq!(result.query.command_names(), vec!["search", "head"], "input: {:.30}", input);
        assert_eq!(result.diagnostics.len(), 1, "input: {:.30}", input);
        assert_eq!(result.diagnostics[0].message, "expression nested too deeply");
    }
}

// ============================================================================
// Empty and truncated input
// ============================================================================

#[test]
fn test_empty_query() {
    let tests = vec!["", "   ", "\n\t"];

    for input in tests {
        let result = parse(input);
        assert!(result.query.is_empty(), "input: {:?}", input);
        assert_eq!(result.diagnostics.len(), 1, "input: {:?}", input);
        assert_eq!(
            result.diagnostics[0].message,
            "empty query: expected a command",
            "input: {:?}",
            input
        );
    }
}

#[test]
fn test_trailing_pipe() {
    let result = parse("source=logs |");
    assert_eq!(result.query.len(), 1);
    assert_eq!(result.diagnostics.len(), 1);
    assert_eq!(result.diagnostics[0].message, "expected a command after `|`");
    assert_eq!(result.diagnostics[0].span.start, 13);
}

#[test]
fn test_search_without_source() {
    let tests = vec![
        ("search", "search needs a `source=<index>` clause"),
        ("search status=500", "search needs a `source=<index>` clause"),
        ("source=", "expected a source name, found end of input"),
    ];

    for (input, expected) in tests {
        assert_eq!(messages(input), vec![expected], "input: {}", input);
    }
}

// ============================================================================
// Lexical errors
// ============================================================================

#[test]
fn test_unrecognized_character() {
    let result = parse("source=logs # | head 5");
    assert_eq!(result.query.command_names(), vec!["search", "head"]);
    assert_eq!(result.diagnostics.len(), 1);
    assert_eq!(result.diagnostics[0].kind, DiagnosticKind::LexicalError);
    assert_eq!(result.diagnostics[0].message, "unrecognized character `#`");
    assert!(!result.is_success());
}

#[test]
fn test_unterminated_string() {
    let result = parse("source=logs | where a = 'abc");
    assert_eq!(result.query.len(), 2);
    assert_eq!(result.diagnostics.len(), 1);
    assert_eq!(result.diagnostics[0].kind, DiagnosticKind::LexicalError);
    assert_eq!(result.diagnostics[0].message, "unterminated string");
}

#[test]
fn test_diagnostics_are_sorted_by_position() {
    let result = parse("source=logs | where | head 5 #");
    let starts: Vec<_> = result.diagnostics.iter().map(|d| d.span.start).collect();
    assert_eq!(starts.len(), 2);
    assert!(starts[0] < starts[1]);
    assert_eq!(result.diagnostics[1].kind, DiagnosticKind::LexicalError);
}

// ============================================================================
// Options
// ============================================================================

#[test]
fn test_recover_off_stops_at_first_error() {
    let input = "source=logs | where | head 5 | frobnicate";

    let result = parse(input);
    assert_eq!(result.query.command_names(), vec!["search", "head"]);
    assert_eq!(result.diagnostics.len(), 2);

    let options = ParseOptions {
        recover: false,
        ..ParseOptions::default()
    };
    let result = parse_with_options(input, options);
    assert_eq!(result.query.command_names(), vec!["search"]);
    assert_eq!(result.diagnostics.len(), 1);
}

#[test]
fn test_max_diagnostics() {
    let input = "source=logs | where | where | where | where";
    assert_eq!(parse(input).diagnostics.len(), 4);

    let options = ParseOptions {
        max_diagnostics: 2,
        ..ParseOptions::default()
    };
    let result = parse_with_options(input, options);
    assert_eq!(result.diagnostics.len(), 2);
    assert_eq!(result.query.len(), 1);
}

// ============================================================================
// Results
// ============================================================================

#[test]
fn test_into_result() {
    let query = parse("source=logs | head").into_result().unwrap();
    assert_eq!(query.len(), 2);

    let errors = parse("source=logs | where | head #").into_result().unwrap_err();
    assert_eq!(errors.errors.len(), 2);
    assert_eq!(
        errors.to_string(),
        "2 error(s), first at 1:21: where needs a condition"
    );
}

#[test]
fn test_warnings_do_not_fail() {
    let result = parse("source=logs | parse msg '[0-9]+'");
    assert!(result.is_success());
    assert_eq!(result.errors().count(), 0);
    assert_eq!(result.warnings().count(), 1);
    assert_eq!(result.diagnostics[0].severity, Severity::Warning);
    assert!(result.into_result().is_ok());
}

#[test]
fn test_snippet_points_at_problem() {
    let input = "source=logs\n| where\n| head";
    let result = parse(input);
    let d = &result.diagnostics[0];
    assert_eq!((d.line, d.column), (3, 1));
    assert_eq!(d.snippet(input), "| head\n^");
}
