// tests/integration_tests.rs
//
// End-to-end runs of the `ppl` subcommands through their library entry points.

#![cfg(feature = "cli")]

use ppl_lang::cli::{
    CheckOptions, CliError, DocCategory, OutputFormat, ParseCommandOptions, TokensOptions,
    execute_check, execute_parse, execute_tokens, get_doc_category, get_docs_overview,
};
use ppl_lang::ast::KeywordRole;
use serde_json::Value;

fn check(query: &str) -> ppl_lang::cli::CommandOutput {
    execute_check(&CheckOptions {
        query: query.to_string(),
        ..CheckOptions::default()
    })
    .unwrap()
}

// ============================================================================
// check
// ============================================================================

#[test]
fn test_check_valid_query() {
    let output = check("source=logs | where status >= 500 | stats count() by host");
    assert!(output.success);
    assert_eq!(output.text, "Query is valid (3 commands)\n");

    let output = check("source=logs");
    assert_eq!(output.text, "Query is valid (1 command)\n");
}

#[test]
fn test_check_reports_errors_with_snippets() {
    let output = check("source=logs | where | head");
    assert!(!output.success);
    assert_eq!(
        output.text,
        "error[missing clause] 1:21: where needs a condition\n\
         source=logs | where | head\n                    ^\n\
         1 error(s), 0 warning(s)\n"
    );
}

#[test]
fn test_check_warnings_still_pass() {
    let output = check("source=logs | parse msg '[0-9]+'");
    assert!(output.success);
    assert!(output.text.starts_with("warning[invalid pattern]"));
    assert!(output.text.ends_with("0 error(s), 1 warning(s)\n"));
}

#[test]
fn test_check_fail_fast() {
    let query = "source=logs | where | eval | head";
    let all = check(query);
    let fast = execute_check(&CheckOptions {
        query: query.to_string(),
        fail_fast: true,
        ..CheckOptions::default()
    })
    .unwrap();

    assert!(all.text.ends_with("2 error(s), 0 warning(s)\n"));
    assert!(fast.text.ends_with("1 error(s), 0 warning(s)\n"));
    assert!(!fast.success);
}

#[test]
fn test_check_json() {
    let output = execute_check(&CheckOptions {
        query: "source=logs | where".to_string(),
        format: OutputFormat::Json,
        ..CheckOptions::default()
    })
    .unwrap();
    assert!(!output.success);

    let json: Value = serde_json::from_str(&output.text).unwrap();
    assert_eq!(json["query"]["commands"][0]["command"], "search");
    let diagnostic = &json["diagnostics"][0];
    assert_eq!(diagnostic["kind"], "missing_required_clause");
    assert_eq!(diagnostic["severity"], "error");
    assert_eq!(diagnostic["line"], 1);
    assert_eq!(diagnostic["column"], 20);
}

// ============================================================================
// parse
// ============================================================================

#[test]
fn test_parse_json() {
    let output = execute_parse(&ParseCommandOptions {
        query: "source=logs | head 5".to_string(),
        ..ParseCommandOptions::default()
    })
    .unwrap();
    assert!(output.success);
    assert!(output.text.ends_with('\n'));
    assert_eq!(output.text.lines().count(), 1);

    let json: Value = serde_json::from_str(&output.text).unwrap();
    let commands = json["query"]["commands"].as_array().unwrap();
    assert_eq!(commands.len(), 2);
    assert_eq!(commands[1]["command"], "head");
    assert_eq!(commands[1]["size"], 5);
    assert_eq!(json["diagnostics"].as_array().unwrap().len(), 0);
}

#[test]
fn test_parse_pretty_matches_compact() {
    let query = "source=logs | stats avg(latency) by span(ts, 1h)".to_string();
    let compact = execute_parse(&ParseCommandOptions {
        query: query.clone(),
        ..ParseCommandOptions::default()
    })
    .unwrap();
    let pretty = execute_parse(&ParseCommandOptions {
        query,
        pretty: true,
        ..ParseCommandOptions::default()
    })
    .unwrap();

    assert!(pretty.text.lines().count() > 1);
    let a: Value = serde_json::from_str(&compact.text).unwrap();
    let b: Value = serde_json::from_str(&pretty.text).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_parse_canonical() {
    let tests = vec![
        ("SOURCE=logs|WHERE a=1", "search source=logs | where a = 1\n"),
        (
            "source = logs | eval x = a + b * 2",
            "search source=logs | eval x = a + (b * 2)\n",
        ),
    ];

    for (input, expected) in tests {
        let output = execute_parse(&ParseCommandOptions {
            query: input.to_string(),
            canonical: true,
            ..ParseCommandOptions::default()
        })
        .unwrap();
        assert_eq!(output.text, expected, "input: {}", input);
    }
}

#[test]
fn test_parse_failure_is_reported() {
    let output = execute_parse(&ParseCommandOptions {
        query: "source=logs | sort".to_string(),
        ..ParseCommandOptions::default()
    })
    .unwrap();
    assert!(!output.success);
    let json: Value = serde_json::from_str(&output.text).unwrap();
    assert_eq!(json["diagnostics"].as_array().unwrap().len(), 1);
}

// ============================================================================
// tokens
// ============================================================================

#[test]
fn test_tokens_listing() {
    let output = execute_tokens(&TokensOptions {
        query: "head 5".to_string(),
        ..TokensOptions::default()
    })
    .unwrap();
    let lines: Vec<_> = output.text.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("   1:1"));
    assert!(lines[0].ends_with("\"head\""));
    assert!(lines[1].starts_with("   1:6"));
    assert!(lines[1].contains("integer"));
}

#[test]
fn test_tokens_all_channels() {
    let output = execute_tokens(&TokensOptions {
        query: "a #".to_string(),
        all: true,
        ..TokensOptions::default()
    })
    .unwrap();
    let lines: Vec<_> = output.text.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[1].ends_with("(hidden)"));
    assert!(lines[2].ends_with("(error)"));
}

#[test]
fn test_tokens_json() {
    let output = execute_tokens(&TokensOptions {
        query: "a = 'b'".to_string(),
        json: true,
        ..TokensOptions::default()
    })
    .unwrap();
    let json: Value = serde_json::from_str(&output.text).unwrap();
    let tokens = json.as_array().unwrap();
    assert_eq!(tokens.len(), 3);
    assert_eq!(tokens[1]["kind"], "equal");
    assert_eq!(tokens[2]["text"], "'b'");
    assert_eq!(tokens[2]["span"]["start"], 4);
}

// ============================================================================
// docs
// ============================================================================

#[test]
fn test_docs_overview_lists_categories() {
    let overview = get_docs_overview();
    assert!(overview.contains("syntax"));
    assert!(overview.contains("pipeline"));
    assert!(overview.contains("expressions"));
    for role in KeywordRole::ALL {
        assert!(overview.contains(role.name()), "missing {}", role.name());
    }
}

#[test]
fn test_doc_categories() {
    let tests = vec![
        ("syntax", DocCategory::Syntax),
        ("PIPES", DocCategory::Pipeline),
        ("expr", DocCategory::Expressions),
    ];
    for (name, expected) in tests {
        assert_eq!(DocCategory::from_name(name), Some(expected), "name: {}", name);
        assert!(get_doc_category(name).is_ok());
    }
}

#[test]
fn test_keyword_docs_list_arity() {
    let doc = get_doc_category("relevance").unwrap();
    assert!(doc.contains("multi_match"));
    assert!(doc.contains("2 arguments"));
    assert!(doc.contains("name=value"));
}

#[test]
fn test_unknown_doc_category() {
    match get_doc_category("nonsense") {
        Err(CliError::UnknownCategory(name)) => assert_eq!(name, "nonsense"),
        other => panic!("Expected UnknownCategory, got {:?}", other),
    }
}
