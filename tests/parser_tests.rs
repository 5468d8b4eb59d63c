// tests/parser_tests.rs

use ppl_lang::ast::{
    BinOp, DataType, DateKind, Expr, FunctionFamily, Keyword, Literal, UnaryOp,
};
use ppl_lang::{DiagnosticKind, parse_expression};
use rust_decimal::Decimal;

fn expr(text: &str) -> Expr {
    match parse_expression(text) {
        Ok(expr) => expr,
        Err(e) => panic!("failed to parse {:?}: {:?}", text, e.errors),
    }
}

/// Normalized rendering, which parenthesizes every nested operator expression.
fn render(text: &str) -> String {
    expr(text).to_string()
}

fn first_error(text: &str) -> (DiagnosticKind, String) {
    let errors = parse_expression(text).expect_err(text);
    let first = errors.errors.first().expect("at least one error");
    (first.kind, first.message.clone())
}

// ============================================================================
// Precedence
// ============================================================================

#[test]
fn test_arithmetic() {
    // Should be: Add(1, Multiply(2, 3))
    match expr("1 + 2 * 3") {
        Expr::BinaryOp {
            op: BinOp::Add,
            left,
            right,
        } => {
            assert_eq!(*left, Expr::int(1));
            match *right {
                Expr::BinaryOp {
                    op: BinOp::Multiply,
                    left,
                    right,
                } => {
                    assert_eq!(*left, Expr::int(2));
                    assert_eq!(*right, Expr::int(3));
                }
                other => panic!("Expected multiplication, got {:?}", other),
            }
        }
        other => panic!("Expected addition, got {:?}", other),
    }
}

#[test]
fn test_precedence_table() {
    let tests = vec![
        ("1 + 2 * 3", "1 + (2 * 3)"),
        ("(1 + 2) * 3", "(1 + 2) * 3"),
        ("a - b - c", "(a - b) - c"),
        ("a / b % c", "(a / b) % c"),
        ("a = 1 or b = 2 and c = 3", "(a = 1) or ((b = 2) and (c = 3))"),
        ("a or b xor c", "(a or b) xor c"),
        ("a xor b or c", "a xor (b or c)"),
        ("not a = 1", "not (a = 1)"),
        ("not a or b", "(not a) or b"),
        ("a + 1 > b * 2", "(a + 1) > (b * 2)"),
        ("true and not false", "true and (not false)"),
        ("a in (1, 2) or b", "(a in (1, 2)) or b"),
        ("-a * b", "-a * b"),
    ];

    for (input, expected) in tests {
        assert_eq!(render(input), expected, "input: {}", input);
    }
}

#[test]
fn test_xor_binds_loosest() {
    match expr("a xor b or c") {
        Expr::BinaryOp { op, right, .. } => {
            assert_eq!(op, BinOp::Xor);
            assert!(matches!(*right, Expr::BinaryOp { op: BinOp::Or, .. }));
        }
        other => panic!("Expected xor, got {:?}", other),
    }
}

#[test]
fn test_implicit_and() {
    assert_eq!(render("a = 1 b = 2"), "(a = 1) and (b = 2)");
    assert_eq!(
        render("status = 500 host = 'web' level != 'debug'"),
        "((status = 500) and (host = 'web')) and (level != 'debug')"
    );
}

#[test]
fn test_unary_sign() {
    assert_eq!(
        expr("-x"),
        Expr::unary(UnaryOp::Negate, Expr::field("x"))
    );
    assert_eq!(render("-5 + x"), "-5 + x");
    assert_eq!(render("- (a + b)"), "-(a + b)");
    assert_eq!(render("+a"), "+a");
}

// ============================================================================
// Comparisons
// ============================================================================

#[test]
fn test_comparison_operators() {
    let tests = vec![
        ("a = 1", BinOp::Equal),
        ("a != 1", BinOp::NotEqual),
        ("a < 1", BinOp::Less),
        ("a <= 1", BinOp::LessEqual),
        ("a > 1", BinOp::Greater),
        ("a >= 1", BinOp::GreaterEqual),
        ("a like 'x%'", BinOp::Like),
        ("a regexp 'x.*'", BinOp::Regexp),
    ];

    for (input, expected) in tests {
        match expr(input) {
            Expr::BinaryOp { op, .. } => assert_eq!(op, expected, "input: {}", input),
            other => panic!("input {}: expected comparison, got {:?}", input, other),
        }
    }
}

#[test]
fn test_comparisons_do_not_chain() {
    let (kind, message) = first_error("a < b < c");
    assert_eq!(kind, DiagnosticKind::UnexpectedToken);
    assert!(message.contains("cannot be chained"), "{}", message);
}

#[test]
fn test_in_list() {
    match expr("status in (200, 201, 204)") {
        Expr::In { expr, list } => {
            assert_eq!(*expr, Expr::field("status"));
            assert_eq!(list, vec![Expr::int(200), Expr::int(201), Expr::int(204)]);
        }
        other => panic!("Expected in, got {:?}", other),
    }
    assert!(parse_expression("status in ()").is_err());
}

#[test]
fn test_like_as_function_and_operator() {
    assert!(matches!(
        expr("name like 'a%'"),
        Expr::BinaryOp { op: BinOp::Like, .. }
    ));
    let call = expr("like(name, 'a%')");
    let call = call.as_call().expect("function call");
    assert_eq!(call.name, "like");
    assert_eq!(call.args.len(), 2);
}

// ============================================================================
// Literals and names
// ============================================================================

#[test]
fn test_literals() {
    let tests = vec![
        ("42", Literal::Int(42)),
        ("3.14", Literal::Decimal(Decimal::new(314, 2))),
        ("'it''s'", Literal::Str("it's".into())),
        (r#""say \"hi\"""#, Literal::Str("say \"hi\"".into())),
        ("true", Literal::Bool(true)),
        ("FALSE", Literal::Bool(false)),
        (
            "date '2024-01-31'",
            Literal::Date {
                kind: DateKind::Date,
                value: "2024-01-31".into(),
            },
        ),
        (
            "TIMESTAMP '2024-01-31 10:00:00'",
            Literal::Date {
                kind: DateKind::Timestamp,
                value: "2024-01-31 10:00:00".into(),
            },
        ),
    ];

    for (input, expected) in tests {
        assert_eq!(expr(input), Expr::literal(expected), "input: {}", input);
    }
}

#[test]
fn test_large_integer_becomes_decimal() {
    match expr("99999999999999999999") {
        Expr::Literal {
            value: Literal::Decimal(d),
        } => assert_eq!(d.to_string(), "99999999999999999999"),
        other => panic!("Expected decimal, got {:?}", other),
    }
}

#[test]
fn test_field_names() {
    let tests = vec![
        ("host", "host"),
        ("request.headers.host", "request.headers.host"),
        ("`my field`", "my field"),
        ("@timestamp", "@timestamp"),
        // keywords outside command position are plain names
        ("count", "count"),
        ("source", "source"),
        ("a.by", "a.by"),
    ];

    for (input, expected) in tests {
        assert_eq!(expr(input), Expr::field(expected), "input: {}", input);
    }
}

#[test]
fn test_date_keyword_as_field() {
    assert_eq!(render("date = '2024-01-01'"), "date = '2024-01-01'");
    assert_eq!(
        expr("date = '2024-01-01'"),
        Expr::binary(BinOp::Equal, Expr::field("date"), Expr::string("2024-01-01"))
    );
}

#[test]
fn test_quoted_names_render_with_backticks() {
    assert_eq!(render("`my field` = 1"), "`my field` = 1");
    assert_eq!(render("`and` = 1"), "`and` = 1");
}

#[test]
fn test_backtick_escapes_round_trip() {
    let tests = vec![
        (r"`a\`b` = 1", "a`b", "`a``b` = 1"),
        (r"`a\\` = 1", r"a\", r"`a\\` = 1"),
        (r"`a\\b` = 1", r"a\b", r"`a\\b` = 1"),
        ("`a``b` = 1", "a`b", "`a``b` = 1"),
    ];

    for (input, name, canonical) in tests {
        let parsed = expr(input);
        match &parsed {
            Expr::BinaryOp { left, .. } => match left.as_ref() {
                Expr::Field(field) => assert_eq!(field.name, name, "input: {}", input),
                other => panic!("Expected field, got {:?}", other),
            },
            other => panic!("Expected comparison, got {:?}", other),
        }
        let rendered = parsed.to_string();
        assert_eq!(rendered, canonical, "input: {}", input);
        assert_eq!(expr(&rendered), parsed, "input: {}", input);
    }
}

// ============================================================================
// Special forms
// ============================================================================

#[test]
fn test_interval() {
    match expr("interval 1 day") {
        Expr::Interval { value, unit } => {
            assert_eq!(*value, Expr::int(1));
            assert_eq!(unit, Keyword::Day);
        }
        other => panic!("Expected interval, got {:?}", other),
    }
    assert_eq!(render("interval 2 + 3 hour_minute"), "interval (2 + 3) hour_minute");
}

#[test]
fn test_case() {
    match expr("case(a = 1, 'one', a = 2, 'two' else 'other')") {
        Expr::Case { branches, default } => {
            assert_eq!(branches.len(), 2);
            assert_eq!(branches[1].value, Expr::string("two"));
            assert_eq!(default.as_deref(), Some(&Expr::string("other")));
        }
        other => panic!("Expected case, got {:?}", other),
    }

    match expr("case(a > 0, 'positive')") {
        Expr::Case { branches, default } => {
            assert_eq!(branches.len(), 1);
            assert!(default.is_none());
        }
        other => panic!("Expected case, got {:?}", other),
    }
}

#[test]
fn test_cast() {
    let tests = vec![
        ("cast(a as int)", DataType::Int),
        ("cast(a + 1 as DOUBLE)", DataType::Double),
        ("cast('2024-01-01' as date)", DataType::Date),
    ];

    for (input, expected) in tests {
        match expr(input) {
            Expr::Cast { to, .. } => assert_eq!(to, expected, "input: {}", input),
            other => panic!("input {}: expected cast, got {:?}", input, other),
        }
    }

    let (_, message) = first_error("cast(a as widget)");
    assert!(message.contains("expected a type name"), "{}", message);
}

// ============================================================================
// Function calls
// ============================================================================

#[test]
fn test_function_calls() {
    let tests = vec![
        ("abs(-1)", "abs", 1, FunctionFamily::Scalar),
        ("substring(host, 1, 3)", "substring", 3, FunctionFamily::Scalar),
        ("concat(a, b, c, d)", "concat", 4, FunctionFamily::Scalar),
        ("now()", "now", 0, FunctionFamily::Scalar),
        ("avg(latency)", "avg", 1, FunctionFamily::Aggregate),
        ("IF(a > 1, 'x', 'y')", "if", 3, FunctionFamily::Scalar),
    ];

    for (input, name, args, family) in tests {
        let parsed = expr(input);
        let call = parsed.as_call().expect(input);
        assert_eq!(call.name, name, "input: {}", input);
        assert_eq!(call.args.len(), args, "input: {}", input);
        assert_eq!(call.family, family, "input: {}", input);
    }
}

#[test]
fn test_special_argument_forms() {
    let tests = vec![
        ("extract(day from ts)", "extract('day', ts)"),
        ("extract('day', ts)", "extract('day', ts)"),
        ("position('a' in name)", "position('a', name)"),
        ("percentile<95>(latency)", "percentile(latency, 95)"),
        ("percentile(latency, 95)", "percentile(latency, 95)"),
    ];

    for (input, expected) in tests {
        assert_eq!(render(input), expected, "input: {}", input);
    }
}

#[test]
fn test_unknown_function() {
    let (kind, message) = first_error("frobnicate(1)");
    assert_eq!(kind, DiagnosticKind::UnexpectedToken);
    assert_eq!(message, "unknown function `frobnicate`");
}

#[test]
fn test_arity_mismatch() {
    let tests = vec![
        ("abs(1, 2)", "`abs` takes 1 argument, found 2"),
        ("substring(a)", "`substring` takes 2 to 3 arguments, found 1"),
        ("concat()", "`concat` takes at least 1 argument, found 0"),
        ("pi(1)", "`pi` takes 0 arguments, found 1"),
    ];

    for (input, expected) in tests {
        let (kind, message) = first_error(input);
        assert_eq!(kind, DiagnosticKind::ArityMismatch, "input: {}", input);
        assert_eq!(message, expected, "input: {}", input);
    }
}

// ============================================================================
// Relevance functions
// ============================================================================

#[test]
fn test_relevance_options() {
    let parsed = expr("match(message, 'disk full', operator='AND', boost=2.5)");
    let call = parsed.as_call().expect("call");
    assert_eq!(call.family, FunctionFamily::Relevance);
    assert_eq!(call.args.len(), 2);
    assert_eq!(call.options.len(), 2);
    assert_eq!(call.option("operator"), Some(&Literal::Str("AND".into())));
    assert_eq!(
        call.option("boost"),
        Some(&Literal::Decimal(Decimal::new(25, 1)))
    );
    assert_eq!(
        parsed.to_string(),
        "match(message, 'disk full', operator='AND', boost=2.5)"
    );
}

#[test]
fn test_relevance_bare_word_option_values() {
    let parsed = expr("match(message, 'x', fuzziness=AUTO, analyzer=standard)");
    let call = parsed.as_call().expect("call");
    assert_eq!(call.option("fuzziness"), Some(&Literal::Str("AUTO".into())));
    assert_eq!(call.option("analyzer"), Some(&Literal::Str("standard".into())));
}

#[test]
fn test_weighted_field_list() {
    let parsed = expr("multi_match(['title' ^ 2, body, \"tags\"], 'error')");
    let call = parsed.as_call().expect("call");
    match &call.args[0] {
        Expr::WeightedFields { fields } => {
            assert_eq!(fields.len(), 3);
            assert_eq!(fields[0].field, "title");
            assert_eq!(fields[0].weight, Some(Decimal::from(2)));
            assert_eq!(fields[1].field, "body");
            assert_eq!(fields[1].weight, None);
            assert_eq!(fields[2].field, "tags");
        }
        other => panic!("Expected field list, got {:?}", other),
    }
    assert_eq!(
        parsed.to_string(),
        "multi_match(['title' ^ 2, 'body', 'tags'], 'error')"
    );
}

#[test]
fn test_unknown_relevance_option() {
    let (kind, message) = first_error("match(message, 'x', bogus=1)");
    assert_eq!(kind, DiagnosticKind::InvalidOptionName);
    assert_eq!(message, "`bogus` is not an option of `match`");
}

#[test]
fn test_positional_after_option() {
    let (_, message) = first_error("match(message, 'x', boost=2, 'y')");
    assert!(message.starts_with("expected a `name=value` option"), "{}", message);
}

#[test]
fn test_comparison_argument_is_not_an_option() {
    // only two positionals satisfy match, so `a = 'x'` stays an argument
    let parsed = expr("match(a = 'x', 'y')");
    let call = parsed.as_call().expect("call");
    assert!(call.options.is_empty());
    assert!(matches!(call.args[0], Expr::BinaryOp { op: BinOp::Equal, .. }));
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_expression_errors() {
    let tests = vec![
        ("1 +", "expected an expression, found end of input"),
        ("(a = 1", "expected `)`, found end of input"),
        ("a = 1 )", "expected end of expression, found `)`"),
        ("a = ,", "expected an expression, found `,`"),
    ];

    for (input, expected) in tests {
        let (kind, message) = first_error(input);
        assert_eq!(kind, DiagnosticKind::UnexpectedToken, "input: {}", input);
        assert_eq!(message, expected, "input: {}", input);
    }
}

#[test]
fn test_error_positions() {
    let errors = parse_expression("a = 1 +").unwrap_err();
    let d = &errors.errors[0];
    assert_eq!(d.span.start, 7);
    assert_eq!((d.line, d.column), (1, 8));
}

// ============================================================================
// Nesting
// ============================================================================

#[test]
fn test_moderate_nesting_parses() {
    let tests = vec![
        format!("{}a{}", "(".repeat(50), ")".repeat(50)),
        format!("{}true", "not ".repeat(50)),
        format!("{}1", "-".repeat(50)),
        format!("{}a{}", "abs(".repeat(50), ")".repeat(50)),
    ];

    for input in tests {
        assert!(parse_expression(&input).is_ok(), "input: {}", input);
    }
}

#[test]
fn test_deep_nesting_is_an_error() {
    let tests = vec![
        format!("{}a{}", "(".repeat(10_000), ")".repeat(10_000)),
        format!("{}a", "not ".repeat(10_000)),
        format!("{}1", "- ".repeat(10_000)),
        format!("{}a{}", "abs(".repeat(10_000), ")".repeat(10_000)),
    ];

    for input in tests {
        let (kind, message) = first_error(&input);
        assert_eq!(kind, DiagnosticKind::UnexpectedToken, "input: {:.20}", input);
        assert_eq!(message, "expression nested too deeply", "input: {:.20}", input);
    }
}

#[test]
fn test_nesting_limit_counts_levels() {
    let at_limit = format!("{}a{}", "(".repeat(99), ")".repeat(99));
    assert!(parse_expression(&at_limit).is_ok());

    let over = format!("{}a{}", "(".repeat(100), ")".repeat(100));
    let errors = parse_expression(&over).unwrap_err();
    assert_eq!(errors.errors[0].message, "expression nested too deeply");
    assert_eq!(errors.errors[0].span.start, 100);
}
