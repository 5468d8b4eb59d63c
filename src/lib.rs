//! Scanner and parser for PPL, the piped processing language.
//!
//! ```
//! let result = ppl_lang::parse("source=logs | where status=500 | stats count() by host");
//! assert!(result.is_success());
//! assert_eq!(result.query.command_names(), vec!["search", "where", "stats"]);
//! ```

pub mod ast;
#[cfg(feature = "cli")]
pub mod cli;
pub mod diagnostics;
pub mod lexer;
pub mod output;
pub mod parser;

pub use ast::{
    BinOp, Command, DataSource, Expr, FieldRef, FunctionCall, Keyword, Literal, Query, Span,
    Token, TokenKind, UnaryOp,
};
pub use diagnostics::{Diagnostic, DiagnosticKind, ParseErrors, Severity};
pub use lexer::{Lexer, scan, unquote};
pub use output::{to_json, to_json_pretty};
pub use parser::{ParseOptions, ParseResult, Parser};

/// Scans and parses `text` with the default options.
pub fn parse(text: &str) -> ParseResult {
    parse_with_options(text, ParseOptions::default())
}

pub fn parse_with_options(text: &str, options: ParseOptions) -> ParseResult {
    Parser::with_options(scan(text), options).parse_query()
}

/// Parses `text` as a single expression, such as the condition of a
/// `where` command.
pub fn parse_expression(text: &str) -> Result<Expr, ParseErrors> {
    Parser::new(scan(text)).parse_standalone_expression()
}
