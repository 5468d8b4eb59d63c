//! Recursive-descent parser for PPL pipelines.
//!
//! The parser works on the significant tokens of a scan. Each command has
//! its own sub-grammar (see `commands`) and all of them share the expression
//! grammar in `expressions`. An error inside a command is recorded and the
//! parser resynchronizes at the next `|`, so one bad stage does not hide
//! problems further down the pipeline.

mod commands;
mod expressions;

use serde::Serialize;
use tracing::{debug, trace};

use crate::ast::{Channel, Command, Expr, Keyword, Query, Span, Token, TokenKind};
use crate::diagnostics::{Diagnostic, DiagnosticKind, ParseErrors, Severity, lexical_diagnostics};

pub(crate) type PResult<T> = Result<T, Diagnostic>;

/// How deep parentheses, calls and prefix operators may nest in one expression.
pub const MAX_NESTING: usize = 100;

/// Parser configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Keep going after an error by skipping to the next `|`. When off,
    /// parsing stops after the first command that produced an error.
    pub recover: bool,
    /// Diagnostics beyond this count are dropped.
    pub max_diagnostics: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            recover: true,
            max_diagnostics: 100,
        }
    }
}

/// The pipeline that could be built, plus everything wrong with the text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParseResult {
    pub query: Query,
    /// Sorted by position
    pub diagnostics: Vec<Diagnostic>,
}

impl ParseResult {
    /// No error-severity diagnostics. Warnings are allowed.
    pub fn is_success(&self) -> bool {
        !self.diagnostics.iter().any(Diagnostic::is_error)
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
    }

    pub fn into_result(self) -> Result<Query, ParseErrors> {
        if self.is_success() {
            Ok(self.query)
        } else {
            Err(ParseErrors {
                errors: self.diagnostics.into_iter().filter(Diagnostic::is_error).collect(),
            })
        }
    }
}

/// Position just past the last token, used for "end of input" diagnostics.
#[derive(Debug, Clone, Copy)]
struct EndOfInput {
    offset: usize,
    line: u32,
    column: u32,
}

pub struct Parser<'a> {
    tokens: Vec<Token<'a>>,
    pos: usize,
    end: EndOfInput,
    diagnostics: Vec<Diagnostic>,
    options: ParseOptions,
    depth: usize,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: impl IntoIterator<Item = Token<'a>>) -> Self {
        Parser::with_options(tokens, ParseOptions::default())
    }

    pub fn with_options(tokens: impl IntoIterator<Item = Token<'a>>, options: ParseOptions) -> Self {
        let all: Vec<Token<'a>> = tokens.into_iter().collect();

        let end = match all.last() {
            Some(last) => {
                let (mut line, mut column) = (last.line, last.column);
                for ch in last.text.chars() {
                    if ch == '\n' {
                        line += 1;
                        column = 1;
                    } else {
                        column += 1;
                    }
                }
                EndOfInput {
                    offset: last.span.end,
                    line,
                    column,
                }
            }
            None => EndOfInput {
                offset: 0,
                line: 1,
                column: 1,
            },
        };

        let mut diagnostics = lexical_diagnostics(&all);
        diagnostics.truncate(options.max_diagnostics);

        Parser {
            tokens: all
                .into_iter()
                .filter(|t| t.channel == Channel::Default)
                .collect(),
            pos: 0,
            end,
            diagnostics,
            options,
            depth: 0,
        }
    }

    /// Parses the whole pipeline.
    pub fn parse_query(mut self) -> ParseResult {
        debug!(tokens = self.tokens.len(), "parsing query");

        let mut commands = Vec::new();
        if self.at_end() {
            let d = self.error_at_end(
                DiagnosticKind::MissingRequiredClause,
                "empty query: expected a command",
            );
            self.report(d);
        }

        let mut first = true;
        while !self.at_end() {
            match self.parse_command(first) {
                Ok(command) => {
                    trace!(command = command.name(), "parsed command");
                    commands.push(command);
                    if !self.at_boundary() {
                        let d = self.err_expected("`|` or end of query");
                        self.report(d);
                        self.synchronize();
                    }
                }
                Err(d) => {
                    self.report(d);
                    self.synchronize();
                }
            }
            first = false;

            if !self.options.recover && self.has_errors() {
                debug!("stopping at first error");
                break;
            }
            if self.eat(TokenKind::Pipe) && self.at_end() {
                let d = self.error_at_end(
                    DiagnosticKind::MissingRequiredClause,
                    "expected a command after `|`",
                );
                self.report(d);
            }
        }

        let mut diagnostics = self.diagnostics;
        diagnostics.sort_by_key(|d| d.span.start);
        debug!(
            commands = commands.len(),
            diagnostics = diagnostics.len(),
            "parsed query"
        );
        ParseResult {
            query: Query::new(commands),
            diagnostics,
        }
    }

    /// Parses the whole input as a single expression, as used by `where`.
    pub fn parse_standalone_expression(mut self) -> Result<Expr, ParseErrors> {
        let parsed = self.parse_expression();
        match parsed {
            Ok(expr) if self.at_end() => {
                if self.has_errors() {
                    return Err(self.into_errors());
                }
                Ok(expr)
            }
            Ok(_) => {
                let d = self.err_expected("end of expression");
                self.report(d);
                Err(self.into_errors())
            }
            Err(d) => {
                self.report(d);
                Err(self.into_errors())
            }
        }
    }

    fn into_errors(self) -> ParseErrors {
        let mut errors: Vec<_> = self.diagnostics.into_iter().filter(Diagnostic::is_error).collect();
        errors.sort_by_key(|d| d.span.start);
        ParseErrors { errors }
    }

    fn parse_command(&mut self, first: bool) -> PResult<Command> {
        let Some(token) = self.peek() else {
            return Err(self.err_expected("a command"));
        };
        let kind = token.kind;

        match kind {
            TokenKind::Keyword(Keyword::Search) => self.parse_search(true),
            TokenKind::Keyword(Keyword::Describe) => self.parse_describe(),
            TokenKind::Keyword(Keyword::Show) => self.parse_show(),
            TokenKind::Keyword(Keyword::Where) => self.parse_where(),
            TokenKind::Keyword(Keyword::Fields) => self.parse_fields(),
            TokenKind::Keyword(Keyword::Rename) => self.parse_rename(),
            TokenKind::Keyword(Keyword::Stats) => self.parse_stats(),
            TokenKind::Keyword(Keyword::Dedup) => self.parse_dedup(),
            TokenKind::Keyword(Keyword::Sort) => self.parse_sort(),
            TokenKind::Keyword(Keyword::Eval) => self.parse_eval(),
            TokenKind::Keyword(Keyword::Head) => self.parse_head(),
            TokenKind::Keyword(Keyword::Top) => self.parse_rank().map(Command::Top),
            TokenKind::Keyword(Keyword::Rare) => self.parse_rank().map(Command::Rare),
            TokenKind::Keyword(Keyword::Parse) => self.parse_regex(),
            TokenKind::Keyword(Keyword::Grok) => self.parse_grok(),
            TokenKind::Keyword(Keyword::Patterns | Keyword::Pattern) => self.parse_patterns(),
            TokenKind::Keyword(Keyword::Kmeans) => self.parse_ml_params(Keyword::Kmeans).map(Command::Kmeans),
            TokenKind::Keyword(Keyword::Ad) => self.parse_ml_params(Keyword::Ad).map(Command::Ad),
            TokenKind::Keyword(Keyword::Ml) => self.parse_ml_params(Keyword::Ml).map(Command::Ml),
            // `source=logs ...` and `status=500 source=logs` are searches
            _ if first && kind != TokenKind::Pipe => self.parse_search(false),
            _ => Err(self.err_expected("a command")),
        }
    }

    // -----------------------------------------------------------------------
    // Token navigation
    // -----------------------------------------------------------------------

    pub(crate) fn peek(&self) -> Option<Token<'a>> {
        self.tokens.get(self.pos).copied()
    }

    pub(crate) fn peek_kind(&self) -> Option<TokenKind> {
        self.peek().map(|t| t.kind)
    }

    pub(crate) fn peek_nth_kind(&self, n: usize) -> Option<TokenKind> {
        self.tokens.get(self.pos + n).map(|t| t.kind)
    }

    pub(crate) fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    /// End of the current command.
    pub(crate) fn at_boundary(&self) -> bool {
        matches!(self.peek_kind(), None | Some(TokenKind::Pipe))
    }

    pub(crate) fn advance(&mut self) -> Option<Token<'a>> {
        let token = self.peek();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    pub(crate) fn check(&self, kind: TokenKind) -> bool {
        self.peek_kind() == Some(kind)
    }

    pub(crate) fn check_kw(&self, kw: Keyword) -> bool {
        self.check(TokenKind::Keyword(kw))
    }

    pub(crate) fn eat(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    pub(crate) fn eat_kw(&mut self, kw: Keyword) -> bool {
        self.eat(TokenKind::Keyword(kw))
    }

    pub(crate) fn expect(&mut self, kind: TokenKind) -> PResult<Token<'a>> {
        match self.peek() {
            Some(token) if token.kind == kind => {
                self.pos += 1;
                Ok(token)
            }
            _ => Err(self.err_expected(&kind.to_string())),
        }
    }

    pub(crate) fn expect_kw(&mut self, kw: Keyword) -> PResult<Token<'a>> {
        self.expect(TokenKind::Keyword(kw))
    }

    /// `NAME=` at the current position.
    pub(crate) fn at_option(&self, kw: Keyword) -> bool {
        self.check_kw(kw) && self.peek_nth_kind(1) == Some(TokenKind::Equal)
    }

    /// Any word followed by `=`.
    pub(crate) fn at_assignment(&self) -> bool {
        matches!(
            self.peek_kind(),
            Some(TokenKind::Identifier | TokenKind::Keyword(_))
        ) && self.peek_nth_kind(1) == Some(TokenKind::Equal)
    }

    // -----------------------------------------------------------------------
    // Diagnostics
    // -----------------------------------------------------------------------

    pub(crate) fn err_expected(&self, what: &str) -> Diagnostic {
        match self.peek() {
            Some(token) => Diagnostic::at_token(
                DiagnosticKind::UnexpectedToken,
                &token,
                format!("expected {}, found {}", what, token.describe()),
            ),
            None => self.error_at_end(
                DiagnosticKind::UnexpectedToken,
                format!("expected {}, found end of input", what),
            ),
        }
    }

    /// Diagnostic at the current token, or at the end of input.
    pub(crate) fn error_here(&self, kind: DiagnosticKind, message: impl Into<String>) -> Diagnostic {
        match self.peek() {
            Some(token) => Diagnostic::at_token(kind, &token, message),
            None => self.error_at_end(kind, message),
        }
    }

    pub(crate) fn error_at_end(&self, kind: DiagnosticKind, message: impl Into<String>) -> Diagnostic {
        Diagnostic::at(
            kind,
            Span::at(self.end.offset),
            self.end.line,
            self.end.column,
            message,
        )
    }

    /// Records a diagnostic without interrupting the current command.
    pub(crate) fn report(&mut self, diagnostic: Diagnostic) {
        if self.diagnostics.len() < self.options.max_diagnostics {
            self.diagnostics.push(diagnostic);
        } else {
            trace!(message = %diagnostic.message, "diagnostic limit reached, dropping");
        }
    }

    fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    /// Skips to the next `|` (not consumed) or the end of input.
    pub(crate) fn synchronize(&mut self) {
        let start = self.pos;
        while !self.at_boundary() {
            self.pos += 1;
        }
        if self.pos > start {
            debug!(skipped = self.pos - start, "resynchronized at command boundary");
        }
    }

    /// Comma-separated list that keeps the elements parsed before an error.
    ///
    /// An error on the first element fails the list. An error on a later
    /// element is reported, the rest of the command is skipped, and the
    /// elements parsed so far are returned.
    pub(crate) fn parse_list<T>(
        &mut self,
        mut element: impl FnMut(&mut Self) -> PResult<T>,
    ) -> PResult<Vec<T>> {
        let mut items = vec![element(self)?];
        while self.eat(TokenKind::Comma) {
            match element(self) {
                Ok(item) => items.push(item),
                Err(d) => {
                    self.report(d);
                    self.synchronize();
                    break;
                }
            }
        }
        Ok(items)
    }
}
