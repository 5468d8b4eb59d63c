//! Lexical and syntactic diagnostics.
//!
//! Parsing never stops at the first problem. Every issue becomes a
//! [`Diagnostic`] carrying the byte span and the 1-based line and column of
//! the offending text, and the parser carries on with the next command.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::ast::{Channel, Span, Token};
use crate::lexer::unquote;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// Unrecognized character or unterminated string
    LexicalError,
    /// A token the grammar does not allow at this point
    UnexpectedToken,
    /// A clause the command cannot do without
    MissingRequiredClause,
    /// `name=value` with a name outside the option set of the command or function
    InvalidOptionName,
    /// Wrong number of positional arguments for a known function
    ArityMismatch,
    /// A parse or grok pattern that could not be checked
    InvalidPattern,
}

impl DiagnosticKind {
    pub fn default_severity(self) -> Severity {
        match self {
            DiagnosticKind::InvalidPattern => Severity::Warning,
            _ => Severity::Error,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            DiagnosticKind::LexicalError => "lexical error",
            DiagnosticKind::UnexpectedToken => "unexpected token",
            DiagnosticKind::MissingRequiredClause => "missing clause",
            DiagnosticKind::InvalidOptionName => "invalid option",
            DiagnosticKind::ArityMismatch => "arity mismatch",
            DiagnosticKind::InvalidPattern => "invalid pattern",
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A problem found in the query text.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{line}:{column}: {message}")]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub severity: Severity,
    pub message: String,
    pub span: Span,
    /// 1-based line of `span.start`
    pub line: u32,
    /// 1-based column of `span.start`, counted in characters
    pub column: u32,
}

impl Diagnostic {
    /// Diagnostic anchored at `token`, with the kind's default severity.
    pub fn at_token(kind: DiagnosticKind, token: &Token<'_>, message: impl Into<String>) -> Self {
        Diagnostic {
            kind,
            severity: kind.default_severity(),
            message: message.into(),
            span: token.span,
            line: token.line,
            column: token.column,
        }
    }

    /// Diagnostic at an explicit position.
    pub fn at(
        kind: DiagnosticKind,
        span: Span,
        line: u32,
        column: u32,
        message: impl Into<String>,
    ) -> Self {
        Diagnostic {
            kind,
            severity: kind.default_severity(),
            message: message.into(),
            span,
            line,
            column,
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// The source line holding the diagnostic with a caret under its column.
    pub fn snippet(&self, source: &str) -> String {
        let line = source
            .lines()
            .nth(self.line.saturating_sub(1) as usize)
            .unwrap_or("");
        let width = self.span_width(source).max(1);
        format!(
            "{}\n{}{}",
            line,
            " ".repeat(self.column.saturating_sub(1) as usize),
            "^".repeat(width)
        )
    }

    /// Width of the span in characters, clipped to the first line.
    fn span_width(&self, source: &str) -> usize {
        source
            .get(self.span.start..self.span.end)
            .map(|text| text.lines().next().unwrap_or("").chars().count())
            .unwrap_or(0)
    }
}

/// Lexical diagnostics of a token stream: one per error-channel token and
/// one per unterminated quoted token.
pub fn lexical_diagnostics(tokens: &[Token<'_>]) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    for token in tokens {
        if token.channel == Channel::Error {
            diagnostics.push(Diagnostic::at_token(
                DiagnosticKind::LexicalError,
                token,
                format!("unrecognized character `{}`", token.text.escape_debug()),
            ));
        } else if token.kind.is_quoted() && !unquote(token.text).1 {
            diagnostics.push(Diagnostic::at_token(
                DiagnosticKind::LexicalError,
                token,
                format!("unterminated {}", token.kind),
            ));
        }
    }
    diagnostics
}

/// Error-severity diagnostics of a failed parse, for callers that want a
/// single `Result`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{} error(s), first at {}", .errors.len(), .errors.first().map(ToString::to_string).unwrap_or_default())]
pub struct ParseErrors {
    pub errors: Vec<Diagnostic>,
}

impl ParseErrors {
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.errors.iter()
    }
}
