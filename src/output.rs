//! Rendering of parse results for people and for tools.
//!
//! - **JSON** via [`to_json()`] and [`to_json_pretty()`], for anything that
//!   implements `Serialize`: a [`Query`](crate::Query), a
//!   [`ParseResult`](crate::ParseResult), a token list.
//! - **Token listings** via [`render_tokens()`], one token per line.
//! - **Diagnostic reports** via [`render_diagnostics()`], each diagnostic
//!   followed by the offending source line and a caret marker.
//!
//! # Examples
//!
//! ```
//! use ppl_lang::output::to_json;
//!
//! let query = ppl_lang::parse("source=logs | head 5").query;
//! let json = to_json(&query).unwrap();
//! assert!(json.contains(r#""command":"head""#));
//! ```

use std::fmt::Write;

use serde::Serialize;

use crate::ast::{Channel, Token};
use crate::diagnostics::Diagnostic;

/// Compact JSON, no whitespace between elements.
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<String> {
    serde_json::to_string(value)
}

/// JSON indented by two spaces.
pub fn to_json_pretty<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<String> {
    serde_json::to_string_pretty(value)
}

/// One line per token: `line:column kind text`.
///
/// Only default-channel tokens are listed unless `all` is set.
pub fn render_tokens(tokens: &[Token<'_>], all: bool) -> String {
    let mut out = String::new();
    for token in tokens.iter().filter(|t| all || t.is_significant()) {
        let channel = match token.channel {
            Channel::Default => "",
            Channel::Hidden => " (hidden)",
            Channel::Error => " (error)",
        };
        let _ = writeln!(
            out,
            "{:>4}:{:<4} {:<24} {:?}{}",
            token.line,
            token.column,
            token.kind.to_string(),
            token.text,
            channel
        );
    }
    out
}

/// `severity[kind] line:column: message`, the source line and a caret
/// under the offending text, for each diagnostic.
pub fn render_diagnostics(source: &str, diagnostics: &[Diagnostic]) -> String {
    let mut out = String::new();
    for diagnostic in diagnostics {
        let _ = writeln!(
            out,
            "{}[{}] {}",
            diagnostic.severity, diagnostic.kind, diagnostic
        );
        out.push_str(&diagnostic.snippet(source));
        out.push('\n');
    }
    out
}
