use std::fmt;

use serde::Serialize;

use crate::ast::Keyword;

/// Half-open byte range `[start, end)` into the query text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Span { start, end }
    }

    /// Zero-width span at `offset`.
    pub fn at(offset: usize) -> Self {
        Span {
            start: offset,
            end: offset,
        }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Smallest span covering both `self` and `other`.
    pub fn cover(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

/// Which consumer a token is meant for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    /// Significant to the parser.
    Default,
    /// Whitespace. Never reaches the parser.
    Hidden,
    /// A single unrecognized character.
    Error,
}

/// Token discriminant.
///
/// Keywords live in their own enum ([`Keyword`]) so the parser can match on
/// `TokenKind::Keyword(Keyword::Stats)` without string comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    // Punctuation
    /// Pipeline separator
    ///
    /// # Examples
    /// ```text
    /// source=logs | where status=200 | stats count()
    /// ```
    Pipe,
    Comma,
    Dot,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Colon,

    // Comparison
    /// `=`, used both for comparison and for `name=value` options
    Equal,
    /// `!=`
    NotEqual,
    /// `<`
    Less,
    /// `<=`
    LessEqual,
    /// `>`
    Greater,
    /// `>=`
    GreaterEqual,

    // Arithmetic
    Plus,
    Minus,
    Star,
    Slash,
    Percent,

    // Bitwise
    /// `~`
    Tilde,
    /// `&`
    Ampersand,
    /// `^`, also the field weight marker in relevance field lists
    ///
    /// # Examples
    /// ```text
    /// multi_match(['title' ^ 2, 'body'], 'error')
    /// ```
    Caret,
    /// `!`
    Exclamation,

    /// Reserved word, matched case-insensitively
    Keyword(Keyword),

    // Literals
    /// Run of decimal digits
    ///
    /// # Examples
    /// ```text
    /// 200
    /// 0042
    /// ```
    Integer,
    /// Digits, a dot, digits. No exponent, no sign.
    ///
    /// # Examples
    /// ```text
    /// 3.14
    /// 0.5
    /// ```
    Decimal,
    /// `"..."` string literal
    DqString,
    /// `'...'` string literal
    SqString,
    /// `` `...` `` quoted identifier
    BqString,

    // Identifiers
    /// Field, index or function name that is not a reserved word
    ///
    /// # Examples
    /// ```text
    /// host
    /// @timestamp
    /// logs-*
    /// ```
    Identifier,
    /// Cluster-qualified identifier
    ///
    /// # Examples
    /// ```text
    /// remote_cluster:logs
    /// ```
    Cluster,
    /// Identifier carrying a date suffix, used by index patterns
    ///
    /// # Examples
    /// ```text
    /// logs.2021.01.31
    /// metrics-2023.10
    /// ```
    IdDateSuffix,

    /// Run of spaces, tabs, carriage returns and newlines (hidden channel)
    Space,
    /// Unrecognized character (error channel)
    Error,
}

impl TokenKind {
    pub fn is_string(self) -> bool {
        matches!(self, TokenKind::DqString | TokenKind::SqString)
    }

    pub fn is_quoted(self) -> bool {
        matches!(
            self,
            TokenKind::DqString | TokenKind::SqString | TokenKind::BqString
        )
    }

    pub fn keyword(self) -> Option<Keyword> {
        match self {
            TokenKind::Keyword(kw) => Some(kw),
            _ => None,
        }
    }

    /// Fixed spelling for punctuation and operators.
    pub fn symbol(self) -> Option<&'static str> {
        let s = match self {
            TokenKind::Pipe => "|",
            TokenKind::Comma => ",",
            TokenKind::Dot => ".",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
            TokenKind::Colon => ":",
            TokenKind::Equal => "=",
            TokenKind::NotEqual => "!=",
            TokenKind::Less => "<",
            TokenKind::LessEqual => "<=",
            TokenKind::Greater => ">",
            TokenKind::GreaterEqual => ">=",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::Percent => "%",
            TokenKind::Tilde => "~",
            TokenKind::Ampersand => "&",
            TokenKind::Caret => "^",
            TokenKind::Exclamation => "!",
            _ => return None,
        };
        Some(s)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Keyword(kw) => write!(f, "keyword {}", kw),
            TokenKind::Integer => write!(f, "integer"),
            TokenKind::Decimal => write!(f, "decimal"),
            TokenKind::DqString | TokenKind::SqString => write!(f, "string"),
            TokenKind::BqString => write!(f, "quoted identifier"),
            TokenKind::Identifier => write!(f, "identifier"),
            TokenKind::Cluster => write!(f, "cluster identifier"),
            TokenKind::IdDateSuffix => write!(f, "date-suffixed identifier"),
            TokenKind::Space => write!(f, "whitespace"),
            TokenKind::Error => write!(f, "unrecognized character"),
            other => write!(f, "`{}`", other.symbol().unwrap_or_default()),
        }
    }
}

/// A classified slice of the query text.
///
/// `text` is the exact source substring, so a keyword written `StAtS` keeps
/// its spelling even though its kind is `Keyword(Stats)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    pub channel: Channel,
    pub span: Span,
    /// 1-based line of the first character
    pub line: u32,
    /// 1-based column of the first character, counted in characters
    pub column: u32,
}

impl<'a> Token<'a> {
    pub fn is_keyword(&self, kw: Keyword) -> bool {
        self.kind == TokenKind::Keyword(kw)
    }

    pub fn is_significant(&self) -> bool {
        self.channel == Channel::Default
    }

    /// Human readable description used in diagnostics.
    pub fn describe(&self) -> String {
        match self.kind {
            TokenKind::Keyword(_) | TokenKind::Identifier | TokenKind::Cluster => {
                format!("`{}`", self.text)
            }
            TokenKind::Integer | TokenKind::Decimal => format!("number `{}`", self.text),
            kind if kind.is_quoted() => format!("{} {}", kind, self.text),
            kind => kind.to_string(),
        }
    }
}
