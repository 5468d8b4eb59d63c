use crate::ast::keywords;
use crate::ast::{Channel, Span, Token, TokenKind};

/// Starts scanning `input`. Every call starts over from the first byte.
pub fn scan(input: &str) -> Lexer<'_> {
    Lexer::new(input)
}

/// Maximal-munch scanner over the query text.
///
/// The lexer never fails: characters it does not recognize become
/// error-channel tokens and scanning continues after them. Whitespace is
/// kept as hidden-channel tokens so that the spans of all tokens tile the
/// input.
#[derive(Debug, Clone)]
pub struct Lexer<'a> {
    input: &'a str,
    position: usize,
    line: u32,
    column: u32,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Lexer {
            input,
            position: 0,
            line: 1,
            column: 1,
        }
    }

    fn current_byte(&self) -> Option<u8> {
        self.input.as_bytes().get(self.position).copied()
    }

    fn peek_byte(&self, offset: usize) -> Option<u8> {
        self.input.as_bytes().get(self.position + offset).copied()
    }

    fn advance(&mut self, n: usize) {
        self.position = (self.position + n).min(self.input.len());
    }

    /// Whether an identifier run starts `offset` bytes ahead.
    fn starts_identifier(&self, offset: usize) -> bool {
        match self.peek_byte(offset) {
            Some(b'*') => self.peek_byte(offset + 1).is_some_and(is_identifier_start),
            Some(b) => is_identifier_start(b),
            None => false,
        }
    }

    fn emit(&mut self, kind: TokenKind, start: usize) -> Token<'a> {
        let text = &self.input[start..self.position];
        let channel = match kind {
            TokenKind::Space => Channel::Hidden,
            TokenKind::Error => Channel::Error,
            _ => Channel::Default,
        };
        let token = Token {
            kind,
            text,
            channel,
            span: Span::new(start, self.position),
            line: self.line,
            column: self.column,
        };
        for ch in text.chars() {
            if ch == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        token
    }

    fn skip_whitespace(&mut self) {
        while let Some(b' ' | b'\t' | b'\r' | b'\n') = self.current_byte() {
            self.advance(1);
        }
    }

    fn skip_identifier_run(&mut self) {
        // the first byte is already known to start an identifier
        self.advance(1);
        while self.current_byte().is_some_and(is_identifier_continue) {
            self.advance(1);
        }
    }

    fn read_word(&mut self) -> TokenKind {
        let start = self.position;
        self.skip_identifier_run();
        let run = &self.input[start..self.position];

        let mut clustered = false;
        if !run.starts_with('@') && self.current_byte() == Some(b':') && self.starts_identifier(1)
        {
            self.advance(1);
            self.skip_identifier_run();
            clustered = true;
        }

        let mut suffixed = false;
        while matches!(self.current_byte(), Some(b'.' | b'-'))
            && self.peek_byte(1).is_some_and(is_date_suffix_byte)
        {
            self.advance(1);
            while self.current_byte().is_some_and(is_date_suffix_byte) {
                self.advance(1);
            }
            suffixed = true;
        }

        if suffixed {
            TokenKind::IdDateSuffix
        } else if clustered {
            TokenKind::Cluster
        } else if run.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_') {
            keywords::lookup(run).map_or(TokenKind::Identifier, TokenKind::Keyword)
        } else {
            TokenKind::Identifier
        }
    }

    fn read_number(&mut self) -> TokenKind {
        while self.current_byte().is_some_and(|b| b.is_ascii_digit()) {
            self.advance(1);
        }
        if self.current_byte() == Some(b'.') && self.peek_byte(1).is_some_and(|b| b.is_ascii_digit())
        {
            self.advance(1);
            while self.current_byte().is_some_and(|b| b.is_ascii_digit()) {
                self.advance(1);
            }
            TokenKind::Decimal
        } else {
            TokenKind::Integer
        }
    }

    /// Scans a quoted token up to and including its closing quote. An
    /// unterminated string runs to the end of the input.
    fn read_quoted(&mut self, quote: u8) -> TokenKind {
        self.advance(1);
        while let Some(b) = self.current_byte() {
            match b {
                b'\\' => self.advance(2),
                b if b == quote => {
                    if self.peek_byte(1) == Some(quote) {
                        self.advance(2);
                    } else {
                        self.advance(1);
                        break;
                    }
                }
                _ => self.advance(1),
            }
        }
        match quote {
            b'"' => TokenKind::DqString,
            b'\'' => TokenKind::SqString,
            _ => TokenKind::BqString,
        }
    }

    fn operator(&mut self, kind: TokenKind, len: usize) -> TokenKind {
        self.advance(len);
        kind
    }

    pub fn next_token(&mut self) -> Option<Token<'a>> {
        let start = self.position;
        let byte = self.current_byte()?;

        let kind = match byte {
            b' ' | b'\t' | b'\r' | b'\n' => {
                self.skip_whitespace();
                TokenKind::Space
            }
            b'|' => self.operator(TokenKind::Pipe, 1),
            b',' => self.operator(TokenKind::Comma, 1),
            b'.' => self.operator(TokenKind::Dot, 1),
            b'(' => self.operator(TokenKind::LParen, 1),
            b')' => self.operator(TokenKind::RParen, 1),
            b'[' => self.operator(TokenKind::LBracket, 1),
            b']' => self.operator(TokenKind::RBracket, 1),
            b':' => self.operator(TokenKind::Colon, 1),
            b'=' => self.operator(TokenKind::Equal, 1),
            b'+' => self.operator(TokenKind::Plus, 1),
            b'-' => self.operator(TokenKind::Minus, 1),
            b'/' => self.operator(TokenKind::Slash, 1),
            b'%' => self.operator(TokenKind::Percent, 1),
            b'~' => self.operator(TokenKind::Tilde, 1),
            b'&' => self.operator(TokenKind::Ampersand, 1),
            b'^' => self.operator(TokenKind::Caret, 1),
            b'!' if self.peek_byte(1) == Some(b'=') => self.operator(TokenKind::NotEqual, 2),
            b'!' => self.operator(TokenKind::Exclamation, 1),
            b'<' if self.peek_byte(1) == Some(b'=') => self.operator(TokenKind::LessEqual, 2),
            b'<' => self.operator(TokenKind::Less, 1),
            b'>' if self.peek_byte(1) == Some(b'=') => self.operator(TokenKind::GreaterEqual, 2),
            b'>' => self.operator(TokenKind::Greater, 1),
            b'"' | b'\'' | b'`' => self.read_quoted(byte),
            b'*' if !self.starts_identifier(0) => self.operator(TokenKind::Star, 1),
            b if b.is_ascii_digit() => self.read_number(),
            _ if self.starts_identifier(0) => self.read_word(),
            _ => {
                let width = self.input[start..].chars().next().map_or(1, char::len_utf8);
                self.advance(width);
                TokenKind::Error
            }
        };

        Some(self.emit(kind, start))
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        self.next_token()
    }
}

fn is_identifier_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b == b'@'
}

fn is_identifier_continue(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'_' | b'*' | b'-')
}

fn is_date_suffix_byte(b: u8) -> bool {
    b.is_ascii_digit() || b == b'*'
}

/// Decodes the text of a quoted token.
///
/// Returns the decoded value and whether the closing quote was present.
/// In `"..."` and `'...'`, a backslash before a quote or another backslash
/// yields that character and any other backslash pair is kept as written,
/// so regex escapes such as `\d` survive. In `` `...` `` a backslash
/// yields whatever character follows it. In all three styles a doubled
/// enclosing quote stands for one quote.
///
/// ```
/// use ppl_lang::lexer::unquote;
///
/// assert_eq!(unquote(r#""it""s""#), ("it\"s".to_string(), true));
/// assert_eq!(unquote(r"'it\'s'"), ("it's".to_string(), true));
/// assert_eq!(unquote(r"'\d+'"), (r"\d+".to_string(), true));
/// assert_eq!(unquote(r"`a\`b`"), ("a`b".to_string(), true));
/// ```
pub fn unquote(text: &str) -> (String, bool) {
    let mut chars = text.chars().peekable();
    let quote = match chars.next() {
        Some(q @ ('"' | '\'' | '`')) => q,
        Some(_) => return (text.to_string(), true),
        None => return (String::new(), false),
    };

    let mut out = String::with_capacity(text.len());
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            match chars.next() {
                Some(next) if quote == '`' => out.push(next),
                Some(next @ ('"' | '\'' | '\\')) => out.push(next),
                Some(next) => {
                    out.push('\\');
                    out.push(next);
                }
                None => {
                    out.push('\\');
                    return (out, false);
                }
            }
        } else if ch == quote {
            if chars.peek() == Some(&quote) {
                chars.next();
                out.push(quote);
            } else {
                return (out, chars.next().is_none());
            }
        } else {
            out.push(ch);
        }
    }
    (out, false)
}

#[test]
fn test_keywords_keep_their_spelling() {
    let tokens: Vec<_> = scan("stats STATS StAtS").filter(Token::is_significant).collect();
    assert_eq!(tokens.len(), 3);
    for token in &tokens {
        assert!(token.is_keyword(crate::ast::Keyword::Stats));
    }
    assert_eq!(tokens[2].text, "StAtS");
}

#[test]
fn test_pipe() {
    let kinds: Vec<_> = scan("source=logs | head 5")
        .filter(Token::is_significant)
        .map(|t| t.kind)
        .collect();
    assert_eq!(
        kinds,
        vec![
            TokenKind::Keyword(crate::ast::Keyword::Source),
            TokenKind::Equal,
            TokenKind::Identifier,
            TokenKind::Pipe,
            TokenKind::Keyword(crate::ast::Keyword::Head),
            TokenKind::Integer,
        ]
    );
}

#[test]
fn test_trailing_backslash_in_string() {
    let tokens: Vec<_> = scan("'abc\\").collect();
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].kind, TokenKind::SqString);
    assert_eq!(tokens[0].text, "'abc\\");
    assert!(!unquote(tokens[0].text).1);
}

#[test]
fn test_backslash_before_multibyte_char() {
    let input = "'a\\é";
    let tokens: Vec<_> = scan(input).collect();
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].span.end, input.len());
}
