//! Expression grammar shared by every command.
//!
//! One method per precedence level, loosest first:
//! xor, or, and (explicit or implicit), not, comparison, additive,
//! multiplicative, unary sign, primary.

use std::str::FromStr;

use rust_decimal::Decimal;

use super::{MAX_NESTING, PResult, Parser};
use crate::ast::{
    BinOp, CaseBranch, DataType, DateKind, Expr, FunctionCall, FunctionFamily, Keyword, Literal,
    NamedOption, Token, TokenKind, UnaryOp, WeightedField,
};
use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::lexer::unquote;

impl<'a> Parser<'a> {
    pub fn parse_expression(&mut self) -> PResult<Expr> {
        self.parse_xor()
    }

    fn parse_xor(&mut self) -> PResult<Expr> {
        let mut left = self.parse_or()?;
        while self.eat_kw(Keyword::Xor) {
            let right = self.parse_or()?;
            left = Expr::binary(BinOp::Xor, left, right);
        }
        Ok(left)
    }

    fn parse_or(&mut self) -> PResult<Expr> {
        let mut left = self.parse_and()?;
        while self.eat_kw(Keyword::Or) {
            let right = self.parse_and()?;
            left = Expr::binary(BinOp::Or, left, right);
        }
        Ok(left)
    }

    /// `a and b`, or `a b` where two conditions sit side by side.
    fn parse_and(&mut self) -> PResult<Expr> {
        let mut left = self.parse_not()?;
        loop {
            if self.eat_kw(Keyword::And) || self.starts_implicit_operand() {
                let right = self.parse_not()?;
                left = Expr::binary(BinOp::And, left, right);
            } else {
                return Ok(left);
            }
        }
    }

    /// Whether the current token can start the right side of an implicit
    /// `and`. Clause keywords and the start of a `source=` clause cannot.
    fn starts_implicit_operand(&self) -> bool {
        let Some(token) = self.peek() else {
            return false;
        };
        let next = self.peek_nth_kind(1);
        match token.kind {
            TokenKind::Identifier => !token.text.eq_ignore_ascii_case("else"),
            TokenKind::Integer
            | TokenKind::Decimal
            | TokenKind::DqString
            | TokenKind::SqString
            | TokenKind::BqString
            | TokenKind::IdDateSuffix
            | TokenKind::LParen => true,
            TokenKind::Keyword(kw) => match kw {
                Keyword::And
                | Keyword::Or
                | Keyword::Xor
                | Keyword::In
                | Keyword::Regexp
                | Keyword::As
                | Keyword::By
                | Keyword::From => false,
                Keyword::Like => next == Some(TokenKind::LParen),
                Keyword::Source | Keyword::Index => next != Some(TokenKind::Equal),
                _ => true,
            },
            _ => false,
        }
    }

    fn parse_not(&mut self) -> PResult<Expr> {
        if self.eat_kw(Keyword::Not) {
            let operand = self.nested(Self::parse_not)?;
            return Ok(Expr::unary(UnaryOp::Not, operand));
        }
        self.parse_comparison()
    }

    fn comparison_op(&self) -> Option<BinOp> {
        let op = match self.peek_kind()? {
            TokenKind::Equal => BinOp::Equal,
            TokenKind::NotEqual => BinOp::NotEqual,
            TokenKind::Less => BinOp::Less,
            TokenKind::LessEqual => BinOp::LessEqual,
            TokenKind::Greater => BinOp::Greater,
            TokenKind::GreaterEqual => BinOp::GreaterEqual,
            TokenKind::Keyword(Keyword::Regexp) => BinOp::Regexp,
            TokenKind::Keyword(Keyword::Like)
                if self.peek_nth_kind(1) != Some(TokenKind::LParen) =>
            {
                BinOp::Like
            }
            _ => return None,
        };
        Some(op)
    }

    fn at_comparison(&self) -> bool {
        self.comparison_op().is_some() || self.check_kw(Keyword::In)
    }

    /// Non-chaining: `a < b < c` is an error.
    fn parse_comparison(&mut self) -> PResult<Expr> {
        let left = self.parse_additive()?;

        let expr = if self.eat_kw(Keyword::In) {
            let list = self.parse_value_list()?;
            Expr::In {
                expr: Box::new(left),
                list,
            }
        } else if let Some(op) = self.comparison_op() {
            self.advance();
            let right = self.parse_additive()?;
            Expr::binary(op, left, right)
        } else {
            return Ok(left);
        };

        if self.at_comparison() {
            return Err(self.error_here(
                DiagnosticKind::UnexpectedToken,
                "comparisons cannot be chained; combine them with `and`",
            ));
        }
        Ok(expr)
    }

    fn parse_value_list(&mut self) -> PResult<Vec<Expr>> {
        self.expect(TokenKind::LParen)?;
        let mut list = vec![self.parse_expression()?];
        while self.eat(TokenKind::Comma) {
            list.push(self.parse_expression()?);
        }
        self.expect(TokenKind::RParen)?;
        Ok(list)
    }

    fn parse_additive(&mut self) -> PResult<Expr> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = match self.peek_kind() {
                Some(TokenKind::Plus) => BinOp::Add,
                Some(TokenKind::Minus) => BinOp::Subtract,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.parse_multiplicative()?;
            left = Expr::binary(op, left, right);
        }
    }

    fn parse_multiplicative(&mut self) -> PResult<Expr> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek_kind() {
                Some(TokenKind::Star) => BinOp::Multiply,
                Some(TokenKind::Slash) => BinOp::Divide,
                Some(TokenKind::Percent) => BinOp::Modulo,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.parse_unary()?;
            left = Expr::binary(op, left, right);
        }
    }

    /// Every operand passes through here, so the nesting guard sees
    /// parentheses, calls and intervals as well as prefix signs.
    fn parse_unary(&mut self) -> PResult<Expr> {
        self.nested(|p| {
            if p.eat(TokenKind::Minus) {
                return Ok(Expr::unary(UnaryOp::Negate, p.parse_unary()?));
            }
            if p.eat(TokenKind::Plus) {
                return Ok(Expr::unary(UnaryOp::Plus, p.parse_unary()?));
            }
            p.parse_primary()
        })
    }

    /// Runs `f` one level deeper, failing once `MAX_NESTING` is reached.
    fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> PResult<T>) -> PResult<T> {
        if self.depth >= MAX_NESTING {
            return Err(self.error_here(DiagnosticKind::UnexpectedToken, "expression nested too deeply"));
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    /// Literals, field references, calls and parenthesized expressions.
    fn parse_primary(&mut self) -> PResult<Expr> {
        let Some(token) = self.peek() else {
            return Err(self.err_expected("an expression"));
        };
        let next = self.peek_nth_kind(1);

        match token.kind {
            TokenKind::Integer | TokenKind::Decimal => {
                self.advance();
                Ok(Expr::literal(self.number_literal(&token)?))
            }
            TokenKind::DqString | TokenKind::SqString => {
                self.advance();
                Ok(Expr::string(unquote(token.text).0))
            }
            TokenKind::LParen => {
                self.advance();
                let expr = self.parse_expression()?;
                self.expect(TokenKind::RParen)?;
                Ok(expr)
            }
            TokenKind::Keyword(Keyword::True) => {
                self.advance();
                Ok(Expr::literal(Literal::Bool(true)))
            }
            TokenKind::Keyword(Keyword::False) => {
                self.advance();
                Ok(Expr::literal(Literal::Bool(false)))
            }
            TokenKind::Keyword(kw)
                if DateKind::from_keyword(kw).is_some()
                    && next.is_some_and(TokenKind::is_string) =>
            {
                self.advance();
                let value = self.advance().map(|t| unquote(t.text).0).unwrap_or_default();
                let kind = DateKind::from_keyword(kw).unwrap_or(DateKind::Date);
                Ok(Expr::literal(Literal::Date { kind, value }))
            }
            TokenKind::Keyword(Keyword::Interval) if next.is_some_and(starts_interval_value) => {
                self.parse_interval()
            }
            TokenKind::Keyword(Keyword::Case) if next == Some(TokenKind::LParen) => {
                self.parse_case()
            }
            TokenKind::Keyword(Keyword::Cast) if next == Some(TokenKind::LParen) => {
                self.parse_cast()
            }
            TokenKind::Keyword(Keyword::Percentile) if next == Some(TokenKind::Less) => {
                self.parse_function_call(Keyword::Percentile)
            }
            TokenKind::Keyword(kw)
                if kw.function_family().is_some() && next == Some(TokenKind::LParen) =>
            {
                self.parse_function_call(kw)
            }
            TokenKind::Identifier if next == Some(TokenKind::LParen) => Err(Diagnostic::at_token(
                DiagnosticKind::UnexpectedToken,
                &token,
                format!("unknown function `{}`", token.text),
            )),
            TokenKind::Keyword(kw) if kw.can_name_field() => Ok(Expr::Field(self.parse_field()?)),
            TokenKind::Identifier | TokenKind::BqString | TokenKind::IdDateSuffix => {
                Ok(Expr::Field(self.parse_field()?))
            }
            _ => Err(self.err_expected("an expression")),
        }
    }

    // -----------------------------------------------------------------------
    // Names and literals
    // -----------------------------------------------------------------------

    fn name_part(token: &Token<'_>, allow_any_keyword: bool) -> Option<String> {
        match token.kind {
            TokenKind::Identifier | TokenKind::IdDateSuffix => Some(token.text.to_string()),
            TokenKind::BqString => Some(unquote(token.text).0),
            TokenKind::Keyword(kw) if allow_any_keyword || kw.can_name_field() => {
                Some(token.text.to_string())
            }
            _ => None,
        }
    }

    /// Dotted name. Source names also accept every keyword as their first
    /// part; later parts always do.
    pub(super) fn parse_qualified_name(&mut self, source: bool) -> PResult<String> {
        let what = if source { "a source name" } else { "a field name" };
        let Some(first) = self.peek().and_then(|t| Self::name_part(&t, source)) else {
            return Err(self.err_expected(what));
        };
        self.advance();

        let mut name = first;
        while self.check(TokenKind::Dot) {
            let Some(part) = self
                .tokens
                .get(self.pos + 1)
                .and_then(|t| Self::name_part(t, true))
            else {
                break;
            };
            self.pos += 2;
            name.push('.');
            name.push_str(&part);
        }
        Ok(name)
    }

    /// Integer or decimal literal of a number token. Integers too large for
    /// 64 bits fall back to an exact decimal.
    pub(super) fn number_literal(&self, token: &Token<'_>) -> PResult<Literal> {
        if token.kind == TokenKind::Integer {
            if let Ok(v) = token.text.parse::<i64>() {
                return Ok(Literal::Int(v));
            }
        }
        Decimal::from_str(token.text)
            .map(Literal::Decimal)
            .map_err(|_| {
                Diagnostic::at_token(
                    DiagnosticKind::UnexpectedToken,
                    token,
                    format!("number `{}` is out of range", token.text),
                )
            })
    }

    /// A constant: optionally signed number, string, `true` or `false`.
    pub(super) fn parse_literal_value(&mut self) -> PResult<Literal> {
        let negative = self.check(TokenKind::Minus)
            && matches!(
                self.peek_nth_kind(1),
                Some(TokenKind::Integer | TokenKind::Decimal)
            );
        if negative {
            self.advance();
        }

        let Some(token) = self.peek() else {
            return Err(self.err_expected("a literal value"));
        };
        let literal = match token.kind {
            TokenKind::Integer | TokenKind::Decimal => self.number_literal(&token)?,
            TokenKind::DqString | TokenKind::SqString => Literal::Str(unquote(token.text).0),
            TokenKind::Keyword(Keyword::True) => Literal::Bool(true),
            TokenKind::Keyword(Keyword::False) => Literal::Bool(false),
            _ => return Err(self.err_expected("a literal value")),
        };
        self.advance();

        Ok(match literal {
            Literal::Int(v) if negative => Literal::Int(-v),
            Literal::Decimal(d) if negative => Literal::Decimal(-d),
            other => other,
        })
    }

    // -----------------------------------------------------------------------
    // Special forms
    // -----------------------------------------------------------------------

    /// `interval <value> <unit>`. The value binds like an additive
    /// expression so the unit is not read as a second condition.
    fn parse_interval(&mut self) -> PResult<Expr> {
        self.advance();
        let value = self.parse_additive()?;
        match self.peek() {
            Some(token) => match token.kind {
                TokenKind::Keyword(unit) if unit.is_interval_unit() => {
                    self.advance();
                    Ok(Expr::Interval {
                        value: Box::new(value),
                        unit,
                    })
                }
                _ => Err(self.err_expected("an interval unit")),
            },
            None => Err(self.err_expected("an interval unit")),
        }
    }

    /// `case(cond, value, ... [else default])`
    fn parse_case(&mut self) -> PResult<Expr> {
        self.advance();
        self.expect(TokenKind::LParen)?;

        let mut branches = Vec::new();
        let mut default = None;
        loop {
            let condition = self.parse_expression()?;
            self.expect(TokenKind::Comma)?;
            let value = self.parse_expression()?;
            branches.push(CaseBranch { condition, value });

            if self.eat(TokenKind::Comma) {
                continue;
            }
            if self
                .peek()
                .is_some_and(|t| t.kind == TokenKind::Identifier && t.text.eq_ignore_ascii_case("else"))
            {
                self.advance();
                default = Some(Box::new(self.parse_expression()?));
            }
            break;
        }

        self.expect(TokenKind::RParen)?;
        Ok(Expr::Case { branches, default })
    }

    /// `cast(expr as type)`
    fn parse_cast(&mut self) -> PResult<Expr> {
        self.advance();
        self.expect(TokenKind::LParen)?;
        let expr = self.parse_expression()?;
        self.expect_kw(Keyword::As)?;

        let to = match self.peek_kind() {
            Some(TokenKind::Keyword(kw)) => DataType::from_keyword(kw),
            _ => None,
        };
        let Some(to) = to else {
            return Err(self.err_expected("a type name"));
        };
        self.advance();
        self.expect(TokenKind::RParen)?;

        Ok(Expr::Cast {
            expr: Box::new(expr),
            to,
        })
    }

    // -----------------------------------------------------------------------
    // Function calls
    // -----------------------------------------------------------------------

    /// `name(args)`, with the special argument forms of `percentile<N>`,
    /// `extract` and `position`, and named options for relevance functions.
    pub(super) fn parse_function_call(&mut self, kw: Keyword) -> PResult<Expr> {
        let Some(name_token) = self.advance() else {
            return Err(self.err_expected("a function name"));
        };
        let Some(family) = kw.function_family() else {
            return Err(Diagnostic::at_token(
                DiagnosticKind::UnexpectedToken,
                &name_token,
                format!("`{}` is not a function", name_token.text),
            ));
        };

        let mut options = Vec::new();
        let args = if kw == Keyword::Percentile && self.eat(TokenKind::Less) {
            // percentile<95>(latency) is percentile(latency, 95)
            let rank = match self.peek() {
                Some(t) if matches!(t.kind, TokenKind::Integer | TokenKind::Decimal) => {
                    self.advance();
                    self.number_literal(&t)?
                }
                _ => return Err(self.err_expected("a percentile rank")),
            };
            self.expect(TokenKind::Greater)?;
            self.expect(TokenKind::LParen)?;
            let field = self.parse_expression()?;
            vec![field, Expr::literal(rank)]
        } else {
            self.expect(TokenKind::LParen)?;
            match kw {
                Keyword::Extract if self.at_extract_unit() => {
                    let unit = self.advance().map(|t| t.text.to_ascii_lowercase());
                    self.expect_kw(Keyword::From)?;
                    let value = self.parse_expression()?;
                    vec![Expr::string(unit.unwrap_or_default()), value]
                }
                Keyword::Position => self.parse_position_args()?,
                _ if family == FunctionFamily::Relevance => {
                    let (args, named) = self.parse_relevance_args(kw)?;
                    options = named;
                    args
                }
                _ => self.parse_arguments()?,
            }
        };
        self.expect(TokenKind::RParen)?;

        if let Some(arity) = kw.arity() {
            if !arity.accepts(args.len()) {
                self.report(Diagnostic::at_token(
                    DiagnosticKind::ArityMismatch,
                    &name_token,
                    format!(
                        "`{}` takes {}, found {}",
                        kw.lowercase(),
                        arity.describe(),
                        args.len()
                    ),
                ));
            }
        }

        Ok(Expr::FunctionCall(FunctionCall {
            name: kw.lowercase(),
            family,
            args,
            options,
        }))
    }

    fn at_extract_unit(&self) -> bool {
        matches!(self.peek_kind(), Some(TokenKind::Keyword(kw)) if kw.is_interval_unit())
            && self.peek_nth_kind(1) == Some(TokenKind::Keyword(Keyword::From))
    }

    /// Comma-separated arguments up to, not including, `)`.
    fn parse_arguments(&mut self) -> PResult<Vec<Expr>> {
        let mut args = Vec::new();
        if self.check(TokenKind::RParen) {
            return Ok(args);
        }
        loop {
            args.push(self.parse_expression()?);
            if !self.eat(TokenKind::Comma) {
                return Ok(args);
            }
        }
    }

    /// `position(sub in text)`, or the plain two-argument form.
    fn parse_position_args(&mut self) -> PResult<Vec<Expr>> {
        let needle = self.parse_additive()?;
        if self.eat_kw(Keyword::In) {
            let haystack = self.parse_expression()?;
            return Ok(vec![needle, haystack]);
        }
        let mut args = vec![needle];
        while self.eat(TokenKind::Comma) {
            args.push(self.parse_expression()?);
        }
        Ok(args)
    }

    /// Positional arguments followed by `name=value` options.
    ///
    /// Options may only start once the required positionals are present,
    /// so `match(field = 'x')` is still an ordinary comparison argument.
    fn parse_relevance_args(&mut self, kw: Keyword) -> PResult<(Vec<Expr>, Vec<NamedOption>)> {
        let required = kw.arity().map_or(2, |a| a.min);
        let mut args = Vec::new();
        let mut options = Vec::new();
        let mut seen_option = false;

        if self.check(TokenKind::RParen) {
            return Ok((args, options));
        }
        loop {
            if args.len() >= required && self.at_assignment() {
                seen_option = true;
                if let Some(option) = self.parse_named_option(kw)? {
                    options.push(option);
                }
            } else if seen_option {
                return Err(self.err_expected("a `name=value` option"));
            } else if args.is_empty() && kw.is_multi_field_relevance() && self.check(TokenKind::LBracket) {
                args.push(self.parse_weighted_fields()?);
            } else {
                args.push(self.parse_expression()?);
            }

            if !self.eat(TokenKind::Comma) {
                return Ok((args, options));
            }
        }
    }

    /// One `name=value` option. Unknown names are reported and dropped.
    fn parse_named_option(&mut self, function: Keyword) -> PResult<Option<NamedOption>> {
        let Some(name) = self.advance() else {
            return Err(self.err_expected("an option name"));
        };
        self.expect(TokenKind::Equal)?;

        let value = match self.peek_kind() {
            Some(TokenKind::Identifier) => {
                Literal::Str(self.parse_qualified_name(true)?)
            }
            Some(TokenKind::Keyword(kw)) if kw != Keyword::True && kw != Keyword::False => {
                Literal::Str(self.parse_qualified_name(true)?)
            }
            _ => self.parse_literal_value()?,
        };

        match name.kind {
            TokenKind::Keyword(kw) if kw.is_relevance_option() => Ok(Some(NamedOption {
                name: kw.lowercase(),
                value,
            })),
            _ => {
                self.report(Diagnostic::at_token(
                    DiagnosticKind::InvalidOptionName,
                    &name,
                    format!(
                        "`{}` is not an option of `{}`",
                        name.text,
                        function.lowercase()
                    ),
                ));
                Ok(None)
            }
        }
    }

    /// `[field ^ weight, ...]`
    fn parse_weighted_fields(&mut self) -> PResult<Expr> {
        self.expect(TokenKind::LBracket)?;
        let mut fields = Vec::new();
        loop {
            let field = match self.peek() {
                Some(t) if t.kind.is_string() => {
                    self.advance();
                    unquote(t.text).0
                }
                _ => self.parse_qualified_name(false)?,
            };

            let weight = if self.eat(TokenKind::Caret) {
                match self.parse_literal_value()? {
                    Literal::Int(v) => Some(Decimal::from(v)),
                    Literal::Decimal(d) => Some(d),
                    other => {
                        return Err(self.error_here(
                            DiagnosticKind::UnexpectedToken,
                            format!("field weight must be a number, found {}", other.type_name()),
                        ));
                    }
                }
            } else {
                None
            };
            fields.push(WeightedField { field, weight });

            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RBracket)?;
        Ok(Expr::WeightedFields { fields })
    }
}

fn starts_interval_value(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Integer
            | TokenKind::Decimal
            | TokenKind::DqString
            | TokenKind::SqString
            | TokenKind::LParen
            | TokenKind::Minus
            | TokenKind::Identifier
    )
}
