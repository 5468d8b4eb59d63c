//! One sub-grammar per pipeline command.

use std::sync::LazyLock;

use regex::Regex;
use tracing::trace;

use super::{PResult, Parser};
use crate::ast::{
    Aggregation, Assignment, Command, DataSource, DedupCommand, DescribeCommand, EvalCommand, Expr,
    FieldRef, FieldsCommand, FunctionCall, FunctionFamily, HeadCommand, Keyword, Literal,
    MlCommand, MlParam, ParseCommand, ParseMethod, RankCommand, Rename, RenameCommand,
    SearchCommand, SortCast, SortCommand, SortDirection, SortKey, SpanClause, StatsCommand,
    Token, TokenKind, WhereCommand, DEFAULT_PATTERNS_FIELD,
};
use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::lexer::unquote;

/// `%{PATTERN:field}` or `%{PATTERN:field:type}` inside a grok expression.
static GROK_CAPTURE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"%\{[A-Za-z0-9_]+(?::([A-Za-z0-9_@.\[\]-]+))?(?::[A-Za-z]+)?\}")
        .expect("grok capture pattern compiles")
});

/// Named groups of a regex the regex engine could not compile, such as one
/// that uses look-around.
static NAMED_GROUP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\(\?P?<([A-Za-z][A-Za-z0-9_]*)>").expect("named group pattern compiles")
});

/// Value type expected by a kmeans or ad parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParamType {
    Integer,
    Number,
    Text,
}

impl ParamType {
    fn of(kw: Keyword) -> Option<ParamType> {
        let ty = match kw {
            Keyword::Centroids
            | Keyword::Iterations
            | Keyword::NumberOfTrees
            | Keyword::ShingleSize
            | Keyword::SampleSize
            | Keyword::OutputAfter
            | Keyword::TrainingDataSize => ParamType::Integer,
            Keyword::TimeDecay | Keyword::AnomalyRate | Keyword::AnomalyScoreThreshold => {
                ParamType::Number
            }
            Keyword::DistanceType
            | Keyword::CategoryField
            | Keyword::TimeField
            | Keyword::TimeZone => ParamType::Text,
            _ => return None,
        };
        Some(ty)
    }

    fn accepts(self, value: &Literal) -> bool {
        match self {
            ParamType::Integer => matches!(value, Literal::Int(_)),
            ParamType::Number => value.is_numeric(),
            ParamType::Text => matches!(value, Literal::Str(_)),
        }
    }

    fn describe(self) -> &'static str {
        match self {
            ParamType::Integer => "an integer",
            ParamType::Number => "a number",
            ParamType::Text => "a string",
        }
    }
}

impl<'a> Parser<'a> {
    // -----------------------------------------------------------------------
    // Sources
    // -----------------------------------------------------------------------

    /// `[SEARCH] source=src [filter]` or `[SEARCH] filter source=src`.
    pub(super) fn parse_search(&mut self, keyword: bool) -> PResult<Command> {
        if keyword {
            self.advance();
        }

        let mut filter = None;
        let sources = if self.at_source_clause() {
            let sources = self.parse_source_clause()?;
            if !self.at_boundary() {
                filter = Some(self.parse_expression()?);
            }
            sources
        } else if self.at_boundary() {
            return Err(self.error_here(
                DiagnosticKind::MissingRequiredClause,
                "search needs a `source=<index>` clause",
            ));
        } else {
            filter = Some(self.parse_expression()?);
            if !self.at_source_clause() {
                return Err(self.error_here(
                    DiagnosticKind::MissingRequiredClause,
                    "search needs a `source=<index>` clause",
                ));
            }
            self.parse_source_clause()?
        };

        Ok(Command::Search(SearchCommand { sources, filter }))
    }

    pub(super) fn at_source_clause(&self) -> bool {
        self.at_option(Keyword::Source) || self.at_option(Keyword::Index)
    }

    fn parse_source_clause(&mut self) -> PResult<Vec<DataSource>> {
        self.advance();
        self.expect(TokenKind::Equal)?;
        self.parse_list(Self::parse_data_source)
    }

    fn parse_data_source(&mut self) -> PResult<DataSource> {
        let Some(token) = self.peek() else {
            return Err(self.err_expected("a source name"));
        };

        match token.kind {
            TokenKind::Cluster | TokenKind::IdDateSuffix if !token.text.starts_with('@') => {
                self.advance();
                let (cluster, name) = match token.text.split_once(':') {
                    Some((cluster, name)) => (Some(cluster.to_string()), name.to_string()),
                    None => (None, token.text.to_string()),
                };
                Ok(DataSource { cluster, name })
            }
            TokenKind::Star => {
                self.advance();
                Ok(DataSource::new("*"))
            }
            TokenKind::DqString | TokenKind::SqString => {
                self.advance();
                Ok(DataSource::new(unquote(token.text).0))
            }
            TokenKind::Dot => {
                // hidden indices such as `.kibana`
                self.advance();
                let rest = self.parse_qualified_name(true)?;
                Ok(DataSource::new(format!(".{}", rest)))
            }
            _ => Ok(DataSource::new(self.parse_qualified_name(true)?)),
        }
    }

    pub(super) fn parse_describe(&mut self) -> PResult<Command> {
        self.advance();
        if self.at_boundary() {
            return Err(self.error_here(
                DiagnosticKind::MissingRequiredClause,
                "describe needs a source name",
            ));
        }
        let source = self.parse_data_source()?;
        Ok(Command::Describe(DescribeCommand { source }))
    }

    pub(super) fn parse_show(&mut self) -> PResult<Command> {
        self.advance();
        self.expect_kw(Keyword::Datasources)?;
        Ok(Command::ShowDatasources)
    }

    // -----------------------------------------------------------------------
    // Filtering and projection
    // -----------------------------------------------------------------------

    pub(super) fn parse_where(&mut self) -> PResult<Command> {
        self.advance();
        if self.at_boundary() {
            return Err(self.error_here(
                DiagnosticKind::MissingRequiredClause,
                "where needs a condition",
            ));
        }
        let condition = self.parse_expression()?;
        Ok(Command::Where(WhereCommand { condition }))
    }

    pub(super) fn parse_fields(&mut self) -> PResult<Command> {
        self.advance();
        let exclude = if self.eat(TokenKind::Minus) {
            true
        } else {
            self.eat(TokenKind::Plus);
            false
        };
        if self.at_boundary() {
            return Err(self.error_here(
                DiagnosticKind::MissingRequiredClause,
                "fields needs at least one field",
            ));
        }
        let fields = self.parse_list(Self::parse_field)?;
        Ok(Command::Fields(FieldsCommand { exclude, fields }))
    }

    pub(super) fn parse_rename(&mut self) -> PResult<Command> {
        self.advance();
        if self.at_boundary() {
            return Err(self.error_here(
                DiagnosticKind::MissingRequiredClause,
                "rename needs `<field> as <new name>`",
            ));
        }
        let renames = self.parse_list(|p| {
            let from = p.parse_field()?;
            p.expect_kw(Keyword::As)?;
            let to = p.parse_field()?;
            Ok(Rename { from, to })
        })?;
        Ok(Command::Rename(RenameCommand { renames }))
    }

    pub(super) fn parse_eval(&mut self) -> PResult<Command> {
        self.advance();
        if self.at_boundary() {
            return Err(self.error_here(
                DiagnosticKind::MissingRequiredClause,
                "eval needs `<field> = <expression>`",
            ));
        }
        let assignments = self.parse_list(|p| {
            let field = p.parse_field()?;
            p.expect(TokenKind::Equal)?;
            let value = p.parse_expression()?;
            Ok(Assignment { field, value })
        })?;
        Ok(Command::Eval(EvalCommand { assignments }))
    }

    // -----------------------------------------------------------------------
    // Aggregation
    // -----------------------------------------------------------------------

    pub(super) fn parse_stats(&mut self) -> PResult<Command> {
        self.advance();
        let mut stats = StatsCommand::default();

        loop {
            if self.at_option(Keyword::Partitions) {
                self.pos += 2;
                stats.partitions = Some(self.parse_integer()?);
            } else if self.at_option(Keyword::Allnum) {
                self.pos += 2;
                stats.all_num = Some(self.parse_bool()?);
            } else if self.at_option(Keyword::Delim) {
                self.pos += 2;
                stats.delim = Some(self.parse_string()?);
            } else {
                break;
            }
        }

        if self.at_boundary() {
            return Err(self.error_here(
                DiagnosticKind::MissingRequiredClause,
                "stats needs at least one aggregation",
            ));
        }
        stats.aggregations = self.parse_list(Self::parse_aggregation)?;

        if self.eat_kw(Keyword::By) {
            if self.check_kw(Keyword::Span) && self.peek_nth_kind(1) == Some(TokenKind::LParen) {
                stats.span = Some(self.parse_span()?);
                if self.eat(TokenKind::Comma) {
                    stats.group_by = self.parse_list(Self::parse_field)?;
                }
            } else {
                stats.group_by = self.parse_list(Self::parse_field)?;
            }
        }

        if self.at_option(Keyword::DedupSplitvalues) {
            self.pos += 2;
            stats.dedup_split_values = Some(self.parse_bool()?);
        }

        Ok(Command::Stats(stats))
    }

    fn parse_aggregation(&mut self) -> PResult<Aggregation> {
        let Some(token) = self.peek() else {
            return Err(self.err_expected("an aggregation"));
        };

        let function = match token.kind {
            TokenKind::Keyword(kw @ (Keyword::Count | Keyword::C))
                if self.peek_nth_kind(1) != Some(TokenKind::LParen) =>
            {
                self.advance();
                Expr::FunctionCall(FunctionCall::new(
                    kw.lowercase(),
                    FunctionFamily::Aggregate,
                    Vec::new(),
                ))
            }
            TokenKind::Keyword(kw) if kw.function_family() == Some(FunctionFamily::Aggregate) => {
                self.parse_function_call(kw)?
            }
            TokenKind::Keyword(kw) if kw.function_family().is_some() => {
                return Err(Diagnostic::at_token(
                    DiagnosticKind::UnexpectedToken,
                    &token,
                    format!("`{}` is not an aggregation", token.text),
                ));
            }
            _ => return Err(self.err_expected("an aggregation")),
        };

        let alias = if self.eat_kw(Keyword::As) {
            Some(self.parse_field()?.name)
        } else {
            None
        };
        Ok(Aggregation { function, alias })
    }

    /// `span(field, value [unit]) [as alias]`
    fn parse_span(&mut self) -> PResult<SpanClause> {
        self.advance();
        self.expect(TokenKind::LParen)?;
        let field = self.parse_field()?;
        self.expect(TokenKind::Comma)?;

        let value = match self.peek() {
            Some(token) if matches!(token.kind, TokenKind::Integer | TokenKind::Decimal) => {
                self.advance();
                self.number_literal(&token)?
            }
            _ => return Err(self.err_expected("a span length")),
        };

        let unit = match self.peek() {
            Some(token) => match token.kind {
                TokenKind::Keyword(kw) if kw.is_span_unit() => {
                    self.advance();
                    Some(kw)
                }
                TokenKind::RParen => None,
                _ => {
                    return Err(Diagnostic::at_token(
                        DiagnosticKind::UnexpectedToken,
                        &token,
                        format!("unknown span unit {}", token.describe()),
                    ));
                }
            },
            None => None,
        };
        self.expect(TokenKind::RParen)?;

        let alias = if self.eat_kw(Keyword::As) {
            Some(self.parse_field()?.name)
        } else {
            None
        };
        Ok(SpanClause {
            field,
            value,
            unit,
            alias,
        })
    }

    pub(super) fn parse_dedup(&mut self) -> PResult<Command> {
        self.advance();
        let mut dedup = DedupCommand::default();

        if self.check(TokenKind::Integer) {
            dedup.count = Some(self.parse_integer()?);
        }
        if self.at_boundary() || self.at_assignment() {
            return Err(self.error_here(
                DiagnosticKind::MissingRequiredClause,
                "dedup needs at least one field",
            ));
        }
        dedup.fields = self.parse_list(Self::parse_field)?;

        while self.at_assignment() {
            if self.at_option(Keyword::Keepempty) {
                self.pos += 2;
                dedup.keep_empty = Some(self.parse_bool()?);
            } else if self.at_option(Keyword::Consecutive) {
                self.pos += 2;
                dedup.consecutive = Some(self.parse_bool()?);
            } else if self.at_option(Keyword::DedupSplitvalues) {
                self.pos += 2;
                dedup.split_values = Some(self.parse_bool()?);
            } else if self.at_option(Keyword::Partitions) {
                self.pos += 2;
                dedup.partitions = Some(self.parse_integer()?);
            } else {
                self.skip_unknown_option("dedup");
            }
        }

        Ok(Command::Dedup(dedup))
    }

    pub(super) fn parse_sort(&mut self) -> PResult<Command> {
        self.advance();
        if self.at_boundary() {
            return Err(self.error_here(
                DiagnosticKind::MissingRequiredClause,
                "sort needs at least one field",
            ));
        }
        let keys = self.parse_list(Self::parse_sort_key)?;
        Ok(Command::Sort(SortCommand { keys }))
    }

    /// `[+|-] [auto|str|ip|num (] field [)] [desc|d]`
    fn parse_sort_key(&mut self) -> PResult<SortKey> {
        let mut direction = if self.eat(TokenKind::Minus) {
            SortDirection::Descending
        } else {
            self.eat(TokenKind::Plus);
            SortDirection::Ascending
        };

        let cast = match self.peek_kind() {
            Some(TokenKind::Keyword(kw)) if self.peek_nth_kind(1) == Some(TokenKind::LParen) => {
                SortCast::from_keyword(kw)
            }
            _ => None,
        };
        let field = if cast.is_some() {
            self.pos += 2;
            let field = self.parse_field()?;
            self.expect(TokenKind::RParen)?;
            field
        } else {
            self.parse_field()?
        };

        if self.eat_kw(Keyword::Desc) || self.eat_kw(Keyword::D) {
            direction = SortDirection::Descending;
        }
        Ok(SortKey {
            field,
            direction,
            cast,
        })
    }

    pub(super) fn parse_head(&mut self) -> PResult<Command> {
        self.advance();
        let mut head = HeadCommand::default();
        if self.check(TokenKind::Integer) {
            head.size = Some(self.parse_integer()?);
        }
        if self.eat_kw(Keyword::From) {
            head.offset = Some(self.parse_integer()?);
        }
        Ok(Command::Head(head))
    }

    /// Body of `top` and `rare`: `[N] fields [by fields]`.
    pub(super) fn parse_rank(&mut self) -> PResult<RankCommand> {
        let keyword = self.advance();
        let mut rank = RankCommand::default();
        if self.check(TokenKind::Integer) {
            rank.count = Some(self.parse_integer()?);
        }
        if self.at_boundary() {
            let name = keyword.map_or("top", |t| t.text);
            return Err(self.error_here(
                DiagnosticKind::MissingRequiredClause,
                format!("{} needs at least one field", name.to_ascii_lowercase()),
            ));
        }
        rank.fields = self.parse_list(Self::parse_field)?;
        if self.eat_kw(Keyword::By) {
            rank.group_by = self.parse_list(Self::parse_field)?;
        }
        Ok(rank)
    }

    // -----------------------------------------------------------------------
    // Text extraction
    // -----------------------------------------------------------------------

    /// `parse field 'regex'`. Named groups become new fields.
    pub(super) fn parse_regex(&mut self) -> PResult<Command> {
        self.advance();
        let source_field = self.parse_field()?;
        let (token, pattern) = self.parse_pattern_string()?;

        let new_fields: Vec<String> = match Regex::new(&pattern) {
            Ok(re) => re.capture_names().flatten().map(str::to_string).collect(),
            Err(e) => {
                trace!(error = %e, "falling back to a scan for named groups");
                self.report(Diagnostic::at_token(
                    DiagnosticKind::InvalidPattern,
                    &token,
                    format!("pattern could not be checked: {}", error_summary(&e)),
                ));
                NAMED_GROUP
                    .captures_iter(&pattern)
                    .map(|c| c[1].to_string())
                    .collect()
            }
        };
        if new_fields.is_empty() {
            self.report(Diagnostic::at_token(
                DiagnosticKind::InvalidPattern,
                &token,
                "pattern has no named groups, so parse adds no fields",
            ));
        }

        Ok(Command::Parse(ParseCommand {
            method: ParseMethod::Regex,
            source_field,
            pattern: Some(pattern),
            new_fields,
        }))
    }

    /// `grok field '%{PATTERN:name} ...'`
    pub(super) fn parse_grok(&mut self) -> PResult<Command> {
        self.advance();
        let source_field = self.parse_field()?;
        let (token, pattern) = self.parse_pattern_string()?;

        let new_fields: Vec<String> = GROK_CAPTURE
            .captures_iter(&pattern)
            .filter_map(|c| c.get(1).map(|m| m.as_str().to_string()))
            .collect();
        if new_fields.is_empty() {
            self.report(Diagnostic::at_token(
                DiagnosticKind::InvalidPattern,
                &token,
                "grok pattern has no `%{PATTERN:field}` captures",
            ));
        }

        Ok(Command::Parse(ParseCommand {
            method: ParseMethod::Grok,
            source_field,
            pattern: Some(pattern),
            new_fields,
        }))
    }

    /// `patterns [new_field='name'] [pattern='regex'] field`
    pub(super) fn parse_patterns(&mut self) -> PResult<Command> {
        self.advance();
        let mut new_field = None;
        let mut pattern = None;

        while self.at_assignment() {
            if self.at_option(Keyword::NewField) {
                self.pos += 2;
                new_field = Some(self.parse_string()?);
            } else if self.at_option(Keyword::Pattern) {
                self.pos += 2;
                let (token, value) = self.parse_pattern_string()?;
                if let Err(e) = Regex::new(&value) {
                    self.report(Diagnostic::at_token(
                        DiagnosticKind::InvalidPattern,
                        &token,
                        format!("pattern could not be checked: {}", error_summary(&e)),
                    ));
                }
                pattern = Some(value);
            } else {
                self.skip_unknown_option("patterns");
            }
        }

        if self.at_boundary() {
            return Err(self.error_here(
                DiagnosticKind::MissingRequiredClause,
                "patterns needs a source field",
            ));
        }
        let source_field = self.parse_field()?;

        Ok(Command::Parse(ParseCommand {
            method: ParseMethod::Patterns,
            source_field,
            pattern,
            new_fields: vec![new_field.unwrap_or_else(|| DEFAULT_PATTERNS_FIELD.to_string())],
        }))
    }

    fn parse_pattern_string(&mut self) -> PResult<(Token<'a>, String)> {
        match self.peek() {
            Some(token) if token.kind.is_string() => {
                self.advance();
                Ok((token, unquote(token.text).0))
            }
            Some(_) => Err(self.err_expected("a quoted pattern")),
            None => Err(self.error_at_end(
                DiagnosticKind::MissingRequiredClause,
                "expected a quoted pattern, found end of input",
            )),
        }
    }

    // -----------------------------------------------------------------------
    // Machine learning
    // -----------------------------------------------------------------------

    /// `name=value` parameters of `kmeans`, `ad` and `ml`.
    ///
    /// kmeans and ad accept only their reserved parameter names, with typed
    /// values. ml passes any name through.
    pub(super) fn parse_ml_params(&mut self, algorithm: Keyword) -> PResult<MlCommand> {
        self.advance();
        let mut command = MlCommand::default();

        while !self.at_boundary() {
            if !self.at_assignment() {
                return Err(self.err_expected("`name=value`"));
            }
            let Some(name) = self.advance() else { break };
            self.advance();
            let value_token = self.peek();
            let value = self.parse_literal_value()?;

            let expected = match (algorithm, name.kind) {
                (Keyword::Ml, _) => None,
                (Keyword::Kmeans, TokenKind::Keyword(kw)) if kw.is_kmeans_option() => ParamType::of(kw),
                (Keyword::Ad, TokenKind::Keyword(kw)) if kw.is_ad_option() => ParamType::of(kw),
                _ => {
                    self.report(Diagnostic::at_token(
                        DiagnosticKind::InvalidOptionName,
                        &name,
                        format!(
                            "`{}` is not a parameter of {}",
                            name.text,
                            algorithm.lowercase()
                        ),
                    ));
                    continue;
                }
            };

            if let (Some(ty), Some(token)) = (expected, value_token) {
                if !ty.accepts(&value) {
                    self.report(Diagnostic::at_token(
                        DiagnosticKind::UnexpectedToken,
                        &token,
                        format!(
                            "`{}` expects {}, found {}",
                            name.text.to_ascii_lowercase(),
                            ty.describe(),
                            value.type_name()
                        ),
                    ));
                    continue;
                }
            }

            command.params.push(MlParam {
                name: name.text.to_ascii_lowercase(),
                value,
            });
        }

        Ok(command)
    }

    // -----------------------------------------------------------------------
    // Shared pieces
    // -----------------------------------------------------------------------

    /// Reports `name=value` with an unsupported name and skips it.
    fn skip_unknown_option(&mut self, command: &str) {
        if let Some(name) = self.advance() {
            self.report(Diagnostic::at_token(
                DiagnosticKind::InvalidOptionName,
                &name,
                format!("`{}` is not an option of {}", name.text, command),
            ));
        }
        self.advance();
        if !self.at_boundary() {
            self.advance();
        }
    }

    pub(super) fn parse_integer(&mut self) -> PResult<i64> {
        match self.peek() {
            Some(token) if token.kind == TokenKind::Integer => {
                self.advance();
                token.text.parse::<i64>().map_err(|_| {
                    Diagnostic::at_token(
                        DiagnosticKind::UnexpectedToken,
                        &token,
                        format!("integer `{}` is out of range", token.text),
                    )
                })
            }
            _ => Err(self.err_expected("an integer")),
        }
    }

    fn parse_bool(&mut self) -> PResult<bool> {
        if self.eat_kw(Keyword::True) {
            Ok(true)
        } else if self.eat_kw(Keyword::False) {
            Ok(false)
        } else {
            Err(self.err_expected("`true` or `false`"))
        }
    }

    fn parse_string(&mut self) -> PResult<String> {
        match self.peek() {
            Some(token) if token.kind.is_string() => {
                self.advance();
                Ok(unquote(token.text).0)
            }
            _ => Err(self.err_expected("a string")),
        }
    }

    /// A field name: identifier, keyword used as a name, backtick-quoted
    /// name, or a dotted path of those.
    pub(super) fn parse_field(&mut self) -> PResult<FieldRef> {
        Ok(FieldRef::new(self.parse_qualified_name(false)?))
    }
}

/// Last line of a regex error, which names the problem.
fn error_summary(error: &regex::Error) -> String {
    let text = error.to_string();
    text.lines()
        .rev()
        .find(|line| !line.trim().is_empty())
        .map(|line| line.trim().trim_start_matches("error: ").to_string())
        .unwrap_or(text)
}
