use std::fmt;

use serde::Serialize;

use crate::ast::expressions::write_name;
use crate::ast::literals::write_quoted;
use crate::ast::{Expr, FieldRef, Keyword, Literal};

/// One stage of the pipeline.
///
/// Each variant owns only the fields its command can carry.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    /// Reads from one or more sources, optionally filtered
    ///
    /// # Examples
    /// ```text
    /// search source=logs status=500
    /// source=remote:logs-2024.*, metrics
    /// ```
    Search(SearchCommand),

    /// Lists the fields of a source
    ///
    /// # Examples
    /// ```text
    /// describe logs
    /// ```
    Describe(DescribeCommand),

    /// Lists configured data sources
    ShowDatasources,

    /// Keeps rows matching a condition
    ///
    /// # Examples
    /// ```text
    /// where status >= 500 and host != 'test'
    /// ```
    Where(WhereCommand),

    /// Keeps (or with `-`, drops) fields
    ///
    /// # Examples
    /// ```text
    /// fields host, status
    /// fields - password
    /// ```
    Fields(FieldsCommand),

    /// Renames fields
    ///
    /// # Examples
    /// ```text
    /// rename src_ip as source, dst_ip as dest
    /// ```
    Rename(RenameCommand),

    /// Aggregates, optionally grouped
    ///
    /// # Examples
    /// ```text
    /// stats count() as c, avg(latency) by span(@timestamp, 1h), host
    /// ```
    Stats(StatsCommand),

    /// Removes duplicate rows
    ///
    /// # Examples
    /// ```text
    /// dedup 2 host keepempty=true consecutive=false
    /// ```
    Dedup(DedupCommand),

    /// Orders rows
    ///
    /// # Examples
    /// ```text
    /// sort -latency, num(code)
    /// ```
    Sort(SortCommand),

    /// Computes new fields
    ///
    /// # Examples
    /// ```text
    /// eval kb = bytes / 1024, slow = latency > 1000
    /// ```
    Eval(EvalCommand),

    /// Keeps the first rows
    ///
    /// # Examples
    /// ```text
    /// head 10 from 20
    /// ```
    Head(HeadCommand),

    /// Most frequent values
    ///
    /// # Examples
    /// ```text
    /// top 5 url by host
    /// ```
    Top(RankCommand),

    /// Least frequent values
    Rare(RankCommand),

    /// Extracts new fields from a text field with regex, grok or patterns
    ///
    /// # Examples
    /// ```text
    /// parse email '.+@(?<domain>.+)'
    /// grok message '%{IP:client} %{WORD:verb}'
    /// patterns new_field='shape' message
    /// ```
    Parse(ParseCommand),

    /// k-means clustering
    ///
    /// # Examples
    /// ```text
    /// kmeans centroids=3 iterations=10 distance_type='COSINE'
    /// ```
    Kmeans(MlCommand),

    /// Anomaly detection
    Ad(MlCommand),

    /// Generic machine-learning call with free-form parameters
    Ml(MlCommand),
}

impl Command {
    /// Lower-case command keyword, as written at the start of the stage.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Search(_) => "search",
            Command::Describe(_) => "describe",
            Command::ShowDatasources => "show datasources",
            Command::Where(_) => "where",
            Command::Fields(_) => "fields",
            Command::Rename(_) => "rename",
            Command::Stats(_) => "stats",
            Command::Dedup(_) => "dedup",
            Command::Sort(_) => "sort",
            Command::Eval(_) => "eval",
            Command::Head(_) => "head",
            Command::Top(_) => "top",
            Command::Rare(_) => "rare",
            Command::Parse(cmd) => cmd.method.name(),
            Command::Kmeans(_) => "kmeans",
            Command::Ad(_) => "ad",
            Command::Ml(_) => "ml",
        }
    }

    /// Whether the command reads data rather than transforming it.
    pub fn is_source(&self) -> bool {
        matches!(
            self,
            Command::Search(_) | Command::Describe(_) | Command::ShowDatasources
        )
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Search(cmd) => write!(f, "{}", cmd),
            Command::Describe(cmd) => write!(f, "describe {}", cmd.source),
            Command::ShowDatasources => f.write_str("show datasources"),
            Command::Where(cmd) => write!(f, "where {}", cmd.condition),
            Command::Fields(cmd) => write!(f, "{}", cmd),
            Command::Rename(cmd) => write!(f, "{}", cmd),
            Command::Stats(cmd) => write!(f, "{}", cmd),
            Command::Dedup(cmd) => write!(f, "{}", cmd),
            Command::Sort(cmd) => write!(f, "{}", cmd),
            Command::Eval(cmd) => write!(f, "{}", cmd),
            Command::Head(cmd) => write!(f, "{}", cmd),
            Command::Top(cmd) | Command::Rare(cmd) => {
                f.write_str(self.name())?;
                write!(f, "{}", cmd)
            }
            Command::Parse(cmd) => write!(f, "{}", cmd),
            Command::Kmeans(cmd) | Command::Ad(cmd) | Command::Ml(cmd) => {
                f.write_str(self.name())?;
                write!(f, "{}", cmd)
            }
        }
    }
}

fn write_fields(f: &mut fmt::Formatter<'_>, fields: &[FieldRef]) -> fmt::Result {
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", field)?;
    }
    Ok(())
}

/// A source named by `source=`, `index=`, or `describe`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DataSource {
    /// Remote cluster of `cluster:index`
    pub cluster: Option<String>,
    /// Index name or pattern, dotted parts joined with `.`
    pub name: String,
}

impl DataSource {
    pub fn new(name: impl Into<String>) -> Self {
        DataSource {
            cluster: None,
            name: name.into(),
        }
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(cluster) = &self.cluster {
            write!(f, "{}:", cluster)?;
        }
        if is_plain_source(&self.name) {
            f.write_str(&self.name)
        } else {
            write_name(f, &self.name)
        }
    }
}

/// Index patterns such as `logs-*` or `metrics.2024.*` print unquoted.
fn is_plain_source(name: &str) -> bool {
    let mut bytes = name.bytes();
    matches!(bytes.next(), Some(b) if b.is_ascii_alphabetic() || b == b'_')
        && bytes.all(|b| b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-' | b'*' | b'.'))
        && !name.contains("..")
        && !name.ends_with('.')
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchCommand {
    pub sources: Vec<DataSource>,
    pub filter: Option<Expr>,
}

impl fmt::Display for SearchCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("search source=")?;
        for (i, source) in self.sources.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", source)?;
        }
        if let Some(filter) = &self.filter {
            write!(f, " {}", filter)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DescribeCommand {
    pub source: DataSource,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WhereCommand {
    pub condition: Expr,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldsCommand {
    /// `fields - a, b` drops the listed fields instead of keeping them
    pub exclude: bool,
    pub fields: Vec<FieldRef>,
}

impl fmt::Display for FieldsCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(if self.exclude { "fields - " } else { "fields " })?;
        write_fields(f, &self.fields)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rename {
    pub from: FieldRef,
    pub to: FieldRef,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenameCommand {
    pub renames: Vec<Rename>,
}

impl fmt::Display for RenameCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("rename ")?;
        for (i, rename) in self.renames.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{} as {}", rename.from, rename.to)?;
        }
        Ok(())
    }
}

/// Aggregation term of `stats`, such as `avg(latency) as avg_latency`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Aggregation {
    pub function: Expr,
    pub alias: Option<String>,
}

impl fmt::Display for Aggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.function)?;
        if let Some(alias) = &self.alias {
            f.write_str(" as ")?;
            write_name(f, alias)?;
        }
        Ok(())
    }
}

/// `span(field, value unit)` bucket of a `stats ... by` clause.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpanClause {
    pub field: FieldRef,
    pub value: Literal,
    pub unit: Option<Keyword>,
    pub alias: Option<String>,
}

impl fmt::Display for SpanClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "span({}, {}", self.field, self.value)?;
        if let Some(unit) = self.unit {
            f.write_str(&unit.lowercase())?;
        }
        f.write_str(")")?;
        if let Some(alias) = &self.alias {
            f.write_str(" as ")?;
            write_name(f, alias)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct StatsCommand {
    pub partitions: Option<i64>,
    pub all_num: Option<bool>,
    pub delim: Option<String>,
    pub aggregations: Vec<Aggregation>,
    pub span: Option<SpanClause>,
    pub group_by: Vec<FieldRef>,
    pub dedup_split_values: Option<bool>,
}

impl fmt::Display for StatsCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("stats")?;
        if let Some(partitions) = self.partitions {
            write!(f, " partitions={}", partitions)?;
        }
        if let Some(all_num) = self.all_num {
            write!(f, " allnum={}", all_num)?;
        }
        if let Some(delim) = &self.delim {
            f.write_str(" delim=")?;
            write_quoted(f, delim)?;
        }
        for (i, agg) in self.aggregations.iter().enumerate() {
            f.write_str(if i == 0 { " " } else { ", " })?;
            write!(f, "{}", agg)?;
        }
        if self.span.is_some() || !self.group_by.is_empty() {
            f.write_str(" by ")?;
            if let Some(span) = &self.span {
                write!(f, "{}", span)?;
                if !self.group_by.is_empty() {
                    f.write_str(", ")?;
                }
            }
            write_fields(f, &self.group_by)?;
        }
        if let Some(split) = self.dedup_split_values {
            write!(f, " dedup_splitvalues={}", split)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct DedupCommand {
    /// Number of duplicates to keep
    pub count: Option<i64>,
    pub fields: Vec<FieldRef>,
    pub keep_empty: Option<bool>,
    pub consecutive: Option<bool>,
    pub split_values: Option<bool>,
    pub partitions: Option<i64>,
}

impl fmt::Display for DedupCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("dedup ")?;
        if let Some(count) = self.count {
            write!(f, "{} ", count)?;
        }
        write_fields(f, &self.fields)?;
        if let Some(partitions) = self.partitions {
            write!(f, " partitions={}", partitions)?;
        }
        if let Some(keep_empty) = self.keep_empty {
            write!(f, " keepempty={}", keep_empty)?;
        }
        if let Some(consecutive) = self.consecutive {
            write!(f, " consecutive={}", consecutive)?;
        }
        if let Some(split) = self.split_values {
            write!(f, " dedup_splitvalues={}", split)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

/// Comparison hint of a sort key, written `num(field)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortCast {
    Auto,
    Str,
    Ip,
    Num,
}

impl SortCast {
    pub fn from_keyword(kw: Keyword) -> Option<SortCast> {
        match kw {
            Keyword::Auto => Some(SortCast::Auto),
            Keyword::Str => Some(SortCast::Str),
            Keyword::Ip => Some(SortCast::Ip),
            Keyword::Num => Some(SortCast::Num),
            _ => None,
        }
    }

    fn name(self) -> &'static str {
        match self {
            SortCast::Auto => "auto",
            SortCast::Str => "str",
            SortCast::Ip => "ip",
            SortCast::Num => "num",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SortKey {
    pub field: FieldRef,
    pub direction: SortDirection,
    pub cast: Option<SortCast>,
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.direction == SortDirection::Descending {
            f.write_str("-")?;
        }
        match self.cast {
            Some(cast) => write!(f, "{}({})", cast.name(), self.field),
            None => write!(f, "{}", self.field),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SortCommand {
    pub keys: Vec<SortKey>,
}

impl fmt::Display for SortCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("sort ")?;
        for (i, key) in self.keys.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", key)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assignment {
    pub field: FieldRef,
    pub value: Expr,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvalCommand {
    pub assignments: Vec<Assignment>,
}

impl fmt::Display for EvalCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("eval ")?;
        for (i, assignment) in self.assignments.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{} = {}", assignment.field, assignment.value)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct HeadCommand {
    pub size: Option<i64>,
    pub offset: Option<i64>,
}

impl fmt::Display for HeadCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("head")?;
        if let Some(size) = self.size {
            write!(f, " {}", size)?;
        }
        if let Some(offset) = self.offset {
            write!(f, " from {}", offset)?;
        }
        Ok(())
    }
}

/// Body shared by `top` and `rare`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct RankCommand {
    pub count: Option<i64>,
    pub fields: Vec<FieldRef>,
    pub group_by: Vec<FieldRef>,
}

impl fmt::Display for RankCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(count) = self.count {
            write!(f, " {}", count)?;
        }
        f.write_str(" ")?;
        write_fields(f, &self.fields)?;
        if !self.group_by.is_empty() {
            f.write_str(" by ")?;
            write_fields(f, &self.group_by)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseMethod {
    Regex,
    Grok,
    Patterns,
}

impl ParseMethod {
    pub fn name(self) -> &'static str {
        match self {
            ParseMethod::Regex => "parse",
            ParseMethod::Grok => "grok",
            ParseMethod::Patterns => "patterns",
        }
    }
}

/// Field name `patterns` writes to when `new_field` is not given.
pub const DEFAULT_PATTERNS_FIELD: &str = "patterns_field";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParseCommand {
    pub method: ParseMethod,
    pub source_field: FieldRef,
    /// Regex or grok pattern. For `patterns`, the optional character class
    /// to strip.
    pub pattern: Option<String>,
    /// Fields the command produces
    pub new_fields: Vec<String>,
}

impl fmt::Display for ParseCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.method.name())?;
        if self.method == ParseMethod::Patterns {
            if let Some(new_field) = self.new_fields.first() {
                f.write_str(" new_field=")?;
                write_quoted(f, new_field)?;
            }
            if let Some(pattern) = &self.pattern {
                f.write_str(" pattern=")?;
                write_quoted(f, pattern)?;
            }
            return write!(f, " {}", self.source_field);
        }
        write!(f, " {}", self.source_field)?;
        if let Some(pattern) = &self.pattern {
            f.write_str(" ")?;
            write_quoted(f, pattern)?;
        }
        Ok(())
    }
}

/// `name=value` parameter of `kmeans`, `ad` or `ml`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MlParam {
    /// Lower-case parameter name
    pub name: String,
    pub value: Literal,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct MlCommand {
    pub params: Vec<MlParam>,
}

impl MlCommand {
    pub fn param(&self, name: &str) -> Option<&Literal> {
        self.params
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
            .map(|p| &p.value)
    }
}

impl fmt::Display for MlCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for param in &self.params {
            write!(f, " {}={}", param.name, param.value)?;
        }
        Ok(())
    }
}
