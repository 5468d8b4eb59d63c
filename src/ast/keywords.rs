//! Reserved words of the language.
//!
//! Every keyword is matched case-insensitively, so `stats`, `STATS` and
//! `StAtS` all resolve to [`Keyword::Stats`]. The table is a compile-time
//! `phf` map and is never mutated.
//!
//! Keywords are grouped by the role they play in the grammar. The role drives
//! the function family of a call, the unit lists accepted by `span()` and
//! `interval`, and the categories printed by `ppl docs`.

use std::fmt;

use serde::{Serialize, Serializer};

/// Longest word worth looking up. Anything longer cannot be a keyword.
const MAX_KEYWORD_LEN: usize = 48;

/// Grammatical role of a reserved word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum KeywordRole {
    Command,
    Clause,
    Operator,
    Literal,
    CommandOption,
    MlOption,
    IntervalUnit,
    SpanUnit,
    DataType,
    AggregateFunction,
    ScalarFunction,
    RelevanceFunction,
    RelevanceOption,
}

impl KeywordRole {
    pub const ALL: &'static [KeywordRole] = &[
        KeywordRole::Command,
        KeywordRole::Clause,
        KeywordRole::Operator,
        KeywordRole::Literal,
        KeywordRole::CommandOption,
        KeywordRole::MlOption,
        KeywordRole::IntervalUnit,
        KeywordRole::SpanUnit,
        KeywordRole::DataType,
        KeywordRole::AggregateFunction,
        KeywordRole::ScalarFunction,
        KeywordRole::RelevanceFunction,
        KeywordRole::RelevanceOption,
    ];

    /// Short name, also the category argument of `ppl doc`.
    pub fn name(self) -> &'static str {
        match self {
            KeywordRole::Command => "commands",
            KeywordRole::Clause => "clauses",
            KeywordRole::Operator => "operators",
            KeywordRole::Literal => "literals",
            KeywordRole::CommandOption => "options",
            KeywordRole::MlOption => "ml-options",
            KeywordRole::IntervalUnit => "interval-units",
            KeywordRole::SpanUnit => "span-units",
            KeywordRole::DataType => "types",
            KeywordRole::AggregateFunction => "aggregations",
            KeywordRole::ScalarFunction => "functions",
            KeywordRole::RelevanceFunction => "relevance",
            KeywordRole::RelevanceOption => "relevance-options",
        }
    }

    pub fn from_name(name: &str) -> Option<KeywordRole> {
        KeywordRole::ALL
            .iter()
            .copied()
            .find(|role| role.name().eq_ignore_ascii_case(name))
    }

    pub fn description(self) -> &'static str {
        match self {
            KeywordRole::Command => "Pipeline commands, one per `|` stage",
            KeywordRole::Clause => "Words that introduce a clause inside a command",
            KeywordRole::Operator => "Boolean and membership operators",
            KeywordRole::Literal => "Boolean literals",
            KeywordRole::CommandOption => "name=value options of dedup, stats and patterns",
            KeywordRole::MlOption => "name=value options of kmeans and ad",
            KeywordRole::IntervalUnit => "Compound units accepted after `interval <expr>`",
            KeywordRole::SpanUnit => "Short units accepted by `span(field, value unit)`",
            KeywordRole::DataType => "Target types of `cast(expr as type)`",
            KeywordRole::AggregateFunction => "Aggregations usable in stats",
            KeywordRole::ScalarFunction => "Math, date, string and conditional functions",
            KeywordRole::RelevanceFunction => "Full-text relevance functions",
            KeywordRole::RelevanceOption => "Named options of the relevance functions",
        }
    }
}

impl fmt::Display for KeywordRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Function family of a call, derived from the keyword role of its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FunctionFamily {
    Aggregate,
    Scalar,
    Relevance,
}

/// Number of positional arguments a function accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Arity {
    pub min: usize,
    /// `None` means unbounded.
    pub max: Option<usize>,
}

impl Arity {
    pub const fn exactly(n: usize) -> Self {
        Arity { min: n, max: Some(n) }
    }

    pub const fn range(min: usize, max: usize) -> Self {
        Arity { min, max: Some(max) }
    }

    pub const fn at_least(min: usize) -> Self {
        Arity { min, max: None }
    }

    pub fn accepts(&self, count: usize) -> bool {
        count >= self.min && self.max.is_none_or(|max| count <= max)
    }

    /// `1 argument`, `2 to 3 arguments`, `at least 1 argument`.
    pub fn describe(&self) -> String {
        let last = self.max.unwrap_or(self.min);
        format!("{} argument{}", self, if last == 1 { "" } else { "s" })
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max {
            Some(max) if max == self.min => write!(f, "{}", self.min),
            Some(max) => write!(f, "{} to {}", self.min, max),
            None => write!(f, "at least {}", self.min),
        }
    }
}

macro_rules! keywords {
    ($($role:ident { $($variant:ident => $text:tt,)* })*) => {
        /// A reserved word.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum Keyword {
            $($($variant,)*)*
        }

        impl Keyword {
            /// Every keyword, grouped by role in table order.
            pub const ALL: &'static [Keyword] = &[$($(Keyword::$variant,)*)*];

            /// Canonical upper-case spelling.
            pub fn as_str(self) -> &'static str {
                match self {
                    $($(Keyword::$variant => $text,)*)*
                }
            }

            pub fn role(self) -> KeywordRole {
                match self {
                    $($(Keyword::$variant => KeywordRole::$role,)*)*
                }
            }
        }

        static KEYWORDS: phf::Map<&'static str, Keyword> = phf::phf_map! {
            $($($text => Keyword::$variant,)*)*
        };
    };
}

keywords! {
    Command {
        Search => "SEARCH",
        Describe => "DESCRIBE",
        Show => "SHOW",
        Where => "WHERE",
        Fields => "FIELDS",
        Rename => "RENAME",
        Stats => "STATS",
        Dedup => "DEDUP",
        Sort => "SORT",
        Eval => "EVAL",
        Head => "HEAD",
        Top => "TOP",
        Rare => "RARE",
        Parse => "PARSE",
        Grok => "GROK",
        Patterns => "PATTERNS",
        Kmeans => "KMEANS",
        Ad => "AD",
        Ml => "ML",
    }
    Clause {
        From => "FROM",
        As => "AS",
        By => "BY",
        Source => "SOURCE",
        Index => "INDEX",
        D => "D",
        Desc => "DESC",
        Datasources => "DATASOURCES",
        Sortby => "SORTBY",
        Auto => "AUTO",
        Str => "STR",
        Ip => "IP",
        Num => "NUM",
        Case => "CASE",
        Interval => "INTERVAL",
        Span => "SPAN",
        To => "TO",
        Datamodel => "DATAMODEL",
        Lookup => "LOOKUP",
        Savedsearch => "SAVEDSEARCH",
    }
    Operator {
        In => "IN",
        Not => "NOT",
        Or => "OR",
        And => "AND",
        Xor => "XOR",
        Regexp => "REGEXP",
    }
    Literal {
        True => "TRUE",
        False => "FALSE",
    }
    CommandOption {
        Keepempty => "KEEPEMPTY",
        Consecutive => "CONSECUTIVE",
        DedupSplitvalues => "DEDUP_SPLITVALUES",
        Partitions => "PARTITIONS",
        Allnum => "ALLNUM",
        Delim => "DELIM",
        Method => "METHOD",
        Regex => "REGEX",
        Punct => "PUNCT",
        Pattern => "PATTERN",
        NewField => "NEW_FIELD",
    }
    MlOption {
        Centroids => "CENTROIDS",
        Iterations => "ITERATIONS",
        DistanceType => "DISTANCE_TYPE",
        NumberOfTrees => "NUMBER_OF_TREES",
        ShingleSize => "SHINGLE_SIZE",
        SampleSize => "SAMPLE_SIZE",
        OutputAfter => "OUTPUT_AFTER",
        TimeDecay => "TIME_DECAY",
        AnomalyRate => "ANOMALY_RATE",
        CategoryField => "CATEGORY_FIELD",
        TimeField => "TIME_FIELD",
        TimeZone => "TIME_ZONE",
        TrainingDataSize => "TRAINING_DATA_SIZE",
        AnomalyScoreThreshold => "ANOMALY_SCORE_THRESHOLD",
    }
    IntervalUnit {
        DayHour => "DAY_HOUR",
        DayMicrosecond => "DAY_MICROSECOND",
        DayMinute => "DAY_MINUTE",
        DaySecond => "DAY_SECOND",
        HourMicrosecond => "HOUR_MICROSECOND",
        HourMinute => "HOUR_MINUTE",
        HourSecond => "HOUR_SECOND",
        Millisecond => "MILLISECOND",
        MinuteMicrosecond => "MINUTE_MICROSECOND",
        MinuteSecond => "MINUTE_SECOND",
        SecondMicrosecond => "SECOND_MICROSECOND",
        YearMonth => "YEAR_MONTH",
    }
    SpanUnit {
        Ms => "MS",
        S => "S",
        M => "M",
        H => "H",
        W => "W",
        Q => "Q",
        Y => "Y",
    }
    DataType {
        Int => "INT",
        Integer => "INTEGER",
        Double => "DOUBLE",
        Long => "LONG",
        Float => "FLOAT",
        String => "STRING",
        Boolean => "BOOLEAN",
    }
    AggregateFunction {
        Avg => "AVG",
        Count => "COUNT",
        DistinctCount => "DISTINCT_COUNT",
        Estdc => "ESTDC",
        EstdcError => "ESTDC_ERROR",
        Max => "MAX",
        Mean => "MEAN",
        Median => "MEDIAN",
        Min => "MIN",
        Mode => "MODE",
        Range => "RANGE",
        Stdev => "STDEV",
        Stdevp => "STDEVP",
        Sum => "SUM",
        Sumsq => "SUMSQ",
        VarSamp => "VAR_SAMP",
        VarPop => "VAR_POP",
        StddevSamp => "STDDEV_SAMP",
        StddevPop => "STDDEV_POP",
        Percentile => "PERCENTILE",
        Take => "TAKE",
        First => "FIRST",
        Last => "LAST",
        List => "LIST",
        Values => "VALUES",
        Earliest => "EARLIEST",
        EarliestTime => "EARLIEST_TIME",
        Latest => "LATEST",
        LatestTime => "LATEST_TIME",
        PerDay => "PER_DAY",
        PerHour => "PER_HOUR",
        PerMinute => "PER_MINUTE",
        PerSecond => "PER_SECOND",
        Rate => "RATE",
        Sparkline => "SPARKLINE",
        C => "C",
        Dc => "DC",
    }
    ScalarFunction {
        Abs => "ABS",
        Cbrt => "CBRT",
        Ceil => "CEIL",
        Ceiling => "CEILING",
        Conv => "CONV",
        Crc32 => "CRC32",
        E => "E",
        Exp => "EXP",
        Floor => "FLOOR",
        Ln => "LN",
        Log => "LOG",
        Log10 => "LOG10",
        Log2 => "LOG2",
        Mod => "MOD",
        Pi => "PI",
        Position => "POSITION",
        Pow => "POW",
        Power => "POWER",
        Rand => "RAND",
        Round => "ROUND",
        Sign => "SIGN",
        Sqrt => "SQRT",
        Truncate => "TRUNCATE",
        Acos => "ACOS",
        Asin => "ASIN",
        Atan => "ATAN",
        Atan2 => "ATAN2",
        Cos => "COS",
        Cot => "COT",
        Degrees => "DEGREES",
        Radians => "RADIANS",
        Sin => "SIN",
        Tan => "TAN",
        ConvertTz => "CONVERT_TZ",
        Datetime => "DATETIME",
        Day => "DAY",
        DayOfYear => "DAY_OF_YEAR",
        Hour => "HOUR",
        HourOfDay => "HOUR_OF_DAY",
        Microsecond => "MICROSECOND",
        Minute => "MINUTE",
        MinuteOfDay => "MINUTE_OF_DAY",
        MinuteOfHour => "MINUTE_OF_HOUR",
        Month => "MONTH",
        MonthOfYear => "MONTH_OF_YEAR",
        Quarter => "QUARTER",
        Second => "SECOND",
        SecondOfMinute => "SECOND_OF_MINUTE",
        Week => "WEEK",
        WeekOfYear => "WEEK_OF_YEAR",
        Year => "YEAR",
        Adddate => "ADDDATE",
        Addtime => "ADDTIME",
        Curdate => "CURDATE",
        CurrentDate => "CURRENT_DATE",
        CurrentTime => "CURRENT_TIME",
        CurrentTimestamp => "CURRENT_TIMESTAMP",
        Curtime => "CURTIME",
        Date => "DATE",
        Datediff => "DATEDIFF",
        DateAdd => "DATE_ADD",
        DateFormat => "DATE_FORMAT",
        DateSub => "DATE_SUB",
        Dayname => "DAYNAME",
        Dayofmonth => "DAYOFMONTH",
        Dayofweek => "DAYOFWEEK",
        Dayofyear => "DAYOFYEAR",
        DayOfMonth => "DAY_OF_MONTH",
        DayOfWeek => "DAY_OF_WEEK",
        Extract => "EXTRACT",
        FromDays => "FROM_DAYS",
        FromUnixtime => "FROM_UNIXTIME",
        GetFormat => "GET_FORMAT",
        LastDay => "LAST_DAY",
        Localtime => "LOCALTIME",
        Localtimestamp => "LOCALTIMESTAMP",
        Makedate => "MAKEDATE",
        Maketime => "MAKETIME",
        Monthname => "MONTHNAME",
        Now => "NOW",
        PeriodAdd => "PERIOD_ADD",
        PeriodDiff => "PERIOD_DIFF",
        SecToTime => "SEC_TO_TIME",
        StrToDate => "STR_TO_DATE",
        Subdate => "SUBDATE",
        Subtime => "SUBTIME",
        Sysdate => "SYSDATE",
        Time => "TIME",
        Timediff => "TIMEDIFF",
        Timestamp => "TIMESTAMP",
        Timestampadd => "TIMESTAMPADD",
        Timestampdiff => "TIMESTAMPDIFF",
        TimeFormat => "TIME_FORMAT",
        TimeToSec => "TIME_TO_SEC",
        ToDays => "TO_DAYS",
        ToSeconds => "TO_SECONDS",
        UnixTimestamp => "UNIX_TIMESTAMP",
        UtcDate => "UTC_DATE",
        UtcTime => "UTC_TIME",
        UtcTimestamp => "UTC_TIMESTAMP",
        Weekday => "WEEKDAY",
        Yearweek => "YEARWEEK",
        Substr => "SUBSTR",
        Substring => "SUBSTRING",
        Ltrim => "LTRIM",
        Rtrim => "RTRIM",
        Trim => "TRIM",
        Lower => "LOWER",
        Upper => "UPPER",
        Concat => "CONCAT",
        ConcatWs => "CONCAT_WS",
        Length => "LENGTH",
        Strcmp => "STRCMP",
        Right => "RIGHT",
        Left => "LEFT",
        Ascii => "ASCII",
        Locate => "LOCATE",
        Replace => "REPLACE",
        Reverse => "REVERSE",
        Cast => "CAST",
        Like => "LIKE",
        Isnull => "ISNULL",
        Isnotnull => "ISNOTNULL",
        Ifnull => "IFNULL",
        Nullif => "NULLIF",
        If => "IF",
        Typeof => "TYPEOF",
    }
    RelevanceFunction {
        Match => "MATCH",
        MatchPhrase => "MATCH_PHRASE",
        MatchPhrasePrefix => "MATCH_PHRASE_PREFIX",
        MatchBoolPrefix => "MATCH_BOOL_PREFIX",
        SimpleQueryString => "SIMPLE_QUERY_STRING",
        MultiMatch => "MULTI_MATCH",
        QueryString => "QUERY_STRING",
    }
    RelevanceOption {
        AllowLeadingWildcard => "ALLOW_LEADING_WILDCARD",
        AnalyzeWildcard => "ANALYZE_WILDCARD",
        Analyzer => "ANALYZER",
        AutoGenerateSynonymsPhraseQuery => "AUTO_GENERATE_SYNONYMS_PHRASE_QUERY",
        Boost => "BOOST",
        CutoffFrequency => "CUTOFF_FREQUENCY",
        DefaultField => "DEFAULT_FIELD",
        DefaultOperator => "DEFAULT_OPERATOR",
        EnablePositionIncrements => "ENABLE_POSITION_INCREMENTS",
        Escape => "ESCAPE",
        Flags => "FLAGS",
        FuzzyMaxExpansions => "FUZZY_MAX_EXPANSIONS",
        FuzzyPrefixLength => "FUZZY_PREFIX_LENGTH",
        FuzzyTranspositions => "FUZZY_TRANSPOSITIONS",
        FuzzyRewrite => "FUZZY_REWRITE",
        Fuzziness => "FUZZINESS",
        Lenient => "LENIENT",
        LowFreqOperator => "LOW_FREQ_OPERATOR",
        MaxDeterminizedStates => "MAX_DETERMINIZED_STATES",
        MaxExpansions => "MAX_EXPANSIONS",
        MinimumShouldMatch => "MINIMUM_SHOULD_MATCH",
        Operator => "OPERATOR",
        PhraseSlop => "PHRASE_SLOP",
        PrefixLength => "PREFIX_LENGTH",
        QuoteAnalyzer => "QUOTE_ANALYZER",
        QuoteFieldSuffix => "QUOTE_FIELD_SUFFIX",
        Rewrite => "REWRITE",
        Slop => "SLOP",
        TieBreaker => "TIE_BREAKER",
        Type => "TYPE",
        ZeroTermsQuery => "ZERO_TERMS_QUERY",
    }
}

/// Case-insensitive keyword lookup. Never allocates.
///
/// Folding happens on a stack copy, so the scanned text is never rewritten
/// and a token keeps the spelling it was written with.
///
/// ```
/// use ppl_lang::ast::keywords::{lookup, Keyword};
///
/// assert_eq!(lookup("StAtS"), Some(Keyword::Stats));
/// assert_eq!(lookup("hostname"), None);
/// ```
pub fn lookup(word: &str) -> Option<Keyword> {
    let bytes = word.as_bytes();
    if bytes.is_empty() || bytes.len() > MAX_KEYWORD_LEN {
        return None;
    }
    let mut buf = [0u8; MAX_KEYWORD_LEN];
    let upper = &mut buf[..bytes.len()];
    upper.copy_from_slice(bytes);
    upper.make_ascii_uppercase();
    let key = std::str::from_utf8(upper).ok()?;
    KEYWORDS.get(key).copied()
}

impl Keyword {
    /// Lower-case spelling, used by canonical rendering and function names.
    pub fn lowercase(self) -> String {
        self.as_str().to_ascii_lowercase()
    }

    pub fn is_command(self) -> bool {
        self.role() == KeywordRole::Command
    }

    /// Whether the word may stand for a field name outside of command
    /// position. Operators that glue expressions together never can.
    pub fn can_name_field(self) -> bool {
        !matches!(
            self,
            Keyword::And
                | Keyword::Or
                | Keyword::Xor
                | Keyword::Not
                | Keyword::In
                | Keyword::Regexp
                | Keyword::As
                | Keyword::By
                | Keyword::True
                | Keyword::False
        )
    }

    pub fn function_family(self) -> Option<FunctionFamily> {
        match self.role() {
            KeywordRole::AggregateFunction => Some(FunctionFamily::Aggregate),
            KeywordRole::ScalarFunction => Some(FunctionFamily::Scalar),
            KeywordRole::RelevanceFunction => Some(FunctionFamily::Relevance),
            _ => None,
        }
    }

    /// Relevance functions whose first argument is a `[field ^ weight, ...]` list.
    pub fn is_multi_field_relevance(self) -> bool {
        matches!(
            self,
            Keyword::MultiMatch | Keyword::SimpleQueryString | Keyword::QueryString
        )
    }

    pub fn is_relevance_option(self) -> bool {
        self.role() == KeywordRole::RelevanceOption || self == Keyword::TimeZone
    }

    /// Units accepted after `interval <expr>`.
    pub fn is_interval_unit(self) -> bool {
        self.role() == KeywordRole::IntervalUnit
            || matches!(
                self,
                Keyword::Microsecond
                    | Keyword::Second
                    | Keyword::Minute
                    | Keyword::Hour
                    | Keyword::Day
                    | Keyword::Week
                    | Keyword::Month
                    | Keyword::Quarter
                    | Keyword::Year
            )
    }

    /// Units accepted by the `span(field, value unit)` group-by clause.
    pub fn is_span_unit(self) -> bool {
        self.role() == KeywordRole::SpanUnit
            || matches!(
                self,
                Keyword::D
                    | Keyword::Millisecond
                    | Keyword::Second
                    | Keyword::Minute
                    | Keyword::Hour
                    | Keyword::Day
                    | Keyword::Week
                    | Keyword::Month
                    | Keyword::Quarter
                    | Keyword::Year
            )
    }

    /// Target types of `cast`.
    pub fn is_data_type(self) -> bool {
        self.role() == KeywordRole::DataType
            || matches!(self, Keyword::Date | Keyword::Time | Keyword::Timestamp)
    }

    /// Type hints of a sort key, as in `sort num(size)`.
    pub fn is_sort_cast(self) -> bool {
        matches!(
            self,
            Keyword::Auto | Keyword::Str | Keyword::Ip | Keyword::Num
        )
    }

    pub fn is_kmeans_option(self) -> bool {
        matches!(
            self,
            Keyword::Centroids | Keyword::Iterations | Keyword::DistanceType
        )
    }

    pub fn is_ad_option(self) -> bool {
        self.role() == KeywordRole::MlOption && !self.is_kmeans_option()
    }

    /// Positional argument count of a function keyword.
    ///
    /// Returns `None` for keywords that are not functions and for `CAST`,
    /// which has its own grammar.
    pub fn arity(self) -> Option<Arity> {
        use Keyword as K;

        let arity = match self {
            // Aggregations
            K::Count | K::C => Arity::range(0, 1),
            K::Percentile => Arity::exactly(2),
            K::Take | K::Sparkline => Arity::range(1, 2),
            K::Avg
            | K::DistinctCount
            | K::Dc
            | K::Estdc
            | K::EstdcError
            | K::Max
            | K::Mean
            | K::Median
            | K::Min
            | K::Mode
            | K::Range
            | K::Stdev
            | K::Stdevp
            | K::Sum
            | K::Sumsq
            | K::VarSamp
            | K::VarPop
            | K::StddevSamp
            | K::StddevPop
            | K::First
            | K::Last
            | K::List
            | K::Values
            | K::Earliest
            | K::EarliestTime
            | K::Latest
            | K::LatestTime
            | K::PerDay
            | K::PerHour
            | K::PerMinute
            | K::PerSecond
            | K::Rate => Arity::exactly(1),

            // Math and trigonometry
            K::E | K::Pi => Arity::exactly(0),
            K::Rand => Arity::range(0, 1),
            K::Log | K::Round | K::Atan => Arity::range(1, 2),
            K::Mod | K::Pow | K::Power | K::Truncate | K::Atan2 => Arity::exactly(2),
            K::Conv => Arity::exactly(3),
            K::Abs
            | K::Cbrt
            | K::Ceil
            | K::Ceiling
            | K::Crc32
            | K::Exp
            | K::Floor
            | K::Ln
            | K::Log10
            | K::Log2
            | K::Sign
            | K::Sqrt
            | K::Acos
            | K::Asin
            | K::Cos
            | K::Cot
            | K::Degrees
            | K::Radians
            | K::Sin
            | K::Tan => Arity::exactly(1),

            // Date and time
            K::Now
            | K::Curdate
            | K::CurrentDate
            | K::CurrentTime
            | K::CurrentTimestamp
            | K::Curtime
            | K::Localtime
            | K::Localtimestamp
            | K::UtcDate
            | K::UtcTime
            | K::UtcTimestamp => Arity::exactly(0),
            K::Sysdate | K::UnixTimestamp => Arity::range(0, 1),
            K::Datetime
            | K::Timestamp
            | K::Week
            | K::WeekOfYear
            | K::Yearweek
            | K::FromUnixtime => Arity::range(1, 2),
            K::Date
            | K::Day
            | K::DayOfYear
            | K::Dayofyear
            | K::DayOfMonth
            | K::Dayofmonth
            | K::DayOfWeek
            | K::Dayofweek
            | K::Dayname
            | K::Hour
            | K::HourOfDay
            | K::Microsecond
            | K::Minute
            | K::MinuteOfDay
            | K::MinuteOfHour
            | K::Month
            | K::MonthOfYear
            | K::Monthname
            | K::Quarter
            | K::Second
            | K::SecondOfMinute
            | K::Time
            | K::ToDays
            | K::ToSeconds
            | K::FromDays
            | K::LastDay
            | K::SecToTime
            | K::TimeToSec
            | K::Weekday
            | K::Year => Arity::exactly(1),
            K::Adddate
            | K::Addtime
            | K::Subdate
            | K::Subtime
            | K::DateAdd
            | K::DateSub
            | K::Datediff
            | K::Timediff
            | K::DateFormat
            | K::TimeFormat
            | K::StrToDate
            | K::Makedate
            | K::PeriodAdd
            | K::PeriodDiff
            | K::GetFormat
            | K::Extract
            | K::Position => Arity::exactly(2),
            K::ConvertTz | K::Maketime | K::Timestampadd | K::Timestampdiff => Arity::exactly(3),

            // Strings
            K::Substr | K::Substring | K::Locate => Arity::range(2, 3),
            K::Concat => Arity::at_least(1),
            K::ConcatWs => Arity::at_least(2),
            K::Strcmp | K::Right | K::Left => Arity::exactly(2),
            K::Replace => Arity::exactly(3),
            K::Ltrim
            | K::Rtrim
            | K::Trim
            | K::Lower
            | K::Upper
            | K::Length
            | K::Ascii
            | K::Reverse => Arity::exactly(1),

            // Conditionals
            K::Isnull | K::Isnotnull | K::Typeof => Arity::exactly(1),
            K::Ifnull | K::Nullif | K::Like => Arity::exactly(2),
            K::If => Arity::exactly(3),

            // Relevance: field (or field list) and query text
            K::Match
            | K::MatchPhrase
            | K::MatchPhrasePrefix
            | K::MatchBoolPrefix
            | K::SimpleQueryString
            | K::MultiMatch
            | K::QueryString => Arity::exactly(2),

            _ => return None,
        };
        Some(arity)
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Keyword {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_case_insensitive() {
        for word in ["stats", "STATS", "StAtS"] {
            assert_eq!(lookup(word), Some(Keyword::Stats), "{}", word);
        }
    }

    #[test]
    fn every_keyword_round_trips() {
        for &kw in Keyword::ALL {
            assert_eq!(lookup(kw.as_str()), Some(kw));
            assert_eq!(lookup(&kw.lowercase()), Some(kw));
        }
    }

    #[test]
    fn spellings_are_plain_words() {
        for &kw in Keyword::ALL {
            let text = kw.as_str();
            assert!(text.len() <= MAX_KEYWORD_LEN);
            assert!(
                text.bytes()
                    .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit() || b == b'_'),
                "{}",
                text
            );
        }
    }

    #[test]
    fn unknown_and_oversized_words_miss() {
        assert_eq!(lookup(""), None);
        assert_eq!(lookup("host"), None);
        assert_eq!(lookup("status_code"), None);
        assert_eq!(lookup(&"A".repeat(MAX_KEYWORD_LEN + 1)), None);
        assert_eq!(lookup("stäts"), None);
    }

    #[test]
    fn every_function_has_an_arity() {
        for &kw in Keyword::ALL {
            if kw.function_family().is_some() && kw != Keyword::Cast {
                assert!(kw.arity().is_some(), "{} has no arity", kw);
            }
        }
        assert_eq!(Keyword::Cast.arity(), None);
        assert_eq!(Keyword::Where.arity(), None);
    }

    #[test]
    fn arity_bounds() {
        let count = Keyword::Count.arity().unwrap();
        assert!(count.accepts(0) && count.accepts(1) && !count.accepts(2));

        let concat = Keyword::Concat.arity().unwrap();
        assert!(!concat.accepts(0) && concat.accepts(7));
        assert_eq!(concat.to_string(), "at least 1");
        assert_eq!(Keyword::Substring.arity().unwrap().to_string(), "2 to 3");
    }

    #[test]
    fn unit_sets() {
        assert!(Keyword::Ms.is_span_unit());
        assert!(Keyword::D.is_span_unit());
        assert!(Keyword::Day.is_span_unit());
        assert!(!Keyword::DayHour.is_span_unit());
        assert!(Keyword::DayHour.is_interval_unit());
        assert!(Keyword::Minute.is_interval_unit());
        assert!(!Keyword::Ms.is_interval_unit());
    }

    #[test]
    fn option_sets_do_not_overlap() {
        for &kw in Keyword::ALL {
            assert!(!(kw.is_kmeans_option() && kw.is_ad_option()), "{}", kw);
        }
        assert!(Keyword::TimeZone.is_ad_option());
        assert!(Keyword::TimeZone.is_relevance_option());
    }

    #[test]
    fn role_names_resolve() {
        for &role in KeywordRole::ALL {
            assert_eq!(KeywordRole::from_name(role.name()), Some(role));
        }
        assert_eq!(KeywordRole::from_name("nope"), None);
    }
}
