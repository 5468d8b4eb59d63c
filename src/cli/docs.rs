//! Documentation content for the ppl CLI
//!
//! The syntax, command and expression guides are written by hand. The
//! keyword listings are generated from the keyword table, so they always
//! match what the scanner recognizes.

use std::fmt::Write;

use super::CliError;
use crate::ast::{Keyword, KeywordRole};

/// Available documentation categories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocCategory {
    Syntax,
    Pipeline,
    Expressions,
    /// Reserved words of one role
    Keywords(KeywordRole),
}

impl DocCategory {
    /// Parse category name from string
    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "syntax" | "lexical" => Some(Self::Syntax),
            "pipeline" | "pipes" | "query" => Some(Self::Pipeline),
            "expressions" | "expression" | "expr" => Some(Self::Expressions),
            other => KeywordRole::from_name(other).map(Self::Keywords),
        }
    }
}

/// Get the docs overview (category listing)
pub fn get_docs_overview() -> String {
    let mut out = String::from(OVERVIEW_HEAD);
    out.push_str("\nKEYWORD CATEGORIES\n\n");
    for role in KeywordRole::ALL {
        let count = Keyword::ALL.iter().filter(|kw| kw.role() == *role).count();
        let _ = writeln!(
            out,
            "  {:<18}{} ({})",
            role.name(),
            role.description(),
            count
        );
    }
    out.push_str("\nRun 'ppl doc <category>' for detailed documentation.\n");
    out
}

/// Get documentation for a specific category
pub fn get_doc_category(name: &str) -> Result<String, CliError> {
    match DocCategory::from_name(name) {
        Some(DocCategory::Syntax) => Ok(SYNTAX_DOC.to_string()),
        Some(DocCategory::Pipeline) => Ok(PIPELINE_DOC.to_string()),
        Some(DocCategory::Expressions) => Ok(EXPRESSIONS_DOC.to_string()),
        Some(DocCategory::Keywords(role)) => Ok(keyword_doc(role)),
        None => Err(CliError::UnknownCategory(name.to_string())),
    }
}

fn keyword_doc(role: KeywordRole) -> String {
    let mut out = format!(
        "{} - {}\n\n",
        role.name().to_uppercase(),
        role.description()
    );

    let mut keywords: Vec<Keyword> = Keyword::ALL
        .iter()
        .copied()
        .filter(|kw| kw.role() == role)
        .collect();
    keywords.sort_by_key(|kw| kw.as_str());

    for kw in keywords {
        match kw.arity() {
            Some(arity) => {
                let _ = writeln!(out, "  {:<28}{}", kw.lowercase(), arity.describe());
            }
            None => {
                let _ = writeln!(out, "  {}", kw.lowercase());
            }
        }
    }

    if role == KeywordRole::RelevanceFunction {
        out.push_str(RELEVANCE_NOTE);
    }
    out
}

const OVERVIEW_HEAD: &str = r#"PPL DOCUMENTATION

PPL is a piped processing language. A query is a pipeline of commands
separated by `|`; each command consumes the rows produced by the previous
one.

  source=logs | where status >= 500 | stats count() by host

GUIDES

  syntax            Tokens, quoting, identifiers and index patterns
  pipeline          Every command and its clauses
  expressions       Operators, precedence, literals and function calls
"#;

const SYNTAX_DOC: &str = r#"SYNTAX - Tokens and Names

KEYWORDS
  Reserved words are case-insensitive: stats, STATS and StAtS are the same
  command. Outside the command position most keywords also work as field
  names, so `where count > 5` compares the field `count`.

IDENTIFIERS
  Start with a letter, `_` or `@` and continue with letters, digits, `_`,
  `*` or `-`. Index patterns are therefore single names:

    logs-*
    @timestamp
    *access

  Dotted paths name nested fields:  request.headers.host

  Cluster-qualified and date-suffixed names are also single tokens:

    remote:logs
    logs.2024.01.31

QUOTING
  "text"      String literal. \" and \\ are escapes, "" is one quote.
  'text'      String literal. \' and \\ are escapes, '' is one quote.
  `name`      Quoted identifier. \x is x, `` is one backtick.

  Other backslash pairs are kept as written, so regex classes survive:

    parse message '(?<code>\d+)'

NUMBERS
  Integers (200) and decimals (0.5). Signs are operators.
"#;

const PIPELINE_DOC: &str = r#"PIPELINE - Commands

SOURCES
  search source=logs [filter]      Read an index; `search` may be omitted
  search source=a, b status=500    Several sources, then a filter
  describe logs                    Fields of an index
  show datasources                 Configured data sources

FILTERING AND SHAPING
  where <condition>
  fields [+|-] a, b                `-` removes the listed fields
  rename old as new, ...
  eval name = <expr>, ...
  sort [+|-][auto|str|ip|num(]field[)] [desc], ...
  head [N] [from offset]

AGGREGATION
  stats [partitions=N] [allnum=bool] [delim='x']
        agg [as alias], ... [by span(field, 1h) | field, ...]
        [dedup_splitvalues=bool]
  dedup [N] field, ... [keepempty=bool] [consecutive=bool]
  top [N] field, ... [by field, ...]
  rare [N] field, ... [by field, ...]

  `count` without parentheses and `percentile<95>(latency)` are accepted.

EXTRACTION
  parse field '(?<name>regex)'     Named groups become new fields
  grok field '%{IP:client}'        Named captures become new fields
  patterns [new_field='f'] [pattern='[0-9]'] field

MACHINE LEARNING
  kmeans centroids=3 iterations=10 distance_type='EUCLIDEAN'
  ad shingle_size=8 time_field='@timestamp'
  ml action='train' algorithm='rcf'
"#;

const EXPRESSIONS_DOC: &str = r#"EXPRESSIONS - Operators and Calls

PRECEDENCE (loosest first)
  xor
  or
  and           Also implied between adjacent conditions:
                  where a = 1 b = 2    means    where a = 1 and b = 2
  not
  =  !=  <  <=  >  >=  like  regexp  in (...)
                Comparisons do not chain: a < b < c is an error.
  +  -
  *  /  %
  unary - +

LITERALS
  42   3.14   'text'   true   false
  date '2024-01-31'   time '12:00:00'   timestamp '2024-01-31 12:00:00'
  interval 1 day

SPECIAL FORMS
  case(status >= 500, 'error', status >= 400, 'warn' else 'ok')
  cast(latency as double)
  extract(day from @timestamp)
  position('x' in name)

FUNCTION CALLS
  Only known functions may be called; `ppl doc functions` lists them with
  the number of arguments each accepts.
"#;

const RELEVANCE_NOTE: &str = r#"
Relevance functions take the field (or a weighted field list) and the
query text, followed by name=value options:

  match(message, 'timeout', operator='AND')
  multi_match(['title' ^ 2, 'body'], 'disk full', fuzziness='AUTO')

Run 'ppl doc relevance-options' for the option names.
"#;
