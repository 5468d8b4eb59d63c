use std::fmt;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::ast::Keyword;

/// Constant value written directly in the query text.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Literal {
    /// Integer literal
    ///
    /// # Example
    /// ```text
    /// 200
    /// ```
    Int(i64),

    /// Exact decimal literal
    ///
    /// # Example
    /// ```text
    /// 0.75
    /// ```
    Decimal(Decimal),

    /// Decoded string literal, from either `"..."` or `'...'`
    Str(String),

    /// `true` or `false`
    Bool(bool),

    /// Typed temporal literal
    ///
    /// # Example
    /// ```text
    /// timestamp '2024-01-01 00:00:00'
    /// ```
    Date { kind: DateKind, value: String },
}

impl Literal {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Literal::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Literal::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Literal::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Literal::Int(_) | Literal::Decimal(_))
    }

    /// Name of the literal's type, used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Literal::Int(_) => "integer",
            Literal::Decimal(_) => "decimal",
            Literal::Str(_) => "string",
            Literal::Bool(_) => "boolean",
            Literal::Date { .. } => "date",
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Int(v) => write!(f, "{}", v),
            Literal::Decimal(d) => write!(f, "{}", d),
            Literal::Str(s) => write_quoted(f, s),
            Literal::Bool(b) => write!(f, "{}", b),
            Literal::Date { kind, value } => {
                write!(f, "{} ", kind)?;
                write_quoted(f, value)
            }
        }
    }
}

/// Writes `s` as a single-quoted string that decodes back to `s`.
pub(crate) fn write_quoted(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    f.write_str("'")?;
    for ch in s.chars() {
        match ch {
            '\'' => f.write_str("\\'")?,
            '\\' => f.write_str("\\\\")?,
            c => write!(f, "{}", c)?,
        }
    }
    f.write_str("'")
}

/// Keyword that introduces a temporal literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DateKind {
    Date,
    Time,
    Timestamp,
}

impl DateKind {
    pub fn from_keyword(kw: Keyword) -> Option<DateKind> {
        match kw {
            Keyword::Date => Some(DateKind::Date),
            Keyword::Time => Some(DateKind::Time),
            Keyword::Timestamp => Some(DateKind::Timestamp),
            _ => None,
        }
    }
}

impl fmt::Display for DateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DateKind::Date => "date",
            DateKind::Time => "time",
            DateKind::Timestamp => "timestamp",
        })
    }
}

/// Target type of `cast(expr as type)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    Int,
    Integer,
    Long,
    Float,
    Double,
    String,
    Boolean,
    Date,
    Time,
    Timestamp,
}

impl DataType {
    pub fn from_keyword(kw: Keyword) -> Option<DataType> {
        let ty = match kw {
            Keyword::Int => DataType::Int,
            Keyword::Integer => DataType::Integer,
            Keyword::Long => DataType::Long,
            Keyword::Float => DataType::Float,
            Keyword::Double => DataType::Double,
            Keyword::String => DataType::String,
            Keyword::Boolean => DataType::Boolean,
            Keyword::Date => DataType::Date,
            Keyword::Time => DataType::Time,
            Keyword::Timestamp => DataType::Timestamp,
            _ => return None,
        };
        Some(ty)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DataType::Int => "int",
            DataType::Integer => "integer",
            DataType::Long => "long",
            DataType::Float => "float",
            DataType::Double => "double",
            DataType::String => "string",
            DataType::Boolean => "boolean",
            DataType::Date => "date",
            DataType::Time => "time",
            DataType::Timestamp => "timestamp",
        })
    }
}
