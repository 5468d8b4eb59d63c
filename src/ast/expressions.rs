use std::fmt;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::ast::keywords::{self, FunctionFamily};
use crate::ast::literals::write_quoted;
use crate::ast::{BinOp, DataType, Keyword, Literal, UnaryOp};

/// Abstract Syntax Tree node representing a parsed expression.
///
/// Expressions appear in `where`, `eval`, search filters, stats aggregations
/// and function arguments. They are built once by the parser and never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Expr {
    /// Constant value
    ///
    /// # Examples
    /// ```text
    /// 200
    /// 'GET'
    /// date '2024-01-01'
    /// ```
    Literal { value: Literal },

    /// Field reference
    ///
    /// # Examples
    /// ```text
    /// status
    /// request.headers.host
    /// `field with spaces`
    /// ```
    Field(FieldRef),

    /// Function call, with the family resolved from the function name
    ///
    /// # Examples
    /// ```text
    /// avg(latency)
    /// substring(host, 1, 3)
    /// match(message, 'timeout', operator='AND')
    /// ```
    FunctionCall(FunctionCall),

    /// Binary operation
    ///
    /// # Examples
    /// ```text
    /// a + b * 2
    /// status >= 500 or level = 'error'
    /// ```
    BinaryOp {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// Prefix operation
    ///
    /// # Examples
    /// ```text
    /// not isnull(host)
    /// -offset
    /// ```
    UnaryOp { op: UnaryOp, operand: Box<Expr> },

    /// Membership test
    ///
    /// # Examples
    /// ```text
    /// status in (200, 201, 204)
    /// ```
    In { expr: Box<Expr>, list: Vec<Expr> },

    /// Conditional with an optional fallback
    ///
    /// # Examples
    /// ```text
    /// case(status >= 500, 'server', status >= 400, 'client' else 'ok')
    /// ```
    Case {
        branches: Vec<CaseBranch>,
        default: Option<Box<Expr>>,
    },

    /// Type conversion
    ///
    /// # Examples
    /// ```text
    /// cast(bytes as long)
    /// ```
    Cast { expr: Box<Expr>, to: DataType },

    /// Time interval
    ///
    /// # Examples
    /// ```text
    /// interval 1 day
    /// ```
    Interval { value: Box<Expr>, unit: Keyword },

    /// Field list of a multi-field relevance function
    ///
    /// # Examples
    /// ```text
    /// ['title' ^ 2, 'body']
    /// ```
    WeightedFields { fields: Vec<WeightedField> },
}

impl Expr {
    pub fn literal(value: Literal) -> Expr {
        Expr::Literal { value }
    }

    pub fn int(v: i64) -> Expr {
        Expr::literal(Literal::Int(v))
    }

    pub fn string(s: impl Into<String>) -> Expr {
        Expr::literal(Literal::Str(s.into()))
    }

    pub fn field(name: impl Into<String>) -> Expr {
        Expr::Field(FieldRef::new(name))
    }

    pub fn binary(op: BinOp, left: Expr, right: Expr) -> Expr {
        Expr::BinaryOp {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn unary(op: UnaryOp, operand: Expr) -> Expr {
        Expr::UnaryOp {
            op,
            operand: Box::new(operand),
        }
    }

    pub fn as_field(&self) -> Option<&FieldRef> {
        match self {
            Expr::Field(field) => Some(field),
            _ => None,
        }
    }

    pub fn as_call(&self) -> Option<&FunctionCall> {
        match self {
            Expr::FunctionCall(call) => Some(call),
            _ => None,
        }
    }

    /// Binary operations, `in` tests and `not`, which only start an
    /// expression at their own precedence level or looser.
    fn needs_parens(&self) -> bool {
        matches!(
            self,
            Expr::BinaryOp { .. }
                | Expr::In { .. }
                | Expr::UnaryOp {
                    op: UnaryOp::Not,
                    ..
                }
        )
    }
}

/// Writes a nested operand, parenthesizing anything looser than a primary
/// so the rendered text does not depend on precedence.
fn write_operand(f: &mut fmt::Formatter<'_>, expr: &Expr) -> fmt::Result {
    if expr.needs_parens() {
        write!(f, "({})", expr)
    } else {
        write!(f, "{}", expr)
    }
}

fn write_list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Literal { value } => write!(f, "{}", value),
            Expr::Field(field) => write!(f, "{}", field),
            Expr::FunctionCall(call) => write!(f, "{}", call),
            Expr::BinaryOp { op, left, right } => {
                write_operand(f, left)?;
                write!(f, " {} ", op)?;
                write_operand(f, right)
            }
            Expr::UnaryOp { op, operand } => {
                write!(f, "{}", op)?;
                write_operand(f, operand)
            }
            Expr::In { expr, list } => {
                write_operand(f, expr)?;
                f.write_str(" in (")?;
                write_list(f, list)?;
                f.write_str(")")
            }
            Expr::Case { branches, default } => {
                f.write_str("case(")?;
                write_list(f, branches)?;
                if let Some(default) = default {
                    write!(f, " else {}", default)?;
                }
                f.write_str(")")
            }
            Expr::Cast { expr, to } => write!(f, "cast({} as {})", expr, to),
            Expr::Interval { value, unit } => {
                f.write_str("interval ")?;
                write_operand(f, value)?;
                write!(f, " {}", unit.lowercase())
            }
            Expr::WeightedFields { fields } => {
                f.write_str("[")?;
                write_list(f, fields)?;
                f.write_str("]")
            }
        }
    }
}

/// Reference to a field, possibly a dotted path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct FieldRef {
    pub name: String,
}

impl FieldRef {
    pub fn new(name: impl Into<String>) -> Self {
        FieldRef { name: name.into() }
    }
}

impl fmt::Display for FieldRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_name(f, &self.name)
    }
}

/// Writes a field, alias or source name, backtick-quoting it unless it
/// would scan back to the same name.
pub(crate) fn write_name(f: &mut fmt::Formatter<'_>, name: &str) -> fmt::Result {
    if !name.is_empty() && name.split('.').all(is_plain_part) {
        return f.write_str(name);
    }
    f.write_str("`")?;
    f.write_str(&name.replace('\\', "\\\\").replace('`', "``"))?;
    f.write_str("`")
}

fn is_plain_part(part: &str) -> bool {
    let bytes = part.as_bytes();
    let starts = match bytes {
        [b'*', next, ..] => next.is_ascii_alphabetic() || *next == b'_' || *next == b'@',
        [first, ..] => first.is_ascii_alphabetic() || *first == b'_' || *first == b'@',
        [] => false,
    };
    if !starts || part.eq_ignore_ascii_case("else") {
        return false;
    }
    if !bytes[1..]
        .iter()
        .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'_' | b'*' | b'-'))
    {
        return false;
    }
    keywords::lookup(part).is_none_or(|kw| kw.can_name_field())
}

/// One `condition, value` pair of a `case(...)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaseBranch {
    pub condition: Expr,
    pub value: Expr,
}

impl fmt::Display for CaseBranch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.condition, self.value)
    }
}

/// A call to a built-in function.
///
/// `name` is the lower-case function name. Named options only appear on
/// relevance functions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionCall {
    pub name: String,
    pub family: FunctionFamily,
    pub args: Vec<Expr>,
    pub options: Vec<NamedOption>,
}

impl FunctionCall {
    pub fn new(name: impl Into<String>, family: FunctionFamily, args: Vec<Expr>) -> Self {
        FunctionCall {
            name: name.into(),
            family,
            args,
            options: Vec::new(),
        }
    }

    pub fn option(&self, name: &str) -> Option<&Literal> {
        self.options
            .iter()
            .find(|opt| opt.name.eq_ignore_ascii_case(name))
            .map(|opt| &opt.value)
    }
}

impl fmt::Display for FunctionCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        write_list(f, &self.args)?;
        for (i, opt) in self.options.iter().enumerate() {
            if i > 0 || !self.args.is_empty() {
                f.write_str(", ")?;
            }
            write!(f, "{}", opt)?;
        }
        f.write_str(")")
    }
}

/// `name=value` argument of a relevance function.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamedOption {
    /// Lower-case option name
    pub name: String,
    pub value: Literal,
}

impl fmt::Display for NamedOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)
    }
}

/// Entry of a `[field ^ weight, ...]` list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeightedField {
    pub field: String,
    pub weight: Option<Decimal>,
}

impl fmt::Display for WeightedField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_quoted(f, &self.field)?;
        if let Some(weight) = self.weight {
            write!(f, " ^ {}", weight)?;
        }
        Ok(())
    }
}
