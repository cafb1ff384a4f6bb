//! Filter conditions, operators, ordering, and pagination.
//!
//! A logical query condition is the triple `(field, operator, value)`.
//! On the wire conditions are grouped by module and keyed by field, with
//! the operator translated to its wire token (`==` → `-eq`). Operators the
//! client does not know pass through untranslated so that newer server
//! operators keep working against older clients.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Comparison operator of a filter condition.
///
/// [`Operator::Raw`] carries anything outside the fixed symbolic set; its
/// wire token is the symbol itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Operator {
    Gt,
    Ge,
    Lt,
    Le,
    Eq,
    Ne,
    In,
    NotIn,
    Like,
    NotLike,
    Between,
    NotBetween,
    Raw(String),
}

impl Operator {
    /// Parse a symbolic operator. Unrecognized symbols become [`Operator::Raw`].
    pub fn parse(symbol: &str) -> Self {
        match symbol {
            ">" => Self::Gt,
            ">=" => Self::Ge,
            "<" => Self::Lt,
            "<=" => Self::Le,
            "=" | "==" => Self::Eq,
            "!=" => Self::Ne,
            "in" => Self::In,
            "not in" => Self::NotIn,
            "like" => Self::Like,
            "not like" => Self::NotLike,
            "between" => Self::Between,
            "not between" => Self::NotBetween,
            other => Self::Raw(other.to_string()),
        }
    }

    /// The symbolic form accepted in logical queries.
    pub fn symbol(&self) -> &str {
        match self {
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::In => "in",
            Self::NotIn => "not in",
            Self::Like => "like",
            Self::NotLike => "not like",
            Self::Between => "between",
            Self::NotBetween => "not between",
            Self::Raw(s) => s,
        }
    }

    /// The token the wire protocol expects. Raw operators are forwarded
    /// unchanged.
    pub fn wire_token(&self) -> &str {
        match self {
            Self::Gt => "-gt",
            Self::Ge => "-egt",
            Self::Lt => "-lt",
            Self::Le => "-elt",
            Self::Eq => "-eq",
            Self::Ne => "-neq",
            Self::In => "-in",
            Self::NotIn => "-not-in",
            Self::Like => "-lk",
            Self::NotLike => "-not-lk",
            Self::Between => "-bw",
            Self::NotBetween => "-not-bw",
            Self::Raw(s) => s,
        }
    }
}

impl From<String> for Operator {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<Operator> for String {
    fn from(op: Operator) -> Self {
        op.symbol().to_string()
    }
}

impl From<&str> for Operator {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

/// One logical filter condition.
///
/// Serializes as the three-element array `[field, operator, value]` used
/// throughout the logical query API. `field` may be dotted
/// (`"module.field"`) to reference another module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "(String, Operator, Value)", into = "(String, Operator, Value)")]
pub struct Condition {
    pub field: String,
    pub op: Operator,
    pub value: Value,
}

impl Condition {
    pub fn new(field: impl Into<String>, op: impl Into<Operator>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            op: op.into(),
            value: value.into(),
        }
    }
}

impl From<(String, Operator, Value)> for Condition {
    fn from((field, op, value): (String, Operator, Value)) -> Self {
        Self { field, op, value }
    }
}

impl From<Condition> for (String, Operator, Value) {
    fn from(c: Condition) -> Self {
        (c.field, c.op, c.value)
    }
}

/// Sort direction for one order entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Pagination window. The zero page asks the server for its defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Page {
    pub page_number: i64,
    pub page_size: i64,
}

impl Page {
    pub fn new(page_number: i64, page_size: i64) -> Self {
        Self {
            page_number,
            page_size,
        }
    }
}
