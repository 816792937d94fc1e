//! Filter expression tree
//!
//! This module defines the immutable tree produced by the parser, the raw JSON
//! operands it carries, and the algebra used to compose trees before they are
//! compiled against a query root.

use std::fmt;
use std::str::FromStr;

use itertools::Itertools;
use rustc_hash::FxHashSet;
use serde_json::{Number, Value};

use crate::error::{FilterError, Result};

/// A JSON scalar exactly as it appeared in the filter, before coercion
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    /// JSON `null`
    Null,
    /// JSON `true` / `false`
    Bool(bool),
    /// JSON number
    Number(Number),
    /// JSON string
    String(String),
}

impl RawValue {
    /// Convert back into a JSON value
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Bool(b) => Value::Bool(*b),
            Self::Number(n) => Value::Number(n.clone()),
            Self::String(s) => Value::String(s.clone()),
        }
    }
}

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for RawValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<bool> for RawValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for RawValue {
    fn from(n: i64) -> Self {
        Self::Number(n.into())
    }
}

/// The right-hand side of a comparison
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// A single value, used by every operator except `anyof` / `noneof`
    Scalar(RawValue),
    /// A list of values, used by `anyof` / `noneof`
    List(Vec<RawValue>),
}

impl Operand {
    /// Convert back into a JSON value
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Scalar(value) => value.to_json(),
            Self::List(values) => Value::Array(values.iter().map(RawValue::to_json).collect()),
        }
    }
}

/// Comparison operators understood by the filter grammar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonOp {
    /// `=`
    Eq,
    /// `<>`
    Ne,
    /// `>`
    Gt,
    /// `>=`
    Ge,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `startswith`
    StartsWith,
    /// `endswith`
    EndsWith,
    /// `contains`
    Contains,
    /// `notcontains`
    NotContains,
    /// `anyof`
    AnyOf,
    /// `noneof`
    NoneOf,
}

impl ComparisonOp {
    /// The operator's wire symbol
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "<>",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::StartsWith => "startswith",
            Self::EndsWith => "endswith",
            Self::Contains => "contains",
            Self::NotContains => "notcontains",
            Self::AnyOf => "anyof",
            Self::NoneOf => "noneof",
        }
    }

    /// Whether the operator takes a list operand
    #[must_use]
    pub const fn takes_list(self) -> bool {
        matches!(self, Self::AnyOf | Self::NoneOf)
    }

    /// Whether the operator needs a totally ordered field
    #[must_use]
    pub const fn is_ordering(self) -> bool {
        matches!(self, Self::Gt | Self::Ge | Self::Lt | Self::Le)
    }

    /// Whether the operator lowers to a LIKE pattern
    #[must_use]
    pub const fn is_pattern(self) -> bool {
        matches!(
            self,
            Self::StartsWith | Self::EndsWith | Self::Contains | Self::NotContains
        )
    }
}

impl FromStr for ComparisonOp {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "=" | "eq" => Ok(Self::Eq),
            "<>" | "ne" => Ok(Self::Ne),
            ">" | "gt" => Ok(Self::Gt),
            ">=" | "ge" => Ok(Self::Ge),
            "<" | "lt" => Ok(Self::Lt),
            "<=" | "le" => Ok(Self::Le),
            "startswith" => Ok(Self::StartsWith),
            "endswith" => Ok(Self::EndsWith),
            "contains" => Ok(Self::Contains),
            "notcontains" => Ok(Self::NotContains),
            "anyof" => Ok(Self::AnyOf),
            "noneof" => Ok(Self::NoneOf),
            other => Err(FilterError::grammar(format!(
                "Comparison operator [{other}] not supported"
            ))),
        }
    }
}

impl fmt::Display for ComparisonOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operators joining the children of a group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupOp {
    /// All children must hold
    And,
    /// At least one child must hold
    Or,
}

impl GroupOp {
    /// The operator's wire name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::And => "and",
            Self::Or => "or",
        }
    }
}

impl FromStr for GroupOp {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "and" => Ok(Self::And),
            "or" => Ok(Self::Or),
            _ => Err(FilterError::grammar(format!(
                "Group operator [{s}] not supported, expected [and] or [or]"
            ))),
        }
    }
}

impl fmt::Display for GroupOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed filter expression
#[derive(Debug, Clone, PartialEq)]
pub enum FilterExpression {
    /// No filter was given; compiles to no predicate at all
    Empty,

    /// Field comparison
    Comparison {
        /// Dotted property path
        path: String,
        /// Comparison operator
        op: ComparisonOp,
        /// Uncoerced operand
        operand: Operand,
    },

    /// Children joined by a single operator
    Group {
        /// The operator joining every child
        op: GroupOp,
        /// Children in document order
        children: Vec<FilterExpression>,
    },

    /// Logical NOT of an expression
    Negation(Box<FilterExpression>),
}

impl FilterExpression {
    /// Build a comparison, checking that the operand shape fits the operator
    pub fn comparison(path: impl Into<String>, op: ComparisonOp, operand: Operand) -> Result<Self> {
        let path = path.into();
        match (&operand, op.takes_list()) {
            (Operand::List(_), false) => Err(FilterError::grammar(format!(
                "Operator [{op}] on '{path}' expects a scalar operand, found an array"
            ))),
            (Operand::Scalar(value), true) => Err(FilterError::grammar(format!(
                "Operator [{op}] on '{path}' expects an array operand, found {}",
                json_type_name(&value.to_json())
            ))),
            _ => Ok(Self::Comparison { path, op, operand }),
        }
    }

    /// Whether this expression applies no constraint
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Combine with another expression using AND.
    ///
    /// `Empty` is the identity: a missing filter adds no constraint.
    #[must_use]
    pub fn and(self, rhs: Self) -> Self {
        self.combine(GroupOp::And, rhs)
    }

    /// Combine with another expression using OR.
    ///
    /// `Empty` is the identity here as well, so `Empty.or(x)` is `x`.
    #[must_use]
    pub fn or(self, rhs: Self) -> Self {
        self.combine(GroupOp::Or, rhs)
    }

    /// Negate this expression. Negating `Empty` leaves it empty.
    #[must_use]
    pub fn not(self) -> Self {
        match self {
            Self::Empty => Self::Empty,
            other => Self::Negation(Box::new(other)),
        }
    }

    fn combine(self, op: GroupOp, rhs: Self) -> Self {
        match (self, rhs) {
            (Self::Empty, other) | (other, Self::Empty) => other,
            (Self::Group { op: lop, children: mut left }, Self::Group { op: rop, children: right })
                if lop == op && rop == op =>
            {
                left.extend(right);
                Self::Group { op, children: left }
            }
            (Self::Group { op: lop, mut children }, other) if lop == op => {
                children.push(other);
                Self::Group { op, children }
            }
            (lhs, rhs) => Self::Group {
                op,
                children: vec![lhs, rhs],
            },
        }
    }

    /// Returns every field path referenced by this expression
    #[must_use]
    pub fn required_fields(&self) -> FxHashSet<String> {
        let mut fields = FxHashSet::default();
        self.collect_required_fields(&mut fields);
        fields
    }

    fn collect_required_fields(&self, fields: &mut FxHashSet<String>) {
        match self {
            Self::Comparison { path, .. } => {
                fields.insert(path.clone());
            }
            Self::Group { children, .. } => {
                for child in children {
                    child.collect_required_fields(fields);
                }
            }
            Self::Negation(inner) => inner.collect_required_fields(fields),
            Self::Empty => {}
        }
    }

    /// Number of comparison nodes in the tree
    #[must_use]
    pub fn comparison_count(&self) -> usize {
        match self {
            Self::Comparison { .. } => 1,
            Self::Group { children, .. } => children.iter().map(Self::comparison_count).sum(),
            Self::Negation(inner) => inner.comparison_count(),
            Self::Empty => 0,
        }
    }

    /// Render the expression in its canonical wire form.
    ///
    /// Groups are written flattened (`[a, "and", b, "and", c]`). `Empty` renders as `null`.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Empty => Value::Null,
            Self::Comparison { path, op, operand } => Value::Array(vec![
                Value::String(path.clone()),
                Value::String(op.as_str().to_string()),
                operand.to_json(),
            ]),
            Self::Group { op, children } => {
                let joiner = Value::String(op.as_str().to_string());
                Value::Array(
                    Itertools::intersperse(children.iter().map(Self::to_json), joiner).collect(),
                )
            }
            Self::Negation(inner) => Value::Array(vec![Value::String("!".into()), inner.to_json()]),
        }
    }
}

impl fmt::Display for FilterExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("<empty>"),
            Self::Comparison { path, op, operand } => match operand {
                Operand::Scalar(value) => write!(f, "{path} {op} {}", value.to_json()),
                Operand::List(values) => write!(
                    f,
                    "{path} {op} ({})",
                    values.iter().map(RawValue::to_json).join(", ")
                ),
            },
            Self::Group { op, children } => {
                let joiner = format!(" {op} ");
                write!(f, "({})", children.iter().join(&joiner))
            }
            Self::Negation(inner) => match inner.as_ref() {
                Self::Group { .. } => write!(f, "!{inner}"),
                _ => write!(f, "!({inner})"),
            },
        }
    }
}

/// JSON type name used in diagnostics
#[must_use]
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
