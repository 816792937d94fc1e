//! Operand coercion
//!
//! Raw JSON operands are turned into [`LiteralValue`]s of the type a field
//! declares. Numbers and booleans pass through as-is; strings go through an
//! injected [`ValueConverter`], and are lower-cased for string fields when
//! comparisons are case-insensitive.

use std::fmt;

use arrow::datatypes::DataType;

use crate::error::{FilterError, Result};
use crate::filter::expr::RawValue;
use crate::schema::date_utils::days_to_date;
use crate::schema::is_string_like;

/// A typed operand value, ready to be handed to a query builder
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    /// Null value
    Null,

    /// Boolean value
    Boolean(bool),

    /// Integer value
    Int(i64),

    /// Unsigned integer value above `i64::MAX`, or converted for an unsigned field
    UInt(u64),

    /// Floating point value
    Float(f64),

    /// String value
    String(String),

    /// Date value (days since epoch)
    Date(i32),

    /// Timestamp value (nanoseconds since epoch)
    Timestamp(i64),
}

impl LiteralValue {
    /// Whether this is the null literal
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl fmt::Display for LiteralValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Int(n) => write!(f, "{n}"),
            Self::UInt(n) => write!(f, "{n}"),
            Self::Float(n) => write!(f, "{n}"),
            Self::String(s) => f.write_str(s),
            Self::Date(days) => match days_to_date(*days) {
                Some(date) => write!(f, "{}", date.format("%Y-%m-%d")),
                None => write!(f, "{days}"),
            },
            Self::Timestamp(ns) => write!(
                f,
                "{}",
                chrono::DateTime::from_timestamp_nanos(*ns).format("%Y-%m-%d %H:%M:%S%.f")
            ),
        }
    }
}

/// Converts operand strings into values of a declared type
pub trait ValueConverter {
    /// Convert `value` into a literal of type `target`
    ///
    /// # Errors
    /// Returns an error if the string is not a valid representation of `target`
    fn convert(&self, value: &str, target: &DataType) -> anyhow::Result<LiteralValue>;
}

impl<C: ValueConverter + ?Sized> ValueConverter for &C {
    fn convert(&self, value: &str, target: &DataType) -> anyhow::Result<LiteralValue> {
        (**self).convert(value, target)
    }
}

/// Applies conversion and the case-folding policy to raw operands
#[derive(Debug)]
pub struct ValueCoercer<'a, C: ?Sized> {
    converter: &'a C,
    case_sensitive: bool,
}

impl<'a, C: ValueConverter + ?Sized> ValueCoercer<'a, C> {
    /// Create a coercer around a converter
    #[must_use]
    pub const fn new(converter: &'a C, case_sensitive: bool) -> Self {
        Self {
            converter,
            case_sensitive,
        }
    }

    /// Whether fields and operands of this type must be lower-cased
    #[must_use]
    pub fn folds_case(&self, target: &DataType) -> bool {
        !self.case_sensitive && is_string_like(target)
    }

    /// Coerce a single raw operand to `target`
    ///
    /// # Errors
    /// Returns `Conversion` if the converter rejects a string operand
    pub fn coerce(&self, raw: &RawValue, target: &DataType) -> Result<LiteralValue> {
        let value = match raw {
            RawValue::Null => LiteralValue::Null,
            RawValue::Bool(b) => LiteralValue::Boolean(*b),
            RawValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    LiteralValue::Int(i)
                } else if let Some(u) = n.as_u64() {
                    LiteralValue::UInt(u)
                } else {
                    LiteralValue::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            RawValue::String(s) => {
                let converted =
                    self.converter
                        .convert(s, target)
                        .map_err(|e| FilterError::Conversion {
                            value: s.clone(),
                            target: target.to_string(),
                            source: e.into(),
                        })?;
                match converted {
                    LiteralValue::String(s) if self.folds_case(target) => {
                        LiteralValue::String(s.to_lowercase())
                    }
                    other => other,
                }
            }
        };

        log::trace!("Coerced operand {raw:?} to {value:?} for type {target}");
        Ok(value)
    }

    /// Coerce every element of a list operand independently
    pub fn coerce_all(&self, raws: &[RawValue], target: &DataType) -> Result<Vec<LiteralValue>> {
        raws.iter().map(|raw| self.coerce(raw, target)).collect()
    }
}
