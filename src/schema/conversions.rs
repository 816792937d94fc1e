//! String-to-value conversion for Arrow column types.

use anyhow::{Context, anyhow, bail};
use arrow::datatypes::DataType;

use crate::config::DateFormatConfig;
use crate::filter::coerce::{LiteralValue, ValueConverter};
use crate::schema::date_utils::{date_to_days, parse_date_string, parse_timestamp_nanos};

/// Converts operand strings into literals matching an Arrow [`DataType`]
#[derive(Debug, Clone, Default)]
pub struct ArrowValueConverter {
    date_formats: DateFormatConfig,
}

impl ArrowValueConverter {
    /// Create a converter with default date formats
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a converter with custom date formats
    #[must_use]
    pub const fn with_date_formats(date_formats: DateFormatConfig) -> Self {
        Self { date_formats }
    }
}

impl ValueConverter for ArrowValueConverter {
    fn convert(&self, value: &str, target: &DataType) -> anyhow::Result<LiteralValue> {
        let trimmed = value.trim();

        match target {
            DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View => {
                Ok(LiteralValue::String(value.to_string()))
            }

            DataType::Dictionary(_, value_type) => self.convert(value, value_type),

            DataType::Boolean => parse_bool(trimmed)
                .map(LiteralValue::Boolean)
                .ok_or_else(|| anyhow!("'{value}' is not a boolean")),

            DataType::Int8 | DataType::Int16 | DataType::Int32 | DataType::Int64 => trimmed
                .parse::<i64>()
                .map(LiteralValue::Int)
                .with_context(|| format!("'{value}' is not an integer")),

            DataType::UInt8 | DataType::UInt16 | DataType::UInt32 | DataType::UInt64 => trimmed
                .parse::<u64>()
                .map(LiteralValue::UInt)
                .with_context(|| format!("'{value}' is not an unsigned integer")),

            DataType::Float16
            | DataType::Float32
            | DataType::Float64
            | DataType::Decimal128(_, _)
            | DataType::Decimal256(_, _) => trimmed
                .parse::<f64>()
                .map(LiteralValue::Float)
                .with_context(|| format!("'{value}' is not a number")),

            DataType::Date32 | DataType::Date64 => parse_date_string(trimmed, &self.date_formats)
                .map(|date| LiteralValue::Date(date_to_days(date)))
                .ok_or_else(|| anyhow!("'{value}' does not match any configured date format")),

            DataType::Timestamp(_, _) => parse_timestamp_nanos(trimmed, &self.date_formats)
                .map(LiteralValue::Timestamp)
                .ok_or_else(|| anyhow!("'{value}' is not a timestamp")),

            other => bail!("No conversion from string to {other}"),
        }
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}
