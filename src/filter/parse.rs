//! JSON-array filter grammar
//!
//! ```text
//! Filter      := Comparison | Group | Negation
//! Comparison  := [ path, operator, operand ]
//! Negation    := [ "!", Filter ]
//! Group       := [ Filter, op, Filter (, op, Filter)* ]   all ops equal
//! ```
//!
//! There is no precedence between `and` and `or`: mixing them on one array
//! level is rejected, and callers nest sub-arrays instead.

use serde_json::Value;

use crate::error::{FilterError, Result};
use crate::filter::expr::{
    ComparisonOp, FilterExpression, GroupOp, Operand, RawValue, json_type_name,
};

/// Parse a filter string.
///
/// `None` and the empty string both yield [`FilterExpression::Empty`].
///
/// # Errors
/// Returns `InvalidJson` if the text is not JSON, `Grammar` if the array shape is
/// malformed, and `UnsupportedOperandType` for operands with no coercion.
pub fn parse_filter(filter: Option<&str>) -> Result<FilterExpression> {
    let Some(filter) = filter.filter(|f| !f.is_empty()) else {
        return Ok(FilterExpression::Empty);
    };

    let value: Value = serde_json::from_str(filter)?;
    let expr = parse_value(&value)?;

    log::debug!(
        "Parsed filter with {} comparisons over {} fields",
        expr.comparison_count(),
        expr.required_fields().len()
    );

    Ok(expr)
}

/// Parse an already decoded JSON value. The top level must be an array.
pub fn parse_value(value: &Value) -> Result<FilterExpression> {
    match value {
        Value::Array(items) => parse_array(items),
        other => Err(FilterError::grammar(format!(
            "Filter must be a JSON array, found {}",
            json_type_name(other)
        ))),
    }
}

fn parse_array(items: &[Value]) -> Result<FilterExpression> {
    match items.len() {
        2 => parse_negation(items),
        3 => match &items[0] {
            Value::String(_) => parse_comparison(items),
            Value::Array(_) => parse_group(items),
            other => Err(FilterError::grammar(format!(
                "The type [{}] of the first element of a filter array of size [3] is not supported",
                json_type_name(other)
            ))),
        },
        n if n >= 5 && n % 2 == 1 => parse_group(items),
        n => Err(FilterError::grammar(format!(
            "Filter array of size [{n}] not supported"
        ))),
    }
}

fn parse_negation(items: &[Value]) -> Result<FilterExpression> {
    if items[0].as_str() != Some("!") {
        return Err(FilterError::grammar(format!(
            "Filter array of size [2] has to be a unary NOT operation, found [{}] as first element",
            items[0]
        )));
    }

    let inner = child_array(&items[1], 1)?;
    Ok(FilterExpression::Negation(Box::new(parse_array(inner)?)))
}

fn parse_comparison(items: &[Value]) -> Result<FilterExpression> {
    let path = items[0].as_str().unwrap_or_default();

    let op: ComparisonOp = match &items[1] {
        Value::String(op) => op.parse().map_err(|_| {
            FilterError::grammar(format!(
                "Comparison operator [{op}] on '{path}' not supported in filter array of size [{}]",
                items.len()
            ))
        })?,
        other => {
            return Err(FilterError::grammar(format!(
                "Comparison operator on '{path}' must be a string, found {}",
                json_type_name(other)
            )));
        }
    };

    let operand = parse_operand(path, op, &items[2])?;
    FilterExpression::comparison(path, op, operand)
}

fn parse_operand(path: &str, op: ComparisonOp, value: &Value) -> Result<Operand> {
    if !op.takes_list() {
        return match value {
            Value::Array(_) => Err(FilterError::grammar(format!(
                "Operator [{op}] on '{path}' expects a scalar operand, found array"
            ))),
            other => raw_value(other).map(Operand::Scalar),
        };
    }

    match value {
        Value::Array(values) => values
            .iter()
            .map(raw_value)
            .collect::<Result<Vec<_>>>()
            .map(Operand::List),
        other => Err(FilterError::grammar(format!(
            "Operator [{op}] on '{path}' expects an array operand, found {}",
            json_type_name(other)
        ))),
    }
}

fn raw_value(value: &Value) -> Result<RawValue> {
    match value {
        Value::Null => Ok(RawValue::Null),
        Value::Bool(b) => Ok(RawValue::Bool(*b)),
        Value::Number(n) => Ok(RawValue::Number(n.clone())),
        Value::String(s) => Ok(RawValue::String(s.clone())),
        other => Err(FilterError::UnsupportedOperandType(format!(
            "operand can not be of type [{}]",
            json_type_name(other)
        ))),
    }
}

fn parse_group(items: &[Value]) -> Result<FilterExpression> {
    let op = group_op(items, 1)?;

    let mut children = Vec::with_capacity(items.len().div_ceil(2));
    children.push(parse_array(child_array(&items[0], 0)?)?);

    for i in (1..items.len()).step_by(2) {
        let next = group_op(items, i)?;
        if next != op {
            return Err(FilterError::grammar(format!(
                "Can not combine different group operators ([{op}] and [{next}]) on the same level of a filter array of size [{}]",
                items.len()
            )));
        }
        children.push(parse_array(child_array(&items[i + 1], i + 1)?)?);
    }

    Ok(FilterExpression::Group { op, children })
}

fn group_op(items: &[Value], index: usize) -> Result<GroupOp> {
    match &items[index] {
        Value::String(s) => s.parse().map_err(|_| {
            FilterError::grammar(format!(
                "Group operator [{s}] at position [{index}] of a filter array of size [{}] not supported, expected [and] or [or]",
                items.len()
            ))
        }),
        other => Err(FilterError::grammar(format!(
            "Group operator at position [{index}] of a filter array of size [{}] must be a string, found {}",
            items.len(),
            json_type_name(other)
        ))),
    }
}

fn child_array(value: &Value, index: usize) -> Result<&[Value]> {
    match value {
        Value::Array(items) => Ok(items),
        other => Err(FilterError::grammar(format!(
            "Filter element at position [{index}] must be an array, found {}",
            json_type_name(other)
        ))),
    }
}
