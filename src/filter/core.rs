//! Arrow record batch backend
//!
//! Implements [`QueryBuilder`] over an Arrow [`RecordBatch`]: fields are columns
//! (dotted paths descend into struct columns) and predicates are boolean masks.
//! Every mask is two-valued: rows where a comparison is unknown because of a null
//! are `false`, so `NOT(x = 5)` holds for a null `x`.

use std::sync::Arc;

use arrow::array::{
    Array, ArrayRef, BooleanArray, Datum, Date32Array, Float64Array, Int64Array, Scalar,
    StringArray, StructArray, TimestampNanosecondArray, UInt64Array, make_array, new_null_array,
};
use arrow::buffer::NullBuffer;
use arrow::compute::kernels::cmp::{eq, gt, gt_eq, lt, lt_eq, neq};
use arrow::compute::kernels::comparison::{like, nlike};
use arrow::compute::{CastOptions, and, cast, cast_with_options, is_not_null, is_null, not, or};
use arrow::datatypes::DataType;
use arrow::error::ArrowError;
use arrow::record_batch::RecordBatch;

use crate::error::{FilterError, Result};
use crate::filter::builder::QueryBuilder;
use crate::filter::coerce::LiteralValue;

type Kernel = fn(&dyn Datum, &dyn Datum) -> std::result::Result<BooleanArray, ArrowError>;

/// Filter a record batch based on a boolean mask
///
/// # Arguments
/// * `batch` - The record batch to filter
/// * `mask` - The boolean mask indicating which rows to keep
///
/// # Returns
/// A new record batch with only rows where mask is true
///
/// # Errors
/// Returns an error if the mask length does not match the batch or filtering fails
pub fn filter_record_batch(batch: &RecordBatch, mask: &BooleanArray) -> Result<RecordBatch> {
    if batch.num_rows() != mask.len() {
        return Err(ArrowError::InvalidArgumentError(format!(
            "Mask length ({}) doesn't match batch row count ({})",
            mask.len(),
            batch.num_rows()
        ))
        .into());
    }

    Ok(arrow::compute::filter_record_batch(batch, mask)?)
}

/// A resolved column, possibly nested inside struct columns
#[derive(Debug, Clone)]
pub struct ColumnRef {
    path: String,
    array: ArrayRef,
}

impl ColumnRef {
    /// Dotted path of the column relative to the batch
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The column values
    #[must_use]
    pub const fn array(&self) -> &ArrayRef {
        &self.array
    }

    /// The column's Arrow type
    #[must_use]
    pub fn data_type(&self) -> &DataType {
        self.array.data_type()
    }
}

/// Builds boolean masks over a [`RecordBatch`]
#[derive(Debug, Clone, Copy, Default)]
pub struct BatchQueryBuilder;

impl BatchQueryBuilder {
    /// Create a new builder
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn compare(
        &self,
        field: &ColumnRef,
        value: &LiteralValue,
        kernel: Kernel,
    ) -> Result<BooleanArray> {
        let (column, scalar) = comparison_operands(field, value)?;
        let mask = kernel(&column, &scalar).map_err(|e| {
            FilterError::Arrow(ArrowError::ComputeError(format!(
                "Comparison on column '{}' failed: {e}",
                field.path
            )))
        })?;
        Ok(two_valued(mask))
    }

    fn pattern(
        &self,
        field: &ColumnRef,
        pattern: &str,
        kernel: Kernel,
    ) -> Result<BooleanArray> {
        let column = if field.data_type() == &DataType::Utf8 {
            Arc::clone(&field.array)
        } else {
            cast(&field.array, &DataType::Utf8)?
        };
        let pattern = Scalar::new(StringArray::from(vec![pattern]));
        Ok(two_valued(kernel(&column, &pattern)?))
    }
}

impl QueryBuilder for BatchQueryBuilder {
    type Root = RecordBatch;
    type Field = ColumnRef;
    type Predicate = BooleanArray;

    fn root_field(&self, root: &RecordBatch, name: &str) -> Result<Option<ColumnRef>> {
        let Some(array) = root.column_by_name(name) else {
            return Ok(None);
        };

        Ok(Some(ColumnRef {
            path: name.to_string(),
            array: unpack_dictionary(Arc::clone(array))?,
        }))
    }

    fn nested_field(&self, parent: &ColumnRef, name: &str) -> Result<Option<ColumnRef>> {
        let Some(parent_struct) = parent.array.as_any().downcast_ref::<StructArray>() else {
            return Ok(None);
        };
        let Some(child) = parent_struct.column_by_name(name) else {
            return Ok(None);
        };

        let array = with_parent_nulls(child, parent_struct.nulls())?;
        Ok(Some(ColumnRef {
            path: format!("{}.{name}", parent.path),
            array: unpack_dictionary(array)?,
        }))
    }

    fn field_type<'f>(&self, field: &'f ColumnRef) -> &'f DataType {
        field.data_type()
    }

    fn lower(&self, field: &ColumnRef) -> Result<ColumnRef> {
        let strings = cast(&field.array, &DataType::Utf8)?;
        let strings = strings
            .as_any()
            .downcast_ref::<StringArray>()
            .ok_or_else(|| {
                ArrowError::CastError(format!("Column '{}' is not a string array", field.path))
            })?;

        let lowered: StringArray = strings.iter().map(|v| v.map(str::to_lowercase)).collect();
        Ok(ColumnRef {
            path: field.path.clone(),
            array: Arc::new(lowered),
        })
    }

    fn equal(&self, field: &ColumnRef, value: &LiteralValue) -> Result<BooleanArray> {
        self.compare(field, value, eq)
    }

    fn not_equal(&self, field: &ColumnRef, value: &LiteralValue) -> Result<BooleanArray> {
        self.compare(field, value, neq)
    }

    fn is_null(&self, field: &ColumnRef) -> Result<BooleanArray> {
        Ok(is_null(field.array.as_ref())?)
    }

    fn is_not_null(&self, field: &ColumnRef) -> Result<BooleanArray> {
        Ok(is_not_null(field.array.as_ref())?)
    }

    fn greater_than(&self, field: &ColumnRef, value: &LiteralValue) -> Result<BooleanArray> {
        self.compare(field, value, gt)
    }

    fn greater_than_or_equal(&self, field: &ColumnRef, value: &LiteralValue) -> Result<BooleanArray> {
        self.compare(field, value, gt_eq)
    }

    fn less_than(&self, field: &ColumnRef, value: &LiteralValue) -> Result<BooleanArray> {
        self.compare(field, value, lt)
    }

    fn less_than_or_equal(&self, field: &ColumnRef, value: &LiteralValue) -> Result<BooleanArray> {
        self.compare(field, value, lt_eq)
    }

    fn like(&self, field: &ColumnRef, pattern: &str) -> Result<BooleanArray> {
        self.pattern(field, pattern, like)
    }

    fn not_like(&self, field: &ColumnRef, pattern: &str) -> Result<BooleanArray> {
        self.pattern(field, pattern, nlike)
    }

    fn in_list(&self, field: &ColumnRef, values: &[LiteralValue]) -> Result<BooleanArray> {
        let mut result = BooleanArray::from(vec![false; field.array.len()]);
        for value in values {
            let mask = self.equal(field, value)?;
            result = or(&result, &mask)?;
        }
        Ok(result)
    }

    fn not(&self, predicate: BooleanArray) -> Result<BooleanArray> {
        Ok(not(&predicate)?)
    }

    fn and(&self, lhs: BooleanArray, rhs: BooleanArray) -> Result<BooleanArray> {
        Ok(and(&lhs, &rhs)?)
    }

    fn or(&self, lhs: BooleanArray, rhs: BooleanArray) -> Result<BooleanArray> {
        Ok(or(&lhs, &rhs)?)
    }
}

/// Collapse null mask entries to `false`
fn two_valued(mask: BooleanArray) -> BooleanArray {
    if mask.null_count() == 0 {
        mask
    } else {
        arrow::compute::prep_null_mask_filter(&mask)
    }
}

fn unpack_dictionary(array: ArrayRef) -> Result<ArrayRef> {
    match array.data_type() {
        DataType::Dictionary(_, value_type) => Ok(cast(&array, value_type)?),
        _ => Ok(array),
    }
}

/// A struct row that is null makes every child value in that row null
fn with_parent_nulls(child: &ArrayRef, parent: Option<&NullBuffer>) -> Result<ArrayRef> {
    if parent.is_none() {
        return Ok(Arc::clone(child));
    }

    let nulls = NullBuffer::union(parent, child.nulls());
    let data = child.to_data().into_builder().nulls(nulls).build()?;
    Ok(make_array(data))
}

/// Materialise both sides of a comparison with matching types.
///
/// The literal is cast to the column type, except that a fractional literal
/// against an integer column compares in `Float64` so `x >= 1.5` keeps its meaning.
fn comparison_operands(
    field: &ColumnRef,
    value: &LiteralValue,
) -> Result<(ArrayRef, Scalar<ArrayRef>)> {
    let column = if matches!(value, LiteralValue::Float(_)) && field.data_type().is_integer() {
        cast(&field.array, &DataType::Float64)?
    } else {
        Arc::clone(&field.array)
    };

    let literal = literal_array(value, column.data_type())?;
    Ok((column, Scalar::new(literal)))
}

fn literal_array(value: &LiteralValue, target: &DataType) -> Result<ArrayRef> {
    let array: ArrayRef = match value {
        LiteralValue::Null => return Ok(new_null_array(target, 1)),
        LiteralValue::Boolean(b) => Arc::new(BooleanArray::from(vec![*b])),
        LiteralValue::Int(n) => Arc::new(Int64Array::from(vec![*n])),
        LiteralValue::UInt(n) => Arc::new(UInt64Array::from(vec![*n])),
        LiteralValue::Float(n) => Arc::new(Float64Array::from(vec![*n])),
        LiteralValue::String(s) => Arc::new(StringArray::from(vec![s.as_str()])),
        LiteralValue::Date(days) => Arc::new(Date32Array::from(vec![*days])),
        LiteralValue::Timestamp(ns) => Arc::new(TimestampNanosecondArray::from(vec![*ns])),
    };

    if array.data_type() == target {
        return Ok(array);
    }

    let options = CastOptions {
        safe: false,
        ..Default::default()
    };
    cast_with_options(&array, target, &options).map_err(|e| FilterError::Conversion {
        value: value.to_string(),
        target: target.to_string(),
        source: Box::new(e),
    })
}
