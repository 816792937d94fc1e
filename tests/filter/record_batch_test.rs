use std::sync::Arc;

use arrow::array::{BooleanArray, TimestampMicrosecondArray, UInt64Array};
use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use arrow::record_batch::RecordBatch;
use par_filter::{
    BatchQueryBuilder, FilterConfig, FilterError, JsonFilter, Result, filter_record_batch,
};

use crate::utils::{init_logging, names, people_batch, some};

fn apply(filter: &str, config: FilterConfig) -> Result<RecordBatch> {
    init_logging();
    JsonFilter::new(Some(filter))?
        .with_config(config)
        .filter_batch(&people_batch())
}

fn sensitive(filter: &str) -> Result<Vec<Option<String>>> {
    apply(filter, FilterConfig::case_sensitive()).map(|batch| names(&batch))
}

fn insensitive(filter: &str) -> Result<Vec<Option<String>>> {
    apply(filter, FilterConfig::case_insensitive()).map(|batch| names(&batch))
}

/// Test equality and ordering on a flat batch
#[test]
fn test_comparisons() -> Result<()> {
    assert_eq!(sensitive(r#"["name", "=", "Bob"]"#)?, some(&["Bob"]));
    assert_eq!(sensitive(r#"["age", ">", 30]"#)?, some(&["alice", "ALICE"]));
    assert_eq!(sensitive(r#"["age", "<=", "25"]"#)?, some(&["Bob", "Carol"]));
    assert_eq!(
        sensitive(r#"["age", "<>", 25]"#)?,
        some(&["alice", "ALICE", "Carol"])
    );
    Ok(())
}

/// Test that a fractional literal keeps its meaning against an integer column
#[test]
fn test_fractional_literal_on_integer_column() -> Result<()> {
    assert_eq!(sensitive(r#"["age", ">", 30.5]"#)?, some(&["alice", "ALICE"]));
    assert_eq!(sensitive(r#"["age", "=", 25.0]"#)?, some(&["Bob"]));
    Ok(())
}

/// Test null checks
#[test]
fn test_null_equality() -> Result<()> {
    assert_eq!(sensitive(r#"["name", "=", null]"#)?, vec![None]);
    assert_eq!(
        sensitive(r#"["name", "<>", null]"#)?,
        some(&["Bob", "alice", "ALICE", "Carol"])
    );
    assert_eq!(sensitive(r#"["age", "=", null]"#)?, vec![None]);
    Ok(())
}

/// Test that a filter and its negation partition the rows
#[test]
fn test_negation_complement() -> Result<()> {
    let total = people_batch().num_rows();

    for filter in [
        r#"["age", ">", 30]"#,
        r#"["name", "contains", "o"]"#,
        r#"["address.city", "=", "Aarhus"]"#,
    ] {
        let kept = apply(filter, FilterConfig::case_sensitive())?.num_rows();
        let negated = format!(r#"["!", {filter}]"#);
        let rejected = apply(&negated, FilterConfig::case_sensitive())?.num_rows();
        assert_eq!(kept + rejected, total, "{filter}");
    }

    // Rows where the comparison is unknown land on the negated side
    assert_eq!(
        sensitive(r#"["!", ["age", ">", 30]]"#)?,
        vec![Some("Bob".to_string()), None, Some("Carol".to_string())]
    );
    Ok(())
}

/// Test case folding
#[test]
fn test_case_sensitivity() -> Result<()> {
    assert_eq!(sensitive(r#"["name", "=", "alice"]"#)?, some(&["alice"]));
    assert_eq!(insensitive(r#"["name", "=", "alice"]"#)?, some(&["alice", "ALICE"]));
    assert_eq!(insensitive(r#"["name", "=", "ALICE"]"#)?, some(&["alice", "ALICE"]));
    assert_eq!(
        insensitive(r#"["name", "startswith", "A"]"#)?,
        some(&["alice", "ALICE"])
    );
    assert!(sensitive(r#"["name", "startswith", "a"]"#)?.len() == 1);
    Ok(())
}

/// Test the LIKE-based operators
#[test]
fn test_pattern_operators() -> Result<()> {
    assert_eq!(sensitive(r#"["name", "contains", "o"]"#)?, some(&["Bob", "Carol"]));
    assert_eq!(sensitive(r#"["name", "endswith", "ce"]"#)?, some(&["alice"]));
    assert_eq!(
        sensitive(r#"["name", "notcontains", "o"]"#)?,
        some(&["alice", "ALICE"])
    );
    Ok(())
}

/// Test membership operators
#[test]
fn test_membership() -> Result<()> {
    assert_eq!(sensitive(r#"["age", "anyof", [25, 40]]"#)?, some(&["Bob", "ALICE"]));
    assert_eq!(
        sensitive(r#"["age", "noneof", [25, 40]]"#)?,
        vec![Some("alice".to_string()), None, Some("Carol".to_string())]
    );
    assert_eq!(
        insensitive(r#"["name", "anyof", ["BOB", "carol"]]"#)?,
        some(&["Bob", "Carol"])
    );
    assert!(sensitive(r#"["age", "anyof", []]"#)?.is_empty());
    assert!(sensitive(r#"["name", "anyof", [null]]"#)?.is_empty());
    Ok(())
}

/// Test dotted paths into struct columns
#[test]
fn test_nested_struct_paths() -> Result<()> {
    assert_eq!(
        sensitive(r#"["address.city", "=", "Copenhagen"]"#)?,
        some(&["Bob"])
    );
    assert_eq!(
        insensitive(r#"["address.city", "=", "Copenhagen"]"#)?,
        some(&["Bob", "ALICE"])
    );

    // Carol's address is null, so its zip is not visible
    assert_eq!(sensitive(r#"["address.zip", "=", 5000]"#)?, vec![None]);
    assert_eq!(
        sensitive(r#"["address.zip", "=", null]"#)?,
        some(&["ALICE", "Carol"])
    );
    Ok(())
}

/// Test dictionary-encoded and date columns
#[test]
fn test_typed_columns() -> Result<()> {
    assert_eq!(sensitive(r#"["tag", "anyof", ["x"]]"#)?, some(&["Bob", "ALICE"]));
    assert_eq!(sensitive(r#"["tag", "=", "z"]"#)?, some(&["Carol"]));
    assert_eq!(
        sensitive(r#"["born", ">=", "1990-01-01"]"#)?,
        some(&["Bob", "alice", "Carol"])
    );
    assert_eq!(sensitive(r#"["born", "<", "01/01/1990"]"#)?, some(&["ALICE"]));
    Ok(())
}

/// Test groups, including nesting and negation inside groups
#[test]
fn test_groups() -> Result<()> {
    assert_eq!(
        insensitive(r#"[["age", ">", 20], "and", ["name", "startswith", "a"]]"#)?,
        some(&["alice", "ALICE"])
    );
    assert_eq!(
        sensitive(r#"[["name", "=", "Bob"], "or", ["name", "=", "Carol"], "or", ["age", "=", 40]]"#)?,
        some(&["Bob", "ALICE", "Carol"])
    );
    assert_eq!(
        sensitive(r#"[[["age", "<", 30], "or", ["age", ">", 35]], "and", ["!", ["name", "=", "Bob"]]]"#)?,
        some(&["ALICE", "Carol"])
    );
    Ok(())
}

/// Test that an empty filter keeps every row
#[test]
fn test_empty_filter_keeps_everything() -> Result<()> {
    let batch = people_batch();
    let filtered = JsonFilter::new(None)?.filter_batch(&batch)?;
    assert_eq!(filtered, batch);
    Ok(())
}

/// Test compile errors against the batch schema
#[test]
fn test_errors() {
    assert!(matches!(
        sensitive(r#"["nope", "=", 1]"#).unwrap_err(),
        FilterError::UnknownField { .. }
    ));
    assert!(matches!(
        sensitive(r#"["address.street", "=", "x"]"#).unwrap_err(),
        FilterError::UnknownField { .. }
    ));
    assert!(matches!(
        sensitive(r#"["age", "=", "abc"]"#).unwrap_err(),
        FilterError::Conversion { .. }
    ));
    assert!(matches!(
        sensitive(r#"["age", "=", 3000000000]"#).unwrap_err(),
        FilterError::Conversion { .. }
    ));
    assert!(matches!(
        sensitive(r#"["address", "<", 5]"#).unwrap_err(),
        FilterError::NotComparable { .. }
    ));
    assert!(matches!(
        sensitive(r#"["born", "=", "not a date"]"#).unwrap_err(),
        FilterError::Conversion { .. }
    ));
}

/// Test compiling to a mask and applying it separately
#[test]
fn test_mask_then_filter() -> Result<()> {
    let batch = people_batch();
    let filter = JsonFilter::new(Some(r#"["age", ">=", 31]"#))?
        .with_config(FilterConfig::case_sensitive());

    let mask = filter
        .compile(&BatchQueryBuilder::new(), &batch)?
        .expect("non-empty filter yields a mask");
    assert_eq!(
        mask,
        BooleanArray::from(vec![false, true, true, false, false])
    );

    let filtered = filter_record_batch(&batch, &mask)?;
    assert_eq!(names(&filtered), some(&["alice", "ALICE"]));
    Ok(())
}

/// A batch with an unsigned 64-bit column and a microsecond timestamp column
fn wide_values_batch() -> RecordBatch {
    let schema = Schema::new(vec![
        Field::new("big", DataType::UInt64, false),
        Field::new("ts", DataType::Timestamp(TimeUnit::Microsecond, None), false),
    ]);
    RecordBatch::try_new(
        Arc::new(schema),
        vec![
            Arc::new(UInt64Array::from(vec![u64::MAX, u64::MAX - 1, 7])),
            Arc::new(TimestampMicrosecondArray::from(vec![123, 124, 1_000_000])),
        ],
    )
    .unwrap()
}

fn wide_rows(filter: &str) -> Result<usize> {
    init_logging();
    let filtered = JsonFilter::new(Some(filter))?
        .with_config(FilterConfig::case_sensitive())
        .filter_batch(&wide_values_batch())?;
    Ok(filtered.num_rows())
}

/// Test that unsigned values above the signed range compare exactly
#[test]
fn test_unsigned_64_bit_values() -> Result<()> {
    assert_eq!(wide_rows(r#"["big", "=", 18446744073709551615]"#)?, 1);
    assert_eq!(wide_rows(r#"["big", "=", "18446744073709551615"]"#)?, 1);
    assert_eq!(wide_rows(r#"["big", "<", 18446744073709551615]"#)?, 2);
    assert_eq!(wide_rows(r#"["big", "anyof", [7, "18446744073709551614"]]"#)?, 2);
    assert!(matches!(
        wide_rows(r#"["big", "=", -1]"#).unwrap_err(),
        FilterError::Conversion { .. }
    ));
    Ok(())
}

/// Test that sub-millisecond timestamp operands keep their precision
#[test]
fn test_microsecond_timestamps() -> Result<()> {
    assert_eq!(wide_rows(r#"["ts", "=", "1970-01-01T00:00:00.000123Z"]"#)?, 1);
    assert_eq!(wide_rows(r#"["ts", ">", "1970-01-01 00:00:00.000123"]"#)?, 2);
    assert_eq!(wide_rows(r#"["ts", "<", "1970-01-01T00:00:01Z"]"#)?, 2);
    Ok(())
}
