//! Declared-type helpers and string conversion for Arrow schemas.

pub mod conversions;
pub mod date_utils;

use arrow::datatypes::DataType;

pub use conversions::ArrowValueConverter;

/// Whether values of this type are strings (and subject to case folding)
#[must_use]
pub fn is_string_like(data_type: &DataType) -> bool {
    match data_type {
        DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View => true,
        DataType::Dictionary(_, value) => is_string_like(value),
        _ => false,
    }
}

/// Whether values of this type have a total order usable by `>`, `>=`, `<`, `<=`
#[must_use]
pub fn is_orderable(data_type: &DataType) -> bool {
    match data_type {
        DataType::Null
        | DataType::Struct(_)
        | DataType::List(_)
        | DataType::LargeList(_)
        | DataType::ListView(_)
        | DataType::LargeListView(_)
        | DataType::FixedSizeList(_, _)
        | DataType::Map(_, _)
        | DataType::Union(_, _)
        | DataType::RunEndEncoded(_, _) => false,
        DataType::Dictionary(_, value) => is_orderable(value),
        _ => true,
    }
}
