//! Dotted path resolution
//!
//! `"address.city"` resolves `address` on the root, then `city` on the result.

use smallvec::SmallVec;

use crate::error::{FilterError, Result};
use crate::filter::builder::QueryBuilder;

/// Resolve a dotted property path against a query root
///
/// # Arguments
/// * `builder` - The query builder used to look up each segment
/// * `root` - The query root the first segment is resolved against
/// * `path` - Dotted property path, e.g. `"address.city"`
///
/// # Returns
/// The field reference for the last segment
///
/// # Errors
/// Returns `UnknownField` naming the first segment that does not exist
pub fn resolve_path<B: QueryBuilder>(
    builder: &B,
    root: &B::Root,
    path: &str,
) -> Result<B::Field> {
    let segments: SmallVec<[&str; 4]> = path.split('.').collect();
    let unknown = |segment: &str| FilterError::UnknownField {
        path: path.to_string(),
        segment: segment.to_string(),
    };

    let (&first, rest) = segments.split_first().ok_or_else(|| unknown(path))?;

    let mut field = builder
        .root_field(root, first)?
        .ok_or_else(|| unknown(first))?;

    for &segment in rest {
        field = builder
            .nested_field(&field, segment)?
            .ok_or_else(|| unknown(segment))?;
    }

    log::trace!(
        "Resolved '{path}' through {} segments to {}",
        segments.len(),
        builder.field_type(&field)
    );

    Ok(field)
}
