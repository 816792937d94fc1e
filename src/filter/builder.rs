//! Query-builder seam
//!
//! The compiler never builds predicates itself. It walks the expression tree and
//! calls these primitives on whatever data-access layer the caller supplies.

use arrow::datatypes::DataType;

use crate::error::Result;
use crate::filter::coerce::LiteralValue;

/// Primitives a data-access layer exposes to the filter compiler
pub trait QueryBuilder {
    /// The query root fields are resolved against
    type Root: ?Sized;

    /// A typed reference to a field, possibly transformed (e.g. lower-cased)
    type Field;

    /// The predicate representation produced by the builder
    type Predicate;

    /// Look up a top-level field on the root. `Ok(None)` if it does not exist.
    fn root_field(&self, root: &Self::Root, name: &str) -> Result<Option<Self::Field>>;

    /// Look up a field nested inside a resolved field. `Ok(None)` if it does not exist.
    fn nested_field(&self, parent: &Self::Field, name: &str) -> Result<Option<Self::Field>>;

    /// The declared type of a resolved field
    fn field_type<'f>(&self, field: &'f Self::Field) -> &'f DataType;

    /// Lower-case a string field
    fn lower(&self, field: &Self::Field) -> Result<Self::Field>;

    /// `field = value`
    fn equal(&self, field: &Self::Field, value: &LiteralValue) -> Result<Self::Predicate>;

    /// `field <> value`
    fn not_equal(&self, field: &Self::Field, value: &LiteralValue) -> Result<Self::Predicate>;

    /// `field IS NULL`
    fn is_null(&self, field: &Self::Field) -> Result<Self::Predicate>;

    /// `field IS NOT NULL`
    fn is_not_null(&self, field: &Self::Field) -> Result<Self::Predicate>;

    /// `field > value`
    fn greater_than(&self, field: &Self::Field, value: &LiteralValue) -> Result<Self::Predicate>;

    /// `field >= value`
    fn greater_than_or_equal(
        &self,
        field: &Self::Field,
        value: &LiteralValue,
    ) -> Result<Self::Predicate>;

    /// `field < value`
    fn less_than(&self, field: &Self::Field, value: &LiteralValue) -> Result<Self::Predicate>;

    /// `field <= value`
    fn less_than_or_equal(
        &self,
        field: &Self::Field,
        value: &LiteralValue,
    ) -> Result<Self::Predicate>;

    /// `field LIKE pattern`, with `%` as the wildcard
    fn like(&self, field: &Self::Field, pattern: &str) -> Result<Self::Predicate>;

    /// `field NOT LIKE pattern`
    fn not_like(&self, field: &Self::Field, pattern: &str) -> Result<Self::Predicate>;

    /// `field IN (values)`
    fn in_list(&self, field: &Self::Field, values: &[LiteralValue]) -> Result<Self::Predicate>;

    /// Logical NOT
    fn not(&self, predicate: Self::Predicate) -> Result<Self::Predicate>;

    /// Logical AND
    fn and(&self, lhs: Self::Predicate, rhs: Self::Predicate) -> Result<Self::Predicate>;

    /// Logical OR
    fn or(&self, lhs: Self::Predicate, rhs: Self::Predicate) -> Result<Self::Predicate>;
}
