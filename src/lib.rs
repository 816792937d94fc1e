//! A Rust library for compiling JSON filter expressions into query predicates,
//! with an Arrow record batch backend.
//!
//! ```no_run
//! use par_filter::JsonFilter;
//! # fn run(batch: &arrow::record_batch::RecordBatch) -> par_filter::Result<()> {
//! let filter: JsonFilter = r#"[["name", "=", "Bob"], "or", ["age", ">", 30]]"#.parse()?;
//! let matching = filter.filter_batch(batch)?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod filter;
pub mod schema;

// Re-export the most common types for easier use
// Core types
pub use config::{DateFormatConfig, FilterConfig, default_case_sensitive, set_default_case_sensitive};
pub use error::{FilterError, Result};

// Arrow types
pub use arrow::datatypes::DataType;
pub use arrow::record_batch::RecordBatch;

// Filtering capabilities
pub use filter::{ComparisonOp, FilterExpression, GroupOp, JsonFilter, Operand, RawValue};
pub use filter::{LiteralValue, QueryBuilder, ValueConverter};
pub use filter::{BatchQueryBuilder, filter_record_batch, parse_filter};

// Value conversion
pub use schema::ArrowValueConverter;
