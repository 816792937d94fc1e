//! JSON filter expressions
//!
//! A filter is a JSON array such as `[["name", "=", "Bob"], "or", ["age", ">", 30]]`.
//! [`JsonFilter`] parses it once into a [`FilterExpression`] and can then be
//! compiled against any [`QueryBuilder`], or applied directly to a [`RecordBatch`].

pub mod builder;
pub mod coerce;
pub mod compile;
pub mod core;
pub mod expr;
pub mod parse;
pub mod resolve;

use std::str::FromStr;

use arrow::record_batch::RecordBatch;

pub use builder::QueryBuilder;
pub use coerce::{LiteralValue, ValueCoercer, ValueConverter};
pub use compile::PredicateCompiler;
pub use self::core::{BatchQueryBuilder, ColumnRef, filter_record_batch};
pub use expr::{ComparisonOp, FilterExpression, GroupOp, Operand, RawValue};
pub use parse::{parse_filter, parse_value};
pub use resolve::resolve_path;

use crate::config::FilterConfig;
use crate::error::{FilterError, Result};
use crate::schema::ArrowValueConverter;

/// A parsed filter together with its converter and optional configuration
#[derive(Debug, Clone)]
pub struct JsonFilter<C = ArrowValueConverter> {
    expr: FilterExpression,
    converter: C,
    config: Option<FilterConfig>,
}

impl JsonFilter {
    /// Parse a filter string. `None` or `""` yields a filter that matches everything.
    ///
    /// # Errors
    /// Returns `InvalidJson` or `Grammar` if the string is not a valid filter
    pub fn new(filter: Option<&str>) -> Result<Self> {
        Self::with_converter(filter, ArrowValueConverter::default())
    }

    /// Wrap an already-built expression
    #[must_use]
    pub fn from_expression(expr: FilterExpression) -> Self {
        Self {
            expr,
            converter: ArrowValueConverter::default(),
            config: None,
        }
    }
}

impl<C: ValueConverter> JsonFilter<C> {
    /// Parse a filter string with a custom value converter
    ///
    /// # Errors
    /// Returns `InvalidJson` or `Grammar` if the string is not a valid filter
    pub fn with_converter(filter: Option<&str>, converter: C) -> Result<Self> {
        Ok(Self {
            expr: parse_filter(filter)?,
            converter,
            config: None,
        })
    }

    /// Pin the configuration used by every compilation of this filter
    #[must_use]
    pub fn with_config(mut self, config: FilterConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// The parsed expression
    #[must_use]
    pub const fn expression(&self) -> &FilterExpression {
        &self.expr
    }

    /// Whether this filter applies no constraint
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.expr.is_empty()
    }

    /// The configuration that the next compilation will use.
    ///
    /// Without a pinned configuration this reflects the process-wide default at
    /// the time of the call.
    #[must_use]
    pub fn config(&self) -> FilterConfig {
        self.config.unwrap_or_default()
    }

    /// Conjunction with another filter. This filter's converter and configuration are kept.
    #[must_use]
    pub fn and<D>(self, other: JsonFilter<D>) -> Self {
        Self {
            expr: self.expr.and(other.expr),
            ..self
        }
    }

    /// Disjunction with another filter. This filter's converter and configuration are kept.
    #[must_use]
    pub fn or<D>(self, other: JsonFilter<D>) -> Self {
        Self {
            expr: self.expr.or(other.expr),
            ..self
        }
    }

    /// Negation of this filter
    #[must_use]
    pub fn not(self) -> Self {
        Self {
            expr: self.expr.not(),
            ..self
        }
    }

    /// Compile against a query root using this filter's configuration.
    ///
    /// Returns `Ok(None)` when the filter is empty.
    ///
    /// # Errors
    /// Returns the first resolution, conversion, or builder error encountered
    pub fn compile<B: QueryBuilder>(
        &self,
        builder: &B,
        root: &B::Root,
    ) -> Result<Option<B::Predicate>> {
        self.compile_with(builder, root, self.config())
    }

    /// Compile against a query root with an explicit configuration
    ///
    /// # Errors
    /// Returns the first resolution, conversion, or builder error encountered
    pub fn compile_with<B: QueryBuilder>(
        &self,
        builder: &B,
        root: &B::Root,
        config: FilterConfig,
    ) -> Result<Option<B::Predicate>> {
        log::debug!(
            "Compiling filter {} (case_sensitive={})",
            self.expr,
            config.case_sensitive
        );
        PredicateCompiler::new(builder, &self.converter, config).compile(root, &self.expr)
    }

    /// Keep only the rows of `batch` that satisfy this filter
    ///
    /// # Errors
    /// Returns an error if the filter does not compile against the batch schema
    pub fn filter_batch(&self, batch: &RecordBatch) -> Result<RecordBatch> {
        let builder = BatchQueryBuilder::new();
        match self.compile(&builder, batch)? {
            Some(mask) => {
                let filtered = filter_record_batch(batch, &mask)?;
                log::debug!(
                    "Filter kept {} of {} rows",
                    filtered.num_rows(),
                    batch.num_rows()
                );
                Ok(filtered)
            }
            None => Ok(batch.clone()),
        }
    }
}

impl FromStr for JsonFilter {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(Some(s))
    }
}

impl From<FilterExpression> for JsonFilter {
    fn from(expr: FilterExpression) -> Self {
        Self::from_expression(expr)
    }
}
