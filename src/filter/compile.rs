//! Predicate compilation
//!
//! Walks a parsed [`FilterExpression`] and lowers it into a builder's predicate
//! type. Fields are resolved and operands coerced lazily, one comparison node
//! at a time; the first failure aborts compilation.

use arrow::datatypes::DataType;

use crate::config::FilterConfig;
use crate::error::{FilterError, Result};
use crate::filter::builder::QueryBuilder;
use crate::filter::coerce::{LiteralValue, ValueCoercer, ValueConverter};
use crate::filter::expr::{ComparisonOp, FilterExpression, GroupOp, Operand};
use crate::filter::resolve::resolve_path;
use crate::schema::is_orderable;

/// Compiles filter expressions with one builder, converter, and configuration
#[derive(Debug)]
pub struct PredicateCompiler<'a, B, C: ?Sized> {
    builder: &'a B,
    coercer: ValueCoercer<'a, C>,
}

impl<'a, B: QueryBuilder, C: ValueConverter + ?Sized> PredicateCompiler<'a, B, C> {
    /// Create a new compiler
    #[must_use]
    pub const fn new(builder: &'a B, converter: &'a C, config: FilterConfig) -> Self {
        Self {
            builder,
            coercer: ValueCoercer::new(converter, config.case_sensitive),
        }
    }

    /// Compile an expression against a query root.
    ///
    /// Returns `Ok(None)` for [`FilterExpression::Empty`]: no constraint applies.
    ///
    /// # Errors
    /// Returns the first `UnknownField`, `Conversion`, `NotComparable`, or builder
    /// error encountered; no partial predicate is produced.
    pub fn compile(&self, root: &B::Root, expr: &FilterExpression) -> Result<Option<B::Predicate>> {
        match expr {
            FilterExpression::Empty => Ok(None),

            FilterExpression::Negation(inner) => self
                .compile(root, inner)?
                .map(|predicate| self.builder.not(predicate))
                .transpose(),

            FilterExpression::Group { op, children } => self.compile_group(root, *op, children),

            FilterExpression::Comparison { path, op, operand } => {
                self.compile_comparison(root, path, *op, operand).map(Some)
            }
        }
    }

    /// Folds children left to right. Empty children add no constraint.
    fn compile_group(
        &self,
        root: &B::Root,
        op: GroupOp,
        children: &[FilterExpression],
    ) -> Result<Option<B::Predicate>> {
        let mut acc: Option<B::Predicate> = None;

        for child in children {
            let Some(next) = self.compile(root, child)? else {
                continue;
            };

            acc = Some(match acc {
                None => next,
                Some(prev) => match op {
                    GroupOp::And => self.builder.and(prev, next)?,
                    GroupOp::Or => self.builder.or(prev, next)?,
                },
            });
        }

        Ok(acc)
    }

    fn compile_comparison(
        &self,
        root: &B::Root,
        path: &str,
        op: ComparisonOp,
        operand: &Operand,
    ) -> Result<B::Predicate> {
        let field = resolve_path(self.builder, root, path)?;
        let data_type = self.builder.field_type(&field).clone();

        let field = if self.coercer.folds_case(&data_type) {
            self.builder.lower(&field)?
        } else {
            field
        };

        match operand {
            Operand::Scalar(raw) if !op.takes_list() => {
                let value = self.coercer.coerce(raw, &data_type)?;
                self.apply_scalar(&field, path, &data_type, op, &value)
            }
            Operand::List(raws) if op.takes_list() => {
                let values = self.coercer.coerce_all(raws, &data_type)?;
                let predicate = self.builder.in_list(&field, &values)?;
                match op {
                    ComparisonOp::NoneOf => self.builder.not(predicate),
                    _ => Ok(predicate),
                }
            }
            _ => Err(FilterError::grammar(format!(
                "Operator [{op}] on '{path}' does not accept operand {}",
                operand.to_json()
            ))),
        }
    }

    fn apply_scalar(
        &self,
        field: &B::Field,
        path: &str,
        data_type: &DataType,
        op: ComparisonOp,
        value: &LiteralValue,
    ) -> Result<B::Predicate> {
        if op.is_ordering() && !is_orderable(data_type) {
            return Err(FilterError::NotComparable {
                path: path.to_string(),
                data_type: data_type.to_string(),
            });
        }

        if value.is_null() && (op.is_ordering() || op.is_pattern()) {
            return Err(FilterError::UnsupportedOperandType(format!(
                "null operand can not be used with operator [{op}] on '{path}'"
            )));
        }

        let builder = self.builder;
        match op {
            ComparisonOp::Eq if value.is_null() => builder.is_null(field),
            ComparisonOp::Eq => builder.equal(field, value),
            ComparisonOp::Ne if value.is_null() => builder.is_not_null(field),
            ComparisonOp::Ne => builder.not_equal(field, value),
            ComparisonOp::Gt => builder.greater_than(field, value),
            ComparisonOp::Ge => builder.greater_than_or_equal(field, value),
            ComparisonOp::Lt => builder.less_than(field, value),
            ComparisonOp::Le => builder.less_than_or_equal(field, value),
            ComparisonOp::StartsWith => builder.like(field, &format!("{value}%")),
            ComparisonOp::EndsWith => builder.like(field, &format!("%{value}")),
            ComparisonOp::Contains => builder.like(field, &format!("%{value}%")),
            ComparisonOp::NotContains => builder.not_like(field, &format!("%{value}%")),
            ComparisonOp::AnyOf | ComparisonOp::NoneOf => Err(FilterError::grammar(format!(
                "Operator [{op}] on '{path}' expects an array operand"
            ))),
        }
    }
}
