//! Error handling for filter parsing and compilation.

use arrow::error::ArrowError;

/// Errors that can occur while parsing or compiling a filter expression
#[derive(Debug, thiserror::Error)]
pub enum FilterError {
    /// The filter array does not follow the grammar
    #[error("Filter grammar error: {0}")]
    Grammar(String),

    /// The input text is not valid JSON
    #[error("Invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// A path segment does not exist on its parent
    #[error("Unknown field '{segment}' in path '{path}'")]
    UnknownField {
        /// The full dotted path being resolved
        path: String,
        /// The segment that failed to resolve
        segment: String,
    },

    /// An operand could not be converted to the field's declared type
    #[error("Cannot convert '{value}' to {target}: {source}")]
    Conversion {
        /// The raw operand
        value: String,
        /// The declared type of the field
        target: String,
        /// The underlying conversion failure
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A JSON value with no defined coercion appeared as an operand
    #[error("Unsupported operand type: {0}")]
    UnsupportedOperandType(String),

    /// An ordering comparison targets a field without a total order
    #[error("Field '{path}' of type {data_type} does not support ordering comparisons")]
    NotComparable {
        /// The dotted path of the field
        path: String,
        /// The declared type of the field
        data_type: String,
    },

    /// Arrow error raised while building a predicate
    #[error("Arrow error: {0}")]
    Arrow(#[from] ArrowError),
}

impl FilterError {
    /// Create a grammar error from any message
    pub fn grammar(message: impl Into<String>) -> Self {
        Self::Grammar(message.into())
    }

    /// Whether the error was caused by the caller's filter input rather than the backend.
    ///
    /// Hosting layers should surface these as validation failures, not server faults.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        !matches!(self, Self::Arrow(_))
    }
}

/// Result type for filter operations
pub type Result<T> = std::result::Result<T, FilterError>;
