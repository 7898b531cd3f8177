use thiserror::Error;

/// Convenience result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Error type returned by every engine operation.
///
/// This is a single error enum shared across loading, transformation, and
/// analysis. Callers branch on the variant; no operation leaves the store
/// half-updated on failure.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Underlying I/O error (e.g. file not found, permission denied).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parse/write error.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error while writing a profile document.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// The source could not be parsed into a non-empty table by any
    /// encoding/delimiter combination.
    #[error("load error: {message}")]
    Load { message: String },

    /// An operation was requested before any table was loaded.
    #[error("no dataset loaded")]
    NotLoaded,

    /// A referenced column is absent or has the wrong type for the operation.
    #[error("invalid column '{column}': {message}")]
    InvalidColumn { column: String, message: String },

    /// A column has no usable values after dropping nulls.
    #[error("column '{column}' has no values to analyze")]
    EmptyColumn { column: String },

    /// Cleaning/coercion left no rows to analyze.
    #[error("no valid data: {message}")]
    NoValidData { message: String },

    /// The safety policy rejected a transformation expression.
    #[error("unsafe expression (matched '{token}'): {expression}")]
    UnsafeExpression { expression: String, token: String },

    /// A permitted expression failed during execution.
    #[error("execution error: {message}")]
    Execution { message: String },
}

impl EngineError {
    /// Shorthand for an [`EngineError::Execution`] with a formatted message.
    pub fn execution(message: impl Into<String>) -> Self {
        Self::Execution {
            message: message.into(),
        }
    }

    /// Shorthand for an [`EngineError::InvalidColumn`].
    pub fn invalid_column(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidColumn {
            column: column.into(),
            message: message.into(),
        }
    }
}
