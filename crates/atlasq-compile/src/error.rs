//! Error types for compilation.

use atlasq_query::{Comparison, QueryError};
use thiserror::Error;

/// Errors raised while compiling a token stream or assembling a search stage.
#[derive(Debug, Error)]
pub enum CompileError {
    /// The token stream could not be reduced to a logical tree.
    #[error(transparent)]
    Query(#[from] QueryError),

    /// No lowering exists for this comparison.
    #[error("unsupported operation: {comparison}")]
    UnsupportedOperation {
        /// The comparison that could not be lowered.
        comparison: Comparison,
    },

    /// An operand value has the wrong shape for its comparison.
    #[error("invalid value for field '{field}': {message}")]
    InvalidValue {
        /// Field of the offending operand.
        field: String,
        /// What is wrong with the value.
        message: String,
    },

    /// A stage builder was used before its prerequisites were set.
    #[error("configuration error: {message}")]
    Configuration {
        /// What is missing.
        message: String,
    },

    /// A stage builder was called with unusable arguments.
    #[error("invalid argument: {message}")]
    InvalidArgument {
        /// What is wrong with the arguments.
        message: String,
    },
}

impl CompileError {
    /// Creates an invalid value error.
    pub fn invalid_value(field: &str, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.to_string(),
            message: message.into(),
        }
    }

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Creates an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Returns a suggestion for common errors.
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::Query(e) => e.suggestion(),
            Self::UnsupportedOperation { .. } => {
                Some("Supported comparisons include <, =, IN, CONTAINS, IS_NULL and AUTOCOMPLETE")
            }
            Self::InvalidValue { .. } | Self::Configuration { .. } | Self::InvalidArgument { .. } => {
                None
            }
        }
    }
}
