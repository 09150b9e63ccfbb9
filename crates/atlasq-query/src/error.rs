//! Error types for token stream reduction.

use thiserror::Error;

/// Errors raised while turning an infix token stream into a logical tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// The token stream is not well formed (unbalanced parentheses).
    #[error("syntax error: {message}")]
    Syntax {
        /// Error message.
        message: String,
    },

    /// Postfix reduction did not converge to a single tree.
    #[error("invalid expression: {message}")]
    State {
        /// Error message.
        message: String,
    },
}

impl QueryError {
    /// Creates a syntax error for unbalanced parentheses.
    pub fn mismatched_parentheses() -> Self {
        Self::Syntax {
            message: "mismatched parentheses".into(),
        }
    }

    /// Creates a state error.
    pub fn state(message: impl Into<String>) -> Self {
        Self::State {
            message: message.into(),
        }
    }

    /// Returns a suggestion for common errors.
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::Syntax { .. } => Some("Every \"open\" token needs a matching \"close\" token"),
            Self::State { message } if message.contains("operator") => {
                Some("Operators need an operand on each side, e.g. [a, and, b]")
            }
            Self::State { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn syntax_error_display() {
        let err = QueryError::mismatched_parentheses();
        assert_eq!(err.to_string(), "syntax error: mismatched parentheses");
        assert!(err.suggestion().is_some());
    }

    #[test]
    fn state_error_display() {
        let err = QueryError::state("2 nodes left after reduction");
        assert!(err.to_string().starts_with("invalid expression"));
        assert!(err.suggestion().is_none());
    }

    #[test]
    fn operator_state_error_has_hint() {
        let err = QueryError::state("operator AND has no operands");
        assert!(err.suggestion().unwrap().contains("operand on each side"));
    }
}
