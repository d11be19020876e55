//! Error types for building and evaluating update expressions.

use thiserror::Error;

/// Failures raised while building or resolving an update expression.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpdateExpressionError {
    /// No attribute carried a value, so there is nothing to write.
    #[error("update expression has no assignments")]
    Empty,

    /// The attribute name cannot be embedded in a placeholder.
    #[error("invalid attribute name '{attribute}'")]
    InvalidAttributeName {
        /// Offending attribute name.
        attribute: String,
    },

    /// The same attribute was assigned more than once.
    #[error("attribute '{attribute}' is assigned more than once")]
    DuplicateAttribute {
        /// Attribute assigned twice.
        attribute: String,
    },

    /// The instruction text does not follow `SET #name = :value, ...`.
    #[error("malformed update expression: {message}")]
    Malformed {
        /// Description of the syntax problem.
        message: String,
    },

    /// A placeholder in the instruction has no entry in its alias table.
    #[error("placeholder '{placeholder}' is not defined")]
    UnresolvedPlaceholder {
        /// Placeholder missing from the alias tables.
        placeholder: String,
    },

    /// An alias table entry is never referenced by the instruction.
    #[error("placeholder '{placeholder}' is defined but never used")]
    UnusedPlaceholder {
        /// Placeholder present in an alias table but absent from the text.
        placeholder: String,
    },
}

impl UpdateExpressionError {
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }

    pub(crate) fn unresolved(placeholder: impl Into<String>) -> Self {
        Self::UnresolvedPlaceholder {
            placeholder: placeholder.into(),
        }
    }
}
