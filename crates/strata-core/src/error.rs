//! Error types for strata-core

use crate::NodeType;
use thiserror::Error;

/// Core error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Type error: cannot {operation} on a {found} node (expected {expected})")]
    TypeMismatch {
        operation: &'static str,
        expected: NodeType,
        found: NodeType,
    },

    #[error("Index {index} out of bounds (content count is {len})")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("Invalid value: '{value}' is not a valid {expected}")]
    InvalidValue { value: String, expected: &'static str },
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
