//! Error types for strata-format

use thiserror::Error;

/// Malformed wire text, located by 1-based line and column
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message} at line {line}, column {column}")]
pub struct ParseError {
    pub line: usize,
    pub column: usize,
    pub message: String,
}

impl ParseError {
    pub fn new(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            column,
            message: message.into(),
        }
    }
}

/// Codec error type
#[derive(Error, Debug)]
pub enum Error {
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// An OBJ face refers to an element that was not defined before it
    #[error("Index out of bounds at line {line}: {element} index {index} but {count} defined so far")]
    IndexBounds {
        line: usize,
        element: &'static str,
        index: i64,
        count: usize,
    },

    #[error("Invalid node: {0}")]
    InvalidNode(String),

    #[error("Node error: {0}")]
    Node(#[from] strata_core::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("RON parse error: {0}")]
    Config(#[from] ron::error::SpannedError),
}

impl Error {
    /// Get the parse error if this is a malformed-input failure
    pub fn parse_error(&self) -> Option<&ParseError> {
        match self {
            Error::Parse(err) => Some(err),
            _ => None,
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
