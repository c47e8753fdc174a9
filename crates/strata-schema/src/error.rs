//! Error types for strata-schema

use crate::registry::InstantiationError;
use thiserror::Error;

/// Binding and construction error type
#[derive(Error, Debug)]
pub enum Error {
    /// A required attribute is absent
    #[error("Can't load '{owner}': expected '{key}' attribute")]
    MissingKey { key: String, owner: String },

    /// A stored value does not read as the property's type
    #[error("Can't load '{owner}': attribute '{key}' is invalid: {source}")]
    Coercion {
        key: String,
        owner: String,
        source: strata_core::Error,
    },

    /// A required property has no value to write
    #[error("Property '{key}' has no value")]
    Unset { key: String },

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Component key '{0}' already registered")]
    DuplicateComponent(String),

    #[error("Can't construct '{type_name}': {source}")]
    Construction {
        type_name: String,
        source: InstantiationError,
    },

    #[error("Format error: {0}")]
    Format(#[from] strata_format::Error),

    #[error("Node error: {0}")]
    Node(#[from] strata_core::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
