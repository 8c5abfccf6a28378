//! Error types for schema loading and lookup.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using SchemaError.
pub type SchemaResult<T> = Result<T, SchemaError>;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("No schema registered for array '{array}' product '{product}'")]
    UnknownSchema { array: String, product: String },

    #[error("Invalid schema {origin}: {reason}")]
    InvalidSchema { origin: String, reason: String },

    #[error("Failed to read schema file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse schema YAML {origin}: {source}")]
    Yaml {
        origin: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Variable substitution failed in {origin}: {reason}")]
    Substitution { origin: String, reason: String },
}

impl SchemaError {
    pub(crate) fn invalid(origin: impl Into<String>, reason: impl Into<String>) -> Self {
        SchemaError::InvalidSchema {
            origin: origin.into(),
            reason: reason.into(),
        }
    }
}
