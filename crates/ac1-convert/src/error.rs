//! Error types for the conversion crate.

use std::path::PathBuf;

use ac1_common::{DatasetError, FilenameError};
use ac1_schema::SchemaError;
use thiserror::Error;

/// Errors that can occur while converting a native dataset.
#[derive(Error, Debug)]
pub enum ConversionError {
    #[error("Native variable '{source_name}' required for '{target}' is missing")]
    MissingSourceVariable { source_name: String, target: String },

    #[error("Shape mismatch for '{variable}': {reason}")]
    ShapeMismatch { variable: String, reason: String },

    #[error("Missing required metadata: {0}")]
    MissingMetadata(String),

    #[error("Unknown units '{units}' on native variable '{variable}'")]
    UnknownUnit { variable: String, units: String },

    #[error("Native variable '{variable}' has units '{found}' which cannot become '{expected}'")]
    IncompatibleUnit {
        variable: String,
        found: String,
        expected: String,
    },

    #[error("Invalid dataset: {0}")]
    InvalidDataset(#[from] DatasetError),

    #[error("Invalid filename: {0}")]
    Filename(#[from] FilenameError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("Failed to read metadata record {path:?}: {source}")]
    RecordIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse metadata record {origin}: {reason}")]
    RecordParse { origin: String, reason: String },
}

/// Result type for conversion operations.
pub type Result<T> = std::result::Result<T, ConversionError>;
