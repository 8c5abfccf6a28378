//! Error types for the common AC1 model.

use thiserror::Error;

/// Result type alias using DatasetError.
pub type DatasetResult<T> = Result<T, DatasetError>;

/// Structural errors raised while building or reshaping a [`crate::Dataset`].
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DatasetError {
    #[error("Variable '{variable}' has {dims} dimension names but a rank-{rank} shape")]
    RankMismatch {
        variable: String,
        dims: usize,
        rank: usize,
    },

    #[error("Variable '{variable}' holds {found} values but its shape {shape:?} needs {expected}")]
    ShapeLength {
        variable: String,
        shape: Vec<usize>,
        expected: usize,
        found: usize,
    },

    #[error("Variable '{variable}' uses undeclared dimension '{dimension}'")]
    UnknownDimension { variable: String, dimension: String },

    #[error("Dimension '{dimension}' has size {expected} but variable '{variable}' spans {found}")]
    DimensionSize {
        dimension: String,
        variable: String,
        expected: usize,
        found: usize,
    },

    #[error("Dimension '{dimension}' already declared with size {existing}, cannot redeclare as {requested}")]
    DimensionConflict {
        dimension: String,
        existing: usize,
        requested: usize,
    },

    #[error("Invalid axis permutation {permutation:?} for variable '{variable}' of rank {rank}")]
    InvalidPermutation {
        variable: String,
        permutation: Vec<usize>,
        rank: usize,
    },

    #[error("Variable '{0}' is already present")]
    DuplicateVariable(String),
}

/// Errors from the OceanSITES filename codec.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FilenameError {
    #[error("Filename '{0}' must end with '.nc'")]
    MissingExtension(String),

    #[error("Filename '{0}' must start with 'OS_'")]
    WrongPrefix(String),

    #[error("Filename '{name}' has {found} '_'-separated components, expected at least 5")]
    ComponentCount { name: String, found: usize },

    #[error("Invalid site code '{0}': expected upper-case letters and digits")]
    InvalidSiteCode(String),

    #[error("Invalid date range '{0}': expected YYYYMMDD-YYYYMMDD")]
    InvalidDateRange(String),

    #[error("Invalid date '{0}': expected an 8-digit calendar date YYYYMMDD")]
    InvalidDate(String),

    #[error("Unknown content type '{0}': expected one of LTS, GRD, DPR")]
    UnknownContentType(String),

    #[error("Invalid product/resolution tag '{0}'")]
    InvalidTag(String),
}

/// Errors decoding timestamps and CF time units.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TimeParseError {
    #[error("Invalid compact timestamp '{0}': expected YYYYMMDDTHHMMSS")]
    InvalidCompact(String),

    #[error("Invalid time units '{0}': expected '<unit> since <reference>'")]
    InvalidUnits(String),

    #[error("Time value {0} is outside the representable range")]
    OutOfRange(f64),
}

/// Errors expanding `${VAR}` references in configuration text.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubstitutionError {
    #[error("Unclosed variable substitution: ${{{0}")]
    Unclosed(String),

    #[error("Environment variable {0} not set")]
    Unset(String),
}
