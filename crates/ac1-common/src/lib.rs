//! Common types shared across the AC1 toolkit crates.
//!
//! - [`Dataset`]: the labeled multi-dimensional array collection that the
//!   converter produces and the compliance checker inspects
//! - [`filename`]: the OceanSITES `OS_<SITE>_<START>-<END>_<CONTENT>_<TAG>.nc` codec
//! - [`time`]: compact `YYYYMMDDTHHMMSS` timestamps and CF time units
//! - [`GeoBounds`]: geographic coverage and its allowed ranges
//! - [`order`]: the canonical `N_COMPONENT, TIME, Z, Y, X` dimension order

pub mod bbox;
pub mod dataset;
pub mod env;
pub mod error;
pub mod filename;
pub mod order;
pub mod time;

pub use bbox::GeoBounds;
pub use dataset::{
    ArrayData, AttrValue, Attributes, DataType, Dataset, Dimension, EncodingHints, Variable,
    VariableRole,
};
pub use env::expand_env_vars;
pub use error::{DatasetError, DatasetResult, FilenameError, SubstitutionError, TimeParseError};
pub use filename::{build_filename, parse_filename, ContentType, OceanSitesFilename};
pub use order::{canonical_rank, follows_canonical_order, is_vertical};
pub use time::{format_compact, parse_compact, TimeUnits, AC1_TIME_UNITS};

/// Name of the mandatory time dimension and coordinate.
pub const TIME: &str = "TIME";

/// Component dimension, always leftmost in a variable's dimension tuple.
pub const N_COMPONENT: &str = "N_COMPONENT";

/// Vertical dimensions; at most one appears in a variable.
pub const VERTICAL_DIMS: [&str; 3] = ["DEPTH", "PRESSURE", "SIGMA0"];

pub const LATITUDE: &str = "LATITUDE";
pub const LONGITUDE: &str = "LONGITUDE";
